use log::info;
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::consultation::form::ConsultationForm;
use crate::consultation::hints;

#[function_component(Consultation)]
pub fn consultation() -> Html {
    let service = use_search_param("service".to_string());
    let package = use_search_param("package".to_string());
    let project_type = use_search_param("projectType".to_string());

    let prefill = hints::prefill_from_query(
        service.as_deref(),
        package.as_deref(),
        project_type.as_deref(),
    );
    if !prefill.is_empty() {
        info!("Consultation form prefilled with {} field(s)", prefill.len());
    }

    html! {
        <div class="consultation-page">
            <section class="consultation-hero">
                <h1>{"Request a Consultation"}</h1>
                <p>{"Tell us about your project and we'll get back to you within 24 hours."}</p>
            </section>
            <ConsultationForm {prefill} />
            <style>
                {r#"
                .consultation-page {
                    padding-top: 74px;
                    min-height: 100vh;
                }
                .consultation-hero {
                    text-align: center;
                    padding: 5rem 2rem 2rem;
                }
                "#}
            </style>
        </div>
    }
}
