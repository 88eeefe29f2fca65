//! Short lead-capture forms (newsletter signup and quick contact). They
//! share the consultation form's field rules and submission gateway but
//! have a single screen and reset after a successful send.

use std::collections::BTreeMap;
use std::rc::Rc;

use log::{debug, error, info};
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlElement, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::components::notification::{Notification, NotificationBanner};
use crate::config;
use crate::consultation::errors::{FieldError, StepError, SubmissionError};
use crate::consultation::fields::{FieldKind, FieldSpec};
use crate::consultation::gateway::{SimulatedGateway, SubmissionGateway, SubmissionReceipt};
use crate::consultation::session::FieldValue;
use crate::consultation::validation::{RuleValidator, Validator};

const INVALID_MESSAGE: &str = "Please correct the highlighted fields.";
const FAILED_MESSAGE: &str = "An error occurred. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeadFormKind {
    Newsletter,
    QuickContact,
}

impl LeadFormKind {
    pub fn form_id(&self) -> &'static str {
        match self {
            LeadFormKind::Newsletter => "newsletter-form",
            LeadFormKind::QuickContact => "quick-contact-form",
        }
    }

    pub fn fields(&self) -> Vec<FieldSpec> {
        match self {
            LeadFormKind::Newsletter => vec![
                FieldSpec::new("email", "Email address", FieldKind::Email).required(),
            ],
            LeadFormKind::QuickContact => vec![
                FieldSpec::new("name", "Name", FieldKind::Text).required().min_len(2).max_len(100),
                FieldSpec::new("email", "Email", FieldKind::Email).required(),
                FieldSpec::new("message", "How can we help?", FieldKind::TextArea)
                    .required()
                    .min_len(10)
                    .max_len(1000),
            ],
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            LeadFormKind::Newsletter => "Successfully subscribed to our newsletter!",
            LeadFormKind::QuickContact => "Message sent successfully! We'll get back to you soon.",
        }
    }

    fn submit_label(&self) -> &'static str {
        match self {
            LeadFormKind::Newsletter => "Subscribe",
            LeadFormKind::QuickContact => "Send Message",
        }
    }

    fn gateway(&self) -> SimulatedGateway {
        match self {
            LeadFormKind::Newsletter => SimulatedGateway::new(
                "newsletter",
                config::simulated_latency_ms(config::NEWSLETTER_LATENCY_MS),
            ),
            LeadFormKind::QuickContact => SimulatedGateway::new(
                "quick_contact",
                config::simulated_latency_ms(config::QUICK_CONTACT_LATENCY_MS),
            ),
        }
    }
}

/// Values, errors and the in-flight flag of one lead form.
pub struct LeadForm {
    kind: LeadFormKind,
    fields: Vec<FieldSpec>,
    values: BTreeMap<String, FieldValue>,
    errors: BTreeMap<String, String>,
    submitting: bool,
    validator: Rc<dyn Validator>,
}

impl LeadForm {
    pub fn new(kind: LeadFormKind, validator: Rc<dyn Validator>) -> Self {
        Self {
            kind,
            fields: kind.fields(),
            values: BTreeMap::new(),
            errors: BTreeMap::new(),
            submitting: false,
            validator,
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn set_field(&mut self, name: &str, value: FieldValue) {
        let Some(field) = self.fields.iter().find(|f| f.name == name) else {
            debug!("Ignoring value for unknown {} field '{}'", self.kind.form_id(), name);
            return;
        };
        self.errors.remove(field.name);
        self.values.insert(field.name.to_string(), value);
    }

    pub fn validate(&mut self) -> Result<(), StepError> {
        let failures: Vec<FieldError> = self
            .fields
            .iter()
            .filter_map(|field| {
                self.validator
                    .validate(field, self.values.get(field.name), field.required)
                    .into_result()
                    .err()
            })
            .collect();

        self.errors = failures
            .iter()
            .map(|failure| (failure.field.clone(), failure.message.clone()))
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(StepError::Invalid(failures))
        }
    }

    /// Validates and locks the form; the returned payload goes to the gateway.
    pub fn begin_submission(&mut self) -> Result<BTreeMap<String, String>, StepError> {
        if self.submitting {
            return Err(StepError::SubmissionInFlight);
        }
        self.validate()?;
        self.submitting = true;

        let mut payload: BTreeMap<String, String> = self
            .values
            .iter()
            .filter(|(_, value)| !value.is_blank())
            .map(|(name, value)| (name.clone(), value.as_text().trim().to_string()))
            .collect();
        payload.insert("form".to_string(), self.kind.form_id().to_string());
        Ok(payload)
    }

    /// Unlocks the form; a success also clears it.
    pub fn finish_submission(
        &mut self,
        result: Result<SubmissionReceipt, SubmissionError>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        self.submitting = false;
        if result.is_ok() {
            self.values.clear();
            self.errors.clear();
        }
        result
    }

    pub fn text(&self, name: &str) -> &str {
        self.values.get(name).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn error_for(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// First field, in display order, that currently shows an error.
    pub fn first_error(&self) -> Option<&'static str> {
        self.fields
            .iter()
            .map(|field| field.name)
            .find(|name| self.errors.contains_key(*name))
    }
}

#[derive(Properties, PartialEq)]
pub struct LeadFormProps {
    pub kind: LeadFormKind,
}

pub enum LeadFormMsg {
    Input(String, String),
    Submit,
    Done(Result<SubmissionReceipt, SubmissionError>),
    DismissNotification,
}

pub struct LeadFormView {
    form: LeadForm,
    gateway: Rc<dyn SubmissionGateway>,
    notification: Option<Notification>,
    focus_request: Option<&'static str>,
}

impl LeadFormView {
    fn input_id(&self, name: &str) -> String {
        format!("{}-{}", self.form.kind.form_id(), name)
    }

    fn render_field(&self, ctx: &Context<Self>, field: &FieldSpec) -> Html {
        let id = self.input_id(field.name);
        let name = field.name.to_string();
        let value = self.form.text(field.name).to_string();
        let error = self.form.error_for(field.name);

        let control = if field.kind == FieldKind::TextArea {
            let oninput = ctx.link().callback(move |e: InputEvent| {
                let area: HtmlTextAreaElement = e.target_unchecked_into();
                LeadFormMsg::Input(name.clone(), area.value())
            });
            html! {
                <textarea id={id.clone()} name={field.name} aria-required="true" value={value} {oninput} />
            }
        } else {
            let oninput = ctx.link().callback(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                LeadFormMsg::Input(name.clone(), input.value())
            });
            html! {
                <input
                    type={field.kind.input_type()}
                    id={id.clone()}
                    name={field.name}
                    placeholder={field.label}
                    aria-required={field.required.to_string()}
                    {value}
                    {oninput}
                />
            }
        };

        html! {
            <div class={classes!("form-group", error.is_some().then_some("has-error"))}>
                <label for={id}>{field.label}</label>
                {control}
                if let Some(message) = error {
                    <div class="field-error" role="alert">{message}</div>
                }
            </div>
        }
    }
}

impl Component for LeadFormView {
    type Message = LeadFormMsg;
    type Properties = LeadFormProps;

    fn create(ctx: &Context<Self>) -> Self {
        let kind = ctx.props().kind;
        Self {
            form: LeadForm::new(kind, Rc::new(RuleValidator)),
            gateway: Rc::new(kind.gateway()),
            notification: None,
            focus_request: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            LeadFormMsg::Input(name, value) => {
                self.form.set_field(&name, FieldValue::Text(value));
            }
            LeadFormMsg::Submit => match self.form.begin_submission() {
                Ok(payload) => {
                    let gateway = Rc::clone(&self.gateway);
                    ctx.link()
                        .send_future(async move { LeadFormMsg::Done(gateway.submit(payload).await) });
                }
                Err(StepError::Invalid(failures)) => {
                    debug!("{} blocked by {} field(s)", self.form.kind.form_id(), failures.len());
                    self.focus_request = self.form.first_error();
                    self.notification = Some(Notification::warning(INVALID_MESSAGE));
                }
                Err(e) => {
                    debug!("Submit ignored: {}", e);
                    return false;
                }
            },
            LeadFormMsg::Done(result) => match self.form.finish_submission(result) {
                Ok(receipt) => {
                    info!("{} accepted as {}", self.form.kind.form_id(), receipt.id);
                    self.notification = Some(Notification::success(self.form.kind.success_message()));
                }
                Err(e) => {
                    error!("Form submission error: {}", e);
                    self.notification = Some(Notification::error(FAILED_MESSAGE));
                }
            },
            LeadFormMsg::DismissNotification => {
                self.notification = None;
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let kind = self.form.kind;
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            LeadFormMsg::Submit
        });
        let dismiss = ctx.link().callback(|_| LeadFormMsg::DismissNotification);
        let submitting = self.form.is_submitting();

        html! {
            <>
                <NotificationBanner notification={self.notification.clone()} on_close={dismiss} />
                <form id={kind.form_id()} class={classes!("lead-form", kind.form_id())} {onsubmit}>
                    { for self.form.fields().iter().map(|field| self.render_field(ctx, field)) }
                    <button
                        type="submit"
                        class={classes!("btn", "btn-primary", submitting.then_some("loading"))}
                        disabled={submitting}
                    >
                        { if submitting { "Sending..." } else { kind.submit_label() } }
                    </button>
                </form>
            </>
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        if let Some(name) = self.focus_request.take() {
            let element = window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(&self.input_id(name)))
                .and_then(|el| el.dyn_into::<HtmlElement>().ok());
            if let Some(element) = element {
                let _ = element.focus();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use futures::executor::block_on;

    use super::*;

    struct FixedGateway(Result<SubmissionReceipt, SubmissionError>);

    #[async_trait(?Send)]
    impl SubmissionGateway for FixedGateway {
        async fn submit(&self, _payload: BTreeMap<String, String>) -> Result<SubmissionReceipt, SubmissionError> {
            self.0.clone()
        }
    }

    fn quick_contact() -> LeadForm {
        LeadForm::new(LeadFormKind::QuickContact, Rc::new(RuleValidator))
    }

    fn fill(form: &mut LeadForm) {
        form.set_field("name", FieldValue::text("Ana Souza"));
        form.set_field("email", FieldValue::text("ana@x.com"));
        form.set_field("message", FieldValue::text("We need a new landing page."));
    }

    #[test]
    fn test_newsletter_needs_valid_email() {
        let mut form = LeadForm::new(LeadFormKind::Newsletter, Rc::new(RuleValidator));
        assert!(matches!(form.begin_submission(), Err(StepError::Invalid(_))));
        assert_eq!(form.error_for("email"), Some("This field is required"));

        form.set_field("email", FieldValue::text("nope"));
        assert!(form.error_for("email").is_none(), "typing clears the error");
        assert!(form.begin_submission().is_err());
        assert_eq!(form.error_for("email"), Some("Please enter a valid email address"));
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_quick_contact_length_rules() {
        let mut form = quick_contact();
        fill(&mut form);
        form.set_field("name", FieldValue::text("A"));
        form.set_field("message", FieldValue::text("Hi"));

        let err = form.validate().unwrap_err();
        assert_eq!(err.field_errors().len(), 2);
        assert_eq!(form.error_for("name"), Some("Minimum 2 characters required"));
        assert_eq!(form.first_error(), Some("name"));
    }

    #[test]
    fn test_payload_is_tagged_and_form_locks() {
        let mut form = quick_contact();
        fill(&mut form);
        let payload = form.begin_submission().unwrap();
        assert_eq!(payload.get("form").map(String::as_str), Some("quick-contact-form"));
        assert_eq!(payload.get("email").map(String::as_str), Some("ana@x.com"));
        assert_eq!(payload.len(), 4);

        assert!(form.is_submitting());
        assert_eq!(form.begin_submission(), Err(StepError::SubmissionInFlight));
    }

    #[test]
    fn test_success_resets_and_failure_keeps_values() {
        let mut form = quick_contact();
        fill(&mut form);

        let payload = form.begin_submission().unwrap();
        let failing = FixedGateway(Err(SubmissionError::new("offline")));
        assert!(form.finish_submission(block_on(failing.submit(payload))).is_err());
        assert!(!form.is_submitting());
        assert_eq!(form.text("name"), "Ana Souza");

        let payload = form.begin_submission().unwrap();
        let ok = FixedGateway(Ok(SubmissionReceipt { id: "quick_contact_1".into() }));
        let receipt = form.finish_submission(block_on(ok.submit(payload))).unwrap();
        assert_eq!(receipt.id, "quick_contact_1");
        assert_eq!(form.text("name"), "");
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_unknown_field_is_ignored() {
        let mut form = LeadForm::new(LeadFormKind::Newsletter, Rc::new(RuleValidator));
        form.set_field("name", FieldValue::text("Ana"));
        assert_eq!(form.text("name"), "");
    }
}
