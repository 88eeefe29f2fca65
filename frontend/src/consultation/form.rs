use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    window, BeforeUnloadEvent, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement,
    KeyboardEvent, SubmitEvent,
};
use yew::prelude::*;

use crate::components::notification::{Notification, NotificationBanner};
use crate::consultation::brief::{BriefAttachment, BRIEF_FIELD};
use crate::consultation::controller::{CompletedSubmission, Phase, StepController, SubmissionStatus};
use crate::consultation::errors::StepError;
use crate::consultation::fields::{FieldKind, FieldSpec, StepRegistry};
use crate::consultation::gateway::SimulatedGateway;
use crate::consultation::hints::{self, CharacterCounter};
use crate::consultation::persistence::LocalStoragePersistence;
use crate::consultation::session::{FieldValue, LeaveGuard};
use crate::consultation::validation::RuleValidator;

const RESUME_MESSAGE: &str = "We found your partially completed form. You can continue where you left off.";
const SUBMIT_FAILED_MESSAGE: &str =
    "There was an error submitting your consultation request. Please try again or contact us directly.";
const SUBMIT_BUTTON_ID: &str = "consultation-submit";
const LEAVE_MESSAGE: &str =
    "You have unsaved information in the consultation form. Are you sure you want to leave?";

#[derive(Properties, PartialEq)]
pub struct ConsultationFormProps {
    #[prop_or_default]
    pub prefill: BTreeMap<String, String>,
}

pub enum ConsultationMsg {
    Input(String, FieldValue),
    Next,
    Prev,
    KeyDown(KeyboardEvent),
    Submit,
    SubmissionDone(CompletedSubmission),
    AttachBrief(Option<BriefAttachment>),
    DismissNotification,
    StartOver,
}

pub struct ConsultationForm {
    controller: StepController,
    notification: Option<Notification>,
    submitted_id: Option<String>,
    leave_guard: LeaveGuard,
    unload_listener: Option<Closure<dyn FnMut(BeforeUnloadEvent)>>,
}

impl ConsultationForm {
    fn sync_leave_guard(&self) {
        self.controller.update_leave_guard(&self.leave_guard);
    }

    fn render_field(&self, ctx: &Context<Self>, field: &FieldSpec) -> Html {
        if !self.controller.is_visible(field.name) {
            return html! {};
        }
        let name = field.name.to_string();
        let id = format!("field-{}", field.name);
        let value = self.controller.text(field.name).to_string();
        let required = self.controller.is_required(field);
        let error = self.controller.error_for(field.name);

        let control = match field.kind {
            FieldKind::Select => {
                let onchange = ctx.link().callback(move |e: Event| {
                    let select: HtmlSelectElement = e.target_unchecked_into();
                    ConsultationMsg::Input(name.clone(), FieldValue::Text(select.value()))
                });
                html! {
                    <select id={id.clone()} name={field.name} aria-required={required.to_string()} {onchange}>
                        <option value="" selected={value.is_empty()}>{"Select an option"}</option>
                        { for field.options.iter().map(|(v, label)| html! {
                            <option value={*v} selected={value == *v}>{*label}</option>
                        }) }
                    </select>
                }
            }
            FieldKind::TextArea => {
                let oninput = ctx.link().callback(move |e: InputEvent| {
                    let area: HtmlTextAreaElement = e.target_unchecked_into();
                    ConsultationMsg::Input(name.clone(), FieldValue::Text(area.value()))
                });
                let placeholder = (field.name == "project-description")
                    .then(|| hints::description_placeholder(self.controller.text("service-interest")));
                html! {
                    <textarea id={id.clone()} name={field.name} aria-required={required.to_string()} value={value.clone()} {placeholder} {oninput} />
                }
            }
            FieldKind::Checkbox => {
                let onchange = ctx.link().callback(move |e: Event| {
                    let input: HtmlInputElement = e.target_unchecked_into();
                    ConsultationMsg::Input(name.clone(), FieldValue::Flag(input.checked()))
                });
                let checked = self
                    .controller
                    .session()
                    .value(field.name)
                    .map_or(false, FieldValue::is_checked);
                html! {
                    <input type="checkbox" id={id.clone()} name={field.name} aria-required={required.to_string()} {checked} {onchange} />
                }
            }
            kind => {
                let oninput = ctx.link().callback(move |e: InputEvent| {
                    let input: HtmlInputElement = e.target_unchecked_into();
                    ConsultationMsg::Input(name.clone(), FieldValue::Text(input.value()))
                });
                html! {
                    <input type={kind.input_type()} id={id.clone()} name={field.name} aria-required={required.to_string()} value={value.clone()} {oninput} />
                }
            }
        };

        let counter = CharacterCounter::for_field(field.name, &value).map(|counter| {
            html! {
                <div class={classes!("character-counter", counter.over_limit().then_some("over-limit"))}>
                    {counter.label()}
                </div>
            }
        });
        let info = match field.name {
            "budget-range" => hints::budget_info(&value),
            "timeline" => hints::timeline_info(&value),
            _ => None,
        };

        html! {
            <div class={classes!("form-group", error.is_some().then_some("has-error"))}>
                <label for={id}>
                    {field.label}
                    if required { <span class="required-mark">{" *"}</span> }
                </label>
                {control}
                {counter.unwrap_or_default()}
                if let Some(info) = info {
                    <div class="info-box">{info}</div>
                }
                if let Some(message) = error {
                    <div class="field-error" role="alert">{message}</div>
                }
            </div>
        }
    }

    fn render_brief(&self, ctx: &Context<Self>) -> Html {
        let onchange = ctx.link().callback(|e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let brief = input.files().and_then(|files| files.get(0)).map(|file| BriefAttachment {
                name: file.name(),
                size: file.size() as u64,
                mime: file.type_(),
            });
            ConsultationMsg::AttachBrief(brief)
        });
        let (text, subtext) = match self.controller.brief() {
            Some(brief) => (brief.name.clone(), brief.size_label()),
            None => (
                "Choose file or drag and drop".to_string(),
                "PDF, DOC, DOCX (MAX. 10MB)".to_string(),
            ),
        };

        html! {
            <div class="form-group">
                <label class={classes!("file-upload-label", self.controller.brief().is_some().then_some("has-file"))}>
                    <input type="file" id="field-project-brief" name={BRIEF_FIELD} accept=".pdf,.doc,.docx" {onchange} />
                    <span class="upload-text">{text}</span>
                    <span class="upload-subtext">{subtext}</span>
                </label>
                if let Some(message) = self.controller.error_for(BRIEF_FIELD) {
                    <div class="field-error" role="alert">{message}</div>
                }
            </div>
        }
    }

    fn render_success(&self, ctx: &Context<Self>) -> Html {
        let start_over = ctx.link().callback(|_: MouseEvent| ConsultationMsg::StartOver);
        html! {
            <div class="consultation-success">
                <div class="success-icon">{"✓"}</div>
                <h2>{"Thank You for Your Interest!"}</h2>
                <p>{"Your consultation request has been successfully submitted. Our team will review your information and contact you within 24 hours to schedule your free consultation."}</p>
                if let Some(id) = &self.submitted_id {
                    <p class="reference">{format!("Reference: {}", id)}</p>
                }
                <div class="next-steps">
                    <h3>{"What Happens Next?"}</h3>
                    <ol>
                        <li>{"You'll receive a confirmation email within 15 minutes"}</li>
                        <li>{"Our team will review your project requirements"}</li>
                        <li>{"We'll contact you to schedule a consultation call"}</li>
                        <li>{"During the call, we'll discuss your project in detail and provide recommendations"}</li>
                        <li>{"You'll receive a detailed proposal with timeline and pricing"}</li>
                    </ol>
                </div>
                <div class="success-actions">
                    <a href="/" class="btn btn-primary">{"Return to Home"}</a>
                    <a href="/works" class="btn btn-secondary">{"View Our Work"}</a>
                    <button type="button" class="btn btn-secondary" onclick={start_over}>{"Start another request"}</button>
                </div>
            </div>
        }
    }
}

impl Component for ConsultationForm {
    type Message = ConsultationMsg;
    type Properties = ConsultationFormProps;

    fn create(ctx: &Context<Self>) -> Self {
        let referrer = window()
            .and_then(|w| w.document())
            .map(|d| d.referrer())
            .unwrap_or_default();
        let controller = StepController::new(
            StepRegistry::consultation(),
            Rc::new(RuleValidator),
            Rc::new(LocalStoragePersistence),
            Rc::new(SimulatedGateway::consultation()),
            &ctx.props().prefill,
        )
        .with_referrer(referrer);

        let notification = controller.resumed().then(|| Notification::info(RESUME_MESSAGE));
        let form = Self {
            controller,
            notification,
            submitted_id: None,
            leave_guard: LeaveGuard::default(),
            unload_listener: None,
        };
        form.sync_leave_guard();
        info!("Consultation form initialized");
        form
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            ConsultationMsg::Input(name, value) => {
                self.controller.set_field(&name, value);
            }
            ConsultationMsg::Next => {
                if let Err(e) = self.controller.advance() {
                    debug!("Next step refused: {} ({} field error(s))", e, e.field_errors().len());
                }
            }
            ConsultationMsg::Prev => {
                self.controller.retreat();
            }
            ConsultationMsg::KeyDown(e) => {
                if e.key() != "Enter" || !e.ctrl_key() {
                    return false;
                }
                e.prevent_default();
                if let Err(e) = self.controller.advance() {
                    debug!("Keyboard advance refused: {}", e);
                }
            }
            ConsultationMsg::Submit => match self.controller.begin_submission() {
                Ok(pending) => {
                    debug!("Sending consultation request with {} value(s)", pending.payload().len());
                    ctx.link()
                        .send_future(async move { ConsultationMsg::SubmissionDone(pending.send().await) });
                }
                Err(StepError::Invalid(_)) => {}
                Err(e) => debug!("Submit ignored: {}", e),
            },
            ConsultationMsg::SubmissionDone(done) => match self.controller.finish_submission(done) {
                SubmissionStatus::Accepted(receipt) => {
                    self.submitted_id = Some(receipt.id);
                    self.notification = None;
                    if let Some(window) = window() {
                        window.scroll_to_with_x_and_y(0.0, 0.0);
                    }
                }
                SubmissionStatus::Rejected(_) => {
                    self.notification = Some(Notification::error(SUBMIT_FAILED_MESSAGE));
                }
                SubmissionStatus::Discarded => return false,
            },
            ConsultationMsg::AttachBrief(brief) => {
                let _ = self.controller.attach_brief(brief);
            }
            ConsultationMsg::DismissNotification => {
                self.notification = None;
            }
            ConsultationMsg::StartOver => {
                self.controller.start_new_session();
                self.submitted_id = None;
            }
        }
        self.sync_leave_guard();
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let dismiss = ctx.link().callback(|_| ConsultationMsg::DismissNotification);
        let banner = html! {
            <NotificationBanner notification={self.notification.clone()} on_close={dismiss} />
        };

        if self.controller.phase() == Phase::Submitted {
            return html! {
                <div class="consultation-success-wrapper">
                    {banner}
                    {self.render_success(ctx)}
                </div>
            };
        }

        let controls = self.controller.controls();
        let current = self.controller.current_step();
        let total = self.controller.total_steps();
        let onsubmit = ctx.link().batch_callback(|e: SubmitEvent| {
            e.prevent_default();
            let submitter = e.submitter().map(|el| el.id());
            is_submit_request(submitter.as_deref()).then_some(ConsultationMsg::Submit)
        });
        let onkeydown = ctx.link().callback(ConsultationMsg::KeyDown);
        let next = ctx.link().callback(|_: MouseEvent| ConsultationMsg::Next);
        let prev = ctx.link().callback(|_: MouseEvent| ConsultationMsg::Prev);
        let submitting = self.controller.phase() == Phase::Submitting;

        html! {
            <form id="consultation-form" class="consultation-form" {onsubmit} {onkeydown}>
                {banner}
                <div class="form-progress">
                    <div class="progress-bar">
                        <div class="progress-fill" style={format!("width: {}%;", self.controller.progress_percent())}></div>
                    </div>
                    <div class="step-indicator">
                        {"Step "}<span class="current-step">{(current + 1).to_string()}</span>
                        {" of "}<span class="total-steps">{total.to_string()}</span>
                    </div>
                    <ol class="step-dots">
                        { for self.controller.steps().into_iter().map(|step| {
                            let label = format!(
                                "Step {} ({} required field(s))",
                                step.index + 1,
                                step.required_field_names.len()
                            );
                            html! {
                                <li
                                    class={classes!(
                                        "step-dot",
                                        step.is_active.then_some("active"),
                                        (step.index < current).then_some("completed")
                                    )}
                                    aria-label={label}
                                    aria-current={step.is_active.then_some("step")}
                                >
                                    {(step.index + 1).to_string()}
                                </li>
                            }
                        }) }
                    </ol>
                </div>
                { for self.controller.registry().steps().iter().enumerate().map(|(index, step)| html! {
                    <fieldset class={classes!("form-step", (index == current).then_some("active"))} style={if index == current { "" } else { "display: none;" }}>
                        <legend>{step.title}</legend>
                        { for step.fields.iter().map(|field| self.render_field(ctx, field)) }
                        if index + 1 == total { {self.render_brief(ctx)} }
                    </fieldset>
                }) }
                <div class="form-navigation">
                    if controls.show_prev {
                        <button type="button" class="btn btn-secondary prev-step" onclick={prev} disabled={submitting}>{"Previous"}</button>
                    }
                    if controls.show_next {
                        <button type="button" class="btn btn-primary next-step" onclick={next}>{"Next Step"}</button>
                    }
                    if controls.show_submit {
                        <button type="submit" id={SUBMIT_BUTTON_ID} class={classes!("btn", "btn-primary", submitting.then_some("loading"))} disabled={!controls.submit_enabled}>
                            { if submitting { "Submitting..." } else { "Request Consultation" } }
                        </button>
                    }
                </div>
            </form>
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, first_render: bool) {
        if first_render {
            let guard = self.leave_guard.clone();
            let listener = Closure::wrap(Box::new(move |e: BeforeUnloadEvent| {
                if guard.should_warn(Utc::now()) {
                    e.prevent_default();
                    e.set_return_value(LEAVE_MESSAGE);
                }
            }) as Box<dyn FnMut(BeforeUnloadEvent)>);
            if let Some(window) = window() {
                let _ = window.add_event_listener_with_callback("beforeunload", listener.as_ref().unchecked_ref());
            }
            self.unload_listener = Some(listener);
        }

        if let Some(name) = self.controller.take_focus_request() {
            let element = window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(&format!("field-{}", name)))
                .and_then(|el| el.dyn_into::<HtmlElement>().ok());
            if let Some(element) = element {
                let _ = element.focus();
            }
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.controller.close();
        if let (Some(window), Some(listener)) = (window(), self.unload_listener.take()) {
            let _ = window.remove_event_listener_with_callback("beforeunload", listener.as_ref().unchecked_ref());
        }
    }
}

/// Only the form's own submit button sends the request. Any other control
/// that ends up submitting the form, like a button without a `type`, is ignored.
fn is_submit_request(submitter_id: Option<&str>) -> bool {
    submitter_id == Some(SUBMIT_BUTTON_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_submit_button_sends_request() {
        assert!(is_submit_request(Some("consultation-submit")));
        assert!(!is_submit_request(Some("")), "typeless buttons carry no id");
        assert!(!is_submit_request(Some("notification-close")));
        assert!(!is_submit_request(None));
    }
}
