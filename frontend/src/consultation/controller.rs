//! Step controller for the multi-step consultation form.
//!
//! The controller owns the session (current step, field values, last
//! activity) and drives navigation as a small state machine: `advance` is
//! gated on the current step validating, `retreat` never is, and the last
//! step hands a payload to the submission gateway. Collaborators are
//! injected so the same controller runs against browser storage in the page
//! and in-memory doubles in tests.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use chrono::Utc;
use log::{debug, error, info, warn};

use crate::config;
use crate::consultation::brief::{BriefAttachment, BRIEF_FIELD};
use crate::consultation::errors::{FieldError, StepError, SubmissionError};
use crate::consultation::fields::{FieldKind, FieldSpec, StepRegistry, StepRule, StepSpec};
use crate::consultation::gateway::{SubmissionGateway, SubmissionReceipt};
use crate::consultation::persistence::PersistenceAdapter;
use crate::consultation::session::{FieldValue, FormSession, LeaveGuard, Liveness, Snapshot};
use crate::consultation::validation::{ValidationResult, Validator};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
    Submitted,
    Closed,
}

/// View of one step: its required fields under the current values.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub index: usize,
    pub required_field_names: BTreeSet<String>,
    pub is_active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Controls {
    pub show_prev: bool,
    pub show_next: bool,
    pub show_submit: bool,
    pub submit_enabled: bool,
}

pub struct PendingSubmission {
    payload: BTreeMap<String, String>,
    gateway: Rc<dyn SubmissionGateway>,
    liveness: Liveness,
}

impl PendingSubmission {
    pub fn payload(&self) -> &BTreeMap<String, String> {
        &self.payload
    }

    pub async fn send(self) -> CompletedSubmission {
        let PendingSubmission {
            payload,
            gateway,
            liveness,
        } = self;
        let result = gateway.submit(payload).await;
        CompletedSubmission { result, liveness }
    }
}

pub struct CompletedSubmission {
    result: Result<SubmissionReceipt, SubmissionError>,
    liveness: Liveness,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmissionStatus {
    Accepted(SubmissionReceipt),
    Rejected(SubmissionError),
    /// The session was torn down while the call was in flight.
    Discarded,
}

pub struct StepController {
    registry: StepRegistry,
    session: FormSession,
    errors: BTreeMap<String, String>,
    validator: Rc<dyn Validator>,
    persistence: Rc<dyn PersistenceAdapter>,
    gateway: Rc<dyn SubmissionGateway>,
    storage_key: String,
    phase: Phase,
    focus_request: Option<&'static str>,
    resumed: bool,
    brief: Option<BriefAttachment>,
    referrer: String,
}

impl StepController {
    /// Restores any saved snapshot, then applies `prefill` through the
    /// normal change path. Always starts on the first step.
    pub fn new(
        registry: StepRegistry,
        validator: Rc<dyn Validator>,
        persistence: Rc<dyn PersistenceAdapter>,
        gateway: Rc<dyn SubmissionGateway>,
        prefill: &BTreeMap<String, String>,
    ) -> Self {
        let session = FormSession::new(registry.len());
        let mut controller = Self {
            registry,
            session,
            errors: BTreeMap::new(),
            validator,
            persistence,
            gateway,
            storage_key: config::PROGRESS_STORAGE_KEY.to_string(),
            phase: Phase::Editing,
            focus_request: None,
            resumed: false,
            brief: None,
            referrer: String::new(),
        };

        if let Some(snapshot) = controller.persistence.load(&controller.storage_key) {
            controller.restore(&snapshot);
        }
        controller.apply_prefill(prefill);
        controller.focus_request = controller.first_visible_field(0);
        controller
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = referrer.into();
        self
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        let mut restored = 0;
        for (name, raw) in snapshot {
            let Some(field) = self.registry.field(name) else {
                debug!("Ignoring stale snapshot key '{}'", name);
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            if field.kind == FieldKind::Select && !field.allows_option(raw) {
                debug!("Ignoring saved value '{}' no longer offered for '{}'", raw, name);
                continue;
            }
            let value = FieldValue::from_snapshot(raw, field.kind == FieldKind::Checkbox);
            self.session.values.insert(field.name.to_string(), value);
            restored += 1;
        }
        self.resumed = ["name", "email"]
            .iter()
            .any(|name| !self.session.text(name).is_empty());
        if restored > 0 {
            info!("Restored {} saved consultation field(s)", restored);
        }
    }

    /// Registry order, so a controlling field is set before its dependents.
    pub fn apply_prefill(&mut self, prefill: &BTreeMap<String, String>) {
        let names: Vec<&'static str> = self
            .registry
            .steps()
            .iter()
            .flat_map(|step| step.fields.iter().map(|field| field.name))
            .filter(|name| prefill.contains_key(*name))
            .collect();
        for name in names {
            if let Some(value) = prefill.get(name) {
                self.set_field(name, FieldValue::text(value.clone()));
            }
        }
    }

    /// Change path shared by manual entry and pre-fill. Returns the live
    /// validation outcome for fields that validate on change.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Option<ValidationResult> {
        if matches!(self.phase, Phase::Submitted | Phase::Closed) {
            return None;
        }
        let Some(field) = self.registry.field(name).cloned() else {
            warn!("Ignoring value for unknown field '{}'", name);
            return None;
        };

        let previous = self.session.values.insert(field.name.to_string(), value.clone());
        self.errors.remove(field.name);
        self.session.touch(Utc::now());

        if previous.as_ref() != Some(&value) {
            for dependent in self.dependents_of(field.name) {
                self.session.values.remove(dependent);
                self.errors.remove(dependent);
            }
        }

        if field.kind != FieldKind::Select {
            return None;
        }
        let required = self.is_required(&field);
        let result = self.validator.validate(&field, self.session.value(field.name), required);
        if let Some(message) = result.message.clone().filter(|_| !result.is_valid) {
            self.errors.insert(field.name.to_string(), message);
        }
        Some(result)
    }

    fn dependents_of(&self, controller: &str) -> Vec<&'static str> {
        self.registry
            .steps()
            .iter()
            .flat_map(|step| step.rules.iter())
            .filter_map(|rule| match rule {
                StepRule::RequiredWhen { field, controller: c, .. } if *c == controller => Some(*field),
                _ => None,
            })
            .collect()
    }

    fn condition_holds(&self, step: &StepSpec, field: &str) -> Option<bool> {
        match step.condition_for(field) {
            Some(StepRule::RequiredWhen { controller, values, .. }) => {
                Some(values.contains(&self.session.text(controller)))
            }
            _ => None,
        }
    }

    fn owning_step(&self, field: &str) -> Option<&StepSpec> {
        self.registry.step_of(field).and_then(|i| self.registry.step(i))
    }

    pub fn is_visible(&self, field: &str) -> bool {
        self.owning_step(field)
            .and_then(|step| self.condition_holds(step, field))
            .unwrap_or(true)
    }

    pub fn is_required(&self, field: &FieldSpec) -> bool {
        self.owning_step(field.name)
            .and_then(|step| self.condition_holds(step, field.name))
            .unwrap_or(field.required)
    }

    fn first_visible_field(&self, index: usize) -> Option<&'static str> {
        self.registry.step(index).and_then(|step| {
            step.fields
                .iter()
                .map(|field| field.name)
                .find(|name| self.is_visible(name))
        })
    }

    /// Validates every visible field of step `index`, then its step rules.
    /// Errors for the step are replaced with the outcome of this call.
    pub fn validate(&mut self, index: usize) -> Result<(), StepError> {
        let Some(step) = self.registry.step(index) else {
            return Ok(());
        };

        let mut failures: Vec<FieldError> = step
            .fields
            .iter()
            .filter(|field| self.is_visible(field.name))
            .filter_map(|field| {
                let required = self.is_required(field);
                self.validator
                    .validate(field, self.session.value(field.name), required)
                    .into_result()
                    .err()
            })
            .collect();

        if failures.is_empty() {
            for rule in &step.rules {
                if let StepRule::MinLength { field, min, message } = rule {
                    if self.session.text(field).chars().count() < *min {
                        failures.push(FieldError::new(*field, *message));
                    }
                }
            }
        }

        for field in &step.fields {
            self.errors.remove(field.name);
        }
        for failure in &failures {
            self.errors.insert(failure.field.clone(), failure.message.clone());
        }

        if failures.is_empty() {
            Ok(())
        } else {
            debug!("Step {} blocked by {} field(s)", index, failures.len());
            Err(StepError::Invalid(failures))
        }
    }

    fn ensure_editing(&self) -> Result<(), StepError> {
        if self.registry.is_empty() {
            return Err(StepError::NoSteps);
        }
        match self.phase {
            Phase::Editing => Ok(()),
            Phase::Submitting => Err(StepError::SubmissionInFlight),
            Phase::Submitted => Err(StepError::AlreadySubmitted),
            Phase::Closed => Err(StepError::SessionClosed),
        }
    }

    pub fn advance(&mut self) -> Result<usize, StepError> {
        self.ensure_editing()?;
        let current = self.session.current_step;
        if current + 1 >= self.session.total_steps {
            return Err(StepError::LastStep);
        }
        self.validate(current)?;
        self.enter_step(current + 1);
        Ok(current + 1)
    }

    /// Never validates. Returns false when there is nowhere to go back to.
    pub fn retreat(&mut self) -> bool {
        if self.ensure_editing().is_err() || self.session.current_step == 0 {
            return false;
        }
        self.enter_step(self.session.current_step - 1);
        true
    }

    fn enter_step(&mut self, index: usize) {
        self.session.current_step = index;
        self.focus_request = self.first_visible_field(index);
        self.persistence.save(&self.storage_key, &self.session.snapshot());
        debug!("Entered consultation step {}/{}", index + 1, self.session.total_steps);
    }

    pub fn attach_brief(&mut self, brief: Option<BriefAttachment>) -> Result<(), FieldError> {
        self.errors.remove(BRIEF_FIELD);
        self.brief = None;
        let Some(brief) = brief else {
            return Ok(());
        };
        if let Err(e) = brief.validate() {
            self.errors.insert(e.field.clone(), e.message.clone());
            return Err(e);
        }
        self.session.touch(Utc::now());
        self.brief = Some(brief);
        Ok(())
    }

    fn payload(&self) -> BTreeMap<String, String> {
        let mut payload = self.session.snapshot();
        if let Some(brief) = &self.brief {
            payload.insert(BRIEF_FIELD.to_string(), brief.name.clone());
        }
        payload.insert("timestamp".to_string(), Utc::now().to_rfc3339());
        payload.insert("referrer".to_string(), self.referrer.clone());
        payload
    }

    /// Locks the submit control and hands out the single in-flight call.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, StepError> {
        self.ensure_editing()?;
        let current = self.session.current_step;
        if current + 1 != self.session.total_steps {
            return Err(StepError::NotOnLastStep);
        }
        self.validate(current)?;

        self.phase = Phase::Submitting;
        Ok(PendingSubmission {
            payload: self.payload(),
            gateway: Rc::clone(&self.gateway),
            liveness: self.session.liveness.clone(),
        })
    }

    pub fn finish_submission(&mut self, done: CompletedSubmission) -> SubmissionStatus {
        if !done.liveness.is_alive()
            || !done.liveness.same_session(&self.session.liveness)
            || self.phase != Phase::Submitting
        {
            debug!("Dropping submission result for a closed session");
            return SubmissionStatus::Discarded;
        }

        match done.result {
            Ok(receipt) => {
                info!("Consultation request accepted as {}", receipt.id);
                self.session.values.clear();
                self.errors.clear();
                self.brief = None;
                self.persistence.clear(&self.storage_key);
                self.phase = Phase::Submitted;
                SubmissionStatus::Accepted(receipt)
            }
            Err(e) => {
                error!("Form submission error: {}", e);
                self.phase = Phase::Editing;
                SubmissionStatus::Rejected(e)
            }
        }
    }

    #[cfg(test)]
    pub async fn submit(&mut self) -> Result<SubmissionStatus, StepError> {
        let pending = self.begin_submission()?;
        let done = pending.send().await;
        Ok(self.finish_submission(done))
    }

    /// Tear-down: any result still in flight will be discarded.
    pub fn close(&mut self) {
        self.session.liveness.end();
        self.phase = Phase::Closed;
    }

    pub fn start_new_session(&mut self) {
        self.session.liveness.end();
        self.session = FormSession::new(self.registry.len());
        self.errors.clear();
        self.brief = None;
        self.resumed = false;
        self.phase = Phase::Editing;
        self.focus_request = self.first_visible_field(0);
    }

    pub fn steps(&self) -> Vec<Step> {
        self.registry
            .steps()
            .iter()
            .enumerate()
            .map(|(index, step)| Step {
                index,
                required_field_names: step
                    .fields
                    .iter()
                    .filter(|field| self.is_visible(field.name) && self.is_required(field))
                    .map(|field| field.name.to_string())
                    .collect(),
                is_active: index == self.session.current_step,
            })
            .collect()
    }

    pub fn controls(&self) -> Controls {
        let last = self.session.current_step + 1 >= self.session.total_steps;
        Controls {
            show_prev: self.session.current_step > 0,
            show_next: !last,
            show_submit: last,
            submit_enabled: self.phase == Phase::Editing,
        }
    }

    pub fn progress_percent(&self) -> f64 {
        (self.session.current_step + 1) as f64 / self.session.total_steps as f64 * 100.0
    }

    pub fn take_focus_request(&mut self) -> Option<&'static str> {
        self.focus_request.take()
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn current_step(&self) -> usize {
        self.session.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.session.total_steps
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn text(&self, name: &str) -> &str {
        self.session.text(name)
    }

    pub fn error_for(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn brief(&self) -> Option<&BriefAttachment> {
        self.brief.as_ref()
    }

    /// True when a saved snapshot with contact details was restored.
    pub fn resumed(&self) -> bool {
        self.resumed
    }

    /// Leaving only prompts while the request is still being edited or sent.
    pub fn update_leave_guard(&self, guard: &LeaveGuard) {
        match self.phase {
            Phase::Editing | Phase::Submitting => guard.sync(&self.session),
            Phase::Submitted | Phase::Closed => guard.disarm(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use futures::executor::block_on;

    use super::*;
    use crate::consultation::persistence::MemoryPersistence;
    use crate::consultation::validation::RuleValidator;

    /// Replays queued outcomes and records every payload it receives.
    #[derive(Default)]
    struct ScriptedGateway {
        outcomes: RefCell<VecDeque<Result<SubmissionReceipt, SubmissionError>>>,
        received: RefCell<Vec<BTreeMap<String, String>>>,
    }

    impl ScriptedGateway {
        fn with(outcomes: Vec<Result<SubmissionReceipt, SubmissionError>>) -> Rc<Self> {
            Rc::new(Self {
                outcomes: RefCell::new(outcomes.into()),
                received: RefCell::default(),
            })
        }
    }

    #[async_trait(?Send)]
    impl SubmissionGateway for ScriptedGateway {
        async fn submit(&self, payload: BTreeMap<String, String>) -> Result<SubmissionReceipt, SubmissionError> {
            self.received.borrow_mut().push(payload);
            self.outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(SubmissionError::new("no scripted outcome")))
        }
    }

    fn receipt(id: &str) -> Result<SubmissionReceipt, SubmissionError> {
        Ok(SubmissionReceipt { id: id.to_string() })
    }

    fn controller_with(
        store: Rc<MemoryPersistence>,
        gateway: Rc<ScriptedGateway>,
        prefill: &BTreeMap<String, String>,
    ) -> StepController {
        StepController::new(
            StepRegistry::consultation(),
            Rc::new(RuleValidator),
            store,
            gateway,
            prefill,
        )
    }

    fn controller() -> StepController {
        controller_with(
            Rc::new(MemoryPersistence::new()),
            ScriptedGateway::with(vec![]),
            &BTreeMap::new(),
        )
    }

    fn set(c: &mut StepController, name: &str, value: &str) {
        c.set_field(name, FieldValue::text(value));
    }

    fn fill_contact(c: &mut StepController) {
        set(c, "name", "Ana Souza");
        set(c, "email", "ana@x.com");
        set(c, "service-interest", "brand-identity");
    }

    fn fill_project(c: &mut StepController) {
        set(c, "project-description", &"A refreshed identity for our bakery chain. ".repeat(2));
        set(c, "budget-range", "10k-25k");
        set(c, "timeline", "flexible");
    }

    fn fill_wrap_up(c: &mut StepController) {
        c.set_field("privacy-consent", FieldValue::Flag(true));
    }

    fn on_last_step() -> (StepController, Rc<MemoryPersistence>, Rc<ScriptedGateway>) {
        let store = Rc::new(MemoryPersistence::new());
        let gateway = ScriptedGateway::with(vec![receipt("consultation_1")]);
        let mut c = controller_with(store.clone(), gateway.clone(), &BTreeMap::new());
        fill_contact(&mut c);
        c.advance().unwrap();
        fill_project(&mut c);
        c.advance().unwrap();
        fill_wrap_up(&mut c);
        (c, store, gateway)
    }

    #[test]
    fn test_invalid_email_blocks_first_step() {
        let mut c = controller();
        assert_eq!(c.total_steps(), 3);
        set(&mut c, "name", "Ana");
        set(&mut c, "email", "not-an-email");
        set(&mut c, "service-interest", "brand-identity");

        let err = c.advance().unwrap_err();
        assert_eq!(c.current_step(), 0);
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(c.error_for("email"), Some("Please enter a valid email address"));
    }

    #[test]
    fn test_short_description_reports_minimum() {
        let mut c = controller();
        fill_contact(&mut c);
        c.advance().unwrap();

        set(&mut c, "project-description", "0123456789");
        set(&mut c, "budget-range", "5k-10k");
        set(&mut c, "timeline", "asap");

        assert!(c.advance().is_err());
        assert_eq!(c.current_step(), 1);
        let message = c.error_for("project-description").unwrap();
        assert!(message.contains("50 characters"), "{}", message);
    }

    #[test]
    fn test_every_empty_required_field_blocks() {
        let mut c = controller();
        let err = c.advance().unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "service-interest"]);
        assert_eq!(c.current_step(), 0);
    }

    #[test]
    fn test_error_replaced_on_revalidation() {
        let mut c = controller();
        set(&mut c, "email", "nope");
        let _ = c.advance();
        assert_eq!(c.error_for("email"), Some("Please enter a valid email address"));

        set(&mut c, "email", "");
        assert_eq!(c.error_for("email"), None, "editing clears the error");
        let _ = c.advance();
        assert_eq!(c.error_for("email"), Some("This field is required"));
    }

    #[test]
    fn test_retreat_ignores_validity_and_keeps_values() {
        let mut c = controller();
        fill_contact(&mut c);
        c.advance().unwrap();
        set(&mut c, "project-description", "too short");
        let before = c.session().values.clone();

        assert!(c.retreat());
        assert_eq!(c.current_step(), 0);
        assert_eq!(c.session().values, before);
    }

    #[test]
    fn test_retreat_from_first_step_is_noop() {
        let mut c = controller();
        set(&mut c, "name", "Ana");
        let before = c.session().values.clone();
        assert!(!c.retreat());
        assert_eq!(c.current_step(), 0);
        assert_eq!(c.session().values, before);
    }

    #[test]
    fn test_controls_and_progress_follow_position() {
        let mut c = controller();
        let controls = c.controls();
        assert!(!controls.show_prev && controls.show_next && !controls.show_submit);
        assert!((c.progress_percent() - 100.0 / 3.0).abs() < 1e-9);

        fill_contact(&mut c);
        c.advance().unwrap();
        assert!((c.progress_percent() - 200.0 / 3.0).abs() < 1e-9);

        fill_project(&mut c);
        c.advance().unwrap();
        let controls = c.controls();
        assert!(controls.show_prev && !controls.show_next && controls.show_submit);
        assert!(controls.submit_enabled);
        assert_eq!(c.progress_percent(), 100.0);
        assert_eq!(c.advance(), Err(StepError::LastStep));
    }

    #[test]
    fn test_exactly_one_step_is_active() {
        let mut c = controller();
        fill_contact(&mut c);
        c.advance().unwrap();
        let active: Vec<_> = c.steps().iter().filter(|s| s.is_active).map(|s| s.index).collect();
        assert_eq!(active, vec![1]);
    }

    #[test]
    fn test_focus_moves_to_first_field_of_new_step() {
        let mut c = controller();
        assert_eq!(c.take_focus_request(), Some("name"));
        assert_eq!(c.take_focus_request(), None);
        fill_contact(&mut c);
        c.advance().unwrap();
        assert_eq!(c.take_focus_request(), Some("project-description"));
    }

    #[test]
    fn test_project_type_required_only_for_build_services() {
        let mut c = controller();
        set(&mut c, "name", "Ana");
        set(&mut c, "email", "ana@x.com");
        set(&mut c, "service-interest", "web-design");

        assert!(c.is_visible("project-type"));
        assert!(c.steps()[0].required_field_names.contains("project-type"));
        let err = c.advance().unwrap_err();
        assert_eq!(err.field_errors()[0].field, "project-type");

        set(&mut c, "project-type", "web-app");
        assert_eq!(c.advance(), Ok(1));
    }

    #[test]
    fn test_service_change_clears_project_type() {
        let mut c = controller();
        set(&mut c, "service-interest", "ecommerce");
        set(&mut c, "project-type", "online-store");
        set(&mut c, "service-interest", "brand-identity");

        assert_eq!(c.text("project-type"), "");
        assert!(!c.is_visible("project-type"));
        assert!(!c.steps()[0].required_field_names.contains("project-type"));
    }

    #[test]
    fn test_select_validates_on_change() {
        let mut c = controller();
        let result = c.set_field("budget-range", FieldValue::text("a-lot")).unwrap();
        assert!(!result.is_valid);
        assert_eq!(c.error_for("budget-range"), Some("Please choose a valid option"));
        assert!(c.set_field("name", FieldValue::text("Ana")).is_none());
    }

    #[test]
    fn test_advance_persists_snapshot() {
        let store = Rc::new(MemoryPersistence::new());
        let mut c = controller_with(store.clone(), ScriptedGateway::with(vec![]), &BTreeMap::new());
        fill_contact(&mut c);
        assert!(store.load(config::PROGRESS_STORAGE_KEY).is_none());

        c.advance().unwrap();
        let saved = store.load(config::PROGRESS_STORAGE_KEY).unwrap();
        assert_eq!(saved.get("email").map(String::as_str), Some("ana@x.com"));
    }

    #[test]
    fn test_snapshot_round_trip_into_new_controller() {
        let store = Rc::new(MemoryPersistence::new());
        let mut first = controller_with(store.clone(), ScriptedGateway::with(vec![]), &BTreeMap::new());
        fill_contact(&mut first);
        set(&mut first, "company", "Bakery Co");
        first.advance().unwrap();
        let saved_values = first.session().values.clone();

        let second = controller_with(store, ScriptedGateway::with(vec![]), &BTreeMap::new());
        assert_eq!(second.current_step(), 0);
        assert_eq!(second.session().values, saved_values);
        assert_eq!(second.text("phone"), "");
        assert!(second.resumed());
    }

    #[test]
    fn test_restore_fills_known_fields_only() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("name".into(), "Ana".into());
        snapshot.insert("email".into(), "ana@x.com".into());
        snapshot.insert("favourite-color".into(), "teal".into());
        let store = Rc::new(MemoryPersistence::with_snapshot(config::PROGRESS_STORAGE_KEY, snapshot));

        let c = controller_with(store, ScriptedGateway::with(vec![]), &BTreeMap::new());
        assert_eq!(c.current_step(), 0);
        assert_eq!(c.text("name"), "Ana");
        assert_eq!(c.text("email"), "ana@x.com");
        assert_eq!(c.session().values.len(), 2);
        assert!(c.session().value("favourite-color").is_none());
        assert!(c.resumed());
    }

    #[test]
    fn test_prefill_runs_change_path() {
        let mut prefill = BTreeMap::new();
        prefill.insert("service-interest".to_string(), "ecommerce".to_string());
        prefill.insert("project-type".to_string(), "online-store".to_string());
        prefill.insert("budget-range".to_string(), "no-such-budget".to_string());
        prefill.insert("utm_source".to_string(), "newsletter".to_string());

        let c = controller_with(
            Rc::new(MemoryPersistence::new()),
            ScriptedGateway::with(vec![]),
            &prefill,
        );
        assert_eq!(c.text("service-interest"), "ecommerce");
        assert_eq!(c.text("project-type"), "online-store", "set after its controller");
        assert_eq!(c.error_for("budget-range"), Some("Please choose a valid option"));
        assert!(c.session().value("utm_source").is_none());
        assert_eq!(c.current_step(), 0);
    }

    #[test]
    fn test_successful_submission_reaches_submitted() {
        let (mut c, store, gateway) = on_last_step();
        assert!(store.contains(config::PROGRESS_STORAGE_KEY));

        let status = block_on(c.submit()).unwrap();
        assert_eq!(status, SubmissionStatus::Accepted(SubmissionReceipt { id: "consultation_1".into() }));
        assert_eq!(c.phase(), Phase::Submitted);
        assert!(c.session().values.is_empty());
        assert!(!store.contains(config::PROGRESS_STORAGE_KEY));
        assert!(!c.controls().submit_enabled);

        let sent = &gateway.received.borrow()[0];
        assert_eq!(sent.get("email").map(String::as_str), Some("ana@x.com"));
        assert!(sent.contains_key("timestamp"));

        assert_eq!(c.begin_submission().err(), Some(StepError::AlreadySubmitted));
        c.start_new_session();
        assert_eq!(c.phase(), Phase::Editing);
        assert_eq!(c.current_step(), 0);
        assert!(c.controls().submit_enabled);
    }

    #[test]
    fn test_only_one_submission_in_flight() {
        let (mut c, _, _) = on_last_step();
        let pending = c.begin_submission().unwrap();
        assert!(!c.controls().submit_enabled);
        assert_eq!(c.begin_submission().err(), Some(StepError::SubmissionInFlight));
        assert!(!c.retreat());

        let done = block_on(pending.send());
        assert!(matches!(c.finish_submission(done), SubmissionStatus::Accepted(_)));
    }

    #[test]
    fn test_failed_submission_keeps_state_and_reenables() {
        let store = Rc::new(MemoryPersistence::new());
        let gateway = ScriptedGateway::with(vec![Err(SubmissionError::new("server down")), receipt("ok")]);
        let mut c = controller_with(store.clone(), gateway, &BTreeMap::new());
        fill_contact(&mut c);
        c.advance().unwrap();
        fill_project(&mut c);
        c.advance().unwrap();
        fill_wrap_up(&mut c);

        let status = block_on(c.submit()).unwrap();
        assert_eq!(status, SubmissionStatus::Rejected(SubmissionError::new("server down")));
        assert_eq!(c.phase(), Phase::Editing);
        assert!(c.controls().submit_enabled);
        assert_eq!(c.text("email"), "ana@x.com");
        assert!(store.contains(config::PROGRESS_STORAGE_KEY));

        assert!(matches!(block_on(c.submit()).unwrap(), SubmissionStatus::Accepted(_)));
    }

    #[test]
    fn test_submission_needs_last_step_and_valid_fields() {
        let mut c = controller();
        assert_eq!(c.begin_submission().err(), Some(StepError::NotOnLastStep));

        let (mut c, _, gateway) = on_last_step();
        c.set_field("privacy-consent", FieldValue::Flag(false));
        assert!(matches!(c.begin_submission(), Err(StepError::Invalid(_))));
        assert_eq!(c.phase(), Phase::Editing);
        assert!(gateway.received.borrow().is_empty());
    }

    #[test]
    fn test_result_after_close_is_discarded() {
        let (mut c, store, _) = on_last_step();
        let pending = c.begin_submission().unwrap();
        c.close();

        let done = block_on(pending.send());
        assert_eq!(c.finish_submission(done), SubmissionStatus::Discarded);
        assert_eq!(c.phase(), Phase::Closed);
        assert!(store.contains(config::PROGRESS_STORAGE_KEY));
    }

    #[test]
    fn test_result_from_previous_session_is_discarded() {
        let (mut c, _, _) = on_last_step();
        let pending = c.begin_submission().unwrap();
        c.start_new_session();
        set(&mut c, "name", "Bo");

        let done = block_on(pending.send());
        assert_eq!(c.finish_submission(done), SubmissionStatus::Discarded);
        assert_eq!(c.text("name"), "Bo");
    }

    #[test]
    fn test_brief_attachment_rules() {
        let mut c = controller();
        let bad = BriefAttachment {
            name: "photo.png".into(),
            size: 100,
            mime: "image/png".into(),
        };
        assert!(c.attach_brief(Some(bad)).is_err());
        assert!(c.error_for(BRIEF_FIELD).is_some());
        assert!(c.brief().is_none());

        let good = BriefAttachment {
            name: "brief.pdf".into(),
            size: 100,
            mime: "application/pdf".into(),
        };
        assert!(c.attach_brief(Some(good)).is_ok());
        assert!(c.error_for(BRIEF_FIELD).is_none());
        assert_eq!(c.brief().map(|b| b.name.as_str()), Some("brief.pdf"));
    }

    #[test]
    fn test_empty_registry_is_inert() {
        let mut c = StepController::new(
            StepRegistry::from_steps(vec![StepSpec::new("ghost", vec![])]),
            Rc::new(RuleValidator),
            Rc::new(MemoryPersistence::new()),
            ScriptedGateway::with(vec![]),
            &BTreeMap::new(),
        );
        assert_eq!(c.total_steps(), 1);
        assert_eq!(c.validate(0), Ok(()));
        assert_eq!(c.advance(), Err(StepError::NoSteps));
        assert!(!c.retreat());
        assert!(c.take_focus_request().is_none());
        assert!(c.steps().is_empty());
    }

    #[test]
    fn test_empty_registry_never_reaches_gateway() {
        let gateway = ScriptedGateway::with(vec![receipt("ghost")]);
        let store = Rc::new(MemoryPersistence::new());
        let mut c = StepController::new(
            StepRegistry::from_steps(vec![StepSpec::new("ghost", vec![])]),
            Rc::new(RuleValidator),
            store.clone(),
            gateway.clone(),
            &BTreeMap::new(),
        );

        assert!(matches!(c.begin_submission(), Err(StepError::NoSteps)));
        assert!(matches!(block_on(c.submit()), Err(StepError::NoSteps)));
        assert!(gateway.received.borrow().is_empty());
        assert_eq!(c.phase(), Phase::Editing);
        assert!(!store.contains(config::PROGRESS_STORAGE_KEY));
    }

    #[test]
    fn test_leave_warning_stops_after_submission() {
        let (mut c, _, _) = on_last_step();
        let guard = LeaveGuard::default();
        c.update_leave_guard(&guard);
        assert!(guard.should_warn(Utc::now()));

        block_on(c.submit()).unwrap();
        c.update_leave_guard(&guard);
        assert!(!guard.should_warn(Utc::now()));
    }

    #[test]
    fn test_leave_warning_off_after_close() {
        let mut c = controller();
        set(&mut c, "name", "Ana");
        let guard = LeaveGuard::default();
        c.update_leave_guard(&guard);
        assert!(guard.should_warn(Utc::now()));

        c.close();
        c.update_leave_guard(&guard);
        assert!(!guard.should_warn(Utc::now()));
    }

    #[test]
    fn test_restore_drops_retired_select_options() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("budget-range".into(), "15k-25k".into());
        snapshot.insert("timeline".into(), "flexible".into());
        let store = Rc::new(MemoryPersistence::with_snapshot(config::PROGRESS_STORAGE_KEY, snapshot));

        let c = controller_with(store, ScriptedGateway::with(vec![]), &BTreeMap::new());
        assert_eq!(c.text("budget-range"), "");
        assert!(c.session().value("budget-range").is_none());
        assert_eq!(c.text("timeline"), "flexible");
    }
}
