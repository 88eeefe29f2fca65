
use log::warn;

use crate::consultation::hints;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    TextArea,
    Select,
    Checkbox,
}

impl FieldKind {
    /// The `type` attribute used when the field renders as an `<input>`.
    pub fn input_type(&self) -> &'static str {
        match self {
            FieldKind::Email => "email",
            FieldKind::Phone => "tel",
            FieldKind::Checkbox => "checkbox",
            _ => "text",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    /// (value, label) pairs for select fields.
    pub options: Vec<(&'static str, &'static str)>,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            min_len: None,
            max_len: None,
            options: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    pub fn options(mut self, options: &[(&'static str, &'static str)]) -> Self {
        self.options = options.to_vec();
        self
    }

    pub fn allows_option(&self, value: &str) -> bool {
        self.options.iter().any(|(v, _)| *v == value)
    }
}

/// Checks a step applies on top of the per-field rules.
#[derive(Clone, Debug, PartialEq)]
pub enum StepRule {
    /// Runs only once every field in the step already passed.
    MinLength {
        field: &'static str,
        min: usize,
        message: &'static str,
    },
    /// `field` is shown and required only while `controller` holds one of `values`.
    RequiredWhen {
        field: &'static str,
        controller: &'static str,
        values: &'static [&'static str],
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct StepSpec {
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
    pub rules: Vec<StepRule>,
}

impl StepSpec {
    pub fn new(title: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self {
            title,
            fields,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: StepRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Conditional rule governing `field`, if any.
    pub fn condition_for(&self, field: &str) -> Option<&StepRule> {
        self.rules.iter().find(|rule| {
            matches!(rule, StepRule::RequiredWhen { field: f, .. } if *f == field)
        })
    }
}

/// Ordered list of steps, built once when the form is constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct StepRegistry {
    steps: Vec<StepSpec>,
}

impl StepRegistry {
    /// Steps without any fields have nothing to bind to and are skipped.
    pub fn from_steps(steps: Vec<StepSpec>) -> Self {
        let steps = steps
            .into_iter()
            .filter(|step| {
                if step.fields.is_empty() {
                    warn!("Skipping form step '{}' with no fields", step.title);
                    false
                } else {
                    true
                }
            })
            .collect();
        Self { steps }
    }

    pub fn consultation() -> Self {
        let contact = StepSpec::new(
            "Tell us about you",
            vec![
                FieldSpec::new("name", "Full name", FieldKind::Text).required().min_len(2).max_len(100),
                FieldSpec::new("email", "Email address", FieldKind::Email).required(),
                FieldSpec::new("phone", "Phone number", FieldKind::Phone),
                FieldSpec::new("company", "Company", FieldKind::Text).max_len(100),
                FieldSpec::new("service-interest", "Service you're interested in", FieldKind::Select)
                    .required()
                    .options(hints::SERVICE_OPTIONS),
                FieldSpec::new("project-type", "Project type", FieldKind::Select)
                    .options(hints::PROJECT_TYPE_OPTIONS),
            ],
        )
        .with_rule(StepRule::RequiredWhen {
            field: "project-type",
            controller: "service-interest",
            values: hints::SERVICES_WITH_PROJECT_TYPE,
        });

        let project = StepSpec::new(
            "Your project",
            vec![
                FieldSpec::new("project-description", "Project description", FieldKind::TextArea)
                    .required()
                    .max_len(500),
                FieldSpec::new("target-audience", "Target audience", FieldKind::TextArea).max_len(300),
                FieldSpec::new("budget-range", "Budget range", FieldKind::Select)
                    .required()
                    .options(hints::BUDGET_OPTIONS),
                FieldSpec::new("timeline", "Timeline", FieldKind::Select)
                    .required()
                    .options(hints::TIMELINE_OPTIONS),
            ],
        )
        .with_rule(StepRule::MinLength {
            field: "project-description",
            min: 50,
            message: "Please provide at least 50 characters for the project description",
        });

        let wrap_up = StepSpec::new(
            "Almost done",
            vec![
                FieldSpec::new("referral-source", "How did you hear about us?", FieldKind::Select)
                    .options(hints::REFERRAL_OPTIONS),
                FieldSpec::new("additional-notes", "Anything else?", FieldKind::TextArea).max_len(1000),
                FieldSpec::new("newsletter", "Send me the occasional newsletter", FieldKind::Checkbox),
                FieldSpec::new("privacy-consent", "I agree to the privacy policy", FieldKind::Checkbox)
                    .required(),
            ],
        );

        Self::from_steps(vec![contact, project, wrap_up])
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&StepSpec> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.steps
            .iter()
            .flat_map(|step| step.fields.iter())
            .find(|field| field.name == name)
    }

    /// Index of the step that owns `name`.
    pub fn step_of(&self, name: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|step| step.fields.iter().any(|field| field.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consultation_registry_layout() {
        let registry = StepRegistry::consultation();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.step_of("email"), Some(0));
        assert_eq!(registry.step_of("project-description"), Some(1));
        assert_eq!(registry.step_of("privacy-consent"), Some(2));
        assert_eq!(registry.step_of("unknown"), None);
        assert!(registry.field("budget-range").map(|f| f.allows_option("10k-25k")).unwrap_or(false));
    }

    #[test]
    fn test_empty_steps_are_dropped() {
        let registry = StepRegistry::from_steps(vec![
            StepSpec::new("empty", vec![]),
            StepSpec::new("real", vec![FieldSpec::new("name", "Name", FieldKind::Text)]),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.step(0).map(|s| s.title), Some("real"));
    }

    #[test]
    fn test_condition_lookup() {
        let registry = StepRegistry::consultation();
        let step = registry.step(0).unwrap();
        assert!(step.condition_for("project-type").is_some());
        assert!(step.condition_for("email").is_none());
    }
}
