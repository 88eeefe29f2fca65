use std::collections::BTreeMap;

pub const SERVICE_OPTIONS: &[(&str, &str)] = &[
    ("web-design", "Web Design & Development"),
    ("brand-identity", "Brand Identity"),
    ("digital-strategy", "Digital Strategy"),
    ("ecommerce", "E-commerce"),
    ("multiple", "Multiple services"),
    ("not-sure", "Not sure yet"),
];

pub const PROJECT_TYPE_OPTIONS: &[(&str, &str)] = &[
    ("new-website", "New website"),
    ("redesign", "Redesign of an existing site"),
    ("web-app", "Web application"),
    ("online-store", "Online store"),
    ("landing-page", "Landing page"),
];

pub const BUDGET_OPTIONS: &[(&str, &str)] = &[
    ("5k-10k", "$5,000 - $10,000"),
    ("10k-25k", "$10,000 - $25,000"),
    ("25k-50k", "$25,000 - $50,000"),
    ("50k-100k", "$50,000 - $100,000"),
    ("100k+", "$100,000+"),
    ("discuss", "Let's discuss"),
];

pub const TIMELINE_OPTIONS: &[(&str, &str)] = &[
    ("asap", "As soon as possible"),
    ("1-2-months", "1-2 months"),
    ("3-6-months", "3-6 months"),
    ("6-months+", "6+ months"),
    ("flexible", "Flexible"),
];

pub const REFERRAL_OPTIONS: &[(&str, &str)] = &[
    ("search", "Search engine"),
    ("social", "Social media"),
    ("referral", "Friend or colleague"),
    ("portfolio", "Saw your work"),
    ("other", "Other"),
];

/// Services that need a project type. Product may extend this list.
pub const SERVICES_WITH_PROJECT_TYPE: &[&str] = &["web-design", "ecommerce", "multiple"];

pub fn description_placeholder(service: &str) -> &'static str {
    match service {
        "web-design" => "Describe the website you want to build, key features, design preferences, and main goals...",
        "brand-identity" => "Tell us about your brand vision, target audience, competitors, and what makes you unique...",
        "digital-strategy" => "Explain your business goals, current challenges, target market, and what success looks like...",
        "ecommerce" => "Describe your products, target customers, desired features, and any specific platform preferences...",
        "multiple" => "Tell us about all the services you need and how they should work together...",
        _ => "Describe your business goals and challenges, and we'll help identify the best solutions...",
    }
}

pub fn budget_info(budget: &str) -> Option<&'static str> {
    match budget {
        "5k-10k" => Some("Suitable for simple websites and basic brand identity packages."),
        "10k-25k" => Some("Ideal for professional websites with custom features and comprehensive branding."),
        "25k-50k" => Some("Perfect for complex web applications, e-commerce platforms, and complete brand systems."),
        "50k-100k" => Some("Great for enterprise-level solutions and multi-faceted digital projects."),
        "100k+" => Some("Designed for large-scale digital transformations and custom platform development."),
        "discuss" => Some("We're flexible and can work with various budget ranges. Let's discuss what's possible."),
        _ => None,
    }
}

pub fn timeline_info(timeline: &str) -> Option<&'static str> {
    match timeline {
        "asap" => Some("We'll prioritize your project and start as soon as possible (2-4 week kickoff)."),
        "1-2-months" => Some("Standard timeline for most projects with proper planning and execution."),
        "3-6-months" => Some("Ideal for complex projects requiring extensive research and development."),
        "6-months+" => Some("Suitable for enterprise projects with multiple phases and iterations."),
        "flexible" => Some("We can work around your schedule and prioritize based on your needs."),
        _ => None,
    }
}

/// Pricing package names link straight into a budget bracket.
pub fn package_budget(package: &str) -> Option<&'static str> {
    match package {
        "starter" => Some("5k-10k"),
        "growth" => Some("10k-25k"),
        "enterprise" => Some("50k-100k"),
        _ => None,
    }
}

/// Translates landing-page query parameters into form field values.
pub fn prefill_from_query(
    service: Option<&str>,
    package: Option<&str>,
    project_type: Option<&str>,
) -> BTreeMap<String, String> {
    let mut prefill = BTreeMap::new();
    if let Some(service) = service.filter(|s| !s.is_empty()) {
        prefill.insert("service-interest".to_string(), service.to_string());
    }
    if let Some(budget) = package.and_then(package_budget) {
        prefill.insert("budget-range".to_string(), budget.to_string());
    }
    if let Some(project_type) = project_type.filter(|s| !s.is_empty()) {
        prefill.insert("project-type".to_string(), project_type.to_string());
    }
    prefill
}

#[derive(Clone, Debug, PartialEq)]
pub struct CharacterCounter {
    pub count: usize,
    pub max: Option<usize>,
    pub hint: Option<&'static str>,
}

impl CharacterCounter {
    pub fn for_field(field: &str, value: &str) -> Option<Self> {
        let (max, hint) = match field {
            "project-description" => (Some(500), Some("minimum 50 characters")),
            "target-audience" => (Some(300), None),
            _ => return None,
        };
        Some(Self {
            count: value.chars().count(),
            max,
            hint,
        })
    }

    pub fn over_limit(&self) -> bool {
        self.max.map_or(false, |max| self.count > max)
    }

    pub fn label(&self) -> String {
        let hint = self.hint.map(|h| format!("{} • ", h)).unwrap_or_default();
        match self.max {
            Some(max) => format!("{}{} / {}", hint, self.count, max),
            None => format!("{}{} characters", hint, self.count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefill_maps_package_to_budget() {
        let prefill = prefill_from_query(Some("ecommerce"), Some("growth"), None);
        assert_eq!(prefill.get("service-interest").map(String::as_str), Some("ecommerce"));
        assert_eq!(prefill.get("budget-range").map(String::as_str), Some("10k-25k"));
        assert!(!prefill.contains_key("project-type"));
    }

    #[test]
    fn test_prefill_ignores_unknown_package() {
        let prefill = prefill_from_query(None, Some("platinum"), Some(""));
        assert!(prefill.is_empty());
    }

    #[test]
    fn test_package_budgets_are_real_options() {
        for package in ["starter", "growth", "enterprise"] {
            let budget = package_budget(package).unwrap();
            assert!(BUDGET_OPTIONS.iter().any(|(v, _)| *v == budget), "{}", budget);
        }
    }

    #[test]
    fn test_character_counter() {
        let counter = CharacterCounter::for_field("target-audience", &"x".repeat(301)).unwrap();
        assert!(counter.over_limit());
        assert_eq!(counter.label(), "301 / 300");

        let counter = CharacterCounter::for_field("project-description", "hello").unwrap();
        assert!(!counter.over_limit());
        assert_eq!(counter.label(), "minimum 50 characters • 5 / 500");

        assert!(CharacterCounter::for_field("name", "Ana").is_none());
    }

    #[test]
    fn test_unknown_service_falls_back_to_generic_placeholder() {
        assert_eq!(description_placeholder("zzz"), description_placeholder("not-sure"));
        assert!(budget_info("").is_none());
        assert!(timeline_info("asap").is_some());
    }
}
