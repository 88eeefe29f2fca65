use serde::Serialize;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::animations::StatCounter;
use crate::components::lead_form::{LeadFormKind, LeadFormView};
use crate::Route;

/// Query string understood by the consultation page.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ConsultationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl ConsultationQuery {
    pub fn service(service: &str) -> Self {
        Self { service: Some(service.to_string()), ..Default::default() }
    }

    pub fn package(package: &str) -> Self {
        Self { package: Some(package.to_string()), ..Default::default() }
    }
}

struct ServiceCard {
    id: &'static str,
    title: &'static str,
    blurb: &'static str,
}

const SERVICES: &[ServiceCard] = &[
    ServiceCard {
        id: "web-design",
        title: "Web Design & Development",
        blurb: "Fast, accessible websites built to convert visitors into customers.",
    },
    ServiceCard {
        id: "brand-identity",
        title: "Brand Identity",
        blurb: "Logos, type and color systems that make you recognizable everywhere.",
    },
    ServiceCard {
        id: "digital-strategy",
        title: "Digital Strategy",
        blurb: "Research-backed roadmaps for growth, content and search.",
    },
    ServiceCard {
        id: "ecommerce",
        title: "E-commerce",
        blurb: "Online stores that are easy to run and pleasant to buy from.",
    },
];

struct PackageCard {
    id: &'static str,
    name: &'static str,
    price: &'static str,
    features: &'static [&'static str],
    featured: bool,
}

const PACKAGES: &[PackageCard] = &[
    PackageCard {
        id: "starter",
        name: "Starter",
        price: "From $5,000",
        features: &["Up to 5 pages", "Responsive design", "Basic SEO setup"],
        featured: false,
    },
    PackageCard {
        id: "growth",
        name: "Growth",
        price: "From $10,000",
        features: &["Custom design system", "CMS integration", "Analytics and reporting"],
        featured: true,
    },
    PackageCard {
        id: "enterprise",
        name: "Enterprise",
        price: "From $50,000",
        features: &["Web applications", "Integrations and APIs", "Dedicated team"],
        featured: false,
    },
];

#[function_component(Home)]
pub fn home() -> Html {
    html! {
        <div class="home-page">
            <section class="hero">
                <h1>{"Websites and brands that grow your business"}</h1>
                <p>{"WebDev NexServ designs, builds and launches digital products for ambitious small teams."}</p>
                <div class="hero-cta">
                    <Link<Route> to={Route::Consultation} classes="btn btn-primary">
                        {"Get a free consultation"}
                    </Link<Route>>
                    <Link<Route> to={Route::Work} classes="btn btn-secondary">
                        {"See our work"}
                    </Link<Route>>
                </div>
            </section>

            <section class="stats">
                <StatCounter target={150} label="Projects delivered" suffix="+" />
                <StatCounter target={98} label="Client satisfaction" suffix="%" />
                <StatCounter target={12} label="Years in business" />
                <StatCounter target={24} label="Hour response time" />
            </section>

            <section class="services" id="services">
                <h2>{"What we do"}</h2>
                <div class="service-grid">
                    { for SERVICES.iter().map(|service| html! {
                        <div class="service-card">
                            <h3>{service.title}</h3>
                            <p>{service.blurb}</p>
                            <Link<Route, ConsultationQuery>
                                to={Route::Consultation}
                                query={Some(ConsultationQuery::service(service.id))}
                                classes="service-link"
                            >
                                {"Start a project"}
                            </Link<Route, ConsultationQuery>>
                        </div>
                    }) }
                </div>
            </section>

            <section class="packages" id="pricing">
                <h2>{"Packages"}</h2>
                <div class="package-grid">
                    { for PACKAGES.iter().map(|package| html! {
                        <div class={classes!("package-card", package.featured.then_some("featured"))}>
                            <h3>{package.name}</h3>
                            <p class="package-price">{package.price}</p>
                            <ul>
                                { for package.features.iter().map(|f| html! { <li>{*f}</li> }) }
                            </ul>
                            <Link<Route, ConsultationQuery>
                                to={Route::Consultation}
                                query={Some(ConsultationQuery::package(package.id))}
                                classes="btn btn-primary"
                            >
                                {"Choose "}{package.name}
                            </Link<Route, ConsultationQuery>>
                        </div>
                    }) }
                </div>
            </section>

            <section class="newsletter" id="newsletter">
                <h2>{"Stay in the loop"}</h2>
                <p>{"Occasional notes on design, development and growth. No spam."}</p>
                <LeadFormView kind={LeadFormKind::Newsletter} />
            </section>

            <style>
                {r#"
                .newsletter {
                    max-width: 600px;
                    margin: 0 auto;
                    padding: 4rem 2rem;
                    text-align: center;
                }
                .home-page {
                    padding-top: 74px;
                }
                .hero {
                    text-align: center;
                    padding: 8rem 2rem 4rem;
                }
                .hero-cta {
                    display: flex;
                    gap: 1rem;
                    justify-content: center;
                    margin-top: 2rem;
                }
                .stats {
                    display: flex;
                    flex-wrap: wrap;
                    justify-content: center;
                    gap: 3rem;
                    padding: 3rem 2rem;
                    border-top: 2px solid #000;
                    border-bottom: 2px solid #000;
                }
                .stat {
                    display: flex;
                    flex-direction: column;
                    align-items: center;
                }
                .stat-number {
                    font-size: 2.5rem;
                    font-weight: 700;
                }
                .services, .packages {
                    max-width: 1100px;
                    margin: 0 auto;
                    padding: 4rem 2rem;
                }
                .service-grid, .package-grid {
                    display: grid;
                    grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
                    gap: 1.5rem;
                }
                .service-card, .package-card {
                    border: 2px solid #000;
                    border-radius: 8px;
                    padding: 1.5rem;
                }
                .package-card.featured {
                    background: #000;
                    color: #fff;
                }
                @media (max-width: 768px) {
                    .hero-cta {
                        flex-direction: column;
                    }
                }
                "#}
            </style>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consultation::hints::{package_budget, SERVICE_OPTIONS};

    #[test]
    fn test_service_cards_use_form_options() {
        for card in SERVICES {
            assert!(SERVICE_OPTIONS.iter().any(|(value, _)| *value == card.id), "{}", card.id);
        }
    }

    #[test]
    fn test_every_package_maps_to_a_budget() {
        for card in PACKAGES {
            assert!(package_budget(card.id).is_some(), "{}", card.id);
        }
    }

    #[test]
    fn test_query_skips_missing_keys() {
        let json = serde_json::to_string(&ConsultationQuery::service("ecommerce")).unwrap();
        assert_eq!(json, r#"{"service":"ecommerce"}"#);
    }
}
