use log::{debug, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, KeyboardEvent, MouseEvent};
use yew::prelude::*;
use yew::Properties;

pub const INITIAL_VISIBLE: usize = 8;
pub const LOAD_MORE_STEP: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Project {
    pub title: &'static str,
    pub description: &'static str,
    pub categories: &'static [&'static str],
    pub tags: &'static [&'static str],
    /// Consultation service this project maps to.
    pub service: &'static str,
    pub images: &'static [&'static str],
}

impl Project {
    fn in_category(&self, filter: &str) -> bool {
        filter == "all" || self.categories.contains(&filter)
    }

    fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
    }
}

pub fn similar_project_href(service: &str) -> String {
    format!("/consultation?service={}", urlencoding::encode(service))
}

pub const FILTERS: &[(&str, &str)] = &[
    ("all", "All"),
    ("web", "Web"),
    ("branding", "Branding"),
    ("ecommerce", "E-commerce"),
    ("strategy", "Strategy"),
];

pub const PROJECTS: &[Project] = &[
    Project {
        title: "Harbor Coffee Roasters",
        description: "Online store with subscriptions and a wholesale portal.",
        categories: &["ecommerce", "web"],
        tags: &["Shopify", "Subscriptions"],
        service: "ecommerce",
        images: &["/assets/work/harbor-1.jpg", "/assets/work/harbor-2.jpg", "/assets/work/harbor-3.jpg"],
    },
    Project {
        title: "Northwind Legal",
        description: "Marketing site and client intake flow for a regional law firm.",
        categories: &["web"],
        tags: &["Rust", "Accessibility"],
        service: "web-design",
        images: &["/assets/work/northwind-1.jpg", "/assets/work/northwind-2.jpg"],
    },
    Project {
        title: "Fernleaf Studio",
        description: "Full rebrand with logo system, typography and packaging.",
        categories: &["branding"],
        tags: &["Identity", "Packaging"],
        service: "brand-identity",
        images: &["/assets/work/fernleaf-1.jpg", "/assets/work/fernleaf-2.jpg"],
    },
    Project {
        title: "Summit Outdoor Co.",
        description: "Growth roadmap and analytics overhaul ahead of a product launch.",
        categories: &["strategy"],
        tags: &["Analytics", "SEO"],
        service: "digital-strategy",
        images: &["/assets/work/summit-1.jpg"],
    },
    Project {
        title: "Pixel & Pine",
        description: "Portfolio site for a design collective with a custom CMS.",
        categories: &["web", "branding"],
        tags: &["CMS", "Animation"],
        service: "multiple",
        images: &["/assets/work/pixel-1.jpg", "/assets/work/pixel-2.jpg"],
    },
    Project {
        title: "Bloom Botanicals",
        description: "Headless storefront with local delivery scheduling.",
        categories: &["ecommerce"],
        tags: &["Headless", "Stripe"],
        service: "ecommerce",
        images: &["/assets/work/bloom-1.jpg", "/assets/work/bloom-2.jpg"],
    },
    Project {
        title: "Ledgerly",
        description: "Dashboard web application for small business bookkeeping.",
        categories: &["web"],
        tags: &["Web App", "Charts"],
        service: "web-design",
        images: &["/assets/work/ledgerly-1.jpg", "/assets/work/ledgerly-2.jpg"],
    },
    Project {
        title: "Atlas Fitness",
        description: "Brand identity and membership landing pages for a gym chain.",
        categories: &["branding", "web"],
        tags: &["Identity", "Landing Page"],
        service: "multiple",
        images: &["/assets/work/atlas-1.jpg"],
    },
    Project {
        title: "Cedar & Stone",
        description: "Content strategy and editorial calendar for a home goods brand.",
        categories: &["strategy"],
        tags: &["Content", "Social"],
        service: "digital-strategy",
        images: &["/assets/work/cedar-1.jpg"],
    },
    Project {
        title: "Velo Works",
        description: "Bike shop store with service booking and inventory sync.",
        categories: &["ecommerce", "web"],
        tags: &["Booking", "Inventory"],
        service: "ecommerce",
        images: &["/assets/work/velo-1.jpg", "/assets/work/velo-2.jpg"],
    },
    Project {
        title: "Lumen Dental",
        description: "Redesigned patient site with online appointment requests.",
        categories: &["web"],
        tags: &["Redesign", "Healthcare"],
        service: "web-design",
        images: &["/assets/work/lumen-1.jpg"],
    },
    Project {
        title: "Marigold Kitchen",
        description: "Visual identity and menu design for a new restaurant group.",
        categories: &["branding"],
        tags: &["Identity", "Print"],
        service: "brand-identity",
        images: &["/assets/work/marigold-1.jpg", "/assets/work/marigold-2.jpg"],
    },
];

/// Filter, search and pagination state for the project grid.
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioBoard {
    filter: String,
    query: String,
    revealed: usize,
}

impl Default for PortfolioBoard {
    fn default() -> Self {
        Self {
            filter: "all".to_string(),
            query: String::new(),
            revealed: INITIAL_VISIBLE,
        }
    }
}

impl PortfolioBoard {
    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: &str) {
        if self.filter != filter {
            self.filter = filter.to_string();
            self.revealed = INITIAL_VISIBLE;
        }
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    fn candidates<'a>(&'a self, projects: &'a [Project]) -> impl Iterator<Item = (usize, &'a Project)> + 'a {
        projects
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.in_category(&self.filter) && p.matches(&self.query))
    }

    /// Indices into `projects` that are currently on screen.
    pub fn visible(&self, projects: &[Project]) -> Vec<usize> {
        self.candidates(projects)
            .take(self.revealed)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn has_more(&self, projects: &[Project]) -> bool {
        self.candidates(projects).count() > self.revealed
    }

    pub fn load_more(&mut self) {
        self.revealed += LOAD_MORE_STEP;
    }
}

/// Image carousel inside the project modal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gallery {
    index: usize,
    len: usize,
}

impl Gallery {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    pub fn go_to(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }
}

#[derive(Properties, PartialEq)]
struct ProjectModalProps {
    project: Project,
    on_close: Callback<()>,
}

#[function_component(ProjectModal)]
fn project_modal(props: &ProjectModalProps) -> Html {
    let gallery = use_state(|| Gallery::new(props.project.images.len()));

    {
        let on_close = props.on_close.clone();
        use_effect_with_deps(
            move |_| {
                let listener = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    if e.key() == "Escape" {
                        on_close.emit(());
                    }
                }) as Box<dyn FnMut(KeyboardEvent)>);
                let document = web_sys::window().and_then(|w| w.document());
                if let Some(document) = document.as_ref() {
                    let _ = document
                        .add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref());
                }
                move || {
                    if let Some(document) = document {
                        let _ = document
                            .remove_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref());
                    }
                }
            },
            (),
        );
    }

    let step = |forward: bool| {
        let gallery = gallery.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = *gallery;
            if forward {
                next.next();
            } else {
                next.prev();
            }
            gallery.set(next);
        })
    };

    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    let project = props.project;
    let current = project.images.get(gallery.index()).copied().unwrap_or_default();

    html! {
        <div class="project-modal" role="dialog" aria-modal="true" aria-label={project.title}>
            <div class="modal-content">
                <button type="button" class="modal-close" aria-label="Close" onclick={close}>{"×"}</button>
                <div class="modal-gallery">
                    <img src={current} alt={project.title} />
                    if project.images.len() > 1 {
                        <button type="button" class="gallery-prev" aria-label="Previous image" onclick={step(false)}>{"‹"}</button>
                        <button type="button" class="gallery-next" aria-label="Next image" onclick={step(true)}>{"›"}</button>
                        <div class="gallery-dots">
                            { for (0..project.images.len()).map(|i| {
                                let gallery = gallery.clone();
                                let active = gallery.index() == i;
                                let onclick = Callback::from(move |_: MouseEvent| {
                                    let mut next = *gallery;
                                    next.go_to(i);
                                    gallery.set(next);
                                });
                                html! {
                                    <button type="button" class={classes!("gallery-dot", active.then_some("active"))} {onclick}></button>
                                }
                            }) }
                        </div>
                    }
                </div>
                <h2>{project.title}</h2>
                <p>{project.description}</p>
                <ul class="project-tags">
                    { for project.tags.iter().map(|tag| html! { <li>{*tag}</li> }) }
                </ul>
                <a class="btn btn-primary" href={similar_project_href(project.service)}>
                    {"Start Similar Project"}
                </a>
            </div>
        </div>
    }
}

#[function_component(Work)]
pub fn work() -> Html {
    let board = use_state(PortfolioBoard::default);
    let selected = use_state(|| None::<usize>);

    let visible = board.visible(PROJECTS);
    let has_more = board.has_more(PROJECTS);

    let oninput = {
        let board = board.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*board).clone();
            next.set_query(&input.value());
            board.set(next);
        })
    };

    let load_more = {
        let board = board.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*board).clone();
            next.load_more();
            debug!("Portfolio showing up to {} projects", next.revealed);
            board.set(next);
        })
    };

    let close_modal = {
        let selected = selected.clone();
        Callback::from(move |_| selected.set(None))
    };

    html! {
        <div class="work-page">
            <section class="work-hero">
                <h1>{"Our Work"}</h1>
                <p>{"A selection of websites, brands and strategies we've shipped"}</p>
            </section>

            <section class="work-controls">
                <div class="filter-buttons">
                    { for FILTERS.iter().map(|(id, label)| {
                        let board = board.clone();
                        let active = board.filter() == *id;
                        let onclick = Callback::from(move |_: MouseEvent| {
                            info!("Portfolio filter: {}", id);
                            let mut next = (*board).clone();
                            next.set_filter(id);
                            board.set(next);
                        });
                        html! {
                            <button type="button" class={classes!("filter-btn", active.then_some("active"))} {onclick}>{*label}</button>
                        }
                    }) }
                </div>
                <input
                    class="portfolio-search"
                    type="search"
                    placeholder="Search projects..."
                    {oninput}
                />
            </section>

            <section class="portfolio-grid">
                if visible.is_empty() {
                    <p class="no-results">{"No projects match your search."}</p>
                }
                { for visible.iter().map(|&index| {
                    let project = PROJECTS[index];
                    let onclick = {
                        let selected = selected.clone();
                        Callback::from(move |_: MouseEvent| selected.set(Some(index)))
                    };
                    html! {
                        <article class="portfolio-item" key={index} {onclick}>
                            <img src={project.images.first().copied().unwrap_or_default()} alt={project.title} loading="lazy" />
                            <h3>{project.title}</h3>
                            <p>{project.description}</p>
                        </article>
                    }
                }) }
            </section>

            if has_more {
                <div class="load-more">
                    <button type="button" class="btn btn-secondary" onclick={load_more}>{"Load more"}</button>
                </div>
            }

            if let Some(project) = selected.and_then(|index| PROJECTS.get(index).copied()) {
                <ProjectModal {project} on_close={close_modal} />
            }

            <style>
                {r#"
                .work-page {
                    padding-top: 74px;
                    min-height: 100vh;
                }
                .work-hero {
                    text-align: center;
                    padding: 6rem 2rem 3rem;
                }
                .work-controls {
                    max-width: 1100px;
                    margin: 0 auto;
                    display: flex;
                    flex-wrap: wrap;
                    justify-content: space-between;
                    gap: 1rem;
                    padding: 0 2rem;
                }
                .filter-btn.active {
                    background: #000;
                    color: #fff;
                }
                .portfolio-grid {
                    max-width: 1100px;
                    margin: 2rem auto;
                    display: grid;
                    grid-template-columns: repeat(auto-fill, minmax(250px, 1fr));
                    gap: 1.5rem;
                    padding: 0 2rem;
                }
                .portfolio-item {
                    cursor: pointer;
                    border: 2px solid #000;
                    border-radius: 8px;
                    overflow: hidden;
                }
                .portfolio-item img {
                    width: 100%;
                    aspect-ratio: 4 / 3;
                    object-fit: cover;
                }
                .load-more {
                    text-align: center;
                    margin-bottom: 4rem;
                }
                .project-modal {
                    position: fixed;
                    inset: 0;
                    background: rgba(0, 0, 0, 0.7);
                    display: flex;
                    align-items: center;
                    justify-content: center;
                    z-index: 2000;
                }
                .modal-content {
                    position: relative;
                    background: #fff;
                    max-width: 720px;
                    width: 90%;
                    padding: 2rem;
                    border-radius: 12px;
                }
                .modal-gallery img {
                    width: 100%;
                }
                .gallery-dot.active {
                    background: #000;
                }
                "#}
            </style>
        </div>
    }
}
