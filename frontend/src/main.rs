use yew::prelude::*;
use yew_router::prelude::*;
use log::{info, Level};
use web_sys::{HtmlElement, KeyboardEvent, MouseEvent};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

mod config;
mod animations;
mod navigation;
mod components {
    pub mod notification;
    pub mod lead_form;
}
mod consultation {
    pub mod fields;
    pub mod hints;
    pub mod session;
    pub mod errors;
    pub mod validation;
    pub mod persistence;
    pub mod gateway;
    pub mod brief;
    pub mod controller;
    pub mod form;
}
mod pages {
    pub mod home;
    pub mod faq;
    pub mod work;
    pub mod consultation;
}

use navigation::{is_active_link, progress_visible, scroll_progress, HeaderState, HeaderTracker};
use pages::{
    home::Home,
    faq::Faq,
    work::Work,
    consultation::Consultation,
};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/consultation")]
    Consultation,
    #[at("/faqs")]
    Faq,
    #[at("/works")]
    Work,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => {
            info!("Rendering Home page");
            html! { <Home /> }
        },
        Route::Consultation => {
            info!("Rendering Consultation page");
            html! { <Consultation /> }
        },
        Route::Faq => {
            info!("Rendering FAQ page");
            html! { <Faq /> }
        },
        Route::Work => {
            info!("Rendering Work page");
            html! { <Work /> }
        },
        Route::NotFound => {
            info!("Unknown route, showing Home page");
            html! { <Home /> }
        },
    }
}

fn viewport_width(window: &web_sys::Window) -> f64 {
    window
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or_default()
}

const NAV_LINKS: &[(Route, &str)] = &[
    (Route::Home, "Home"),
    (Route::Work, "Work"),
    (Route::Faq, "FAQ"),
];

#[function_component(Nav)]
pub fn nav() -> Html {
    let menu_open = use_state(|| false);
    let header = use_state(HeaderState::default);
    let progress = use_state(|| (0.0f64, false));
    let nav_ref = use_node_ref();
    let location = use_location();

    {
        let header = header.clone();
        let progress = progress.clone();
        let nav_ref = nav_ref.clone();
        use_effect_with_deps(move |_| {
            let window = web_sys::window();
            let mut tracker = HeaderTracker::default();

            let scroll_callback = {
                let window = window.clone();
                Closure::wrap(Box::new(move || {
                    let Some(window) = window.as_ref() else { return };
                    let header_height = nav_ref
                        .cast::<HtmlElement>()
                        .map(|el| el.offset_height() as f64)
                        .unwrap_or_default();
                    let scroll_y = window.scroll_y().unwrap_or_default();
                    let next = tracker.on_scroll(scroll_y, viewport_width(window), header_height);
                    if next != *header {
                        header.set(next);
                    }
                    if let Some(root) = window.document().and_then(|d| d.document_element()) {
                        let percent = scroll_progress(
                            scroll_y,
                            root.scroll_height() as f64,
                            root.client_height() as f64,
                        );
                        progress.set((percent, progress_visible(scroll_y)));
                    }
                }) as Box<dyn FnMut()>)
            };

            if let Some(window) = window.as_ref() {
                let _ = window.add_event_listener_with_callback("scroll", scroll_callback.as_ref().unchecked_ref());
            }

            move || {
                if let Some(window) = window {
                    let _ = window.remove_event_listener_with_callback("scroll", scroll_callback.as_ref().unchecked_ref());
                }
            }
        }, ());
    }

    // Escape and widening past the breakpoint both close the mobile menu
    {
        let menu_open = menu_open.clone();
        use_effect_with_deps(move |_| {
            let window = web_sys::window();

            let keydown_callback = {
                let menu_open = menu_open.clone();
                Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    if e.key() == "Escape" {
                        menu_open.set(false);
                    }
                }) as Box<dyn FnMut(KeyboardEvent)>)
            };

            let resize_callback = {
                let window = window.clone();
                Closure::wrap(Box::new(move || {
                    if let Some(window) = window.as_ref() {
                        if viewport_width(window) > config::MOBILE_BREAKPOINT_PX {
                            menu_open.set(false);
                        }
                    }
                }) as Box<dyn FnMut()>)
            };

            if let Some(window) = window.as_ref() {
                let _ = window.add_event_listener_with_callback("keydown", keydown_callback.as_ref().unchecked_ref());
                let _ = window.add_event_listener_with_callback("resize", resize_callback.as_ref().unchecked_ref());
            }

            move || {
                if let Some(window) = window {
                    let _ = window.remove_event_listener_with_callback("keydown", keydown_callback.as_ref().unchecked_ref());
                    let _ = window.remove_event_listener_with_callback("resize", resize_callback.as_ref().unchecked_ref());
                }
            }
        }, ());
    }

    let toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            menu_open.set(!*menu_open);
        })
    };

    let close_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| {
            menu_open.set(false);
        })
    };

    let (path, hash) = location
        .as_ref()
        .map(|l| (l.path().to_string(), l.hash().to_string()))
        .unwrap_or_else(|| ("/".to_string(), String::new()));

    let menu_class = if *menu_open {
        "nav-right mobile-menu-open"
    } else {
        "nav-right"
    };

    let (percent, visible) = *progress;
    let progress_style = format!(
        "position: fixed; top: 0; left: 0; height: 3px; background: #000; z-index: 9999; \
         transition: width 0.1s ease, opacity 0.2s ease; width: {:.1}%; opacity: {};",
        percent,
        if visible { 1 } else { 0 }
    );

    html! {
        <>
        <div class="scroll-progress" style={progress_style}></div>
        <nav
            ref={nav_ref}
            class={classes!("top-nav", header.scrolled.then_some("scrolled"), header.hidden.then_some("nav-hidden"))}
        >
            <div class="nav-content">
                <Link<Route> to={Route::Home} classes="nav-logo">
                    {"WebDev NexServ"}
                </Link<Route>>

                <button type="button"
                    class="burger-menu"
                    aria-label="Toggle menu"
                    aria-expanded={menu_open.to_string()}
                    onclick={toggle_menu}
                >
                    <span></span>
                    <span></span>
                    <span></span>
                </button>
                <div class={menu_class}>
                    { for NAV_LINKS.iter().map(|(route, label)| {
                        let active = is_active_link(&route.to_path(), &path, &hash);
                        html! {
                            <div onclick={close_menu.clone()}>
                                <Link<Route>
                                    to={route.clone()}
                                    classes={classes!("nav-link", active.then_some("active"))}
                                >
                                    {*label}
                                </Link<Route>>
                            </div>
                        }
                    }) }
                    <div onclick={close_menu.clone()}>
                        <Link<Route> to={Route::Consultation} classes="nav-cta">
                            {"Get a Consultation"}
                        </Link<Route>>
                    </div>
                </div>
            </div>
        </nav>
        </>
    }
}

#[function_component]
fn App() -> Html {
    html! {
        <BrowserRouter>
            <Nav />
            <Switch<Route> render={switch} />
        </BrowserRouter>
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    let _ = console_log::init_with_level(Level::Info);

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}
