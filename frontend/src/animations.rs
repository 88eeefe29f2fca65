use yew::prelude::*;
use gloo_timers::callback::Interval;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Element;

const COUNTER_DURATION_MS: f64 = 2000.0;
const FRAME_MS: u32 = 16;
/// Share of the counter that must be on screen before it starts.
const COUNTER_START_FRACTION: f64 = 0.5;

/// Quadratic ease-out: `t` elapsed, `b` start, `c` change, `d` duration.
pub fn ease_out_quad(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = (t / d).clamp(0.0, 1.0);
    -c * t * (t - 2.0) + b
}

pub fn counter_value(target: u32, elapsed_ms: f64, duration_ms: f64) -> u32 {
    if elapsed_ms >= duration_ms {
        return target;
    }
    ease_out_quad(elapsed_ms, 0.0, target as f64, duration_ms).floor() as u32
}

/// Fraction of an element spanning `top..bottom` (viewport coordinates)
/// that lies inside a viewport of the given height.
pub fn visible_fraction(top: f64, bottom: f64, viewport_height: f64) -> f64 {
    let height = bottom - top;
    if height <= 0.0 {
        return 0.0;
    }
    let shown = bottom.min(viewport_height) - top.max(0.0);
    (shown / height).clamp(0.0, 1.0)
}

fn in_view(element: &Element) -> bool {
    let viewport_height = web_sys::window()
        .and_then(|w| w.inner_height().ok())
        .and_then(|h| h.as_f64())
        .unwrap_or_default();
    let rect = element.get_bounding_client_rect();
    visible_fraction(rect.top(), rect.bottom(), viewport_height) >= COUNTER_START_FRACTION
}

#[derive(Properties, PartialEq)]
pub struct StatCounterProps {
    pub target: u32,
    pub label: AttrValue,
    #[prop_or_default]
    pub prefix: AttrValue,
    #[prop_or_default]
    pub suffix: AttrValue,
}

/// Counts up from zero once half of it has scrolled into view.
#[function_component(StatCounter)]
pub fn stat_counter(props: &StatCounterProps) -> Html {
    let elapsed = use_state(|| 0.0f64);
    let started = use_state_eq(|| false);
    let node = use_node_ref();

    {
        let started = started.clone();
        let node = node.clone();
        use_effect_with_deps(
            move |_| {
                let window = web_sys::window();
                let check_now = move || {
                    if node.cast::<Element>().map_or(false, |element| in_view(&element)) {
                        started.set(true);
                    }
                };
                // Counters already on screen at load start right away
                check_now();
                let check = Closure::wrap(Box::new(check_now) as Box<dyn FnMut()>);

                if let Some(window) = window.as_ref() {
                    let _ = window.add_event_listener_with_callback("scroll", check.as_ref().unchecked_ref());
                }

                move || {
                    if let Some(window) = window {
                        let _ = window.remove_event_listener_with_callback("scroll", check.as_ref().unchecked_ref());
                    }
                }
            },
            (),
        );
    }

    {
        let elapsed = elapsed.clone();
        use_effect_with_deps(
            move |started: &bool| {
                let interval = started.then(|| {
                    let mut ticks = 0u32;
                    Interval::new(FRAME_MS, move || {
                        ticks = ticks.saturating_add(1);
                        let ms = ticks as f64 * FRAME_MS as f64;
                        if ms <= COUNTER_DURATION_MS + FRAME_MS as f64 {
                            elapsed.set(ms);
                        }
                    })
                });
                move || drop(interval)
            },
            *started,
        );
    }

    let value = counter_value(props.target, *elapsed, COUNTER_DURATION_MS);
    html! {
        <div class="stat" ref={node}>
            <span class="stat-number">{format!("{}{}{}", props.prefix, value, props.suffix)}</span>
            <span class="stat-label">{props.label.clone()}</span>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_quad_endpoints() {
        assert_eq!(ease_out_quad(0.0, 0.0, 100.0, 1000.0), 0.0);
        assert_eq!(ease_out_quad(1000.0, 0.0, 100.0, 1000.0), 100.0);
        assert_eq!(ease_out_quad(500.0, 0.0, 100.0, 1000.0), 75.0);
    }

    #[test]
    fn test_counter_reaches_target() {
        assert_eq!(counter_value(150, 0.0, 2000.0), 0);
        assert_eq!(counter_value(150, 1000.0, 2000.0), 112);
        assert_eq!(counter_value(150, 2500.0, 2000.0), 150);
    }

    #[test]
    fn test_visible_fraction() {
        assert_eq!(visible_fraction(100.0, 200.0, 800.0), 1.0);
        assert_eq!(visible_fraction(750.0, 850.0, 800.0), 0.5);
        assert_eq!(visible_fraction(-75.0, 25.0, 800.0), 0.25);
        assert_eq!(visible_fraction(900.0, 1000.0, 800.0), 0.0);
        assert_eq!(visible_fraction(10.0, 10.0, 800.0), 0.0);
    }

    #[test]
    fn test_counter_starts_at_half_visible() {
        assert!(visible_fraction(750.0, 850.0, 800.0) >= COUNTER_START_FRACTION);
        assert!(visible_fraction(760.0, 860.0, 800.0) < COUNTER_START_FRACTION);
    }
}
