use std::cell::RefCell;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::config::{LANDING_EXIT_MS, LANDING_PARTICLES, PREDICT_PATH};

const ENTER_BUTTON_CLASS: &str = "enter-button";

/// One floating background particle. All values come from `[0, 1)` samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Particle {
    pub left_pct: f64,
    pub delay_s: f64,
    pub duration_s: f64,
}

impl Particle {
    pub fn from_samples(left: f64, delay: f64, duration: f64) -> Self {
        Self {
            left_pct: left * 100.0,
            delay_s: delay * 15.0,
            duration_s: 10.0 + duration * 10.0,
        }
    }

    fn random() -> Self {
        use js_sys::Math::random;
        Self::from_samples(random(), random(), random())
    }

    fn style(&self) -> String {
        format!(
            "left: {:.2}%; animation-delay: {:.2}s; animation-duration: {:.2}s;",
            self.left_pct, self.delay_s, self.duration_s
        )
    }
}

/// Hero-panel tilt for a pointer at `(x, y)`, both as fractions of the viewport.
pub(crate) fn parallax_transform(x: f64, y: f64) -> String {
    format!(
        "perspective(1000px) rotateY({}deg) rotateX({}deg)",
        (x - 0.5) * 5.0 + 0.0,
        (y - 0.5) * -5.0 + 0.0
    )
}

fn navigate_to(path: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(e) = window.location().set_href(path) {
        web_sys::console::error_1(&format!("Navigation to {path} failed: {e:?}").into());
    }
}

struct KeydownBinding {
    document: web_sys::Document,
    _handler: Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

fn unbind_keydown() {
    KEYDOWN_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old.document.remove_event_listener_with_callback(
                "keydown",
                old._handler.as_ref().unchecked_ref(),
            );
        }
    });
}

#[component]
pub fn Landing() -> impl IntoView {
    let visible = RwSignal::new(false);
    let leaving = RwSignal::new(false);
    let tilt = RwSignal::new(String::new());
    let particles: Vec<Particle> = (0..LANDING_PARTICLES).map(|_| Particle::random()).collect();

    let enter = move || {
        if leaving.get_untracked() {
            return;
        }
        leaving.set(true);
        spawn_local(async move {
            TimeoutFuture::new(LANDING_EXIT_MS).await;
            navigate_to(PREDICT_PATH);
        });
    };

    // Fade the page in once mounted.
    Effect::new(move || {
        spawn_local(async move {
            TimeoutFuture::new(100).await;
            visible.set(true);
        });
    });

    // Enter/Space anywhere enters, unless the button itself has focus
    // (its own activation already fires a click).
    Effect::new(move || {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        unbind_keydown();

        let handler =
            Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                let key = e.key();
                if key != "Enter" && key != " " {
                    return;
                }
                let button_focused = web_sys::window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.active_element())
                    .is_some_and(|el| {
                        el.class_name()
                            .split_whitespace()
                            .any(|c| c == ENTER_BUTTON_CLASS)
                    });
                if !button_focused {
                    enter();
                }
            });

        if document
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(KeydownBinding {
                    document: document.clone(),
                    _handler: handler,
                });
            });
        }
        on_cleanup(unbind_keydown);
    });

    let on_pointer_move = move |e: web_sys::MouseEvent| {
        let Some(window) = web_sys::window() else {
            return;
        };
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        tilt.set(parallax_transform(
            f64::from(e.client_x()) / w,
            f64::from(e.client_y()) / h,
        ));
    };

    view! {
        <div
            style="min-height: 100vh; position: relative; overflow: hidden; background: radial-gradient(circle at 50% 30%, #1a1a2e 0%, #0a0e27 70%); color: #e0e6ff; font-family: 'Inter', sans-serif; display: flex; align-items: center; justify-content: center; transition: opacity 1s ease-in;"
            style:opacity=move || if visible.get() { "1" } else { "0" }
            on:mousemove=on_pointer_move
        >
            <div class="particles" style="position: absolute; inset: 0; pointer-events: none;">
                {particles
                    .into_iter()
                    .map(|p| view! { <div class="particle" style=p.style()></div> })
                    .collect_view()}
            </div>
            <div
                class="container"
                style="position: relative; z-index: 1; max-width: 960px; padding: 48px 24px; text-align: center; transition: opacity 0.5s ease-out, transform 0.5s ease-out;"
                style:opacity=move || if leaving.get() { "0" } else { "1" }
                style:transform=move || if leaving.get() { "scale(0.95)" } else { "scale(1)" }
            >
                <div
                    class="holographic-screen"
                    style="padding: 48px 32px; border-radius: 24px; background: rgba(255, 255, 255, 0.04); border: 1px solid rgba(0, 245, 255, 0.25); box-shadow: 0 0 60px rgba(0, 245, 255, 0.15); transition: transform 0.1s ease-out;"
                    style:transform=move || tilt.get()
                >
                    <h1 style="margin: 0 0 12px; font-size: 3rem; letter-spacing: 0.04em; background: linear-gradient(135deg, #00f5ff, #7b2ff7); -webkit-background-clip: text; background-clip: text; color: transparent;">
                        "House Price Predictor"
                    </h1>
                    <p style="margin: 0 0 32px; color: #9aa4d4; font-size: 1.1rem;">
                        "Estimate property prices across India from a handful of details and a pin on the map."
                    </p>
                    <div style="display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 16px; margin-bottom: 36px;">
                        <FeatureCard title="Map picker" body="Drop a pin or search an address to fill in the location." />
                        <FeatureCard title="Instant estimate" body="The model answers in milliseconds." />
                        <FeatureCard title="Indian units" body="Prices shown in lakh and crore." />
                    </div>
                    <button
                        class=ENTER_BUTTON_CLASS
                        style="padding: 16px 48px; font-size: 1.1rem; font-weight: 600; color: #0a0e27; background: linear-gradient(135deg, #00f5ff, #7b2ff7); border: none; border-radius: 999px; cursor: pointer; box-shadow: 0 0 30px rgba(0, 245, 255, 0.4); transition: transform 0.15s ease-out;"
                        style:transform=move || if leaving.get() { "scale(0.95)" } else { "scale(1)" }
                        on:click=move |e| {
                            e.prevent_default();
                            e.stop_propagation();
                            enter();
                        }
                    >
                        "Enter System"
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
fn FeatureCard(title: &'static str, body: &'static str) -> impl IntoView {
    let hovered = RwSignal::new(false);
    view! {
        <div
            class="feature-card"
            style="padding: 20px; border-radius: 16px; background: rgba(10, 14, 39, 0.6); border: 1px solid rgba(123, 47, 247, 0.3); text-align: left; transition: transform 0.2s ease-out;"
            style:transform=move || {
                if hovered.get() { "translateY(-10px) scale(1.02)" } else { "translateY(0) scale(1)" }
            }
            on:mouseenter=move |_| hovered.set(true)
            on:mouseleave=move |_| hovered.set(false)
        >
            <h3 style="margin: 0 0 8px; color: #00f5ff; font-size: 1rem;">{title}</h3>
            <p style="margin: 0; color: #9aa4d4; font-size: 0.9rem;">{body}</p>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_ranges() {
        let low = Particle::from_samples(0.0, 0.0, 0.0);
        assert_eq!(low.left_pct, 0.0);
        assert_eq!(low.delay_s, 0.0);
        assert_eq!(low.duration_s, 10.0);

        let high = Particle::from_samples(0.999, 0.999, 0.999);
        assert!(high.left_pct < 100.0);
        assert!(high.delay_s < 15.0);
        assert!(high.duration_s < 20.0);
    }

    #[test]
    fn particle_style_is_css() {
        let p = Particle::from_samples(0.5, 0.2, 0.5);
        assert_eq!(
            p.style(),
            "left: 50.00%; animation-delay: 3.00s; animation-duration: 15.00s;"
        );
    }

    #[test]
    fn parallax_is_flat_at_center() {
        assert_eq!(
            parallax_transform(0.5, 0.5),
            "perspective(1000px) rotateY(0deg) rotateX(0deg)"
        );
    }

    #[test]
    fn parallax_tilts_toward_pointer() {
        assert_eq!(
            parallax_transform(1.0, 0.0),
            "perspective(1000px) rotateY(2.5deg) rotateX(2.5deg)"
        );
    }
}
