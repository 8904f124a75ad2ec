use std::cell::RefCell;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use house_price_shared::format_inr;
use house_price_shared::payload::{
    ADDRESS, BHK_NO, BHK_OR_RK, LATITUDE, LONGITUDE, POSTED_BY, RERA, READY_TO_MOVE, RESALE,
    SQUARE_FT, UNDER_CONSTRUCTION,
};
use house_price_shared::{PredictionResponse, SubmitError};

use crate::animation::CountUp;
use crate::config::{
    ADDRESS_INPUT_ID, COUNT_UP_DURATION_MS, MAP_CONTAINER_ID, RESULT_REVEAL_DELAY_MS,
    api_base_url,
};
use crate::form::{self, SubmitPhase};
use crate::health;
use crate::map::{CoordinateFields, MapAdapter};
use crate::render_loop::FrameLoop;
use crate::time_format::format_inference_ms;

const BORDER_IDLE: &str = "rgba(0, 245, 255, 0.25)";
const BORDER_ERROR: &str = "#ef4444";

const POSTED_BY_OPTIONS: &[&str] = &["Owner", "Dealer", "Builder"];
const BHK_OR_RK_OPTIONS: &[&str] = &["BHK", "RK"];

const INPUT_STYLE: &str = "width: 100%; box-sizing: border-box; padding: 12px 14px; background: rgba(10, 14, 39, 0.7); color: #e0e6ff; border: 1px solid rgba(0, 245, 255, 0.25); border-radius: 10px; font-size: 0.95rem; outline: none; transition: border-color 0.2s;";
const LABEL_STYLE: &str = "display: block; margin-bottom: 6px; color: #9aa4d4; font-size: 0.85rem; letter-spacing: 0.02em;";
const CARD_STYLE: &str = "padding: 28px; border-radius: 20px; background: rgba(255, 255, 255, 0.04); border: 1px solid rgba(0, 245, 255, 0.2); box-shadow: 0 0 40px rgba(0, 245, 255, 0.08);";

thread_local! {
    static PAGE_MAP: RefCell<Option<MapAdapter>> = const { RefCell::new(None) };
    static COUNT_UP: RefCell<Option<FrameLoop>> = const { RefCell::new(None) };
}

fn with_map(f: impl FnOnce(&MapAdapter)) {
    let adapter = PAGE_MAP.with(|slot| slot.borrow().clone());
    if let Some(adapter) = adapter {
        f(&adapter);
    }
}

/// Whether a field should show the error border after losing focus.
pub(crate) fn needs_error_border(required: bool, value: &str) -> bool {
    required && value.is_empty()
}

/// Replacement for a typed negative quantity, if any.
pub(crate) fn non_negative_replacement(value: &str) -> Option<&'static str> {
    match value.trim().parse::<f64>() {
        Ok(n) if n < 0.0 => Some("0"),
        _ => None,
    }
}

/// The focused control as `(element, value, required)`.
fn field_of(
    target: Option<web_sys::EventTarget>,
) -> Option<(web_sys::HtmlElement, String, bool)> {
    let target = target?;
    if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
        return Some((input.clone().into(), input.value(), input.required()));
    }
    let select = target.dyn_ref::<web_sys::HtmlSelectElement>()?;
    Some((select.clone().into(), select.value(), select.required()))
}

fn validate_on_blur(e: web_sys::FocusEvent) {
    let Some((el, value, required)) = field_of(e.target()) else {
        return;
    };
    let color = if needs_error_border(required, &value) {
        BORDER_ERROR
    } else {
        BORDER_IDLE
    };
    el.style().set_property("border-color", color).ok();
}

fn clear_error_border(e: &web_sys::Event) {
    if let Some((el, _, _)) = field_of(e.target()) {
        el.style().set_property("border-color", BORDER_IDLE).ok();
    }
}

fn reject_negative(e: web_sys::Event) {
    clear_error_border(&e);
    if let Some(input) = e
        .target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        && let Some(replacement) = non_negative_replacement(&input.value())
    {
        input.set_value(replacement);
    }
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Animate `shown` from 0 up to the formatted `target`. Replaces any running count.
fn start_count_up(target: f64, shown: RwSignal<String>) {
    let count = CountUp::new(0.0, target, now_ms(), COUNT_UP_DURATION_MS);
    shown.set(format_inr(0.0));
    let frames = FrameLoop::start(move |now| {
        shown.set(format_inr(count.value_at(now)));
        !count.is_done(now)
    });
    COUNT_UP.with(|slot| *slot.borrow_mut() = Some(frames));
}

fn stop_count_up() {
    COUNT_UP.with(|slot| slot.borrow_mut().take());
}

fn scroll_into_view(el: &web_sys::HtmlElement) {
    let options = web_sys::ScrollIntoViewOptions::new();
    options.set_behavior(web_sys::ScrollBehavior::Smooth);
    options.set_block(web_sys::ScrollLogicalPosition::Nearest);
    el.scroll_into_view_with_scroll_into_view_options(&options);
}

#[component]
pub fn PredictPage() -> impl IntoView {
    let fields = CoordinateFields {
        latitude: RwSignal::new(String::new()),
        longitude: RwSignal::new(String::new()),
        address: RwSignal::new(String::new()),
    };
    let phase = RwSignal::new(SubmitPhase::Idle);
    let error = RwSignal::new(None::<String>);
    let result_visible = RwSignal::new(false);
    let shown_price = RwSignal::new(format_inr(0.0));
    let inference = RwSignal::new(format_inference_ms(0.0));
    let visible = RwSignal::new(false);

    let form_ref = NodeRef::<leptos::html::Form>::new();
    let results_ref = NodeRef::<leptos::html::Div>::new();
    let error_ref = NodeRef::<leptos::html::Div>::new();

    PAGE_MAP.with(|slot| {
        // Re-mounting replaces the page controller; the old one's callbacks go inert.
        *slot.borrow_mut() = Some(MapAdapter::new(fields));
    });

    Effect::new(move || {
        spawn_local(async move {
            TimeoutFuture::new(100).await;
            visible.set(true);
        });
        health::check_health(api_base_url());
        with_map(MapAdapter::bootstrap);
        on_cleanup(stop_count_up);
    });

    let show_result = move |resp: PredictionResponse| {
        inference.set(format_inference_ms(resp.inference_ms()));
        result_visible.set(true);
        start_count_up(resp.price(), shown_price);
        spawn_local(async move {
            TimeoutFuture::new(600).await;
            if let Some(el) = results_ref.get_untracked() {
                scroll_into_view(&el);
            }
        });
    };

    let show_error = move |err: SubmitError| {
        web_sys::console::error_1(&format!("Prediction error: {err:?}").into());
        error.set(Some(err.to_string()));
        spawn_local(async move {
            TimeoutFuture::new(50).await;
            if let Some(el) = error_ref.get_untracked() {
                scroll_into_view(&el);
            }
        });
    };

    let on_submit = move |e: web_sys::SubmitEvent| {
        e.prevent_default();
        let mut next = phase.get_untracked();
        if !next.begin() {
            return;
        }
        let Some(form_el) = form_ref.get_untracked() else {
            return;
        };

        error.set(None);
        result_visible.set(false);
        stop_count_up();

        let request = match form::build_request(&form_el) {
            Ok(request) => request,
            Err(err) => {
                phase.set(SubmitPhase::Failed);
                show_error(err);
                phase.set(SubmitPhase::Idle);
                return;
            }
        };

        // Stays `Submitting` through the reveal delay.
        phase.set(next);
        spawn_local(async move {
            match form::submit_prediction(&api_base_url(), &request).await {
                Ok(resp) => {
                    TimeoutFuture::new(RESULT_REVEAL_DELAY_MS).await;
                    show_result(resp);
                    phase.update(|p| p.finish(true));
                }
                Err(err) => {
                    phase.update(|p| p.finish(false));
                    show_error(err);
                }
            }
            phase.set(SubmitPhase::Idle);
        });
    };

    view! {
        <div
            style="min-height: 100vh; background: radial-gradient(circle at 50% 0%, #1a1a2e 0%, #0a0e27 70%); color: #e0e6ff; font-family: 'Inter', sans-serif; padding: 40px 16px; box-sizing: border-box; transition: opacity 0.5s ease-in;"
            style:opacity=move || if visible.get() { "1" } else { "0" }
        >
            <div style="max-width: 960px; margin: 0 auto; display: flex; flex-direction: column; gap: 24px;">
                <header style="text-align: center;">
                    <h1 style="margin: 0 0 8px; font-size: 2.2rem; background: linear-gradient(135deg, #00f5ff, #7b2ff7); -webkit-background-clip: text; background-clip: text; color: transparent;">
                        "Property Price Prediction"
                    </h1>
                    <p style="margin: 0; color: #9aa4d4;">"Describe the property and pick its location on the map."</p>
                </header>

                <form node_ref=form_ref id="predictionForm" style=CARD_STYLE on:submit=on_submit novalidate=true>
                    <div style="display: grid; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); gap: 18px;">
                        <SelectField label="Posted by" name=POSTED_BY options=POSTED_BY_OPTIONS />
                        <SelectField label="Type" name=BHK_OR_RK options=BHK_OR_RK_OPTIONS />
                        <NumberField label="Bedrooms (BHK)" name=BHK_NO min="1" step="1" />
                        <NumberField label="Area (sq. ft)" name=SQUARE_FT min="0" step="any" />
                    </div>

                    <div style="display: flex; flex-wrap: wrap; gap: 18px; margin: 22px 0;">
                        <FlagField label="Under construction" name=UNDER_CONSTRUCTION />
                        <FlagField label="RERA approved" name=RERA />
                        <FlagField label="Ready to move" name=READY_TO_MOVE />
                        <FlagField label="Resale" name=RESALE />
                    </div>

                    <div style="margin-bottom: 18px;">
                        <label for=ADDRESS_INPUT_ID style=LABEL_STYLE>"Address"</label>
                        <input
                            id=ADDRESS_INPUT_ID
                            name=ADDRESS
                            type="text"
                            autocomplete="off"
                            placeholder="Search an address or click the map"
                            style=INPUT_STYLE
                            prop:value=move || fields.address.get()
                            on:input=move |e| {
                                let text = event_target_value(&e);
                                fields.address.set(text.clone());
                                with_map(|map| map.on_address_input(&text));
                            }
                        />
                    </div>

                    <div
                        id=MAP_CONTAINER_ID
                        style="height: 380px; border-radius: 14px; overflow: hidden; border: 1px solid rgba(0, 245, 255, 0.25); margin-bottom: 18px; background: #0a0e27;"
                    ></div>

                    <div style="display: grid; grid-template-columns: 1fr 1fr; gap: 18px; margin-bottom: 24px;">
                        <CoordinateField label="Latitude" name=LATITUDE value=fields.latitude />
                        <CoordinateField label="Longitude" name=LONGITUDE value=fields.longitude />
                    </div>

                    <button
                        id="predictBtn"
                        type="submit"
                        disabled=move || phase.get() == SubmitPhase::Submitting
                        style="width: 100%; padding: 16px; font-size: 1.05rem; font-weight: 600; color: #0a0e27; background: linear-gradient(135deg, #00f5ff, #7b2ff7); border: none; border-radius: 12px; cursor: pointer; transition: opacity 0.2s;"
                        style:opacity=move || if phase.get() == SubmitPhase::Submitting { "0.5" } else { "1" }
                    >
                        {move || phase.get().button_label()}
                    </button>
                </form>

                <div
                    node_ref=results_ref
                    id="resultsCard"
                    style=format!("{CARD_STYLE} text-align: center; transition: all 0.5s ease-out;")
                    style:display=move || if result_visible.get() { "block" } else { "none" }
                >
                    <p style="margin: 0 0 8px; color: #9aa4d4; text-transform: uppercase; letter-spacing: 0.1em; font-size: 0.8rem;">
                        "Estimated price"
                    </p>
                    <div id="predictedPrice" style="font-size: 3rem; font-weight: 700; color: #00f5ff; text-shadow: 0 0 24px rgba(0, 245, 255, 0.5);">
                        {move || shown_price.get()}
                    </div>
                    <p style="margin: 12px 0 0; color: #9aa4d4; font-size: 0.9rem;">
                        "Inference time: "
                        <span id="inferenceTime">{move || inference.get()}</span>
                    </p>
                </div>

                <div
                    node_ref=error_ref
                    id="errorCard"
                    style="padding: 20px 24px; border-radius: 16px; background: rgba(239, 68, 68, 0.08); border: 1px solid rgba(239, 68, 68, 0.5); color: #fca5a5;"
                    style:display=move || if error.get().is_some() { "block" } else { "none" }
                >
                    <div id="errorMessage">
                        {move || error.get().map(|message| {
                            message
                                .split('\n')
                                .enumerate()
                                .map(|(i, line)| {
                                    let line = line.to_string();
                                    view! {
                                        {(i > 0).then(|| view! { <br /> })}
                                        {line}
                                    }
                                })
                                .collect_view()
                        })}
                    </div>
                </div>
            </div>
        </div>
    }
}

#[component]
fn SelectField(
    label: &'static str,
    name: &'static str,
    options: &'static [&'static str],
) -> impl IntoView {
    view! {
        <div>
            <label for=name style=LABEL_STYLE>{label}" *"</label>
            <select
                id=name
                name=name
                required=true
                style=INPUT_STYLE
                on:blur=validate_on_blur
                on:change=move |e| clear_error_border(&e)
            >
                <option value="">"Select..."</option>
                {options
                    .iter()
                    .map(|&opt| view! { <option value=opt>{opt}</option> })
                    .collect_view()}
            </select>
        </div>
    }
}

#[component]
fn NumberField(
    label: &'static str,
    name: &'static str,
    min: &'static str,
    step: &'static str,
) -> impl IntoView {
    view! {
        <div>
            <label for=name style=LABEL_STYLE>{label}" *"</label>
            <input
                id=name
                name=name
                type="number"
                min=min
                step=step
                required=true
                style=INPUT_STYLE
                on:blur=validate_on_blur
                on:input=reject_negative
            />
        </div>
    }
}

/// Latitude/longitude input, kept in sync with the map marker.
#[component]
fn CoordinateField(
    label: &'static str,
    name: &'static str,
    value: RwSignal<String>,
) -> impl IntoView {
    view! {
        <div>
            <label for=name style=LABEL_STYLE>{label}" *"</label>
            <input
                id=name
                name=name
                type="number"
                step="any"
                required=true
                style=INPUT_STYLE
                prop:value=move || value.get()
                on:blur=validate_on_blur
                on:input=move |e| {
                    clear_error_border(&e);
                    value.set(event_target_value(&e));
                }
            />
        </div>
    }
}

#[component]
fn FlagField(label: &'static str, name: &'static str) -> impl IntoView {
    view! {
        <label style="display: flex; align-items: center; gap: 8px; cursor: pointer; color: #e0e6ff; font-size: 0.9rem;">
            <input type="checkbox" name=name value="1" style="accent-color: #00f5ff; width: 18px; height: 18px;" />
            {label}
        </label>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_required_field_is_flagged() {
        assert!(needs_error_border(true, ""));
        assert!(!needs_error_border(true, "Owner"));
        assert!(!needs_error_border(false, ""));
    }

    #[test]
    fn negative_quantities_reset_to_zero() {
        assert_eq!(non_negative_replacement("-3"), Some("0"));
        assert_eq!(non_negative_replacement("-0.5"), Some("0"));
        assert_eq!(non_negative_replacement("0"), None);
        assert_eq!(non_negative_replacement("1200"), None);
        assert_eq!(non_negative_replacement(""), None);
        assert_eq!(non_negative_replacement("abc"), None);
    }

    #[test]
    fn option_lists_match_server_categories() {
        assert_eq!(POSTED_BY_OPTIONS, ["Owner", "Dealer", "Builder"]);
        assert_eq!(BHK_OR_RK_OPTIONS, ["BHK", "RK"]);
    }
}
