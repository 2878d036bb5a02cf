use shared::time_utils::{format_duration, get_slot_position, DAYS_PER_WEEK};
use shared::{
    generate_time_slots, DisplayedSlot, GridGeometry, PlannerConfig, PointerButton, PointerPos,
    PointerTarget, WeekSnapshot,
};
use web_sys::{Element, HtmlElement};
use yew::prelude::*;

use crate::services::date_utils::day_header;

#[derive(Properties, PartialEq)]
pub struct PlanningGridProps {
    pub config: PlannerConfig,
    pub week: Option<WeekSnapshot>,
    pub slots: Vec<DisplayedSlot>,
    pub read_only: bool,
    pub dragging: bool,
    pub on_pointer_down: Callback<(PointerTarget, PointerPos, GridGeometry, PointerButton)>,
    pub on_pointer_move: Callback<(PointerPos, GridGeometry)>,
    pub on_pointer_up: Callback<(PointerPos, GridGeometry)>,
    pub on_cancel: Callback<()>,
}

/// Inline style placing a slot in its day column
fn slot_style(slot: &DisplayedSlot, config: &PlannerConfig) -> String {
    let position = get_slot_position(
        slot.slot.start_minute,
        slot.slot.duration_minute,
        config.grid_start_hour,
        config.pixels_per_hour,
    );
    let style = slot.slot.category.style();
    let column = 100.0 / DAYS_PER_WEEK as f64;
    format!(
        "top: {:.1}px; height: {:.1}px; left: calc({:.4}% + 2px); width: calc({:.4}% - 4px); \
         background: {}; color: {};",
        position.top,
        position.height,
        slot.slot.day_index as f64 * column,
        column,
        style.color_hex(),
        style.text_color_hex(),
    )
}

fn pointer_pos(e: &MouseEvent) -> PointerPos {
    PointerPos::new(e.client_x() as f64, e.client_y() as f64)
}

#[function_component(PlanningGrid)]
pub fn planning_grid(props: &PlanningGridProps) -> Html {
    let root_ref = use_node_ref();
    let days_ref = use_node_ref();

    let geometry = {
        let days_ref = days_ref.clone();
        let start_hour = props.config.grid_start_hour;
        let end_hour = props.config.grid_end_hour;
        move || -> Option<GridGeometry> {
            let rect = days_ref.cast::<Element>()?.get_bounding_client_rect();
            Some(GridGeometry {
                left: rect.left(),
                top: rect.top(),
                width: rect.width(),
                height: rect.height(),
                start_hour,
                end_hour,
            })
        }
    };

    let press = {
        let geometry = geometry.clone();
        let root_ref = root_ref.clone();
        let on_pointer_down = props.on_pointer_down.clone();
        move |target: PointerTarget| {
            let geometry = geometry.clone();
            let root_ref = root_ref.clone();
            let on_pointer_down = on_pointer_down.clone();
            Callback::from(move |e: MouseEvent| {
                e.prevent_default();
                e.stop_propagation();
                if let Some(root) = root_ref.cast::<HtmlElement>() {
                    let _ = root.focus();
                }
                if let Some(geometry) = geometry() {
                    on_pointer_down.emit((
                        target,
                        pointer_pos(&e),
                        geometry,
                        PointerButton::from_dom(e.button()),
                    ));
                }
            })
        }
    };

    let on_move = {
        let geometry = geometry.clone();
        let on_pointer_move = props.on_pointer_move.clone();
        Callback::from(move |e: MouseEvent| {
            if let Some(geometry) = geometry() {
                on_pointer_move.emit((pointer_pos(&e), geometry));
            }
        })
    };

    let on_up = {
        let geometry = geometry.clone();
        let on_pointer_up = props.on_pointer_up.clone();
        Callback::from(move |e: MouseEvent| {
            if let Some(geometry) = geometry() {
                on_pointer_up.emit((pointer_pos(&e), geometry));
            }
        })
    };

    let on_leave = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_: MouseEvent| on_cancel.emit(()))
    };

    let on_keydown = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Escape" {
                on_cancel.emit(());
            }
        })
    };

    let config = &props.config;
    let height = config.grid_height();
    let marks: Vec<_> = generate_time_slots(config.grid_start_hour, config.grid_end_hour).collect();
    let quarter_height = config.pixels_per_hour / 4.0;
    let week_start = props.week.as_ref().and_then(|w| w.week_start);

    html! {
        <div
            ref={root_ref}
            class={classes!("planning-grid", props.dragging.then_some("dragging"), props.read_only.then_some("read-only"))}
            tabindex="0"
            onkeydown={on_keydown}
        >
            <div class="grid-header">
                <div class="time-gutter-header"></div>
                {for (0..DAYS_PER_WEEK).map(|day| {
                    let minutes = props.week.as_ref().map(|w| w.totals.day_minutes(day)).unwrap_or(0);
                    html! {
                        <div class="day-header">
                            <span class="day-name">{day_header(day, week_start)}</span>
                            <span class="day-total">{if minutes > 0 { format_duration(minutes) } else { String::new() }}</span>
                        </div>
                    }
                })}
            </div>

            <div class="grid-body">
                <div class="time-gutter" style={format!("height: {:.1}px;", height)}>
                    {for marks.iter().filter(|m| m.is_full_hour()).map(|mark| {
                        let top = (mark.total_minutes - config.grid_start_minute()) as f64 / 60.0 * config.pixels_per_hour;
                        html! {
                            <span class="hour-label" style={format!("top: {:.1}px;", top)}>{mark.label.clone()}</span>
                        }
                    })}
                </div>

                <div
                    ref={days_ref}
                    class="grid-days"
                    style={format!("height: {:.1}px;", height)}
                    onmousedown={press(PointerTarget::EmptyCell)}
                    onmousemove={on_move}
                    onmouseup={on_up}
                    onmouseleave={on_leave}
                >
                    {for (0..DAYS_PER_WEEK).map(|day| html! {
                        <div class="day-column" style={format!(
                            "left: {:.4}%; width: {:.4}%;",
                            day as f64 * 100.0 / DAYS_PER_WEEK as f64,
                            100.0 / DAYS_PER_WEEK as f64
                        )}></div>
                    })}
                    {for marks.iter().map(|mark| html! {
                        <div
                            class={classes!("grid-line", mark.is_full_hour().then_some("hour"))}
                            style={format!(
                                "top: {:.1}px;",
                                (mark.total_minutes - config.grid_start_minute()) as f64 / 15.0 * quarter_height
                            )}
                        ></div>
                    })}

                    {for props.slots.iter().enumerate().map(|(index, displayed)| {
                        let slot = &displayed.slot;
                        let key = match slot.id {
                            Some(id) if !displayed.preview => format!("slot-{}", id),
                            _ => format!("draft-{}", index),
                        };
                        let class = classes!(
                            "slot",
                            displayed.preview.then_some("preview"),
                            displayed.pending.then_some("pending")
                        );
                        let handles = match slot.id {
                            Some(id) if !props.read_only && !displayed.preview && !displayed.pending => html! {
                                <>
                                    <div
                                        class="slot-duplicate"
                                        title="Glisser pour dupliquer"
                                        onmousedown={press(PointerTarget::DuplicateHandle(id))}
                                    >{"⧉"}</div>
                                    <div
                                        class="slot-resize"
                                        title="Glisser pour changer la durée"
                                        onmousedown={press(PointerTarget::ResizeHandle(id))}
                                    ></div>
                                </>
                            },
                            _ => html! {},
                        };
                        let on_body = match slot.id {
                            Some(id) if !displayed.preview => press(PointerTarget::SlotBody(id)),
                            _ => Callback::from(|e: MouseEvent| e.stop_propagation()),
                        };
                        html! {
                            <div {key} {class} style={slot_style(displayed, config)} onmousedown={on_body}>
                                <div class="slot-title">{slot.title.clone()}</div>
                                <div class="slot-time">{slot.time_range_label()}</div>
                                {handles}
                            </div>
                        }
                    })}
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Category, Slot};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_slot_style_places_slot_in_its_column() {
        let displayed = DisplayedSlot {
            slot: Slot {
                id: Some(1),
                day_index: 2,
                start_minute: 9 * 60,
                duration_minute: 90,
                title: "Cours".to_string(),
                category: Category::Ecole,
                comment: None,
            },
            preview: false,
            pending: false,
        };
        let style = slot_style(&displayed, &PlannerConfig::default());
        // 3 hours after the 06:00 opening at 64px per hour
        assert!(style.contains("top: 192.0px"));
        assert!(style.contains("height: 96.0px"));
        assert!(style.contains("left: calc(28.5714% + 2px)"));
        assert!(style.contains(&Category::Ecole.style().color_hex()));
    }
}
