use shared::time_utils::{day_name, format_duration, DAYS_PER_WEEK};
use shared::{validate_slot_form, Category, NewSlotRequest, Slot, SlotForm, SlotFormError, SlotId};
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::hooks::use_planning::SlotEditor;

#[derive(Properties, PartialEq)]
pub struct SlotFormModalProps {
    pub editor: Option<SlotEditor>,
    /// Refusal from the grid or the server, shown above the form
    pub error: Option<String>,
    pub on_save: Callback<NewSlotRequest>,
    pub on_delete: Callback<SlotId>,
    pub on_close: Callback<()>,
}

fn initial_form(editor: &Option<SlotEditor>) -> SlotForm {
    match editor {
        Some(SlotEditor::Create(form)) => form.clone(),
        Some(SlotEditor::Edit(slot)) | Some(SlotEditor::View(slot)) => SlotForm::from_slot(slot),
        None => SlotForm::default(),
    }
}

/// Categories offered in the select, keeping an unknown current value
fn category_options(current: &Category) -> Vec<Category> {
    let mut options = Category::KNOWN.to_vec();
    if !current.is_known() {
        options.push(current.clone());
    }
    options
}

fn field_errors(errors: &[SlotFormError], field: &str) -> Html {
    html! {
        <>
            {for errors.iter().filter(|e| e.field() == field).map(|e| html! {
                <div class="field-error">{e.to_string()}</div>
            })}
        </>
    }
}

#[function_component(SlotFormModal)]
pub fn slot_form_modal(props: &SlotFormModalProps) -> Html {
    let form = use_state(|| initial_form(&props.editor));
    let errors = use_state(Vec::<SlotFormError>::new);
    let confirming_delete = use_state(|| false);

    use_effect_with(props.editor.clone(), {
        let form = form.clone();
        let errors = errors.clone();
        let confirming_delete = confirming_delete.clone();
        move |editor: &Option<SlotEditor>| {
            form.set(initial_form(editor));
            errors.set(Vec::new());
            confirming_delete.set(false);
            || ()
        }
    });

    let update = |apply: fn(&mut SlotForm, String)| {
        let form = form.clone();
        move |value: String| {
            let mut next = (*form).clone();
            apply(&mut next, value);
            form.set(next);
        }
    };

    let on_day_change = {
        let set = update(|f, v| f.day_index = v.parse().unwrap_or(f.day_index));
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            set(select.value());
        })
    };
    let on_start_change = {
        let set = update(|f, v| f.start = v);
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set(input.value());
        })
    };
    let on_end_change = {
        let set = update(|f, v| f.end = v);
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set(input.value());
        })
    };
    let on_title_input = {
        let set = update(|f, v| f.title = v);
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            set(input.value());
        })
    };
    let on_category_change = {
        let set = update(|f, v| f.category = Category::from_code(&v));
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            set(select.value());
        })
    };
    let on_comment_input = {
        let set = update(|f, v| f.comment = v);
        Callback::from(move |e: InputEvent| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            set(area.value());
        })
    };

    let on_submit = {
        let form = form.clone();
        let errors = errors.clone();
        let on_save = props.on_save.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            match validate_slot_form(&form) {
                Ok(request) => {
                    errors.set(Vec::new());
                    on_save.emit(request);
                }
                Err(problems) => errors.set(problems),
            }
        })
    };

    let on_backdrop_click = {
        let on_close = props.on_close.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_close.emit(());
        })
    };
    let on_modal_click = Callback::from(|e: MouseEvent| e.stop_propagation());
    let on_cancel = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    let Some(editor) = &props.editor else {
        return html! {};
    };

    let body = match editor {
        SlotEditor::View(slot) => view_details(slot),
        SlotEditor::Create(_) | SlotEditor::Edit(_) => {
            let delete_controls = match editor {
                SlotEditor::Edit(Slot { id: Some(id), .. }) => {
                    let id = *id;
                    if *confirming_delete {
                        let on_delete = props.on_delete.clone();
                        let confirming_delete = confirming_delete.clone();
                        html! {
                            <>
                                <button type="button" class="btn btn-danger" onclick={Callback::from(move |_: MouseEvent| on_delete.emit(id))}>
                                    {"Confirmer la suppression"}
                                </button>
                                <button type="button" class="btn btn-link" onclick={Callback::from(move |_: MouseEvent| confirming_delete.set(false))}>
                                    {"Non"}
                                </button>
                            </>
                        }
                    } else {
                        let confirming_delete = confirming_delete.clone();
                        html! {
                            <button type="button" class="btn btn-danger" onclick={Callback::from(move |_: MouseEvent| confirming_delete.set(true))}>
                                {"Supprimer"}
                            </button>
                        }
                    }
                }
                _ => html! {},
            };

            html! {
                <form class="slot-form" onsubmit={on_submit}>
                    <div class="form-group">
                        <label for="slot-title">{"Titre"}</label>
                        <input id="slot-title" type="text" value={form.title.clone()} oninput={on_title_input} autofocus=true />
                        {field_errors(&errors, "title")}
                    </div>
                    <div class="form-row">
                        <div class="form-group">
                            <label for="slot-day">{"Jour"}</label>
                            <select id="slot-day" onchange={on_day_change}>
                                {for (0..DAYS_PER_WEEK).map(|day| html! {
                                    <option value={day.to_string()} selected={day == form.day_index}>{day_name(day)}</option>
                                })}
                            </select>
                            {field_errors(&errors, "day")}
                        </div>
                        <div class="form-group">
                            <label for="slot-start">{"Début"}</label>
                            <input id="slot-start" type="time" step="900" value={form.start.clone()} onchange={on_start_change} />
                            {field_errors(&errors, "start")}
                        </div>
                        <div class="form-group">
                            <label for="slot-end">{"Fin"}</label>
                            <input id="slot-end" type="time" step="900" value={form.end.clone()} onchange={on_end_change} />
                            {field_errors(&errors, "end")}
                        </div>
                    </div>
                    <div class="form-group">
                        <label for="slot-category">{"Catégorie"}</label>
                        <select id="slot-category" onchange={on_category_change}>
                            {for category_options(&form.category).into_iter().map(|category| html! {
                                <option value={category.code().to_string()} selected={category == form.category}>
                                    {category.label()}
                                </option>
                            })}
                        </select>
                    </div>
                    <div class="form-group">
                        <label for="slot-comment">{"Commentaire"}</label>
                        <textarea id="slot-comment" value={form.comment.clone()} oninput={on_comment_input} />
                    </div>
                    <div class="modal-buttons">
                        <button type="submit" class="btn btn-primary">{"Enregistrer"}</button>
                        <button type="button" class="btn btn-secondary" onclick={on_cancel.clone()}>{"Annuler"}</button>
                        {delete_controls}
                    </div>
                </form>
            }
        }
    };

    let title = match editor {
        SlotEditor::Create(_) => "Nouveau créneau",
        SlotEditor::Edit(_) => "Modifier le créneau",
        SlotEditor::View(_) => "Créneau",
    };

    html! {
        <div class="modal-backdrop" onclick={on_backdrop_click}>
            <div class="modal" onclick={on_modal_click}>
                <div class="modal-content">
                    <h3 class="modal-title">{title}</h3>
                    {if let Some(error) = props.error.clone() {
                        html! { <div class="form-error">{error}</div> }
                    } else {
                        html! {}
                    }}
                    {body}
                    {if matches!(editor, SlotEditor::View(_)) {
                        html! {
                            <div class="modal-buttons">
                                <button type="button" class="btn btn-secondary" onclick={on_cancel}>{"Fermer"}</button>
                            </div>
                        }
                    } else {
                        html! {}
                    }}
                </div>
            </div>
        </div>
    }
}

fn view_details(slot: &Slot) -> Html {
    let style = slot.category.style();
    html! {
        <dl class="slot-details">
            <dt>{"Titre"}</dt>
            <dd>{slot.title.clone()}</dd>
            <dt>{"Quand"}</dt>
            <dd>{format!("{} {} ({})", day_name(slot.day_index), slot.time_range_label(), format_duration(slot.duration_minute))}</dd>
            <dt>{"Catégorie"}</dt>
            <dd>
                <span class="category-chip" style={format!("background: {}; color: {};", style.color_hex(), style.text_color_hex())}>
                    {slot.category.label()}
                </span>
            </dd>
            {if let Some(comment) = slot.comment.clone() {
                html! { <><dt>{"Commentaire"}</dt><dd>{comment}</dd></> }
            } else {
                html! {}
            }}
        </dl>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_unknown_category_stays_selectable() {
        let other = Category::from_code("atelier");
        let options = category_options(&other);
        assert_eq!(options.len(), 9);
        assert_eq!(options.last(), Some(&other));
        assert_eq!(category_options(&Category::Sante).len(), 8);
    }

    #[wasm_bindgen_test]
    fn test_initial_form_for_edit() {
        let slot = Slot {
            id: Some(5),
            day_index: 1,
            start_minute: 600,
            duration_minute: 45,
            title: "Réunion".to_string(),
            category: Category::Administratif,
            comment: None,
        };
        let form = initial_form(&Some(SlotEditor::Edit(slot)));
        assert_eq!(form.start, "10:00");
        assert_eq!(form.end, "10:45");
        assert_eq!(form.title, "Réunion");
        assert_eq!(initial_form(&None), SlotForm::default());
    }
}
