use shared::{slugify, validate_employee_form, CreateEmployeeRequest, Employee};
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::hooks::use_employees::Responder;

#[derive(Properties, PartialEq)]
pub struct EmployeeModalProps {
    pub is_open: bool,
    /// Employee being edited; `None` creates a new one
    pub employee: Option<Employee>,
    pub on_save: Callback<(CreateEmployeeRequest, Responder)>,
    pub on_close: Callback<()>,
}

#[function_component(EmployeeModal)]
pub fn employee_modal(props: &EmployeeModalProps) -> Html {
    let full_name = use_state(String::new);
    let slug = use_state(String::new);
    let slug_edited = use_state(|| false);
    let active = use_state(|| true);
    let is_submitting = use_state(|| false);
    let errors = use_state(Vec::<String>::new);

    // Reset the fields whenever the modal opens
    use_effect_with((props.is_open, props.employee.clone()), {
        let full_name = full_name.clone();
        let slug = slug.clone();
        let slug_edited = slug_edited.clone();
        let active = active.clone();
        let is_submitting = is_submitting.clone();
        let errors = errors.clone();
        move |(is_open, employee): &(bool, Option<Employee>)| {
            if *is_open {
                full_name.set(employee.as_ref().map(|e| e.full_name.clone()).unwrap_or_default());
                slug.set(employee.as_ref().map(|e| e.slug.clone()).unwrap_or_default());
                slug_edited.set(employee.is_some());
                active.set(employee.as_ref().map(|e| e.active).unwrap_or(true));
                is_submitting.set(false);
                errors.set(Vec::new());
            }
            || ()
        }
    });

    let on_name_input = {
        let full_name = full_name.clone();
        let slug = slug.clone();
        let slug_edited = slug_edited.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let value = input.value();
            if !*slug_edited {
                slug.set(slugify(&value));
            }
            full_name.set(value);
        })
    };

    let on_slug_input = {
        let slug = slug.clone();
        let slug_edited = slug_edited.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            slug_edited.set(true);
            slug.set(input.value());
        })
    };

    let on_active_change = {
        let active = active.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            active.set(input.checked());
        })
    };

    let on_submit = {
        let full_name = full_name.clone();
        let slug = slug.clone();
        let active = active.clone();
        let is_submitting = is_submitting.clone();
        let errors = errors.clone();
        let on_save = props.on_save.clone();
        let on_close = props.on_close.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let request = match validate_employee_form(&full_name, &slug, *active) {
                Ok(request) => request,
                Err(problems) => {
                    errors.set(problems.iter().map(ToString::to_string).collect());
                    return;
                }
            };

            is_submitting.set(true);
            errors.set(Vec::new());
            let responder = {
                let is_submitting = is_submitting.clone();
                let errors = errors.clone();
                let on_close = on_close.clone();
                Callback::from(move |result: Result<(), String>| {
                    is_submitting.set(false);
                    match result {
                        Ok(()) => on_close.emit(()),
                        Err(message) => errors.set(vec![message]),
                    }
                })
            };
            on_save.emit((request, responder));
        })
    };

    let on_backdrop_click = {
        let on_close = props.on_close.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_close.emit(());
        })
    };

    let on_modal_click = Callback::from(|e: MouseEvent| {
        e.stop_propagation();
    });

    let on_cancel = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    if !props.is_open {
        return html! {};
    }

    let title = if props.employee.is_some() {
        "Modifier l'employé"
    } else {
        "Nouvel employé"
    };

    html! {
        <div class="modal-backdrop" onclick={on_backdrop_click}>
            <div class="modal" onclick={on_modal_click}>
                <div class="modal-content">
                    <h3 class="modal-title">{title}</h3>

                    {for errors.iter().map(|error| html! {
                        <div class="form-error">{error.clone()}</div>
                    })}

                    <form class="employee-form" onsubmit={on_submit}>
                        <div class="form-group">
                            <label for="employee-name">{"Nom complet"}</label>
                            <input
                                id="employee-name"
                                type="text"
                                value={(*full_name).clone()}
                                oninput={on_name_input}
                                disabled={*is_submitting}
                                autofocus=true
                            />
                        </div>
                        <div class="form-group">
                            <label for="employee-slug">{"Identifiant de connexion"}</label>
                            <input
                                id="employee-slug"
                                type="text"
                                value={(*slug).clone()}
                                oninput={on_slug_input}
                                disabled={*is_submitting}
                            />
                        </div>
                        <div class="form-group form-check">
                            <label>
                                <input
                                    type="checkbox"
                                    checked={*active}
                                    onchange={on_active_change}
                                    disabled={*is_submitting}
                                />
                                {" Actif"}
                            </label>
                        </div>
                        <div class="modal-buttons">
                            <button type="submit" class="btn btn-primary" disabled={*is_submitting}>
                                {if *is_submitting { "Enregistrement..." } else { "Enregistrer" }}
                            </button>
                            <button
                                type="button"
                                class="btn btn-secondary"
                                onclick={on_cancel}
                                disabled={*is_submitting}
                            >
                                {"Annuler"}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
