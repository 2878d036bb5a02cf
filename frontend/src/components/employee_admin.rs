use shared::{CreateEmployeeRequest, Employee};
use yew::prelude::*;

use super::employee_modal::EmployeeModal;
use crate::hooks::use_employees::{EmployeesState, Responder, UseEmployeesActions};

#[derive(Properties, PartialEq)]
pub struct EmployeeAdminProps {
    pub state: EmployeesState,
    pub actions: UseEmployeesActions,
    /// Jump to the planning of an employee
    pub on_open_planning: Callback<Employee>,
}

#[function_component(EmployeeAdmin)]
pub fn employee_admin(props: &EmployeeAdminProps) -> Html {
    let modal_open = use_state(|| false);
    let editing = use_state(|| Option::<Employee>::None);
    let confirm_delete = use_state(|| Option::<Employee>::None);
    let row_error = use_state(|| Option::<String>::None);

    let open_create = {
        let modal_open = modal_open.clone();
        let editing = editing.clone();
        Callback::from(move |_: MouseEvent| {
            editing.set(None);
            modal_open.set(true);
        })
    };

    let on_close = {
        let modal_open = modal_open.clone();
        Callback::from(move |_: ()| modal_open.set(false))
    };

    let on_save = {
        let editing = editing.clone();
        let create = props.actions.create.clone();
        let update = props.actions.update.clone();
        Callback::from(move |(request, done): (CreateEmployeeRequest, Responder)| {
            match &*editing {
                Some(employee) => update.emit((employee.id, request.diff(employee), done)),
                None => create.emit((request, done)),
            }
        })
    };

    let toggle_active = |employee: &Employee| {
        let update = props.actions.update.clone();
        let row_error = row_error.clone();
        let employee = employee.clone();
        Callback::from(move |_: MouseEvent| {
            let request = CreateEmployeeRequest {
                slug: employee.slug.clone(),
                full_name: employee.full_name.clone(),
                active: !employee.active,
            };
            let row_error = row_error.clone();
            let done = Callback::from(move |result: Result<(), String>| {
                row_error.set(result.err());
            });
            update.emit((employee.id, request.diff(&employee), done));
        })
    };

    let confirm = {
        let confirm_delete = confirm_delete.clone();
        let row_error = row_error.clone();
        let delete = props.actions.delete.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(employee) = (*confirm_delete).clone() else {
                return;
            };
            let row_error = row_error.clone();
            let done = Callback::from(move |result: Result<(), String>| {
                row_error.set(result.err());
            });
            delete.emit((employee.id, done));
            confirm_delete.set(None);
        })
    };

    let cancel_delete = {
        let confirm_delete = confirm_delete.clone();
        Callback::from(move |_: MouseEvent| confirm_delete.set(None))
    };

    let state = &props.state;

    html! {
        <section class="employee-admin">
            <div class="section-header">
                <h2>{"Employés"}</h2>
                <button class="btn btn-primary" onclick={open_create}>{"+ Nouvel employé"}</button>
            </div>

            {for state.error.iter().chain(row_error.iter()).map(|error| html! {
                <div class="form-error">{error.clone()}</div>
            })}

            {if let Some(employee) = (*confirm_delete).clone() {
                html! {
                    <div class="confirm-box">
                        <span>{format!("Supprimer {} et tous ses plannings ?", employee.full_name)}</span>
                        <button class="btn btn-danger" onclick={confirm}>{"Supprimer"}</button>
                        <button class="btn btn-secondary" onclick={cancel_delete}>{"Annuler"}</button>
                    </div>
                }
            } else {
                html! {}
            }}

            {if state.loading && state.employees.is_empty() {
                html! { <p class="loading">{"Chargement..."}</p> }
            } else if state.employees.is_empty() {
                html! { <p class="empty">{"Aucun employé pour le moment"}</p> }
            } else {
                html! {
                    <table class="employee-table">
                        <thead>
                            <tr>
                                <th>{"Nom"}</th>
                                <th>{"Identifiant"}</th>
                                <th>{"Statut"}</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            {for state.employees.iter().map(|employee| {
                                let on_edit = {
                                    let editing = editing.clone();
                                    let modal_open = modal_open.clone();
                                    let employee = employee.clone();
                                    Callback::from(move |_: MouseEvent| {
                                        editing.set(Some(employee.clone()));
                                        modal_open.set(true);
                                    })
                                };
                                let on_delete = {
                                    let confirm_delete = confirm_delete.clone();
                                    let employee = employee.clone();
                                    Callback::from(move |_: MouseEvent| confirm_delete.set(Some(employee.clone())))
                                };
                                let on_planning = {
                                    let on_open_planning = props.on_open_planning.clone();
                                    let employee = employee.clone();
                                    Callback::from(move |_: MouseEvent| on_open_planning.emit(employee.clone()))
                                };
                                html! {
                                    <tr key={employee.id.to_string()} class={classes!((!employee.active).then_some("inactive"))}>
                                        <td>{employee.full_name.clone()}</td>
                                        <td><code>{employee.slug.clone()}</code></td>
                                        <td>
                                            <button class="btn btn-link" onclick={toggle_active(employee)}>
                                                {if employee.active { "Actif" } else { "Inactif" }}
                                            </button>
                                        </td>
                                        <td class="row-actions">
                                            <button class="btn btn-secondary" onclick={on_planning}>{"Planning"}</button>
                                            <button class="btn btn-secondary" onclick={on_edit}>{"Modifier"}</button>
                                            <button class="btn btn-danger" onclick={on_delete}>{"Supprimer"}</button>
                                        </td>
                                    </tr>
                                }
                            })}
                        </tbody>
                    </table>
                }
            }}

            <EmployeeModal
                is_open={*modal_open}
                employee={(*editing).clone()}
                on_save={on_save}
                on_close={on_close}
            />
        </section>
    }
}
