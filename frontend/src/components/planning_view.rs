use shared::{Employee, EmployeeId, PlannerConfig};
use yew::prelude::*;

use super::error_banner::ErrorBanner;
use super::notes_panel::NotesPanel;
use super::planning_grid::PlanningGrid;
use super::repartition_panel::RepartitionPanel;
use super::slot_form_modal::SlotFormModal;
use super::week_toolbar::WeekToolbar;
use crate::hooks::use_planning::{PlanningState, UsePlanningActions};

#[derive(Properties, PartialEq)]
pub struct PlanningViewProps {
    pub config: PlannerConfig,
    pub state: PlanningState,
    pub actions: UsePlanningActions,
    pub employees: Vec<Employee>,
    pub fixed_employee: Option<EmployeeId>,
    pub can_edit: bool,
}

#[function_component(PlanningView)]
pub fn planning_view(props: &PlanningViewProps) -> Html {
    let state = &props.state;
    let actions = &props.actions;

    let employee_name = state.query.as_ref().and_then(|query| {
        props
            .employees
            .iter()
            .find(|e| e.id == query.employee_id)
            .map(|e| e.full_name.clone())
    });

    html! {
        <div class="planning-view">
            <WeekToolbar
                employees={props.employees.clone()}
                fixed_employee={props.fixed_employee}
                query={state.query.clone()}
                can_edit={props.can_edit}
                busy={state.busy}
                on_select={actions.select_week.clone()}
                on_operation={actions.week_operation.clone()}
            />

            <ErrorBanner
                banner={state.banner.clone()}
                on_dismiss={actions.dismiss_banner.clone()}
                on_retry={actions.reload.clone()}
            />

            {if let Some(name) = employee_name {
                html! { <h2 class="planning-title">{name}</h2> }
            } else {
                html! {}
            }}

            {if state.query.is_none() {
                html! { <p class="empty">{"Choisissez un employé et une semaine"}</p> }
            } else if state.loading && state.week.is_none() {
                html! { <p class="loading">{"Chargement du planning..."}</p> }
            } else {
                html! {
                    <div class="planning-layout">
                        <PlanningGrid
                            config={props.config.clone()}
                            week={state.week.clone()}
                            slots={state.slots.clone()}
                            read_only={state.read_only}
                            dragging={state.dragging}
                            on_pointer_down={actions.pointer_down.clone()}
                            on_pointer_move={actions.pointer_move.clone()}
                            on_pointer_up={actions.pointer_up.clone()}
                            on_cancel={actions.cancel.clone()}
                        />
                        {if let Some(week) = &state.week {
                            html! {
                                <aside class="planning-side">
                                    <RepartitionPanel totals={week.totals.clone()} />
                                    <NotesPanel
                                        notes={week.notes.clone()}
                                        read_only={state.read_only}
                                        on_save={actions.save_notes.clone()}
                                    />
                                </aside>
                            }
                        } else {
                            html! {}
                        }}
                    </div>
                }
            }}

            <SlotFormModal
                editor={state.editor.clone()}
                error={state.editor_error.clone()}
                on_save={actions.save_slot.clone()}
                on_delete={actions.delete_slot.clone()}
                on_close={actions.close_editor.clone()}
            />
        </div>
    }
}
