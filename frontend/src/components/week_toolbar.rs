use shared::time_utils::week_start_for;
use shared::{DuplicateWeekRequest, Employee, EmployeeId, WeekKind, WeekQuery};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::hooks::use_planning::WeekOperation;
use crate::services::date_utils::{
    current_week_start, format_week_range, parse_input_value, to_input_value,
};

#[derive(Properties, PartialEq)]
pub struct WeekToolbarProps {
    /// Employees an admin may pick from; empty for employee sessions
    pub employees: Vec<Employee>,
    /// Employee shown when the session cannot choose
    pub fixed_employee: Option<EmployeeId>,
    pub query: Option<WeekQuery>,
    pub can_edit: bool,
    pub busy: bool,
    pub on_select: Callback<WeekQuery>,
    pub on_operation: Callback<WeekOperation>,
}

/// Build the query for the toolbar fields. Dates are snapped to the Monday
/// of their week.
fn build_query(
    employee_id: EmployeeId,
    kind: WeekKind,
    date: &str,
    vacation: &str,
) -> WeekQuery {
    let mut query = WeekQuery::new(employee_id, kind);
    if kind == WeekKind::Vacation {
        query = query.with_vacation(vacation.trim());
    }
    if kind.is_dated() {
        if let Some(date) = parse_input_value(date) {
            query = query.with_week_start(week_start_for(date));
        }
    }
    query
}

#[function_component(WeekToolbar)]
pub fn week_toolbar(props: &WeekToolbarProps) -> Html {
    let employee_id = use_state(|| props.fixed_employee);
    let kind = use_state(|| WeekKind::Current);
    let date = use_state(|| to_input_value(current_week_start()));
    let vacation = use_state(String::new);

    // Follow the week actually displayed
    use_effect_with(props.query.clone(), {
        let employee_id = employee_id.clone();
        let kind = kind.clone();
        let date = date.clone();
        let vacation = vacation.clone();
        move |query: &Option<WeekQuery>| {
            if let Some(query) = query {
                employee_id.set(Some(query.employee_id));
                kind.set(query.kind);
                if let Some(start) = query.week_start {
                    date.set(to_input_value(start));
                }
                vacation.set(query.vacation.clone().unwrap_or_default());
            }
            || ()
        }
    });

    let on_employee_change = {
        let employee_id = employee_id.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            employee_id.set(select.value().parse::<EmployeeId>().ok());
        })
    };

    let on_kind_change = {
        let kind = kind.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Some(parsed) = WeekKind::parse(&select.value()) {
                kind.set(parsed);
            }
        })
    };

    let on_date_change = {
        let date = date.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            date.set(input.value());
        })
    };

    let on_vacation_input = {
        let vacation = vacation.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            vacation.set(input.value());
        })
    };

    let selected = (*employee_id).or(props.fixed_employee);
    let current_query = selected.map(|id| build_query(id, *kind, &date, &vacation));

    let on_show = {
        let on_select = props.on_select.clone();
        let current_query = current_query.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(query) = current_query.clone() {
                on_select.emit(query);
            }
        })
    };

    let operation = |op: WeekOperation| {
        let on_operation = props.on_operation.clone();
        Callback::from(move |_: MouseEvent| on_operation.emit(op.clone()))
    };

    let duplicate = current_query
        .as_ref()
        .filter(|q| q.kind != WeekKind::Type)
        .map(|q| {
            WeekOperation::DuplicateType(DuplicateWeekRequest {
                target_kind: q.kind,
                week_start: q.week_start,
                vacation: q.vacation.clone(),
            })
        });

    let displayed_kind = props.query.as_ref().map(|q| q.kind);
    let range = props
        .query
        .as_ref()
        .and_then(|q| q.week_start)
        .map(format_week_range);

    html! {
        <div class="week-toolbar">
            <div class="week-selector">
                {if props.fixed_employee.is_none() {
                    html! {
                        <select onchange={on_employee_change}>
                            <option value="" selected={selected.is_none()} disabled=true>{"Employé..."}</option>
                            {for props.employees.iter().map(|e| html! {
                                <option value={e.id.to_string()} selected={selected == Some(e.id)}>
                                    {e.full_name.clone()}
                                </option>
                            })}
                        </select>
                    }
                } else {
                    html! {}
                }}

                <select onchange={on_kind_change}>
                    {for WeekKind::ALL.iter().map(|k| html! {
                        <option value={k.as_str()} selected={*k == *kind}>{k.label()}</option>
                    })}
                </select>

                {if kind.is_dated() {
                    html! { <input type="date" value={(*date).clone()} onchange={on_date_change} /> }
                } else {
                    html! {}
                }}

                {if *kind == WeekKind::Vacation {
                    html! {
                        <input
                            type="text"
                            placeholder="Période (ex. toussaint-2026)"
                            value={(*vacation).clone()}
                            oninput={on_vacation_input}
                        />
                    }
                } else {
                    html! {}
                }}

                <button class="btn btn-primary" onclick={on_show} disabled={selected.is_none()}>
                    {"Afficher"}
                </button>

                {if let Some(range) = range {
                    html! { <span class="week-range">{range}</span> }
                } else {
                    html! {}
                }}
            </div>

            {if props.can_edit && selected.is_some() {
                html! {
                    <div class="week-operations">
                        <button
                            class="btn btn-secondary"
                            onclick={operation(WeekOperation::OpenTypeWeek)}
                            disabled={props.busy}
                        >
                            {"Semaine type"}
                        </button>
                        {if let Some(duplicate) = duplicate {
                            html! {
                                <button
                                    class="btn btn-secondary"
                                    onclick={operation(duplicate)}
                                    disabled={props.busy}
                                    title="Remplace la semaine choisie par la semaine type"
                                >
                                    {"Générer depuis la semaine type"}
                                </button>
                            }
                        } else {
                            html! {}
                        }}
                        {if displayed_kind.map_or(false, |k| k != WeekKind::Type) {
                            html! {
                                <button
                                    class="btn btn-secondary"
                                    onclick={operation(WeekOperation::ResetFromTemplate)}
                                    disabled={props.busy}
                                >
                                    {"Réinitialiser"}
                                </button>
                            }
                        } else {
                            html! {}
                        }}
                        <button
                            class="btn btn-secondary"
                            onclick={operation(WeekOperation::CopyNextToCurrent)}
                            disabled={props.busy}
                        >
                            {"Copier la semaine suivante"}
                        </button>
                    </div>
                }
            } else {
                html! {}
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_dates_snap_to_monday() {
        let query = build_query(4, WeekKind::Current, "2026-10-17", "");
        assert_eq!(query.week_start, NaiveDate::from_ymd_opt(2026, 10, 12));
        assert!(query.validate().is_ok());
    }

    #[wasm_bindgen_test]
    fn test_type_week_ignores_date_and_vacation() {
        let query = build_query(4, WeekKind::Type, "2026-10-17", "noel");
        assert_eq!(query.week_start, None);
        assert_eq!(query.vacation, None);
    }

    #[wasm_bindgen_test]
    fn test_vacation_requires_a_period() {
        let query = build_query(4, WeekKind::Vacation, "2026-10-17", "  ");
        assert!(query.validate().is_err());
        let query = build_query(4, WeekKind::Vacation, "2026-10-17", "toussaint");
        assert_eq!(query.vacation.as_deref(), Some("toussaint"));
        assert!(query.validate().is_ok());
    }
}
