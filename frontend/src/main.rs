use log::LevelFilter;
use shared::{Employee, PlannerConfig, WeekKind, WeekQuery};
use yew::prelude::*;

mod components;
mod hooks;
mod services;

use components::backup_panel::BackupPanel;
use components::employee_admin::EmployeeAdmin;
use components::header::{AppView, Header};
use components::login_view::LoginView;
use components::planning_view::PlanningView;
use hooks::use_employees::use_employees;
use hooks::use_planning::use_planning;
use hooks::use_session::use_session;
use services::date_utils::current_week_start;
use services::{logging, storage, ApiClient, Logger};

#[derive(Properties, PartialEq)]
struct AppProps {
    config: PlannerConfig,
}

fn current_week_of(employee_id: i64) -> WeekQuery {
    WeekQuery::new(employee_id, WeekKind::Current).with_week_start(current_week_start())
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    let config = &props.config;
    let session = use_session(config);
    let view = use_state(|| AppView::Planning);

    let current = session.state.session.clone();
    let token = current.as_ref().map(|s| s.token.clone());
    let api = use_memo((config.api_base_url.clone(), token), |(base_url, token)| {
        ApiClient::new(base_url.clone()).with_token(token.clone())
    });

    let is_admin = current.as_ref().map_or(false, |s| s.is_admin());
    let can_edit = current.as_ref().map_or(false, |s| s.can_edit_schedule());
    let own_employee = current.as_ref().filter(|s| !s.is_admin()).and_then(|s| s.employee_id);

    let employees = use_employees(&api, is_admin, session.actions.expire.clone());
    let planning = use_planning(
        &api,
        config,
        !can_edit,
        session.actions.expire.clone(),
        session.actions.touch.clone(),
    );

    // Back to the planning screen whenever the user changes
    use_effect_with(current.as_ref().map(|s| (s.role, s.employee_id)), {
        let view = view.clone();
        move |_| {
            view.set(AppView::Planning);
            || ()
        }
    });

    // Open a first week once we know whose planning to show
    let default_employee = if is_admin {
        employees
            .state
            .employees
            .iter()
            .find(|e| e.active)
            .or_else(|| employees.state.employees.first())
            .map(|e| e.id)
    } else {
        own_employee
    };
    use_effect_with((default_employee, planning.state.query.is_none()), {
        let select_week = planning.actions.select_week.clone();
        move |(employee_id, no_week): &(Option<i64>, bool)| {
            if let (Some(employee_id), true) = (employee_id, no_week) {
                Logger::debug_with_component(
                    "app",
                    &format!("Opening current week of employee {}", employee_id),
                );
                select_week.emit(current_week_of(*employee_id));
            }
            || ()
        }
    });

    let on_navigate = {
        let view = view.clone();
        Callback::from(move |next: AppView| view.set(next))
    };

    let on_open_planning = {
        let view = view.clone();
        let select_week = planning.actions.select_week.clone();
        Callback::from(move |employee: Employee| {
            select_week.emit(current_week_of(employee.id));
            view.set(AppView::Planning);
        })
    };

    let on_restored = {
        let refresh = employees.actions.refresh.clone();
        let reload = planning.actions.reload.clone();
        Callback::from(move |_: ()| {
            refresh.emit(());
            reload.emit(());
        })
    };

    let Some(active) = current else {
        return html! {
            <LoginView
                logging_in={session.state.logging_in}
                message={session.state.message.clone()}
                on_admin_login={session.actions.login_admin.clone()}
                on_employee_login={session.actions.login_employee.clone()}
            />
        };
    };

    // A view the session lost access to falls back to the planning
    let shown = if AppView::available(&active).contains(&*view) {
        *view
    } else {
        AppView::Planning
    };

    let body = match shown {
        AppView::Planning => html! {
            <PlanningView
                config={config.clone()}
                state={planning.state.clone()}
                actions={planning.actions.clone()}
                employees={employees.state.employees.clone()}
                fixed_employee={own_employee}
                can_edit={can_edit}
            />
        },
        AppView::Employees => html! {
            <EmployeeAdmin
                state={employees.state.clone()}
                actions={employees.actions.clone()}
                on_open_planning={on_open_planning}
            />
        },
        AppView::Backup => html! {
            <BackupPanel
                api={(*api).clone()}
                on_auth_error={session.actions.expire.clone()}
                on_restored={on_restored}
            />
        },
    };

    html! {
        <div class="app">
            <Header
                session={active}
                view={shown}
                on_navigate={on_navigate}
                on_logout={session.actions.logout.clone()}
            />
            <main class="main">
                <div class="container">
                    {body}
                </div>
            </main>
        </div>
    }
}

fn main() {
    logging::init(LevelFilter::Info);
    let config = storage::load_config();
    logging::init(config.level_filter());
    Logger::info_with_component(
        "app",
        &format!("Starting planner against {}", config.api_base_url),
    );
    yew::Renderer::<App>::with_props(AppProps { config }).render();
}
