use shared::{ApiError, CreateEmployeeRequest, Employee, EmployeeId, UpdateEmployeeRequest};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::{ApiClient, Logger};

/// Called back with the outcome of a save, so a form can close or show the
/// server's message
pub type Responder = Callback<Result<(), String>>;

#[derive(Clone, PartialEq)]
pub struct EmployeesState {
    pub employees: Vec<Employee>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct UseEmployeesResult {
    pub state: EmployeesState,
    pub actions: UseEmployeesActions,
}

#[derive(Clone, PartialEq)]
pub struct UseEmployeesActions {
    pub refresh: Callback<()>,
    pub create: Callback<(CreateEmployeeRequest, Responder)>,
    pub update: Callback<(EmployeeId, UpdateEmployeeRequest, Responder)>,
    pub delete: Callback<(EmployeeId, Responder)>,
}

/// Loads the employee list when `enabled` and `api` carries a token.
/// `on_auth_error` receives the reason when the server refuses the session.
#[hook]
pub fn use_employees(
    api: &ApiClient,
    enabled: bool,
    on_auth_error: Callback<String>,
) -> UseEmployeesResult {
    let employees = use_state(Vec::<Employee>::new);
    let loading = use_state(|| false);
    let error = use_state(|| Option::<String>::None);

    let report = {
        let on_auth_error = on_auth_error.clone();
        move |e: &ApiError| {
            if e.is_auth() {
                on_auth_error.emit(e.to_string());
            }
        }
    };

    let refresh = {
        let employees = employees.clone();
        let loading = loading.clone();
        let error = error.clone();
        let report = report.clone();
        use_callback((api.clone(), enabled), move |_: (), (api, enabled)| {
            if !*enabled || !api.has_token() {
                employees.set(Vec::new());
                return;
            }
            let api = api.clone();
            let employees = employees.clone();
            let loading = loading.clone();
            let error = error.clone();
            let report = report.clone();

            spawn_local(async move {
                loading.set(true);
                match api.list_employees().await {
                    Ok(list) => {
                        Logger::debug_with_component(
                            "employees",
                            &format!("Loaded {} employees", list.len()),
                        );
                        error.set(None);
                        employees.set(list);
                    }
                    Err(e) => {
                        Logger::error_with_component(
                            "employees",
                            &format!("Failed to load employees: {}", e),
                        );
                        report(&e);
                        error.set(Some(e.to_string()));
                    }
                }
                loading.set(false);
            });
        })
    };

    let create = {
        let report = report.clone();
        use_callback(
            (api.clone(), refresh.clone()),
            move |(request, done): (CreateEmployeeRequest, Responder), (api, refresh)| {
                let api = api.clone();
                let refresh = refresh.clone();
                let report = report.clone();
                spawn_local(async move {
                    match api.create_employee(&request).await {
                        Ok(employee) => {
                            Logger::info_with_component(
                                "employees",
                                &format!("Created employee {}", employee.slug),
                            );
                            done.emit(Ok(()));
                            refresh.emit(());
                        }
                        Err(e) => {
                            report(&e);
                            done.emit(Err(e.to_string()));
                        }
                    }
                });
            },
        )
    };

    let update = {
        let report = report.clone();
        use_callback(
            (api.clone(), refresh.clone()),
            move |(id, request, done): (EmployeeId, UpdateEmployeeRequest, Responder),
                  (api, refresh)| {
                if request == UpdateEmployeeRequest::default() {
                    done.emit(Ok(()));
                    return;
                }
                let api = api.clone();
                let refresh = refresh.clone();
                let report = report.clone();
                spawn_local(async move {
                    match api.update_employee(id, &request).await {
                        Ok(_) => {
                            Logger::info_with_component(
                                "employees",
                                &format!("Updated employee {}", id),
                            );
                            done.emit(Ok(()));
                            refresh.emit(());
                        }
                        Err(e) => {
                            report(&e);
                            done.emit(Err(e.to_string()));
                        }
                    }
                });
            },
        )
    };

    let delete = use_callback(
        (api.clone(), refresh.clone()),
        move |(id, done): (EmployeeId, Responder), (api, refresh)| {
            let api = api.clone();
            let refresh = refresh.clone();
            let report = report.clone();
            spawn_local(async move {
                match api.delete_employee(id).await {
                    Ok(()) => {
                        Logger::info_with_component(
                            "employees",
                            &format!("Deleted employee {}", id),
                        );
                        done.emit(Ok(()));
                        refresh.emit(());
                    }
                    Err(e) => {
                        report(&e);
                        done.emit(Err(e.to_string()));
                    }
                }
            });
        },
    );

    // Reload whenever the token changes
    use_effect_with((api.clone(), enabled), {
        let refresh = refresh.clone();
        move |_| {
            refresh.emit(());
            || ()
        }
    });

    let state = EmployeesState {
        employees: (*employees).clone(),
        loading: *loading,
        error: (*error).clone(),
    };

    let actions = UseEmployeesActions {
        refresh,
        create,
        update,
        delete,
    };

    UseEmployeesResult { state, actions }
}
