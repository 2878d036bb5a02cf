use chrono::Duration;
use gloo::timers::callback::Interval;
use shared::{ApiError, PlannerConfig, Role, Session};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::date_utils::now_utc;
use crate::services::{storage, ApiClient, Logger};

/// How often the expiry of the session is checked
const EXPIRY_CHECK_MS: u32 = 15_000;

#[derive(Clone, PartialEq)]
pub struct SessionState {
    pub session: Option<Session>,
    pub logging_in: bool,
    /// Why the last login failed, or why the user was logged out
    pub message: Option<String>,
}

pub struct UseSessionResult {
    pub state: SessionState,
    pub actions: UseSessionActions,
}

#[derive(Clone, PartialEq)]
pub struct UseSessionActions {
    /// Admin login with a PIN
    pub login_admin: Callback<String>,
    /// Employee self-login with a slug
    pub login_employee: Callback<String>,
    pub logout: Callback<()>,
    /// Forced logout, e.g. after the server answered 401
    pub expire: Callback<String>,
    /// Slide an admin session forward after a successful change
    pub touch: Callback<()>,
}

#[hook]
pub fn use_session(config: &PlannerConfig) -> UseSessionResult {
    let storage_key = config.storage_key.clone();
    let session = use_state({
        let storage_key = storage_key.clone();
        move || storage::load_session(&storage_key, now_utc())
    });
    let logging_in = use_state(|| false);
    let message = use_state(|| Option::<String>::None);

    let store = {
        let session = session.clone();
        let storage_key = storage_key.clone();
        move |next: Option<Session>| {
            match &next {
                Some(s) => storage::save_session(&storage_key, s),
                None => storage::clear_session(&storage_key),
            }
            session.set(next);
        }
    };

    let login = {
        let config = config.clone();
        let logging_in = logging_in.clone();
        let message = message.clone();
        let store = store.clone();
        move |role: Role, credential: String| {
            let config = config.clone();
            let logging_in = logging_in.clone();
            let message = message.clone();
            let store = store.clone();
            let credential = credential.trim().to_string();
            if credential.is_empty() {
                message.set(Some(match role {
                    Role::Admin => "Saisissez le code PIN".to_string(),
                    Role::Employee => "Saisissez votre identifiant".to_string(),
                }));
                return;
            }

            spawn_local(async move {
                logging_in.set(true);
                message.set(None);

                let api = ApiClient::new(config.api_base_url.clone());
                let result = match role {
                    Role::Admin => api.login_admin(&credential).await,
                    Role::Employee => api.login_employee(&credential).await,
                };
                match result {
                    Ok(response) => {
                        let slug = (role == Role::Employee).then(|| credential.clone());
                        let fresh = Session::from_login(response, role, slug, now_utc(), &config);
                        Logger::info_with_component(
                            "session",
                            &format!("Logged in as {} ({:?})", fresh.display_name, role),
                        );
                        store(Some(fresh));
                    }
                    Err(e) => {
                        Logger::warn_with_component("session", &format!("Login failed: {}", e));
                        let text = match e {
                            ApiError::Auth(_) => match role {
                                Role::Admin => "Code PIN incorrect".to_string(),
                                Role::Employee => "Identifiant inconnu".to_string(),
                            },
                            other => other.to_string(),
                        };
                        message.set(Some(text));
                    }
                }
                logging_in.set(false);
            });
        }
    };

    let login_admin = {
        let login = login.clone();
        use_callback((), move |pin: String, _| login(Role::Admin, pin))
    };

    let login_employee = use_callback((), move |slug: String, _| login(Role::Employee, slug));

    let logout = {
        let store = store.clone();
        let message = message.clone();
        use_callback((), move |_: (), _| {
            Logger::info_with_component("session", "Logged out");
            message.set(None);
            store(None);
        })
    };

    let expire = {
        let store = store.clone();
        let message = message.clone();
        use_callback((), move |reason: String, _| {
            Logger::warn_with_component("session", &format!("Session ended: {}", reason));
            message.set(Some(reason));
            store(None);
        })
    };

    let touch = {
        let config = config.clone();
        let store = store.clone();
        use_callback((*session).clone(), move |_: (), current| {
            let Some(current) = current else {
                return;
            };
            let now = now_utc();
            let lifetime = config.session_duration(current.role);
            // Re-store at most once a minute
            if !current.is_admin() || lifetime - current.remaining(now) < Duration::minutes(1) {
                return;
            }
            let mut next = current.clone();
            next.touch(now, &config);
            store(Some(next));
        })
    };

    // Check expiry periodically while logged in
    use_effect_with((*session).clone(), {
        let expire = expire.clone();
        move |current: &Option<Session>| {
            let interval = current.clone().map(|current| {
                Interval::new(EXPIRY_CHECK_MS, move || {
                    if current.is_expired(now_utc()) {
                        expire.emit("Session expirée, veuillez vous reconnecter".to_string());
                    }
                })
            });
            move || drop(interval)
        }
    });

    let state = SessionState {
        session: (*session).clone(),
        logging_in: *logging_in,
        message: (*message).clone(),
    };

    let actions = UseSessionActions {
        login_admin,
        login_employee,
        logout,
        expire,
        touch,
    };

    UseSessionResult { state, actions }
}
