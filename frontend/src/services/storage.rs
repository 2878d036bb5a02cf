use chrono::{DateTime, Utc};
use gloo::storage::{LocalStorage, Storage};
use shared::{PlannerConfig, Session};

use super::logging::Logger;

/// localStorage key holding a partial JSON [`PlannerConfig`]
pub const CONFIG_KEY: &str = "planning.config";

/// Defaults, overlaid with the stored overrides when they are valid
pub fn load_config() -> PlannerConfig {
    let stored = match LocalStorage::get::<serde_json::Value>(CONFIG_KEY) {
        Ok(value) => value,
        Err(_) => return PlannerConfig::default(),
    };
    match PlannerConfig::from_json_overrides(&stored.to_string()) {
        Ok(config) => config,
        Err(e) => {
            Logger::warn_with_component("storage", &format!("Ignoring stored config: {}", e));
            PlannerConfig::default()
        }
    }
}

/// Session saved by a previous page load, if still valid at `now`
pub fn load_session(key: &str, now: DateTime<Utc>) -> Option<Session> {
    let session = LocalStorage::get::<Session>(key).ok()?;
    if session.is_expired(now) {
        Logger::info_with_component("storage", "Stored session expired, discarding it");
        clear_session(key);
        return None;
    }
    Some(session)
}

pub fn save_session(key: &str, session: &Session) {
    if let Err(e) = LocalStorage::set(key, session) {
        Logger::warn_with_component("storage", &format!("Could not persist session: {}", e));
    }
}

pub fn clear_session(key: &str) {
    LocalStorage::delete(key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shared::{LoginResponse, Role};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn session(now: DateTime<Utc>) -> Session {
        let response = LoginResponse {
            access_token: "tok".to_string(),
            user_id: None,
            user_name: "Admin".to_string(),
        };
        Session::from_login(response, Role::Admin, None, now, &PlannerConfig::default())
    }

    #[wasm_bindgen_test]
    fn test_session_round_trip_and_expiry() {
        let key = "planning.session.test";
        let now = Utc::now();
        save_session(key, &session(now));
        assert_eq!(load_session(key, now).map(|s| s.token), Some("tok".to_string()));

        assert!(load_session(key, now + Duration::hours(1)).is_none());
        assert!(LocalStorage::get::<Session>(key).is_err());
    }

    #[wasm_bindgen_test]
    fn test_invalid_config_override_falls_back_to_defaults() {
        LocalStorage::set(CONFIG_KEY, serde_json::json!({"grid_start_hour": 23, "grid_end_hour": 8}))
            .unwrap();
        assert_eq!(load_config(), PlannerConfig::default());

        LocalStorage::set(CONFIG_KEY, serde_json::json!({"pixels_per_hour": 80.0})).unwrap();
        assert_eq!(load_config().pixels_per_hour, 80.0);
        LocalStorage::delete(CONFIG_KEY);
    }
}
