use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminLoginRequest {
    pub pin: String,
}

/// Body of `POST /auth/employee-login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeLoginRequest {
    pub slug: String,
}

/// What both login endpoints answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_name: String,
}

/// An authenticated user. Expiry is enforced on the client only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub role: Role,
    pub display_name: String,
    #[serde(default)]
    pub employee_id: Option<i64>,
    #[serde(default)]
    pub employee_slug: Option<String>,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn from_login(
        response: LoginResponse,
        role: Role,
        employee_slug: Option<String>,
        now: DateTime<Utc>,
        config: &PlannerConfig,
    ) -> Self {
        let display_name = if response.user_name.trim().is_empty() {
            match role {
                Role::Admin => "Administrateur".to_string(),
                Role::Employee => employee_slug.clone().unwrap_or_default(),
            }
        } else {
            response.user_name
        };

        Self {
            role,
            display_name,
            employee_id: match role {
                Role::Employee => response.user_id,
                Role::Admin => None,
            },
            employee_slug,
            token: response.access_token,
            expires_at: now + config.session_duration(role),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }

    /// Slide an admin session forward after activity. Employee sessions
    /// keep their fixed lifetime.
    pub fn touch(&mut self, now: DateTime<Utc>, config: &PlannerConfig) {
        if self.is_admin() && !self.is_expired(now) {
            self.expires_at = now + config.session_duration(Role::Admin);
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn can_manage_employees(&self) -> bool {
        self.is_admin()
    }

    pub fn can_edit_schedule(&self) -> bool {
        self.is_admin()
    }

    pub fn can_backup(&self) -> bool {
        self.is_admin()
    }

    /// Admins see everybody, employees only themselves
    pub fn can_view_employee(&self, slug: &str) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Employee => self.employee_slug.as_deref() == Some(slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap()
    }

    fn response(name: &str) -> LoginResponse {
        LoginResponse {
            access_token: "tok".to_string(),
            user_id: Some(12),
            user_name: name.to_string(),
        }
    }

    #[test]
    fn test_admin_session_expires_after_thirty_minutes() {
        let config = PlannerConfig::default();
        let session = Session::from_login(response(""), Role::Admin, None, now(), &config);
        assert_eq!(session.display_name, "Administrateur");
        assert_eq!(session.employee_id, None);
        assert!(!session.is_expired(now() + Duration::minutes(29)));
        assert!(session.is_expired(now() + Duration::minutes(30)));
        assert_eq!(session.remaining(now() + Duration::hours(2)), Duration::zero());
        assert_eq!(session.bearer(), "Bearer tok");
    }

    #[test]
    fn test_employee_session_lasts_eight_hours() {
        let config = PlannerConfig::default();
        let session = Session::from_login(
            response("Marie"),
            Role::Employee,
            Some("marie".to_string()),
            now(),
            &config,
        );
        assert_eq!(session.employee_id, Some(12));
        assert!(!session.is_expired(now() + Duration::hours(7)));
        assert!(session.is_expired(now() + Duration::hours(8)));
    }

    #[test]
    fn test_touch_slides_admin_only() {
        let config = PlannerConfig::default();
        let later = now() + Duration::minutes(20);

        let mut admin = Session::from_login(response("A"), Role::Admin, None, now(), &config);
        admin.touch(later, &config);
        assert_eq!(admin.expires_at, later + Duration::minutes(30));

        let mut employee = Session::from_login(
            response("E"),
            Role::Employee,
            Some("e".to_string()),
            now(),
            &config,
        );
        let before = employee.expires_at;
        employee.touch(later, &config);
        assert_eq!(employee.expires_at, before);
    }

    #[test]
    fn test_permissions() {
        let config = PlannerConfig::default();
        let admin = Session::from_login(response("A"), Role::Admin, None, now(), &config);
        assert!(admin.can_manage_employees());
        assert!(admin.can_view_employee("anyone"));

        let employee = Session::from_login(
            response("E"),
            Role::Employee,
            Some("marie".to_string()),
            now(),
            &config,
        );
        assert!(!employee.can_edit_schedule());
        assert!(!employee.can_backup());
        assert!(employee.can_view_employee("marie"));
        assert!(!employee.can_view_employee("paul"));
    }

    #[test]
    fn test_session_round_trips_through_storage_json() {
        let config = PlannerConfig::default();
        let session = Session::from_login(response("A"), Role::Admin, None, now(), &config);
        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }
}
