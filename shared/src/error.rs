use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body the server sends with every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// `detail` as display text. Validation errors from the server come as a
    /// list of objects with a `msg` field; those are joined.
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.get("msg")
                        .and_then(|msg| msg.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| item.to_string())
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}

/// Everything that can go wrong between the UI and the API
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Rejected locally before any request was sent, or by the server's
    /// input validation
    #[error("{0}")]
    Validation(String),
    /// Transport failure: server unreachable, CORS, timeout
    #[error("Erreur réseau : {0}")]
    Network(String),
    /// Session missing, invalid or expired; the user must log in again
    #[error("Session expirée : {0}")]
    Auth(String),
    /// The server refused the change, e.g. a slug already taken
    #[error("{0}")]
    Conflict(String),
    #[error("Erreur serveur {status} : {detail}")]
    Server { status: u16, detail: String },
    /// A 2xx response whose body could not be read
    #[error("Réponse illisible : {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-2xx response. `body` is the raw response text.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.message())
            .ok()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| {
                let body = body.trim();
                if body.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.to_string()
                }
            });

        match status {
            401 | 403 => ApiError::Auth(detail),
            409 => ApiError::Conflict(detail),
            400 | 422 => ApiError::Validation(detail),
            _ => ApiError::Server { status, detail },
        }
    }

    /// Like [`ApiError::from_status`] for employee creation and edition,
    /// where the server answers 400 when the slug is already taken.
    pub fn from_employee_write_status(status: u16, body: &str) -> Self {
        match Self::from_status(status, body) {
            ApiError::Validation(detail) if status == 400 => ApiError::Conflict(detail),
            other => other,
        }
    }

    /// Whether the session must be dropped and the user re-prompted
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }

    /// Whether offering a manual retry makes sense
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Server { status: 500.., .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_is_surfaced_verbatim() {
        let err = ApiError::from_status(409, r#"{"detail": "Slug déjà utilisé"}"#);
        assert_eq!(err, ApiError::Conflict("Slug déjà utilisé".to_string()));
        assert_eq!(err.to_string(), "Slug déjà utilisé");
    }

    #[test]
    fn test_bad_request_is_conflict_only_for_employee_writes() {
        let body = r#"{"detail": "Employee slug already exists"}"#;
        assert_eq!(
            ApiError::from_status(400, body),
            ApiError::Validation("Employee slug already exists".to_string())
        );
        assert_eq!(
            ApiError::from_employee_write_status(400, body),
            ApiError::Conflict("Employee slug already exists".to_string())
        );
        assert_eq!(
            ApiError::from_employee_write_status(422, body),
            ApiError::Validation("Employee slug already exists".to_string())
        );
        assert!(ApiError::from_employee_write_status(401, "").is_auth());
    }

    #[test]
    fn test_auth_statuses() {
        assert!(ApiError::from_status(401, r#"{"detail": "Token expired"}"#).is_auth());
        assert!(ApiError::from_status(403, "").is_auth());
    }

    #[test]
    fn test_validation_list_is_joined() {
        let body = r#"{"detail": [{"loc": ["body", "pin"], "msg": "field required"},
                                  {"loc": ["body"], "msg": "bad value"}]}"#;
        assert_eq!(
            ApiError::from_status(422, body),
            ApiError::Validation("field required; bad value".to_string())
        );
    }

    #[test]
    fn test_non_json_body_falls_back_to_text() {
        assert_eq!(
            ApiError::from_status(502, "Bad Gateway"),
            ApiError::Server {
                status: 502,
                detail: "Bad Gateway".to_string()
            }
        );
        assert_eq!(
            ApiError::from_status(500, "  "),
            ApiError::Server {
                status: 500,
                detail: "HTTP 500".to_string()
            }
        );
    }

    #[test]
    fn test_retryable() {
        assert!(ApiError::Network("offline".to_string()).is_retryable());
        assert!(ApiError::from_status(503, "").is_retryable());
        assert!(!ApiError::from_status(409, "").is_retryable());
        assert!(!ApiError::from_status(404, "").is_retryable());
    }
}
