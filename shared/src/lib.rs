//! Domain types and rules of the weekly planner, shared by the web front-end
//! and anything else that talks to the planning API.

use serde::{Deserialize, Serialize};

pub mod category;
pub mod config;
pub mod employee;
pub mod endpoints;
pub mod error;
pub mod fetch;
pub mod grid;
pub mod session;
pub mod slot;
pub mod time_utils;
pub mod week;

pub use category::{
    calculate_repartition_percentages, get_sorted_categories, Category, CategoryStyle,
    CategoryTotals,
};
pub use config::{ConfigError, PlannerConfig};
pub use employee::{
    slugify, validate_employee_form, validate_slug, CreateEmployeeRequest, Employee, EmployeeId,
    EmployeeValidationError, UpdateEmployeeRequest,
};
pub use error::{ApiError, ErrorBody};
pub use fetch::{FetchSequence, FetchTicket};
pub use grid::{
    DisplayedSlot, DragMode, DragSession, DropRejection, GridCell, GridController, GridGeometry,
    GridOutcome, GridSettings, GridState, PointerButton, PointerPos, PointerTarget, SlotIntent,
};
pub use session::{AdminLoginRequest, EmployeeLoginRequest, LoginResponse, Role, Session};
pub use slot::{
    diff_slot, find_overlap, slots_overlap, validate_slot, validate_slot_form, NewSlotRequest,
    Slot, SlotForm, SlotFormError, SlotId, SlotTiming, SlotValidation, SlotValidationError,
    UpdateSlotRequest,
};
pub use time_utils::{
    format_duration, generate_time_slots, get_slot_position, minutes_to_time,
    snap_to_quarter_hour, time_to_minutes, TimeFormatError, TimeMark,
};
pub use week::{
    CopyNextToCurrentRequest, DuplicateWeekRequest, NotesUpdateRequest, WeekId, WeekKind,
    WeekNotes, WeekQuery, WeekQueryError, WeekSnapshot, WeekTotals,
};

/// Opaque export produced by `POST /backup/backup` and accepted back by
/// `POST /backup/restore`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupPayload(pub serde_json::Value);

impl BackupPayload {
    /// Suggested download name, e.g. `planning-backup-2026-10-17.json`
    pub fn file_name(date: chrono::NaiveDate) -> String {
        format!("planning-backup-{}.json", date.format("%Y-%m-%d"))
    }

    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }

    /// Parse a file chosen for restore. Only checks that it is a JSON
    /// object; the server validates the content.
    pub fn from_file_text(text: &str) -> Result<Self, BackupFileError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| BackupFileError::NotJson(e.to_string()))?;
        if !value.is_object() {
            return Err(BackupFileError::NotAnObject);
        }
        Ok(BackupPayload(value))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackupFileError {
    #[error("Le fichier n'est pas du JSON valide : {0}")]
    NotJson(String),
    #[error("Le fichier ne contient pas une sauvegarde")]
    NotAnObject,
}

/// Answer of `POST /backup/restore`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreResponse {
    #[serde(default)]
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_file_name() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(BackupPayload::file_name(date), "planning-backup-2026-10-17.json");
    }

    #[test]
    fn test_backup_file_parsing() {
        let payload = BackupPayload::from_file_text(r#"{"employees": []}"#).unwrap();
        assert_eq!(payload.0["employees"], serde_json::json!([]));
        assert_eq!(
            BackupPayload::from_file_text("[1, 2]"),
            Err(BackupFileError::NotAnObject)
        );
        assert!(matches!(
            BackupPayload::from_file_text("not json"),
            Err(BackupFileError::NotJson(_))
        ));
    }
}
