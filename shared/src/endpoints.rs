//! Paths of the planning API, relative to the configured base URL.

use crate::employee::EmployeeId;
use crate::slot::SlotId;
use crate::week::WeekId;

pub const ADMIN_LOGIN: &str = "/auth/login";
pub const EMPLOYEE_LOGIN: &str = "/auth/employee-login";
pub const EMPLOYEES: &str = "/employees";
pub const WEEKS: &str = "/weeks";
pub const COPY_NEXT_TO_CURRENT: &str = "/weeks/copy-next-to-current";
pub const BACKUP: &str = "/backup/backup";
pub const RESTORE: &str = "/backup/restore";

pub fn employee(id: EmployeeId) -> String {
    format!("{}/{}", EMPLOYEES, id)
}

pub fn week_slots(week_id: WeekId) -> String {
    format!("{}/{}/slots", WEEKS, week_id)
}

pub fn week_slot(week_id: WeekId, slot_id: SlotId) -> String {
    format!("{}/{}/slots/{}", WEEKS, week_id, slot_id)
}

pub fn week_notes(week_id: WeekId) -> String {
    format!("{}/{}/notes", WEEKS, week_id)
}

pub fn type_week(employee_id: EmployeeId) -> String {
    format!("{}/templates/{}", WEEKS, employee_id)
}

pub fn duplicate_week(type_week_id: WeekId) -> String {
    format!("{}/{}/duplicate", WEEKS, type_week_id)
}

pub fn reset_from_template(week_id: WeekId) -> String {
    format!("{}/{}/reset-from-template", WEEKS, week_id)
}

/// Join a base URL and an API path without doubling or dropping slashes
pub fn join(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_paths() {
        assert_eq!(week_slots(3), "/weeks/3/slots");
        assert_eq!(week_slot(3, 41), "/weeks/3/slots/41");
        assert_eq!(week_notes(3), "/weeks/3/notes");
        assert_eq!(employee(9), "/employees/9");
        assert_eq!(type_week(9), "/weeks/templates/9");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("http://api/", "/weeks"), "http://api/weeks");
        assert_eq!(join("http://api", "weeks"), "http://api/weeks");
        assert_eq!(join("http://api/v1//", "/employees/2"), "http://api/v1/employees/2");
    }
}
