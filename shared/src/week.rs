use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::category::{calculate_repartition_percentages, Category, CategoryTotals};
use crate::employee::EmployeeId;
use crate::slot::{Slot, SlotId};
use crate::time_utils::{is_monday, DAYS_PER_WEEK};

pub type WeekId = i64;

/// Which flavour of week a schedule is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekKind {
    /// Canonical template the other kinds are generated from
    Type,
    Current,
    Next,
    /// Special period, tagged with a vacation name
    Vacation,
}

impl WeekKind {
    pub const ALL: [WeekKind; 4] = [
        WeekKind::Type,
        WeekKind::Current,
        WeekKind::Next,
        WeekKind::Vacation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekKind::Type => "type",
            WeekKind::Current => "current",
            WeekKind::Next => "next",
            WeekKind::Vacation => "vacation",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        WeekKind::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeekKind::Type => "Semaine type",
            WeekKind::Current => "Semaine en cours",
            WeekKind::Next => "Semaine suivante",
            WeekKind::Vacation => "Vacances",
        }
    }

    /// Template weeks are not tied to a calendar date
    pub fn is_dated(&self) -> bool {
        !matches!(self, WeekKind::Type)
    }
}

impl fmt::Display for WeekKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text notes attached to a week
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekNotes {
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub last_editor: Option<String>,
    /// RFC 3339 timestamp of the last edition
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Derived sums of slot durations. Never edited directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekTotals {
    /// Minutes per day, Monday first
    #[serde(default)]
    pub per_day: Vec<u32>,
    /// Minutes over the whole week
    #[serde(default)]
    pub week: u32,
    #[serde(default)]
    pub by_category: CategoryTotals,
}

impl WeekTotals {
    pub fn from_slots(slots: &[Slot]) -> Self {
        let mut per_day = vec![0u32; DAYS_PER_WEEK as usize];
        for slot in slots {
            if let Some(day) = per_day.get_mut(slot.day_index as usize) {
                *day += slot.duration_minute;
            }
        }
        Self {
            week: per_day.iter().sum(),
            per_day,
            by_category: CategoryTotals::from_slots(slots),
        }
    }

    pub fn day_minutes(&self, day_index: u8) -> u32 {
        self.per_day.get(day_index as usize).copied().unwrap_or(0)
    }

    pub fn percentages(&self) -> std::collections::BTreeMap<Category, f64> {
        calculate_repartition_percentages(&self.by_category)
    }
}

/// A week as returned by `GET /weeks`, with its slots, notes and totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSnapshot {
    pub id: WeekId,
    pub employee_id: EmployeeId,
    pub kind: WeekKind,
    #[serde(default)]
    pub vacation: Option<String>,
    #[serde(default)]
    pub week_start: Option<NaiveDate>,
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(default)]
    pub notes: Option<WeekNotes>,
    #[serde(default)]
    pub totals: WeekTotals,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl WeekSnapshot {
    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == Some(id))
    }

    pub fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|slot| slot.id == Some(id))
    }

    /// Slots of one day ordered by start time
    pub fn slots_for_day(&self, day_index: u8) -> Vec<&Slot> {
        let mut slots: Vec<&Slot> = self
            .slots
            .iter()
            .filter(|slot| slot.day_index == day_index)
            .collect();
        slots.sort_by_key(|slot| (slot.start_minute, slot.id));
        slots
    }

    pub fn remove_slot(&mut self, id: SlotId) -> Option<Slot> {
        let position = self.slots.iter().position(|slot| slot.id == Some(id))?;
        Some(self.slots.remove(position))
    }

    /// Refresh `totals` after the slot list changed locally
    pub fn recompute_totals(&mut self) {
        self.totals = WeekTotals::from_slots(&self.slots);
    }
}

/// Parameters of `GET /weeks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekQuery {
    pub employee_id: EmployeeId,
    pub kind: WeekKind,
    #[serde(default)]
    pub vacation: Option<String>,
    #[serde(default)]
    pub week_start: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeekQueryError {
    #[error("La semaine doit commencer un lundi ({0})")]
    StartNotMonday(NaiveDate),
    #[error("Une période de vacances est requise")]
    MissingVacation,
    #[error("Seules les semaines de vacances ont une période")]
    UnexpectedVacation,
}

impl WeekQuery {
    pub fn new(employee_id: EmployeeId, kind: WeekKind) -> Self {
        Self {
            employee_id,
            kind,
            vacation: None,
            week_start: None,
        }
    }

    pub fn with_week_start(mut self, week_start: NaiveDate) -> Self {
        self.week_start = Some(week_start);
        self
    }

    pub fn with_vacation(mut self, vacation: impl Into<String>) -> Self {
        self.vacation = Some(vacation.into());
        self
    }

    pub fn validate(&self) -> Result<(), WeekQueryError> {
        if let Some(week_start) = self.week_start {
            if !is_monday(week_start) {
                return Err(WeekQueryError::StartNotMonday(week_start));
            }
        }
        let has_vacation = self
            .vacation
            .as_deref()
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        match (self.kind, has_vacation) {
            (WeekKind::Vacation, false) => Err(WeekQueryError::MissingVacation),
            (WeekKind::Vacation, true) => Ok(()),
            (_, true) => Err(WeekQueryError::UnexpectedVacation),
            (_, false) => Ok(()),
        }
    }

    /// Query-string pairs in the order the server documents them
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("employee_id", self.employee_id.to_string()),
            ("kind", self.kind.as_str().to_string()),
        ];
        if let Some(vacation) = &self.vacation {
            pairs.push(("vacation", vacation.trim().to_string()));
        }
        if let Some(week_start) = self.week_start {
            pairs.push(("week_start", week_start.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

/// Body of `PUT /weeks/{weekId}/notes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotesUpdateRequest {
    pub comment: String,
}

/// Body of `POST /weeks/{typeWeekId}/duplicate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateWeekRequest {
    pub target_kind: WeekKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacation: Option<String>,
}

impl DuplicateWeekRequest {
    /// The week this duplication produces, checked like a fetch
    pub fn target_query(&self, employee_id: EmployeeId) -> WeekQuery {
        WeekQuery {
            employee_id,
            kind: self.target_kind,
            vacation: self.vacation.clone(),
            week_start: self.week_start,
        }
    }
}

/// Body of `POST /weeks/copy-next-to-current`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyNextToCurrentRequest {
    pub employee_id: EmployeeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: SlotId, day: u8, start: u32, duration: u32, category: Category) -> Slot {
        Slot {
            id: Some(id),
            day_index: day,
            start_minute: start,
            duration_minute: duration,
            title: "x".to_string(),
            category,
            comment: None,
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 12).unwrap()
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(serde_json::to_string(&WeekKind::Type).unwrap(), "\"type\"");
        assert_eq!(serde_json::to_string(&WeekKind::Vacation).unwrap(), "\"vacation\"");
        assert_eq!(WeekKind::parse("next"), Some(WeekKind::Next));
        assert_eq!(WeekKind::parse("later"), None);
        assert!(!WeekKind::Type.is_dated());
    }

    #[test]
    fn test_totals_from_slots() {
        let slots = vec![
            slot(1, 0, 540, 60, Category::Ecole),
            slot(2, 0, 660, 30, Category::Loisir),
            slot(3, 4, 480, 120, Category::Ecole),
        ];
        let totals = WeekTotals::from_slots(&slots);
        assert_eq!(totals.per_day, vec![90, 0, 0, 0, 120, 0, 0]);
        assert_eq!(totals.week, 210);
        assert_eq!(totals.by_category.hours(&Category::Ecole), 3.0);
        assert_eq!(totals.by_category.hours(&Category::Loisir), 0.5);
        assert_eq!(totals.day_minutes(4), 120);
    }

    #[test]
    fn test_snapshot_deserializes_with_defaults() {
        let json = r#"{
            "id": 7,
            "employee_id": 3,
            "kind": "current",
            "week_start": "2026-10-12",
            "slots": [
                {"id": 1, "day_index": 2, "start_minute": 600, "duration_minute": 60,
                 "title": "Cours", "category": "ecole"}
            ]
        }"#;
        let mut week: WeekSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(week.kind, WeekKind::Current);
        assert_eq!(week.week_start, Some(monday()));
        assert!(week.notes.is_none());
        assert_eq!(week.slot(1).map(|s| s.title.as_str()), Some("Cours"));

        week.recompute_totals();
        assert_eq!(week.totals.week, 60);
    }

    #[test]
    fn test_slots_for_day_sorted() {
        let week = WeekSnapshot {
            id: 1,
            employee_id: 1,
            kind: WeekKind::Type,
            vacation: None,
            week_start: None,
            slots: vec![
                slot(1, 1, 700, 30, Category::Ecole),
                slot(2, 1, 500, 30, Category::Ecole),
                slot(3, 2, 400, 30, Category::Ecole),
            ],
            notes: None,
            totals: WeekTotals::default(),
            metadata: serde_json::Value::Null,
        };
        let ids: Vec<_> = week.slots_for_day(1).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![Some(2), Some(1)]);
    }

    #[test]
    fn test_query_validation() {
        let ok = WeekQuery::new(1, WeekKind::Current).with_week_start(monday());
        assert!(ok.validate().is_ok());

        let tuesday = monday().succ_opt().unwrap();
        let bad = WeekQuery::new(1, WeekKind::Current).with_week_start(tuesday);
        assert_eq!(bad.validate(), Err(WeekQueryError::StartNotMonday(tuesday)));

        let vacation = WeekQuery::new(1, WeekKind::Vacation);
        assert_eq!(vacation.validate(), Err(WeekQueryError::MissingVacation));
        assert!(vacation.with_vacation("toussaint").validate().is_ok());

        let stray = WeekQuery::new(1, WeekKind::Next).with_vacation("noel");
        assert_eq!(stray.validate(), Err(WeekQueryError::UnexpectedVacation));
    }

    #[test]
    fn test_query_pairs() {
        let query = WeekQuery::new(4, WeekKind::Vacation)
            .with_vacation(" ete ")
            .with_week_start(monday());
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("employee_id", "4".to_string()),
                ("kind", "vacation".to_string()),
                ("vacation", "ete".to_string()),
                ("week_start", "2026-10-12".to_string()),
            ]
        );
    }
}
