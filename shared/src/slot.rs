use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::Category;
use crate::time_utils::{
    minutes_to_time, time_to_minutes, TimeFormatError, DAYS_PER_WEEK, MINUTES_PER_DAY,
    QUARTER_HOUR,
};

pub type SlotId = i64;

/// Suffix appended to the title of a slot duplicated on the grid
pub const DUPLICATE_TITLE_SUFFIX: &str = " (copie)";

/// A scheduled block of time inside a week.
///
/// `id` is `None` for a draft that has not been accepted by the server yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SlotId>,
    /// 0 = Monday ... 6 = Sunday
    pub day_index: u8,
    pub start_minute: u32,
    pub duration_minute: u32,
    pub title: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Slot {
    pub fn end_minute(&self) -> u32 {
        self.start_minute + self.duration_minute
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn timing(&self) -> SlotTiming {
        SlotTiming {
            day_index: self.day_index,
            start_minute: self.start_minute,
            duration_minute: self.duration_minute,
        }
    }

    /// `"09:00 - 10:30"`
    pub fn time_range_label(&self) -> String {
        format!(
            "{} - {}",
            minutes_to_time(self.start_minute),
            minutes_to_time(self.end_minute())
        )
    }

    /// Creation payload for a copy of this slot placed at `timing`
    pub fn duplicate_at(&self, timing: SlotTiming) -> NewSlotRequest {
        NewSlotRequest {
            day_index: timing.day_index,
            start_minute: timing.start_minute,
            duration_minute: timing.duration_minute,
            title: format!("{}{}", self.title, DUPLICATE_TITLE_SUFFIX),
            category: self.category.clone(),
            comment: self.comment.clone(),
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, update: &UpdateSlotRequest) {
        if let Some(day_index) = update.day_index {
            self.day_index = day_index;
        }
        if let Some(start_minute) = update.start_minute {
            self.start_minute = start_minute;
        }
        if let Some(duration_minute) = update.duration_minute {
            self.duration_minute = duration_minute;
        }
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(category) = &update.category {
            self.category = category.clone();
        }
        if let Some(comment) = &update.comment {
            self.comment = if comment.is_empty() {
                None
            } else {
                Some(comment.clone())
            };
        }
    }
}

/// Position of a slot on the week grid, without its content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTiming {
    pub day_index: u8,
    pub start_minute: u32,
    pub duration_minute: u32,
}

impl SlotTiming {
    pub fn new(day_index: u8, start_minute: u32, duration_minute: u32) -> Self {
        Self {
            day_index,
            start_minute,
            duration_minute,
        }
    }

    pub fn end_minute(&self) -> u32 {
        self.start_minute + self.duration_minute
    }
}

/// Body of `POST /weeks/{weekId}/slots`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSlotRequest {
    pub day_index: u8,
    pub start_minute: u32,
    pub duration_minute: u32,
    pub title: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl NewSlotRequest {
    pub fn timing(&self) -> SlotTiming {
        SlotTiming::new(self.day_index, self.start_minute, self.duration_minute)
    }

    /// The draft slot shown on the grid while the request is in flight
    pub fn into_draft(self) -> Slot {
        Slot {
            id: None,
            day_index: self.day_index,
            start_minute: self.start_minute,
            duration_minute: self.duration_minute,
            title: self.title,
            category: self.category,
            comment: self.comment,
        }
    }
}

/// Body of `PATCH /weeks/{weekId}/slots/{slotId}`; absent fields are left
/// untouched by the server. An empty `comment` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSlotRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_index: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl UpdateSlotRequest {
    pub fn is_empty(&self) -> bool {
        self == &UpdateSlotRequest::default()
    }

    /// Timing of `slot` once this update is applied
    pub fn timing_for(&self, slot: &Slot) -> SlotTiming {
        SlotTiming {
            day_index: self.day_index.unwrap_or(slot.day_index),
            start_minute: self.start_minute.unwrap_or(slot.start_minute),
            duration_minute: self.duration_minute.unwrap_or(slot.duration_minute),
        }
    }
}

/// A broken slot invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotValidationError {
    #[error("Day index {0} is outside Monday..Sunday")]
    DayOutOfRange(u8),
    #[error("Start minute {0} is outside the day")]
    StartOutOfRange(u32),
    #[error("Duration must be positive")]
    DurationNotPositive,
    #[error("Duration {0} is not a multiple of 15 minutes")]
    DurationNotQuarterHour(u32),
    #[error("Slot ends at minute {0}, after midnight")]
    EndsAfterMidnight(u32),
}

impl SlotValidationError {
    /// Stable machine code, used by forms to attach the error to a field
    pub fn code(&self) -> &'static str {
        match self {
            SlotValidationError::DayOutOfRange(_) => "day_out_of_range",
            SlotValidationError::StartOutOfRange(_) => "start_out_of_range",
            SlotValidationError::DurationNotPositive => "duration_not_positive",
            SlotValidationError::DurationNotQuarterHour(_) => "duration_not_multiple_of_15",
            SlotValidationError::EndsAfterMidnight(_) => "ends_after_midnight",
        }
    }
}

/// Result of [`validate_slot`]; every violated rule is reported
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlotValidation {
    pub valid: bool,
    pub errors: Vec<SlotValidationError>,
}

impl SlotValidation {
    pub fn codes(&self) -> Vec<&'static str> {
        self.errors.iter().map(SlotValidationError::code).collect()
    }

    pub fn into_result(self) -> Result<(), Vec<SlotValidationError>> {
        if self.valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Check the slot invariants: day in 0..=6, start in 0..=1439, duration a
/// positive multiple of 15, and the slot ending by midnight.
pub fn validate_slot(candidate: &SlotTiming) -> SlotValidation {
    let mut errors = Vec::new();

    if candidate.day_index >= DAYS_PER_WEEK {
        errors.push(SlotValidationError::DayOutOfRange(candidate.day_index));
    }
    if candidate.start_minute >= MINUTES_PER_DAY {
        errors.push(SlotValidationError::StartOutOfRange(candidate.start_minute));
    }
    if candidate.duration_minute == 0 {
        errors.push(SlotValidationError::DurationNotPositive);
    } else if candidate.duration_minute % QUARTER_HOUR != 0 {
        errors.push(SlotValidationError::DurationNotQuarterHour(
            candidate.duration_minute,
        ));
    }
    if candidate.end_minute() > MINUTES_PER_DAY {
        errors.push(SlotValidationError::EndsAfterMidnight(candidate.end_minute()));
    }

    SlotValidation {
        valid: errors.is_empty(),
        errors,
    }
}

/// Half-open interval intersection on the same day; touching slots do not
/// overlap.
pub fn slots_overlap(a: &SlotTiming, b: &SlotTiming) -> bool {
    if a.day_index != b.day_index {
        return false;
    }
    a.start_minute < b.end_minute() && b.start_minute < a.end_minute()
}

/// First slot in `existing` that `candidate` would overlap, unsaved drafts
/// included. The slot identified by `ignore` (the one being moved) is
/// skipped; drafts never match `ignore`.
pub fn find_overlap<'a>(
    candidate: &SlotTiming,
    existing: &'a [Slot],
    ignore: Option<SlotId>,
) -> Option<&'a Slot> {
    existing.iter().find(|slot| {
        (slot.id.is_none() || slot.id != ignore) && slots_overlap(candidate, &slot.timing())
    })
}

/// Raw values of the slot creation/edition form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotForm {
    pub day_index: u8,
    pub start: String,
    pub end: String,
    pub title: String,
    pub category: Category,
    pub comment: String,
}

impl SlotForm {
    pub fn for_new(day_index: u8, start_minute: u32, duration_minute: u32) -> Self {
        Self {
            day_index,
            start: minutes_to_time(start_minute),
            end: minutes_to_time(start_minute + duration_minute),
            ..Self::default()
        }
    }

    pub fn from_slot(slot: &Slot) -> Self {
        Self {
            day_index: slot.day_index,
            start: minutes_to_time(slot.start_minute),
            end: minutes_to_time(slot.end_minute()),
            title: slot.title.clone(),
            category: slot.category.clone(),
            comment: slot.comment.clone().unwrap_or_default(),
        }
    }
}

/// Field-level problem in a [`SlotForm`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotFormError {
    #[error("Heure de début invalide : {0}")]
    InvalidStart(TimeFormatError),
    #[error("Heure de fin invalide : {0}")]
    InvalidEnd(TimeFormatError),
    #[error("L'heure de fin doit être après l'heure de début")]
    EndNotAfterStart,
    #[error("Le titre est obligatoire")]
    EmptyTitle,
    #[error("{0}")]
    Slot(SlotValidationError),
}

impl SlotFormError {
    /// Form field the error belongs to
    pub fn field(&self) -> &'static str {
        match self {
            SlotFormError::InvalidStart(_) => "start",
            SlotFormError::InvalidEnd(_) | SlotFormError::EndNotAfterStart => "end",
            SlotFormError::EmptyTitle => "title",
            SlotFormError::Slot(SlotValidationError::DayOutOfRange(_)) => "day",
            SlotFormError::Slot(SlotValidationError::StartOutOfRange(_)) => "start",
            SlotFormError::Slot(_) => "end",
        }
    }
}

/// Validate the form and build the creation payload. All problems are
/// collected. An end time of `00:00` after a later start means midnight.
pub fn validate_slot_form(form: &SlotForm) -> Result<NewSlotRequest, Vec<SlotFormError>> {
    let mut errors = Vec::new();

    let start = time_to_minutes(form.start.trim())
        .map_err(|e| errors.push(SlotFormError::InvalidStart(e)))
        .ok();
    let end = time_to_minutes(form.end.trim())
        .map(|end| if end == 0 { MINUTES_PER_DAY } else { end })
        .map_err(|e| errors.push(SlotFormError::InvalidEnd(e)))
        .ok();

    let title = form.title.trim();
    if title.is_empty() {
        errors.push(SlotFormError::EmptyTitle);
    }

    let mut duration = 0;
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            errors.push(SlotFormError::EndNotAfterStart);
        } else {
            duration = end - start;
            let timing = SlotTiming::new(form.day_index, start, duration);
            errors.extend(validate_slot(&timing).errors.into_iter().map(SlotFormError::Slot));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let comment = form.comment.trim();
    Ok(NewSlotRequest {
        day_index: form.day_index,
        start_minute: start.unwrap_or_default(),
        duration_minute: duration,
        title: title.to_string(),
        category: form.category.clone(),
        comment: (!comment.is_empty()).then(|| comment.to_string()),
    })
}

/// Partial update turning `original` into the values of `request`
pub fn diff_slot(original: &Slot, request: &NewSlotRequest) -> UpdateSlotRequest {
    UpdateSlotRequest {
        day_index: (original.day_index != request.day_index).then_some(request.day_index),
        start_minute: (original.start_minute != request.start_minute)
            .then_some(request.start_minute),
        duration_minute: (original.duration_minute != request.duration_minute)
            .then_some(request.duration_minute),
        title: (original.title != request.title).then(|| request.title.clone()),
        category: (original.category != request.category).then(|| request.category.clone()),
        comment: (original.comment != request.comment)
            .then(|| request.comment.clone().unwrap_or_default()),
    }
}
