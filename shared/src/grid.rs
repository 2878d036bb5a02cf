//! Pointer interaction on the week grid.
//!
//! The controller turns raw pointer events into at most one slot intent per
//! interaction. It also owns the displayed copy of the week: the last
//! snapshot the server confirmed, plus optimistic edits for intents that are
//! still in flight.
//!
//! ```text
//! Idle --press empty cell--> Pressed --release--> Idle (+ create form)
//! Idle --press slot/handle--> Dragging --move--> Dragging --release--> Idle (+ intent)
//! ```

use log::{debug, info, warn};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::config::PlannerConfig;
use crate::slot::{
    find_overlap, validate_slot, NewSlotRequest, Slot, SlotId, SlotTiming, SlotValidationError,
    UpdateSlotRequest,
};
use crate::time_utils::{floor_to_quarter_hour, DAYS_PER_WEEK, MINUTES_PER_DAY, QUARTER_HOUR};
use crate::week::WeekSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    Resize,
    Duplicate,
}

/// What was under the pointer when the button went down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    EmptyCell,
    SlotBody(SlotId),
    ResizeHandle(SlotId),
    DuplicateHandle(SlotId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Other,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` value
    pub fn from_dom(button: i16) -> Self {
        if button == 0 {
            PointerButton::Primary
        } else {
            PointerButton::Other
        }
    }
}

/// Client coordinates of the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPos {
    pub x: f64,
    pub y: f64,
}

impl PointerPos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &PointerPos) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Day column and quarter-hour row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub day_index: u8,
    pub start_minute: u32,
}

/// Bounding box of the day columns on screen, plus the hours they span
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl GridGeometry {
    /// Cell under a client position, clamped to the grid
    pub fn cell_at(&self, pos: PointerPos) -> GridCell {
        let day_index = if self.width > 0.0 {
            let column = ((pos.x - self.left) / (self.width / DAYS_PER_WEEK as f64)).floor();
            column.clamp(0.0, (DAYS_PER_WEEK - 1) as f64) as u8
        } else {
            0
        };

        let first = self.start_hour * 60;
        let last = (self.end_hour * 60).saturating_sub(QUARTER_HOUR).max(first);
        let start_minute = if self.height > 0.0 {
            let span = (self.end_hour.saturating_sub(self.start_hour) * 60) as f64;
            let ratio = ((pos.y - self.top) / self.height).clamp(0.0, 1.0);
            floor_to_quarter_hour(first + (ratio * span).floor() as u32).clamp(first, last)
        } else {
            first
        };

        GridCell {
            day_index,
            start_minute,
        }
    }
}

/// The part of [`PlannerConfig`] the controller needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    pub start_minute: u32,
    pub end_minute: u32,
    pub click_threshold_px: f64,
    pub default_duration: u32,
}

impl From<&PlannerConfig> for GridSettings {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            start_minute: config.grid_start_minute(),
            end_minute: config.grid_end_minute(),
            click_threshold_px: config.click_threshold_px,
            default_duration: config.default_slot_duration,
        }
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings::from(&PlannerConfig::default())
    }
}

/// A slot being dragged. `original` never changes during the drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub mode: DragMode,
    pub original: Slot,
    pub preview: Slot,
    origin: PointerPos,
    /// Minutes between the slot start and the row that was grabbed
    grab_offset: i64,
    moved: bool,
}

impl DragSession {
    pub fn slot_id(&self) -> SlotId {
        self.original.id.unwrap_or_default()
    }

    pub fn has_moved(&self) -> bool {
        self.moved
    }

    fn changed(&self) -> bool {
        let before = self.original.timing();
        let after = self.preview.timing();
        match self.mode {
            DragMode::Resize => before.duration_minute != after.duration_minute,
            DragMode::Move | DragMode::Duplicate => {
                (before.day_index, before.start_minute) != (after.day_index, after.start_minute)
            }
        }
    }

    fn target_timing(&self, cell: GridCell, settings: &GridSettings) -> SlotTiming {
        let original = &self.original;
        match self.mode {
            DragMode::Move | DragMode::Duplicate => {
                let duration = original.duration_minute as i64;
                let lowest = settings.start_minute as i64;
                let highest = (settings.end_minute as i64 - duration).max(lowest);
                let start = (cell.start_minute as i64 - self.grab_offset).clamp(lowest, highest);
                SlotTiming::new(cell.day_index, start as u32, original.duration_minute)
            }
            DragMode::Resize => {
                let start = original.start_minute;
                let end = (cell.start_minute + QUARTER_HOUR)
                    .min(settings.end_minute)
                    .max(start + QUARTER_HOUR);
                SlotTiming::new(original.day_index, start, end - start)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridState {
    Idle,
    /// Button held on an empty cell
    Pressed {
        cell: GridCell,
        origin: PointerPos,
        moved: bool,
    },
    Dragging(DragSession),
}

/// A mutation to send to the server
#[derive(Debug, Clone, PartialEq)]
pub enum SlotIntent {
    Create(NewSlotRequest),
    Update {
        slot_id: SlotId,
        changes: UpdateSlotRequest,
    },
    Delete {
        slot_id: SlotId,
    },
}

impl SlotIntent {
    /// Slot that must not receive another mutation until this one settles
    pub fn locked_slot(&self) -> Option<SlotId> {
        match self {
            SlotIntent::Create(_) => None,
            SlotIntent::Update { slot_id, .. } | SlotIntent::Delete { slot_id } => Some(*slot_id),
        }
    }
}

/// Why a placement was refused without contacting the server
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DropRejection {
    #[error("Créneau invalide : {}", describe_errors(.0))]
    Invalid(Vec<SlotValidationError>),
    /// `slot_id` is `None` when the other slot is a draft still being saved
    #[error("Ce créneau chevauche « {title} »")]
    Overlap {
        slot_id: Option<SlotId>,
        title: String,
    },
    #[error("Une modification de ce créneau est déjà en cours")]
    SlotBusy(SlotId),
    #[error("Créneau introuvable")]
    UnknownSlot(SlotId),
    #[error("Aucune semaine chargée")]
    NoWeek,
    #[error("Planning en lecture seule")]
    ReadOnly,
}

fn describe_errors(errors: &[SlotValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of a pointer release
#[derive(Debug, Clone, PartialEq)]
pub enum GridOutcome {
    Nothing,
    OpenCreateForm {
        day_index: u8,
        start_minute: u32,
        duration_minute: u32,
    },
    OpenEditForm(SlotId),
    Intent(SlotIntent),
    Rejected(DropRejection),
}

/// A slot as it should be drawn right now
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedSlot {
    pub slot: Slot,
    /// Live drag preview rather than stored data
    pub preview: bool,
    /// A mutation for this slot is in flight, or it is an unsaved draft
    pub pending: bool,
}

#[derive(Debug, Clone)]
pub struct GridController {
    settings: GridSettings,
    state: GridState,
    /// Last week the server sent
    known_good: Option<WeekSnapshot>,
    /// `known_good` plus optimistic edits
    view: Option<WeekSnapshot>,
    /// Fetched while a drag was running; applied on release
    parked: Option<WeekSnapshot>,
    pending: BTreeSet<SlotId>,
    read_only: bool,
}

impl GridController {
    pub fn new(settings: GridSettings) -> Self {
        Self {
            settings,
            state: GridState::Idle,
            known_good: None,
            view: None,
            parked: None,
            pending: BTreeSet::new(),
            read_only: false,
        }
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: GridSettings) {
        self.settings = settings;
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        if read_only {
            self.cancel();
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GridState::Dragging(_))
    }

    pub fn drag(&self) -> Option<&DragSession> {
        match &self.state {
            GridState::Dragging(drag) => Some(drag),
            _ => None,
        }
    }

    /// The week as displayed, optimistic edits included
    pub fn week(&self) -> Option<&WeekSnapshot> {
        self.view.as_ref()
    }

    pub fn known_good(&self) -> Option<&WeekSnapshot> {
        self.known_good.as_ref()
    }

    pub fn is_pending(&self, slot_id: SlotId) -> bool {
        self.pending.contains(&slot_id)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Install a freshly fetched week. While a drag is running the snapshot
    /// is held back until release; returns whether it was applied now.
    pub fn on_week_loaded(&mut self, snapshot: WeekSnapshot) -> bool {
        if matches!(self.state, GridState::Idle) {
            debug!("Applying week {} ({} slots)", snapshot.id, snapshot.slots.len());
            self.install(snapshot);
            true
        } else {
            debug!("Drag in progress, deferring week {}", snapshot.id);
            self.parked = Some(snapshot);
            false
        }
    }

    /// Forget the week entirely, e.g. on logout or employee switch
    pub fn clear(&mut self) {
        self.state = GridState::Idle;
        self.known_good = None;
        self.view = None;
        self.parked = None;
        self.pending.clear();
    }

    fn install(&mut self, mut snapshot: WeekSnapshot) {
        snapshot.recompute_totals();
        if self
            .view
            .as_ref()
            .map(|current| current.id != snapshot.id)
            .unwrap_or(false)
        {
            self.pending.clear();
        }
        self.known_good = Some(snapshot.clone());
        self.view = Some(snapshot);
    }

    fn apply_parked(&mut self) {
        if let Some(snapshot) = self.parked.take() {
            self.install(snapshot);
        }
    }

    /// Button pressed on the grid. Returns whether an interaction started.
    pub fn pointer_down(
        &mut self,
        target: PointerTarget,
        pos: PointerPos,
        geometry: &GridGeometry,
        button: PointerButton,
    ) -> bool {
        if button != PointerButton::Primary {
            return false;
        }
        if !matches!(self.state, GridState::Idle) {
            warn!("Ignoring press while another interaction is running");
            return false;
        }

        let (slot_id, mode) = match target {
            PointerTarget::EmptyCell => {
                if self.read_only || self.view.is_none() {
                    return false;
                }
                self.state = GridState::Pressed {
                    cell: geometry.cell_at(pos),
                    origin: pos,
                    moved: false,
                };
                return true;
            }
            PointerTarget::SlotBody(id) => (id, DragMode::Move),
            PointerTarget::ResizeHandle(id) => (id, DragMode::Resize),
            PointerTarget::DuplicateHandle(id) => (id, DragMode::Duplicate),
        };

        if self.read_only && mode != DragMode::Move {
            return false;
        }
        if self.pending.contains(&slot_id) {
            debug!("Slot {} has a request in flight, not dragging", slot_id);
            return false;
        }
        let Some(slot) = self.view.as_ref().and_then(|week| week.slot(slot_id)) else {
            warn!("Press on unknown slot {}", slot_id);
            return false;
        };

        let grabbed = geometry.cell_at(pos);
        debug!("Drag start {:?} on slot {}", mode, slot_id);
        self.state = GridState::Dragging(DragSession {
            mode,
            original: slot.clone(),
            preview: slot.clone(),
            origin: pos,
            grab_offset: grabbed.start_minute as i64 - slot.start_minute as i64,
            moved: false,
        });
        true
    }

    /// Pointer moved. Returns whether the preview changed.
    pub fn pointer_move(&mut self, pos: PointerPos, geometry: &GridGeometry) -> bool {
        let threshold = self.settings.click_threshold_px;
        match &mut self.state {
            GridState::Idle => false,
            GridState::Pressed { origin, moved, .. } => {
                if !*moved && pos.distance_to(origin) > threshold {
                    *moved = true;
                }
                false
            }
            GridState::Dragging(drag) => {
                if self.read_only {
                    return false;
                }
                if !drag.moved {
                    if pos.distance_to(&drag.origin) <= threshold {
                        return false;
                    }
                    drag.moved = true;
                }

                let timing = drag.target_timing(geometry.cell_at(pos), &self.settings);
                if timing == drag.preview.timing() {
                    return false;
                }
                drag.preview.day_index = timing.day_index;
                drag.preview.start_minute = timing.start_minute;
                drag.preview.duration_minute = timing.duration_minute;
                true
            }
        }
    }

    /// Button released. Always ends the interaction.
    pub fn pointer_up(&mut self, pos: PointerPos, geometry: &GridGeometry) -> GridOutcome {
        self.pointer_move(pos, geometry);

        // A week fetched during the drag is newer than the one the drag
        // started from, so the drop is checked against it.
        let state = std::mem::replace(&mut self.state, GridState::Idle);
        self.apply_parked();

        match state {
            GridState::Idle => GridOutcome::Nothing,
            GridState::Pressed { cell, moved, .. } => {
                if moved {
                    GridOutcome::Nothing
                } else {
                    GridOutcome::OpenCreateForm {
                        day_index: cell.day_index,
                        start_minute: cell.start_minute,
                        duration_minute: self
                            .settings
                            .default_duration
                            .min(MINUTES_PER_DAY - cell.start_minute),
                    }
                }
            }
            GridState::Dragging(drag) => self.finish_drag(drag),
        }
    }

    /// Abort the interaction without any intent (Escape, pointer left)
    pub fn cancel(&mut self) {
        if !matches!(self.state, GridState::Idle) {
            debug!("Interaction cancelled");
        }
        self.state = GridState::Idle;
        self.apply_parked();
    }

    fn finish_drag(&mut self, drag: DragSession) -> GridOutcome {
        let slot_id = drag.slot_id();
        if !drag.moved {
            return match drag.mode {
                DragMode::Move => GridOutcome::OpenEditForm(slot_id),
                DragMode::Resize | DragMode::Duplicate => GridOutcome::Nothing,
            };
        }
        if !drag.changed() {
            debug!("Drop of slot {} at its original place", slot_id);
            return GridOutcome::Nothing;
        }

        let timing = drag.preview.timing();
        let ignore = match drag.mode {
            DragMode::Duplicate => None,
            DragMode::Move | DragMode::Resize => Some(slot_id),
        };
        if let Err(rejection) = self.check_placement(&timing, ignore) {
            info!("Drop of slot {} rejected: {}", slot_id, rejection);
            return GridOutcome::Rejected(rejection);
        }

        let intent = match drag.mode {
            DragMode::Move => SlotIntent::Update {
                slot_id,
                changes: UpdateSlotRequest {
                    day_index: Some(timing.day_index),
                    start_minute: Some(timing.start_minute),
                    ..UpdateSlotRequest::default()
                },
            },
            DragMode::Resize => SlotIntent::Update {
                slot_id,
                changes: UpdateSlotRequest {
                    duration_minute: Some(timing.duration_minute),
                    ..UpdateSlotRequest::default()
                },
            },
            DragMode::Duplicate => SlotIntent::Create(drag.original.duplicate_at(timing)),
        };

        info!("Drop of slot {} ({:?}) issues {:?}", slot_id, drag.mode, intent);
        self.apply_optimistic(&intent);
        GridOutcome::Intent(intent)
    }

    fn check_placement(
        &self,
        timing: &SlotTiming,
        ignore: Option<SlotId>,
    ) -> Result<(), DropRejection> {
        validate_slot(timing)
            .into_result()
            .map_err(DropRejection::Invalid)?;

        let week = self.view.as_ref().ok_or(DropRejection::NoWeek)?;
        if let Some(other) = find_overlap(timing, &week.slots, ignore) {
            return Err(DropRejection::Overlap {
                slot_id: other.id,
                title: other.title.clone(),
            });
        }
        Ok(())
    }

    fn check_mutable(&self, slot_id: SlotId) -> Result<&Slot, DropRejection> {
        if self.read_only {
            return Err(DropRejection::ReadOnly);
        }
        if self.pending.contains(&slot_id) || self.drag().map(|d| d.slot_id()) == Some(slot_id) {
            return Err(DropRejection::SlotBusy(slot_id));
        }
        self.view
            .as_ref()
            .ok_or(DropRejection::NoWeek)?
            .slot(slot_id)
            .ok_or(DropRejection::UnknownSlot(slot_id))
    }

    /// Creation from the slot form
    pub fn submit_create(&mut self, request: NewSlotRequest) -> Result<SlotIntent, DropRejection> {
        if self.read_only {
            return Err(DropRejection::ReadOnly);
        }
        self.check_placement(&request.timing(), None)?;
        let intent = SlotIntent::Create(request);
        self.apply_optimistic(&intent);
        Ok(intent)
    }

    /// Edition from the slot form
    pub fn submit_update(
        &mut self,
        slot_id: SlotId,
        changes: UpdateSlotRequest,
    ) -> Result<SlotIntent, DropRejection> {
        let timing = changes.timing_for(self.check_mutable(slot_id)?);
        self.check_placement(&timing, Some(slot_id))?;
        let intent = SlotIntent::Update { slot_id, changes };
        self.apply_optimistic(&intent);
        Ok(intent)
    }

    pub fn request_delete(&mut self, slot_id: SlotId) -> Result<SlotIntent, DropRejection> {
        self.check_mutable(slot_id)?;
        let intent = SlotIntent::Delete { slot_id };
        self.apply_optimistic(&intent);
        Ok(intent)
    }

    fn apply_optimistic(&mut self, intent: &SlotIntent) {
        if let Some(slot_id) = intent.locked_slot() {
            self.pending.insert(slot_id);
        }
        let Some(view) = self.view.as_mut() else {
            return;
        };
        match intent {
            SlotIntent::Create(request) => view.slots.push(request.clone().into_draft()),
            SlotIntent::Update { slot_id, changes } => {
                if let Some(slot) = view.slot_mut(*slot_id) {
                    slot.apply(changes);
                }
            }
            SlotIntent::Delete { slot_id } => {
                view.remove_slot(*slot_id);
            }
        }
        view.recompute_totals();
    }

    /// The server accepted `intent`. The caller re-fetches the week next.
    pub fn intent_succeeded(&mut self, intent: &SlotIntent) {
        if let Some(slot_id) = intent.locked_slot() {
            self.pending.remove(&slot_id);
        }
    }

    /// The server refused `intent` or could not be reached: drop every
    /// optimistic edit and show the last confirmed week again.
    pub fn intent_failed(&mut self, intent: &SlotIntent) {
        if let Some(slot_id) = intent.locked_slot() {
            self.pending.remove(&slot_id);
        }
        warn!("Intent failed, rolling back to last known week: {:?}", intent);
        self.rollback();
    }

    pub fn rollback(&mut self) {
        self.view = self.known_good.clone();
    }

    /// Slots to draw, with the drag preview substituted in
    pub fn displayed_slots(&self) -> Vec<DisplayedSlot> {
        let Some(week) = self.view.as_ref() else {
            return Vec::new();
        };
        let drag = self.drag().filter(|drag| drag.moved);

        let mut slots: Vec<DisplayedSlot> = week
            .slots
            .iter()
            .map(|slot| {
                let dragged = drag
                    .filter(|d| d.mode != DragMode::Duplicate && slot.id == d.original.id);
                match dragged {
                    Some(d) => DisplayedSlot {
                        slot: d.preview.clone(),
                        preview: true,
                        pending: false,
                    },
                    None => DisplayedSlot {
                        slot: slot.clone(),
                        preview: false,
                        pending: slot.id.map_or(true, |id| self.pending.contains(&id)),
                    },
                }
            })
            .collect();

        if let Some(d) = drag.filter(|d| d.mode == DragMode::Duplicate) {
            let mut ghost = d.preview.clone();
            ghost.id = None;
            slots.push(DisplayedSlot {
                slot: ghost,
                preview: true,
                pending: false,
            });
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::week::{WeekKind, WeekTotals};

    /// 100px per day column, 64px per hour from 06:00 to 22:00
    fn geometry() -> GridGeometry {
        GridGeometry {
            left: 0.0,
            top: 0.0,
            width: 700.0,
            height: 16.0 * 64.0,
            start_hour: 6,
            end_hour: 22,
        }
    }

    /// A point inside the given cell, a few pixels in
    fn point(day: u8, minute: u32) -> PointerPos {
        PointerPos::new(
            day as f64 * 100.0 + 10.0,
            (minute - 360) as f64 / 60.0 * 64.0 + 1.0,
        )
    }

    fn slot(id: SlotId, day: u8, start: u32, duration: u32) -> Slot {
        Slot {
            id: Some(id),
            day_index: day,
            start_minute: start,
            duration_minute: duration,
            title: "Cours de danse".to_string(),
            category: Category::Ecole,
            comment: Some("Salle 2".to_string()),
        }
    }

    fn week(slots: Vec<Slot>) -> WeekSnapshot {
        let mut week = WeekSnapshot {
            id: 1,
            employee_id: 1,
            kind: WeekKind::Current,
            vacation: None,
            week_start: None,
            slots,
            notes: None,
            totals: WeekTotals::default(),
            metadata: serde_json::Value::Null,
        };
        week.recompute_totals();
        week
    }

    fn controller(slots: Vec<Slot>) -> GridController {
        let mut controller = GridController::new(GridSettings::default());
        controller.on_week_loaded(week(slots));
        controller
    }

    fn drag(
        controller: &mut GridController,
        target: PointerTarget,
        from: PointerPos,
        to: PointerPos,
    ) -> GridOutcome {
        let g = geometry();
        assert!(controller.pointer_down(target, from, &g, PointerButton::Primary));
        controller.pointer_move(to, &g);
        controller.pointer_up(to, &g)
    }

    #[test]
    fn test_cell_at() {
        let g = geometry();
        assert_eq!(
            g.cell_at(PointerPos::new(250.0, 256.0)),
            GridCell {
                day_index: 2,
                start_minute: 600
            }
        );
        assert_eq!(
            g.cell_at(PointerPos::new(-50.0, -10.0)),
            GridCell {
                day_index: 0,
                start_minute: 360
            }
        );
        assert_eq!(
            g.cell_at(PointerPos::new(9000.0, 5000.0)),
            GridCell {
                day_index: 6,
                start_minute: 1305
            }
        );
    }

    #[test]
    fn test_move_issues_single_update() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let outcome = drag(&mut c, PointerTarget::SlotBody(1), point(0, 540), point(2, 600));

        assert_eq!(
            outcome,
            GridOutcome::Intent(SlotIntent::Update {
                slot_id: 1,
                changes: UpdateSlotRequest {
                    day_index: Some(2),
                    start_minute: Some(600),
                    ..UpdateSlotRequest::default()
                },
            })
        );
        assert_eq!(c.state(), &GridState::Idle);

        let moved = c.week().unwrap().slot(1).unwrap();
        assert_eq!(moved.timing(), SlotTiming::new(2, 600, 60));
        assert_eq!(moved.title, "Cours de danse");
        assert_eq!(moved.category, Category::Ecole);
        assert!(c.is_pending(1));
    }

    #[test]
    fn test_release_without_moving_issues_nothing() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let g = geometry();
        assert!(c.pointer_down(PointerTarget::ResizeHandle(1), point(0, 585), &g, PointerButton::Primary));
        assert_eq!(c.pointer_up(point(0, 585), &g), GridOutcome::Nothing);
        assert!(!c.has_pending());
        assert_eq!(c.week(), c.known_good());
    }

    #[test]
    fn test_click_on_slot_opens_edit_form() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let g = geometry();
        let at = point(0, 555);
        assert!(c.pointer_down(PointerTarget::SlotBody(1), at, &g, PointerButton::Primary));
        c.pointer_move(PointerPos::new(at.x + 2.0, at.y + 1.0), &g);
        assert_eq!(c.pointer_up(at, &g), GridOutcome::OpenEditForm(1));
    }

    #[test]
    fn test_drag_back_to_origin_issues_nothing() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let g = geometry();
        c.pointer_down(PointerTarget::SlotBody(1), point(0, 540), &g, PointerButton::Primary);
        assert!(c.pointer_move(point(3, 720), &g));
        assert_eq!(c.pointer_up(point(0, 540), &g), GridOutcome::Nothing);
        assert!(!c.has_pending());
    }

    #[test]
    fn test_click_on_empty_cell_opens_create_form() {
        let mut c = controller(vec![]);
        let g = geometry();
        assert!(c.pointer_down(PointerTarget::EmptyCell, point(4, 615), &g, PointerButton::Primary));
        assert_eq!(
            c.pointer_up(point(4, 615), &g),
            GridOutcome::OpenCreateForm {
                day_index: 4,
                start_minute: 615,
                duration_minute: 60
            }
        );
    }

    #[test]
    fn test_empty_cell_press_with_travel_is_not_a_click() {
        let mut c = controller(vec![]);
        let g = geometry();
        c.pointer_down(PointerTarget::EmptyCell, point(4, 615), &g, PointerButton::Primary);
        c.pointer_move(point(5, 700), &g);
        assert_eq!(c.pointer_up(point(4, 615), &g), GridOutcome::Nothing);
    }

    #[test]
    fn test_duplicate_creates_copy_and_keeps_original() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let outcome = drag(&mut c, PointerTarget::DuplicateHandle(1), point(0, 540), point(2, 600));

        let GridOutcome::Intent(SlotIntent::Create(request)) = outcome else {
            panic!("expected a create intent, got {:?}", outcome);
        };
        assert_eq!(request.title, "Cours de danse (copie)");
        assert_eq!(request.timing(), SlotTiming::new(2, 600, 60));
        assert_eq!(request.category, Category::Ecole);
        assert_eq!(request.comment.as_deref(), Some("Salle 2"));

        let week = c.week().unwrap();
        assert_eq!(week.slot(1), Some(&slot(1, 0, 540, 60)));
        assert_eq!(week.slots.len(), 2);
        assert!(!c.is_pending(1));
    }

    #[test]
    fn test_loaded_week_totals_come_from_its_slots() {
        let json = r#"{
            "id": 9,
            "employee_id": 1,
            "kind": "current",
            "week_start": "2026-10-12",
            "slots": [
                {"id": 3, "day_index": 1, "start_minute": 540, "duration_minute": 90,
                 "title": "Cours", "category": "ecole"}
            ],
            "totals": {"per_day": [0, 0, 0, 0, 0, 0, 0], "week": 0, "by_category": {}}
        }"#;
        let snapshot: WeekSnapshot = serde_json::from_str(json).unwrap();
        let mut c = GridController::new(GridSettings::default());
        assert!(c.on_week_loaded(snapshot.clone()));

        let totals = &c.week().unwrap().totals;
        assert_eq!(totals.week, 90);
        assert_eq!(totals.day_minutes(1), 90);
        assert!((totals.by_category.hours(&Category::Ecole) - 1.5).abs() < 1e-9);
        assert_eq!(c.known_good().unwrap().totals.week, 90);

        let mut without_totals = snapshot;
        without_totals.totals = WeekTotals::default();
        without_totals.id = 10;
        c.on_week_loaded(without_totals);
        assert_eq!(c.week().unwrap().totals.per_day.len(), 7);
        assert_eq!(c.week().unwrap().totals.week, 90);
    }

    #[test]
    fn test_second_duplicate_onto_unsaved_copy_is_rejected() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let first = drag(&mut c, PointerTarget::DuplicateHandle(1), point(0, 540), point(2, 600));
        assert!(matches!(first, GridOutcome::Intent(SlotIntent::Create(_))));

        // The first copy is still in flight when the second drop lands
        let second = drag(&mut c, PointerTarget::DuplicateHandle(1), point(0, 540), point(2, 600));
        assert_eq!(
            second,
            GridOutcome::Rejected(DropRejection::Overlap {
                slot_id: None,
                title: "Cours de danse (copie)".to_string(),
            })
        );

        let request = NewSlotRequest {
            day_index: 2,
            start_minute: 600,
            duration_minute: 60,
            title: "Réunion".to_string(),
            category: Category::Administratif,
            comment: None,
        };
        assert!(matches!(
            c.submit_create(request),
            Err(DropRejection::Overlap { slot_id: None, .. })
        ));
        assert_eq!(c.week().unwrap().slots.len(), 2);
    }

    #[test]
    fn test_resize_updates_duration_only() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let outcome = drag(&mut c, PointerTarget::ResizeHandle(1), point(0, 585), point(0, 645));
        assert_eq!(
            outcome,
            GridOutcome::Intent(SlotIntent::Update {
                slot_id: 1,
                changes: UpdateSlotRequest {
                    duration_minute: Some(120),
                    ..UpdateSlotRequest::default()
                },
            })
        );
    }

    #[test]
    fn test_resize_never_below_a_quarter() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let g = geometry();
        c.pointer_down(PointerTarget::ResizeHandle(1), point(0, 585), &g, PointerButton::Primary);
        c.pointer_move(point(0, 400), &g);
        assert_eq!(c.drag().unwrap().preview.duration_minute, 15);
    }

    #[test]
    fn test_move_is_clamped_to_opening_hours() {
        let mut c = controller(vec![slot(1, 0, 540, 120)]);
        let g = geometry();
        c.pointer_down(PointerTarget::SlotBody(1), point(0, 540), &g, PointerButton::Primary);
        c.pointer_move(PointerPos::new(50.0, 5000.0), &g);
        let preview = &c.drag().unwrap().preview;
        assert_eq!(preview.start_minute, 22 * 60 - 120);
    }

    #[test]
    fn test_grab_offset_is_kept() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let outcome = drag(&mut c, PointerTarget::SlotBody(1), point(0, 570), point(1, 630));
        let GridOutcome::Intent(SlotIntent::Update { changes, .. }) = outcome else {
            panic!("expected update");
        };
        assert_eq!(changes.start_minute, Some(600));
        assert_eq!(changes.day_index, Some(1));
    }

    #[test]
    fn test_overlapping_drop_is_rejected() {
        let mut c = controller(vec![slot(1, 0, 540, 60), slot(2, 2, 630, 60)]);
        let outcome = drag(&mut c, PointerTarget::SlotBody(1), point(0, 540), point(2, 600));
        assert_eq!(
            outcome,
            GridOutcome::Rejected(DropRejection::Overlap {
                slot_id: Some(2),
                title: "Cours de danse".to_string()
            })
        );
        assert_eq!(c.state(), &GridState::Idle);
        assert_eq!(c.week().unwrap().slot(1).unwrap().day_index, 0);
        assert!(!c.has_pending());
    }

    #[test]
    fn test_adjacent_drop_is_allowed() {
        let mut c = controller(vec![slot(1, 0, 540, 60), slot(2, 2, 660, 60)]);
        let outcome = drag(&mut c, PointerTarget::SlotBody(1), point(0, 540), point(2, 600));
        assert!(matches!(outcome, GridOutcome::Intent(_)));
    }

    #[test]
    fn test_single_drag_at_a_time() {
        let mut c = controller(vec![slot(1, 0, 540, 60), slot(2, 1, 540, 60)]);
        let g = geometry();
        assert!(c.pointer_down(PointerTarget::SlotBody(1), point(0, 540), &g, PointerButton::Primary));
        assert!(!c.pointer_down(PointerTarget::SlotBody(2), point(1, 540), &g, PointerButton::Primary));
        assert_eq!(c.drag().unwrap().slot_id(), 1);
    }

    #[test]
    fn test_secondary_button_ignored() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        assert!(!c.pointer_down(
            PointerTarget::SlotBody(1),
            point(0, 540),
            &geometry(),
            PointerButton::from_dom(2)
        ));
        assert_eq!(c.state(), &GridState::Idle);
    }

    #[test]
    fn test_pending_slot_cannot_be_dragged_again() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let outcome = drag(&mut c, PointerTarget::SlotBody(1), point(0, 540), point(2, 600));
        let GridOutcome::Intent(intent) = outcome else {
            panic!("expected intent");
        };
        assert!(!c.pointer_down(PointerTarget::SlotBody(1), point(2, 600), &geometry(), PointerButton::Primary));
        assert_eq!(c.request_delete(1), Err(DropRejection::SlotBusy(1)));

        c.intent_succeeded(&intent);
        assert!(c.pointer_down(PointerTarget::SlotBody(1), point(2, 600), &geometry(), PointerButton::Primary));
    }

    #[test]
    fn test_failed_intent_rolls_back() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let outcome = drag(&mut c, PointerTarget::SlotBody(1), point(0, 540), point(2, 600));
        let GridOutcome::Intent(intent) = outcome else {
            panic!("expected intent");
        };
        c.intent_failed(&intent);
        assert_eq!(c.week().unwrap().slot(1), Some(&slot(1, 0, 540, 60)));
        assert!(!c.has_pending());
        assert_eq!(c.state(), &GridState::Idle);
    }

    #[test]
    fn test_fetch_during_drag_is_deferred() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let g = geometry();
        c.pointer_down(PointerTarget::SlotBody(1), point(0, 540), &g, PointerButton::Primary);
        c.pointer_move(point(1, 540), &g);

        let fresh = week(vec![slot(1, 0, 540, 60), slot(9, 5, 480, 30)]);
        assert!(!c.on_week_loaded(fresh));
        assert_eq!(c.week().unwrap().slots.len(), 1);
        assert!(c.is_dragging());

        c.pointer_up(point(1, 540), &g);
        assert_eq!(c.week().unwrap().slots.len(), 2);
    }

    #[test]
    fn test_cancel_discards_preview() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let g = geometry();
        c.pointer_down(PointerTarget::SlotBody(1), point(0, 540), &g, PointerButton::Primary);
        c.pointer_move(point(3, 700), &g);
        c.cancel();
        assert_eq!(c.state(), &GridState::Idle);
        assert_eq!(c.pointer_up(point(3, 700), &g), GridOutcome::Nothing);
        assert_eq!(c.week().unwrap().slot(1).unwrap().day_index, 0);
    }

    #[test]
    fn test_displayed_slots_follow_preview() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let g = geometry();
        c.pointer_down(PointerTarget::DuplicateHandle(1), point(0, 540), &g, PointerButton::Primary);
        c.pointer_move(point(3, 600), &g);

        let shown = c.displayed_slots();
        assert_eq!(shown.len(), 2);
        assert!(!shown[0].preview);
        assert!(shown[1].preview);
        assert_eq!(shown[1].slot.timing(), SlotTiming::new(3, 600, 60));
        assert_eq!(shown[1].slot.id, None);
    }

    #[test]
    fn test_read_only_blocks_edits_but_allows_details() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        c.set_read_only(true);
        let g = geometry();

        assert!(!c.pointer_down(PointerTarget::EmptyCell, point(2, 600), &g, PointerButton::Primary));
        assert!(!c.pointer_down(PointerTarget::ResizeHandle(1), point(0, 585), &g, PointerButton::Primary));

        assert!(c.pointer_down(PointerTarget::SlotBody(1), point(0, 540), &g, PointerButton::Primary));
        assert!(!c.pointer_move(point(4, 700), &g));
        assert_eq!(c.pointer_up(point(4, 700), &g), GridOutcome::OpenEditForm(1));
        assert_eq!(c.request_delete(1), Err(DropRejection::ReadOnly));
    }

    #[test]
    fn test_form_submissions_check_overlap() {
        let mut c = controller(vec![slot(1, 0, 540, 60)]);
        let request = NewSlotRequest {
            day_index: 0,
            start_minute: 570,
            duration_minute: 30,
            title: "Réunion".to_string(),
            category: Category::Administratif,
            comment: None,
        };
        assert!(matches!(
            c.submit_create(request.clone()),
            Err(DropRejection::Overlap { slot_id: Some(1), .. })
        ));

        let free = NewSlotRequest {
            start_minute: 600,
            ..request
        };
        assert!(c.submit_create(free).is_ok());
        assert_eq!(c.week().unwrap().slots.len(), 2);
        assert_eq!(c.week().unwrap().totals.week, 90);

        let shrink = UpdateSlotRequest {
            duration_minute: Some(45),
            ..UpdateSlotRequest::default()
        };
        assert!(c.submit_update(1, shrink).is_ok());
        assert!(c.is_pending(1));
    }

    #[test]
    fn test_delete_is_optimistic() {
        let mut c = controller(vec![slot(1, 0, 540, 60), slot(2, 1, 540, 60)]);
        let intent = c.request_delete(2).unwrap();
        assert_eq!(intent, SlotIntent::Delete { slot_id: 2 });
        assert!(c.week().unwrap().slot(2).is_none());
        assert_eq!(c.known_good().unwrap().slots.len(), 2);
        assert_eq!(c.request_delete(7), Err(DropRejection::UnknownSlot(7)));
    }
}
