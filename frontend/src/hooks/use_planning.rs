use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use shared::{
    diff_slot, ApiError, CopyNextToCurrentRequest, DisplayedSlot, DuplicateWeekRequest,
    EmployeeId, FetchSequence, GridController, GridGeometry, GridOutcome, GridSettings,
    NewSlotRequest, NotesUpdateRequest, PlannerConfig, PointerButton, PointerPos, PointerTarget,
    Slot, SlotForm, SlotId, SlotIntent, WeekKind, WeekQuery, WeekSnapshot,
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::use_employees::Responder;
use crate::services::{ApiClient, Logger};

/// Dismissible error message above the grid
#[derive(Clone, Debug, PartialEq)]
pub struct Banner {
    pub message: String,
    pub retryable: bool,
}

/// What the slot modal shows
#[derive(Clone, Debug, PartialEq)]
pub enum SlotEditor {
    Create(SlotForm),
    Edit(Slot),
    /// Read-only detail for employees
    View(Slot),
}

/// Whole-week operations built on the template week
#[derive(Clone, Debug, PartialEq)]
pub enum WeekOperation {
    OpenTypeWeek,
    DuplicateType(DuplicateWeekRequest),
    ResetFromTemplate,
    CopyNextToCurrent,
}

#[derive(Clone, PartialEq)]
pub struct PlanningState {
    pub query: Option<WeekQuery>,
    pub week: Option<WeekSnapshot>,
    pub slots: Vec<DisplayedSlot>,
    pub dragging: bool,
    pub read_only: bool,
    pub loading: bool,
    pub busy: bool,
    pub banner: Option<Banner>,
    pub editor: Option<SlotEditor>,
    pub editor_error: Option<String>,
}

pub struct UsePlanningResult {
    pub state: PlanningState,
    pub actions: UsePlanningActions,
}

#[derive(Clone, PartialEq)]
pub struct UsePlanningActions {
    pub select_week: Callback<WeekQuery>,
    pub reload: Callback<()>,
    pub pointer_down: Callback<(PointerTarget, PointerPos, GridGeometry, PointerButton)>,
    pub pointer_move: Callback<(PointerPos, GridGeometry)>,
    pub pointer_up: Callback<(PointerPos, GridGeometry)>,
    pub cancel: Callback<()>,
    pub open_slot: Callback<SlotId>,
    pub save_slot: Callback<NewSlotRequest>,
    pub delete_slot: Callback<SlotId>,
    pub close_editor: Callback<()>,
    pub dismiss_banner: Callback<()>,
    pub save_notes: Callback<(String, Responder)>,
    pub week_operation: Callback<WeekOperation>,
}

struct PlanningCore {
    controller: GridController,
    query: Option<WeekQuery>,
    editor: Option<SlotEditor>,
    editor_error: Option<String>,
    banner: Option<Banner>,
    loading: bool,
    busy: bool,
    /// Only the answer to the latest fetch is shown
    fetches: FetchSequence,
}

impl PlanningCore {
    fn new(settings: GridSettings) -> Self {
        Self {
            controller: GridController::new(settings),
            query: None,
            editor: None,
            editor_error: None,
            banner: None,
            loading: false,
            busy: false,
            fetches: FetchSequence::new(),
        }
    }

    fn state(&self) -> PlanningState {
        PlanningState {
            query: self.query.clone(),
            week: self.controller.week().cloned(),
            slots: self.controller.displayed_slots(),
            dragging: self.controller.is_dragging(),
            read_only: self.controller.is_read_only(),
            loading: self.loading,
            busy: self.busy,
            banner: self.banner.clone(),
            editor: self.editor.clone(),
            editor_error: self.editor_error.clone(),
        }
    }

    fn employee_id(&self) -> Option<EmployeeId> {
        self.query.as_ref().map(|q| q.employee_id)
    }

    /// Show `snapshot` as the answer to `query`, superseding any fetch in
    /// flight
    fn show(&mut self, query: WeekQuery, snapshot: WeekSnapshot) {
        self.fetches.supersede();
        self.loading = false;
        if self.query.as_ref() != Some(&query) {
            self.controller.clear();
            self.editor = None;
        }
        self.query = Some(query);
        self.controller.on_week_loaded(snapshot);
    }
}

#[derive(Clone)]
struct Planner {
    api: ApiClient,
    core: Rc<RefCell<PlanningCore>>,
    redraw: UseForceUpdateHandle,
    on_auth_error: Callback<String>,
    on_activity: Callback<()>,
}

impl PartialEq for Planner {
    fn eq(&self, other: &Self) -> bool {
        self.api == other.api
            && Rc::ptr_eq(&self.core, &other.core)
            && self.on_auth_error == other.on_auth_error
            && self.on_activity == other.on_activity
    }
}

impl Planner {
    fn redraw(&self) {
        self.redraw.force_update();
    }

    fn fail(&self, context: &str, error: &ApiError) {
        Logger::error_with_component("planning", &format!("{}: {}", context, error));
        if error.is_auth() {
            self.on_auth_error.emit(error.to_string());
            return;
        }
        self.core.borrow_mut().banner = Some(Banner {
            message: format!("{} : {}", context, error),
            retryable: error.is_retryable(),
        });
        self.redraw();
    }

    fn select_week(&self, query: WeekQuery) {
        if let Err(e) = query.validate() {
            self.core.borrow_mut().banner = Some(Banner {
                message: e.to_string(),
                retryable: false,
            });
            self.redraw();
            return;
        }
        {
            let mut core = self.core.borrow_mut();
            if core.query.as_ref() != Some(&query) {
                core.controller.clear();
                core.editor = None;
            }
            core.query = Some(query);
        }
        self.fetch();
    }

    fn fetch(&self) {
        let (query, ticket) = {
            let mut core = self.core.borrow_mut();
            let Some(query) = core.query.clone() else {
                return;
            };
            core.loading = true;
            (query, core.fetches.issue())
        };
        self.redraw();

        let planner = self.clone();
        spawn_local(async move {
            let result = planner.api.get_week(&query).await;
            {
                let mut core = planner.core.borrow_mut();
                if !core.fetches.is_current(ticket) {
                    Logger::debug_with_component("planning", "Dropping superseded week fetch");
                    return;
                }
                core.loading = false;
            }
            match result {
                Ok(week) => {
                    planner.core.borrow_mut().controller.on_week_loaded(week);
                    planner.redraw();
                }
                Err(e) => planner.fail("Chargement de la semaine impossible", &e),
            }
        });
    }

    fn dispatch(&self, intent: SlotIntent) {
        let week_id = self.core.borrow().controller.week().map(|w| w.id);
        self.redraw();
        let Some(week_id) = week_id else {
            return;
        };

        let planner = self.clone();
        spawn_local(async move {
            match planner.api.execute_intent(week_id, &intent).await {
                Ok(()) => {
                    planner.core.borrow_mut().controller.intent_succeeded(&intent);
                    planner.on_activity.emit(());
                    planner.fetch();
                }
                Err(e) => {
                    planner.core.borrow_mut().controller.intent_failed(&intent);
                    planner.fail("Modification refusée", &e);
                }
            }
            planner.redraw();
        });
    }

    fn pointer_down(
        &self,
        target: PointerTarget,
        pos: PointerPos,
        geometry: GridGeometry,
        button: PointerButton,
    ) {
        let started = self
            .core
            .borrow_mut()
            .controller
            .pointer_down(target, pos, &geometry, button);
        if started {
            self.redraw();
        }
    }

    fn pointer_move(&self, pos: PointerPos, geometry: GridGeometry) {
        let changed = self.core.borrow_mut().controller.pointer_move(pos, &geometry);
        if changed {
            self.redraw();
        }
    }

    fn pointer_up(&self, pos: PointerPos, geometry: GridGeometry) {
        let outcome = self.core.borrow_mut().controller.pointer_up(pos, &geometry);
        match outcome {
            GridOutcome::Nothing => {}
            GridOutcome::OpenCreateForm {
                day_index,
                start_minute,
                duration_minute,
            } => {
                let mut core = self.core.borrow_mut();
                core.editor = Some(SlotEditor::Create(SlotForm::for_new(
                    day_index,
                    start_minute,
                    duration_minute,
                )));
                core.editor_error = None;
            }
            GridOutcome::OpenEditForm(slot_id) => self.open_slot(slot_id),
            GridOutcome::Intent(intent) => {
                self.dispatch(intent);
                return;
            }
            GridOutcome::Rejected(rejection) => {
                self.core.borrow_mut().banner = Some(Banner {
                    message: rejection.to_string(),
                    retryable: false,
                });
            }
        }
        self.redraw();
    }

    fn cancel(&self) {
        self.core.borrow_mut().controller.cancel();
        self.redraw();
    }

    fn open_slot(&self, slot_id: SlotId) {
        let mut core = self.core.borrow_mut();
        let Some(slot) = core.controller.week().and_then(|w| w.slot(slot_id)).cloned() else {
            return;
        };
        core.editor = Some(if core.controller.is_read_only() {
            SlotEditor::View(slot)
        } else {
            SlotEditor::Edit(slot)
        });
        core.editor_error = None;
        drop(core);
        self.redraw();
    }

    fn save_slot(&self, request: NewSlotRequest) {
        let submitted = {
            let mut core = self.core.borrow_mut();
            let submitted = match core.editor.clone() {
                Some(SlotEditor::Create(_)) => Some(core.controller.submit_create(request)),
                Some(SlotEditor::Edit(original)) => {
                    let changes = diff_slot(&original, &request);
                    match original.id {
                        _ if changes.is_empty() => None,
                        Some(slot_id) => Some(core.controller.submit_update(slot_id, changes)),
                        None => None,
                    }
                }
                Some(SlotEditor::View(_)) | None => return,
            };
            match submitted {
                None => {
                    core.editor = None;
                    None
                }
                Some(Ok(intent)) => {
                    core.editor = None;
                    core.editor_error = None;
                    Some(intent)
                }
                Some(Err(rejection)) => {
                    core.editor_error = Some(rejection.to_string());
                    None
                }
            }
        };

        match submitted {
            Some(intent) => self.dispatch(intent),
            None => self.redraw(),
        }
    }

    fn delete_slot(&self, slot_id: SlotId) {
        let result = self.core.borrow_mut().controller.request_delete(slot_id);
        match result {
            Ok(intent) => {
                self.core.borrow_mut().editor = None;
                self.dispatch(intent);
            }
            Err(rejection) => {
                self.core.borrow_mut().editor_error = Some(rejection.to_string());
                self.redraw();
            }
        }
    }

    fn close_editor(&self) {
        let mut core = self.core.borrow_mut();
        core.editor = None;
        core.editor_error = None;
        drop(core);
        self.redraw();
    }

    fn dismiss_banner(&self) {
        self.core.borrow_mut().banner = None;
        self.redraw();
    }

    fn save_notes(&self, comment: String, done: Responder) {
        let Some(week_id) = self.core.borrow().controller.week().map(|w| w.id) else {
            done.emit(Err("Aucune semaine chargée".to_string()));
            return;
        };
        let planner = self.clone();
        spawn_local(async move {
            let request = NotesUpdateRequest { comment };
            match planner.api.update_notes(week_id, &request).await {
                Ok(_) => {
                    Logger::info_with_component(
                        "planning",
                        &format!("Notes of week {} saved", week_id),
                    );
                    done.emit(Ok(()));
                    planner.on_activity.emit(());
                    planner.fetch();
                }
                Err(e) => {
                    if e.is_auth() {
                        planner.on_auth_error.emit(e.to_string());
                    }
                    done.emit(Err(e.to_string()));
                }
            }
        });
    }

    fn week_operation(&self, operation: WeekOperation) {
        let (employee_id, current) = {
            let core = self.core.borrow();
            if core.busy {
                return;
            }
            let Some(employee_id) = core.employee_id() else {
                return;
            };
            (employee_id, core.controller.week().map(|w| (w.id, w.week_start)))
        };
        let api = self.api.clone();

        match operation {
            WeekOperation::OpenTypeWeek => self.run_operation("Semaine type", async move {
                let week = api.get_or_create_type_week(employee_id).await?;
                Ok::<_, ApiError>((WeekQuery::new(employee_id, WeekKind::Type), week))
            }),
            WeekOperation::DuplicateType(request) => {
                let target = request.target_query(employee_id);
                if let Err(e) = target.validate() {
                    self.core.borrow_mut().banner = Some(Banner {
                        message: e.to_string(),
                        retryable: false,
                    });
                    self.redraw();
                    return;
                }
                self.run_operation("Duplication de la semaine type", async move {
                    let template = api.get_or_create_type_week(employee_id).await?;
                    let week = api.duplicate_week(template.id, &request).await?;
                    Ok::<_, ApiError>((target, week))
                })
            }
            WeekOperation::ResetFromTemplate => {
                let Some(query) = self.core.borrow().query.clone() else {
                    return;
                };
                let Some((week_id, _)) = current else {
                    return;
                };
                self.run_operation("Réinitialisation depuis la semaine type", async move {
                    let week = api.reset_from_template(week_id).await?;
                    Ok::<_, ApiError>((query, week))
                })
            }
            WeekOperation::CopyNextToCurrent => {
                let week_start = self
                    .core
                    .borrow()
                    .query
                    .as_ref()
                    .filter(|q| q.kind == WeekKind::Current)
                    .and_then(|q| q.week_start)
                    .or_else(|| current.and_then(|(_, start)| start));
                let request = CopyNextToCurrentRequest {
                    employee_id,
                    week_start,
                };
                self.run_operation("Copie de la semaine suivante", async move {
                    let week = api.copy_next_to_current(&request).await?;
                    let mut query = WeekQuery::new(employee_id, WeekKind::Current);
                    query.week_start = week.week_start.or(request.week_start);
                    Ok::<_, ApiError>((query, week))
                })
            }
        }
    }

    fn run_operation<F>(&self, label: &'static str, operation: F)
    where
        F: Future<Output = Result<(WeekQuery, WeekSnapshot), ApiError>> + 'static,
    {
        self.core.borrow_mut().busy = true;
        self.redraw();

        let planner = self.clone();
        spawn_local(async move {
            let result = operation.await;
            planner.core.borrow_mut().busy = false;
            match result {
                Ok((query, week)) => {
                    Logger::info_with_component(
                        "planning",
                        &format!("{}: now showing week {}", label, week.id),
                    );
                    planner.core.borrow_mut().show(query, week);
                    planner.on_activity.emit(());
                    planner.redraw();
                }
                Err(e) => planner.fail(label, &e),
            }
        });
    }
}

/// State of the planning view: the selected week, the grid interaction and
/// the slot editor. Mutations are applied optimistically and confirmed by a
/// re-fetch; a failure restores the last week the server sent.
#[hook]
pub fn use_planning(
    api: &ApiClient,
    config: &PlannerConfig,
    read_only: bool,
    on_auth_error: Callback<String>,
    on_activity: Callback<()>,
) -> UsePlanningResult {
    let core = use_mut_ref({
        let settings = GridSettings::from(config);
        move || PlanningCore::new(settings)
    });
    let redraw = use_force_update();

    let planner = Planner {
        api: api.clone(),
        core: core.clone(),
        redraw,
        on_auth_error,
        on_activity,
    };

    use_effect_with((read_only, api.has_token()), {
        let planner = planner.clone();
        move |(read_only, has_token): &(bool, bool)| {
            {
                let mut core = planner.core.borrow_mut();
                core.controller.set_read_only(*read_only);
                if !*has_token {
                    core.controller.clear();
                    core.query = None;
                    core.editor = None;
                    core.banner = None;
                }
            }
            planner.redraw();
            || ()
        }
    });

    let select_week = use_callback(planner.clone(), |query: WeekQuery, planner| {
        planner.select_week(query)
    });
    let reload = use_callback(planner.clone(), |_: (), planner| {
        planner.core.borrow_mut().banner = None;
        planner.fetch();
    });
    let pointer_down = use_callback(
        planner.clone(),
        |(target, pos, geometry, button): (PointerTarget, PointerPos, GridGeometry, PointerButton),
         planner| planner.pointer_down(target, pos, geometry, button),
    );
    let pointer_move = use_callback(
        planner.clone(),
        |(pos, geometry): (PointerPos, GridGeometry), planner| planner.pointer_move(pos, geometry),
    );
    let pointer_up = use_callback(
        planner.clone(),
        |(pos, geometry): (PointerPos, GridGeometry), planner| planner.pointer_up(pos, geometry),
    );
    let cancel = use_callback(planner.clone(), |_: (), planner| planner.cancel());
    let open_slot = use_callback(planner.clone(), |slot_id: SlotId, planner| {
        planner.open_slot(slot_id)
    });
    let save_slot = use_callback(planner.clone(), |request: NewSlotRequest, planner| {
        planner.save_slot(request)
    });
    let delete_slot = use_callback(planner.clone(), |slot_id: SlotId, planner| {
        planner.delete_slot(slot_id)
    });
    let close_editor = use_callback(planner.clone(), |_: (), planner| planner.close_editor());
    let dismiss_banner = use_callback(planner.clone(), |_: (), planner| planner.dismiss_banner());
    let save_notes = use_callback(
        planner.clone(),
        |(comment, done): (String, Responder), planner| planner.save_notes(comment, done),
    );
    let week_operation = use_callback(planner.clone(), |operation: WeekOperation, planner| {
        planner.week_operation(operation)
    });

    let state = core.borrow().state();

    let actions = UsePlanningActions {
        select_week,
        reload,
        pointer_down,
        pointer_move,
        pointer_up,
        cancel,
        open_slot,
        save_slot,
        delete_slot,
        close_editor,
        dismiss_banner,
        save_notes,
        week_operation,
    };

    UsePlanningResult { state, actions }
}
