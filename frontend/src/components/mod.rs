pub mod backup_panel;
pub mod employee_admin;
pub mod employee_modal;
pub mod error_banner;
pub mod header;
pub mod login_view;
pub mod notes_panel;
pub mod planning_grid;
pub mod planning_view;
pub mod repartition_panel;
pub mod slot_form_modal;
pub mod week_toolbar;
