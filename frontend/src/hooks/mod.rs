pub mod use_employees;
pub mod use_planning;
pub mod use_session;
