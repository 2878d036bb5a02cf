pub mod api;
pub mod date_utils;
pub mod download;
pub mod logging;
pub mod storage;

pub use api::ApiClient;
pub use logging::Logger;
