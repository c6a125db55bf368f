mod error_handler;
mod request_log;

pub use error_handler::log_errors;
pub use request_log::record_request;
