//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod list;
mod serve;
mod upload;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use list::run_list;
pub use serve::run_serve;
pub use upload::run_upload;
