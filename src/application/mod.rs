mod application;
mod console;
pub mod data;
mod runtime_config;

pub use application::{Application, ApplicationError, Outcome};
pub use runtime_config::{RuntimeConfig, ScanConfig};
