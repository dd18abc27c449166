pub mod client;
pub mod config;
pub mod error;
pub mod handle;
mod http;
pub mod results_log;
pub mod types;

pub use client::GtmetrixClient;
pub use config::{GtmetrixConfig, DEFAULT_API_URL};
pub use error::{GtmetrixError, GtmetrixResult};
pub use handle::TestHandle;
pub use results_log::ResultsLog;
pub use types::{Credentials, MetricValue, TestOptions, TestResults, TestState};

pub mod prelude {
    pub use crate::client::*;
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::handle::*;
    pub use crate::results_log::*;
    pub use crate::types::*;
}
