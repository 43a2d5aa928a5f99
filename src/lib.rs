// Library surface shared by the binary and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod chart;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod highlight;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod passages;
pub mod results;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod users;
pub mod word_timing;

pub use error::{Error, Result};
