// Library for tests to access modules

pub mod config;
pub mod device_status;
pub mod error;
pub mod metrics_store;
pub mod models;

pub use error::{Error, Result};
