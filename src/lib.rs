pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod logging;
pub mod page;
pub mod paths;
pub mod report;
pub mod run;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};
