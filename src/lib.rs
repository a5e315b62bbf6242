pub mod cli;
pub mod commands;
pub mod config;
pub mod device;
pub mod errors;
pub mod executor;
pub mod filtering;
pub mod inventory;
pub mod report;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use errors::OpError;
pub use executor::{FanOut, OpOutcome, SessionLimit};
pub use inventory::Record;
pub use report::Report;
