//! Guidenet Node Library
//!
//! Host for the guide reputation ledger: configuration loading and the
//! serialized replay of operation scripts.

pub mod config;
pub mod replay;

pub use config::NodeConfig;
pub use replay::{apply, load_script, parse_script, replay, Operation, OperationOutcome, ReplayReport};
