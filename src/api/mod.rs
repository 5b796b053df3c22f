//! API Module
//!
//! Request-level operations over the loaded model. Every command returns
//! either a success payload or a `{success: false, error, kind}` error.
//!
//! Structure:
//! - commands.rs: `LeadService` and its commands
//! - engine_status.rs: status snapshot for the CLI

pub mod commands;
pub mod engine_status;

pub use commands::*;
pub use engine_status::EngineStatus;
