//! Keyboard Maestro MCP bridge library
//!
//! This library turns typed macro-editing intents into AppleScript control
//! scripts, runs them through `osascript`, decodes the replies and exposes
//! the whole surface as MCP tools over stdio.

pub mod applescript;
pub mod cli;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod logs;
pub mod mcp;
pub mod script_runner;
pub mod scripts;
pub mod staging;
pub mod types;
pub mod verify;

// Re-export main types for convenience
pub use config::BridgeConfig;
pub use engine::Engine;
pub use error::{BridgeError, Result};
pub use mcp::McpServer;
pub use script_runner::{Osascript, ScriptExecutor};
pub use staging::{stage, StagedPayload};
pub use types::{LogKind, Toggle};
pub use verify::verified_mutation;

pub use decode::{
    ActionSummary, GroupSummary, ListFraming, MacroDetails, MacroSummary, TriggerSummary,
};
pub use logs::{ErrorSummary, LogEntry, MacroErrorCount};
pub use scripts::ControlScript;
