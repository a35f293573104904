//! Shared vocabulary types for the bridge.
//!
//! Closed sets of caller-facing values are proper enums rather than loose
//! strings, so CLI and protocol parameters are validated once, up front.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Enablement change applied to a macro, action or trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Toggle {
    /// Enable the entity.
    #[default]
    #[strum(serialize = "enable")]
    Enable,
    /// Disable the entity.
    #[strum(serialize = "disable")]
    Disable,
    /// Flip the current state.
    #[strum(serialize = "toggle")]
    Toggle,
}

/// Which of the two engine-side activity logs to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogKind {
    /// The engine's activity log (macro executions, action failures).
    #[default]
    #[strum(serialize = "engine")]
    Engine,
    /// The editor's activity log (structural edits, syncing).
    #[strum(serialize = "editor")]
    Editor,
}
