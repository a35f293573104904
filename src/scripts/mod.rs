//! Typed script builders for every editor and engine operation.
//!
//! Each operation the bridge performs is a small intent struct that renders
//! the exact AppleScript program for it. Rendering is infallible: every
//! caller-supplied string passes through [`crate::applescript::quote`] on its
//! way into the program, so hostile content can change what a script *says*
//! but never whether it parses. Failures surface when the program runs.

pub mod actions;
pub mod macros;
pub mod queries;
pub mod triggers;
pub mod variables;

pub use actions::{
    ActionXml, AddAction, CountActions, DeleteAction, MoveAction, MoveDestination, RenameAction,
    ReplaceAction, SetActionEnabled,
};
pub use macros::{
    CreateMacro, DeleteMacro, DuplicateMacro, ExecuteMacro, MoveMacro, ReloadEngine, RenameMacro,
    SetMacroEnabled,
};
pub use queries::{DescribeMacro, ListActions, ListGroups, ListMacros, ListTriggers};
pub use triggers::{AddTrigger, CountTriggers, DeleteTrigger};
pub use variables::{DeleteVariable, GetVariable, SetVariable, VARIABLE_DELETE_TOKEN};

use crate::applescript::quote;
use crate::decode::ListFraming;

/// A renderable control script.
pub trait ControlScript {
    /// Operation name used in error reports and logs.
    fn operation(&self) -> &'static str;

    /// Render the complete AppleScript program for this intent.
    fn render(&self) -> String;
}

/// Opening statements shared by list-returning scripts: bind the separator
/// tokens and seed the accumulator with the framing header.
pub(crate) fn framed_preamble(framing: &ListFraming) -> String {
    format!(
        "set fieldSep to {}\nset recordSep to {}\nset out to {}",
        quote(framing.field_sep()),
        quote(framing.record_sep()),
        quote(&framing.header())
    )
}
