//! Action editing scripts.
//!
//! Actions are addressed by 1-based position within their macro, matching
//! what the editor shows. Scripts that ingest XML read it from a staged file
//! (see [`crate::staging`]) so the payload never passes through AppleScript
//! string escaping; only the file path does.

use crate::applescript::{quote, tell_block, MacroRef, EDITOR_APP};
use crate::types::Toggle;

use super::ControlScript;

pub(super) fn read_staged(path: &str) -> String {
    format!("set xmlText to read (POSIX file {}) as «class utf8»", quote(path))
}

/// Count the actions of a macro. Used as the observation for verified
/// mutations as well as for its own sake.
#[derive(Debug)]
pub struct CountActions {
    pub target: MacroRef,
}

impl ControlScript for CountActions {
    fn operation(&self) -> &'static str {
        "count_actions"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             return (count of actions of m) as text",
            self.target.selector()
        );
        tell_block(EDITOR_APP, &body)
    }
}

/// Append an action built from staged XML. Returns the new action count.
#[derive(Debug)]
pub struct AddAction {
    pub target: MacroRef,
    pub payload_path: String,
}

impl ControlScript for AddAction {
    fn operation(&self) -> &'static str {
        "add_action"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             make new action with properties {{xml:xmlText}} at end of actions of m\n\
             return (count of actions of m) as text",
            self.target.selector()
        );
        format!(
            "{}\n{}",
            read_staged(&self.payload_path),
            tell_block(EDITOR_APP, &body)
        )
    }
}

/// Overwrite one action's XML in place.
#[derive(Debug)]
pub struct ReplaceAction {
    pub target: MacroRef,
    pub index: usize,
    pub payload_path: String,
}

impl ControlScript for ReplaceAction {
    fn operation(&self) -> &'static str {
        "replace_action"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             set xml of action {} of m to xmlText\n\
             return \"ok\"",
            self.target.selector(),
            self.index
        );
        format!(
            "{}\n{}",
            read_staged(&self.payload_path),
            tell_block(EDITOR_APP, &body)
        )
    }
}

/// Delete one action. Returns the remaining action count.
#[derive(Debug)]
pub struct DeleteAction {
    pub target: MacroRef,
    pub index: usize,
}

impl ControlScript for DeleteAction {
    fn operation(&self) -> &'static str {
        "delete_action"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             delete action {} of m\n\
             return (count of actions of m) as text",
            self.target.selector(),
            self.index
        );
        tell_block(EDITOR_APP, &body)
    }
}

/// Where a moved action lands, expressed against the arrangement before
/// the move. Callers clamp out-of-range destinations to `End`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDestination {
    Beginning,
    Before(usize),
    End,
}

/// Reorder one action within its macro.
#[derive(Debug)]
pub struct MoveAction {
    pub target: MacroRef,
    pub from: usize,
    pub to: MoveDestination,
}

impl ControlScript for MoveAction {
    fn operation(&self) -> &'static str {
        "move_action"
    }

    fn render(&self) -> String {
        let destination = match self.to {
            MoveDestination::Beginning => "beginning of actions of m".to_string(),
            MoveDestination::Before(index) => format!("before action {index} of m"),
            MoveDestination::End => "end of actions of m".to_string(),
        };
        let body = format!(
            "set m to {}\n\
             move action {} of m to {destination}\n\
             return \"ok\"",
            self.target.selector(),
            self.from
        );
        tell_block(EDITOR_APP, &body)
    }
}

/// Enable, disable or flip one action. Returns the resulting flag.
#[derive(Debug)]
pub struct SetActionEnabled {
    pub target: MacroRef,
    pub index: usize,
    pub state: Toggle,
}

impl ControlScript for SetActionEnabled {
    fn operation(&self) -> &'static str {
        "set_action_enabled"
    }

    fn render(&self) -> String {
        let value = match self.state {
            Toggle::Enable => "true".to_string(),
            Toggle::Disable => "false".to_string(),
            Toggle::Toggle => format!("not (enabled of action {} of m)", self.index),
        };
        let body = format!(
            "set m to {}\n\
             set enabled of action {i} of m to {value}\n\
             return enabled of action {i} of m as text",
            self.target.selector(),
            i = self.index
        );
        tell_block(EDITOR_APP, &body)
    }
}

/// Rename one action.
#[derive(Debug)]
pub struct RenameAction {
    pub target: MacroRef,
    pub index: usize,
    pub new_name: String,
}

impl ControlScript for RenameAction {
    fn operation(&self) -> &'static str {
        "rename_action"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             set name of action {} of m to {}\n\
             return \"ok\"",
            self.target.selector(),
            self.index,
            quote(&self.new_name)
        );
        tell_block(EDITOR_APP, &body)
    }
}

/// Fetch one action's XML verbatim.
#[derive(Debug)]
pub struct ActionXml {
    pub target: MacroRef,
    pub index: usize,
}

impl ControlScript for ActionXml {
    fn operation(&self) -> &'static str {
        "get_action_xml"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             return xml of action {} of m",
            self.target.selector(),
            self.index
        );
        tell_block(EDITOR_APP, &body)
    }
}
