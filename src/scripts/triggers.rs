//! Trigger editing scripts.
//!
//! Triggers are scripted the same way actions are: addressed by 1-based
//! position, created from staged XML. The engine decides what a trigger
//! means; the bridge only moves the markup.

use crate::applescript::{tell_block, MacroRef, EDITOR_APP};

use super::actions::read_staged;
use super::ControlScript;

/// Count the triggers of a macro.
#[derive(Debug)]
pub struct CountTriggers {
    pub target: MacroRef,
}

impl ControlScript for CountTriggers {
    fn operation(&self) -> &'static str {
        "count_triggers"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             return (count of triggers of m) as text",
            self.target.selector()
        );
        tell_block(EDITOR_APP, &body)
    }
}

/// Append a trigger built from staged XML. Returns the new trigger count.
#[derive(Debug)]
pub struct AddTrigger {
    pub target: MacroRef,
    pub payload_path: String,
}

impl ControlScript for AddTrigger {
    fn operation(&self) -> &'static str {
        "add_trigger"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             make new trigger with properties {{xml:xmlText}} at end of triggers of m\n\
             return (count of triggers of m) as text",
            self.target.selector()
        );
        format!(
            "{}\n{}",
            read_staged(&self.payload_path),
            tell_block(EDITOR_APP, &body)
        )
    }
}

/// Delete one trigger. Returns the remaining trigger count.
#[derive(Debug)]
pub struct DeleteTrigger {
    pub target: MacroRef,
    pub index: usize,
}

impl ControlScript for DeleteTrigger {
    fn operation(&self) -> &'static str {
        "delete_trigger"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             delete trigger {} of m\n\
             return (count of triggers of m) as text",
            self.target.selector(),
            self.index
        );
        tell_block(EDITOR_APP, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trigger_reads_staged_file() {
        let script = AddTrigger {
            target: MacroRef::new("Daily Backup"),
            payload_path: "/tmp/maestro-action-9-1.plist".to_string(),
        };
        let program = script.render();
        assert!(program.starts_with("set xmlText to read (POSIX file"));
        assert!(program.contains("make new trigger with properties {xml:xmlText} at end of triggers of m"));
    }

    #[test]
    fn test_delete_trigger_returns_remaining_count() {
        let script = DeleteTrigger { target: MacroRef::new("M"), index: 1 };
        let program = script.render();
        assert!(program.contains("delete trigger 1 of m"));
        assert!(program.contains("return (count of triggers of m) as text"));
    }

    #[test]
    fn test_count_triggers_render() {
        let script = CountTriggers { target: MacroRef::new("M") };
        assert!(script.render().contains("return (count of triggers of m) as text"));
    }
}
