//! High-level facade over the editor and engine.
//!
//! One method per operation the bridge exposes. Each method validates its
//! inputs, builds the typed script, runs it through the executor, and
//! decodes the reply. Mutations that the engine applies without any
//! confirmation (creating entities from caller-supplied XML) run through
//! [`verified_mutation`] so a silent rejection surfaces as
//! [`BridgeError::NotApplied`] instead of a false success.

use chrono::Local;

use crate::applescript::{GroupRef, MacroRef};
use crate::config::BridgeConfig;
use crate::decode::{
    self, ActionSummary, GroupSummary, ListFraming, MacroDetails, MacroSummary, TriggerSummary,
};
use crate::error::{BridgeError, Result};
use crate::logs::{self, ErrorSummary, LogEntry};
use crate::script_runner::{Osascript, ScriptExecutor};
use crate::scripts::{
    ActionXml, AddAction, AddTrigger, CountActions, CountTriggers, CreateMacro, DeleteAction,
    DeleteMacro, DeleteTrigger, DeleteVariable, DescribeMacro, DuplicateMacro, ExecuteMacro,
    GetVariable, ListActions, ListGroups, ListMacros, ListTriggers, MoveAction, MoveDestination,
    MoveMacro, ReloadEngine, RenameAction, RenameMacro, ReplaceAction, SetActionEnabled,
    SetMacroEnabled, SetVariable,
};
use crate::staging;
use crate::types::{LogKind, Toggle};
use crate::verify::verified_mutation;

/// Group that receives macros created without an explicit group.
pub const DEFAULT_GROUP: &str = "Global Macro Group";

pub struct Engine {
    executor: Box<dyn ScriptExecutor>,
    config: BridgeConfig,
}

impl Engine {
    /// Engine backed by the configured AppleScript interpreter.
    pub fn new(config: BridgeConfig) -> Self {
        let executor = Box::new(Osascript::new(&config.osascript));
        Self { executor, config }
    }

    /// Engine backed by a caller-supplied executor. Tests use this to run
    /// the full stack against a fake interpreter.
    pub fn with_executor(config: BridgeConfig, executor: Box<dyn ScriptExecutor>) -> Self {
        Self { executor, config }
    }

    // --- group and macro queries ---

    pub fn list_groups(&self) -> Result<Vec<GroupSummary>> {
        let framing = ListFraming::new(decode::GROUP_FIELDS);
        let raw = self.executor.run(&ListGroups::new(framing.clone()))?;
        degrade_decode(
            "list_groups",
            framing.decode(&raw).and_then(decode::group_summaries),
        )
    }

    pub fn list_macros(&self, group: Option<&str>) -> Result<Vec<MacroSummary>> {
        if let Some(group) = group {
            require_nonempty("group key", group)?;
        }
        let framing = ListFraming::new(decode::MACRO_FIELDS);
        let script = ListMacros::new(group.map(GroupRef::new), framing.clone());
        let raw = self.executor.run(&script)?;
        degrade_decode(
            "list_macros",
            framing.decode(&raw).and_then(decode::macro_summaries),
        )
    }

    pub fn macro_details(&self, key: &str) -> Result<MacroDetails> {
        require_nonempty("macro key", key)?;
        let framing = ListFraming::new(decode::MACRO_DETAIL_FIELDS);
        let script = DescribeMacro::new(MacroRef::new(key), framing.clone());
        let raw = self.executor.run(&script)?;
        framing
            .decode(&raw)
            .and_then(decode::macro_details)?
            .ok_or_else(|| BridgeError::execution("get_macro", "empty reply from editor"))
    }

    // --- macro lifecycle ---

    /// Create an empty macro and return its uid.
    pub fn create_macro(&self, name: &str, group: Option<&str>) -> Result<String> {
        require_nonempty("macro name", name)?;
        let group = GroupRef::new(group.unwrap_or(DEFAULT_GROUP));
        let script = CreateMacro {
            name: name.to_string(),
            group,
        };
        self.executor.run(&script)
    }

    /// Duplicate a macro and return the copy's uid.
    pub fn duplicate_macro(
        &self,
        key: &str,
        new_name: Option<&str>,
        group: Option<&str>,
    ) -> Result<String> {
        require_nonempty("macro key", key)?;
        let script = DuplicateMacro {
            target: MacroRef::new(key),
            new_name: new_name.map(str::to_string),
            group: group.map(GroupRef::new),
        };
        self.executor.run(&script)
    }

    /// Move a macro to another group and return its uid.
    pub fn move_macro(&self, key: &str, group: &str) -> Result<String> {
        require_nonempty("macro key", key)?;
        require_nonempty("group key", group)?;
        let script = MoveMacro {
            target: MacroRef::new(key),
            group: GroupRef::new(group),
        };
        self.executor.run(&script)
    }

    /// Rename a macro and return its uid.
    pub fn rename_macro(&self, key: &str, new_name: &str) -> Result<String> {
        require_nonempty("macro key", key)?;
        require_nonempty("new name", new_name)?;
        let script = RenameMacro {
            target: MacroRef::new(key),
            new_name: new_name.to_string(),
        };
        self.executor.run(&script)
    }

    /// Change a macro's enabled flag. Returns the resulting state.
    pub fn set_macro_enabled(&self, key: &str, state: Toggle) -> Result<bool> {
        require_nonempty("macro key", key)?;
        let script = SetMacroEnabled {
            target: MacroRef::new(key),
            state,
        };
        decode::parse_bool(&self.executor.run(&script)?)
    }

    /// Delete a macro and return the uid it had.
    pub fn delete_macro(&self, key: &str) -> Result<String> {
        require_nonempty("macro key", key)?;
        let script = DeleteMacro {
            target: MacroRef::new(key),
        };
        self.executor.run(&script)
    }

    /// Run a macro through the engine. Returns whatever the macro printed.
    pub fn execute_macro(&self, key: &str, parameter: Option<&str>) -> Result<String> {
        require_nonempty("macro key", key)?;
        let script = ExecuteMacro {
            key: key.to_string(),
            parameter: parameter.map(str::to_string),
        };
        self.executor.run(&script)
    }

    /// Ask the engine to reload all macros from disk.
    pub fn reload(&self) -> Result<()> {
        self.executor.run(&ReloadEngine)?;
        Ok(())
    }

    // --- actions ---

    pub fn list_actions(&self, key: &str) -> Result<Vec<ActionSummary>> {
        require_nonempty("macro key", key)?;
        let framing = ListFraming::new(decode::ACTION_FIELDS);
        let script = ListActions::new(MacroRef::new(key), framing.clone());
        let raw = self.executor.run(&script)?;
        degrade_decode(
            "list_actions",
            framing.decode(&raw).and_then(decode::action_summaries),
        )
    }

    /// Fetch one action's XML verbatim.
    pub fn action_xml(&self, key: &str, index: usize) -> Result<String> {
        require_nonempty("macro key", key)?;
        require_index("action index", index)?;
        let script = ActionXml {
            target: MacroRef::new(key),
            index,
        };
        self.executor.run(&script)
    }

    /// Append an action built from XML. Returns the new action count.
    ///
    /// The editor silently drops markup it cannot parse, so the count is
    /// read before and after; an unmoved count is reported as
    /// [`BridgeError::NotApplied`].
    pub fn add_action(&self, key: &str, xml: &str) -> Result<usize> {
        require_nonempty("macro key", key)?;
        require_nonempty("action xml", xml)?;
        let staged = staging::stage(xml, &self.config.scratch_dir)?;
        let target = MacroRef::new(key);
        let (after, _) = verified_mutation(
            "add_action",
            || self.count_actions(&target),
            || {
                self.executor.run(&AddAction {
                    target: target.clone(),
                    payload_path: staged.posix_path(),
                })
            },
            |before, after| after > before,
        )?;
        Ok(after)
    }

    /// Overwrite one action's XML in place.
    pub fn replace_action(&self, key: &str, index: usize, xml: &str) -> Result<()> {
        require_nonempty("macro key", key)?;
        require_index("action index", index)?;
        require_nonempty("action xml", xml)?;
        let staged = staging::stage(xml, &self.config.scratch_dir)?;
        let script = ReplaceAction {
            target: MacroRef::new(key),
            index,
            payload_path: staged.posix_path(),
        };
        self.executor.run(&script)?;
        Ok(())
    }

    /// Delete one action. Returns the remaining action count.
    pub fn delete_action(&self, key: &str, index: usize) -> Result<usize> {
        require_nonempty("macro key", key)?;
        require_index("action index", index)?;
        let script = DeleteAction {
            target: MacroRef::new(key),
            index,
        };
        decode::parse_count(&self.executor.run(&script)?)
    }

    /// Move an action to a new position. Both indices are 1-based and refer
    /// to the arrangement before the move; destinations past the end clamp
    /// to the end.
    pub fn move_action(&self, key: &str, from: usize, to: usize) -> Result<()> {
        require_nonempty("macro key", key)?;
        require_index("source index", from)?;
        require_index("destination index", to)?;
        let target = MacroRef::new(key);
        let count = self.count_actions(&target)?;
        if from > count {
            return Err(BridgeError::validation(format!(
                "source index {from} is out of range; the macro has {count} actions"
            )));
        }
        let script = MoveAction {
            target,
            from,
            to: move_destination(to, count),
        };
        self.executor.run(&script)?;
        Ok(())
    }

    /// Change one action's enabled flag. Returns the resulting state.
    pub fn set_action_enabled(&self, key: &str, index: usize, state: Toggle) -> Result<bool> {
        require_nonempty("macro key", key)?;
        require_index("action index", index)?;
        let script = SetActionEnabled {
            target: MacroRef::new(key),
            index,
            state,
        };
        decode::parse_bool(&self.executor.run(&script)?)
    }

    /// Rename one action.
    pub fn rename_action(&self, key: &str, index: usize, new_name: &str) -> Result<()> {
        require_nonempty("macro key", key)?;
        require_index("action index", index)?;
        require_nonempty("new name", new_name)?;
        let script = RenameAction {
            target: MacroRef::new(key),
            index,
            new_name: new_name.to_string(),
        };
        self.executor.run(&script)?;
        Ok(())
    }

    // --- triggers ---

    pub fn list_triggers(&self, key: &str) -> Result<Vec<TriggerSummary>> {
        require_nonempty("macro key", key)?;
        let framing = ListFraming::new(decode::TRIGGER_FIELDS);
        let script = ListTriggers::new(MacroRef::new(key), framing.clone());
        let raw = self.executor.run(&script)?;
        degrade_decode(
            "list_triggers",
            framing.decode(&raw).and_then(decode::trigger_summaries),
        )
    }

    /// Append a trigger built from XML. Verified like [`Self::add_action`].
    pub fn add_trigger(&self, key: &str, xml: &str) -> Result<usize> {
        require_nonempty("macro key", key)?;
        require_nonempty("trigger xml", xml)?;
        let staged = staging::stage(xml, &self.config.scratch_dir)?;
        let target = MacroRef::new(key);
        let (after, _) = verified_mutation(
            "add_trigger",
            || self.count_triggers(&target),
            || {
                self.executor.run(&AddTrigger {
                    target: target.clone(),
                    payload_path: staged.posix_path(),
                })
            },
            |before, after| after > before,
        )?;
        Ok(after)
    }

    /// Delete one trigger. Returns the remaining trigger count.
    pub fn delete_trigger(&self, key: &str, index: usize) -> Result<usize> {
        require_nonempty("macro key", key)?;
        require_index("trigger index", index)?;
        let script = DeleteTrigger {
            target: MacroRef::new(key),
            index,
        };
        decode::parse_count(&self.executor.run(&script)?)
    }

    // --- variables ---

    /// Read a variable. `None` means the variable does not exist, as
    /// opposed to existing with an empty value.
    pub fn variable(&self, name: &str) -> Result<Option<String>> {
        require_nonempty("variable name", name)?;
        let script = GetVariable::new(name);
        let absent = script.absent_token().to_string();
        let raw = self.executor.run(&script)?;
        if raw == absent {
            Ok(None)
        } else {
            Ok(Some(raw))
        }
    }

    pub fn set_variable(&self, name: &str, value: &str) -> Result<()> {
        require_nonempty("variable name", name)?;
        let script = SetVariable {
            name: name.to_string(),
            value: value.to_string(),
        };
        self.executor.run(&script)?;
        Ok(())
    }

    pub fn delete_variable(&self, name: &str) -> Result<()> {
        require_nonempty("variable name", name)?;
        let script = DeleteVariable {
            name: name.to_string(),
        };
        self.executor.run(&script)?;
        Ok(())
    }

    // --- logs ---

    /// Last `limit` entries of the chosen log.
    pub fn log_tail(&self, kind: LogKind, limit: usize) -> Result<Vec<LogEntry>> {
        logs::tail_entries(self.config.log_path(kind), limit)
    }

    /// Error aggregation over the engine log's recent window.
    pub fn engine_error_summary(&self, window_minutes: u64) -> Result<ErrorSummary> {
        logs::summarize_errors(
            self.config.log_path(LogKind::Engine),
            window_minutes,
            Local::now().naive_local(),
        )
    }

    fn count_actions(&self, target: &MacroRef) -> Result<usize> {
        let script = CountActions {
            target: target.clone(),
        };
        decode::parse_count(&self.executor.run(&script)?)
    }

    fn count_triggers(&self, target: &MacroRef) -> Result<usize> {
        let script = CountTriggers {
            target: target.clone(),
        };
        decode::parse_count(&self.executor.run(&script)?)
    }
}

/// Map a decode failure on an enumeration to an empty list. A reply we
/// cannot frame-check is worthless, but for read-only queries an empty
/// answer is more useful to the caller than a hard error.
fn degrade_decode<T>(op: &str, result: Result<Vec<T>>) -> Result<Vec<T>> {
    match result {
        Err(BridgeError::Decode(detail)) => {
            tracing::warn!(op, detail, "discarding undecodable list reply");
            Ok(Vec::new())
        }
        other => other,
    }
}

fn move_destination(to: usize, count: usize) -> MoveDestination {
    if to <= 1 {
        MoveDestination::Beginning
    } else if to >= count {
        MoveDestination::End
    } else {
        MoveDestination::Before(to)
    }
}

fn require_nonempty(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BridgeError::validation(format!("{what} must not be empty")));
    }
    Ok(())
}

fn require_index(what: &str, index: usize) -> Result<()> {
    if index == 0 {
        return Err(BridgeError::validation(format!(
            "{what} is 1-based and must be at least 1"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_destination_clamps() {
        assert_eq!(move_destination(1, 5), MoveDestination::Beginning);
        assert_eq!(move_destination(3, 5), MoveDestination::Before(3));
        assert_eq!(move_destination(5, 5), MoveDestination::End);
        assert_eq!(move_destination(9, 5), MoveDestination::End);
    }

    #[test]
    fn test_require_index_rejects_zero() {
        let err = require_index("action index", 0).unwrap_err();
        assert!(matches!(err, BridgeError::Validation(_)));
        assert!(require_index("action index", 1).is_ok());
    }

    #[test]
    fn test_require_nonempty_trims() {
        assert!(require_nonempty("macro key", "  ").is_err());
        assert!(require_nonempty("macro key", "Daily Backup").is_ok());
    }

    #[test]
    fn test_degrade_decode_keeps_other_errors() {
        let decode_err: Result<Vec<u8>> = Err(BridgeError::decode("bad header"));
        assert_eq!(degrade_decode("list_groups", decode_err).unwrap(), Vec::<u8>::new());

        let exec_err: Result<Vec<u8>> =
            Err(BridgeError::execution("list_groups", "engine not running"));
        assert!(degrade_decode("list_groups", exec_err).is_err());
    }
}
