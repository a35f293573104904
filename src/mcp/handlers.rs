//! Tool call dispatch.
//!
//! Parameter extraction fails fast with the parameter's name; everything
//! past that point is a call into [`Engine`], whose errors carry the
//! operation name already. Either way the client gets a text result with
//! `isError` set rather than a transport-level fault.

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::engine::{Engine, DEFAULT_GROUP};
use crate::types::{LogKind, Toggle};

use super::protocol::ToolCallResult;

const DEFAULT_LOG_LIMIT: usize = 50;
const DEFAULT_ERROR_WINDOW_MINUTES: u64 = 60;

pub struct ToolHandlers {
    engine: Engine,
}

impl ToolHandlers {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// Handle a tool call by name.
    pub fn handle(&self, name: &str, args: Value) -> ToolCallResult {
        match self.dispatch(name, &args) {
            Ok(value) => ToolCallResult::json(&value),
            Err(e) => ToolCallResult::error(e.to_string()),
        }
    }

    fn dispatch(&self, name: &str, args: &Value) -> Result<Value> {
        match name {
            "km_list_groups" => self.list_groups(),
            "km_list_macros" => self.list_macros(args),
            "km_get_macro" => self.get_macro(args),
            "km_create_macro" => self.create_macro(args),
            "km_duplicate_macro" => self.duplicate_macro(args),
            "km_move_macro" => self.move_macro(args),
            "km_rename_macro" => self.rename_macro(args),
            "km_set_macro_enabled" => self.set_macro_enabled(args),
            "km_delete_macro" => self.delete_macro(args),
            "km_execute_macro" => self.execute_macro(args),
            "km_list_actions" => self.list_actions(args),
            "km_get_action_xml" => self.get_action_xml(args),
            "km_add_action" => self.add_action(args),
            "km_replace_action" => self.replace_action(args),
            "km_delete_action" => self.delete_action(args),
            "km_move_action" => self.move_action(args),
            "km_set_action_enabled" => self.set_action_enabled(args),
            "km_rename_action" => self.rename_action(args),
            "km_list_triggers" => self.list_triggers(args),
            "km_add_trigger" => self.add_trigger(args),
            "km_delete_trigger" => self.delete_trigger(args),
            "km_get_variable" => self.get_variable(args),
            "km_set_variable" => self.set_variable(args),
            "km_delete_variable" => self.delete_variable(args),
            "km_reload" => self.reload(),
            "km_engine_log" => self.log_tail(LogKind::Engine, args),
            "km_editor_log" => self.log_tail(LogKind::Editor, args),
            "km_engine_errors" => self.engine_errors(args),
            _ => Err(anyhow!("Unknown tool: {name}")),
        }
    }

    fn list_groups(&self) -> Result<Value> {
        let groups = self.engine.list_groups()?;
        Ok(json!({ "count": groups.len(), "groups": groups }))
    }

    fn list_macros(&self, args: &Value) -> Result<Value> {
        let macros = self.engine.list_macros(optional_str(args, "group"))?;
        Ok(json!({ "count": macros.len(), "macros": macros }))
    }

    fn get_macro(&self, args: &Value) -> Result<Value> {
        let details = self.engine.macro_details(required_str(args, "macro")?)?;
        Ok(serde_json::to_value(details)?)
    }

    fn create_macro(&self, args: &Value) -> Result<Value> {
        let name = required_str(args, "name")?;
        let group = optional_str(args, "group");
        let uid = self.engine.create_macro(name, group)?;
        Ok(json!({
            "uid": uid,
            "name": name,
            "group": group.unwrap_or(DEFAULT_GROUP),
        }))
    }

    fn duplicate_macro(&self, args: &Value) -> Result<Value> {
        let uid = self.engine.duplicate_macro(
            required_str(args, "macro")?,
            optional_str(args, "new_name"),
            optional_str(args, "group"),
        )?;
        Ok(json!({ "uid": uid }))
    }

    fn move_macro(&self, args: &Value) -> Result<Value> {
        let group = required_str(args, "group")?;
        let uid = self.engine.move_macro(required_str(args, "macro")?, group)?;
        Ok(json!({ "uid": uid, "group": group }))
    }

    fn rename_macro(&self, args: &Value) -> Result<Value> {
        let new_name = required_str(args, "new_name")?;
        let uid = self
            .engine
            .rename_macro(required_str(args, "macro")?, new_name)?;
        Ok(json!({ "uid": uid, "name": new_name }))
    }

    fn set_macro_enabled(&self, args: &Value) -> Result<Value> {
        let enabled = self
            .engine
            .set_macro_enabled(required_str(args, "macro")?, required_toggle(args)?)?;
        Ok(json!({ "enabled": enabled }))
    }

    fn delete_macro(&self, args: &Value) -> Result<Value> {
        let uid = self.engine.delete_macro(required_str(args, "macro")?)?;
        Ok(json!({ "deleted": true, "uid": uid }))
    }

    fn execute_macro(&self, args: &Value) -> Result<Value> {
        let output = self.engine.execute_macro(
            required_str(args, "macro")?,
            optional_str(args, "parameter"),
        )?;
        Ok(json!({ "executed": true, "output": output }))
    }

    fn list_actions(&self, args: &Value) -> Result<Value> {
        let actions = self.engine.list_actions(required_str(args, "macro")?)?;
        Ok(json!({ "count": actions.len(), "actions": actions }))
    }

    fn get_action_xml(&self, args: &Value) -> Result<Value> {
        let index = required_index(args, "index")?;
        let xml = self
            .engine
            .action_xml(required_str(args, "macro")?, index)?;
        Ok(json!({ "index": index, "xml": xml }))
    }

    fn add_action(&self, args: &Value) -> Result<Value> {
        let count = self
            .engine
            .add_action(required_str(args, "macro")?, required_str(args, "xml")?)?;
        Ok(json!({ "added": true, "action_count": count }))
    }

    fn replace_action(&self, args: &Value) -> Result<Value> {
        let index = required_index(args, "index")?;
        self.engine.replace_action(
            required_str(args, "macro")?,
            index,
            required_str(args, "xml")?,
        )?;
        Ok(json!({ "replaced": true, "index": index }))
    }

    fn delete_action(&self, args: &Value) -> Result<Value> {
        let count = self
            .engine
            .delete_action(required_str(args, "macro")?, required_index(args, "index")?)?;
        Ok(json!({ "deleted": true, "action_count": count }))
    }

    fn move_action(&self, args: &Value) -> Result<Value> {
        let from = required_index(args, "from")?;
        let to = required_index(args, "to")?;
        self.engine
            .move_action(required_str(args, "macro")?, from, to)?;
        Ok(json!({ "moved": true, "from": from, "to": to }))
    }

    fn set_action_enabled(&self, args: &Value) -> Result<Value> {
        let index = required_index(args, "index")?;
        let enabled = self.engine.set_action_enabled(
            required_str(args, "macro")?,
            index,
            required_toggle(args)?,
        )?;
        Ok(json!({ "index": index, "enabled": enabled }))
    }

    fn rename_action(&self, args: &Value) -> Result<Value> {
        let index = required_index(args, "index")?;
        self.engine.rename_action(
            required_str(args, "macro")?,
            index,
            required_str(args, "name")?,
        )?;
        Ok(json!({ "renamed": true, "index": index }))
    }

    fn list_triggers(&self, args: &Value) -> Result<Value> {
        let triggers = self.engine.list_triggers(required_str(args, "macro")?)?;
        Ok(json!({ "count": triggers.len(), "triggers": triggers }))
    }

    fn add_trigger(&self, args: &Value) -> Result<Value> {
        let count = self
            .engine
            .add_trigger(required_str(args, "macro")?, required_str(args, "xml")?)?;
        Ok(json!({ "added": true, "trigger_count": count }))
    }

    fn delete_trigger(&self, args: &Value) -> Result<Value> {
        let count = self
            .engine
            .delete_trigger(required_str(args, "macro")?, required_index(args, "index")?)?;
        Ok(json!({ "deleted": true, "trigger_count": count }))
    }

    fn get_variable(&self, args: &Value) -> Result<Value> {
        let name = required_str(args, "name")?;
        let value = self.engine.variable(name)?;
        Ok(json!({
            "name": name,
            "exists": value.is_some(),
            "value": value,
        }))
    }

    fn set_variable(&self, args: &Value) -> Result<Value> {
        let name = required_str(args, "name")?;
        self.engine.set_variable(name, required_str(args, "value")?)?;
        Ok(json!({ "set": true, "name": name }))
    }

    fn delete_variable(&self, args: &Value) -> Result<Value> {
        let name = required_str(args, "name")?;
        self.engine.delete_variable(name)?;
        Ok(json!({ "deleted": true, "name": name }))
    }

    fn reload(&self) -> Result<Value> {
        self.engine.reload()?;
        Ok(json!({ "reloaded": true }))
    }

    fn log_tail(&self, kind: LogKind, args: &Value) -> Result<Value> {
        let limit = optional_usize(args, "limit").unwrap_or(DEFAULT_LOG_LIMIT);
        let entries = self.engine.log_tail(kind, limit)?;
        let entries: Vec<Value> = entries
            .iter()
            .map(|e| {
                json!({
                    "line": e.format_line(),
                    "is_error": e.is_error(),
                    "macro_name": e.macro_name(),
                    "action_index": e.action_index(),
                })
            })
            .collect();
        Ok(json!({ "log": kind.to_string(), "count": entries.len(), "entries": entries }))
    }

    fn engine_errors(&self, args: &Value) -> Result<Value> {
        let minutes = optional_usize(args, "minutes")
            .map(|m| m as u64)
            .unwrap_or(DEFAULT_ERROR_WINDOW_MINUTES);
        let summary = self.engine.engine_error_summary(minutes)?;
        Ok(serde_json::to_value(summary)?)
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args[key]
        .as_str()
        .ok_or_else(|| anyhow!("{key} required"))
}

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args[key].as_str()
}

fn required_index(args: &Value, key: &str) -> Result<usize> {
    args[key]
        .as_u64()
        .map(|v| v as usize)
        .ok_or_else(|| anyhow!("{key} required (positive integer)"))
}

fn optional_usize(args: &Value, key: &str) -> Option<usize> {
    args[key].as_u64().map(|v| v as usize)
}

fn required_toggle(args: &Value) -> Result<Toggle> {
    required_str(args, "state")?
        .parse()
        .map_err(|_| anyhow!("state must be one of: enable, disable, toggle"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_str_rejects_missing_and_nonstring() {
        let args = json!({"macro": 7});
        assert!(required_str(&args, "macro").is_err());
        assert!(required_str(&args, "absent").is_err());
        assert_eq!(required_str(&json!({"macro": "M"}), "macro").unwrap(), "M");
    }

    #[test]
    fn test_required_index_accepts_only_unsigned_integers() {
        assert_eq!(required_index(&json!({"index": 3}), "index").unwrap(), 3);
        assert!(required_index(&json!({"index": -1}), "index").is_err());
        assert!(required_index(&json!({"index": "3"}), "index").is_err());
    }

    #[test]
    fn test_required_toggle_parses_strum_values() {
        assert_eq!(required_toggle(&json!({"state": "toggle"})).unwrap(), Toggle::Toggle);
        assert!(required_toggle(&json!({"state": "flip"})).is_err());
    }
}
