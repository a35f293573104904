//! The fixed tool catalog served over `tools/list`.
//!
//! Names, parameter schemas and descriptions live here in one place; the
//! dispatch table in [`super::handlers`] must cover exactly these names.

use serde_json::json;

use super::protocol::Tool;

pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "km_list_groups".into(),
            description: "List every macro group with its uid, enabled state and macro count"
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        Tool {
            name: "km_list_macros".into(),
            description: "List macros across all groups, or within one group".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "group": {"type": "string", "description": "Group name or uid to scope the listing"}
                }
            }),
        },
        Tool {
            name: "km_get_macro".into(),
            description: "Fetch one macro's summary: uid, group, enabled state, action and trigger counts".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"}
                },
                "required": ["macro"]
            }),
        },
        Tool {
            name: "km_create_macro".into(),
            description: "Create an empty macro. Returns the new macro's uid".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Name for the new macro"},
                    "group": {"type": "string", "description": "Target group name or uid; defaults to the Global Macro Group"}
                },
                "required": ["name"]
            }),
        },
        Tool {
            name: "km_duplicate_macro".into(),
            description: "Duplicate a macro, optionally renaming the copy or placing it in another group".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "new_name": {"type": "string", "description": "Name for the copy"},
                    "group": {"type": "string", "description": "Group name or uid for the copy"}
                },
                "required": ["macro"]
            }),
        },
        Tool {
            name: "km_move_macro".into(),
            description: "Move a macro to another group".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "group": {"type": "string", "description": "Destination group name or uid"}
                },
                "required": ["macro", "group"]
            }),
        },
        Tool {
            name: "km_rename_macro".into(),
            description: "Rename a macro".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "new_name": {"type": "string", "description": "New macro name"}
                },
                "required": ["macro", "new_name"]
            }),
        },
        Tool {
            name: "km_set_macro_enabled".into(),
            description: "Enable, disable or toggle a macro. Returns the resulting state".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "state": {"type": "string", "enum": ["enable", "disable", "toggle"]}
                },
                "required": ["macro", "state"]
            }),
        },
        Tool {
            name: "km_delete_macro".into(),
            description: "Delete a macro permanently".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"}
                },
                "required": ["macro"]
            }),
        },
        Tool {
            name: "km_execute_macro".into(),
            description: "Run a macro through the engine, optionally passing a trigger parameter".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "parameter": {"type": "string", "description": "Value exposed to the macro as %TriggerValue%"}
                },
                "required": ["macro"]
            }),
        },
        Tool {
            name: "km_list_actions".into(),
            description: "List a macro's actions in execution order with type and enabled state".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"}
                },
                "required": ["macro"]
            }),
        },
        Tool {
            name: "km_get_action_xml".into(),
            description: "Fetch one action's XML for inspection or editing".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "index": {"type": "integer", "description": "1-based action position"}
                },
                "required": ["macro", "index"]
            }),
        },
        Tool {
            name: "km_add_action".into(),
            description: "Append an action built from XML. Fails with a not-applied error if the editor silently rejects the markup".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "xml": {"type": "string", "description": "Action XML; a bare <dict> fragment is wrapped in a plist document automatically"}
                },
                "required": ["macro", "xml"]
            }),
        },
        Tool {
            name: "km_replace_action".into(),
            description: "Overwrite one action's XML in place".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "index": {"type": "integer", "description": "1-based action position"},
                    "xml": {"type": "string", "description": "Replacement action XML"}
                },
                "required": ["macro", "index", "xml"]
            }),
        },
        Tool {
            name: "km_delete_action".into(),
            description: "Delete one action. Returns the remaining action count".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "index": {"type": "integer", "description": "1-based action position"}
                },
                "required": ["macro", "index"]
            }),
        },
        Tool {
            name: "km_move_action".into(),
            description: "Move an action to a new position; positions past the end clamp to the end".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "from": {"type": "integer", "description": "1-based position of the action to move"},
                    "to": {"type": "integer", "description": "1-based destination position"}
                },
                "required": ["macro", "from", "to"]
            }),
        },
        Tool {
            name: "km_set_action_enabled".into(),
            description: "Enable, disable or toggle one action. Returns the resulting state".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "index": {"type": "integer", "description": "1-based action position"},
                    "state": {"type": "string", "enum": ["enable", "disable", "toggle"]}
                },
                "required": ["macro", "index", "state"]
            }),
        },
        Tool {
            name: "km_rename_action".into(),
            description: "Rename one action".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "index": {"type": "integer", "description": "1-based action position"},
                    "name": {"type": "string", "description": "New action name"}
                },
                "required": ["macro", "index", "name"]
            }),
        },
        Tool {
            name: "km_list_triggers".into(),
            description: "List a macro's triggers with their descriptions".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"}
                },
                "required": ["macro"]
            }),
        },
        Tool {
            name: "km_add_trigger".into(),
            description: "Append a trigger built from XML. Fails with a not-applied error if the editor silently rejects the markup".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "xml": {"type": "string", "description": "Trigger XML"}
                },
                "required": ["macro", "xml"]
            }),
        },
        Tool {
            name: "km_delete_trigger".into(),
            description: "Delete one trigger. Returns the remaining trigger count".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "macro": {"type": "string", "description": "Macro name or uid"},
                    "index": {"type": "integer", "description": "1-based trigger position"}
                },
                "required": ["macro", "index"]
            }),
        },
        Tool {
            name: "km_get_variable".into(),
            description: "Read an engine variable, distinguishing a missing variable from an empty one".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Variable name"}
                },
                "required": ["name"]
            }),
        },
        Tool {
            name: "km_set_variable".into(),
            description: "Set an engine variable, creating it if needed".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Variable name"},
                    "value": {"type": "string", "description": "New value"}
                },
                "required": ["name", "value"]
            }),
        },
        Tool {
            name: "km_delete_variable".into(),
            description: "Delete an engine variable".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Variable name"}
                },
                "required": ["name"]
            }),
        },
        Tool {
            name: "km_reload".into(),
            description: "Ask the engine to reload all macros from disk".into(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        Tool {
            name: "km_engine_log".into(),
            description: "Tail the engine log, which records macro executions and failures".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit": {"type": "integer", "description": "Entries to return; defaults to 50"}
                }
            }),
        },
        Tool {
            name: "km_editor_log".into(),
            description: "Tail the editor log, which records structural edits and syncing".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit": {"type": "integer", "description": "Entries to return; defaults to 50"}
                }
            }),
        },
        Tool {
            name: "km_engine_errors".into(),
            description: "Summarize recent engine errors: totals, per-macro counts and the latest error lines".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "minutes": {"type": "integer", "description": "Window size in minutes; defaults to 60"}
                }
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_shape() {
        let tools = get_tools();
        assert_eq!(tools.len(), 28);

        let names: HashSet<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), tools.len(), "tool names must be unique");
        assert!(names.iter().all(|name| name.starts_with("km_")));
    }

    #[test]
    fn test_every_schema_is_an_object_with_properties() {
        for tool in get_tools() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(tool.input_schema["properties"].is_object(), "{}", tool.name);
            assert!(!tool.description.is_empty(), "{}", tool.name);
        }
    }

    #[test]
    fn test_required_params_exist_in_properties() {
        for tool in get_tools() {
            let Some(required) = tool.input_schema["required"].as_array() else {
                continue;
            };
            for key in required {
                let key = key.as_str().unwrap();
                assert!(
                    tool.input_schema["properties"][key].is_object(),
                    "{} requires undeclared param {key}",
                    tool.name
                );
            }
        }
    }
}
