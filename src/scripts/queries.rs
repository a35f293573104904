//! Read-only enumeration scripts.
//!
//! These target the editor application, which owns macro structure. Each
//! list script carries the [`ListFraming`] that was drawn for the call; the
//! caller decodes the reply with the same instance.

use crate::applescript::{tell_block, GroupRef, MacroRef, EDITOR_APP};
use crate::decode::ListFraming;

use super::{framed_preamble, ControlScript};

/// AppleScript handler that digs the `MacroActionType` identifier out of an
/// action's XML. Returns "" when the key is absent.
const EXTRACT_TYPE_HANDLER: &str = "on extractActionType(xmlText)\n\
\tset marker to \"<key>MacroActionType</key>\"\n\
\tif xmlText does not contain marker then return \"\"\n\
\tset oldDelims to AppleScript's text item delimiters\n\
\tset AppleScript's text item delimiters to marker\n\
\tset tailText to text item 2 of xmlText\n\
\tset AppleScript's text item delimiters to \"<string>\"\n\
\tset tailText to text item 2 of tailText\n\
\tset AppleScript's text item delimiters to \"</string>\"\n\
\tset typeName to text item 1 of tailText\n\
\tset AppleScript's text item delimiters to oldDelims\n\
\treturn typeName\n\
end extractActionType";

/// Enumerate every macro group with its macro count.
#[derive(Debug)]
pub struct ListGroups {
    framing: ListFraming,
}

impl ListGroups {
    pub fn new(framing: ListFraming) -> Self {
        Self { framing }
    }
}

impl ControlScript for ListGroups {
    fn operation(&self) -> &'static str {
        "list_groups"
    }

    fn render(&self) -> String {
        let body = "repeat with g in macro groups\n\
             \tset rec to (name of g as text) & fieldSep & (id of g as text) & fieldSep & (enabled of g as text) & fieldSep & ((count of macros of g) as text)\n\
             \tset out to out & recordSep & rec\n\
             end repeat";
        format!(
            "{}\n{}\nreturn out",
            framed_preamble(&self.framing),
            tell_block(EDITOR_APP, body)
        )
    }
}

/// Enumerate macros, either across all groups or within one group.
#[derive(Debug)]
pub struct ListMacros {
    group: Option<GroupRef>,
    framing: ListFraming,
}

impl ListMacros {
    pub fn new(group: Option<GroupRef>, framing: ListFraming) -> Self {
        Self { group, framing }
    }
}

impl ControlScript for ListMacros {
    fn operation(&self) -> &'static str {
        "list_macros"
    }

    fn render(&self) -> String {
        let rec = "set rec to (name of m as text) & fieldSep & (id of m as text) & fieldSep & (enabled of m as text) & fieldSep & gname";
        let body = match &self.group {
            Some(group) => format!(
                "set g to {}\n\
                 set gname to name of g as text\n\
                 repeat with m in macros of g\n\
                 \t{rec}\n\
                 \tset out to out & recordSep & rec\n\
                 end repeat",
                group.selector()
            ),
            None => format!(
                "repeat with g in macro groups\n\
                 \tset gname to name of g as text\n\
                 \trepeat with m in macros of g\n\
                 \t\t{rec}\n\
                 \t\tset out to out & recordSep & rec\n\
                 \tend repeat\n\
                 end repeat"
            ),
        };
        format!(
            "{}\n{}\nreturn out",
            framed_preamble(&self.framing),
            tell_block(EDITOR_APP, &body)
        )
    }
}

/// Enumerate the actions of one macro in execution order.
#[derive(Debug)]
pub struct ListActions {
    target: MacroRef,
    framing: ListFraming,
}

impl ListActions {
    pub fn new(target: MacroRef, framing: ListFraming) -> Self {
        Self { target, framing }
    }
}

impl ControlScript for ListActions {
    fn operation(&self) -> &'static str {
        "list_actions"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             repeat with i from 1 to count of actions of m\n\
             \tset a to action i of m\n\
             \tset rec to (i as text) & fieldSep & (name of a as text) & fieldSep & (my extractActionType(xml of a)) & fieldSep & (enabled of a as text)\n\
             \tset out to out & recordSep & rec\n\
             end repeat",
            self.target.selector()
        );
        format!(
            "{}\n{}\nreturn out\n{EXTRACT_TYPE_HANDLER}",
            framed_preamble(&self.framing),
            tell_block(EDITOR_APP, &body)
        )
    }
}

/// Enumerate the triggers of one macro.
#[derive(Debug)]
pub struct ListTriggers {
    target: MacroRef,
    framing: ListFraming,
}

impl ListTriggers {
    pub fn new(target: MacroRef, framing: ListFraming) -> Self {
        Self { target, framing }
    }
}

impl ControlScript for ListTriggers {
    fn operation(&self) -> &'static str {
        "list_triggers"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             repeat with i from 1 to count of triggers of m\n\
             \tset t to trigger i of m\n\
             \tset rec to (i as text) & fieldSep & (description of t as text)\n\
             \tset out to out & recordSep & rec\n\
             end repeat",
            self.target.selector()
        );
        format!(
            "{}\n{}\nreturn out",
            framed_preamble(&self.framing),
            tell_block(EDITOR_APP, &body)
        )
    }
}

/// Fetch one macro's summary row plus its action and trigger counts.
#[derive(Debug)]
pub struct DescribeMacro {
    target: MacroRef,
    framing: ListFraming,
}

impl DescribeMacro {
    pub fn new(target: MacroRef, framing: ListFraming) -> Self {
        Self { target, framing }
    }
}

impl ControlScript for DescribeMacro {
    fn operation(&self) -> &'static str {
        "get_macro"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             set rec to (name of m as text) & fieldSep & (id of m as text) & fieldSep & (enabled of m as text) & fieldSep & (name of macro group of m as text) & fieldSep & ((count of actions of m) as text) & fieldSep & ((count of triggers of m) as text)\n\
             set out to out & recordSep & rec",
            self.target.selector()
        );
        format!(
            "{}\n{}\nreturn out",
            framed_preamble(&self.framing),
            tell_block(EDITOR_APP, &body)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{ACTION_FIELDS, GROUP_FIELDS, MACRO_FIELDS};

    #[test]
    fn test_list_groups_render() {
        let framing = ListFraming::new(GROUP_FIELDS);
        let header = framing.header();
        let script = ListGroups::new(framing);
        let program = script.render();

        assert!(program.contains(&format!("set out to \"{header}\"")));
        assert!(program.contains("tell application \"Keyboard Maestro\""));
        assert!(program.contains("repeat with g in macro groups"));
        assert!(program.contains("(count of macros of g) as text"));
        assert!(program.trim_end().ends_with("return out"));
    }

    #[test]
    fn test_list_macros_all_groups_uses_nested_repeat() {
        let script = ListMacros::new(None, ListFraming::new(MACRO_FIELDS));
        let program = script.render();
        assert!(program.contains("repeat with g in macro groups"));
        assert!(program.contains("repeat with m in macros of g"));
    }

    #[test]
    fn test_list_macros_scoped_to_group() {
        let script = ListMacros::new(
            Some(GroupRef::new("Ops")),
            ListFraming::new(MACRO_FIELDS),
        );
        let program = script.render();
        assert!(program
            .contains("set g to first macro group whose name is \"Ops\" or id is \"Ops\""));
        assert!(!program.contains("repeat with g in macro groups"));
    }

    #[test]
    fn test_list_actions_appends_extract_handler() {
        let script = ListActions::new(MacroRef::new("Daily Backup"), ListFraming::new(ACTION_FIELDS));
        let program = script.render();
        assert!(program.contains("my extractActionType(xml of a)"));
        assert!(program.trim_end().ends_with("end extractActionType"));
        // The handler lives outside the tell block.
        let tell_end = program.find("end tell").unwrap();
        let handler_start = program.find("on extractActionType").unwrap();
        assert!(handler_start > tell_end);
    }

    #[test]
    fn test_list_actions_escapes_macro_key() {
        let script = ListActions::new(
            MacroRef::new(r#"Say "Hi""#),
            ListFraming::new(ACTION_FIELDS),
        );
        assert!(script.render().contains(r#"name is "Say \"Hi\"""#));
    }

    #[test]
    fn test_describe_macro_emits_six_fields() {
        let script = DescribeMacro::new(MacroRef::new("M"), ListFraming::new(6));
        let program = script.render();
        assert_eq!(program.matches("fieldSep").count(), 6);
        assert!(program.contains("name of macro group of m"));
    }
}
