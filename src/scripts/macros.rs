//! Macro lifecycle scripts.
//!
//! Structure changes (create, duplicate, move, rename, enable, delete) go to
//! the editor application. Execution and engine reloads go to the engine,
//! which accepts a macro name or uid directly in `do script`.

use crate::applescript::{quote, tell_block, GroupRef, MacroRef, EDITOR_APP, ENGINE_APP};
use crate::types::Toggle;

use super::ControlScript;

/// Create an empty macro in a group. Returns the new macro's uid.
#[derive(Debug)]
pub struct CreateMacro {
    pub name: String,
    pub group: GroupRef,
}

impl ControlScript for CreateMacro {
    fn operation(&self) -> &'static str {
        "create_macro"
    }

    fn render(&self) -> String {
        let body = format!(
            "set g to {}\n\
             set m to make new macro with properties {{name:{}}} at end of macros of g\n\
             return id of m as text",
            self.group.selector(),
            quote(&self.name)
        );
        tell_block(EDITOR_APP, &body)
    }
}

/// Duplicate a macro, optionally into another group and under a new name.
/// Returns the copy's uid.
#[derive(Debug)]
pub struct DuplicateMacro {
    pub target: MacroRef,
    pub new_name: Option<String>,
    pub group: Option<GroupRef>,
}

impl ControlScript for DuplicateMacro {
    fn operation(&self) -> &'static str {
        "duplicate_macro"
    }

    fn render(&self) -> String {
        let mut body = format!("set m to {}\n", self.target.selector());
        match &self.group {
            Some(group) => {
                body.push_str(&format!("set g to {}\n", group.selector()));
                body.push_str("set c to duplicate m to end of macros of g\n");
            }
            None => body.push_str("set c to duplicate m\n"),
        }
        if let Some(name) = &self.new_name {
            body.push_str(&format!("set name of c to {}\n", quote(name)));
        }
        body.push_str("return id of c as text");
        tell_block(EDITOR_APP, &body)
    }
}

/// Move a macro to another group. Returns the macro's uid, which is stable
/// across the move.
#[derive(Debug)]
pub struct MoveMacro {
    pub target: MacroRef,
    pub group: GroupRef,
}

impl ControlScript for MoveMacro {
    fn operation(&self) -> &'static str {
        "move_macro"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             set g to {}\n\
             set theId to id of m as text\n\
             move m to end of macros of g\n\
             return theId",
            self.target.selector(),
            self.group.selector()
        );
        tell_block(EDITOR_APP, &body)
    }
}

/// Rename a macro. Returns its uid.
#[derive(Debug)]
pub struct RenameMacro {
    pub target: MacroRef,
    pub new_name: String,
}

impl ControlScript for RenameMacro {
    fn operation(&self) -> &'static str {
        "rename_macro"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             set name of m to {}\n\
             return id of m as text",
            self.target.selector(),
            quote(&self.new_name)
        );
        tell_block(EDITOR_APP, &body)
    }
}

/// Enable, disable or flip a macro. Returns the resulting enabled flag.
#[derive(Debug)]
pub struct SetMacroEnabled {
    pub target: MacroRef,
    pub state: Toggle,
}

impl ControlScript for SetMacroEnabled {
    fn operation(&self) -> &'static str {
        "set_macro_enabled"
    }

    fn render(&self) -> String {
        let value = match self.state {
            Toggle::Enable => "true".to_string(),
            Toggle::Disable => "false".to_string(),
            Toggle::Toggle => "not (enabled of m)".to_string(),
        };
        let body = format!(
            "set m to {}\n\
             set enabled of m to {value}\n\
             return enabled of m as text",
            self.target.selector()
        );
        tell_block(EDITOR_APP, &body)
    }
}

/// Delete a macro. Returns the uid it had, captured before deletion.
#[derive(Debug)]
pub struct DeleteMacro {
    pub target: MacroRef,
}

impl ControlScript for DeleteMacro {
    fn operation(&self) -> &'static str {
        "delete_macro"
    }

    fn render(&self) -> String {
        let body = format!(
            "set m to {}\n\
             set theId to id of m as text\n\
             delete m\n\
             return theId",
            self.target.selector()
        );
        tell_block(EDITOR_APP, &body)
    }
}

/// Run a macro through the engine, optionally with a trigger parameter.
///
/// `do script` takes the name or uid as a plain string, so no selector is
/// rendered here; an unknown key fails inside the engine.
#[derive(Debug)]
pub struct ExecuteMacro {
    pub key: String,
    pub parameter: Option<String>,
}

impl ControlScript for ExecuteMacro {
    fn operation(&self) -> &'static str {
        "execute_macro"
    }

    fn render(&self) -> String {
        let body = match &self.parameter {
            Some(parameter) => format!(
                "do script {} with parameter {}",
                quote(&self.key),
                quote(parameter)
            ),
            None => format!("do script {}", quote(&self.key)),
        };
        tell_block(ENGINE_APP, &body)
    }
}

/// Ask the engine to reload all macros from disk.
#[derive(Debug)]
pub struct ReloadEngine;

impl ControlScript for ReloadEngine {
    fn operation(&self) -> &'static str {
        "reload"
    }

    fn render(&self) -> String {
        tell_block(ENGINE_APP, "reload")
    }
}
