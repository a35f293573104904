//! Engine variable scripts.
//!
//! Variables live in the engine, not the editor. The engine's `getvariable`
//! returns "" for a variable that does not exist, which would fold absent
//! and empty into one answer; the get script checks existence first and
//! returns a per-call random token for the absent case so callers can tell
//! the two apart.

use crate::applescript::{quote, tell_block, ENGINE_APP};

use super::ControlScript;

/// Assigning this value to a variable deletes it.
pub const VARIABLE_DELETE_TOKEN: &str = "%Delete%";

/// Read a variable, distinguishing absent from empty.
#[derive(Debug)]
pub struct GetVariable {
    name: String,
    absent_token: String,
}

impl GetVariable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            absent_token: format!(
                "__absent_{:016x}{:08x}__",
                rand::random::<u64>(),
                rand::random::<u32>()
            ),
        }
    }

    /// Token the script returns when the variable does not exist.
    pub fn absent_token(&self) -> &str {
        &self.absent_token
    }
}

impl ControlScript for GetVariable {
    fn operation(&self) -> &'static str {
        "get_variable"
    }

    fn render(&self) -> String {
        let name = quote(&self.name);
        let body = format!(
            "if exists variable {name} then\n\
             \treturn getvariable {name}\n\
             else\n\
             \treturn {}\n\
             end if",
            quote(&self.absent_token)
        );
        tell_block(ENGINE_APP, &body)
    }
}

/// Set a variable. Creates it if needed.
#[derive(Debug)]
pub struct SetVariable {
    pub name: String,
    pub value: String,
}

impl ControlScript for SetVariable {
    fn operation(&self) -> &'static str {
        "set_variable"
    }

    fn render(&self) -> String {
        let body = format!("setvariable {} to {}", quote(&self.name), quote(&self.value));
        tell_block(ENGINE_APP, &body)
    }
}

/// Delete a variable via the engine's delete token.
#[derive(Debug)]
pub struct DeleteVariable {
    pub name: String,
}

impl ControlScript for DeleteVariable {
    fn operation(&self) -> &'static str {
        "delete_variable"
    }

    fn render(&self) -> String {
        let body = format!(
            "setvariable {} to {}",
            quote(&self.name),
            quote(VARIABLE_DELETE_TOKEN)
        );
        tell_block(ENGINE_APP, &body)
    }
}
