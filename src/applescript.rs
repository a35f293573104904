//! AppleScript source construction primitives.
//!
//! Everything the bridge tells Keyboard Maestro goes through a generated
//! AppleScript program, so every caller-supplied string MUST pass through
//! [`escape`] (or [`quote`]) before interpolation. The escaping contract is
//! what makes script building infallible: a built program is syntactically
//! valid regardless of the characters in its string parameters, and all
//! remaining failures surface at execution time.
//!
//! # Addressing
//!
//! Macros and groups are addressed by a single caller-supplied key that may
//! be either the display name or the engine-assigned uid. The rendered
//! selector is "the first entity whose name or id equals the key", which is
//! ambiguous when one entity's name collides with another entity's uid —
//! callers are expected to pass uids when they need precision.

/// Name of the editor application that owns macro structure.
pub const EDITOR_APP: &str = "Keyboard Maestro";

/// Name of the engine application that executes macros and owns variables.
pub const ENGINE_APP: &str = "Keyboard Maestro Engine";

/// Escape a string for inclusion inside an AppleScript string literal.
///
/// Backslash and double quote are the characters special to the literal
/// grammar. Newline, carriage return and tab are mapped to their escape
/// sequences because a raw line break terminates an AppleScript literal.
/// All other characters (including the rest of Unicode) pass through;
/// `osascript` compiles UTF-8 source.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Render a string as a complete AppleScript string literal, quotes included.
pub fn quote(input: &str) -> String {
    format!("\"{}\"", escape(input))
}

/// A macro addressed by name or uid.
///
/// Wraps the raw key so call sites cannot forget the name-or-uid
/// disjunction; the selector is rendered in exactly one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroRef(pub String);

impl MacroRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Object specifier resolving to the first matching macro.
    pub fn selector(&self) -> String {
        let k = quote(&self.0);
        format!("first macro whose name is {k} or id is {k}")
    }
}

/// A macro group addressed by name or uid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef(pub String);

impl GroupRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Object specifier resolving to the first matching macro group.
    pub fn selector(&self) -> String {
        let k = quote(&self.0);
        format!("first macro group whose name is {k} or id is {k}")
    }
}

/// Render a `tell application` block around a body of statements.
pub fn tell_block(app: &str, body: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("tell application {}\n", quote(app)));
    for line in body.lines() {
        out.push('\t');
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("end tell");
    out
}
