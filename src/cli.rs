//! Command line interface definitions.
//!
//! `serve` (the default) speaks MCP over stdio; everything else is a direct
//! command for scripting and debugging without an MCP client in the way.
//! Enablement states and log names arrive as plain strings and are parsed
//! with the same `FromStr` impls the rest of the crate uses.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "maestro-mcp")]
#[command(about = "MCP bridge and command line client for Keyboard Maestro")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true, env = "MAESTRO_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase stderr log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the MCP tool catalog over stdio (default)
    Serve,

    /// Check the effective configuration and report log file status
    Validate,

    /// Macro group and macro operations
    Macro {
        #[command(subcommand)]
        command: MacroCommands,
    },

    /// Action operations within a macro
    Action {
        #[command(subcommand)]
        command: ActionCommands,
    },

    /// Trigger operations within a macro
    Trigger {
        #[command(subcommand)]
        command: TriggerCommands,
    },

    /// Engine variable operations
    Variable {
        #[command(subcommand)]
        command: VariableCommands,
    },

    /// Engine and editor log inspection
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum MacroCommands {
    /// List macro groups
    Groups,

    /// List macros, optionally scoped to one group
    List {
        /// Group name or uid
        #[arg(long)]
        group: Option<String>,
    },

    /// Show one macro's summary
    Show {
        /// Macro name or uid
        key: String,
    },

    /// Create an empty macro
    Create {
        /// Name for the new macro
        name: String,
        /// Target group name or uid (defaults to the Global Macro Group)
        #[arg(long)]
        group: Option<String>,
    },

    /// Duplicate a macro
    Duplicate {
        /// Macro name or uid
        key: String,
        /// Name for the copy
        #[arg(long)]
        new_name: Option<String>,
        /// Group name or uid for the copy
        #[arg(long)]
        group: Option<String>,
    },

    /// Move a macro to another group
    Move {
        /// Macro name or uid
        key: String,
        /// Destination group name or uid
        group: String,
    },

    /// Rename a macro
    Rename {
        /// Macro name or uid
        key: String,
        /// New name
        new_name: String,
    },

    /// Enable, disable or toggle a macro
    SetEnabled {
        /// Macro name or uid
        key: String,
        /// One of: enable, disable, toggle
        state: String,
    },

    /// Delete a macro permanently
    Delete {
        /// Macro name or uid
        key: String,
        /// Required; deletion cannot be undone
        #[arg(long)]
        confirm: bool,
    },

    /// Run a macro through the engine
    Run {
        /// Macro name or uid
        key: String,
        /// Value exposed to the macro as %TriggerValue%
        #[arg(long)]
        parameter: Option<String>,
    },

    /// Ask the engine to reload all macros from disk
    Reload,
}

#[derive(Debug, Subcommand)]
pub enum ActionCommands {
    /// List a macro's actions in execution order
    List {
        /// Macro name or uid
        key: String,
    },

    /// Print one action's XML
    Xml {
        /// Macro name or uid
        key: String,
        /// 1-based action position
        index: usize,
    },

    /// Append an action built from XML
    Add {
        /// Macro name or uid
        key: String,
        /// Inline action XML
        #[arg(long)]
        xml: Option<String>,
        /// Read the action XML from a file
        #[arg(long)]
        xml_file: Option<PathBuf>,
    },

    /// Overwrite one action's XML in place
    Replace {
        /// Macro name or uid
        key: String,
        /// 1-based action position
        index: usize,
        /// Inline action XML
        #[arg(long)]
        xml: Option<String>,
        /// Read the action XML from a file
        #[arg(long)]
        xml_file: Option<PathBuf>,
    },

    /// Delete one action
    Delete {
        /// Macro name or uid
        key: String,
        /// 1-based action position
        index: usize,
        /// Required; deletion cannot be undone
        #[arg(long)]
        confirm: bool,
    },

    /// Move an action to a new position
    Move {
        /// Macro name or uid
        key: String,
        /// 1-based position of the action to move
        from: usize,
        /// 1-based destination position (clamped to the end)
        to: usize,
    },

    /// Enable, disable or toggle one action
    SetEnabled {
        /// Macro name or uid
        key: String,
        /// 1-based action position
        index: usize,
        /// One of: enable, disable, toggle
        state: String,
    },

    /// Rename one action
    Rename {
        /// Macro name or uid
        key: String,
        /// 1-based action position
        index: usize,
        /// New action name
        new_name: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TriggerCommands {
    /// List a macro's triggers
    List {
        /// Macro name or uid
        key: String,
    },

    /// Append a trigger built from XML
    Add {
        /// Macro name or uid
        key: String,
        /// Inline trigger XML
        #[arg(long)]
        xml: Option<String>,
        /// Read the trigger XML from a file
        #[arg(long)]
        xml_file: Option<PathBuf>,
    },

    /// Delete one trigger
    Delete {
        /// Macro name or uid
        key: String,
        /// 1-based trigger position
        index: usize,
        /// Required; deletion cannot be undone
        #[arg(long)]
        confirm: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum VariableCommands {
    /// Print a variable's value; exits nonzero when it does not exist
    Get {
        /// Variable name
        name: String,
    },

    /// Set a variable, creating it if needed
    Set {
        /// Variable name
        name: String,
        /// New value
        value: String,
    },

    /// Delete a variable
    Delete {
        /// Variable name
        name: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum LogCommands {
    /// Print the last entries of a log
    Tail {
        /// Which log: engine or editor
        #[arg(default_value = "engine")]
        kind: String,
        /// Entries to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Summarize recent engine errors
    Errors {
        /// Window size in minutes
        #[arg(long, default_value_t = 60)]
        minutes: u64,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_defaults_to_serve() {
        let cli = Cli::try_parse_from(["maestro-mcp"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_verbosity_accumulates() {
        let cli = Cli::try_parse_from(["maestro-mcp", "-vv", "validate"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Commands::Validate)));
    }

    #[test]
    fn test_macro_list_with_group() {
        let cli =
            Cli::try_parse_from(["maestro-mcp", "macro", "list", "--group", "Ops"]).unwrap();
        let Some(Commands::Macro { command: MacroCommands::List { group } }) = cli.command else {
            panic!("expected macro list");
        };
        assert_eq!(group.as_deref(), Some("Ops"));
    }

    #[test]
    fn test_macro_delete_confirm_flag() {
        let cli = Cli::try_parse_from(["maestro-mcp", "macro", "delete", "Old Macro"]).unwrap();
        let Some(Commands::Macro { command: MacroCommands::Delete { key, confirm } }) = cli.command
        else {
            panic!("expected macro delete");
        };
        assert_eq!(key, "Old Macro");
        assert!(!confirm);

        let cli =
            Cli::try_parse_from(["maestro-mcp", "macro", "delete", "Old Macro", "--confirm"])
                .unwrap();
        let Some(Commands::Macro { command: MacroCommands::Delete { confirm, .. } }) = cli.command
        else {
            panic!("expected macro delete");
        };
        assert!(confirm);
    }

    #[test]
    fn test_action_add_takes_inline_or_file_xml() {
        let cli = Cli::try_parse_from([
            "maestro-mcp", "action", "add", "M", "--xml-file", "/tmp/a.plist",
        ])
        .unwrap();
        let Some(Commands::Action { command: ActionCommands::Add { xml, xml_file, .. } }) =
            cli.command
        else {
            panic!("expected action add");
        };
        assert!(xml.is_none());
        assert_eq!(xml_file, Some(PathBuf::from("/tmp/a.plist")));
    }

    #[test]
    fn test_move_action_positional_indices() {
        let cli = Cli::try_parse_from(["maestro-mcp", "action", "move", "M", "3", "1"]).unwrap();
        let Some(Commands::Action { command: ActionCommands::Move { from, to, .. } }) = cli.command
        else {
            panic!("expected action move");
        };
        assert_eq!((from, to), (3, 1));
    }

    #[test]
    fn test_log_tail_defaults() {
        let cli = Cli::try_parse_from(["maestro-mcp", "log", "tail"]).unwrap();
        let Some(Commands::Log { command: LogCommands::Tail { kind, limit } }) = cli.command else {
            panic!("expected log tail");
        };
        assert_eq!(kind, "engine");
        assert_eq!(limit, 20);
    }

    #[test]
    fn test_config_flag_is_global() {
        let cli = Cli::try_parse_from([
            "maestro-mcp", "log", "errors", "--config", "/etc/bridge.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/bridge.json")));
    }
}
