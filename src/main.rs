//! maestro-mcp entry point.
//!
//! Parses the CLI, resolves configuration and dispatches: `serve` (the
//! default) hands the process over to the MCP server loop; the remaining
//! subcommands drive the engine facade directly and print human-readable
//! results. All logging goes to stderr so stdout stays clean for protocol
//! frames and command output.

use std::path::PathBuf;

use tracing::{debug, error, info};

use maestro_mcp::cli::{
    ActionCommands, Cli, Commands, LogCommands, MacroCommands, TriggerCommands, VariableCommands,
};
use maestro_mcp::config::BridgeConfig;
use maestro_mcp::engine::Engine;
use maestro_mcp::error::{BridgeError, Result};
use maestro_mcp::mcp::McpServer;
use maestro_mcp::types::{LogKind, Toggle};

fn init_logger(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // RUST_LOG still wins when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);
    debug!("CLI arguments parsed");

    if let Err(e) = run(cli) {
        error!("command failed: {e}");
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = BridgeConfig::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Validate) => run_validate(&config),
        Some(Commands::Macro { command }) => run_macro_command(&Engine::new(config), command),
        Some(Commands::Action { command }) => run_action_command(&Engine::new(config), command),
        Some(Commands::Trigger { command }) => run_trigger_command(&Engine::new(config), command),
        Some(Commands::Variable { command }) => {
            run_variable_command(&Engine::new(config), command)
        }
        Some(Commands::Log { command }) => run_log_command(&Engine::new(config), command),
        Some(Commands::Serve) | None => {
            info!("serving MCP over stdio");
            McpServer::new(Engine::new(config)).run()
        }
    }
}

fn run_validate(config: &BridgeConfig) -> Result<()> {
    config.validate()?;
    for (label, path) in [
        ("engine log", config.engine_log.as_path()),
        ("editor log", config.editor_log.as_path()),
        ("scratch dir", config.scratch_dir.as_path()),
    ] {
        let status = if path.exists() { "found" } else { "missing" };
        println!("{label}: {} ({status})", path.display());
    }
    println!("osascript: {}", config.osascript);
    println!("✓ configuration is valid");
    Ok(())
}

fn run_macro_command(engine: &Engine, command: MacroCommands) -> Result<()> {
    match command {
        MacroCommands::Groups => {
            for group in engine.list_groups()? {
                println!(
                    "{}  {}  {} ({} macros)",
                    group.uid,
                    enabled_mark(group.enabled),
                    group.name,
                    group.macro_count
                );
            }
            Ok(())
        }
        MacroCommands::List { group } => {
            for m in engine.list_macros(group.as_deref())? {
                println!("{}  {}  {} / {}", m.uid, enabled_mark(m.enabled), m.group, m.name);
            }
            Ok(())
        }
        MacroCommands::Show { key } => {
            let details = engine.macro_details(&key)?;
            println!("name:     {}", details.name);
            println!("uid:      {}", details.uid);
            println!("group:    {}", details.group);
            println!("enabled:  {}", details.enabled);
            println!("actions:  {}", details.action_count);
            println!("triggers: {}", details.trigger_count);
            Ok(())
        }
        MacroCommands::Create { name, group } => {
            let uid = engine.create_macro(&name, group.as_deref())?;
            println!("✓ created macro {name:?} ({uid})");
            Ok(())
        }
        MacroCommands::Duplicate { key, new_name, group } => {
            let uid = engine.duplicate_macro(&key, new_name.as_deref(), group.as_deref())?;
            println!("✓ duplicated {key:?} ({uid})");
            Ok(())
        }
        MacroCommands::Move { key, group } => {
            let uid = engine.move_macro(&key, &group)?;
            println!("✓ moved {key:?} to {group:?} ({uid})");
            Ok(())
        }
        MacroCommands::Rename { key, new_name } => {
            let uid = engine.rename_macro(&key, &new_name)?;
            println!("✓ renamed {key:?} to {new_name:?} ({uid})");
            Ok(())
        }
        MacroCommands::SetEnabled { key, state } => {
            let enabled = engine.set_macro_enabled(&key, parse_toggle(&state)?)?;
            println!("✓ {key:?} is now {}", enabled_mark(enabled));
            Ok(())
        }
        MacroCommands::Delete { key, confirm } => {
            require_confirm(confirm, "delete a macro")?;
            let uid = engine.delete_macro(&key)?;
            println!("✓ deleted {key:?} ({uid})");
            Ok(())
        }
        MacroCommands::Run { key, parameter } => {
            let output = engine.execute_macro(&key, parameter.as_deref())?;
            if output.is_empty() {
                println!("✓ executed {key:?}");
            } else {
                println!("{output}");
            }
            Ok(())
        }
        MacroCommands::Reload => {
            engine.reload()?;
            println!("✓ engine reloaded");
            Ok(())
        }
    }
}

fn run_action_command(engine: &Engine, command: ActionCommands) -> Result<()> {
    match command {
        ActionCommands::List { key } => {
            for action in engine.list_actions(&key)? {
                println!(
                    "{:>3}  {}  {}  {}",
                    action.index,
                    enabled_mark(action.enabled),
                    action.type_id,
                    action.name
                );
            }
            Ok(())
        }
        ActionCommands::Xml { key, index } => {
            println!("{}", engine.action_xml(&key, index)?);
            Ok(())
        }
        ActionCommands::Add { key, xml, xml_file } => {
            let xml = xml_source(xml, xml_file)?;
            let count = engine.add_action(&key, &xml)?;
            println!("✓ action added ({count} total)");
            Ok(())
        }
        ActionCommands::Replace { key, index, xml, xml_file } => {
            let xml = xml_source(xml, xml_file)?;
            engine.replace_action(&key, index, &xml)?;
            println!("✓ action {index} replaced");
            Ok(())
        }
        ActionCommands::Delete { key, index, confirm } => {
            require_confirm(confirm, "delete an action")?;
            let count = engine.delete_action(&key, index)?;
            println!("✓ action {index} deleted ({count} remain)");
            Ok(())
        }
        ActionCommands::Move { key, from, to } => {
            engine.move_action(&key, from, to)?;
            println!("✓ action moved from {from} to {to}");
            Ok(())
        }
        ActionCommands::SetEnabled { key, index, state } => {
            let enabled = engine.set_action_enabled(&key, index, parse_toggle(&state)?)?;
            println!("✓ action {index} is now {}", enabled_mark(enabled));
            Ok(())
        }
        ActionCommands::Rename { key, index, new_name } => {
            engine.rename_action(&key, index, &new_name)?;
            println!("✓ action {index} renamed to {new_name:?}");
            Ok(())
        }
    }
}

fn run_trigger_command(engine: &Engine, command: TriggerCommands) -> Result<()> {
    match command {
        TriggerCommands::List { key } => {
            for trigger in engine.list_triggers(&key)? {
                println!("{:>3}  {}", trigger.index, trigger.description);
            }
            Ok(())
        }
        TriggerCommands::Add { key, xml, xml_file } => {
            let xml = xml_source(xml, xml_file)?;
            let count = engine.add_trigger(&key, &xml)?;
            println!("✓ trigger added ({count} total)");
            Ok(())
        }
        TriggerCommands::Delete { key, index, confirm } => {
            require_confirm(confirm, "delete a trigger")?;
            let count = engine.delete_trigger(&key, index)?;
            println!("✓ trigger {index} deleted ({count} remain)");
            Ok(())
        }
    }
}

fn run_variable_command(engine: &Engine, command: VariableCommands) -> Result<()> {
    match command {
        VariableCommands::Get { name } => match engine.variable(&name)? {
            Some(value) => {
                println!("{value}");
                Ok(())
            }
            None => {
                eprintln!("✗ variable {name:?} is not set");
                std::process::exit(1);
            }
        },
        VariableCommands::Set { name, value } => {
            engine.set_variable(&name, &value)?;
            println!("✓ set {name:?}");
            Ok(())
        }
        VariableCommands::Delete { name } => {
            engine.delete_variable(&name)?;
            println!("✓ deleted {name:?}");
            Ok(())
        }
    }
}

fn run_log_command(engine: &Engine, command: LogCommands) -> Result<()> {
    match command {
        LogCommands::Tail { kind, limit } => {
            let kind = parse_log_kind(&kind)?;
            for entry in engine.log_tail(kind, limit)? {
                println!("{}", entry.format_line());
            }
            Ok(())
        }
        LogCommands::Errors { minutes } => {
            let summary = engine.engine_error_summary(minutes)?;
            println!(
                "{} errors in the last {} minutes",
                summary.total_errors, summary.window_minutes
            );
            for m in &summary.by_macro {
                println!("{:>4}  {}", m.count, m.name);
            }
            if !summary.recent.is_empty() {
                println!("recent:");
                for line in &summary.recent {
                    println!("  {line}");
                }
            }
            Ok(())
        }
    }
}

fn enabled_mark(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

fn parse_toggle(s: &str) -> Result<Toggle> {
    s.parse().map_err(|_| {
        BridgeError::validation(format!(
            "invalid state {s:?}; expected enable, disable or toggle"
        ))
    })
}

fn parse_log_kind(s: &str) -> Result<LogKind> {
    s.parse()
        .map_err(|_| BridgeError::validation(format!("unknown log {s:?}; expected engine or editor")))
}

fn require_confirm(confirm: bool, what: &str) -> Result<()> {
    if !confirm {
        return Err(BridgeError::validation(format!(
            "refusing to {what} without --confirm"
        )));
    }
    Ok(())
}

fn xml_source(inline: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (inline, file) {
        (Some(xml), None) => Ok(xml),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (Some(_), Some(_)) => Err(BridgeError::validation(
            "use either --xml or --xml-file, not both",
        )),
        (None, None) => Err(BridgeError::validation(
            "one of --xml or --xml-file is required",
        )),
    }
}
