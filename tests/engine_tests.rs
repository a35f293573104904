//! Tests for the Engine Facade
//!
//! Runs real engine calls against a scripted fake executor, so the full
//! stack above the process boundary is exercised: validation, staging,
//! script rendering, before/after verification, and reply decoding.
//!
//! These tests verify:
//! - Framed list replies decode into summaries
//! - Verified mutations distinguish applied from silently dropped edits
//! - Staged payload files never outlive the call
//! - Validation rejects bad parameters before any script runs

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::rc::Rc;

use maestro_mcp::config::BridgeConfig;
use maestro_mcp::engine::Engine;
use maestro_mcp::error::{BridgeError, Result};
use maestro_mcp::script_runner::ScriptExecutor;
use maestro_mcp::scripts::ControlScript;
use maestro_mcp::types::Toggle;

// =============================================================================
// Fake Executor
// =============================================================================

/// One scripted reply.
enum Reply {
    /// Returned verbatim, as if the interpreter printed it.
    Raw(&'static str),
    /// Framed with the separator tokens bound in the rendered program.
    Records(Vec<Vec<&'static str>>),
    /// Echo of the absent-token the get-variable program carries.
    AbsentToken,
    /// Interpreter failure with this diagnostic.
    Fail(&'static str),
}

/// Replays scripted replies keyed by operation name and records every call.
#[derive(Clone, Default)]
struct FakeExecutor {
    replies: Rc<RefCell<HashMap<&'static str, VecDeque<Reply>>>>,
    calls: Rc<RefCell<Vec<(String, String)>>>,
}

impl FakeExecutor {
    fn expect(&self, op: &'static str, reply: Reply) {
        self.replies.borrow_mut().entry(op).or_default().push_back(reply);
    }

    fn operations(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(op, _)| op.clone()).collect()
    }

    fn last_render(&self, op: &str) -> String {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|(o, _)| o == op)
            .map(|(_, source)| source.clone())
            .unwrap_or_else(|| panic!("no recorded call for {op}"))
    }
}

impl ScriptExecutor for FakeExecutor {
    fn run(&self, script: &dyn ControlScript) -> Result<String> {
        let op = script.operation();
        let source = script.render();
        self.calls.borrow_mut().push((op.to_string(), source.clone()));

        let reply = self
            .replies
            .borrow_mut()
            .get_mut(op)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("unexpected call to {op}"));

        match reply {
            Reply::Raw(text) => Ok(text.to_string()),
            Reply::Records(records) => Ok(frame_reply(&source, &records)),
            Reply::AbsentToken => Ok(binding(&source, "return \"", "\"")),
            Reply::Fail(detail) => Err(BridgeError::execution(op, detail)),
        }
    }
}

/// Extract the string bound between `open` and `close` in the source.
fn binding(source: &str, open: &str, close: &str) -> String {
    let start = source
        .find(open)
        .unwrap_or_else(|| panic!("program has no {open:?}"))
        + open.len();
    let rest = &source[start..];
    let end = rest.find(close).expect("unterminated binding");
    rest[..end].to_string()
}

/// Build the reply a well-behaved list program would print, using the
/// separator tokens the program itself binds.
fn frame_reply(source: &str, records: &[Vec<&'static str>]) -> String {
    let field_sep = binding(source, "set fieldSep to \"", "\"");
    let record_sep = binding(source, "set recordSep to \"", "\"");
    let mut out = binding(source, "set out to \"", "\"");
    for record in records {
        out.push_str(&record_sep);
        out.push_str(&record.join(&field_sep));
    }
    out
}

fn test_engine(fake: &FakeExecutor, scratch: &Path) -> Engine {
    let config = BridgeConfig {
        scratch_dir: scratch.to_path_buf(),
        ..BridgeConfig::default()
    };
    Engine::with_executor(config, Box::new(fake.clone()))
}

fn scratch_is_empty(scratch: &Path) -> bool {
    std::fs::read_dir(scratch).map(|mut d| d.next().is_none()).unwrap_or(true)
}

const ACTION_XML: &str = "<dict>\n\t<key>MacroActionType</key>\n\t<string>Pause</string>\n</dict>";

// =============================================================================
// List Decoding
// =============================================================================

#[test]
fn test_list_groups_decodes_framed_reply() {
    let fake = FakeExecutor::default();
    fake.expect(
        "list_groups",
        Reply::Records(vec![
            vec!["Global Macro Group", "UID-1", "true", "42"],
            vec!["Ops", "UID-2", "false", "3"],
        ]),
    );
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    let groups = engine.list_groups().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name, "Global Macro Group");
    assert_eq!(groups[0].macro_count, 42);
    assert!(!groups[1].enabled);
}

#[test]
fn test_list_macros_scopes_to_group() {
    let fake = FakeExecutor::default();
    fake.expect(
        "list_macros",
        Reply::Records(vec![vec!["Daily Backup", "UID-9", "true", "Ops"]]),
    );
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    let macros = engine.list_macros(Some("Ops")).unwrap();
    assert_eq!(macros[0].group, "Ops");
    assert!(fake
        .last_render("list_macros")
        .contains("first macro group whose name is \"Ops\" or id is \"Ops\""));
}

#[test]
fn test_undecodable_list_reply_degrades_to_empty() {
    let fake = FakeExecutor::default();
    fake.expect("list_groups", Reply::Raw("execution error: not running"));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    assert!(engine.list_groups().unwrap().is_empty());
}

#[test]
fn test_execution_failure_does_not_degrade() {
    let fake = FakeExecutor::default();
    fake.expect("list_actions", Reply::Fail("application is not running"));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    let err = engine.list_actions("Daily Backup").unwrap_err();
    assert!(matches!(err, BridgeError::Execution { .. }));
}

#[test]
fn test_macro_details_empty_reply_is_an_error() {
    let fake = FakeExecutor::default();
    fake.expect("get_macro", Reply::Records(vec![]));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    let err = engine.macro_details("No Such Macro").unwrap_err();
    assert!(err.to_string().contains("empty reply"));
}

// =============================================================================
// Verified Mutations and Staging
// =============================================================================

#[test]
fn test_add_action_verifies_count_movement() {
    let fake = FakeExecutor::default();
    fake.expect("count_actions", Reply::Raw("2"));
    fake.expect("add_action", Reply::Raw("3"));
    fake.expect("count_actions", Reply::Raw("3"));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    let count = engine.add_action("Daily Backup", ACTION_XML).unwrap();
    assert_eq!(count, 3);
    assert_eq!(
        fake.operations(),
        vec!["count_actions", "add_action", "count_actions"]
    );
    // The program reads the payload from the scratch dir, not inline.
    let render = fake.last_render("add_action");
    assert!(render.contains("read (POSIX file"));
    assert!(render.contains(&dir.path().to_string_lossy().into_owned()));
    assert!(!render.contains("MacroActionType"));
    // The staged file is gone once the call returns.
    assert!(scratch_is_empty(dir.path()));
}

#[test]
fn test_add_action_unmoved_count_is_not_applied() {
    let fake = FakeExecutor::default();
    fake.expect("count_actions", Reply::Raw("2"));
    fake.expect("add_action", Reply::Raw(""));
    fake.expect("count_actions", Reply::Raw("2"));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    let err = engine.add_action("Daily Backup", "<dict>broken").unwrap_err();
    assert!(matches!(err, BridgeError::NotApplied { .. }));
    assert!(err.to_string().contains("add_action"));
    // Cleanup also runs on the failure path.
    assert!(scratch_is_empty(dir.path()));
}

#[test]
fn test_add_trigger_verifies_like_add_action() {
    let fake = FakeExecutor::default();
    fake.expect("count_triggers", Reply::Raw("0"));
    fake.expect("add_trigger", Reply::Raw("1"));
    fake.expect("count_triggers", Reply::Raw("1"));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    assert_eq!(engine.add_trigger("Daily Backup", ACTION_XML).unwrap(), 1);
    assert_eq!(
        fake.operations(),
        vec!["count_triggers", "add_trigger", "count_triggers"]
    );
}

#[test]
fn test_replace_action_is_not_count_verified() {
    // Replacing leaves the count unchanged, so there is nothing to verify
    // against; the call must not be rejected for that.
    let fake = FakeExecutor::default();
    fake.expect("replace_action", Reply::Raw("ok"));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    engine.replace_action("Daily Backup", 2, ACTION_XML).unwrap();
    assert_eq!(fake.operations(), vec!["replace_action"]);
    assert!(scratch_is_empty(dir.path()));
}

// =============================================================================
// Validation Short-Circuits
// =============================================================================

#[test]
fn test_blank_parameters_fail_before_any_script_runs() {
    let fake = FakeExecutor::default();
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    assert!(matches!(engine.list_macros(Some("  ")), Err(BridgeError::Validation(_))));
    assert!(matches!(engine.macro_details(""), Err(BridgeError::Validation(_))));
    assert!(matches!(engine.create_macro(" ", None), Err(BridgeError::Validation(_))));
    assert!(matches!(engine.action_xml("M", 0), Err(BridgeError::Validation(_))));
    assert!(matches!(engine.add_action("M", ""), Err(BridgeError::Validation(_))));
    assert!(matches!(engine.variable(""), Err(BridgeError::Validation(_))));
    assert!(fake.operations().is_empty());
}

#[test]
fn test_move_action_rejects_out_of_range_source() {
    let fake = FakeExecutor::default();
    fake.expect("count_actions", Reply::Raw("3"));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    let err = engine.move_action("Daily Backup", 5, 1).unwrap_err();
    assert!(matches!(err, BridgeError::Validation(_)));
    assert!(err.to_string().contains("3 actions"));
    // The move script itself never ran.
    assert_eq!(fake.operations(), vec!["count_actions"]);
}

#[test]
fn test_move_action_clamps_destination_to_end() {
    let fake = FakeExecutor::default();
    fake.expect("count_actions", Reply::Raw("3"));
    fake.expect("move_action", Reply::Raw("ok"));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    engine.move_action("Daily Backup", 1, 9).unwrap();
    assert!(fake
        .last_render("move_action")
        .contains("move action 1 of m to end of actions of m"));
}

// =============================================================================
// Scalar Replies and Variables
// =============================================================================

#[test]
fn test_set_macro_enabled_returns_resulting_state() {
    let fake = FakeExecutor::default();
    fake.expect("set_macro_enabled", Reply::Raw("false"));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    assert!(!engine.set_macro_enabled("M", Toggle::Toggle).unwrap());
}

#[test]
fn test_delete_action_returns_remaining_count() {
    let fake = FakeExecutor::default();
    fake.expect("delete_action", Reply::Raw("1"));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    assert_eq!(engine.delete_action("M", 2).unwrap(), 1);
}

#[test]
fn test_variable_absent_and_empty_are_distinct() {
    let fake = FakeExecutor::default();
    fake.expect("get_variable", Reply::AbsentToken);
    fake.expect("get_variable", Reply::Raw(""));
    fake.expect("get_variable", Reply::Raw("42"));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    assert_eq!(engine.variable("Missing").unwrap(), None);
    assert_eq!(engine.variable("Empty").unwrap(), Some(String::new()));
    assert_eq!(engine.variable("Counter").unwrap(), Some("42".to_string()));
}

#[test]
fn test_create_macro_defaults_to_global_group() {
    let fake = FakeExecutor::default();
    fake.expect("create_macro", Reply::Raw("UID-NEW"));
    let dir = tempfile::tempdir().unwrap();
    let engine = test_engine(&fake, dir.path());

    assert_eq!(engine.create_macro("Morning", None).unwrap(), "UID-NEW");
    assert!(fake
        .last_render("create_macro")
        .contains("whose name is \"Global Macro Group\""));
}

// =============================================================================
// Log Access Through the Facade
// =============================================================================

#[test]
fn test_log_tail_reads_the_configured_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("Engine.log");
    std::fs::write(
        &log,
        "2025-01-01 10:00:00 Engine starting\n\
         2025-01-01 10:00:05 Execute macro \"Daily Backup\" failed\n",
    )
    .unwrap();

    let config = BridgeConfig {
        engine_log: log,
        scratch_dir: dir.path().to_path_buf(),
        ..BridgeConfig::default()
    };
    let engine = Engine::with_executor(config, Box::new(FakeExecutor::default()));

    let entries = engine.log_tail(maestro_mcp::types::LogKind::Engine, 1).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].message.contains("Daily Backup"));
}
