//! Decoding of list replies returned by generated scripts.
//!
//! Keyboard Maestro has no structured reply channel, so enumeration scripts
//! serialize their results as delimited text on stdout. Fixed delimiter
//! characters would collide with user content (macro names can contain
//! anything), so every call draws fresh random separator tokens and the
//! script emits a header naming them as a fixed-form prefix. The
//! decoder checks the header and the per-record field count, which turns
//! silent corruption into a [`BridgeError::Decode`].
//!
//! Replies the engine formats itself (counts, enabled flags, variable
//! values, action XML) are not framed; see [`parse_count`] and
//! [`parse_bool`].

use serde::Serialize;

use crate::error::{BridgeError, Result};

/// Field count for group enumeration records: name, uid, enabled, macros.
pub const GROUP_FIELDS: usize = 4;
/// Field count for macro enumeration records: name, uid, enabled, group.
pub const MACRO_FIELDS: usize = 4;
/// Field count for action enumeration records: index, name, type, enabled.
pub const ACTION_FIELDS: usize = 4;
/// Field count for trigger enumeration records: index, description.
pub const TRIGGER_FIELDS: usize = 2;
/// Field count for the single-record macro detail reply:
/// name, uid, enabled, group, action count, trigger count.
pub const MACRO_DETAIL_FIELDS: usize = 6;

/// Separator tokens for one list-returning call.
///
/// A fresh instance is drawn per call; the same instance must be used to
/// render the script and to decode its output.
#[derive(Debug, Clone)]
pub struct ListFraming {
    fields: usize,
    record_sep: String,
    field_sep: String,
}

impl ListFraming {
    /// Draw random separators for records of `fields` fields each.
    pub fn new(fields: usize) -> Self {
        Self {
            fields,
            record_sep: format!(
                "@@R-{:016x}{:08x}@@",
                rand::random::<u64>(),
                rand::random::<u32>()
            ),
            field_sep: format!(
                "@@F-{:016x}{:08x}@@",
                rand::random::<u64>(),
                rand::random::<u32>()
            ),
        }
    }

    pub fn fields(&self) -> usize {
        self.fields
    }

    /// Token placed between records in the reply.
    pub fn record_sep(&self) -> &str {
        &self.record_sep
    }

    /// Token placed between fields within a record.
    pub fn field_sep(&self) -> &str {
        &self.field_sep
    }

    /// Header the script must emit as the prefix of its reply.
    pub fn header(&self) -> String {
        format!(
            "fields={};record={};field={}",
            self.fields, self.record_sep, self.field_sep
        )
    }

    /// Split a raw reply into records of exactly `fields` fields.
    ///
    /// An empty reply decodes to zero records. Blank record segments
    /// (a trailing separator, stray whitespace) are skipped and fields
    /// are whitespace-trimmed. A missing header or a wrong per-record
    /// field count is a decode error.
    ///
    /// The header names `record_sep` verbatim, so it is matched and
    /// stripped as a literal prefix before the body is token-split.
    pub fn decode(&self, raw: &str) -> Result<Vec<Vec<String>>> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let Some(body) = trimmed.strip_prefix(self.header().as_str()) else {
            return Err(BridgeError::decode(format!(
                "missing or corrupt framing header: {}",
                preview(trimmed)
            )));
        };

        let mut records = Vec::new();
        for segment in body.split(self.record_sep.as_str()) {
            if segment.trim().is_empty() {
                continue;
            }
            let fields: Vec<String> = segment
                .split(self.field_sep.as_str())
                .map(|f| f.trim().to_string())
                .collect();
            if fields.len() != self.fields {
                return Err(BridgeError::decode(format!(
                    "record {} has {} fields, expected {}",
                    records.len() + 1,
                    fields.len(),
                    self.fields
                )));
            }
            records.push(fields);
        }
        Ok(records)
    }
}

/// One macro group as reported by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub uid: String,
    pub enabled: bool,
    pub macro_count: usize,
}

/// One macro as reported by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroSummary {
    pub name: String,
    pub uid: String,
    pub enabled: bool,
    pub group: String,
}

/// Full detail row for one macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroDetails {
    pub name: String,
    pub uid: String,
    pub enabled: bool,
    pub group: String,
    pub action_count: usize,
    pub trigger_count: usize,
}

/// One action within a macro, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSummary {
    pub index: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub type_id: String,
    pub enabled: bool,
}

/// One trigger attached to a macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerSummary {
    pub index: usize,
    pub description: String,
}

/// Map group records (name, uid, enabled, macro count) to summaries.
///
/// Records with an empty name are skipped; entities deleted while the
/// enumeration script was running show up that way.
pub fn group_summaries(records: Vec<Vec<String>>) -> Result<Vec<GroupSummary>> {
    records
        .into_iter()
        .filter(|r| !field(r, 0).trim().is_empty())
        .map(|r| {
            Ok(GroupSummary {
                name: field(&r, 0).to_string(),
                uid: field(&r, 1).to_string(),
                enabled: parse_bool_field(field(&r, 2), "group enabled flag")?,
                macro_count: parse_usize_field(field(&r, 3), "group macro count")?,
            })
        })
        .collect()
}

/// Map macro records (name, uid, enabled, group name) to summaries.
pub fn macro_summaries(records: Vec<Vec<String>>) -> Result<Vec<MacroSummary>> {
    records
        .into_iter()
        .filter(|r| !field(r, 0).trim().is_empty())
        .map(|r| {
            Ok(MacroSummary {
                name: field(&r, 0).to_string(),
                uid: field(&r, 1).to_string(),
                enabled: parse_bool_field(field(&r, 2), "macro enabled flag")?,
                group: field(&r, 3).to_string(),
            })
        })
        .collect()
}

/// Map the single-record macro detail reply. `None` when the reply held
/// no record at all.
pub fn macro_details(records: Vec<Vec<String>>) -> Result<Option<MacroDetails>> {
    let Some(r) = records.into_iter().next() else {
        return Ok(None);
    };
    Ok(Some(MacroDetails {
        name: field(&r, 0).to_string(),
        uid: field(&r, 1).to_string(),
        enabled: parse_bool_field(field(&r, 2), "macro enabled flag")?,
        group: field(&r, 3).to_string(),
        action_count: parse_usize_field(field(&r, 4), "action count")?,
        trigger_count: parse_usize_field(field(&r, 5), "trigger count")?,
    }))
}

/// Map action records (index, name, type, enabled) to summaries.
pub fn action_summaries(records: Vec<Vec<String>>) -> Result<Vec<ActionSummary>> {
    records
        .into_iter()
        .filter(|r| !field(r, 1).trim().is_empty())
        .map(|r| {
            Ok(ActionSummary {
                index: parse_usize_field(field(&r, 0), "action index")?,
                name: field(&r, 1).to_string(),
                type_id: field(&r, 2).to_string(),
                enabled: parse_bool_field(field(&r, 3), "action enabled flag")?,
            })
        })
        .collect()
}

/// Map trigger records (index, description) to summaries.
pub fn trigger_summaries(records: Vec<Vec<String>>) -> Result<Vec<TriggerSummary>> {
    records
        .into_iter()
        .filter(|r| !field(r, 1).trim().is_empty())
        .map(|r| {
            Ok(TriggerSummary {
                index: parse_usize_field(field(&r, 0), "trigger index")?,
                description: field(&r, 1).to_string(),
            })
        })
        .collect()
}

/// Parse an unframed count reply such as `"12"`.
pub fn parse_count(raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| BridgeError::decode(format!("count reply is not a number: {}", preview(raw))))
}

/// Parse an unframed boolean reply (`"true"` / `"false"`).
pub fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(BridgeError::decode(format!(
            "boolean reply is not true/false: {}",
            preview(other)
        ))),
    }
}

fn field(record: &[String], index: usize) -> &str {
    record.get(index).map(String::as_str).unwrap_or("")
}

fn parse_usize_field(value: &str, what: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| BridgeError::decode(format!("{what} is not a number: {value:?}")))
}

fn parse_bool_field(value: &str, what: &str) -> Result<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(BridgeError::decode(format!(
            "{what} is not true/false: {other:?}"
        ))),
    }
}

fn preview(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() > 80 {
        let head: String = trimmed.chars().take(80).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}
