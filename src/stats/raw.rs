//! Serde model of the linter's JSON output with `--stats` enabled.
//!
//! Only the fields the report needs are modelled; everything else in the
//! linter output is ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result for a single linted file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFileResult {
    pub file_path: String,
    #[serde(default)]
    pub messages: Vec<RawMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<RawStats>,
}

/// A single reported problem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// `None` for problems not tied to a rule (e.g. parse errors).
    #[serde(default)]
    pub rule_id: Option<String>,
    /// 0 = off, 1 = warning, 2 = error.
    #[serde(default)]
    pub severity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<Value>>,
}

impl RawMessage {
    pub fn has_fix(&self) -> bool {
        self.fix.as_ref().is_some_and(|f| !f.is_null())
    }

    pub fn has_suggestions(&self) -> bool {
        self.suggestions.as_ref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStats {
    #[serde(default)]
    pub times: RawTimes,
    #[serde(default)]
    pub fix_passes: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTimes {
    #[serde(default)]
    pub passes: Vec<RawPass>,
}

/// Timings for one lint pass. The linter runs extra passes when fixing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPass {
    #[serde(default)]
    pub parse: RawTiming,
    #[serde(default)]
    pub rules: BTreeMap<String, RawRuleTiming>,
    #[serde(default)]
    pub fix: RawTiming,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTiming {
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRuleTiming {
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub fixable: Option<bool>,
}
