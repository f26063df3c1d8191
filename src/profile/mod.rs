//! Profile Model
//!
//! Typed view over the flat questionnaire answer mapping. Scoring never reads
//! raw answers; it asks for a [`ControlWeight`], the residual exposure left
//! after the organisation's controls.

mod fields;

pub use fields::{field, FieldKind, ProfileField, CRITICAL_INFRASTRUCTURE_FIELD, PROFILE_FIELDS};

use crate::errors::RiskResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single questionnaire answer as stored in the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Flag(bool),
    Number(f64),
    Text(String),
}

/// Residual exposure derived from an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlWeight {
    /// Control fully in place; the vulnerability is suppressed
    Mitigated,
    Partial,
    Unmitigated,
}

impl ControlWeight {
    pub fn factor(self) -> f64 {
        match self {
            ControlWeight::Mitigated => 0.0,
            ControlWeight::Partial => 0.5,
            ControlWeight::Unmitigated => 1.0,
        }
    }

    /// `None` means the answer carries no usable information.
    pub fn from_answer(answer: &Answer) -> Option<Self> {
        match answer {
            Answer::Flag(true) => Some(ControlWeight::Mitigated),
            Answer::Flag(false) => Some(ControlWeight::Unmitigated),
            Answer::Number(value) => Some(Self::from_residual(*value)),
            Answer::Text(text) => parse_yes_no_token(text).map(Self::from_residual),
        }
    }

    fn from_residual(value: f64) -> Self {
        if value <= 0.0 {
            ControlWeight::Mitigated
        } else if value == 0.5 {
            ControlWeight::Partial
        } else {
            ControlWeight::Unmitigated
        }
    }
}

/// Map the recognised yes / no / partly tokens (German and English) to a
/// residual value.
fn parse_yes_no_token(raw: &str) -> Option<f64> {
    match raw.trim().to_lowercase().as_str() {
        "ja" | "yes" => Some(0.0),
        "nein" | "no" => Some(1.0),
        "teilweise" | "partly" | "teilw." | "teilw" => Some(0.5),
        _ => None,
    }
}

/// Flat answer mapping, field id → answer. Absent fields are unanswered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile {
    answers: BTreeMap<String, Answer>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_answers<I, K>(answers: I) -> Self
    where
        I: IntoIterator<Item = (K, Answer)>,
        K: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn set(&mut self, field_id: impl Into<String>, answer: Answer) {
        self.answers.insert(field_id.into(), answer);
    }

    /// Mark a field as unanswered
    pub fn clear(&mut self, field_id: &str) {
        self.answers.remove(field_id);
    }

    pub fn get(&self, field_id: &str) -> Option<&Answer> {
        self.answers.get(field_id)
    }

    pub fn answers(&self) -> &BTreeMap<String, Answer> {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Raw residual-exposure value for a field (0.0 = controlled, 1.0 = exposed).
    pub fn get_weight(&self, field_id: &str) -> Option<f64> {
        self.control_weight(field_id).map(ControlWeight::factor)
    }

    pub fn control_weight(&self, field_id: &str) -> Option<ControlWeight> {
        self.answers.get(field_id).and_then(ControlWeight::from_answer)
    }

    /// True when the organisation answered "yes" to operating critical infrastructure.
    pub fn is_critical_infrastructure(&self) -> bool {
        self.control_weight(CRITICAL_INFRASTRUCTURE_FIELD) == Some(ControlWeight::Mitigated)
    }

    /// Import a JSON key-value document, coercing each registered field.
    ///
    /// Count fields fall back to 1, yes/no fields to 0. A required yes/no
    /// field stays unanswered unless it holds a recognised token or number.
    /// Keys outside the registry are dropped.
    pub fn import_json(raw: &str) -> RiskResult<Self> {
        let payload: serde_json::Map<String, Value> = serde_json::from_str(raw)?;

        for key in payload.keys() {
            if field(key).is_none() {
                log::debug!("Ignoring unknown profile field '{}'", key);
            }
        }

        let answers = PROFILE_FIELDS
            .iter()
            .filter_map(|f| {
                let value = payload.get(f.id).unwrap_or(&Value::Null);
                let coerced = match f.kind {
                    FieldKind::Count => Some(coerce_count(value)),
                    FieldKind::YesNo => Some(coerce_yes_no(value)),
                    FieldKind::YesNoRequired => parse_yes_no_value(value),
                };
                if coerced.is_none() {
                    log::debug!("Required profile field '{}' left unanswered", f.id);
                }
                coerced.map(|v| (f.id.to_string(), Answer::Number(v)))
            })
            .collect::<BTreeMap<_, _>>();

        log::info!("Imported profile with {} answered fields", answers.len());
        Ok(Self { answers })
    }

    /// Serialize as a pretty-printed UTF-8 JSON document.
    ///
    /// Registered fields without an answer are written as `null`.
    pub fn export_json(&self) -> RiskResult<String> {
        let mut out: BTreeMap<&str, Option<&Answer>> = PROFILE_FIELDS
            .iter()
            .map(|f| (f.id, self.answers.get(f.id)))
            .collect();
        for (key, answer) in &self.answers {
            out.insert(key.as_str(), Some(answer));
        }
        Ok(serde_json::to_string_pretty(&out)?)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let s = s.trim();
            s.is_empty() || s.eq_ignore_ascii_case("none")
        }
        _ => false,
    }
}

fn coerce_count(value: &Value) -> f64 {
    const MIN: f64 = 1.0;
    if is_blank(value) {
        return MIN;
    }
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v.trunc().max(MIN),
        _ => MIN,
    }
}

/// Recognised yes/no answer (tokens, booleans or 0 / 0.5 / 1), else `None`.
fn parse_yes_no_value(value: &Value) -> Option<f64> {
    if is_blank(value) {
        return None;
    }
    let parsed = match value {
        Value::Bool(true) => Some(0.0),
        Value::Bool(false) => Some(1.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_yes_no_token(s).or_else(|| s.trim().parse::<f64>().ok()),
        _ => None,
    };
    parsed.filter(|v| *v == 0.0 || *v == 0.5 || *v == 1.0)
}

fn coerce_yes_no(value: &Value) -> f64 {
    parse_yes_no_value(value).unwrap_or(0.0)
}
