//! Write-side inputs and the normalisation rules applied to them.
//!
//! Callers never supply identities, timestamps, step positions or validated
//! counts; those are derived here at write time so every backend stores the
//! same shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
  Error, Result,
  procedure::{
    CommonMistake, OfficeLocation, RequiredDocument, SourceLink, Status, Step,
  },
};

/// City assumed when a procedure does not name one.
pub const DEFAULT_CITY: &str = "Addis Ababa";

/// Placeholder for unknown cost and duration estimates.
pub const DEFAULT_ESTIMATE: &str = "TBD";

/// Office hours assumed when an office location does not state any.
pub const DEFAULT_WORKING_HOURS: &str = "8:30 AM - 5:30 PM";

// ─── Coercion helpers ────────────────────────────────────────────────────────

/// Parse the leading integer of `s`, ignoring surrounding whitespace and any
/// trailing garbage: `"5"`, `" 3 "`, `"4+"` and `"12abc"` all parse.
pub fn parse_leading_int(s: &str) -> Option<i64> {
  let s = s.trim_start();
  let (sign, digits) = match s.as_bytes().first() {
    Some(b'-') => (-1, &s[1..]),
    Some(b'+') => (1, &s[1..]),
    _ => (1, s),
  };
  let end = digits
    .find(|c: char| !c.is_ascii_digit())
    .unwrap_or(digits.len());
  if end == 0 {
    return None;
  }
  digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Coerce a loosely-typed document count to a positive integer.
///
/// Integers ≥ 1 (or numeric strings / floats that truncate to one) are kept;
/// anything else (zero, negatives, non-numeric strings, `null`) becomes 1.
pub fn coerce_count(raw: &Value) -> u32 {
  let parsed = match raw {
    Value::Number(n) => n
      .as_i64()
      .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
    Value::String(s) => parse_leading_int(s),
    _ => None,
  };
  match parsed {
    Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
    _ => 1,
  }
}

/// Empty or missing text falls back to `default`.
pub fn text_or(value: Option<String>, default: &str) -> String {
  match value {
    Some(v) if !v.trim().is_empty() => v,
    _ => default.to_owned(),
  }
}

// ─── Child inputs ────────────────────────────────────────────────────────────

/// A step as submitted. Any `order` the caller sends is ignored: positions
/// come from the array index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStep {
  pub title:       String,
  #[serde(default)]
  pub description: String,
}

impl NewStep {
  pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self { title: title.into(), description: description.into() }
  }

  /// Turn an ordered list of inputs into rows numbered `1..=N`.
  pub fn number(procedure_id: Uuid, steps: Vec<NewStep>) -> Vec<Step> {
    steps
      .into_iter()
      .zip(1u32..)
      .map(|(s, order)| Step {
        id: Uuid::new_v4(),
        procedure_id,
        title: s.title,
        description: s.description,
        order,
      })
      .collect()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequiredDocument {
  pub name:     String,
  #[serde(rename = "type", default)]
  pub doc_type: String,
  /// Raw count as submitted; see [`coerce_count`].
  #[serde(default)]
  pub count:    Value,
  #[serde(default)]
  pub notes:    Option<String>,
}

impl NewRequiredDocument {
  pub fn new(name: impl Into<String>, doc_type: impl Into<String>) -> Self {
    Self {
      name:     name.into(),
      doc_type: doc_type.into(),
      count:    Value::from(1),
      notes:    None,
    }
  }

  pub fn with_count(mut self, count: impl Into<Value>) -> Self {
    self.count = count.into();
    self
  }

  pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
    self.notes = Some(notes.into());
    self
  }

  pub fn into_row(self, procedure_id: Uuid) -> RequiredDocument {
    RequiredDocument {
      id: Uuid::new_v4(),
      procedure_id,
      count: coerce_count(&self.count),
      name: self.name,
      doc_type: self.doc_type,
      notes: self.notes,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOfficeLocation {
  pub name:          String,
  #[serde(default)]
  pub sub_city:      Option<String>,
  #[serde(default)]
  pub woreda:        Option<String>,
  #[serde(default)]
  pub map_link:      Option<String>,
  #[serde(default)]
  pub working_hours: Option<String>,
}

impl NewOfficeLocation {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Default::default() }
  }

  pub fn into_row(self, procedure_id: Uuid) -> OfficeLocation {
    OfficeLocation {
      id: Uuid::new_v4(),
      procedure_id,
      name: self.name,
      sub_city: self.sub_city,
      woreda: self.woreda,
      map_link: self.map_link,
      working_hours: text_or(self.working_hours, DEFAULT_WORKING_HOURS),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCommonMistake {
  pub description: String,
}

impl NewCommonMistake {
  pub fn new(description: impl Into<String>) -> Self {
    Self { description: description.into() }
  }

  pub fn into_row(self, procedure_id: Uuid) -> CommonMistake {
    CommonMistake {
      id: Uuid::new_v4(),
      procedure_id,
      description: self.description,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSourceLink {
  pub title: String,
  pub url:   String,
}

impl NewSourceLink {
  pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
    Self { title: title.into(), url: url.into() }
  }

  pub fn into_row(self, procedure_id: Uuid) -> SourceLink {
    SourceLink {
      id: Uuid::new_v4(),
      procedure_id,
      title: self.title,
      url: self.url,
    }
  }
}

// ─── NewProcedure ────────────────────────────────────────────────────────────

/// Input to [`crate::store::ProcedureStore::create`]: root fields plus the
/// initial contents of every child collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProcedure {
  pub title:              String,
  pub category:           String,
  pub city:               Option<String>,
  pub overview:           String,
  pub eligibility:        String,
  pub estimated_cost:     Option<String>,
  pub estimated_duration: Option<String>,
  pub status:             Option<Status>,
  pub steps:              Vec<NewStep>,
  pub required_documents: Vec<NewRequiredDocument>,
  pub office_locations:   Vec<NewOfficeLocation>,
  pub common_mistakes:    Vec<NewCommonMistake>,
  pub source_links:       Vec<NewSourceLink>,
}

impl NewProcedure {
  /// Convenience constructor with every other field left at its default.
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), ..Default::default() }
  }

  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::BlankTitle);
    }
    Ok(())
  }
}

// ─── ProcedurePatch ──────────────────────────────────────────────────────────

/// Input to [`crate::store::ProcedureStore::update`].
///
/// `None` always means "leave unchanged". For collections, `Some(vec![])`
/// removes every row of that kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedurePatch {
  pub title:              Option<String>,
  pub category:           Option<String>,
  pub city:               Option<String>,
  pub overview:           Option<String>,
  pub eligibility:        Option<String>,
  pub estimated_cost:     Option<String>,
  pub estimated_duration: Option<String>,
  pub status:             Option<Status>,
  /// If set, the update fails with a conflict unless the stored version
  /// still equals this value.
  pub expected_version:   Option<i64>,
  pub steps:              Option<Vec<NewStep>>,
  pub required_documents: Option<Vec<NewRequiredDocument>>,
  pub office_locations:   Option<Vec<NewOfficeLocation>>,
  pub common_mistakes:    Option<Vec<NewCommonMistake>>,
  pub source_links:       Option<Vec<NewSourceLink>>,
}

impl ProcedurePatch {
  pub fn validate(&self) -> Result<()> {
    if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
      return Err(Error::BlankTitle);
    }
    Ok(())
  }
}
