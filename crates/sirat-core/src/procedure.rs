//! Procedure types: the root content entity and its owned child rows.
//!
//! A procedure exclusively owns five child collections. Child rows never
//! outlive their procedure and carry no identity that survives an edit:
//! every update of a collection replaces all of its rows.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Publication status. Transitions are unconstrained in both directions.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
  #[default]
  Draft,
  Published,
}

impl Status {
  /// Parse the stored/wire form (`"DRAFT"`, `"PUBLISHED"`).
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownStatus(s.to_owned()))
  }
}

// ─── Procedure ───────────────────────────────────────────────────────────────

/// The root record of a procedure, without its child collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
  pub id:                 Uuid,
  pub title:              String,
  /// Free-text tag, e.g. "Identity & Travel".
  pub category:           String,
  pub city:               String,
  pub overview:           String,
  pub eligibility:        String,
  /// Free text, not numeric ("600 ETB (32 pages)").
  pub estimated_cost:     String,
  pub estimated_duration: String,
  pub status:             Status,
  /// Server-assigned; never changes after creation.
  pub created_at:         DateTime<Utc>,
  /// Strictly increases on every successful update.
  pub last_updated:       DateTime<Utc>,
  /// Starts at 1 and is bumped by every update. Callers may echo it back as
  /// `expectedVersion` to detect concurrent edits.
  pub version:            i64,
}

// ─── Child rows ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
  pub id:           Uuid,
  pub procedure_id: Uuid,
  pub title:        String,
  pub description:  String,
  /// 1-based position; always contiguous within a procedure.
  pub order:        u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredDocument {
  pub id:           Uuid,
  pub procedure_id: Uuid,
  pub name:         String,
  /// Free-text classification, e.g. "Original" or "Copy".
  #[serde(rename = "type")]
  pub doc_type:     String,
  /// Always at least 1.
  pub count:        u32,
  pub notes:        Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeLocation {
  pub id:            Uuid,
  pub procedure_id:  Uuid,
  pub name:          String,
  pub sub_city:      Option<String>,
  pub woreda:        Option<String>,
  pub map_link:      Option<String>,
  pub working_hours: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonMistake {
  pub id:           Uuid,
  pub procedure_id: Uuid,
  pub description:  String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLink {
  pub id:           Uuid,
  pub procedure_id: Uuid,
  pub title:        String,
  pub url:          String,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// A procedure with all five child collections attached.
/// Steps are sorted by `order` ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureDetail {
  #[serde(flatten)]
  pub procedure:          Procedure,
  pub steps:              Vec<Step>,
  pub required_documents: Vec<RequiredDocument>,
  pub office_locations:   Vec<OfficeLocation>,
  pub common_mistakes:    Vec<CommonMistake>,
  pub source_links:       Vec<SourceLink>,
}

/// Counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureStats {
  pub total:            u64,
  pub published:        u64,
  pub draft:            u64,
  /// Procedures whose `last_updated` falls within the last seven days.
  pub recently_updated: u64,
}
