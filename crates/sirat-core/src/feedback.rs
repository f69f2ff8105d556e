//! Citizen feedback about a procedure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::input::parse_leading_int;

/// Answer to "Was this guide helpful?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Helpfulness {
  Yes,
  Somewhat,
  No,
}

/// Answer to "Did you complete the procedure?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Completion {
  Yes,
  NotYet,
}

/// A stored feedback submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
  pub id:              Uuid,
  pub procedure_id:    Uuid,
  pub helpful:         Option<Helpfulness>,
  pub completed:       Option<Completion>,
  pub city:            Option<String>,
  pub extra_documents: Option<String>,
  pub visits:          Option<u32>,
  pub unclear:         Option<String>,
  /// Client-reported submission time, if any.
  pub submitted_at:    Option<DateTime<Utc>>,
  /// Server-assigned.
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::ProcedureStore::submit_feedback`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
  pub procedure_id:    Uuid,
  #[serde(default)]
  pub helpful:         Option<Helpfulness>,
  #[serde(default)]
  pub completed:       Option<Completion>,
  #[serde(default)]
  pub city:            Option<String>,
  #[serde(default)]
  pub extra_documents: Option<String>,
  /// Accepts a number or a form value such as `"2"` or `"4+"`.
  #[serde(default, deserialize_with = "lenient_visits")]
  pub visits:          Option<u32>,
  #[serde(default)]
  pub unclear:         Option<String>,
  #[serde(default, rename = "timestamp")]
  pub submitted_at:    Option<DateTime<Utc>>,
}

impl NewFeedback {
  pub fn new(procedure_id: Uuid) -> Self {
    Self { procedure_id, ..Default::default() }
  }
}

fn lenient_visits<'de, D>(de: D) -> Result<Option<u32>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Value::deserialize(de)?;
  let n = match raw {
    Value::Number(n) => n.as_i64(),
    Value::String(s) => parse_leading_int(&s),
    _ => None,
  };
  Ok(n.and_then(|n| u32::try_from(n).ok()))
}

/// Aggregates over feedback submissions. Rates are whole percentages of the
/// submissions that answered the question.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSummary {
  pub total_feedback:  u64,
  pub helpful_rate:    Option<u8>,
  pub completion_rate: Option<u8>,
  pub average_visits:  Option<f64>,
}

impl FeedbackSummary {
  /// Fold a set of submissions into a summary.
  pub fn from_feedback<'a>(items: impl IntoIterator<Item = &'a Feedback>) -> Self {
    let mut total = 0u64;
    let (mut helpful_yes, mut helpful_answered) = (0u64, 0u64);
    let (mut done_yes, mut done_answered) = (0u64, 0u64);
    let (mut visit_sum, mut visit_count) = (0u64, 0u64);

    for f in items {
      total += 1;
      if let Some(h) = f.helpful {
        helpful_answered += 1;
        if h == Helpfulness::Yes {
          helpful_yes += 1;
        }
      }
      if let Some(c) = f.completed {
        done_answered += 1;
        if c == Completion::Yes {
          done_yes += 1;
        }
      }
      if let Some(v) = f.visits {
        visit_sum += u64::from(v);
        visit_count += 1;
      }
    }

    Self {
      total_feedback:  total,
      helpful_rate:    percent(helpful_yes, helpful_answered),
      completion_rate: percent(done_yes, done_answered),
      average_visits:  (visit_count > 0)
        .then(|| visit_sum as f64 / visit_count as f64),
    }
  }
}

fn percent(part: u64, whole: u64) -> Option<u8> {
  (whole > 0).then(|| ((part as f64 / whole as f64) * 100.0).round() as u8)
}
