//! The `ProcedureStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `sirat-store-sqlite`).
//! Higher layers (`sirat-api`, `sirat-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  feedback::{Feedback, FeedbackSummary, NewFeedback},
  input::{NewProcedure, ProcedurePatch},
  procedure::{Procedure, ProcedureDetail, ProcedureStats, Status},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`ProcedureStore::list`].
#[derive(Debug, Clone, Default)]
pub struct ProcedureQuery {
  /// Restrict to procedures with this status.
  pub status: Option<Status>,
  pub limit:  Option<usize>,
}

// ─── Error classification ────────────────────────────────────────────────────

/// Backend-independent classification of a store failure, used by the API
/// layer to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The referenced procedure does not exist.
  NotFound,
  /// A concurrent edit was detected.
  Conflict,
  /// The input was rejected before touching storage.
  Invalid,
  /// Anything else; nothing was written.
  Storage,
}

/// Errors returned by a [`ProcedureStore`] must be classifiable.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a procedure store backend.
///
/// Every write is atomic: a procedure and all of its child collections are
/// created, replaced or deleted as one unit, or not at all.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ProcedureStore: Send + Sync {
  type Error: StoreError;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist a procedure together with its initial child rows and return the
  /// root record. Children are not returned; fetch with [`Self::get`].
  fn create(
    &self,
    input: NewProcedure,
  ) -> impl Future<Output = Result<Procedure, Self::Error>> + Send + '_;

  /// Apply a partial update. Present root fields are overwritten; every
  /// present collection is replaced wholesale. `last_updated` always advances.
  fn update(
    &self,
    id: Uuid,
    patch: ProcedurePatch,
  ) -> impl Future<Output = Result<Procedure, Self::Error>> + Send + '_;

  /// Delete a procedure and everything it owns.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Procedures ordered by `last_updated`, most recent first.
  fn list(
    &self,
    query: ProcedureQuery,
  ) -> impl Future<Output = Result<Vec<Procedure>, Self::Error>> + Send + '_;

  /// Published procedures whose title, category or overview contains `text`,
  /// case-insensitively. A blank `text` matches every published procedure.
  fn search<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Vec<Procedure>, Self::Error>> + Send + 'a;

  /// The most recently created published procedures.
  fn popular(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Procedure>, Self::Error>> + Send + '_;

  /// A procedure with all child collections. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ProcedureDetail>, Self::Error>> + Send + '_;

  /// Dashboard counts relative to `now`.
  fn stats(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<ProcedureStats, Self::Error>> + Send + '_;

  // ── Feedback ──────────────────────────────────────────────────────────

  /// Persist a feedback submission for an existing procedure.
  fn submit_feedback(
    &self,
    input: NewFeedback,
  ) -> impl Future<Output = Result<Feedback, Self::Error>> + Send + '_;

  /// Aggregate feedback, optionally for a single procedure.
  fn feedback_summary(
    &self,
    procedure_id: Option<Uuid>,
  ) -> impl Future<Output = Result<FeedbackSummary, Self::Error>> + Send + '_;
}
