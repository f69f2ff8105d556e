//! Handlers for `/feedback` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use sirat_core::{
  feedback::{FeedbackSummary, NewFeedback},
  store::ProcedureStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `POST /feedback`
pub async fn submit<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewFeedback>,
) -> Result<Json<Value>, ApiError>
where
  S: ProcedureStore,
{
  let feedback = store
    .submit_feedback(body)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(
    id = %feedback.id,
    procedure_id = %feedback.procedure_id,
    helpful = ?feedback.helpful,
    completed = ?feedback.completed,
    "feedback received"
  );
  Ok(Json(json!({
    "success": true,
    "message": "Feedback received successfully",
  })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryParams {
  pub procedure_id: Option<Uuid>,
}

/// `GET /feedback/summary[?procedureId=<id>]`
pub async fn summary<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SummaryParams>,
) -> Result<Json<FeedbackSummary>, ApiError>
where
  S: ProcedureStore,
{
  let summary = store
    .feedback_summary(params.procedure_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(summary))
}
