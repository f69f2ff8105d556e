//! Handlers for `/procedures` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/procedures` | `?status=`, `?limit=`; `?q=` searches published procedures |
//! | `POST`   | `/procedures` | 201 with the root record |
//! | `GET`    | `/procedures/popular` | `?limit=`, default 6 |
//! | `GET`    | `/procedures/stats` | |
//! | `GET`    | `/procedures/{id}` | 404 if not found |
//! | `PATCH`  | `/procedures/{id}` | absent keys untouched; collections replaced |
//! | `DELETE` | `/procedures/{id}` | cascades to every collection |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};
use sirat_core::{
  input::{
    NewCommonMistake, NewOfficeLocation, NewProcedure, NewRequiredDocument,
    NewSourceLink, NewStep, ProcedurePatch,
  },
  procedure::{Procedure, ProcedureDetail, ProcedureStats, Status},
  store::{ProcedureQuery, ProcedureStore},
};
use uuid::Uuid;

use crate::error::ApiError;

/// Number of procedures returned by `/procedures/popular` without `?limit=`.
pub const DEFAULT_POPULAR_LIMIT: usize = 6;

fn parse_status(raw: Option<String>) -> Result<Option<Status>, ApiError> {
  raw
    .map(|s| Status::parse(&s))
    .transpose()
    .map_err(|e| ApiError::BadRequest(e.to_string()))
}

// ─── List / search ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub q:      Option<String>,
  pub status: Option<String>,
  pub limit:  Option<usize>,
}

/// `GET /procedures[?status=<status>][&limit=<n>]` or `GET /procedures?q=<text>`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Procedure>>, ApiError>
where
  S: ProcedureStore,
{
  if let Some(text) = params.q {
    let mut found = store.search(&text).await.map_err(ApiError::from_store)?;
    if let Some(limit) = params.limit {
      found.truncate(limit);
    }
    return Ok(Json(found));
  }

  let query = ProcedureQuery {
    status: parse_status(params.status)?,
    limit:  params.limit,
  };
  let procedures = store.list(query).await.map_err(ApiError::from_store)?;
  Ok(Json(procedures))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// Body of `POST /procedures`. Collections may be omitted or `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBody {
  pub title:              String,
  pub category:           String,
  pub city:               Option<String>,
  pub overview:           String,
  pub eligibility:        String,
  pub estimated_cost:     Option<String>,
  pub estimated_duration: Option<String>,
  pub status:             Option<String>,
  pub steps:              Option<Vec<NewStep>>,
  pub required_documents: Option<Vec<NewRequiredDocument>>,
  pub office_locations:   Option<Vec<NewOfficeLocation>>,
  pub common_mistakes:    Option<Vec<NewCommonMistake>>,
  pub source_links:       Option<Vec<NewSourceLink>>,
}

impl TryFrom<CreateBody> for NewProcedure {
  type Error = ApiError;

  fn try_from(body: CreateBody) -> Result<Self, Self::Error> {
    Ok(NewProcedure {
      title:              body.title,
      category:           body.category,
      city:               body.city,
      overview:           body.overview,
      eligibility:        body.eligibility,
      estimated_cost:     body.estimated_cost,
      estimated_duration: body.estimated_duration,
      status:             parse_status(body.status)?,
      steps:              body.steps.unwrap_or_default(),
      required_documents: body.required_documents.unwrap_or_default(),
      office_locations:   body.office_locations.unwrap_or_default(),
      common_mistakes:    body.common_mistakes.unwrap_or_default(),
      source_links:       body.source_links.unwrap_or_default(),
    })
  }
}

/// `POST /procedures`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProcedureStore,
{
  let procedure = store
    .create(body.try_into()?)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(id = %procedure.id, title = %procedure.title, "created procedure");
  Ok((StatusCode::CREATED, Json(procedure)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /procedures/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ProcedureDetail>, ApiError>
where
  S: ProcedureStore,
{
  store
    .get(id)
    .await
    .map_err(ApiError::from_store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("procedure {id} not found")))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key
/// (`None`, via `#[serde(default)]`).
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

/// Body of `PATCH /procedures/{id}`.
///
/// An absent collection key leaves that collection untouched, `[]` clears it,
/// and `null` is rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchBody {
  #[serde(default)]
  pub title:              Option<String>,
  #[serde(default)]
  pub category:           Option<String>,
  #[serde(default)]
  pub city:               Option<String>,
  #[serde(default)]
  pub overview:           Option<String>,
  #[serde(default)]
  pub eligibility:        Option<String>,
  #[serde(default)]
  pub estimated_cost:     Option<String>,
  #[serde(default)]
  pub estimated_duration: Option<String>,
  #[serde(default)]
  pub status:             Option<String>,
  #[serde(default)]
  pub expected_version:   Option<i64>,
  #[serde(default, deserialize_with = "present")]
  pub steps:              Option<Option<Vec<NewStep>>>,
  #[serde(default, deserialize_with = "present")]
  pub required_documents: Option<Option<Vec<NewRequiredDocument>>>,
  #[serde(default, deserialize_with = "present")]
  pub office_locations:   Option<Option<Vec<NewOfficeLocation>>>,
  #[serde(default, deserialize_with = "present")]
  pub common_mistakes:    Option<Option<Vec<NewCommonMistake>>>,
  #[serde(default, deserialize_with = "present")]
  pub source_links:       Option<Option<Vec<NewSourceLink>>>,
}

fn collection<T>(
  key: &str,
  value: Option<Option<Vec<T>>>,
) -> Result<Option<Vec<T>>, ApiError> {
  match value {
    None => Ok(None),
    Some(Some(items)) => Ok(Some(items)),
    Some(None) => Err(ApiError::BadRequest(format!(
      "`{key}` must be an array; omit it to leave the collection unchanged"
    ))),
  }
}

impl TryFrom<PatchBody> for ProcedurePatch {
  type Error = ApiError;

  fn try_from(body: PatchBody) -> Result<Self, Self::Error> {
    Ok(ProcedurePatch {
      title:              body.title,
      category:           body.category,
      city:               body.city,
      overview:           body.overview,
      eligibility:        body.eligibility,
      estimated_cost:     body.estimated_cost,
      estimated_duration: body.estimated_duration,
      status:             parse_status(body.status)?,
      expected_version:   body.expected_version,
      steps:              collection("steps", body.steps)?,
      required_documents: collection("requiredDocuments", body.required_documents)?,
      office_locations:   collection("officeLocations", body.office_locations)?,
      common_mistakes:    collection("commonMistakes", body.common_mistakes)?,
      source_links:       collection("sourceLinks", body.source_links)?,
    })
  }
}

/// `PATCH /procedures/{id}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<PatchBody>,
) -> Result<Json<Procedure>, ApiError>
where
  S: ProcedureStore,
{
  let procedure = store
    .update(id, body.try_into()?)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(%id, version = procedure.version, "updated procedure");
  Ok(Json(procedure))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /procedures/{id}`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: ProcedureStore,
{
  store.delete(id).await.map_err(ApiError::from_store)?;
  tracing::info!(%id, "deleted procedure");
  Ok(Json(json!({ "success": true })))
}

// ─── Popular / stats ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PopularParams {
  pub limit: Option<usize>,
}

/// `GET /procedures/popular[?limit=<n>]`
pub async fn popular<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<PopularParams>,
) -> Result<Json<Vec<Procedure>>, ApiError>
where
  S: ProcedureStore,
{
  let limit = params.limit.unwrap_or(DEFAULT_POPULAR_LIMIT);
  let procedures = store.popular(limit).await.map_err(ApiError::from_store)?;
  Ok(Json(procedures))
}

/// `GET /procedures/stats`
pub async fn stats<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<ProcedureStats>, ApiError>
where
  S: ProcedureStore,
{
  let stats = store
    .stats(chrono::Utc::now())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(stats))
}
