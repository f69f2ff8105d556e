//! [`SqliteStore`], the SQLite implementation of [`ProcedureStore`].
//!
//! Every write runs inside a single `BEGIN IMMEDIATE` transaction on the one
//! connection thread owned by [`tokio_rusqlite`], so the delete and insert
//! phases of two concurrent updates can never interleave.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use uuid::Uuid;

use sirat_core::{
  feedback::{Feedback, FeedbackSummary, NewFeedback},
  input::{
    DEFAULT_CITY, DEFAULT_ESTIMATE, NewCommonMistake, NewOfficeLocation,
    NewProcedure, NewRequiredDocument, NewSourceLink, NewStep, ProcedurePatch,
    text_or,
  },
  procedure::{Procedure, ProcedureDetail, ProcedureStats, Status},
  store::{ProcedureQuery, ProcedureStore},
};

use crate::{
  Error, Result,
  encode::{
    PROCEDURE_COLUMNS, RawDetail, RawDocument, RawFeedback, RawLink, RawMistake,
    RawOffice, RawProcedure, RawStep, advance, encode_dt, encode_status,
    encode_uuid, now,
  },
  schema::{CHILD_TABLES, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A procedure store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Delete every procedure and everything it owns, in one transaction.
  pub(crate) async fn clear_all(&self) -> Result<usize> {
    let removed = self
      .conn
      .call(|conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for table in CHILD_TABLES {
          tx.execute(&format!("DELETE FROM {table}"), [])?;
        }
        let removed = tx.execute("DELETE FROM procedures", [])?;
        tx.commit()?;
        Ok(removed)
      })
      .await?;
    Ok(removed)
  }

  /// Run arbitrary SQL against the connection.
  #[cfg(test)]
  pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Count every row in `table`.
  #[cfg(test)]
  pub(crate) async fn count_all(&self, table: &'static str) -> Result<i64> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
      })
      .await?;
    Ok(n)
  }

  /// Count rows in `table` belonging to `procedure_id`.
  #[cfg(test)]
  pub(crate) async fn count_rows(
    &self,
    table: &'static str,
    procedure_id: Uuid,
  ) -> Result<i64> {
    let id_str = encode_uuid(procedure_id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("SELECT COUNT(*) FROM {table} WHERE procedure_id = ?1"),
          params![id_str],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(n)
  }
}

// ─── Child collections ───────────────────────────────────────────────────────

/// A row of one of the owned child tables.
trait ChildRow {
  const TABLE: &'static str;

  fn insert(&self, conn: &Connection) -> rusqlite::Result<()>;
}

impl ChildRow for RawStep {
  const TABLE: &'static str = "steps";

  fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
      "INSERT INTO steps (step_id, procedure_id, title, description, step_order)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      params![
        self.step_id,
        self.procedure_id,
        self.title,
        self.description,
        self.step_order,
      ],
    )?;
    Ok(())
  }
}

impl ChildRow for RawDocument {
  const TABLE: &'static str = "required_documents";

  fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
      "INSERT INTO required_documents
         (document_id, procedure_id, name, doc_type, count, notes)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      params![
        self.document_id,
        self.procedure_id,
        self.name,
        self.doc_type,
        self.count,
        self.notes,
      ],
    )?;
    Ok(())
  }
}

impl ChildRow for RawOffice {
  const TABLE: &'static str = "office_locations";

  fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
      "INSERT INTO office_locations
         (office_id, procedure_id, name, sub_city, woreda, map_link, working_hours)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      params![
        self.office_id,
        self.procedure_id,
        self.name,
        self.sub_city,
        self.woreda,
        self.map_link,
        self.working_hours,
      ],
    )?;
    Ok(())
  }
}

impl ChildRow for RawMistake {
  const TABLE: &'static str = "common_mistakes";

  fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
      "INSERT INTO common_mistakes (mistake_id, procedure_id, description)
       VALUES (?1, ?2, ?3)",
      params![self.mistake_id, self.procedure_id, self.description],
    )?;
    Ok(())
  }
}

impl ChildRow for RawLink {
  const TABLE: &'static str = "source_links";

  fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
      "INSERT INTO source_links (link_id, procedure_id, title, url)
       VALUES (?1, ?2, ?3, ?4)",
      params![self.link_id, self.procedure_id, self.title, self.url],
    )?;
    Ok(())
  }
}

/// Delete every row of one collection, then insert `rows`. `None` leaves the
/// collection untouched; an empty slice clears it.
fn replace_collection<R: ChildRow>(
  conn: &Connection,
  procedure_id: &str,
  rows: Option<&[R]>,
) -> rusqlite::Result<()> {
  let Some(rows) = rows else { return Ok(()) };
  conn.execute(
    &format!("DELETE FROM {} WHERE procedure_id = ?1", R::TABLE),
    params![procedure_id],
  )?;
  for row in rows {
    row.insert(conn)?;
  }
  Ok(())
}

/// Encoded replacement contents for the child collections of one procedure.
#[derive(Default)]
struct RawChildren {
  steps:     Option<Vec<RawStep>>,
  documents: Option<Vec<RawDocument>>,
  offices:   Option<Vec<RawOffice>>,
  mistakes:  Option<Vec<RawMistake>>,
  links:     Option<Vec<RawLink>>,
}

impl RawChildren {
  /// Derive rows from inputs: fresh ids, positional step order, coerced
  /// document counts, default office hours.
  fn build(
    procedure_id: Uuid,
    steps: Option<Vec<NewStep>>,
    documents: Option<Vec<NewRequiredDocument>>,
    offices: Option<Vec<NewOfficeLocation>>,
    mistakes: Option<Vec<NewCommonMistake>>,
    links: Option<Vec<NewSourceLink>>,
  ) -> Self {
    Self {
      steps:     steps.map(|s| {
        NewStep::number(procedure_id, s)
          .iter()
          .map(RawStep::from_step)
          .collect()
      }),
      documents: documents.map(|ds| {
        ds.into_iter()
          .map(|d| RawDocument::from_document(&d.into_row(procedure_id)))
          .collect()
      }),
      offices:   offices.map(|os| {
        os.into_iter()
          .map(|o| RawOffice::from_office(&o.into_row(procedure_id)))
          .collect()
      }),
      mistakes:  mistakes.map(|ms| {
        ms.into_iter()
          .map(|m| RawMistake::from_mistake(&m.into_row(procedure_id)))
          .collect()
      }),
      links:     links.map(|ls| {
        ls.into_iter()
          .map(|l| RawLink::from_link(&l.into_row(procedure_id)))
          .collect()
      }),
    }
  }

  fn replace(&self, conn: &Connection, procedure_id: &str) -> rusqlite::Result<()> {
    replace_collection(conn, procedure_id, self.steps.as_deref())?;
    replace_collection(conn, procedure_id, self.documents.as_deref())?;
    replace_collection(conn, procedure_id, self.offices.as_deref())?;
    replace_collection(conn, procedure_id, self.mistakes.as_deref())?;
    replace_collection(conn, procedure_id, self.links.as_deref())?;
    Ok(())
  }
}

// ─── Row readers ─────────────────────────────────────────────────────────────

fn select_procedure(
  conn: &Connection,
  procedure_id: &str,
) -> rusqlite::Result<Option<RawProcedure>> {
  conn
    .query_row(
      &format!("SELECT {PROCEDURE_COLUMNS} FROM procedures WHERE procedure_id = ?1"),
      params![procedure_id],
      RawProcedure::from_row,
    )
    .optional()
}

fn select_procedures(
  conn: &Connection,
  sql: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<RawProcedure>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map(params, RawProcedure::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

fn select_detail(
  conn: &Connection,
  procedure_id: &str,
) -> rusqlite::Result<Option<RawDetail>> {
  let Some(procedure) = select_procedure(conn, procedure_id)? else {
    return Ok(None);
  };

  let steps = conn
    .prepare(
      "SELECT step_id, procedure_id, title, description, step_order
       FROM steps WHERE procedure_id = ?1 ORDER BY step_order",
    )?
    .query_map(params![procedure_id], |row| {
      Ok(RawStep {
        step_id:      row.get(0)?,
        procedure_id: row.get(1)?,
        title:        row.get(2)?,
        description:  row.get(3)?,
        step_order:   row.get(4)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let documents = conn
    .prepare(
      "SELECT document_id, procedure_id, name, doc_type, count, notes
       FROM required_documents WHERE procedure_id = ?1 ORDER BY rowid",
    )?
    .query_map(params![procedure_id], |row| {
      Ok(RawDocument {
        document_id:  row.get(0)?,
        procedure_id: row.get(1)?,
        name:         row.get(2)?,
        doc_type:     row.get(3)?,
        count:        row.get(4)?,
        notes:        row.get(5)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let offices = conn
    .prepare(
      "SELECT office_id, procedure_id, name, sub_city, woreda, map_link, working_hours
       FROM office_locations WHERE procedure_id = ?1 ORDER BY rowid",
    )?
    .query_map(params![procedure_id], |row| {
      Ok(RawOffice {
        office_id:     row.get(0)?,
        procedure_id:  row.get(1)?,
        name:          row.get(2)?,
        sub_city:      row.get(3)?,
        woreda:        row.get(4)?,
        map_link:      row.get(5)?,
        working_hours: row.get(6)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mistakes = conn
    .prepare(
      "SELECT mistake_id, procedure_id, description
       FROM common_mistakes WHERE procedure_id = ?1 ORDER BY rowid",
    )?
    .query_map(params![procedure_id], |row| {
      Ok(RawMistake {
        mistake_id:   row.get(0)?,
        procedure_id: row.get(1)?,
        description:  row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let links = conn
    .prepare(
      "SELECT link_id, procedure_id, title, url
       FROM source_links WHERE procedure_id = ?1 ORDER BY rowid",
    )?
    .query_map(params![procedure_id], |row| {
      Ok(RawLink {
        link_id:      row.get(0)?,
        procedure_id: row.get(1)?,
        title:        row.get(2)?,
        url:          row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Some(RawDetail { procedure, steps, documents, offices, mistakes, links }))
}

fn decode_all(raws: Vec<RawProcedure>) -> Result<Vec<Procedure>> {
  raws.into_iter().map(RawProcedure::into_procedure).collect()
}

// ─── Write outcomes ──────────────────────────────────────────────────────────

/// What happened inside an update transaction.
enum UpdateOutcome {
  Updated(RawProcedure),
  NotFound,
  Conflict { actual: i64 },
}

// ─── ProcedureStore impl ─────────────────────────────────────────────────────

impl ProcedureStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create(&self, input: NewProcedure) -> Result<Procedure> {
    input.validate()?;

    let created_at = now();
    let procedure = Procedure {
      id:                 Uuid::new_v4(),
      title:              input.title,
      category:           input.category,
      city:               text_or(input.city, DEFAULT_CITY),
      overview:           input.overview,
      eligibility:        input.eligibility,
      estimated_cost:     text_or(input.estimated_cost, DEFAULT_ESTIMATE),
      estimated_duration: text_or(input.estimated_duration, DEFAULT_ESTIMATE),
      status:             input.status.unwrap_or_default(),
      created_at,
      last_updated:       created_at,
      version:            1,
    };

    let raw = RawProcedure::from_procedure(&procedure);
    let children = RawChildren::build(
      procedure.id,
      Some(input.steps),
      Some(input.required_documents),
      Some(input.office_locations),
      Some(input.common_mistakes),
      Some(input.source_links),
    );

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
          "INSERT INTO procedures (
             procedure_id, title, category, city, overview, eligibility,
             estimated_cost, estimated_duration, status,
             created_at, last_updated, version
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          params![
            raw.procedure_id,
            raw.title,
            raw.category,
            raw.city,
            raw.overview,
            raw.eligibility,
            raw.estimated_cost,
            raw.estimated_duration,
            raw.status,
            raw.created_at,
            raw.last_updated,
            raw.version,
          ],
        )?;
        children.replace(&tx, &raw.procedure_id)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(id = %procedure.id, title = %procedure.title, "created procedure");
    Ok(procedure)
  }

  async fn update(&self, id: Uuid, patch: ProcedurePatch) -> Result<Procedure> {
    patch.validate()?;

    let id_str = encode_uuid(id);
    let expected_version = patch.expected_version;
    let status = patch.status.map(encode_status);
    let ProcedurePatch {
      title,
      category,
      city,
      overview,
      eligibility,
      estimated_cost,
      estimated_duration,
      steps,
      required_documents,
      office_locations,
      common_mistakes,
      source_links,
      ..
    } = patch;
    let children = RawChildren::build(
      id,
      steps,
      required_documents,
      office_locations,
      common_mistakes,
      source_links,
    );

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(current) = select_procedure(&tx, &id_str)? else {
          return Ok(UpdateOutcome::NotFound);
        };
        if let Some(expected) = expected_version
          && expected != current.version
        {
          return Ok(UpdateOutcome::Conflict { actual: current.version });
        }

        let previous = DateTime::parse_from_rfc3339(&current.last_updated)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?
          .with_timezone(&Utc);
        let last_updated = encode_dt(advance(previous, now()));

        tx.execute(
          "UPDATE procedures SET
             title              = COALESCE(?2, title),
             category           = COALESCE(?3, category),
             city               = COALESCE(?4, city),
             overview           = COALESCE(?5, overview),
             eligibility        = COALESCE(?6, eligibility),
             estimated_cost     = COALESCE(?7, estimated_cost),
             estimated_duration = COALESCE(?8, estimated_duration),
             status             = COALESCE(?9, status),
             last_updated       = ?10,
             version            = version + 1
           WHERE procedure_id = ?1",
          params![
            id_str,
            title,
            category,
            city,
            overview,
            eligibility,
            estimated_cost,
            estimated_duration,
            status,
            last_updated,
          ],
        )?;
        children.replace(&tx, &id_str)?;

        let updated = select_procedure(&tx, &id_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(UpdateOutcome::Updated(updated))
      })
      .await?;

    match outcome {
      UpdateOutcome::Updated(raw) => {
        let procedure = raw.into_procedure()?;
        tracing::debug!(%id, version = procedure.version, "updated procedure");
        Ok(procedure)
      }
      UpdateOutcome::NotFound => Err(Error::ProcedureNotFound(id)),
      UpdateOutcome::Conflict { actual } => Err(Error::VersionConflict {
        id,
        expected: expected_version.unwrap_or_default(),
        actual,
      }),
    }
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if select_procedure(&tx, &id_str)?.is_none() {
          return Ok(false);
        }
        for table in CHILD_TABLES {
          tx.execute(
            &format!("DELETE FROM {table} WHERE procedure_id = ?1"),
            params![id_str],
          )?;
        }
        tx.execute("DELETE FROM procedures WHERE procedure_id = ?1", params![id_str])?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !removed {
      return Err(Error::ProcedureNotFound(id));
    }
    tracing::debug!(%id, "deleted procedure");
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list(&self, query: ProcedureQuery) -> Result<Vec<Procedure>> {
    let status = query.status.map(encode_status);
    // SQLite treats a negative LIMIT as "no limit".
    let limit = query.limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));

    let raws = self
      .conn
      .call(move |conn| {
        Ok(select_procedures(
          conn,
          &format!(
            "SELECT {PROCEDURE_COLUMNS} FROM procedures
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY last_updated DESC
             LIMIT ?2"
          ),
          params![status, limit],
        )?)
      })
      .await?;

    decode_all(raws)
  }

  async fn search<'a>(&'a self, text: &'a str) -> Result<Vec<Procedure>> {
    // Folded in Rust: SQLite's LIKE only folds ASCII.
    let needle = text.trim().to_lowercase();
    let published = encode_status(Status::Published);

    let raws = self
      .conn
      .call(move |conn| {
        Ok(select_procedures(
          conn,
          &format!(
            "SELECT {PROCEDURE_COLUMNS} FROM procedures
             WHERE status = ?1
             ORDER BY last_updated DESC"
          ),
          params![published],
        )?)
      })
      .await?;

    let found: Vec<Procedure> = decode_all(raws)?
      .into_iter()
      .filter(|p| {
        [&p.title, &p.category, &p.overview]
          .iter()
          .any(|field| field.to_lowercase().contains(&needle))
      })
      .collect();
    Ok(found)
  }

  async fn popular(&self, limit: usize) -> Result<Vec<Procedure>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let published = encode_status(Status::Published);

    let raws = self
      .conn
      .call(move |conn| {
        Ok(select_procedures(
          conn,
          &format!(
            "SELECT {PROCEDURE_COLUMNS} FROM procedures
             WHERE status = ?1
             ORDER BY created_at DESC
             LIMIT ?2"
          ),
          params![published, limit],
        )?)
      })
      .await?;

    decode_all(raws)
  }

  async fn get(&self, id: Uuid) -> Result<Option<ProcedureDetail>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        // One read transaction so the parent and children come from the same
        // snapshot.
        let tx = conn.transaction()?;
        let detail = select_detail(&tx, &id_str)?;
        tx.commit()?;
        Ok(detail)
      })
      .await?;

    raw.map(RawDetail::into_detail).transpose()
  }

  async fn stats(&self, now: DateTime<Utc>) -> Result<ProcedureStats> {
    let cutoff = encode_dt(now - chrono::TimeDelta::days(7));

    let (total, published, draft, recent): (i64, i64, i64, i64) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             COUNT(*),
             COALESCE(SUM(status = 'PUBLISHED'), 0),
             COALESCE(SUM(status = 'DRAFT'), 0),
             COALESCE(SUM(last_updated >= ?1), 0)
           FROM procedures",
          params![cutoff],
          |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )?)
      })
      .await?;

    let count = |n: i64| u64::try_from(n).unwrap_or_default();
    Ok(ProcedureStats {
      total:            count(total),
      published:        count(published),
      draft:            count(draft),
      recently_updated: count(recent),
    })
  }

  // ── Feedback ──────────────────────────────────────────────────────────────

  async fn submit_feedback(&self, input: NewFeedback) -> Result<Feedback> {
    let procedure_id = input.procedure_id;
    let feedback = Feedback {
      id: Uuid::new_v4(),
      procedure_id,
      helpful: input.helpful,
      completed: input.completed,
      city: input.city,
      extra_documents: input.extra_documents,
      visits: input.visits,
      unclear: input.unclear,
      submitted_at: input.submitted_at,
      created_at: now(),
    };
    let raw = RawFeedback::from_feedback(&feedback);

    let stored = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        if select_procedure(&tx, &raw.procedure_id)?.is_none() {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO feedback (
             feedback_id, procedure_id, helpful, completed, city,
             extra_documents, visits, unclear, submitted_at, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          params![
            raw.feedback_id,
            raw.procedure_id,
            raw.helpful,
            raw.completed,
            raw.city,
            raw.extra_documents,
            raw.visits,
            raw.unclear,
            raw.submitted_at,
            raw.created_at,
          ],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !stored {
      return Err(Error::ProcedureNotFound(procedure_id));
    }
    Ok(feedback)
  }

  async fn feedback_summary(&self, procedure_id: Option<Uuid>) -> Result<FeedbackSummary> {
    let id_str = procedure_id.map(encode_uuid);

    let raws: Vec<RawFeedback> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT feedback_id, procedure_id, helpful, completed, city,
                  extra_documents, visits, unclear, submitted_at, created_at
           FROM feedback
           WHERE (?1 IS NULL OR procedure_id = ?1)",
        )?;
        let rows = stmt
          .query_map(params![id_str], |row| {
            Ok(RawFeedback {
              feedback_id:     row.get(0)?,
              procedure_id:    row.get(1)?,
              helpful:         row.get(2)?,
              completed:       row.get(3)?,
              city:            row.get(4)?,
              extra_documents: row.get(5)?,
              visits:          row.get(6)?,
              unclear:         row.get(7)?,
              submitted_at:    row.get(8)?,
              created_at:      row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let feedback = raws
      .into_iter()
      .map(RawFeedback::into_feedback)
      .collect::<Result<Vec<_>>>()?;
    Ok(FeedbackSummary::from_feedback(&feedback))
  }
}
