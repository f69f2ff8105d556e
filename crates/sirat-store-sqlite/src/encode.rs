//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings with a fixed microsecond
//! precision and a `Z` suffix, so lexical order equals chronological order.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, TimeDelta, Utc};
use sirat_core::{
  feedback::{Completion, Feedback, Helpfulness},
  procedure::{
    CommonMistake, OfficeLocation, Procedure, ProcedureDetail, RequiredDocument,
    SourceLink, Status, Step,
  },
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time at the precision we store.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

/// A timestamp strictly after `previous`: `now` if the clock has moved on,
/// otherwise one microsecond past `previous`.
pub fn advance(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
  if now > previous {
    now
  } else {
    previous + TimeDelta::microseconds(1)
  }
}

// ─── Status
// ───────────────────────────────────────────────────────────────────

pub fn encode_status(s: Status) -> &'static str {
  match s {
    Status::Draft => "DRAFT",
    Status::Published => "PUBLISHED",
  }
}

pub fn decode_status(s: &str) -> Result<Status> {
  Status::parse(s).map_err(|e| Error::Decode(e.to_string()))
}

// ─── Feedback answers
// ─────────────────────────────────────────────────────────

pub fn encode_helpfulness(h: Helpfulness) -> &'static str {
  match h {
    Helpfulness::Yes => "yes",
    Helpfulness::Somewhat => "somewhat",
    Helpfulness::No => "no",
  }
}

pub fn decode_helpfulness(s: &str) -> Result<Helpfulness> {
  match s {
    "yes" => Ok(Helpfulness::Yes),
    "somewhat" => Ok(Helpfulness::Somewhat),
    "no" => Ok(Helpfulness::No),
    other => Err(Error::Decode(format!("unknown helpfulness: {other:?}"))),
  }
}

pub fn encode_completion(c: Completion) -> &'static str {
  match c {
    Completion::Yes => "yes",
    Completion::NotYet => "not-yet",
  }
}

pub fn decode_completion(s: &str) -> Result<Completion> {
  match s {
    "yes" => Ok(Completion::Yes),
    "not-yet" => Ok(Completion::NotYet),
    other => Err(Error::Decode(format!("unknown completion: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawProcedure::from_row`].
pub const PROCEDURE_COLUMNS: &str = "procedure_id, title, category, city, \
  overview, eligibility, estimated_cost, estimated_duration, status, \
  created_at, last_updated, version";

/// Raw values read directly from a `procedures` row.
#[derive(Debug, Clone)]
pub struct RawProcedure {
  pub procedure_id:       String,
  pub title:              String,
  pub category:           String,
  pub city:               String,
  pub overview:           String,
  pub eligibility:        String,
  pub estimated_cost:     String,
  pub estimated_duration: String,
  pub status:             String,
  pub created_at:         String,
  pub last_updated:       String,
  pub version:            i64,
}

impl RawProcedure {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      procedure_id:       row.get(0)?,
      title:              row.get(1)?,
      category:           row.get(2)?,
      city:               row.get(3)?,
      overview:           row.get(4)?,
      eligibility:        row.get(5)?,
      estimated_cost:     row.get(6)?,
      estimated_duration: row.get(7)?,
      status:             row.get(8)?,
      created_at:         row.get(9)?,
      last_updated:       row.get(10)?,
      version:            row.get(11)?,
    })
  }

  pub fn from_procedure(p: &Procedure) -> Self {
    Self {
      procedure_id:       encode_uuid(p.id),
      title:              p.title.clone(),
      category:           p.category.clone(),
      city:               p.city.clone(),
      overview:           p.overview.clone(),
      eligibility:        p.eligibility.clone(),
      estimated_cost:     p.estimated_cost.clone(),
      estimated_duration: p.estimated_duration.clone(),
      status:             encode_status(p.status).to_owned(),
      created_at:         encode_dt(p.created_at),
      last_updated:       encode_dt(p.last_updated),
      version:            p.version,
    }
  }

  pub fn into_procedure(self) -> Result<Procedure> {
    Ok(Procedure {
      id:                 decode_uuid(&self.procedure_id)?,
      title:              self.title,
      category:           self.category,
      city:               self.city,
      overview:           self.overview,
      eligibility:        self.eligibility,
      estimated_cost:     self.estimated_cost,
      estimated_duration: self.estimated_duration,
      status:             decode_status(&self.status)?,
      created_at:         decode_dt(&self.created_at)?,
      last_updated:       decode_dt(&self.last_updated)?,
      version:            self.version,
    })
  }
}

pub struct RawStep {
  pub step_id:      String,
  pub procedure_id: String,
  pub title:        String,
  pub description:  String,
  pub step_order:   i64,
}

impl RawStep {
  pub fn from_step(s: &Step) -> Self {
    Self {
      step_id:      encode_uuid(s.id),
      procedure_id: encode_uuid(s.procedure_id),
      title:        s.title.clone(),
      description:  s.description.clone(),
      step_order:   i64::from(s.order),
    }
  }

  pub fn into_step(self) -> Result<Step> {
    Ok(Step {
      id:           decode_uuid(&self.step_id)?,
      procedure_id: decode_uuid(&self.procedure_id)?,
      title:        self.title,
      description:  self.description,
      order:        u32::try_from(self.step_order)
        .map_err(|_| Error::Decode(format!("bad step order {}", self.step_order)))?,
    })
  }
}

pub struct RawDocument {
  pub document_id:  String,
  pub procedure_id: String,
  pub name:         String,
  pub doc_type:     String,
  pub count:        i64,
  pub notes:        Option<String>,
}

impl RawDocument {
  pub fn from_document(d: &RequiredDocument) -> Self {
    Self {
      document_id:  encode_uuid(d.id),
      procedure_id: encode_uuid(d.procedure_id),
      name:         d.name.clone(),
      doc_type:     d.doc_type.clone(),
      count:        i64::from(d.count),
      notes:        d.notes.clone(),
    }
  }

  pub fn into_document(self) -> Result<RequiredDocument> {
    Ok(RequiredDocument {
      id:           decode_uuid(&self.document_id)?,
      procedure_id: decode_uuid(&self.procedure_id)?,
      name:         self.name,
      doc_type:     self.doc_type,
      count:        u32::try_from(self.count)
        .map_err(|_| Error::Decode(format!("bad document count {}", self.count)))?,
      notes:        self.notes,
    })
  }
}

pub struct RawOffice {
  pub office_id:     String,
  pub procedure_id:  String,
  pub name:          String,
  pub sub_city:      Option<String>,
  pub woreda:        Option<String>,
  pub map_link:      Option<String>,
  pub working_hours: String,
}

impl RawOffice {
  pub fn from_office(o: &OfficeLocation) -> Self {
    Self {
      office_id:     encode_uuid(o.id),
      procedure_id:  encode_uuid(o.procedure_id),
      name:          o.name.clone(),
      sub_city:      o.sub_city.clone(),
      woreda:        o.woreda.clone(),
      map_link:      o.map_link.clone(),
      working_hours: o.working_hours.clone(),
    }
  }

  pub fn into_office(self) -> Result<OfficeLocation> {
    Ok(OfficeLocation {
      id:            decode_uuid(&self.office_id)?,
      procedure_id:  decode_uuid(&self.procedure_id)?,
      name:          self.name,
      sub_city:      self.sub_city,
      woreda:        self.woreda,
      map_link:      self.map_link,
      working_hours: self.working_hours,
    })
  }
}

pub struct RawMistake {
  pub mistake_id:   String,
  pub procedure_id: String,
  pub description:  String,
}

impl RawMistake {
  pub fn from_mistake(m: &CommonMistake) -> Self {
    Self {
      mistake_id:   encode_uuid(m.id),
      procedure_id: encode_uuid(m.procedure_id),
      description:  m.description.clone(),
    }
  }

  pub fn into_mistake(self) -> Result<CommonMistake> {
    Ok(CommonMistake {
      id:           decode_uuid(&self.mistake_id)?,
      procedure_id: decode_uuid(&self.procedure_id)?,
      description:  self.description,
    })
  }
}

pub struct RawLink {
  pub link_id:      String,
  pub procedure_id: String,
  pub title:        String,
  pub url:          String,
}

impl RawLink {
  pub fn from_link(l: &SourceLink) -> Self {
    Self {
      link_id:      encode_uuid(l.id),
      procedure_id: encode_uuid(l.procedure_id),
      title:        l.title.clone(),
      url:          l.url.clone(),
    }
  }

  pub fn into_link(self) -> Result<SourceLink> {
    Ok(SourceLink {
      id:           decode_uuid(&self.link_id)?,
      procedure_id: decode_uuid(&self.procedure_id)?,
      title:        self.title,
      url:          self.url,
    })
  }
}

/// A procedure row plus every child row, as read inside one transaction.
pub struct RawDetail {
  pub procedure: RawProcedure,
  pub steps:     Vec<RawStep>,
  pub documents: Vec<RawDocument>,
  pub offices:   Vec<RawOffice>,
  pub mistakes:  Vec<RawMistake>,
  pub links:     Vec<RawLink>,
}

impl RawDetail {
  pub fn into_detail(self) -> Result<ProcedureDetail> {
    let mut steps = self
      .steps
      .into_iter()
      .map(RawStep::into_step)
      .collect::<Result<Vec<_>>>()?;
    steps.sort_by_key(|s| s.order);

    Ok(ProcedureDetail {
      procedure: self.procedure.into_procedure()?,
      steps,
      required_documents: self
        .documents
        .into_iter()
        .map(RawDocument::into_document)
        .collect::<Result<_>>()?,
      office_locations: self
        .offices
        .into_iter()
        .map(RawOffice::into_office)
        .collect::<Result<_>>()?,
      common_mistakes: self
        .mistakes
        .into_iter()
        .map(RawMistake::into_mistake)
        .collect::<Result<_>>()?,
      source_links: self
        .links
        .into_iter()
        .map(RawLink::into_link)
        .collect::<Result<_>>()?,
    })
  }
}

/// Raw values read directly from a `feedback` row.
pub struct RawFeedback {
  pub feedback_id:     String,
  pub procedure_id:    String,
  pub helpful:         Option<String>,
  pub completed:       Option<String>,
  pub city:            Option<String>,
  pub extra_documents: Option<String>,
  pub visits:          Option<i64>,
  pub unclear:         Option<String>,
  pub submitted_at:    Option<String>,
  pub created_at:      String,
}

impl RawFeedback {
  pub fn from_feedback(f: &Feedback) -> Self {
    Self {
      feedback_id:     encode_uuid(f.id),
      procedure_id:    encode_uuid(f.procedure_id),
      helpful:         f.helpful.map(encode_helpfulness).map(str::to_owned),
      completed:       f.completed.map(encode_completion).map(str::to_owned),
      city:            f.city.clone(),
      extra_documents: f.extra_documents.clone(),
      visits:          f.visits.map(i64::from),
      unclear:         f.unclear.clone(),
      submitted_at:    f.submitted_at.map(encode_dt),
      created_at:      encode_dt(f.created_at),
    }
  }

  pub fn into_feedback(self) -> Result<Feedback> {
    Ok(Feedback {
      id:              decode_uuid(&self.feedback_id)?,
      procedure_id:    decode_uuid(&self.procedure_id)?,
      helpful:         self.helpful.as_deref().map(decode_helpfulness).transpose()?,
      completed:       self.completed.as_deref().map(decode_completion).transpose()?,
      city:            self.city,
      extra_documents: self.extra_documents,
      visits:          self.visits.and_then(|v| u32::try_from(v).ok()),
      unclear:         self.unclear,
      submitted_at:    self.submitted_at.as_deref().map(decode_dt).transpose()?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
