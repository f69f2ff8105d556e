//! SQL schema for the Sirat SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS procedures (
    procedure_id       TEXT PRIMARY KEY,
    title              TEXT NOT NULL,
    category           TEXT NOT NULL DEFAULT '',
    city               TEXT NOT NULL,
    overview           TEXT NOT NULL DEFAULT '',
    eligibility        TEXT NOT NULL DEFAULT '',
    estimated_cost     TEXT NOT NULL,
    estimated_duration TEXT NOT NULL,
    status             TEXT NOT NULL CHECK (status IN ('DRAFT', 'PUBLISHED')),
    created_at         TEXT NOT NULL,   -- RFC 3339 UTC, microseconds; never changes
    last_updated       TEXT NOT NULL,   -- same format, so text order is time order
    version            INTEGER NOT NULL DEFAULT 1
);

-- Child rows are replaced wholesale on every edit of their collection.
-- The application deletes them explicitly; the cascades are a backstop.
CREATE TABLE IF NOT EXISTS steps (
    step_id      TEXT PRIMARY KEY,
    procedure_id TEXT NOT NULL REFERENCES procedures(procedure_id) ON DELETE CASCADE,
    title        TEXT NOT NULL,
    description  TEXT NOT NULL,
    step_order   INTEGER NOT NULL CHECK (step_order >= 1),
    UNIQUE (procedure_id, step_order)
);

CREATE TABLE IF NOT EXISTS required_documents (
    document_id  TEXT PRIMARY KEY,
    procedure_id TEXT NOT NULL REFERENCES procedures(procedure_id) ON DELETE CASCADE,
    name         TEXT NOT NULL,
    doc_type     TEXT NOT NULL,
    count        INTEGER NOT NULL DEFAULT 1 CHECK (count >= 1),
    notes        TEXT
);

CREATE TABLE IF NOT EXISTS office_locations (
    office_id     TEXT PRIMARY KEY,
    procedure_id  TEXT NOT NULL REFERENCES procedures(procedure_id) ON DELETE CASCADE,
    name          TEXT NOT NULL,
    sub_city      TEXT,
    woreda        TEXT,
    map_link      TEXT,
    working_hours TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS common_mistakes (
    mistake_id   TEXT PRIMARY KEY,
    procedure_id TEXT NOT NULL REFERENCES procedures(procedure_id) ON DELETE CASCADE,
    description  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS source_links (
    link_id      TEXT PRIMARY KEY,
    procedure_id TEXT NOT NULL REFERENCES procedures(procedure_id) ON DELETE CASCADE,
    title        TEXT NOT NULL,
    url          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS feedback (
    feedback_id     TEXT PRIMARY KEY,
    procedure_id    TEXT NOT NULL REFERENCES procedures(procedure_id) ON DELETE CASCADE,
    helpful         TEXT,            -- 'yes' | 'somewhat' | 'no'
    completed       TEXT,            -- 'yes' | 'not-yet'
    city            TEXT,
    extra_documents TEXT,
    visits          INTEGER,
    unclear         TEXT,
    submitted_at    TEXT,            -- client-reported
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS procedures_updated_idx   ON procedures(last_updated);
CREATE INDEX IF NOT EXISTS procedures_status_idx    ON procedures(status);
CREATE INDEX IF NOT EXISTS steps_procedure_idx      ON steps(procedure_id);
CREATE INDEX IF NOT EXISTS documents_procedure_idx  ON required_documents(procedure_id);
CREATE INDEX IF NOT EXISTS offices_procedure_idx    ON office_locations(procedure_id);
CREATE INDEX IF NOT EXISTS mistakes_procedure_idx   ON common_mistakes(procedure_id);
CREATE INDEX IF NOT EXISTS links_procedure_idx      ON source_links(procedure_id);
CREATE INDEX IF NOT EXISTS feedback_procedure_idx   ON feedback(procedure_id);

PRAGMA user_version = 1;
";

/// Child tables in the order they are cleared on delete.
pub const CHILD_TABLES: [&str; 6] = [
  "steps",
  "required_documents",
  "common_mistakes",
  "office_locations",
  "source_links",
  "feedback",
];
