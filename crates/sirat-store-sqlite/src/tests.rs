//! Integration tests for `SqliteStore` against an in-memory database.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use serde_json::json;
use sirat_core::{
  feedback::{Completion, Helpfulness, NewFeedback},
  input::{
    DEFAULT_CITY, DEFAULT_ESTIMATE, DEFAULT_WORKING_HOURS, NewCommonMistake,
    NewOfficeLocation, NewProcedure, NewRequiredDocument, NewSourceLink,
    NewStep, ProcedurePatch,
  },
  procedure::Status,
  store::{ErrorKind, ProcedureQuery, ProcedureStore, StoreError as _},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Let the clock move so consecutive writes get distinct timestamps.
async fn tick() { tokio::time::sleep(Duration::from_millis(2)).await; }

/// Abort any insert of a required document named "boom".
const FAIL_ON_BOOM: &str = "
CREATE TRIGGER fail_on_boom BEFORE INSERT ON required_documents
WHEN NEW.name = 'boom'
BEGIN
  SELECT RAISE(ABORT, 'injected failure');
END;
";

const ALL_TABLES: [&str; 5] = [
  "steps",
  "required_documents",
  "office_locations",
  "common_mistakes",
  "source_links",
];

fn steps(titles: &[&str]) -> Vec<NewStep> {
  titles.iter().map(|t| NewStep::new(*t, format!("do {t}"))).collect()
}

fn full_procedure(title: &str) -> NewProcedure {
  NewProcedure {
    category: "Civil Status".into(),
    overview: "Replace a lost card".into(),
    steps: steps(&["one", "two", "three"]),
    required_documents: vec![
      NewRequiredDocument::new("Police Letter", "Original"),
      NewRequiredDocument::new("Photos", "Physical").with_count(2),
    ],
    office_locations: vec![NewOfficeLocation::new("Kirkos Office")],
    common_mistakes: vec![NewCommonMistake::new("Going late")],
    source_links: vec![NewSourceLink::new("Portal", "https://example.gov.et")],
    ..NewProcedure::new(title)
  }
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_applies_defaults() {
  let s = store().await;

  let p = s.create(NewProcedure::new("Birth Certificate")).await.unwrap();
  assert_eq!(p.city, DEFAULT_CITY);
  assert_eq!(p.estimated_cost, DEFAULT_ESTIMATE);
  assert_eq!(p.estimated_duration, DEFAULT_ESTIMATE);
  assert_eq!(p.status, Status::Draft);
  assert_eq!(p.version, 1);
  assert_eq!(p.created_at, p.last_updated);

  let detail = s.get(p.id).await.unwrap().unwrap();
  assert_eq!(detail.procedure, p);
  assert!(detail.steps.is_empty());
}

#[tokio::test]
async fn create_persists_all_collections() {
  let s = store().await;

  let p = s.create(full_procedure("Kebele ID")).await.unwrap();
  let detail = s.get(p.id).await.unwrap().unwrap();

  assert_eq!(detail.steps.len(), 3);
  assert_eq!(detail.required_documents.len(), 2);
  assert_eq!(detail.office_locations.len(), 1);
  assert_eq!(detail.office_locations[0].working_hours, DEFAULT_WORKING_HOURS);
  assert_eq!(detail.common_mistakes.len(), 1);
  assert_eq!(detail.source_links.len(), 1);
  assert_eq!(detail.source_links[0].url, "https://example.gov.et");
}

#[tokio::test]
async fn create_rejects_blank_title() {
  let s = store().await;
  let err = s.create(NewProcedure::new("   ")).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Invalid);
  assert!(s.list(ProcedureQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_is_atomic() {
  let s = store().await;
  s.execute_batch(FAIL_ON_BOOM).await.unwrap();

  let mut input = full_procedure("Doomed");
  input.required_documents.push(NewRequiredDocument::new("boom", "Copy"));

  let err = s.create(input).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Storage);

  assert!(s.list(ProcedureQuery::default()).await.unwrap().is_empty());
  for table in ALL_TABLES {
    let n = s.count_all(table).await.unwrap();
    assert_eq!(n, 0, "{table} has leftover rows");
  }
}

// ─── Order and count derivation ──────────────────────────────────────────────

#[tokio::test]
async fn step_order_follows_position() {
  let s = store().await;

  let raw: Vec<NewStep> = serde_json::from_value(json!([
    { "title": "a", "order": 7 },
    { "title": "b", "order": 7 },
    { "title": "c" },
    { "title": "d", "order": -3 },
  ]))
  .unwrap();
  let p = s
    .create(NewProcedure { steps: raw, ..NewProcedure::new("Ordering") })
    .await
    .unwrap();

  let detail = s.get(p.id).await.unwrap().unwrap();
  let got: Vec<_> = detail
    .steps
    .iter()
    .map(|st| (st.order, st.title.as_str()))
    .collect();
  assert_eq!(got, [(1, "a"), (2, "b"), (3, "c"), (4, "d")]);

  let patch = ProcedurePatch {
    steps: Some(steps(&["z", "y"])),
    ..Default::default()
  };
  s.update(p.id, patch).await.unwrap();
  let detail = s.get(p.id).await.unwrap().unwrap();
  let got: Vec<_> = detail
    .steps
    .iter()
    .map(|st| (st.order, st.title.as_str()))
    .collect();
  assert_eq!(got, [(1, "z"), (2, "y")]);
}

#[tokio::test]
async fn document_counts_are_coerced() {
  let s = store().await;

  let cases: [(serde_json::Value, u32); 8] = [
    (json!(0), 1),
    (json!(-1), 1),
    (json!("abc"), 1),
    (json!(null), 1),
    (json!(2), 2),
    (json!(5), 5),
    (json!(100), 100),
    (json!("3"), 3),
  ];
  let docs = cases
    .iter()
    .enumerate()
    .map(|(i, (raw, _))| {
      NewRequiredDocument::new(format!("doc {i}"), "Copy").with_count(raw.clone())
    })
    .collect();

  let p = s
    .create(NewProcedure { required_documents: docs, ..NewProcedure::new("Counts") })
    .await
    .unwrap();

  let detail = s.get(p.id).await.unwrap().unwrap();
  let counts: Vec<_> = detail.required_documents.iter().map(|d| d.count).collect();
  let expected: Vec<_> = cases.iter().map(|(_, n)| *n).collect();
  assert_eq!(counts, expected);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn root_only_update_leaves_children_untouched() {
  let s = store().await;
  let p = s.create(full_procedure("Passport")).await.unwrap();
  let before = s.get(p.id).await.unwrap().unwrap();

  let patch = ProcedurePatch {
    title: Some("Passport (Renewal)".into()),
    status: Some(Status::Published),
    ..Default::default()
  };
  let updated = s.update(p.id, patch).await.unwrap();
  assert_eq!(updated.title, "Passport (Renewal)");
  assert_eq!(updated.status, Status::Published);
  assert_eq!(updated.category, p.category);
  assert_eq!(updated.created_at, p.created_at);
  assert_eq!(updated.version, 2);

  let after = s.get(p.id).await.unwrap().unwrap();
  assert_eq!(after.steps, before.steps);
  assert_eq!(after.required_documents, before.required_documents);
  assert_eq!(after.office_locations, before.office_locations);
  assert_eq!(after.common_mistakes, before.common_mistakes);
  assert_eq!(after.source_links, before.source_links);
}

#[tokio::test]
async fn empty_collection_clears_but_absent_keeps() {
  let s = store().await;
  let p = s.create(full_procedure("Trade License")).await.unwrap();

  let patch = ProcedurePatch {
    steps: Some(Vec::new()),
    ..Default::default()
  };
  s.update(p.id, patch).await.unwrap();

  assert_eq!(s.count_rows("steps", p.id).await.unwrap(), 0);
  assert_eq!(s.count_rows("required_documents", p.id).await.unwrap(), 2);

  s.update(p.id, ProcedurePatch::default()).await.unwrap();
  assert_eq!(s.count_rows("required_documents", p.id).await.unwrap(), 2);
}

#[tokio::test]
async fn replaced_rows_get_new_identities() {
  let s = store().await;
  let p = s.create(full_procedure("Identity")).await.unwrap();
  let before = s.get(p.id).await.unwrap().unwrap();

  let patch = ProcedurePatch {
    common_mistakes: Some(vec![NewCommonMistake::new("Going late")]),
    ..Default::default()
  };
  s.update(p.id, patch).await.unwrap();

  let after = s.get(p.id).await.unwrap().unwrap();
  assert_eq!(after.common_mistakes.len(), 1);
  assert_eq!(after.common_mistakes[0].description, "Going late");
  assert_ne!(after.common_mistakes[0].id, before.common_mistakes[0].id);
}

#[tokio::test]
async fn update_is_atomic_across_collections() {
  let s = store().await;
  s.execute_batch(FAIL_ON_BOOM).await.unwrap();
  let p = s.create(full_procedure("Atomic")).await.unwrap();
  let before = s.get(p.id).await.unwrap().unwrap();

  // Steps are replaced before documents, so the failure lands after the
  // step rows have already been deleted and re-inserted.
  let patch = ProcedurePatch {
    title: Some("Half-applied".into()),
    steps: Some(steps(&["x"])),
    required_documents: Some(vec![NewRequiredDocument::new("boom", "Copy")]),
    ..Default::default()
  };
  let err = s.update(p.id, patch).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Storage);

  let after = s.get(p.id).await.unwrap().unwrap();
  assert_eq!(after, before);
}

#[tokio::test]
async fn last_updated_strictly_increases() {
  let s = store().await;
  let p = s.create(NewProcedure::new("Monotonic")).await.unwrap();

  let mut previous = p.last_updated;
  for i in 0..20 {
    let patch = ProcedurePatch {
      overview: Some(format!("revision {i}")),
      ..Default::default()
    };
    let updated = s.update(p.id, patch).await.unwrap();
    assert!(updated.last_updated > previous);
    previous = updated.last_updated;
  }
}

#[tokio::test]
async fn update_missing_procedure_is_not_found() {
  let s = store().await;
  let err = s
    .update(Uuid::new_v4(), ProcedurePatch::default())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::ProcedureNotFound(_)));
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn stale_version_is_a_conflict() {
  let s = store().await;
  let p = s.create(full_procedure("Versioned")).await.unwrap();

  let first = ProcedurePatch {
    expected_version: Some(1),
    steps: Some(steps(&["new"])),
    ..Default::default()
  };
  s.update(p.id, first).await.unwrap();

  let stale = ProcedurePatch {
    expected_version: Some(1),
    steps: Some(Vec::new()),
    ..Default::default()
  };
  let err = s.update(p.id, stale).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::VersionConflict { expected: 1, actual: 2, .. }
  ));
  assert_eq!(err.kind(), ErrorKind::Conflict);
  assert_eq!(s.count_rows("steps", p.id).await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_replacements_never_mix() {
  let s = store().await;
  let id = s.create(full_procedure("Contended")).await.unwrap().id;

  let mut handles = Vec::new();
  for n in 1..=8usize {
    let s = s.clone();
    handles.push(tokio::spawn(async move {
      let titles: Vec<String> = (0..n).map(|i| format!("w{n}-{i}")).collect();
      let patch = ProcedurePatch {
        steps: Some(titles.iter().map(|t| NewStep::new(t.as_str(), "")).collect()),
        ..Default::default()
      };
      s.update(id, patch).await.unwrap();
    }));
  }
  for h in handles {
    h.await.unwrap();
  }

  let detail = s.get(id).await.unwrap().unwrap();
  let writer = detail.steps[0].title.split('-').next().unwrap().to_owned();
  let n: usize = writer[1..].parse().unwrap();
  assert_eq!(detail.steps.len(), n);
  assert!(detail.steps.iter().all(|st| st.title.starts_with(&format!("{writer}-"))));
  assert_eq!(detail.procedure.version, 9);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_cascades_to_every_collection() {
  let s = store().await;
  let p = s.create(full_procedure("Cascade")).await.unwrap();
  let other = s.create(full_procedure("Survivor")).await.unwrap();
  s.submit_feedback(NewFeedback::new(p.id)).await.unwrap();

  s.delete(p.id).await.unwrap();

  assert!(s.get(p.id).await.unwrap().is_none());
  for table in ALL_TABLES.into_iter().chain(["feedback"]) {
    assert_eq!(s.count_rows(table, p.id).await.unwrap(), 0, "{table}");
  }
  assert_eq!(s.count_rows("steps", other.id).await.unwrap(), 3);
}

#[tokio::test]
async fn delete_is_atomic() {
  let s = store().await;
  let p = s.create(full_procedure("Pinned")).await.unwrap();
  s.execute_batch(
    "CREATE TRIGGER fail_on_delete BEFORE DELETE ON procedures
     BEGIN
       SELECT RAISE(ABORT, 'injected failure');
     END;",
  )
  .await
  .unwrap();

  let err = s.delete(p.id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Storage);

  let detail = s.get(p.id).await.unwrap().expect("procedure survives");
  assert_eq!(detail.steps.len(), 3);
  assert_eq!(detail.required_documents.len(), 2);
  assert_eq!(detail.office_locations.len(), 1);
  assert_eq!(detail.common_mistakes.len(), 1);
  assert_eq!(detail.source_links.len(), 1);
}

#[tokio::test]
async fn delete_missing_procedure_is_not_found() {
  let s = store().await;
  let err = s.delete(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_orders_by_last_updated() {
  let s = store().await;
  let a = s.create(NewProcedure::new("A")).await.unwrap();
  tick().await;
  let b = s.create(NewProcedure::new("B")).await.unwrap();
  tick().await;
  let c = s.create(NewProcedure::new("C")).await.unwrap();
  tick().await;

  s.update(a.id, ProcedurePatch::default()).await.unwrap();

  let ids: Vec<_> = s
    .list(ProcedureQuery::default())
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.id)
    .collect();
  assert_eq!(ids, [a.id, c.id, b.id]);
}

#[tokio::test]
async fn list_filters_by_status_and_limit() {
  let s = store().await;
  for (title, status) in [
    ("one", Status::Published),
    ("two", Status::Draft),
    ("three", Status::Published),
  ] {
    s.create(NewProcedure { status: Some(status), ..NewProcedure::new(title) })
      .await
      .unwrap();
    tick().await;
  }

  let published = s
    .list(ProcedureQuery { status: Some(Status::Published), limit: None })
    .await
    .unwrap();
  assert_eq!(published.len(), 2);
  assert!(published.iter().all(|p| p.status == Status::Published));

  let limited = s
    .list(ProcedureQuery { status: None, limit: Some(1) })
    .await
    .unwrap();
  assert_eq!(limited.len(), 1);
  assert_eq!(limited[0].title, "three");
}

#[tokio::test]
async fn search_matches_published_only() {
  let s = store().await;

  let by_title = s
    .create(NewProcedure {
      status: Some(Status::Published),
      ..NewProcedure::new("PASSPORT Renewal")
    })
    .await
    .unwrap();
  let by_category = s
    .create(NewProcedure {
      status: Some(Status::Published),
      category: "Passport & Travel".into(),
      ..NewProcedure::new("Visa")
    })
    .await
    .unwrap();
  let by_overview = s
    .create(NewProcedure {
      status: Some(Status::Published),
      overview: "You need a valid passport first.".into(),
      ..NewProcedure::new("Work Permit")
    })
    .await
    .unwrap();
  s.create(NewProcedure::new("Draft passport guide")).await.unwrap();
  s.create(NewProcedure {
    status: Some(Status::Published),
    ..NewProcedure::new("Trade License")
  })
  .await
  .unwrap();

  let mut ids: Vec<_> = s
    .search("passport")
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.id)
    .collect();
  ids.sort();
  let mut expected = vec![by_title.id, by_category.id, by_overview.id];
  expected.sort();
  assert_eq!(ids, expected);

  assert_eq!(s.search("").await.unwrap().len(), 4);
  assert_eq!(s.search("   ").await.unwrap().len(), 4);
  assert!(s.search("%").await.unwrap().is_empty());
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
  let s = store().await;
  let p = s
    .create(NewProcedure {
      status: Some(Status::Published),
      ..NewProcedure::new("ÉTAT CIVIL Certificate")
    })
    .await
    .unwrap();

  let hits = s.search("état civil").await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].id, p.id);
  assert_eq!(s.search("ÉTAT").await.unwrap().len(), 1);
}

#[tokio::test]
async fn oversized_limit_means_everything() {
  let s = store().await;
  for i in 0..3 {
    s.create(NewProcedure {
      status: Some(Status::Published),
      ..NewProcedure::new(format!("p{i}"))
    })
    .await
    .unwrap();
  }

  let query = ProcedureQuery { limit: Some(usize::MAX), ..Default::default() };
  assert_eq!(s.list(query).await.unwrap().len(), 3);
  assert_eq!(s.popular(usize::MAX).await.unwrap().len(), 3);

  let query = ProcedureQuery { limit: Some(0), ..Default::default() };
  assert!(s.list(query).await.unwrap().is_empty());
}

#[tokio::test]
async fn popular_is_newest_published() {
  let s = store().await;
  let mut published = Vec::new();
  for i in 0..4 {
    published.push(
      s.create(NewProcedure {
        status: Some(Status::Published),
        ..NewProcedure::new(format!("p{i}"))
      })
      .await
      .unwrap(),
    );
    tick().await;
  }
  s.create(NewProcedure::new("draft")).await.unwrap();

  let top = s.popular(2).await.unwrap();
  let ids: Vec<_> = top.iter().map(|p| p.id).collect();
  assert_eq!(ids, [published[3].id, published[2].id]);
}

#[tokio::test]
async fn stats_counts() {
  let s = store().await;
  s.create(NewProcedure { status: Some(Status::Published), ..NewProcedure::new("a") })
    .await
    .unwrap();
  s.create(NewProcedure::new("b")).await.unwrap();
  s.create(NewProcedure::new("c")).await.unwrap();

  let stats = s.stats(Utc::now()).await.unwrap();
  assert_eq!(stats.total, 3);
  assert_eq!(stats.published, 1);
  assert_eq!(stats.draft, 2);
  assert_eq!(stats.recently_updated, 3);

  let later = s.stats(Utc::now() + TimeDelta::days(30)).await.unwrap();
  assert_eq!(later.recently_updated, 0);
}

// ─── Feedback ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn feedback_is_persisted_and_summarised() {
  let s = store().await;
  let a = s.create(NewProcedure::new("A")).await.unwrap();
  let b = s.create(NewProcedure::new("B")).await.unwrap();

  let mut first = NewFeedback::new(a.id);
  first.helpful = Some(Helpfulness::Yes);
  first.completed = Some(Completion::Yes);
  first.visits = Some(1);
  let stored = s.submit_feedback(first).await.unwrap();
  assert_eq!(stored.procedure_id, a.id);

  let mut second = NewFeedback::new(a.id);
  second.helpful = Some(Helpfulness::No);
  second.visits = Some(3);
  s.submit_feedback(second).await.unwrap();

  let mut third = NewFeedback::new(b.id);
  third.helpful = Some(Helpfulness::Yes);
  s.submit_feedback(third).await.unwrap();

  let summary_a = s.feedback_summary(Some(a.id)).await.unwrap();
  assert_eq!(summary_a.total_feedback, 2);
  assert_eq!(summary_a.helpful_rate, Some(50));
  assert_eq!(summary_a.completion_rate, Some(100));
  assert_eq!(summary_a.average_visits, Some(2.0));

  let overall = s.feedback_summary(None).await.unwrap();
  assert_eq!(overall.total_feedback, 3);
  assert_eq!(overall.helpful_rate, Some(67));
}

#[tokio::test]
async fn feedback_for_unknown_procedure_is_not_found() {
  let s = store().await;
  let err = s
    .submit_feedback(NewFeedback::new(Uuid::new_v4()))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Seed ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seed_replaces_everything() {
  let s = store().await;
  let stale = s.create(full_procedure("Stale")).await.unwrap();

  let seeded = s.seed().await.unwrap();
  assert_eq!(seeded.len(), 3);
  assert!(s.get(stale.id).await.unwrap().is_none());
  assert_eq!(s.count_rows("steps", stale.id).await.unwrap(), 0);

  let passport = s.search("passport").await.unwrap();
  assert_eq!(passport.len(), 1);
  let detail = s.get(passport[0].id).await.unwrap().unwrap();
  assert_eq!(detail.source_links.len(), 1);
  assert_eq!(detail.office_locations[0].map_link.as_deref(), Some("https://maps.google.com"));

  // Seeding twice is idempotent in shape.
  s.seed().await.unwrap();
  assert_eq!(s.list(ProcedureQuery::default()).await.unwrap().len(), 3);
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn lost_kebele_id_scenario() {
  let s = store().await;

  let input = NewProcedure {
    steps: steps(&["Report", "Prepare", "Visit", "Pay", "Collect"]),
    required_documents: vec![
      NewRequiredDocument::new("Police Loss Letter", "Original"),
      NewRequiredDocument::new("Passport Photos", "Physical").with_count("2"),
      NewRequiredDocument::new("Old ID Copy", "Copy").with_count("n/a"),
      NewRequiredDocument::new("Personal Details", "Information").with_count(0),
    ],
    ..NewProcedure::new("Lost Kebele ID Replacement")
  };
  let p = s.create(input).await.unwrap();

  let detail = s.get(p.id).await.unwrap().unwrap();
  let titles: Vec<_> = detail.steps.iter().map(|st| st.title.as_str()).collect();
  assert_eq!(titles, ["Report", "Prepare", "Visit", "Pay", "Collect"]);
  let orders: Vec<_> = detail.steps.iter().map(|st| st.order).collect();
  assert_eq!(orders, [1, 2, 3, 4, 5]);
  let counts: Vec<_> = detail.required_documents.iter().map(|d| d.count).collect();
  assert_eq!(counts, [1, 2, 1, 1]);

  let patch = ProcedurePatch {
    required_documents: Some(vec![
      NewRequiredDocument::new("New Doc", "Copy").with_count("bad"),
    ]),
    ..Default::default()
  };
  s.update(p.id, patch).await.unwrap();

  let after = s.get(p.id).await.unwrap().unwrap();
  assert_eq!(after.required_documents.len(), 1);
  assert_eq!(after.required_documents[0].name, "New Doc");
  assert_eq!(after.required_documents[0].count, 1);
  assert_eq!(after.steps, detail.steps);
}
