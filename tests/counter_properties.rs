//! Counter Property Tests
//!
//! End-to-end behavior of the counter service over an in-memory sheet:
//! - last-row derivation and single-row normalization
//! - cache invalidation after mutations
//! - stale unused-list reads until expiry
//! - the read-modify-write race and its serialized variant

use std::sync::Arc;
use std::time::Duration;

use sheetcounter::cache::CounterCache;
use sheetcounter::counter::{
    CounterCell, CounterError, CounterOptions, CounterService, LastRowView,
};
use sheetcounter::sheets::{MemorySheet, Row};

const SHEET_ID: i64 = 1_234;

fn rows(values: &[(&str, &str)]) -> Vec<Row> {
    values
        .iter()
        .map(|(a, b)| vec![a.to_string(), b.to_string()])
        .collect()
}

fn setup(initial: Vec<Row>, serialize_mutations: bool) -> (Arc<MemorySheet>, CounterService) {
    let sheet = Arc::new(MemorySheet::with_rows("Master", SHEET_ID, initial));
    let service = CounterService::new(
        sheet.clone(),
        Arc::new(CounterCache::new(Duration::from_secs(60))),
        CounterOptions {
            sheet_name: "Master".to_string(),
            sheet_id: SHEET_ID,
            serialize_mutations,
        },
    )
    .unwrap();
    (sheet, service)
}

fn view(counter: &str, used: &str, row_count: u64) -> LastRowView {
    LastRowView {
        counter: CounterCell::Stored(counter.to_string()),
        used: used.to_string(),
        row_count,
    }
}

// =============================================================================
// Last-row derivation
// =============================================================================

/// N > 1 rows: the view is [V, flag, N] and increment appends [V+1, FALSE].
#[tokio::test]
async fn test_increment_appends_next_value() {
    let (sheet, service) = setup(rows(&[("0", "TRUE"), ("1", "TRUE"), ("2", "FALSE")]), false);

    assert_eq!(
        service.last_row_view().await.unwrap(),
        Some(view("2", "FALSE", 3))
    );

    service.increment().await.unwrap();

    assert_eq!(sheet.rows().last().unwrap(), &vec!["3".to_string(), "FALSE".to_string()]);
    assert_eq!(
        service.last_row_view().await.unwrap(),
        Some(view("3", "FALSE", 4))
    );
}

/// N == 1: the counter reads as 0 whatever is stored.
#[tokio::test]
async fn test_single_row_reports_zero() {
    let (_sheet, service) = setup(rows(&[("99", "TRUE")]), false);

    let last = service.last_row_view().await.unwrap().unwrap();
    assert_eq!(last.counter, CounterCell::Zero);
    assert_eq!(last.row_count, 1);
}

/// An empty table has no view.
#[tokio::test]
async fn test_empty_table_has_no_view() {
    let (_sheet, service) = setup(Vec::new(), false);
    assert_eq!(service.last_row_view().await.unwrap(), None);
}

// =============================================================================
// Decrement preconditions
// =============================================================================

#[tokio::test]
async fn test_decrement_on_empty_table() {
    let (_sheet, service) = setup(Vec::new(), false);
    assert!(matches!(
        service.decrement().await,
        Err(CounterError::NothingToDelete)
    ));
}

/// The table is never shrunk down to zero rows.
#[tokio::test]
async fn test_decrement_on_single_row_table() {
    let (sheet, service) = setup(rows(&[("0", "FALSE")]), false);
    assert!(matches!(
        service.decrement().await,
        Err(CounterError::NothingToDelete)
    ));
    assert_eq!(sheet.rows().len(), 1);
}

/// Only an empty range is the empty state; a stored "-1" is an ordinary value.
#[tokio::test]
async fn test_stored_negative_one_is_not_empty() {
    let (sheet, service) = setup(rows(&[("0", "FALSE"), ("5", "FALSE"), ("-1", "FALSE")]), false);

    assert_eq!(
        service.last_row_view().await.unwrap(),
        Some(view("-1", "FALSE", 3))
    );
    assert_eq!(service.decrement().await.unwrap(), 3);
    assert_eq!(sheet.rows(), rows(&[("0", "FALSE"), ("5", "FALSE")]));
}

#[tokio::test]
async fn test_decrement_then_increment_round_trip() {
    let (sheet, service) = setup(rows(&[("0", "FALSE"), ("1", "FALSE"), ("2", "FALSE")]), false);

    service.decrement().await.unwrap();
    service.decrement().await.unwrap();
    assert_eq!(sheet.rows(), rows(&[("0", "FALSE")]));

    // Back at one row: the counter restarts from 0
    service.increment().await.unwrap();
    assert_eq!(sheet.rows(), rows(&[("0", "FALSE"), ("1", "FALSE")]));
}

// =============================================================================
// Cache invalidation
// =============================================================================

/// A successful mutation forces the next read to hit the table.
#[tokio::test]
async fn test_mutations_invalidate_last_row() {
    let (sheet, service) = setup(rows(&[("0", "FALSE"), ("1", "FALSE")]), false);

    service.last_row_view().await.unwrap();
    service.last_row_view().await.unwrap();
    assert_eq!(sheet.read_count(), 1);

    service.increment().await.unwrap();
    assert_eq!(
        service.last_row_view().await.unwrap(),
        Some(view("2", "FALSE", 3))
    );
    assert_eq!(sheet.read_count(), 2);

    service.decrement().await.unwrap();
    assert_eq!(
        service.last_row_view().await.unwrap(),
        Some(view("1", "FALSE", 2))
    );
    assert_eq!(sheet.read_count(), 3);
}

/// Without any mutation the cached value is served until it expires.
#[tokio::test(start_paused = true)]
async fn test_last_row_expires_after_ttl() {
    let (sheet, service) = setup(rows(&[("0", "FALSE"), ("1", "FALSE")]), false);

    service.get_last_row().await.unwrap();
    tokio::time::advance(Duration::from_secs(30)).await;
    service.get_last_row().await.unwrap();
    assert_eq!(sheet.read_count(), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    service.get_last_row().await.unwrap();
    assert_eq!(sheet.read_count(), 2);
}

// =============================================================================
// Unused list
// =============================================================================

#[tokio::test]
async fn test_list_unused_filters_exact_false() {
    let (_sheet, service) = setup(
        rows(&[("0", "TRUE"), ("1", "FALSE"), ("2", "false"), ("3", "FALSE")]),
        false,
    );

    let unused = service.list_unused().await.unwrap();
    assert_eq!(unused, rows(&[("1", "FALSE"), ("3", "FALSE")]));
}

/// After mark_used(i), row i disappears once the unused entry expires.
#[tokio::test(start_paused = true)]
async fn test_mark_used_visible_after_unused_ttl() {
    let (_sheet, service) = setup(rows(&[("0", "FALSE"), ("1", "FALSE"), ("2", "FALSE")]), false);

    assert_eq!(service.list_unused().await.unwrap().len(), 3);

    service.mark_used(1).await.unwrap();

    // Still served from the unused entry
    assert_eq!(service.list_unused().await.unwrap().len(), 3);

    tokio::time::advance(Duration::from_secs(61)).await;
    let unused = service.list_unused().await.unwrap();
    assert_eq!(unused, rows(&[("0", "FALSE"), ("2", "FALSE")]));
}

/// Increments are not reflected in the unused list until it expires.
#[tokio::test(start_paused = true)]
async fn test_unused_list_is_not_invalidated_by_increment() {
    let (_sheet, service) = setup(rows(&[("0", "FALSE"), ("1", "FALSE")]), false);

    assert_eq!(service.list_unused().await.unwrap().len(), 2);
    service.increment().await.unwrap();
    assert_eq!(service.list_unused().await.unwrap().len(), 2);

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(service.list_unused().await.unwrap().len(), 3);
}

// =============================================================================
// Concurrency
// =============================================================================

/// Two overlapping increments read the same last row and append the same value.
#[tokio::test(start_paused = true)]
async fn test_concurrent_increments_race() {
    let sheet = Arc::new(
        MemorySheet::with_rows("Master", SHEET_ID, rows(&[("0", "FALSE"), ("1", "FALSE")]))
            .with_latency(Duration::from_millis(20)),
    );
    let service = CounterService::new(
        sheet.clone(),
        Arc::new(CounterCache::default()),
        CounterOptions {
            sheet_id: SHEET_ID,
            ..Default::default()
        },
    )
    .unwrap();

    let (a, b) = tokio::join!(service.increment(), service.increment());
    assert_eq!(a.unwrap(), 2);
    assert_eq!(b.unwrap(), 2);

    let all = sheet.rows();
    assert_eq!(all.len(), 4);
    assert_eq!(all[2][0], "2");
    assert_eq!(all[3][0], "2");
}

/// With serialization enabled the same scenario yields consecutive values.
#[tokio::test(start_paused = true)]
async fn test_serialized_increments_are_consecutive() {
    let sheet = Arc::new(
        MemorySheet::with_rows("Master", SHEET_ID, rows(&[("0", "FALSE"), ("1", "FALSE")]))
            .with_latency(Duration::from_millis(20)),
    );
    let service = CounterService::new(
        sheet.clone(),
        Arc::new(CounterCache::default()),
        CounterOptions {
            sheet_id: SHEET_ID,
            serialize_mutations: true,
            ..Default::default()
        },
    )
    .unwrap();

    let (a, b, c) = tokio::join!(service.increment(), service.increment(), service.increment());
    let mut values = vec![a.unwrap(), b.unwrap(), c.unwrap()];
    values.sort();
    assert_eq!(values, vec![2, 3, 4]);
}
