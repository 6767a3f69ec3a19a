use chrono::NaiveDate;
use tempfile::TempDir;

use quotevault::planner::{Plan, UpdatePlanner};
use quotevault::VaultError;
use quotevault_core::Frequency;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn now() -> NaiveDate {
    d(2024, 1, 8)
}

async fn write_history(dir: &TempDir, rel: &str, first_line: &str) -> std::path::PathBuf {
    let path = dir.path().join(rel);
    tokio::fs::create_dir_all(path.parent().unwrap())
        .await
        .unwrap();
    tokio::fs::write(&path, format!("{first_line}\n"))
        .await
        .unwrap();
    path
}

#[tokio::test]
async fn plans_a_daily_continuation_from_the_head_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_history(&dir, "mock/NYSE/AAPL.csv", "AAPL,20240105,181.25,182.50,180.50,181.99,100").await;

    let planner = UpdatePlanner::new(now());
    let Plan::Work(item) = planner.plan(&path).await.unwrap() else {
        panic!("expected work");
    };
    assert_eq!(item.symbol, "AAPL");
    assert_eq!(item.exchange.as_deref(), Some("NYSE"));
    assert_eq!(item.interval.start(), Some(d(2024, 1, 6)));
    assert_eq!(item.interval.end(), Some(now()));
    assert_eq!(item.interval.frequency(), Frequency::Daily);
    assert_eq!(item.dest_dir, path.parent().unwrap());
}

#[tokio::test]
async fn cadence_comes_from_the_file_name_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let monthly = write_history(&dir, "mock/XETRA/SAP_m.csv", "SAP,20231215,140,141,139,140").await;

    let planner = UpdatePlanner::new(now());
    let Plan::Work(item) = planner.plan(&monthly).await.unwrap() else {
        panic!("expected work");
    };
    // Monthly continuation starts at the first of the following month.
    assert_eq!(item.interval.start(), Some(d(2024, 1, 1)));
    assert_eq!(item.interval.frequency(), Frequency::Monthly);
}

#[tokio::test]
async fn file_at_the_reference_date_is_already_current() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_history(&dir, "mock/AAPL.csv", "AAPL,20240107,1,1,1,1").await;

    let planner = UpdatePlanner::new(now());
    assert_eq!(planner.plan(&path).await.unwrap(), Plan::AlreadyCurrent);
}

#[tokio::test]
async fn weekly_continuation_lands_past_now() {
    let dir = tempfile::tempdir().unwrap();
    // Next weekly sample would be 20240112, past the reference date.
    let path = write_history(&dir, "mock/AAPL_w.csv", "AAPL,20240105,1,1,1,1").await;

    let planner = UpdatePlanner::new(now());
    assert_eq!(planner.plan(&path).await.unwrap(), Plan::AlreadyCurrent);
}

#[tokio::test]
async fn empty_file_is_an_empty_source_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_history(&dir, "mock/AAPL.csv", "").await;

    let planner = UpdatePlanner::new(now());
    let err = planner.plan(&path).await;
    assert!(matches!(err, Err(VaultError::EmptySource { .. })));
}

#[tokio::test]
async fn malformed_head_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let planner = UpdatePlanner::new(now());

    let bad_date = write_history(&dir, "mock/A.csv", "A,2024-01-05,1,1,1,1").await;
    assert!(matches!(
        planner.plan(&bad_date).await,
        Err(VaultError::Data(_))
    ));

    let no_date = write_history(&dir, "mock/B.csv", "B").await;
    assert!(matches!(
        planner.plan(&no_date).await,
        Err(VaultError::Data(_))
    ));
}

#[tokio::test]
async fn delta_named_file_is_not_plannable() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_history(&dir, "mock/AAPL_20240101-20240105.csv", "AAPL,20240105,1,1,1,1").await;

    let planner = UpdatePlanner::new(now());
    assert!(matches!(
        planner.plan(&path).await,
        Err(VaultError::InvalidArg(_))
    ));
}

#[tokio::test]
async fn files_sharing_a_last_date_reuse_the_cached_continuation() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_history(&dir, "mock/NYSE/AAPL.csv", "AAPL,20240105,1,1,1,1").await;
    let b = write_history(&dir, "mock/NYSE/MSFT.csv", "MSFT,20240105,2,2,2,2").await;

    let planner = UpdatePlanner::new(now());
    let Plan::Work(first) = planner.plan(&a).await.unwrap() else {
        panic!("expected work");
    };
    let Plan::Work(second) = planner.plan(&b).await.unwrap() else {
        panic!("expected work");
    };
    assert_eq!(first.interval, second.interval);
    assert_eq!(second.symbol, "MSFT");
}

#[test]
fn formatted_dates_are_fixed_width() {
    let planner = UpdatePlanner::new(now());
    assert_eq!(planner.formatted(d(2024, 1, 6)), "20240106");
    // Second render comes from the cache and must agree.
    assert_eq!(planner.formatted(d(2024, 1, 6)), "20240106");
    assert_eq!(planner.reference_date(), now());
}
