use quotevault::merger::{merge_files, merge_lines};
use quotevault::VaultError;

#[test]
fn delta_rows_win_on_overlapping_keys() {
    let delta = vec![
        "AAPL,20240106,183.00,184.00,182.00,183.50,100",
        "AAPL,20240105,999.00,999.00,999.00,999.00,999",
    ];
    let target = vec![
        "AAPL,20240105,181.25,182.50,180.50,181.99,200",
        "AAPL,20240104,180.00,181.00,179.00,180.50,300",
    ];
    let merged = merge_lines(delta, target).unwrap();
    assert_eq!(
        merged,
        vec![
            "AAPL,20240106,183.00,184.00,182.00,183.50,100",
            "AAPL,20240105,999.00,999.00,999.00,999.00,999",
            "AAPL,20240104,180.00,181.00,179.00,180.50,300",
        ]
    );
}

#[test]
fn output_is_descending_regardless_of_input_order() {
    let delta = vec!["AAPL,20240102,1,1,1,1", "AAPL,20240108,1,1,1,1"];
    let target = vec!["AAPL,20240105,1,1,1,1", "AAPL,20240101,1,1,1,1"];
    let merged = merge_lines(delta, target).unwrap();
    let dates: Vec<&str> = merged
        .iter()
        .map(|l| l.split(',').nth(1).unwrap())
        .collect();
    assert_eq!(dates, vec!["20240108", "20240105", "20240102", "20240101"]);
}

#[test]
fn same_date_different_symbols_both_survive() {
    let delta = vec!["MSFT,20240105,1,1,1,1"];
    let target = vec!["AAPL,20240105,1,1,1,1"];
    let merged = merge_lines(delta, target).unwrap();
    // Same date: symbol breaks the tie, descending.
    assert_eq!(
        merged,
        vec!["MSFT,20240105,1,1,1,1", "AAPL,20240105,1,1,1,1"]
    );
}

#[test]
fn malformed_row_is_an_error_not_a_drop() {
    let err = merge_lines(vec!["AAPL,20240105,1,1,1,1"], vec!["not a row"]);
    assert!(matches!(err, Err(VaultError::Data(_))));

    let err = merge_lines(vec!["AAPL,2024,1,1,1,1"], vec![]);
    assert!(matches!(err, Err(VaultError::Data(_))));
}

#[tokio::test]
async fn empty_delta_fails_and_leaves_target_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let delta = dir.path().join("AAPL_20240106-20240108.csv");
    let target = dir.path().join("AAPL.csv");
    tokio::fs::write(&delta, "\n  \n").await.unwrap();
    tokio::fs::write(&target, "AAPL,20240105,1,1,1,1\n")
        .await
        .unwrap();

    let err = merge_files(&delta, &target).await;
    assert!(matches!(err, Err(VaultError::EmptySource { .. })));
    let body = tokio::fs::read_to_string(&target).await.unwrap();
    assert_eq!(body, "AAPL,20240105,1,1,1,1\n");
}

#[tokio::test]
async fn missing_target_is_treated_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let delta = dir.path().join("AAPL_20240106-20240108.csv");
    let target = dir.path().join("AAPL.csv");
    tokio::fs::write(&delta, "AAPL,20240106,1,1,1,1\n")
        .await
        .unwrap();

    merge_files(&delta, &target).await.unwrap();
    let body = tokio::fs::read_to_string(&target).await.unwrap();
    assert_eq!(body, "AAPL,20240106,1,1,1,1\n");
}

#[tokio::test]
async fn merging_the_same_delta_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let delta = dir.path().join("AAPL_20240106-20240106.csv");
    let target = dir.path().join("AAPL.csv");
    tokio::fs::write(&delta, "AAPL,20240106,2,2,2,2\n")
        .await
        .unwrap();
    tokio::fs::write(&target, "AAPL,20240105,1,1,1,1\n")
        .await
        .unwrap();

    merge_files(&delta, &target).await.unwrap();
    let once = tokio::fs::read_to_string(&target).await.unwrap();
    merge_files(&delta, &target).await.unwrap();
    let twice = tokio::fs::read_to_string(&target).await.unwrap();
    assert_eq!(once, twice);
    assert_eq!(once, "AAPL,20240106,2,2,2,2\nAAPL,20240105,1,1,1,1\n");
}
