use std::sync::Arc;

use chrono::NaiveDate;

use quotevault::{Vault, VaultError};
use quotevault_core::{Frequency, Interval};
use quotevault_mock::{MockAdapter, MockTransport, fixture_body};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn vault(transport: MockTransport) -> Vault {
    Vault::builder()
        .with_adapter(Arc::new(MockAdapter::new()))
        .transport(Arc::new(transport))
        .reference_date(d(2024, 1, 8))
        .build()
        .unwrap()
}

#[test]
fn build_without_adapters_is_rejected() {
    let err = Vault::builder().build();
    assert!(matches!(err, Err(VaultError::InvalidArg(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn downloads_land_under_provider_and_exchange_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new()
        .with_body("AAPL", fixture_body("AAPL", d(2024, 1, 5), 3))
        .with_body("MSFT", fixture_body("MSFT", d(2024, 1, 5), 3));
    let vault = vault(transport);

    let report = vault
        .download()
        .symbols(Some("NASDAQ"), &["AAPL", "MSFT"])
        .unwrap()
        .dest(dir.path())
        .run()
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.passed(), 2);
    for symbol in ["AAPL", "MSFT"] {
        let path = dir.path().join("mock").join("NASDAQ").join(format!("{symbol}.csv"));
        let body = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(body, fixture_body(symbol, d(2024, 1, 5), 3));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn weekly_interval_is_reflected_in_the_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new().with_body("AAPL", fixture_body("AAPL", d(2024, 1, 5), 2));
    let vault = vault(transport);

    let report = vault
        .download()
        .add_symbol("AAPL", None)
        .unwrap()
        .interval(Interval::since_inception(Frequency::Weekly))
        .dest(dir.path())
        .run()
        .await
        .unwrap();

    assert!(report.is_clean());
    let path = dir.path().join("mock").join("AAPL_w.csv");
    assert!(path.is_file(), "missing {}", path.display());
}

#[tokio::test(flavor = "multi_thread")]
async fn per_symbol_failures_do_not_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new()
        .with_body("AAPL", fixture_body("AAPL", d(2024, 1, 5), 2))
        .with_failure("MSFT", VaultError::not_found("no canned body"));
    let vault = vault(transport);

    let report = vault
        .download()
        .symbols(None, &["AAPL", "MSFT", "BADREQ"])
        .unwrap()
        .dest(dir.path())
        .run()
        .await
        .unwrap();

    assert_eq!(report.passed(), 1);
    assert_eq!(report.failed(), 2);
    // The rejected request is attributed to the adapter.
    let badreq = report
        .failures
        .iter()
        .find(|(item, _)| item.symbol == "BADREQ")
        .unwrap();
    assert!(matches!(badreq.1, VaultError::Adapter { .. }));
    assert!(dir.path().join("mock").join("AAPL.csv").is_file());
    assert!(!dir.path().join("mock").join("MSFT.csv").exists());
}

#[test]
fn duplicate_symbols_are_rejected_up_front() {
    let vault = vault(MockTransport::new());
    let err = vault
        .download()
        .add_symbol("AAPL", Some("NASDAQ"))
        .unwrap()
        .add_symbol("AAPL", Some("NASDAQ"));
    assert!(matches!(err, Err(VaultError::InvalidArg(_))));

    // Same symbol on another exchange is a different listing.
    let ok = vault
        .download()
        .add_symbol("AAPL", Some("NASDAQ"))
        .unwrap()
        .add_symbol("AAPL", Some("XETRA"));
    assert!(ok.is_ok());
}

#[tokio::test]
async fn empty_symbol_list_is_rejected() {
    let vault = vault(MockTransport::new());
    let err = vault.download().run().await;
    assert!(matches!(err, Err(VaultError::InvalidArg(_))));
}

#[tokio::test]
async fn unknown_provider_is_rejected() {
    let vault = vault(MockTransport::new());
    let err = vault
        .download()
        .provider("stooq")
        .add_symbol("AAPL", None)
        .unwrap()
        .run()
        .await;
    assert!(matches!(err, Err(VaultError::NotFound { .. })));
}
