use std::env;

use credit_report_api::data::db_storage::{content_checksum, ReportStorage};
use credit_report_api::db::Database;
use credit_report_api::normalize;

const SAMPLE: &str = include_str!("fixtures/sample_report.xml");

/// Integration smoke test for report storage round trips.
/// Marked ignored to avoid running against production by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn store_and_fetch_report_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    let storage = ReportStorage::new(db.pool.clone(), true);

    let report = normalize(SAMPLE)?;
    let id = storage
        .store_report("sample_report.xml", SAMPLE, &report)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let stored = storage
        .fetch_report(id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .ok_or_else(|| anyhow::anyhow!("stored report {} not found", id))?;

    assert_eq!(stored.id, id);
    assert_eq!(stored.raw_file_name.as_deref(), Some("sample_report.xml"));
    assert_eq!(stored.raw_sha256, content_checksum(SAMPLE));
    assert_eq!(stored.report, report);

    let listed = storage
        .list_reports()
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(listed.iter().any(|item| item.id == id));

    Ok(())
}
