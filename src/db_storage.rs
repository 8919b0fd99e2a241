use crate::errors::{AppError, ResultExt};
use crate::models::{NormalizedCreditReport, ReportListItem, ReportListRow, StoredReport};
use sha2::{Digest, Sha256};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// Database storage service for normalized credit reports
pub struct ReportStorage {
    pool: PgPool,
    store_raw_xml: bool,
}

impl ReportStorage {
    pub fn new(pool: PgPool, store_raw_xml: bool) -> Self {
        Self {
            pool,
            store_raw_xml,
        }
    }

    /// Persist a normalized report with its upload metadata and return the new id.
    ///
    /// The subject's name, PAN and report number are copied into their own
    /// columns so listings and lookups don't have to open the JSON document.
    pub async fn store_report(
        &self,
        file_name: &str,
        raw_xml: &str,
        report: &NormalizedCreditReport,
    ) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        let checksum = content_checksum(raw_xml);
        let raw = self.store_raw_xml.then_some(raw_xml);

        sqlx::query(
            r#"
            INSERT INTO credit_reports
                (id, raw_file_name, raw_xml, raw_sha256, report_number, pan, first_name, last_name, report)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(id)
        .bind(file_name)
        .bind(raw)
        .bind(&checksum)
        .bind(report.report_number.as_deref())
        .bind(report.pan.as_deref())
        .bind(report.name.first_name.as_deref())
        .bind(report.name.last_name.as_deref())
        .bind(Json(report))
        .execute(&self.pool)
        .await
        .context("storing credit report")?;

        tracing::info!(
            "Stored credit report {} from {} ({} account(s), sha256 {})",
            id,
            file_name,
            report.accounts.len(),
            &checksum[..12]
        );

        Ok(id)
    }

    /// Fetch a stored report without its raw XML.
    pub async fn fetch_report(&self, id: Uuid) -> Result<Option<StoredReport>, AppError> {
        sqlx::query_as::<_, StoredReport>(
            r#"
            SELECT id, raw_file_name, raw_sha256, report, created_at
            FROM credit_reports
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching credit report")
    }

    /// All stored reports, newest first, with only their subject names.
    pub async fn list_reports(&self) -> Result<Vec<ReportListItem>, AppError> {
        let rows = sqlx::query_as::<_, ReportListRow>(
            r#"
            SELECT id, first_name, last_name, created_at
            FROM credit_reports
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("listing credit reports")?;

        Ok(rows.into_iter().map(ReportListItem::from).collect())
    }
}

/// Hex-encoded SHA-256 of the uploaded text.
///
/// Stored with every report so consumers can spot the same document uploaded twice.
pub fn content_checksum(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_checksum_is_stable_hex() {
        let checksum = content_checksum("<INProfileResponse/>");
        assert_eq!(checksum.len(), 64);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(checksum, content_checksum("<INProfileResponse/>"));
        assert_ne!(checksum, content_checksum("<INProfileResponse />"));
    }

    #[test]
    fn test_content_checksum_known_value() {
        assert_eq!(
            content_checksum(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
