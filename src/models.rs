use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============ Canonical Report Models ============

/// Canonical credit report produced from a bureau XML document.
///
/// Every field is always present once serialized: absent source data shows
/// up as `null`, `0` (CAPS counters) or an empty sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCreditReport {
    pub report_number: Option<String>,
    pub report_date: Option<String>,
    pub report_time: Option<String>,
    pub name: PersonName,
    pub mobile_phone: Option<String>,
    /// Income tax identifier of the subject.
    #[serde(rename = "PAN")]
    pub pan: Option<String>,
    pub credit_score: Option<f64>,
    pub score_confidence: Option<String>,
    pub report_summary: ReportSummary,
    pub caps_summary: CapsSummary,
    /// Tradelines in document order. Repeated entries are preserved.
    pub accounts: Vec<CreditAccount>,
    /// Applicant address first, then the first tradeline's holder address.
    pub addresses: Vec<Address>,
}

/// Subject name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Always empty with the current bureau mapping.
    pub middle_names: Vec<String>,
}

/// Aggregate account counts and outstanding amounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_accounts: Option<f64>,
    pub active_accounts: Option<f64>,
    pub closed_accounts: Option<f64>,
    pub default_accounts: Option<f64>,
    pub current_balance_amount: Option<f64>,
    pub secured_amount: Option<f64>,
    pub unsecured_amount: Option<f64>,
    #[serde(rename = "last7DaysEnquiries")]
    pub last_7_days_enquiries: Option<f64>,
}

/// Credit enquiry counters over trailing windows. Zero when not reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapsSummary {
    pub last7: f64,
    pub last30: f64,
    pub last90: f64,
    pub last180: f64,
}

/// One subscriber-reported tradeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditAccount {
    pub subscriber_name: Option<String>,
    pub account_number: Option<String>,
    pub portfolio_type: Option<String>,
    pub account_type: Option<String>,
    pub open_date: Option<String>,
    pub credit_limit_amount: Option<f64>,
    pub highest_credit_or_loan_amount: Option<f64>,
    pub account_status: Option<String>,
    pub payment_rating: Option<String>,
    pub payment_history_profile: Option<String>,
    pub current_balance: Option<f64>,
    pub amount_past_due: Option<f64>,
    pub date_reported: Option<String>,
    pub date_closed: Option<String>,
    pub date_of_addition: Option<String>,
    pub currency_code: Option<String>,
    pub holder: AccountHolder,
    pub holder_address: HolderAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountHolder {
    pub surname: Option<String>,
    pub first_name: Option<String>,
    #[serde(rename = "incomeTaxPAN")]
    pub income_tax_pan: Option<String>,
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country_code: Option<String>,
}

/// Report-level address entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub line3: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

// ============ Database Models ============

/// A persisted report as returned by the read endpoints.
///
/// The raw XML is stored alongside but never selected into this struct.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub id: Uuid,
    pub raw_file_name: Option<String>,
    /// Hex SHA-256 of the uploaded text, for duplicate-upload detection.
    pub raw_sha256: String,
    #[sqlx(json)]
    #[serde(flatten)]
    pub report: NormalizedCreditReport,
    pub created_at: DateTime<Utc>,
}

/// Row shape for the report listing query.
#[derive(Debug, Clone, FromRow)]
pub struct ReportListRow {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Listing entry: identity plus subject name only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListItem {
    pub id: Uuid,
    pub name: ListedName,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedName {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<ReportListRow> for ReportListItem {
    fn from(row: ReportListRow) -> Self {
        Self {
            id: row.id,
            name: ListedName {
                first_name: row.first_name,
                last_name: row.last_name,
            },
            created_at: row.created_at,
        }
    }
}

// ============ API Models ============

/// Response body for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub id: Uuid,
    pub data: NormalizedCreditReport,
}

/// Response body for the report listing.
#[derive(Debug, Serialize)]
pub struct ReportListResponse {
    pub count: usize,
    pub reports: Vec<ReportListItem>,
}

/// Envelope for single-report reads.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub data: StoredReport,
}
