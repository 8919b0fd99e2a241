//! Credit report normalization.
//!
//! Walks the generic tree produced by [`crate::xml_reader`] using knowledge of
//! the bureau's `INProfileResponse` layout and builds a
//! [`NormalizedCreditReport`]. Missing sections never fail: every field falls
//! back to `None`, zero or an empty sequence.
//!
//! Fields that the bureau may report in more than one place are declared as
//! ordered path tables below. Paths are relative to the resolved report root
//! and each step follows the first occurrence of its element.

use crate::errors::ReportError;
use crate::models::{
    AccountHolder, Address, CapsSummary, CreditAccount, HolderAddress, NormalizedCreditReport,
    PersonName, ReportSummary,
};
use crate::xml_reader::{ReaderOptions, XmlReader, TEXT_KEY};
use serde_json::Value;

/// Element wrapping the report in a well-formed bureau response.
pub const ROOT_ELEMENT: &str = "INProfileResponse";

/// Ordered candidate locations for one field. The first non-empty value wins.
pub type PathTable = &'static [&'static [&'static str]];

const APPLICANT: &[&str] = &[
    "Current_Application",
    "Current_Application_Details",
    "Current_Applicant_Details",
];
const APPLICANT_ADDRESS: &[&str] = &[
    "Current_Application",
    "Current_Application_Details",
    "Current_Applicant_Address_Details",
];
const CAIS_SUMMARY: &[&str] = &["CAIS_Account", "CAIS_Summary"];

pub const REPORT_NUMBER: PathTable = &[
    &["CreditProfileHeader", "ReportNumber"],
    &["Header", "ReportNumber"],
];
pub const REPORT_DATE: PathTable = &[
    &["CreditProfileHeader", "ReportDate"],
    &["Header", "ReportDate"],
];
pub const REPORT_TIME: PathTable = &[
    &["CreditProfileHeader", "ReportTime"],
    &["Header", "ReportTime"],
];

pub const MOBILE_PHONE: PathTable = &[
    &[
        "Current_Application",
        "Current_Application_Details",
        "Current_Applicant_Details",
        "MobilePhoneNumber",
    ],
    &[
        "Current_Application",
        "Current_Application_Details",
        "Current_Applicant_Details",
        "Telephone_Number_Applicant_1st",
    ],
    &[
        "CAIS_Account",
        "CAIS_Account_DETAILS",
        "CAIS_Holder_Phone_Details",
        "Telephone_Number",
    ],
];

pub const PAN: PathTable = &[
    &[
        "CAIS_Account",
        "CAIS_Account_DETAILS",
        "CAIS_Holder_ID_Details",
        "Income_TAX_PAN",
    ],
    &[
        "Current_Application",
        "Current_Application_Details",
        "Current_Applicant_Details",
        "IncomeTaxPan",
    ],
];

const TOTAL_ACCOUNTS: PathTable = &[
    &["CAIS_Account", "CAIS_Summary", "Credit_Account", "CreditAccountTotal"],
    &["CAIS_Account", "CAIS_Summary", "Account", "CreditAccountTotal"],
];

const OUTSTANDING_ALL: PathTable = &[
    &["CAIS_Account", "Total_Outstanding_Balance", "Outstanding_Balance_All"],
    &[
        "CAIS_Account",
        "CAIS_Summary",
        "Total_Outstanding_Balance",
        "Outstanding_Balance_All",
    ],
];
const OUTSTANDING_SECURED: PathTable = &[
    &["CAIS_Account", "Total_Outstanding_Balance", "Outstanding_Balance_Secured"],
    &[
        "CAIS_Account",
        "CAIS_Summary",
        "Total_Outstanding_Balance",
        "Outstanding_Balance_Secured",
    ],
];
const OUTSTANDING_UNSECURED: PathTable = &[
    &["CAIS_Account", "Total_Outstanding_Balance", "Outstanding_Balance_UnSecured"],
    &[
        "CAIS_Account",
        "CAIS_Summary",
        "Total_Outstanding_Balance",
        "Outstanding_Balance_UnSecured",
    ],
];

const LAST_7_DAYS_ENQUIRIES: PathTable = &[
    &["TotalCAPS_Summary", "TotalCAPSLast7Days"],
    &["TotalCAPSLast7Days"],
    &["CAPS", "CAPS_Summary", "CAPSLast7Days"],
];

/// Reads and normalizes bureau documents with a fixed reader configuration.
#[derive(Debug, Clone, Default)]
pub struct ReportNormalizer {
    reader: XmlReader,
}

impl ReportNormalizer {
    pub fn new(options: ReaderOptions) -> Self {
        Self {
            reader: XmlReader::new(options),
        }
    }

    /// Parse `raw` and map it to the canonical record.
    ///
    /// Only reader failures ([`ReportError::NotXml`],
    /// [`ReportError::MalformedDocument`]) are returned; no partial record is
    /// produced on failure.
    pub fn normalize(&self, raw: &str) -> Result<NormalizedCreditReport, ReportError> {
        let tree = self.reader.read(raw)?;
        Ok(map_report(document_element(&tree)))
    }
}

/// Normalize a document with the default reader options.
pub fn normalize(raw: &str) -> Result<NormalizedCreditReport, ReportError> {
    ReportNormalizer::default().normalize(raw)
}

/// Map an already-parsed document tree to the canonical record.
///
/// The tree is either wrapped in [`ROOT_ELEMENT`] or is the report body itself.
pub fn normalize_tree(tree: &Value) -> NormalizedCreditReport {
    map_report(resolve_root(tree))
}

fn map_report(root: &Value) -> NormalizedCreditReport {

    let accounts: Vec<CreditAccount> = child(root, "CAIS_Account")
        .map(|section| {
            occurrences(section, "CAIS_Account_DETAILS")
                .into_iter()
                .map(map_account)
                .collect()
        })
        .unwrap_or_default();

    let repeats = repeated_tradelines(&accounts);
    if repeats > 0 {
        tracing::warn!(
            "Report contains {} tradeline(s) identical to an earlier one; kept as-is",
            repeats
        );
    }

    let applicant = lookup(root, APPLICANT);
    let score = child(root, "SCORE");

    let report = NormalizedCreditReport {
        report_number: resolve_text(root, REPORT_NUMBER),
        report_date: resolve_text(root, REPORT_DATE),
        report_time: resolve_text(root, REPORT_TIME),
        name: PersonName {
            first_name: applicant.and_then(|a| text_at(a, &["First_Name"])),
            last_name: applicant.and_then(|a| text_at(a, &["Last_Name"])),
            middle_names: Vec::new(),
        },
        mobile_phone: resolve_text(root, MOBILE_PHONE),
        pan: resolve_text(root, PAN),
        credit_score: coerce_number(score.and_then(|s| child(s, "BureauScore"))),
        score_confidence: score.and_then(|s| text_at(s, &["BureauScoreConfidLevel"])),
        report_summary: report_summary(root),
        caps_summary: caps_summary(root),
        addresses: assemble_addresses(root),
        accounts,
    };

    tracing::debug!(
        "Normalized report {:?}: {} account(s), {} address(es)",
        report.report_number,
        report.accounts.len(),
        report.addresses.len()
    );

    report
}

/// The report body sits under [`ROOT_ELEMENT`] when present; otherwise the
/// top-level node itself is treated as the body.
pub fn resolve_root(tree: &Value) -> &Value {
    child(tree, ROOT_ELEMENT).unwrap_or(tree)
}

/// Report body of a document read by [`XmlReader`], which always holds the
/// document element under its own name. A renamed document element is read
/// the same way as [`ROOT_ELEMENT`].
fn document_element(tree: &Value) -> &Value {
    match tree.as_object() {
        Some(elements) if elements.len() == 1 => elements
            .keys()
            .next()
            .and_then(|name| child(tree, name))
            .unwrap_or(tree),
        _ => resolve_root(tree),
    }
}

/// Every occurrence of `name` under `parent`, in document order.
///
/// Zero occurrences give an empty vector, a single node gives one element and
/// repeated siblings are passed through. This is the only place where the
/// single-node versus array ambiguity of the tree is resolved.
pub fn occurrences<'a>(parent: &'a Value, name: &str) -> Vec<&'a Value> {
    match parent.get(name) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(node) => vec![node],
    }
}

/// First occurrence of `name` under `parent`.
pub fn child<'a>(parent: &'a Value, name: &str) -> Option<&'a Value> {
    occurrences(parent, name).into_iter().next()
}

/// Follow `path` from `node`, taking the first occurrence at every step.
pub fn lookup<'a>(node: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(node, |current, name| child(current, name))
}

/// First candidate in `table` that yields non-empty text.
pub fn resolve_text(root: &Value, table: PathTable) -> Option<String> {
    table.iter().find_map(|path| text_at(root, path))
}

/// First candidate in `table` that yields a number.
pub fn resolve_number(root: &Value, table: PathTable) -> Option<f64> {
    table
        .iter()
        .find_map(|path| coerce_number(lookup(root, path)))
}

fn text_at(node: &Value, path: &[&str]) -> Option<String> {
    lookup(node, path).and_then(as_text)
}

/// Render a scalar node as text. Empty strings count as absent and an element
/// carrying attributes yields its `#text` content.
pub fn as_text(node: &Value) -> Option<String> {
    match node {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(_) => child(node, TEXT_KEY).and_then(as_text),
        // `child` already unwraps repeated siblings; a bare array is not a scalar.
        Value::Array(_) | Value::Null => None,
    }
}

/// The single numeric parser for every numeric field.
///
/// Absent, null and empty values give `None`, as does anything that is not a
/// finite number once trimmed.
pub fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let node = value?;
    match node {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        Value::Object(_) => coerce_number(child(node, TEXT_KEY)),
        Value::Array(_) | Value::Bool(_) | Value::Null => None,
    }
}

fn map_account(node: &Value) -> CreditAccount {
    let holder = child(node, "CAIS_Holder_Details");
    let holder_ids = child(node, "CAIS_Holder_ID_Details");
    let address = child(node, "CAIS_Holder_Address_Details");
    let text = |name: &str| text_at(node, &[name]);
    let number = |name: &str| coerce_number(child(node, name));

    CreditAccount {
        subscriber_name: text("Subscriber_Name"),
        account_number: text("Account_Number"),
        portfolio_type: text("Portfolio_Type"),
        account_type: text("Account_Type"),
        open_date: text("Open_Date"),
        credit_limit_amount: number("Credit_Limit_Amount"),
        highest_credit_or_loan_amount: number("Highest_Credit_or_Original_Loan_Amount"),
        account_status: text("Account_Status"),
        payment_rating: text("Payment_Rating"),
        payment_history_profile: text("Payment_History_Profile"),
        current_balance: number("Current_Balance"),
        amount_past_due: number("Amount_Past_Due"),
        date_reported: text("Date_Reported"),
        date_closed: text("Date_Closed"),
        date_of_addition: text("DateOfAddition"),
        currency_code: text("CurrencyCode"),
        holder: AccountHolder {
            surname: holder.and_then(|h| text_at(h, &["Surname_Non_Normalized"])),
            first_name: holder.and_then(|h| text_at(h, &["First_Name_Non_Normalized"])),
            income_tax_pan: holder_ids.and_then(|h| text_at(h, &["Income_TAX_PAN"])),
            date_of_birth: holder.and_then(|h| text_at(h, &["Date_of_birth"])),
        },
        holder_address: address.map(map_holder_address).unwrap_or_default(),
    }
}

fn map_holder_address(node: &Value) -> HolderAddress {
    HolderAddress {
        line1: text_at(node, &["First_Line_Of_Address_non_normalized"]),
        line2: text_at(node, &["Second_Line_Of_Address_non_normalized"]),
        city: text_at(node, &["City_non_normalized"]),
        state: text_at(node, &["State_non_normalized"]),
        zip: text_at(node, &["ZIP_Postal_Code_non_normalized"]),
        country_code: text_at(node, &["CountryCode_non_normalized"]),
    }
}

/// Applicant address first, then the first tradeline's holder address.
/// The two are never merged or deduplicated. A block without any fields
/// (`<Current_Applicant_Address_Details/>`) counts as absent.
fn assemble_addresses(root: &Value) -> Vec<Address> {
    let mut addresses = Vec::new();

    if let Some(applicant) = lookup(root, APPLICANT_ADDRESS).filter(|node| node.is_object()) {
        addresses.push(Address {
            line1: text_at(applicant, &["FlatNoPlotNoHouseNo"])
                .or_else(|| text_at(applicant, &["BldgNoSocietyName"])),
            line2: text_at(applicant, &["RoadNoNameAreaLocality"]),
            line3: None,
            city: text_at(applicant, &["City"]),
            state: text_at(applicant, &["State"]),
            zip: text_at(applicant, &["PINCode"]),
            country: text_at(applicant, &["Country_Code"]),
        });
    }

    if let Some(holder) = lookup(
        root,
        &[
            "CAIS_Account",
            "CAIS_Account_DETAILS",
            "CAIS_Holder_Address_Details",
        ],
    )
    .filter(|node| node.is_object())
    {
        addresses.push(Address {
            line1: text_at(holder, &["First_Line_Of_Address_non_normalized"]),
            line2: text_at(holder, &["Second_Line_Of_Address_non_normalized"]),
            line3: text_at(holder, &["Third_Line_Of_Address_non_normalized"]),
            city: text_at(holder, &["City_non_normalized"]),
            state: text_at(holder, &["State_non_normalized"]),
            zip: text_at(holder, &["ZIP_Postal_Code_non_normalized"]),
            country: text_at(holder, &["CountryCode_non_normalized"]),
        });
    }

    addresses
}

fn report_summary(root: &Value) -> ReportSummary {
    let credit_account = lookup(root, CAIS_SUMMARY).and_then(|s| child(s, "Credit_Account"));
    let count = |name: &str| coerce_number(credit_account.and_then(|c| child(c, name)));

    ReportSummary {
        total_accounts: resolve_number(root, TOTAL_ACCOUNTS),
        active_accounts: count("CreditAccountActive"),
        closed_accounts: count("CreditAccountClosed"),
        default_accounts: count("CreditAccountDefault"),
        current_balance_amount: resolve_number(root, OUTSTANDING_ALL),
        secured_amount: resolve_number(root, OUTSTANDING_SECURED),
        unsecured_amount: resolve_number(root, OUTSTANDING_UNSECURED),
        last_7_days_enquiries: resolve_number(root, LAST_7_DAYS_ENQUIRIES),
    }
}

fn caps_summary(root: &Value) -> CapsSummary {
    let totals = child(root, "TotalCAPS_Summary");
    let counter =
        |name: &str| coerce_number(totals.and_then(|t| child(t, name))).unwrap_or(0.0);

    CapsSummary {
        last7: counter("TotalCAPSLast7Days"),
        last30: counter("TotalCAPSLast30Days"),
        last90: counter("TotalCAPSLast90Days"),
        last180: counter("TotalCAPSLast180Days"),
    }
}

/// Number of tradelines equal to one appearing earlier in the list.
pub fn repeated_tradelines(accounts: &[CreditAccount]) -> usize {
    accounts
        .iter()
        .enumerate()
        .filter(|(idx, account)| accounts[..*idx].contains(account))
        .count()
}
