/// Tests for document reading and credit report normalization
/// Covers the sample bureau report, cardinality handling, field priority and failure modes
use credit_report_api::models::{Address, CapsSummary};
use credit_report_api::normalizer::normalize_tree;
use credit_report_api::xml_reader::{read_document, ReaderOptions};
use credit_report_api::{normalize, ReportError, ReportNormalizer};

const SAMPLE: &str = include_str!("fixtures/sample_report.xml");

/// Wrap `body` in the bureau root element.
fn doc(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?><INProfileResponse>{}</INProfileResponse>",
        body
    )
}

fn tradeline(account_number: &str) -> String {
    format!(
        "<CAIS_Account_DETAILS>\
           <Subscriber_Name>Bank {n}</Subscriber_Name>\
           <Account_Number>{n}</Account_Number>\
           <Current_Balance>1000</Current_Balance>\
           <CAIS_Holder_Address_Details>\
             <First_Line_Of_Address_non_normalized>Line {n}</First_Line_Of_Address_non_normalized>\
             <City_non_normalized>PUNE</City_non_normalized>\
           </CAIS_Holder_Address_Details>\
         </CAIS_Account_DETAILS>",
        n = account_number
    )
}

#[cfg(test)]
mod sample_report_tests {
    use super::*;

    #[test]
    fn test_header_and_identity() {
        let report = normalize(SAMPLE).unwrap();

        assert_eq!(report.report_number.as_deref(), Some("1562829155447"));
        assert_eq!(report.report_date.as_deref(), Some("20190711"));
        assert_eq!(report.report_time.as_deref(), Some("124235"));
        assert_eq!(report.name.first_name.as_deref(), Some("PRIYA"));
        assert_eq!(report.name.last_name.as_deref(), Some("SHARMA"));
        assert!(report.name.middle_names.is_empty());
        assert_eq!(report.mobile_phone.as_deref(), Some("9819012345"));
        // Tradeline holder PAN outranks the applicant's
        assert_eq!(report.pan.as_deref(), Some("AAAPS9999Z"));
        assert_eq!(report.credit_score, Some(719.0));
        assert_eq!(report.score_confidence.as_deref(), Some("H"));
    }

    #[test]
    fn test_summaries() {
        let report = normalize(SAMPLE).unwrap();
        let summary = &report.report_summary;

        assert_eq!(summary.total_accounts, Some(2.0));
        assert_eq!(summary.active_accounts, Some(1.0));
        assert_eq!(summary.closed_accounts, Some(1.0));
        assert_eq!(summary.default_accounts, Some(0.0));
        assert_eq!(summary.current_balance_amount, Some(200000.0));
        assert_eq!(summary.secured_amount, Some(150000.0));
        assert_eq!(summary.unsecured_amount, Some(50000.0));
        assert_eq!(summary.last_7_days_enquiries, Some(1.0));
        assert_eq!(
            report.caps_summary,
            CapsSummary {
                last7: 1.0,
                last30: 2.0,
                last90: 3.0,
                last180: 5.0
            }
        );
    }

    #[test]
    fn test_accounts_in_document_order() {
        let report = normalize(SAMPLE).unwrap();
        assert_eq!(report.accounts.len(), 2);

        let first = &report.accounts[0];
        assert_eq!(first.subscriber_name.as_deref(), Some("HDFC Bank"));
        // Leading zeros survive the reader
        assert_eq!(first.account_number.as_deref(), Some("0012345678"));
        assert_eq!(first.account_type.as_deref(), Some("02"));
        assert_eq!(first.credit_limit_amount, None);
        assert_eq!(first.highest_credit_or_loan_amount, Some(250000.0));
        assert_eq!(first.current_balance, Some(150000.0));
        assert_eq!(first.amount_past_due, Some(0.0));
        assert_eq!(first.payment_rating.as_deref(), Some("0"));
        assert_eq!(first.date_closed, None);
        assert_eq!(first.currency_code.as_deref(), Some("INR"));
        assert_eq!(first.holder.surname.as_deref(), Some("SHARMA"));
        assert_eq!(first.holder.income_tax_pan.as_deref(), Some("AAAPS9999Z"));
        assert_eq!(first.holder.date_of_birth.as_deref(), Some("19861003"));
        assert_eq!(first.holder_address.line1.as_deref(), Some("12 SUNRISE APTS"));
        assert_eq!(first.holder_address.country_code.as_deref(), Some("IB"));

        let second = &report.accounts[1];
        assert_eq!(second.account_number.as_deref(), Some("AX-77"));
        assert_eq!(second.credit_limit_amount, Some(50000.75));
        // "N/A" is not a number
        assert_eq!(second.highest_credit_or_loan_amount, None);
        assert_eq!(second.amount_past_due, None);
        assert_eq!(second.date_closed.as_deref(), Some("20171231"));
        assert_eq!(second.holder.income_tax_pan, None);
        assert_eq!(second.holder_address, Default::default());
    }

    #[test]
    fn test_addresses_applicant_then_first_holder() {
        let report = normalize(SAMPLE).unwrap();

        assert_eq!(
            report.addresses,
            vec![
                Address {
                    line1: Some("Flat 12".into()),
                    line2: Some("MG Road".into()),
                    line3: None,
                    city: Some("MUMBAI".into()),
                    state: Some("27".into()),
                    zip: Some("400001".into()),
                    country: Some("IB".into()),
                },
                Address {
                    line1: Some("12 SUNRISE APTS".into()),
                    line2: Some("MG ROAD".into()),
                    line3: Some("FORT".into()),
                    city: Some("MUMBAI".into()),
                    state: Some("27".into()),
                    zip: Some("400001".into()),
                    country: Some("IB".into()),
                },
            ]
        );
    }

    #[test]
    fn test_normalizing_twice_is_identical() {
        assert_eq!(normalize(SAMPLE).unwrap(), normalize(SAMPLE).unwrap());
    }

    #[test]
    fn test_json_field_names() {
        let value = serde_json::to_value(normalize(SAMPLE).unwrap()).unwrap();

        for key in [
            "reportNumber",
            "reportDate",
            "reportTime",
            "name",
            "mobilePhone",
            "PAN",
            "creditScore",
            "scoreConfidence",
            "reportSummary",
            "capsSummary",
            "accounts",
            "addresses",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert!(value["name"].get("middleNames").is_some());
        assert!(value["reportSummary"].get("last7DaysEnquiries").is_some());
        assert!(value["capsSummary"].get("last180").is_some());
        assert!(value["accounts"][0].get("highestCreditOrLoanAmount").is_some());
        assert!(value["accounts"][0]["holder"].get("incomeTaxPAN").is_some());
        assert!(value["accounts"][0]["holderAddress"].get("countryCode").is_some());
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_single_tradeline_without_caps_block() {
        let text = doc(&format!(
            "<SCORE><BureauScore>750</BureauScore></SCORE><CAIS_Account>{}</CAIS_Account>",
            tradeline("A1")
        ));
        let report = normalize(&text).unwrap();

        assert_eq!(report.credit_score, Some(750.0));
        assert_eq!(report.caps_summary, CapsSummary::default());
        assert_eq!(report.report_summary.last_7_days_enquiries, None);
        assert_eq!(report.accounts.len(), 1);
    }

    #[test]
    fn test_not_xml_input() {
        assert_eq!(normalize("not xml at all"), Err(ReportError::NotXml));
    }

    #[test]
    fn test_three_tradelines_without_applicant_address() {
        let text = doc(&format!(
            "<CAIS_Account>{}{}{}</CAIS_Account>",
            tradeline("A1"),
            tradeline("A2"),
            tradeline("A3")
        ));
        let report = normalize(&text).unwrap();

        let numbers: Vec<_> = report
            .accounts
            .iter()
            .map(|a| a.account_number.as_deref().unwrap())
            .collect();
        assert_eq!(numbers, vec!["A1", "A2", "A3"]);
        assert_eq!(report.addresses.len(), 1);
        assert_eq!(report.addresses[0].line1.as_deref(), Some("Line A1"));
        assert_eq!(report.addresses[0].city.as_deref(), Some("PUNE"));
    }

    #[test]
    fn test_tradelines_without_any_address() {
        let text = doc(
            "<CAIS_Account>\
               <CAIS_Account_DETAILS><Account_Number>X</Account_Number></CAIS_Account_DETAILS>\
               <CAIS_Account_DETAILS><Account_Number>Y</Account_Number></CAIS_Account_DETAILS>\
             </CAIS_Account>",
        );
        let report = normalize(&text).unwrap();
        assert_eq!(report.accounts.len(), 2);
        assert!(report.addresses.is_empty());
    }

    #[test]
    fn test_empty_address_blocks_are_absent() {
        let text = doc(
            "<Current_Application><Current_Application_Details>\
               <Current_Applicant_Details><First_Name>ASHA</First_Name></Current_Applicant_Details>\
               <Current_Applicant_Address_Details/>\
             </Current_Application_Details></Current_Application>\
             <CAIS_Account><CAIS_Account_DETAILS>\
               <Account_Number>1</Account_Number>\
               <CAIS_Holder_Address_Details></CAIS_Holder_Address_Details>\
             </CAIS_Account_DETAILS></CAIS_Account>",
        );
        let report = normalize(&text).unwrap();

        assert_eq!(report.name.first_name.as_deref(), Some("ASHA"));
        assert_eq!(report.accounts.len(), 1);
        assert!(
            report.addresses.is_empty(),
            "got {} address(es)",
            report.addresses.len()
        );
    }

    #[test]
    fn test_empty_report_uses_defaults() {
        let report = normalize("<INProfileResponse/>").unwrap();

        assert_eq!(report.report_number, None);
        assert_eq!(report.mobile_phone, None);
        assert_eq!(report.pan, None);
        assert_eq!(report.credit_score, None);
        assert_eq!(report.report_summary, Default::default());
        assert_eq!(report.caps_summary, CapsSummary::default());
        assert!(report.accounts.is_empty());
        assert!(report.addresses.is_empty());
    }
}

#[cfg(test)]
mod cardinality_tests {
    use super::*;

    #[test]
    fn test_zero_one_many_tradelines() {
        let zero = normalize(&doc("<CAIS_Account></CAIS_Account>")).unwrap();
        let one = normalize(&doc(&format!("<CAIS_Account>{}</CAIS_Account>", tradeline("A")))).unwrap();
        let many = normalize(&doc(&format!(
            "<CAIS_Account>{}{}</CAIS_Account>",
            tradeline("A"),
            tradeline("B")
        )))
        .unwrap();

        assert_eq!(zero.accounts.len(), 0);
        assert_eq!(one.accounts.len(), 1);
        assert_eq!(many.accounts.len(), 2);
        // A lone tradeline maps exactly like the first of several
        assert_eq!(one.accounts[0], many.accounts[0]);
    }

    #[test]
    fn test_identical_tradelines_are_kept() {
        let text = doc(&format!(
            "<CAIS_Account>{}{}</CAIS_Account>",
            tradeline("SAME"),
            tradeline("SAME")
        ));
        let report = normalize(&text).unwrap();
        assert_eq!(report.accounts.len(), 2);
        assert_eq!(report.accounts[0], report.accounts[1]);
    }

    #[test]
    fn test_repeated_holder_blocks_use_first() {
        let text = doc(
            "<CAIS_Account><CAIS_Account_DETAILS>\
               <CAIS_Holder_Phone_Details><Telephone_Number>111</Telephone_Number></CAIS_Holder_Phone_Details>\
               <CAIS_Holder_Phone_Details><Telephone_Number>222</Telephone_Number></CAIS_Holder_Phone_Details>\
             </CAIS_Account_DETAILS></CAIS_Account>",
        );
        let report = normalize(&text).unwrap();
        assert_eq!(report.mobile_phone.as_deref(), Some("111"));
    }

    #[test]
    fn test_one_bad_tradeline_does_not_affect_others() {
        let text = doc(&format!(
            "<CAIS_Account><CAIS_Account_DETAILS/>{}</CAIS_Account>",
            tradeline("GOOD")
        ));
        let report = normalize(&text).unwrap();
        assert_eq!(report.accounts.len(), 2);
        assert_eq!(report.accounts[0], Default::default());
        assert_eq!(report.accounts[1].account_number.as_deref(), Some("GOOD"));
        assert_eq!(report.accounts[1].current_balance, Some(1000.0));
    }
}

#[cfg(test)]
mod priority_tests {
    use super::*;

    #[test]
    fn test_profile_header_report_number_wins() {
        let both = doc(
            "<Header><ReportNumber>GEN</ReportNumber></Header>\
             <CreditProfileHeader><ReportNumber>PROFILE</ReportNumber></CreditProfileHeader>",
        );
        let generic_only = doc("<Header><ReportNumber>GEN</ReportNumber></Header>");

        assert_eq!(normalize(&both).unwrap().report_number.as_deref(), Some("PROFILE"));
        assert_eq!(
            normalize(&generic_only).unwrap().report_number.as_deref(),
            Some("GEN")
        );
    }

    #[test]
    fn test_mobile_phone_fallback_chain() {
        let applicant = |inner: &str| {
            format!(
                "<Current_Application><Current_Application_Details><Current_Applicant_Details>{}\
                 </Current_Applicant_Details></Current_Application_Details></Current_Application>",
                inner
            )
        };
        let holder_phone = "<CAIS_Account><CAIS_Account_DETAILS><CAIS_Holder_Phone_Details>\
                            <Telephone_Number>HOLDER</Telephone_Number>\
                            </CAIS_Holder_Phone_Details></CAIS_Account_DETAILS></CAIS_Account>";

        let mobile = doc(&format!(
            "{}{}",
            applicant("<MobilePhoneNumber>MOBILE</MobilePhoneNumber><Telephone_Number_Applicant_1st>LAND</Telephone_Number_Applicant_1st>"),
            holder_phone
        ));
        let landline = doc(&format!(
            "{}{}",
            applicant("<MobilePhoneNumber/><Telephone_Number_Applicant_1st>LAND</Telephone_Number_Applicant_1st>"),
            holder_phone
        ));
        let holder_only = doc(holder_phone);
        let none = doc(&applicant("<MobilePhoneNumber></MobilePhoneNumber>"));

        assert_eq!(normalize(&mobile).unwrap().mobile_phone.as_deref(), Some("MOBILE"));
        assert_eq!(normalize(&landline).unwrap().mobile_phone.as_deref(), Some("LAND"));
        assert_eq!(normalize(&holder_only).unwrap().mobile_phone.as_deref(), Some("HOLDER"));
        assert_eq!(normalize(&none).unwrap().mobile_phone, None);
    }

    #[test]
    fn test_pan_falls_back_to_applicant() {
        let text = doc(
            "<Current_Application><Current_Application_Details><Current_Applicant_Details>\
               <IncomeTaxPan>APPLICANT1</IncomeTaxPan>\
             </Current_Applicant_Details></Current_Application_Details></Current_Application>\
             <CAIS_Account><CAIS_Account_DETAILS><CAIS_Holder_ID_Details><Income_TAX_PAN/></CAIS_Holder_ID_Details></CAIS_Account_DETAILS></CAIS_Account>",
        );
        assert_eq!(normalize(&text).unwrap().pan.as_deref(), Some("APPLICANT1"));
    }

    #[test]
    fn test_applicant_line1_falls_back_to_building() {
        let text = doc(
            "<Current_Application><Current_Application_Details><Current_Applicant_Address_Details>\
               <FlatNoPlotNoHouseNo/><BldgNoSocietyName>Lotus Towers</BldgNoSocietyName>\
             </Current_Applicant_Address_Details></Current_Application_Details></Current_Application>",
        );
        let report = normalize(&text).unwrap();
        assert_eq!(report.addresses.len(), 1);
        assert_eq!(report.addresses[0].line1.as_deref(), Some("Lotus Towers"));
    }

    #[test]
    fn test_last7_enquiries_fallbacks() {
        let flat = doc("<TotalCAPSLast7Days>4</TotalCAPSLast7Days>");
        let caps = doc("<CAPS><CAPS_Summary><CAPSLast7Days>6</CAPSLast7Days></CAPS_Summary></CAPS>");

        let flat = normalize(&flat).unwrap();
        assert_eq!(flat.report_summary.last_7_days_enquiries, Some(4.0));
        // CAPS counters only read TotalCAPS_Summary
        assert_eq!(flat.caps_summary.last7, 0.0);
        assert_eq!(
            normalize(&caps).unwrap().report_summary.last_7_days_enquiries,
            Some(6.0)
        );
    }

    #[test]
    fn test_total_accounts_falls_back_to_account_block() {
        let text = doc(
            "<CAIS_Account><CAIS_Summary>\
               <Credit_Account><CreditAccountActive>3</CreditAccountActive></Credit_Account>\
               <Account><CreditAccountTotal>9</CreditAccountTotal></Account>\
             </CAIS_Summary></CAIS_Account>",
        );
        let summary = normalize(&text).unwrap().report_summary;
        assert_eq!(summary.total_accounts, Some(9.0));
        assert_eq!(summary.active_accounts, Some(3.0));
        // Missing siblings stay independent
        assert_eq!(summary.closed_accounts, None);
        assert_eq!(summary.current_balance_amount, None);
    }
}

#[cfg(test)]
mod reader_integration_tests {
    use super::*;

    #[test]
    fn test_renamed_document_element_still_resolves() {
        let text = "<Report><CreditProfileHeader><ReportNumber>R-1</ReportNumber></CreditProfileHeader></Report>";
        assert_eq!(normalize(text).unwrap().report_number.as_deref(), Some("R-1"));

        // Repeated document elements read the first one
        let text = "<INProfileResponse><Header><ReportNumber>A</ReportNumber></Header></INProfileResponse>\
                    <INProfileResponse><Header><ReportNumber>B</ReportNumber></Header></INProfileResponse>";
        assert_eq!(normalize(text).unwrap().report_number.as_deref(), Some("A"));
    }

    #[test]
    fn test_unwrapped_tree_is_its_own_root() {
        let tree = serde_json::json!({"CreditProfileHeader": {"ReportNumber": "R-1"}});
        assert_eq!(normalize_tree(&tree).report_number.as_deref(), Some("R-1"));
    }

    #[test]
    fn test_normalizer_does_not_rely_on_reader_coercion() {
        let strict = ReportNormalizer::new(ReaderOptions {
            parse_values: false,
            ..ReaderOptions::default()
        });
        assert_eq!(strict.normalize(SAMPLE).unwrap(), normalize(SAMPLE).unwrap());
    }

    #[test]
    fn test_malformed_document_is_reported() {
        match normalize("<INProfileResponse><Header></INProfileResponse>") {
            Err(ReportError::MalformedDocument { message, .. }) => assert!(!message.is_empty()),
            other => panic!("expected MalformedDocument, got {:?}", other),
        }
    }

    #[test]
    fn test_score_with_attribute_uses_text() {
        let tree = read_document(&doc(
            "<SCORE><BureauScore type=\"v2\">812</BureauScore></SCORE>",
        ))
        .unwrap();
        assert_eq!(normalize_tree(&tree).credit_score, Some(812.0));
    }
}
