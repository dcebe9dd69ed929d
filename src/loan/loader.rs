//! Load loan batches from CSV
//!
//! Expected columns: `LoanId,Principal,AprPercent,TermMonths,ExtraMonthly`
//! (`ExtraMonthly` may be left empty).

use super::{LoanRecord, LoanSpec};
use crate::error::ExportError;
use crate::inputs::validate_loan;
use csv::Reader;
use std::path::Path;

/// Raw CSV row matching the batch file columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "LoanId")]
    loan_id: String,
    #[serde(rename = "Principal")]
    principal: f64,
    #[serde(rename = "AprPercent")]
    apr_percent: f64,
    #[serde(rename = "TermMonths")]
    term_months: u32,
    #[serde(rename = "ExtraMonthly", default)]
    extra_monthly: Option<f64>,
}

impl CsvRow {
    fn into_record(self, row: usize) -> Result<LoanRecord, ExportError> {
        let spec = LoanSpec::new(self.principal, self.term_months)
            .with_extra(self.extra_monthly.unwrap_or(0.0));
        validate_loan(&spec, self.apr_percent).map_err(|source| ExportError::Record { row, source })?;

        Ok(LoanRecord {
            loan_id: self.loan_id,
            spec,
            apr_percent: self.apr_percent,
        })
    }
}

/// Load all loans from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<Vec<LoanRecord>, ExportError> {
    let reader = Reader::from_path(path)?;
    collect_records(reader)
}

/// Load loans from any reader (e.g., string buffer, request body)
pub fn load_loans_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LoanRecord>, ExportError> {
    collect_records(Reader::from_reader(reader))
}

fn collect_records<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<LoanRecord>, ExportError> {
    let mut loans = Vec::new();

    for (idx, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        // Data rows are numbered from 1, after the header
        loans.push(row.into_record(idx + 1)?);
    }

    log::debug!("loaded {} loans", loans.len());
    Ok(loans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;

    #[test]
    fn test_load_loans() {
        let data = "\
LoanId,Principal,AprPercent,TermMonths,ExtraMonthly
home,350000,6.75,360,
car,28000,7.9,60,50
school,42000,5.5,120,0
";
        let loans = load_loans_from_reader(data.as_bytes()).expect("valid batch");
        assert_eq!(loans.len(), 3);

        assert_eq!(loans[0].loan_id, "home");
        assert_eq!(loans[0].spec.term_months, 360);
        assert_eq!(loans[0].spec.extra_monthly, 0.0);

        assert_eq!(loans[1].apr_percent, 7.9);
        assert_eq!(loans[1].spec.extra_monthly, 50.0);
    }

    #[test]
    fn test_invalid_row_reports_position() {
        let data = "\
LoanId,Principal,AprPercent,TermMonths,ExtraMonthly
ok,1000,5,12,0
bad,-5,5,12,0
";
        let err = load_loans_from_reader(data.as_bytes()).unwrap_err();
        match err {
            ExportError::Record { row, source } => {
                assert_eq!(row, 2);
                assert!(matches!(source, InputError::NotPositive { field: "principal", .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_number_is_csv_error() {
        let data = "LoanId,Principal,AprPercent,TermMonths,ExtraMonthly\nx,abc,5,12,0\n";
        assert!(matches!(
            load_loans_from_reader(data.as_bytes()),
            Err(ExportError::Csv(_))
        ));
    }
}
