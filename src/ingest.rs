use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use time::{format_description::FormatItem, macros::format_description, Date};

use crate::{error::ReportError, transaction::TransactionRecord};

/// The format transaction dates are written in, for example `2024-03-05`.
const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// One row of the uploaded file as it appears on disk, before any validation.
/// The date and the amount stay strings here so that a malformed value can be
/// reported with the line it came from instead of failing inside serde.
#[derive(Debug, Deserialize)]
struct RawRecord {
    date: String,
    account_from: String,
    account_to: String,
    amount: String,
}

/// Reads the CSV with the header `date,account_from,account_to,amount` into
/// validated transaction records. A record with an empty account identifier, an
/// unparsable date or an unparsable amount rejects the whole ingestion, so the
/// layout engine only ever sees well-formed records.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<TransactionRecord>, ReportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (record_index, raw_record) in csv_reader.deserialize::<RawRecord>().enumerate() {
        // The header occupies the first line of the file.
        let line = record_index + 2;
        let raw_record = raw_record.map_err(|error| {
            ReportError::with_error(format!("Unable to parse the record on line {}", line), &error)
        })?;
        records.push(convert_raw_record(raw_record, line)?);
    }
    log::debug!("Ingested {} transaction records", records.len());

    Ok(records)
}

fn convert_raw_record(raw_record: RawRecord, line: usize) -> Result<TransactionRecord, ReportError> {
    if raw_record.account_from.is_empty() {
        return Err(ReportError::with_context(format!(
            "The record on line {} has an empty source account",
            line
        )));
    }
    if raw_record.account_to.is_empty() {
        return Err(ReportError::with_context(format!(
            "The record on line {} has an empty destination account",
            line
        )));
    }
    let date = Date::parse(&raw_record.date, DATE_FORMAT).map_err(|error| {
        ReportError::with_error(
            format!(
                "The record on line {} has an invalid date {:?}",
                line, raw_record.date
            ),
            &error,
        )
    })?;
    let amount = raw_record.amount.parse::<Decimal>().map_err(|error| {
        ReportError::with_error(
            format!(
                "The record on line {} has an invalid amount {:?}",
                line, raw_record.amount
            ),
            &error,
        )
    })?;

    Ok(TransactionRecord {
        date,
        account_from: raw_record.account_from,
        account_to: raw_record.account_to,
        amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_files_are_ingested_in_order() {
        let file_content = "\
date,account_from,account_to,amount
2024-03-01, ACC-1 ,ACC-2,150.75
2024-03-02,ACC-3,ACC-3,19.99
";
        let records = read_transactions(file_content.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        // Surrounding whitespace is trimmed away during ingestion.
        assert_eq!(records[0].account_from, "ACC-1");
        assert_eq!(records[0].amount, "150.75".parse().unwrap());
        assert_eq!(records[1].date.to_string(), "2024-03-02");
    }

    #[test]
    fn empty_account_identifiers_are_rejected() {
        let file_content = "\
date,account_from,account_to,amount
2024-03-01,ACC-1,ACC-2,150.75
2024-03-02,,ACC-2,10.00
";
        let error = read_transactions(file_content.as_bytes()).unwrap_err();
        assert!(error.to_string().contains("line 3"));
        assert!(error.to_string().contains("source account"));
    }

    #[test]
    fn unparsable_dates_are_rejected() {
        let file_content = "\
date,account_from,account_to,amount
03/01/2024,ACC-1,ACC-2,150.75
";
        let error = read_transactions(file_content.as_bytes()).unwrap_err();
        assert!(error.to_string().contains("invalid date"));
    }

    #[test]
    fn unparsable_amounts_are_rejected() {
        let file_content = "\
date,account_from,account_to,amount
2024-03-01,ACC-1,ACC-2,lots
";
        let error = read_transactions(file_content.as_bytes()).unwrap_err();
        assert!(error.to_string().contains("invalid amount"));
    }

    #[test]
    fn rows_with_missing_fields_are_rejected() {
        let file_content = "\
date,account_from,account_to,amount
2024-03-01,ACC-1,ACC-2
";
        let error = read_transactions(file_content.as_bytes()).unwrap_err();
        assert!(error.to_string().contains("line 2"));
    }
}
