use std::io::Read;

use crate::{classifier, error::ReportError, ingest, layout, transaction::TransactionRecord};

/// Classifies the given records and renders the report for them, embedding the
/// given display name in the identity line. This is the operation the callers
/// are expected to present as "report generation failed" when it errors; the
/// returned error chains the underlying cause for the logs.
pub fn generate(
    transactions: &[TransactionRecord],
    username: &str,
) -> Result<Vec<u8>, ReportError> {
    let incomes = classifier::filter_incomes(transactions);
    let self_transfers = classifier::filter_self_transfers(transactions);
    log::info!(
        "Rendering the report of {} transactions ({} incomes, {} self-transfers) for {}",
        transactions.len(),
        incomes.len(),
        self_transfers.len(),
        username
    );

    layout::render(&incomes, &self_transfers, transactions, username)
        .map_err(|error| ReportError::with_error("Failed to generate the transaction report", &error))
}

/// Reads the transactions from the given CSV source and generates the report
/// for them, see `generate`.
pub fn generate_from_csv<R: Read>(reader: R, username: &str) -> Result<Vec<u8>, ReportError> {
    let transactions = ingest::read_transactions(reader)?;
    generate(&transactions, username)
}
