use std::fmt;

use rust_decimal::Decimal;
use time::Date;

/// One financial movement as read from the uploaded file: the day it happened,
/// the two account identifiers involved and the exact amount that was moved.
/// Records are plain values, they are created once during ingestion and only
/// ever read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub date: Date,
    pub account_from: String,
    pub account_to: String,
    pub amount: Decimal,
}

impl TransactionRecord {
    /// The category is derived, never stored: a movement between two distinct
    /// accounts is an income, a movement from an account onto itself is a
    /// self-transfer. Everything that displays a category recomputes it through
    /// this method so the listings and the table can never disagree.
    pub fn category(&self) -> Category {
        if self.account_from == self.account_to {
            Category::SelfTransfer
        } else {
            Category::Income
        }
    }

    /// The single-line form used by the listing sections of the report.
    pub fn summary_line(&self) -> String {
        format!(
            "{} - {} -> {} : ${}",
            self.date, self.account_from, self.account_to, self.amount
        )
    }
}

/// The derived classification of a record, see `TransactionRecord::category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Income,
    SelfTransfer,
}

impl fmt::Display for Category {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Income => write!(formatter, "Income"),
            Category::SelfTransfer => write!(formatter, "SelfTransfer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::Month;

    use super::*;

    fn record(account_from: &str, account_to: &str) -> TransactionRecord {
        TransactionRecord {
            date: Date::from_calendar_date(2024, Month::March, 5).unwrap(),
            account_from: account_from.to_string(),
            account_to: account_to.to_string(),
            amount: "150.75".parse().unwrap(),
        }
    }

    #[test]
    fn category_is_derived_from_the_account_pair() {
        assert_eq!(record("ACC-1", "ACC-2").category(), Category::Income);
        assert_eq!(record("ACC-1", "ACC-1").category(), Category::SelfTransfer);
    }

    #[test]
    fn summary_line_keeps_the_date_arrow_amount_shape() {
        assert_eq!(
            record("ACC-1", "ACC-2").summary_line(),
            "2024-03-05 - ACC-1 -> ACC-2 : $150.75"
        );
    }
}
