use crate::transaction::{Category, TransactionRecord};

/// Returns the sub-sequence of records whose source and destination accounts
/// differ, in their original relative order.
pub fn filter_incomes(records: &[TransactionRecord]) -> Vec<TransactionRecord> {
    records
        .iter()
        .filter(|record| record.category() == Category::Income)
        .cloned()
        .collect()
}

/// Returns the complementary sub-sequence of records whose source and
/// destination accounts coincide, in their original relative order. Together
/// with `filter_incomes` this partitions the input: every record lands in
/// exactly one of the two outputs.
pub fn filter_self_transfers(records: &[TransactionRecord]) -> Vec<TransactionRecord> {
    records
        .iter()
        .filter(|record| record.category() == Category::SelfTransfer)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use rust_decimal::Decimal;
    use time::{Date, Month};

    use super::*;

    fn random_records(record_count: usize) -> Vec<TransactionRecord> {
        let mut rng = rand::thread_rng();
        let account_pool = ["ACC-0", "ACC-1", "ACC-2", "ACC-3"];
        (0..record_count)
            .map(|_| {
                let account_from = account_pool[rng.gen_range(0..account_pool.len())];
                // Draw the destination from the same small pool so that collisions,
                // which produce self-transfers, actually happen.
                let account_to = account_pool[rng.gen_range(0..account_pool.len())];
                TransactionRecord {
                    date: Date::from_calendar_date(2024, Month::March, rng.gen_range(1..=28))
                        .unwrap(),
                    account_from: account_from.to_string(),
                    account_to: account_to.to_string(),
                    amount: Decimal::new(rng.gen_range(1..1_000_000), 2),
                }
            })
            .collect()
    }

    #[test]
    fn the_two_filters_partition_the_input() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let records = random_records(rng.gen_range(0..40));
            let mut incomes = filter_incomes(&records).into_iter();
            let mut self_transfers = filter_self_transfers(&records).into_iter();

            // Walking the original sequence and draining the matching filtered
            // sequence reconstructs the input, which proves both the disjointness
            // and the preservation of the relative order.
            for record in &records {
                let filtered = match record.category() {
                    Category::Income => incomes.next(),
                    Category::SelfTransfer => self_transfers.next(),
                };
                assert_eq!(filtered.as_ref(), Some(record));
            }
            assert_eq!(incomes.next(), None);
            assert_eq!(self_transfers.next(), None);
        }
    }

    #[test]
    fn filter_membership_agrees_with_the_derived_category() {
        let records = random_records(30);
        for record in filter_incomes(&records) {
            assert_eq!(record.category(), Category::Income);
            assert_ne!(record.account_from, record.account_to);
        }
        for record in filter_self_transfers(&records) {
            assert_eq!(record.category(), Category::SelfTransfer);
            assert_eq!(record.account_from, record.account_to);
        }
    }
}
