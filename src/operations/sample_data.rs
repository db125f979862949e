use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::transaction::TransactionType::{self, Expense, Income};
use crate::models::transaction::{Category, PaymentMethod, Transaction};

const SAMPLE: [(u32, &str, Category, TransactionType, i64, PaymentMethod); 12] = [
    (15, "Grocery Shopping", Category::Food, Expense, 2500, PaymentMethod::Debit),
    (14, "Monthly Salary", Category::Salary, Income, 50000, PaymentMethod::Bank),
    (13, "Electric Bill", Category::Utilities, Expense, 1200, PaymentMethod::Upi),
    (12, "Restaurant", Category::Food, Expense, 800, PaymentMethod::Cash),
    (11, "Fuel Station", Category::Transport, Expense, 2000, PaymentMethod::Credit),
    (10, "Freelance Project", Category::Freelance, Income, 15000, PaymentMethod::Bank),
    (9, "Movie Tickets", Category::Entertainment, Expense, 600, PaymentMethod::Upi),
    (8, "Internet Bill", Category::Utilities, Expense, 999, PaymentMethod::Debit),
    (7, "Medical Checkup", Category::Health, Expense, 1500, PaymentMethod::Cash),
    (6, "Online Course", Category::Education, Expense, 2000, PaymentMethod::Upi),
    (5, "Investment Returns", Category::Investment, Income, 3000, PaymentMethod::Bank),
    (4, "Shopping Mall", Category::Shopping, Expense, 3500, PaymentMethod::Credit),
];

/// Twelve January 2024 transactions used by `pocket seed`.
pub fn sample_transactions() -> Vec<Transaction> {
    SAMPLE
        .iter()
        .zip(1u64..)
        .filter_map(|(&(day, description, category, kind, amount, payment_method), id)| {
            let date = NaiveDate::from_ymd_opt(2024, 1, day)?;
            Some(Transaction::new(
                id,
                date,
                description.to_string(),
                category,
                kind,
                Decimal::new(amount, 0),
                payment_method,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_has_unique_ids() {
        let sample = sample_transactions();
        assert_eq!(sample.len(), 12);

        let mut ids: Vec<u64> = sample.iter().map(|t| t.id).collect();
        ids.dedup();
        assert_eq!(ids, (1..=12).collect::<Vec<u64>>());
    }
}
