use chrono::NaiveDate;

use crate::models::transaction::{Category, Transaction, TransactionType};

/// Criteria for narrowing a ledger snapshot. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub category: Option<Category>,
    pub kind: Option<TransactionType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub text: Option<String>,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(category) = self.category {
            if transaction.category != category {
                return false;
            }
        }

        if let Some(kind) = self.kind {
            if transaction.kind != kind {
                return false;
            }
        }

        if let Some(from) = self.from {
            if transaction.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if transaction.date > to {
                return false;
            }
        }

        if let Some(ref text) = self.text {
            if !matches_text(transaction, text) {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|transaction| self.matches(transaction))
            .cloned()
            .collect()
    }
}

/// Case-insensitive substring match over description, category and payment method.
/// A blank query matches every transaction.
pub fn matches_text(transaction: &Transaction, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    transaction.description.to_lowercase().contains(&needle)
        || transaction.category.as_str().contains(&needle)
        || transaction.payment_method.as_str().contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::PaymentMethod;
    use crate::models::transaction::TransactionType::{Expense, Income};
    use rust_decimal::Decimal;

    fn create_test_transaction(
        id: u64,
        day: u32,
        description: &str,
        category: Category,
        kind: TransactionType,
    ) -> Transaction {
        Transaction::new(
            id,
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            description.to_string(),
            category,
            kind,
            Decimal::new(10050, 2),
            PaymentMethod::Upi,
        )
    }

    fn fixture() -> Vec<Transaction> {
        vec![
            create_test_transaction(1, 15, "Grocery Shopping", Category::Food, Expense),
            create_test_transaction(2, 14, "Monthly Salary", Category::Salary, Income),
            create_test_transaction(3, 12, "Restaurant", Category::Food, Expense),
            create_test_transaction(4, 11, "Fuel Station", Category::Transport, Expense),
        ]
    }

    #[test]
    fn test_default_filter_matches_everything() {
        let transactions = fixture();
        assert_eq!(TransactionFilter::default().apply(&transactions).len(), 4);
    }

    #[test]
    fn test_filter_by_category_and_type() {
        let transactions = fixture();
        let filter = TransactionFilter {
            category: Some(Category::Food),
            kind: Some(TransactionType::Expense),
            ..Default::default()
        };

        let result = filter.apply(&transactions);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, 1);
        assert_eq!(result[1].id, 3);
    }

    #[test]
    fn test_filter_date_range_is_inclusive() {
        let transactions = fixture();
        let filter = TransactionFilter {
            from: NaiveDate::from_ymd_opt(2024, 1, 12),
            to: NaiveDate::from_ymd_opt(2024, 1, 14),
            ..Default::default()
        };

        let ids: Vec<u64> = filter.apply(&transactions).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_text_search_is_case_insensitive() {
        let transactions = fixture();
        assert!(matches_text(&transactions[0], "GROCERY"));
        assert!(matches_text(&transactions[1], "salary"));
        assert!(!matches_text(&transactions[2], "fuel"));
    }

    #[test]
    fn test_text_search_covers_category_and_payment_method() {
        let transactions = fixture();
        assert!(matches_text(&transactions[3], "transport"));
        assert!(matches_text(&transactions[3], "UPI"));
    }

    #[test]
    fn test_blank_text_matches_all() {
        let transactions = fixture();
        assert!(transactions.iter().all(|t| matches_text(t, "   ")));
    }
}
