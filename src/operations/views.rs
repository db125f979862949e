//! Derived views over a ledger snapshot.
//!
//! Every function here is a pure function of the slice it is given: nothing
//! is cached, and each call scans the full snapshot again. Totals saturate at
//! `Decimal::MAX` instead of overflowing.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use crate::models::budget::Budgets;
use crate::models::transaction::{Category, PaymentMethod, Transaction, TransactionType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_balance: Decimal,
    pub transaction_count: usize,
    /// Mean absolute amount across all records, zero for an empty snapshot.
    pub average_transaction: Decimal,
}

/// Record count and summed amount for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupTotals {
    pub count: usize,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlyTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub count: usize,
}

impl MonthlyTotals {
    pub fn net(&self) -> Decimal {
        self.income.saturating_sub(self.expenses)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlySpend {
    /// `YYYY-MM`
    pub month: String,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetStatus {
    pub budget: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// `None` when the budget is zero or the ratio is too large to represent.
    pub percentage_used: Option<Decimal>,
    pub over_budget: bool,
}

impl BudgetStatus {
    fn new(budget: Decimal, spent: Decimal) -> Self {
        let percentage_used = if budget.is_zero() {
            None
        } else {
            spent
                .checked_div(budget)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .map(|percentage| percentage.round_dp(2))
        };

        Self {
            budget,
            spent,
            remaining: budget.saturating_sub(spent),
            percentage_used,
            over_budget: spent > budget,
        }
    }
}

pub fn summary(transactions: &[Transaction]) -> Summary {
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;

    for transaction in transactions {
        match transaction.kind {
            TransactionType::Income => {
                total_income = total_income.saturating_add(transaction.amount.abs())
            }
            TransactionType::Expense => {
                total_expenses = total_expenses.saturating_add(transaction.amount.abs())
            }
        }
    }

    let transaction_count = transactions.len();
    let average_transaction = if transaction_count == 0 {
        Decimal::ZERO
    } else {
        total_income.saturating_add(total_expenses) / Decimal::from(transaction_count)
    };

    Summary {
        total_income,
        total_expenses,
        net_balance: total_income.saturating_sub(total_expenses),
        transaction_count,
        average_transaction,
    }
}

/// The `limit` latest records: newest date first, then highest id.
pub fn most_recent(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut records = transactions.to_vec();
    records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    records.truncate(limit);
    records
}

/// Count and total per category present, across both income and expenses.
pub fn category_breakdown(transactions: &[Transaction]) -> BTreeMap<Category, GroupTotals> {
    let mut breakdown: BTreeMap<Category, GroupTotals> = BTreeMap::new();
    for transaction in transactions {
        let entry = breakdown.entry(transaction.category).or_default();
        entry.count += 1;
        entry.total = entry.total.saturating_add(transaction.amount.abs());
    }
    breakdown
}

pub fn payment_method_breakdown(
    transactions: &[Transaction],
) -> BTreeMap<PaymentMethod, GroupTotals> {
    let mut breakdown: BTreeMap<PaymentMethod, GroupTotals> = BTreeMap::new();
    for transaction in transactions {
        let entry = breakdown.entry(transaction.payment_method).or_default();
        entry.count += 1;
        entry.total = entry.total.saturating_add(transaction.amount.abs());
    }
    breakdown
}

/// Income, expenses and count per `YYYY-MM`, in chronological order.
pub fn monthly_breakdown(transactions: &[Transaction]) -> BTreeMap<String, MonthlyTotals> {
    let mut months: BTreeMap<String, MonthlyTotals> = BTreeMap::new();
    for transaction in transactions {
        let entry = months.entry(transaction.month_key()).or_default();
        match transaction.kind {
            TransactionType::Income => {
                entry.income = entry.income.saturating_add(transaction.amount)
            }
            TransactionType::Expense => {
                entry.expenses = entry.expenses.saturating_add(transaction.amount)
            }
        }
        entry.count += 1;
    }
    months
}

/// Category with the largest expense total.
///
/// Equal totals resolve to the category whose id sorts first. `None` when
/// the snapshot has no expenses.
pub fn top_category(transactions: &[Transaction]) -> Option<Category> {
    let mut expenses: BTreeMap<Category, Decimal> = BTreeMap::new();
    for transaction in transactions.iter().filter(|t| t.is_expense()) {
        let total = expenses.entry(transaction.category).or_insert(Decimal::ZERO);
        *total = total.saturating_add(transaction.amount.abs());
    }

    expenses
        .into_iter()
        .max_by(|(a_category, a_total), (b_category, b_total)| {
            a_total
                .cmp(b_total)
                .then_with(|| b_category.as_str().cmp(a_category.as_str()))
        })
        .map(|(category, _)| category)
}

pub fn monthly_expenses(transactions: &[Transaction], year: i32, month: u32) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.is_expense() && t.date.year() == year && t.date.month() == month)
        .map(|t| t.amount.abs())
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Expense totals for the `months` calendar months ending with the month of
/// `last_month`, oldest first. Months without expenses are reported as zero.
pub fn spending_trend(
    transactions: &[Transaction],
    last_month: NaiveDate,
    months: u32,
) -> Vec<MonthlySpend> {
    let Some(anchor) = last_month.with_day(1) else {
        return Vec::new();
    };

    (0..months)
        .rev()
        .filter_map(|back| anchor.checked_sub_months(Months::new(back)))
        .map(|month_start| MonthlySpend {
            month: month_start.format("%Y-%m").to_string(),
            expenses: monthly_expenses(transactions, month_start.year(), month_start.month()),
        })
        .collect()
}

/// How much of the monthly budget the expenses of `year`-`month` used up.
pub fn budget_status(
    transactions: &[Transaction],
    monthly_budget: Decimal,
    year: i32,
    month: u32,
) -> BudgetStatus {
    BudgetStatus::new(monthly_budget, monthly_expenses(transactions, year, month))
}

/// Status of every category that has a budget, against all expenses filed under it.
pub fn category_budget_status(
    transactions: &[Transaction],
    budgets: &Budgets,
) -> BTreeMap<Category, BudgetStatus> {
    budgets
        .categories
        .iter()
        .map(|(category, budget)| {
            let spent = transactions
                .iter()
                .filter(|t| t.is_expense() && t.category == *category)
                .map(|t| t.amount.abs())
                .fold(Decimal::ZERO, Decimal::saturating_add);
            (*category, BudgetStatus::new(*budget, spent))
        })
        .collect()
}
