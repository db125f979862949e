use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::transaction::{
    Category, NewTransaction, PaymentMethod, TransactionType, normalize_description,
    validate_amount,
};

/// Text fields of a transaction as typed on the command line or read from a CSV row.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawTransaction<'a> {
    pub date: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub kind: &'a str,
    pub payment_method: &'a str,
    pub amount: &'a str,
}

/// Validates raw text fields and turns them into a candidate for the ledger.
///
/// An empty date or payment method is left for the store to default.
pub fn create_transaction(raw: &RawTransaction<'_>) -> Result<NewTransaction> {
    let date = match raw.date.trim() {
        "" => None,
        text => Some(parse_date(text)?),
    };

    let description = parse_description(raw.description)?;
    let category = Category::from_str(raw.category)?;
    let kind = TransactionType::from_str(raw.kind)?;
    let amount = parse_amount(raw.amount)?;

    let payment_method = match raw.payment_method.trim() {
        "" => None,
        text => Some(PaymentMethod::from_str(text)?),
    };

    Ok(NewTransaction {
        date,
        description,
        category,
        kind,
        amount,
        payment_method,
    })
}

/// Trims a description and enforces the length limit.
pub fn parse_description(text: &str) -> Result<String> {
    normalize_description(text)
}

pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidValue {
        field: "date (expected YYYY-MM-DD)",
        value: text.to_string(),
    })
}

/// Parses an amount the ledger can store.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let amount = Decimal::from_str(text.trim())
        .or_else(|_| Decimal::from_scientific(text.trim()))
        .map_err(|_| Error::InvalidValue {
            field: "amount",
            value: text.to_string(),
        })?;
    validate_amount(amount)
}
