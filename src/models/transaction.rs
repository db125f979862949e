use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(Error::InvalidValue {
                field: "transaction type",
                value: s.to_string(),
            }),
        }
    }
}

/// The fixed set of categories a transaction can be filed under.
///
/// Variant order is the order categories are listed in breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Utilities,
    Entertainment,
    Health,
    Education,
    Salary,
    Freelance,
    Investment,
    Other,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Utilities,
        Category::Entertainment,
        Category::Health,
        Category::Education,
        Category::Salary,
        Category::Freelance,
        Category::Investment,
        Category::Other,
    ];

    /// Wire identifier, as persisted and exported.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Shopping => "shopping",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Education => "education",
            Category::Salary => "salary",
            Category::Freelance => "freelance",
            Category::Investment => "investment",
            Category::Other => "other",
        }
    }

    /// Human readable name shown on the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "Food & Dining",
            Category::Transport => "Transportation",
            Category::Shopping => "Shopping",
            Category::Utilities => "Utilities",
            Category::Entertainment => "Entertainment",
            Category::Health => "Healthcare",
            Category::Education => "Education",
            Category::Salary => "Salary",
            Category::Freelance => "Freelance",
            Category::Investment => "Investment",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| Error::InvalidValue {
                field: "category",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Debit,
    Credit,
    Upi,
    Bank,
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Cash,
        PaymentMethod::Debit,
        PaymentMethod::Credit,
        PaymentMethod::Upi,
        PaymentMethod::Bank,
        PaymentMethod::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Debit => "debit",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Debit => "Debit Card",
            PaymentMethod::Credit => "Credit Card",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Bank => "Bank Transfer",
            PaymentMethod::Other => "Other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == wanted)
            .ok_or_else(|| Error::InvalidValue {
                field: "payment method",
                value: s.to_string(),
            })
    }
}

/// A single income or expense record in the ledger.
///
/// The sign of a transaction lives in `kind`; `amount` is never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: u64,
    pub date: NaiveDate,
    pub description: String,
    pub category: Category,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl Transaction {
    pub fn new(
        id: u64,
        date: NaiveDate,
        description: String,
        category: Category,
        kind: TransactionType,
        amount: Decimal,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            id,
            date,
            description,
            category,
            kind,
            amount,
            payment_method,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Applies the same amount and description rules as a fresh add.
    pub fn validated(mut self) -> Result<Self> {
        self.amount = validate_amount(self.amount)?;
        self.description = normalize_description(&self.description)?;
        Ok(self)
    }

    /// Year-month bucket (`YYYY-MM`) used by the monthly views.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

/// A transaction that has not been stored yet.
///
/// The store fills in the id, and defaults the date to today and the payment method to cash.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub category: Category,
    pub kind: TransactionType,
    pub amount: Decimal,
    pub payment_method: Option<PaymentMethod>,
}

impl NewTransaction {
    pub fn new(
        description: impl Into<String>,
        category: Category,
        kind: TransactionType,
        amount: Decimal,
    ) -> Self {
        Self {
            date: None,
            description: description.into(),
            category,
            kind,
            amount,
            payment_method: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn paid_with(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = Some(payment_method);
        self
    }
}

/// Partial field update for an existing transaction. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub kind: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub payment_method: Option<PaymentMethod>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        *self == TransactionUpdate::default()
    }

    /// Normalizes the description and checks the amount, if present.
    pub fn validated(mut self) -> Result<Self> {
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(description) = self.description.take() {
            self.description = Some(normalize_description(&description)?);
        }
        Ok(self)
    }

    pub(crate) fn apply_to(self, transaction: &mut Transaction) {
        if let Some(date) = self.date {
            transaction.date = date;
        }
        if let Some(description) = self.description {
            transaction.description = description;
        }
        if let Some(category) = self.category {
            transaction.category = category;
        }
        if let Some(kind) = self.kind {
            transaction.kind = kind;
        }
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(payment_method) = self.payment_method {
            transaction.payment_method = payment_method;
        }
    }
}

pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Largest amount a single transaction may carry (one trillion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Checks an amount before it enters the ledger.
///
/// Amounts must be non-negative, at most [`MAX_AMOUNT`], and unchanged by the
/// f64 round trip they take through the persisted JSON.
pub fn validate_amount(amount: Decimal) -> Result<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::NegativeAmount(amount));
    }
    if amount > MAX_AMOUNT {
        return Err(Error::AmountTooLarge { max: MAX_AMOUNT });
    }

    let stored = amount
        .to_f64()
        .and_then(|value| Decimal::from_str(&value.to_string()).ok());
    if stored != Some(amount) {
        return Err(Error::ImpreciseAmount(amount));
    }
    Ok(amount)
}

/// Trims a description and enforces [`MAX_DESCRIPTION_LEN`].
pub fn normalize_description(text: &str) -> Result<String> {
    let description = text.trim();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::TooLong {
            field: "Description",
            max: MAX_DESCRIPTION_LEN,
        });
    }
    Ok(description.to_string())
}
