use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use super::import::DataFormat;
use crate::error::Result;
use crate::models::transaction::Transaction;

pub const CSV_HEADER: [&str; 6] = [
    "Date",
    "Description",
    "Category",
    "Type",
    "Payment Method",
    "Amount",
];

/// Writes the records as CSV. Fields containing commas, quotes or newlines are quoted.
pub fn write_csv<W: Write>(transactions: &[Transaction], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADER)?;

    for transaction in transactions {
        writer.write_record([
            transaction.date.to_string(),
            transaction.description.clone(),
            transaction.category.to_string(),
            transaction.kind.to_string(),
            transaction.payment_method.to_string(),
            transaction.amount.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(transactions: &[Transaction], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, transactions)?;
    Ok(())
}

pub fn export_transactions<W: Write>(
    transactions: &[Transaction],
    format: DataFormat,
    writer: W,
) -> Result<()> {
    match format {
        DataFormat::Csv => write_csv(transactions, writer),
        DataFormat::Json => write_json(transactions, writer),
    }
}

pub fn export_to_string(transactions: &[Transaction], format: DataFormat) -> Result<String> {
    let mut buffer = Vec::new();
    export_transactions(transactions, format, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn export_to_path(
    transactions: &[Transaction],
    format: DataFormat,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    export_transactions(transactions, format, file)?;
    info!(count = transactions.len(), path = %path.display(), "transactions exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::{Category, PaymentMethod, TransactionType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn transaction(description: &str) -> Transaction {
        Transaction::new(
            1,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            description.to_string(),
            Category::Food,
            TransactionType::Expense,
            Decimal::new(250050, 2),
            PaymentMethod::Debit,
        )
    }

    #[test]
    fn test_csv_header_and_row() {
        let csv = export_to_string(&[transaction("Grocery Shopping")], DataFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Date,Description,Category,Type,Payment Method,Amount");
        assert_eq!(lines[1], "2024-01-15,Grocery Shopping,food,expense,debit,2500.50");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_csv_quotes_embedded_commas() {
        let csv = export_to_string(&[transaction("Dinner, drinks")], DataFormat::Csv).unwrap();
        assert!(csv.contains("\"Dinner, drinks\""));
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let csv = export_to_string(&[], DataFormat::Csv).unwrap();
        assert_eq!(csv.trim_end(), "Date,Description,Category,Type,Payment Method,Amount");
    }

    #[test]
    fn test_json_export_uses_stored_field_names() {
        let json = export_to_string(&[transaction("Grocery Shopping")], DataFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["paymentMethod"], "debit");
        assert_eq!(value[0]["type"], "expense");
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export_to_path(&[transaction("Grocery Shopping")], DataFormat::Csv, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Date,Description"));
    }
}
