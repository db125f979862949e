use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use super::add::{RawTransaction, create_transaction};
use super::export::CSV_HEADER;
use super::ledger::LedgerStore;
use crate::db::KeyValueStore;
use crate::error::{Error, Result};
use crate::models::transaction::{NewTransaction, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DataFormat {
    Csv,
    Json,
}

/// Outcome of an import: rows stored and rows dropped as malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Candidates parsed from an import source, before they reach the ledger.
#[derive(Debug, Default)]
pub struct ParsedRows {
    pub candidates: Vec<NewTransaction>,
    pub skipped: usize,
}

/// Stored records decoded from a JSON array.
#[derive(Debug, Default)]
pub struct DecodedRecords {
    pub records: Vec<Transaction>,
    pub skipped: usize,
}

pub fn import_transactions<S: KeyValueStore>(
    ledger: &mut LedgerStore<S>,
    format: DataFormat,
    path: impl AsRef<Path>,
) -> Result<ImportSummary> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let summary = import_from_reader(ledger, format, file)?;
    info!(
        imported = summary.imported,
        skipped = summary.skipped,
        path = %path.display(),
        "import finished"
    );
    Ok(summary)
}

/// Parses every row first, then appends the valid ones with one persistence write.
pub fn import_from_reader<S: KeyValueStore, R: Read>(
    ledger: &mut LedgerStore<S>,
    format: DataFormat,
    reader: R,
) -> Result<ImportSummary> {
    let parsed = match format {
        DataFormat::Csv => parse_csv(reader),
        DataFormat::Json => parse_json(reader)?,
    };

    let imported = if parsed.candidates.is_empty() {
        0
    } else {
        ledger.add_many(parsed.candidates)?.len()
    };

    Ok(ImportSummary {
        imported,
        skipped: parsed.skipped,
    })
}

/// Reads CSV with a header row. Rows without exactly six fields, or with values
/// that fail validation, are skipped and counted.
pub fn parse_csv<R: Read>(reader: R) -> ParsedRows {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut parsed = ParsedRows::default();

    for (row_index, result) in reader.records().enumerate() {
        // Line 1 is the header
        let line = row_index + 2;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(line, "Skipping unreadable CSV row: {}", e);
                parsed.skipped += 1;
                continue;
            }
        };

        if record.len() != CSV_HEADER.len() {
            warn!(
                line,
                expected = CSV_HEADER.len(),
                found = record.len(),
                "Skipping CSV row with wrong number of columns"
            );
            parsed.skipped += 1;
            continue;
        }

        let raw = RawTransaction {
            date: record.get(0).unwrap_or(""),
            description: record.get(1).unwrap_or(""),
            category: record.get(2).unwrap_or(""),
            kind: record.get(3).unwrap_or(""),
            payment_method: record.get(4).unwrap_or(""),
            amount: record.get(5).unwrap_or(""),
        };

        match create_transaction(&raw) {
            Ok(candidate) => parsed.candidates.push(candidate),
            Err(e) => {
                warn!(line, "Skipping invalid CSV row: {}", e);
                parsed.skipped += 1;
            }
        }
    }

    parsed
}

/// Reads a JSON array of records as produced by the JSON export.
/// Ids in the source are ignored; the ledger assigns fresh ones.
pub fn parse_json<R: Read>(mut reader: R) -> Result<ParsedRows> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    let decoded = decode_json_records(&raw)?;

    let candidates = decoded
        .records
        .into_iter()
        .map(|record| NewTransaction {
            date: Some(record.date),
            description: record.description,
            category: record.category,
            kind: record.kind,
            amount: record.amount,
            payment_method: Some(record.payment_method),
        })
        .collect();

    Ok(ParsedRows {
        candidates,
        skipped: decoded.skipped,
    })
}

/// Decodes a JSON array of stored records.
///
/// Fails only when the text is not a JSON array at all. Entries with unknown
/// enum values or missing fields are skipped, as are entries whose amount or
/// description a fresh add would reject. Kept descriptions come back trimmed.
pub fn decode_json_records(raw: &str) -> Result<DecodedRecords> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    let mut decoded = DecodedRecords::default();

    for (index, entry) in entries.into_iter().enumerate() {
        let record = serde_json::from_value::<Transaction>(entry)
            .map_err(Error::from)
            .and_then(Transaction::validated);
        match record {
            Ok(record) => decoded.records.push(record),
            Err(e) => {
                warn!(index, "Skipping invalid record: {}", e);
                decoded.skipped += 1;
            }
        }
    }

    Ok(decoded)
}
