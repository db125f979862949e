//! The ledger store: sole owner of the transaction collection.
//!
//! `LedgerStore` keeps every record in memory and rewrites the whole collection
//! to its [`KeyValueStore`] after each mutation. A mutation only reaches memory
//! once that write has succeeded. Queries hand out copies, so callers can never
//! reach the store's internal state through them.

use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use super::import::decode_json_records;
use super::sample_data::sample_transactions;
use super::search::{TransactionFilter, matches_text};
use super::views::most_recent;
use crate::db::{KeyValueStore, TRANSACTIONS_KEY};
use crate::error::{Error, Result};
use crate::models::transaction::{
    Category, NewTransaction, Transaction, TransactionType, TransactionUpdate,
    normalize_description, validate_amount,
};

pub struct LedgerStore<S: KeyValueStore> {
    storage: S,
    transactions: Vec<Transaction>,
    next_id: u64,
}

impl<S: KeyValueStore> LedgerStore<S> {
    /// Creates the store and loads whatever the storage currently holds.
    pub fn open(storage: S) -> Result<Self> {
        let mut store = Self {
            storage,
            transactions: Vec::new(),
            next_id: 1,
        };
        store.load()?;
        Ok(store)
    }

    /// Replaces the in-memory collection with the persisted one.
    ///
    /// A missing blob starts an empty ledger. An unreadable blob also yields an
    /// empty ledger; individual invalid records are dropped.
    pub fn load(&mut self) -> Result<()> {
        self.transactions = match self.storage.get(TRANSACTIONS_KEY)? {
            Some(raw) => match decode_json_records(&raw) {
                Ok(decoded) => {
                    if decoded.skipped > 0 {
                        warn!(
                            skipped = decoded.skipped,
                            "Dropped invalid transactions from storage"
                        );
                    }
                    decoded.records
                }
                Err(e) => {
                    warn!("Stored transactions are unreadable, starting empty: {}", e);
                    Vec::new()
                }
            },
            None => {
                self.persist(&[])?;
                Vec::new()
            }
        };

        self.next_id = next_id_after(&self.transactions);
        self.reassign_invalid_ids();

        debug!(count = self.transactions.len(), next_id = self.next_id, "ledger loaded");
        Ok(())
    }

    /// Stores a new transaction at the head of the ledger.
    pub fn add(&mut self, candidate: NewTransaction) -> Result<Transaction> {
        self.add_on(candidate, today())
    }

    /// Same as [`LedgerStore::add`] with an explicit date for candidates that lack one.
    pub fn add_on(&mut self, candidate: NewTransaction, today: NaiveDate) -> Result<Transaction> {
        let mut next_id = self.next_id;
        let transaction = assign(candidate, today, &mut next_id)?;

        let mut records = Vec::with_capacity(self.transactions.len() + 1);
        records.push(transaction.clone());
        records.extend(self.transactions.iter().cloned());
        self.commit(records, next_id)?;

        debug!(id = transaction.id, "transaction added");
        Ok(transaction)
    }

    /// Appends several transactions in order with a single persistence write.
    ///
    /// Every candidate is validated before any of them is stored.
    pub fn add_many(&mut self, candidates: Vec<NewTransaction>) -> Result<Vec<Transaction>> {
        let today = today();
        let mut next_id = self.next_id;
        let added = candidates
            .into_iter()
            .map(|candidate| assign(candidate, today, &mut next_id))
            .collect::<Result<Vec<_>>>()?;

        let mut records = self.transactions.clone();
        records.extend(added.iter().cloned());
        self.commit(records, next_id)?;

        info!(count = added.len(), "transactions appended");
        Ok(added)
    }

    /// Merges `update` into the matching transaction.
    ///
    /// Returns `Ok(None)` when no transaction has that id.
    pub fn update(&mut self, id: u64, update: TransactionUpdate) -> Result<Option<Transaction>> {
        let update = update.validated()?;

        let Some(pos) = self.transactions.iter().position(|t| t.id == id) else {
            debug!(id, "update on unknown transaction");
            return Ok(None);
        };
        let mut records = self.transactions.clone();
        update.apply_to(&mut records[pos]);
        let updated = records[pos].clone();
        self.commit(records, self.next_id)?;

        debug!(id, "transaction updated");
        Ok(Some(updated))
    }

    /// Deletes the matching transaction. Returns `false` when no transaction has that id.
    pub fn remove(&mut self, id: u64) -> Result<bool> {
        let Some(pos) = self.transactions.iter().position(|t| t.id == id) else {
            debug!(id, "remove on unknown transaction");
            return Ok(false);
        };
        let mut records = self.transactions.clone();
        records.remove(pos);
        self.commit(records, self.next_id)?;

        debug!(id, "transaction removed");
        Ok(true)
    }

    /// Snapshot of the whole ledger.
    pub fn all(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn get(&self, id: u64) -> Option<Transaction> {
        self.transactions.iter().find(|t| t.id == id).cloned()
    }

    pub fn by_category(&self, category: Category) -> Vec<Transaction> {
        self.filtered(&TransactionFilter {
            category: Some(category),
            ..Default::default()
        })
    }

    pub fn by_type(&self, kind: TransactionType) -> Vec<Transaction> {
        self.filtered(&TransactionFilter {
            kind: Some(kind),
            ..Default::default()
        })
    }

    /// Transactions dated within `start..=end`.
    pub fn by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Transaction> {
        self.filtered(&TransactionFilter {
            from: Some(start),
            to: Some(end),
            ..Default::default()
        })
    }

    pub fn search(&self, query: &str) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| matches_text(t, query))
            .cloned()
            .collect()
    }

    pub fn filtered(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        filter.apply(&self.transactions)
    }

    /// The `limit` latest transactions, newest date first.
    ///
    /// Transactions sharing a date are ordered by id, highest first.
    pub fn recent(&self, limit: usize) -> Vec<Transaction> {
        most_recent(&self.transactions, limit)
    }

    /// Drops every transaction and the persisted blob.
    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove(TRANSACTIONS_KEY)?;
        let dropped = self.transactions.len();
        self.transactions.clear();
        info!(dropped, "ledger cleared");
        Ok(())
    }

    /// Replaces the ledger with the demo dataset.
    pub fn load_sample_data(&mut self) -> Result<()> {
        let records = sample_transactions();
        let next_id = next_id_after(&records);
        self.commit(records, next_id)?;
        info!(count = self.transactions.len(), "sample data loaded");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Stored records whose id repeats an earlier one, or is `u64::MAX`, get a fresh id.
    fn reassign_invalid_ids(&mut self) {
        let mut seen = HashSet::new();
        let mut next_id = self.next_id;
        self.transactions.retain_mut(|transaction| {
            if transaction.id != u64::MAX && seen.insert(transaction.id) {
                return true;
            }
            match allocate_id(&mut next_id) {
                Ok(id) => {
                    warn!(id = transaction.id, new_id = id, "Stored id reassigned");
                    transaction.id = id;
                    seen.insert(id);
                    true
                }
                Err(e) => {
                    warn!(id = transaction.id, "Dropped stored transaction: {}", e);
                    false
                }
            }
        });
        self.next_id = next_id;
    }

    /// Writes `records` and, once that succeeded, makes them the ledger.
    fn commit(&mut self, records: Vec<Transaction>, next_id: u64) -> Result<()> {
        self.persist(&records)?;
        self.transactions = records;
        self.next_id = next_id;
        Ok(())
    }

    fn persist(&mut self, records: &[Transaction]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.storage.set(TRANSACTIONS_KEY, &raw)?;
        debug!(count = records.len(), "ledger persisted");
        Ok(())
    }
}

/// Validates a candidate and gives it the next id.
fn assign(candidate: NewTransaction, today: NaiveDate, next_id: &mut u64) -> Result<Transaction> {
    let amount = validate_amount(candidate.amount)?;
    let description = normalize_description(&candidate.description)?;
    let id = allocate_id(next_id)?;

    Ok(Transaction::new(
        id,
        candidate.date.unwrap_or(today),
        description,
        candidate.category,
        candidate.kind,
        amount,
        candidate.payment_method.unwrap_or_default(),
    ))
}

/// Hands out `next_id` and advances it. `u64::MAX` is never handed out.
fn allocate_id(next_id: &mut u64) -> Result<u64> {
    let id = *next_id;
    if id == u64::MAX {
        return Err(Error::IdsExhausted);
    }
    *next_id = id + 1;
    Ok(id)
}

/// One past the highest id in `records`, or 1 when there is none.
fn next_id_after(records: &[Transaction]) -> u64 {
    records
        .iter()
        .filter_map(|t| t.id.checked_add(1))
        .max()
        .unwrap_or(1)
}

/// Current date in the local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
