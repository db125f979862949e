use tracing::{debug, warn};

use super::{BUDGETS_KEY, KeyValueStore};
use crate::error::Result;
use crate::models::budget::Budgets;

/// Reads the persisted budgets. Missing or unreadable data yields empty budgets.
pub fn load_budgets<S: KeyValueStore + ?Sized>(storage: &S) -> Result<Budgets> {
    let Some(raw) = storage.get(BUDGETS_KEY)? else {
        return Ok(Budgets::default());
    };

    match serde_json::from_str(&raw) {
        Ok(budgets) => Ok(budgets),
        Err(e) => {
            warn!("Discarding unreadable budgets: {}", e);
            Ok(Budgets::default())
        }
    }
}

pub fn save_budgets<S: KeyValueStore + ?Sized>(storage: &mut S, budgets: &Budgets) -> Result<()> {
    let raw = serde_json::to_string(budgets)?;
    storage.set(BUDGETS_KEY, &raw)?;
    debug!(categories = budgets.categories.len(), "budgets saved");
    Ok(())
}
