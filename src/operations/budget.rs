use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::info;

use crate::db::KeyValueStore;
use crate::db::budget_repository::{load_budgets, save_budgets};
use crate::error::{Error, Result};
use crate::models::budget::CategoryBudget;
use crate::models::transaction::{Category, MAX_AMOUNT};

fn parse_budget_amount(amount_str: &str) -> Result<Decimal> {
    let amount = Decimal::from_str(amount_str.trim()).map_err(|_| {
        Error::Validation(format!(
            "Invalid budget amount '{}'. Must be a valid number",
            amount_str
        ))
    })?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::NegativeBudget);
    }
    if amount > MAX_AMOUNT {
        return Err(Error::AmountTooLarge { max: MAX_AMOUNT });
    }
    Ok(amount)
}

fn parse_category(category: &str) -> Result<Category> {
    if category.trim().is_empty() {
        return Err(Error::Validation("Category cannot be empty".to_string()));
    }
    Category::from_str(category)
}

pub fn set_monthly_budget<S: KeyValueStore + ?Sized>(
    storage: &mut S,
    amount_str: &str,
) -> Result<()> {
    let amount = parse_budget_amount(amount_str)?;
    let mut budgets = load_budgets(storage)?;
    budgets.monthly = Some(amount);
    save_budgets(storage, &budgets)?;
    info!(%amount, "monthly budget set");
    Ok(())
}

pub fn monthly_budget<S: KeyValueStore + ?Sized>(storage: &S) -> Result<Option<Decimal>> {
    Ok(load_budgets(storage)?.monthly)
}

pub fn set_budget<S: KeyValueStore + ?Sized>(
    storage: &mut S,
    category: &str,
    amount_str: &str,
) -> Result<()> {
    let amount = parse_budget_amount(amount_str)?;
    let category = parse_category(category)?;

    let mut budgets = load_budgets(storage)?;
    budgets.categories.insert(category, amount);
    save_budgets(storage, &budgets)
}

/// Adds to a category budget, starting from zero when none is set.
///
/// The result may not exceed [`MAX_AMOUNT`].
pub fn increase_budget<S: KeyValueStore + ?Sized>(
    storage: &mut S,
    category: &str,
    amount_str: &str,
) -> Result<Decimal> {
    let delta = parse_budget_amount(amount_str)?;
    let category = parse_category(category)?;

    let mut budgets = load_budgets(storage)?;
    let current = budgets
        .categories
        .get(&category)
        .copied()
        .unwrap_or(Decimal::ZERO);
    let new_amount = current
        .checked_add(delta)
        .filter(|amount| *amount <= MAX_AMOUNT)
        .ok_or(Error::AmountTooLarge { max: MAX_AMOUNT })?;

    budgets.categories.insert(category, new_amount);
    save_budgets(storage, &budgets)?;
    Ok(new_amount)
}

pub fn decrease_budget<S: KeyValueStore + ?Sized>(
    storage: &mut S,
    category: &str,
    amount_str: &str,
) -> Result<Decimal> {
    let delta = parse_budget_amount(amount_str)?;
    let category = parse_category(category)?;

    let mut budgets = load_budgets(storage)?;
    let current = budgets
        .categories
        .get(&category)
        .copied()
        .unwrap_or(Decimal::ZERO);
    let new_amount = current
        .checked_sub(delta)
        .filter(|amount| *amount >= Decimal::ZERO)
        .ok_or(Error::NegativeBudget)?;

    budgets.categories.insert(category, new_amount);
    save_budgets(storage, &budgets)?;
    Ok(new_amount)
}

pub fn delete_budget<S: KeyValueStore + ?Sized>(storage: &mut S, category: &str) -> Result<()> {
    let category = parse_category(category)?;

    let mut budgets = load_budgets(storage)?;
    if budgets.categories.remove(&category).is_none() {
        return Err(Error::BudgetNotFound(category.to_string()));
    }
    save_budgets(storage, &budgets)
}

/// Category budgets in category order.
pub fn list_budgets<S: KeyValueStore + ?Sized>(storage: &S) -> Result<Vec<CategoryBudget>> {
    Ok(load_budgets(storage)?.category_budgets())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::db::connection::establish_test_connection;
    use crate::db::repository::SqliteStore;

    #[test]
    fn test_set_budget_success() {
        let mut storage = MemoryStore::new();
        let result = set_budget(&mut storage, "Food", "100.50");
        assert!(result.is_ok());

        let budgets = list_budgets(&storage).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].category, Category::Food);
        assert_eq!(budgets[0].amount, Decimal::from_str("100.50").unwrap());
    }

    #[test]
    fn test_set_budget_invalid_amount() {
        let mut storage = MemoryStore::new();
        let result = set_budget(&mut storage, "food", "not-a-number");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid budget amount"));
    }

    #[test]
    fn test_set_budget_negative_amount() {
        let mut storage = MemoryStore::new();
        assert!(matches!(
            set_budget(&mut storage, "food", "-5"),
            Err(Error::NegativeBudget)
        ));
    }

    #[test]
    fn test_set_budget_empty_category() {
        let mut storage = MemoryStore::new();
        let result = set_budget(&mut storage, "", "100");
        assert_eq!(result.unwrap_err().to_string(), "Category cannot be empty");
    }

    #[test]
    fn test_set_budget_unknown_category() {
        let mut storage = MemoryStore::new();
        assert!(set_budget(&mut storage, "Travel", "100").is_err());
        assert!(list_budgets(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_increase_budget_from_zero() {
        let mut storage = MemoryStore::new();
        let amount = increase_budget(&mut storage, "transport", "25.00").unwrap();
        assert_eq!(amount, Decimal::from_str("25.00").unwrap());

        let budgets = list_budgets(&storage).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].category, Category::Transport);
    }

    #[test]
    fn test_increase_budget_existing() {
        let mut storage = MemoryStore::new();
        set_budget(&mut storage, "food", "10").unwrap();

        increase_budget(&mut storage, "food", "5.25").unwrap();

        let budgets = list_budgets(&storage).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount, Decimal::from_str("15.25").unwrap());
    }

    #[test]
    fn test_decrease_budget_success() {
        let mut storage = MemoryStore::new();
        set_budget(&mut storage, "food", "20").unwrap();

        let amount = decrease_budget(&mut storage, "food", "7.50").unwrap();
        assert_eq!(amount, Decimal::from_str("12.50").unwrap());
    }

    #[test]
    fn test_decrease_budget_negative_error() {
        let mut storage = MemoryStore::new();
        set_budget(&mut storage, "food", "5").unwrap();

        let result = decrease_budget(&mut storage, "food", "10");
        assert_eq!(result.unwrap_err().to_string(), "Budget cannot be negative");
        assert_eq!(list_budgets(&storage).unwrap()[0].amount, Decimal::from(5));
    }

    #[test]
    fn test_list_budgets_in_category_order() {
        let mut storage = MemoryStore::new();
        set_budget(&mut storage, "shopping", "3").unwrap();
        set_budget(&mut storage, "food", "1").unwrap();
        set_budget(&mut storage, "transport", "2").unwrap();

        let categories: Vec<Category> = list_budgets(&storage)
            .unwrap()
            .into_iter()
            .map(|b| b.category)
            .collect();
        assert_eq!(
            categories,
            vec![Category::Food, Category::Transport, Category::Shopping]
        );
    }

    #[test]
    fn test_list_budgets_empty() {
        let storage = MemoryStore::new();
        assert!(list_budgets(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_delete_budget_success() {
        let mut storage = MemoryStore::new();
        set_budget(&mut storage, "food", "10").unwrap();

        delete_budget(&mut storage, "food").unwrap();
        assert!(list_budgets(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_delete_budget_not_found() {
        let mut storage = MemoryStore::new();
        let result = delete_budget(&mut storage, "health");
        assert!(matches!(result, Err(Error::BudgetNotFound(ref c)) if c == "health"));
    }

    #[test]
    fn test_monthly_budget_is_kept_apart_from_categories() {
        let mut storage = MemoryStore::new();
        assert_eq!(monthly_budget(&storage).unwrap(), None);

        set_monthly_budget(&mut storage, "30000").unwrap();
        set_budget(&mut storage, "food", "5000").unwrap();

        assert_eq!(monthly_budget(&storage).unwrap(), Some(Decimal::from(30000)));
        assert_eq!(list_budgets(&storage).unwrap().len(), 1);
    }

    #[test]
    fn test_budgets_persist_in_sqlite() {
        let mut storage = SqliteStore::new(establish_test_connection().unwrap());
        set_budget(&mut storage, "utilities", "1500").unwrap();
        set_monthly_budget(&mut storage, "20000").unwrap();

        let budgets = list_budgets(&storage).unwrap();
        assert_eq!(budgets[0].category, Category::Utilities);
        assert_eq!(monthly_budget(&storage).unwrap(), Some(Decimal::from(20000)));
    }

    #[test]
    fn test_budget_amounts_are_capped() {
        let mut storage = MemoryStore::new();
        assert!(matches!(
            set_budget(&mut storage, "Food", "1000000000000.01"),
            Err(Error::AmountTooLarge { .. })
        ));
        assert!(matches!(
            set_monthly_budget(&mut storage, "79228162514264337593543950335"),
            Err(Error::AmountTooLarge { .. })
        ));

        set_budget(&mut storage, "Food", "999999999999").unwrap();
        assert_eq!(increase_budget(&mut storage, "Food", "1").unwrap(), MAX_AMOUNT);
        assert!(matches!(
            increase_budget(&mut storage, "Food", "0.01"),
            Err(Error::AmountTooLarge { .. })
        ));
        assert_eq!(list_budgets(&storage).unwrap()[0].amount, MAX_AMOUNT);
    }

    #[test]
    fn test_increase_oversized_stored_budget_does_not_panic() {
        let mut storage = MemoryStore::new();
        let mut budgets = load_budgets(&storage).unwrap();
        budgets.categories.insert(Category::Food, Decimal::MAX);
        save_budgets(&mut storage, &budgets).unwrap();

        assert!(increase_budget(&mut storage, "Food", "1").is_err());
        assert_eq!(list_budgets(&storage).unwrap()[0].amount, Decimal::MAX);
    }
}
