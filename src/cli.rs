//! Command-line surface of the `pocket` binary.

use std::io::Write;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

use crate::db::KeyValueStore;
use crate::db::budget_repository::load_budgets;
use crate::error::{Error, Result};
use crate::models::profile::{ProfileUpdate, Registration};
use crate::models::transaction::{
    Category, PaymentMethod, Transaction, TransactionType, TransactionUpdate,
};
use crate::operations::add::{
    RawTransaction, create_transaction, parse_amount, parse_date, parse_description,
};
use crate::operations::budget;
use crate::operations::dashboard::{build_dashboard, run_dashboard};
use crate::operations::export::{export_to_path, export_transactions};
use crate::operations::import::{DataFormat, import_transactions};
use crate::operations::ledger::LedgerStore;
use crate::operations::profile::{
    DEFAULT_COST, change_password, register, update_profile, verify_credentials,
};
use crate::operations::search::TransactionFilter;
use crate::operations::views;

/// Track income and expenses from the terminal.
#[derive(Parser, Debug)]
#[command(name = "pocket", version, about, long_about = None)]
pub struct Cli {
    /// SQLite file holding the ledger.
    #[arg(long, global = true, env = "POCKET_LEDGER_DB", default_value = "pocket_ledger.db")]
    pub db: PathBuf,

    /// Keep everything in memory; nothing is written to disk.
    #[arg(long, global = true)]
    pub in_memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a transaction
    Add {
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long = "type")]
        kind: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        payment: Option<String>,
    },
    /// Change fields of an existing transaction
    Update {
        id: u64,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_description)]
        description: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long = "type")]
        kind: Option<TransactionType>,
        #[arg(long, allow_hyphen_values = true, value_parser = parse_amount)]
        amount: Option<Decimal>,
        #[arg(long)]
        payment: Option<PaymentMethod>,
    },
    /// Delete a transaction
    Remove { id: u64 },
    /// List transactions, optionally filtered
    List {
        #[arg(long)]
        category: Option<Category>,
        #[arg(long = "type")]
        kind: Option<TransactionType>,
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        #[arg(long)]
        search: Option<String>,
        /// Only the N latest matches
        #[arg(long)]
        recent: Option<usize>,
    },
    /// Income, expenses and balance
    Summary,
    /// Totals per category
    Categories,
    /// Totals per month
    Monthly,
    /// Totals per payment method
    Payments,
    /// Monthly expenses leading up to the current month
    Trend {
        #[arg(long, default_value_t = 6)]
        months: u32,
    },
    /// Write the ledger as CSV or JSON
    Export {
        #[arg(long, value_enum, default_value_t = DataFormat::Csv)]
        format: DataFormat,
        /// Defaults to standard output
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Append transactions from a CSV or JSON file
    Import {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = DataFormat::Csv)]
        format: DataFormat,
    },
    /// Manage spending limits
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },
    /// Create the local user profile
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
        /// bcrypt work factor
        #[arg(long, default_value_t = DEFAULT_COST, hide = true)]
        cost: u32,
    },
    /// Check a username or email against the stored password
    Verify { identifier: String, password: String },
    /// Change personal details of the local user profile
    UpdateProfile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Replace the profile password
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
        /// bcrypt work factor
        #[arg(long, default_value_t = DEFAULT_COST, hide = true)]
        cost: u32,
    },
    /// Replace the ledger with demo data
    Seed,
    /// Delete every transaction
    Clear,
    /// Open the terminal dashboard
    Dashboard,
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    /// Set the budget of a category
    Set { category: String, amount: String },
    /// Raise a category budget
    Increase { category: String, amount: String },
    /// Lower a category budget
    Decrease { category: String, amount: String },
    /// Remove a category budget
    Delete { category: String },
    /// Set the overall monthly budget
    Monthly { amount: String },
    /// Show category budgets
    List,
    /// Compare budgets with spending
    Status {
        /// YYYY-MM, defaults to the current month
        #[arg(long, value_parser = parse_month)]
        month: Option<NaiveDate>,
    },
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", text.trim()), "%Y-%m-%d").map_err(|_| {
        Error::InvalidValue {
            field: "month (expected YYYY-MM)",
            value: text.to_string(),
        }
    })
}

/// Runs one command against the ledger, writing human readable output to `out`.
pub fn execute<S: KeyValueStore, W: Write>(
    command: Command,
    ledger: &mut LedgerStore<S>,
    today: NaiveDate,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Add {
            description,
            category,
            kind,
            amount,
            date,
            payment,
        } => {
            let candidate = create_transaction(&RawTransaction {
                date: date.as_deref().unwrap_or(""),
                description: &description,
                category: &category,
                kind: &kind,
                payment_method: payment.as_deref().unwrap_or(""),
                amount: &amount,
            })?;
            let added = ledger.add_on(candidate, today)?;
            writeln!(out, "Transaction {} added.", added.id)?;
        }
        Command::Update {
            id,
            date,
            description,
            category,
            kind,
            amount,
            payment,
        } => {
            let update = TransactionUpdate {
                date,
                description,
                category,
                kind,
                amount,
                payment_method: payment,
            };
            if update.is_empty() {
                writeln!(out, "Nothing to update.")?;
                return Ok(());
            }
            match ledger.update(id, update)? {
                Some(updated) => {
                    writeln!(out, "Transaction updated:")?;
                    print_transactions(out, &[updated])?;
                }
                None => writeln!(out, "Transaction {} not found.", id)?,
            }
        }
        Command::Remove { id } => {
            if ledger.remove(id)? {
                writeln!(out, "Transaction {} removed.", id)?;
            } else {
                writeln!(out, "Transaction {} not found.", id)?;
            }
        }
        Command::List {
            category,
            kind,
            from,
            to,
            search,
            recent,
        } => {
            let filter = TransactionFilter {
                category,
                kind,
                from,
                to,
                text: search,
            };
            let mut matches = ledger.filtered(&filter);
            if let Some(limit) = recent {
                matches = views::most_recent(&matches, limit);
            }

            if matches.is_empty() {
                writeln!(out, "No transactions found.")?;
            } else {
                print_transactions(out, &matches)?;
            }
        }
        Command::Summary => {
            let summary = views::summary(&ledger.all());
            writeln!(out, "Total income:    {:>12.2}", summary.total_income)?;
            writeln!(out, "Total expenses:  {:>12.2}", summary.total_expenses)?;
            writeln!(out, "Net balance:     {:>12.2}", summary.net_balance)?;
            writeln!(out, "Transactions:    {:>12}", summary.transaction_count)?;
            writeln!(out, "Average amount:  {:>12.2}", summary.average_transaction)?;
            if let Some(top) = views::top_category(&ledger.all()) {
                writeln!(out, "Top spending:    {:>12}", top.label())?;
            }
        }
        Command::Categories => {
            for (category, totals) in views::category_breakdown(&ledger.all()) {
                writeln!(
                    out,
                    "{:<16} {:>4} {:>12.2}",
                    category.label(),
                    totals.count,
                    totals.total
                )?;
            }
        }
        Command::Monthly => {
            for (month, totals) in views::monthly_breakdown(&ledger.all()) {
                writeln!(
                    out,
                    "{}  income {:>12.2}  expenses {:>12.2}  net {:>12.2}  ({} transactions)",
                    month,
                    totals.income,
                    totals.expenses,
                    totals.net(),
                    totals.count
                )?;
            }
        }
        Command::Payments => {
            for (method, totals) in views::payment_method_breakdown(&ledger.all()) {
                writeln!(
                    out,
                    "{:<14} {:>4} {:>12.2}",
                    method.label(),
                    totals.count,
                    totals.total
                )?;
            }
        }
        Command::Trend { months } => {
            for month in views::spending_trend(&ledger.all(), today, months) {
                writeln!(out, "{}  {:>12.2}", month.month, month.expenses)?;
            }
        }
        Command::Export { format, output } => match output {
            Some(path) => {
                export_to_path(&ledger.all(), format, &path)?;
                writeln!(out, "Exported {} transactions to {}.", ledger.len(), path.display())?;
            }
            None => export_transactions(&ledger.all(), format, &mut *out)?,
        },
        Command::Import { path, format } => {
            let summary = import_transactions(ledger, format, &path)?;
            writeln!(
                out,
                "Imported {} transactions ({} skipped).",
                summary.imported, summary.skipped
            )?;
        }
        Command::Budget { command } => execute_budget(command, ledger, today, out)?,
        Command::Register {
            username,
            first_name,
            last_name,
            email,
            phone,
            password,
            cost,
        } => {
            let registration = Registration {
                username,
                first_name,
                last_name,
                email,
                phone,
                password,
            };
            let profile = register(ledger.storage_mut(), &registration, cost)?;
            writeln!(out, "Registered {}.", profile.username)?;
        }
        Command::Verify {
            identifier,
            password,
        } => match verify_credentials(ledger.storage(), &identifier, &password)? {
            Some(profile) => writeln!(
                out,
                "Welcome back, {} {}.",
                profile.first_name, profile.last_name
            )?,
            None => writeln!(out, "Invalid username or password.")?,
        },
        Command::UpdateProfile {
            first_name,
            last_name,
            email,
            phone,
        } => {
            let update = ProfileUpdate {
                first_name,
                last_name,
                email,
                phone,
            };
            if update.is_empty() {
                writeln!(out, "Nothing to update.")?;
            } else {
                let profile = update_profile(ledger.storage_mut(), update)?;
                writeln!(out, "Profile updated for {}.", profile.username)?;
            }
        }
        Command::ChangePassword {
            current,
            new,
            confirm,
            cost,
        } => {
            change_password(ledger.storage_mut(), &current, &new, &confirm, cost)?;
            writeln!(out, "Password updated successfully!")?;
        }
        Command::Seed => {
            ledger.load_sample_data()?;
            writeln!(out, "Loaded {} sample transactions.", ledger.len())?;
        }
        Command::Clear => {
            ledger.clear()?;
            writeln!(out, "All transactions cleared.")?;
        }
        Command::Dashboard => {
            let budgets = load_budgets(ledger.storage())?;
            let data = build_dashboard(&ledger.all(), &budgets, today);
            info!("opening dashboard");
            run_dashboard(&data)?;
        }
    }

    Ok(())
}

fn execute_budget<S: KeyValueStore, W: Write>(
    command: BudgetCommand,
    ledger: &mut LedgerStore<S>,
    today: NaiveDate,
    out: &mut W,
) -> Result<()> {
    match command {
        BudgetCommand::Set { category, amount } => {
            budget::set_budget(ledger.storage_mut(), &category, &amount)?;
            writeln!(out, "Budget for '{}' set.", category.trim())?;
        }
        BudgetCommand::Increase { category, amount } => {
            let total = budget::increase_budget(ledger.storage_mut(), &category, &amount)?;
            writeln!(out, "Budget for '{}' is now {:.2}.", category.trim(), total)?;
        }
        BudgetCommand::Decrease { category, amount } => {
            let total = budget::decrease_budget(ledger.storage_mut(), &category, &amount)?;
            writeln!(out, "Budget for '{}' is now {:.2}.", category.trim(), total)?;
        }
        BudgetCommand::Delete { category } => {
            budget::delete_budget(ledger.storage_mut(), &category)?;
            writeln!(out, "Budget for '{}' deleted.", category.trim())?;
        }
        BudgetCommand::Monthly { amount } => {
            budget::set_monthly_budget(ledger.storage_mut(), &amount)?;
            writeln!(out, "Monthly budget set.")?;
        }
        BudgetCommand::List => {
            let budgets = budget::list_budgets(ledger.storage())?;
            if let Some(monthly) = budget::monthly_budget(ledger.storage())? {
                writeln!(out, "{:<16} {:>12.2}", "Monthly", monthly)?;
            }
            if budgets.is_empty() {
                writeln!(out, "No category budgets set.")?;
            }
            for entry in budgets {
                writeln!(out, "{:<16} {:>12.2}", entry.category.label(), entry.amount)?;
            }
        }
        BudgetCommand::Status { month } => {
            let month = month.unwrap_or(today);
            let records = ledger.all();
            let budgets = load_budgets(ledger.storage())?;

            match budgets.monthly {
                Some(monthly) => {
                    let status =
                        views::budget_status(&records, monthly, month.year(), month.month());
                    writeln!(
                        out,
                        "{}: spent {:.2} of {:.2}, remaining {:.2}{}",
                        month.format("%Y-%m"),
                        status.spent,
                        status.budget,
                        status.remaining,
                        if status.over_budget { " (over budget)" } else { "" }
                    )?;
                }
                None => writeln!(out, "No monthly budget set.")?,
            }

            for (category, status) in views::category_budget_status(&records, &budgets) {
                writeln!(
                    out,
                    "{:<16} spent {:>10.2} of {:>10.2}{}",
                    category.label(),
                    status.spent,
                    status.budget,
                    if status.over_budget { " (over budget)" } else { "" }
                )?;
            }
        }
    }

    Ok(())
}

fn print_transactions<W: Write>(out: &mut W, transactions: &[Transaction]) -> Result<()> {
    writeln!(
        out,
        "{:>4}  {:<10}  {:<30}  {:<13}  {:<7}  {:<13}  {:>12}",
        "Id", "Date", "Description", "Category", "Type", "Payment", "Amount"
    )?;
    for t in transactions {
        writeln!(
            out,
            "{:>4}  {:<10}  {:<30}  {:<13}  {:<7}  {:<13}  {:>12.2}",
            t.id,
            t.date.format("%Y-%m-%d"),
            t.description,
            t.category.label(),
            t.kind,
            t.payment_method.label(),
            t.amount
        )?;
    }
    Ok(())
}
