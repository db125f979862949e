//! Terminal dashboard: headline metrics, spending trend, category totals,
//! monthly budget and the latest transactions on one screen.

use std::collections::BTreeMap;
use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame,
    prelude::{Alignment, Color, Constraint, Direction, Layout, Modifier, Rect, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Gauge, Paragraph, Row, Table},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::views::{
    BudgetStatus, GroupTotals, MonthlySpend, Summary, budget_status, category_breakdown,
    most_recent, spending_trend, summary, top_category,
};
use crate::error::{Error, Result};
use crate::models::budget::Budgets;
use crate::models::transaction::{Category, Transaction, TransactionType};

pub const RECENT_LIMIT: usize = 5;
pub const TREND_MONTHS: u32 = 6;

/// Everything the dashboard shows, computed from one ledger snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub summary: Summary,
    pub top_category: Option<Category>,
    pub recent: Vec<Transaction>,
    pub categories: BTreeMap<Category, GroupTotals>,
    pub trend: Vec<MonthlySpend>,
    /// Present only when a monthly budget is set.
    pub budget: Option<BudgetStatus>,
    /// `YYYY-MM` of the reference date.
    pub month: String,
}

pub fn build_dashboard(
    transactions: &[Transaction],
    budgets: &Budgets,
    today: NaiveDate,
) -> DashboardData {
    DashboardData {
        summary: summary(transactions),
        top_category: top_category(transactions),
        recent: most_recent(transactions, RECENT_LIMIT),
        categories: category_breakdown(transactions),
        trend: spending_trend(transactions, today, TREND_MONTHS),
        budget: budgets
            .monthly
            .map(|monthly| budget_status(transactions, monthly, today.year(), today.month())),
        month: today.format("%Y-%m").to_string(),
    }
}

/// Shows the dashboard until the user presses `q` or `Esc`.
pub fn run_dashboard(data: &DashboardData) -> Result<()> {
    enable_raw_mode().map_err(|e| terminal_error("Failed to enable raw mode", e))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| terminal_error("Failed to enter alternate screen", e))?;

    let result = (|| {
        let backend = ratatui::backend::CrosstermBackend::new(io::stdout());
        let mut terminal = ratatui::Terminal::new(backend)
            .map_err(|e| terminal_error("Failed to initialize terminal", e))?;

        loop {
            terminal
                .draw(|frame| draw_dashboard(frame, data))
                .map_err(|e| terminal_error("Failed to draw terminal UI", e))?;

            if event::poll(Duration::from_millis(200))
                .map_err(|e| terminal_error("Failed to poll input", e))?
            {
                if let Event::Key(key) =
                    event::read().map_err(|e| terminal_error("Failed to read input", e))?
                {
                    if is_quit_key(key) {
                        break;
                    }
                }
            }
        }

        Ok(())
    })();

    disable_raw_mode().map_err(|e| terminal_error("Failed to disable raw mode", e))?;
    execute!(io::stdout(), LeaveAlternateScreen)
        .map_err(|e| terminal_error("Failed to leave alternate screen", e))?;

    result
}

fn terminal_error(context: &str, e: io::Error) -> Error {
    Error::Terminal(format!("{}: {}", context, e))
}

fn is_quit_key(key: KeyEvent) -> bool {
    // Some terminals report releases as well as presses
    key.kind != KeyEventKind::Release && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
}

pub fn draw_dashboard(frame: &mut Frame, data: &DashboardData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
            Constraint::Length((RECENT_LIMIT + 3) as u16),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[1]);

    render_header(frame, layout[0], data);
    render_trend(frame, middle[0], &data.trend);
    render_categories(frame, middle[1], data);
    render_budget(frame, layout[2], data);
    render_recent(frame, layout[3], &data.recent);

    frame.render_widget(
        Paragraph::new("q/Esc exit").style(Style::default().fg(Color::DarkGray)),
        layout[4],
    );
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn render_header(frame: &mut Frame, area: Rect, data: &DashboardData) {
    let summary = &data.summary;
    let balance_color = if summary.net_balance < Decimal::ZERO {
        Color::Red
    } else {
        Color::Green
    };
    let top = data
        .top_category
        .map(Category::label)
        .unwrap_or("(none)");

    let line = Line::from(vec![
        Span::styled("Pocket Ledger", bold().fg(Color::Cyan)),
        Span::raw("  |  "),
        Span::raw(format!("Income: {}", money(summary.total_income))),
        Span::raw("  |  "),
        Span::raw(format!("Expenses: {}", money(summary.total_expenses))),
        Span::raw("  |  "),
        Span::styled(
            format!("Net Balance: {}", money(summary.net_balance)),
            Style::default().fg(balance_color),
        ),
        Span::raw("  |  "),
        Span::raw(format!("Top: {}", top)),
        Span::raw("  |  "),
        Span::raw(format!("Count: {}", summary.transaction_count)),
    ]);

    let block = Block::default().borders(Borders::ALL);
    frame.render_widget(
        Paragraph::new(line).block(block).alignment(Alignment::Left),
        area,
    );
}

fn render_trend(frame: &mut Frame, area: Rect, trend: &[MonthlySpend]) {
    let labels: Vec<String> = trend
        .iter()
        .map(|month| month.month.get(2..).unwrap_or(&month.month).to_string())
        .collect();
    let bars: Vec<(&str, u64)> = labels
        .iter()
        .zip(trend)
        .map(|(label, month)| {
            let value = month.expenses.round().to_u64().unwrap_or(0);
            (label.as_str(), value)
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title("Spending Trend")
                .borders(Borders::ALL),
        )
        .data(bars.as_slice())
        .bar_width(5)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Yellow))
        .value_style(Style::default().fg(Color::Black).bg(Color::Yellow));

    frame.render_widget(chart, area);
}

fn render_categories(frame: &mut Frame, area: Rect, data: &DashboardData) {
    let header = Row::new([
        Cell::from("Category").style(bold()),
        Cell::from("Count").style(bold()),
        Cell::from("Total").style(bold()),
    ]);

    let rows = data.categories.iter().map(|(category, totals)| {
        Row::new([
            Cell::from(category.label()),
            Cell::from(totals.count.to_string()),
            Cell::from(money(totals.total)),
        ])
    });

    let widths = [
        Constraint::Min(16),
        Constraint::Length(6),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title("By Category").borders(Borders::ALL))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn render_budget(frame: &mut Frame, area: Rect, data: &DashboardData) {
    let block = Block::default()
        .title(format!("Budget {}", data.month))
        .borders(Borders::ALL);

    let Some(status) = data.budget else {
        frame.render_widget(
            Paragraph::new("No monthly budget set")
                .block(block)
                .style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    };

    let percentage = status.percentage_used.unwrap_or(Decimal::ZERO);
    let ratio = (percentage / Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    let color = if status.over_budget {
        Color::Red
    } else {
        Color::Green
    };

    let label = format!(
        "{} of {} spent ({}%), {} remaining",
        money(status.spent),
        money(status.budget),
        percentage.round_dp(1),
        money(status.remaining)
    );

    frame.render_widget(
        Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(color))
            .ratio(ratio)
            .label(label),
        area,
    );
}

fn render_recent(frame: &mut Frame, area: Rect, recent: &[Transaction]) {
    let header = Row::new([
        Cell::from("Date").style(bold()),
        Cell::from("Description").style(bold()),
        Cell::from("Category").style(bold()),
        Cell::from("Amount").style(bold()),
    ]);

    let rows = recent.iter().map(|t| {
        let (sign, color) = match t.kind {
            TransactionType::Income => ("+", Color::Green),
            TransactionType::Expense => ("-", Color::Red),
        };
        let mut description = t.description.clone();
        if description.chars().count() > 40 {
            description = description.chars().take(37).collect();
            description.push_str("...");
        }

        Row::new([
            Cell::from(t.date.format("%Y-%m-%d").to_string()),
            Cell::from(description),
            Cell::from(t.category.label()),
            Cell::from(format!("{}{}", sign, money(t.amount))).style(Style::default().fg(color)),
        ])
    });

    let widths = [
        Constraint::Length(10),
        Constraint::Percentage(45),
        Constraint::Length(16),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title("Recent Transactions")
                .borders(Borders::ALL),
        )
        .column_spacing(1);

    frame.render_widget(table, area);
}
