// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::Path;

use zenspend::config::{init_tracing, Cli, Command, CommonArgs};
use zenspend::Workspace;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Command::Ui);

    // The dashboard owns the terminal, so only warnings reach stderr by default
    let default_filter = match command {
        Command::Ui => "warn",
        _ => "info",
    };
    init_tracing(cli.common.log_filter(default_filter));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;

    match command {
        Command::Ui => run_ui_mode(&cli.common, runtime.handle().clone()),
        Command::Summary => run_summary(&cli.common),
        Command::Ask { question } => runtime.block_on(run_ask(&cli.common, &question)),
        Command::Import { csv } => run_import(&cli.common, &csv),
    }
}

fn load_workspace(common: &CommonArgs) -> Result<Workspace> {
    Workspace::load(common.data.as_deref(), common.coach_delay(), Local::now().date_naive())
}

fn run_summary(common: &CommonArgs) -> Result<()> {
    let ws = load_workspace(common)?;
    let overview = ws.overview()?;

    println!("💰 ZenSpend - Dashboard Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📈 Cash flow");
    println!("   Income:   {}", ws.money(overview.cash_flow.income));
    println!("   Expenses: {}", ws.money(overview.cash_flow.expenses));
    println!("   Net:      {}", ws.money(overview.cash_flow.net));
    println!("   Savings:  {:.0}%", overview.savings_rate * 100.0);

    let burn = overview.burn_rate;
    println!("\n🔥 Burn rate");
    println!(
        "   {}% of budget used, {}% of month elapsed (day {}/{})",
        burn.budget_used, burn.expected_usage, burn.progress.day_of_month, burn.progress.days_in_month
    );
    println!("   {}", burn.status.message());

    println!("\n📊 Budgets");
    for row in ws.budget_rows()? {
        println!(
            "   {:<16} {:>10} / {:<10} {:>4}%  {}",
            row.name,
            ws.money(row.spent),
            ws.money(row.limit),
            row.percentage,
            row.status.label()
        );
    }

    println!("\n🧾 Recent transactions");
    for tx in &overview.recent_transactions {
        println!("   {}  {:<24} {:>12}", tx.date, tx.description, ws.money(tx.amount));
    }

    println!("\n🔁 Subscriptions: {}/month", ws.money(overview.monthly_subscriptions));

    let counts = ws.alerts().counts();
    println!(
        "🔔 Alerts: {} warning, {} info, {} success",
        counts.warning, counts.info, counts.success
    );

    Ok(())
}

async fn run_ask(common: &CommonArgs, question: &str) -> Result<()> {
    let mut ws = load_workspace(common)?;

    println!("🧑 {}", question.trim());
    println!("🤖 typing...\n");

    let answer = ws.coach_mut().ask(question).await?;
    println!("{}", answer.content);

    Ok(())
}

fn run_import(common: &CommonArgs, csv_path: &Path) -> Result<()> {
    println!("📥 ZenSpend - CSV Import");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut ws = load_workspace(common)?;
    let before = ws.transactions().len();

    println!("\n📂 Loading CSV...");
    let report = ws.import_csv(csv_path)?;
    println!("✓ Read {} rows from {:?}", report.total_rows(), csv_path);

    println!("\n🔍 Checking duplicates...");
    println!("✓ New transactions: {}", report.imported.len());
    println!("✓ Duplicates skipped: {}", report.duplicates);

    for tx in &report.imported {
        println!("   + {}  {:<24} {:>12}", tx.date, tx.description, ws.money(tx.amount));
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "✅ Workspace now holds {} transactions (was {})",
        ws.transactions().len(),
        before
    );
    println!("   Imported data lives in memory only and is gone when the program exits.");

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(common: &CommonArgs, runtime: tokio::runtime::Handle) -> Result<()> {
    println!("🖥️  Loading ZenSpend...\n");

    let ws = load_workspace(common)?;
    println!("✓ Loaded {} transactions\n", ws.transactions().len());
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(ws, runtime);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_common: &CommonArgs, _runtime: tokio::runtime::Handle) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin zenspend-server --features server");
    std::process::exit(1);
}
