//! Analytics report command.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use tracing::warn;

use wheelhouse_analytics::{analyze_position, check_discipline, summarize};
use wheelhouse_core::config::AppConfig;
use wheelhouse_core::ConfigLoader;
use wheelhouse_data::{DatabaseClient, Repositories};

/// Arguments for the report command.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,
}

/// Runs the report command.
///
/// # Errors
/// Returns an error if configuration or database access fails.
pub async fn run_report(args: ReportArgs) -> Result<()> {
    let config = ConfigLoader::load_from(&args.config)?;
    let db = DatabaseClient::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;
    let repos = Repositories::new(db.pool());

    print_report(&repos, &config).await
}

/// Computes and prints per-position rows, the portfolio summary, and the
/// discipline checks for the current snapshot.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn print_report(repos: &Repositories, config: &AppConfig) -> Result<()> {
    let positions = repos.positions.list_all().await?;
    if positions.is_empty() {
        println!("No positions found.");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let mut rows = Vec::with_capacity(positions.len());

    println!(
        "{:<6} {:<10} {:>5} {:>5} {:>5} {:>9} {:>8} {:>9} {:>11} {:>11} {:>8} {:>9}",
        "Symbol",
        "Strategy",
        "Qty",
        "Age",
        "DTE",
        "IV d%",
        "Delta",
        "P/L ($)",
        "Return %",
        "Ann.Ret %",
        "ROC %",
        "Expo %"
    );

    for position in &positions {
        let Some(metrics) = analyze_position(position, today) else {
            warn!(position_id = position.id, "Skipping row with unknown strategy");
            continue;
        };

        println!(
            "{:<6} {:<10} {:>5} {:>5} {:>5} {:>9.2} {:>8.2} {:>9.2} {:>11.2} {:>11.2} {:>8.2} {:>9.2}",
            metrics.symbol,
            metrics.strategy.as_str(),
            metrics.contracts,
            metrics.age_days,
            metrics.dte,
            metrics.iv_change_pct,
            metrics.delta,
            metrics.pl,
            metrics.return_pct,
            metrics.annualized_return_pct,
            metrics.roc_pct,
            metrics.exposure_pct_of_account,
        );
        rows.push(metrics);
    }

    let summary = summarize(&rows, config.analytics.benchmark_rate);
    println!("\n{}", summary.format_summary());

    println!("\nDiscipline checks (margin/delta/DTE/IV/profit/breakeven):");
    for position in &positions {
        if let Some(check) = check_discipline(position, today) {
            println!(
                "{:<6} {}/6  [{} {} {} {} {} {}]",
                check.symbol,
                check.passed(),
                mark(check.margin_ok),
                mark(check.delta_ok),
                mark(check.dte_ok),
                mark(check.iv_ok),
                mark(check.profit_ok),
                mark(check.breakeven_ok),
            );
        }
    }

    Ok(())
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "pass"
    } else {
        "fail"
    }
}
