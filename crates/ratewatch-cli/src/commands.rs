use ratewatch_core::{CacheMode, Currency, CurrencyComparisonRow, RateEngine, SourceId};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli, engine: &RateEngine) -> Result<(), CliError> {
    match &cli.command {
        Command::Rates { currency, no_cache } => {
            let currency: Currency = currency.parse()?;
            let mode = if *no_cache {
                CacheMode::Refresh
            } else {
                CacheMode::Use
            };
            let (rows, last_update) = engine.get_currency_rates(currency, mode).await;

            if cli.json {
                print_rows_json(currency, &rows, last_update.as_deref())?;
            } else {
                print_rows_table(currency, &rows, last_update.as_deref());
            }
        }
        Command::Reload => {
            engine.reload_rates().await;
            if cli.json {
                println!("{}", serde_json::json!({ "message": "rates reloaded" }));
            } else {
                println!("rates reloaded");
            }
        }
        Command::Sources => {
            if cli.json {
                let sources: Vec<_> = SourceId::ALL
                    .into_iter()
                    .map(|source| {
                        serde_json::json!({
                            "code": source.code(),
                            "name": source.display_name(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&sources)?);
            } else {
                for source in SourceId::ALL {
                    println!("{:<10} {}", source.code(), source.display_name());
                }
            }
        }
    }

    Ok(())
}

fn print_rows_json(
    currency: Currency,
    rows: &[CurrencyComparisonRow],
    last_update: Option<&str>,
) -> Result<(), CliError> {
    let payload = serde_json::json!({
        "currency": currency.code(),
        "rates": rows,
        "last_update": last_update,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn print_rows_table(
    currency: Currency,
    rows: &[CurrencyComparisonRow],
    last_update: Option<&str>,
) {
    println!("{currency}  buy      sell");
    for row in rows {
        println!(
            "{:<10} {:>8} {:>8}",
            row.source.code(),
            format_rate(row.transfer_buying_rate),
            format_rate(row.transfer_selling_rate),
        );
    }
    if let Some(stamp) = last_update {
        println!("last update: {stamp}");
    }
}

fn format_rate(value: Option<f64>) -> String {
    match value {
        Some(rate) => format!("{rate:.4}"),
        None => String::from("-"),
    }
}
