use clap::{Parser, Subcommand};

/// Compare CNY forex rates across bank sources from the terminal.
#[derive(Debug, Parser)]
#[command(name = "ratewatch", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Emit machine-readable JSON instead of a table.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Cross-source comparison for one currency.
    Rates {
        /// Currency code (USD, HKD, JPY, GBP, EUR, AUD, CAD, SGD).
        currency: String,

        /// Bypass the snapshot cache and fetch live.
        #[arg(long)]
        no_cache: bool,
    },
    /// Force-refresh every source and its cache entry.
    Reload,
    /// List the configured sources.
    Sources,
}
