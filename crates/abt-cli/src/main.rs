// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ABILITY TOKENS CLI - Bonding Curve Quotes & Trade Simulation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "abt-cli")]
#[command(about = "Ability Token CLI - Bonding Curve Quotes & Simulation", long_about = None)]
#[command(version)]
struct Cli {
    /// Curve config file (TOML with base_price and price_increment)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override base price (wei)
    #[arg(long, global = true)]
    base_price: Option<u128>,

    /// Override price increment per unit (wei)
    #[arg(long, global = true)]
    price_increment: Option<u128>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a buy or sell
    Quote {
        #[command(subcommand)]
        side: QuoteCommands,
    },

    /// Marginal price of the next unit at a given supply
    Price {
        /// Circulating supply (whole units)
        #[arg(short, long)]
        supply: u128,
    },

    /// How many units a budget buys
    Afford {
        /// Budget (wei)
        #[arg(short, long)]
        budget: u128,

        /// Circulating supply (whole units)
        #[arg(short, long, default_value_t = 0)]
        supply: u128,
    },

    /// Print a price table
    Curve {
        /// First supply in the table
        #[arg(short, long, default_value_t = 0)]
        from: u128,

        /// Number of rows
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },

    /// Replay a JSON list of trades against an in-memory market
    Simulate {
        /// Trades file: [{"op": "buy"|"sell", "trader", "amount", "payment"}]
        #[arg(short, long)]
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the active curve as a TOML config file
    InitConfig {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum QuoteCommands {
    /// Cost to buy `amount` units
    Buy {
        /// Whole units
        #[arg(short, long)]
        amount: u128,

        /// Circulating supply before the buy
        #[arg(short, long, default_value_t = 0)]
        supply: u128,
    },

    /// Refund for selling `amount` units
    Sell {
        /// Whole units
        #[arg(short, long)]
        amount: u128,

        /// Circulating supply before the sell
        #[arg(short, long)]
        supply: u128,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let curve =
        commands::common::resolve_curve(cli.config.as_deref(), cli.base_price, cli.price_increment)?;

    match cli.command {
        Commands::Quote { side } => commands::quote::handle_quote(side, &curve)?,
        Commands::Price { supply } => commands::quote::handle_price(supply, &curve)?,
        Commands::Afford { budget, supply } => {
            commands::quote::handle_afford(budget, supply, &curve)?
        }
        Commands::Curve { from, count } => commands::quote::handle_curve(from, count, &curve)?,
        Commands::Simulate { file, json } => commands::simulate::handle(&file, json, &curve)?,
        Commands::InitConfig { output, force } => {
            commands::config::handle_init(&output, force, &curve)?
        }
    }

    Ok(())
}

fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

// ─────────────────────────────────────────────────────────────────
// UNIT TESTS
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── CLI Argument Parsing ────────────────────────────────────

    #[test]
    fn test_cli_quote_buy() {
        let cli = Cli::try_parse_from(["abt-cli", "quote", "buy", "--amount", "3"]);
        assert!(cli.is_ok(), "Failed to parse: {:?}", cli.err());
        match cli.unwrap().command {
            Commands::Quote {
                side: QuoteCommands::Buy { amount, supply },
            } => {
                assert_eq!(amount, 3);
                assert_eq!(supply, 0);
            }
            _ => panic!("Expected Quote::Buy"),
        }
    }

    #[test]
    fn test_cli_quote_sell_requires_supply() {
        assert!(Cli::try_parse_from(["abt-cli", "quote", "sell", "--amount", "3"]).is_err());

        let cli = Cli::try_parse_from(["abt-cli", "quote", "sell", "-a", "3", "-s", "10"]).unwrap();
        match cli.command {
            Commands::Quote {
                side: QuoteCommands::Sell { amount, supply },
            } => {
                assert_eq!(amount, 3);
                assert_eq!(supply, 10);
            }
            _ => panic!("Expected Quote::Sell"),
        }
    }

    #[test]
    fn test_cli_large_u128_value() {
        let cli = Cli::try_parse_from([
            "abt-cli",
            "afford",
            "--budget",
            "100000000000000000000000",
        ])
        .unwrap();
        match cli.command {
            Commands::Afford { budget, supply } => {
                assert_eq!(budget, 100_000_000_000_000_000_000_000);
                assert_eq!(supply, 0);
            }
            _ => panic!("Expected Afford"),
        }
    }

    #[test]
    fn test_cli_global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from([
            "abt-cli",
            "price",
            "--supply",
            "5",
            "--base-price",
            "1000",
            "--price-increment",
            "0",
        ])
        .unwrap();
        assert_eq!(cli.base_price, Some(1000));
        assert_eq!(cli.price_increment, Some(0));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_curve_defaults() {
        let cli = Cli::try_parse_from(["abt-cli", "curve"]).unwrap();
        match cli.command {
            Commands::Curve { from, count } => {
                assert_eq!(from, 0);
                assert_eq!(count, 10);
            }
            _ => panic!("Expected Curve"),
        }
    }

    #[test]
    fn test_cli_simulate() {
        let cli = Cli::try_parse_from([
            "abt-cli",
            "--config",
            "/tmp/curve.toml",
            "simulate",
            "--file",
            "/tmp/trades.json",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/curve.toml")));
        match cli.command {
            Commands::Simulate { file, json } => {
                assert_eq!(file, PathBuf::from("/tmp/trades.json"));
                assert!(json);
            }
            _ => panic!("Expected Simulate"),
        }
    }

    #[test]
    fn test_cli_init_config() {
        let cli = Cli::try_parse_from(["abt-cli", "init-config", "-o", "curve.toml"]).unwrap();
        match cli.command {
            Commands::InitConfig { output, force } => {
                assert_eq!(output, PathBuf::from("curve.toml"));
                assert!(!force);
            }
            _ => panic!("Expected InitConfig"),
        }
    }

    #[test]
    fn test_cli_rejects_negative_amount() {
        assert!(Cli::try_parse_from(["abt-cli", "quote", "buy", "--amount", "-1"]).is_err());
    }
}
