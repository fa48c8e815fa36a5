//! Offline trade replay.
//!
//! Every buy deposits its `payment` into the trader's wallet first, the way a
//! payable call carries its value. A buy without `payment` pays the exact
//! quote. Rejected trades, deposit included, leave no trace and the replay
//! continues.

use crate::commands::common::wei;
use crate::{print_error, print_success};
use abt_core::{
    BondingCurveMarket, CurveConfig, InMemoryEscrow, InMemoryLedger, LinearCurve, MarketError,
    MarketSnapshot, TradeReceipt, Transactional,
};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum TradeOp {
    Buy {
        trader: String,
        #[serde(with = "abt_core::u128_str")]
        amount: u128,
        #[serde(default, with = "abt_core::u128_str::option")]
        payment: Option<u128>,
    },
    Sell {
        trader: String,
        #[serde(with = "abt_core::u128_str")]
        amount: u128,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepOutcome {
    Committed { step: usize, receipt: TradeReceipt },
    Rejected { step: usize, error: String },
}

type SimMarket = BondingCurveMarket<InMemoryLedger, InMemoryEscrow>;

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub steps: Vec<StepOutcome>,
    pub snapshot: MarketSnapshot,
    /// `None` when the books agree
    pub invariant_violation: Option<String>,
}

pub fn handle(file: &Path, json: bool, curve: &LinearCurve) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| format!("Cannot read {}: {}", file.display(), e))?;
    let ops: Vec<TradeOp> = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid trades file {}: {}", file.display(), e))?;

    let report = run(&ops, curve)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(violation) = report.invariant_violation {
        return Err(format!("Invariant violated: {}", violation).into());
    }
    Ok(())
}

/// Replay `ops` against a fresh market on `curve`.
pub fn run(ops: &[TradeOp], curve: &LinearCurve) -> Result<SimulationReport, Box<dyn std::error::Error>> {
    let mut market = BondingCurveMarket::new(
        &CurveConfig::from(*curve),
        InMemoryLedger::new("Simulated Ability", "SIM")?,
        InMemoryEscrow::new(),
    )?;

    let mut steps = Vec::with_capacity(ops.len());
    for (i, op) in ops.iter().enumerate() {
        let step = i + 1;
        steps.push(match apply(&mut market, op) {
            Ok(receipt) => StepOutcome::Committed { step, receipt },
            Err(e) => {
                log::info!("step {} rejected: {}", step, e);
                StepOutcome::Rejected {
                    step,
                    error: e.to_string(),
                }
            }
        });
    }

    Ok(SimulationReport {
        steps,
        snapshot: market.snapshot(),
        invariant_violation: market.check_invariants().err(),
    })
}

/// Apply one operation. A rejected buy also withdraws its deposit.
fn apply(market: &mut SimMarket, op: &TradeOp) -> Result<TradeReceipt, MarketError> {
    match op {
        TradeOp::Buy {
            trader,
            amount,
            payment,
        } => {
            let payment = match payment {
                Some(p) => *p,
                None => market.buy_price(*amount)?,
            };

            let deposit = market.escrow_mut().checkpoint();
            let result = market
                .escrow_mut()
                .fund(trader, payment)
                .map_err(|e| MarketError::CollectFailed {
                    payer: trader.clone(),
                    amount: payment,
                    reason: e.to_string(),
                })
                .and_then(|()| market.execute_buy(*amount, payment, trader));

            match result {
                Ok(_) => market.escrow_mut().commit(deposit),
                Err(_) => market.escrow_mut().rollback(deposit),
            }
            result
        }
        TradeOp::Sell { trader, amount } => market.execute_sell(*amount, trader),
    }
}

fn print_report(report: &SimulationReport) {
    println!();
    println!("{}", "Trade Simulation".bold().underline());
    println!();

    for outcome in &report.steps {
        match outcome {
            StepOutcome::Committed { step, receipt } => {
                let side = match receipt.side {
                    abt_core::TradeSide::Buy => "BUY ".green().bold(),
                    abt_core::TradeSide::Sell => "SELL".yellow().bold(),
                };
                println!(
                    "  #{:<4} {} {} x{} for {}  (supply {}, reserve {})",
                    step,
                    side,
                    receipt.trader,
                    receipt.amount,
                    wei(receipt.value),
                    receipt.supply_after,
                    receipt.reserve_after
                );
                if receipt.refund > 0 {
                    println!("          refunded {}", wei(receipt.refund).dimmed());
                }
            }
            StepOutcome::Rejected { step, error } => {
                println!("  #{:<4} {} {}", step, "REJECTED".red().bold(), error);
            }
        }
    }

    let s = &report.snapshot;
    println!();
    println!("  {}: {}", "Circulating supply".bold(), s.circulating_supply);
    println!("  {}: {}", "Reserve".bold(), wei(s.reserve_balance).cyan());
    if let Some(p) = s.next_buy_price {
        println!("  {}: {}", "Next buy".bold(), wei(p));
    }
    if let Some(p) = s.next_sell_price {
        println!("  {}: {}", "Next sell".bold(), wei(p));
    }
    println!("  {}: {}", "Escrow held".bold(), wei(s.escrow_held));
    println!();

    match &report.invariant_violation {
        None => print_success("Books balanced"),
        Some(v) => print_error(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abt_core::ValueEscrow;
    use tempfile::TempDir;

    fn parse(json: &str) -> Vec<TradeOp> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_ops() {
        let ops = parse(
            r#"[
                {"op": "buy", "trader": "alice", "amount": 3, "payment": "3300000000000"},
                {"op": "buy", "trader": "bob", "amount": "1"},
                {"op": "sell", "trader": "alice", "amount": 3}
            ]"#,
        );
        assert_eq!(
            ops[0],
            TradeOp::Buy {
                trader: "alice".to_string(),
                amount: 3,
                payment: Some(3_300_000_000_000)
            }
        );
        assert!(matches!(ops[1], TradeOp::Buy { payment: None, .. }));
        assert!(matches!(ops[2], TradeOp::Sell { amount: 3, .. }));
    }

    #[test]
    fn test_canonical_replay() {
        let ops = parse(
            r#"[
                {"op": "buy", "trader": "alice", "amount": 3, "payment": 3300000000000},
                {"op": "sell", "trader": "alice", "amount": 3}
            ]"#,
        );
        let report = run(&ops, &LinearCurve::canonical()).unwrap();
        assert!(matches!(report.steps[0], StepOutcome::Committed { .. }));
        assert!(matches!(report.steps[1], StepOutcome::Committed { .. }));
        assert_eq!(report.snapshot.circulating_supply, 0);
        assert_eq!(report.snapshot.reserve_balance, 0);
        assert!(report.invariant_violation.is_none());
    }

    #[test]
    fn test_rejections_are_reported() {
        let ops = parse(
            r#"[
                {"op": "buy", "trader": "alice", "amount": 2, "payment": 1},
                {"op": "sell", "trader": "bob", "amount": 1},
                {"op": "buy", "trader": "carol", "amount": 1},
                {"op": "buy", "trader": "dave", "amount": 0}
            ]"#,
        );
        let report = run(&ops, &LinearCurve::canonical()).unwrap();
        match &report.steps[0] {
            StepOutcome::Rejected { error, .. } => assert!(error.contains("insufficient payment")),
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(matches!(report.steps[1], StepOutcome::Rejected { .. }));
        assert!(matches!(report.steps[2], StepOutcome::Committed { .. }));
        assert!(matches!(report.steps[3], StepOutcome::Rejected { .. }));
        assert_eq!(report.snapshot.circulating_supply, 1);
        assert!(report.invariant_violation.is_none());
    }

    #[test]
    fn test_rejected_buy_withdraws_deposit() {
        let mut market: SimMarket = BondingCurveMarket::new(
            &CurveConfig::canonical(),
            InMemoryLedger::new("Simulated Ability", "SIM").unwrap(),
            InMemoryEscrow::new(),
        )
        .unwrap();
        let underpaid = TradeOp::Buy {
            trader: "alice".to_string(),
            amount: 2,
            payment: Some(1),
        };
        assert!(matches!(
            apply(&mut market, &underpaid),
            Err(MarketError::InsufficientPayment { .. })
        ));
        assert_eq!(market.escrow().wallet_balance("alice"), 0);
        assert_eq!(market.escrow().held(), 0);

        let overpaid = TradeOp::Buy {
            trader: "alice".to_string(),
            amount: 1,
            payment: Some(5_000_000_000_000),
        };
        let receipt = apply(&mut market, &overpaid).unwrap();
        assert_eq!(
            market.escrow().wallet_balance("alice"),
            5_000_000_000_000 - receipt.value
        );
        assert_eq!(market.escrow().held(), receipt.value);
    }

    #[test]
    fn test_handle_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("trades.json");
        std::fs::write(
            &path,
            r#"[{"op": "buy", "trader": "alice", "amount": 2, "payment": "5000000000000"}]"#,
        )
        .unwrap();
        assert!(handle(&path, true, &LinearCurve::canonical()).is_ok());
    }

    #[test]
    fn test_handle_rejects_bad_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("trades.json");
        std::fs::write(&path, r#"[{"op": "swap"}]"#).unwrap();
        assert!(handle(&path, false, &LinearCurve::canonical()).is_err());
    }
}
