//! Fuzz target: Market trade sequences
//!
//! Drives a market with an arbitrary sequence of buys, sells, transfers and
//! payout refusals. After every step the books must agree:
//! reserve == area under the curve, ledger supply == circulating supply,
//! escrow holds the reserve, and a rejected trade changes nothing.
//!
//! Run: cargo +nightly fuzz run fuzz_trade_sequence

#![no_main]
use abt_core::{BondingCurveMarket, CurveConfig, InMemoryEscrow, InMemoryLedger};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

const TRADERS: [&str; 4] = ["alice", "bob", "carol", "dave"];

#[derive(Arbitrary, Debug)]
enum Step {
    Buy { trader: u8, amount: u16, overpay: u64 },
    Sell { trader: u8, amount: u16 },
    Transfer { from: u8, to: u8, amount: u16 },
    TogglePayouts { trader: u8, reject: bool },
}

#[derive(Arbitrary, Debug)]
struct FuzzTradeInput {
    base_price: u64,
    price_increment: u32,
    steps: Vec<Step>,
}

fn who(idx: u8) -> &'static str {
    TRADERS[idx as usize % TRADERS.len()]
}

fuzz_target!(|input: FuzzTradeInput| {
    let mut escrow = InMemoryEscrow::new();
    for t in TRADERS {
        escrow.fund(t, u128::MAX / 8).unwrap();
    }
    let config = CurveConfig::new(input.base_price as u128, input.price_increment as u128);
    let mut market = BondingCurveMarket::new(
        &config,
        InMemoryLedger::new("Fuzz", "FUZZ").unwrap(),
        escrow,
    )
    .unwrap();

    // Cap sequence length to keep runs fast
    for step in input.steps.iter().take(64) {
        let before = market.snapshot();
        let result = match step {
            Step::Buy { trader, amount, overpay } => {
                let amount = *amount as u128;
                match market.buy_price(amount) {
                    Ok(cost) => market
                        .execute_buy(amount, cost + *overpay as u128, who(*trader))
                        .map(|_| ()),
                    Err(_) => continue,
                }
            }
            Step::Sell { trader, amount } => market
                .execute_sell(*amount as u128, who(*trader))
                .map(|_| ()),
            Step::Transfer { from, to, amount } => {
                let raw = *amount as u128 * abt_core::RAW_PER_UNIT;
                let _ = market.ledger_mut().transfer(who(*from), who(*to), raw);
                Ok(())
            }
            Step::TogglePayouts { trader, reject } => {
                if *reject {
                    market.escrow_mut().reject_payouts_to(who(*trader));
                } else {
                    market.escrow_mut().accept_payouts_to(who(*trader));
                }
                Ok(())
            }
        };

        if result.is_err() {
            assert_eq!(market.snapshot(), before, "rejected trade must not change state");
        }
        if let Err(e) = market.check_invariants() {
            panic!("invariant violated after {:?}: {}", step, e);
        }
    }
});
