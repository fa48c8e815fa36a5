use crate::commands::common::wei;
use crate::QuoteCommands;
use abt_core::LinearCurve;
use colored::Colorize;

pub fn handle_quote(
    side: QuoteCommands,
    curve: &LinearCurve,
) -> Result<(), Box<dyn std::error::Error>> {
    match side {
        QuoteCommands::Buy { amount, supply } => {
            let cost = curve.quote_buy(amount, supply)?;
            println!();
            println!("{}", "Buy Quote".bold().underline());
            println!();
            println!("  {}: {}", "Amount".bold(), amount);
            println!("  {}: {} → {}", "Supply".bold(), supply, supply.saturating_add(amount));
            println!("  {}: {}", "Cost".bold(), wei(cost).cyan().bold());
            println!();
        }
        QuoteCommands::Sell { amount, supply } => {
            let refund = curve.quote_sell(amount, supply)?;
            println!();
            println!("{}", "Sell Quote".bold().underline());
            println!();
            println!("  {}: {}", "Amount".bold(), amount);
            println!("  {}: {} → {}", "Supply".bold(), supply, supply - amount);
            println!("  {}: {}", "Refund".bold(), wei(refund).cyan().bold());
            println!();
        }
    }
    Ok(())
}

pub fn handle_price(supply: u128, curve: &LinearCurve) -> Result<(), Box<dyn std::error::Error>> {
    let price = curve.marginal_price(supply)?;
    println!("  {}: {}", "Supply".bold(), supply);
    println!("  {}: {}", "Next unit".bold(), wei(price).cyan().bold());
    Ok(())
}

pub fn handle_afford(
    budget: u128,
    supply: u128,
    curve: &LinearCurve,
) -> Result<(), Box<dyn std::error::Error>> {
    let units = curve.max_affordable(budget, supply)?;
    println!("  {}: {}", "Budget".bold(), wei(budget));
    println!("  {}: {}", "Supply".bold(), supply);
    if units == 0 {
        crate::print_info("Budget does not cover a single unit");
        return Ok(());
    }
    let cost = curve.quote_buy(units, supply)?;
    println!("  {}: {}", "Units".bold(), units.to_string().green().bold());
    println!("  {}: {}", "Cost".bold(), wei(cost));
    println!("  {}: {}", "Change".bold(), wei(budget - cost));
    Ok(())
}

pub fn handle_curve(
    from: u128,
    count: usize,
    curve: &LinearCurve,
) -> Result<(), Box<dyn std::error::Error>> {
    let prices = curve.price_schedule(from, count)?;

    println!();
    if curve.is_flat() {
        println!(
            "{} (flat, {} per unit)",
            "Price Curve".bold().underline(),
            curve.base_price
        );
    } else {
        println!(
            "{} (base {}, +{} per unit)",
            "Price Curve".bold().underline(),
            curve.base_price,
            curve.price_increment
        );
    }
    println!();
    println!("  {:>12}  {:>40}  {:>40}", "SUPPLY", "NEXT UNIT (wei)", "RESERVE (wei)");

    let mut supply = from;
    for price in prices {
        let reserve = curve.reserve_for_supply(supply)?;
        println!("  {:>12}  {:>40}  {:>40}", supply, price, reserve);
        supply += 1;
    }
    println!();
    Ok(())
}
