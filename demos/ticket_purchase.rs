//! Ticket purchase walkthrough
//!
//! Runs the two documented scenarios under both execution strategies and
//! prints what ended up in the tables:
//! - cust01 buys 3 tickets (commits)
//! - cust02 buys 6 tickets (CHECK constraint, both rows rolled back)
//!
//! Run with: cargo run --example ticket_purchase
//! Optional: pass a JSON config path as the first argument; set RUST_LOG=debug
//! to see transaction boundaries.

use std::sync::Arc;
use ticket_transaction::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let base = match std::env::args().nth(1) {
        Some(path) => PurchaseConfig::from_json_file(path)?,
        None => PurchaseConfig::default(),
    };

    println!("=== Ticket Transaction Demo ===\n");

    for strategy in [ExecutionStrategy::Explicit, ExecutionStrategy::Managed] {
        println!("--- {} strategy ---", strategy);

        let config = base.clone().strategy(strategy);
        let store = Arc::new(SqliteStore::from_config(&config));
        let controller = PurchaseController::from_config(Arc::clone(&store), &config).await?;
        let ledger = PurchaseLedger::new(Arc::clone(&store));

        for (customer_id, amount) in [("cust01", 3), ("cust02", 6)] {
            let form = PurchaseForm {
                customer_id: customer_id.to_string(),
                amount,
            };
            let view = match controller.buy_ticket(&form).await {
                Ok(view) => view,
                Err(e) => {
                    println!("   ✗ {}: {}", customer_id, e);
                    continue;
                }
            };

            println!(
                "   {} x{}: {}",
                view.ticket_info.customer_id(),
                view.ticket_info.quantity(),
                view.success_or_fail
            );
            for payment in ledger.payments_for(customer_id).await? {
                println!("     payments      ({}, {})", payment.customer_id, payment.amount);
            }
            for count in ledger.ticket_counts_for(customer_id).await? {
                println!("     ticket_counts ({}, {})", count.customer_id, count.count_num);
            }
        }

        store.disconnect().await?;
        println!();
    }

    println!("=== Demo completed ===");
    Ok(())
}
