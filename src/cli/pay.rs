use anyhow::Result;

use crate::cli::{find_bill, print_running_total};
use crate::session::Session;
use crate::split::money;
use crate::store::BillStore;
use crate::sync::BillSession;

pub fn run(store: &BillStore, session: &Session, bill_query: &str, amount: f64) -> Result<()> {
    let Some(bill) = find_bill(store, bill_query)? else {
        return Ok(());
    };
    if !amount.is_finite() {
        anyhow::bail!("Amount must be a number");
    }

    let mut view = BillSession::load(store, bill, session.user_id())?;
    match view.set_amount_paid(amount) {
        Ok(()) => println!(
            "Recorded ${} paid toward {}",
            money(amount),
            view.bill().restaurant
        ),
        Err(e) => println!("⚠️  {} - local change kept, run 'show' to reload", e),
    }

    print_running_total(view.selection(), &view.totals());
    Ok(())
}
