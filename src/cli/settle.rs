//! Settle command: print the shareable settlement message

use anyhow::Result;

use crate::cli::find_bill;
use crate::session::Session;
use crate::store::BillStore;
use crate::sync::BillSession;

pub fn run(store: &BillStore, session: &Session, bill_query: &str) -> Result<()> {
    let Some(bill) = find_bill(store, bill_query)? else {
        return Ok(());
    };

    let view = BillSession::load(store, bill, session.user_id())?;
    println!("{}", view.settlement_message());
    Ok(())
}
