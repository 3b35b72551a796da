//! Item selection commands

use anyhow::Result;

use crate::cli::{find_bill, print_running_total, resolve_group, resolve_item};
use crate::session::Session;
use crate::split::money;
use crate::store::BillStore;
use crate::sync::BillSession;

pub fn toggle(store: &BillStore, session: &Session, bill_query: &str, item_query: &str) -> Result<()> {
    let Some(bill) = find_bill(store, bill_query)? else {
        return Ok(());
    };
    let item = resolve_item(&bill, item_query)?.clone();

    let mut view = BillSession::load(store, bill, session.user_id())?;
    match view.toggle(&item.id) {
        Ok(true) => println!("Selected {} ({})", item.name, money(item.price)),
        Ok(false) => println!("Deselected {} ({})", item.name, money(item.price)),
        Err(e) => println!("⚠️  {} - local change kept, run 'show' to reload", e),
    }

    print_running_total(view.selection(), &view.totals());
    Ok(())
}

pub fn toggle_group(
    store: &BillStore,
    session: &Session,
    bill_query: &str,
    group_number: usize,
    clear: bool,
) -> Result<()> {
    let Some(bill) = find_bill(store, bill_query)? else {
        return Ok(());
    };
    let group = resolve_group(&bill, group_number)?;

    let mut view = BillSession::load(store, bill, session.user_id())?;
    match view.toggle_group(&group.ids, !clear) {
        Ok(0) => println!("Nothing to change for {}", group.name),
        Ok(changed) => println!(
            "{} {} of {}x {} ({})",
            if clear { "Cleared" } else { "Selected" },
            changed,
            group.count,
            group.name,
            money(group.price)
        ),
        Err(e) => println!("⚠️  {} - local change kept, run 'show' to reload", e),
    }

    print_running_total(view.selection(), &view.totals());
    Ok(())
}
