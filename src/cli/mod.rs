//! Command implementations and shared terminal rendering

pub mod bill;
pub mod demo;
pub mod pay;
pub mod select;
pub mod settle;
pub mod user;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::model::{Bill, BillItem, ParticipantRow};
use crate::selection::SelectionSet;
use crate::split::{self, money, GroupState, GroupedItem, UserTotals};
use crate::store::BillStore;

/// Look up a bill by id or id prefix, reporting a miss to the user
pub fn find_bill(store: &BillStore, query: &str) -> Result<Option<Bill>> {
    let bill = store.find_bill(query)?;
    if bill.is_none() {
        println!("Bill '{}' not found.", query);
    }
    Ok(bill)
}

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Resolve an item by exact id or unambiguous id prefix
pub fn resolve_item<'a>(bill: &'a Bill, query: &str) -> Result<&'a BillItem> {
    if let Some(item) = bill.item(query) {
        return Ok(item);
    }

    let matches: Vec<&BillItem> = bill
        .items
        .iter()
        .filter(|item| !query.is_empty() && item.id.starts_with(query))
        .collect();

    match matches.as_slice() {
        [item] => Ok(*item),
        [] => bail!("No item '{}' on bill from {}", query, bill.restaurant),
        _ => bail!(
            "Item id '{}' is ambiguous ({} matches); use more characters",
            query,
            matches.len()
        ),
    }
}

/// Resolve a 1-based group number as shown by `show`
pub fn resolve_group(bill: &Bill, number: usize) -> Result<GroupedItem> {
    let mut groups = split::group_items(&bill.items);
    if number == 0 || number > groups.len() {
        bail!(
            "Group {} does not exist; bill has {} groups",
            number,
            groups.len()
        );
    }
    Ok(groups.swap_remove(number - 1))
}

fn state_mark(state: GroupState) -> &'static str {
    match state {
        GroupState::Unselected => "[ ]",
        GroupState::Partial => "[~]",
        GroupState::Selected => "[x]",
    }
}

/// Grouped item listing with the user's selection marks
pub fn print_bill(bill: &Bill, selection: &SelectionSet) {
    println!("\n{}", "=".repeat(80));
    println!("{} | {} | {}", bill.restaurant, bill.date, bill.status);

    let mut header = format!(
        "Bill {} | Total: ${}",
        short_id(&bill.id),
        money(bill.total_amount)
    );
    if let Some(tax) = bill.tax {
        header.push_str(&format!(" | Tax: ${}", money(tax)));
    }
    if let Some(tip) = bill.tip {
        header.push_str(&format!(" | Tip: ${}", money(tip)));
    }
    println!("{}", header);
    println!("{}", "=".repeat(80));

    println!(
        "{:>3}  {:<3}  {:<28} {:>8} {:>7}  {}",
        "#", "Sel", "Item", "Each", "Qty", "Item IDs"
    );
    println!("{}", "-".repeat(80));

    for (index, group) in split::group_items(&bill.items).iter().enumerate() {
        let name = if group.name.chars().count() > 28 {
            format!("{}...", group.name.chars().take(25).collect::<String>())
        } else {
            group.name.clone()
        };
        let ids: Vec<&str> = group.ids.iter().map(|id| short_id(id)).collect();

        println!(
            "{:>3}  {:<3}  {:<28} {:>8} {:>7}  {}",
            index + 1,
            state_mark(group.state(selection)),
            name,
            money(group.price),
            format!("{}/{}", group.selected_count(selection), group.count),
            ids.join(" "),
        );
    }
}

/// One-line running total, hidden when nothing is selected
pub fn print_running_total(selection: &SelectionSet, totals: &UserTotals) {
    println!("{}", "-".repeat(80));
    if selection.is_empty() {
        println!("No items selected.");
        return;
    }

    let count = selection.len();
    let noun = if count == 1 { "item" } else { "items" };
    match totals {
        UserTotals::Payment(t) => println!(
            "{} {} selected | Subtotal: ${} | Paid: ${} | Balance: ${}",
            count,
            noun,
            money(t.subtotal),
            money(t.amount_paid),
            money(t.balance)
        ),
        UserTotals::Proportional(t) => println!(
            "{} {} selected | Subtotal: ${} | Tax: ${} | Tip: ${} | Total: ${}",
            count,
            noun,
            money(t.subtotal),
            money(t.tax),
            money(t.tip),
            money(t.total)
        ),
    }
}

pub fn print_participants(rows: &[ParticipantRow], current_user: &str) {
    if rows.is_empty() {
        return;
    }

    println!("\nParticipants:");
    for row in rows {
        let name = row.name.as_deref().unwrap_or_else(|| short_id(&row.user_id));
        let marker = if row.user_id == current_user { " (you)" } else { "" };
        println!(
            "  {:<20} {:>3} items  ${:>8}  paid ${:>8}{}",
            name,
            row.selected_count,
            money(row.subtotal),
            money(row.amount_paid),
            marker
        );
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Store could not be opened: nothing store-backed can run until the config is fixed
pub fn print_config_error(reason: &str, database_path: &std::path::Path) {
    eprintln!("{}", "=".repeat(80));
    eprintln!("Configuration Error");
    eprintln!("{}", "=".repeat(80));
    eprintln!("The bill database could not be opened:");
    eprintln!("  {}", reason);
    eprintln!();
    eprintln!("Database path: {}", database_path.display());
    eprintln!("Check 'database.path' in billsplit.yaml or pass --config.");
    eprintln!("'billsplit demo' still works without a database.");
}
