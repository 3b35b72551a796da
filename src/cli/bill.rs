//! Bill commands: create, list, show, status, delete

use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::cli::{find_bill, print_bill, print_json, print_participants, print_running_total, short_id};
use crate::error::BillError;
use crate::model::{Bill, BillStatus, NewBill, NewItem, ParticipantRow};
use crate::session::Session;
use crate::split::{money, GroupState, GroupedItem, UserTotals};
use crate::store::BillStore;
use crate::sync::BillSession;

pub struct CreateArgs {
    pub restaurant: String,
    pub date: Option<String>,
    pub items: Vec<NewItem>,
    pub tax: Option<f64>,
    pub tip: Option<f64>,
}

/// Build the bill to create, defaulting the date to today
pub fn new_bill(args: CreateArgs, session: &Session) -> Result<NewBill, BillError> {
    let date = match args.date {
        Some(date) => {
            NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
                BillError::Validation(format!("date '{}' is not YYYY-MM-DD", date))
            })?;
            date.trim().to_string()
        }
        None => Local::now().format("%Y-%m-%d").to_string(),
    };

    let bill = NewBill {
        restaurant: args.restaurant,
        date,
        items: args.items,
        tax: args.tax,
        tip: args.tip,
        created_by: Some(session.session_id.clone()),
    };
    bill.validate()?;
    Ok(bill)
}

pub fn create(store: &BillStore, session: &Session, args: CreateArgs) -> Result<()> {
    let bill = match new_bill(args, session) {
        Ok(bill) => bill,
        Err(e) => {
            println!("{}", e);
            println!("Please fill in all required fields.");
            return Ok(());
        }
    };

    let id = store.create_bill(&bill)?;
    let units: u32 = bill.items.iter().map(|item| item.quantity).sum();
    println!(
        "Bill from '{}' created with ID: {} ({} items, total ${})",
        bill.restaurant.trim(),
        id,
        units,
        money(bill.total_amount())
    );
    println!("Share this ID so everyone can select their items and record payments.");
    Ok(())
}

pub fn list(store: &BillStore, json: bool) -> Result<()> {
    let bills = store.list_bills()?;

    if json {
        return print_json(&bills);
    }

    if bills.is_empty() {
        println!("No bills found. Create one with 'billsplit create'.");
        return Ok(());
    }

    println!(
        "{:<10} {:<12} {:<28} {:>6} {:>10}  {}",
        "ID", "Date", "Restaurant", "Items", "Total", "Status"
    );
    println!("{}", "-".repeat(80));

    for bill in bills {
        let restaurant = if bill.restaurant.chars().count() > 28 {
            format!("{}...", bill.restaurant.chars().take(25).collect::<String>())
        } else {
            bill.restaurant.clone()
        };
        println!(
            "{:<10} {:<12} {:<28} {:>6} {:>10}  {}",
            short_id(&bill.id),
            bill.date,
            restaurant,
            bill.item_count,
            money(bill.total_amount),
            bill.status
        );
    }

    Ok(())
}

#[derive(Serialize)]
struct GroupView<'a> {
    #[serde(flatten)]
    group: &'a GroupedItem,
    selected_count: usize,
    state: GroupState,
}

#[derive(Serialize)]
struct BillView<'a> {
    bill: &'a Bill,
    groups: Vec<GroupView<'a>>,
    selected_item_ids: &'a [String],
    totals: UserTotals,
    participants: &'a [ParticipantRow],
}

pub fn show(store: &BillStore, session: &Session, query: &str, json: bool) -> Result<()> {
    let Some(bill) = find_bill(store, query)? else {
        return Ok(());
    };

    let participants = store.participants(&bill.id)?;
    let view = BillSession::load(store, bill, session.user_id())?;
    let totals = view.totals();

    if json {
        let groups = view.groups();
        return print_json(&BillView {
            bill: view.bill(),
            groups: groups
                .iter()
                .map(|group| GroupView {
                    group,
                    selected_count: group.selected_count(view.selection()),
                    state: group.state(view.selection()),
                })
                .collect(),
            selected_item_ids: view.selection().as_slice(),
            totals,
            participants: &participants,
        });
    }

    print_bill(view.bill(), view.selection());
    print_running_total(view.selection(), &totals);
    print_participants(&participants, session.user_id());
    Ok(())
}

pub fn set_status(store: &BillStore, query: &str, status: BillStatus) -> Result<()> {
    let Some(bill) = find_bill(store, query)? else {
        return Ok(());
    };

    store.set_bill_status(&bill.id, status)?;
    println!("Bill from '{}' is now {}", bill.restaurant, status);
    Ok(())
}

pub fn delete(store: &BillStore, query: &str) -> Result<()> {
    let Some(bill) = find_bill(store, query)? else {
        return Ok(());
    };

    store.delete_bill(&bill.id)?;
    println!(
        "Deleted bill {} from '{}' with its items, selections and payments",
        short_id(&bill.id),
        bill.restaurant
    );
    Ok(())
}
