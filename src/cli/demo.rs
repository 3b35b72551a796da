//! Built-in sample bill, usable without a database

use anyhow::Result;

use crate::cli::{print_bill, print_running_total};
use crate::model::{Bill, BillItem, BillStatus};
use crate::selection::SelectionSet;
use crate::split;

pub fn sample_bill() -> Bill {
    let lines: [(&str, f64, u32); 6] = [
        ("Margherita Pizza", 12.99, 2),
        ("Spaghetti Carbonara", 14.5, 3),
        ("Caesar Salad", 8.75, 2),
        ("Garlic Bread", 4.5, 1),
        ("Tiramisu", 6.99, 2),
        ("Sparkling Water", 3.5, 4),
    ];

    let mut items = Vec::new();
    for (name, price, quantity) in lines {
        for _ in 0..quantity {
            items.push(BillItem::new((items.len() + 1).to_string(), name, price));
        }
    }
    let total_amount = split::bill_subtotal(&items);

    Bill {
        id: "sample".into(),
        restaurant: "Pasta Palace".into(),
        date: "2023-04-07".into(),
        items,
        tax: Some(5.25),
        tip: Some(15.0),
        total_amount,
        status: BillStatus::Active,
        created_at: "2023-04-07T19:30:00Z".into(),
        created_by: None,
    }
}

/// One pizza, one carbonara, two waters
fn sample_selection() -> SelectionSet {
    SelectionSet::from(&["1", "3", "11", "12"][..])
}

pub fn run() -> Result<()> {
    let bill = sample_bill();
    let selection = sample_selection();

    println!("Sample bill (nothing is stored; 'create' makes a real one)");
    print_bill(&bill, &selection);

    println!("\nSplit with tax and tip shared by subtotal:");
    let (totals, message) = split::settle_up(&bill, &selection, 0.0);
    print_running_total(&selection, &totals);
    println!("\n{}", message);

    println!("\nSplit tracking what was paid ($25.00 so far):");
    let untaxed = Bill {
        tax: None,
        tip: None,
        ..bill
    };
    let (totals, message) = split::settle_up(&untaxed, &selection, 25.0);
    print_running_total(&selection, &totals);
    println!("\n{}", message);

    Ok(())
}
