//! Split calculator
//!
//! Pure arithmetic over a bill's items and one user's selection.
//!
//! Two modes:
//! - Payment tracking: balance = subtotal - amount paid
//! - Proportional: the user's share of tax and tip follows their share of the bill subtotal
//!
//! A bill that carries a tax or tip figure is split proportionally; otherwise payments are tracked.

pub mod grouping;
pub mod settlement;

pub use grouping::{group_items, group_selected, GroupState, GroupedItem};
pub use settlement::{format_settlement_message, money, settle_up};

use serde::Serialize;

use crate::model::BillItem;
use crate::selection::SelectionSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitMode {
    PaymentTracking,
    Proportional { tax: f64, tip: f64 },
}

impl SplitMode {
    /// A missing tax or tip counts as zero once the other one is present
    pub fn for_bill(tax: Option<f64>, tip: Option<f64>) -> Self {
        match (tax, tip) {
            (None, None) => SplitMode::PaymentTracking,
            (tax, tip) => SplitMode::Proportional {
                tax: tax.unwrap_or(0.0),
                tip: tip.unwrap_or(0.0),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    Owes,
    Overpaid,
    Settled,
}

impl BalanceStatus {
    /// Sign of the balance at cent precision, so that a balance shown as
    /// 0.00 always reads as fully paid
    pub fn from_balance(balance: f64) -> Self {
        let cents = (balance * 100.0).round();
        if cents > 0.0 {
            BalanceStatus::Owes
        } else if cents < 0.0 {
            BalanceStatus::Overpaid
        } else {
            BalanceStatus::Settled
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaymentTotals {
    pub subtotal: f64,
    pub amount_paid: f64,
    /// Positive: still owes. Negative: overpaid.
    pub balance: f64,
}

impl PaymentTotals {
    pub fn status(&self) -> BalanceStatus {
        BalanceStatus::from_balance(self.balance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProportionalTotals {
    pub subtotal: f64,
    pub bill_subtotal: f64,
    pub ratio: f64,
    pub tax: f64,
    pub tip: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum UserTotals {
    Payment(PaymentTotals),
    Proportional(ProportionalTotals),
}

impl UserTotals {
    pub fn subtotal(&self) -> f64 {
        match self {
            UserTotals::Payment(t) => t.subtotal,
            UserTotals::Proportional(t) => t.subtotal,
        }
    }

    /// What the user is left to pay: the balance when tracking payments,
    /// the full share otherwise
    pub fn amount_due(&self) -> f64 {
        match self {
            UserTotals::Payment(t) => t.balance,
            UserTotals::Proportional(t) => t.total,
        }
    }
}

/// Sum of every item price on the bill
pub fn bill_subtotal(items: &[BillItem]) -> f64 {
    items.iter().map(|item| item.price).sum()
}

/// Sum of the prices of the selected items
pub fn selected_subtotal(items: &[BillItem], selected: &SelectionSet) -> f64 {
    items
        .iter()
        .filter(|item| selected.contains(&item.id))
        .map(|item| item.price)
        .sum()
}

pub fn compute_user_totals(
    items: &[BillItem],
    selected: &SelectionSet,
    amount_paid: f64,
    tax: Option<f64>,
    tip: Option<f64>,
) -> UserTotals {
    let subtotal = selected_subtotal(items, selected);

    match SplitMode::for_bill(tax, tip) {
        SplitMode::PaymentTracking => UserTotals::Payment(PaymentTotals {
            subtotal,
            amount_paid,
            balance: subtotal - amount_paid,
        }),
        SplitMode::Proportional { tax, tip } => {
            let bill_subtotal = bill_subtotal(items);
            // An empty or all-zero bill has no meaningful share
            let ratio = if bill_subtotal == 0.0 {
                0.0
            } else {
                subtotal / bill_subtotal
            };
            let user_tax = tax * ratio;
            let user_tip = tip * ratio;

            UserTotals::Proportional(ProportionalTotals {
                subtotal,
                bill_subtotal,
                ratio,
                tax: user_tax,
                tip: user_tip,
                total: subtotal + user_tax + user_tip,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(prices: &[(&str, f64)]) -> Vec<BillItem> {
        prices
            .iter()
            .enumerate()
            .map(|(i, (name, price))| BillItem::new(format!("item-{}", i + 1), *name, *price))
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_selection_has_zero_subtotal() {
        let items = items(&[("A", 10.0), ("B", 30.0)]);
        let totals = compute_user_totals(&items, &SelectionSet::new(), 0.0, None, None);
        assert_eq!(totals.subtotal(), 0.0);
    }

    #[test]
    fn test_subtotal_sums_selected_prices() {
        let items = items(&[("Pizza", 12.99), ("Pizza", 12.99), ("Salad", 8.75)]);
        let selected = SelectionSet::from(&["item-1", "item-3"][..]);
        assert!(approx(selected_subtotal(&items, &selected), 21.74));
    }

    #[test]
    fn test_unknown_ids_do_not_count() {
        let items = items(&[("A", 10.0)]);
        let selected = SelectionSet::from(&["item-10", "item-"][..]);
        assert_eq!(selected_subtotal(&items, &selected), 0.0);
    }

    #[test]
    fn test_payment_balance_signs() {
        let items = items(&[("A", 10.0), ("B", 30.0)]);
        let selected = SelectionSet::from(&["item-2"][..]);

        let owes = compute_user_totals(&items, &selected, 20.0, None, None);
        let overpaid = compute_user_totals(&items, &selected, 35.0, None, None);
        let settled = compute_user_totals(&items, &selected, 30.0, None, None);

        match (owes, overpaid, settled) {
            (UserTotals::Payment(a), UserTotals::Payment(b), UserTotals::Payment(c)) => {
                assert_eq!(a.balance, 10.0);
                assert_eq!(a.status(), BalanceStatus::Owes);
                assert_eq!(b.balance, -5.0);
                assert_eq!(b.status(), BalanceStatus::Overpaid);
                assert_eq!(c.balance, 0.0);
                assert_eq!(c.status(), BalanceStatus::Settled);
            }
            other => panic!("expected payment totals, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_amount_paid_is_accepted() {
        let items = items(&[("A", 10.0)]);
        let selected = SelectionSet::from(&["item-1"][..]);
        let totals = compute_user_totals(&items, &selected, -5.0, None, None);
        assert_eq!(totals.amount_due(), 15.0);
    }

    #[test]
    fn test_float_residue_reads_as_settled() {
        assert_eq!(BalanceStatus::from_balance(1e-12), BalanceStatus::Settled);
        assert_eq!(BalanceStatus::from_balance(-1e-12), BalanceStatus::Settled);
        assert_eq!(BalanceStatus::from_balance(0.01), BalanceStatus::Owes);
    }

    #[test]
    fn test_proportional_share() {
        let items = items(&[("A", 10.0), ("B", 30.0)]);
        let selected = SelectionSet::from(&["item-1"][..]);
        let totals = compute_user_totals(&items, &selected, 0.0, Some(4.0), Some(8.0));

        let UserTotals::Proportional(t) = totals else {
            panic!("expected proportional totals");
        };
        assert_eq!(t.bill_subtotal, 40.0);
        assert_eq!(t.ratio, 0.25);
        assert_eq!(t.tax, 1.0);
        assert_eq!(t.tip, 2.0);
        assert_eq!(t.total, 13.0);
    }

    #[test]
    fn test_zero_price_bill_has_zero_ratio() {
        let items = items(&[("Water", 0.0), ("Bread", 0.0)]);
        let selected = SelectionSet::from(&["item-1", "item-2"][..]);
        let totals = compute_user_totals(&items, &selected, 0.0, Some(4.0), Some(8.0));

        let UserTotals::Proportional(t) = totals else {
            panic!("expected proportional totals");
        };
        assert_eq!(t.ratio, 0.0);
        assert!(!t.ratio.is_nan());
        assert_eq!(t.tax, 0.0);
        assert_eq!(t.tip, 0.0);
        assert_eq!(t.total, 0.0);
    }

    #[test]
    fn test_empty_bill_proportional() {
        let totals = compute_user_totals(&[], &SelectionSet::new(), 0.0, Some(1.0), None);
        assert_eq!(totals.amount_due(), 0.0);
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(SplitMode::for_bill(None, None), SplitMode::PaymentTracking);
        assert_eq!(
            SplitMode::for_bill(Some(5.25), None),
            SplitMode::Proportional { tax: 5.25, tip: 0.0 }
        );
        assert_eq!(
            SplitMode::for_bill(None, Some(15.0)),
            SplitMode::Proportional { tax: 0.0, tip: 15.0 }
        );
    }
}
