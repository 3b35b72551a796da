//! Settlement message: the text receipt a user shares with the table
//!
//! Layout is fixed: header, one line per selected group, totals block, status line.
//! Amounts always carry exactly two fraction digits.

use crate::model::Bill;
use crate::selection::SelectionSet;

use super::grouping::{group_selected, GroupedItem};
use super::{compute_user_totals, BalanceStatus, UserTotals};

/// Two-decimal rendering used for every amount shown to users
pub fn money(value: f64) -> String {
    // Avoid "-0.00" for negative values that round to zero
    let rounded = (value * 100.0).round() / 100.0;
    let value = if rounded == 0.0 { 0.0 } else { value };
    format!("{:.2}", value)
}

pub fn format_settlement_message(bill: &Bill, groups: &[GroupedItem], totals: &UserTotals) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("My portion of the bill from {}:", bill.restaurant));
    for group in groups {
        lines.push(format!(
            "{}x {} ({})",
            group.count,
            group.name,
            money(group.price)
        ));
    }
    lines.push(String::new());

    match totals {
        UserTotals::Payment(t) => {
            lines.push(format!("Subtotal: {}", money(t.subtotal)));
            lines.push(format!("Amount Paid: {}", money(t.amount_paid)));
            lines.push(format!("Balance: {}", money(t.balance)));
            lines.push(String::new());
            lines.push(match t.status() {
                BalanceStatus::Owes => format!("You still owe ${}", money(t.balance)),
                BalanceStatus::Overpaid => format!("You overpaid by ${}", money(t.balance.abs())),
                BalanceStatus::Settled => "Your bill is fully paid".to_string(),
            });
        }
        UserTotals::Proportional(t) => {
            lines.push(format!("Subtotal: {}", money(t.subtotal)));
            lines.push(format!("Tax: {}", money(t.tax)));
            lines.push(format!("Tip: {}", money(t.tip)));
            lines.push(format!("Total: {}", money(t.total)));
            lines.push(String::new());
            lines.push(format!("Your total is ${}", money(t.total)));
        }
    }

    lines.join("\n").trim().to_string()
}

/// Totals plus message for one user's selection on a bill
pub fn settle_up(bill: &Bill, selection: &SelectionSet, amount_paid: f64) -> (UserTotals, String) {
    let totals = compute_user_totals(&bill.items, selection, amount_paid, bill.tax, bill.tip);
    let groups = group_selected(&bill.items, selection);
    let message = format_settlement_message(bill, &groups, &totals);
    (totals, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BillItem, BillStatus};

    fn bill(items: Vec<BillItem>, tax: Option<f64>, tip: Option<f64>) -> Bill {
        Bill {
            id: "bill-1".into(),
            restaurant: "Pasta Palace".into(),
            date: "2023-04-07".into(),
            total_amount: items.iter().map(|i| i.price).sum(),
            items,
            tax,
            tip,
            status: BillStatus::Active,
            created_at: "2023-04-07T19:00:00Z".into(),
            created_by: None,
        }
    }

    fn menu() -> Vec<BillItem> {
        vec![
            BillItem::new("1", "Pizza", 12.99),
            BillItem::new("2", "Pizza", 12.99),
            BillItem::new("3", "Salad", 8.7),
        ]
    }

    #[test]
    fn test_money_always_two_digits() {
        assert_eq!(money(8.7), "8.70");
        assert_eq!(money(14.0), "14.00");
        assert_eq!(money(0.0), "0.00");
        assert_eq!(money(-0.001), "0.00");
        assert_eq!(money(-3.5), "-3.50");
    }

    #[test]
    fn test_payment_message_owes() {
        let bill = bill(menu(), None, None);
        let selection = SelectionSet::from(&["1", "2", "3"][..]);
        let (_, message) = settle_up(&bill, &selection, 20.0);

        let expected = "My portion of the bill from Pasta Palace:\n\
                        2x Pizza (12.99)\n\
                        1x Salad (8.70)\n\
                        \n\
                        Subtotal: 34.68\n\
                        Amount Paid: 20.00\n\
                        Balance: 14.68\n\
                        \n\
                        You still owe $14.68";
        assert_eq!(message, expected);
    }

    #[test]
    fn test_payment_message_overpaid() {
        let bill = bill(menu(), None, None);
        let selection = SelectionSet::from(&["3"][..]);
        let (_, message) = settle_up(&bill, &selection, 10.0);

        assert!(message.contains("Balance: -1.30"));
        assert!(message.ends_with("You overpaid by $1.30"));
    }

    #[test]
    fn test_payment_message_fully_paid() {
        let bill = bill(menu(), None, None);
        let selection = SelectionSet::from(&["1"][..]);
        let (_, message) = settle_up(&bill, &selection, 12.99);

        assert!(message.contains("Balance: 0.00"));
        assert!(message.ends_with("Your bill is fully paid"));
    }

    #[test]
    fn test_proportional_message() {
        let items = vec![BillItem::new("a", "A", 10.0), BillItem::new("b", "B", 30.0)];
        let bill = bill(items, Some(4.0), Some(8.0));
        let (totals, message) = settle_up(&bill, &SelectionSet::from(&["a"][..]), 0.0);

        assert_eq!(totals.amount_due(), 13.0);
        let expected = "My portion of the bill from Pasta Palace:\n\
                        1x A (10.00)\n\
                        \n\
                        Subtotal: 10.00\n\
                        Tax: 1.00\n\
                        Tip: 2.00\n\
                        Total: 13.00\n\
                        \n\
                        Your total is $13.00";
        assert_eq!(message, expected);
    }

    #[test]
    fn test_message_lines_follow_bill_order() {
        let bill = bill(menu(), None, None);
        let selection = SelectionSet::from(&["3", "2", "1"][..]);
        let (_, message) = settle_up(&bill, &selection, 0.0);

        let lines: Vec<&str> = message.lines().skip(1).take(2).collect();
        assert_eq!(lines, vec!["2x Pizza (12.99)", "1x Salad (8.70)"]);
    }

    #[test]
    fn test_balance_status_uses_cents() {
        let bill = bill(
            vec![BillItem::new("1", "Tea", 0.1), BillItem::new("2", "Tea", 0.2)],
            None,
            None,
        );
        let selection = SelectionSet::from(&["1", "2"][..]);
        let (_, message) = settle_up(&bill, &selection, 0.3);
        assert!(message.ends_with("Your bill is fully paid"));
    }

    #[test]
    fn test_empty_selection_message() {
        let bill = bill(menu(), None, None);
        let (_, message) = settle_up(&bill, &SelectionSet::new(), 0.0);
        assert!(message.starts_with("My portion of the bill from Pasta Palace:\n\nSubtotal: 0.00"));
        assert!(message.ends_with("Your bill is fully paid"));
    }
}
