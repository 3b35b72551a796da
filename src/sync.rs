//! Two-phase updates of one user's view of a bill
//!
//! Every change is applied to local state first and then pushed to the
//! store. A failed push is logged and returned to the caller; local state
//! is not rolled back and nothing is retried.

use anyhow::Result;
use tracing::{debug, warn};

use crate::error::SyncError;
use crate::model::Bill;
use crate::selection::SelectionSet;
use crate::split::{self, GroupedItem, UserTotals};
use crate::store::BillStore;

/// Remote side of a [`BillSession`]
pub trait RemoteSync {
    fn push_selection(&self, bill_id: &str, user_id: &str, item_id: &str, selected: bool) -> Result<()>;

    fn push_payment(&self, bill_id: &str, user_id: &str, amount: f64) -> Result<()>;
}

impl RemoteSync for BillStore {
    fn push_selection(&self, bill_id: &str, user_id: &str, item_id: &str, selected: bool) -> Result<()> {
        self.set_selection(bill_id, user_id, item_id, selected)?;
        Ok(())
    }

    fn push_payment(&self, bill_id: &str, user_id: &str, amount: f64) -> Result<()> {
        self.set_payment(bill_id, user_id, amount)?;
        Ok(())
    }
}

pub struct BillSession<'a, R: RemoteSync + ?Sized> {
    bill: Bill,
    user_id: String,
    selection: SelectionSet,
    amount_paid: f64,
    remote: &'a R,
}

impl<'a> BillSession<'a, BillStore> {
    /// Start from the user's stored selections and payment
    pub fn load(store: &'a BillStore, bill: Bill, user_id: &str) -> Result<Self> {
        let selection = SelectionSet::from(store.get_user_selections(&bill.id, user_id)?);
        let amount_paid = store.get_payment(&bill.id, user_id)?;
        Ok(Self::new(bill, user_id, selection, amount_paid, store))
    }
}

impl<'a, R: RemoteSync + ?Sized> BillSession<'a, R> {
    pub fn new(
        bill: Bill,
        user_id: &str,
        selection: SelectionSet,
        amount_paid: f64,
        remote: &'a R,
    ) -> Self {
        Self {
            bill,
            user_id: user_id.to_string(),
            selection,
            amount_paid,
            remote,
        }
    }

    pub fn bill(&self) -> &Bill {
        &self.bill
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn amount_paid(&self) -> f64 {
        self.amount_paid
    }

    /// Flip one item and push the new state. Returns whether it is now selected.
    pub fn toggle(&mut self, item_id: &str) -> Result<bool, SyncError> {
        let selected = self.selection.toggle(item_id);
        self.push_selection(item_id, selected)?;
        Ok(selected)
    }

    /// Select or clear a whole group, pushing one write per changed item.
    /// Every change is attempted; the first failure is returned.
    pub fn toggle_group(&mut self, ids: &[String], select: bool) -> Result<usize, SyncError> {
        let changes = self.selection.changes_for_group(ids, select);
        self.selection.toggle_group(&changes[..], select);

        let mut first_error = None;
        for item_id in &changes {
            if let Err(e) = self.push_selection(item_id, select) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(changes.len()),
        }
    }

    pub fn set_amount_paid(&mut self, amount: f64) -> Result<(), SyncError> {
        self.amount_paid = amount;

        match self.remote.push_payment(&self.bill.id, &self.user_id, amount) {
            Ok(()) => {
                debug!(bill = %self.bill.id, user = %self.user_id, amount, "payment synced");
                Ok(())
            }
            Err(e) => {
                warn!(bill = %self.bill.id, user = %self.user_id, amount, error = %e, "payment sync failed");
                Err(SyncError::Payment {
                    amount,
                    source: e.into(),
                })
            }
        }
    }

    fn push_selection(&self, item_id: &str, selected: bool) -> Result<(), SyncError> {
        match self
            .remote
            .push_selection(&self.bill.id, &self.user_id, item_id, selected)
        {
            Ok(()) => {
                debug!(bill = %self.bill.id, user = %self.user_id, item = item_id, selected, "selection synced");
                Ok(())
            }
            Err(e) => {
                warn!(bill = %self.bill.id, user = %self.user_id, item = item_id, error = %e, "selection sync failed");
                Err(SyncError::Selection {
                    item_id: item_id.to_string(),
                    source: e.into(),
                })
            }
        }
    }

    pub fn groups(&self) -> Vec<GroupedItem> {
        split::group_items(&self.bill.items)
    }

    pub fn totals(&self) -> UserTotals {
        split::compute_user_totals(
            &self.bill.items,
            &self.selection,
            self.amount_paid,
            self.bill.tax,
            self.bill.tip,
        )
    }

    pub fn settlement_message(&self) -> String {
        split::settle_up(&self.bill, &self.selection, self.amount_paid).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BillItem, NewBill, NewItem};
    use std::cell::RefCell;

    /// Records pushes and fails for item ids listed in `reject`
    #[derive(Default)]
    struct RecordingRemote {
        reject: Vec<String>,
        fail_payments: bool,
        pushes: RefCell<Vec<(String, bool)>>,
        payments: RefCell<Vec<f64>>,
    }

    impl RemoteSync for RecordingRemote {
        fn push_selection(&self, _bill: &str, _user: &str, item_id: &str, selected: bool) -> Result<()> {
            if self.reject.iter().any(|r| r == item_id) {
                anyhow::bail!("store rejected {}", item_id);
            }
            self.pushes.borrow_mut().push((item_id.to_string(), selected));
            Ok(())
        }

        fn push_payment(&self, _bill: &str, _user: &str, amount: f64) -> Result<()> {
            if self.fail_payments {
                anyhow::bail!("store offline");
            }
            self.payments.borrow_mut().push(amount);
            Ok(())
        }
    }

    fn sample_bill() -> Bill {
        Bill {
            id: "bill-1".into(),
            restaurant: "Pasta Palace".into(),
            date: "2023-04-07".into(),
            items: vec![
                BillItem::new("1", "Pizza", 12.99),
                BillItem::new("2", "Pizza", 12.99),
                BillItem::new("3", "Salad", 8.75),
            ],
            tax: None,
            tip: None,
            total_amount: 34.73,
            status: crate::model::BillStatus::Active,
            created_at: "2023-04-07T19:00:00Z".into(),
            created_by: None,
        }
    }

    #[test]
    fn test_toggle_pushes_new_state() {
        let remote = RecordingRemote::default();
        let mut session = BillSession::new(sample_bill(), "user-1", SelectionSet::new(), 0.0, &remote);

        assert!(session.toggle("3").unwrap());
        assert!(!session.toggle("3").unwrap());
        assert_eq!(
            *remote.pushes.borrow(),
            vec![("3".to_string(), true), ("3".to_string(), false)]
        );
    }

    #[test]
    fn test_failed_push_keeps_local_state() {
        let remote = RecordingRemote {
            reject: vec!["3".into()],
            ..Default::default()
        };
        let mut session = BillSession::new(sample_bill(), "user-1", SelectionSet::new(), 0.0, &remote);

        let err = session.toggle("3").unwrap_err();
        assert!(matches!(err, SyncError::Selection { ref item_id, .. } if item_id == "3"));
        assert!(session.selection().contains("3"));
        assert_eq!(session.totals().subtotal(), 8.75);
    }

    #[test]
    fn test_group_toggle_pushes_only_changes() {
        let remote = RecordingRemote::default();
        let selection = SelectionSet::from(&["2"][..]);
        let mut session = BillSession::new(sample_bill(), "user-1", selection, 0.0, &remote);

        let pizza = session.groups()[0].ids.clone();
        assert_eq!(session.toggle_group(&pizza, true).unwrap(), 1);
        assert_eq!(*remote.pushes.borrow(), vec![("1".to_string(), true)]);
        assert_eq!(session.toggle_group(&pizza, true).unwrap(), 0);
    }

    #[test]
    fn test_group_toggle_attempts_every_change() {
        let remote = RecordingRemote {
            reject: vec!["1".into()],
            ..Default::default()
        };
        let mut session = BillSession::new(sample_bill(), "user-1", SelectionSet::new(), 0.0, &remote);

        let pizza = session.groups()[0].ids.clone();
        assert!(session.toggle_group(&pizza, true).is_err());
        assert_eq!(*remote.pushes.borrow(), vec![("2".to_string(), true)]);
        assert_eq!(session.selection().len(), 2);
    }

    #[test]
    fn test_failed_payment_keeps_amount() {
        let remote = RecordingRemote {
            fail_payments: true,
            ..Default::default()
        };
        let mut session = BillSession::new(sample_bill(), "user-1", SelectionSet::new(), 0.0, &remote);

        assert!(matches!(
            session.set_amount_paid(20.0),
            Err(SyncError::Payment { amount, .. }) if amount == 20.0
        ));
        assert_eq!(session.amount_paid(), 20.0);
    }

    #[test]
    fn test_session_against_store() {
        let store = BillStore::open_in_memory().unwrap();
        let bill_id = store
            .create_bill(&NewBill {
                restaurant: "Diner".into(),
                date: "2024-01-01".into(),
                items: vec![NewItem::new("Fries", 4.0, 2), NewItem::new("Shake", 6.5, 1)],
                ..Default::default()
            })
            .unwrap();
        let bill = store.get_bill(&bill_id).unwrap().unwrap();

        let mut session = BillSession::load(&store, bill.clone(), "user-1").unwrap();
        let fries = session.groups()[0].ids.clone();
        session.toggle_group(&fries, true).unwrap();
        session.set_amount_paid(5.0).unwrap();

        let reloaded = BillSession::load(&store, bill, "user-1").unwrap();
        assert_eq!(reloaded.selection().len(), 2);
        assert_eq!(reloaded.amount_paid(), 5.0);
        assert!(reloaded.settlement_message().ends_with("You still owe $3.00"));
    }
}
