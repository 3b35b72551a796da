//! Display grouping of identical items
//!
//! Items with the same name (case-sensitive) and exactly the same price are
//! fungible, so they are offered as one group with a count. Groups keep the
//! order in which each (name, price) pair first appears on the bill.

use serde::Serialize;

use crate::model::BillItem;
use crate::selection::SelectionSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedItem {
    pub name: String,
    pub price: f64,
    pub count: usize,
    pub ids: Vec<String>,
}

/// Derived from the selected count on every render; never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupState {
    Unselected,
    Partial,
    Selected,
}

impl GroupedItem {
    fn matches(&self, item: &BillItem) -> bool {
        self.name == item.name && self.price == item.price
    }

    pub fn selected_count(&self, selection: &SelectionSet) -> usize {
        self.ids.iter().filter(|id| selection.contains(id)).count()
    }

    pub fn state(&self, selection: &SelectionSet) -> GroupState {
        let selected = self.selected_count(selection);
        if selected == 0 {
            GroupState::Unselected
        } else if selected < self.count {
            GroupState::Partial
        } else {
            GroupState::Selected
        }
    }

    pub fn line_total(&self) -> f64 {
        self.price * self.count as f64
    }
}

pub fn group_items<'a, I>(items: I) -> Vec<GroupedItem>
where
    I: IntoIterator<Item = &'a BillItem>,
{
    let mut groups: Vec<GroupedItem> = Vec::new();

    for item in items {
        match groups.iter_mut().find(|group| group.matches(item)) {
            Some(group) => {
                group.count += 1;
                group.ids.push(item.id.clone());
            }
            None => groups.push(GroupedItem {
                name: item.name.clone(),
                price: item.price,
                count: 1,
                ids: vec![item.id.clone()],
            }),
        }
    }

    groups
}

/// Groups built from the selected items only, in bill order
pub fn group_selected(items: &[BillItem], selection: &SelectionSet) -> Vec<GroupedItem> {
    group_items(items.iter().filter(|item| selection.contains(&item.id)))
}
