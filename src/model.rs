//! Bill data model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BillError;
use crate::split::SplitMode;

/// One physical unit on a bill. Quantities are expanded into one item per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    pub id: String,
    pub name: String,
    pub price: f64,
}

impl BillItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Active,
    Settled,
    Archived,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Active => "active",
            BillStatus::Settled => "settled",
            BillStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = BillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(BillStatus::Active),
            "settled" => Ok(BillStatus::Settled),
            "archived" => Ok(BillStatus::Archived),
            other => Err(BillError::Validation(format!("unknown status '{}'", other))),
        }
    }
}

/// A stored bill with its items in creation order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: String,
    pub restaurant: String,
    pub date: String,
    pub items: Vec<BillItem>,
    pub tax: Option<f64>,
    pub tip: Option<f64>,
    pub total_amount: f64,
    pub status: BillStatus,
    pub created_at: String,
    pub created_by: Option<String>,
}

impl Bill {
    /// Sum of all item prices, before tax and tip
    pub fn subtotal(&self) -> f64 {
        crate::split::bill_subtotal(&self.items)
    }

    pub fn split_mode(&self) -> SplitMode {
        SplitMode::for_bill(self.tax, self.tip)
    }

    pub fn item(&self, id: &str) -> Option<&BillItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Row returned by bill listings
#[derive(Debug, Clone, Serialize)]
pub struct BillSummary {
    pub id: String,
    pub restaurant: String,
    pub date: String,
    pub total_amount: f64,
    pub status: BillStatus,
    pub item_count: i64,
    pub created_at: String,
}

/// An item line as entered at bill creation, before quantity expansion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl NewItem {
    pub fn new(name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }
}

/// Parses `name:price` or `name:price:quantity`.
/// The name may itself contain colons; price and quantity are taken from the right.
impl FromStr for NewItem {
    type Err = BillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BillError::Validation(format!("expected 'name:price[:qty]', got '{}'", s));

        let parts: Vec<&str> = s.rsplitn(3, ':').collect();
        if parts.len() == 3 {
            // A numeric middle part means the last part is the quantity
            if let Ok(price) = parts[1].trim().parse::<f64>() {
                let quantity = parts[0].trim().parse::<u32>().map_err(|_| {
                    BillError::Validation(format!(
                        "quantity '{}' in '{}' must be a whole number",
                        parts[0].trim(),
                        s
                    ))
                })?;
                return Ok(NewItem::new(parts[2].trim(), price, quantity));
            }
        }

        let (name, price) = s.rsplit_once(':').ok_or_else(invalid)?;
        let price = price.trim().parse::<f64>().map_err(|_| invalid())?;
        Ok(NewItem::new(name.trim(), price, 1))
    }
}

/// Input to bill creation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBill {
    pub restaurant: String,
    pub date: String,
    pub items: Vec<NewItem>,
    pub tax: Option<f64>,
    pub tip: Option<f64>,
    pub created_by: Option<String>,
}

impl NewBill {
    /// Checks the bill before anything is dispatched to the store.
    /// Negative prices are accepted.
    pub fn validate(&self) -> Result<(), BillError> {
        if self.restaurant.trim().is_empty() {
            return Err(BillError::Validation("restaurant name is required".into()));
        }
        if self.items.is_empty() {
            return Err(BillError::Validation("a bill needs at least one item".into()));
        }
        for (index, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(BillError::Validation(format!(
                    "item {} is missing a name",
                    index + 1
                )));
            }
            if !item.price.is_finite() {
                return Err(BillError::Validation(format!(
                    "item '{}' has an invalid price",
                    item.name
                )));
            }
            if item.quantity == 0 {
                return Err(BillError::Validation(format!(
                    "item '{}' has a quantity of zero",
                    item.name
                )));
            }
        }
        for (label, value) in [("tax", self.tax), ("tip", self.tip)] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(BillError::Validation(format!("{} must be a number", label)));
            }
        }
        Ok(())
    }

    /// Σ price × quantity
    pub fn total_amount(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.price * item.quantity as f64)
            .sum()
    }
}

/// A participant identified by a browser-style session id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub session_id: String,
    pub name: String,
    pub created_at: String,
}

/// Per-user state on one bill
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantRow {
    pub user_id: String,
    pub name: Option<String>,
    pub selected_count: i64,
    pub subtotal: f64,
    pub amount_paid: f64,
}
