//! Bill storage with SQLite
//!
//! - Bills and their items (quantity expanded into one row per unit)
//! - Per-user item selections (row present = selected)
//! - Per-user payment amounts (one upserted row per bill and user)
//! - Users keyed by session id

mod availability;
mod schema;

use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::BillError;
use crate::model::{Bill, BillItem, BillStatus, BillSummary, NewBill, ParticipantRow, User};

pub use availability::StoreAvailability;
pub use schema::SCHEMA;

pub struct BillStore {
    conn: Connection,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl BillStore {
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ============================================
    // BILLS
    // ============================================

    /// Create a bill, expanding each item's quantity into individual rows
    pub fn create_bill(&self, bill: &NewBill) -> Result<String> {
        bill.validate()?;

        let id = Uuid::new_v4().to_string();
        let created_at = now();
        let total_amount = bill.total_amount();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO bills (id, restaurant, date, tax, tip, total_amount, status, created_at, created_by)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                bill.restaurant.trim(),
                bill.date,
                bill.tax,
                bill.tip,
                total_amount,
                BillStatus::Active,
                created_at,
                bill.created_by,
            ],
        )?;

        let mut position: i64 = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO items (id, bill_id, position, name, price, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for item in &bill.items {
                for _ in 0..item.quantity {
                    stmt.execute(params![
                        Uuid::new_v4().to_string(),
                        id,
                        position,
                        item.name.trim(),
                        item.price,
                        created_at,
                    ])?;
                    position += 1;
                }
            }
        }
        tx.commit()?;

        info!(bill = %id, restaurant = %bill.restaurant, items = position, total_amount, "bill created");
        Ok(id)
    }

    pub fn get_bill(&self, bill_id: &str) -> Result<Option<Bill>> {
        let result = self.conn.query_row(
            "SELECT id, restaurant, date, tax, tip, total_amount, status, created_at, created_by
             FROM bills WHERE id = ?",
            params![bill_id],
            |row| {
                Ok(Bill {
                    id: row.get(0)?,
                    restaurant: row.get(1)?,
                    date: row.get(2)?,
                    items: Vec::new(),
                    tax: row.get(3)?,
                    tip: row.get(4)?,
                    total_amount: row.get(5)?,
                    status: row.get(6)?,
                    created_at: row.get(7)?,
                    created_by: row.get(8)?,
                })
            },
        );

        let mut bill = match result {
            Ok(bill) => bill,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        bill.items = self.get_items(&bill.id)?;
        Ok(Some(bill))
    }

    /// Find a bill by full id or literal id prefix; an exact match wins.
    /// A prefix shared by several bills is an error.
    pub fn find_bill(&self, query: &str) -> Result<Option<Bill>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        if let Some(bill) = self.get_bill(query)? {
            return Ok(Some(bill));
        }

        let mut stmt = self.conn.prepare(
            r#"SELECT id FROM bills
               WHERE substr(id, 1, length(?1)) = ?1
               ORDER BY created_at DESC, rowid DESC"#,
        )?;
        let ids = stmt
            .query_map(params![query], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        match ids.as_slice() {
            [] => Ok(None),
            [id] => self.get_bill(id),
            _ => Err(BillError::AmbiguousId {
                query: query.to_string(),
                matches: ids.len(),
            }
            .into()),
        }
    }

    fn get_items(&self, bill_id: &str) -> Result<Vec<BillItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, price FROM items WHERE bill_id = ? ORDER BY position",
        )?;

        let rows = stmt.query_map(params![bill_id], |row| {
            Ok(BillItem {
                id: row.get(0)?,
                name: row.get(1)?,
                price: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// All bills, newest first
    pub fn list_bills(&self) -> Result<Vec<BillSummary>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT b.id, b.restaurant, b.date, b.total_amount, b.status, b.created_at,
                      (SELECT COUNT(*) FROM items i WHERE i.bill_id = b.id) as item_count
               FROM bills b
               ORDER BY b.created_at DESC, b.rowid DESC"#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(BillSummary {
                id: row.get(0)?,
                restaurant: row.get(1)?,
                date: row.get(2)?,
                total_amount: row.get(3)?,
                status: row.get(4)?,
                created_at: row.get(5)?,
                item_count: row.get(6)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn set_bill_status(&self, bill_id: &str, status: BillStatus) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE bills SET status = ? WHERE id = ?",
            params![status, bill_id],
        )?;
        if updated == 0 {
            return Err(BillError::NotFound(bill_id.to_string()).into());
        }
        info!(bill = %bill_id, %status, "bill status changed");
        Ok(())
    }

    /// Delete a bill; items, selections and payments go with it
    pub fn delete_bill(&self, bill_id: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM bills WHERE id = ?", params![bill_id])?;
        if deleted == 0 {
            return Err(BillError::NotFound(bill_id.to_string()).into());
        }
        info!(bill = %bill_id, "bill deleted");
        Ok(())
    }

    // ============================================
    // SELECTIONS
    // ============================================

    /// Mark or unmark an item for a user.
    ///
    /// Selecting an already selected item returns the existing selection id.
    /// Deselecting removes every matching row and returns `None`.
    pub fn set_selection(
        &self,
        bill_id: &str,
        user_id: &str,
        item_id: &str,
        selected: bool,
    ) -> Result<Option<String>> {
        if !selected {
            let removed = self.conn.execute(
                "DELETE FROM selections WHERE bill_id = ? AND user_id = ? AND item_id = ?",
                params![bill_id, user_id, item_id],
            )?;
            debug!(bill = %bill_id, user = %user_id, item = %item_id, removed, "selection cleared");
            return Ok(None);
        }

        let existing = self.conn.query_row(
            "SELECT id FROM selections WHERE bill_id = ? AND user_id = ? AND item_id = ?",
            params![bill_id, user_id, item_id],
            |row| row.get::<_, String>(0),
        );

        match existing {
            Ok(id) => return Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => {}
            Err(e) => return Err(e.into()),
        }

        let id = Uuid::new_v4().to_string();
        // Only items that belong to this bill can be claimed on it
        let inserted = self.conn.execute(
            r#"INSERT INTO selections (id, bill_id, user_id, item_id, created_at)
               SELECT ?1, bill_id, ?2, id, ?3 FROM items WHERE id = ?4 AND bill_id = ?5"#,
            params![id, user_id, now(), item_id, bill_id],
        )?;
        if inserted == 0 {
            bail!("Item {} is not on bill {}", item_id, bill_id);
        }

        debug!(bill = %bill_id, user = %user_id, item = %item_id, "item selected");
        Ok(Some(id))
    }

    /// Item ids selected by a user, in the order they were picked
    pub fn get_user_selections(&self, bill_id: &str, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id FROM selections
             WHERE bill_id = ? AND user_id = ?
             ORDER BY created_at, rowid",
        )?;

        let rows = stmt.query_map(params![bill_id, user_id], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ============================================
    // PAYMENTS
    // ============================================

    /// Record the cumulative amount a user has paid; replaces any earlier amount
    pub fn set_payment(&self, bill_id: &str, user_id: &str, amount: f64) -> Result<String> {
        let timestamp = now();
        let id: String = self
            .conn
            .query_row(
                r#"INSERT INTO payments (id, bill_id, user_id, amount, created_at, updated_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                   ON CONFLICT(bill_id, user_id) DO UPDATE SET
                       amount = excluded.amount,
                       updated_at = excluded.updated_at
                   RETURNING id"#,
                params![Uuid::new_v4().to_string(), bill_id, user_id, amount, timestamp],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to record payment on bill {}", bill_id))?;

        debug!(bill = %bill_id, user = %user_id, amount, "payment recorded");
        Ok(id)
    }

    /// Amount paid so far, 0 when nothing was recorded
    pub fn get_payment(&self, bill_id: &str, user_id: &str) -> Result<f64> {
        let result = self.conn.query_row(
            "SELECT amount FROM payments WHERE bill_id = ? AND user_id = ?",
            params![bill_id, user_id],
            |row| row.get::<_, f64>(0),
        );

        match result {
            Ok(amount) => Ok(amount),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0.0),
            Err(e) => Err(e.into()),
        }
    }

    /// Everyone who has selected something or paid on a bill
    pub fn participants(&self, bill_id: &str) -> Result<Vec<ParticipantRow>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT k.user_id, u.name,
                      (SELECT COUNT(*) FROM selections s
                        WHERE s.bill_id = ?1 AND s.user_id = k.user_id) as selected_count,
                      (SELECT COALESCE(SUM(i.price), 0.0) FROM selections s
                        JOIN items i ON i.id = s.item_id
                        WHERE s.bill_id = ?1 AND s.user_id = k.user_id) as subtotal,
                      COALESCE((SELECT p.amount FROM payments p
                        WHERE p.bill_id = ?1 AND p.user_id = k.user_id), 0.0) as amount_paid
               FROM (SELECT user_id FROM selections WHERE bill_id = ?1
                     UNION
                     SELECT user_id FROM payments WHERE bill_id = ?1) k
               LEFT JOIN users u ON u.session_id = k.user_id
               ORDER BY u.name, k.user_id"#,
        )?;

        let rows = stmt.query_map(params![bill_id], |row| {
            Ok(ParticipantRow {
                user_id: row.get(0)?,
                name: row.get(1)?,
                selected_count: row.get(2)?,
                subtotal: row.get(3)?,
                amount_paid: row.get(4)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ============================================
    // USERS
    // ============================================

    pub fn get_or_create_user(&self, session_id: &str, name: &str) -> Result<String> {
        if let Some(user) = self.get_user_by_session_id(session_id)? {
            return Ok(user.id);
        }

        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO users (id, session_id, name, created_at) VALUES (?, ?, ?, ?)",
            params![id, session_id, name, now()],
        )?;
        info!(user = %id, name, "user registered");
        Ok(id)
    }

    pub fn get_user_by_session_id(&self, session_id: &str) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT id, session_id, name, created_at FROM users WHERE session_id = ?",
            params![session_id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    name: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        );

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn rename_user(&self, session_id: &str, name: &str) -> Result<()> {
        let user_id = self.get_or_create_user(session_id, name)?;
        self.conn.execute(
            "UPDATE users SET name = ? WHERE id = ?",
            params![name, user_id],
        )?;
        Ok(())
    }
}

impl FromSql for BillStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse::<BillStatus>()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for BillStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}
