//! Defines the transaction model and the draft used to create transactions.

use serde::{Deserialize, Serialize};

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

/// The kind recorded when a request does not specify one, i.e. income.
pub const DEFAULT_KIND: &str = "pemasukan";

/// The category recorded when a request does not specify one.
pub const DEFAULT_CATEGORY: &str = "General";

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The field order is the column order of the data file and the key order of
/// the JSON representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the store.
    pub id: TransactionId,
    /// Whether the money flowed in ("pemasukan") or out ("pengeluaran").
    ///
    /// Stored verbatim, any other value is accepted.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free text category, e.g. "Food".
    pub category: String,
    /// The amount of money. The sign is whatever the caller supplied.
    pub amount: f64,
    /// A text description of what the transaction was for, may be empty.
    pub description: String,
    /// When the transaction happened, conventionally `YYYY-MM-DD`.
    pub date: String,
}

impl Transaction {
    /// Create a new transaction draft.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: f64, date: &str) -> TransactionBuilder {
        TransactionBuilder {
            kind: DEFAULT_KIND.to_owned(),
            category: DEFAULT_CATEGORY.to_owned(),
            amount,
            description: String::new(),
            date: date.to_owned(),
        }
    }
}

/// A transaction that has not been stored yet and so has no ID.
///
/// # Examples
///
/// ```
/// use money_manager::Transaction;
///
/// let draft = Transaction::build(-25000.0, "2024-03-01")
///     .kind("pengeluaran")
///     .category("Food")
///     .description("Lunch");
///
/// assert_eq!(draft.finalize(7).id, 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// See [Transaction::kind].
    pub kind: String,
    /// See [Transaction::category].
    pub category: String,
    /// See [Transaction::amount].
    pub amount: f64,
    /// See [Transaction::description].
    pub description: String,
    /// See [Transaction::date].
    pub date: String,
}

impl TransactionBuilder {
    /// Set the kind of the transaction.
    pub fn kind(mut self, kind: &str) -> Self {
        self.kind = kind.to_owned();
        self
    }

    /// Set the category of the transaction.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the description of the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Attach the ID assigned by the store.
    pub fn finalize(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            category: self.category,
            amount: self.amount,
            description: self.description,
            date: self.date,
        }
    }
}
