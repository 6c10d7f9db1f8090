//! Transaction management for the money manager.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for drafting transactions
//! - The file backed `TransactionStore`
//! - The route handlers for listing, creating and deleting transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod store;

pub use core::{Transaction, TransactionBuilder, TransactionId};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use list_endpoint::get_transactions_endpoint;
pub use store::{DATA_FILE_HEADER, TransactionStore};
