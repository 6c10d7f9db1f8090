//! Defines the endpoint for listing transactions.

use crate::{AppState, http::Response};

/// A route handler responding with every transaction as a JSON array, newest first.
pub fn get_transactions_endpoint(state: &AppState) -> Response {
    match state.lock_store().and_then(|store| store.list_all()) {
        Ok(transactions) => Response::json_from(&transactions),
        Err(error) => {
            tracing::error!("Could not load transactions: {error}");
            Response::failure("Could not load transactions")
        }
    }
}
