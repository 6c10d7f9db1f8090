//! Defines the endpoint for creating a new transaction.

use crate::{
    AppState, Error,
    extract::{extract_number_field, extract_string_field, leading_float},
    http::Response,
    transaction::{
        Transaction, TransactionBuilder,
        core::{DEFAULT_CATEGORY, DEFAULT_KIND},
    },
};

/// A route handler for creating a new transaction from a JSON-like `body`.
///
/// `body` is `None` when the request had no blank line after its headers.
/// Every field is optional: the kind defaults to income, the category to
/// "General", the amount to zero, the description to empty and the date to
/// today.
pub fn create_transaction_endpoint(state: &AppState, body: Option<&str>) -> Response {
    let Some(body) = body else {
        tracing::debug!("Create transaction request has no body");
        return Response::failure("No data");
    };

    match create_transaction(state, body) {
        Ok(transaction) => {
            tracing::info!("Saved transaction {}", transaction.id);
            Response::success("Transaction saved")
        }
        Err(Error::InvalidAmount(amount)) => {
            tracing::debug!("Rejected transaction with amount {amount:?}");
            Response::failure("Invalid amount")
        }
        Err(error) => {
            tracing::error!("Could not save transaction: {error}");
            Response::failure("Save failed")
        }
    }
}

fn create_transaction(state: &AppState, body: &str) -> Result<Transaction, Error> {
    let store = state.lock_store()?;
    let draft = parse_transaction_body(body, || store.current_date_string())?;

    store.append(draft)
}

/// Scan `body` for the transaction fields, see [crate::extract].
///
/// `today` is only called when the body has no date.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount text does not start with a number or
///   the number is too large to store,
/// - or the error from `today`.
fn parse_transaction_body(
    body: &str,
    today: impl FnOnce() -> Result<String, Error>,
) -> Result<TransactionBuilder, Error> {
    let amount = match extract_number_field(body, "amount") {
        Some(text) => leading_float(text)
            .filter(|amount| amount.is_finite())
            .ok_or_else(|| Error::InvalidAmount(text.to_owned()))?,
        None => 0.0,
    };

    let date = match extract_string_field(body, "date") {
        Some(date) => date.to_owned(),
        None => today()?,
    };

    Ok(Transaction::build(amount, &date)
        .kind(extract_string_field(body, "type").unwrap_or(DEFAULT_KIND))
        .category(extract_string_field(body, "category").unwrap_or(DEFAULT_CATEGORY))
        .description(extract_string_field(body, "description").unwrap_or_default()))
}
