use crate::{
    AppState, Error, extract::leading_int, http::Response, transaction::TransactionId,
};

/// A route handler for deleting a transaction.
///
/// `id_text` is the rest of the path after the transactions route, only its
/// leading integer is used.
pub fn delete_transaction_endpoint(state: &AppState, id_text: &str) -> Response {
    let id = match parse_transaction_id(id_text) {
        Ok(id) => id,
        Err(error) => {
            tracing::debug!("{error}");
            return Response::failure("Invalid ID");
        }
    };

    match state.lock_store().and_then(|store| store.delete_by_id(id)) {
        Ok(true) => {
            tracing::info!("Deleted transaction {id}");
            Response::success("Deleted")
        }
        Ok(false) => Response::failure("Not found"),
        Err(error) => {
            tracing::error!("Could not delete transaction {id}: {error}");
            Response::failure("Delete failed")
        }
    }
}

fn parse_transaction_id(id_text: &str) -> Result<TransactionId, Error> {
    leading_int(id_text).ok_or_else(|| Error::InvalidId(id_text.to_owned()))
}
