//! Routes a raw request to its handler and renders the response.

use crate::{
    AppState, endpoints,
    health::get_health,
    http::{RawRequest, Response, request_text},
    logging::{log_request, log_response},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
    },
};

/// The body sent for requests that match no route.
const INDEX_BODY: &str = r#"{"message":"Money Manager API"}"#;

/// A resolved route, borrowing any path parameter from the request.
#[derive(Debug, PartialEq)]
enum Route<'a> {
    Preflight,
    Health,
    ListTransactions,
    CreateTransaction,
    /// Holds the path text after the transactions prefix.
    DeleteTransaction(&'a str),
    Index,
}

impl<'a> Route<'a> {
    /// Match `method` and `path` against the routing table.
    ///
    /// Paths match by prefix, so query strings and trailing segments are
    /// accepted, e.g. `GET /api/transactions?page=2` lists transactions.
    fn resolve(method: &str, path: &'a str) -> Self {
        match method {
            "OPTIONS" => Route::Preflight,
            "GET" if path.starts_with(endpoints::HEALTH) => Route::Health,
            "GET" if path.starts_with(endpoints::TRANSACTIONS) => Route::ListTransactions,
            "POST" if path.starts_with(endpoints::TRANSACTIONS) => Route::CreateTransaction,
            "DELETE" => match path.strip_prefix(endpoints::TRANSACTION_BY_ID) {
                Some(id_text) => Route::DeleteTransaction(id_text),
                None => Route::Index,
            },
            _ => Route::Index,
        }
    }
}

/// Handle one raw request buffer and return the complete response bytes.
///
/// Never fails: errors are reported as `{"success":false,...}` bodies with
/// status 200.
pub fn handle_request(state: &AppState, raw_request: &[u8]) -> Vec<u8> {
    let text = request_text(raw_request);
    let request = RawRequest::parse(&text);

    let span = tracing::debug_span!("request", method = request.method, path = request.path);
    let _guard = span.enter();

    log_request(request.method, request.path, request.body);

    let response = match Route::resolve(request.method, request.path) {
        Route::Preflight => Response::preflight(),
        Route::Health => get_health(),
        Route::ListTransactions => get_transactions_endpoint(state),
        Route::CreateTransaction => create_transaction_endpoint(state, request.body),
        Route::DeleteTransaction(id_text) => delete_transaction_endpoint(state, id_text),
        Route::Index => Response::json(INDEX_BODY.to_owned()),
    };

    log_response(response.body());

    response.into_bytes()
}
