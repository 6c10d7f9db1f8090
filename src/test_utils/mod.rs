#![allow(missing_docs)]

use serde_json::Value;
use tempfile::TempDir;
use time::UtcOffset;

use crate::{AppState, http::Response, timezone::LocalTimezone, transaction::TransactionStore};

/// An [AppState] with an initialized data file inside `dir`, using UTC for dates.
pub(crate) fn get_test_state(dir: &TempDir) -> AppState {
    let store = TransactionStore::new(
        dir.path().join("data.csv"),
        LocalTimezone::Fixed(UtcOffset::UTC),
    );

    AppState::new(store).unwrap()
}

#[track_caller]
pub(crate) fn assert_action_result(response: &Response, want_success: bool, want_message: &str) {
    let json: Value = serde_json::from_str(response.body())
        .unwrap_or_else(|error| panic!("want JSON body, got {:?}: {error}", response.body()));

    assert_eq!(
        json["success"],
        Value::Bool(want_success),
        "want success={want_success}, got body {}",
        response.body()
    );
    assert_eq!(
        json["message"],
        Value::String(want_message.to_owned()),
        "want message {want_message:?}, got body {}",
        response.body()
    );
}
