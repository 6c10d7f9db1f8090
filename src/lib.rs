//! Money Manager is a minimal personal finance record server.
//!
//! Income and expense transactions are kept in a flat comma separated file
//! and served over a small JSON API. The network layer hands each raw request
//! buffer to [handle_request], which routes it, calls the
//! [TransactionStore] and returns the complete HTTP response bytes.

#![warn(missing_docs)]

mod app_state;
mod endpoints;
mod extract;
mod health;
mod http;
mod logging;
mod routing;
mod server;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use http::MAX_REQUEST_SIZE;
pub use logging::LOG_BODY_LENGTH_LIMIT;
pub use routing::handle_request;
pub use server::{DEFAULT_PORTS, bind_first_available, graceful_shutdown, serve};
pub use timezone::LocalTimezone;
pub use transaction::{
    DATA_FILE_HEADER, Transaction, TransactionBuilder, TransactionId, TransactionStore,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The data file could not be created, opened, read or rewritten.
    #[error("could not access the data file: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row has a numeric column that could not be parsed.
    ///
    /// This aborts the whole operation instead of skipping the row.
    #[error("line {line}: could not parse {field} from \"{value}\"")]
    InvalidRecord {
        /// The line number in the data file, starting at 1.
        line: u64,
        /// The name of the offending column.
        field: &'static str,
        /// The raw text of the column.
        value: String,
    },

    /// The data file could not be read for a reason other than I/O.
    #[error("the data file is malformed: {0}")]
    MalformedFile(String),

    /// The amount in a request body is not a number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// The transaction ID in a request path is not an integer.
    #[error("\"{0}\" is not a valid transaction ID")]
    InvalidId(String),

    /// Could not acquire the store lock.
    #[error("could not acquire the store lock")]
    StoreLockError,

    /// The configured timezone is not a known canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// None of the candidate ports could be bound.
    #[error("could not bind to any of the ports {0:?}")]
    NoAvailablePort(Vec<u16>),
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        if error.is_io_error() {
            match error.into_kind() {
                csv::ErrorKind::Io(io_error) => Error::Io(io_error),
                kind => Error::MalformedFile(format!("{kind:?}")),
            }
        } else {
            Error::MalformedFile(error.to_string())
        }
    }
}
