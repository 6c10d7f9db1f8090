//! The API endpoint paths.
//!
//! Routes match on path prefixes, see [crate::routing].

/// The route for checking that the server is up.
pub const HEALTH: &str = "/api/health";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The prefix of the route to delete a transaction, followed by its ID.
pub const TRANSACTION_BY_ID: &str = "/api/transactions/";
