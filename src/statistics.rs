//! Aggregate statistics for the dashboard.

use axum::{Json, extract::State};
use rusqlite::Connection;
use serde::Serialize;

use crate::{AppState, Error};

/// Aggregate figures derived from the member registry and the ledger.
///
/// These are always recomputed from the authoritative tables rather than kept
/// as separate counters, so they cannot drift from the underlying data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// The sum of every member's current balance.
    pub total_balance: i64,
    /// The total number of ledger entries.
    pub total_transactions: i64,
    /// The number of registered members.
    ///
    /// The name is historical: there is no activity predicate, every
    /// registered member counts.
    pub active_members: i64,
}

/// Recompute the aggregate statistics from the member and ledger tables.
///
/// The three aggregates are read in a single statement so they describe one
/// consistent snapshot of the database.
pub fn compute_statistics(connection: &Connection) -> Result<Statistics, Error> {
    connection
        .query_row(
            "SELECT
                (SELECT COALESCE(SUM(balance), 0) FROM member),
                (SELECT COUNT(*) FROM ledger),
                (SELECT COUNT(*) FROM member);",
            [],
            |row| {
                Ok(Statistics {
                    total_balance: row.get(0)?,
                    total_transactions: row.get(1)?,
                    active_members: row.get(2)?,
                })
            },
        )
        .map_err(|error| error.into())
}

/// Handle statistics requests (GET).
pub async fn get_statistics_endpoint(
    State(state): State<AppState>,
) -> Result<Json<Statistics>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    compute_statistics(&connection).map(Json)
}
