//! The global transaction history endpoint.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    transaction::{HistoryEntry, db::get_recent_ledger_entries},
};

/// Query parameters for the history feed.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Truncate the feed to the newest `limit` entries when given.
    pub limit: Option<u32>,
}

/// Handle global transaction history requests (GET).
///
/// Returns ledger entries newest first, each joined with the name and tag of
/// the member it belongs to.
pub async fn get_history_endpoint(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoryEntry>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_recent_ledger_entries(params.limit, &connection).map(Json)
}
