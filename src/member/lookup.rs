//! Member lookup endpoint: a single member plus their transaction history.

use axum::{
    Json,
    extract::{Path, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    member::{Member, db::get_member_by_tag},
    transaction::{Transaction, get_ledger_for_member},
};

/// A member together with their full transaction history, oldest first.
#[derive(Debug, Serialize)]
pub struct MemberWithHistory {
    /// The member's registry fields.
    #[serde(flatten)]
    pub member: Member,
    /// Every ledger entry for the member, ordered oldest first.
    pub transactions: Vec<Transaction>,
}

/// Look up a member by tag along with their full ledger, oldest first.
///
/// # Errors
/// Returns [Error::MemberNotFound] if no member has the given tag.
pub fn get_member_with_history(
    tag: &str,
    connection: &Connection,
) -> Result<MemberWithHistory, Error> {
    let member = get_member_by_tag(tag, connection)?;
    let transactions = get_ledger_for_member(member.id, connection)?;

    Ok(MemberWithHistory {
        member,
        transactions,
    })
}

/// Handle member lookup requests (GET).
pub async fn get_member_endpoint(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<MemberWithHistory>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_member_with_history(&tag, &connection).map(Json)
}
