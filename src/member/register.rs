//! Member registration endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    member::{Member, MemberName, MemberTag, db::create_member, parse_birth_date},
    transaction::{TransactionKind, append_ledger_entry},
};

/// The JSON request body for registering a new member.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// The member's display name.
    pub name: String,
    /// The member's birth date in `YYYY-MM-DD` format.
    pub birth_date: String,
    /// The unique physical tag to register the member under.
    pub tag: String,
    /// The member's starting balance. Defaults to zero when omitted.
    #[serde(default)]
    pub initial_deposit: i64,
}

/// Register a member with a starting balance.
///
/// The member row and, when `initial_deposit` is greater than zero, the seed
/// DEPOSIT ledger entry are committed in a single SQL transaction: either both
/// persist or neither does.
///
/// # Errors
/// Returns [Error::DuplicateTag] if another member already has `tag`, or an
/// error if the transaction could not be committed.
pub fn register_member(
    tag: MemberTag,
    name: MemberName,
    birth_date: Date,
    initial_deposit: i64,
    connection: &Connection,
) -> Result<Member, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let member = create_member(tag, name, birth_date, initial_deposit, &sql_transaction)?;

    if initial_deposit > 0 {
        append_ledger_entry(
            member.id,
            TransactionKind::Deposit,
            initial_deposit,
            OffsetDateTime::now_utc(),
            &sql_transaction,
        )?;
    }

    sql_transaction.commit()?;

    Ok(member)
}

/// Handle member registration requests (POST).
///
/// The request body is validated before any state is touched: a malformed body
/// or an empty/invalid field is rejected as [Error::InvalidInput].
pub async fn register_member_endpoint(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Member>), Error> {
    let Json(request) = payload.map_err(|rejection| {
        Error::InvalidInput(format!("the request body could not be parsed: {rejection}"))
    })?;

    let tag = MemberTag::new(&request.tag)?;
    let name = MemberName::new(&request.name)?;
    let birth_date = parse_birth_date(&request.birth_date)?;

    if request.initial_deposit < 0 {
        return Err(Error::InvalidInput(
            "the initial deposit cannot be negative".to_owned(),
        ));
    }

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let member = register_member(tag, name, birth_date, request.initial_deposit, &connection)?;

    Ok((StatusCode::CREATED, Json(member)))
}


#[cfg(test)]
mod register_member_endpoint_tests {
    use axum::{Json, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{AppState, Error, member::get_member_by_tag};

    use super::{RegisterRequest, register_member_endpoint};

    fn get_test_state() -> AppState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        AppState::new(connection).expect("Could not create app state")
    }

    fn valid_request() -> RegisterRequest {
        RegisterRequest {
            name: "Alice".to_string(),
            birth_date: "2006-01-02".to_string(),
            tag: "AAA111".to_string(),
            initial_deposit: 50_000,
        }
    }

    #[tokio::test]
    async fn register_returns_created_member() {
        let state = get_test_state();

        let (status, Json(member)) =
            register_member_endpoint(State(state.clone()), Ok(Json(valid_request())))
                .await
                .expect("registration should succeed");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(member.balance, 50_000);
        assert_eq!(
            get_member_by_tag("AAA111", &state.db_connection.lock().unwrap()),
            Ok(member)
        );
    }

    #[tokio::test]
    async fn register_fails_on_empty_name() {
        let state = get_test_state();
        let request = RegisterRequest {
            name: "  ".to_string(),
            ..valid_request()
        };

        let result = register_member_endpoint(State(state), Ok(Json(request))).await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn register_fails_on_malformed_birth_date() {
        let state = get_test_state();
        let request = RegisterRequest {
            birth_date: "02/01/2006".to_string(),
            ..valid_request()
        };

        let result = register_member_endpoint(State(state), Ok(Json(request))).await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn register_fails_on_negative_initial_deposit() {
        let state = get_test_state();
        let request = RegisterRequest {
            initial_deposit: -1,
            ..valid_request()
        };

        let result = register_member_endpoint(State(state.clone()), Ok(Json(request))).await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        // Validation failures must not create the member.
        assert_eq!(
            get_member_by_tag("AAA111", &state.db_connection.lock().unwrap()),
            Err(Error::MemberNotFound)
        );
    }

    #[tokio::test]
    async fn register_duplicate_tag_returns_conflict() {
        let state = get_test_state();
        register_member_endpoint(State(state.clone()), Ok(Json(valid_request())))
            .await
            .expect("first registration should succeed");

        let second = RegisterRequest {
            name: "Bob".to_string(),
            ..valid_request()
        };
        let result = register_member_endpoint(State(state), Ok(Json(second))).await;

        assert_eq!(result.err(), Some(Error::DuplicateTag));
    }
}
