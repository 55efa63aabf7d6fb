//! The apply endpoint: atomic validate-and-mutate for deposits and withdrawals.

use std::str::FromStr;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    member::{get_member_by_tag, update_member_balance},
    transaction::{TransactionKind, db::append_ledger_entry},
};

/// The JSON request body for applying a transaction.
#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    /// The tag of the member whose balance to move.
    pub tag: String,
    /// The transaction kind, `DEPOSIT` or `WITHDRAW`.
    pub kind: String,
    /// The amount to move, in the smallest currency unit.
    pub amount: i64,
}

/// The JSON response body for a successfully applied transaction.
#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    /// The member's balance after the transaction was applied.
    pub new_balance: i64,
}

/// Validate and atomically apply a deposit or withdrawal to a member's
/// balance.
///
/// Checks run in a fixed order and the first failing check wins: the amount
/// must be positive, the member must exist, and a withdrawal must not exceed
/// the current balance. On success the balance mutation and the ledger append
/// commit as one SQL transaction and the new balance is returned.
///
/// The read-modify-write runs inside an IMMEDIATE transaction taken while
/// holding the connection, so two concurrent applies against the same member
/// can never both read the pre-update balance.
///
/// # Errors
/// Returns [Error::InvalidAmount], [Error::MemberNotFound], or
/// [Error::InsufficientFunds] when validation fails; in every failure case no
/// partial effect is left behind.
pub fn apply_transaction(
    tag: &str,
    kind: TransactionKind,
    amount: i64,
    connection: &Connection,
) -> Result<i64, Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let member = get_member_by_tag(tag, &sql_transaction)?;

    let new_balance = match kind {
        // A deposit that would overflow the balance cannot be represented, so
        // it is rejected like any other invalid amount.
        TransactionKind::Deposit => member
            .balance
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?,
        TransactionKind::Withdraw => {
            if amount > member.balance {
                // Dropping the transaction without committing rolls it back.
                return Err(Error::InsufficientFunds);
            }

            member.balance - amount
        }
    };

    update_member_balance(member.id, new_balance, &sql_transaction)?;
    append_ledger_entry(
        member.id,
        kind,
        amount,
        OffsetDateTime::now_utc(),
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(new_balance)
}

/// Handle transaction requests (POST).
///
/// The kind arrives as a raw string so that an unknown kind is reported as
/// [Error::InvalidKind] before the amount and member checks, matching the
/// processor's validation order.
pub async fn apply_transaction_endpoint(
    State(state): State<AppState>,
    payload: Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<Json<ApplyResponse>, Error> {
    let Json(request) = payload.map_err(|rejection| {
        Error::InvalidInput(format!("the request body could not be parsed: {rejection}"))
    })?;

    let kind = TransactionKind::from_str(&request.kind)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let new_balance = apply_transaction(&request.tag, kind, request.amount, &connection)?;

    Ok(Json(ApplyResponse { new_balance }))
}


#[cfg(test)]
mod apply_concurrency_tests {
    use std::{
        sync::{Arc, Mutex},
        thread,
    };

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        member::{MemberName, MemberTag, get_member_by_tag, register_member},
        transaction::TransactionKind,
    };

    use super::apply_transaction;

    // No lost updates: concurrent unit deposits against one member must all
    // land, leaving the balance exactly equal to the number of deposits.
    #[test]
    fn concurrent_deposits_are_not_lost() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        register_member(
            MemberTag::new_unchecked("AAA111"),
            MemberName::new_unchecked("Alice"),
            date!(2006 - 01 - 02),
            0,
            &connection,
        )
        .expect("Could not register test member");

        let shared_connection = Arc::new(Mutex::new(connection));
        const THREADS: usize = 8;
        const DEPOSITS_PER_THREAD: usize = 25;

        thread::scope(|scope| {
            for _ in 0..THREADS {
                let shared_connection = Arc::clone(&shared_connection);
                scope.spawn(move || {
                    for _ in 0..DEPOSITS_PER_THREAD {
                        let connection = shared_connection.lock().unwrap();
                        apply_transaction("AAA111", TransactionKind::Deposit, 1, &connection)
                            .expect("Could not apply deposit");
                    }
                });
            }
        });

        let connection = shared_connection.lock().unwrap();
        let member = get_member_by_tag("AAA111", &connection).unwrap();
        assert_eq!(member.balance, (THREADS * DEPOSITS_PER_THREAD) as i64);
    }

    // Concurrent withdrawals must never drive the balance negative; the
    // rejected ones report insufficient funds.
    #[test]
    fn concurrent_withdrawals_never_overdraw() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        register_member(
            MemberTag::new_unchecked("AAA111"),
            MemberName::new_unchecked("Alice"),
            date!(2006 - 01 - 02),
            10,
            &connection,
        )
        .expect("Could not register test member");

        let shared_connection = Arc::new(Mutex::new(connection));

        let successes: usize = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let shared_connection = Arc::clone(&shared_connection);
                    scope.spawn(move || {
                        let mut successes = 0;
                        for _ in 0..5 {
                            let connection = shared_connection.lock().unwrap();
                            if apply_transaction(
                                "AAA111",
                                TransactionKind::Withdraw,
                                1,
                                &connection,
                            )
                            .is_ok()
                            {
                                successes += 1;
                            }
                        }
                        successes
                    })
                })
                .collect();

            handles.into_iter().map(|handle| handle.join().unwrap()).sum()
        });

        // 20 attempted unit withdrawals against a balance of 10.
        assert_eq!(successes, 10);
        let connection = shared_connection.lock().unwrap();
        let member = get_member_by_tag("AAA111", &connection).unwrap();
        assert_eq!(member.balance, 0);
    }
}
