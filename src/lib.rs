//! Memberbank is a small membership banking service: members are identified by
//! a physical RFID tag and hold a balance that is moved exclusively through an
//! append-only transaction ledger.
//!
//! This library provides a JSON REST API over two components:
//! - the member registry (registration, lookup, listing), and
//! - the transaction processor (deposits, withdrawals, history, statistics).

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod db;
mod endpoints;
mod logging;
mod member;
mod routing;
mod statistics;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A request field was missing, empty, or malformed.
    ///
    /// Detected before any business logic runs, so the caller can safely
    /// assume no state was touched.
    #[error("{0}")]
    InvalidInput(String),

    /// The transaction kind was neither DEPOSIT nor WITHDRAW.
    #[error("\"{0}\" is not a valid transaction kind, expected DEPOSIT or WITHDRAW")]
    InvalidKind(String),

    /// The transaction amount was zero or negative.
    #[error("the transaction amount must be a positive integer")]
    InvalidAmount,

    /// No member is registered with the given tag.
    #[error("no member is registered with the given tag")]
    MemberNotFound,

    /// The tag used for registration is already registered to another member.
    ///
    /// Tags map to physical cards, so two members can never share one.
    #[error("the tag is already registered to another member")]
    DuplicateTag,

    /// A withdrawal was larger than the member's current balance.
    ///
    /// Balances must never go negative, so the withdrawal is rejected and the
    /// balance is left unchanged. Retrying will not help until the member
    /// deposits more money.
    #[error("the withdrawal amount exceeds the member's balance")]
    InsufficientFunds,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("member.tag") =>
            {
                Error::DuplicateTag
            }
            rusqlite::Error::QueryReturnedNoRows => Error::MemberNotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The stable, machine-readable error kind reported to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "InvalidInput",
            Error::InvalidKind(_) => "InvalidKind",
            Error::InvalidAmount => "InvalidAmount",
            Error::MemberNotFound => "MemberNotFound",
            Error::DuplicateTag => "DuplicateTag",
            Error::InsufficientFunds => "InsufficientFunds",
            Error::DatabaseLockError | Error::SqlError(_) => "StorageUnavailable",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_)
            | Error::InvalidKind(_)
            | Error::InvalidAmount
            | Error::InsufficientFunds => StatusCode::BAD_REQUEST,
            Error::MemberNotFound => StatusCode::NOT_FOUND,
            Error::DuplicateTag => StatusCode::CONFLICT,
            Error::DatabaseLockError | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The JSON body returned for every failed request.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// A stable error kind that clients can match on.
    error: &'static str,
    /// A human-readable description of the failure.
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = match &self {
            // Storage errors are not intended to be shown to the client.
            Error::DatabaseLockError | Error::SqlError(_) => {
                tracing::error!("An unexpected error occurred: {}", self);
                "An internal error occurred. Try again later.".to_owned()
            }
            error => error.to_string(),
        };

        (
            self.status_code(),
            Json(ErrorBody {
                error: self.kind(),
                message,
            }),
        )
            .into_response()
    }
}
