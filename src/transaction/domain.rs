//! Core transaction domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, member::MemberId};

/// Database identifier for a ledger entry.
pub type TransactionId = i64;

/// The direction a transaction moves money: into or out of a member's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Money moving into the member's balance.
    Deposit,
    /// Money moving out of the member's balance.
    Withdraw,
}

impl TransactionKind {
    /// The wire representation of the kind, as stored in the database and
    /// accepted in requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdraw => "WITHDRAW",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(TransactionKind::Deposit),
            "WITHDRAW" => Ok(TransactionKind::Withdraw),
            other => Err(Error::InvalidKind(other.to_owned())),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A committed ledger entry.
///
/// Entries are immutable once created; the ledger is append-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the ledger entry.
    pub id: TransactionId,
    /// The ID of the member whose balance this entry moved.
    pub member_id: MemberId,
    /// Whether this entry was a deposit or a withdrawal.
    pub kind: TransactionKind,
    /// The amount moved, in the smallest currency unit. Always positive.
    pub amount: i64,
    /// When the entry was committed.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// A ledger entry in the global history feed, joined with the member it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// When the entry was committed.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Whether this entry was a deposit or a withdrawal.
    pub kind: TransactionKind,
    /// The amount moved, in the smallest currency unit.
    pub amount: i64,
    /// The display name of the member.
    pub name: String,
    /// The tag of the member.
    pub tag: String,
}
