//! Core member domain types.

use std::fmt::Display;

use serde::{Serialize, Serializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

/// Database identifier for a member.
pub type MemberId = i64;

/// The date format used for member birth dates in requests and responses.
const BIRTH_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a birth date string in `YYYY-MM-DD` format.
///
/// # Errors
///
/// This function will return an [Error::InvalidInput] if the string is not a
/// well-formed calendar date.
pub fn parse_birth_date(raw: &str) -> Result<Date, Error> {
    Date::parse(raw.trim(), BIRTH_DATE_FORMAT).map_err(|_| {
        Error::InvalidInput(format!(
            "\"{raw}\" is not a valid birth date, expected YYYY-MM-DD"
        ))
    })
}

fn serialize_birth_date<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = date.format(BIRTH_DATE_FORMAT).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

/// A validated, non-empty member tag (e.g. an RFID card value).
///
/// Tags are immutable and unique across all members.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct MemberTag(String);

impl MemberTag {
    /// Create a member tag.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidInput] if `tag` is an empty string.
    pub fn new(tag: &str) -> Result<Self, Error> {
        let tag = tag.trim();

        if tag.is_empty() {
            Err(Error::InvalidInput("the member tag cannot be empty".to_owned()))
        } else {
            Ok(Self(tag.to_string()))
        }
    }

    /// Create a member tag without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

impl AsRef<str> for MemberTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for MemberTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated, non-empty member display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct MemberName(String);

impl MemberName {
    /// Create a member name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidInput] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::InvalidInput("the member name cannot be empty".to_owned()))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a member name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for MemberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for MemberName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered member of the bank.
///
/// The balance is stored in the smallest currency unit and is only ever
/// mutated by the transaction processor, which guarantees it stays
/// non-negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    /// The ID of the member, assigned at registration.
    pub id: MemberId,
    /// The member's unique physical tag.
    pub tag: MemberTag,
    /// The member's display name.
    pub name: MemberName,
    /// The member's birth date.
    #[serde(serialize_with = "serialize_birth_date")]
    pub birth_date: Date,
    /// The member's current balance in the smallest currency unit.
    pub balance: i64,
}
