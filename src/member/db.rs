//! Database operations for members.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    member::{Member, MemberId, MemberName, MemberTag},
};

/// Create a member and return it with its generated ID.
///
/// `balance` is the member's starting balance; callers are expected to record
/// a matching seed ledger entry in the same SQL transaction when it is
/// non-zero.
///
/// # Errors
/// Returns [Error::DuplicateTag] if a member with the same tag already exists.
pub fn create_member(
    tag: MemberTag,
    name: MemberName,
    birth_date: Date,
    balance: i64,
    connection: &Connection,
) -> Result<Member, Error> {
    connection.execute(
        "INSERT INTO member (tag, name, birth_date, balance) VALUES (?1, ?2, ?3, ?4);",
        (tag.as_ref(), name.as_ref(), birth_date, balance),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Member {
        id,
        tag,
        name,
        birth_date,
        balance,
    })
}

/// Retrieve a single member by their tag (exact match).
///
/// # Errors
/// Returns [Error::MemberNotFound] if no member has the given tag.
pub fn get_member_by_tag(tag: &str, connection: &Connection) -> Result<Member, Error> {
    connection
        .prepare("SELECT id, tag, name, birth_date, balance FROM member WHERE tag = :tag;")?
        .query_row(&[(":tag", tag)], map_member_row)
        .map_err(|error| error.into())
}

/// Retrieve all members ordered alphabetically by name.
pub fn get_all_members(connection: &Connection) -> Result<Vec<Member>, Error> {
    connection
        .prepare("SELECT id, tag, name, birth_date, balance FROM member ORDER BY name ASC;")?
        .query_map([], map_member_row)?
        .map(|maybe_member| maybe_member.map_err(|error| error.into()))
        .collect()
}

/// Overwrite a member's balance.
///
/// This is only called by the transaction processor, inside the same SQL
/// transaction that appends the matching ledger entry.
///
/// # Errors
/// Returns [Error::MemberNotFound] if the member does not exist.
pub fn update_member_balance(
    member_id: MemberId,
    new_balance: i64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE member SET balance = ?1 WHERE id = ?2;",
        (new_balance, member_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::MemberNotFound);
    }

    Ok(())
}

/// Initialize the member table and indexes.
pub fn create_member_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS member (
            id INTEGER PRIMARY KEY,
            tag TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            birth_date TEXT NOT NULL,
            balance INTEGER NOT NULL CHECK (balance >= 0)
        );

        CREATE INDEX IF NOT EXISTS idx_member_name ON member(name);",
    )?;

    Ok(())
}

fn map_member_row(row: &Row) -> Result<Member, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_tag: String = row.get(1)?;
    let raw_name: String = row.get(2)?;
    let birth_date = row.get(3)?;
    let balance = row.get(4)?;

    Ok(Member {
        id,
        tag: MemberTag::new_unchecked(&raw_tag),
        name: MemberName::new_unchecked(&raw_name),
        birth_date,
        balance,
    })
}
