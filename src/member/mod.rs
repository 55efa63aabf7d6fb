//! The member registry.
//!
//! Members are identified by a unique physical tag (e.g. an RFID card value)
//! and hold a non-negative balance. This module contains:
//! - The `Member` domain types and field validation
//! - Database functions for creating and querying members
//! - The registration, lookup, and listing endpoints

mod db;
mod domain;
mod list;
mod lookup;
mod register;

pub use db::{
    create_member, create_member_table, get_all_members, get_member_by_tag, update_member_balance,
};
pub use domain::{Member, MemberId, MemberName, MemberTag, parse_birth_date};
pub use list::list_members_endpoint;
pub use lookup::get_member_endpoint;
pub use register::{register_member, register_member_endpoint};
