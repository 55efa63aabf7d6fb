//! Member listing endpoint.

use axum::{Json, extract::State};

use crate::{
    AppState, Error,
    member::{Member, db::get_all_members},
};

/// Handle member listing requests (GET).
///
/// Members are returned ordered by name ascending so the listing is
/// deterministic. Transaction history is not included.
pub async fn list_members_endpoint(
    State(state): State<AppState>,
) -> Result<Json<Vec<Member>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_all_members(&connection).map(Json)
}

#[cfg(test)]
mod list_members_endpoint_tests {
    use axum::extract::State;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AppState,
        member::{MemberName, MemberTag, register_member},
    };

    use super::list_members_endpoint;

    #[tokio::test]
    async fn list_returns_members_ordered_by_name() {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection).expect("Could not create app state");
        {
            let connection = state.db_connection.lock().unwrap();
            for (tag, name) in [("BBB222", "Bob"), ("AAA111", "Alice")] {
                register_member(
                    MemberTag::new_unchecked(tag),
                    MemberName::new_unchecked(name),
                    date!(2006 - 01 - 02),
                    0,
                    &connection,
                )
                .expect("Could not register test member");
            }
        }

        let members = list_members_endpoint(State(state))
            .await
            .expect("Could not list members")
            .0;

        let names: Vec<_> = members
            .iter()
            .map(|member| member.name.to_string())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }
}
