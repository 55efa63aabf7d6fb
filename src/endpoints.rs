//! The API endpoint URIs.

/// The root route which reports that the service is up.
pub const ROOT: &str = "/";
/// The route to register a new member (POST) or list all members (GET).
pub const MEMBERS: &str = "/api/members";
/// The route to look up a single member and their transaction history.
pub const MEMBER: &str = "/api/members/{tag}";
/// The route to apply a deposit or withdrawal to a member's balance.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for the global transaction history, newest first.
pub const TRANSACTION_HISTORY: &str = "/api/transactions/history";
/// The route for aggregate dashboard statistics.
pub const STATISTICS: &str = "/api/statistics";

// These tests are here so that we know the route constants will parse as URIs.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::MEMBERS);
        assert_endpoint_is_valid_uri(endpoints::MEMBER);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION_HISTORY);
        assert_endpoint_is_valid_uri(endpoints::STATISTICS);
    }
}
