//! Bearer-token request decoration.

use std::fmt;

use crate::http::HttpRequest;

/// Attaches `Authorization: Bearer <token>` to outgoing requests.
///
/// The token is opaque here; whether it is valid is only discovered when the
/// server answers. `Debug` output never contains the token.
#[derive(Clone)]
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Set the authorization header on `request`, replacing any existing one.
    /// Everything else about the request is left untouched.
    pub fn apply(&self, mut request: HttpRequest) -> HttpRequest {
        request
            .headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));
        request
            .headers
            .push(("Authorization".to_string(), self.header_value()));
        request
    }
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth").field("token", &"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_sets_bearer_header() {
        let auth = BearerAuth::new("abc123");
        let req = auth.apply(HttpRequest::get("http://localhost/api"));
        assert_eq!(req.header("Authorization"), Some("Bearer abc123"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn apply_replaces_existing_authorization() {
        let auth = BearerAuth::new("fresh");
        let mut req = HttpRequest::get("http://localhost/api");
        req.headers.push(("authorization".to_string(), "Bearer stale".to_string()));
        req.headers.push(("accept".to_string(), "application/json".to_string()));

        let req = auth.apply(req);
        assert_eq!(req.header("authorization"), Some("Bearer fresh"));
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    #[test]
    fn apply_leaves_url_and_query_alone() {
        let auth = BearerAuth::new("t");
        let original = HttpRequest::get("http://localhost/api").with_query("key", "plasmid");
        let decorated = auth.apply(original.clone());
        assert_eq!(decorated.url, original.url);
        assert_eq!(decorated.query, original.query);
    }

    #[test]
    fn debug_redacts_token() {
        let auth = BearerAuth::new("super-secret");
        let printed = format!("{auth:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("redacted"));
    }
}
