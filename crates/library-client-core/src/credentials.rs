use serde::{Deserialize, Serialize};

pub const DEFAULT_CSRF_HEADER_META: &str = "_csrf_header";
pub const DEFAULT_CSRF_TOKEN_META: &str = "_csrf";

/// Header name and token used to authenticate the state-changing borrow request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub header_name: String,
    pub token: String,
}

/// Source of the credential pair. Implementations must read fresh values on
/// every call; the page may rotate the token between loads.
pub trait CredentialSource {
    fn resolve(&self) -> Option<CredentialPair>;
}

/// Builds a pair from the two raw metadata values. Either value missing or
/// blank yields `None`, which is an expected anonymous context.
#[must_use]
pub fn resolve_credential_pair(
    header_name: Option<&str>,
    token: Option<&str>,
) -> Option<CredentialPair> {
    let header_name = non_empty(header_name?)?;
    let token = non_empty(token?)?;
    Some(CredentialPair { header_name, token })
}

/// Blank detection only; the value itself is passed through exactly as the
/// page provides it.
fn non_empty(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_pair_when_both_values_present() {
        let pair = resolve_credential_pair(Some("X-CSRF-TOKEN"), Some("abc123"))
            .expect("pair should resolve");
        assert_eq!(pair.header_name, "X-CSRF-TOKEN");
        assert_eq!(pair.token, "abc123");
    }

    #[test]
    fn token_is_passed_through_unchanged() {
        let pair = resolve_credential_pair(Some("X-CSRF-TOKEN"), Some(" abc123 "))
            .expect("pair should resolve");
        assert_eq!(pair.token, " abc123 ");
    }

    #[test]
    fn missing_header_name_is_absent() {
        assert_eq!(resolve_credential_pair(None, Some("abc123")), None);
    }

    #[test]
    fn missing_token_is_absent() {
        assert_eq!(resolve_credential_pair(Some("X-CSRF-TOKEN"), None), None);
    }

    #[test]
    fn blank_values_count_as_missing() {
        assert_eq!(resolve_credential_pair(Some("  "), Some("abc123")), None);
        assert_eq!(resolve_credential_pair(Some("X-CSRF-TOKEN"), Some("")), None);
    }
}
