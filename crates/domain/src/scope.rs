use std::str::FromStr;

use scopegate_core::AppError;
use serde::{Deserialize, Serialize};

/// OpenID Connect scopes granted to every user regardless of claim data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardScope {
    /// Authenticates the request as an OpenID Connect request.
    #[serde(rename = "openid")]
    OpenId,
    /// Grants access to profile claims.
    Profile,
    /// Grants access to the email claims.
    Email,
    /// Grants access to the group membership claim.
    Groups,
}

impl StandardScope {
    /// Returns the scope name as it appears in a request.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenId => "openid",
            Self::Profile => "profile",
            Self::Email => "email",
            Self::Groups => "groups",
        }
    }

    /// Returns all standard scopes.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[StandardScope] = &[
            StandardScope::OpenId,
            StandardScope::Profile,
            StandardScope::Email,
            StandardScope::Groups,
        ];

        ALL
    }

    /// Returns whether the name matches a standard scope exactly.
    #[must_use]
    pub fn is_standard(value: &str) -> bool {
        Self::from_str(value).is_ok()
    }
}

impl FromStr for StandardScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "openid" => Ok(Self::OpenId),
            "profile" => Ok(Self::Profile),
            "email" => Ok(Self::Email),
            "groups" => Ok(Self::Groups),
            _ => Err(AppError::Validation(format!(
                "unknown standard scope '{value}'"
            ))),
        }
    }
}

/// Splits an OAuth `scope` parameter into individual scope names.
///
/// Tokens are separated by ASCII whitespace. Order and duplicates are kept;
/// no case folding is applied.
#[must_use]
pub fn parse_scope_parameter(value: &str) -> Vec<String> {
    value
        .split_ascii_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Joins scope names into a space-delimited OAuth `scope` parameter.
#[must_use]
pub fn format_scope_parameter(scopes: &[String]) -> String {
    scopes.join(" ")
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{StandardScope, format_scope_parameter, parse_scope_parameter};

    #[test]
    fn standard_scope_storage_values_parse_back() {
        for scope in StandardScope::all() {
            let parsed = StandardScope::from_str(scope.as_str());
            assert!(parsed.is_ok());
            assert_eq!(parsed.unwrap_or(StandardScope::Groups), *scope);
        }
    }

    #[test]
    fn standard_scope_match_is_case_sensitive() {
        assert!(StandardScope::is_standard("openid"));
        assert!(!StandardScope::is_standard("OpenID"));
        assert!(!StandardScope::is_standard("offline_access"));
    }

    #[test]
    fn scope_parameter_keeps_order_and_duplicates() {
        assert_eq!(
            parse_scope_parameter("  openid team\tdepartment  team\n"),
            vec!["openid", "team", "department", "team"]
        );
    }

    #[test]
    fn empty_scope_parameter_yields_no_scopes() {
        assert!(parse_scope_parameter(" \t ").is_empty());
    }

    #[test]
    fn scope_parameter_is_formatted_with_single_spaces() {
        let scopes = vec!["openid".to_owned(), "team".to_owned()];
        assert_eq!(format_scope_parameter(&scopes), "openid team");
    }

    proptest! {
        #[test]
        fn parsed_scopes_never_contain_whitespace(value in "[a-z_ \t]{0,48}") {
            let scopes = parse_scope_parameter(value.as_str());
            prop_assert_eq!(scopes.len(), value.split_whitespace().count());
            for scope in &scopes {
                prop_assert!(!scope.is_empty());
                prop_assert!(!scope.contains(char::is_whitespace));
            }
        }
    }
}
