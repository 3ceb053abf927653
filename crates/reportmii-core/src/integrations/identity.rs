//! Identity sources for namespacing stored analyses.

use crate::integrations::traits::IdentityProvider;

/// Fallback owner when no identity is available.
pub const LOCAL_USER: &str = "local";

/// Reads `REPORTMII_USER`, then the OS user name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvIdentity;

impl IdentityProvider for EnvIdentity {
    fn current_user(&self) -> Option<String> {
        ["REPORTMII_USER", "USER", "USERNAME"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }
}

/// Fixed identity, e.g. from a `--user` flag or a signed-in session token.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub String);

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Resolve the owner for persistence keys, falling back to [`LOCAL_USER`].
pub fn resolve_owner(provider: &dyn IdentityProvider) -> String {
    provider
        .current_user()
        .unwrap_or_else(|| LOCAL_USER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Anonymous;

    impl IdentityProvider for Anonymous {
        fn current_user(&self) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_resolve_owner() {
        assert_eq!(resolve_owner(&StaticIdentity("ana".into())), "ana");
        assert_eq!(resolve_owner(&Anonymous), LOCAL_USER);
    }
}
