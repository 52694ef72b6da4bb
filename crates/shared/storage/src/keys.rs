//! Persisted key names.

/// Separator between namespace and key name
pub const NAMESPACE_SEPARATOR: char = ':';

/// Logical keys of the persisted store.
///
/// `Notifications`, `SavedSearches` and `RecentlyViewed` belong to collaborators
/// outside the session core; they are listed so `clear_all` and collision checks
/// know about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    User,
    Token,
    RefreshToken,
    Notifications,
    SavedSearches,
    RecentlyViewed,
}

impl StorageKey {
    /// Every key, in a stable order.
    pub const ALL: [StorageKey; 6] = [
        StorageKey::User,
        StorageKey::Token,
        StorageKey::RefreshToken,
        StorageKey::Notifications,
        StorageKey::SavedSearches,
        StorageKey::RecentlyViewed,
    ];

    /// Keys owned by the session core.
    pub const SESSION: [StorageKey; 3] =
        [StorageKey::User, StorageKey::Token, StorageKey::RefreshToken];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::User => "user",
            StorageKey::Token => "token",
            StorageKey::RefreshToken => "refresh-token",
            StorageKey::Notifications => "notifications",
            StorageKey::SavedSearches => "saved-searches",
            StorageKey::RecentlyViewed => "recently-viewed",
        }
    }

    /// Full key inside a namespace, e.g. `evolutionMarket:token`.
    pub fn namespaced(&self, namespace: &str) -> String {
        format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, self.as_str())
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// True when `full_key` belongs to `namespace`.
pub fn in_namespace(full_key: &str, namespace: &str) -> bool {
    full_key
        .strip_prefix(namespace)
        .is_some_and(|rest| rest.starts_with(NAMESPACE_SEPARATOR))
}
