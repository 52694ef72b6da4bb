//! Named remote operations and their resolved URLs.

use url::Url;

use common::{AppError, AppResult};

/// Path prefix shared by every API route
pub const API_PREFIX: &str = "api/v1/";

/// Named remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    // Authentication
    Login,
    Register,
    Logout,
    Profile,
    PasswordChange,
    TokenRefresh,

    // Products
    Products,
    ProductCreate,
    MyProducts,
    FeaturedProducts,
    TrendingProducts,

    // Categories
    Categories,
    CategoryTree,

    // Chat
    Conversations,
    Messages,

    // Payments
    Payments,
    BoostPackages,

    // Notifications
    Notifications,
    NotificationPreferences,

    // Reviews
    Reviews,

    // File uploads
    Upload,
}

impl Endpoint {
    pub const COUNT: usize = 21;

    /// Every variant, in declaration order.
    pub const ALL: [Endpoint; Endpoint::COUNT] = [
        Endpoint::Login,
        Endpoint::Register,
        Endpoint::Logout,
        Endpoint::Profile,
        Endpoint::PasswordChange,
        Endpoint::TokenRefresh,
        Endpoint::Products,
        Endpoint::ProductCreate,
        Endpoint::MyProducts,
        Endpoint::FeaturedProducts,
        Endpoint::TrendingProducts,
        Endpoint::Categories,
        Endpoint::CategoryTree,
        Endpoint::Conversations,
        Endpoint::Messages,
        Endpoint::Payments,
        Endpoint::BoostPackages,
        Endpoint::Notifications,
        Endpoint::NotificationPreferences,
        Endpoint::Reviews,
        Endpoint::Upload,
    ];

    /// Position in [`Endpoint::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Path relative to [`API_PREFIX`]. Always ends with `/`.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Login => "auth/login/",
            Endpoint::Register => "auth/register/",
            Endpoint::Logout => "auth/logout/",
            Endpoint::Profile => "auth/profile/",
            Endpoint::PasswordChange => "auth/password/change/",
            Endpoint::TokenRefresh => "auth/token/refresh/",
            Endpoint::Products => "products/",
            Endpoint::ProductCreate => "products/create/",
            Endpoint::MyProducts => "products/my-products/",
            Endpoint::FeaturedProducts => "products/featured/",
            Endpoint::TrendingProducts => "products/trending/",
            Endpoint::Categories => "categories/",
            Endpoint::CategoryTree => "categories/tree/",
            // Messages live under a conversation; see EndpointTable::messages
            Endpoint::Conversations | Endpoint::Messages => "chat/conversations/",
            Endpoint::Payments => "payments/",
            Endpoint::BoostPackages => "payments/boost-packages/",
            Endpoint::Notifications => "notifications/",
            Endpoint::NotificationPreferences => "notifications/preferences/",
            Endpoint::Reviews => "reviews/",
            Endpoint::Upload => "upload/",
        }
    }

    /// Identifier accepted on the command line, e.g. `featured-products`.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Login => "login",
            Endpoint::Register => "register",
            Endpoint::Logout => "logout",
            Endpoint::Profile => "profile",
            Endpoint::PasswordChange => "password-change",
            Endpoint::TokenRefresh => "token-refresh",
            Endpoint::Products => "products",
            Endpoint::ProductCreate => "product-create",
            Endpoint::MyProducts => "my-products",
            Endpoint::FeaturedProducts => "featured-products",
            Endpoint::TrendingProducts => "trending-products",
            Endpoint::Categories => "categories",
            Endpoint::CategoryTree => "category-tree",
            Endpoint::Conversations => "conversations",
            Endpoint::Messages => "messages",
            Endpoint::Payments => "payments",
            Endpoint::BoostPackages => "boost-packages",
            Endpoint::Notifications => "notifications",
            Endpoint::NotificationPreferences => "notification-preferences",
            Endpoint::Reviews => "reviews",
            Endpoint::Upload => "upload",
        }
    }
}

// `ALL[e.index()] == e` for every variant
const _: () = {
    let mut i = 0;
    while i < Endpoint::COUNT {
        assert!(Endpoint::ALL[i].index() == i);
        i += 1;
    }
};

impl std::str::FromStr for Endpoint {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Endpoint::ALL
            .iter()
            .copied()
            .find(|e| e.name() == wanted)
            .ok_or_else(|| AppError::validation(format!("Unknown endpoint '{}'", s)))
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Endpoint URLs resolved once from the configured base URL.
#[derive(Debug, Clone)]
pub struct EndpointTable {
    base: Url,
    urls: [Url; Endpoint::COUNT],
}

impl EndpointTable {
    /// Resolve every endpoint against `base_url`.
    ///
    /// A base with a path (`https://host/market`) is treated as a directory.
    pub fn new(base_url: &str) -> AppResult<Self> {
        let mut base = Url::parse(base_url.trim())
            .map_err(|e| AppError::config(format!("invalid API base URL '{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(AppError::config(format!(
                "API base URL '{}' cannot carry paths",
                base_url
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let api_root = join(&base, API_PREFIX)?;
        let resolved = Endpoint::ALL
            .iter()
            .map(|endpoint| join(&api_root, endpoint.path()))
            .collect::<AppResult<Vec<_>>>()?;
        let urls = <[Url; Endpoint::COUNT]>::try_from(resolved)
            .map_err(|_| AppError::internal("endpoint table size mismatch"))?;

        Ok(Self { base, urls })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL of a named endpoint.
    pub fn url(&self, endpoint: Endpoint) -> &Url {
        &self.urls[endpoint.index()]
    }

    /// URL of one item below a collection endpoint, e.g. `products/{id}/`.
    ///
    /// The id always becomes exactly one path segment: dot segments and
    /// slashes are rejected, anything else URL-special is percent-encoded.
    pub fn resource(&self, endpoint: Endpoint, id: &str) -> AppResult<Url> {
        let id = id.trim();
        if id.is_empty() || id == "." || id == ".." || id.contains('/') {
            return Err(AppError::validation(format!("Invalid resource id '{}'", id)));
        }
        child(self.url(endpoint), id)
    }

    /// Message list of one conversation.
    pub fn messages(&self, conversation_id: &str) -> AppResult<Url> {
        let conversation = self.resource(Endpoint::Conversations, conversation_id)?;
        child(&conversation, "messages")
    }
}

/// Append one segment plus a trailing slash to a directory URL.
fn child(parent: &Url, segment: &str) -> AppResult<Url> {
    let mut url = parent.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::config(format!("{} cannot carry paths", parent)))?
        .pop_if_empty()
        .push(segment)
        .push("");
    Ok(url)
}

fn join(base: &Url, path: &str) -> AppResult<Url> {
    base.join(path)
        .map_err(|e| AppError::config(format!("cannot resolve '{}' against {}: {}", path, base, e)))
}
