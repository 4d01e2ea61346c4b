use serde::Serialize;

/// Bucket a request path falls into. A path matching no table entry is
/// unclassified, represented as `None` by [`classify_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteClass {
    /// Infrastructure endpoints that bypass the classifier entirely
    System,
    /// Pages anyone may view, signed in or not
    Public,
    /// Login and signup; signed-in actors are sent to their landing page
    GuestOnly,
    /// Onboarding pages and the onboarding API
    Onboarding,
    /// Personal account features: profile, saved items, reviews, discovery feed
    PersonalOnly,
    /// Business account features: dashboard, claims, listing management
    BusinessOnly,
    /// Available to every signed-in account context
    Shared,
    /// Direct messaging, the one cross-context feature
    Messaging,
    /// Administrative surfaces
    AdminOnly,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::System => "system",
            RouteClass::Public => "public",
            RouteClass::GuestOnly => "guest_only",
            RouteClass::Onboarding => "onboarding",
            RouteClass::PersonalOnly => "personal_only",
            RouteClass::BusinessOnly => "business_only",
            RouteClass::Shared => "shared",
            RouteClass::Messaging => "messaging",
            RouteClass::AdminOnly => "admin_only",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "match", content = "path", rename_all = "snake_case")]
pub enum PathPattern {
    /// Matches the path exactly
    Exact(&'static str),
    /// Matches the path and anything below it on a segment boundary:
    /// `/profile` matches `/profile` and `/profile/edit`, never `/profiles`
    Prefix(&'static str),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => path == *p,
            PathPattern::Prefix(p) => match path.strip_prefix(p) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PathPattern::Exact(p) | PathPattern::Prefix(p) => p,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteRule {
    pub pattern: PathPattern,
    pub class: RouteClass,
}

const fn exact(path: &'static str, class: RouteClass) -> RouteRule {
    RouteRule { pattern: PathPattern::Exact(path), class }
}

const fn prefix(path: &'static str, class: RouteClass) -> RouteRule {
    RouteRule { pattern: PathPattern::Prefix(path), class }
}

/// Ordered classification table. First match wins.
pub static ROUTE_TABLE: &[RouteRule] = &[
    // Infrastructure
    exact("/health", RouteClass::System),
    prefix("/api/hooks", RouteClass::System),
    prefix("/auth/callback", RouteClass::System),
    // Public discovery surface
    exact("/", RouteClass::Public),
    prefix("/search", RouteClass::Public),
    prefix("/business", RouteClass::Public),
    prefix("/category", RouteClass::Public),
    // Authentication pages
    prefix("/login", RouteClass::GuestOnly),
    prefix("/signup", RouteClass::GuestOnly),
    prefix("/business-signup", RouteClass::GuestOnly),
    // Onboarding
    prefix("/onboarding", RouteClass::Onboarding),
    prefix("/api/onboarding", RouteClass::Onboarding),
    // Personal account context
    prefix("/home", RouteClass::PersonalOnly),
    prefix("/for-you", RouteClass::PersonalOnly),
    prefix("/profile", RouteClass::PersonalOnly),
    prefix("/saved", RouteClass::PersonalOnly),
    prefix("/write-review", RouteClass::PersonalOnly),
    // Business account context
    prefix("/my-businesses", RouteClass::BusinessOnly),
    prefix("/claim-business", RouteClass::BusinessOnly),
    prefix("/api/owner", RouteClass::BusinessOnly),
    prefix("/api/claims", RouteClass::BusinessOnly),
    // Cross-context messaging
    prefix("/dm", RouteClass::Messaging),
    prefix("/api/messages", RouteClass::Messaging),
    // Every signed-in context
    prefix("/settings", RouteClass::Shared),
    prefix("/notifications", RouteClass::Shared),
    prefix("/api/me", RouteClass::Shared),
    // Administration
    prefix("/admin", RouteClass::AdminOnly),
    prefix("/api/admin", RouteClass::AdminOnly),
];

/// Resolve a path (without query string) to its class.
///
/// Paths with dot segments or empty segments never match: they stay
/// unclassified so the fail-closed default applies.
pub fn classify_path(path: &str) -> Option<RouteClass> {
    let path = normalize(path)?;
    ROUTE_TABLE
        .iter()
        .find(|rule| rule.pattern.matches(path))
        .map(|rule| rule.class)
}

/// True for paths the interceptor forwards without resolving an actor
pub fn is_system_path(path: &str) -> bool {
    classify_path(path) == Some(RouteClass::System)
}

/// API paths receive JSON denials instead of navigational redirects
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

fn normalize(path: &str) -> Option<&str> {
    if !path.starts_with('/') {
        return None;
    }
    // Single trailing slash is tolerated: `/profile/` is `/profile`
    let trimmed = match path.strip_suffix('/') {
        Some(rest) if !rest.is_empty() => rest,
        _ => path,
    };
    if trimmed == "/" {
        return Some(trimmed);
    }
    let suspicious = trimmed[1..]
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if suspicious {
        None
    } else {
        Some(trimmed)
    }
}
