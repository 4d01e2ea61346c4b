use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::SessionVerifier;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::Store;
use crate::handlers::{elevated, protected, public};
use crate::middleware::access_middleware;

/// Shared handles every handler and the access middleware read from
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<SessionVerifier>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            sessions: Arc::new(SessionVerifier::new(&config.security)),
            store,
            config: Arc::new(config),
        }
    }
}

/// Full router: API routes, the page shell fallback and the access interceptor
/// in front of all of them.
pub fn app(state: AppState) -> Router {
    let max_body = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        // System
        .route("/health", get(public::health))
        .route("/api/hooks/identity-created", post(public::identity_created))
        // Any signed-in account
        .merge(profile_routes())
        // Personal accounts
        .merge(onboarding_routes())
        // Business accounts
        .merge(owner_routes())
        // Administrators
        .merge(admin_routes())
        // Pages
        .fallback(public::page_shell)
        .layer(from_fn_with_state(state.clone(), access_middleware))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn profile_routes() -> Router<AppState> {
    use protected::me;

    Router::new().route("/api/me", get(me::me_get).patch(me::me_patch).delete(me::me_delete))
}

fn onboarding_routes() -> Router<AppState> {
    use protected::onboarding;

    Router::new()
        .route("/api/onboarding", get(onboarding::onboarding_get))
        .route("/api/onboarding/:step", post(onboarding::step_post))
}

fn owner_routes() -> Router<AppState> {
    use protected::{claims, owner};

    Router::new()
        .route("/api/claims", get(claims::claims_get).post(claims::claims_post))
        .route("/api/owner/businesses", get(owner::dashboard_get))
        .route(
            "/api/owner/businesses/:id",
            patch(owner::business_patch).delete(owner::business_delete),
        )
}

fn admin_routes() -> Router<AppState> {
    use elevated::{claims, ownership, profiles};

    Router::new()
        .route("/api/admin/claims", get(claims::claims_list))
        .route("/api/admin/claims/:id/approve", post(claims::claim_approve))
        .route("/api/admin/claims/:id/reject", post(claims::claim_reject))
        .route(
            "/api/admin/ownership/:profile_id/:business_id",
            delete(ownership::ownership_revoke),
        )
        .route("/api/admin/profiles/:id/role", put(profiles::role_put))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
