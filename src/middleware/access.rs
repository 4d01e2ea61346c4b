use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde_json::json;

use crate::access::{classify, is_api_path, is_system_path, Actor, AuthenticatedActor, Decision};
use crate::app::AppState;
use crate::auth::extract_session_token;
use crate::error::ApiError;

/// Request interceptor run before every page and API handler.
///
/// Resolves the actor (one profile read), asks the classifier, and either
/// forwards the request with the actor in its extensions or answers with a
/// redirect. It never fails the request with a server error.
pub async fn access_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_system_path(&path) {
        return next.run(request).await;
    }

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.clone());

    let actor = resolve_actor(&state, request.headers()).await;

    match classify(&actor, &target) {
        Decision::PassThrough => {
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        Decision::Redirect(location) => {
            tracing::debug!("Access redirect: {} -> {}", target, location);
            deny(&path, &actor, &location)
        }
    }
}

/// Session → profile → actor. Any failure along the way yields `Anonymous`.
pub async fn resolve_actor(state: &AppState, headers: &HeaderMap) -> Actor {
    let Some(token) = extract_session_token(headers, &state.config.security.session_cookie) else {
        return Actor::Anonymous;
    };

    let session = match state.sessions.verify(&token) {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!("Session rejected: {}", e);
            return Actor::Anonymous;
        }
    };

    match state.store.get_profile(session.account_id).await {
        Ok(Some(profile)) => Actor::Authenticated(AuthenticatedActor::from(&profile)),
        Ok(None) => {
            tracing::warn!("No profile for authenticated account {}", session.account_id);
            Actor::Anonymous
        }
        Err(e) => {
            tracing::error!("Profile lookup failed for account {}: {}", session.account_id, e);
            Actor::Anonymous
        }
    }
}

fn deny(path: &str, actor: &Actor, location: &str) -> Response {
    if !is_api_path(path) {
        return Redirect::temporary(location).into_response();
    }

    let api_error = match actor {
        Actor::Anonymous => ApiError::unauthorized("Authentication required"),
        Actor::Authenticated(_) => ApiError::forbidden("This account cannot access this resource"),
    };
    let mut body = api_error.to_json();
    body["redirect"] = json!(location);
    (api_error.status_code(), Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request as HttpRequest, StatusCode},
        Router,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::app::{app, AppState};
    use crate::config::AppConfig;
    use crate::database::models::NewProfile;
    use crate::database::{MemoryStore, ProfileStore, Store};
    use crate::types::Role;

    async fn router_with(role: Option<Role>) -> (Router, Option<String>) {
        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn Store> = store.clone();
        let state = AppState::new(dyn_store, AppConfig::development());

        let token = match role {
            Some(role) => {
                let account_id = Uuid::new_v4();
                store
                    .create_profile(NewProfile { account_id, email: None, role })
                    .await
                    .unwrap();
                Some(state.sessions.issue(account_id, None).unwrap())
            }
            None => None,
        };
        (app(state), token)
    }

    fn page(path: &str, token: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri(path);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("access_token={}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn page_denial_is_temporary_redirect() {
        let (router, _) = router_with(None).await;
        let res = router.oneshot(page("/saved?sort=new", None)).await.unwrap();

        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap(),
            "/login?redirect=/saved%3Fsort%3Dnew"
        );
    }

    #[tokio::test]
    async fn api_denial_carries_redirect_in_body() {
        let (router, token) = router_with(Some(Role::BusinessOwner)).await;
        let res = router.oneshot(page("/api/admin/claims", token.as_deref())).await.unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "FORBIDDEN");
        assert_eq!(body["redirect"], "/my-businesses");
    }

    #[tokio::test]
    async fn system_paths_skip_the_classifier() {
        let (router, _) = router_with(None).await;
        let res = router.oneshot(page("/health", None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn pass_through_reaches_page_shell() {
        let (router, token) = router_with(Some(Role::BusinessOwner)).await;
        let res = router.oneshot(page("/dm/42", token.as_deref())).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
