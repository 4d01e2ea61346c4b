// handlers/public/pages.rs - Page shell
//
// The service renders no UI. Page paths the access middleware let through
// answer with a small descriptor of what would be rendered, so redirects and
// pass-throughs are observable end to end.

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::access::{classify_path, is_api_path, return_target, Actor, AuthenticatedActor, RouteClass};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::types::LOGIN_PATH;

#[derive(Debug, Serialize)]
pub struct PageDescriptor {
    pub page: String,
    pub class: RouteClass,
    pub actor: Option<AuthenticatedActor>,
    /// Where the login page sends the actor afterwards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
}

pub async fn page_shell(request: Request) -> Response {
    let path = request.uri().path();

    let class = match classify_path(path) {
        Some(class) if !is_api_path(path) => class,
        _ => return ApiError::not_found(format!("No route for {}", path)).into_response(),
    };

    let actor = request
        .extensions()
        .get::<Actor>()
        .and_then(Actor::authenticated)
        .cloned();

    let return_to = if path == LOGIN_PATH {
        request.uri().query().and_then(return_target)
    } else {
        None
    };

    let descriptor = PageDescriptor {
        page: path.to_string(),
        class,
        actor,
        return_to,
    };
    ApiResponse::success(descriptor).into_response()
}
