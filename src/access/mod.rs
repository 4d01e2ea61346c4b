//! Request-time access control.
//!
//! `routes` holds the declarative classification table, `classifier` the pure
//! decision function applied to every request by
//! [`crate::middleware::access_middleware`].

pub mod classifier;
pub mod routes;

pub use classifier::{classify, login_redirect, return_target, Actor, AuthenticatedActor, Decision};
pub use routes::{
    classify_path, is_api_path, is_system_path, PathPattern, RouteClass, RouteRule, ROUTE_TABLE,
};
