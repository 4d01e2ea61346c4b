pub mod access;
pub mod auth;
pub mod response;

pub use access::{access_middleware, resolve_actor};
pub use auth::CurrentActor;
pub use response::{ApiResponse, ApiResult};
