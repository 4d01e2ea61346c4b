// handlers/public/mod.rs - Handlers that do not require a signed-in actor
//
// /health and /api/hooks/* are system paths and bypass the access middleware
// entirely. The page shell answers classified page paths the middleware let
// through.

pub mod health; // GET /health
pub mod hooks;  // POST /api/hooks/identity-created
pub mod pages;  // fallback page shell

pub use health::health;
pub use hooks::identity_created;
pub use pages::page_shell;
