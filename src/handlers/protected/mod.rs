// handlers/protected/mod.rs - Handlers for signed-in actors
//
// Each handler takes `CurrentActor`, which rejects with 401 when the access
// middleware did not attach an authenticated actor. Role and ownership are
// re-checked here before any mutation.

pub mod claims;     // /api/claims
pub mod me;         // /api/me
pub mod onboarding; // /api/onboarding
pub mod owner;      // /api/owner/businesses
