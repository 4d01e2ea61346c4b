// handlers/mod.rs - 3-tier handler layout
//
// Every request has already been through the access middleware, which
// redirects or rejects by route class. Handlers re-check role and ownership
// for anything that mutates.
//
// Public (system + page shell) → Protected (signed-in actor) → Elevated (admin)
pub mod public;    // Tier 1: no actor required (/health, /api/hooks/*, pages)
pub mod protected; // Tier 2: signed-in actor (/api/me, /api/onboarding, /api/claims, /api/owner/*)
pub mod elevated;  // Tier 3: administrator (/api/admin/*)
