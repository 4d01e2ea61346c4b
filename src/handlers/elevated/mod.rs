// handlers/elevated/mod.rs - Administrator handlers
//
// The access middleware already limits /api/admin/* to administrators. Each
// handler checks the role again with `CurrentActor::require_role`.

pub mod claims;    // /api/admin/claims
pub mod ownership; // /api/admin/ownership
pub mod profiles;  // /api/admin/profiles
