pub mod claims;
pub mod classify;
pub mod migrate;
pub mod routes;
pub mod token;
