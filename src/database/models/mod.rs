pub mod business;
pub mod claim;
pub mod ownership;
pub mod profile;

pub use business::{Business, BusinessUpdate, NewBusiness};
pub use claim::{Claim, ClaimStatus, NewClaim};
pub use ownership::OwnershipLink;
pub use profile::{NewProfile, Profile, ProfileUpdate};
