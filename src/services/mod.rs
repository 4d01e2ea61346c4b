pub mod claims;
pub mod onboarding;
pub mod ownership;

pub use claims::{review_claim, submit_claim, transition, ClaimAction, ClaimError};
pub use onboarding::{advance, OnboardingError};
pub use ownership::{is_owner, owner_dashboard, require_owner, DashboardStatus, OwnerDashboard};
