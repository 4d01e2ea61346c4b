use thiserror::Error;

use crate::types::{OnboardingProgress, OnboardingStep};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OnboardingError {
    #[error("Complete '{next}' before '{requested}'")]
    OutOfOrder {
        requested: OnboardingStep,
        next: OnboardingStep,
    },
}

/// Whether completing `step` changes anything. Steps complete strictly in
/// order; re-completing a finished step is a no-op.
pub fn advance(progress: &OnboardingProgress, step: OnboardingStep) -> Result<bool, OnboardingError> {
    if progress.is_done(step) {
        return Ok(false);
    }
    match progress.next_step() {
        Some(next) if step > next => Err(OnboardingError::OutOfOrder { requested: step, next }),
        _ => Ok(true),
    }
}
