use std::future::Future;
use std::sync::Arc;

use rand::Rng;

use crate::api::ConfirmationNumber;
use crate::reservations_repository::ReservationsRepositoryError;

const CONFIRMATION_NUMBER_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const CONFIRMATION_NUMBER_LENGTH: usize = 8;

/// Drafts candidate confirmation numbers, uniqueness is not its concern
pub trait ConfirmationNumberGenerator: Send + Sync {
    fn generate(&self) -> ConfirmationNumber;
}

/// Uppercase alphanumeric codes of fixed length, 36^8 distinct values by default
pub struct RandomConfirmationNumberGenerator {
    length: usize,
}

impl Default for RandomConfirmationNumberGenerator {
    fn default() -> Self {
        Self {
            length: CONFIRMATION_NUMBER_LENGTH,
        }
    }
}

impl ConfirmationNumberGenerator for RandomConfirmationNumberGenerator {
    fn generate(&self) -> ConfirmationNumber {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| {
                CONFIRMATION_NUMBER_CHARSET[rng.gen_range(0..CONFIRMATION_NUMBER_CHARSET.len())]
                    as char
            })
            .collect()
    }
}

/// Draws candidates until one of them is claimed against the store
pub struct ConfirmationAllocator {
    generator: Arc<dyn ConfirmationNumberGenerator>,
    max_attempts: u32,
}

impl ConfirmationAllocator {
    pub fn new(generator: Arc<dyn ConfirmationNumberGenerator>, max_attempts: u32) -> Self {
        Self {
            generator,
            max_attempts,
        }
    }

    /// `try_claim` returns true when the candidate is free (probe) or was written (conditional insert).
    /// Gives up with `AllocationExhausted` after `max_attempts` rejected candidates.
    pub async fn allocate<F, Fut>(
        &self,
        mut try_claim: F,
    ) -> Result<ConfirmationNumber, ReservationsRepositoryError>
    where
        F: FnMut(ConfirmationNumber) -> Fut,
        Fut: Future<Output = Result<bool, ReservationsRepositoryError>>,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = self.generator.generate();
            if try_claim(candidate.clone()).await? {
                return Ok(candidate);
            }
            tracing::warn!(
                "Confirmation number {} already taken, attempt {}/{}",
                candidate,
                attempt,
                self.max_attempts
            );
        }
        Err(ReservationsRepositoryError::AllocationExhausted(
            self.max_attempts,
        ))
    }
}
