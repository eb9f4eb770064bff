//! In-flight tracking for admin form submissions.
//!
//! Every rendered form carries a random token. While a submission holding that
//! token is being processed, a second submission with the same token is
//! refused instead of writing a duplicate row.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct SubmissionGuard {
    in_flight: Arc<DashMap<String, ()>>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh token for a newly rendered form.
    pub fn issue_token(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Claim `token` for the duration of one submission.
    pub fn try_begin(&self, token: &str) -> Result<SubmissionTicket, SubmissionRefused> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SubmissionRefused::MissingToken);
        }

        match self.in_flight.entry(token.to_string()) {
            Entry::Occupied(_) => Err(SubmissionRefused::InFlight),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(SubmissionTicket {
                    guard: self.clone(),
                    token: token.to_string(),
                })
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmissionRefused {
    #[error("form submitted without a submission token")]
    MissingToken,
    #[error("a submission with this token is already in flight")]
    InFlight,
}

/// Releases its token when dropped.
pub struct SubmissionTicket {
    guard: SubmissionGuard,
    token: String,
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        self.guard.in_flight.remove(&self.token);
    }
}
