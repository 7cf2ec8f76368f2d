//! Slot conflict warning and override-confirmation policy.
//!
//! A slot collision never blocks a write on its own: the caller is shown
//! a warning naming the colliding date/time and decides. "No" aborts the
//! pending write as a cancellation (distinct from any backend failure);
//! "yes" proceeds exactly as if no conflict had been found.

use async_trait::async_trait;

use crate::agenda::types::Slot;

/// Outcome of an override confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    /// Write anyway.
    Proceed,
    /// Abort the pending write.
    Cancel,
}

/// Warning shown when a write targets an occupied slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictWarning {
    /// The colliding slot.
    pub slot: Slot,
    /// True when raised while editing an existing appointment (the
    /// wording changes: "another" appointment holds the slot).
    pub editing: bool,
}

impl ConflictWarning {
    pub fn creating(slot: Slot) -> Self {
        Self {
            slot,
            editing: false,
        }
    }

    pub fn editing(slot: Slot) -> Self {
        Self {
            slot,
            editing: true,
        }
    }
}

impl std::fmt::Display for ConflictWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let which = if self.editing { "Another" } else { "An" };
        write!(
            f,
            "{} appointment is already scheduled for {} at {}.",
            which,
            self.slot.date_br(),
            self.slot.time_hhmm()
        )
    }
}

/// Capability that resolves a conflict warning into a decision.
///
/// The CLI implements this with an interactive prompt; the HTTP API with
/// the request's `confirm` flag.
#[async_trait]
pub trait ConflictPrompt: Send + Sync {
    async fn confirm(&self, warning: &ConflictWarning) -> ConflictDecision;
}

/// A prompt whose answer was decided before the call, e.g. from a
/// `confirm` request flag or a `--yes` CLI switch.
#[derive(Debug, Clone, Copy)]
pub struct PreDecided(pub ConflictDecision);

impl PreDecided {
    /// `confirmed = true` proceeds, `false` cancels.
    pub fn from_flag(confirmed: bool) -> Self {
        if confirmed {
            Self(ConflictDecision::Proceed)
        } else {
            Self(ConflictDecision::Cancel)
        }
    }
}

#[async_trait]
impl ConflictPrompt for PreDecided {
    async fn confirm(&self, _warning: &ConflictWarning) -> ConflictDecision {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_names_date_and_time() {
        let slot = Slot::parse("2024-03-10", "09:00").unwrap();
        let message = ConflictWarning::creating(slot).to_string();
        assert!(message.contains("10/03/2024"));
        assert!(message.contains("09:00"));

        let message = ConflictWarning::editing(slot).to_string();
        assert!(message.starts_with("Another"));
    }

    #[tokio::test]
    async fn test_predecided_prompt() {
        let slot = Slot::parse("2024-03-10", "09:00").unwrap();
        let warning = ConflictWarning::creating(slot);

        let prompt = PreDecided::from_flag(true);
        assert_eq!(prompt.confirm(&warning).await, ConflictDecision::Proceed);

        let prompt = PreDecided::from_flag(false);
        assert_eq!(prompt.confirm(&warning).await, ConflictDecision::Cancel);
    }
}
