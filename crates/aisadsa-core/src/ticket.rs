//! Single-flight request tickets.
//!
//! A [`RequestGate`] hands out at most one outstanding [`Ticket`]. When the
//! request finishes, the owner redeems the ticket with [`RequestGate::complete`];
//! a ticket that was invalidated in the meantime (reset, logout, the owning
//! view going away) comes back stale and its result must be dropped.

use crate::error::ValidationFailure;

/// Proof that a request was admitted by a [`RequestGate`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a ticket must be redeemed with RequestGate::complete"]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct RequestGate {
    generation: u64,
    outstanding: Option<u64>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a new request, or refuses while one is outstanding.
    pub fn issue(&mut self) -> Result<Ticket, ValidationFailure> {
        if self.outstanding.is_some() {
            return Err(ValidationFailure::RequestInFlight);
        }
        self.generation += 1;
        self.outstanding = Some(self.generation);
        Ok(Ticket {
            generation: self.generation,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Redeems a ticket. Returns `true` when its result may be applied.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if self.outstanding == Some(ticket.generation) {
            self.outstanding = None;
            true
        } else {
            false
        }
    }

    /// Makes every outstanding ticket stale and frees the gate.
    pub fn invalidate(&mut self) {
        self.outstanding = None;
    }
}
