//! Database models.

mod invitation_attempt;

pub use invitation_attempt::{InvitationAttempt, InvitationStatus, NewInvitationAttempt};
