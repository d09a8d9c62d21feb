//! Status Transition Engine for fleetops
//!
//! The state machine shared by all five record kinds. Given a record's
//! head (kind, status, owning department), a requested action, and the
//! action context, the engine:
//!
//! 1. names the access gate the caller must clear (`gate`),
//! 2. decides whether the transition is legal and computes the resulting
//!    patch (`plan`).
//!
//! The engine itself is pure and UI-agnostic: it never talks to the
//! backend, never validates field payloads (the Validation Selector runs
//! first), and reports every refusal as a typed `WorkflowError`.
//!
//! # Kind-specific branches
//!
//! - Monitoring approval jumps straight to Completed when the occurrence is
//!   the "no occurrence" reference code.
//! - Camera approval skips the video-cut stage unless the occurrence is
//!   flagged `needs_cut`.
//! - Maintenance approval closes the record from any open stage and stamps
//!   the approver.
//! - SAC approval forwards a new ticket to its assignee, or resolves an
//!   in-attention ticket held by the acting user.
//! - R.O. finalization closes the report without moving it; assignment
//!   moves it without changing status.

#![deny(unsafe_code)]

mod context;
mod gate;
mod state_machine;

pub use context::*;
pub use gate::*;
pub use state_machine::*;
