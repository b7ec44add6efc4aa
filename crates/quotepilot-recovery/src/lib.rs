//! Recovery subsystem: selects stale sent estimates, resolves contact
//! data, composes a follow-up and dispatches it over exactly one
//! channel, with a conditional-update claim guaranteeing at-most-one
//! successful follow-up per estimate across concurrent runs.

pub mod contact;
pub mod credits;
pub mod orchestrator;
pub mod selector;

pub use contact::resolve_contact;
pub use credits::CreditCache;
pub use orchestrator::{RecoveryRunner, RunReport};
pub use selector::select_candidates;
