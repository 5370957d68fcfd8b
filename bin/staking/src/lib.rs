pub mod config;
pub mod form;
pub mod metrics;
pub mod session;

pub use form::{FormSnapshot, FormState, Notice, Settled};
pub use session::StakingSession;
