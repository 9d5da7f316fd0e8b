pub mod dispatcher;
pub mod runner;
pub mod scheduler;

pub use dispatcher::BurstDispatcher;
pub use runner::{AutoSeller, RunOutcome};
pub use scheduler::wait_until;
