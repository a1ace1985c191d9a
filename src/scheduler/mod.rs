//! Time-boxed, batch-paced request submission with a concurrency ceiling.
mod config;
mod paced;
mod pending;


pub use config::RunConfig;
pub use paced::{PacedScheduler, SchedulerReport};
