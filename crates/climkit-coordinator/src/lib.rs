//! Polling coordinator for climkit
//!
//! This crate provides the PollingCoordinator, which owns one scheduled
//! connection to a vendor device or API. It guarantees at most one fetch in
//! flight, coalesces concurrent refresh requests, keeps the last good
//! snapshot across failures, and fans updates out to registered listeners
//! in registration order.

mod coordinator;
mod listeners;
mod poll;

pub use coordinator::PollingCoordinator;
pub use listeners::{CoordinatorUpdate, ListenerHandle, UpdateListener};
pub use poll::PollHandle;
