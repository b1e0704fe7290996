//! Climate entity adapter for climkit
//!
//! One adapter per physical device or zone. The adapter reads the
//! coordinator's cached snapshot through the vendor's translation tables and
//! exposes the common climate state; command methods validate against the
//! device's declared capabilities, translate to the vendor vocabulary, call
//! the vendor client, and then either optimistically update the rendered
//! state or request a coordinator refresh.

mod adapter;
mod error;
mod policy;
mod state;

pub use adapter::{ClimateEntityAdapter, ClimateEntityAdapterBuilder};
pub use error::{CommandError, RenderError};
pub use policy::{CommandSync, FailurePolicy, IntegrationPolicy, SnapshotKeys};
pub use state::{ClimateState, EntityRender};
