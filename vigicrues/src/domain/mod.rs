//! Domain types for the Vigicrues client.
//!
//! These are the value objects handed back to callers once raw upstream
//! payloads have been mapped. They hold no references to the client or to
//! each other, and are never mutated after construction.

mod observation;
mod station;
mod territory;

pub use observation::{InvalidObservationType, Observation, ObservationType};
pub use station::{HistoricalFlood, RelatedStation, Station, StationDetails};
pub use territory::{Territory, Troncon};
