//! Client for the French flood-monitoring service Vigicrues.
//!
//! Finds hydrometric stations through the public station catalog, then
//! reads details, territories, troncons and the latest height or flow
//! readings from `vigicrues.gouv.fr`. Station positions are published in
//! Lambert-93 and are converted to WGS84 on the way in.

pub mod client;
pub mod config;
pub mod convert;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod geo;
pub mod mock;
pub mod transport;
pub mod vigicrues;

pub use client::Vigicrues;
pub use config::{ClientConfig, ConfigError};
pub use domain::{
    HistoricalFlood, Observation, ObservationType, RelatedStation, Station, StationDetails,
    Territory, Troncon,
};
pub use error::VigicruesError;
pub use geo::{CoordinateError, GeoPoint, ProjectedCrs};
pub use transport::{HttpTransport, Transport, TransportError};
