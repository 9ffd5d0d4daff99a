//! Vigicrues detail service.
//!
//! The authoritative source for station records and hydrometric
//! observations. Key characteristics of the API:
//! - Field names are SANDRE codes (`CdStationHydro`, `LbCoursEau`, ...)
//! - Station positions are Lambert-93 metres, often sent as strings
//! - Territories, troncons and stations share one list envelope
//!   (`ListEntVigiCru`), selected by `TypEntVigiCru`

mod client;
mod convert;
mod types;

pub use client::{DEFAULT_BASE_URL, VigicruesApi};
pub use convert::{
    convert_coordinates, convert_latest_observation, convert_station_details,
    convert_territories, convert_troncon_stations, convert_troncons, parse_timestamp,
};
pub use types::{
    BasinStationRecord, ChildRecord, EntityListResponse, EntityRecord, FloodRecord,
    ObservationRecord, ObservationSerie, ObservationsResponse, StationCoordinates,
    StationResponse, VigilanceInfo,
};
