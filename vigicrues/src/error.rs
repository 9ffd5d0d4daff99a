//! Client error types.

use crate::domain::ObservationType;
use crate::geo::CoordinateError;
use crate::transport::TransportError;

/// Errors returned by the public client operations.
///
/// Each variant calls for a different message to the end user, so callers
/// can tell a missing station from a station with no current reading from a
/// network failure.
#[derive(Debug, thiserror::Error)]
pub enum VigicruesError {
    /// Transport or HTTP failure talking to an upstream API
    #[error("upstream request failed: {0}")]
    Upstream(#[source] TransportError),

    /// The detail service has no record of the station
    #[error("station {station_id} not found")]
    StationNotFound { station_id: String },

    /// The station exists but has no current reading of the requested type
    #[error("no {obs_type} observations for station {station_id}")]
    NoObservation {
        station_id: String,
        obs_type: ObservationType,
    },

    /// Upstream data violates the expected shape
    #[error("malformed response: field {field}: {reason}")]
    MalformedResponse { field: String, reason: String },

    /// Station coordinates could not be converted to WGS84
    #[error("coordinate conversion failed: {0}")]
    Coordinate(#[from] CoordinateError),

    /// Caller passed an unusable argument (e.g. an empty id)
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl VigicruesError {
    /// HTTP status of the upstream failure, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            VigicruesError::Upstream(e) => e.status(),
            _ => None,
        }
    }
}

impl From<TransportError> for VigicruesError {
    fn from(err: TransportError) -> Self {
        VigicruesError::Upstream(err)
    }
}
