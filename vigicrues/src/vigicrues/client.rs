//! Vigicrues detail-service client.
//!
//! Fetches territories, troncons, station records and observation series
//! from `vigicrues.gouv.fr` and converts them to domain types.

use serde_json::Value;
use tracing::trace;

use crate::domain::{Observation, ObservationType, Station, StationDetails, Territory, Troncon};
use crate::error::VigicruesError;
use crate::transport::{Transport, TransportError};

use super::convert::{
    convert_latest_observation, convert_station_details, convert_territories,
    convert_troncon_stations, convert_troncons, is_empty_document,
};

/// Default base URL for the Vigicrues services.
pub const DEFAULT_BASE_URL: &str = "https://www.vigicrues.gouv.fr/services";

/// `TypEntVigiCru` value selecting troncons.
const ENTITY_TYPE_TRONCON: &str = "5";

/// `TypEntVigiCru` value selecting stations.
const ENTITY_TYPE_STATION: &str = "8";

/// Client for the Vigicrues detail service.
#[derive(Debug, Clone)]
pub struct VigicruesApi<T> {
    transport: T,
    base_url: String,
}

impl<T: Transport> VigicruesApi<T> {
    /// Create a client issuing requests through `transport`.
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// List all territories.
    pub async fn territories(&self) -> Result<Vec<Territory>, VigicruesError> {
        let raw = self.get("TerEntVigiCru.json", &[]).await?;
        Ok(convert_territories(&raw)?)
    }

    /// List the troncons of a territory.
    pub async fn troncons(&self, territory_id: &str) -> Result<Vec<Troncon>, VigicruesError> {
        let territory_id = territory_id.trim();
        if territory_id.is_empty() {
            return Err(VigicruesError::InvalidArgument("territory id cannot be empty"));
        }

        let raw = self
            .get(
                "v1.1/TerEntVigiCru.json",
                &[
                    ("CdEntVigiCru", territory_id.to_string()),
                    ("TypEntVigiCru", ENTITY_TYPE_TRONCON.to_string()),
                ],
            )
            .await?;
        Ok(convert_troncons(&raw, territory_id)?)
    }

    /// List the stations of a troncon.
    pub async fn troncon_stations(&self, troncon_id: &str) -> Result<Vec<Station>, VigicruesError> {
        let troncon_id = troncon_id.trim();
        if troncon_id.is_empty() {
            return Err(VigicruesError::InvalidArgument("troncon id cannot be empty"));
        }

        let raw = self
            .get(
                "v1.1/TronEntVigiCru.json",
                &[
                    ("CdEntVigiCru", troncon_id.to_string()),
                    ("TypEntVigiCru", ENTITY_TYPE_STATION.to_string()),
                ],
            )
            .await?;
        Ok(convert_troncon_stations(&raw)?)
    }

    /// Get the full detail record of a station.
    ///
    /// Returns `StationNotFound` when the service answers 404 or with an
    /// empty document.
    pub async fn station_details(&self, station_id: &str) -> Result<StationDetails, VigicruesError> {
        let station_id = station_id.trim();
        if station_id.is_empty() {
            return Err(VigicruesError::InvalidArgument("station id cannot be empty"));
        }

        let raw = self
            .get(
                "station.json/index.php",
                &[("CdStationHydro", station_id.to_string())],
            )
            .await
            .map_err(|e| not_found_or(e, station_id))?;

        if is_empty_document(&raw) {
            return Err(VigicruesError::StationNotFound {
                station_id: station_id.to_string(),
            });
        }

        Ok(convert_station_details(&raw, station_id)?)
    }

    /// Get the most recent reading of one series at a station.
    ///
    /// Returns `NoObservation` when the series is empty.
    pub async fn latest_observation(
        &self,
        station_id: &str,
        obs_type: ObservationType,
    ) -> Result<Observation, VigicruesError> {
        let station_id = station_id.trim();
        if station_id.is_empty() {
            return Err(VigicruesError::InvalidArgument("station id cannot be empty"));
        }

        let raw = self
            .get(
                "observations.json/index.php",
                &[
                    ("CdStationHydro", station_id.to_string()),
                    ("GrdSerie", obs_type.code().to_string()),
                    ("FormatDate", "iso".to_string()),
                ],
            )
            .await
            .map_err(|e| not_found_or(e, station_id))?;

        convert_latest_observation(&raw, obs_type)?.ok_or_else(|| VigicruesError::NoObservation {
            station_id: station_id.to_string(),
            obs_type,
        })
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, TransportError> {
        let url = format!("{}/{}", self.base_url, path);
        trace!(%url, "vigicrues request");
        self.transport.fetch_json(&url, params).await
    }
}

/// Map a 404 to `StationNotFound`, anything else to `Upstream`.
fn not_found_or(err: TransportError, station_id: &str) -> VigicruesError {
    if err.is_not_found() {
        VigicruesError::StationNotFound {
            station_id: station_id.to_string(),
        }
    } else {
        VigicruesError::Upstream(err)
    }
}
