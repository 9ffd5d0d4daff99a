//! Vigicrues API response DTOs.
//!
//! These types map directly to the JSON served under
//! `https://www.vigicrues.gouv.fr/services`. Field names follow the SANDRE
//! vocabulary (`CdStationHydro`, `LbCoursEau`, ...), so every field is
//! renamed. Almost everything is `Option` because the service omits fields
//! freely; required-ness is enforced during conversion, where the missing
//! field can be named. Unknown fields are ignored.

use serde::Deserialize;

use crate::convert::NumberOrString;

/// Response from `TerEntVigiCru.json` and `TronEntVigiCru.json`.
///
/// The same envelope is used for the territory list, for the troncons of a
/// territory and for the stations of a troncon.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityListResponse {
    #[serde(rename = "ListEntVigiCru")]
    pub entities: Option<Vec<EntityRecord>>,
}

/// One Vigicrues entity (territory or troncon).
#[derive(Debug, Clone, Deserialize)]
pub struct EntityRecord {
    #[serde(rename = "CdEntVigiCru")]
    pub code: Option<String>,

    #[serde(rename = "LbEntVigiCru")]
    pub label: Option<String>,

    /// Entities one level down (troncons of a territory, stations of a troncon).
    #[serde(rename = "aNMoinsUn")]
    pub children: Option<Vec<ChildRecord>>,
}

/// A child entity listed under its parent.
#[derive(Debug, Clone, Deserialize)]
pub struct ChildRecord {
    #[serde(rename = "CdEntVigiCruInferieur")]
    pub code: Option<String>,

    #[serde(rename = "LbEntVigiCruInferieur")]
    pub label: Option<String>,
}

/// Response from `station.json/index.php`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationResponse {
    #[serde(rename = "CdStationHydro")]
    pub id: Option<String>,

    #[serde(rename = "LbStationHydro")]
    pub name: Option<String>,

    #[serde(rename = "LbCoursEau")]
    pub river: Option<String>,

    /// INSEE commune code.
    #[serde(rename = "CdCommune")]
    pub commune_code: Option<String>,

    /// Commune name; not always sent.
    #[serde(rename = "LbCommune")]
    pub commune_name: Option<String>,

    #[serde(rename = "CoordStationHydro")]
    pub coordinates: Option<StationCoordinates>,

    #[serde(rename = "VigilanceCrues")]
    pub vigilance: Option<VigilanceInfo>,

    /// Closure date, present only for stations taken out of service.
    #[serde(rename = "DtFermetureStationHydro")]
    pub closed_on: Option<String>,
}

/// Station position in Lambert-93 metres.
#[derive(Debug, Clone, Deserialize)]
pub struct StationCoordinates {
    #[serde(rename = "CoordXStationHydro")]
    pub x: Option<NumberOrString>,

    #[serde(rename = "CoordYStationHydro")]
    pub y: Option<NumberOrString>,
}

/// Flood-vigilance block of a station record.
#[derive(Debug, Clone, Deserialize)]
pub struct VigilanceInfo {
    /// URL of a station photo.
    #[serde(rename = "Photo")]
    pub photo: Option<String>,

    /// Whether the station is a forecast point.
    #[serde(rename = "StationPrevision")]
    pub forecast_station: Option<bool>,

    #[serde(rename = "CruesHistoriques")]
    pub historical_floods: Option<Vec<FloodRecord>>,

    /// Other stations in the same basin.
    #[serde(rename = "StationsBassin")]
    pub basin_stations: Option<Vec<BasinStationRecord>>,
}

/// A historical flood entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FloodRecord {
    #[serde(rename = "LbUsuel")]
    pub name: Option<String>,

    #[serde(rename = "ValHauteur")]
    pub height: Option<NumberOrString>,

    #[serde(rename = "ValDebit")]
    pub flow: Option<NumberOrString>,
}

/// A station in the same basin.
#[derive(Debug, Clone, Deserialize)]
pub struct BasinStationRecord {
    #[serde(rename = "CdStationHydro")]
    pub id: Option<String>,

    #[serde(rename = "LbStationHydro")]
    pub name: Option<String>,

    #[serde(rename = "LbCoursEau")]
    pub river: Option<String>,
}

/// Response from `observations.json/index.php`.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationsResponse {
    #[serde(rename = "Serie")]
    pub serie: Option<ObservationSerie>,
}

/// One hydrometric series, oldest reading first.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationSerie {
    /// "H" or "Q"; echoes the requested series.
    #[serde(rename = "GrdSerie")]
    pub kind: Option<String>,

    #[serde(rename = "ObssHydro")]
    pub observations: Option<Vec<ObservationRecord>>,
}

/// A single reading.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationRecord {
    /// ISO 8601 when requested with `FormatDate=iso`, epoch milliseconds otherwise.
    #[serde(rename = "DtObsHydro")]
    pub timestamp: Option<NumberOrString>,

    #[serde(rename = "ResObsHydro")]
    pub value: Option<NumberOrString>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_response_ignores_unknown_fields() {
        let raw = serde_json::json!({
            "LbStationHydro": "Montauban",
            "LbCoursEau": "Tarn",
            "CdCommune": "82121",
            "SomethingNew": {"nested": true},
            "CoordStationHydro": {
                "CoordXStationHydro": "567613",
                "CoordYStationHydro": 6325598
            }
        });
        let dto: StationResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(dto.name.as_deref(), Some("Montauban"));
        let coords = dto.coordinates.unwrap();
        assert_eq!(coords.x, Some(NumberOrString::Text("567613".into())));
        assert_eq!(coords.y, Some(NumberOrString::Number(6_325_598.0)));
        assert!(dto.vigilance.is_none());
    }

    #[test]
    fn null_lists_are_accepted() {
        let raw = serde_json::json!({"ListEntVigiCru": null});
        let dto: EntityListResponse = serde_json::from_value(raw).unwrap();
        assert!(dto.entities.is_none());
    }
}
