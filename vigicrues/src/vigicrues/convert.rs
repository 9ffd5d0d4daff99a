//! Conversion from Vigicrues DTOs to domain types.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Europe::Paris;
use serde_json::Value;
use tracing::trace;

use crate::convert::{
    ConversionError, NumberOrString, decode, optional, optional_f64, required, required_f64,
};
use crate::domain::{
    HistoricalFlood, Observation, ObservationType, RelatedStation, Station, StationDetails,
    Territory, Troncon,
};
use crate::geo::{ProjectedCrs, to_wgs84};

use super::types::{
    BasinStationRecord, EntityListResponse, FloodRecord, ObservationRecord, ObservationsResponse,
    StationCoordinates, StationResponse,
};

/// Projection of `CoordStationHydro`.
const STATION_CRS: ProjectedCrs = ProjectedCrs::Lambert93;

/// Naive timestamp layouts seen when the service drops the offset.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Convert the territory listing.
pub fn convert_territories(raw: &Value) -> Result<Vec<Territory>, ConversionError> {
    let response: EntityListResponse = decode(raw)?;

    response
        .entities
        .unwrap_or_default()
        .iter()
        .map(|entity| {
            Ok(Territory {
                id: required(entity.code.as_deref(), "CdEntVigiCru")?,
                name: required(entity.label.as_deref(), "LbEntVigiCru")?,
            })
        })
        .collect()
}

/// Convert the troncon listing of a territory.
pub fn convert_troncons(raw: &Value, territory_id: &str) -> Result<Vec<Troncon>, ConversionError> {
    child_entities(raw)?
        .into_iter()
        .map(|(id, name)| {
            Ok(Troncon {
                id,
                name,
                territory_id: territory_id.to_string(),
            })
        })
        .collect()
}

/// Convert the station listing of a troncon.
pub fn convert_troncon_stations(raw: &Value) -> Result<Vec<Station>, ConversionError> {
    Ok(child_entities(raw)?
        .into_iter()
        .map(|(id, name)| Station { id, name })
        .collect())
}

/// Flatten the `aNMoinsUn` children of every listed entity, in order.
fn child_entities(raw: &Value) -> Result<Vec<(String, String)>, ConversionError> {
    let response: EntityListResponse = decode(raw)?;

    let mut children = Vec::new();
    for entity in response.entities.unwrap_or_default() {
        for child in entity.children.unwrap_or_default() {
            children.push((
                required(child.code.as_deref(), "CdEntVigiCruInferieur")?,
                required(child.label.as_deref(), "LbEntVigiCruInferieur")?,
            ));
        }
    }
    Ok(children)
}

/// Whether a station.json body means "no such station".
///
/// Unknown ids may come back as `null`, `[]` or `{}` with a 200 status.
pub fn is_empty_document(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

/// Convert a station detail record.
///
/// `station_id` is the id the record was requested with; the payload does
/// not reliably echo it.
pub fn convert_station_details(
    raw: &Value,
    station_id: &str,
) -> Result<StationDetails, ConversionError> {
    let station: StationResponse = decode(raw)?;

    let name = required(station.name.as_deref(), "LbStationHydro")?;
    let river = required(station.river.as_deref(), "LbCoursEau")?;
    let commune_code = optional(station.commune_code.as_deref());

    // Without a commune name the INSEE code stands in.
    let city = optional(station.commune_name.as_deref())
        .or_else(|| commune_code.clone())
        .ok_or(ConversionError::MissingField("LbCommune"))?;

    let coordinates = station
        .coordinates
        .as_ref()
        .ok_or(ConversionError::MissingField("CoordStationHydro"))?;
    let (latitude, longitude) = convert_coordinates(coordinates)?;

    let vigilance = station.vigilance.as_ref();
    let forecast_station = vigilance
        .and_then(|v| v.forecast_station)
        .unwrap_or(false);

    let historical_floods = vigilance
        .and_then(|v| v.historical_floods.as_deref())
        .unwrap_or(&[])
        .iter()
        .map(convert_flood)
        .collect();

    let related_stations = vigilance
        .and_then(|v| v.basin_stations.as_deref())
        .unwrap_or(&[])
        .iter()
        .filter_map(convert_basin_station)
        .collect();

    Ok(StationDetails {
        id: station_id.to_string(),
        name,
        river,
        city,
        latitude,
        longitude,
        picture_url: vigilance.and_then(|v| optional(v.photo.as_deref())),
        commune_code,
        is_prediction_station: forecast_station,
        // The detail record does not advertise which series exist; both are
        // assumed and an empty series surfaces as NoObservation.
        has_height_data: true,
        has_flow_data: true,
        has_predictions: forecast_station,
        is_closed: optional(station.closed_on.as_deref()).is_some(),
        historical_floods,
        related_stations,
    })
}

/// Convert Lambert-93 station coordinates to WGS84 (latitude, longitude).
pub fn convert_coordinates(coords: &StationCoordinates) -> Result<(f64, f64), ConversionError> {
    let x = required_f64(coords.x.as_ref(), "CoordXStationHydro")?;
    let y = required_f64(coords.y.as_ref(), "CoordYStationHydro")?;

    let point = to_wgs84(x, y, STATION_CRS)?;
    Ok((point.latitude, point.longitude))
}

// Flood and basin entries are informational; a gap in one of them never
// invalidates the station record itself.

fn convert_flood(record: &FloodRecord) -> HistoricalFlood {
    HistoricalFlood {
        name: optional(record.name.as_deref()),
        height: lenient_f64(record.height.as_ref(), "CruesHistoriques.ValHauteur"),
        flow: lenient_f64(record.flow.as_ref(), "CruesHistoriques.ValDebit"),
    }
}

fn convert_basin_station(record: &BasinStationRecord) -> Option<RelatedStation> {
    let Some(id) = optional(record.id.as_deref()) else {
        trace!("Skipping basin station without CdStationHydro");
        return None;
    };

    Some(RelatedStation {
        id,
        name: optional(record.name.as_deref()),
        river: optional(record.river.as_deref()),
    })
}

fn lenient_f64(value: Option<&NumberOrString>, field: &'static str) -> Option<f64> {
    optional_f64(value, field).unwrap_or_else(|e| {
        trace!(error = %e, "Ignoring unreadable value");
        None
    })
}

/// Convert an observation series to its latest reading.
///
/// Returns `Ok(None)` when the series is empty: the station has no current
/// reading of this type.
pub fn convert_latest_observation(
    raw: &Value,
    obs_type: ObservationType,
) -> Result<Option<Observation>, ConversionError> {
    let response: ObservationsResponse = decode(raw)?;
    let serie = response
        .serie
        .ok_or(ConversionError::MissingField("Serie"))?;

    if let Some(kind) = optional(serie.kind.as_deref())
        && kind != obs_type.code()
    {
        return Err(ConversionError::InvalidField {
            field: "GrdSerie",
            value: kind,
        });
    }

    // Readings come oldest first.
    match serie.observations.as_deref().and_then(|obs| obs.last()) {
        Some(latest) => convert_observation(latest, obs_type).map(Some),
        None => Ok(None),
    }
}

fn convert_observation(
    record: &ObservationRecord,
    obs_type: ObservationType,
) -> Result<Observation, ConversionError> {
    let timestamp = record
        .timestamp
        .as_ref()
        .ok_or(ConversionError::MissingField("DtObsHydro"))?;
    let timestamp = parse_timestamp(timestamp)?;
    let value = required_f64(record.value.as_ref(), "ResObsHydro")?;

    Ok(Observation::new(timestamp, value, obs_type))
}

/// Parse an observation timestamp into an instant with an explicit offset.
///
/// Accepts RFC 3339, epoch milliseconds, and naive local times, which are
/// taken to be in the provider's zone (Europe/Paris).
pub fn parse_timestamp(raw: &NumberOrString) -> Result<DateTime<FixedOffset>, ConversionError> {
    let invalid = |value: String| ConversionError::InvalidField {
        field: "DtObsHydro",
        value,
    };

    match raw {
        NumberOrString::Number(millis) => DateTime::from_timestamp_millis(*millis as i64)
            .map(|dt| dt.fixed_offset())
            .ok_or_else(|| invalid(millis.to_string())),
        NumberOrString::Text(text) => {
            let text = text.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Ok(dt);
            }

            NAIVE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .and_then(|naive| Paris.from_local_datetime(&naive).earliest())
                .map(|dt| dt.fixed_offset())
                .ok_or_else(|| invalid(text.to_string()))
        }
    }
}
