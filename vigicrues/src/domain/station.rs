//! Station summary and detail types.

use serde::Serialize;

/// Minimal station identity, as returned by searches and listings.
///
/// Station ids are hydrometric codes (e.g. `O408101001`) shared by the
/// catalog-search source and the Vigicrues detail service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Station {
    pub id: String,
    pub name: String,
}

impl Station {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A notable past flood recorded for a station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalFlood {
    /// Usual name of the event, e.g. "Crue du 03/03/1930".
    pub name: Option<String>,
    /// Peak water height in metres, if recorded.
    pub height: Option<f64>,
    /// Peak flow in m³/s, if recorded.
    pub flow: Option<f64>,
}

/// Another station in the same river basin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedStation {
    pub id: String,
    pub name: Option<String>,
    pub river: Option<String>,
}

/// Full detail record for a station.
///
/// Built in one piece by a detail lookup keyed on the station id: a
/// `StationDetails` either has every required field or is not built at all.
/// `latitude`/`longitude` are always WGS84 decimal degrees, never the
/// provider's projected metres.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationDetails {
    pub id: String,
    pub name: String,
    pub river: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub picture_url: Option<String>,
    pub commune_code: Option<String>,
    pub is_prediction_station: bool,
    pub has_height_data: bool,
    pub has_flow_data: bool,
    pub has_predictions: bool,
    /// True when the detail service reports a closure date for the station.
    pub is_closed: bool,
    pub historical_floods: Vec<HistoricalFlood>,
    pub related_stations: Vec<RelatedStation>,
}

impl StationDetails {
    /// The summary identity of this station.
    pub fn summary(&self) -> Station {
        Station::new(self.id.clone(), self.name.clone())
    }
}

impl From<StationDetails> for Station {
    fn from(details: StationDetails) -> Self {
        Station {
            id: details.id,
            name: details.name,
        }
    }
}
