//! Conversion from catalog records to domain types.

use serde_json::Value;
use tracing::trace;

use crate::convert::{ConversionError, decode, optional, required};
use crate::domain::Station;

use super::types::RecordsResponse;

/// Convert a search response to stations, keeping the catalog's relevance order.
///
/// Stations the catalog marks as closed are dropped here.
pub fn convert_search_results(raw: &Value) -> Result<Vec<Station>, ConversionError> {
    let response: RecordsResponse = decode(raw)?;

    let mut stations = Vec::new();
    for record in response.results.unwrap_or_default() {
        let id = required(record.cdstationhydro.as_deref(), "cdstationhydro")?;
        let name = required(record.lbstationhydro.as_deref(), "lbstationhydro")?;

        if let Some(closed_on) = optional(record.dtfermeturestationhydro.as_deref()) {
            trace!(station = %id, %closed_on, "skipping closed station");
            continue;
        }

        stations.push(Station { id, name });
    }

    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_hits_in_order() {
        let raw = json!({
            "total_count": 2,
            "results": [
                {"cdstationhydro": "F700000103", "lbstationhydro": "La Seine à Paris - Austerlitz"},
                {"cdstationhydro": "F490000104", "lbstationhydro": "La Seine à Alfortville", "extra": 1}
            ]
        });
        let stations = convert_search_results(&raw).unwrap();
        assert_eq!(
            stations,
            vec![
                Station::new("F700000103", "La Seine à Paris - Austerlitz"),
                Station::new("F490000104", "La Seine à Alfortville"),
            ]
        );
    }

    #[test]
    fn drops_closed_stations() {
        let raw = json!({
            "results": [
                {"cdstationhydro": "O408101001", "lbstationhydro": "Rabastens", "dtfermeturestationhydro": null},
                {"cdstationhydro": "O408101002", "lbstationhydro": "Rabastens (ancienne)", "dtfermeturestationhydro": "2001-01-01"}
            ]
        });
        let stations = convert_search_results(&raw).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, "O408101001");
    }

    #[test]
    fn missing_fields_fail() {
        let raw = json!({"results": [{"fields": {"invalid_field": "value"}}]});
        assert_eq!(
            convert_search_results(&raw),
            Err(ConversionError::MissingField("cdstationhydro"))
        );
    }

    #[test]
    fn non_object_is_shape_error() {
        let raw = json!("invalid json");
        assert!(matches!(
            convert_search_results(&raw),
            Err(ConversionError::Shape(_))
        ));
    }

    #[test]
    fn no_results_is_empty() {
        assert!(convert_search_results(&json!({"total_count": 0})).unwrap().is_empty());
    }
}
