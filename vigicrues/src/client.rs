//! Aggregation client.
//!
//! Combines the catalog search with the detail service: a search hit is only
//! reported if the detail service knows the station and does not list it as
//! closed. Everything else is a straight fetch and map through one of the
//! upstream clients.

use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use crate::config::ClientConfig;
use crate::discovery::DiscoveryApi;
use crate::domain::{Observation, ObservationType, Station, StationDetails, Territory, Troncon};
use crate::error::VigicruesError;
use crate::transport::{HttpTransport, Transport};
use crate::vigicrues::VigicruesApi;

/// Public entry point combining both upstream services.
///
/// Holds one transport handle for its whole lifetime and keeps no other
/// state between calls.
#[derive(Debug)]
pub struct Vigicrues<T = HttpTransport> {
    vigicrues: VigicruesApi<Arc<T>>,
    discovery: DiscoveryApi<Arc<T>>,
}

impl Vigicrues<HttpTransport> {
    /// Build a client with its own HTTP connection pool.
    pub fn new(config: &ClientConfig) -> Result<Self, VigicruesError> {
        let transport = HttpTransport::new(config.timeout(), &config.user_agent)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Build a client on top of a caller-owned `reqwest::Client`.
    pub fn with_http_client(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self::with_transport(Arc::new(HttpTransport::with_client(http)), config)
    }
}

impl<T: Transport> Vigicrues<T> {
    /// Build a client sharing `transport` between both upstream APIs.
    pub fn with_transport(transport: Arc<T>, config: &ClientConfig) -> Self {
        Self {
            vigicrues: VigicruesApi::new(Arc::clone(&transport), &config.vigicrues_base_url),
            discovery: DiscoveryApi::new(
                transport,
                &config.discovery_base_url,
                config.search_limit,
            ),
        }
    }

    /// Search stations by name.
    ///
    /// Catalog hits are checked against the detail service concurrently;
    /// stations it does not know, lists as closed, or fails to answer for
    /// are left out. Results keep the catalog's relevance order.
    pub async fn search_stations(&self, query: &str) -> Result<Vec<Station>, VigicruesError> {
        let candidates = self.discovery.search(query).await?;
        let checked = self.probe_candidates(candidates).await;
        Ok(checked.into_iter().map(|(station, _)| station).collect())
    }

    /// Like [`Self::search_stations`], but returns the detail records the
    /// probes fetched.
    pub async fn search_station_details(
        &self,
        query: &str,
    ) -> Result<Vec<StationDetails>, VigicruesError> {
        let candidates = self.discovery.search(query).await?;
        let checked = self.probe_candidates(candidates).await;
        Ok(checked.into_iter().map(|(_, details)| details).collect())
    }

    /// Catalog search only, without detail probes.
    pub async fn search_catalog(&self, query: &str) -> Result<Vec<Station>, VigicruesError> {
        self.discovery.search(query).await
    }

    /// Full detail record of one station.
    pub async fn get_station_details(
        &self,
        station_id: &str,
    ) -> Result<StationDetails, VigicruesError> {
        self.vigicrues.station_details(station_id).await
    }

    /// Most recent reading of `obs_type` at a station.
    pub async fn get_latest_observations(
        &self,
        station_id: &str,
        obs_type: ObservationType,
    ) -> Result<Observation, VigicruesError> {
        self.vigicrues.latest_observation(station_id, obs_type).await
    }

    pub async fn list_territories(&self) -> Result<Vec<Territory>, VigicruesError> {
        self.vigicrues.territories().await
    }

    pub async fn list_troncons(&self, territory_id: &str) -> Result<Vec<Troncon>, VigicruesError> {
        self.vigicrues.troncons(territory_id).await
    }

    pub async fn list_stations(&self, troncon_id: &str) -> Result<Vec<Station>, VigicruesError> {
        self.vigicrues.troncon_stations(troncon_id).await
    }

    /// Fetch details for every candidate at once and keep the open ones.
    ///
    /// Dropping the returned future drops every pending probe with it.
    async fn probe_candidates(&self, candidates: Vec<Station>) -> Vec<(Station, StationDetails)> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let probes: Vec<_> = candidates
            .into_iter()
            .map(|station| async move {
                let result = self.vigicrues.station_details(&station.id).await;
                (station, result)
            })
            .collect();

        let results = join_all(probes).await;

        let mut kept = Vec::with_capacity(results.len());
        for (station, result) in results {
            match result {
                Ok(details) if details.is_closed => {
                    debug!(station = %station.id, "Excluding closed station");
                }
                Ok(details) => kept.push((station, details)),
                Err(e) => {
                    debug!(
                        station = %station.id,
                        error = %e,
                        "Excluding station without usable details"
                    );
                }
            }
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use serde_json::{Value, json};
    use std::time::Duration;

    fn config() -> ClientConfig {
        ClientConfig::new()
            .with_vigicrues_base_url("http://vigicrues.test/services")
            .with_discovery_base_url("http://ods.test/dataset")
    }

    fn client(transport: &Arc<MockTransport>) -> Vigicrues<MockTransport> {
        Vigicrues::with_transport(Arc::clone(transport), &config())
    }

    fn catalog(hits: &[(&str, &str)]) -> Value {
        let results: Vec<Value> = hits
            .iter()
            .map(|(id, name)| json!({"cdstationhydro": id, "lbstationhydro": name}))
            .collect();
        json!({"total_count": results.len(), "results": results})
    }

    fn details(name: &str) -> Value {
        json!({
            "LbStationHydro": name,
            "LbCoursEau": "La Seine",
            "CdCommune": "75056",
            "LbCommune": "Paris",
            "CoordStationHydro": {
                "CoordXStationHydro": 652470.0,
                "CoordYStationHydro": 6862035.0
            }
        })
    }

    fn closed_details(name: &str) -> Value {
        let mut body = details(name);
        body["DtFermetureStationHydro"] = json!("2019-06-30");
        body
    }

    #[tokio::test]
    async fn search_keeps_catalog_order() {
        let transport = Arc::new(
            MockTransport::new()
                .with_json(
                    "/records",
                    catalog(&[
                        ("F700000103", "La Seine à Paris - Austerlitz"),
                        ("F700000109", "La Seine à Paris - Pont de Tolbiac"),
                        ("F700000111", "La Seine à Paris - Bercy"),
                    ]),
                )
                .with_json("/station.json/index.php", details("Paris")),
        );

        let stations = client(&transport).search_stations("Paris").await.unwrap();
        let ids: Vec<_> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["F700000103", "F700000109", "F700000111"]);
        assert_eq!(stations[0].name, "La Seine à Paris - Austerlitz");
    }

    #[tokio::test]
    async fn search_drops_absent_and_closed_stations() {
        let transport = Arc::new(
            MockTransport::new()
                .with_json(
                    "/records",
                    catalog(&[
                        ("A1", "Open"),
                        ("A2", "Unknown to detail service"),
                        ("A3", "Closed"),
                        ("A4", "Empty detail document"),
                        ("A5", "Also open"),
                    ]),
                )
                .with_status_matching("/station.json/index.php", &[("CdStationHydro", "A2")], 404)
                .with_json_matching(
                    "/station.json/index.php",
                    &[("CdStationHydro", "A3")],
                    closed_details("Closed"),
                )
                .with_json_matching("/station.json/index.php", &[("CdStationHydro", "A4")], json!([]))
                .with_json("/station.json/index.php", details("Open")),
        );

        let stations = client(&transport).search_stations("x").await.unwrap();
        let ids: Vec<_> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["A1", "A5"]);
    }

    #[tokio::test]
    async fn probe_failures_do_not_fail_search() {
        let mut malformed = details("Broken");
        malformed.as_object_mut().unwrap().remove("LbStationHydro");

        let transport = Arc::new(
            MockTransport::new()
                .with_json("/records", catalog(&[("B1", "Down"), ("B2", "Broken"), ("B3", "Fine")]))
                .with_status_matching("/station.json/index.php", &[("CdStationHydro", "B1")], 503)
                .with_json_matching("/station.json/index.php", &[("CdStationHydro", "B2")], malformed)
                .with_json("/station.json/index.php", details("Fine")),
        );

        let stations = client(&transport).search_stations("x").await.unwrap();
        assert_eq!(stations, vec![Station::new("B3", "Fine")]);
    }

    #[tokio::test]
    async fn search_keeps_station_with_incomplete_flood_history() {
        let mut sparse = details("Sparse");
        sparse["VigilanceCrues"] = json!({
            "CruesHistoriques": [{"ValHauteur": 11.5}],
            "StationsBassin": [{"LbCoursEau": "Tarn"}]
        });

        let transport = Arc::new(
            MockTransport::new()
                .with_json("/records", catalog(&[("H1", "Sparse")]))
                .with_json("/station.json/index.php", sparse),
        );

        let stations = client(&transport).search_stations("x").await.unwrap();
        assert_eq!(stations, vec![Station::new("H1", "Sparse")]);

        let found = client(&transport).get_station_details("H1").await.unwrap();
        assert_eq!(found.historical_floods.len(), 1);
        assert_eq!(found.historical_floods[0].name, None);
        assert!(found.related_stations.is_empty());
    }

    #[tokio::test]
    async fn catalog_failure_is_upstream() {
        let transport = Arc::new(MockTransport::new().with_status("/records", 502));

        let err = client(&transport).search_stations("Paris").await.unwrap_err();
        assert!(matches!(err, VigicruesError::Upstream(_)));
        assert_eq!(err.status(), Some(502));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn empty_catalog_makes_no_probes() {
        let transport = Arc::new(MockTransport::new().with_json("/records", catalog(&[])));

        let stations = client(&transport).search_stations("nowhere").await.unwrap();
        assert!(stations.is_empty());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn probes_run_concurrently() {
        let transport = Arc::new(
            MockTransport::new()
                .with_json("/records", catalog(&[("C1", "a"), ("C2", "b"), ("C3", "c"), ("C4", "d")]))
                .with_json("/station.json/index.php", details("x"))
                .with_latency(Duration::from_millis(20)),
        );

        let stations = client(&transport).search_stations("x").await.unwrap();
        assert_eq!(stations.len(), 4);
        assert_eq!(transport.request_count(), 5);
        assert_eq!(transport.max_in_flight(), 4);
    }

    #[tokio::test]
    async fn abandoned_search_cancels_probes() {
        let transport = Arc::new(
            MockTransport::new()
                .with_json("/records", catalog(&[("D1", "a"), ("D2", "b"), ("D3", "c")]))
                .with_json("/station.json/index.php", details("x"))
                .with_latency(Duration::from_millis(100)),
        );
        let client = client(&transport);

        // Catalog answers at ~100ms, probes would answer at ~200ms.
        let outcome =
            tokio::time::timeout(Duration::from_millis(150), client.search_stations("x")).await;
        assert!(outcome.is_err());
        assert_eq!(transport.request_count(), 4);
        assert_eq!(transport.in_flight(), 0);
    }

    #[tokio::test]
    async fn search_station_details_returns_probed_records() {
        let transport = Arc::new(
            MockTransport::new()
                .with_json("/records", catalog(&[("E1", "Open"), ("E2", "Closed")]))
                .with_json_matching(
                    "/station.json/index.php",
                    &[("CdStationHydro", "E2")],
                    closed_details("Closed"),
                )
                .with_json("/station.json/index.php", details("Open")),
        );

        let found = client(&transport).search_station_details("x").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "E1");
        assert_eq!(found[0].river, "La Seine");
        assert!(!found[0].is_closed);
    }

    #[tokio::test]
    async fn search_catalog_skips_probes() {
        let transport = Arc::new(
            MockTransport::new().with_json("/records", catalog(&[("F1", "a"), ("F2", "b")])),
        );

        let stations = client(&transport).search_catalog("x").await.unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn station_details_within_france() {
        let transport = Arc::new(
            MockTransport::new().with_json("/station.json/index.php", details("Paris Austerlitz")),
        );

        let found = client(&transport).get_station_details("F700000103").await.unwrap();
        assert!((41.0..51.0).contains(&found.latitude));
        assert!((-5.0..10.0).contains(&found.longitude));
        assert_eq!(found.city, "Paris");
    }

    #[tokio::test]
    async fn observation_errors_are_distinct() {
        let transport = Arc::new(
            MockTransport::new()
                .with_json_matching(
                    "/observations.json/index.php",
                    &[("CdStationHydro", "G1")],
                    json!({"Serie": {"ObssHydro": []}}),
                )
                .with_status_matching("/observations.json/index.php", &[("CdStationHydro", "G2")], 404)
                .with_status_matching("/observations.json/index.php", &[("CdStationHydro", "G3")], 500),
        );
        let client = client(&transport);

        let empty = client
            .get_latest_observations("G1", ObservationType::Height)
            .await
            .unwrap_err();
        assert!(matches!(empty, VigicruesError::NoObservation { .. }));

        let missing = client
            .get_latest_observations("G2", ObservationType::Height)
            .await
            .unwrap_err();
        assert!(matches!(missing, VigicruesError::StationNotFound { .. }));

        let down = client
            .get_latest_observations("G3", ObservationType::Height)
            .await
            .unwrap_err();
        assert!(matches!(down, VigicruesError::Upstream(_)));
    }

    #[tokio::test]
    async fn listings_pass_through() {
        let transport = Arc::new(
            MockTransport::new()
                .with_json(
                    "/services/TerEntVigiCru.json",
                    json!({"ListEntVigiCru": [{"CdEntVigiCru": "10", "LbEntVigiCru": "Seine moyenne"}]}),
                )
                .with_json(
                    "/v1.1/TerEntVigiCru.json",
                    json!({"ListEntVigiCru": [{"aNMoinsUn": [
                        {"CdEntVigiCruInferieur": "SM5", "LbEntVigiCruInferieur": "Seine parisienne"}
                    ]}]}),
                )
                .with_json(
                    "/v1.1/TronEntVigiCru.json",
                    json!({"ListEntVigiCru": [{"aNMoinsUn": [
                        {"CdEntVigiCruInferieur": "F700000103", "LbEntVigiCruInferieur": "Paris"}
                    ]}]}),
                ),
        );
        let client = client(&transport);

        let territories = client.list_territories().await.unwrap();
        assert_eq!(territories[0].id, "10");

        let troncons = client.list_troncons("10").await.unwrap();
        assert_eq!(troncons[0].id, "SM5");
        assert_eq!(troncons[0].territory_id, "10");

        let stations = client.list_stations("SM5").await.unwrap();
        assert_eq!(stations, vec![Station::new("F700000103", "Paris")]);
    }
}
