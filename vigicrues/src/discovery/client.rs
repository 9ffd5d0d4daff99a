//! OpenDataSoft catalog-search client.

use tracing::trace;

use crate::domain::Station;
use crate::error::VigicruesError;
use crate::transport::Transport;

use super::convert::convert_search_results;

/// Default base URL of the station referential dataset.
pub const DEFAULT_BASE_URL: &str = "https://public.opendatasoft.com/api/explore/v2.1/catalog/datasets/referentiel-des-stations-du-reseau-vigicrues";

/// Default page size for searches.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Client for the station catalog.
#[derive(Debug, Clone)]
pub struct DiscoveryApi<T> {
    transport: T,
    base_url: String,
    limit: u32,
}

impl<T: Transport> DiscoveryApi<T> {
    /// Create a client issuing requests through `transport`.
    pub fn new(transport: T, base_url: impl Into<String>, limit: u32) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit,
        }
    }

    /// Full-text search on station labels.
    ///
    /// Returns open stations in the catalog's relevance order. No detail
    /// lookups are made.
    pub async fn search(&self, query: &str) -> Result<Vec<Station>, VigicruesError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(VigicruesError::InvalidArgument("query cannot be empty"));
        }

        let url = format!("{}/records", self.base_url);
        trace!(%url, query, "catalog search");

        let raw = self
            .transport
            .fetch_json(
                &url,
                &[
                    ("where", search_clause(query)),
                    ("limit", self.limit.to_string()),
                    ("offset", "0".to_string()),
                ],
            )
            .await?;

        Ok(convert_search_results(&raw)?)
    }
}

/// ODSQL `where` clause for a label search.
fn search_clause(query: &str) -> String {
    let escaped = query.replace('\\', "\\\\").replace('"', "\\\"");
    format!("search(lbstationhydro, \"{escaped}\")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use serde_json::json;

    fn api(transport: &MockTransport) -> DiscoveryApi<&MockTransport> {
        DiscoveryApi::new(transport, "http://ods.test/dataset", DEFAULT_SEARCH_LIMIT)
    }

    #[test]
    fn clause_escapes_quotes() {
        assert_eq!(search_clause("Paris"), r#"search(lbstationhydro, "Paris")"#);
        assert_eq!(
            search_clause(r#"a "b" \c"#),
            r#"search(lbstationhydro, "a \"b\" \\c")"#
        );
    }

    #[tokio::test]
    async fn search_sends_query() {
        let transport = MockTransport::new().with_json(
            "/dataset/records",
            json!({"total_count": 1, "results": [
                {"cdstationhydro": "O408101001", "lbstationhydro": "Le Tarn à Rabastens - Saint-Sulpice"}
            ]}),
        );

        let stations = api(&transport).search("Sulpice").await.unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, "O408101001");

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://ods.test/dataset/records");
        assert_eq!(
            request.param("where"),
            Some(r#"search(lbstationhydro, "Sulpice")"#)
        );
        assert_eq!(request.param("limit"), Some("20"));
        assert_eq!(request.param("offset"), Some("0"));
    }

    #[tokio::test]
    async fn empty_query_rejected() {
        let transport = MockTransport::new();
        let err = api(&transport).search("  ").await.unwrap_err();
        assert!(matches!(err, VigicruesError::InvalidArgument(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn http_error_is_upstream() {
        let transport = MockTransport::new().with_status("/records", 500);
        let err = api(&transport).search("Sulpice").await.unwrap_err();
        assert!(matches!(err, VigicruesError::Upstream(_)));
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn invalid_data_is_malformed() {
        let transport = MockTransport::new().with_json(
            "/records",
            json!({"total_count": 1, "results": [{"fields": {"invalid_field": "value"}}]}),
        );
        let err = api(&transport).search("Sulpice").await.unwrap_err();
        assert!(matches!(
            err,
            VigicruesError::MalformedResponse { ref field, .. } if field == "cdstationhydro"
        ));
    }
}
