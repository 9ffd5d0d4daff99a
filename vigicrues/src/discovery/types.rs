//! OpenDataSoft `records` response DTOs.

use serde::Deserialize;

/// Response from `GET /records`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsResponse {
    /// Total number of matches (not just this page).
    pub total_count: Option<u64>,

    pub results: Option<Vec<CatalogRecord>>,
}

/// One station of the referential. Only the fields we use are listed.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRecord {
    /// Station code, e.g. "O408101001".
    pub cdstationhydro: Option<String>,

    /// Station label.
    pub lbstationhydro: Option<String>,

    /// Closure date; null for stations in service.
    pub dtfermeturestationhydro: Option<String>,
}
