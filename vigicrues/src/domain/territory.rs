//! Vigicrues territories and the river sections (troncons) inside them.

use serde::Serialize;

/// A Vigicrues territory: the area covered by one flood-forecasting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Territory {
    pub id: String,
    pub name: String,
}

/// A named river section grouping stations within a territory.
///
/// Every troncon belongs to exactly one territory; `territory_id` records
/// which one it was listed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Troncon {
    pub id: String,
    pub name: String,
    pub territory_id: String,
}
