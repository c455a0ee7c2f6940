//! Static routing from (friendly side, enemy side) to a deliverables dataset, and the
//! per-invocation cache that keeps each pair to a single fetch.

use std::collections::HashMap;

use serde::Serialize;

use crate::data::catalog::Catalog;
use crate::data::source::CatalogProvider;
use crate::engine::side::Side;
use crate::error::AssetError;

/// One routable pair and the dataset that serves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogRoute {
    pub friendly: Side,
    pub enemy: Side,
    pub dataset: &'static str,
}

impl CatalogRoute {
    /// `air_to_air`, `air_to_surf`, `surf_to_surf(land)`, ...
    pub fn domain_label(&self) -> String {
        let left = match self.friendly {
            Side::Air => "air",
            Side::Land | Side::Surface => "surf",
        };
        let right = match self.enemy {
            Side::Air => "air",
            Side::Land => "surf(land)",
            Side::Surface => "surf",
        };
        format!("{left}_to_{right}")
    }
}

pub const ROUTES: &[CatalogRoute] = &[
    CatalogRoute {
        friendly: Side::Air,
        enemy: Side::Air,
        dataset: "red_air_deliverables_air_to_air",
    },
    CatalogRoute {
        friendly: Side::Air,
        enemy: Side::Land,
        dataset: "red_ground_deliverables_air_to_surf",
    },
    CatalogRoute {
        friendly: Side::Air,
        enemy: Side::Surface,
        dataset: "red_maritime_deliverables_air_to_surf",
    },
    CatalogRoute {
        friendly: Side::Surface,
        enemy: Side::Air,
        dataset: "red_air_deliverables_surf_to_air",
    },
    CatalogRoute {
        friendly: Side::Surface,
        enemy: Side::Land,
        dataset: "red_ground_deliverables_surf_to_surf",
    },
    CatalogRoute {
        friendly: Side::Land,
        enemy: Side::Surface,
        dataset: "red_maritime_deliverables_surf_to_surf",
    },
];

pub fn route_for(friendly: Side, enemy: Side) -> Option<CatalogRoute> {
    ROUTES
        .iter()
        .find(|route| route.friendly == friendly && route.enemy == enemy)
        .copied()
}

/// Catalogs fetched during one invocation. Failed fetches are remembered too, so a
/// broken pair is not retried for every asset that shares it.
#[derive(Debug, Default)]
pub struct CatalogCache {
    entries: HashMap<(Side, Side), Result<Catalog, AssetError>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Route the pair and return its normalized catalog, fetching at most once.
    pub fn get_or_fetch<P: CatalogProvider + ?Sized>(
        &mut self,
        provider: &P,
        friendly: Side,
        enemy: Side,
    ) -> Result<(CatalogRoute, &Catalog), AssetError> {
        let route =
            route_for(friendly, enemy).ok_or(AssetError::UnroutableSidePair { friendly, enemy })?;
        let entry = self.entries.entry((friendly, enemy)).or_insert_with(|| {
            match provider.fetch(&route) {
                Ok(table) => {
                    let catalog = Catalog::from_table(&table);
                    tracing::debug!(
                        dataset = route.dataset,
                        entries = catalog.len(),
                        "catalog fetched"
                    );
                    Ok(catalog)
                }
                Err(err) => {
                    tracing::warn!(dataset = route.dataset, error = %err, "catalog fetch failed");
                    Err(AssetError::CatalogUnavailable {
                        dataset: route.dataset.to_string(),
                        reason: err.to_string(),
                    })
                }
            }
        });
        match entry {
            Ok(catalog) => Ok((route, catalog)),
            Err(err) => Err(err.clone()),
        }
    }
}
