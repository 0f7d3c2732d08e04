//! Per-restaurant tax configuration lookup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use tiffin_core::{Percent, RestaurantId};

/// Tax part of a restaurant's threshold settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxConfig {
    pub tax_percentage: Percent,
}

impl TaxConfig {
    pub fn new(tax_percentage: Percent) -> Self {
        Self { tax_percentage }
    }
}

/// Source of tax configuration keyed by restaurant.
pub trait TaxSettings {
    fn tax_config(&self, restaurant_id: &RestaurantId) -> Option<TaxConfig>;
}

/// Rate to apply for a restaurant: the configured percentage, or 0 when the
/// restaurant has no configuration.
pub fn resolve_tax_rate<S>(settings: &S, restaurant_id: &RestaurantId) -> Percent
where
    S: TaxSettings + ?Sized,
{
    effective_rate(settings.tax_config(restaurant_id).as_ref())
}

pub fn effective_rate(config: Option<&TaxConfig>) -> Percent {
    config.map(|c| c.tax_percentage).unwrap_or(Percent::ZERO)
}

/// Tax settings held in memory (preloaded or cached from the backend).
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaxSettings {
    configs: HashMap<RestaurantId, TaxConfig>,
}

impl InMemoryTaxSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, restaurant_id: RestaurantId, config: TaxConfig) {
        self.configs.insert(restaurant_id, config);
    }

    pub fn remove(&mut self, restaurant_id: &RestaurantId) -> Option<TaxConfig> {
        self.configs.remove(restaurant_id)
    }
}

impl TaxSettings for InMemoryTaxSettings {
    fn tax_config(&self, restaurant_id: &RestaurantId) -> Option<TaxConfig> {
        self.configs.get(restaurant_id).cloned()
    }
}
