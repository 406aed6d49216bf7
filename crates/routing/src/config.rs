//! Routing configuration.

use runesx_domain::pricing::PricingConfig;

/// Upper bound accepted for `max_hops`.
pub const MAX_HOPS_LIMIT: u32 = 14;

/// Configuration for path search and estimate pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    /// Quote asset, USD-stable coin and fallback price.
    pub pricing: PricingConfig,
    /// Hop bound used when a request does not name one.
    pub default_max_hops: u32,
    /// Maximum number of paths returned by the bounded search.
    pub bfs_max_paths: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            default_max_hops: 6,
            bfs_max_paths: 20,
        }
    }
}

impl RoutingConfig {
    /// Sets the pricing configuration.
    #[must_use]
    pub fn with_pricing(mut self, pricing: PricingConfig) -> Self {
        self.pricing = pricing;
        self
    }

    /// Sets the default hop bound.
    #[must_use]
    pub fn with_default_max_hops(mut self, hops: u32) -> Self {
        self.default_max_hops = hops;
        self
    }

    /// Sets the bounded search path cap.
    #[must_use]
    pub fn with_bfs_max_paths(mut self, paths: usize) -> Self {
        self.bfs_max_paths = paths;
        self
    }
}
