use crate::models::asset::AssetType;

use super::bigpara::BigparaProvider;
use super::tefas::TefasProvider;
use super::traits::QuoteSource;
use super::truncgil::TruncgilProvider;

/// Registry of all available quote sources.
///
/// Routes requests to the correct source based on `AssetType`. New
/// sources can be added without modifying existing code.
pub struct QuoteSourceRegistry {
    sources: Vec<Box<dyn QuoteSource>>,
}

impl QuoteSourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Create a registry with all default sources pre-configured.
    pub fn new_with_defaults() -> Self {
        let mut registry = Self::new();

        // Truncgil — FX rates and gram gold, single JSON poll
        registry.register(Box::new(TruncgilProvider::new()));

        // TEFAS — government fund registry, price scraped per fund code
        if let Ok(tefas) = TefasProvider::new() {
            registry.register(Box::new(tefas));
        }

        // Bigpara — per-symbol stock quotes
        registry.register(Box::new(BigparaProvider::new()));

        registry
    }

    /// Register a new quote source.
    pub fn register(&mut self, source: Box<dyn QuoteSource>) {
        self.sources.push(source);
    }

    /// Find the first source that supports the given asset type.
    pub fn source_for(&self, asset_type: &AssetType) -> Option<&dyn QuoteSource> {
        self.sources
            .iter()
            .find(|s| s.supported_asset_types().contains(asset_type))
            .map(|s| s.as_ref())
    }

    /// Return ALL sources that support the given asset type, in
    /// registration order.
    pub fn sources_for(&self, asset_type: &AssetType) -> Vec<&dyn QuoteSource> {
        self.sources
            .iter()
            .filter(|s| s.supported_asset_types().contains(asset_type))
            .map(|s| s.as_ref())
            .collect()
    }
}

impl Default for QuoteSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
