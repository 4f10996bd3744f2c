//! Provider registry and resolver for the image-generation adapters

use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::backend::gemini::GeminiImageProvider;
use crate::backend::openai::OpenAIImageProvider;
use crate::backend::stability::StabilityImageProvider;
use crate::backend::traits::{Capabilities, ImageProvider, ProviderKind};
use crate::config::ProvidersConfig;

/// Automatic selection order when no provider is requested
pub const RESOLUTION_ORDER: [ProviderKind; 3] =
    [ProviderKind::Stability, ProviderKind::Gemini, ProviderKind::OpenAI];

/// Pick the provider for one request.
///
/// A recognised `requested` name wins even if that provider has no key; the
/// adapter reports the missing key itself. Otherwise the first configured
/// provider in [`RESOLUTION_ORDER`] is chosen.
pub fn resolve(
    requested: Option<&str>,
    configured: &HashSet<ProviderKind>,
) -> Option<ProviderKind> {
    if let Some(kind) = requested.and_then(|name| name.parse::<ProviderKind>().ok()) {
        return Some(kind);
    }

    RESOLUTION_ORDER
        .iter()
        .copied()
        .find(|kind| configured.contains(kind))
}

/// Registry entry: the adapter and whether its key was present at start-up
#[derive(Clone)]
struct Entry {
    adapter: Arc<dyn ImageProvider>,
    configured: bool,
}

/// Snapshot of one provider for the listing endpoint
#[derive(Debug, Clone)]
pub struct ProviderStatus {
    pub kind: ProviderKind,
    pub env_key: &'static str,
    pub configured: bool,
    pub capabilities: Capabilities,
}

/// Registry for the image providers
pub struct ProviderRegistry {
    providers: DashMap<ProviderKind, Entry>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            providers: DashMap::new(),
        }
    }

    /// Register the three built-in adapters from configuration
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let registry = Self::new();

        registry.register(
            Arc::new(OpenAIImageProvider::new(&config.openai)),
            config.openai.is_configured(),
        );
        registry.register(
            Arc::new(GeminiImageProvider::new(&config.gemini)),
            config.gemini.is_configured(),
        );
        registry.register(
            Arc::new(StabilityImageProvider::new(&config.stability)),
            config.stability.is_configured(),
        );

        registry
    }

    /// Add or replace the adapter for `adapter.kind()`
    pub fn register(&self, adapter: Arc<dyn ImageProvider>, configured: bool) {
        let kind = adapter.kind();
        self.providers.insert(kind, Entry { adapter, configured });
        info!(provider = %kind, configured, "Registered image provider");
    }

    /// Get an adapter by kind
    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ImageProvider>> {
        self.providers.get(&kind).map(|entry| entry.adapter.clone())
    }

    /// Providers whose API key is present
    pub fn configured(&self) -> HashSet<ProviderKind> {
        self.providers
            .iter()
            .filter(|entry| entry.configured)
            .map(|entry| *entry.key())
            .collect()
    }

    /// Resolve a request against this registry's configuration
    pub fn resolve(&self, requested: Option<&str>) -> Option<ProviderKind> {
        let selected = resolve(requested, &self.configured());
        debug!(requested = ?requested, selected = ?selected, "Resolved image provider");
        selected
    }

    /// All known providers in resolution order
    pub fn list(&self) -> Vec<ProviderStatus> {
        RESOLUTION_ORDER
            .iter()
            .filter_map(|kind| {
                self.providers.get(kind).map(|entry| ProviderStatus {
                    kind: *kind,
                    env_key: kind.env_key(),
                    configured: entry.configured,
                    capabilities: kind.capabilities(),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
