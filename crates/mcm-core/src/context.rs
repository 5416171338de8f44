//! Everything the plugin owns, built once at load and passed to host callbacks.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::McmConfig;
use crate::forms::FormResolver;
use crate::input::{
    ConsoleExecutor, HostInputMap, HostUi, InputDispatcher, ModifierSource, ScriptHost,
};
use crate::keybind::{KeybindCatalog, KeybindStore};
use crate::persist::PersistenceBridge;
use crate::process::ReadMemory;
use crate::reloc::{
    AddressResolver, EngineAddresses, ResolutionReport, RuntimeVersion, VersionTable,
};

pub struct EngineContext {
    pub config: McmConfig,
    pub runtime_version: RuntimeVersion,
    pub addresses: EngineAddresses,
    pub resolution: ResolutionReport,
    pub store: Arc<KeybindStore>,
    pub persistence: PersistenceBridge,
}

impl EngineContext {
    /// Read the configuration file, falling back to defaults when it is
    /// missing or invalid.
    pub fn load_config(path: &Path) -> McmConfig {
        match McmConfig::load(path) {
            Ok(config) => config,
            Err(e) if e.is_not_found() => {
                warn!("Config file {} not found, using defaults", path.display());
                McmConfig::default()
            }
            Err(e) => {
                warn!("Failed to load {}: {}. Using defaults", path.display(), e);
                McmConfig::default()
            }
        }
    }

    /// Resolve engine addresses against `image` and set up the keybind store.
    ///
    /// `reported` is the runtime version the host reports; the config may
    /// override it.
    pub fn initialize<R: ReadMemory>(
        config: McmConfig,
        image: R,
        reported: RuntimeVersion,
        forms: Arc<dyn FormResolver>,
        input_map: Option<Arc<dyn HostInputMap>>,
    ) -> Self {
        let runtime_version = config.runtime_version.unwrap_or(reported);
        info!("Runtime version: {}", runtime_version);

        let mut resolver = AddressResolver::new(image)
            .with_policy(config.scan_policy)
            .with_table(Self::extra_table(&config));
        let addresses = EngineAddresses::declare(&mut resolver);
        let resolution = resolver.resolve_all(runtime_version);
        if !resolution.is_complete() {
            warn!("Unresolved addresses: {}", resolution.unresolved.join(", "));
        }

        let catalog = KeybindCatalog::new(config.config_dir(), forms);
        let mut store = KeybindStore::new(catalog);
        if let Some(input_map) = input_map {
            store = store.with_input_map(input_map);
        }

        let persistence = PersistenceBridge::new(config.keybinds_file());

        Self {
            config,
            runtime_version,
            addresses,
            resolution,
            store: Arc::new(store),
            persistence,
        }
    }

    fn extra_table(config: &McmConfig) -> VersionTable {
        let Some(path) = &config.offsets_file else {
            return VersionTable::new();
        };
        match VersionTable::load(path) {
            Ok(table) => {
                info!("Loaded offsets from {}", path.display());
                table
            }
            Err(e) => {
                warn!("Failed to load offsets from {}: {}", path.display(), e);
                VersionTable::new()
            }
        }
    }

    pub fn dispatcher(
        &self,
        script: Arc<dyn ScriptHost>,
        console: Arc<dyn ConsoleExecutor>,
        ui: Arc<dyn HostUi>,
        modifiers: Arc<dyn ModifierSource>,
    ) -> InputDispatcher {
        InputDispatcher::new(Arc::clone(&self.store), script, console, ui, modifiers)
    }

    pub fn on_save(&self) -> bool {
        self.persistence.on_save(&self.store)
    }

    pub fn on_load(&self) -> crate::persist::LoadSummary {
        self.persistence.on_load(&self.store)
    }

    pub fn on_revert(&self) {
        self.persistence.on_revert(&self.store)
    }
}
