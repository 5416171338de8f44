use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::keybind::KeybindStore;
use crate::persist::KeybindsDocument;

/// Result of restoring registrations from disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub restored: usize,
    pub skipped: usize,
}

/// Save, load and revert callbacks for keybind registrations.
#[derive(Debug, Clone)]
pub struct PersistenceBridge {
    path: PathBuf,
}

impl PersistenceBridge {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write registrations if anything changed. Returns `true` if the file
    /// was written.
    ///
    /// The store stays dirty if it changed while the file was being written.
    pub fn on_save(&self, store: &KeybindStore) -> bool {
        let Some((generation, snapshot)) = store.dirty_snapshot() else {
            return false;
        };

        let start = Instant::now();
        info!("Serializing keybinds...");
        match self.write(KeybindsDocument::from_snapshot(snapshot)) {
            Ok(()) => {
                store.mark_saved(generation);
                info!("Elapsed: {} ms.", start.elapsed().as_millis());
                true
            }
            Err(e) => {
                error!("Failed to write {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Write the current registrations unconditionally.
    pub fn save(&self, store: &KeybindStore) -> Result<()> {
        self.write(KeybindsDocument::from_snapshot(store.snapshot_chords()))
    }

    fn write(&self, document: KeybindsDocument) -> Result<()> {
        let json = document.to_json()?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename over it
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Re-register every persisted chord from the definition catalog.
    pub fn on_load(&self, store: &KeybindStore) -> LoadSummary {
        let start = Instant::now();
        debug!("Loading keybind registrations");

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Keybind storage does not exist: {}", self.path.display());
                return LoadSummary::default();
            }
            Err(e) => {
                warn!("Keybind storage could not be opened: {}", e);
                return LoadSummary::default();
            }
        };

        let document = match KeybindsDocument::parse(&content) {
            Ok(document) => document,
            Err(e) => {
                warn!("{}. No keybinds will be loaded.", e);
                return LoadSummary::default();
            }
        };

        let mut summary = LoadSummary::default();
        for entry in &document.keybinds {
            if store.register_from_catalog(entry.chord(), &entry.mod_name, &entry.id) {
                summary.restored += 1;
            } else {
                warn!(
                    "Failed to get keybind data for {} with keybind ID {}",
                    entry.mod_name, entry.id
                );
                summary.skipped += 1;
            }
        }

        info!(
            "Restored {} keybinds ({} skipped). Elapsed: {} ms.",
            summary.restored,
            summary.skipped,
            start.elapsed().as_millis()
        );
        summary
    }

    pub fn on_revert(&self, store: &KeybindStore) {
        debug!("Clearing keybind registrations");
        store.clear_all();
    }
}
