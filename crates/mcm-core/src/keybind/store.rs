use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::forms::FormResolver;
use crate::input::HostInputMap;
use crate::keybind::{
    Chord, KeybindCatalog, KeybindDefinition, KeybindInfo, device_for_keycode,
};

struct StoreState {
    registrations: BTreeMap<Chord, KeybindDefinition>,
    catalog: KeybindCatalog,
    dirty: bool,
    /// Bumped on every change to `registrations`
    generation: u64,
}

impl StoreState {
    fn snapshot(&self) -> Vec<(Chord, String, String)> {
        self.registrations
            .iter()
            .map(|(chord, definition)| (*chord, definition.owner.clone(), definition.id.clone()))
            .collect()
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.generation += 1;
    }

    fn find(&self, owner: &str, id: &str) -> Option<Chord> {
        self.registrations
            .iter()
            .find(|(_, definition)| definition.is(owner, id))
            .map(|(chord, _)| *chord)
    }
}

/// Registered keybinds, shared by the UI, input and save/load threads.
///
/// One mutex covers the registrations, the dirty flag and the definition
/// catalog. Host calls (form identifiers, control names) happen after the
/// lock is released.
pub struct KeybindStore {
    state: Mutex<StoreState>,
    forms: Arc<dyn FormResolver>,
    input_map: Option<Arc<dyn HostInputMap>>,
}

impl KeybindStore {
    pub fn new(catalog: KeybindCatalog) -> Self {
        let forms = Arc::clone(catalog.forms());
        Self {
            state: Mutex::new(StoreState {
                registrations: BTreeMap::new(),
                catalog,
                dirty: false,
                generation: 0,
            }),
            forms,
            input_map: None,
        }
    }

    pub fn with_input_map(mut self, input_map: Arc<dyn HostInputMap>) -> Self {
        self.input_map = Some(input_map);
        self
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind `chord` to `definition`, replacing any existing binding.
    pub fn register(&self, chord: Chord, definition: KeybindDefinition) {
        let mut state = self.lock();
        debug!("Registering {}/{} on {}", definition.owner, definition.id, chord);
        state.registrations.insert(chord, definition);
        state.touch();
    }

    /// Bind `chord` to a catalog definition. Returns `false` if the
    /// definition cannot be found; nothing changes in that case.
    pub fn register_from_catalog(&self, chord: Chord, owner: &str, id: &str) -> bool {
        let mut state = self.lock();
        let Some(definition) = state.catalog.get_definition(owner, id) else {
            return false;
        };
        state.registrations.insert(chord, definition);
        state.touch();
        true
    }

    /// Metadata for whatever `chord` is bound to, falling back to the
    /// engine's own control map.
    pub fn lookup(&self, chord: Chord) -> KeybindInfo {
        if let Some(definition) = self.lookup_binding(chord) {
            return KeybindInfo::registered(chord, &definition, self.forms.as_ref());
        }

        let control = self.input_map.as_ref().and_then(|input_map| {
            let (device, mask) = device_for_keycode(chord.keycode)?;
            input_map
                .mapped_control(device, mask)
                .filter(|name| !name.is_empty())
        });

        match control {
            Some(control) => KeybindInfo::host_control(chord, control),
            None => KeybindInfo::not_found(chord),
        }
    }

    pub fn lookup_binding(&self, chord: Chord) -> Option<KeybindDefinition> {
        self.lock().registrations.get(&chord).cloned()
    }

    pub fn lookup_by_owner_and_id(&self, owner: &str, id: &str) -> Option<(Chord, KeybindInfo)> {
        let found = {
            let state = self.lock();
            state
                .find(owner, id)
                .and_then(|chord| state.registrations.get(&chord).map(|d| (chord, d.clone())))
        };

        found.map(|(chord, definition)| {
            (
                chord,
                KeybindInfo::registered(chord, &definition, self.forms.as_ref()),
            )
        })
    }

    /// Every registration in chord order.
    pub fn list_all(&self) -> Vec<KeybindInfo> {
        let snapshot: Vec<(Chord, KeybindDefinition)> = self
            .lock()
            .registrations
            .iter()
            .map(|(chord, definition)| (*chord, definition.clone()))
            .collect();

        snapshot
            .iter()
            .map(|(chord, definition)| {
                KeybindInfo::registered(*chord, definition, self.forms.as_ref())
            })
            .collect()
    }

    pub fn clear_chord(&self, chord: Chord) -> bool {
        let mut state = self.lock();
        let removed = state.registrations.remove(&chord).is_some();
        if removed {
            state.touch();
        }
        removed
    }

    pub fn clear_binding(&self, owner: &str, id: &str) -> bool {
        let mut state = self.lock();
        let Some(chord) = state.find(owner, id) else {
            return false;
        };
        state.registrations.remove(&chord);
        state.touch();
        true
    }

    /// Drop every registration. Used when the host reverts its state.
    pub fn clear_all(&self) {
        let mut state = self.lock();
        if !state.registrations.is_empty() {
            info!("Clearing {} keybind registrations", state.registrations.len());
        }
        state.registrations.clear();
        state.generation += 1;
    }

    /// Move a binding to `new_chord`. A binding already on `new_chord` is
    /// replaced.
    ///
    /// Returns `false` if the binding is not registered or already on `new_chord`.
    pub fn remap(&self, owner: &str, id: &str, new_chord: Chord) -> bool {
        let mut state = self.lock();
        let Some(old_chord) = state.find(owner, id) else {
            return false;
        };
        if old_chord == new_chord {
            return false;
        }

        let Some(definition) = state.registrations.remove(&old_chord) else {
            return false;
        };
        debug!("Remapping {}/{}: {} -> {}", owner, id, old_chord, new_chord);
        state.registrations.insert(new_chord, definition);
        state.touch();
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    pub fn mark_clean(&self) {
        self.lock().dirty = false;
    }

    /// Registrations to persist, or `None` if nothing changed since the last
    /// save. The returned generation is handed back to [`Self::mark_saved`].
    pub fn dirty_snapshot(&self) -> Option<(u64, Vec<(Chord, String, String)>)> {
        let state = self.lock();
        if !state.dirty {
            return None;
        }
        Some((state.generation, state.snapshot()))
    }

    /// Clear the dirty flag unless registrations changed after the snapshot
    /// taken at `generation`. Returns whether the flag was cleared.
    pub fn mark_saved(&self, generation: u64) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            debug!("Keybinds changed during save, staying dirty");
            return false;
        }
        state.dirty = false;
        true
    }

    /// `(chord, owner, id)` of every registration, in chord order.
    pub fn snapshot_chords(&self) -> Vec<(Chord, String, String)> {
        self.lock().snapshot()
    }

    pub fn len(&self) -> usize {
        self.lock().registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().registrations.is_empty()
    }
}
