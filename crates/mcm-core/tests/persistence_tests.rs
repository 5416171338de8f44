//! Save, load and revert of keybind registrations.

use std::fs;
use std::sync::Arc;

use mcm_core::{
    Chord, KeybindCatalog, KeybindStore, LoadOrder, LoadSummary, McmConfig, Modifiers,
    PersistenceBridge,
};
use tempfile::TempDir;

const DEFINITIONS: &str = r#"{
  "modName": "ModA.esp",
  "keybinds": [
    { "id": "toggle_menu", "desc": "Toggle", "action": { "type": "RunConsoleCommand", "command": "tm" } },
    { "id": "quicksave", "desc": "Save", "action": { "type": "RunConsoleCommand", "command": "save quick" } },
    { "id": "e", "action": { "type": "SendEvent", "form": "ModA.esp|800" } }
  ]
}"#;

struct Fixture {
    dir: TempDir,
    config: McmConfig,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = McmConfig::with_data_root(dir.path());
        let mod_dir = config.config_dir().join("ModA");
        fs::create_dir_all(&mod_dir).unwrap();
        fs::write(mod_dir.join("keybinds.json"), DEFINITIONS).unwrap();
        Self { dir, config }
    }

    /// Fresh store, as after a game restart
    fn store(&self) -> KeybindStore {
        let forms = Arc::new(LoadOrder::from_names(["Fallout4.esm", "ModA.esp"]));
        KeybindStore::new(KeybindCatalog::new(self.config.config_dir(), forms))
    }

    fn bridge(&self) -> PersistenceBridge {
        PersistenceBridge::new(self.config.keybinds_file())
    }
}

#[test]
fn test_save_load_round_trip() {
    let fixture = Fixture::new();
    let bridge = fixture.bridge();

    let store = fixture.store();
    assert!(store.register_from_catalog(Chord::key(42), "ModA.esp", "toggle_menu"));
    assert!(store.register_from_catalog(
        Chord::new(31, Modifiers::CONTROL | Modifiers::ALT),
        "ModA.esp",
        "quicksave"
    ));
    assert!(store.register_from_catalog(Chord::key(259), "ModA.esp", "e"));

    assert!(bridge.on_save(&store));
    assert!(!store.is_dirty());
    assert!(fixture.dir.path().join("Settings").join("Keybinds.json").exists());

    let restored = fixture.store();
    let summary = bridge.on_load(&restored);
    assert_eq!(
        summary,
        LoadSummary {
            restored: 3,
            skipped: 0
        }
    );
    assert_eq!(restored.snapshot_chords(), store.snapshot_chords());
    assert_eq!(restored.list_all(), store.list_all());
}

#[test]
fn test_save_skips_clean_store() {
    let fixture = Fixture::new();
    let bridge = fixture.bridge();
    let store = fixture.store();

    assert!(!bridge.on_save(&store));
    assert!(!bridge.path().exists());
}

#[test]
fn test_removed_definitions_are_dropped_silently() {
    let fixture = Fixture::new();
    let bridge = fixture.bridge();

    let store = fixture.store();
    store.register_from_catalog(Chord::key(42), "ModA.esp", "toggle_menu");
    store.register_from_catalog(Chord::key(43), "ModA.esp", "quicksave");
    assert!(bridge.on_save(&store));

    // The mod drops one keybind in an update
    fs::write(
        fixture.config.config_dir().join("ModA").join("keybinds.json"),
        r#"{"modName":"ModA.esp","keybinds":[{"id":"toggle_menu","action":{"type":"RunConsoleCommand","command":"tm"}}]}"#,
    )
    .unwrap();

    let restored = fixture.store();
    let summary = bridge.on_load(&restored);
    assert_eq!(summary.restored, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(restored.lookup(Chord::key(42)).id, "toggle_menu");
    assert!(restored.lookup_binding(Chord::key(43)).is_none());
}

#[test]
fn test_load_missing_or_malformed_storage() {
    let fixture = Fixture::new();
    let bridge = fixture.bridge();
    let store = fixture.store();

    assert_eq!(bridge.on_load(&store), LoadSummary::default());

    fs::create_dir_all(bridge.path().parent().unwrap()).unwrap();
    fs::write(bridge.path(), r#"{"version":0,"keybinds":[]}"#).unwrap();
    assert_eq!(bridge.on_load(&store), LoadSummary::default());

    fs::write(bridge.path(), "{ truncated").unwrap();
    assert_eq!(bridge.on_load(&store), LoadSummary::default());
    assert!(store.is_empty());
}

#[test]
fn test_load_skips_out_of_range_entries() {
    let fixture = Fixture::new();
    let bridge = fixture.bridge();
    let store = fixture.store();

    fs::create_dir_all(bridge.path().parent().unwrap()).unwrap();
    fs::write(
        bridge.path(),
        r#"{"version":1,"keybinds":[
            {"keycode":42,"modifiers":300,"modName":"ModA.esp","id":"quicksave"},
            {"keycode":42,"modifiers":0,"modName":"ModA.esp","id":"toggle_menu"}
        ]}"#,
    )
    .unwrap();

    assert_eq!(
        bridge.on_load(&store),
        LoadSummary {
            restored: 1,
            skipped: 0
        }
    );
    assert_eq!(store.lookup(Chord::key(42)).id, "toggle_menu");
}

#[test]
fn test_failed_write_keeps_dirty_flag() {
    let fixture = Fixture::new();
    // A file where the settings directory should be
    let blocker = fixture.dir.path().join("blocked");
    fs::write(&blocker, "").unwrap();
    let bridge = PersistenceBridge::new(blocker.join("Keybinds.json"));

    let store = fixture.store();
    store.register_from_catalog(Chord::key(42), "ModA.esp", "toggle_menu");

    assert!(!bridge.on_save(&store));
    assert!(store.is_dirty());
}

#[test]
fn test_save_overwrites_previous_file() {
    let fixture = Fixture::new();
    let bridge = fixture.bridge();
    let store = fixture.store();

    store.register_from_catalog(Chord::key(42), "ModA.esp", "toggle_menu");
    assert!(bridge.on_save(&store));
    assert!(store.clear_chord(Chord::key(42)));
    assert!(bridge.on_save(&store));

    let restored = fixture.store();
    assert_eq!(bridge.on_load(&restored), LoadSummary::default());
    assert!(!bridge.path().with_extension("json.tmp").exists());
}

#[test]
fn test_revert_clears_registrations() {
    let fixture = Fixture::new();
    let bridge = fixture.bridge();
    let store = fixture.store();

    store.register_from_catalog(Chord::key(42), "ModA.esp", "toggle_menu");
    bridge.on_revert(&store);
    assert!(store.is_empty());
}

#[cfg(unix)]
#[test]
fn test_registration_during_save_is_not_lost() {
    use std::io::Read;
    use std::process::Command;
    use std::thread;

    let fixture = Fixture::new();
    let bridge = Arc::new(fixture.bridge());
    let store = Arc::new(fixture.store());
    store.register_from_catalog(Chord::key(42), "ModA.esp", "toggle_menu");

    // A FIFO in place of the temp file holds the save open mid-write
    let tmp = bridge.path().with_extension("json.tmp");
    fs::create_dir_all(tmp.parent().unwrap()).unwrap();
    assert!(Command::new("mkfifo").arg(&tmp).status().unwrap().success());

    let saver = {
        let bridge = Arc::clone(&bridge);
        let store = Arc::clone(&store);
        thread::spawn(move || bridge.on_save(&store))
    };

    // Opening the read end waits for the writer, which has its snapshot
    let mut pipe = fs::File::open(&tmp).unwrap();
    assert!(store.register_from_catalog(Chord::key(43), "ModA.esp", "quicksave"));
    let mut written = String::new();
    pipe.read_to_string(&mut written).unwrap();
    assert!(saver.join().unwrap());

    assert!(written.contains("toggle_menu"));
    assert!(!written.contains("quicksave"));
    assert!(store.is_dirty());

    // The rename moved the FIFO onto the target; the next save replaces it
    assert!(bridge.on_save(&store));
    assert!(!store.is_dirty());

    let restored = fixture.store();
    assert_eq!(bridge.on_load(&restored).restored, 2);
}
