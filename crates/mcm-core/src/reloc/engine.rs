//! Engine functions and singletons used by the runtime.

use std::sync::Arc;

use crate::process::ReadMemory;
use crate::reloc::{AbstractAddress, AddressResolver, RuntimeVersion, VersionTable};

/// Declaration of one engine address: name, per-release RVAs, signature,
/// offset and optional `(displacement_offset, instruction_length)`.
struct Declaration {
    name: &'static str,
    rvas: &'static [(RuntimeVersion, u64)],
    signature: &'static str,
    offset: i64,
    indirect: Option<(i64, u64)>,
}

const DECLARATIONS: &[Declaration] = &[
    Declaration {
        name: "execute_command",
        rvas: &[
            (RuntimeVersion::V1_10_20, 0x01259430),
            (RuntimeVersion::V1_9_4, 0x012416F0),
        ],
        signature: "40 53 55 56 57 41 54 48 81 EC ? ? ? ? 8B 15 ? ? ? ?",
        offset: 0,
        indirect: None,
    },
    Declaration {
        name: "process_user_event_check",
        rvas: &[
            (RuntimeVersion::V1_10_20, 0x0210DD1C),
            (RuntimeVersion::V1_9_4, 0x020E745C),
        ],
        signature: "40 55 56 41 57 48 8D 6C 24 ?",
        offset: 0x8C,
        indirect: None,
    },
    Declaration {
        name: "get_property_info",
        rvas: &[
            (RuntimeVersion::V1_10_20, 0x02707500),
            (RuntimeVersion::V1_9_4, 0x026A52E0),
        ],
        signature: "48 89 5C 24 ? 48 89 6C 24 ? 48 89 74 24 ? 57 48 83 EC 20 48 8B F9 48 8B CA 41 0F B6 F1",
        offset: 0,
        indirect: None,
    },
    // mov rcx, [rip+disp32]
    Declaration {
        name: "scaleform_manager",
        rvas: &[],
        signature: "48 8B 0D ? ? ? ? 48 8D 05 ? ? ? ? 48 8B D3",
        offset: 0,
        indirect: Some((3, 7)),
    },
    Declaration {
        name: "menu_controls",
        rvas: &[],
        signature: "48 8B 0D ? ? ? ? E8 ? ? ? ? 80 3D ? ? ? ? ? 0F B6 F8",
        offset: 0,
        indirect: Some((3, 7)),
    },
    Declaration {
        name: "ui",
        rvas: &[],
        signature: "48 8B 0D ? ? ? ? BA ? ? ? ? 8B 1C 16",
        offset: 0,
        indirect: Some((3, 7)),
    },
    // cmp qword [rip+disp32], imm8
    Declaration {
        name: "input_manager",
        rvas: &[],
        signature: "48 83 3D ? ? ? ? ? 74 3F 48 83 C1 40",
        offset: 0,
        indirect: Some((3, 8)),
    },
    // mov r8, [rip+disp32]
    Declaration {
        name: "game_vm",
        rvas: &[],
        signature: "4C 8B 05 ? ? ? ? 48 8B F9",
        offset: 0,
        indirect: Some((3, 7)),
    },
    // mov rax, [rip+disp32]
    Declaration {
        name: "data_handler",
        rvas: &[],
        signature: "48 8B 05 ? ? ? ? 8B 13",
        offset: 0,
        indirect: Some((3, 7)),
    },
];

impl Declaration {
    fn build(&self) -> AbstractAddress {
        let mut address = AbstractAddress::new(self.name)
            .with_signature(self.signature)
            .with_offset(self.offset);
        for (version, rva) in self.rvas {
            address.add_rva(*version, *rva);
        }
        if let Some((displacement_offset, instruction_length)) = self.indirect {
            address = address.with_indirect(displacement_offset, instruction_length);
        }
        address
    }
}

/// Handles to every engine address the runtime calls into.
#[derive(Debug, Clone)]
pub struct EngineAddresses {
    pub execute_command: Arc<AbstractAddress>,
    pub process_user_event_check: Arc<AbstractAddress>,
    pub get_property_info: Arc<AbstractAddress>,
    pub scaleform_manager: Arc<AbstractAddress>,
    pub menu_controls: Arc<AbstractAddress>,
    pub ui: Arc<AbstractAddress>,
    pub input_manager: Arc<AbstractAddress>,
    pub game_vm: Arc<AbstractAddress>,
    pub data_handler: Arc<AbstractAddress>,
}

impl EngineAddresses {
    /// Declare every engine address on `resolver`. Nothing is resolved yet.
    pub fn declare<R: ReadMemory>(resolver: &mut AddressResolver<R>) -> Self {
        let mut take = |index: usize| resolver.declare(DECLARATIONS[index].build());
        Self {
            execute_command: take(0),
            process_user_event_check: take(1),
            get_property_info: take(2),
            scaleform_manager: take(3),
            menu_controls: take(4),
            ui: take(5),
            input_manager: take(6),
            game_vm: take(7),
            data_handler: take(8),
        }
    }

    pub fn all(&self) -> [&Arc<AbstractAddress>; 9] {
        [
            &self.execute_command,
            &self.process_user_event_check,
            &self.get_property_info,
            &self.scaleform_manager,
            &self.menu_controls,
            &self.ui,
            &self.input_manager,
            &self.game_vm,
            &self.data_handler,
        ]
    }

    pub fn unresolved(&self) -> Vec<&str> {
        self.all()
            .into_iter()
            .filter(|address| !address.is_resolved())
            .map(|address| address.name())
            .collect()
    }
}

/// RVAs compiled in for known releases.
pub fn builtin_table() -> VersionTable {
    let mut table = VersionTable::new();
    for declaration in DECLARATIONS {
        for (version, rva) in declaration.rvas {
            table.insert(*version, declaration.name, *rva);
        }
    }
    table
}

pub fn supported_versions() -> Vec<RuntimeVersion> {
    builtin_table().versions()
}
