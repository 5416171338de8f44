//! Address resolution against synthetic module images.

use mcm_core::process::{MockMemoryBuilder, Pattern, scan_all, scan_first};
use mcm_core::reloc::{
    AbstractAddress, AddressResolver, EngineAddresses, RuntimeVersion, ScanPolicy,
};

const BASE: u64 = 0x7FF6_0000_0000;

/// An image holding the `ui` and `data_handler` singleton loads.
fn engine_image() -> mcm_core::process::MockMemoryReader {
    MockMemoryBuilder::new()
        .base(BASE)
        .with_size(0x4000)
        // mov rcx, [rip+disp32] ; mov edx, imm32 ; mov ebx, [rsi+rdx]
        .write_bytes(0x1000, &[0x48, 0x8B, 0x0D])
        .write_i32(0x1003, 0x3000 - 0x1007)
        .write_bytes(0x1007, &[0xBA, 0x10, 0x00, 0x00, 0x00, 0x8B, 0x1C, 0x16])
        // mov rax, [rip+disp32] ; mov edx, [rbx]
        .write_bytes(0x2000, &[0x48, 0x8B, 0x05])
        .write_i32(0x2003, -0x1000)
        .write_bytes(0x2007, &[0x8B, 0x13])
        .build()
}

#[test]
fn test_table_entry_wins_for_known_release() {
    let mut resolver = AddressResolver::new(engine_image());
    let engine = EngineAddresses::declare(&mut resolver);

    resolver.resolve_all(RuntimeVersion::V1_10_20);
    assert_eq!(engine.execute_command.get(), Some(BASE + 0x01259430));
    assert_eq!(engine.process_user_event_check.get(), Some(BASE + 0x0210DD1C));
}

#[test]
fn test_singletons_found_by_signature() {
    let mut resolver = AddressResolver::new(engine_image());
    let engine = EngineAddresses::declare(&mut resolver);

    let report = resolver.resolve_all(RuntimeVersion::V1_10_20);

    // match + 7 + displacement
    assert_eq!(engine.ui.get(), Some(BASE + 0x3000));
    assert_eq!(engine.data_handler.get(), Some(BASE + 0x2007 - 0x1000));
    assert!(!engine.game_vm.is_resolved());
    assert!(report.unresolved.iter().any(|name| name == "game_vm"));
}

#[test]
fn test_unknown_release_falls_back_to_scan() {
    let reader = MockMemoryBuilder::new()
        .base(BASE)
        .with_size(0x800)
        .write_bytes(0x400, &[0x40, 0x55, 0x56, 0x41, 0x57, 0x48, 0x8D, 0x6C, 0x24, 0x99])
        .build();
    let mut resolver = AddressResolver::new(reader);
    let engine = EngineAddresses::declare(&mut resolver);

    let unknown = RuntimeVersion::new(1, 10, 163, 0);
    resolver.resolve_all(unknown);

    assert_eq!(engine.process_user_event_check.get(), Some(BASE + 0x400 + 0x8C));
    assert!(!engine.execute_command.is_resolved());
}

#[test]
fn test_always_scan_policy() {
    let mut resolver = AddressResolver::new(engine_image()).with_policy(ScanPolicy::AlwaysScan);
    let engine = EngineAddresses::declare(&mut resolver);

    resolver.resolve_all(RuntimeVersion::V1_10_20);

    // Scan fails for these, so the table is used
    assert_eq!(engine.get_property_info.get(), Some(BASE + 0x02707500));
    assert_eq!(engine.ui.get(), Some(BASE + 0x3000));
}

#[test]
fn test_address_resolved_once() {
    let resolver = AddressResolver::new(engine_image());
    let address = AbstractAddress::new("ui")
        .with_signature("48 8B 0D ? ? ? ? BA")
        .with_indirect(3, 7);

    let first = resolver.resolve(&address, RuntimeVersion::V1_9_4);
    let second = resolver.resolve(&address, RuntimeVersion::V1_10_20);
    assert_eq!(first, Some(BASE + 0x3000));
    assert_eq!(first, second);
}

#[test]
fn test_scan_helpers() {
    let image = engine_image();
    let pattern = Pattern::parse("48 8B ?? ?? ?? ?? ??").unwrap();

    assert_eq!(scan_first(&image, &pattern).unwrap(), Some(BASE + 0x1000));
    assert_eq!(
        scan_all(&image, &pattern).unwrap(),
        vec![BASE + 0x1000, BASE + 0x2000]
    );
}
