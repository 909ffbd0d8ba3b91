use std::fs;
use std::path::PathBuf;

use ootw_core::host::Host;
use ootw_core::res::game_part::GamePart;
use ootw_game::DirectoryHost;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ootw_game_integration_{name}"));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn descriptor_record(kind: u8, bank_number: u8, offset: u32, packed: u32, unpacked: u32) -> Vec<u8> {
    let mut bytes = vec![kind, bank_number, 0, 0];
    bytes.extend_from_slice(&offset.to_be_bytes());
    bytes.extend_from_slice(&packed.to_be_bytes());
    bytes.extend_from_slice(&unpacked.to_be_bytes());
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

fn sentinel_record() -> Vec<u8> {
    descriptor_record(0xFF, 0, 0, 0, 0)
}

/// Writes a minimal single-part game directory: one bank file holding a
/// ten-`Yield`-opcode bytecode program plus a palette's worth of zeroed
/// bytes, and a `MEMLIST.BIN` with two descriptors pointing at each half.
fn write_minimal_game(dir: &std::path::Path) {
    let bytecode = vec![6u8; 10]; // ten Yield opcodes
    let palette = vec![0u8; 32]; // one all-black palette entry
    let mut bank = Vec::new();
    bank.extend_from_slice(&bytecode);
    bank.extend_from_slice(&palette);
    fs::write(dir.join("BANK01"), &bank).unwrap();

    let mut memlist = Vec::new();
    memlist.extend(descriptor_record(0, 1, 0, 10, 10)); // index 0: bytecode
    memlist.extend(descriptor_record(1, 1, 10, 32, 32)); // index 1: palette
    memlist.extend(sentinel_record());
    fs::write(dir.join("MEMLIST.BIN"), &memlist).unwrap();
}

#[test]
fn directory_host_loads_descriptors_and_banks_from_disk() {
    let dir = scratch_dir("loads_descriptors");
    write_minimal_game(&dir);

    let mut host = DirectoryHost::open(&dir).unwrap();
    let descriptors = host.load_resource_descriptors().unwrap();
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0].bank_number, 1);

    let bank = host.load_bank(1).unwrap();
    assert_eq!(bank.len(), 10 + 32);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn headless_run_switches_into_a_game_part_and_ticks_the_scheduler() {
    let dir = scratch_dir("run_ticks");
    write_minimal_game(&dir);

    let mut host = DirectoryHost::open(&dir).unwrap();
    let part = GamePart {
        id: 0x3E80,
        palette: 1,
        bytecode: 0,
        polygon: 0,
        animation: None,
    };

    let tics = ootw_game::run(&mut host, &part, ootw_core::timing::PAL_HZ, Some(5)).unwrap();
    assert_eq!(tics, 5);

    fs::remove_dir_all(&dir).unwrap();
}

/// Writes a two-part game directory: `BANK01` holds part A's bytecode and
/// palette, `BANK02` holds part B's, each pair addressed by its own
/// descriptor pair in `MEMLIST.BIN`.
fn write_two_part_game(dir: &std::path::Path) {
    let bytecode = vec![6u8; 10]; // ten Yield opcodes
    let palette = vec![0u8; 32];
    fs::write(dir.join("BANK01"), [bytecode.as_slice(), palette.as_slice()].concat()).unwrap();
    fs::write(dir.join("BANK02"), [bytecode.as_slice(), palette.as_slice()].concat()).unwrap();

    let mut memlist = Vec::new();
    memlist.extend(descriptor_record(0, 1, 0, 10, 10)); // index 0: part A bytecode
    memlist.extend(descriptor_record(1, 1, 10, 32, 32)); // index 1: part A palette
    memlist.extend(descriptor_record(0, 2, 0, 10, 10)); // index 2: part B bytecode
    memlist.extend(descriptor_record(1, 2, 10, 32, 32)); // index 3: part B palette
    memlist.extend(sentinel_record());
    fs::write(dir.join("MEMLIST.BIN"), &memlist).unwrap();
}

#[test]
fn switching_game_part_a_second_time_unloads_the_first_parts_resources() {
    let dir = scratch_dir("two_part_switch");
    write_two_part_game(&dir);

    let mut host = DirectoryHost::open(&dir).unwrap();
    let part_a = GamePart { id: 0x3E80, palette: 1, bytecode: 0, polygon: 0, animation: None };
    let part_b = GamePart { id: 0x3E81, palette: 3, bytecode: 2, polygon: 2, animation: None };

    let mut machine = ootw_core::vm::Machine::new();
    machine.load_descriptors(&mut host).unwrap();

    machine.switch_game_part(&mut host, &part_a).unwrap();
    assert_eq!(machine.game_part.unwrap().id, part_a.id);
    assert_eq!(machine.program.len(), 10);

    // Switching away drops part A's loaded bank bytes and loads part B's in
    // their place; the scheduler still runs cleanly against the new program.
    machine.switch_game_part(&mut host, &part_b).unwrap();
    assert_eq!(machine.game_part.unwrap().id, part_b.id);
    assert_eq!(machine.program.len(), 10);

    let mut scheduler = ootw_core::vm::Scheduler::new();
    let input = ootw_core::host::InputState::default();
    scheduler.run_tic(&mut machine, &mut host, input).unwrap();

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn directory_host_open_fails_on_a_nonexistent_directory() {
    let dir = scratch_dir("nonexistent_parent");
    let missing = dir.join("nope");
    assert!(DirectoryHost::open(&missing).is_err());
    fs::remove_dir_all(&dir).unwrap();
}
