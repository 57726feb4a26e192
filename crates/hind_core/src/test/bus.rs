use super::run_words;
use crate::bus::{gpio, mailbox, ram, timer, Bus};
use crate::dump;
use crate::image::{Image, ImageError};

#[test]
fn ram_roundtrip() {
    let mut bus = Bus::new();

    bus.store(0x40, 0xdead_beef);
    assert_eq!(bus.load(0x40), Some(0xdead_beef));
}

#[test]
fn region_dispatch() {
    let bus = Bus::new();

    assert_eq!(bus.region_index(0x0), Some(0));
    assert_eq!(bus.region_index(ram::SIZE as u32 - 4), Some(0));
    assert_eq!(bus.region_index(ram::SIZE as u32), None);

    assert_eq!(bus.region_index(timer::BASE), Some(1));
    assert_eq!(bus.region_index(timer::BASE + timer::SIZE as u32 - 4), Some(1));
    assert_eq!(bus.region_index(timer::BASE + timer::SIZE as u32 - 3), None);

    assert_eq!(bus.region_index(mailbox::BASE), Some(2));
    assert_eq!(bus.region_index(gpio::BASE), Some(3));
    assert_eq!(bus.region_index(gpio::BASE + 0x3c), Some(3));
}

#[test]
fn unmapped_access_has_no_effect() {
    let mut bus = Bus::new();

    assert_eq!(bus.load(0x1234_5678), None);
    assert_eq!(bus.store(0x1234_5678, 1), None);
}

#[test]
fn write_past_region_end_fails() {
    let mut bus = Bus::new();

    // The last word of the timer region is readable but not writable.
    let addr = timer::BASE + 0x10;
    assert_eq!(bus.store(addr, 0xdead_beef), Some(()));
    assert_eq!(bus.load(addr), Some(0));
}

#[test]
fn gpio_self_identifies() {
    let mut bus = Bus::new();

    assert_eq!(bus.load(gpio::BASE), Some(0x2020_0000));
    assert_eq!(bus.load(gpio::BASE + 0x4), Some(0x2020_0004));
    assert_eq!(bus.load(gpio::BASE + 0x8), Some(0x2020_0008));
}

#[test]
fn timer_publishes_elapsed_time() {
    let mut bus = Bus::new();

    // The counter words hold nothing until a read of the low word patches
    // them in.
    assert!(bus.load(timer::BASE + timer::COUNTER_LO).is_some());
    assert!(bus.load(timer::BASE + timer::COUNTER_HI).is_some());
}

#[test]
fn image_length_validation() {
    assert!(matches!(
        Image::from_bytes(vec![0; 5]),
        Err(ImageError::BadLength(5))
    ));
    assert!(matches!(
        Image::from_bytes(vec![0; ram::SIZE + 4]),
        Err(ImageError::TooLarge(_))
    ));
    assert!(Image::from_bytes(vec![0; 8]).is_ok());
}

#[test]
fn dump_is_idempotent() {
    let cpu = run_words(&[0xe3a0_0041, 0xe3a0_100c, 0xe581_0000, 0xe591_2000, 0]);

    let mut first = Vec::new();
    let mut second = Vec::new();
    dump::dump_registers(&cpu, &mut first).unwrap();
    dump::dump_memory(cpu.bus.ram(), &mut first).unwrap();
    dump::dump_registers(&cpu, &mut second).unwrap();
    dump::dump_memory(cpu.bus.ram(), &mut second).unwrap();

    assert_eq!(first, second);
}

#[test]
fn dump_format() {
    let cpu = run_words(&[0xe3a0_1005, 0]);

    let mut out = Vec::new();
    dump::dump_registers(&cpu, &mut out).unwrap();
    dump::dump_memory(cpu.bus.ram(), &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("$1  :          5 (0x00000005)"));
    assert!(out.contains("PC  :         12 (0x0000000c)"));
    // Registers 13 and 14 are not reported.
    assert!(!out.contains("$13"));
    assert!(!out.contains("$14"));
    // Memory words are displayed byte-swapped.
    assert!(out.contains("0x00000000: 0x0510a0e3"));
}
