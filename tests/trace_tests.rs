mod common;

use common::boot_with_words;
use cpm68k::TraceRing;

/// Stepping the CPU appends an entry to its trace ring; the compact dump
/// carries the instruction's address and fetched opcode word.
#[test]
fn stepping_appends_a_trace_entry_with_address_and_opcode() {
    let (mut cpu, mut mem) = boot_with_words(0x2000, &[0x7205]); // MOVEQ #5,D0
    cpu.pc = 0x2000;

    cpu.step(&mut mem);

    let dump = cpu.trace.dump(true);
    assert!(dump.contains("002000"));
    assert!(dump.contains("7205"));
}

/// The ring is a fixed-capacity circular buffer: driving it well past
/// capacity doesn't grow unbounded, and the dump still only shows entries
/// that were actually started.
#[test]
fn trace_ring_wraps_without_growing() {
    let mut words = vec![0x4E71u16; 200]; // NOP x200
    words.push(0x4E71);
    let (mut cpu, mut mem) = boot_with_words(0x1000, &words);
    cpu.pc = 0x1000;

    for _ in 0..150 {
        cpu.step(&mut mem);
    }

    let dump = cpu.trace.dump(true);
    // 150 NOPs into a 64-entry ring: only the most recent 64 remain, and the
    // chronological dump still ends with the latest instruction executed.
    assert!(dump.lines().count() <= 64);
}

#[test]
fn fresh_trace_ring_dumps_empty() {
    let ring = TraceRing::new();
    assert_eq!(ring.dump(true), "");
}
