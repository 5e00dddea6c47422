mod common;

use common::boot_with_words;
use cpm68k::AddressBus;

/// Property 8: MOVEM register-to-memory followed by the matching
/// memory-to-register MOVEM round-trips the saved registers, and only the
/// post-increment form writes the address register back (pre-decrement
/// also writes back, but to a different value -- this is the asymmetric
/// half of the pairing: the (A7)+ load restores A7 to exactly where it
/// started).
#[test]
fn movem_predecrement_then_postincrement_round_trips_registers() {
    let (mut cpu, mut mem) = boot_with_words(
        0x1000,
        &[
            0x48E7, 0x8080, // MOVEM.L D0/A0,-(A7)
            0x4C9F, 0x0101, // MOVEM.L (A7)+,D0/A0
        ],
    );
    cpu.pc = 0x1000;
    cpu.set_d(0, 0x1111_2222);
    cpu.set_a(0, 0x3333_4444);
    let sp_before = cpu.sp();

    cpu.step(&mut mem); // MOVEM.L D0/A0,-(A7)
    assert_eq!(cpu.sp(), sp_before - 8);
    // D0 (the lower register number) lands at the lowest address.
    assert_eq!(mem.read_long(cpu.sp()), 0x1111_2222);
    assert_eq!(mem.read_long(cpu.sp() + 4), 0x3333_4444);

    cpu.set_d(0, 0);
    cpu.set_a(0, 0);

    cpu.step(&mut mem); // MOVEM.L (A7)+,D0/A0
    assert_eq!(cpu.d(0), 0x1111_2222);
    assert_eq!(cpu.a(0), 0x3333_4444);
    assert_eq!(cpu.sp(), sp_before); // postincrement restores A7 exactly
}

/// MOVEM.W sign-extends each word loaded into a 32-bit register.
#[test]
fn movem_word_load_sign_extends_into_registers() {
    let (mut cpu, mut mem) = boot_with_words(
        0x1000,
        &[
            0x4C98, 0x0001, // MOVEM.W (A0)+,D0
        ],
    );
    cpu.pc = 0x1000;
    cpu.set_a(0, 0x0000_2000);
    mem.write_word(0x0000_2000, 0xFFFE); // -2 as a word

    cpu.step(&mut mem);

    assert_eq!(cpu.d(0), 0xFFFF_FFFE);
    assert_eq!(cpu.a(0), 0x0000_2002); // post-increment writeback
}
