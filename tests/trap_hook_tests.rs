mod common;

use common::boot_with_words;
use cpm68k::{AddressBus, TrapHook};

/// A minimal CP/M-68K-style BDOS stub: function 3 ("console output")
/// echoes the byte in D1 into a buffer and reports success in D0.
struct ConsoleOutHook {
    written: Vec<u8>,
}

impl TrapHook for ConsoleOutHook {
    fn handle(&mut self, d: &mut [u32; 8], _bus: &mut dyn AddressBus) {
        if d[0] == 3 {
            self.written.push((d[1] & 0xFF) as u8);
            d[0] = 0;
        }
    }
}

/// S6: TRAP #15 invokes the registered host hook with D0-D7, advances PC by
/// exactly 2 (one instruction word, no extension words), and otherwise
/// behaves as a no-op from the CPU's perspective -- no SR change, no stack
/// push.
#[test]
fn trap_15_invokes_registered_hook_and_advances_pc_by_two() {
    let (mut cpu, mut mem) = boot_with_words(0x1000, &[0x4E4F]); // TRAP #15
    cpu.pc = 0x1000;
    cpu.set_d(0, 3);
    cpu.set_d(1, b'A' as u32);
    cpu.set_trap15_hook(Some(Box::new(ConsoleOutHook { written: Vec::new() })));

    let sr_before = cpu.get_sr();
    let sp_before = cpu.sp();

    cpu.step(&mut mem);

    assert_eq!(cpu.pc, 0x1002);
    assert_eq!(cpu.get_sr(), sr_before);
    assert_eq!(cpu.sp(), sp_before);
    assert_eq!(cpu.d(0), 0); // hook's "success" return value
}

/// Without a registered hook, TRAP #15 behaves as an ordinary TRAP and
/// vectors through the normal exception table.
#[test]
fn trap_15_without_a_hook_vectors_normally() {
    let handler = 0x0000_9300;
    let (mut cpu, mut mem) = boot_with_words(0x1000, &[0x4E4F]); // TRAP #15
    mem.write_long((32 + 15) * 4, handler);
    cpu.reset(&mut mem);
    cpu.pc = 0x1000;

    cpu.step(&mut mem);

    assert_eq!(cpu.pc, handler);
    assert!(cpu.is_supervisor());
}
