//! cpm68k CLI
//!
//! Argument parsing, S-record/binary loading, terminal mode switching and
//! the interactive debugger are all external collaborators (see `spec.md`
//! §1) and live outside this crate. This binary just boots the core far
//! enough to prove the pieces this crate *does* own fit together: a flat
//! `Memory`, a `CpuCore` reset off the vector table, and one `step()`.

use cpm68k::{AddressBus, CpuCore, Memory};

fn main() {
    println!("cpm68k - CP/M-68K hosting core");
    println!("===============================\n");

    let mut mem = Memory::new();
    // Reset vectors: SSP = 0x400, PC = 0x1000.
    mem.write_long(0, 0x0000_0400);
    mem.write_long(4, 0x0000_1000);

    let mut cpu = CpuCore::new();
    cpu.reset(&mut mem);

    println!("Initial PC: ${:08X}", cpu.pc);
    println!("Initial SSP: ${:08X}", cpu.sp());
    println!("Initial SR: ${:04X}", cpu.get_sr());
    println!("\nNo program loaded -- pass a boot image via an external loader.");
}
