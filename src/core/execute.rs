//! Main execution loop: the fetch-decode-execute cycle.

use super::cpu::{CpuCore, SFLAG_SET};
use super::decode::dispatch_instruction;
use super::memory::AddressBus;
use super::trace::CpuSnapshot;
use super::types::{InternalStepResult, StepResult};

/// Stop level constants.
pub const STOP_LEVEL_STOP: u32 = 1;
pub const STOP_LEVEL_HALT: u32 = 2;

/// Run mode constants.
pub const RUN_MODE_NORMAL: u32 = 0;
pub const RUN_MODE_BERR_AERR_RESET: u32 = 1;

impl CpuCore {
    fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            d: [
                self.dar[0], self.dar[1], self.dar[2], self.dar[3], self.dar[4], self.dar[5],
                self.dar[6], self.dar[7],
            ],
            a: [
                self.dar[8], self.dar[9], self.dar[10], self.dar[11], self.dar[12], self.dar[13],
                self.dar[14], self.dar[15],
            ],
            pc: self.pc,
            ssp: self.sp[SFLAG_SET as usize],
            sr: self.get_sr(),
        }
    }

    /// Resolve one `InternalStepResult` sentinel into a cycle count,
    /// auto-vectoring A-line/F-line/illegal/TRAP(!=15) exceptions. `TRAP
    /// #15` is intercepted earlier, in `step`, before it ever reaches here.
    fn resolve_trap<B: AddressBus>(&mut self, bus: &mut B, result: InternalStepResult) -> i32 {
        match result {
            InternalStepResult::Ok { cycles } => cycles,
            InternalStepResult::AlineTrap { .. } => self.take_aline_exception(bus),
            InternalStepResult::FlineTrap { .. } => self.take_fline_exception(bus),
            InternalStepResult::TrapInstruction { trap_num } => {
                self.take_trap_exception(bus, trap_num)
            }
            InternalStepResult::IllegalInstruction { .. } => self.take_illegal_exception(bus),
        }
    }

    /// Execute instructions for the given cycle budget.
    ///
    /// Returns the number of cycles actually consumed (may exceed
    /// `num_cycles` slightly, since an in-flight instruction always runs to
    /// completion).
    pub fn execute<B: AddressBus>(&mut self, bus: &mut B, num_cycles: i32) -> i32 {
        if self.reset_cycles > 0 {
            let rc = self.reset_cycles as i32;
            self.reset_cycles = 0;
            let remaining = num_cycles - rc;
            if remaining <= 0 {
                return rc;
            }
            self.cycles_remaining = remaining;
        } else {
            self.cycles_remaining = num_cycles;
        }
        self.initial_cycles = num_cycles;

        self.check_and_service_interrupt(bus);

        if self.stopped != 0 {
            self.cycles_remaining = 0;
            return self.initial_cycles;
        }

        while self.cycles_remaining > 0 {
            let cycles = self.step_inner(bus);
            self.cycles_remaining -= cycles;

            if self.int_level > 0 {
                self.check_and_service_interrupt(bus);
            }
            if self.stopped != 0 {
                break;
            }
        }

        self.initial_cycles - self.cycles_remaining
    }

    /// Execute a single instruction. A-line, F-line, illegal-opcode, and
    /// non-15 TRAP exceptions are taken automatically; there is no
    /// interception point for them. `TRAP #15` goes through the registered
    /// [`TrapHook`](super::types::TrapHook) instead of vectoring, when one is
    /// registered.
    pub fn step<B: AddressBus>(&mut self, bus: &mut B) -> StepResult {
        if self.stopped != 0 {
            return StepResult::Stopped;
        }

        let cycles = self.step_inner(bus);

        if self.int_level > 0 {
            self.check_and_service_interrupt(bus);
        }

        if self.is_stopped() {
            StepResult::Stopped
        } else {
            StepResult::Ok { cycles }
        }
    }

    /// Fetch, trace, dispatch, and resolve one instruction. Shared by
    /// `step` and `execute`'s inner loop.
    fn step_inner<B: AddressBus>(&mut self, bus: &mut B) -> i32 {
        self.ppc = self.pc;
        self.dar_save = self.dar;
        self.sr_save = self.get_sr();

        let snap = self.snapshot();
        self.trace.start(snap);

        self.ir = self.read_imm_16(bus) as u32;
        self.trace.mc(self.ir as u16);
        let (mnemonic, _) = crate::dasm::format::disassemble(self.ppc, self.ir as u16);
        self.trace.op_mnemonic(&mnemonic);

        if self.run_mode == RUN_MODE_BERR_AERR_RESET {
            self.run_mode = RUN_MODE_NORMAL;
            self.trace.end();
            return 0;
        }

        let result = dispatch_instruction(self, bus, self.ir as u16);

        // TRAP #15 is the one sentinel `step`/`execute` intercept before
        // vectoring, handing D0-D7 and the bus to the host hook.
        let cycles = if let InternalStepResult::TrapInstruction { trap_num: 15 } = result {
            if let Some(mut hook) = self.trap15_hook.take() {
                let mut d = [
                    self.dar[0], self.dar[1], self.dar[2], self.dar[3], self.dar[4], self.dar[5],
                    self.dar[6], self.dar[7],
                ];
                hook.handle(&mut d, bus);
                self.dar[0..8].copy_from_slice(&d);
                self.trap15_hook = Some(hook);
                4 // TRAP instruction's own fetch/decode cost; the hook itself is free
            } else {
                self.resolve_trap(bus, result)
            }
        } else {
            self.resolve_trap(bus, result)
        };

        self.trace.end();

        if self.run_mode == RUN_MODE_BERR_AERR_RESET {
            self.run_mode = RUN_MODE_NORMAL;
            return cycles;
        }

        if self.check_trace() {
            return cycles + self.exception_trace(bus);
        }

        cycles
    }

    // ========== Stack Operations ==========

    /// Push a word onto the stack.
    #[inline]
    pub fn push_16<B: AddressBus>(&mut self, bus: &mut B, value: u16) {
        self.dar[15] = self.dar[15].wrapping_sub(2);
        self.write_16(bus, self.dar[15], value);
    }

    /// Push a long onto the stack.
    #[inline]
    pub fn push_32<B: AddressBus>(&mut self, bus: &mut B, value: u32) {
        self.dar[15] = self.dar[15].wrapping_sub(4);
        self.write_32(bus, self.dar[15], value);
    }

    /// Pull a word from the stack.
    #[inline]
    pub fn pull_16<B: AddressBus>(&mut self, bus: &mut B) -> u16 {
        let value = self.read_16(bus, self.dar[15]);
        self.dar[15] = self.dar[15].wrapping_add(2);
        value
    }

    /// Pull a long from the stack.
    #[inline]
    pub fn pull_32<B: AddressBus>(&mut self, bus: &mut B) -> u32 {
        let value = self.read_32(bus, self.dar[15]);
        self.dar[15] = self.dar[15].wrapping_add(4);
        value
    }

    // ========== Program Flow ==========

    /// Jump to a new PC.
    #[inline]
    pub fn jump(&mut self, new_pc: u32) {
        self.pc = self.address(new_pc);
    }

    /// Jump to an exception vector (vector table is fixed at address 0).
    pub fn jump_vector<B: AddressBus>(&mut self, bus: &mut B, vector: u32) {
        let addr = vector << 2;
        self.pc = self.read_32(bus, addr);
    }

    /// Branch with 8-bit displacement.
    #[inline]
    pub fn branch_8(&mut self, offset: u8) {
        self.pc = self.pc.wrapping_add(offset as i8 as i32 as u32);
    }

    /// Branch with 16-bit displacement.
    #[inline]
    pub fn branch_16(&mut self, offset: u16) {
        self.pc = self.pc.wrapping_add(offset as i16 as i32 as u32);
    }

    /// Branch with 32-bit displacement.
    #[inline]
    pub fn branch_32(&mut self, offset: u32) {
        self.pc = self.pc.wrapping_add(offset);
    }

    // ========== Interrupts ==========
    //
    // Interrupt-level servicing is bounded to SR I0-I2 bookkeeping and the
    // autovector/vectored dispatch a host raises through `int_level`; there
    // is no modeling of interrupt priority arbitration or multi-level
    // nesting beyond what the mask comparison below implies.

    fn check_and_service_interrupt<B: AddressBus>(&mut self, bus: &mut B) {
        let mask_level = (self.int_mask >> 8) & 7;
        let int_level = self.int_level & 7;

        if int_level == 7 || int_level > mask_level {
            self.service_interrupt(bus, int_level as u8);
            self.int_level = 0;
        }
    }

    fn service_interrupt<B: AddressBus>(&mut self, bus: &mut B, level: u8) {
        let vector = bus.interrupt_acknowledge(level);
        let vector = if vector == 0xFFFF_FFFF {
            24 + level as u32
        } else {
            vector & 0xFF
        };

        let old_sr = self.get_sr();
        self.t1_flag = 0;
        self.set_s_flag(SFLAG_SET);
        self.int_mask = ((level as u32) & 7) << 8;

        self.push_32(bus, self.pc);
        self.push_16(bus, old_sr);
        self.jump_vector(bus, vector);

        self.stopped = 0;
        self.cycles_remaining -= 44; // approximate autovector interrupt cost
    }

    /// Halt the CPU (unrecoverable double fault).
    pub fn halt(&mut self) {
        self.stopped |= STOP_LEVEL_HALT;
    }

    /// Stop the CPU (STOP instruction): load SR, then idle until an
    /// interrupt above the current mask arrives.
    pub fn stop(&mut self, new_sr: u16) {
        self.set_sr(new_sr);
        self.stopped |= STOP_LEVEL_STOP;
    }
}
