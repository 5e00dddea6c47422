mod common;

use common::{SSP, boot_with_words, boot_with_words_and_vector};

/// S4: an odd address handed to a word access raises address error (vector
/// 3) with the fourteen-byte frame, not the short three-word frame.
#[test]
fn word_access_to_odd_address_raises_address_error() {
    let handler = 0x0000_9000;
    let (mut cpu, mut mem) =
        boot_with_words_and_vector(0x1000, &[0x3010], 3, handler); // MOVE.W (A0),D0
    cpu.pc = 0x1000;
    cpu.set_a(0, 0x0000_1003); // odd address

    let ssp_before = cpu.sp();
    cpu.step(&mut mem);

    assert_eq!(cpu.pc, handler);
    assert!(cpu.is_supervisor());
    assert_eq!(cpu.sp(), ssp_before - 14); // long frame: SR+PC+IR+address+status word
}

/// ANDI.W #imm,SR is privileged: executing it from user mode raises
/// privilege violation (vector 8) with the short frame and re-enters
/// supervisor mode.
#[test]
fn andi_to_sr_in_user_mode_raises_privilege_violation() {
    let handler = 0x0000_9100;
    let (mut cpu, mut mem) =
        boot_with_words_and_vector(0x1000, &[0x027C, 0x0000], 8, handler); // ANDI.W #0,SR
    cpu.pc = 0x1000;
    cpu.set_usp(0x0000_3000);
    cpu.set_s_flag(0); // drop to user mode

    let usp_before = cpu.sp();
    cpu.step(&mut mem);

    assert_eq!(cpu.pc, handler);
    assert!(cpu.is_supervisor());
    assert_eq!(cpu.get_usp(), usp_before); // user stack untouched
    assert_eq!(cpu.sp(), SSP - 6); // short frame on the supervisor stack
}

/// MOVE from USP is privileged; attempting it in user mode raises privilege
/// violation and never touches the destination register.
#[test]
fn move_from_usp_in_user_mode_raises_privilege_violation() {
    let handler = 0x0000_9100;
    let (mut cpu, mut mem) =
        boot_with_words_and_vector(0x1000, &[0x4E68], 8, handler); // MOVE USP,A0
    cpu.pc = 0x1000;
    cpu.set_usp(0x0000_3000);
    cpu.set_a(0, 0xDEAD_BEEF);
    cpu.set_s_flag(0);

    cpu.step(&mut mem);

    assert_eq!(cpu.pc, handler);
    assert!(cpu.is_supervisor());
}

/// MOVE to/from USP round-trips through the dedicated USP bank while in
/// supervisor mode.
#[test]
fn move_to_and_from_usp_round_trips_in_supervisor_mode() {
    let (mut cpu, mut mem) = boot_with_words(0x1000, &[0x4E60, 0x4E69]); // MOVE A0,USP ; MOVE USP,A1
    cpu.pc = 0x1000;
    cpu.set_a(0, 0x0000_4000);

    cpu.step(&mut mem); // MOVE A0,USP
    assert_eq!(cpu.get_usp(), 0x0000_4000);

    cpu.step(&mut mem); // MOVE USP,A1
    assert_eq!(cpu.a(1), 0x0000_4000);
}

/// CHK's exception stacks the address of the *next* instruction, and runs
/// in supervisor mode regardless of the mode CHK itself executed in.
#[test]
fn chk_exception_enters_supervisor_mode_and_stacks_next_pc() {
    let handler = 0x0000_9200;
    let (mut cpu, mut mem) = boot_with_words_and_vector(0x1000, &[0x4181], 6, handler); // CHK D1,D0
    cpu.pc = 0x1000;
    cpu.set_d(0, 5);
    cpu.set_d(1, 100);

    cpu.step(&mut mem);

    assert_eq!(cpu.pc, handler);
    assert!(cpu.is_supervisor());
}
