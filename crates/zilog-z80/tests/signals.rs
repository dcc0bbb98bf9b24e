//! RESET, NMI and INT handling.

use emu_core::SimpleBus;
use zilog_z80::Z80;

/// CPU at 0x0000 with SP at 0x8000, `code` loaded at 0x0000.
fn cpu_with(code: &[u8]) -> Z80<SimpleBus> {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, code);
    let mut cpu = Z80::new(bus);
    cpu.set_pc(0x0000);
    cpu.set_sp(0x8000);
    cpu
}

#[test]
fn reset_wins_over_nmi_and_int() {
    let mut cpu = cpu_with(&[0x00]);
    {
        let regs = cpu.regs_mut();
        regs.pc = 0x1234;
        regs.iff1 = true;
        regs.iff2 = true;
        regs.im = 2;
        regs.i = 0x3F;
    }
    cpu.set_reset(true);
    cpu.set_nmi(true);
    cpu.set_int(true);

    cpu.step();

    let regs = cpu.registers();
    assert_eq!(regs.pc, 0x0000);
    assert_eq!(regs.ir(), 0x0000);
    assert_eq!(regs.im, 0);
    assert!(!regs.iff1 && !regs.iff2);
    assert_eq!(regs.sp, 0x8000, "nothing pushed");
    assert_eq!(cpu.bus().ticks(), 3);
}

#[test]
fn nmi_pushes_pc_and_preserves_iff1_in_iff2() {
    let mut cpu = cpu_with(&[0x00]);
    cpu.regs_mut().pc = 0x4321;
    cpu.regs_mut().iff1 = true;
    cpu.regs_mut().iff2 = true;
    cpu.set_nmi(true);

    cpu.step();

    let regs = cpu.registers();
    assert_eq!(regs.pc, 0x0066);
    assert!(!regs.iff1);
    assert!(regs.iff2);
    assert_eq!(regs.sp, 0x7FFE);
    assert_eq!(cpu.bus().peek(0x7FFE), 0x21);
    assert_eq!(cpu.bus().peek(0x7FFF), 0x43);
    assert_eq!(cpu.bus().ticks(), 11);
}

#[test]
fn nmi_ignores_disabled_interrupts() {
    let mut cpu = cpu_with(&[0xF3]); // DI
    cpu.step();
    cpu.set_nmi(true);

    cpu.step();

    assert_eq!(cpu.pc(), 0x0066);
}

#[test]
fn retn_restores_iff1_after_nmi() {
    let mut cpu = cpu_with(&[0xFB, 0x00]); // EI, NOP
    cpu.bus_mut().load(0x0066, &[0xED, 0x45]); // RETN
    cpu.step();
    cpu.step();
    cpu.set_nmi(true);
    cpu.step();
    cpu.set_nmi(false);
    assert!(!cpu.registers().iff1);

    cpu.step();

    assert_eq!(cpu.pc(), 0x0002);
    assert!(cpu.registers().iff1);
}

#[test]
fn int_waits_for_instruction_after_ei() {
    let mut cpu = cpu_with(&[0xFB, 0x00, 0x00]); // EI, NOP, NOP
    cpu.regs_mut().im = 1;
    cpu.set_int(true);

    cpu.step(); // EI
    assert!(cpu.int_blocked());
    cpu.step(); // NOP runs despite INT being asserted
    assert_eq!(cpu.pc(), 0x0002);

    cpu.step(); // INT accepted
    assert_eq!(cpu.pc(), 0x0038);
    assert_eq!(cpu.bus().peek(0x7FFE), 0x02);
}

#[test]
fn int_not_accepted_between_prefix_and_opcode() {
    // Two DD prefixes then NOP: the prefix chain is one step, so INT can
    // only land on either side of it.
    let mut cpu = cpu_with(&[0xDD, 0xDD, 0x00, 0x00]);
    cpu.regs_mut().iff1 = true;
    cpu.regs_mut().im = 1;

    cpu.step();
    assert_eq!(cpu.pc(), 0x0003);

    cpu.set_int(true);
    cpu.step();
    assert_eq!(cpu.pc(), 0x0038);
}

#[test]
fn int_ignored_while_disabled() {
    let mut cpu = cpu_with(&[0x00, 0x00]);
    cpu.set_int(true);

    cpu.step();

    assert_eq!(cpu.pc(), 0x0001);
    assert_eq!(cpu.bus().ticks(), 4);
}

#[test]
fn im1_costs_13_t_states() {
    let mut cpu = cpu_with(&[0x00]);
    cpu.regs_mut().iff1 = true;
    cpu.regs_mut().iff2 = true;
    cpu.regs_mut().im = 1;
    cpu.set_int(true);

    cpu.step();

    let regs = cpu.registers();
    assert_eq!(regs.pc, 0x0038);
    assert_eq!(regs.wz, 0x0038);
    assert!(!regs.iff1 && !regs.iff2);
    assert_eq!(cpu.bus().ticks(), 13);
    assert_eq!(cpu.fetch_count(), 0, "acknowledge is not an opcode fetch");
}

#[test]
fn im0_behaves_as_rst_38() {
    let mut cpu = cpu_with(&[0x00]);
    cpu.regs_mut().iff1 = true;
    cpu.regs_mut().im = 0;
    cpu.set_data_bus(0xC7); // RST 00h would go elsewhere
    cpu.set_int(true);

    cpu.step();

    assert_eq!(cpu.pc(), 0x0038);
    assert_eq!(cpu.bus().ticks(), 13);
}

#[test]
fn im2_reads_vector_through_i_and_data_bus() {
    let mut cpu = cpu_with(&[0x00]);
    cpu.bus_mut().load(0x3FFE, &[0x00, 0x90]);
    {
        let regs = cpu.regs_mut();
        regs.iff1 = true;
        regs.im = 2;
        regs.i = 0x3F;
    }
    cpu.set_data_bus(0xFE);
    cpu.set_int(true);

    cpu.step();

    let regs = cpu.registers();
    assert_eq!(regs.pc, 0x9000);
    assert_eq!(regs.wz, 0x9000);
    assert_eq!(cpu.bus().ticks(), 19);
}

#[test]
fn int_wakes_halt_and_returns_past_it() {
    let mut cpu = cpu_with(&[0xFB, 0x76, 0x00]); // EI, HALT, NOP
    cpu.regs_mut().im = 1;
    cpu.step();
    cpu.step();
    cpu.step();
    assert!(cpu.is_halted());
    assert_eq!(cpu.pc(), 0x0001);

    cpu.set_int(true);
    cpu.step();

    assert!(!cpu.is_halted());
    assert_eq!(cpu.pc(), 0x0038);
    // Return address is the instruction after HALT.
    assert_eq!(cpu.bus().peek(0x7FFE), 0x02);
    assert_eq!(cpu.bus().peek(0x7FFF), 0x00);
}

#[test]
fn nmi_wakes_halt() {
    let mut cpu = cpu_with(&[0x76]);
    cpu.step();
    assert!(cpu.is_halted());

    cpu.set_nmi(true);
    cpu.step();

    assert!(!cpu.is_halted());
    assert_eq!(cpu.pc(), 0x0066);
    assert_eq!(cpu.bus().peek(0x7FFE), 0x01);
}

#[test]
fn ld_a_i_reports_iff2_without_pending_int() {
    let mut cpu = cpu_with(&[0xED, 0x57]); // LD A,I
    cpu.regs_mut().iff2 = true;
    cpu.regs_mut().i = 0x00;

    cpu.step();

    assert_ne!(cpu.registers().f & 0x04, 0);
}

#[test]
fn ld_a_i_clears_p_when_int_lands_on_it() {
    let mut cpu = cpu_with(&[0xFB, 0xED, 0x57]); // EI, LD A,I
    cpu.regs_mut().im = 1;
    cpu.set_int(true);

    cpu.step(); // EI with interrupts still disabled
    cpu.step(); // LD A,I runs in the EI shadow with INT pending

    assert_eq!(cpu.pc(), 0x0003);
    assert_eq!(cpu.registers().f & 0x04, 0, "P/V reads 0");

    cpu.step();
    assert_eq!(cpu.pc(), 0x0038);
}

#[test]
fn signal_lines_are_level_sensitive() {
    let mut cpu = cpu_with(&[0x00]);
    cpu.bus_mut().load(0x0066, &[0x00]);
    cpu.set_nmi(true);

    cpu.step();
    cpu.step();

    // Still asserted: taken again instead of running the NOP at 0066h.
    assert_eq!(cpu.pc(), 0x0066);
    assert_eq!(cpu.registers().sp, 0x7FFC);
}
