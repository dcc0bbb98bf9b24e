//! Minimal CP/M harness for ZEXDOC/ZEXALL.
//!
//! CP/M memory layout:
//! - 0x0000: Warm boot (HALT here ends the run)
//! - 0x0005: BDOS entry (RET; calls are serviced before it executes)
//! - 0x0006-0x0007: Top of TPA (programs read this for stack init)
//! - 0x0100: Program load address (TPA start)

use std::io::Write;

use emu_core::SimpleBus;
use zilog_z80::Z80;

/// Service a BDOS call from the registers at the entry point.
fn bdos(cpu: &Z80<SimpleBus>, output: &mut String) {
    let regs = cpu.registers();
    match regs.c {
        2 => {
            // Print character in E
            output.push(regs.e as char);
            eprint!("{}", regs.e as char);
        }
        9 => {
            // Print string at DE until '$'
            let mut addr = regs.de();
            loop {
                let ch = cpu.bus().peek(addr);
                if ch == b'$' {
                    break;
                }
                output.push(ch as char);
                eprint!("{}", ch as char);
                addr = addr.wrapping_add(1);
            }
        }
        func => eprintln!("\nUnknown BDOS function: {func}"),
    }
    let _ = std::io::stderr().flush();
}

fn run_zex(binary: &[u8]) -> bool {
    let mut bus = SimpleBus::new();
    bus.load(0x0100, binary);
    bus.load(0x0000, &[0x76]); // HALT
    bus.load(0x0005, &[0xC9]); // RET
    bus.load(0x0006, &[0x00, 0xFE]); // 0xFE00

    let mut cpu = Z80::new(bus);
    cpu.set_pc(0x0100);
    cpu.set_sp(0xFE00);

    let mut output = String::new();
    let mut instructions: u64 = 0;

    while !cpu.is_halted() {
        if cpu.pc() == 0x0005 {
            bdos(&cpu, &mut output);
        }
        cpu.step();
        instructions += 1;

        if instructions % 10_000_000 == 0 {
            cpu.bus_mut().clear_io_writes();
            eprintln!("[{instructions} instructions]");
        }
    }

    eprintln!("\nTotal: {instructions} instructions, {} T-states", cpu.bus().ticks());
    eprintln!("Output length: {} chars", output.len());

    // ZEXDOC outputs "ERROR" on failure
    !output.contains("ERROR")
}

#[test]
#[ignore]
fn zexdoc() {
    let binary = std::fs::read("tests/data/zexdoc.com").expect("tests/data/zexdoc.com not found");
    assert!(run_zex(&binary), "ZEXDOC failed");
}

#[test]
#[ignore]
fn zexall() {
    let binary = std::fs::read("tests/data/zexall.com").expect("tests/data/zexall.com not found");
    assert!(run_zex(&binary), "ZEXALL failed");
}
