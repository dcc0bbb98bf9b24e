//! Hand-checked instruction fixtures.
//!
//! Each file under `tests/fixtures/` holds a list of cases: a partial
//! register state, the code bytes placed at PC, optional RAM and port
//! contents, the T-states the step must cost and the observable values
//! that must hold afterwards. Unlisted registers start at zero.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use emu_core::{Observable, SimpleBus, Value};
use serde::Deserialize;
use zilog_z80::{Registers, Z80};

#[derive(Deserialize)]
struct Fixture {
    name: String,
    #[serde(default)]
    initial: Registers,
    code: Vec<u8>,
    #[serde(default)]
    ram: Vec<(u16, u8)>,
    #[serde(default)]
    ports: Vec<(u16, u8)>,
    #[serde(default = "one_step")]
    steps: u32,
    ticks: u64,
    #[serde(default)]
    expect: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    expect_ram: Vec<(u16, u8)>,
}

const fn one_step() -> u32 {
    1
}

fn to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => b.into(),
        Value::U8(v) => v.into(),
        Value::U16(v) => v.into(),
        Value::U64(v) => v.into(),
        Value::Name(name) => name.into(),
    }
}

/// Run one fixture and return every mismatch.
fn run(fixture: &Fixture) -> Vec<String> {
    let mut bus = SimpleBus::new();
    for &(addr, value) in &fixture.ram {
        bus.poke(addr, value);
    }
    bus.load(fixture.initial.pc, &fixture.code);
    for &(port, value) in &fixture.ports {
        bus.set_port(port, value);
    }

    let mut cpu = Z80::new(bus);
    *cpu.regs_mut() = fixture.initial;
    for _ in 0..fixture.steps {
        cpu.step();
    }

    let mut errors = Vec::new();

    let ticks = cpu.bus().ticks();
    if ticks != fixture.ticks {
        errors.push(format!("ticks: got {ticks}, want {}", fixture.ticks));
    }

    for (path, want) in &fixture.expect {
        match cpu.query(path) {
            Some(got) => {
                if to_json(got) != *want {
                    errors.push(format!("{path}: got {got}, want {want}"));
                }
            }
            None => errors.push(format!("{path}: unknown path")),
        }
    }

    for &(addr, want) in &fixture.expect_ram {
        let got = cpu.bus().peek(addr);
        if got != want {
            errors.push(format!("RAM[${addr:04X}]: got ${got:02X}, want ${want:02X}"));
        }
    }

    errors
}

fn run_file(name: &str) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let data = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    let fixtures: Vec<Fixture> = serde_json::from_str(&data)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()));

    let mut failures = Vec::new();
    for fixture in &fixtures {
        let errors = run(fixture);
        if !errors.is_empty() {
            failures.push(format!("  FAIL [{}]: {}", fixture.name, errors.join(", ")));
        }
    }

    assert!(
        failures.is_empty(),
        "{name}: {} of {} failed\n{}",
        failures.len(),
        fixtures.len(),
        failures.join("\n")
    );
}

#[test]
fn base_opcodes() {
    run_file("base.json");
}

#[test]
fn cb_opcodes() {
    run_file("cb.json");
}

#[test]
fn ed_opcodes() {
    run_file("ed.json");
}

#[test]
fn index_opcodes() {
    run_file("index.json");
}
