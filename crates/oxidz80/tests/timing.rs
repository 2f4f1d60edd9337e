// Every opcode executed once from power-on state must cost its documented
// number of T-states.

use oxide_core::{Cpu, Memory};
use oxidz80::{OxidZ80, Registers};

// Conditional entries hold the "not taken" value; 0 marks a prefix byte.
#[rustfmt::skip]
const BASE_TIMINGS: [u32; 256] = [
     4, 10,  7,  6,  4,  4,  7,  4,  4, 11,  7,  6,  4,  4,  7,  4,
     8, 10,  7,  6,  4,  4,  7,  4, 12, 11,  7,  6,  4,  4,  7,  4,
     7, 10, 16,  6,  4,  4,  7,  4,  7, 11, 16,  6,  4,  4,  7,  4,
     7, 10, 13,  6, 11, 11, 10,  4,  7, 11, 13,  6,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     7,  7,  7,  7,  7,  7,  4,  7,  4,  4,  4,  4,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4,
     5, 10, 10, 10, 10, 11,  7, 11,  5, 10, 10,  0, 10, 17,  7, 11,
     5, 10, 10, 11, 10, 11,  7, 11,  5,  4, 10, 11, 10,  0,  7, 11,
     5, 10, 10, 19, 10, 11,  7, 11,  5,  4, 10,  4, 10,  0,  7, 11,
     5, 10, 10,  4, 10, 11,  7, 11,  5,  6, 10,  4, 10,  0,  7, 11,
];

const PREFIXES: [u8; 4] = [0xCB, 0xDD, 0xED, 0xFD];

/// Cost when the condition holds, for opcodes with two timings.
fn taken_cost(op: u8) -> Option<u32> {
    match op {
        0x10 | 0x20 | 0x28 | 0x30 | 0x38 => Some(if op == 0x10 { 13 } else { 12 }),
        0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => Some(11),
        0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => Some(17),
        0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => Some(10),
        _ => None,
    }
}

/// Flag byte making the opcode's condition hold (`true`) or fail.
fn flags_for(op: u8, hold: bool) -> u8 {
    let cc = if op < 0x40 { (op >> 3) & 3 } else { (op >> 3) & 7 };
    // Even codes (NZ NC PO P) hold with a clear flag byte
    if (cc % 2 == 0) == hold { 0x00 } else { 0xFF }
}

fn run(bytes: &[u8], setup: impl FnOnce(&mut Registers)) -> u32 {
    let mut mem = Memory::new();
    let mut cpu = OxidZ80::new();
    cpu.reset();
    cpu.load_program(&mut mem, bytes, 0x0000);
    setup(cpu.registers_mut());
    cpu.step(&mut mem)
}

#[test]
fn base_opcodes() {
    for op in 0..=255u8 {
        if PREFIXES.contains(&op) {
            continue;
        }
        let expected = BASE_TIMINGS[op as usize];
        match taken_cost(op) {
            Some(taken) if op == 0x10 => {
                assert_eq!(run(&[op, 0], |r| r.bc.set_high(1)), expected, "DJNZ exit");
                assert_eq!(run(&[op, 0], |_| {}), taken, "DJNZ loop");
            }
            Some(taken) => {
                let miss = flags_for(op, false);
                let hit = flags_for(op, true);
                assert_eq!(run(&[op, 0, 0], |r| r.set_flags_byte(miss)), expected, "{op:02X} not taken");
                assert_eq!(run(&[op, 0, 0], |r| r.set_flags_byte(hit)), taken, "{op:02X} taken");
            }
            None => assert_eq!(run(&[op, 0, 0], |_| {}), expected, "opcode {op:02X}"),
        }
    }
}

#[test]
fn cb_opcodes() {
    for op in 0..=255u8 {
        let expected = match (op, op & 7) {
            (0x40..=0x7F, 6) => 12,
            (_, 6) => 15,
            _ => 8,
        };
        assert_eq!(run(&[0xCB, op], |_| {}), expected, "CB {op:02X}");
    }
}

fn ed_timing(op: u8) -> u32 {
    match op {
        0x40..=0x7F => match op & 7 {
            0 | 1 => 12,
            2 => 15,
            3 => 20,
            4 | 6 => 8,
            5 => 14,
            _ => match op {
                0x47 | 0x4F | 0x57 | 0x5F => 9,
                0x67 | 0x6F => 18,
                _ => 8,
            },
        },
        0xA0..=0xA3 | 0xA8..=0xAB | 0xB0..=0xB3 | 0xB8..=0xBB => 16,
        _ => 8,
    }
}

#[test]
fn ed_opcodes() {
    for op in 0..=255u8 {
        let expected = ed_timing(op);
        let repeating = matches!(op, 0xB0..=0xB3 | 0xB8..=0xBB);
        if repeating {
            // Counter starts at zero and wraps, so the loop goes round
            assert_eq!(run(&[0xED, op], |_| {}), 21, "ED {op:02X} repeat");
            let last = if op & 3 >= 2 { 0x0100 } else { 0x0001 };
            assert_eq!(run(&[0xED, op], |r| r.bc.set_word(last)), expected, "ED {op:02X} final");
        } else {
            assert_eq!(run(&[0xED, op, 0, 0], |_| {}), expected, "ED {op:02X}");
        }
    }
}

fn indexed_timing(op: u8) -> u32 {
    match op {
        0x34 | 0x35 => 23,
        0x36 => 19,
        0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x7E => 19,
        0x70..=0x75 | 0x77 => 19,
        0x80..=0xBF if op & 7 == 6 => 19,
        _ => BASE_TIMINGS[op as usize] + 4,
    }
}

#[test]
fn index_opcodes() {
    for prefix in [0xDDu8, 0xFD] {
        for op in 0..=255u8 {
            if PREFIXES.contains(&op) {
                continue;
            }
            let expected = indexed_timing(op);
            let program = [prefix, op, 0, 0];
            let cost = match taken_cost(op) {
                Some(_) if op == 0x10 => run(&program, |r| r.bc.set_high(1)),
                Some(_) => {
                    let miss = flags_for(op, false);
                    run(&program, |r| r.set_flags_byte(miss))
                }
                None => run(&program, |_| {}),
            };
            assert_eq!(cost, expected, "{prefix:02X} {op:02X}");
        }
    }
}

#[test]
fn index_conditionals_taken() {
    assert_eq!(run(&[0xDD, 0x20, 0x00], |_| {}), 16);
    assert_eq!(run(&[0xFD, 0xC4, 0x00, 0x00], |_| {}), 21);
    assert_eq!(run(&[0xDD, 0xC0], |_| {}), 15);
}

#[test]
fn displaced_cb_opcodes() {
    for prefix in [0xDDu8, 0xFD] {
        for op in 0..=255u8 {
            let expected = if (0x40..=0x7F).contains(&op) { 20 } else { 23 };
            assert_eq!(run(&[prefix, 0xCB, 0x05, op], |_| {}), expected, "{prefix:02X} CB {op:02X}");
        }
    }
}

#[test]
fn chained_prefixes_cost_a_nop() {
    for first in [0xDDu8, 0xFD] {
        for second in [0xDDu8, 0xED, 0xFD] {
            assert_eq!(run(&[first, second, 0x00], |_| {}), 4, "{first:02X} {second:02X}");
        }
    }
}
