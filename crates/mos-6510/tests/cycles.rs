//! Cycle-count checks for every addressing mode, including the penalty
//! and no-penalty cases the hardware defines.

use emu64_core::{Cpu, SimpleBus};
use mos_6510::Mos6510;

/// Run one instruction, counting cycles.
fn time_instruction(cpu: &mut Mos6510, bus: &mut SimpleBus) -> u32 {
    cpu.tick(bus);
    let mut cycles = 1;
    for _ in 0..20 {
        if cpu.is_instruction_complete() {
            return cycles;
        }
        cpu.tick(bus);
        cycles += 1;
    }
    panic!("instruction did not complete");
}

struct Case {
    name: &'static str,
    program: &'static [u8],
    x: u8,
    y: u8,
    cycles: u32,
}

const CASES: &[Case] = &[
    // Implied / accumulator / immediate
    Case { name: "NOP", program: &[0xEA], x: 0, y: 0, cycles: 2 },
    Case { name: "ASL A", program: &[0x0A], x: 0, y: 0, cycles: 2 },
    Case { name: "LDA #", program: &[0xA9, 0x01], x: 0, y: 0, cycles: 2 },
    // Zero page
    Case { name: "LDA zp", program: &[0xA5, 0x10], x: 0, y: 0, cycles: 3 },
    Case { name: "STA zp", program: &[0x85, 0x10], x: 0, y: 0, cycles: 3 },
    Case { name: "INC zp", program: &[0xE6, 0x10], x: 0, y: 0, cycles: 5 },
    // Zero page indexed
    Case { name: "LDA zp,X", program: &[0xB5, 0x10], x: 5, y: 0, cycles: 4 },
    Case { name: "LDX zp,Y", program: &[0xB6, 0x10], x: 0, y: 5, cycles: 4 },
    Case { name: "STA zp,X", program: &[0x95, 0x10], x: 5, y: 0, cycles: 4 },
    Case { name: "ASL zp,X", program: &[0x16, 0x10], x: 5, y: 0, cycles: 6 },
    // Absolute
    Case { name: "LDA abs", program: &[0xAD, 0x00, 0x40], x: 0, y: 0, cycles: 4 },
    Case { name: "STA abs", program: &[0x8D, 0x00, 0x40], x: 0, y: 0, cycles: 4 },
    Case { name: "DEC abs", program: &[0xCE, 0x00, 0x40], x: 0, y: 0, cycles: 6 },
    // Absolute indexed, no page cross
    Case { name: "LDA abs,X", program: &[0xBD, 0x00, 0x40], x: 5, y: 0, cycles: 4 },
    Case { name: "LDA abs,Y", program: &[0xB9, 0x00, 0x40], x: 0, y: 5, cycles: 4 },
    // Absolute indexed, page cross adds one
    Case { name: "LDA abs,X cross", program: &[0xBD, 0xFF, 0x40], x: 2, y: 0, cycles: 5 },
    Case { name: "LDA abs,Y cross", program: &[0xB9, 0xFF, 0x40], x: 0, y: 2, cycles: 5 },
    // Stores and RMW never save the fix cycle
    Case { name: "STA abs,X", program: &[0x9D, 0x00, 0x40], x: 5, y: 0, cycles: 5 },
    Case { name: "STA abs,Y", program: &[0x99, 0x00, 0x40], x: 0, y: 5, cycles: 5 },
    Case { name: "INC abs,X", program: &[0xFE, 0x00, 0x40], x: 5, y: 0, cycles: 7 },
    Case { name: "INC abs,X cross", program: &[0xFE, 0xFF, 0x40], x: 2, y: 0, cycles: 7 },
    Case { name: "ROR abs,X", program: &[0x7E, 0x00, 0x40], x: 0, y: 0, cycles: 7 },
    // Indirect
    Case { name: "LDA (zp,X)", program: &[0xA1, 0x20], x: 4, y: 0, cycles: 6 },
    Case { name: "STA (zp,X)", program: &[0x81, 0x20], x: 4, y: 0, cycles: 6 },
    Case { name: "LDA (zp),Y", program: &[0xB1, 0x20], x: 0, y: 4, cycles: 5 },
    Case { name: "STA (zp),Y", program: &[0x91, 0x20], x: 0, y: 4, cycles: 6 },
    // Jumps and stack
    Case { name: "JMP abs", program: &[0x4C, 0x00, 0x40], x: 0, y: 0, cycles: 3 },
    Case { name: "JMP (ind)", program: &[0x6C, 0x00, 0x40], x: 0, y: 0, cycles: 5 },
    Case { name: "JSR", program: &[0x20, 0x00, 0x40], x: 0, y: 0, cycles: 6 },
    Case { name: "PHA", program: &[0x48], x: 0, y: 0, cycles: 3 },
    Case { name: "PHP", program: &[0x08], x: 0, y: 0, cycles: 3 },
    Case { name: "PLA", program: &[0x68], x: 0, y: 0, cycles: 4 },
    Case { name: "PLP", program: &[0x28], x: 0, y: 0, cycles: 4 },
];

#[test]
fn documented_cycle_counts() {
    for case in CASES {
        let mut bus = SimpleBus::new();
        let mut cpu = Mos6510::new();

        bus.load(0x0200, case.program);
        cpu.regs.pc = 0x0200;
        cpu.regs.x = case.x;
        cpu.regs.y = case.y;

        let cycles = time_instruction(&mut cpu, &mut bus);
        assert_eq!(cycles, case.cycles, "{}", case.name);
    }
}

#[test]
fn indirect_indexed_page_cross_penalty_from_low_byte_carry() {
    // Pointer -> $40FF; Y=2 carries out of the low byte: 6 cycles.
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();

    bus.poke(0x0020, 0xFF);
    bus.poke(0x0021, 0x40);
    bus.load(0x0200, &[0xB1, 0x20]);
    cpu.regs.pc = 0x0200;
    cpu.regs.y = 0x02;

    assert_eq!(time_instruction(&mut cpu, &mut bus), 6);

    // Pointer -> $4000; Y=2 stays in the page: 5 cycles.
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();

    bus.poke(0x0020, 0x00);
    bus.poke(0x0021, 0x40);
    bus.load(0x0200, &[0xB1, 0x20]);
    cpu.regs.pc = 0x0200;
    cpu.regs.y = 0x02;

    assert_eq!(time_instruction(&mut cpu, &mut bus), 5);
}

#[test]
fn rts_rti_brk_counts() {
    // RTS: 6 cycles.
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();
    bus.load(0x0200, &[0x60]);
    cpu.regs.pc = 0x0200;
    cpu.regs.s = 0xFD;
    assert_eq!(time_instruction(&mut cpu, &mut bus), 6);

    // RTI: 6 cycles.
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();
    bus.load(0x0200, &[0x40]);
    cpu.regs.pc = 0x0200;
    cpu.regs.s = 0xFC;
    assert_eq!(time_instruction(&mut cpu, &mut bus), 6);

    // BRK: 7 cycles.
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();
    bus.load(0x0200, &[0x00]);
    bus.poke(0xFFFE, 0x00);
    bus.poke(0xFFFF, 0x03);
    cpu.regs.pc = 0x0200;
    assert_eq!(time_instruction(&mut cpu, &mut bus), 7);
}
