//! IRQ, NMI and reset sequencing.

use emu64_core::{Cpu, SimpleBus, StepResult};
use mos_6510::{Mos6510, Status, flag};

fn run_instruction(cpu: &mut Mos6510, bus: &mut SimpleBus) -> u32 {
    cpu.tick(bus);
    let mut cycles = 1;
    for _ in 0..20 {
        if cpu.is_instruction_complete() {
            return cycles;
        }
        cpu.tick(bus);
        cycles += 1;
    }
    panic!("sequence did not complete");
}

fn setup(bus: &mut SimpleBus, cpu: &mut Mos6510) {
    // IRQ/BRK vector -> $0300, NMI vector -> $0500.
    bus.poke(0xFFFE, 0x00);
    bus.poke(0xFFFF, 0x03);
    bus.poke(0xFFFA, 0x00);
    bus.poke(0xFFFB, 0x05);

    bus.load(0x0200, &[0xEA, 0xEA, 0xEA]); // NOP sled
    cpu.regs.pc = 0x0200;
    cpu.regs.s = 0xFF;
}

#[test]
fn irq_taken_when_unmasked() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();
    setup(&mut bus, &mut cpu);
    cpu.regs.p.clear(flag::I);

    assert!(cpu.interrupt(), "IRQ accepted with I clear");

    // The sequence replaces the next fetch and takes 7 cycles.
    assert_eq!(run_instruction(&mut cpu, &mut bus), 7);
    assert_eq!(cpu.regs.pc, 0x0300);
    assert!(cpu.regs.p.is_set(flag::I), "I set on entry");

    // Pushed status has B clear, U set.
    let pushed = bus.peek(0x01FD);
    assert_eq!(pushed & flag::B, 0, "IRQ pushes with B clear");
    assert_ne!(pushed & flag::U, 0);

    // Return address is the interrupted instruction.
    assert_eq!(bus.peek(0x01FF), 0x02);
    assert_eq!(bus.peek(0x01FE), 0x00);
}

#[test]
fn irq_ignored_when_masked() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();
    setup(&mut bus, &mut cpu);
    cpu.regs.p.set(flag::I);

    assert!(!cpu.interrupt(), "IRQ refused while I is set");

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0201, "plain NOP executed");
}

#[test]
fn irq_waits_for_instruction_boundary() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();
    setup(&mut bus, &mut cpu);
    cpu.regs.p.clear(flag::I);

    // Start a NOP, then raise the IRQ mid-instruction.
    cpu.tick(&mut bus);
    assert!(cpu.interrupt());
    cpu.tick(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0201, "NOP finished first");

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0300, "IRQ serviced at the boundary");
}

#[test]
fn nmi_not_maskable_and_edge_triggered() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();
    setup(&mut bus, &mut cpu);
    cpu.regs.p.set(flag::I);

    cpu.nmi();
    assert_eq!(run_instruction(&mut cpu, &mut bus), 7);
    assert_eq!(cpu.regs.pc, 0x0500, "NMI taken despite I set");

    // The edge was consumed: execution continues normally. NOPs live at
    // $0500 too ($00 would be BRK, so put some there).
    bus.load(0x0500, &[0xEA, 0xEA]);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0501);
}

#[test]
fn nmi_wins_over_pending_irq() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();
    setup(&mut bus, &mut cpu);
    cpu.regs.p.clear(flag::I);

    assert!(cpu.interrupt());
    cpu.nmi();

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0500, "NMI vector taken first");
}

#[test]
fn rti_returns_from_interrupt() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();
    setup(&mut bus, &mut cpu);
    bus.load(0x0300, &[0x40]); // RTI
    cpu.regs.p.clear(flag::I);

    assert!(cpu.interrupt());
    run_instruction(&mut cpu, &mut bus); // interrupt sequence
    run_instruction(&mut cpu, &mut bus); // RTI

    assert_eq!(cpu.regs.pc, 0x0200, "back at the interrupted instruction");
    assert_eq!(cpu.regs.s, 0xFF, "stack balanced");
    assert!(!cpu.regs.p.is_set(flag::I), "I restored from the stack");
}

#[test]
fn reset_state() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();

    bus.load(0x0200, &[0xA9, 0x42]);
    cpu.regs.pc = 0x0200;
    run_instruction(&mut cpu, &mut bus);

    cpu.reset();
    assert_eq!(cpu.regs.s, 0xFF);
    assert_eq!(cpu.regs.a, 0);
    assert_eq!(cpu.regs.p, Status::from_pulled(0x00), "P is B|U at reset");
    assert!(cpu.is_instruction_complete());
    assert!(!cpu.is_halted());
}

#[test]
fn reset_clears_halt() {
    let mut bus = SimpleBus::new();
    let mut cpu = Mos6510::new();

    bus.load(0x0200, &[0x02]);
    cpu.regs.pc = 0x0200;
    assert_eq!(cpu.step_cycle(&mut bus), StepResult::Halted);

    cpu.reset();
    bus.poke(0x0000, 0xEA);
    assert_eq!(cpu.step_cycle(&mut bus), StepResult::Ok);
}
