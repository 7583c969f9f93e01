//! 6510 execution core.
//!
//! Cycle-accurate interpretation: each `tick()` performs exactly one bus
//! access. The in-flight instruction is tracked as (mnemonic, addressing
//! mode, cycle index); a match on (stage, cycle) carries out the work, so
//! no per-cycle allocation happens. The address and data buses are
//! latched on every access and can be inspected between cycles.

use emu64_core::{Bus, Cpu, Observable, StepResult, Value};

use crate::flags::{C, D, I, N, V, Z};
use crate::opcodes::{AddrMode, Mnemonic, decode};
use crate::{Registers, Status};

/// Execution state between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// The next cycle fetches an opcode (or services a pending interrupt).
    Fetch,
    /// An instruction is in flight.
    Run,
    /// An IRQ/NMI sequence is in flight.
    Interrupt,
    /// The CPU fetched an unknown opcode and stopped.
    Halted,
}

/// Where a memory-form instruction is within its cycle schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Single-cycle register/flag work (implied and accumulator forms).
    Implied,
    /// Resolving the effective address.
    Operand,
    /// Page-fix cycle: dummy read at the unfixed address.
    Fix,
    /// Final data read or write.
    Access,
    /// RMW: read the original value.
    RmwRead,
    /// RMW: dummy write of the original value while the ALU works.
    RmwModify,
    /// RMW: write the modified value.
    RmwWrite,
}

/// Bus behaviour of a memory-form instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Store,
    Rmw,
}

/// Bus behaviour of a mnemonic in its memory forms.
const fn access_of(mnemonic: Mnemonic) -> Access {
    use Mnemonic::{Asl, Dec, Inc, Lsr, Rol, Ror, Sta, Stx, Sty};
    match mnemonic {
        Sta | Stx | Sty => Access::Store,
        Asl | Lsr | Rol | Ror | Inc | Dec => Access::Rmw,
        _ => Access::Read,
    }
}

/// The MOS 6510 CPU.
///
/// Registers are public for test setup and inspection; everything else is
/// internal sequencing state.
#[derive(Debug)]
pub struct Mos6510 {
    /// CPU registers.
    pub regs: Registers,

    state: State,

    /// Opcode byte of the in-flight instruction.
    opcode: u8,
    mnemonic: Mnemonic,
    mode: AddrMode,
    /// Cycle within the instruction (0 = opcode fetch).
    cycle: u8,
    stage: Stage,

    /// Latched address bus: the address of the most recent bus access.
    ab: u16,
    /// Latched data bus: the byte of the most recent bus access.
    db: u8,
    /// Effective address under construction.
    base: u16,
    /// Zero-page pointer / scratch byte for indirect modes and branches.
    ptr: u8,
    /// The last index addition carried out of the low address byte.
    crossed: bool,
    /// Vector being serviced by the in-flight interrupt sequence.
    vector: u16,

    /// NMI edge latch.
    nmi_pending: bool,
    /// IRQ request latch, set only while I is clear.
    irq_pending: bool,

    total_cycles: u64,
}

impl Default for Mos6510 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos6510 {
    /// Create a new 6510 in reset state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            state: State::Fetch,
            opcode: 0,
            mnemonic: Mnemonic::Nop,
            mode: AddrMode::Implied,
            cycle: 0,
            stage: Stage::Implied,
            ab: 0,
            db: 0,
            base: 0,
            ptr: 0,
            crossed: false,
            vector: 0,
            nmi_pending: false,
            irq_pending: false,
            total_cycles: 0,
        }
    }

    /// True when the previous instruction has fully retired and the next
    /// cycle will fetch an opcode.
    #[must_use]
    pub fn is_instruction_complete(&self) -> bool {
        self.state == State::Fetch
    }

    /// True once an unknown opcode has stopped the CPU. Only a reset
    /// clears this.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    /// Latched address bus (address of the most recent access).
    #[must_use]
    pub fn ab(&self) -> u16 {
        self.ab
    }

    /// Latched data bus (byte of the most recent access).
    #[must_use]
    pub fn db(&self) -> u8 {
        self.db
    }

    /// Total cycles executed since construction or reset.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Advance one machine cycle. Same as [`Cpu::tick`], under the name
    /// the stepping surface documents.
    pub fn step_cycle<B: Bus>(&mut self, bus: &mut B) -> StepResult {
        self.execute_cycle(bus)
    }

    /// Run cycles until the instruction (or injected interrupt sequence)
    /// retires and the CPU is back at a fetch boundary.
    pub fn step_instruction<B: Bus>(&mut self, bus: &mut B) -> StepResult {
        if self.execute_cycle(bus) == StepResult::Halted {
            return StepResult::Halted;
        }
        while !self.is_instruction_complete() {
            if self.execute_cycle(bus) == StepResult::Halted {
                return StepResult::Halted;
            }
        }
        StepResult::Ok
    }

    // ------------------------------------------------------------------
    // Bus latches
    // ------------------------------------------------------------------

    fn load<B: Bus>(&mut self, bus: &mut B, address: u16) -> u8 {
        self.ab = address;
        self.db = bus.read(address);
        self.db
    }

    fn store<B: Bus>(&mut self, bus: &mut B, address: u16, value: u8) {
        self.ab = address;
        self.db = value;
        bus.write(address, value);
    }

    // ------------------------------------------------------------------
    // Cycle sequencing
    // ------------------------------------------------------------------

    fn execute_cycle<B: Bus>(&mut self, bus: &mut B) -> StepResult {
        if self.state == State::Halted {
            return StepResult::Halted;
        }
        self.total_cycles += 1;

        match self.state {
            State::Fetch => self.fetch_or_interrupt(bus),
            State::Run => {
                self.run_cycle(bus);
                if self.state == State::Run {
                    self.cycle += 1;
                }
            }
            State::Interrupt => {
                self.interrupt_cycle(bus);
                if self.state == State::Interrupt {
                    self.cycle += 1;
                }
            }
            State::Halted => unreachable!(),
        }

        if self.state == State::Halted {
            StepResult::Halted
        } else {
            StepResult::Ok
        }
    }

    /// Fetch boundary: service a pending interrupt or fetch and decode.
    ///
    /// Interrupt lines are sampled only here, so a request raised mid
    /// instruction takes effect at the start of the next one. NMI wins
    /// over IRQ and is consumed edge-wise.
    fn fetch_or_interrupt<B: Bus>(&mut self, bus: &mut B) {
        if self.nmi_pending {
            self.nmi_pending = false;
            self.begin_interrupt(bus, 0xFFFA);
            return;
        }
        if self.irq_pending && !self.regs.p.is_set(I) {
            self.irq_pending = false;
            self.begin_interrupt(bus, 0xFFFE);
            return;
        }

        self.opcode = self.load(bus, self.regs.pc);
        match decode(self.opcode) {
            Some((mnemonic, mode)) => {
                self.regs.pc = self.regs.pc.wrapping_add(1);
                self.mnemonic = mnemonic;
                self.mode = mode;
                self.cycle = 1;
                self.crossed = false;
                self.stage = match mode {
                    AddrMode::Implied | AddrMode::Accumulator => Stage::Implied,
                    AddrMode::Immediate => Stage::Access,
                    _ => Stage::Operand,
                };
                self.state = State::Run;
            }
            None => {
                log::error!(
                    "unknown opcode ${:02X} at ${:04X}; halting",
                    self.opcode,
                    self.regs.pc
                );
                self.state = State::Halted;
            }
        }
    }

    /// First cycle of the 7-cycle IRQ/NMI sequence (dummy opcode read).
    fn begin_interrupt<B: Bus>(&mut self, bus: &mut B, vector: u16) {
        self.vector = vector;
        self.state = State::Interrupt;
        let _ = self.load(bus, self.regs.pc);
        self.cycle = 2;
    }

    /// Cycles 2-7 of the IRQ/NMI sequence. Same push discipline as BRK
    /// but with B clear on the pushed status, and the PC not advanced.
    fn interrupt_cycle<B: Bus>(&mut self, bus: &mut B) {
        match self.cycle {
            2 => {
                let _ = self.load(bus, self.regs.pc);
            }
            3 => {
                let addr = self.regs.push();
                self.store(bus, addr, (self.regs.pc >> 8) as u8);
            }
            4 => {
                let addr = self.regs.push();
                self.store(bus, addr, self.regs.pc as u8);
            }
            5 => {
                let addr = self.regs.push();
                let pushed = self.regs.p.to_pushed_irq();
                self.store(bus, addr, pushed);
            }
            6 => {
                self.ptr = self.load(bus, self.vector);
            }
            7 => {
                let hi = self.load(bus, self.vector.wrapping_add(1));
                self.regs.pc = u16::from(self.ptr) | (u16::from(hi) << 8);
                self.regs.p.set(I);
                self.finish();
            }
            _ => unreachable!(),
        }
    }

    fn run_cycle<B: Bus>(&mut self, bus: &mut B) {
        use Mnemonic::{Bcc, Bcs, Beq, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Jmp, Jsr, Pha, Php, Pla, Plp, Rti, Rts};
        match self.mnemonic {
            Brk => self.seq_brk(bus),
            Jmp => {
                if self.mode == AddrMode::Indirect {
                    self.seq_jmp_indirect(bus);
                } else {
                    self.seq_jmp_absolute(bus);
                }
            }
            Jsr => self.seq_jsr(bus),
            Rts => self.seq_rts(bus),
            Rti => self.seq_rti(bus),
            Pha | Php => self.seq_push(bus),
            Pla | Plp => self.seq_pull(bus),
            Bcc | Bcs | Bne | Beq | Bpl | Bmi | Bvc | Bvs => self.seq_branch(bus),
            _ => self.step_memory(bus),
        }
    }

    /// Retire the instruction and clear scratch state so nothing leaks
    /// into the next one (a stale `base` must never become a vector).
    fn finish(&mut self) {
        self.state = State::Fetch;
        self.cycle = 0;
        self.stage = Stage::Implied;
        self.base = 0;
        self.ptr = 0;
        self.crossed = false;
    }

    // ------------------------------------------------------------------
    // Memory-form instructions (read / store / RMW over all modes)
    // ------------------------------------------------------------------

    fn step_memory<B: Bus>(&mut self, bus: &mut B) {
        match self.stage {
            Stage::Implied => {
                let _ = self.load(bus, self.regs.pc);
                self.apply_implied();
                self.finish();
            }
            Stage::Operand => self.step_operand(bus),
            Stage::Fix => {
                // Dummy read at the unfixed address; the high byte is
                // corrected afterwards if the index carried.
                let _ = self.load(bus, self.base);
                if self.crossed {
                    self.base = self.base.wrapping_add(0x100);
                }
                self.operand_ready();
            }
            Stage::Access => {
                if access_of(self.mnemonic) == Access::Store {
                    let value = self.store_value();
                    self.store(bus, self.base, value);
                } else {
                    let addr = if self.mode == AddrMode::Immediate {
                        self.regs.pc
                    } else {
                        self.base
                    };
                    let value = self.load(bus, addr);
                    if self.mode == AddrMode::Immediate {
                        self.regs.pc = self.regs.pc.wrapping_add(1);
                    }
                    self.apply_value(value);
                }
                self.finish();
            }
            Stage::RmwRead => {
                let _ = self.load(bus, self.base);
                self.stage = Stage::RmwModify;
            }
            Stage::RmwModify => {
                // Hardware writes the unmodified value back while the ALU
                // computes the result.
                let original = self.db;
                self.store(bus, self.base, original);
                self.db = self.apply_rmw(original);
                self.stage = Stage::RmwWrite;
            }
            Stage::RmwWrite => {
                let value = self.db;
                self.store(bus, self.base, value);
                self.finish();
            }
        }
    }

    fn step_operand<B: Bus>(&mut self, bus: &mut B) {
        use AddrMode::{
            Absolute, AbsoluteX, AbsoluteY, IndexedIndirect, IndirectIndexed, ZeroPage, ZeroPageX,
            ZeroPageY,
        };
        match (self.mode, self.cycle) {
            (ZeroPage, 1) => {
                self.base = u16::from(self.load(bus, self.regs.pc));
                self.regs.pc = self.regs.pc.wrapping_add(1);
                self.operand_ready();
            }

            (ZeroPageX | ZeroPageY | IndexedIndirect | IndirectIndexed, 1) => {
                self.ptr = self.load(bus, self.regs.pc);
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            (ZeroPageX, 2) => {
                let _ = self.load(bus, u16::from(self.ptr));
                self.base = u16::from(self.ptr.wrapping_add(self.regs.x));
                self.operand_ready();
            }
            (ZeroPageY, 2) => {
                let _ = self.load(bus, u16::from(self.ptr));
                self.base = u16::from(self.ptr.wrapping_add(self.regs.y));
                self.operand_ready();
            }

            (Absolute | AbsoluteX | AbsoluteY, 1) => {
                self.base = u16::from(self.load(bus, self.regs.pc));
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            (Absolute, 2) => {
                self.base |= u16::from(self.load(bus, self.regs.pc)) << 8;
                self.regs.pc = self.regs.pc.wrapping_add(1);
                self.operand_ready();
            }
            (AbsoluteX, 2) => self.index_high_byte(bus, self.regs.x),
            (AbsoluteY, 2) => self.index_high_byte(bus, self.regs.y),

            (IndexedIndirect, 2) => {
                let _ = self.load(bus, u16::from(self.ptr));
                self.ptr = self.ptr.wrapping_add(self.regs.x);
            }
            (IndexedIndirect, 3) => {
                self.base = u16::from(self.load(bus, u16::from(self.ptr)));
            }
            (IndexedIndirect, 4) => {
                // Pointer high byte wraps within the zero page.
                let hi = self.load(bus, u16::from(self.ptr.wrapping_add(1)));
                self.base |= u16::from(hi) << 8;
                self.operand_ready();
            }

            (IndirectIndexed, 2) => {
                self.base = u16::from(self.load(bus, u16::from(self.ptr)));
            }
            (IndirectIndexed, 3) => {
                let hi = self.load(bus, u16::from(self.ptr.wrapping_add(1)));
                let lo = (self.base as u8).wrapping_add(self.regs.y);
                self.crossed = lo < self.regs.y;
                self.base = u16::from(lo) | (u16::from(hi) << 8);
                self.finish_indexing();
            }

            _ => unreachable!(),
        }
    }

    /// Read the high address byte and add the index to the low byte.
    /// The penalty decision comes from the carry of that addition alone.
    fn index_high_byte<B: Bus>(&mut self, bus: &mut B, index: u8) {
        let hi = self.load(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        let lo = (self.base as u8).wrapping_add(index);
        self.crossed = lo < index;
        self.base = u16::from(lo) | (u16::from(hi) << 8);
        self.finish_indexing();
    }

    /// Reads skip the fix cycle unless the page crossed; stores and RMW
    /// always take it.
    fn finish_indexing(&mut self) {
        if self.crossed || access_of(self.mnemonic) != Access::Read {
            self.stage = Stage::Fix;
        } else {
            self.operand_ready();
        }
    }

    fn operand_ready(&mut self) {
        self.stage = if access_of(self.mnemonic) == Access::Rmw {
            Stage::RmwRead
        } else {
            Stage::Access
        };
    }

    // ------------------------------------------------------------------
    // Control flow and stack sequences
    // ------------------------------------------------------------------

    fn seq_brk<B: Bus>(&mut self, bus: &mut B) {
        match self.cycle {
            1 => {
                // Padding byte: read and skipped.
                let _ = self.load(bus, self.regs.pc);
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            2 => {
                let addr = self.regs.push();
                self.store(bus, addr, (self.regs.pc >> 8) as u8);
            }
            3 => {
                let addr = self.regs.push();
                self.store(bus, addr, self.regs.pc as u8);
            }
            4 => {
                let addr = self.regs.push();
                let pushed = self.regs.p.to_pushed_brk();
                self.store(bus, addr, pushed);
            }
            5 => {
                self.ptr = self.load(bus, 0xFFFE);
            }
            6 => {
                let hi = self.load(bus, 0xFFFF);
                self.regs.pc = u16::from(self.ptr) | (u16::from(hi) << 8);
                self.regs.p.set(I);
                self.finish();
            }
            _ => unreachable!(),
        }
    }

    fn seq_jmp_absolute<B: Bus>(&mut self, bus: &mut B) {
        match self.cycle {
            1 => {
                self.base = u16::from(self.load(bus, self.regs.pc));
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            2 => {
                self.base |= u16::from(self.load(bus, self.regs.pc)) << 8;
                self.regs.pc = self.base;
                self.finish();
            }
            _ => unreachable!(),
        }
    }

    fn seq_jmp_indirect<B: Bus>(&mut self, bus: &mut B) {
        match self.cycle {
            1 => {
                self.base = u16::from(self.load(bus, self.regs.pc));
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            2 => {
                self.base |= u16::from(self.load(bus, self.regs.pc)) << 8;
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            3 => {
                self.ptr = self.load(bus, self.base);
            }
            4 => {
                // NMOS bug: the pointer high byte comes from the same
                // page, so $xxFF wraps to $xx00 rather than crossing.
                let hi_addr = (self.base & 0xFF00) | (self.base.wrapping_add(1) & 0x00FF);
                let hi = self.load(bus, hi_addr);
                self.regs.pc = u16::from(self.ptr) | (u16::from(hi) << 8);
                self.finish();
            }
            _ => unreachable!(),
        }
    }

    fn seq_jsr<B: Bus>(&mut self, bus: &mut B) {
        match self.cycle {
            1 => {
                self.base = u16::from(self.load(bus, self.regs.pc));
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            2 => {
                // Internal cycle on the stack.
                let _ = self.load(bus, self.regs.stack_addr());
            }
            3 => {
                let addr = self.regs.push();
                self.store(bus, addr, (self.regs.pc >> 8) as u8);
            }
            4 => {
                let addr = self.regs.push();
                self.store(bus, addr, self.regs.pc as u8);
            }
            5 => {
                self.base |= u16::from(self.load(bus, self.regs.pc)) << 8;
                self.regs.pc = self.base;
                self.finish();
            }
            _ => unreachable!(),
        }
    }

    fn seq_rts<B: Bus>(&mut self, bus: &mut B) {
        match self.cycle {
            1 => {
                let _ = self.load(bus, self.regs.pc);
            }
            2 => {
                let _ = self.load(bus, self.regs.stack_addr());
            }
            3 => {
                let addr = self.regs.pull();
                self.base = u16::from(self.load(bus, addr));
            }
            4 => {
                let addr = self.regs.pull();
                self.base |= u16::from(self.load(bus, addr)) << 8;
            }
            5 => {
                let _ = self.load(bus, self.base);
                self.regs.pc = self.base.wrapping_add(1);
                self.finish();
            }
            _ => unreachable!(),
        }
    }

    fn seq_rti<B: Bus>(&mut self, bus: &mut B) {
        match self.cycle {
            1 => {
                let _ = self.load(bus, self.regs.pc);
            }
            2 => {
                let _ = self.load(bus, self.regs.stack_addr());
            }
            3 => {
                let addr = self.regs.pull();
                let value = self.load(bus, addr);
                self.regs.p = Status::from_pulled(value);
            }
            4 => {
                let addr = self.regs.pull();
                self.base = u16::from(self.load(bus, addr));
            }
            5 => {
                let addr = self.regs.pull();
                self.base |= u16::from(self.load(bus, addr)) << 8;
                self.regs.pc = self.base;
                self.finish();
            }
            _ => unreachable!(),
        }
    }

    fn seq_push<B: Bus>(&mut self, bus: &mut B) {
        match self.cycle {
            1 => {
                let _ = self.load(bus, self.regs.pc);
            }
            2 => {
                let value = if self.mnemonic == Mnemonic::Php {
                    self.regs.p.to_pushed_brk()
                } else {
                    self.regs.a
                };
                let addr = self.regs.push();
                self.store(bus, addr, value);
                self.finish();
            }
            _ => unreachable!(),
        }
    }

    fn seq_pull<B: Bus>(&mut self, bus: &mut B) {
        match self.cycle {
            1 => {
                let _ = self.load(bus, self.regs.pc);
            }
            2 => {
                let _ = self.load(bus, self.regs.stack_addr());
            }
            3 => {
                let addr = self.regs.pull();
                let value = self.load(bus, addr);
                if self.mnemonic == Mnemonic::Plp {
                    self.regs.p = Status::from_pulled(value);
                } else {
                    self.regs.a = value;
                    self.regs.p.update_nz(value);
                }
                self.finish();
            }
            _ => unreachable!(),
        }
    }

    fn seq_branch<B: Bus>(&mut self, bus: &mut B) {
        match self.cycle {
            1 => {
                self.ptr = self.load(bus, self.regs.pc);
                self.regs.pc = self.regs.pc.wrapping_add(1);
                if !self.branch_taken() {
                    self.finish();
                }
            }
            2 => {
                let _ = self.load(bus, self.regs.pc);
                let offset = i16::from(self.ptr as i8);
                let target = self.regs.pc.wrapping_add(offset as u16);
                if (target ^ self.regs.pc) & 0xFF00 != 0 {
                    // Destination page differs from the next instruction's:
                    // one more cycle to fix the high byte.
                    self.base = target;
                } else {
                    self.regs.pc = target;
                    self.finish();
                }
            }
            3 => {
                let _ = self.load(bus, (self.regs.pc & 0xFF00) | (self.base & 0x00FF));
                self.regs.pc = self.base;
                self.finish();
            }
            _ => unreachable!(),
        }
    }

    fn branch_taken(&self) -> bool {
        use Mnemonic::{Bcc, Bcs, Beq, Bmi, Bne, Bpl, Bvc, Bvs};
        match self.mnemonic {
            Bcc => !self.regs.p.is_set(C),
            Bcs => self.regs.p.is_set(C),
            Bne => !self.regs.p.is_set(Z),
            Beq => self.regs.p.is_set(Z),
            Bpl => !self.regs.p.is_set(N),
            Bmi => self.regs.p.is_set(N),
            Bvc => !self.regs.p.is_set(V),
            Bvs => self.regs.p.is_set(V),
            _ => unreachable!(),
        }
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    fn apply_implied(&mut self) {
        use Mnemonic::{
            Asl, Clc, Cld, Cli, Clv, Dex, Dey, Inx, Iny, Lsr, Nop, Rol, Ror, Sec, Sed, Sei, Tax,
            Tay, Tsx, Txa, Txs, Tya,
        };
        match self.mnemonic {
            Clc => self.regs.p.clear(C),
            Sec => self.regs.p.set(C),
            Cli => self.regs.p.clear(I),
            Sei => self.regs.p.set(I),
            Clv => self.regs.p.clear(V),
            Cld => self.regs.p.clear(D),
            Sed => self.regs.p.set(D),

            Tax => {
                self.regs.x = self.regs.a;
                self.regs.p.update_nz(self.regs.x);
            }
            Tay => {
                self.regs.y = self.regs.a;
                self.regs.p.update_nz(self.regs.y);
            }
            Txa => {
                self.regs.a = self.regs.x;
                self.regs.p.update_nz(self.regs.a);
            }
            Tya => {
                self.regs.a = self.regs.y;
                self.regs.p.update_nz(self.regs.a);
            }
            Tsx => {
                self.regs.x = self.regs.s;
                self.regs.p.update_nz(self.regs.x);
            }
            // TXS does not affect flags.
            Txs => self.regs.s = self.regs.x,

            Inx => {
                self.regs.x = self.regs.x.wrapping_add(1);
                self.regs.p.update_nz(self.regs.x);
            }
            Iny => {
                self.regs.y = self.regs.y.wrapping_add(1);
                self.regs.p.update_nz(self.regs.y);
            }
            Dex => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                self.regs.p.update_nz(self.regs.x);
            }
            Dey => {
                self.regs.y = self.regs.y.wrapping_sub(1);
                self.regs.p.update_nz(self.regs.y);
            }

            Asl => {
                let value = self.regs.a;
                self.regs.a = self.alu_asl(value);
            }
            Lsr => {
                let value = self.regs.a;
                self.regs.a = self.alu_lsr(value);
            }
            Rol => {
                let value = self.regs.a;
                self.regs.a = self.alu_rol(value);
            }
            Ror => {
                let value = self.regs.a;
                self.regs.a = self.alu_ror(value);
            }

            Nop => {}

            _ => unreachable!(),
        }
    }

    fn apply_value(&mut self, value: u8) {
        use Mnemonic::{Adc, And, Bit, Cmp, Cpx, Cpy, Eor, Lda, Ldx, Ldy, Ora, Sbc};
        match self.mnemonic {
            Lda => {
                self.regs.a = value;
                self.regs.p.update_nz(value);
            }
            Ldx => {
                self.regs.x = value;
                self.regs.p.update_nz(value);
            }
            Ldy => {
                self.regs.y = value;
                self.regs.p.update_nz(value);
            }
            Ora => {
                self.regs.a |= value;
                self.regs.p.update_nz(self.regs.a);
            }
            And => {
                self.regs.a &= value;
                self.regs.p.update_nz(self.regs.a);
            }
            Eor => {
                self.regs.a ^= value;
                self.regs.p.update_nz(self.regs.a);
            }
            Adc => self.alu_adc(value),
            Sbc => self.alu_sbc(value),
            Cmp => self.compare(self.regs.a, value),
            Cpx => self.compare(self.regs.x, value),
            Cpy => self.compare(self.regs.y, value),
            Bit => {
                self.regs.p.set_if(Z, self.regs.a & value == 0);
                self.regs.p.set_if(N, value & 0x80 != 0);
                self.regs.p.set_if(V, value & 0x40 != 0);
            }
            _ => unreachable!(),
        }
    }

    fn store_value(&self) -> u8 {
        match self.mnemonic {
            Mnemonic::Sta => self.regs.a,
            Mnemonic::Stx => self.regs.x,
            Mnemonic::Sty => self.regs.y,
            _ => unreachable!(),
        }
    }

    fn apply_rmw(&mut self, value: u8) -> u8 {
        use Mnemonic::{Asl, Dec, Inc, Lsr, Rol, Ror};
        match self.mnemonic {
            Asl => self.alu_asl(value),
            Lsr => self.alu_lsr(value),
            Rol => self.alu_rol(value),
            Ror => self.alu_ror(value),
            Inc => {
                let result = value.wrapping_add(1);
                self.regs.p.update_nz(result);
                result
            }
            Dec => {
                let result = value.wrapping_sub(1);
                self.regs.p.update_nz(result);
                result
            }
            _ => unreachable!(),
        }
    }

    fn compare(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.regs.p.set_if(C, register >= value);
        self.regs.p.update_nz(result);
    }

    fn alu_asl(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(C, value & 0x80 != 0);
        let result = value << 1;
        self.regs.p.update_nz(result);
        result
    }

    fn alu_lsr(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(C, value & 0x01 != 0);
        let result = value >> 1;
        self.regs.p.update_nz(result);
        result
    }

    fn alu_rol(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.regs.p.is_set(C));
        self.regs.p.set_if(C, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.regs.p.update_nz(result);
        result
    }

    fn alu_ror(&mut self, value: u8) -> u8 {
        let carry_in = if self.regs.p.is_set(C) { 0x80 } else { 0 };
        self.regs.p.set_if(C, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.regs.p.update_nz(result);
        result
    }

    fn alu_adc(&mut self, value: u8) {
        if self.regs.p.is_set(D) {
            self.adc_decimal(value);
        } else {
            self.adc_binary(value);
        }
    }

    fn adc_binary(&mut self, value: u8) {
        let a = self.regs.a;
        let carry = u16::from(self.regs.p.is_set(C));
        let sum = u16::from(a) + u16::from(value) + carry;
        let result = sum as u8;

        self.regs.p.set_if(C, sum > 0xFF);
        self.regs
            .p
            .set_if(V, (!(a ^ value) & (a ^ result)) & 0x80 != 0);
        self.regs.a = result;
        self.regs.p.update_nz(result);
    }

    fn adc_decimal(&mut self, value: u8) {
        let a = self.regs.a;
        let carry = u8::from(self.regs.p.is_set(C));

        let nibble0 = (a & 0x0F) + (value & 0x0F) + carry;
        let (adjust0, half_carry) = if nibble0 > 9 { (6, 1) } else { (0, 0) };
        let nibble1 = (a >> 4) + (value >> 4) + half_carry;
        let (adjust1, decimal_carry) = if nibble1 > 9 { (6, true) } else { (0, false) };

        // The ALU output is not decimally adjusted; N, Z and V come from
        // it. Only the final accumulator value gets the nibble fixups.
        let alu = ((nibble1 & 0x0F) << 4) | (nibble0 & 0x0F);
        self.regs.p.update_nz(alu);
        self.regs.p.set_if(V, (!(a ^ value) & (a ^ alu)) & 0x80 != 0);
        self.regs.p.set_if(C, decimal_carry);

        self.regs.a = (((nibble1 + adjust1) & 0x0F) << 4) | ((nibble0 + adjust0) & 0x0F);
    }

    fn alu_sbc(&mut self, value: u8) {
        if self.regs.p.is_set(D) {
            self.sbc_decimal(value);
        } else {
            // Binary SBC is ADC of the inverted operand.
            self.adc_binary(!value);
        }
    }

    fn sbc_decimal(&mut self, value: u8) {
        let a = self.regs.a;
        let carry = u8::from(self.regs.p.is_set(C));

        let nibble0 = (a & 0x0F) + (!value & 0x0F) + carry;
        let (adjust0, half_carry) = if nibble0 <= 0x0F { (10u16, 0u8) } else { (0, 1) };
        let nibble1 = (a >> 4) + (!value >> 4) + half_carry;
        let adjust1 = if nibble1 <= 0x0F { 10u16 << 4 } else { 0 };

        // Flags come from the binary difference; only the accumulator is
        // decimally adjusted (NMOS-documented variant).
        let alu16 = u16::from(a) + u16::from(!value) + u16::from(carry);
        let alu = alu16 as u8;
        self.regs.p.update_nz(alu);
        self.regs.p.set_if(C, alu16 > 0xFF);
        self.regs.p.set_if(V, ((a ^ value) & (a ^ alu)) & 0x80 != 0);

        let lo = ((u16::from(alu) + adjust0) & 0x0F) as u8;
        let hi = (((u16::from(alu) + adjust1) >> 4) & 0x0F) as u8;
        self.regs.a = (hi << 4) | lo;
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl Cpu for Mos6510 {
    type Registers = Registers;

    fn tick<B: Bus>(&mut self, bus: &mut B) -> StepResult {
        self.execute_cycle(bus)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    fn interrupt(&mut self) -> bool {
        if self.regs.p.is_set(I) {
            false
        } else {
            self.irq_pending = true;
            true
        }
    }

    fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    fn reset(&mut self) {
        self.regs = Registers::new();
        self.state = State::Fetch;
        self.opcode = 0;
        self.cycle = 0;
        self.stage = Stage::Implied;
        self.ab = 0;
        self.db = 0;
        self.base = 0;
        self.ptr = 0;
        self.crossed = false;
        self.vector = 0;
        self.nmi_pending = false;
        self.irq_pending = false;
        self.total_cycles = 0;
    }
}

impl Observable for Mos6510 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.regs.p.0.into()),
            "ab" => Some(self.ab.into()),
            "db" => Some(self.db.into()),
            "flags.c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" => Some(self.regs.p.is_set(D).into()),
            "flags.v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" => Some(self.regs.p.is_set(N).into()),
            "cycle" => Some(Value::U64(self.total_cycles)),
            "halted" => Some(self.is_halted().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "s", "p", "ab", "db", "flags.c", "flags.z", "flags.i", "flags.d",
            "flags.v", "flags.n", "cycle", "halted",
        ]
    }
}
