//! Executor hooks
//!
//! [`ContendedZ80`] wraps the bus accesses a Z80 core makes so each one is logged with the
//! contention engine as it happens, in the order the real CPU puts it on the bus. The
//! conditional and repeating helpers confirm the optional part of the instruction's
//! script as soon as the condition is known.

use crate::cycles::{CycleTable, cycles};
use crate::engine::{ContentionEngine, CycleKind};
use crate::history::AccessFlags;

// Z80 flags
pub const FLAG_CARRY: u8 = 0b0000_0001;
pub const FLAG_SUBTRACT: u8 = 0b0000_0010;
pub const FLAG_PARITY: u8 = 0b0000_0100;
pub const FLAG_X: u8 = 0b0000_1000;
pub const FLAG_HALF: u8 = 0b0001_0000;
pub const FLAG_Y: u8 = 0b0010_0000;
pub const FLAG_ZERO: u8 = 0b0100_0000;
pub const FLAG_SIGN: u8 = 0b1000_0000;

const MEMORY_READ: AccessFlags = AccessFlags::READ.union(AccessFlags::MEMORY);
const MEMORY_WRITE: AccessFlags = AccessFlags::WRITE.union(AccessFlags::MEMORY);
const PORT_READ: AccessFlags = AccessFlags::READ.union(AccessFlags::IO_PORT);
const PORT_WRITE: AccessFlags = AccessFlags::WRITE.union(AccessFlags::IO_PORT);

/// Memory and IO as seen by the CPU
pub trait Bus {
    fn read_mem(&mut self, addr: u16) -> u8;
    fn write_mem(&mut self, addr: u16, value: u8);
    fn read_io(&mut self, port: u16) -> u8;
    fn write_io(&mut self, port: u16, value: u8);
}

/// The registers the hooks touch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub sp: u16,
    pub pc: u16,
    /// Internal MEMPTR register
    pub wz: u16,
    pub i: u8,
    pub r: u8,
}

impl Registers {
    pub fn b(&self) -> u8 {
        (self.bc >> 8) as u8
    }

    pub fn c(&self) -> u8 {
        self.bc as u8
    }

    pub fn set_b(&mut self, value: u8) {
        self.bc = (self.bc & 0x00FF) | ((value as u16) << 8);
    }

    pub fn l(&self) -> u8 {
        self.hl as u8
    }

    /// The IR pair as it appears on the address bus during refresh
    pub fn ir(&self) -> u16 {
        ((self.i as u16) << 8) | self.r as u16
    }
}

/// Sign, zero and the undocumented bits 3 and 5 of a result
fn flags_sz(value: u8) -> u8 {
    let mut flags = value & (FLAG_SIGN | FLAG_Y | FLAG_X);
    if value == 0 {
        flags |= FLAG_ZERO;
    }
    flags
}

fn flags_parity(value: u8) -> u8 {
    if value.count_ones() % 2 == 0 {
        FLAG_PARITY
    } else {
        0
    }
}

/// A Z80 register file and bus with contention-aware access hooks
pub struct ContendedZ80<B: Bus> {
    pub regs: Registers,
    pub bus: B,
    engine: ContentionEngine,
}

impl<B: Bus> ContendedZ80<B> {
    pub fn new(engine: ContentionEngine, bus: B) -> Self {
        Self {
            regs: Registers::default(),
            bus,
            engine,
        }
    }

    pub fn engine(&self) -> &ContentionEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ContentionEngine {
        &mut self.engine
    }

    /// Call before fetching the first opcode byte of an instruction
    pub fn begin_instruction(&mut self) {
        self.engine.begin_instruction(self.regs.bc, self.regs.ir());
    }

    /// Call once the instruction has completed
    pub fn finish_instruction(&mut self) {
        self.engine.finish_instruction();
    }

    /// Reports the documented cycles of an opcode
    pub fn exec_cycles(&mut self, table: CycleTable, opcode: u8) {
        self.engine.eat_cycles(CycleKind::Exec, cycles(table, opcode));
    }

    /// Cycles spent accepting an interrupt or NMI
    pub fn isr_cycles(&mut self, cycles: u32) {
        self.engine.eat_cycles(CycleKind::Isr, cycles);
    }

    /// M1 fetch of an opcode or prefix byte
    pub fn fetch_opcode(&mut self) -> u8 {
        let pc = self.regs.pc;
        self.regs.pc = pc.wrapping_add(1);
        self.regs.r = (self.regs.r & 0x80) | (self.regs.r.wrapping_add(1) & 0x7F);
        let value = self.bus.read_mem(pc);
        self.engine.record_access(pc, value, MEMORY_READ, "rop");
        value
    }

    /// Reads an operand byte at PC
    pub fn arg(&mut self) -> u8 {
        let pc = self.regs.pc;
        self.regs.pc = pc.wrapping_add(1);
        let value = self.bus.read_mem(pc);
        self.engine.record_access(pc, value, MEMORY_READ, "arg");
        value
    }

    /// Reads a little-endian operand word at PC
    pub fn arg16(&mut self) -> u16 {
        let pc = self.regs.pc;
        self.regs.pc = pc.wrapping_add(2);
        let low = self.bus.read_mem(pc);
        self.engine.record_access(pc, low, MEMORY_READ, "arg16 byte1");
        let high_addr = pc.wrapping_add(1);
        let high = self.bus.read_mem(high_addr);
        self.engine.record_access(high_addr, high, MEMORY_READ, "arg16 byte2");
        u16::from_le_bytes([low, high])
    }

    pub fn rm(&mut self, addr: u16) -> u8 {
        let value = self.bus.read_mem(addr);
        self.engine.record_access(addr, value, MEMORY_READ, "rm");
        value
    }

    /// Writes after the access has been timed so the display sees the old value up to now
    pub fn wm(&mut self, addr: u16, value: u8) {
        self.engine.record_access(addr, value, MEMORY_WRITE, "wm");
        self.bus.write_mem(addr, value);
    }

    /// Reads a port once the counter is up to date (the floating bus depends on it)
    pub fn in_port(&mut self, port: u16) -> u8 {
        // Value unknown until the port has been read
        self.engine.record_access(port, 0xFF, PORT_READ, "in port");
        self.bus.read_io(port)
    }

    pub fn out_port(&mut self, port: u16, value: u8) {
        self.engine.record_access(port, value, PORT_WRITE, "out port");
        self.bus.write_io(port, value);
    }

    /// Pushes high byte first, as the hardware does
    pub fn push(&mut self, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.wm(self.regs.sp, high);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.wm(self.regs.sp, low);
    }

    pub fn pop(&mut self) -> u16 {
        let low = self.rm(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let high = self.rm(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([low, high])
    }

    /// Charges the extra cycles of a taken branch or a repeat and lets the script run its
    /// optional elements
    fn take_optional(&mut self, opcode: u8) {
        self.exec_cycles(CycleTable::Ex, opcode);
        self.engine.confirm_optional();
    }

    pub fn jr(&mut self) {
        let offset = self.arg() as i8;
        self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
        self.regs.wz = self.regs.pc;
    }

    /// JR cc,e and DJNZ e
    pub fn jr_cond(&mut self, condition: bool, opcode: u8) {
        if condition {
            self.take_optional(opcode);
            self.jr();
        } else {
            // The displacement is still read
            self.arg();
        }
    }

    pub fn call(&mut self) {
        let target = self.arg16();
        self.regs.wz = target;
        self.push(self.regs.pc);
        self.regs.pc = target;
    }

    pub fn call_cond(&mut self, condition: bool, opcode: u8) {
        if condition {
            self.take_optional(opcode);
            self.call();
        } else {
            self.regs.wz = self.arg16();
        }
    }

    pub fn ret(&mut self) {
        self.regs.pc = self.pop();
        self.regs.wz = self.regs.pc;
    }

    pub fn ret_cond(&mut self, condition: bool, opcode: u8) {
        if condition {
            self.take_optional(opcode);
            self.ret();
        }
    }

    fn block_transfer(&mut self, step: u16) {
        let value = self.rm(self.regs.hl);
        self.wm(self.regs.de, value);

        let n = self.regs.a.wrapping_add(value);
        let mut flags = self.regs.f & (FLAG_SIGN | FLAG_ZERO | FLAG_CARRY);
        if n & 0x02 != 0 {
            flags |= FLAG_Y;
        }
        if n & 0x08 != 0 {
            flags |= FLAG_X;
        }

        self.regs.hl = self.regs.hl.wrapping_add(step);
        self.regs.de = self.regs.de.wrapping_add(step);
        self.regs.bc = self.regs.bc.wrapping_sub(1);
        if self.regs.bc != 0 {
            flags |= FLAG_PARITY;
        }
        self.regs.f = flags;
    }

    fn block_compare(&mut self, step: u16) {
        let value = self.rm(self.regs.hl);
        let mut result = self.regs.a.wrapping_sub(value);
        self.regs.wz = self.regs.wz.wrapping_add(step);
        self.regs.hl = self.regs.hl.wrapping_add(step);
        self.regs.bc = self.regs.bc.wrapping_sub(1);

        let mut flags = (self.regs.f & FLAG_CARRY)
            | (flags_sz(result) & !(FLAG_Y | FLAG_X))
            | ((self.regs.a ^ value ^ result) & FLAG_HALF)
            | FLAG_SUBTRACT;
        if flags & FLAG_HALF != 0 {
            result = result.wrapping_sub(1);
        }
        if result & 0x02 != 0 {
            flags |= FLAG_Y;
        }
        if result & 0x08 != 0 {
            flags |= FLAG_X;
        }
        if self.regs.bc != 0 {
            flags |= FLAG_PARITY;
        }
        self.regs.f = flags;
    }

    /// Flags shared by the block IO instructions
    fn block_io_flags(&mut self, value: u8, sum: u32) {
        let b = self.regs.b();
        let mut flags = flags_sz(b);
        if value & FLAG_SIGN != 0 {
            flags |= FLAG_SUBTRACT;
        }
        if sum & 0x100 != 0 {
            flags |= FLAG_HALF | FLAG_CARRY;
        }
        flags |= flags_parity((sum & 0x07) as u8 ^ b);
        self.regs.f = flags;
    }

    fn block_in(&mut self, step: u16) {
        let value = self.in_port(self.regs.bc);
        self.regs.wz = self.regs.bc.wrapping_add(step);
        self.regs.set_b(self.regs.b().wrapping_sub(1));
        self.wm(self.regs.hl, value);
        self.regs.hl = self.regs.hl.wrapping_add(step);
        let sum = self.regs.c().wrapping_add(step as u8) as u32 + value as u32;
        self.block_io_flags(value, sum);
    }

    fn block_out(&mut self, step: u16) {
        let value = self.rm(self.regs.hl);
        self.regs.set_b(self.regs.b().wrapping_sub(1));
        self.regs.wz = self.regs.bc.wrapping_add(step);
        self.out_port(self.regs.bc, value);
        self.regs.hl = self.regs.hl.wrapping_add(step);
        let sum = self.regs.l() as u32 + value as u32;
        self.block_io_flags(value, sum);
    }

    /// Rewinds PC onto the ED prefix so the instruction runs again
    fn repeat(&mut self, opcode: u8) {
        self.take_optional(opcode);
        self.regs.pc = self.regs.pc.wrapping_sub(2);
    }

    pub fn ldi(&mut self) {
        self.block_transfer(1);
    }

    pub fn ldd(&mut self) {
        self.block_transfer(0xFFFF);
    }

    pub fn cpi(&mut self) {
        self.block_compare(1);
    }

    pub fn cpd(&mut self) {
        self.block_compare(0xFFFF);
    }

    pub fn ini(&mut self) {
        self.block_in(1);
    }

    pub fn ind(&mut self) {
        self.block_in(0xFFFF);
    }

    pub fn outi(&mut self) {
        self.block_out(1);
    }

    pub fn outd(&mut self) {
        self.block_out(0xFFFF);
    }

    pub fn ldir(&mut self) {
        self.ldi();
        if self.regs.bc != 0 {
            self.repeat(0xB0);
            self.regs.wz = self.regs.pc.wrapping_add(1);
        }
    }

    pub fn cpir(&mut self) {
        self.cpi();
        if self.regs.bc != 0 && self.regs.f & FLAG_ZERO == 0 {
            self.repeat(0xB1);
            self.regs.wz = self.regs.pc.wrapping_add(1);
        }
    }

    pub fn inir(&mut self) {
        self.ini();
        if self.regs.b() != 0 {
            self.repeat(0xB2);
        }
    }

    pub fn otir(&mut self) {
        self.outi();
        if self.regs.b() != 0 {
            self.repeat(0xB3);
        }
    }

    pub fn lddr(&mut self) {
        self.ldd();
        if self.regs.bc != 0 {
            self.repeat(0xB8);
            self.regs.wz = self.regs.pc.wrapping_add(1);
        }
    }

    pub fn cpdr(&mut self) {
        self.cpd();
        if self.regs.bc != 0 && self.regs.f & FLAG_ZERO == 0 {
            self.repeat(0xB9);
            self.regs.wz = self.regs.pc.wrapping_add(1);
        }
    }

    pub fn indr(&mut self) {
        self.ind();
        if self.regs.b() != 0 {
            self.repeat(0xBA);
        }
    }

    pub fn otdr(&mut self) {
        self.outd();
        if self.regs.b() != 0 {
            self.repeat(0xBB);
        }
    }
}

/// Flat 64K RAM with a single value on every port
#[cfg(test)]
pub(crate) struct TestBus {
    pub memory: Vec<u8>,
    pub port_value: u8,
    pub port_writes: Vec<(u16, u8)>,
}

#[cfg(test)]
impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x10000],
            port_value: 0xFF,
            port_writes: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

#[cfg(test)]
impl Bus for TestBus {
    fn read_mem(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write_mem(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    fn read_io(&mut self, _port: u16) -> u8 {
        self.port_value
    }

    fn write_io(&mut self, port: u16, value: u8) {
        self.port_writes.push((port, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentionConfig;

    fn cpu(config: ContentionConfig) -> ContendedZ80<TestBus> {
        let engine = ContentionEngine::new(&config).unwrap();
        let mut cpu = ContendedZ80::new(engine, TestBus::new());
        cpu.regs.pc = 0x8000;
        cpu.regs.sp = 0xFF00;
        cpu
    }

    /// Fetches ED and the block opcode, runs `body` and returns the T-states it took
    fn run_ed(cpu: &mut ContendedZ80<TestBus>, body: fn(&mut ContendedZ80<TestBus>)) -> u32 {
        cpu.begin_instruction();
        cpu.fetch_opcode();
        let opcode = cpu.fetch_opcode();
        cpu.exec_cycles(CycleTable::Ed, opcode);
        body(cpu);
        cpu.finish_instruction();
        cpu.engine().instruction_tstates()
    }

    /// Fetches a primary opcode, runs `body` and returns the T-states it took
    fn run_op(cpu: &mut ContendedZ80<TestBus>, body: fn(&mut ContendedZ80<TestBus>)) -> u32 {
        cpu.begin_instruction();
        let opcode = cpu.fetch_opcode();
        cpu.exec_cycles(CycleTable::Op, opcode);
        body(cpu);
        cpu.finish_instruction();
        cpu.engine().instruction_tstates()
    }

    #[test]
    fn test_registers_helpers() {
        let mut regs = Registers {
            bc: 0x1234,
            hl: 0xABCD,
            i: 0x3F,
            r: 0x05,
            ..Default::default()
        };
        assert_eq!(regs.b(), 0x12);
        assert_eq!(regs.c(), 0x34);
        assert_eq!(regs.l(), 0xCD);
        assert_eq!(regs.ir(), 0x3F05);
        regs.set_b(0x99);
        assert_eq!(regs.bc, 0x9934);
    }

    #[test]
    fn test_flags_helpers() {
        assert_eq!(flags_sz(0), FLAG_ZERO);
        assert_eq!(flags_sz(0x80), FLAG_SIGN);
        assert_eq!(flags_sz(0x28), FLAG_Y | FLAG_X);
        assert_eq!(flags_parity(0x03), FLAG_PARITY);
        assert_eq!(flags_parity(0x01), 0);
    }

    #[test]
    fn test_fetch_opcode_increments_refresh() {
        let mut cpu = cpu(ContentionConfig::spectrum_48k());
        cpu.regs.r = 0xFF;
        cpu.begin_instruction();
        cpu.fetch_opcode();
        cpu.exec_cycles(CycleTable::Op, 0x00);
        cpu.finish_instruction();
        // Bit 7 survives, the low seven bits wrap
        assert_eq!(cpu.regs.r, 0x80);
        assert_eq!(cpu.regs.pc, 0x8001);
    }

    #[test]
    fn test_push_pop_order() {
        let mut cpu = cpu(ContentionConfig::spectrum_48k());
        cpu.bus.load(0x8000, &[0xC5, 0xC1]);
        cpu.regs.bc = 0x1234;

        // PUSH BC
        cpu.begin_instruction();
        cpu.fetch_opcode();
        cpu.exec_cycles(CycleTable::Op, 0xC5);
        cpu.push(cpu.regs.bc);
        cpu.finish_instruction();
        assert_eq!(cpu.engine().tstate_counter(), 11);
        assert_eq!(cpu.bus.memory[0xFEFF], 0x12);
        assert_eq!(cpu.bus.memory[0xFEFE], 0x34);

        // POP BC
        cpu.regs.bc = 0;
        cpu.begin_instruction();
        cpu.fetch_opcode();
        cpu.exec_cycles(CycleTable::Op, 0xC1);
        cpu.regs.bc = cpu.pop();
        cpu.finish_instruction();
        assert_eq!(cpu.regs.bc, 0x1234);
        assert_eq!(cpu.regs.sp, 0xFF00);
        assert_eq!(cpu.engine().tstate_counter(), 21);
    }

    #[test]
    fn test_djnz_loop() {
        let mut cpu = cpu(ContentionConfig::spectrum_48k());
        // DJNZ -2
        cpu.bus.load(0x8000, &[0x10, 0xFE]);
        cpu.regs.set_b(3);

        let mut lengths = Vec::new();
        loop {
            cpu.begin_instruction();
            cpu.fetch_opcode();
            cpu.exec_cycles(CycleTable::Op, 0x10);
            cpu.regs.set_b(cpu.regs.b().wrapping_sub(1));
            cpu.jr_cond(cpu.regs.b() != 0, 0x10);
            cpu.finish_instruction();
            lengths.push(cpu.engine().instruction_tstates());
            if cpu.regs.b() == 0 {
                break;
            }
            assert_eq!(cpu.regs.pc, 0x8000);
        }
        assert_eq!(lengths, vec![13, 13, 8]);
        assert_eq!(cpu.regs.pc, 0x8002);
    }

    #[test]
    fn test_call_and_ret_conditional() {
        for variant_config in [
            ContentionConfig::spectrum_48k(),
            ContentionConfig::spectrum_plus3(),
        ] {
            let mut cpu = cpu(variant_config);
            // CALL NZ,0x9000 / RET Z at 0x9000
            cpu.bus.load(0x8000, &[0xC4, 0x00, 0x90]);
            cpu.bus.load(0x9000, &[0xC8]);

            cpu.begin_instruction();
            let opcode = cpu.fetch_opcode();
            cpu.exec_cycles(CycleTable::Op, opcode);
            cpu.call_cond(false, opcode);
            cpu.finish_instruction();
            assert_eq!(cpu.engine().instruction_tstates(), 10);
            assert_eq!(cpu.regs.pc, 0x8003);

            cpu.regs.pc = 0x8000;
            cpu.begin_instruction();
            let opcode = cpu.fetch_opcode();
            cpu.exec_cycles(CycleTable::Op, opcode);
            cpu.call_cond(true, opcode);
            cpu.finish_instruction();
            assert_eq!(cpu.engine().instruction_tstates(), 17);
            assert_eq!(cpu.regs.pc, 0x9000);

            cpu.begin_instruction();
            let opcode = cpu.fetch_opcode();
            cpu.exec_cycles(CycleTable::Op, opcode);
            cpu.ret_cond(true, opcode);
            cpu.finish_instruction();
            assert_eq!(cpu.engine().instruction_tstates(), 11);
            assert_eq!(cpu.regs.pc, 0x8003);
        }
    }

    #[test]
    fn test_unconditional_call_forces_optional() {
        let mut cpu = cpu(ContentionConfig::spectrum_48k());
        cpu.bus.load(0x8000, &[0xCD, 0x34, 0x12]);
        cpu.begin_instruction();
        let opcode = cpu.fetch_opcode();
        cpu.exec_cycles(CycleTable::Op, opcode);
        cpu.call();
        cpu.finish_instruction();
        assert_eq!(cpu.engine().instruction_tstates(), 17);
        assert_eq!(cpu.regs.pc, 0x1234);
        assert_eq!(cpu.regs.wz, 0x1234);
    }

    #[test]
    fn test_ldir_copies_and_times_each_iteration() {
        let mut cpu = cpu(ContentionConfig::spectrum_48k());
        cpu.bus.load(0x8000, &[0xED, 0xB0]);
        cpu.bus.load(0x9000, &[1, 2, 3]);
        cpu.regs.hl = 0x9000;
        cpu.regs.de = 0xA000;
        cpu.regs.bc = 3;

        let mut lengths = Vec::new();
        loop {
            lengths.push(run_ed(&mut cpu, |cpu| cpu.ldir()));
            if cpu.regs.pc != 0x8000 {
                break;
            }
        }

        assert_eq!(lengths, vec![21, 21, 16]);
        assert_eq!(&cpu.bus.memory[0xA000..0xA003], &[1, 2, 3]);
        assert_eq!(cpu.regs.bc, 0);
        assert_eq!(cpu.regs.hl, 0x9003);
        assert_eq!(cpu.regs.de, 0xA003);
        assert_eq!(cpu.regs.f & FLAG_PARITY, 0);
    }

    #[test]
    fn test_cpir_stops_on_match() {
        let mut cpu = cpu(ContentionConfig::spectrum_plus3());
        cpu.bus.load(0x8000, &[0xED, 0xB1]);
        cpu.bus.load(0x9000, &[0x10, 0x20, 0x30, 0x40]);
        cpu.regs.hl = 0x9000;
        cpu.regs.bc = 4;
        cpu.regs.a = 0x20;

        assert_eq!(run_ed(&mut cpu, |cpu| cpu.cpir()), 21);
        assert_eq!(run_ed(&mut cpu, |cpu| cpu.cpir()), 16);
        assert_ne!(cpu.regs.f & FLAG_ZERO, 0);
        assert_ne!(cpu.regs.f & FLAG_PARITY, 0);
        assert_eq!(cpu.regs.hl, 0x9002);
        assert_eq!(cpu.regs.bc, 2);
        assert_eq!(cpu.regs.pc, 0x8002);
    }

    #[test]
    fn test_lddr_runs_backwards() {
        let mut cpu = cpu(ContentionConfig::spectrum_48k());
        cpu.bus.load(0x8000, &[0xED, 0xB8]);
        cpu.bus.load(0x9000, &[7, 8]);
        cpu.regs.hl = 0x9001;
        cpu.regs.de = 0xA001;
        cpu.regs.bc = 2;

        assert_eq!(run_ed(&mut cpu, |cpu| cpu.lddr()), 21);
        assert_eq!(run_ed(&mut cpu, |cpu| cpu.lddr()), 16);
        assert_eq!(&cpu.bus.memory[0xA000..0xA002], &[7, 8]);
        assert_eq!(cpu.regs.hl, 0x8FFF);
    }

    #[test]
    fn test_otir_sends_block_to_port() {
        let mut cpu = cpu(ContentionConfig::spectrum_48k());
        cpu.bus.load(0x8000, &[0xED, 0xB3]);
        cpu.bus.load(0x9000, &[0xAA, 0xBB]);
        cpu.regs.hl = 0x9000;
        cpu.regs.bc = 0x02FF;

        assert_eq!(run_ed(&mut cpu, |cpu| cpu.otir()), 21);
        assert_eq!(run_ed(&mut cpu, |cpu| cpu.otir()), 16);
        // B is decremented before the port goes on the bus
        assert_eq!(cpu.bus.port_writes, vec![(0x01FF, 0xAA), (0x00FF, 0xBB)]);
        assert_ne!(cpu.regs.f & FLAG_ZERO, 0);
    }

    #[test]
    fn test_inir_reads_block_from_port() {
        let mut cpu = cpu(ContentionConfig::spectrum_128k());
        cpu.bus.load(0x8000, &[0xED, 0xB2]);
        cpu.bus.port_value = 0x5A;
        cpu.regs.hl = 0x9000;
        cpu.regs.bc = 0x0201;

        assert_eq!(run_ed(&mut cpu, |cpu| cpu.inir()), 21);
        assert_eq!(run_ed(&mut cpu, |cpu| cpu.inir()), 16);
        assert_eq!(&cpu.bus.memory[0x9000..0x9002], &[0x5A, 0x5A]);
        assert_eq!(cpu.regs.b(), 0);
        assert_eq!(cpu.regs.hl, 0x9002);
    }

    #[test]
    fn test_single_block_instructions() {
        let mut cpu = cpu(ContentionConfig::spectrum_plus3());
        cpu.bus.load(0x8000, &[0xED, 0xA0, 0xED, 0xA9, 0xED, 0xAA, 0xED, 0xAB]);
        cpu.bus.load(0x9000, &[0x11, 0x22]);
        cpu.regs.hl = 0x9000;
        cpu.regs.de = 0xA000;
        cpu.regs.bc = 0x0105;

        assert_eq!(run_ed(&mut cpu, |cpu| cpu.ldi()), 16);
        assert_eq!(cpu.bus.memory[0xA000], 0x11);
        assert_eq!(cpu.regs.bc, 0x0104);

        assert_eq!(run_ed(&mut cpu, |cpu| cpu.cpd()), 16);
        assert_eq!(cpu.regs.hl, 0x9000);

        assert_eq!(run_ed(&mut cpu, |cpu| cpu.ind()), 16);
        assert_eq!(cpu.regs.b(), 0x00);

        cpu.regs.bc = 0x0100;
        assert_eq!(run_ed(&mut cpu, |cpu| cpu.outd()), 16);
        assert_eq!(cpu.bus.port_writes.last(), Some(&(0x0000, 0x00)));
    }

    #[test]
    fn test_contended_ldir_exact_timing() {
        let mut cpu = cpu(ContentionConfig::spectrum_48k());
        cpu.bus.load(0x8000, &[0xED, 0xB0]);
        cpu.regs.hl = 0x9000;
        cpu.regs.de = 0x4000;
        cpu.regs.bc = 2;
        cpu.engine_mut().clock_mut().set_counter(14335);

        // Write at column 11 (3), de:1x2 at 17 and 23 (5, 0), repeat at 24..40 (6, 0, 6, 0, 6)
        assert_eq!(run_ed(&mut cpu, |cpu| cpu.ldir()), 21 + 3 + 5 + 18);
        assert_eq!(cpu.engine().tstate_counter(), 14335 + 47);
        // Second pass starts at column 47: write at 58 (4), de:1x2 at 65 and 71 (5, 0)
        assert_eq!(run_ed(&mut cpu, |cpu| cpu.ldir()), 16 + 4 + 5);
        assert!(cpu.engine().history().is_balanced());
    }

    #[test]
    fn test_contended_ir_pair() {
        // INC HL with I pointing into contended memory
        let mut cpu = cpu(ContentionConfig::spectrum_48k());
        cpu.bus.load(0x8000, &[0x23]);
        cpu.regs.i = 0x40;
        cpu.engine_mut().clock_mut().set_counter(14335);

        let inc_hl = |cpu: &mut ContendedZ80<TestBus>| cpu.regs.hl = cpu.regs.hl.wrapping_add(1);
        // ir:1 at column 4 (2) and column 7 (0)
        assert_eq!(run_op(&mut cpu, inc_hl), 6 + 2);

        // Same instruction with I outside contended memory
        cpu.regs.pc = 0x8000;
        cpu.regs.i = 0x3F;
        cpu.engine_mut().clock_mut().set_counter(14335);
        assert_eq!(run_op(&mut cpu, inc_hl), 6);
        assert_eq!(cpu.regs.hl, 2);
    }

    #[test]
    fn test_contended_paged_bank() {
        // LD A,(HL) from 0xC000 on the 128K, one line into the display
        let mut cpu = cpu(ContentionConfig::spectrum_128k());
        cpu.bus.load(0x8000, &[0x7E]);
        cpu.bus.memory[0xC000] = 0x99;
        cpu.regs.hl = 0xC000;
        let ld_a_hl = |cpu: &mut ContendedZ80<TestBus>| cpu.regs.a = cpu.rm(cpu.regs.hl);

        // Bank 3 is contended: read at column 4 (2)
        cpu.engine_mut().set_selected_bank(3);
        cpu.engine_mut().clock_mut().set_counter(14361 + 228);
        assert_eq!(run_op(&mut cpu, ld_a_hl), 7 + 2);
        assert_eq!(cpu.regs.a, 0x99);

        // Bank 2 is not
        cpu.regs.pc = 0x8000;
        cpu.engine_mut().set_selected_bank(2);
        cpu.engine_mut().clock_mut().set_counter(14361 + 228);
        assert_eq!(run_op(&mut cpu, ld_a_hl), 7);
    }

    #[test]
    fn test_isr_cycles() {
        let mut cpu = cpu(ContentionConfig::spectrum_48k());
        cpu.isr_cycles(13);
        assert_eq!(cpu.engine().tstate_counter(), 13);
    }
}
