/// A struct holding state information about a 6502 CPU.
///
/// This struct is held internally, but can be copied out to power things
/// like debug formatters and assertions in tests.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct CpuState {
    /// The Accumulator register
    pub acc: u8,

    /// X index register
    pub x: u8,

    /// Y index register
    pub y: u8,

    /// The stack pointer
    ///
    /// # Note
    ///
    /// This register is a pointer to a location in memory on the first page
    /// ($01XX) of memory. The 6502 uses a bottom-up stack, so the 'first'
    /// location on the stack is `$01FF` and the 'last' is `$0100`.
    pub stack: u8,

    /// The program counter
    pub pc: u16,

    /// The program status register.
    pub status: Status,

    /// The total number of clock cycles this CPU has run
    ///
    /// Increments by exactly one per `step` call, so it doubles as the
    /// reference clock for cycle-accuracy assertions.
    pub tot_cycles: u64,
}

/// The addressing mode for an opcode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum AddressingMode {
    /// Zero-Page
    ZP,
    /// Zero-Page Indexed, X register
    ZPX,
    /// Zero-Page Indexed, Y register
    ZPY,
    /// Absolute Indexed, plus X register
    AbsX,
    /// Absolute Indexed, plus Y register
    AbsY,
    /// Indexed Indirect (d, x)
    IndX,
    /// Indirect Indexed (d), y
    IndY,
    /// Implicit indexing (do nothing, resolve nothing)
    Impl,
    /// Use the Accumulator
    Accum,
    /// Don't fetch anything and use the operand as data
    Imm,
    /// Jump to a relative label
    Rel,
    /// Indirect addressing, only used by JMP
    ///
    /// Carries the famous page-boundary bug: a pointer at $xxFF takes its
    /// high byte from $xx00, not the following page.
    AbsInd,
    /// The 16-bit address is included in the operand
    Abs,
}

bitflags! {
    pub struct Status: u8 {
        const CARRY = 0x01;
        const ZERO = 0x02;
        const IRQ_DISABLE = 0x04;
        const DECIMAL = 0x08;
        const BREAK = 0x10;
        const UNUSED = 0x20;
        const OVERFLOW = 0x40;
        const NEGATIVE = 0x80;
    }
}

/// Power-up register state.
///
/// The program counter is hard-wired to $C000, the entry point of nestest's
/// automated mode; `Cpu6502::reset` reads the real reset vector instead.
/// cf. http://wiki.nesdev.com/w/index.php/CPU_power_up_state
pub const POWERON_CPU_STATE: CpuState = CpuState {
    acc: 0,
    x: 0,
    y: 0,
    stack: 0xFD,
    pc: 0xC000,
    status: Status::from_bits_truncate(0x24),
    tot_cycles: 0,
};
