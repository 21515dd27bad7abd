//! Fixed-column parser for nestest-format trace lines.
//!
//! Both this emulator's output and the reference log share the same layout
//! up through the stack pointer column; the reference log carries PPU and
//! CYC fields after that, which this core does not emit and the comparison
//! ignores.

pub struct EmulatorState<'a> {
    pub pc: u16,
    pub instr: &'a str,
    pub disasm: &'a str,
    pub acc: u8,
    pub xreg: u8,
    pub yreg: u8,
    pub status: u8,
    pub stack: u8,
}

pub fn parse_line(line: &str) -> EmulatorState {
    EmulatorState {
        pc: u16::from_str_radix(&line[0..4], 16).unwrap(),
        instr: &line[6..15],
        disasm: &line[15..47],
        acc: u8::from_str_radix(&line[50..52], 16).unwrap(),
        xreg: u8::from_str_radix(&line[55..57], 16).unwrap(),
        yreg: u8::from_str_radix(&line[60..62], 16).unwrap(),
        status: u8::from_str_radix(&line[65..67], 16).unwrap(),
        stack: u8::from_str_radix(&line[71..73], 16).unwrap(),
    }
}

/// Assert that every shared field of two parsed lines agrees.
pub fn assert_logs_eq(line_no: usize, left: &EmulatorState, right: &EmulatorState) {
    assert_eq!(left.pc, right.pc, "L{}: program counter mismatch", line_no);
    assert_eq!(left.instr, right.instr, "L{}: instruction mismatch", line_no);
    assert_eq!(left.disasm, right.disasm, "L{}: disassembly mismatch", line_no);
    assert_eq!(left.acc, right.acc, "L{}: accumulator mismatch", line_no);
    assert_eq!(left.xreg, right.xreg, "L{}: X register mismatch", line_no);
    assert_eq!(left.yreg, right.yreg, "L{}: Y register mismatch", line_no);
    assert_eq!(left.status, right.status, "L{}: status register mismatch", line_no);
    assert_eq!(left.stack, right.stack, "L{}: stack pointer mismatch", line_no);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_reference_line() {
        let line = parse_line("D101  C1 80     CMP ($80,X) @ 80 = 0200 = 00    A:80 X:00 Y:68 P:A4 SP:FB PPU: 66, 30 CYC:3439");
        assert_eq!(line.pc, 0xD101, "program counter mismatch");
        assert_eq!(line.instr, "C1 80    ", "instruction mismatch");
        assert_eq!(
            line.disasm, " CMP ($80,X) @ 80 = 0200 = 00   ",
            "disassembly mismatch"
        );
        assert_eq!(line.acc, 0x80, "accumulator mismatch");
        assert_eq!(line.xreg, 0x00, "X register mismatch");
        assert_eq!(line.yreg, 0x68, "Y register mismatch");
        assert_eq!(line.status, 0xA4, "status register mismatch");
        assert_eq!(line.stack, 0xFB, "stack pointer mismatch");
    }

    #[test]
    fn parses_a_line_without_trailing_columns() {
        let line = parse_line("C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD");
        assert_eq!(line.pc, 0xC000);
        assert_eq!(line.instr, "4C F5 C5 ");
        assert_eq!(line.stack, 0xFD);
    }
}
