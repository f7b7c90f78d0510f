use crate::{
    mode::{MemType, Mode},
    op::Opcode,
    reg::Reg,
};
use color_print::cformat;

/// Bounds of a literal stored as a whole word.
pub const DATA_MIN: i32 = -1023;
pub const DATA_MAX: i32 = 1023;

/// Bounds of a value stored in the 8-bit payload above the memory-type tag.
pub const PAYLOAD_MIN: i32 = -256;
pub const PAYLOAD_MAX: i32 = 255;

/// A 10-bit machine word.
///
/// ```text
///  9    6 5  4 3  2 1  0
/// +------+----+----+----+
/// |opcode|src |dst |mem |
/// +------+----+----+----+
/// ```
///
/// Literal data reuses the same split: the four fields are just the
/// big-endian slices of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Word {
    opcode: u8,
    src: u8,
    dst: u8,
    mem: u8,
}

impl Word {
    pub fn from_bits(bits: u16) -> Self {
        Word {
            opcode: ((bits >> 6) & 0xF) as u8,
            src: ((bits >> 4) & 0x3) as u8,
            dst: ((bits >> 2) & 0x3) as u8,
            mem: (bits & 0x3) as u8,
        }
    }

    pub fn bits(self) -> u16 {
        (self.opcode as u16) << 6 | (self.src as u16) << 4 | (self.dst as u16) << 2 | self.mem as u16
    }

    /// First word of an instruction. Absent operands leave their mode field at 0.
    pub fn inst(op: Opcode, src: Option<Mode>, dst: Option<Mode>) -> Self {
        Word {
            opcode: op.code(),
            src: src.map(u8::from).unwrap_or(0),
            dst: dst.map(u8::from).unwrap_or(0),
            mem: MemType::Absolute.into(),
        }
    }

    /// Literal for `.data`, `.string` and `.mat`.
    ///
    /// Values anywhere in `DATA_MIN..=DATA_MAX` are accepted and kept as
    /// their low 10 bits, so a negative value and its 10-bit unsigned
    /// counterpart share a word (`-1` and `1023` both give `0x3FF`).
    pub fn data(value: i32) -> Option<Self> {
        if (DATA_MIN..=DATA_MAX).contains(&value) {
            Some(Word::from_bits(value as u16 & 0x3FF))
        } else {
            None
        }
    }

    /// Operand word: 8-bit payload tagged with its memory type.
    pub fn payload(value: i32, mem: MemType) -> Option<Self> {
        if (PAYLOAD_MIN..=PAYLOAD_MAX).contains(&value) {
            let bits = (value as u16 & 0xFF) << 2 | u8::from(mem) as u16;
            Some(Word::from_bits(bits))
        } else {
            None
        }
    }

    /// Register word: `hi` lands in the 4-bit field, `lo` in bits 5..2.
    pub fn regs(hi: Option<Reg>, lo: Option<Reg>) -> Self {
        let lo = lo.map(Reg::num).unwrap_or(0);
        Word {
            opcode: hi.map(Reg::num).unwrap_or(0),
            src: lo >> 2,
            dst: lo & 0x3,
            mem: MemType::Absolute.into(),
        }
    }

    pub fn opcode(self) -> u8 {
        self.opcode
    }

    pub fn src(self) -> u8 {
        self.src
    }

    pub fn dst(self) -> u8 {
        self.dst
    }

    pub fn mem(self) -> MemType {
        MemType::from(self.mem)
    }

    /// Raw low two bits. Unlike [`Word::mem`] this keeps literal data intact.
    pub fn mem_bits(self) -> u8 {
        self.mem
    }

    pub fn cformat(self) -> String {
        cformat!(
            "<red>{:04b}</> <blue>{:02b} {:02b}</> <yellow>{:02b}</>",
            self.opcode,
            self.src,
            self.dst,
            self.mem
        )
    }
}
