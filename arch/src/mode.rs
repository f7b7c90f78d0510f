use num_enum::{FromPrimitive, IntoPrimitive};
use strum::Display;

/// Operand addressing mode, as stored in the 2-bit mode fields of an
/// instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromPrimitive, IntoPrimitive, Display)]
#[repr(u8)]
pub enum Mode {
    #[default]
    Immediate,
    Direct,
    Matrix,
    Register,
}

/// Relocation tag carried in the low two bits of every word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromPrimitive, IntoPrimitive, Display)]
#[repr(u8)]
pub enum MemType {
    #[default]
    Absolute,
    External,
    Relocatable,
}
