use crate::mode::Mode;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    EnumIter,
    Display,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Opcode {
    MOV,
    CMP,
    ADD,
    SUB,
    NOT,
    CLR,
    LEA,
    INC,
    DEC,
    JMP,
    BNE,
    RED,
    PRN,
    JSR,
    RTS,
    STOP,
}

impl Opcode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(op) => Ok(op),
            Err(_) => Err(format!("Undefined Op: {s}")),
        }
    }

    pub fn code(self) -> u8 {
        self.into()
    }

    /// Number of operands the instruction takes.
    pub fn arity(self) -> usize {
        use Opcode::*;
        match self {
            MOV | CMP | ADD | SUB | LEA => 2,
            NOT | CLR | INC | DEC | JMP | BNE | RED | PRN | JSR => 1,
            RTS | STOP => 0,
        }
    }

    /// Whether the combination of source and destination modes is accepted.
    /// `None` stands for an absent operand.
    pub fn is_legal(self, src: Option<Mode>, dst: Option<Mode>) -> bool {
        use Opcode::*;
        let writable = matches!(dst, Some(d) if d != Mode::Immediate);
        match self {
            MOV | ADD | SUB => src.is_some() && writable,
            CMP => src.is_some() && dst.is_some(),
            LEA => matches!(src, Some(Mode::Direct | Mode::Matrix)) && writable,
            NOT | CLR | INC | DEC | JMP | BNE | RED | JSR => src.is_none() && writable,
            PRN => src.is_none() && dst.is_some(),
            RTS | STOP => src.is_none() && dst.is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use Mode::*;

    #[test]
    fn codes_follow_table_order() {
        for (idx, op) in Opcode::iter().enumerate() {
            assert_eq!(op.code() as usize, idx);
            assert_eq!(Opcode::try_from(idx as u8).ok(), Some(op));
        }
        assert_eq!(Opcode::parse("stop"), Ok(Opcode::STOP));
        assert_eq!(Opcode::parse("jsr").map(Opcode::code), Ok(13));
        assert!(Opcode::parse("MOV").is_err());
        assert!(Opcode::parse("halt").is_err());
    }

    #[test]
    fn two_operand_group() {
        for op in [Opcode::MOV, Opcode::ADD, Opcode::SUB] {
            assert!(op.is_legal(Some(Immediate), Some(Register)));
            assert!(op.is_legal(Some(Matrix), Some(Direct)));
            assert!(!op.is_legal(Some(Register), Some(Immediate)));
            assert!(!op.is_legal(None, Some(Register)));
            assert!(!op.is_legal(None, None));
        }
        assert!(Opcode::CMP.is_legal(Some(Immediate), Some(Immediate)));
        assert!(!Opcode::CMP.is_legal(None, Some(Direct)));
    }

    #[test]
    fn lea_source() {
        assert!(Opcode::LEA.is_legal(Some(Direct), Some(Register)));
        assert!(Opcode::LEA.is_legal(Some(Matrix), Some(Direct)));
        assert!(!Opcode::LEA.is_legal(Some(Immediate), Some(Register)));
        assert!(!Opcode::LEA.is_legal(Some(Register), Some(Register)));
        assert!(!Opcode::LEA.is_legal(Some(Direct), Some(Immediate)));
    }

    #[test]
    fn one_and_zero_operand_groups() {
        assert!(Opcode::JMP.is_legal(None, Some(Direct)));
        assert!(!Opcode::JMP.is_legal(None, Some(Immediate)));
        assert!(!Opcode::CLR.is_legal(Some(Register), Some(Register)));
        assert!(Opcode::PRN.is_legal(None, Some(Immediate)));
        assert!(!Opcode::PRN.is_legal(None, None));
        assert!(Opcode::RTS.is_legal(None, None));
        assert!(!Opcode::STOP.is_legal(None, Some(Register)));
    }

    #[test]
    fn arity_matches_legal_shape() {
        for op in Opcode::iter() {
            let src = (op.arity() == 2).then_some(Direct);
            let dst = (op.arity() >= 1).then_some(Direct);
            assert!(op.is_legal(src, dst), "{op}");
        }
    }
}
