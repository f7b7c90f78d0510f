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
pub enum Reg {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl Reg {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(r) => Ok(r),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }

    pub fn num(self) -> u8 {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!(Reg::parse("r0"), Ok(Reg::R0));
        assert_eq!(Reg::parse("r7").map(Reg::num), Ok(7));
        assert!(Reg::parse("r8").is_err());
        assert!(Reg::parse("R1").is_err());
        assert!(Reg::parse("r").is_err());
    }
}
