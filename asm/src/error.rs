use arch::{mode::Mode, op::Opcode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Line is longer than {0} characters")]
    LineTooLong(usize),

    #[error("Invalid label: `{0}`")]
    InvalidLabel(String),

    #[error("Symbol `{0}` declared more than once")]
    DuplicateSymbol(String),

    #[error("Unknown operation: `{0}`")]
    InvalidOperation(String),

    #[error("Invalid operand: `{0}`")]
    InvalidOperand(String),

    #[error("Illegal addressing for `{}`: source {}, destination {}", .op, fmt_mode(.src), fmt_mode(.dst))]
    IllegalAddressing {
        op: Opcode,
        src: Option<Mode>,
        dst: Option<Mode>,
    },

    #[error("Number {value} is out of range [{min}, {max}]")]
    NumericOverflow { value: String, min: i32, max: i32 },

    #[error("Program does not fit in the {} word address space", u16::MAX as u32 + 1)]
    ProgramTooLarge,

    #[error("String should start and end with `\"`")]
    MalformedString,

    #[error("Malformed matrix: `{0}`")]
    MalformedMatrix(String),

    #[error("`{name}` expects {expected} operand(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("Entry `{0}` is not defined in this file or is declared external")]
    UnknownOrExternalSymbol(String),

    #[error("Undefined label: `{0}`")]
    UndefinedSymbol(String),

    #[error("Cannot allocate memory")]
    MemoryAllocation,

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read file: {0}")]
    FileRead(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}

impl Error {
    /// Errors that stop the whole run instead of just the current line.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::MemoryAllocation)
    }

    pub fn overflow(value: impl ToString, min: i32, max: i32) -> Self {
        Error::NumericOverflow {
            value: value.to_string(),
            min,
            max,
        }
    }

    pub fn arity(name: impl ToString, expected: impl ToString, found: usize) -> Self {
        Error::ArityMismatch {
            name: name.to_string(),
            expected: expected.to_string(),
            found,
        }
    }
}

fn fmt_mode(mode: &Option<Mode>) -> String {
    match mode {
        Some(mode) => mode.to_string(),
        None => "none".to_string(),
    }
}
