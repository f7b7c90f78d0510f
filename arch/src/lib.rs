pub mod mode;
pub mod mozar;
pub mod op;
pub mod reg;
pub mod word;

/// Load address of the first code word.
pub const INITIAL_ADDRESS: u16 = 100;
