pub mod encode;
pub mod error;
pub mod image;
pub mod label;
pub mod lexer;
pub mod msg;
pub mod output;
pub mod parser;
pub mod refs;
pub mod unit;
pub mod util;

pub use error::Error;
pub use output::Artifacts;
pub use unit::{assemble, Assembly, Unit};
