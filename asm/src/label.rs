use crate::error::Error;
use arch::{op::Opcode, reg::Reg};
use indexmap::IndexMap;

pub const LABEL_MAX: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Local,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub address: u16,
    pub storage: Storage,
    /// Defined in front of an instruction. Everything else local is data
    /// and moves behind the code segment on relocation.
    pub is_code: bool,
}

/// Symbols of one assembly unit, in definition order.
#[derive(Debug, Default)]
pub struct Labels {
    labels: IndexMap<String, Symbol>,
}

impl Labels {
    pub fn new() -> Self {
        Labels {
            labels: IndexMap::new(),
        }
    }

    pub fn insert(
        &mut self,
        name: &str,
        address: u16,
        storage: Storage,
        is_code: bool,
    ) -> Result<(), Error> {
        if self.labels.contains_key(name) {
            return Err(Error::DuplicateSymbol(name.to_string()));
        }
        self.labels
            .try_reserve(1)
            .map_err(|_| Error::MemoryAllocation)?;
        self.labels.insert(
            name.to_string(),
            Symbol {
                address,
                storage,
                is_code,
            },
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.labels.get(name)
    }

    /// Shifts every local data symbol by `offset`. The table is left
    /// untouched if any address would leave the 16-bit range.
    pub fn relocate_data(&mut self, offset: u16) -> Result<(), Error> {
        let moves = |symbol: &Symbol| !symbol.is_code && symbol.storage == Storage::Local;
        if self
            .labels
            .values()
            .any(|symbol| moves(symbol) && symbol.address.checked_add(offset).is_none())
        {
            return Err(Error::ProgramTooLarge);
        }
        for symbol in self.labels.values_mut() {
            if moves(&*symbol) {
                symbol.address += offset;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

pub fn is_valid_label(name: &str) -> bool {
    let mut chars = name.chars();
    let head_ok = chars.next().is_some_and(|ch| ch.is_ascii_alphabetic());
    head_ok
        && chars.all(|ch| ch.is_ascii_alphanumeric())
        && name.len() <= LABEL_MAX
        && Opcode::parse(name).is_err()
        && Reg::parse(name).is_err()
}

pub fn check_label(name: &str) -> Result<(), Error> {
    if is_valid_label(name) {
        Ok(())
    } else {
        Err(Error::InvalidLabel(name.to_string()))
    }
}
