use crate::{
    error::Error,
    label::{Labels, Storage},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    pub name: String,
    pub address: u16,
}

/// Rows of the entry or the extern file, in the order they were added.
#[derive(Debug, Default, Clone)]
pub struct Refs {
    refs: Vec<Ref>,
}

impl Refs {
    pub fn new() -> Self {
        Refs { refs: vec![] }
    }

    fn push(&mut self, name: &str, address: u16) -> Result<(), Error> {
        self.refs
            .try_reserve(1)
            .map_err(|_| Error::MemoryAllocation)?;
        self.refs.push(Ref {
            name: name.to_string(),
            address,
        });
        Ok(())
    }

    /// Exports a symbol defined in this unit.
    pub fn add_entry(&mut self, name: &str, labels: &Labels) -> Result<(), Error> {
        match labels.lookup(name) {
            Some(symbol) if symbol.storage == Storage::Local => self.push(name, symbol.address),
            _ => Err(Error::UnknownOrExternalSymbol(name.to_string())),
        }
    }

    /// Notes one use of an external symbol. Every use gets its own row.
    pub fn record_use(&mut self, name: &str, site: u16) -> Result<(), Error> {
        self.push(name, site)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ref> {
        self.refs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
