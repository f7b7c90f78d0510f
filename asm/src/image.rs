use crate::error::Error;
use arch::word::Word;

/// Append-only run of words: the code or the data segment.
#[derive(Debug, Default, Clone)]
pub struct Image {
    words: Vec<Word>,
}

impl Image {
    pub fn new() -> Self {
        Image { words: vec![] }
    }

    pub fn extend(&mut self, words: &[Word]) -> Result<(), Error> {
        self.words
            .try_reserve(words.len())
            .map_err(|_| Error::MemoryAllocation)?;
        self.words.extend_from_slice(words);
        Ok(())
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
