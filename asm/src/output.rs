use crate::{
    refs::Refs,
    unit::{Assembly, Segment},
};
use arch::mozar::{encode_int, encode_word};

const COLUMN: usize = 30;

/// Text of the `.ob`, `.ent` and `.ext` files. A file is `None` when it
/// would have no rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub object: Option<String>,
    pub entries: Option<String>,
    pub externs: Option<String>,
}

impl Artifacts {
    pub fn new(asm: &Assembly) -> Self {
        let has_words = !asm.code.is_empty() || !asm.data.is_empty();
        Artifacts {
            object: has_words.then(|| object(asm)),
            entries: (!asm.entries.is_empty()).then(|| refs(&asm.entries)),
            externs: (!asm.externs.is_empty()).then(|| refs(&asm.externs)),
        }
    }
}

fn row(out: &mut String, left: &str, right: &str) {
    out.push_str(&format!("{:<width$}{}\n", left, right, width = COLUMN));
}

/// Header with the segment lengths, then one line per word, code first.
pub fn object(asm: &Assembly) -> String {
    let mut out = String::new();
    row(
        &mut out,
        &encode_int(asm.code.len() as u32),
        &encode_int(asm.data.len() as u32),
    );
    for (segment, image) in [(Segment::Code, &asm.code), (Segment::Data, &asm.data)] {
        for (idx, word) in image.words().iter().enumerate() {
            let address = asm.address(segment, idx);
            row(&mut out, &encode_int(address), &encode_word(*word));
        }
    }
    out
}

pub fn refs(refs: &Refs) -> String {
    let mut out = String::new();
    for r in refs.iter() {
        row(&mut out, &r.name, &encode_int(r.address as u32));
    }
    out
}
