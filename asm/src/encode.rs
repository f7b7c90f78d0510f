use crate::{
    error::Error,
    image::Image,
    label::{Labels, Storage},
    parser::Operand,
    refs::Refs,
};
use arch::{
    mode::MemType,
    op::Opcode,
    word::{Word, PAYLOAD_MAX, PAYLOAD_MIN},
    INITIAL_ADDRESS,
};

/// Source and destination of an operand list. A lone operand is the destination.
pub fn split<'o, 'a>(operands: &'o [Operand<'a>]) -> (Option<&'o Operand<'a>>, Option<&'o Operand<'a>>) {
    match operands {
        [] => (None, None),
        [dst] => (None, Some(dst)),
        [src, dst, ..] => (Some(src), Some(dst)),
    }
}

/// Words an instruction occupies. Two register operands share one word.
pub fn size(src: Option<&Operand>, dst: Option<&Operand>) -> u16 {
    if let (Some(Operand::Register(_)), Some(Operand::Register(_))) = (src, dst) {
        return 2;
    }
    let extra: u16 = [src, dst]
        .into_iter()
        .flatten()
        .map(|operand| match operand {
            Operand::Matrix(..) => 2,
            _ => 1,
        })
        .sum();
    1 + extra
}

fn payload(value: i32, mem: MemType) -> Result<Word, Error> {
    Word::payload(value, mem).ok_or_else(|| Error::overflow(value, PAYLOAD_MIN, PAYLOAD_MAX))
}

/// `base + offset`, as long as it stays a 16-bit address.
fn address(base: u16, offset: usize) -> Result<u16, Error> {
    u16::try_from(offset)
        .ok()
        .and_then(|offset| base.checked_add(offset))
        .ok_or(Error::ProgramTooLarge)
}

/// Appends instructions to the code image, resolving labels against a
/// finished symbol table.
pub struct Encoder<'u> {
    labels: &'u Labels,
    code: &'u mut Image,
    externs: &'u mut Refs,
}

impl<'u> Encoder<'u> {
    pub fn new(labels: &'u Labels, code: &'u mut Image, externs: &'u mut Refs) -> Self {
        Encoder {
            labels,
            code,
            externs,
        }
    }

    /// Encodes one instruction and returns the number of words written.
    /// Nothing is written if any operand fails.
    pub fn encode(
        &mut self,
        op: Opcode,
        src: Option<&Operand>,
        dst: Option<&Operand>,
    ) -> Result<usize, Error> {
        let src_mode = src.map(Operand::mode);
        let dst_mode = dst.map(Operand::mode);
        if !op.is_legal(src_mode, dst_mode) {
            return Err(Error::IllegalAddressing {
                op,
                src: src_mode,
                dst: dst_mode,
            });
        }

        let base = address(INITIAL_ADDRESS, self.code.len())?;
        let mut words = vec![Word::inst(op, src_mode, dst_mode)];
        let mut uses = vec![];
        match (src, dst) {
            (Some(Operand::Register(s)), Some(Operand::Register(d))) => {
                words.push(Word::regs(Some(*s), Some(*d)));
            }
            _ => {
                if let Some(src) = src {
                    self.operand(src, true, base, &mut words, &mut uses)?;
                }
                if let Some(dst) = dst {
                    self.operand(dst, false, base, &mut words, &mut uses)?;
                }
            }
        }

        self.code.extend(&words)?;
        for (name, site) in uses {
            self.externs.record_use(name, site)?;
        }
        Ok(words.len())
    }

    fn operand<'a>(
        &self,
        operand: &Operand<'a>,
        is_src: bool,
        base: u16,
        words: &mut Vec<Word>,
        uses: &mut Vec<(&'a str, u16)>,
    ) -> Result<(), Error> {
        let site = address(base, words.len())?;
        match *operand {
            Operand::Immediate(value) => words.push(payload(value, MemType::Absolute)?),
            Operand::Direct(name) => words.push(self.reference(name, site, uses)?),
            Operand::Matrix(name, row, col) => {
                words.push(self.reference(name, site, uses)?);
                words.push(Word::regs(Some(row), Some(col)));
            }
            Operand::Register(reg) if is_src => words.push(Word::regs(Some(reg), None)),
            Operand::Register(reg) => words.push(Word::regs(None, Some(reg))),
        }
        Ok(())
    }

    fn reference<'a>(
        &self,
        name: &'a str,
        site: u16,
        uses: &mut Vec<(&'a str, u16)>,
    ) -> Result<Word, Error> {
        let symbol = self
            .labels
            .lookup(name)
            .ok_or_else(|| Error::UndefinedSymbol(name.to_string()))?;
        match symbol.storage {
            Storage::External => {
                uses.push((name, site));
                payload(0, MemType::External)
            }
            Storage::Local => payload(symbol.address as i32, MemType::Relocatable),
        }
    }
}
