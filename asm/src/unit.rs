use crate::{
    encode::{self, Encoder},
    error::Error,
    image::Image,
    label::{check_label, Labels, Storage},
    msg::{Diag, Diagnostics},
    parser::{char_literal, parse_dims, parse_literal, Directive, Head, Line, Operand},
    refs::Refs,
};
use arch::{
    word::{Word, DATA_MAX, DATA_MIN},
    INITIAL_ADDRESS,
};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Scanning1,
    Relocating,
    Scanning2,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Code,
    Data,
}

/// Words produced by one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub line: usize,
    pub segment: Segment,
    pub offset: usize,
    pub len: usize,
}

/// Everything a clean unit produced.
#[derive(Debug)]
pub struct Assembly {
    pub code: Image,
    pub data: Image,
    pub labels: Labels,
    pub entries: Refs,
    pub externs: Refs,
    pub rows: Vec<Row>,
    pub warnings: Vec<Diag>,
}

impl Assembly {
    /// Load address of the `idx`-th word of `segment`.
    pub fn address(&self, segment: Segment, idx: usize) -> u32 {
        let base = match segment {
            Segment::Code => INITIAL_ADDRESS as usize,
            Segment::Data => INITIAL_ADDRESS as usize + self.code.len(),
        };
        (base + idx) as u32
    }
}

/// State of one source file. Built fresh for every file and consumed by
/// [`Unit::run`].
#[derive(Debug)]
pub struct Unit {
    stage: Stage,
    labels: Labels,
    code: Image,
    data: Image,
    ic: u16,
    dc: u16,
    entries: Refs,
    externs: Refs,
    diags: Diagnostics,
    failed: BTreeSet<usize>,
    rows: Vec<Row>,
}

impl Default for Unit {
    fn default() -> Self {
        Unit::new()
    }
}

impl Unit {
    pub fn new() -> Self {
        Unit {
            stage: Stage::Scanning1,
            labels: Labels::new(),
            code: Image::new(),
            data: Image::new(),
            ic: INITIAL_ADDRESS,
            dc: 0,
            entries: Refs::new(),
            externs: Refs::new(),
            diags: Diagnostics::new(),
            failed: BTreeSet::new(),
            rows: vec![],
        }
    }

    pub fn run(mut self, source: &str) -> Result<Assembly, Vec<Diag>> {
        // 1. Collect symbols and count words
        for (idx, raw) in source.lines().enumerate() {
            if let Err(err) = self.first_line(idx + 1, raw) {
                self.fail(idx + 1, err);
            }
            if self.stage == Stage::Failed {
                return Err(self.diags.into_vec());
            }
        }

        // 2. Place data behind code
        self.stage = Stage::Relocating;
        if let Err(err) = self.labels.relocate_data(self.ic) {
            self.diags.error(source.lines().count(), err);
            return Err(self.diags.into_vec());
        }

        // 3. Encode instructions and resolve entries
        self.stage = Stage::Scanning2;
        for (idx, raw) in source.lines().enumerate() {
            if self.failed.contains(&(idx + 1)) {
                continue;
            }
            if let Err(err) = self.second_line(idx + 1, raw) {
                self.fail(idx + 1, err);
            }
            if self.stage == Stage::Failed {
                return Err(self.diags.into_vec());
            }
        }

        if self.diags.has_error() {
            self.stage = Stage::Failed;
            return Err(self.diags.into_vec());
        }
        self.stage = Stage::Done;
        self.rows.sort_by_key(|row| row.line);
        Ok(Assembly {
            code: self.code,
            data: self.data,
            labels: self.labels,
            entries: self.entries,
            externs: self.externs,
            rows: self.rows,
            warnings: self.diags.into_vec(),
        })
    }

    fn fail(&mut self, line: usize, err: Error) {
        if err.is_fatal() {
            self.stage = Stage::Failed;
        }
        self.failed.insert(line);
        self.diags.error(line, err);
    }

    // ------------------------------------------------------------------------
    // First pass

    fn first_line(&mut self, line_no: usize, raw: &str) -> Result<(), Error> {
        let mut line = match Line::parse(raw)? {
            Some(line) => line,
            None => return Ok(()),
        };

        match line.head {
            Head::Directive(Directive::Data) => {
                let values = literals(&mut line)?;
                if values.is_empty() {
                    return Err(Error::arity(Directive::Data, "at least 1", 0));
                }
                self.define_data(line_no, line.label, &values)
            }
            Head::Directive(Directive::String) => {
                let text = line.args.string()?;
                line.finish("1", 1)?;
                let mut values = text
                    .chars()
                    .map(char_literal)
                    .collect::<Result<Vec<_>, _>>()?;
                values.push(0);
                self.define_data(line_no, line.label, &values)
            }
            Head::Directive(Directive::Mat) => {
                let dims = line.args.word().unwrap_or_default();
                let (rows, cols) = parse_dims(dims)?;
                let values = literals(&mut line)?;
                let cells = rows
                    .checked_mul(cols)
                    .ok_or_else(|| Error::MalformedMatrix(dims.to_string()))?;
                if values.len() != cells {
                    return Err(Error::arity(Directive::Mat, cells, values.len()));
                }
                self.define_data(line_no, line.label, &values)
            }
            Head::Directive(Directive::Entry) => {
                self.ignore_label(line_no, &line);
                Ok(())
            }
            Head::Directive(Directive::Extern) => {
                self.ignore_label(line_no, &line);
                let name = single_label(&mut line)?;
                self.labels.insert(name, 0, Storage::External, false)
            }
            Head::Op(_) => {
                let args = operands(&mut line)?;
                let (src, dst) = encode::split(&args);
                let (ic, _) = self.advance(encode::size(src, dst), 0)?;
                if let Some(label) = line.label {
                    self.labels.insert(label, self.ic, Storage::Local, true)?;
                }
                self.ic = ic;
                Ok(())
            }
        }
    }

    fn define_data(
        &mut self,
        line_no: usize,
        label: Option<&str>,
        values: &[i32],
    ) -> Result<(), Error> {
        let words = values
            .iter()
            .map(|&value| {
                Word::data(value).ok_or_else(|| Error::overflow(value, DATA_MIN, DATA_MAX))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (_, dc) = self.advance(0, words.len())?;
        if let Some(label) = label {
            self.labels.insert(label, self.dc, Storage::Local, false)?;
        }
        self.rows.push(Row {
            line: line_no,
            segment: Segment::Data,
            offset: self.data.len(),
            len: words.len(),
        });
        self.data.extend(&words)?;
        self.dc = dc;
        Ok(())
    }

    /// Counters after `code` more instruction words and `data` more data
    /// words. Data is placed behind code, so `ic + dc` must stay addressable.
    fn advance(&self, code: u16, data: usize) -> Result<(u16, u16), Error> {
        let ic = self.ic.checked_add(code);
        let dc = u16::try_from(data).ok().and_then(|n| self.dc.checked_add(n));
        match (ic, dc) {
            (Some(ic), Some(dc)) if ic.checked_add(dc).is_some() => Ok((ic, dc)),
            _ => Err(Error::ProgramTooLarge),
        }
    }

    fn ignore_label(&mut self, line_no: usize, line: &Line) {
        if let Some(label) = line.label {
            self.diags.warn(
                line_no,
                format!("Label `{}` before `{}` is ignored", label, line.head.name()),
            );
        }
    }

    // ------------------------------------------------------------------------
    // Second pass

    fn second_line(&mut self, line_no: usize, raw: &str) -> Result<(), Error> {
        let mut line = match Line::parse(raw)? {
            Some(line) => line,
            None => return Ok(()),
        };

        match line.head {
            Head::Directive(Directive::Entry) => {
                let name = single_label(&mut line)?;
                self.entries.add_entry(name, &self.labels)
            }
            Head::Directive(_) => Ok(()),
            Head::Op(op) => {
                let args = operands(&mut line)?;
                let (src, dst) = encode::split(&args);
                let offset = self.code.len();
                let len = Encoder::new(&self.labels, &mut self.code, &mut self.externs)
                    .encode(op, src, dst)?;
                self.rows.push(Row {
                    line: line_no,
                    segment: Segment::Code,
                    offset,
                    len,
                });
                Ok(())
            }
        }
    }
}

/// Assembles one source file with a fresh [`Unit`].
pub fn assemble(source: &str) -> Result<Assembly, Vec<Diag>> {
    Unit::new().run(source)
}

// ----------------------------------------------------------------------------
// Operand helpers

fn literals(line: &mut Line) -> Result<Vec<i32>, Error> {
    let mut values = vec![];
    while let Some(word) = line.args.word() {
        values.push(parse_literal(word)?);
    }
    Ok(values)
}

fn single_label<'a>(line: &mut Line<'a>) -> Result<&'a str, Error> {
    let name = line
        .args
        .word()
        .ok_or_else(|| Error::arity(line.head.name(), 1, 0))?;
    check_label(name)?;
    line.finish("1", 1)?;
    Ok(name)
}

fn operands<'a>(line: &mut Line<'a>) -> Result<Vec<Operand<'a>>, Error> {
    let mut words = vec![];
    while let Some(word) = line.args.word() {
        words.push(word);
    }
    if words.len() > 2 {
        if let Head::Op(op) = line.head {
            return Err(Error::arity(op, op.arity(), words.len()));
        }
    }
    words.into_iter().map(Operand::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mat_count_mismatch_appends_nothing() {
        let mut unit = Unit::new();
        unit.first_line(1, "M: .mat [2][2] 1,2,3,4").unwrap();
        assert_eq!((unit.data.len(), unit.dc), (4, 4));

        let err = unit.first_line(2, "N: .mat [2][2] 1,2,3").unwrap_err();
        assert!(matches!(err, Error::ArityMismatch { found: 3, .. }));
        assert_eq!((unit.data.len(), unit.dc), (4, 4));
        assert!(unit.labels.lookup("N").is_none());
    }

    #[test]
    fn instruction_counter() {
        let mut unit = Unit::new();
        let lines = ["A: mov M[r1][r2], r3", "B: cmp #1, X", "C: rts", "D: .data 7"];
        for (idx, line) in lines.iter().enumerate() {
            unit.first_line(idx + 1, line).unwrap();
        }
        let addr = |unit: &Unit, name: &str| unit.labels.lookup(name).unwrap().address;
        assert_eq!(addr(&unit, "A"), 100);
        assert_eq!(addr(&unit, "B"), 104);
        assert_eq!(addr(&unit, "C"), 107);
        assert_eq!(addr(&unit, "D"), 0);
        assert_eq!(unit.ic, 108);
    }

    #[test]
    fn counters_stay_addressable() {
        let mut unit = Unit::new();
        unit.ic = u16::MAX - 5;
        unit.first_line(1, "A: mov M[r1][r2], M[r3][r4]").unwrap();
        assert_eq!(unit.ic, u16::MAX);

        assert!(matches!(unit.first_line(2, "B: stop"), Err(Error::ProgramTooLarge)));
        assert!(matches!(unit.first_line(3, "C: .data 1"), Err(Error::ProgramTooLarge)));
        assert!(unit.labels.lookup("B").is_none());
        assert!(unit.labels.lookup("C").is_none());
        assert_eq!((unit.ic, unit.dc, unit.data.len()), (u16::MAX, 0, 0));
    }

    #[test]
    fn string_gets_terminator() {
        let mut unit = Unit::new();
        unit.first_line(1, "S: .string \"hi\"").unwrap();
        let bits: Vec<u16> = unit.data.words().iter().map(|w| w.bits()).collect();
        assert_eq!(bits, vec!['h' as u16, 'i' as u16, 0]);
        assert!(matches!(
            unit.first_line(2, ".string \"x\" y"),
            Err(Error::ArityMismatch { found: 2, .. })
        ));
    }

    #[test]
    fn failed_lines_are_skipped_in_second_pass() {
        let diags = Unit::new().run("jmp NOWHERE, r1, r2\n").unwrap_err();
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags[0].msg, crate::msg::Msg::Error(Error::ArityMismatch { .. })));
    }
}
