use crate::{
    error::Error,
    label::{check_label, is_valid_label},
    lexer::{Cursor, LINE_MAX},
};
use arch::{
    mode::Mode,
    op::Opcode,
    reg::Reg,
    word::{DATA_MAX, DATA_MIN, PAYLOAD_MAX, PAYLOAD_MIN},
};
use strum::{Display, EnumString};

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum Directive {
    #[strum(serialize = ".data")]
    Data,
    #[strum(serialize = ".string")]
    String,
    #[strum(serialize = ".mat")]
    Mat,
    #[strum(serialize = ".entry")]
    Entry,
    #[strum(serialize = ".extern")]
    Extern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Head {
    Directive(Directive),
    Op(Opcode),
}

impl Head {
    fn parse(word: &str) -> Result<Head, Error> {
        if let Ok(directive) = word.parse::<Directive>() {
            return Ok(Head::Directive(directive));
        }
        match Opcode::parse(word) {
            Ok(op) => Ok(Head::Op(op)),
            Err(_) => Err(Error::InvalidOperation(word.to_string())),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Head::Directive(directive) => directive.to_string(),
            Head::Op(op) => op.to_string(),
        }
    }
}

/// `[label:] head operands...`, with the operands still unread.
#[derive(Debug, Clone)]
pub struct Line<'a> {
    pub label: Option<&'a str>,
    pub head: Head,
    pub args: Cursor<'a>,
}

impl<'a> Line<'a> {
    /// `None` for blank and comment lines.
    pub fn parse(raw: &'a str) -> Result<Option<Line<'a>>, Error> {
        if raw.chars().count() > LINE_MAX {
            return Err(Error::LineTooLong(LINE_MAX));
        }
        let mut args = Cursor::new(raw);
        let first = match args.word() {
            Some(word) => word,
            None => return Ok(None),
        };
        let (label, head) = match first.strip_suffix(':') {
            Some(label) => {
                check_label(label)?;
                (Some(label), args.word().unwrap_or_default())
            }
            None => (None, first),
        };
        let head = Head::parse(head)?;
        Ok(Some(Line { label, head, args }))
    }

    /// Fails if anything is left after `consumed` operands.
    pub fn finish(&mut self, expected: &str, consumed: usize) -> Result<(), Error> {
        match self.args.remaining() {
            0 => Ok(()),
            extra => Err(Error::arity(self.head.name(), expected, consumed + extra)),
        }
    }
}

// ----------------------------------------------------------------------------
// Operand

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand<'a> {
    Immediate(i32),
    Direct(&'a str),
    Matrix(&'a str, Reg, Reg),
    Register(Reg),
}

impl<'a> Operand<'a> {
    pub fn parse(arg: &'a str) -> Result<Operand<'a>, Error> {
        if let Some(num) = arg.strip_prefix('#') {
            return parse_number(num, PAYLOAD_MIN, PAYLOAD_MAX)
                .ok_or_else(|| Error::InvalidOperand(arg.to_string()))?
                .map(Operand::Immediate);
        }
        if let Ok(reg) = Reg::parse(arg) {
            return Ok(Operand::Register(reg));
        }
        if is_valid_label(arg) {
            return Ok(Operand::Direct(arg));
        }
        if let Some(open) = arg.find('[') {
            let malformed = || Error::MalformedMatrix(arg.to_string());
            let (name, index) = arg.split_at(open);
            let (row, col) = brackets(index).ok_or_else(malformed)?;
            if !is_valid_label(name) {
                return Err(malformed());
            }
            let row = Reg::parse(row).map_err(|_| malformed())?;
            let col = Reg::parse(col).map_err(|_| malformed())?;
            return Ok(Operand::Matrix(name, row, col));
        }
        Err(Error::InvalidOperand(arg.to_string()))
    }

    pub fn mode(&self) -> Mode {
        match self {
            Operand::Immediate(_) => Mode::Immediate,
            Operand::Direct(_) => Mode::Direct,
            Operand::Matrix(..) => Mode::Matrix,
            Operand::Register(_) => Mode::Register,
        }
    }
}

// ----------------------------------------------------------------------------
// Literals

/// Optional sign followed by decimal digits, bounded to `min..=max`.
/// `None` when `s` is not written as a number at all.
fn parse_number(s: &str, min: i32, max: i32) -> Option<Result<i32, Error>> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    Some(match s.parse::<i32>() {
        Ok(value) => in_range(value, min, max),
        Err(_) => Err(Error::overflow(s, min, max)),
    })
}

fn in_range(value: i32, min: i32, max: i32) -> Result<i32, Error> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(Error::overflow(value, min, max))
    }
}

/// A value for `.data` or `.mat`.
pub fn parse_literal(s: &str) -> Result<i32, Error> {
    parse_number(s, DATA_MIN, DATA_MAX).ok_or_else(|| Error::InvalidOperand(s.to_string()))?
}

/// A character code for `.string`.
pub fn char_literal(ch: char) -> Result<i32, Error> {
    in_range(ch as i32, DATA_MIN, DATA_MAX)
}

/// `.mat` dimensions: `[rows][cols]`, both at least 1.
pub fn parse_dims(s: &str) -> Result<(usize, usize), Error> {
    let malformed = || Error::MalformedMatrix(s.to_string());
    let (rows, cols) = brackets(s).ok_or_else(malformed)?;
    let dim = |d: &str| match parse_number(d, 1, i32::MAX) {
        Some(Ok(n)) if d.chars().all(|ch| ch.is_ascii_digit()) => Ok(n as usize),
        _ => Err(malformed()),
    };
    Ok((dim(rows)?, dim(cols)?))
}

/// Splits `[a][b]` into `a` and `b`.
fn brackets(s: &str) -> Option<(&str, &str)> {
    let (a, b) = s.strip_prefix('[')?.strip_suffix(']')?.split_once("][")?;
    if a.contains(['[', ']']) || b.contains(['[', ']']) {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_with_label() {
        let line = Line::parse("MAIN: mov r3, LENGTH").unwrap().unwrap();
        assert_eq!(line.label, Some("MAIN"));
        assert_eq!(line.head, Head::Op(Opcode::MOV));

        let line = Line::parse("  .extern  W").unwrap().unwrap();
        assert_eq!(line.label, None);
        assert_eq!(line.head, Head::Directive(Directive::Extern));

        assert!(Line::parse("   ; nothing").unwrap().is_none());
        assert!(Line::parse("").unwrap().is_none());
    }

    #[test]
    fn line_errors() {
        assert!(matches!(Line::parse("1X: stop"), Err(Error::InvalidLabel(l)) if l == "1X"));
        assert!(matches!(Line::parse("X: halt"), Err(Error::InvalidOperation(o)) if o == "halt"));
        assert!(matches!(Line::parse("X:"), Err(Error::InvalidOperation(o)) if o.is_empty()));
        assert!(matches!(Line::parse(".word 3"), Err(Error::InvalidOperation(_))));
        let long = format!("stop{}", " ".repeat(LINE_MAX));
        assert!(matches!(Line::parse(&long), Err(Error::LineTooLong(_))));
    }

    #[test]
    fn finish() {
        let mut line = Line::parse(".extern A, B").unwrap().unwrap();
        line.args.word();
        let err = line.finish("1", 1).unwrap_err();
        assert!(matches!(err, Error::ArityMismatch { found: 2, .. }));
    }

    #[test]
    fn operands() {
        assert_eq!(Operand::parse("#-5").unwrap(), Operand::Immediate(-5));
        assert_eq!(Operand::parse("#+255").unwrap(), Operand::Immediate(255));
        assert_eq!(Operand::parse("r7").unwrap(), Operand::Register(Reg::R7));
        assert_eq!(Operand::parse("LOOP").unwrap(), Operand::Direct("LOOP"));
        assert_eq!(
            Operand::parse("M1[r2][r7]").unwrap(),
            Operand::Matrix("M1", Reg::R2, Reg::R7)
        );
        assert_eq!(Operand::parse("M1[r2][r7]").unwrap().mode(), Mode::Matrix);
    }

    #[test]
    fn operand_errors() {
        assert!(matches!(Operand::parse("#"), Err(Error::InvalidOperand(_))));
        assert!(matches!(Operand::parse("#1a"), Err(Error::InvalidOperand(_))));
        assert!(matches!(
            Operand::parse("#256"),
            Err(Error::NumericOverflow { value, .. }) if value == "256"
        ));
        assert!(matches!(Operand::parse("M[r8][r1]"), Err(Error::MalformedMatrix(_))));
        assert!(matches!(Operand::parse("M[r1]"), Err(Error::MalformedMatrix(_))));
        assert!(matches!(Operand::parse("M[r1][r2][r3]"), Err(Error::MalformedMatrix(_))));
        assert!(matches!(Operand::parse("[r1][r2]"), Err(Error::MalformedMatrix(_))));
        assert!(matches!(Operand::parse("a_b"), Err(Error::InvalidOperand(_))));
        assert!(matches!(Operand::parse(""), Err(Error::InvalidOperand(_))));
    }

    #[test]
    fn literals() {
        assert_eq!(parse_literal("-57").unwrap(), -57);
        assert_eq!(parse_literal("+17").unwrap(), 17);
        assert!(matches!(parse_literal("1024"), Err(Error::NumericOverflow { .. })));
        assert!(matches!(
            parse_literal("99999999999"),
            Err(Error::NumericOverflow { value, .. }) if value == "99999999999"
        ));
        assert!(matches!(
            Operand::parse("#-99999999999"),
            Err(Error::NumericOverflow { value, .. }) if value == "-99999999999"
        ));
        assert!(matches!(parse_literal("-"), Err(Error::InvalidOperand(_))));
        assert!(matches!(parse_literal("3.5"), Err(Error::InvalidOperand(_))));
        assert!(matches!(char_literal('€'), Err(Error::NumericOverflow { .. })));
    }

    #[test]
    fn dims() {
        assert_eq!(parse_dims("[2][3]").unwrap(), (2, 3));
        assert!(parse_dims("[0][3]").is_err());
        assert!(parse_dims("[-1][3]").is_err());
        assert!(parse_dims("[2]").is_err());
        assert!(parse_dims("[a][3]").is_err());
    }
}
