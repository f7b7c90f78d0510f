use crate::error::Error;
use color_print::cprintln;

#[derive(Debug)]
pub enum Msg {
    Error(Error),
    Warn(String),
}

/// A message tied to a 1-based source line.
#[derive(Debug)]
pub struct Diag {
    pub line: usize,
    pub msg: Msg,
}

impl Diag {
    pub fn is_error(&self) -> bool {
        matches!(self.msg, Msg::Error(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(&self.msg, Msg::Error(err) if err.is_fatal())
    }

    pub fn print(&self, file: &str, raw: &str) {
        match &self.msg {
            Msg::Error(err) => cprintln!("<red,bold>error</>: {}", err),
            Msg::Warn(msg) => cprintln!("<yellow,bold>warn</>: {}", msg),
        }
        cprintln!("     <blue>--></> <underline>{}:{}</>", file, self.line);
        cprintln!("      <blue>|</>");
        cprintln!(" <blue>{:>4} |</> {}", self.line, raw);
        cprintln!("      <blue>|</>");
    }
}

/// Collects messages while a unit is assembled. Nothing is printed here.
#[derive(Debug, Default)]
pub struct Diagnostics {
    diags: Vec<Diag>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics { diags: vec![] }
    }

    pub fn error(&mut self, line: usize, err: Error) {
        self.diags.push(Diag {
            line,
            msg: Msg::Error(err),
        });
    }

    pub fn warn(&mut self, line: usize, msg: String) {
        self.diags.push(Diag {
            line,
            msg: Msg::Warn(msg),
        });
    }

    pub fn has_error(&self) -> bool {
        self.diags.iter().any(Diag::is_error)
    }

    pub fn into_vec(self) -> Vec<Diag> {
        self.diags
    }
}

pub fn dump(diags: &[Diag], file: &str, source: &str) {
    let lines: Vec<&str> = source.lines().collect();
    for diag in diags {
        let raw = lines.get(diag.line.wrapping_sub(1)).copied().unwrap_or("");
        diag.print(file, raw);
    }
}
