use crate::error::Error;

/// Maximum number of payload characters on a source line.
pub const LINE_MAX: usize = 80;

fn is_blank(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

fn is_delim(ch: char) -> bool {
    is_blank(ch) || ch == ',' || ch == ':' || ch == ';'
}

/// Hands out the tokens of one source line, left to right.
///
/// Tokens are separated by blanks, `,` and `:`. A token cut by `:` keeps the
/// colon so the caller can tell a label apart. A single comma after a token is
/// swallowed. `;` ends the line.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(line: &'a str) -> Self {
        Cursor { line, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_blank(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start_matches(is_blank).len();
    }

    /// True once nothing but blanks or a comment is left.
    pub fn at_end(&mut self) -> bool {
        self.skip_blank();
        matches!(self.peek(), None | Some(';'))
    }

    /// Next token. `Some("")` marks a stray comma.
    pub fn word(&mut self) -> Option<&'a str> {
        if self.at_end() {
            return None;
        }
        let start = self.pos;
        let mut end = start + self.rest().find(is_delim).unwrap_or(self.rest().len());
        self.pos = end;
        match self.peek() {
            Some(':') => {
                self.pos += 1;
                end += 1;
            }
            Some(',') => self.pos += 1,
            _ => {
                self.skip_blank();
                if self.peek() == Some(',') {
                    self.pos += 1;
                }
            }
        }
        Some(&self.line[start..end])
    }

    /// Quoted text for `.string`, without the quotes.
    pub fn string(&mut self) -> Result<&'a str, Error> {
        self.skip_blank();
        let body = self.rest().strip_prefix('"').ok_or(Error::MalformedString)?;
        let end = body.find('"').ok_or(Error::MalformedString)?;
        self.pos += end + 2;
        Ok(&body[..end])
    }

    /// Counts the tokens left on the line without consuming them.
    pub fn remaining(&self) -> usize {
        let mut ahead = self.clone();
        let mut count = 0;
        while ahead.word().is_some() {
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<&str> {
        let mut cursor = Cursor::new(line);
        let mut words = vec![];
        while let Some(word) = cursor.word() {
            words.push(word);
        }
        words
    }

    #[test]
    fn split() {
        assert_eq!(words("LOOP: add r1, r2"), vec!["LOOP:", "add", "r1", "r2"]);
        assert_eq!(words("\tmov  #-5 ,M1[r2][r7]"), vec!["mov", "#-5", "M1[r2][r7]"]);
        assert_eq!(words(".data 7,-57,+17 , 9"), vec![".data", "7", "-57", "+17", "9"]);
        assert_eq!(words("stop ; halt here"), vec!["stop"]);
        assert_eq!(words("A:.data 1"), vec!["A:", ".data", "1"]);
    }

    #[test]
    fn blank_and_comment() {
        assert!(words("").is_empty());
        assert!(words("   \t ").is_empty());
        assert!(words("; comment, with: delimiters").is_empty());
    }

    #[test]
    fn stray_comma() {
        assert_eq!(words(".data 1,,2"), vec![".data", "1", "", "2"]);
    }

    #[test]
    fn string() {
        let mut cursor = Cursor::new(".string \"ab, c\" ");
        assert_eq!(cursor.word(), Some(".string"));
        assert_eq!(cursor.string().unwrap(), "ab, c");
        assert!(cursor.at_end());

        let mut cursor = Cursor::new("\"\"");
        assert_eq!(cursor.string().unwrap(), "");

        assert!(matches!(Cursor::new("\"abc").string(), Err(Error::MalformedString)));
        assert!(matches!(Cursor::new("abc\"").string(), Err(Error::MalformedString)));
    }

    #[test]
    fn remaining() {
        let mut cursor = Cursor::new("rts r1, r2");
        cursor.word();
        assert_eq!(cursor.remaining(), 2);
        assert_eq!(cursor.word(), Some("r1"));
    }
}
