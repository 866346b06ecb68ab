//! Rewrites the C# spellings Rust's lexer rejects before the source is
//! tokenized.
//!
//! Verbatim, raw and interpolated strings, strings using C#-only escapes and
//! character literals are replaced by plain string literals. Block comments
//! and the free text of `#region`, `#error` and similar directives are
//! blanked. Every newline is kept, so spans still point at the right line.

/// Directives whose remainder is free text.
const TEXT_DIRECTIVES: &[&str] = &["region", "endregion", "error", "warning"];

struct Scanner<'a> {
    chars: &'a [char],
    pos: usize,
    out: String,
}

impl Scanner<'_> {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars().enumerate().all(|(i, c)| self.peek(i) == Some(c))
    }

    fn copy(&mut self, count: usize) {
        for _ in 0..count {
            if let Some(c) = self.peek(0) {
                self.out.push(c);
                self.pos += 1;
            }
        }
    }

    /// Keeps only the newlines of `chars[start..self.pos]`.
    fn blank_since(&mut self, start: usize) {
        let newlines = self.chars[start..self.pos].iter().filter(|c| **c == '\n').count();
        self.out.extend(std::iter::repeat_n('\n', newlines));
    }

    /// Writes `chars[start..end]` as the body of a Rust string literal.
    fn string_since(&mut self, start: usize, end: usize) {
        self.out.push('"');
        for &c in &self.chars[start..end] {
            match c {
                '\\' => self.out.push_str("\\\\"),
                '"' => self.out.push_str("\\\""),
                '\r' => {}
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    fn at_line_start(&self) -> bool {
        self.chars[..self.pos]
            .iter()
            .rev()
            .take_while(|c| **c != '\n')
            .all(|c| c.is_whitespace())
    }

    fn run(&mut self) {
        while let Some(c) = self.peek(0) {
            match c {
                '/' if self.peek(1) == Some('/') => self.line_comment(),
                '/' if self.peek(1) == Some('*') => self.block_comment(),
                '#' if self.at_line_start() => self.directive(),
                '\'' => self.char_literal(),
                '"' | '$' | '@' => {
                    if !self.string_literal() {
                        self.copy(1);
                    }
                }
                _ => self.copy(1),
            }
        }
    }

    fn line_comment(&mut self) {
        while self.peek(0).is_some_and(|c| c != '\n') {
            self.copy(1);
        }
    }

    /// C# block comments do not nest, Rust's do.
    fn block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        while self.peek(0).is_some() && !self.starts_with("*/") {
            self.pos += 1;
        }
        self.pos = (self.pos + 2).min(self.chars.len());
        self.out.push_str("/*");
        self.blank_since(start);
        self.out.push_str("*/");
    }

    fn directive(&mut self) {
        self.copy(1);
        while self.peek(0).is_some_and(|c| c == ' ' || c == '\t') {
            self.copy(1);
        }
        let word_start = self.pos;
        while self.peek(0).is_some_and(char::is_alphanumeric) {
            self.copy(1);
        }
        let word: String = self.chars[word_start..self.pos].iter().collect();
        if TEXT_DIRECTIVES.contains(&word.as_str()) {
            while self.peek(0).is_some_and(|c| c != '\n') {
                self.pos += 1;
            }
        }
    }

    fn char_literal(&mut self) {
        self.pos += 1;
        if self.peek(0) == Some('\\') {
            self.pos += 2;
        }
        while self.peek(0).is_some_and(|c| c != '\'' && c != '\n') {
            self.pos += 1;
        }
        if self.peek(0) == Some('\'') {
            self.pos += 1;
        }
        self.out.push_str("' '");
    }

    /// Consumes a string literal starting here, if there is one.
    fn string_literal(&mut self) -> bool {
        let start = self.pos;
        let mut dollars = 0;
        let mut verbatim = false;
        while let Some(c) = self.peek(0) {
            match c {
                '$' => dollars += 1,
                '@' if !verbatim => verbatim = true,
                _ => break,
            }
            self.pos += 1;
        }
        if self.peek(0) != Some('"') {
            self.pos = start;
            return false;
        }

        let quotes = (0..).take_while(|i| self.peek(*i) == Some('"')).count();
        if quotes >= 3 {
            self.pos += quotes;
            let body = self.pos;
            let closing = "\"".repeat(quotes);
            while self.peek(0).is_some() && !self.starts_with(&closing) {
                self.pos += 1;
            }
            let end = self.pos;
            self.pos = (self.pos + quotes).min(self.chars.len());
            self.string_since(body, end);
            return true;
        }

        self.pos += 1;
        let body = self.pos;
        let mut plain = dollars == 0 && !verbatim;
        while let Some(c) = self.peek(0) {
            match c {
                '"' if verbatim && self.peek(1) == Some('"') => self.pos += 2,
                '"' => break,
                '\n' if !verbatim => break,
                '\\' if !verbatim => {
                    plain &= self.peek(1).is_some_and(is_rust_escape)
                        && (self.peek(1) != Some('x') || self.hex_escape_is_ascii());
                    self.pos += 2;
                }
                '{' if dollars > 0 && self.peek(1) == Some('{') => self.pos += 2,
                '{' if dollars > 0 => self.hole(),
                _ => self.pos += 1,
            }
        }
        let end = self.pos.min(self.chars.len());
        if self.peek(0) == Some('"') {
            self.pos += 1;
        }

        if plain {
            self.out.extend(&self.chars[start..self.pos]);
        } else {
            self.string_since(body, end);
        }
        true
    }

    /// `\x41` is accepted by Rust only as exactly two digits up to `7F`.
    fn hex_escape_is_ascii(&self) -> bool {
        match (self.peek(2), self.peek(3), self.peek(4)) {
            (Some(high), Some(low), next) => {
                matches!(high, '0'..='7')
                    && low.is_ascii_hexdigit()
                    && !next.is_some_and(|c| c.is_ascii_hexdigit())
            }
            _ => false,
        }
    }

    /// An interpolation hole, which may itself contain string literals.
    fn hole(&mut self) {
        let mut depth = 0usize;
        while let Some(c) = self.peek(0) {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return;
                    }
                }
                '"' | '$' | '@' => {
                    let mark = self.out.len();
                    if self.string_literal() {
                        self.out.truncate(mark);
                        continue;
                    }
                }
                '\'' => {
                    let mark = self.out.len();
                    self.char_literal();
                    self.out.truncate(mark);
                    continue;
                }
                _ => {}
            }
            self.pos += 1;
        }
    }
}

fn is_rust_escape(c: char) -> bool {
    matches!(c, 'n' | 'r' | 't' | '\\' | '0' | '\'' | '"' | 'x')
}

/// The source with every literal Rust cannot lex replaced.
pub(crate) fn mask(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut scanner = Scanner {
        chars: &chars,
        pos: 0,
        out: String::with_capacity(source.len()),
    };
    scanner.run();
    scanner.out
}
