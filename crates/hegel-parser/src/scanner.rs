//! On-demand tokenizer.
//!
//! The scanner produces one token per call and keeps no lookahead buffer.
//! Callers that need to look ahead snapshot the state with
//! [`Scanner::save_state`] and roll back with [`Scanner::restore_state`].
//! Keywords are scanned as identifiers; the parser decides by context.

use crate::ParseError;
use hegel_common::{Position, SourceLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Identifier,
    NumericLiteral,
    StringLiteral,
    /// `` `text` ``
    NoSubstitutionTemplate,
    /// `` `text${ ``
    TemplateHead,
    /// `}text${`
    TemplateMiddle,
    /// `` }text` ``
    TemplateTail,
    Punctuation,
    EndOfFile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: SyntaxKind,
    /// Identifier text, punctuator text, or the cooked value of a string.
    pub value: String,
    /// Source text of numeric literals.
    pub raw: String,
    pub loc: SourceLocation,
    pub preceded_by_line_break: bool,
    pub(crate) offset: usize,
}

impl Token {
    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == SyntaxKind::Punctuation && self.value == text
    }

    pub fn is_identifier(&self, text: &str) -> bool {
        self.kind == SyntaxKind::Identifier && self.value == text
    }
}

/// Position of the scanner, restorable for speculative parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerState {
    pos: usize,
    line: u32,
    column: u32,
}

/// Punctuators, longest first so that the first match is the maximal munch.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", ">>>", "<<=", ">>=", "=>", "==", "!=", "<=", ">=",
    "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "**", "<<", ">>", "&=",
    "|=", "^=", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-", "*", "/", "%",
    "&", "|", "^", "!", "~", "?", ":", "=", ".", "@",
];

pub struct Scanner {
    chars: Vec<char>,
    state: ScannerState,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Scanner {
            chars: text.chars().collect(),
            state: ScannerState {
                pos: 0,
                line: 1,
                column: 0,
            },
        }
    }

    pub const fn save_state(&self) -> ScannerState {
        self.state
    }

    pub const fn restore_state(&mut self, state: ScannerState) {
        self.state = state;
    }

    fn position(&self) -> Position {
        Position::new(self.state.line, self.state.column)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.state.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.state.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.state.pos += 1;
        if ch == '\n' {
            self.state.line += 1;
            self.state.column = 0;
        } else {
            self.state.column += 1;
        }
        Some(ch)
    }

    fn error(&self, message: impl Into<String>, start: Position) -> ParseError {
        ParseError::new(message, SourceLocation::new(start, self.position()))
    }

    /// Skip whitespace and comments, reporting whether a line break was seen.
    fn skip_trivia(&mut self) -> Result<bool, ParseError> {
        let mut line_break = false;
        while let Some(ch) = self.peek() {
            match ch {
                '\n' => {
                    line_break = true;
                    self.bump();
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek()
                        && c != '\n'
                    {
                        self.bump();
                    }
                }
                '/' if self.peek_at(1) == Some('*') => {
                    let start = self.position();
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some('\n') => line_break = true,
                            Some(_) => {}
                            None => return Err(self.error("Unterminated comment", start)),
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(line_break)
    }

    pub fn scan(&mut self) -> Result<Token, ParseError> {
        let preceded_by_line_break = self.skip_trivia()?;
        let start = self.position();
        let offset = self.state.pos;
        let token = |scanner: &Scanner, kind, value: String, raw: String| Token {
            kind,
            value,
            raw,
            loc: SourceLocation::new(start, scanner.position()),
            preceded_by_line_break,
            offset,
        };

        let Some(ch) = self.peek() else {
            return Ok(token(self, SyntaxKind::EndOfFile, String::new(), String::new()));
        };

        if is_identifier_start(ch) {
            let mut name = String::new();
            while let Some(c) = self.peek()
                && is_identifier_part(c)
            {
                name.push(c);
                self.bump();
            }
            return Ok(token(self, SyntaxKind::Identifier, name, String::new()));
        }

        if ch.is_ascii_digit() || (ch == '.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())) {
            let (value, raw) = self.scan_number(start)?;
            return Ok(token(self, SyntaxKind::NumericLiteral, value, raw));
        }

        if ch == '"' || ch == '\'' {
            let value = self.scan_string(ch, start)?;
            return Ok(token(self, SyntaxKind::StringLiteral, value, String::new()));
        }

        if ch == '`' {
            self.bump();
            let (value, head) = self.scan_template_chars(start)?;
            let kind = if head {
                SyntaxKind::TemplateHead
            } else {
                SyntaxKind::NoSubstitutionTemplate
            };
            return Ok(token(self, kind, value, String::new()));
        }

        for punct in PUNCTUATORS {
            if self.matches(punct) {
                // `a ?.5 : b` is a conditional, not optional chaining.
                if *punct == "?." && self.peek_at(2).is_some_and(|c| c.is_ascii_digit()) {
                    continue;
                }
                for _ in 0..punct.len() {
                    self.bump();
                }
                return Ok(token(
                    self,
                    SyntaxKind::Punctuation,
                    (*punct).to_string(),
                    String::new(),
                ));
            }
        }

        self.bump();
        Err(self.error(format!("Unexpected character \"{ch}\""), start))
    }

    /// Continue a template after the `}` closing a substitution.
    pub fn scan_template_continuation(&mut self, brace: &Token) -> Result<Token, ParseError> {
        let start = brace.loc.start;
        let (value, middle) = self.scan_template_chars(start)?;
        Ok(Token {
            kind: if middle {
                SyntaxKind::TemplateMiddle
            } else {
                SyntaxKind::TemplateTail
            },
            value,
            raw: String::new(),
            loc: SourceLocation::new(start, self.position()),
            preceded_by_line_break: brace.preceded_by_line_break,
            offset: brace.offset,
        })
    }

    /// Split a compound `>`-prefixed punctuator so that the first `>` can close
    /// a type argument list.
    pub fn rescan_greater_than(&mut self, token: &Token) -> Token {
        self.state = ScannerState {
            pos: token.offset + 1,
            line: token.loc.start.line,
            column: token.loc.start.column + 1,
        };
        Token {
            kind: SyntaxKind::Punctuation,
            value: ">".to_string(),
            raw: String::new(),
            loc: SourceLocation::new(token.loc.start, self.position()),
            preceded_by_line_break: token.preceded_by_line_break,
            offset: token.offset,
        }
    }

    fn matches(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn scan_number(&mut self, start: Position) -> Result<(String, String), ParseError> {
        let mut raw = String::new();
        let radix = match (self.peek(), self.peek_at(1)) {
            (Some('0'), Some('x' | 'X')) => 16,
            (Some('0'), Some('b' | 'B')) => 2,
            (Some('0'), Some('o' | 'O')) => 8,
            _ => 10,
        };

        if radix != 10 {
            raw.extend(self.bump());
            raw.extend(self.bump());
            let mut digits = String::new();
            while let Some(c) = self.peek()
                && (c.is_digit(radix) || c == '_')
            {
                raw.push(c);
                if c != '_' {
                    digits.push(c);
                }
                self.bump();
            }
            if self.peek() == Some('n') {
                raw.push('n');
                self.bump();
            }
            let value = u64::from_str_radix(&digits, radix)
                .map_err(|_| self.error("Invalid numeric literal", start))?;
            return Ok(((value as f64).to_string(), raw));
        }

        let mut digits = String::new();
        self.take_digits(&mut raw, &mut digits);
        if self.peek() == Some('.') {
            raw.push('.');
            digits.push('.');
            self.bump();
            self.take_digits(&mut raw, &mut digits);
        }
        if let Some(e @ ('e' | 'E')) = self.peek() {
            raw.push(e);
            digits.push('e');
            self.bump();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                raw.push(sign);
                digits.push(sign);
                self.bump();
            }
            self.take_digits(&mut raw, &mut digits);
        }
        if self.peek() == Some('n') {
            raw.push('n');
            self.bump();
        }
        if self.peek().is_some_and(is_identifier_start) {
            return Err(self.error("Identifier directly after number", start));
        }
        digits
            .parse::<f64>()
            .map(|_| (digits.clone(), raw))
            .map_err(|_| self.error("Invalid numeric literal", start))
    }

    fn take_digits(&mut self, raw: &mut String, digits: &mut String) {
        while let Some(c) = self.peek()
            && (c.is_ascii_digit() || c == '_')
        {
            raw.push(c);
            if c != '_' {
                digits.push(c);
            }
            self.bump();
        }
    }

    fn scan_escape(&mut self, start: Position) -> Result<Option<char>, ParseError> {
        let Some(ch) = self.bump() else {
            return Err(self.error("Unterminated string literal", start));
        };
        Ok(Some(match ch {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' => '\0',
            // Line continuation.
            '\n' => return Ok(None),
            'u' => {
                let mut hex = String::new();
                if self.peek() == Some('{') {
                    self.bump();
                    while let Some(c) = self.bump()
                        && c != '}'
                    {
                        hex.push(c);
                    }
                } else {
                    for _ in 0..4 {
                        hex.extend(self.bump());
                    }
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("Invalid Unicode escape sequence", start))?
            }
            'x' => {
                let hex: String = [self.bump(), self.bump()].into_iter().flatten().collect();
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error("Invalid hexadecimal escape sequence", start))?
            }
            other => other,
        }))
    }

    fn scan_string(&mut self, quote: char, start: Position) -> Result<String, ParseError> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(self.error("Unterminated string literal", start));
                }
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(value);
                }
                Some('\\') => {
                    self.bump();
                    value.extend(self.scan_escape(start)?);
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
    }

    /// Scan template characters up to the closing backtick or a `${`.
    /// Returns the cooked text and whether a substitution follows.
    fn scan_template_chars(&mut self, start: Position) -> Result<(String, bool), ParseError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("Unterminated template literal", start)),
                Some('`') => return Ok((value, false)),
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    return Ok((value, true));
                }
                Some('\\') => value.extend(self.scan_escape(start)?),
                Some(c) => value.push(c),
            }
        }
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch == '$' || ch == '_' || ch.is_alphabetic()
}

fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_alphanumeric() || ch == '\u{200c}' || ch == '\u{200d}'
}
