//! Parser state - token cursor, expectations and speculative parsing.

use crate::ParseError;
use crate::scanner::{Scanner, ScannerState, SyntaxKind, Token};
use hegel_ast::Identifier;
use hegel_common::limits::MAX_PARSER_RECURSION_DEPTH;
use hegel_common::{Position, SourceLocation};

pub(crate) type ParseResult<T> = Result<T, ParseError>;

/// Everything needed to roll the parser back to an earlier token.
#[derive(Clone)]
pub(crate) struct ParserSnapshot {
    scanner: ScannerState,
    current: Token,
    previous_end: Position,
    depth: u32,
    no_in: bool,
}

pub(crate) struct ParserState {
    pub(crate) scanner: Scanner,
    pub(crate) current: Token,
    /// End of the last consumed token.
    pub(crate) previous_end: Position,
    depth: u32,
    /// Set while parsing a `for` initializer, where `in` starts a for-in.
    pub(crate) no_in: bool,
}

impl ParserState {
    pub(crate) fn new(text: &str) -> ParseResult<Self> {
        let mut scanner = Scanner::new(text);
        let current = scanner.scan()?;
        Ok(ParserState {
            scanner,
            current,
            previous_end: Position::new(1, 0),
            depth: 0,
            no_in: false,
        })
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    /// Consume the current token and return it.
    pub(crate) fn next_token(&mut self) -> ParseResult<Token> {
        let next = self.scanner.scan()?;
        let consumed = std::mem::replace(&mut self.current, next);
        self.previous_end = consumed.loc.end;
        Ok(consumed)
    }

    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn is_punct(&self, text: &str) -> bool {
        self.current.is_punct(text)
    }

    pub(crate) fn is_keyword(&self, text: &str) -> bool {
        self.current.is_identifier(text)
    }

    pub(crate) fn eat_punct(&mut self, text: &str) -> ParseResult<bool> {
        if self.is_punct(text) {
            self.next_token()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub(crate) fn eat_keyword(&mut self, text: &str) -> ParseResult<bool> {
        if self.is_keyword(text) {
            self.next_token()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub(crate) fn parse_expected(&mut self, text: &str) -> ParseResult<Token> {
        if self.is_punct(text) {
            return self.next_token();
        }
        Err(self.error_expected(text))
    }

    pub(crate) fn parse_expected_keyword(&mut self, text: &str) -> ParseResult<Token> {
        if self.is_keyword(text) {
            return self.next_token();
        }
        Err(self.error_expected(text))
    }

    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Identifier> {
        if !self.is_token(SyntaxKind::Identifier) {
            return Err(self.error_unexpected());
        }
        let token = self.next_token()?;
        Ok(Identifier::new(token.value, token.loc))
    }

    /// Property keys accept identifiers, keywords, strings and numbers.
    pub(crate) fn parse_property_key(&mut self) -> ParseResult<Identifier> {
        match self.current.kind {
            SyntaxKind::Identifier | SyntaxKind::StringLiteral => {
                let token = self.next_token()?;
                Ok(Identifier::new(token.value, token.loc))
            }
            SyntaxKind::NumericLiteral => {
                let token = self.next_token()?;
                Ok(Identifier::new(token.raw, token.loc))
            }
            _ => Err(self.error_unexpected()),
        }
    }

    /// Statement terminator with automatic semicolon insertion.
    pub(crate) fn consume_semicolon(&mut self) -> ParseResult<()> {
        if self.eat_punct(";")? {
            return Ok(());
        }
        if self.is_punct("}")
            || self.is_token(SyntaxKind::EndOfFile)
            || self.current.preceded_by_line_break
        {
            return Ok(());
        }
        Err(self.error_expected(";"))
    }

    /// Close a type argument or parameter list, splitting `>>` and friends.
    pub(crate) fn parse_expected_greater_than(&mut self) -> ParseResult<()> {
        if self.current.kind == SyntaxKind::Punctuation
            && self.current.value.len() > 1
            && self.current.value.starts_with('>')
        {
            self.current = self.scanner.rescan_greater_than(&self.current);
        }
        self.parse_expected(">").map(|_| ())
    }

    pub(crate) const fn start(&self) -> Position {
        self.current.loc.start
    }

    /// Location from `start` to the end of the last consumed token.
    pub(crate) const fn finish(&self, start: Position) -> SourceLocation {
        SourceLocation::new(start, self.previous_end)
    }

    // =========================================================================
    // Speculation
    // =========================================================================

    pub(crate) fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            scanner: self.scanner.save_state(),
            current: self.current.clone(),
            previous_end: self.previous_end,
            depth: self.depth,
            no_in: self.no_in,
        }
    }

    pub(crate) fn rewind(&mut self, snapshot: ParserSnapshot) {
        self.scanner.restore_state(snapshot.scanner);
        self.current = snapshot.current;
        self.previous_end = snapshot.previous_end;
        self.depth = snapshot.depth;
        self.no_in = snapshot.no_in;
    }

    /// Run `f`, always rolling back afterwards.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.snapshot();
        let result = f(self);
        self.rewind(snapshot);
        result
    }

    /// Run `f`, rolling back if it fails.
    pub(crate) fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> Option<T> {
        let snapshot = self.snapshot();
        match f(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.rewind(snapshot);
                None
            }
        }
    }

    /// The token after the current one.
    pub(crate) fn peek_token(&mut self) -> Option<Token> {
        self.look_ahead(|p| p.next_token().ok().map(|_| p.current.clone()))
    }

    // =========================================================================
    // Recursion guard
    // =========================================================================

    pub(crate) fn enter_recursion(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_PARSER_RECURSION_DEPTH {
            return Err(ParseError::new(
                "Maximum nesting depth exceeded",
                self.current.loc,
            ));
        }
        Ok(())
    }

    pub(crate) const fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // =========================================================================
    // Errors
    // =========================================================================

    pub(crate) fn error_unexpected(&self) -> ParseError {
        if self.is_token(SyntaxKind::EndOfFile) {
            return ParseError::new("Unexpected end of input", self.current.loc);
        }
        ParseError::new(
            format!("Unexpected token \"{}\"", self.current_text()),
            self.current.loc,
        )
    }

    pub(crate) fn error_expected(&self, expected: &str) -> ParseError {
        ParseError::new(
            format!(
                "Unexpected token \"{}\", expected \"{expected}\"",
                self.current_text()
            ),
            self.current.loc,
        )
    }

    fn current_text(&self) -> &str {
        match self.current.kind {
            SyntaxKind::NumericLiteral => &self.current.raw,
            SyntaxKind::EndOfFile => "end of input",
            _ => &self.current.value,
        }
    }

    /// Skip a construct that is not modelled, up to the end of its statement.
    /// Brackets are kept balanced. With `block_body`, the `}` closing the
    /// first top-level brace group also ends the statement.
    pub(crate) fn skip_statement(&mut self, block_body: bool) -> ParseResult<()> {
        let mut depth = 0usize;
        let mut first = true;
        loop {
            if self.is_token(SyntaxKind::EndOfFile) {
                return Ok(());
            }
            if depth == 0 && !first {
                if self.eat_punct(";")? {
                    return Ok(());
                }
                if self.is_punct("}") || self.current.preceded_by_line_break {
                    return Ok(());
                }
            }
            first = false;
            if self.is_punct("{") || self.is_punct("(") || self.is_punct("[") {
                depth += 1;
            } else if self.is_punct("}") || self.is_punct(")") || self.is_punct("]") {
                let closes_block = self.is_punct("}");
                depth = depth.saturating_sub(1);
                if block_body && closes_block && depth == 0 {
                    self.next_token()?;
                    return Ok(());
                }
            } else if self.is_token(SyntaxKind::TemplateHead) {
                self.parse_template_literal()?;
                continue;
            }
            self.next_token()?;
        }
    }

    /// Skip a balanced bracket group starting at the current opening token.
    pub(crate) fn skip_balanced(&mut self) -> ParseResult<()> {
        let mut depth = 0usize;
        loop {
            if self.is_token(SyntaxKind::EndOfFile) {
                return Err(self.error_unexpected());
            }
            if self.is_punct("{") || self.is_punct("(") || self.is_punct("[") {
                depth += 1;
            } else if self.is_punct("}") || self.is_punct(")") || self.is_punct("]") {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    self.next_token()?;
                    return Ok(());
                }
            } else if self.is_token(SyntaxKind::TemplateHead) {
                self.parse_template_literal()?;
                continue;
            }
            self.next_token()?;
        }
    }
}
