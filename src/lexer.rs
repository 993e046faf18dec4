use crate::util::Log;
use crate::{CompileError, Token, TokenKind};

impl<'p> crate::Lexer<'p> {
    /// Escaped characters that keep their literal meaning behind a backslash.
    const ESCAPED_LITERALS: &'static [u8] = b"()[]+-*?^";

    pub fn new(input: &'p [u8]) -> Self {
        Self::new_with_log(input, Log::None)
    }

    pub fn new_with_log(input: &'p [u8], log: Log) -> Self {
        Self {
            input,
            pos: 0,
            current: Token::eof(),
            previous: Token::eof(),
            pushback: Vec::new(),
            log,
        }
    }

    /// Push a token back; the next [Lexer::nextsym] returns it before reading further input.
    pub fn unget(&mut self, token: Token) {
        self.pushback.push(token);
    }

    /// Advance and return the next token, recording the previously current token.
    pub fn nextsym(&mut self) -> Result<Token, CompileError> {
        self.previous = self.current;
        let token = if let Some(t) = self.pushback.pop() {
            t
        } else {
            self.read_token()?
        };
        self.current = token;
        self.log.log_token("lexer", self.pos, token);
        Ok(token)
    }

    pub fn current(&self) -> Token {
        self.current
    }

    pub fn previous(&self) -> Token {
        self.previous
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    fn byte_at(&self, i: usize) -> u8 {
        self.input.get(i).copied().unwrap_or(0)
    }

    fn read_token(&mut self) -> Result<Token, CompileError> {
        if self.pos >= self.input.len() {
            return Ok(Token::eof());
        }
        let c = self.byte_at(self.pos);
        if c == 0 {
            return Ok(Token::eof());
        }
        if c == b'\\' {
            return self.read_escape();
        }
        let kind = match c {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'?' => TokenKind::Question,
            b'^' => TokenKind::Caret,
            b'|' => TokenKind::Pipe,
            b'.' => TokenKind::Dot,
            _ => TokenKind::CharSym,
        };
        self.pos += 1;
        Ok(Token::new(kind, c))
    }

    fn read_escape(&mut self) -> Result<Token, CompileError> {
        let escape_at = self.pos;
        if self.pos + 1 >= self.input.len() {
            return Err(CompileError::DanglingEscape { pointer: escape_at });
        }
        let next = self.byte_at(self.pos + 1);
        self.pos += 2;
        if Self::ESCAPED_LITERALS.contains(&next) {
            Ok(Token::new(TokenKind::CharSym, next))
        } else if next == b'n' {
            Ok(Token::new(TokenKind::CharSym, b'\n'))
        } else {
            Ok(Token::new(TokenKind::Special, next))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexer;

    fn kinds(pattern: &[u8]) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(pattern);
        let mut out = Vec::new();
        loop {
            let t = lexer.nextsym().unwrap();
            out.push(t.kind);
            if t.kind == TokenKind::Eof {
                break;
            }
        }
        out
    }

    #[test]
    fn punctuation_is_dispatched_to_its_own_kind() {
        assert_eq!(
            kinds(b"(a|b)*"),
            vec![
                TokenKind::LParen,
                TokenKind::CharSym,
                TokenKind::Pipe,
                TokenKind::CharSym,
                TokenKind::RParen,
                TokenKind::Star,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn eof_latches() {
        let mut lexer = Lexer::new(b"a");
        assert_eq!(lexer.nextsym().unwrap().kind, TokenKind::CharSym);
        assert_eq!(lexer.nextsym().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.nextsym().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn escaped_metacharacter_is_a_literal_char_sym() {
        let mut lexer = Lexer::new(br"\+\n\w");
        let plus = lexer.nextsym().unwrap();
        assert_eq!(plus, Token::new(TokenKind::CharSym, b'+'));
        let newline = lexer.nextsym().unwrap();
        assert_eq!(newline, Token::new(TokenKind::CharSym, b'\n'));
        let special = lexer.nextsym().unwrap();
        assert_eq!(special, Token::new(TokenKind::Special, b'w'));
    }

    #[test]
    fn dangling_escape_is_an_error() {
        let mut lexer = Lexer::new(br"a\");
        lexer.nextsym().unwrap();
        assert_eq!(
            lexer.nextsym(),
            Err(CompileError::DanglingEscape { pointer: 1 })
        );
    }

    #[test]
    fn unget_replays_before_reading_further_input() {
        let mut lexer = Lexer::new(b"ab");
        let a = lexer.nextsym().unwrap();
        lexer.unget(a);
        assert_eq!(lexer.nextsym().unwrap(), a);
        assert_eq!(lexer.nextsym().unwrap().value, b'b');
    }
}
