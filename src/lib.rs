//! A regular-expression engine built on the Thompson/Pike bytecode virtual-machine model.
//!
//! A textual pattern is compiled into a linear program of small instructions; an interpreter
//! then executes that program over a subject byte string by simulating the equivalent
//! nondeterministic finite automaton in lockstep, which guarantees linear-time matching
//! regardless of backtracking pathologies while still supporting capturing groups.
//!
//! # Pipeline
//!
//! ```text
//! pattern bytes -> Lexer -> Parser -> PTree -> CodeGen -> Program -> Vm -> match/no match
//! ```
//!
//! - [Lexer] tokenizes the pattern byte-by-byte with one token of pushback.
//! - [Parser] recursive-descends over the token stream into a [PTree].
//! - the code generator lowers the tree into a flat [Program] of [Instruction]s.
//! - the VM executes the program against a subject, reporting a match end index and captures.
//!
//! # Example
//!
//! ```
//! use pike_regex::compile;
//!
//! let program = compile(b"(a+)(b+)").unwrap();
//! let result = program.execute(b"aabb").unwrap();
//! assert_eq!(result.end, 4);
//! assert_eq!(result.group(1), Some((0, 2)));
//! assert_eq!(result.group(2), Some((2, 4)));
//! ```
//!
//! # Non-goals
//!
//! Unicode beyond single-byte characters, `^`/`$` anchors, backreferences, lookaround,
//! bounded repetition (`{n,m}`), and streaming subjects are all out of scope.
mod codegen;
mod error;
mod lexer;
mod parser;
mod program_io;
pub mod util;
mod vm;

use std::fmt::{Debug, Display, Formatter};

pub use error::{CompileError, ProgramIoError};
pub use program_io::{read_program, write_program};
pub use util::Log;

/// A terminal kind produced by the [Lexer].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    CharSym,
    Special,
    Eof,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Plus,
    Minus,
    Star,
    Question,
    Caret,
    Pipe,
    Dot,
}

/// A single lexer token: a terminal kind plus its byte payload.
///
/// The payload is the literal byte for `CharSym`/`Special`, the meta-character itself
/// for punctuation, and the null byte for `Eof`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub value: u8,
}

impl Token {
    pub fn new(kind: TokenKind, value: u8) -> Self {
        Self { kind, value }
    }
    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, 0)
    }
}

/// Byte stream to token stream with one-token lookahead and one-token pushback.
///
/// Created at compile entry, discarded once parsing completes. Once [Lexer::nextsym] returns
/// `Eof`, every subsequent call returns `Eof` again without advancing the input pointer.
pub struct Lexer<'p> {
    pub(crate) input: &'p [u8],
    pub(crate) pos: usize,
    pub(crate) current: Token,
    pub(crate) previous: Token,
    pub(crate) pushback: Vec<Token>,
    pub(crate) log: Log,
}

/// Recursive-descent parser driving a [Lexer] to build a [PTree].
///
/// Constructed once per [compile] call and discarded once code generation completes; the
/// parse tree it produces is exclusively owned by the caller until code generation consumes it.
pub struct Parser<'p> {
    pub(crate) lexer: Lexer<'p>,
}

/// The non-terminal kind a [PTree] node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonTerminal {
    Term,
    Expr,
    Regex,
    Sub,
    Class,
}

/// The exact grammar production a [PTree] node was built from.
///
/// Carried alongside the non-terminal kind and child count so that code generation can
/// discriminate shapes that share a child count (e.g. a parenthesized group and a positive
/// character class both have three children) without guessing from context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    /// Terminal leaf: one of `char`, `.`, `-`, `^`, or `special`.
    TermLiteral,
    /// `'(' REGEX ')'`.
    TermGroup,
    /// `'[' CLASS ']'`.
    TermClass,
    /// `'[' '^' CLASS ']'`.
    TermNegClass,
    /// Bare `TERM`.
    ExprBare,
    /// `TERM ('+' | '*' | '?')`, greedy.
    ExprGreedy,
    /// `TERM ('+' | '*' | '?') '?'`, non-greedy.
    ExprLazy,
    /// Single `EXPR`.
    SubOne,
    /// `EXPR SUB`.
    SubMany,
    /// Single `SUB`.
    RegexOne,
    /// `SUB '|' REGEX`.
    RegexAlt,
    /// `CCHAR '-' CCHAR`, with or without a further `CLASS` tail.
    ClassRange,
    /// Single `CCHAR`, with or without a further `CLASS` tail.
    ClassChar,
    /// A lone `-` ending the class.
    ClassDash,
}

/// A node of the parse tree built by [Parser].
///
/// A node owns its children outright: there are no shared or back pointers, and the tree
/// cannot contain cycles. Terminal nodes (`children.is_empty()`) carry the underlying
/// [Token]; non-terminal nodes carry none and instead derive their meaning from their
/// children. Maximum fanout is four (the negated character class production).
#[derive(Debug, Clone)]
pub struct PTree {
    pub kind: NonTerminal,
    pub production: Production,
    pub token: Option<Token>,
    pub children: Vec<PTree>,
}

impl PTree {
    pub(crate) fn terminal(kind: NonTerminal, production: Production, token: Token) -> Self {
        Self {
            kind,
            production,
            token: Some(token),
            children: Vec::new(),
        }
    }
    pub(crate) fn node(kind: NonTerminal, production: Production, children: Vec<PTree>) -> Self {
        Self {
            kind,
            production,
            token: None,
            children,
        }
    }
}

/// A bytecode opcode executed by the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Char,
    Any,
    Range,
    NRange,
    Jump,
    Split,
    Save,
    Match,
}

/// A single bytecode instruction.
///
/// `c` is the literal byte operand for `Char`. `s` is the capture-slot index for `Save`, and
/// is reused as the range-pair count for `Range`/`NRange`. `x`/`y` are jump targets for
/// `Jump`/`Split`; for `Range`/`NRange`, `x` is instead the starting offset of the
/// instruction's byte-range pairs within [Program::ranges].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Opcode,
    pub c: u8,
    pub s: usize,
    pub x: usize,
    pub y: usize,
}

impl Instruction {
    pub(crate) fn new(op: Opcode) -> Self {
        Self {
            op,
            c: 0,
            s: 0,
            x: 0,
            y: 0,
        }
    }
}

/// A compiled program: a flat instruction array plus the backing storage for character-class
/// range pairs. Addresses in `x`/`y` are stable array indices once compilation completes.
#[derive(Debug, Clone)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub ranges: Vec<(u8, u8)>,
    pub slot_count: usize,
}

/// The capture slots produced by a successful match.
///
/// Slots are indexed `2k`/`2k+1` for capturing group `k` (groups are numbered from 1 in
/// left-to-right order of their opening parenthesis). A slot pair for a group that never
/// participated in the match is `None` rather than a zero-filled sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures(pub(crate) Vec<Option<usize>>);

/// The result of a successful VM execution: the matched prefix's end index and its
/// capture slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub end: usize,
    pub captures: Captures,
}

/// A live NFA state during VM execution: a program counter plus its capture array.
#[derive(Debug, Clone)]
pub(crate) struct Thread {
    pub pc: usize,
    pub captures: Captures,
}

/// Compile a pattern into a [Program].
///
/// This constructs a [Lexer], drives [Parser] to obtain a [PTree], hands the tree to
/// the code generator, and discards the tree once the program has been produced.
pub fn compile(pattern: &[u8]) -> Result<Program, CompileError> {
    compile_with_log(pattern, Log::None)
}

/// Same as [compile], but traces tokens and parse-tree productions through [util::Log]
/// at the given verbosity (`#[cfg(debug_assertions)]` only; a no-op in release builds).
pub fn compile_with_log(pattern: &[u8], log: Log) -> Result<Program, CompileError> {
    let lexer = lexer::Lexer::new_with_log(pattern, log);
    let mut parser = parser::Parser::new(lexer)?;
    let tree = parser.parse_regex()?;
    parser.expect_eof()?;
    codegen::CodeGen::generate(&tree)
}

impl Program {
    /// Execute this program against `subject`, returning the match end index and captures,
    /// or `None` if the subject does not match the pattern anchored at position 0.
    pub fn execute(&self, subject: &[u8]) -> Option<MatchOutcome> {
        self.execute_with_log(subject, Log::None)
    }

    /// Same as [Program::execute], but traces VM thread steps through [util::Log] at the
    /// given verbosity (`#[cfg(debug_assertions)]` only; a no-op in release builds).
    pub fn execute_with_log(&self, subject: &[u8], log: Log) -> Option<MatchOutcome> {
        vm::Vm::run_with_log(self, subject, log)
    }
}

impl Captures {
    pub fn group(&self, k: usize) -> Option<(usize, usize)> {
        let start = self.0.get(2 * k).copied().flatten();
        let end = self.0.get(2 * k + 1).copied().flatten();
        match (start, end) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        }
    }
    pub fn len(&self) -> usize {
        self.0.len() / 2
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl MatchOutcome {
    pub fn group(&self, k: usize) -> Option<(usize, usize)> {
        self.captures.group(k)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}
