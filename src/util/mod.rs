//! Debug-tracing support shared by every pipeline stage.
mod logger;

/// Debugging verbosity assigned to a pipeline stage.
///
/// Mirrors the level ordering the lexeme/production utilities of a combinator-style parser
/// would use: higher variants are strictly more verbose than lower ones, and a stage only
/// prints a given kind of trace line once the configured level's [Log::order] is at least
/// that of the message's own level.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Log {
    None,
    Default,
    Success,
    Result,
    Verbose,
}
