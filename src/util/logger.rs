use super::Log;

impl Log {
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default => 1,
            Log::Success => 2,
            Log::Result => 3,
            Log::Verbose => 4,
        }
    }

    /// Trace a token produced by the lexer, at [Log::Verbose].
    pub fn log_token(&self, stage: &str, pointer: usize, token: impl std::fmt::Debug) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Verbose.order() {
            println!("[{stage}] token {token:?} at byte {pointer}");
        }
    }

    /// Trace a completed parse-tree production, at [Log::Success].
    pub fn log_production(&self, stage: &str, production: impl std::fmt::Debug) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Success.order() {
            println!("[{stage}] reduced {production:?}");
        }
    }

    /// Trace a VM thread step, at [Log::Verbose].
    pub fn log_thread(&self, sp: usize, pc: usize, op: impl std::fmt::Debug) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Verbose.order() {
            println!("[vm] sp={sp} pc={pc} op={op:?}");
        }
    }
}
