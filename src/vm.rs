use crate::util::Log;
use crate::{Captures, MatchOutcome, Opcode, Program, Thread};

/// A single simulation of a [Program] against one subject.
///
/// Built fresh per [Program::execute] call and discarded once it returns, so that a
/// [Program] itself carries no mutable execution state and can be shared across threads
/// or reused for any number of concurrent matches.
pub(crate) struct Vm {
    /// `lastidx[pc] == generation` means instruction `pc` has already been added to the
    /// thread list under construction this step, bounding each step to at most
    /// `program.instructions.len()` live threads regardless of backtracking.
    lastidx: Vec<usize>,
    generation: usize,
    log: Log,
}

impl Vm {
    pub(crate) fn run(program: &Program, subject: &[u8]) -> Option<MatchOutcome> {
        Self::run_with_log(program, subject, Log::None)
    }

    pub(crate) fn run_with_log(program: &Program, subject: &[u8], log: Log) -> Option<MatchOutcome> {
        let mut vm = Vm {
            lastidx: vec![0; program.instructions.len()],
            generation: 0,
            log,
        };
        vm.exec(program, subject)
    }

    fn exec(&mut self, program: &Program, subject: &[u8]) -> Option<MatchOutcome> {
        let mut clist = Vec::new();
        self.generation += 1;
        let start_captures = Captures(vec![None; program.slot_count]);
        self.add_thread(program, &mut clist, 0, start_captures, 0);

        let mut matched = None;
        let mut sp = 0;
        loop {
            if clist.is_empty() {
                break;
            }
            let byte = subject.get(sp).copied();
            let mut nlist = Vec::new();
            self.generation += 1;

            for thread in &clist {
                let instr = &program.instructions[thread.pc];
                self.log.log_thread(sp, thread.pc, instr.op);
                match instr.op {
                    Opcode::Char => {
                        if byte == Some(instr.c) {
                            self.add_thread(program, &mut nlist, thread.pc + 1, thread.captures.clone(), sp + 1);
                        }
                    }
                    Opcode::Any => {
                        if byte.is_some() {
                            self.add_thread(program, &mut nlist, thread.pc + 1, thread.captures.clone(), sp + 1);
                        }
                    }
                    Opcode::Range => {
                        if byte.is_some_and(|b| Self::in_ranges(program, thread.pc, b)) {
                            self.add_thread(program, &mut nlist, thread.pc + 1, thread.captures.clone(), sp + 1);
                        }
                    }
                    Opcode::NRange => {
                        if byte.is_some_and(|b| !Self::in_ranges(program, thread.pc, b)) {
                            self.add_thread(program, &mut nlist, thread.pc + 1, thread.captures.clone(), sp + 1);
                        }
                    }
                    Opcode::Match => {
                        matched = Some(MatchOutcome {
                            end: sp,
                            captures: thread.captures.clone(),
                        });
                        // Every thread after this one in `clist` is strictly lower
                        // priority; none of them can improve on a match already found.
                        break;
                    }
                    Opcode::Jump | Opcode::Split | Opcode::Save => {
                        unreachable!("epsilon instructions never survive into a thread list")
                    }
                }
            }

            clist = nlist;
            if byte.is_none() {
                break;
            }
            sp += 1;
        }
        matched
    }

    /// Epsilon-closure over `pc`, recursively following `Jump`/`Split`/`Save` until a
    /// consuming instruction (`Char`/`Any`/`Range`/`NRange`) or `Match` is reached, at
    /// which point it is appended to `list`. `lastidx` deduplicates so that a given `pc`
    /// is added at most once per step, which is what bounds simulation to `O(n * m)`.
    fn add_thread(
        &mut self,
        program: &Program,
        list: &mut Vec<Thread>,
        pc: usize,
        mut captures: Captures,
        sp: usize,
    ) {
        if self.lastidx[pc] == self.generation {
            return;
        }
        self.lastidx[pc] = self.generation;

        let instr = &program.instructions[pc];
        match instr.op {
            Opcode::Jump => self.add_thread(program, list, instr.x, captures, sp),
            Opcode::Split => {
                self.add_thread(program, list, instr.x, captures.clone(), sp);
                self.add_thread(program, list, instr.y, captures, sp);
            }
            Opcode::Save => {
                if instr.s < captures.0.len() {
                    captures.0[instr.s] = Some(sp);
                }
                self.add_thread(program, list, pc + 1, captures, sp);
            }
            Opcode::Char | Opcode::Any | Opcode::Range | Opcode::NRange | Opcode::Match => {
                list.push(Thread { pc, captures });
            }
        }
    }

    fn in_ranges(program: &Program, pc: usize, b: u8) -> bool {
        let instr = &program.instructions[pc];
        program.ranges[instr.x..instr.x + instr.s]
            .iter()
            .any(|&(lo, hi)| b >= lo && b <= hi)
    }
}
