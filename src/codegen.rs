use crate::{CompileError, Instruction, NonTerminal, Opcode, PTree, Production, Program, Token, TokenKind};

/// A compiled sub-expression under construction: `entry` is the id of its first
/// instruction, `exit` is the id of a dedicated placeholder [Opcode::Match] instruction
/// that nothing but this fragment's owner ever references.
///
/// Joining two fragments rewrites the left one's `exit` in place into a [Opcode::Jump] to
/// the right one's `entry`; because `exit` is never aliased, that single rewrite is always
/// enough; there is nothing else left pointing at the old placeholder to fix up.
struct Frag {
    entry: usize,
    exit: usize,
}

pub(crate) struct CodeGen {
    arena: Vec<Instruction>,
    ranges: Vec<(u8, u8)>,
    group_counter: usize,
}

impl CodeGen {
    pub(crate) fn generate(tree: &PTree) -> Result<Program, CompileError> {
        let mut cg = CodeGen {
            arena: Vec::new(),
            ranges: Vec::new(),
            group_counter: 0,
        };
        let frag = cg.gen(tree)?;
        debug_assert_eq!(frag.entry, 0, "the first construct in the tree must emit its own entry first");
        let slot_count = cg
            .arena
            .iter()
            .filter(|i| i.op == Opcode::Save)
            .map(|i| i.s + 1)
            .max()
            .unwrap_or(0);
        Ok(Program {
            instructions: cg.arena,
            ranges: cg.ranges,
            slot_count,
        })
    }

    fn emit(&mut self, instr: Instruction) -> usize {
        let id = self.arena.len();
        self.arena.push(instr);
        id
    }

    fn new_exit(&mut self) -> usize {
        self.emit(Instruction::new(Opcode::Match))
    }

    fn patch_jump(&mut self, id: usize, target: usize) {
        self.arena[id] = Instruction {
            op: Opcode::Jump,
            c: 0,
            s: 0,
            x: target,
            y: 0,
        };
    }

    fn gen(&mut self, tree: &PTree) -> Result<Frag, CompileError> {
        match tree.kind {
            NonTerminal::Regex => match tree.production {
                Production::RegexOne => self.gen(&tree.children[0]),
                Production::RegexAlt => self.gen_alt(&tree.children[0], &tree.children[2]),
                _ => unreachable!("not a REGEX production"),
            },
            NonTerminal::Sub => match tree.production {
                Production::SubOne => self.gen(&tree.children[0]),
                Production::SubMany => {
                    let a = self.gen(&tree.children[0])?;
                    let b = self.gen(&tree.children[1])?;
                    self.patch_jump(a.exit, b.entry);
                    Ok(Frag {
                        entry: a.entry,
                        exit: b.exit,
                    })
                }
                _ => unreachable!("not a SUB production"),
            },
            NonTerminal::Expr => match tree.production {
                Production::ExprBare => self.gen(&tree.children[0]),
                Production::ExprGreedy => self.gen_quantifier(tree, true),
                Production::ExprLazy => self.gen_quantifier(tree, false),
                _ => unreachable!("not an EXPR production"),
            },
            NonTerminal::Term => match tree.production {
                Production::TermLiteral => self.gen_literal(tree.token.expect("terminal carries a token")),
                Production::TermGroup => self.gen_group(&tree.children[1]),
                Production::TermClass => self.gen_class(&tree.children[1], false),
                Production::TermNegClass => self.gen_class(&tree.children[2], true),
                _ => unreachable!("not a TERM production"),
            },
            NonTerminal::Class => unreachable!("CLASS nodes are only walked via gen_class"),
        }
    }

    fn gen_literal(&mut self, token: Token) -> Result<Frag, CompileError> {
        match token.kind {
            TokenKind::Dot => Ok(self.gen_any()),
            TokenKind::Special => Err(CompileError::UnsupportedConstruct {
                what: format!("\\{}", token.value as char),
            }),
            _ => Ok(self.gen_char(token.value)),
        }
    }

    fn gen_char(&mut self, c: u8) -> Frag {
        let entry = self.emit(Instruction {
            op: Opcode::Char,
            c,
            s: 0,
            x: 0,
            y: 0,
        });
        let exit = self.new_exit();
        Frag { entry, exit }
    }

    fn gen_any(&mut self) -> Frag {
        let entry = self.emit(Instruction::new(Opcode::Any));
        let exit = self.new_exit();
        Frag { entry, exit }
    }

    /// `'(' REGEX ')'`. Group numbering happens here, in pre-order, right before the
    /// inner `REGEX` is walked, so that groups are numbered in left-to-right order of
    /// their opening parenthesis.
    fn gen_group(&mut self, inner: &PTree) -> Result<Frag, CompileError> {
        self.group_counter += 1;
        let k = self.group_counter;
        let save_open = self.emit(Instruction {
            op: Opcode::Save,
            c: 0,
            s: 2 * k,
            x: 0,
            y: 0,
        });
        let body = self.gen(inner)?;
        let save_close = self.emit(Instruction {
            op: Opcode::Save,
            c: 0,
            s: 2 * k + 1,
            x: 0,
            y: 0,
        });
        self.patch_jump(body.exit, save_close);
        let exit = self.new_exit();
        Ok(Frag {
            entry: save_open,
            exit,
        })
    }

    fn gen_class(&mut self, chain: &PTree, negate: bool) -> Result<Frag, CompileError> {
        let mut pairs = Vec::new();
        Self::collect_class(chain, &mut pairs)?;
        let x = self.ranges.len();
        let s = pairs.len();
        self.ranges.extend(pairs);
        let op = if negate { Opcode::NRange } else { Opcode::Range };
        let entry = self.emit(Instruction { op, c: 0, s, x, y: 0 });
        let exit = self.new_exit();
        Ok(Frag { entry, exit })
    }

    fn reject_special(token: Token) -> Result<u8, CompileError> {
        if token.kind == TokenKind::Special {
            return Err(CompileError::UnsupportedConstruct {
                what: format!("\\{} inside a character class", token.value as char),
            });
        }
        Ok(token.value)
    }

    fn collect_class(tree: &PTree, pairs: &mut Vec<(u8, u8)>) -> Result<(), CompileError> {
        match tree.production {
            Production::ClassRange => {
                let lo = Self::reject_special(tree.children[0].token.expect("range lo is a terminal"))?;
                let hi = Self::reject_special(tree.children[1].token.expect("range hi is a terminal"))?;
                pairs.push((lo, hi));
                if let Some(cont) = tree.children.get(2) {
                    Self::collect_class(cont, pairs)?;
                }
            }
            Production::ClassChar => {
                let c = Self::reject_special(tree.children[0].token.expect("class char is a terminal"))?;
                pairs.push((c, c));
                if let Some(cont) = tree.children.get(1) {
                    Self::collect_class(cont, pairs)?;
                }
            }
            Production::ClassDash => {
                let c = tree.children[0].token.expect("dash is a terminal").value;
                pairs.push((c, c));
            }
            _ => unreachable!("not a CLASS production"),
        }
        Ok(())
    }

    /// `TERM ('+' | '*' | '?') '?'?`. The quantifying [Opcode::Split] must be reserved
    /// before its operand is generated whenever it needs to sit at the operand's entry
    /// (`*`/`?`); `+` is the one case where the operand itself is the entry, since at
    /// least one repetition is mandatory.
    fn gen_quantifier(&mut self, tree: &PTree, greedy: bool) -> Result<Frag, CompileError> {
        let term = &tree.children[0];
        let quantifier = tree.children[1].token.expect("quantifier is a terminal").kind;
        match quantifier {
            TokenKind::Question => {
                let split_id = self.emit(Instruction::new(Opcode::Split));
                let inner = self.gen(term)?;
                let exit = self.new_exit();
                self.patch_jump(inner.exit, exit);
                let (x, y) = if greedy { (inner.entry, exit) } else { (exit, inner.entry) };
                self.arena[split_id].x = x;
                self.arena[split_id].y = y;
                Ok(Frag { entry: split_id, exit })
            }
            TokenKind::Star => {
                let split_id = self.emit(Instruction::new(Opcode::Split));
                let inner = self.gen(term)?;
                let exit = self.new_exit();
                self.patch_jump(inner.exit, split_id);
                let (x, y) = if greedy { (inner.entry, exit) } else { (exit, inner.entry) };
                self.arena[split_id].x = x;
                self.arena[split_id].y = y;
                Ok(Frag { entry: split_id, exit })
            }
            TokenKind::Plus => {
                let inner = self.gen(term)?;
                let split_id = self.emit(Instruction::new(Opcode::Split));
                let exit = self.new_exit();
                self.patch_jump(inner.exit, split_id);
                let (x, y) = if greedy { (inner.entry, exit) } else { (exit, inner.entry) };
                self.arena[split_id].x = x;
                self.arena[split_id].y = y;
                Ok(Frag {
                    entry: inner.entry,
                    exit,
                })
            }
            _ => unreachable!("EXPR quantifier token is always +, *, or ?"),
        }
    }

    /// `SUB '|' REGEX`. The alternation [Opcode::Split] is reserved before either branch
    /// is generated, since it must be the fragment's entry and both branches are
    /// generated after it.
    fn gen_alt(&mut self, left: &PTree, right: &PTree) -> Result<Frag, CompileError> {
        let split_id = self.emit(Instruction::new(Opcode::Split));
        let a = self.gen(left)?;
        let b = self.gen(right)?;
        self.arena[split_id].x = a.entry;
        self.arena[split_id].y = b.entry;
        let exit = self.new_exit();
        self.patch_jump(a.exit, exit);
        self.patch_jump(b.exit, exit);
        Ok(Frag { entry: split_id, exit })
    }
}
