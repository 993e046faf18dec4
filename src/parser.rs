use crate::{CompileError, Lexer, NonTerminal, PTree, Parser, Production, Token, TokenKind};

impl<'p> Parser<'p> {
    pub fn new(mut lexer: Lexer<'p>) -> Result<Self, CompileError> {
        lexer.nextsym()?;
        Ok(Self { lexer })
    }

    /// Parse a full `REGEX` and fail if anything but end of input follows.
    pub fn parse_regex(&mut self) -> Result<PTree, CompileError> {
        self.regex()
    }

    pub fn expect_eof(&mut self) -> Result<(), CompileError> {
        if self.lexer.current().kind != TokenKind::Eof {
            return Err(CompileError::TrailingInput {
                pointer: self.lexer.pos(),
            });
        }
        Ok(())
    }

    fn wrap(&self, kind: NonTerminal, token: Token) -> PTree {
        PTree::terminal(kind, Production::TermLiteral, token)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, CompileError> {
        let tok = self.lexer.current();
        if tok.kind != kind {
            return Err(CompileError::UnexpectedToken {
                pointer: self.lexer.pos(),
                expected: kind,
                found: tok.kind,
            });
        }
        self.lexer.nextsym()?;
        Ok(tok)
    }

    // REGEX -> SUB | SUB '|' REGEX
    fn regex(&mut self) -> Result<PTree, CompileError> {
        let sub = self.sub()?;
        let node = if self.lexer.current().kind == TokenKind::Pipe {
            let pipe = self.lexer.current();
            self.lexer.nextsym()?;
            let rest = self.regex()?;
            PTree::node(
                NonTerminal::Regex,
                Production::RegexAlt,
                vec![sub, self.wrap(NonTerminal::Regex, pipe), rest],
            )
        } else {
            PTree::node(NonTerminal::Regex, Production::RegexOne, vec![sub])
        };
        self.lexer.log.log_production("parser", node.production);
        Ok(node)
    }

    // SUB -> EXPR | EXPR SUB
    fn sub(&mut self) -> Result<PTree, CompileError> {
        let expr = self.expr()?;
        let node = match self.lexer.current().kind {
            TokenKind::Eof | TokenKind::RParen | TokenKind::Pipe => {
                PTree::node(NonTerminal::Sub, Production::SubOne, vec![expr])
            }
            _ => {
                let rest = self.sub()?;
                PTree::node(NonTerminal::Sub, Production::SubMany, vec![expr, rest])
            }
        };
        self.lexer.log.log_production("parser", node.production);
        Ok(node)
    }

    // EXPR -> TERM | TERM '+' '?'? | TERM '*' '?'? | TERM '?' '?'?
    fn expr(&mut self) -> Result<PTree, CompileError> {
        let term = self.term()?;
        let quantifier = self.lexer.current();
        let node = match quantifier.kind {
            TokenKind::Plus | TokenKind::Star | TokenKind::Question => {
                self.lexer.nextsym()?;
                let op_node = self.wrap(NonTerminal::Expr, quantifier);
                if self.lexer.current().kind == TokenKind::Question {
                    let lazy_mark = self.lexer.current();
                    self.lexer.nextsym()?;
                    PTree::node(
                        NonTerminal::Expr,
                        Production::ExprLazy,
                        vec![term, op_node, self.wrap(NonTerminal::Expr, lazy_mark)],
                    )
                } else {
                    PTree::node(NonTerminal::Expr, Production::ExprGreedy, vec![term, op_node])
                }
            }
            _ => PTree::node(NonTerminal::Expr, Production::ExprBare, vec![term]),
        };
        self.lexer.log.log_production("parser", node.production);
        Ok(node)
    }

    // TERM -> char | '.' | '-' | '^' | special
    //       | '(' REGEX ')'
    //       | '[' CLASS ']'
    //       | '[' '^' CLASS ']'
    fn term(&mut self) -> Result<PTree, CompileError> {
        let tok = self.lexer.current();
        let node = match tok.kind {
            TokenKind::CharSym
            | TokenKind::Special
            | TokenKind::Dot
            | TokenKind::Minus
            | TokenKind::Caret => {
                self.lexer.nextsym()?;
                PTree::terminal(NonTerminal::Term, Production::TermLiteral, tok)
            }
            TokenKind::LParen => {
                let lparen = tok;
                self.lexer.nextsym()?;
                let inner = self.regex()?;
                let rparen = self.expect(TokenKind::RParen)?;
                PTree::node(
                    NonTerminal::Term,
                    Production::TermGroup,
                    vec![
                        self.wrap(NonTerminal::Term, lparen),
                        inner,
                        self.wrap(NonTerminal::Term, rparen),
                    ],
                )
            }
            TokenKind::LBracket => {
                let lbracket = tok;
                self.lexer.nextsym()?;
                if self.lexer.current().kind == TokenKind::Caret {
                    let caret = self.lexer.current();
                    self.lexer.nextsym()?;
                    let class = self.class_chain()?;
                    let rbracket = self.expect(TokenKind::RBracket)?;
                    PTree::node(
                        NonTerminal::Term,
                        Production::TermNegClass,
                        vec![
                            self.wrap(NonTerminal::Term, lbracket),
                            self.wrap(NonTerminal::Term, caret),
                            class,
                            self.wrap(NonTerminal::Term, rbracket),
                        ],
                    )
                } else {
                    let class = self.class_chain()?;
                    let rbracket = self.expect(TokenKind::RBracket)?;
                    PTree::node(
                        NonTerminal::Term,
                        Production::TermClass,
                        vec![
                            self.wrap(NonTerminal::Term, lbracket),
                            class,
                            self.wrap(NonTerminal::Term, rbracket),
                        ],
                    )
                }
            }
            found => {
                return Err(CompileError::NotATerm {
                    pointer: self.lexer.pos(),
                    found,
                })
            }
        };
        self.lexer.log.log_production("parser", node.production);
        Ok(node)
    }

    fn class_chain(&mut self) -> Result<PTree, CompileError> {
        match self.class_item()? {
            Some(node) => Ok(node),
            None => Err(CompileError::EmptyCharacterClass {
                pointer: self.lexer.pos(),
            }),
        }
    }

    // CLASS -> CCHAR '-' CCHAR CLASS | CCHAR '-' CCHAR
    //        | CCHAR CLASS | CCHAR | '-'
    //
    // Inside a class every token but `]`, end-of-input, and an unpaired `-` is a literal
    // CCHAR: metacharacters like `.`/`^`/`+` lose their outer-context meaning here.
    fn class_item(&mut self) -> Result<Option<PTree>, CompileError> {
        let cur = self.lexer.current();
        match cur.kind {
            TokenKind::RBracket | TokenKind::Eof => Ok(None),
            TokenKind::Minus => {
                self.lexer.nextsym()?;
                let cont = self.class_item()?;
                match cont {
                    // A '-' immediately followed by more class items is just a literal
                    // dash, not the trailing-dash production.
                    Some(c) => {
                        let children = vec![self.wrap(NonTerminal::Class, cur), c];
                        Ok(Some(PTree::node(NonTerminal::Class, Production::ClassChar, children)))
                    }
                    None => Ok(Some(PTree::node(
                        NonTerminal::Class,
                        Production::ClassDash,
                        vec![self.wrap(NonTerminal::Class, cur)],
                    ))),
                }
            }
            _ => {
                self.lexer.nextsym()?;
                let lookahead = self.lexer.current();
                if lookahead.kind == TokenKind::Minus {
                    let dash = lookahead;
                    self.lexer.nextsym()?;
                    let after_dash = self.lexer.current();
                    if after_dash.kind != TokenKind::RBracket && after_dash.kind != TokenKind::Eof {
                        self.lexer.nextsym()?;
                        let cont = self.class_item()?;
                        let mut children = vec![
                            self.wrap(NonTerminal::Class, cur),
                            self.wrap(NonTerminal::Class, after_dash),
                        ];
                        if let Some(c) = cont {
                            children.push(c);
                        }
                        return Ok(Some(PTree::node(NonTerminal::Class, Production::ClassRange, children)));
                    }
                    // Rule 2: the '-' does not start a range; replay it, then replay
                    // whatever followed it, and treat `cur` as a lone CCHAR.
                    self.lexer.unget(after_dash);
                    self.lexer.unget(dash);
                    self.lexer.nextsym()?;
                }
                let cont = self.class_item()?;
                let mut children = vec![self.wrap(NonTerminal::Class, cur)];
                if let Some(c) = cont {
                    children.push(c);
                }
                Ok(Some(PTree::node(NonTerminal::Class, Production::ClassChar, children)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Production;

    fn parse(pattern: &[u8]) -> PTree {
        let lexer = Lexer::new(pattern);
        let mut parser = Parser::new(lexer).unwrap();
        let tree = parser.parse_regex().unwrap();
        parser.expect_eof().unwrap();
        tree
    }

    #[test]
    fn simple_alternation_has_three_children() {
        let tree = parse(b"foo|bar");
        assert_eq!(tree.production, Production::RegexAlt);
        assert_eq!(tree.children.len(), 3);
        assert_eq!(tree.children[1].token.unwrap().kind, TokenKind::Pipe);
    }

    #[test]
    fn group_has_paren_terminals_at_zero_and_two() {
        let tree = parse(b"(a)");
        let sub = &tree.children[0];
        let term = &sub.children[0].children[0];
        assert_eq!(term.production, Production::TermGroup);
        assert_eq!(term.children.len(), 3);
        assert_eq!(term.children[0].token.unwrap().kind, TokenKind::LParen);
        assert_eq!(term.children[2].token.unwrap().kind, TokenKind::RParen);
    }

    #[test]
    fn positive_class_is_distinguished_from_group_by_first_child() {
        let tree = parse(b"[ab]");
        let term = &tree.children[0].children[0].children[0];
        assert_eq!(term.production, Production::TermClass);
        assert_eq!(term.children.len(), 3);
        assert_eq!(term.children[0].token.unwrap().kind, TokenKind::LBracket);
    }

    #[test]
    fn negated_class_has_four_children() {
        let tree = parse(b"[^ab]");
        let term = &tree.children[0].children[0].children[0];
        assert_eq!(term.production, Production::TermNegClass);
        assert_eq!(term.children.len(), 4);
    }

    #[test]
    fn lazy_quantifier_has_three_children() {
        let tree = parse(b"a*?");
        let expr = &tree.children[0].children[0];
        assert_eq!(expr.production, Production::ExprLazy);
        assert_eq!(expr.children.len(), 3);
    }

    #[test]
    fn class_range_then_dash_is_a_three_item_chain() {
        // `[a-ce-]` : range(a,c), char(e), dash(-)
        let tree = parse(b"[a-ce-]");
        let class = &tree.children[0].children[0].children[0].children[1];
        assert_eq!(class.production, Production::ClassRange);
        assert_eq!(class.children.len(), 3);
        let char_node = &class.children[2];
        assert_eq!(char_node.production, Production::ClassChar);
        let dash_node = &char_node.children[1];
        assert_eq!(dash_node.production, Production::ClassDash);
        assert_eq!(dash_node.children.len(), 1);
    }

    #[test]
    fn missing_close_paren_is_a_parse_error() {
        let lexer = Lexer::new(b"(a");
        let mut parser = Parser::new(lexer).unwrap();
        assert!(matches!(
            parser.parse_regex(),
            Err(CompileError::UnexpectedToken {
                expected: TokenKind::RParen,
                ..
            })
        ));
    }

    #[test]
    fn empty_class_is_rejected() {
        let lexer = Lexer::new(b"[]");
        let mut parser = Parser::new(lexer).unwrap();
        assert!(matches!(
            parser.parse_regex(),
            Err(CompileError::EmptyCharacterClass { .. })
        ));
    }
}
