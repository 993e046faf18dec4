use std::collections::HashMap;

use crate::{Instruction, Opcode, Program, ProgramIoError};

/// Render a [Program] as the textual assembly format [read_program] accepts.
///
/// Only instructions that are an actual `Jump`/`Split` target get a label, numbered
/// `L1`, `L2`, ... in the order they are first referenced, so a program with no
/// branches at all (impossible here, since every pattern ends in at least one `Match`,
/// but true of hand-written fragments) carries no labels at all.
pub fn write_program(program: &Program) -> String {
    let mut labels: HashMap<usize, String> = HashMap::new();
    let mut next = 1;
    let mut label_for = |labels: &mut HashMap<usize, String>, target: usize| -> String {
        labels
            .entry(target)
            .or_insert_with(|| {
                let name = format!("L{next}");
                next += 1;
                name
            })
            .clone()
    };
    for instr in &program.instructions {
        match instr.op {
            Opcode::Jump => {
                label_for(&mut labels, instr.x);
            }
            Opcode::Split => {
                label_for(&mut labels, instr.x);
                label_for(&mut labels, instr.y);
            }
            _ => {}
        }
    }

    let mut out = String::new();
    for (idx, instr) in program.instructions.iter().enumerate() {
        if let Some(label) = labels.get(&idx) {
            out.push_str(label);
            out.push_str(": ");
        }
        match instr.op {
            Opcode::Char => out.push_str(&format!("char {}", format_byte(instr.c))),
            Opcode::Any => out.push_str("any"),
            Opcode::Range | Opcode::NRange => {
                let mnemonic = if instr.op == Opcode::Range { "range" } else { "nrange" };
                let pairs = &program.ranges[instr.x..instr.x + instr.s];
                let rendered: Vec<String> = pairs
                    .iter()
                    .map(|&(lo, hi)| format!("{}-{}", format_byte(lo), format_byte(hi)))
                    .collect();
                out.push_str(&format!("{mnemonic} {}", rendered.join(" ")));
            }
            Opcode::Jump => out.push_str(&format!("jump {}", labels[&instr.x])),
            Opcode::Split => out.push_str(&format!("split {} {}", labels[&instr.x], labels[&instr.y])),
            Opcode::Save => out.push_str(&format!("save {}", instr.s)),
            Opcode::Match => out.push_str("match"),
        }
        out.push('\n');
    }
    out
}

fn format_byte(b: u8) -> String {
    match b {
        b'\'' => "'\\''".to_string(),
        b if b.is_ascii_graphic() && b != b'-' => format!("'{}'", b as char),
        _ => b.to_string(),
    }
}

fn parse_byte(token: &str, line: usize) -> Result<u8, ProgramIoError> {
    if !token.is_empty() && token.bytes().all(|c| c.is_ascii_digit()) {
        return token
            .parse::<u8>()
            .map_err(|_| ProgramIoError::InvalidOperand {
                line,
                token: token.to_string(),
            });
    }
    if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
        let inner = &token[1..token.len() - 1];
        if inner == "\\'" {
            return Ok(b'\'');
        }
        if inner.len() == 1 {
            return Ok(inner.as_bytes()[0]);
        }
    }
    Err(ProgramIoError::InvalidOperand {
        line,
        token: token.to_string(),
    })
}

fn check_arity(operands: &[String], expected: usize, line: usize, opcode: &str) -> Result<(), ProgramIoError> {
    if operands.len() != expected {
        return Err(ProgramIoError::WrongArity {
            line,
            opcode: opcode.to_string(),
            expected,
            found: operands.len(),
        });
    }
    Ok(())
}

struct RawInstruction {
    op: String,
    operands: Vec<String>,
    line: usize,
}

/// Parse the textual assembly format written by [write_program].
///
/// A line is `[label:] mnemonic operand...`; everything from a `;` to end of line is a
/// comment. A label may stand alone on its own line, naming whatever instruction comes
/// next. Jump targets are resolved in a second pass, so a label may be used before its
/// definition appears.
pub fn read_program(text: &str) -> Result<Program, ProgramIoError> {
    let mut labels: HashMap<String, usize> = HashMap::new();
    let mut raws: Vec<RawInstruction> = Vec::new();

    for (line_idx, raw_line) in text.lines().enumerate() {
        let line = line_idx + 1;
        let content = match raw_line.find(';') {
            Some(i) => &raw_line[..i],
            None => raw_line,
        };
        let mut tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens[0].ends_with(':') && tokens[0].len() > 1 {
            let label = tokens[0][..tokens[0].len() - 1].to_string();
            labels.insert(label, raws.len());
            tokens.remove(0);
            if tokens.is_empty() {
                continue;
            }
        }
        let op = tokens[0].to_lowercase();
        let operands = tokens[1..].iter().map(|s| s.to_string()).collect();
        raws.push(RawInstruction { op, operands, line });
    }

    let mut instructions = Vec::with_capacity(raws.len());
    let mut ranges = Vec::new();

    for raw in &raws {
        let line = raw.line;
        let instr = match raw.op.as_str() {
            "char" => {
                check_arity(&raw.operands, 1, line, "char")?;
                let c = parse_byte(&raw.operands[0], line)?;
                Instruction {
                    op: Opcode::Char,
                    c,
                    s: 0,
                    x: 0,
                    y: 0,
                }
            }
            "any" => {
                check_arity(&raw.operands, 0, line, "any")?;
                Instruction::new(Opcode::Any)
            }
            "match" => {
                check_arity(&raw.operands, 0, line, "match")?;
                Instruction::new(Opcode::Match)
            }
            "save" => {
                check_arity(&raw.operands, 1, line, "save")?;
                let s = raw.operands[0]
                    .parse::<usize>()
                    .map_err(|_| ProgramIoError::InvalidOperand {
                        line,
                        token: raw.operands[0].clone(),
                    })?;
                Instruction {
                    op: Opcode::Save,
                    c: 0,
                    s,
                    x: 0,
                    y: 0,
                }
            }
            "jump" => {
                check_arity(&raw.operands, 1, line, "jump")?;
                let x = *labels
                    .get(&raw.operands[0])
                    .ok_or_else(|| ProgramIoError::UnknownLabel {
                        line,
                        label: raw.operands[0].clone(),
                    })?;
                Instruction {
                    op: Opcode::Jump,
                    c: 0,
                    s: 0,
                    x,
                    y: 0,
                }
            }
            "split" => {
                check_arity(&raw.operands, 2, line, "split")?;
                let x = *labels
                    .get(&raw.operands[0])
                    .ok_or_else(|| ProgramIoError::UnknownLabel {
                        line,
                        label: raw.operands[0].clone(),
                    })?;
                let y = *labels
                    .get(&raw.operands[1])
                    .ok_or_else(|| ProgramIoError::UnknownLabel {
                        line,
                        label: raw.operands[1].clone(),
                    })?;
                Instruction {
                    op: Opcode::Split,
                    c: 0,
                    s: 0,
                    x,
                    y,
                }
            }
            "range" | "nrange" => {
                if raw.operands.is_empty() {
                    return Err(ProgramIoError::WrongArity {
                        line,
                        opcode: raw.op.clone(),
                        expected: 1,
                        found: 0,
                    });
                }
                let x = ranges.len();
                for pair_tok in &raw.operands {
                    let (lo_s, hi_s) = pair_tok.split_once('-').ok_or_else(|| ProgramIoError::InvalidOperand {
                        line,
                        token: pair_tok.clone(),
                    })?;
                    let lo = parse_byte(lo_s, line)?;
                    let hi = parse_byte(hi_s, line)?;
                    ranges.push((lo, hi));
                }
                let s = raw.operands.len();
                let op = if raw.op == "range" { Opcode::Range } else { Opcode::NRange };
                Instruction { op, c: 0, s, x, y: 0 }
            }
            other => {
                return Err(ProgramIoError::UnknownOpcode {
                    line,
                    opcode: other.to_string(),
                })
            }
        };
        instructions.push(instr);
    }

    let slot_count = instructions
        .iter()
        .filter(|i| i.op == Opcode::Save)
        .map(|i| i.s + 1)
        .max()
        .unwrap_or(0);

    Ok(Program {
        instructions,
        ranges,
        slot_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    #[test]
    fn round_trips_a_simple_pattern() {
        let program = compile(b"(a+)(b+)").unwrap();
        let text = write_program(&program);
        let reloaded = read_program(&text).unwrap();
        assert_eq!(reloaded.instructions, program.instructions);
        assert_eq!(reloaded.ranges, program.ranges);
        assert_eq!(reloaded.slot_count, program.slot_count);
    }

    #[test]
    fn round_trips_a_character_class() {
        let program = compile(b"[a-c^]+").unwrap();
        let text = write_program(&program);
        let reloaded = read_program(&text).unwrap();
        assert_eq!(reloaded.instructions, program.instructions);
        assert_eq!(reloaded.ranges, program.ranges);
    }

    #[test]
    fn unknown_opcode_is_reported_with_its_line() {
        let err = read_program("char 'a'\nbogus\n").unwrap_err();
        assert_eq!(
            err,
            ProgramIoError::UnknownOpcode {
                line: 2,
                opcode: "bogus".to_string(),
            }
        );
    }

    #[test]
    fn undefined_label_is_reported() {
        let err = read_program("jump Lmissing\n").unwrap_err();
        assert_eq!(
            err,
            ProgramIoError::UnknownLabel {
                line: 1,
                label: "Lmissing".to_string(),
            }
        );
    }

    #[test]
    fn wrong_arity_is_reported() {
        let err = read_program("char 'a' 'b'\n").unwrap_err();
        assert_eq!(
            err,
            ProgramIoError::WrongArity {
                line: 1,
                opcode: "char".to_string(),
                expected: 1,
                found: 2,
            }
        );
    }

    #[test]
    fn forward_label_reference_resolves() {
        let text = "split L1 L2\nL1: char 'a'\njump L3\nL2: char 'b'\nL3: match\n";
        let program = read_program(text).unwrap();
        assert_eq!(program.instructions[0].op, Opcode::Split);
        assert_eq!(program.instructions[0].x, 1);
        assert_eq!(program.instructions[0].y, 3);
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let text = "; a comment\n\nchar 'a'\n; trailing\nmatch\n";
        let program = read_program(text).unwrap();
        assert_eq!(program.instructions.len(), 2);
    }
}
