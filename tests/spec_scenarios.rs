//! The concrete pattern/subject/capture scenarios a working engine must reproduce.

use pike_regex::compile;

#[test]
fn aabb_captures_both_groups() {
    let program = compile(b"(a+)(b+)").unwrap();
    let result = program.execute(b"aabb").unwrap();
    assert_eq!(result.end, 4);
    assert_eq!(result.group(1), Some((0, 2)));
    assert_eq!(result.group(2), Some((2, 4)));
}

#[test]
fn single_a_before_a_run_of_b_still_captures_both_groups() {
    let program = compile(b"(a+)(b+)").unwrap();
    let result = program.execute(b"abbbb").unwrap();
    assert_eq!(result.end, 5);
    assert_eq!(result.group(1), Some((0, 1)));
    assert_eq!(result.group(2), Some((1, 5)));
}

#[test]
fn no_trailing_b_run_is_no_match() {
    let program = compile(b"(a+)(b+)").unwrap();
    assert!(program.execute(b"aa").is_none());
}

#[test]
fn lazy_star_still_reaches_the_same_end_as_its_greedy_sibling() {
    let program = compile(b"a*?b").unwrap();
    let result = program.execute(b"aaab").unwrap();
    assert_eq!(result.end, 4);
}

#[test]
fn character_class_with_space_and_trailing_dash_member() {
    // class members: a-c, e, ' ', '-'
    let program = compile(b"[a-ce -]+").unwrap();
    let result = program.execute(b"aaabbbcc eee").unwrap();
    assert_eq!(result.end, 12);
}

#[test]
fn alternation_matches_the_second_branch() {
    let program = compile(b"foo|bar").unwrap();
    let result = program.execute(b"bar").unwrap();
    assert_eq!(result.end, 3);
}
