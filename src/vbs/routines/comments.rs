//! Comment stripping

use crate::vbs::routine::{Matcher, Phase, Routine};

/// Drops lines that are only a comment (`'` or `REM`).
pub fn routine() -> Routine {
    Routine::new(super::COMMENTS, Phase::PRE)
        .with_matcher(Matcher::predicate("comment-line", is_comment_line))
        .with_drop_on_match()
}

pub fn is_comment_line(line: &str) -> bool {
    let line = line.trim_start();
    if line.starts_with('\'') {
        return true;
    }
    let mut words = line.split_whitespace();
    words
        .next()
        .is_some_and(|first| first.eq_ignore_ascii_case("rem"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_lines() {
        assert!(is_comment_line("' note"));
        assert!(is_comment_line("   'indented"));
        assert!(is_comment_line("REM old style"));
        assert!(is_comment_line("rem"));
        assert!(!is_comment_line("x = 1 ' trailing"));
        assert!(!is_comment_line("Remove = 1"));
    }

    #[test]
    fn test_routine_drops_matches() {
        let routine = routine();
        assert!(routine.drop_on_match());
        assert!(routine.run("' gone").unwrap().matched);
        assert!(!routine.run("x = 1").unwrap().matched);
    }
}
