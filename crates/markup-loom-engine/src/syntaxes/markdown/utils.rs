/// Splits text into lines without their terminators.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

pub fn trim_trailing_lines(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}

/// Length of the blank lines (`[ \t]*\n`) at the start of `text`.
pub fn blank_run(text: &str) -> usize {
    let mut len = 0;
    for line in text.split_inclusive('\n') {
        if !line.ends_with('\n') || !line.trim().is_empty() {
            break;
        }
        len += line.len();
    }
    len
}

/// Length of the first line of `text`, terminator included.
pub fn line_len(text: &str) -> usize {
    text.find('\n').map_or(text.len(), |i| i + 1)
}

/// Number of leading spaces, a tab counting as four.
pub fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Prefixes every line after the first with `prefix`; blank lines are left
/// empty.
pub fn indent_following(text: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in split_lines(text).enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.trim().is_empty() {
                out.push_str(prefix);
                out.push_str(line);
            }
        } else {
            out.push_str(line);
        }
    }
    out
}

/// Removes up to `width` leading spaces from every line after the first.
pub fn outdent_following(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            let spaces = line.len() - line.trim_start_matches(' ').len();
            out.push_str(&line[spaces.min(width)..]);
        } else {
            out.push_str(line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("\n\nabc", 2)]
    #[case("  \n\t\nabc", 4)]
    #[case("abc\n", 0)]
    #[case("   ", 0)]
    fn blank_runs(#[case] text: &str, #[case] len: usize) {
        assert_eq!(blank_run(text), len);
    }

    #[test]
    fn indent_following_skips_first_and_blank_lines() {
        assert_eq!(indent_following("a\nb\n\nc", "  "), "a\n  b\n\n  c");
    }

    #[test]
    fn outdent_following_is_bounded() {
        assert_eq!(outdent_following("a\n    b\n c", 2), "a\n  b\nc");
    }

    #[test]
    fn crlf_lines() {
        assert_eq!(split_lines("a\r\nb").collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
