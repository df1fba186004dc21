use crate::scanning::domain::{CompiledPattern, LineMatch, LogScan, MatchSpan};

/// PatternMatcher applies compiled failure patterns to console log text.
///
/// Matches come out in line order, then in pattern-list order within a line.
/// Every pattern that hits a line is recorded; a line is not consumed by its
/// first match.
pub struct PatternMatcher;

impl PatternMatcher {
    pub fn scan(patterns: &[CompiledPattern], log_text: &str) -> LogScan {
        let mut line_count = 0;
        let mut matches = Vec::new();

        for (line_index, line) in split_lines(log_text).enumerate() {
            line_count += 1;

            for pattern in patterns {
                if let Some((start, end)) = pattern.find_in(line) {
                    matches.push(LineMatch {
                        pattern_id: pattern.id(),
                        line_index,
                        line_text: line.to_string(),
                        span: char_span(line, start, end),
                    });
                }
            }
        }

        LogScan::new(line_count, matches)
    }
}

/// Converts a byte range into a character range
fn char_span(line: &str, start: usize, end: usize) -> MatchSpan {
    let char_start = line[..start].chars().count();
    let char_len = line[start..end].chars().count();
    MatchSpan::new(char_start, char_start + char_len)
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{1C}' | '\u{1D}' | '\u{1E}' | '\u{85}' | '\u{2028}'
            | '\u{2029}'
    )
}

/// Splits text on every newline convention.
///
/// `\r\n` counts as a single terminator and a trailing terminator does not
/// yield an empty final line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }

        match rest.char_indices().find(|(_, c)| is_line_boundary(*c)) {
            Some((idx, c)) => {
                let line = &rest[..idx];
                let mut next = idx + c.len_utf8();
                if c == '\r' && rest[next..].starts_with('\n') {
                    next += 1;
                }
                rest = &rest[next..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}
