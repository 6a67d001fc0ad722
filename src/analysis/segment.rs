//! Clause segmentation.
//!
//! Splits raw text into ordered, non-overlapping clauses. A colon followed by a
//! bulleted or numbered list keeps the whole list inside one clause.

use regex::Regex;
use std::sync::LazyLock;

use super::types::ClauseSegment;

const TERMINALS: [char; 6] = ['.', '?', '!', ';', '—', '–'];
const CLOSERS: [char; 5] = ['"', '\'', ')', '”', '’'];

static BULLET_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*•◦▪‣]|\d{1,3}[.)]|[A-Za-z][.)])\s+\S").expect("valid bullet regex")
});

pub fn is_bullet_line(line: &str) -> bool {
    BULLET_LINE_RE.is_match(line)
}

/// Strips the bullet or number marker from a list line.
pub fn strip_bullet(line: &str) -> &str {
    match BULLET_LINE_RE.find(line) {
        // The match ends on the first content char; back up over it.
        Some(m) => {
            let marker_end = m.end() - line[..m.end()].chars().last().map_or(0, char::len_utf8);
            line[marker_end..].trim()
        }
        None => line.trim(),
    }
}

pub fn segment_clauses(text: &str) -> Vec<ClauseSegment> {
    let mut builder = SegmentBuilder::new(text);
    let mut in_continuation = false;
    let mut chars = text.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            ':' if !in_continuation && opens_list(text, pos) => in_continuation = true,
            '\n' if in_continuation => match next_nonblank_line(text, pos + 1) {
                Some(line) if is_bullet_line(line) => {}
                _ => {
                    let blank = blank_line_follows(text, pos);
                    builder.close(pos, pos + 1, true);
                    in_continuation = false;
                    if blank {
                        builder.mark_paragraph_break();
                    }
                }
            },
            '\n' if blank_line_follows(text, pos) => {
                builder.close(pos, pos + 1, false);
                builder.mark_paragraph_break();
            }
            '.' if is_decimal_point(text, pos) => {}
            c if !in_continuation && TERMINALS.contains(&c) => {
                let mut end = pos + c.len_utf8();
                while let Some(&(next_pos, next)) = chars.peek() {
                    if TERMINALS.contains(&next) || CLOSERS.contains(&next) {
                        end = next_pos + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                builder.close(end, end, false);
            }
            _ => {}
        }
    }

    builder.close(text.len(), text.len(), in_continuation);
    builder.segments
}

struct SegmentBuilder<'a> {
    text: &'a str,
    start: usize,
    paragraph_pending: bool,
    segments: Vec<ClauseSegment>,
}

impl<'a> SegmentBuilder<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            start: 0,
            paragraph_pending: false,
            segments: Vec::new(),
        }
    }

    /// Emits `text[start..end]` (trimmed) and resumes scanning at `resume_at`.
    fn close(&mut self, end: usize, resume_at: usize, has_continuation: bool) {
        let slice = &self.text[self.start..end];
        let lead = slice.len() - slice.trim_start().len();
        let seg_start = self.start + lead;
        let seg_end = self.start + slice.trim_end().len();

        if seg_start < seg_end {
            self.segments.push(ClauseSegment {
                text: self.text[seg_start..seg_end].to_string(),
                start: seg_start,
                end: seg_end,
                has_continuation,
                paragraph_break_before: std::mem::take(&mut self.paragraph_pending),
            });
        }
        self.start = resume_at;
    }

    fn mark_paragraph_break(&mut self) {
        if !self.segments.is_empty() {
            self.paragraph_pending = true;
        }
    }
}

/// `colon_pos` opens a list when only spaces/tabs separate it from a line
/// break and the next non-blank line is a bullet.
fn opens_list(text: &str, colon_pos: usize) -> bool {
    let rest = &text[colon_pos + 1..];
    let after_spaces = rest.trim_start_matches([' ', '\t']);
    let after_cr = after_spaces.strip_prefix('\r').unwrap_or(after_spaces);
    if !after_cr.starts_with('\n') {
        return false;
    }
    let newline_pos = text.len() - after_cr.len();
    matches!(next_nonblank_line(text, newline_pos + 1), Some(line) if is_bullet_line(line))
}

fn next_nonblank_line(text: &str, mut from: usize) -> Option<&str> {
    while from < text.len() {
        let line_end = text[from..].find('\n').map_or(text.len(), |i| from + i);
        let line = &text[from..line_end];
        if !line.trim().is_empty() {
            return Some(line);
        }
        from = line_end + 1;
    }
    None
}

/// True when the line after the break at `newline_pos` is blank and itself
/// terminated by a break.
fn blank_line_follows(text: &str, newline_pos: usize) -> bool {
    let rest = &text[newline_pos + 1..];
    match rest.find('\n') {
        Some(i) => rest[..i].trim().is_empty(),
        None => false,
    }
}

fn is_decimal_point(text: &str, pos: usize) -> bool {
    let bytes = text.as_bytes();
    pos > 0
        && pos + 1 < bytes.len()
        && bytes[pos - 1].is_ascii_digit()
        && bytes[pos + 1].is_ascii_digit()
}
