//! A difflib-style unified diff producer with ignore-blank-lines,
//! ignore-case and ignore-space-changes suppression filters, matching the
//! Subversion adapter's diff semantics.
//!
//! Opcode computation is delegated to [`similar`], whose
//! [`similar::capture_diff_slices`] yields the same insert/delete/replace/
//! equal opcode shape as Python's `difflib.SequenceMatcher.get_opcodes`.
//! The ignore-flag collapsing and hunk grouping on top of that are this
//! crate's own algorithm.

use std::ops::Range;

use similar::{capture_diff_slices, Algorithm, DiffOp};

#[derive(Debug, Clone, Copy)]
pub struct DiffOptions {
    pub ignore_blank_lines: bool,
    pub ignore_case: bool,
    pub ignore_space_changes: bool,
    pub context: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            ignore_blank_lines: false,
            ignore_case: false,
            ignore_space_changes: false,
            context: 3,
        }
    }
}

/// Splits `text` into lines, keeping the trailing `\n` (and any `\r` before
/// it) on each line, the same way Python's `str.splitlines(keepends=True)`
/// behaves. The last line has no terminator if the text doesn't end in one,
/// which is how a missing trailing newline is detected later.
pub fn split_lines_keepends(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'\n' {
            lines.push(text[start..=i].to_string());
            start = i + 1;
        }
    }
    if start < text.len() {
        lines.push(text[start..].to_string());
    }
    lines
}

fn strip_terminator(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r')
}

fn is_blank(line: &str) -> bool {
    strip_terminator(line).trim().is_empty()
}

fn normalize_line(line: &str, opts: &DiffOptions) -> String {
    let mut s = strip_terminator(line).to_string();
    if opts.ignore_case {
        s = s.to_lowercase();
    }
    if opts.ignore_space_changes {
        s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    s
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Show {
    Context,
    Change,
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Quiet,
    Noisy,
}

fn role(show: Show) -> Role {
    match show {
        Show::Context | Show::Suppressed => Role::Quiet,
        Show::Change => Role::Noisy,
    }
}

#[derive(Debug, Clone)]
struct Segment {
    old_range: Range<usize>,
    new_range: Range<usize>,
    show: Show,
}

fn classify(ops: &[DiffOp], old: &[String], new: &[String], opts: &DiffOptions) -> Vec<Segment> {
    ops.iter()
        .map(|op| {
            let old_range = op.old_range();
            let new_range = op.new_range();

            let show = match op {
                DiffOp::Equal { .. } => Show::Context,
                DiffOp::Delete { .. } => {
                    if opts.ignore_blank_lines
                        && old[old_range.clone()].iter().all(|l| is_blank(l))
                        && !old_range.is_empty()
                    {
                        Show::Suppressed
                    } else {
                        Show::Change
                    }
                }
                DiffOp::Insert { .. } => {
                    if opts.ignore_blank_lines
                        && new[new_range.clone()].iter().all(|l| is_blank(l))
                        && !new_range.is_empty()
                    {
                        Show::Suppressed
                    } else {
                        Show::Change
                    }
                }
                DiffOp::Replace { .. } => {
                    let normalizes_equal = (opts.ignore_case || opts.ignore_space_changes)
                        && old_range.len() == new_range.len()
                        && old[old_range.clone()]
                            .iter()
                            .zip(new[new_range.clone()].iter())
                            .all(|(a, b)| normalize_line(a, opts) == normalize_line(b, opts));
                    if normalizes_equal {
                        Show::Suppressed
                    } else {
                        Show::Change
                    }
                }
            };

            Segment {
                old_range,
                new_range,
                show,
            }
        })
        .collect()
}

/// Groups segments into hunks, trimming leading/trailing quiet runs to at
/// most `context` lines and breaking the hunk whenever a quiet run exceeds
/// `2 * context`. This mirrors `difflib.SequenceMatcher.get_grouped_opcodes`,
/// generalized to treat ignore-suppressed runs (which may have differing
/// old/new lengths) the same as true equal runs for grouping purposes.
fn group_segments(mut segments: Vec<Segment>, context: usize) -> Vec<Vec<Segment>> {
    if segments.is_empty() {
        return Vec::new();
    }

    if let Some(first) = segments.first_mut() {
        if role(first.show) == Role::Quiet {
            let old_start = first.old_range.end - first.old_range.len().min(context);
            let new_start = first.new_range.end - first.new_range.len().min(context);
            first.old_range = old_start..first.old_range.end;
            first.new_range = new_start..first.new_range.end;
        }
    }

    if let Some(last) = segments.last_mut() {
        if role(last.show) == Role::Quiet {
            let old_end = last.old_range.start + last.old_range.len().min(context);
            let new_end = last.new_range.start + last.new_range.len().min(context);
            last.old_range = last.old_range.start..old_end;
            last.new_range = last.new_range.start..new_end;
        }
    }

    let nn = context * 2;
    let mut groups = Vec::new();
    let mut group: Vec<Segment> = Vec::new();

    for seg in segments {
        let is_large_quiet_run =
            role(seg.show) == Role::Quiet && seg.old_range.len().max(seg.new_range.len()) > nn;

        if is_large_quiet_run {
            let old_end = seg.old_range.start + seg.old_range.len().min(context);
            let new_end = seg.new_range.start + seg.new_range.len().min(context);
            group.push(Segment {
                old_range: seg.old_range.start..old_end,
                new_range: seg.new_range.start..new_end,
                show: seg.show,
            });
            groups.push(std::mem::take(&mut group));

            let old_start = seg.old_range.end - seg.old_range.len().min(context);
            let new_start = seg.new_range.end - seg.new_range.len().min(context);
            group.push(Segment {
                old_range: old_start..seg.old_range.end,
                new_range: new_start..seg.new_range.end,
                show: seg.show,
            });
        } else {
            group.push(seg);
        }
    }

    let is_trivial = group.len() == 1 && role(group[0].show) == Role::Quiet;
    if !group.is_empty() && !is_trivial {
        groups.push(group);
    }

    groups
}

fn format_range(start0: usize, len: usize) -> String {
    if len == 1 {
        format!("{}", start0 + 1)
    } else if len == 0 {
        format!("{start0},0")
    } else {
        format!("{},{len}", start0 + 1)
    }
}

fn emit_line(out: &mut String, marker: char, line: &str) {
    out.push(marker);
    out.push_str(strip_terminator(line));
    out.push('\n');
    if !line.ends_with('\n') {
        out.push_str("\\ No newline at end of file\n");
    }
}

/// Produces a unified diff of `old` vs `new`, where both are already split
/// into lines with their terminators kept (see [`split_lines_keepends`]).
pub fn unified_diff(old: &[String], new: &[String], opts: &DiffOptions) -> String {
    let ops = capture_diff_slices(Algorithm::Myers, old, new);
    let segments = classify(&ops, old, new, opts);
    let groups: Vec<_> = group_segments(segments, opts.context)
        .into_iter()
        .filter(|group| group.iter().any(|seg| seg.show == Show::Change))
        .collect();

    let mut out = String::new();
    for group in &groups {
        let old_start = group.first().unwrap().old_range.start;
        let old_end = group.last().unwrap().old_range.end;
        let new_start = group.first().unwrap().new_range.start;
        let new_end = group.last().unwrap().new_range.end;

        out.push_str(&format!(
            "@@ -{} +{} @@\n",
            format_range(old_start, old_end - old_start),
            format_range(new_start, new_end - new_start),
        ));

        for seg in group {
            match seg.show {
                Show::Context => {
                    for line in &old[seg.old_range.clone()] {
                        emit_line(&mut out, ' ', line);
                    }
                }
                Show::Suppressed => {}
                Show::Change => {
                    for line in &old[seg.old_range.clone()] {
                        emit_line(&mut out, '-', line);
                    }
                    for line in &new[seg.new_range.clone()] {
                        emit_line(&mut out, '+', line);
                    }
                }
            }
        }
    }

    out
}

/// Convenience entry point taking whole-file text instead of pre-split
/// lines.
pub fn unified_diff_text(old: &str, new: &str, opts: &DiffOptions) -> String {
    let old_lines = split_lines_keepends(old);
    let new_lines = split_lines_keepends(new);
    unified_diff(&old_lines, &new_lines, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(s: &str) -> Vec<String> {
        split_lines_keepends(s)
    }

    #[test]
    fn identical_input_has_no_diff() {
        let opts = DiffOptions::default();
        assert_eq!(unified_diff_text("a\nb\nc\n", "a\nb\nc\n", &opts), "");
        assert_eq!(unified_diff_text("", "", &opts), "");
    }

    #[test]
    fn insert_into_empty_file_matches_spec_example() {
        let opts = DiffOptions::default();
        let diff = unified_diff(&[], &lines("a\n"), &opts);
        assert_eq!(diff, "@@ -0,0 +1 @@\n+a\n");
    }

    #[test]
    fn delete_down_to_empty_file_matches_spec_example() {
        let opts = DiffOptions::default();
        let diff = unified_diff(&lines("a\n"), &[], &opts);
        assert_eq!(diff, "@@ -1 +0,0 @@\n-a\n");
    }

    #[test]
    fn missing_trailing_newline_is_annotated() {
        let opts = DiffOptions::default();
        let diff = unified_diff(&lines("a\n"), &lines("a"), &opts);
        assert!(diff.contains("-a\n"));
        assert!(diff.contains("+a\n\\ No newline at end of file\n"));
    }

    #[test]
    fn ignore_space_changes_suppresses_whitespace_only_diffs() {
        let opts = DiffOptions {
            ignore_space_changes: true,
            ..Default::default()
        };
        let a = lines("foo   bar\n");
        let b = lines("foo bar\n");
        assert_eq!(unified_diff(&a, &b, &opts), "");
    }

    #[test]
    fn ignore_whitespace_result_is_independent_of_exact_whitespace() {
        let opts = DiffOptions {
            ignore_space_changes: true,
            ..Default::default()
        };

        let a1 = lines("foo   bar\nsame\n");
        let b1 = lines("foo bar\nsame\n");
        let a2 = lines("foo\tbar\nsame\n");
        let b2 = lines("foo  bar \nsame\n");

        assert_eq!(unified_diff(&a1, &b1, &opts), unified_diff(&a2, &b2, &opts));
    }

    #[test]
    fn ignore_case_suppresses_case_only_diffs() {
        let opts = DiffOptions {
            ignore_case: true,
            ..Default::default()
        };
        let a = lines("Hello World\n");
        let b = lines("hello world\n");
        assert_eq!(unified_diff(&a, &b, &opts), "");
    }

    #[test]
    fn ignore_blank_lines_suppresses_pure_blank_insert_or_delete() {
        let opts = DiffOptions {
            ignore_blank_lines: true,
            ..Default::default()
        };
        let a = lines("a\nb\n");
        let b = lines("a\n\nb\n");
        assert_eq!(unified_diff(&a, &b, &opts), "");
    }

    #[test]
    fn real_changes_still_show_with_ignore_flags_set() {
        let opts = DiffOptions {
            ignore_blank_lines: true,
            ignore_case: true,
            ignore_space_changes: true,
            ..Default::default()
        };
        let a = lines("one\ntwo\nthree\n");
        let b = lines("one\nTWO-changed\nthree\n");
        let diff = unified_diff(&a, &b, &opts);
        assert!(diff.contains("-two\n"));
        assert!(diff.contains("+TWO-changed\n"));
    }

    #[test]
    fn multiple_hunks_split_on_large_unchanged_runs() {
        let opts = DiffOptions {
            context: 2,
            ..Default::default()
        };
        let mut a_text = String::new();
        let mut b_text = String::new();
        for i in 0..5 {
            a_text.push_str(&format!("same{i}\n"));
            b_text.push_str(&format!("same{i}\n"));
        }
        a_text.push_str("old-1\n");
        b_text.push_str("new-1\n");
        for i in 0..20 {
            a_text.push_str(&format!("common{i}\n"));
            b_text.push_str(&format!("common{i}\n"));
        }
        a_text.push_str("old-2\n");
        b_text.push_str("new-2\n");
        for i in 0..5 {
            a_text.push_str(&format!("tail{i}\n"));
            b_text.push_str(&format!("tail{i}\n"));
        }

        let diff = unified_diff_text(&a_text, &b_text, &opts);
        assert_eq!(diff.matches("@@").count(), 4, "expected two separate hunks");
    }
}
