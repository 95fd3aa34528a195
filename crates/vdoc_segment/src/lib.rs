//! # Section Segmentation
//!
//! Splits cleaned academic text into named structural sections (title,
//! abstract, introduction, ...) by recognizing heading lines.
//!
//! ## Algorithm
//!
//! The text is scanned line by line. A line opens a section when, after
//! trimming, lowercasing, and stripping an optional `<digits>.` prefix
//! ("3. Results"), it begins with one of that section's heading aliases.
//! Title detection runs after all other headings have been collected: the
//! first non-empty line that precedes the first recognized heading and
//! matches no alias becomes the document title. This avoids the fragile
//! "anything that is not another heading" negative match while keeping the
//! observable segmentation identical.
//!
//! A heading's span starts on the line after the heading and ends where the
//! next heading line begins (or at end of text). The title span is its own
//! line, since the title line *is* the content. Text with no recognizable
//! headings degrades to a single [`Section::Unknown`] span covering
//! everything; segmentation never fails, even on empty input.
//!
//! ```
//! use vdoc_segment::{segment, section_texts, Section};
//!
//! let text = "Abstract\nfoo bar\nIntroduction\nbaz qux";
//! let spans = segment(text);
//! let sections = section_texts(text, &spans);
//!
//! assert_eq!(sections[&Section::Abstract], "foo bar");
//! assert_eq!(sections[&Section::Introduction], "baz qux");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Structural tags a document section can carry.
///
/// The set is closed: anything that is not a recognized heading lands in
/// [`Section::Unknown`]. Ordering follows conventional document order so
/// maps keyed by `Section` iterate deterministically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Title,
    Abstract,
    Introduction,
    Methodology,
    Results,
    Discussion,
    Conclusion,
    Acknowledgements,
    References,
    Unknown,
}

impl Section {
    /// Stable string name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Title => "title",
            Section::Abstract => "abstract",
            Section::Introduction => "introduction",
            Section::Methodology => "methodology",
            Section::Results => "results",
            Section::Discussion => "discussion",
            Section::Conclusion => "conclusion",
            Section::Acknowledgements => "acknowledgements",
            Section::References => "references",
            Section::Unknown => "unknown",
        }
    }

    /// Sections recognizable by a heading line, in match order.
    const HEADED: [Section; 8] = [
        Section::Abstract,
        Section::Introduction,
        Section::Methodology,
        Section::Results,
        Section::Discussion,
        Section::Conclusion,
        Section::Acknowledgements,
        Section::References,
    ];

    /// Heading aliases for this section. Title and Unknown have none: title
    /// is classified by elimination, unknown is the no-headings fallback.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Section::Abstract => &["abstract"],
            Section::Introduction => &["introduction"],
            Section::Methodology => &[
                "methodology",
                "methods",
                "materials and methods",
                "experimental setup",
            ],
            Section::Results => &["results"],
            Section::Discussion => &["discussion"],
            Section::Conclusion => &["conclusions", "conclusion"],
            Section::Acknowledgements => &[
                "acknowledgements",
                "acknowledgments",
                "acknowledgement",
            ],
            Section::References => &[
                "references",
                "bibliography",
                "works cited",
                "literature cited",
            ],
            Section::Title | Section::Unknown => &[],
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contiguous section span in the source text, as char offsets.
///
/// Spans never overlap and appear in document order. Start offsets are
/// monotonically non-decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpan {
    pub section: Section,
    /// Byte offset (inclusive) into the source text.
    pub start: usize,
    /// Byte offset (exclusive) into the source text.
    pub end: usize,
}

impl SectionSpan {
    /// The raw text covered by this span.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Split `text` into an ordered sequence of section spans.
///
/// Duplicate heading tags are preserved in the span sequence. If no heading
/// is recognized the whole text becomes one `Unknown` span; empty input
/// yields a single empty `Unknown` span rather than failing.
pub fn segment(text: &str) -> Vec<SectionSpan> {
    // Line starts, accumulated over line lengths plus the stripped newline.
    let lines: Vec<&str> = text.split('\n').collect();
    let mut line_starts = Vec::with_capacity(lines.len());
    let mut offset = 0usize;
    for line in &lines {
        line_starts.push(offset);
        offset += line.len() + 1;
    }

    // Pass 1: collect every non-title heading hit in document order.
    let mut headings: Vec<(Section, usize)> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(section) = match_heading(trimmed) {
            headings.push((section, idx));
        }
    }

    if headings.is_empty() {
        return vec![SectionSpan {
            section: Section::Unknown,
            start: 0,
            end: text.len(),
        }];
    }

    // Pass 2: the first non-empty line before the first recognized heading
    // that matched nothing is the document title.
    let first_heading_line = headings[0].1;
    let title_line = lines[..first_heading_line]
        .iter()
        .position(|line| !line.trim().is_empty());
    if let Some(idx) = title_line {
        headings.insert(0, (Section::Title, idx));
    }

    // Each heading opens a span ending at the next heading line (or EOF).
    // The title line is itself the content; other headings start below
    // their heading line.
    let mut spans = Vec::with_capacity(headings.len());
    for (k, &(section, line_idx)) in headings.iter().enumerate() {
        let start = if section == Section::Title {
            line_starts[line_idx]
        } else {
            next_line_start(&line_starts, line_idx, text.len())
        };
        let end = match headings.get(k + 1) {
            Some(&(_, next_idx)) => line_starts[next_idx],
            None => text.len(),
        };
        spans.push(SectionSpan {
            section,
            start: start.min(end),
            end,
        });
    }
    spans
}

/// Collect span texts into a `Section -> text` map, trimming each span.
///
/// When a tag repeats, the later span wins.
pub fn section_texts(text: &str, spans: &[SectionSpan]) -> BTreeMap<Section, String> {
    let mut map = BTreeMap::new();
    for span in spans {
        map.insert(span.section, span.text(text).trim().to_string());
    }
    map
}

/// Classify a trimmed line as a non-title heading, if it is one.
fn match_heading(line: &str) -> Option<Section> {
    let lowered = line.to_lowercase();
    let stripped = strip_numeral_prefix(&lowered);
    Section::HEADED
        .iter()
        .copied()
        .find(|section| {
            section
                .aliases()
                .iter()
                .any(|alias| stripped.starts_with(alias))
        })
}

/// Strip a leading `<digits>.` heading number ("3. Results" -> "Results").
fn strip_numeral_prefix(line: &str) -> &str {
    let digits = line.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 && line[digits..].starts_with('.') {
        line[digits + 1..].trim_start()
    } else {
        line
    }
}

fn next_line_start(line_starts: &[usize], line_idx: usize, text_len: usize) -> usize {
    match line_starts.get(line_idx + 1) {
        Some(&start) => start,
        None => text_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_headings_split_in_order() {
        let text = "Abstract\nfoo bar\nIntroduction\nbaz qux";
        let spans = segment(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].section, Section::Abstract);
        assert_eq!(spans[1].section, Section::Introduction);
        assert!(spans[0].end <= spans[1].start, "spans must not overlap");

        let sections = section_texts(text, &spans);
        assert_eq!(sections[&Section::Abstract], "foo bar");
        assert_eq!(sections[&Section::Introduction], "baz qux");
    }

    #[test]
    fn no_headings_yields_single_unknown_span() {
        let text = "just some prose\nwith no structure at all";
        let spans = segment(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].section, Section::Unknown);
        assert_eq!(spans[0].start, 0);
        assert_eq!(spans[0].end, text.len());
    }

    #[test]
    fn empty_input_yields_empty_unknown_span() {
        let spans = segment("");
        assert_eq!(
            spans,
            vec![SectionSpan {
                section: Section::Unknown,
                start: 0,
                end: 0
            }]
        );
    }

    #[test]
    fn title_is_first_unmatched_line_before_headings() {
        let text = "A Study of Rust Borrowing\nAbstract\nwe study things\nReferences\n[1] someone";
        let spans = segment(text);
        assert_eq!(spans[0].section, Section::Title);
        let sections = section_texts(text, &spans);
        assert_eq!(sections[&Section::Title], "A Study of Rust Borrowing");
        assert_eq!(sections[&Section::Abstract], "we study things");
        assert_eq!(sections[&Section::References], "[1] someone");
    }

    #[test]
    fn numbered_and_mixed_case_headings_match() {
        let text = "Paper\nABSTRACT\nsummary here\n3. Results\nnumbers went up\n5. Conclusions\ndone";
        let sections = section_texts(text, &segment(text));
        assert_eq!(sections[&Section::Abstract], "summary here");
        assert_eq!(sections[&Section::Results], "numbers went up");
        assert_eq!(sections[&Section::Conclusion], "done");
    }

    #[test]
    fn methodology_aliases_recognized() {
        for heading in ["Methods", "Materials and Methods", "Experimental Setup"] {
            let text = format!("T\nAbstract\na b c\n{heading}\nwe did science");
            let sections = section_texts(&text, &segment(&text));
            assert_eq!(
                sections.get(&Section::Methodology).map(String::as_str),
                Some("we did science"),
                "alias {heading:?} should open a methodology section"
            );
        }
    }

    #[test]
    fn repeated_heading_keeps_later_span_in_map() {
        let text = "Abstract\nfirst version\nAbstract\nsecond version";
        let spans = segment(text);
        // Both hits stay in the ordered span sequence.
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].section, Section::Abstract);
        assert_eq!(spans[1].section, Section::Abstract);

        let sections = section_texts(text, &spans);
        assert_eq!(sections[&Section::Abstract], "second version");
    }

    #[test]
    fn heading_free_preamble_does_not_become_title() {
        // Title only exists relative to some recognized heading.
        let text = "One line\nAnother line";
        let spans = segment(text);
        assert_eq!(spans[0].section, Section::Unknown);
    }

    #[test]
    fn spans_are_monotonic() {
        let text = "My Title\nAbstract\none\nIntroduction\ntwo\nDiscussion\nthree\nReferences\nfour";
        let spans = segment(text);
        for pair in spans.windows(2) {
            assert!(pair[0].start <= pair[1].start);
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn heading_on_last_line_gets_empty_span() {
        let text = "T\nAbstract\nbody\nReferences";
        let sections = section_texts(text, &segment(text));
        assert_eq!(sections[&Section::References], "");
    }
}
