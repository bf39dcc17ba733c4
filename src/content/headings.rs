//! Heading extraction for the table of contents

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::slugify;

lazy_static! {
    static ref HEADING: Regex = Regex::new(r"^(#{1,6})[ \t]+(.+)$").unwrap();
    static ref CLOSING_SEQUENCE: Regex = Regex::new(r"[ \t]+#+$").unwrap();
    static ref ATTRIBUTES: Regex = Regex::new(r"[ \t]*\{([^{}]*)\}$").unwrap();
    static ref INLINE_LINK: Regex = Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").unwrap();
    static ref FENCE: Regex = Regex::new(r"^ {0,3}(`{3,}|~{3,})").unwrap();
}

/// A heading found in a post body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub slug: String,
    pub title: String,
    pub level: usize,
}

/// Lazy iterator over the headings of a document, top to bottom.
///
/// A clone keeps the current position; [`Headings::restart`] begins again
/// from the first line. Lines inside fenced code blocks are never headings.
#[derive(Clone)]
pub struct Headings<'a> {
    text: &'a str,
    /// Byte offset of the next line to look at
    pos: usize,
    fence: Option<Fence>,
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl<'a> Headings<'a> {
    /// Start again from the top of the same document
    pub fn restart(&self) -> Headings<'a> {
        extract_headings(self.text)
    }
}

impl Iterator for Headings<'_> {
    type Item = Heading;

    fn next(&mut self) -> Option<Heading> {
        while self.pos < self.text.len() {
            let rest = &self.text[self.pos..];
            let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
            let line = rest[..line_len].trim_end_matches(['\n', '\r']);
            self.pos += line_len;

            if let Some(fence) = self.fence {
                if closes_fence(line, fence) {
                    self.fence = None;
                }
                continue;
            }
            if let Some(caps) = FENCE.captures(line) {
                let run = &caps[1];
                self.fence = run.chars().next().map(|marker| Fence {
                    marker,
                    len: run.len(),
                });
                continue;
            }
            if let Some(heading) = parse_heading_line(line) {
                return Some(heading);
            }
        }
        None
    }
}

/// Scan raw markdown for `#` headings
pub fn extract_headings(text: &str) -> Headings<'_> {
    Headings {
        text,
        pos: 0,
        fence: None,
    }
}

/// Read one `#` heading line.
///
/// The document compiler anchors rendered headings with this same function,
/// so a table-of-contents link always names an existing `id`. A closing `#`
/// run is dropped, a trailing `{#id}` block names the anchor outright, and
/// inline links count only by their text.
pub(crate) fn parse_heading_line(line: &str) -> Option<Heading> {
    let caps = HEADING.captures(line)?;
    let level = caps[1].len();
    let text = caps[2].trim();
    let text = CLOSING_SEQUENCE.replace(text, "");

    let (text, explicit_id) = match ATTRIBUTES.captures(&text) {
        Some(attrs) => {
            let id = attrs[1]
                .split_whitespace()
                .find_map(|attr| attr.strip_prefix('#'))
                .filter(|id| !id.is_empty())
                .map(str::to_string);
            let start = attrs.get(0).map_or(text.len(), |m| m.start());
            (text[..start].to_string(), id)
        }
        None => (text.to_string(), None),
    };

    let title = INLINE_LINK.replace_all(text.trim(), "$1").into_owned();
    if title.is_empty() && explicit_id.is_none() {
        return None;
    }
    let slug = explicit_id.unwrap_or_else(|| slugify(&title));
    Some(Heading { slug, title, level })
}

fn closes_fence(line: &str, fence: Fence) -> bool {
    let line = line.trim();
    line.len() >= fence.len && line.chars().all(|c| c == fence.marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_and_slugs() {
        let headings: Vec<_> = extract_headings("# Title\n## Sub\ntext\n### Deep").collect();
        assert_eq!(headings.len(), 3);
        assert_eq!(
            headings.iter().map(|h| h.level).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            headings.iter().map(|h| h.slug.as_str()).collect::<Vec<_>>(),
            vec!["title", "sub", "deep"]
        );
    }

    #[test]
    fn test_title_is_trimmed() {
        let heading = extract_headings("##   Spaced Out   \n").next().unwrap();
        assert_eq!(heading.title, "Spaced Out");
        assert_eq!(heading.slug, "spaced-out");
        assert_eq!(heading.level, 2);
    }

    #[test]
    fn test_marker_needs_whitespace() {
        assert_eq!(extract_headings("#hashtag\nplain text").count(), 0);
    }

    #[test]
    fn test_marker_must_start_line() {
        assert_eq!(extract_headings("text # not a heading").count(), 0);
    }

    #[test]
    fn test_crlf_line_endings() {
        let headings: Vec<_> = extract_headings("# One\r\n## Two\r\n").collect();
        assert_eq!(headings[0].title, "One");
        assert_eq!(headings[1].slug, "two");
    }

    #[test]
    fn test_restart() {
        let mut headings = extract_headings("# A\n# B");
        assert_eq!(headings.next().unwrap().title, "A");
        let again: Vec<_> = headings.restart().map(|h| h.title).collect();
        assert_eq!(again, vec!["A", "B"]);
        assert_eq!(headings.next().unwrap().title, "B");
        assert!(headings.next().is_none());
    }

    #[test]
    fn test_closing_sequence_dropped() {
        let heading = extract_headings("## Closing hashes ##").next().unwrap();
        assert_eq!(heading.title, "Closing hashes");
        assert_eq!(heading.slug, "closing-hashes");

        // `#` glued to a word is part of the title
        assert_eq!(extract_headings("## C#").next().unwrap().slug, "c");
    }

    #[test]
    fn test_explicit_id() {
        let heading = extract_headings("## Setup {#install .wide}").next().unwrap();
        assert_eq!(heading.title, "Setup");
        assert_eq!(heading.slug, "install");

        let heading = extract_headings("## Setup {.wide}").next().unwrap();
        assert_eq!(heading.slug, "setup");
    }

    #[test]
    fn test_links_count_by_text() {
        let heading = extract_headings("## See [docs](https://x.io)").next().unwrap();
        assert_eq!(heading.title, "See docs");
        assert_eq!(heading.slug, "see-docs");
    }

    #[test]
    fn test_fenced_code_skipped() {
        let text = "# Real
```bash
# comment
```
~~~~
## also code
```
~~~~
## After";
        let titles: Vec<_> = extract_headings(text).map(|h| h.title).collect();
        assert_eq!(titles, vec!["Real", "After"]);
    }

    #[test]
    fn test_marker_alone_is_not_a_heading() {
        assert_eq!(extract_headings("#
plain").count(), 0);
        assert_eq!(extract_headings("####### seven").count(), 0);
    }

    #[test]
    fn test_stable_across_runs() {
        let text = "# Hello World\n## Hello, World!";
        let first: Vec<_> = extract_headings(text).collect();
        let second: Vec<_> = extract_headings(text).collect();
        assert_eq!(first, second);
        assert_eq!(first[0].slug, first[1].slug);
    }
}
