//! Table of contents markup

use super::html_escape;
use crate::content::Heading;

/// Nested `<ol>` list linking to each heading's anchor.
///
/// Levels deeper than `max_depth` are skipped. A jump of more than one level
/// opens intermediate lists so the nesting always matches the levels.
pub fn toc(headings: &[Heading], max_depth: usize) -> String {
    let mut html = r#"<ol class="toc">"#.to_string();
    let base = headings
        .iter()
        .filter(|h| h.level <= max_depth)
        .map(|h| h.level)
        .min()
        .unwrap_or(1);
    let mut current_level = base;

    for heading in headings.iter().filter(|h| h.level <= max_depth) {
        // Adjust nesting
        while current_level < heading.level {
            html.push_str("<ol>");
            current_level += 1;
        }
        while current_level > heading.level {
            html.push_str("</ol>");
            current_level -= 1;
        }

        html.push_str(&format!(
            "<li class=\"toc-item toc-level-{}\"><a class=\"toc-link\" href=\"#{}\"><span class=\"toc-text\">{}</span></a></li>",
            heading.level,
            html_escape(&heading.slug),
            html_escape(&heading.title)
        ));
    }

    while current_level > base {
        html.push_str("</ol>");
        current_level -= 1;
    }

    html.push_str("</ol>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::extract_headings;

    #[test]
    fn test_nesting() {
        let headings: Vec<_> = extract_headings("# A\n## B\n### C\n# D").collect();
        let html = toc(&headings, 6);
        assert_eq!(
            html,
            concat!(
                r#"<ol class="toc">"#,
                r##"<li class="toc-item toc-level-1"><a class="toc-link" href="#a"><span class="toc-text">A</span></a></li>"##,
                "<ol>",
                r##"<li class="toc-item toc-level-2"><a class="toc-link" href="#b"><span class="toc-text">B</span></a></li>"##,
                "<ol>",
                r##"<li class="toc-item toc-level-3"><a class="toc-link" href="#c"><span class="toc-text">C</span></a></li>"##,
                "</ol></ol>",
                r##"<li class="toc-item toc-level-1"><a class="toc-link" href="#d"><span class="toc-text">D</span></a></li>"##,
                "</ol>"
            )
        );
    }

    #[test]
    fn test_starts_at_shallowest_level() {
        let headings: Vec<_> = extract_headings("## One\n### Two\n## Three").collect();
        let html = toc(&headings, 6);
        assert!(html.starts_with(r#"<ol class="toc"><li class="toc-item toc-level-2">"#));
        assert_eq!(html.matches("<ol").count(), html.matches("</ol>").count());
    }

    #[test]
    fn test_max_depth() {
        let headings: Vec<_> = extract_headings("# A\n## B\n### C").collect();
        let html = toc(&headings, 2);
        assert!(html.contains("#b"));
        assert!(!html.contains("#c"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(toc(&[], 6), r#"<ol class="toc"></ol>"#);
    }

    #[test]
    fn test_title_escaped() {
        let headings: Vec<_> = extract_headings("# Vec<T> & friends").collect();
        assert!(toc(&headings, 6).contains("Vec&lt;T&gt; &amp; friends"));
    }
}
