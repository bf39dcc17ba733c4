//! Document compiler: front-matter plus markdown body to HTML
//!
//! The body goes through a fixed sequence of passes over the
//! `pulldown-cmark` event stream:
//!
//! 1. parsing with tables and the other GFM extensions
//! 2. syntax highlighting of fenced code blocks
//! 3. expansion of custom component tags
//! 4. `id` anchors on headings
//! 5. images rewritten to captioned, lazily loaded figures

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, ClassStyle, ClassedHTMLGenerator, IncludeBackground};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::headings::parse_heading_line;
use super::{slugify, CompileError, ComponentRegistry, FrontMatter};
use crate::config::HighlightConfig;
use crate::helpers::html_escape;

/// Output of [`DocumentCompiler::compile`]
#[derive(Debug, Clone)]
pub struct CompiledDocument {
    pub front_matter: FrontMatter,
    /// Markdown body with the front-matter block removed
    pub body: String,
    /// Rendered body
    pub html: String,
}

/// Compiles post sources into HTML
pub struct DocumentCompiler {
    highlighter: Highlighter,
    components: ComponentRegistry,
}

impl DocumentCompiler {
    /// Create a compiler with the built-in components and default highlighting
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default(), ComponentRegistry::default())
    }

    /// Create with custom settings
    pub fn with_options(highlight: &HighlightConfig, components: ComponentRegistry) -> Self {
        Self {
            highlighter: Highlighter::new(&highlight.theme, highlight.line_number),
            components,
        }
    }

    /// Split off the front-matter and render the body
    pub fn compile(&self, source: &str) -> Result<CompiledDocument, CompileError> {
        let (front_matter, body) = FrontMatter::parse(source)?;
        let html = self.render(body)?;
        Ok(CompiledDocument {
            front_matter,
            body: body.to_string(),
            html,
        })
    }

    /// Render a markdown body (no front-matter) to HTML
    pub fn render(&self, markdown: &str) -> Result<String, CompileError> {
        let mut anchors = Vec::new();
        let events: Vec<Event> = Parser::new_ext(markdown, markdown_options())
            .into_offset_iter()
            .map(|(event, range)| {
                if let Event::Start(Tag::Heading { .. }) = &event {
                    anchors.push(source_anchor(&markdown[range]));
                }
                event
            })
            .collect();
        let events = self.highlight_code_blocks(events);
        let events = self.expand_components(events)?;
        let events = anchor_headings(events, anchors);
        let events = figure_images(events);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        Ok(html_output)
    }

    fn highlight_code_blocks<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => fence_language(&info),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlighter.highlight(&code, lang.as_deref());
                        out.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                other => out.push(other),
            }
        }

        out
    }

    fn expand_components<'a>(&self, events: Vec<Event<'a>>) -> Result<Vec<Event<'a>>, CompileError> {
        events
            .into_iter()
            .map(|event| match event {
                Event::Html(raw) => Ok(Event::Html(self.expand_fragment(raw)?)),
                Event::InlineHtml(raw) => Ok(Event::InlineHtml(self.expand_fragment(raw)?)),
                other => Ok(other),
            })
            .collect()
    }

    fn expand_fragment<'a>(&self, raw: CowStr<'a>) -> Result<CowStr<'a>, CompileError> {
        let expanded = self.components.expand(&raw)?;
        if expanded == *raw {
            Ok(raw)
        } else {
            Ok(CowStr::from(expanded))
        }
    }
}

impl Default for DocumentCompiler {
    fn default() -> Self {
        Self::new()
    }
}

fn markdown_options() -> Options {
    // Front-matter is split off by FrontMatter::parse, so no metadata blocks here
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_GFM
}

/// First word of a fence info string: "rust,ignore" and "js title=x" both name the language
fn fence_language(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

/// Anchor for a heading, read from its source line the way the table of
/// contents reads it
fn source_anchor(source: &str) -> Option<String> {
    source
        .lines()
        .next()
        .and_then(parse_heading_line)
        .map(|heading| heading.slug)
        .filter(|slug| !slug.is_empty())
}

/// Give every heading an `id`.
///
/// `anchors` holds one entry per heading in document order. Headings the
/// extractor cannot see (setext, indented) fall back to an explicit `{#id}`,
/// then to the slug of their rendered text.
fn anchor_headings(events: Vec<Event<'_>>, anchors: Vec<Option<String>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut anchors = anchors.into_iter();
    let mut heading: Option<(Tag, Option<String>, Vec<Event>, String)> = None;

    for event in events {
        match event {
            Event::Start(tag @ Tag::Heading { .. }) => {
                heading = Some((tag, anchors.next().flatten(), Vec::new(), String::new()));
            }
            Event::End(TagEnd::Heading(level)) => {
                let Some((tag, anchor, inner, text)) = heading.take() else {
                    out.push(Event::End(TagEnd::Heading(level)));
                    continue;
                };
                let tag = match tag {
                    Tag::Heading {
                        level,
                        id,
                        classes,
                        attrs,
                    } => {
                        let id = anchor.map(CowStr::from).or(id).or_else(|| {
                            let slug = slugify(text.trim());
                            (!slug.is_empty()).then(|| CowStr::from(slug))
                        });
                        Tag::Heading {
                            level,
                            id,
                            classes,
                            attrs,
                        }
                    }
                    other => other,
                };
                out.push(Event::Start(tag));
                out.extend(inner);
                out.push(Event::End(TagEnd::Heading(level)));
            }
            event => match heading.as_mut() {
                Some((_, _, inner, text)) => {
                    if let Event::Text(t) | Event::Code(t) = &event {
                        text.push_str(t);
                    }
                    inner.push(event);
                }
                None => out.push(event),
            },
        }
    }

    out
}

/// Turn `![alt](src "title")` into a captioned figure with a lazily loaded image
fn figure_images(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut image: Option<(CowStr, CowStr, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                image = Some((dest_url, title, String::new()));
            }
            Event::End(TagEnd::Image) => {
                if let Some((src, title, alt)) = image.take() {
                    out.push(Event::Html(CowStr::from(figure_html(&src, &title, &alt))));
                }
            }
            Event::Text(t) | Event::Code(t) if image.is_some() => {
                if let Some((_, _, alt)) = image.as_mut() {
                    alt.push_str(&t);
                }
            }
            _ if image.is_some() => {}
            other => out.push(other),
        }
    }

    out
}

fn figure_html(src: &str, title: &str, alt: &str) -> String {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, html_escape(title))
    };
    let caption = if alt.is_empty() {
        String::new()
    } else {
        format!("<figcaption>{}</figcaption>", html_escape(alt))
    };
    format!(
        r#"<figure class="post-image"><img src="{}" alt="{}"{} loading="lazy" decoding="async" sizes="100vw" style="width:100%;height:auto" />{}</figure>"#,
        html_escape(src),
        html_escape(alt),
        title_attr,
        caption
    )
}

/// Code highlighting with syntect
struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Option<Theme>,
    line_numbers: bool,
}

impl Highlighter {
    /// An unknown or empty theme name switches to CSS class output
    fn new(theme_name: &str, line_numbers: bool) -> Self {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = theme_set.themes.remove(theme_name);
        if theme.is_none() && !theme_name.is_empty() {
            tracing::warn!(
                "Unknown highlight theme {:?}, emitting CSS classes instead",
                theme_name
            );
        }
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            line_numbers,
        }
    }

    /// Highlight a code block
    fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = match &self.theme {
            Some(theme) => self.inline_styled(code, syntax, theme),
            None => self.classed(code, syntax),
        };
        let lang = html_escape(lang);

        match highlighted {
            Ok(body) if self.line_numbers => add_line_numbers(&body, &lang, code.lines().count()),
            Ok(body) => format!(
                r#"<pre class="highlight language-{lang}"{}><code class="language-{lang}">{body}</code></pre>"#,
                self.background_style()
            ),
            Err(e) => {
                tracing::debug!("Highlighting failed for {}: {}", lang, e);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    lang,
                    html_escape(code)
                )
            }
        }
    }

    fn inline_styled(
        &self,
        code: &str,
        syntax: &SyntaxReference,
        theme: &Theme,
    ) -> Result<String, syntect::Error> {
        let mut lines = HighlightLines::new(syntax, theme);
        let mut html = String::new();
        for line in LinesWithEndings::from(code) {
            let ranges = lines.highlight_line(line, &self.syntax_set)?;
            html.push_str(&styled_line_to_highlighted_html(
                &ranges[..],
                IncludeBackground::No,
            )?);
        }
        Ok(html)
    }

    fn classed(&self, code: &str, syntax: &SyntaxReference) -> Result<String, syntect::Error> {
        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntax_set,
            ClassStyle::Spaced,
        );
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }

    fn background_style(&self) -> String {
        self.theme
            .as_ref()
            .and_then(|theme| theme.settings.background)
            .map(|c| format!(r#" style="background-color:#{:02x}{:02x}{:02x};""#, c.r, c.g, c.b))
            .unwrap_or_default()
    }
}

/// Add a line-number gutter next to highlighted code
fn add_line_numbers(code: &str, lang: &str, line_count: usize) -> String {
    let gutter = (1..=line_count)
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
        lang, gutter, code
    )
}
