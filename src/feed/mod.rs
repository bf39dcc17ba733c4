//! Atom feed of public posts
//!
//! The feed keeps one entry per slug. Repopulating it from the corpus is
//! idempotent, so a server may call [`Feed::add_posts`] on every request
//! without ever duplicating an entry.

use anyhow::Result;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::full_url_for;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// One feed entry, derived from a public post
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub slug: String,
    pub title: String,
    pub url: String,
    pub date: DateTime<Utc>,
    pub author: String,
    pub excerpt: Option<String>,
}

/// Slug-keyed feed object
#[derive(Debug, Clone)]
pub struct Feed {
    title: String,
    subtitle: String,
    site_url: String,
    self_url: String,
    author: String,
    rights: String,
    limit: usize,
    entries: IndexMap<String, FeedEntry>,
}

impl Feed {
    /// An empty feed carrying the site-level metadata
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.description.clone(),
            site_url: full_url_for(config, "/"),
            self_url: full_url_for(config, &config.feed.path),
            author: config.author(&config.author).name,
            rights: format!("{} ({})", config.license.name, config.license.url),
            limit: config.feed.limit,
            entries: IndexMap::new(),
        }
    }

    /// Bring the entries in line with `posts`.
    ///
    /// Hidden posts are skipped, an existing entry with the same slug is
    /// replaced, and entries whose post is gone are dropped.
    pub fn add_posts(&mut self, posts: &[Post], config: &SiteConfig) {
        self.entries
            .retain(|slug, _| posts.iter().any(|p| !p.hidden && &p.slug == slug));

        for post in posts.iter().filter(|p| !p.hidden) {
            let entry = FeedEntry {
                slug: post.slug.clone(),
                title: post.title.clone(),
                url: post.permalink.clone(),
                date: post.date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
                author: config.author(&post.author).name,
                excerpt: post.excerpt.clone(),
            };
            self.entries.insert(entry.slug.clone(), entry);
        }

        self.entries.sort_by(|_, a, _, b| {
            b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug))
        });
        tracing::debug!("Feed holds {} entries", self.entries.len());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&FeedEntry> {
        self.entries.get(slug)
    }

    /// Entries that make it into the document, newest first
    pub fn entries(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.values().take(self.limit)
    }

    /// Date of the newest entry
    pub fn updated(&self) -> DateTime<Utc> {
        self.entries
            .values()
            .map(|e| e.date)
            .max()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Serialize as an Atom 1.0 document
    pub fn to_atom(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut feed = BytesStart::new("feed");
        feed.push_attribute(("xmlns", ATOM_NS));
        writer.write_event(Event::Start(feed))?;

        write_text_element(&mut writer, "id", &self.site_url)?;
        write_text_element(&mut writer, "title", &self.title)?;
        if !self.subtitle.is_empty() {
            write_text_element(&mut writer, "subtitle", &self.subtitle)?;
        }
        write_text_element(&mut writer, "updated", &self.updated().to_rfc3339())?;
        write_link(&mut writer, &self.site_url, Some("alternate"))?;
        write_link(&mut writer, &self.self_url, Some("self"))?;
        write_author(&mut writer, &self.author)?;
        write_text_element(&mut writer, "rights", &self.rights)?;
        write_text_element(&mut writer, "generator", env!("CARGO_PKG_NAME"))?;

        for entry in self.entries() {
            writer.write_event(Event::Start(BytesStart::new("entry")))?;
            write_text_element(&mut writer, "id", &entry.url)?;
            write_text_element(&mut writer, "title", &entry.title)?;
            write_link(&mut writer, &entry.url, Some("alternate"))?;
            write_text_element(&mut writer, "published", &entry.date.to_rfc3339())?;
            write_text_element(&mut writer, "updated", &entry.date.to_rfc3339())?;
            write_author(&mut writer, &entry.author)?;
            if let Some(excerpt) = entry.excerpt.as_deref().filter(|e| !e.is_empty()) {
                write_text_element(&mut writer, "summary", excerpt)?;
            }
            writer.write_event(Event::End(BytesEnd::new("entry")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("feed")))?;

        let xml = String::from_utf8(writer.into_inner().into_inner())?;
        Ok(xml)
    }
}

fn write_text_element(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_link(writer: &mut Writer<Cursor<Vec<u8>>>, href: &str, rel: Option<&str>) -> Result<()> {
    let mut link = BytesStart::new("link");
    if let Some(rel) = rel {
        link.push_attribute(("rel", rel));
    }
    link.push_attribute(("href", href));
    writer.write_event(Event::Empty(link))?;
    Ok(())
}

fn write_author(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("author")))?;
    write_text_element(writer, "name", name)?;
    writer.write_event(Event::End(BytesEnd::new("author")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config() -> SiteConfig {
        SiteConfig {
            title: "Test Blog".to_string(),
            url: "https://blog.example.com".to_string(),
            ..SiteConfig::default()
        }
    }

    fn post(slug: &str, front_matter: &str) -> Post {
        let text = format!("---\n{}\n---\nbody\n", front_matter);
        Post::parse(slug, Path::new("p.mdx"), &text, &config()).unwrap()
    }

    #[test]
    fn test_hidden_posts_are_skipped() {
        let cfg = config();
        let mut feed = Feed::new(&cfg);
        feed.add_posts(
            &[post("a", "hidden: false"), post("b", "hidden: true")],
            &cfg,
        );
        let slugs: Vec<_> = feed.entries().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a"]);

        let xml = feed.to_atom().unwrap();
        assert_eq!(xml.matches("<entry>").count(), 1);
        assert!(xml.contains("https://blog.example.com/a"));
        assert!(!xml.contains("https://blog.example.com/b"));
    }

    #[test]
    fn test_repopulation_is_idempotent() {
        let cfg = config();
        let posts = vec![
            post("a", "name: First\ndate: 2023-01-01"),
            post("b", "name: Second\ndate: 2023-02-01"),
        ];
        let mut feed = Feed::new(&cfg);
        feed.add_posts(&posts, &cfg);
        let first = feed.to_atom().unwrap();
        feed.add_posts(&posts, &cfg);
        feed.add_posts(&posts, &cfg);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.to_atom().unwrap(), first);
    }

    #[test]
    fn test_last_write_wins_and_removed_posts_drop() {
        let cfg = config();
        let mut feed = Feed::new(&cfg);
        feed.add_posts(&[post("a", "name: Old title"), post("b", "name: B")], &cfg);
        feed.add_posts(&[post("a", "name: New title")], &cfg);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.get("a").unwrap().title, "New title");
        assert!(feed.get("b").is_none());
    }

    #[test]
    fn test_post_becoming_hidden_leaves_feed() {
        let cfg = config();
        let mut feed = Feed::new(&cfg);
        feed.add_posts(&[post("a", "hidden: false")], &cfg);
        feed.add_posts(&[post("a", "hidden: true")], &cfg);
        assert!(feed.is_empty());
    }

    #[test]
    fn test_newest_first_and_limit() {
        let mut cfg = config();
        cfg.feed.limit = 2;
        let mut feed = Feed::new(&cfg);
        feed.add_posts(
            &[
                post("old", "date: 2020-01-01"),
                post("new", "date: 2024-01-01"),
                post("mid", "date: 2022-01-01"),
            ],
            &cfg,
        );
        let slugs: Vec<_> = feed.entries().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "mid"]);
        assert_eq!(feed.updated().to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_atom_document_shape() {
        let cfg = config();
        let mut feed = Feed::new(&cfg);
        feed.add_posts(
            &[post(
                "fish",
                "name: Fish & Chips <3\ndate: 2023-01-05\nexcerpt: Tasty\nauthor: alice",
            )],
            &cfg,
        );
        let xml = feed.to_atom().unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(xml.contains(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#));
        assert!(xml.contains("<title>Test Blog</title>"));
        assert!(xml.contains(r#"<link rel="self" href="https://blog.example.com/feed.atom"/>"#));
        assert!(xml.contains("<title>Fish &amp; Chips &lt;3</title>"));
        assert!(xml.contains("<published>2023-01-05T00:00:00+00:00</published>"));
        assert!(xml.contains("<summary>Tasty</summary>"));
        assert!(xml.contains("<name>alice</name>"));
        assert!(xml.trim_end().ends_with("</feed>"));
    }
}
