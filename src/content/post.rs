//! Post model

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{extract_headings, CompileError, DocumentCompiler, FrontMatter, Heading};
use crate::config::SiteConfig;
use crate::helpers::full_url_for;

/// A blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// URL identity, taken from the file name
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date (front-matter, else file modification time)
    pub date: Option<DateTime<Utc>>,

    /// Author id
    pub author: String,

    pub excerpt: Option<String>,

    pub keywords: Vec<String>,

    /// Hidden posts are reachable by URL but not listed anywhere
    pub hidden: bool,

    /// Markdown body without the front-matter block
    pub raw: String,

    /// Source file path
    pub source: PathBuf,

    /// URL path (`/<slug>`)
    pub path: String,

    /// Absolute URL
    pub permalink: String,

    /// Everything the front-matter said, including custom keys
    pub front_matter: FrontMatter,
}

impl Post {
    /// Build a post from file contents
    pub fn parse(
        slug: &str,
        source: &Path,
        text: &str,
        config: &SiteConfig,
    ) -> Result<Self, CompileError> {
        let (front_matter, body) = FrontMatter::parse(text)?;

        if let Some(declared) = front_matter.slug.as_deref() {
            if declared != slug {
                tracing::warn!(
                    "{:?} declares slug {:?}; it is served as {:?}",
                    source,
                    declared,
                    slug
                );
            }
        }

        let path = format!("/{}", slug);
        Ok(Self {
            slug: slug.to_string(),
            title: front_matter.name.clone().unwrap_or_else(|| slug.to_string()),
            date: front_matter.parse_date(),
            author: front_matter
                .author
                .clone()
                .unwrap_or_else(|| config.author.clone()),
            excerpt: front_matter.excerpt.clone(),
            keywords: front_matter.keywords.clone(),
            hidden: front_matter.hidden,
            raw: body.to_string(),
            source: source.to_path_buf(),
            permalink: full_url_for(config, &path),
            path,
            front_matter,
        })
    }

    /// Newest first; undated posts go last, ties broken by slug
    pub fn sort_newest_first(posts: &mut [Post]) {
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
    }
}

/// A post together with everything needed to display it
#[derive(Debug, Clone)]
pub struct RenderedPost {
    pub post: Post,
    pub headings: Vec<Heading>,
    pub html: String,
}

impl RenderedPost {
    /// Extract headings and compile the body
    pub fn compile(post: Post, compiler: &DocumentCompiler) -> Result<Self, CompileError> {
        let headings = extract_headings(&post.raw).collect();
        let html = compiler.render(&post.raw)?;
        Ok(Self {
            post,
            headings,
            html,
        })
    }
}
