//! Content loader - reads posts named by the index

use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

use super::{ContentError, DocumentCompiler, Post, PostIndex, RenderedPost};
use crate::Blog;

/// Loads posts through a [`PostIndex`]
pub struct PostLoader<'a> {
    blog: &'a Blog,
    index: &'a PostIndex,
}

impl<'a> PostLoader<'a> {
    /// Create a new post loader
    pub fn new(blog: &'a Blog, index: &'a PostIndex) -> Self {
        Self { blog, index }
    }

    /// Load every post in the corpus, newest first
    pub fn load_posts(&self) -> Result<Vec<Post>, ContentError> {
        let mut posts = Vec::with_capacity(self.index.len());
        for slug in self.index.slugs() {
            posts.push(self.load_post(slug)?);
        }
        Post::sort_newest_first(&mut posts);
        Ok(posts)
    }

    /// Posts that may be listed publicly (index page, feed)
    pub fn load_public_posts(&self) -> Result<Vec<Post>, ContentError> {
        let mut posts = self.load_posts()?;
        posts.retain(|p| !p.hidden);
        Ok(posts)
    }

    /// Load a single post by slug
    pub fn load_post(&self, slug: &str) -> Result<Post, ContentError> {
        let path = self.index.resolve(slug)?;
        let text = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let modified = fs::metadata(path).ok().and_then(|m| m.modified().ok());
        self.post_from_source(slug, path, &text, modified.map(DateTime::<Utc>::from))
    }

    /// Load a post and compile it for display
    pub fn render_post(
        &self,
        slug: &str,
        compiler: &DocumentCompiler,
    ) -> Result<RenderedPost, ContentError> {
        let post = self.load_post(slug)?;
        compile(post, compiler)
    }

    fn post_from_source(
        &self,
        slug: &str,
        path: &Path,
        text: &str,
        modified: Option<DateTime<Utc>>,
    ) -> Result<Post, ContentError> {
        // The index may have matched a fragment; the post is named by its file
        let slug = super::post_slug(path).unwrap_or_else(|| slug.to_string());
        let mut post = Post::parse(&slug, path, text, &self.blog.config).map_err(|source| {
            ContentError::Compile {
                path: path.to_path_buf(),
                source,
            }
        })?;
        if post.date.is_none() {
            post.date = modified;
        }
        tracing::debug!("Loaded post {} from {:?}", post.slug, path);
        Ok(post)
    }
}

/// Compile a loaded post, attributing failures to its source file
pub fn compile(post: Post, compiler: &DocumentCompiler) -> Result<RenderedPost, ContentError> {
    let path = post.source.clone();
    RenderedPost::compile(post, compiler).map_err(|source| ContentError::Compile { path, source })
}
