//! Generator module - writes the static site using the built-in templates

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::loader::{self, PostLoader};
use crate::content::{post_slug, DocumentCompiler, Post, PostIndex};
use crate::feed::Feed;
use crate::templates::PageRenderer;
use crate::Blog;

/// Static site generator
pub struct Generator {
    blog: Blog,
    renderer: PageRenderer,
    compiler: DocumentCompiler,
}

/// What a build wrote
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub posts: usize,
    pub hidden: usize,
    pub feed_entries: usize,
    pub assets: usize,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: PageRenderer::new(&blog.config)?,
            compiler: blog.compiler(),
        })
    }

    /// Every route a static build produces a post page for, as `/<slug>`
    pub fn static_paths(index: &PostIndex) -> Vec<String> {
        index.slugs().iter().map(|slug| format!("/{}", slug)).collect()
    }

    /// Generate the entire site
    pub fn generate(&self, index: &PostIndex) -> Result<BuildSummary> {
        fs::create_dir_all(&self.blog.public_dir)
            .with_context(|| format!("Failed to create {:?}", self.blog.public_dir))?;

        let loader = PostLoader::new(&self.blog, index);
        let mut posts = Vec::with_capacity(index.len());
        for slug in index.slugs() {
            posts.push(loader.load_post(slug)?);
        }
        Post::sort_newest_first(&mut posts);

        let mut summary = BuildSummary {
            posts: posts.len(),
            hidden: posts.iter().filter(|p| p.hidden).count(),
            ..BuildSummary::default()
        };

        // Assets first so a page never gets overwritten by a same-named file
        summary.assets = self.copy_source_assets()?;
        self.generate_post_pages(&posts)?;
        self.generate_index_page(&posts)?;
        self.generate_not_found_page()?;
        summary.feed_entries = self.generate_atom_feed(&posts)?;

        Ok(summary)
    }

    /// One `<slug>/index.html` per post, hidden ones included
    fn generate_post_pages(&self, posts: &[Post]) -> Result<()> {
        for post in posts {
            let rendered = loader::compile(post.clone(), &self.compiler)?;
            let html = self.renderer.render_post(&rendered)?;

            let output_path = self.blog.public_dir.join(&post.slug).join("index.html");
            write_file(&output_path, &html)?;
            tracing::debug!("Generated post: {:?}", output_path);
        }
        Ok(())
    }

    fn generate_index_page(&self, posts: &[Post]) -> Result<()> {
        let html = self.renderer.render_index(posts)?;
        write_file(&self.blog.public_dir.join("index.html"), &html)
    }

    fn generate_not_found_page(&self) -> Result<()> {
        let html = self.renderer.render_not_found(None)?;
        write_file(&self.blog.public_dir.join("404.html"), &html)
    }

    /// Write the Atom feed, returning how many entries it carries
    fn generate_atom_feed(&self, posts: &[Post]) -> Result<usize> {
        let mut feed = Feed::new(&self.blog.config);
        feed.add_posts(posts, &self.blog.config);
        let xml = feed.to_atom()?;

        let feed_path = self
            .blog
            .public_dir
            .join(self.blog.config.feed.path.trim_start_matches('/'));
        write_file(&feed_path, &xml)?;
        tracing::debug!("Generated feed: {:?}", feed_path);

        Ok(feed.entries().count())
    }

    /// Copy images and other non-post files from the content directory
    fn copy_source_assets(&self) -> Result<usize> {
        let content_dir = &self.blog.content_dir;
        if !content_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(content_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable asset: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            // Post sources are compiled, not copied
            if !entry.file_type().is_file() || post_slug(path).is_some() {
                continue;
            }

            let relative = path.strip_prefix(content_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
            copied += 1;
        }

        Ok(copied)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}
