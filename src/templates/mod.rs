//! Page rendering with built-in Tera templates
//!
//! The templates are embedded in the binary; a page is the layout plus one
//! of `post.html`, `index.html` or `not_found.html`.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::{AuthorLink, SiteConfig};
use crate::content::{Post, RenderedPost};
use crate::helpers::{author_url, date_display, date_iso, date_short, toc, url_for};

/// Deepest heading level shown in the table of contents
const TOC_MAX_DEPTH: usize = 6;

/// Template renderer with the embedded blog templates
pub struct PageRenderer {
    tera: Tera,
    site: SiteData,
    config: SiteConfig,
}

impl PageRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        // Register all templates
        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("post.html", include_str!("blog/post.html")),
            ("index.html", include_str!("blog/index.html")),
            ("not_found.html", include_str!("blog/not_found.html")),
            // Partials
            (
                "partials/footer.html",
                include_str!("blog/partials/footer.html"),
            ),
            (
                "partials/author_links.html",
                include_str!("blog/partials/author_links.html"),
            ),
        ])?;

        Ok(Self {
            tera,
            site: SiteData::from_config(config),
            config: config.clone(),
        })
    }

    /// Render a post page
    pub fn render_post(&self, rendered: &RenderedPost) -> Result<String> {
        let mut context = self.context();
        context.insert("post", &self.post_data(rendered));
        Ok(self.tera.render("post.html", &context)?)
    }

    /// Render the blog index; hidden posts are never listed
    pub fn render_index(&self, posts: &[Post]) -> Result<String> {
        let items: Vec<ListItem> = posts
            .iter()
            .filter(|p| !p.hidden)
            .map(|p| ListItem {
                title: p.title.clone(),
                path: url_for(&self.config, &p.path),
                date_iso: p.date.as_ref().map(date_iso),
                date_short: p.date.as_ref().map(date_short).unwrap_or_default(),
                excerpt: p.excerpt.clone().unwrap_or_default(),
            })
            .collect();

        let mut context = self.context();
        context.insert("posts", &items);
        Ok(self.tera.render("index.html", &context)?)
    }

    /// Render the not-found page, optionally naming the slug that was asked for
    pub fn render_not_found(&self, slug: Option<&str>) -> Result<String> {
        let mut context = self.context();
        context.insert("slug", &slug);
        Ok(self.tera.render("not_found.html", &context)?)
    }

    fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context
    }

    fn post_data(&self, rendered: &RenderedPost) -> PostPageData {
        let post = &rendered.post;
        let author = self.config.author(&post.author);

        PostPageData {
            title: post.title.clone(),
            excerpt: post.excerpt.clone().unwrap_or_default(),
            keywords: post.keywords.join(", "),
            hidden: post.hidden,
            theme_color: if post.hidden {
                self.config.hidden_theme_color.clone()
            } else {
                self.config.theme_color.clone()
            },
            date_iso: post.date.as_ref().map(date_iso),
            date_display: post.date.as_ref().map(date_display).unwrap_or_default(),
            author: AuthorData {
                id: post.author.clone(),
                name: author.name,
                url: author_url(&self.config, &post.author),
                links: author.links,
            },
            toc: toc(&rendered.headings, TOC_MAX_DEPTH),
            content: rendered.html.clone(),
        }
    }
}

/// Site-wide values every template sees
#[derive(Debug, Clone, Serialize)]
struct SiteData {
    title: String,
    description: String,
    language: String,
    theme_color: String,
    generator: String,
    root_url: String,
    feed_url: String,
    license_name: String,
    license_url: String,
}

impl SiteData {
    fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            theme_color: config.theme_color.clone(),
            generator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            root_url: url_for(config, "/"),
            feed_url: url_for(config, &config.feed.path),
            license_name: config.license.name.clone(),
            license_url: config.license.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct PostPageData {
    title: String,
    excerpt: String,
    keywords: String,
    hidden: bool,
    theme_color: String,
    date_iso: Option<String>,
    date_display: String,
    author: AuthorData,
    toc: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct AuthorData {
    id: String,
    name: String,
    url: String,
    links: Vec<AuthorLink>,
}

#[derive(Debug, Clone, Serialize)]
struct ListItem {
    title: String,
    path: String,
    date_iso: Option<String>,
    date_short: String,
    excerpt: String,
}
