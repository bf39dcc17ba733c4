//! List site content

use anyhow::Result;
use serde::Serialize;
use std::fs;

use crate::content::loader::PostLoader;
use crate::content::{extract_headings, FrontMatter, Heading};
use crate::generator::Generator;
use crate::helpers::date_short;
use crate::Blog;

/// What `list` should print
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListKind {
    Posts,
    Routes,
    Headings(String),
}

impl ListKind {
    /// Parse the `list` arguments (`posts`, `routes`, `headings <slug>`)
    pub fn parse(kind: &str, slug: Option<&str>) -> Result<Self> {
        match (kind, slug) {
            ("post" | "posts", _) => Ok(Self::Posts),
            ("route" | "routes", _) => Ok(Self::Routes),
            ("heading" | "headings", Some(slug)) => Ok(Self::Headings(slug.to_string())),
            ("heading" | "headings", None) => anyhow::bail!("`list headings` needs a post slug"),
            _ => anyhow::bail!("Unknown type: {}. Available: posts, routes, headings", kind),
        }
    }
}

#[derive(Debug, Serialize)]
struct PostRow {
    slug: String,
    title: String,
    date: Option<String>,
    hidden: bool,
    source: String,
}

/// Print the listing, as text or JSON
pub fn run(blog: &Blog, kind: &ListKind, json: bool) -> Result<()> {
    println!("{}", render(blog, kind, json)?);
    Ok(())
}

/// Build the listing text
pub fn render(blog: &Blog, kind: &ListKind, json: bool) -> Result<String> {
    let index = blog.scan_index()?;

    match kind {
        ListKind::Posts => {
            let posts = PostLoader::new(blog, &index).load_posts()?;
            let rows: Vec<PostRow> = posts
                .iter()
                .map(|p| PostRow {
                    slug: p.slug.clone(),
                    title: p.title.clone(),
                    date: p.date.as_ref().map(date_short),
                    hidden: p.hidden,
                    source: p.source.display().to_string(),
                })
                .collect();

            if json {
                return Ok(serde_json::to_string_pretty(&rows)?);
            }
            let mut out = format!("Posts ({}):", rows.len());
            for row in rows {
                out.push_str(&format!(
                    "\n  {} - {}{} [{}]",
                    row.date.as_deref().unwrap_or("----------"),
                    row.title,
                    if row.hidden { " (hidden)" } else { "" },
                    row.source
                ));
            }
            Ok(out)
        }
        ListKind::Routes => {
            let feed_route = format!("/{}", blog.config.feed.path.trim_start_matches('/'));
            let mut routes = vec!["/".to_string(), feed_route];
            routes.extend(Generator::static_paths(&index));

            if json {
                return Ok(serde_json::to_string_pretty(&routes)?);
            }
            let mut out = format!("Routes ({}):", routes.len());
            for route in routes {
                out.push_str(&format!("\n  {}", route));
            }
            Ok(out)
        }
        ListKind::Headings(slug) => {
            let path = index.resolve(slug)?;
            let text = fs::read_to_string(path)?;
            let (_, body) = FrontMatter::parse(&text)?;
            let headings: Vec<Heading> = extract_headings(body).collect();

            if json {
                return Ok(serde_json::to_string_pretty(&headings)?);
            }
            let mut out = format!("Headings ({}):", headings.len());
            for heading in headings {
                out.push_str(&format!(
                    "\n  {}{} #{}",
                    "  ".repeat(heading.level.saturating_sub(1)),
                    heading.title,
                    heading.slug
                ));
            }
            Ok(out)
        }
    }
}
