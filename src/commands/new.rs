//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Blog;

/// Write a new post file named after `slug`, or the slugified title
pub fn create_post(blog: &Blog, title: &str, slug: Option<&str>) -> Result<PathBuf> {
    let now = chrono::Local::now();

    // Transliterates, so the file name stays ASCII
    let slug = ::slug::slugify(slug.unwrap_or(title));
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from {:?}", title);
    }

    fs::create_dir_all(&blog.content_dir)?;
    let file_path = blog.content_dir.join(format!("{}.mdx", slug));

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let content = format!(
        "---\nname: {}\ndate: {}\nauthor: {}\nexcerpt: ''\nkeywords: []\nhidden: true\n---\n",
        yaml_string(title),
        now.format("%Y-%m-%d %H:%M:%S"),
        yaml_string(&blog.config.author),
    );
    fs::write(&file_path, content)?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

/// Quote a value for a single-line YAML scalar
fn yaml_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;
    use tempfile::TempDir;

    #[test]
    fn test_new_post_front_matter() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(&blog, "It's a Tale: Part 2", None).unwrap();
        assert_eq!(path, blog.content_dir.join("it-s-a-tale-part-2.mdx"));

        let text = fs::read_to_string(&path).unwrap();
        let (front_matter, body) = FrontMatter::parse(&text).unwrap();
        assert_eq!(front_matter.name.as_deref(), Some("It's a Tale: Part 2"));
        assert_eq!(front_matter.author.as_deref(), Some("anonymous"));
        assert!(front_matter.hidden);
        assert!(front_matter.parse_date().is_some());
        assert!(body.trim().is_empty());
    }

    #[test]
    fn test_new_post_explicit_slug_and_conflict() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(&blog, "Whatever", Some("My Slug")).unwrap();
        assert!(path.ends_with("my-slug.mdx"));
        assert!(create_post(&blog, "Other", Some("my-slug")).is_err());
    }

    #[test]
    fn test_new_post_needs_a_name() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert!(create_post(&blog, "???", None).is_err());
    }
}
