//! Initialize a new blog

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r##"# inkpress configuration

# Site
title: My Blog
description: ''
author: anonymous
language: en

# URL
url: http://example.com
root: /

# Directory
content_dir: posts
public_dir: public

# Appearance
theme_color: '#171717'
hidden_theme_color: '#ebb305'
highlight:
  theme: base16-ocean.dark
  line_number: false

# Feed
feed:
  path: feed.atom
  limit: 20

# Footer
license:
  name: CC BY-NC-SA 4.0
  url: https://creativecommons.org/licenses/by-nc-sa/4.0/

# Authors, keyed by the id used in post front-matter
authors:
  anonymous:
    name: Anonymous
    links: []
"##;

/// Initialize a new blog in the given directory.
///
/// An existing `_config.yml` or sample post is left alone.
pub fn init_site(target_dir: &Path) -> Result<()> {
    let content_dir = target_dir.join("posts");
    fs::create_dir_all(&content_dir)
        .with_context(|| format!("Failed to create {:?}", content_dir))?;

    write_if_missing(&target_dir.join("_config.yml"), DEFAULT_CONFIG)?;

    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
name: Hello World
date: {}
excerpt: The first post on this blog.
keywords: [hello]
---

Welcome! Posts are markdown files in `posts/`; the file name is the URL.

## Writing

```bash
$ inkpress new "My New Post"
```

## Previewing

```bash
$ inkpress server
```

## Publishing

```bash
$ inkpress generate
```
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );
    write_if_missing(&content_dir.join("hello-world.mdx"), &sample_post)?;

    Ok(())
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        tracing::warn!("Keeping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!("Created {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Blog;
    use tempfile::TempDir;

    #[test]
    fn test_init_scaffolds_a_working_blog() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "My Blog");
        assert_eq!(blog.config.author("anonymous").name, "Anonymous");

        let index = blog.scan_index().unwrap();
        assert_eq!(index.slugs(), vec!["hello-world"]);
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_config.yml"), "title: Mine\n").unwrap();
        init_site(dir.path()).unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "Mine");
    }
}
