//! Generate static files

use anyhow::Result;

use crate::generator::{BuildSummary, Generator};
use crate::Blog;

/// Build the whole site into the public directory
pub fn run(blog: &Blog) -> Result<()> {
    build(blog).map(|_| ())
}

/// Build the site and report what was written
pub fn build(blog: &Blog) -> Result<BuildSummary> {
    let start = std::time::Instant::now();

    let index = blog.scan_index()?;
    let generator = Generator::new(blog)?;
    let summary = generator.generate(&index)?;

    tracing::info!(
        "Generated {} posts ({} hidden), {} feed entries and {} assets",
        summary.posts,
        summary.hidden,
        summary.feed_entries,
        summary.assets
    );
    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(summary)
}
