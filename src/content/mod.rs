//! Content module - post files, front-matter and the markdown pipeline

mod compiler;
mod components;
mod error;
mod frontmatter;
mod headings;
mod index;
pub mod loader;
mod post;
mod slug;

pub use compiler::{CompiledDocument, DocumentCompiler};
pub use components::{Component, ComponentRegistry, Props};
pub use error::{CompileError, ContentError};
pub use frontmatter::{parse_date_string, FrontMatter};
pub use headings::{extract_headings, Heading, Headings};
pub use index::{post_slug, IndexEntry, PostIndex};
pub use post::{Post, RenderedPost};
pub use slug::slugify;
