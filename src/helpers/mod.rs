//! Helper functions shared by the renderer, the feed and the generator

mod date;
mod html;
mod toc;
mod url;

pub use date::*;
pub use html::*;
pub use toc::*;
pub use url::*;
