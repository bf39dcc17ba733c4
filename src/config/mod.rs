//! Configuration module

mod site;

pub use site::AuthorConfig;
pub use site::AuthorLink;
pub use site::FeedConfig;
pub use site::HighlightConfig;
pub use site::LicenseConfig;
pub use site::SiteConfig;
