//! Configuration module

mod site;

pub use site::GitHubConfig;
pub use site::HighlightConfig;
pub use site::SiteConfig;
pub use site::{CONFIG_ENV, DEFAULT_CONFIG_FILE};
