//! Site configuration (config.yaml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable naming an alternative configuration file
pub const CONFIG_ENV: &str = "WEBSITE_CONFIG";

/// Default configuration file name, relative to the base directory
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,

    // URL
    pub url: String,
    pub root: String,

    /// A link to a PDF copy of the resume
    pub resume_link: Option<String>,

    // Directory
    pub blog_dir: String,
    pub projects_dir: String,
    pub static_dir: String,

    // Writing
    /// Extension of blog post files, without the dot
    pub post_extension: String,
    /// Number of visible characters kept in a post preview
    pub preview_length: usize,
    /// Number of posts shown on the index page
    pub recent_posts: usize,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Projects
    #[serde(default)]
    pub github: GitHubConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Personal Website".to_string(),
            author: "John Doe".to_string(),

            url: "http://localhost:9000".to_string(),
            root: "/".to_string(),

            resume_link: None,

            blog_dir: "blog".to_string(),
            projects_dir: "projects".to_string(),
            static_dir: "static".to_string(),

            post_extension: "md".to_string(),
            preview_length: 200,
            recent_posts: 3,
            highlight: HighlightConfig::default(),

            github: GitHubConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        tracing::info!("Loading configuration from {:?}", path.as_ref());
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the configuration file for a base directory.
    ///
    /// `WEBSITE_CONFIG` wins over `config.yaml` in the base directory.
    pub fn resolve_path(base_dir: &Path) -> std::path::PathBuf {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => base_dir.join(path),
            _ => base_dir.join(DEFAULT_CONFIG_FILE),
        }
    }
}

/// Syntax highlighting configuration for fenced code blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Remote project metadata configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Enrich project descriptors from the GitHub API
    pub enable: bool,
    pub api_base: String,
    /// Environment variable holding the API token
    pub token_env: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            enable: false,
            api_base: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            timeout_secs: 10,
        }
    }
}
