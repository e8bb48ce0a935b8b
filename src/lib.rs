//! website: a personal site serving a markdown blog and a project list
//!
//! Posts are parsed once from the blog directory, projects from YAML
//! descriptors (optionally enriched from GitHub), and both are served as
//! JSON views by an axum server.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod projects;
pub mod server;
pub mod store;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use content::BlogStore;
use projects::{GitHubClient, ProjectStore};

/// The website application
pub struct Website {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Blog post directory
    pub blog_dir: PathBuf,
    /// Project descriptor directory
    pub projects_dir: PathBuf,
    /// Static asset directory
    pub static_dir: PathBuf,
    pub blog: BlogStore,
    pub projects: ProjectStore,
}

impl Website {
    /// Create a website from a directory, reading its configuration file if
    /// there is one
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = config::SiteConfig::resolve_path(base_dir.as_ref());
        Self::with_config_file(base_dir, &config_path)
    }

    /// Create a website using an explicit configuration file
    pub fn with_config_file<P: AsRef<Path>>(base_dir: P, config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            config::SiteConfig::load(config_path)
                .with_context(|| format!("Invalid configuration in {:?}", config_path))?
        } else {
            tracing::debug!("No configuration at {:?}, using defaults", config_path);
            config::SiteConfig::default()
        };
        Self::from_config(base_dir, config)
    }

    /// Create a website from an already loaded configuration
    pub fn from_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let blog_dir = base_dir.join(&config.blog_dir);
        let projects_dir = base_dir.join(&config.projects_dir);
        let static_dir = base_dir.join(&config.static_dir);

        let blog = BlogStore::new(&config);
        let projects = if config.github.enable {
            let client = GitHubClient::from_config(&config.github)?;
            ProjectStore::with_remote(&config, Arc::new(client))
        } else {
            ProjectStore::local(&config)
        };

        Ok(Self {
            config,
            base_dir,
            blog_dir,
            projects_dir,
            static_dir,
            blog,
            projects,
        })
    }

    /// Parse the blog and the project list
    pub async fn load(&self) -> Result<()> {
        self.load_posts()?;
        self.load_projects().await
    }

    pub fn load_posts(&self) -> Result<()> {
        self.blog
            .parse_posts(&self.blog_dir)
            .with_context(|| format!("Failed to load blog posts from {:?}", self.blog_dir))?;
        Ok(())
    }

    pub async fn load_projects(&self) -> Result<()> {
        self.projects
            .parse_projects(&self.projects_dir)
            .await
            .with_context(|| format!("Failed to load projects from {:?}", self.projects_dir))?;
        Ok(())
    }
}
