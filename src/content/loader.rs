//! Post loader - parses blog posts from the blog directory

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::frontmatter::split_front_matter;
use super::{MarkdownRenderer, Metadata, Post};
use crate::config::SiteConfig;
use crate::helpers;
use crate::store::{LoadReport, SkippedFile, StoreError};

lazy_static! {
    /// `YYYY-MM-DD-<slug>.<ext>`
    static ref FILE_PATTERN: Regex =
        Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-(.+)\.([^.]+)$").unwrap();
}

/// Date and slug encoded in a post's file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileKey {
    pub date: NaiveDate,
    pub slug: String,
}

/// Parse a post file name into its date and slug
pub fn parse_filename(file_name: &str) -> Result<FileKey, StoreError> {
    let malformed = || StoreError::MalformedFilename(file_name.to_string());

    let caps = FILE_PATTERN.captures(file_name).ok_or_else(malformed)?;
    let year = caps[1].parse::<i32>().map_err(|_| malformed())?;
    let month = caps[2].parse::<u32>().map_err(|_| malformed())?;
    let day = caps[3].parse::<u32>().map_err(|_| malformed())?;
    let date = helpers::ymd(year, month, day).ok_or_else(malformed)?;

    Ok(FileKey {
        date,
        slug: caps[4].to_string(),
    })
}

/// Loads posts from a directory
pub struct PostLoader {
    config: SiteConfig,
    renderer: MarkdownRenderer,
}

impl PostLoader {
    /// Create a new post loader
    pub fn new(config: &SiteConfig) -> Self {
        let renderer = MarkdownRenderer::with_options(&config.highlight);
        Self {
            config: config.clone(),
            renderer,
        }
    }

    /// Parse every post in `directory`, newest first.
    ///
    /// Files are visited in file-name order and the date sort is stable, so
    /// posts sharing a date keep ascending file-name order.
    pub fn parse_posts(&self, directory: &Path) -> Result<(Vec<Post>, LoadReport), StoreError> {
        fs::read_dir(directory).map_err(|source| StoreError::StorageUnavailable {
            path: directory.to_path_buf(),
            source,
        })?;

        let mut posts = Vec::new();
        let mut report = LoadReport::default();

        for entry in WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Failed to read entry in {:?}: {}", directory, e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || !self.is_post_file(path) {
                continue;
            }

            match self.parse_post(path) {
                Ok(post) => {
                    tracing::debug!("Parsed post {:?}", path);
                    posts.push(post);
                }
                Err(error) => {
                    tracing::warn!("Skipping {:?}: {}", path, error);
                    report.skipped.push(SkippedFile {
                        path: path.to_path_buf(),
                        error,
                    });
                }
            }
        }

        // Sort by date descending (newest first)
        posts.sort_by(|a, b| b.date().cmp(&a.date()));
        warn_on_duplicates(&posts);

        report.loaded = posts.len();
        tracing::info!(
            "Parsed {} blog posts in {:?} ({} skipped)",
            report.loaded,
            directory,
            report.skipped.len()
        );

        Ok((posts, report))
    }

    /// Parse a single post from a file
    pub fn parse_post(&self, path: &Path) -> Result<Post, StoreError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StoreError::MalformedFilename(path.display().to_string()))?;
        let key = parse_filename(file_name)?;

        let raw = fs::read_to_string(path).map_err(|source| StoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let (block, body) = split_front_matter(&raw);
        let metadata = match block.map(Metadata::from_yaml) {
            Some(Ok(metadata)) => metadata,
            Some(Err(e)) => {
                let error = StoreError::MetadataParse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                };
                tracing::warn!("{}; using empty metadata", error);
                Metadata::default()
            }
            None => Metadata::default(),
        };

        let content = self.renderer.render(body);
        let url = helpers::post_url(&self.config, &key.date, &key.slug);

        Ok(Post::new(
            key.slug,
            key.date,
            content,
            metadata,
            url,
            self.config.preview_length,
        )
        .with_source(path))
    }

    /// Check if a file has the configured post extension
    fn is_post_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e == self.config.post_extension)
            .unwrap_or(false)
    }
}

fn warn_on_duplicates(posts: &[Post]) {
    let mut seen = HashSet::new();
    for post in posts {
        if !seen.insert((post.date(), post.raw_title())) {
            tracing::warn!(
                "Duplicate post {} {:?}; only the first is reachable",
                post.date(),
                post.raw_title()
            );
        }
    }
}
