//! Post model and its serializable views

use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::Metadata;
use crate::helpers;

/// A blog post
///
/// Built once while scanning the blog directory and never mutated
/// afterwards. `(date, raw_title)` identifies a post.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    raw_title: String,
    date: NaiveDate,
    content: String,
    metadata: Metadata,
    url: String,
    preview: String,
    source: PathBuf,
}

impl Post {
    /// Create a post from its parsed parts.
    ///
    /// `content` is rendered HTML; the preview is derived from it here.
    pub fn new(
        raw_title: String,
        date: NaiveDate,
        content: String,
        metadata: Metadata,
        url: String,
        preview_length: usize,
    ) -> Self {
        let preview = helpers::preview(&content, preview_length, &url);
        Self {
            raw_title,
            date,
            content,
            metadata,
            url,
            preview,
            source: PathBuf::new(),
        }
    }

    /// Record the file the post was parsed from
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self
    }

    /// The slug taken from the file name
    pub fn raw_title(&self) -> &str {
        &self.raw_title
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Rendered HTML body
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Displayable title: the metadata title, else the prettified slug
    pub fn title(&self) -> String {
        match &self.metadata.title {
            Some(title) => title.clone(),
            None => prettify_slug(&self.raw_title),
        }
    }

    /// Tag-stripped excerpt, with a link to the post when truncated
    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn display_date(&self) -> String {
        helpers::display_date(&self.date)
    }

    /// Canonical link to the post
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Whether this post is the one addressed by `date` and `slug`
    pub fn matches(&self, date: NaiveDate, slug: &str) -> bool {
        self.date == date && self.raw_title == slug
    }

    pub fn link(&self) -> PostLink {
        PostLink {
            title: self.title(),
            url: self.url.clone(),
        }
    }
}

/// Turn `my-first-post` into `My First Post`
pub fn prettify_slug(slug: &str) -> String {
    slug.split(['-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Information needed to construct a link to a post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostLink {
    pub title: String,
    pub url: String,
}

/// A brief summary of a post, used by listings
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub date: NaiveDate,
    pub display_date: String,
    pub preview: String,
    pub url: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title(),
            date: post.date,
            display_date: post.display_date(),
            preview: post.preview.clone(),
            url: post.url.clone(),
            categories: post.metadata.categories.clone(),
            tags: post.metadata.tags.clone(),
        }
    }
}

/// A full post together with its chronological neighbours
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub title: String,
    pub date: NaiveDate,
    pub display_date: String,
    pub content: String,
    pub url: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    /// The next post chronologically
    pub next_post: Option<PostLink>,
    /// The previous post chronologically
    pub prev_post: Option<PostLink>,
}

impl PostDetail {
    pub fn new(post: &Post, next_post: Option<PostLink>, prev_post: Option<PostLink>) -> Self {
        Self {
            title: post.title(),
            date: post.date,
            display_date: post.display_date(),
            content: post.content.clone(),
            url: post.url.clone(),
            categories: post.metadata.categories.clone(),
            tags: post.metadata.tags.clone(),
            next_post,
            prev_post,
        }
    }
}
