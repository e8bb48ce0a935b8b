//! Content module - blog posts: parsing, rendering and the in-memory store

pub(crate) mod frontmatter;
pub mod loader;
mod markdown;
mod post;
mod store;

pub use frontmatter::{split_front_matter, Metadata};
pub use loader::{parse_filename, FileKey, PostLoader};
pub use markdown::MarkdownRenderer;
pub use post::{prettify_slug, Post, PostDetail, PostLink, PostSummary};
pub use store::{BlogStore, PostCollection};
