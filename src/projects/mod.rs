//! Projects page data: descriptor files plus optional GitHub metadata

pub mod github;
mod project;
mod store;

pub use github::{FetchError, GitHubClient, RepoMetadata, RepoMetadataSource};
pub use project::{parse_descriptor_file, Project, ProjectDescriptor};
pub use store::ProjectStore;
