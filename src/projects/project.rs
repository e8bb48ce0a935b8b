//! Project descriptors and records

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::github::RepoMetadata;
use crate::content::frontmatter::string_or_vec;
use crate::content::MarkdownRenderer;
use crate::helpers::html_escape;
use crate::store::StoreError;

/// Base URL used to guess a repository link when no metadata is available
const GITHUB_WEB: &str = "https://github.com";

/// A project as written in a descriptor file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectDescriptor {
    pub name: String,
    /// Markdown description; overrides the remote description
    #[serde(default)]
    pub description: Option<String>,
    /// `owner/name` of the source repository
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "language", deserialize_with = "string_or_vec")]
    pub languages: Vec<String>,
    /// The site hosts a runnable build of the project
    #[serde(default)]
    pub available: bool,
    /// The project needs filesystem access to run
    #[serde(default)]
    pub needs_fs: bool,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl ProjectDescriptor {
    /// Split `repo` into owner and repository name
    pub fn repo_parts(&self) -> Option<(&str, &str)> {
        let repo = self.repo.as_deref()?.trim().trim_end_matches(".git");
        let (owner, name) = repo.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some((owner, name))
    }
}

/// Parse one descriptor file.
///
/// A file may hold a single project, a list of projects, or a mapping with
/// a `projects` list.
pub fn parse_descriptor_file(path: &Path, content: &str) -> Result<Vec<ProjectDescriptor>, StoreError> {
    let parse_error = |message: String| StoreError::ProjectParse {
        path: path.to_path_buf(),
        message,
    };

    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;

    let listing = match value {
        serde_yaml::Value::Null => return Ok(Vec::new()),
        serde_yaml::Value::Mapping(mut map) => match map.remove("projects") {
            Some(projects) => projects,
            None => serde_yaml::Value::Sequence(vec![serde_yaml::Value::Mapping(map)]),
        },
        other => other,
    };

    serde_yaml::from_value(listing).map_err(|e| parse_error(e.to_string()))
}

/// A project shown on the projects page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub name: String,
    pub owner: Option<String>,
    /// Description rendered as HTML
    pub description: Option<String>,
    pub languages: Vec<String>,
    /// Link to the source repository
    pub url: Option<String>,
    pub available: bool,
    pub needs_fs: bool,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Project {
    /// Build a project from its descriptor alone.
    ///
    /// Without an explicit `url`, the link is guessed from `repo`.
    pub fn from_descriptor(descriptor: ProjectDescriptor, renderer: &MarkdownRenderer) -> Self {
        let owner = descriptor.repo_parts().map(|(owner, _)| owner.to_string());
        let url = descriptor.url.clone().or_else(|| {
            descriptor
                .repo_parts()
                .map(|(owner, name)| format!("{}/{}/{}", GITHUB_WEB, owner, name))
        });
        let description = render_description(descriptor.description.as_deref(), renderer);

        Self {
            name: descriptor.name,
            owner,
            description,
            languages: descriptor.languages,
            url,
            available: descriptor.available,
            needs_fs: descriptor.needs_fs,
            extra: descriptor.extra,
        }
    }

    /// Build a project whose metadata fetch failed.
    ///
    /// The link is guessed and the language list is left empty, since
    /// languages are only trusted when they come from the repository.
    pub fn fetch_failed(descriptor: ProjectDescriptor, renderer: &MarkdownRenderer) -> Self {
        Self {
            languages: Vec::new(),
            ..Self::from_descriptor(descriptor, renderer)
        }
    }

    /// Build a project from its descriptor and fetched repository metadata.
    ///
    /// A local description wins over the remote one.
    pub fn with_metadata(
        descriptor: ProjectDescriptor,
        metadata: RepoMetadata,
        renderer: &MarkdownRenderer,
    ) -> Self {
        let description = render_description(descriptor.description.as_deref(), renderer).or_else(
            || {
                metadata
                    .description
                    .filter(|d| !d.trim().is_empty())
                    .map(|d| html_escape(&d))
            },
        );
        let languages = if metadata.languages.is_empty() {
            descriptor.languages
        } else {
            metadata.languages
        };

        Self {
            name: descriptor.name,
            owner: Some(metadata.owner),
            description,
            languages,
            url: Some(metadata.html_url),
            available: descriptor.available,
            needs_fs: descriptor.needs_fs,
            extra: descriptor.extra,
        }
    }
}

fn render_description(markdown: Option<&str>, renderer: &MarkdownRenderer) -> Option<String> {
    markdown
        .filter(|md| !md.trim().is_empty())
        .map(|md| renderer.render(md))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HighlightConfig;

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::with_options(&HighlightConfig {
            enable: false,
            ..HighlightConfig::default()
        })
    }

    fn descriptor(yaml: &str) -> ProjectDescriptor {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_repo_parts() {
        let d = descriptor("name: A\nrepo: octo/hello.git\n");
        assert_eq!(d.repo_parts(), Some(("octo", "hello")));
        assert_eq!(descriptor("name: A\nrepo: nope\n").repo_parts(), None);
        assert_eq!(descriptor("name: A\nrepo: a/b/c\n").repo_parts(), None);
        assert_eq!(descriptor("name: A\n").repo_parts(), None);
    }

    #[test]
    fn test_single_language_string() {
        let d = descriptor("name: Doodler\nlanguage: Java\navailable: true\nneeds_fs: true\n");
        assert_eq!(d.languages, vec!["Java"]);
        assert!(d.available);
        assert!(d.needs_fs);
    }

    #[test]
    fn test_parse_descriptor_file_shapes() {
        let path = Path::new("p.yaml");

        let one = parse_descriptor_file(path, "name: One\n").unwrap();
        assert_eq!(one.len(), 1);

        let many = parse_descriptor_file(path, "- name: A\n- name: B\n").unwrap();
        assert_eq!(many.len(), 2);

        let wrapped =
            parse_descriptor_file(path, "projects:\n  - name: A\n  - name: B\n  - name: C\n")
                .unwrap();
        let names: Vec<_> = wrapped.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        assert!(parse_descriptor_file(path, "").unwrap().is_empty());
    }

    #[test]
    fn test_parse_descriptor_requires_name() {
        let err = parse_descriptor_file(Path::new("p.yaml"), "description: nameless\n").unwrap_err();
        assert!(matches!(err, StoreError::ProjectParse { .. }));
    }

    #[test]
    fn test_from_descriptor_guesses_url() {
        let d = descriptor("name: Site\nrepo: octo/site\ndescription: A *site*.\nstars: 3\n");
        let project = Project::from_descriptor(d, &renderer());
        assert_eq!(project.url.as_deref(), Some("https://github.com/octo/site"));
        assert_eq!(project.owner.as_deref(), Some("octo"));
        assert_eq!(
            project.description.as_deref(),
            Some("<p>A <em>site</em>.</p>\n")
        );
        assert!(project.languages.is_empty());
        assert!(project.extra.contains_key("stars"));
    }

    #[test]
    fn test_fetch_failed_drops_languages() {
        let d = descriptor("name: Tool\nrepo: octo/tool\nlanguage: Go\ndescription: Local\n");
        let project = Project::fetch_failed(d, &renderer());
        assert!(project.languages.is_empty());
        assert_eq!(project.url.as_deref(), Some("https://github.com/octo/tool"));
        assert_eq!(project.description.as_deref(), Some("<p>Local</p>\n"));
    }

    #[test]
    fn test_with_metadata_prefers_local_description() {
        let metadata = RepoMetadata {
            owner: "octo".to_string(),
            html_url: "https://github.com/octo/site".to_string(),
            description: Some("Remote <desc>".to_string()),
            languages: vec!["Rust".to_string(), "CSS".to_string()],
        };

        let local = descriptor("name: Site\nrepo: octo/site\ndescription: Local\n");
        let project = Project::with_metadata(local, metadata.clone(), &renderer());
        assert_eq!(project.description.as_deref(), Some("<p>Local</p>\n"));
        assert_eq!(project.languages, vec!["Rust", "CSS"]);

        let bare = descriptor("name: Site\nrepo: octo/site\n");
        let project = Project::with_metadata(bare, metadata, &renderer());
        assert_eq!(project.description.as_deref(), Some("Remote &lt;desc&gt;"));
        assert_eq!(project.owner.as_deref(), Some("octo"));
    }
}
