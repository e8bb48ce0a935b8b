//! Project store - descriptor scanning and optional remote enrichment

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use super::github::RepoMetadataSource;
use super::project::{parse_descriptor_file, Project, ProjectDescriptor};
use crate::config::SiteConfig;
use crate::content::MarkdownRenderer;
use crate::store::{LoadReport, LoadState, SkippedFile, Slot, StoreError};

/// Holds the project list shown on the projects page
pub struct ProjectStore {
    renderer: MarkdownRenderer,
    source: Option<Arc<dyn RepoMetadataSource>>,
    projects: Slot<Vec<Project>>,
}

impl ProjectStore {
    /// A store built from descriptor files alone
    pub fn local(config: &SiteConfig) -> Self {
        Self {
            renderer: MarkdownRenderer::with_options(&config.highlight),
            source: None,
            projects: Slot::unloaded(),
        }
    }

    /// A store that enriches descriptors from `source`
    pub fn with_remote(config: &SiteConfig, source: Arc<dyn RepoMetadataSource>) -> Self {
        Self {
            source: Some(source),
            ..Self::local(config)
        }
    }

    pub fn is_remote(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.projects.is_loaded()
    }

    /// Scan `path` for descriptors and replace the project list.
    ///
    /// `path` is either a directory of `*.yaml`/`*.yml` files or a single
    /// descriptor file. Remote lookups that fail fall back to local data.
    pub async fn parse_projects<P: AsRef<Path>>(&self, path: P) -> Result<LoadReport, StoreError> {
        let path = path.as_ref();
        let files = descriptor_files(path)?;

        let mut report = LoadReport::default();
        let mut projects = Vec::new();

        for file in files {
            let descriptors = match read_descriptors(&file) {
                Ok(descriptors) => descriptors,
                Err(error) => {
                    tracing::warn!("Skipping {:?}: {}", file, error);
                    report.skipped.push(SkippedFile { path: file, error });
                    continue;
                }
            };
            tracing::debug!("Read {} project(s) from {:?}", descriptors.len(), file);

            for descriptor in descriptors {
                projects.push(self.build(descriptor).await);
            }
        }

        warn_on_duplicates(&projects);
        report.loaded = projects.len();
        tracing::info!(
            "Loaded {} projects from {:?} ({} skipped)",
            report.loaded,
            path,
            report.skipped.len()
        );

        self.projects.replace(projects);
        Ok(report)
    }

    async fn build(&self, descriptor: ProjectDescriptor) -> Project {
        let (Some(source), Some((owner, repo))) = (&self.source, descriptor.repo_parts()) else {
            return Project::from_descriptor(descriptor, &self.renderer);
        };

        match source.fetch(owner, repo).await {
            Ok(metadata) => Project::with_metadata(descriptor, metadata, &self.renderer),
            Err(e) => {
                tracing::warn!(
                    "Could not fetch {}/{} for project {:?}, using local data: {}",
                    owner,
                    repo,
                    descriptor.name,
                    e
                );
                Project::fetch_failed(descriptor, &self.renderer)
            }
        }
    }

    /// All projects in descriptor order
    pub fn get_projects(&self) -> Result<Arc<Vec<Project>>, StoreError> {
        match self.projects.state() {
            LoadState::Loaded(projects) => Ok(projects),
            LoadState::Unloaded if self.is_remote() => Err(StoreError::ProjectsNotLoaded),
            LoadState::Unloaded => Ok(Arc::new(Vec::new())),
        }
    }
}

fn warn_on_duplicates(projects: &[Project]) {
    let mut seen = HashSet::new();
    for project in projects {
        if !seen.insert(project.name.as_str()) {
            tracing::warn!("Duplicate project name {:?}", project.name);
        }
    }
}

fn is_descriptor(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn descriptor_files(path: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let unavailable = |source| StoreError::StorageUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(path).map_err(unavailable)?;
    if metadata.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    fs::read_dir(path).map_err(unavailable)?;

    let files = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_descriptor(e.path()))
        .map(|e| e.into_path())
        .collect();
    Ok(files)
}

fn read_descriptors(path: &Path) -> Result<Vec<ProjectDescriptor>, StoreError> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_descriptor_file(path, &content)
}
