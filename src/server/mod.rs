//! HTTP server exposing the site's views as JSON

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use walkdir::WalkDir;

use crate::content::{PostDetail, PostSummary};
use crate::helpers;
use crate::projects::Project;
use crate::store::StoreError;
use crate::Website;

/// Slideshow images for the about page, relative to the static directory
const SLIDESHOW_DIR: &str = "images/slideshow";

type AppState = Arc<Website>;

/// Build the router for a loaded website
pub fn router(site: AppState) -> Router {
    let static_files = ServeDir::new(&site.static_dir);

    Router::new()
        .route("/", get(index))
        .route("/blog/", get(blog_index))
        .route("/blog/:year/:month/:day/:title", get(blog_post))
        .route("/projects", get(projects))
        .route("/resume", get(resume))
        .route("/about", get(about))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(site)
}

/// Serve the website until the process is stopped
pub async fn start(site: Website, ip: &str, port: u16) -> Result<()> {
    let app = router(Arc::new(site));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// An error on its way to the client
#[derive(Debug)]
pub enum ApiError {
    /// The request names something that cannot exist
    NotFound(String),
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "Not found: {}", what),
            Self::Store(e) => e.fmt(f),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct IndexView {
    pub title: String,
    pub author: String,
    /// Absolute URL of the site root
    pub url: String,
    pub posts: Vec<PostSummary>,
}

async fn index(State(site): State<AppState>) -> Result<Json<IndexView>, ApiError> {
    let posts = site.blog.recent(site.config.recent_posts)?;
    Ok(Json(IndexView {
        title: site.config.title.clone(),
        author: site.config.author.clone(),
        url: helpers::full_url_for(&site.config, "/"),
        posts: posts.iter().map(|p| PostSummary::from(p.as_ref())).collect(),
    }))
}

async fn blog_index(State(site): State<AppState>) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let posts = site.blog.posts()?;
    Ok(Json(posts.iter().map(|p| PostSummary::from(p.as_ref())).collect()))
}

async fn blog_post(
    State(site): State<AppState>,
    Path((year, month, day, title)): Path<(i32, u32, u32, String)>,
) -> Result<Json<PostDetail>, ApiError> {
    let date = helpers::ymd(year, month, day)
        .ok_or_else(|| ApiError::NotFound(format!("{}/{}/{}/{}", year, month, day, title)))?;
    Ok(Json(site.blog.post_detail(date, &title)?))
}

async fn projects(State(site): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = site.projects.get_projects()?;
    Ok(Json(projects.as_ref().clone()))
}

#[derive(Debug, Serialize)]
pub struct ResumeView {
    pub resume_link: Option<String>,
}

async fn resume(State(site): State<AppState>) -> Json<ResumeView> {
    Json(ResumeView {
        resume_link: site.config.resume_link.clone(),
    })
}

#[derive(Debug, Serialize)]
pub struct AboutView {
    pub slideshow: Vec<String>,
}

async fn about(State(site): State<AppState>) -> Json<AboutView> {
    Json(AboutView {
        slideshow: slideshow_images(&site),
    })
}

/// URLs of the about-page slideshow images, in file-name order
fn slideshow_images(site: &Website) -> Vec<String> {
    let dir = site.static_dir.join(SLIDESHOW_DIR);
    if !dir.is_dir() {
        tracing::debug!("No slideshow directory at {:?}", dir);
        return Vec::new();
    }

    WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .map(|name| {
            let path = format!(
                "static/{}/{}",
                SLIDESHOW_DIR,
                helpers::encode_segment(&name)
            );
            helpers::url_for(&site.config, &path)
        })
        .collect()
}
