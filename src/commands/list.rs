//! List site content

use anyhow::Result;

use crate::helpers;
use crate::Website;

/// List site content by type
pub async fn run(site: &Website, content_type: &str) -> Result<()> {
    match content_type {
        "post" | "posts" => {
            site.load_posts()?;
            let posts = site.blog.posts()?;
            println!("Posts ({}):", posts.len());
            for post in posts.iter() {
                println!(
                    "  {} - {} [{}]",
                    helpers::date_xml(&post.date()),
                    post.title(),
                    post.url()
                );
            }
        }
        "project" | "projects" => {
            site.load_projects().await?;
            let projects = site.projects.get_projects()?;
            println!("Projects ({}):", projects.len());
            for project in projects.iter() {
                let languages = if project.languages.is_empty() {
                    "-".to_string()
                } else {
                    project.languages.join(", ")
                };
                println!(
                    "  {} ({}) {}",
                    project.name,
                    languages,
                    project.url.as_deref().unwrap_or("")
                );
            }
        }
        "tag" | "tags" => {
            site.load_posts()?;
            let posts = site.blog.posts()?;
            let mut tags: std::collections::HashMap<String, usize> =
                std::collections::HashMap::new();
            for post in posts.iter() {
                for tag in &post.metadata().tags {
                    *tags.entry(tag.clone()).or_insert(0) += 1;
                }
            }
            println!("Tags ({}):", tags.len());
            let mut tags: Vec<_> = tags.into_iter().collect();
            tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, project, tag",
                content_type
            );
        }
    }

    Ok(())
}
