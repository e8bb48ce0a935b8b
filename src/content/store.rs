//! Blog store - the in-memory post collection served to request handlers

use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;

use super::loader::PostLoader;
use super::{Post, PostDetail};
use crate::config::SiteConfig;
use crate::store::{LoadReport, LoadState, Slot, StoreError};

/// An immutable, newest-first snapshot of the blog
#[derive(Debug, Default)]
pub struct PostCollection {
    posts: Vec<Arc<Post>>,
}

impl PostCollection {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts: posts.into_iter().map(Arc::new).collect(),
        }
    }

    /// Iterate the posts in store order. Can be called any number of times.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Post>> + '_ {
        self.posts.iter()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    fn position(&self, date: NaiveDate, slug: &str) -> Option<usize> {
        self.posts.iter().position(|p| p.matches(date, slug))
    }

    /// The first post matching `(date, slug)` in store order
    pub fn get(&self, date: NaiveDate, slug: &str) -> Option<&Arc<Post>> {
        self.position(date, slug).map(|pos| &self.posts[pos])
    }
}

impl<'a> IntoIterator for &'a PostCollection {
    type Item = &'a Arc<Post>;
    type IntoIter = std::slice::Iter<'a, Arc<Post>>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.iter()
    }
}

/// Holds the parsed blog and answers queries against it
pub struct BlogStore {
    loader: PostLoader,
    posts: Slot<PostCollection>,
}

impl BlogStore {
    /// Create an unloaded store
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            loader: PostLoader::new(config),
            posts: Slot::unloaded(),
        }
    }

    /// Parse all posts in `directory` and replace the collection.
    ///
    /// On error the previous collection (or the unloaded state) is kept.
    pub fn parse_posts<P: AsRef<Path>>(&self, directory: P) -> Result<LoadReport, StoreError> {
        let (posts, report) = self.loader.parse_posts(directory.as_ref())?;
        self.posts.replace(PostCollection::new(posts));
        Ok(report)
    }

    pub fn is_loaded(&self) -> bool {
        self.posts.is_loaded()
    }

    /// All posts, newest first
    pub fn posts(&self) -> Result<Arc<PostCollection>, StoreError> {
        match self.posts.state() {
            LoadState::Loaded(posts) => Ok(posts),
            LoadState::Unloaded => Err(StoreError::PostsNotLoaded),
        }
    }

    /// The `n` most recent posts
    pub fn recent(&self, n: usize) -> Result<Vec<Arc<Post>>, StoreError> {
        Ok(self.posts()?.iter().take(n).cloned().collect())
    }

    /// The post published on `date` whose slug is `slug`
    pub fn get_post(&self, date: NaiveDate, slug: &str) -> Result<Arc<Post>, StoreError> {
        self.posts()?
            .get(date, slug)
            .cloned()
            .ok_or_else(|| StoreError::PostNotFound {
                date,
                slug: slug.to_string(),
            })
    }

    /// A post plus links to its chronological neighbours
    pub fn post_detail(&self, date: NaiveDate, slug: &str) -> Result<PostDetail, StoreError> {
        let posts = self.posts()?;
        let pos = posts
            .position(date, slug)
            .ok_or_else(|| StoreError::PostNotFound {
                date,
                slug: slug.to_string(),
            })?;

        // Store order is newest first
        let next_post = pos
            .checked_sub(1)
            .and_then(|i| posts.posts.get(i))
            .map(|p| p.link());
        let prev_post = posts.posts.get(pos + 1).map(|p| p.link());

        Ok(PostDetail::new(&posts.posts[pos], next_post, prev_post))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn blog_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("2015-08-01-first-steps.md", "First post."),
            ("2016-02-14-on-rust.md", "---\ntitle: Custom\n---\nRust.\n"),
            ("2016-02-14-same-day.md", "Same day."),
            ("2018-11-30-latest.md", "Latest."),
            ("draft.md", "No date."),
        ];
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_queries_fail_before_parse() {
        let store = BlogStore::new(&SiteConfig::default());
        assert!(!store.is_loaded());
        assert!(matches!(store.posts(), Err(StoreError::PostsNotLoaded)));
        assert!(matches!(
            store.get_post(date(2015, 8, 1), "first-steps"),
            Err(StoreError::PostsNotLoaded)
        ));
        assert!(matches!(store.recent(3), Err(StoreError::PostsNotLoaded)));
    }

    #[test]
    fn test_failed_parse_leaves_store_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlogStore::new(&SiteConfig::default());
        assert!(store.parse_posts(dir.path().join("missing")).is_err());
        assert!(matches!(store.posts(), Err(StoreError::PostsNotLoaded)));
    }

    #[test]
    fn test_posts_are_newest_first() {
        let dir = blog_dir();
        let store = BlogStore::new(&SiteConfig::default());
        let report = store.parse_posts(dir.path()).unwrap();
        assert_eq!(report.loaded, 4);
        assert_eq!(report.skipped.len(), 1);

        let posts = store.posts().unwrap();
        let dates: Vec<_> = posts.iter().map(|p| p.date()).collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));

        // The snapshot can be walked more than once
        assert_eq!(posts.iter().count(), (&*posts).into_iter().count());
    }

    #[test]
    fn test_round_trip_lookup() {
        let dir = blog_dir();
        let store = BlogStore::new(&SiteConfig::default());
        store.parse_posts(dir.path()).unwrap();

        for (d, slug) in [
            (date(2015, 8, 1), "first-steps"),
            (date(2016, 2, 14), "on-rust"),
            (date(2016, 2, 14), "same-day"),
            (date(2018, 11, 30), "latest"),
        ] {
            let post = store.get_post(d, slug).unwrap();
            assert_eq!(post.raw_title(), slug);
            assert_eq!(post.date(), d);
        }

        assert_eq!(
            store.get_post(date(2016, 2, 14), "on-rust").unwrap().title(),
            "Custom"
        );
    }

    #[test]
    fn test_missing_post() {
        let dir = blog_dir();
        let store = BlogStore::new(&SiteConfig::default());
        store.parse_posts(dir.path()).unwrap();

        let err = store.get_post(date(2015, 8, 2), "first-steps").unwrap_err();
        assert!(err.is_not_found());
        let err = store.get_post(date(2015, 8, 1), "nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let dir = blog_dir();
        let store = BlogStore::new(&SiteConfig::default());

        store.parse_posts(dir.path()).unwrap();
        let first: Vec<Post> = store.posts().unwrap().iter().map(|p| (**p).clone()).collect();
        store.parse_posts(dir.path()).unwrap();
        let second: Vec<Post> = store.posts().unwrap().iter().map(|p| (**p).clone()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_reparse_replaces_collection() {
        let dir = blog_dir();
        let store = BlogStore::new(&SiteConfig::default());
        store.parse_posts(dir.path()).unwrap();
        let before = store.posts().unwrap();

        fs::remove_file(dir.path().join("2018-11-30-latest.md")).unwrap();
        store.parse_posts(dir.path()).unwrap();

        assert_eq!(before.len(), 4);
        assert_eq!(store.posts().unwrap().len(), 3);
        assert!(store.get_post(date(2018, 11, 30), "latest").unwrap_err().is_not_found());
    }

    #[test]
    fn test_recent() {
        let dir = blog_dir();
        let store = BlogStore::new(&SiteConfig::default());
        store.parse_posts(dir.path()).unwrap();

        let recent = store.recent(2).unwrap();
        let slugs: Vec<_> = recent.iter().map(|p| p.raw_title()).collect();
        assert_eq!(slugs, vec!["latest", "on-rust"]);
    }

    #[test]
    fn test_post_detail_neighbours() {
        let dir = blog_dir();
        let store = BlogStore::new(&SiteConfig::default());
        store.parse_posts(dir.path()).unwrap();

        let detail = store.post_detail(date(2016, 2, 14), "same-day").unwrap();
        assert_eq!(detail.next_post.unwrap().title, "Custom");
        assert_eq!(detail.prev_post.unwrap().url, "/blog/2015/8/1/first-steps");

        let newest = store.post_detail(date(2018, 11, 30), "latest").unwrap();
        assert!(newest.next_post.is_none());
        let oldest = store.post_detail(date(2015, 8, 1), "first-steps").unwrap();
        assert!(oldest.prev_post.is_none());
    }

    #[test]
    fn test_preview_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let long_body = "lorem ipsum dolor sit amet ".repeat(20);
        fs::write(dir.path().join("2020-01-01-long.md"), &long_body).unwrap();
        fs::write(dir.path().join("2020-01-02-short.md"), "Short and sweet.").unwrap();

        let store = BlogStore::new(&SiteConfig::default());
        store.parse_posts(dir.path()).unwrap();

        let long = store.get_post(date(2020, 1, 1), "long").unwrap();
        let suffix = format!(r#"... <a href="{}">Continue&rarr;</a>"#, long.url());
        assert!(long.preview().ends_with(&suffix));
        let text = long.preview().trim_end_matches(suffix.as_str());
        assert!(text.chars().count() <= 200);
        assert!(long_body.starts_with(text));

        let short = store.get_post(date(2020, 1, 2), "short").unwrap();
        assert_eq!(short.preview(), "Short and sweet.");
    }
}
