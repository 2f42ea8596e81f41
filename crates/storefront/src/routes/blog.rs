//! Blog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use tracing::instrument;

use crate::content::Post;
use crate::error::AppError;
use crate::filters;
use crate::state::AppState;
use crate::views::{Layout, PageContext};

/// Number of recent posts to show in sidebar.
const RECENT_POSTS_COUNT: usize = 3;

/// Post view for templates.
#[derive(Debug, Clone)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub published_at: NaiveDate,
    pub featured_image: Option<String>,
    pub tags: Vec<String>,
    pub content_html: String,
    pub reading_time_minutes: u32,
}

impl PostView {
    #[must_use]
    pub fn published_label(&self) -> String {
        self.published_at.format("%d %B %Y").to_string()
    }
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.meta.title.clone(),
            description: post.meta.description.clone(),
            author: post.meta.author.clone(),
            published_at: post.meta.published_at,
            featured_image: post.meta.featured_image.clone(),
            tags: post.meta.tags.clone(),
            content_html: post.content_html.clone(),
            reading_time_minutes: post.reading_time_minutes,
        }
    }
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub layout: Layout,
    pub posts: Vec<PostView>,
}

/// Blog post detail template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub layout: Layout,
    pub post: PostView,
    pub recent_posts: Vec<PostView>,
}

/// Display the blog index page with all published posts.
#[instrument(skip(state, page))]
pub async fn index(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    let posts: Vec<PostView> = state
        .content()
        .get_published_posts()
        .map(PostView::from)
        .collect();
    BlogIndexTemplate {
        layout: page.layout("Blog").await,
        posts,
    }
}

/// Display a single blog post by slug.
///
/// # Errors
///
/// Returns 404 if the post doesn't exist or is a draft.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    page: PageContext,
) -> Result<impl IntoResponse, AppError> {
    let post = state
        .content()
        .get_post(&slug)
        .ok_or_else(|| AppError::NotFound(format!("post {slug}")))?;

    let recent_posts: Vec<PostView> = state
        .content()
        .get_recent_posts(RECENT_POSTS_COUNT, Some(&slug))
        .into_iter()
        .map(PostView::from)
        .collect();

    let post = PostView::from(post);
    Ok(BlogShowTemplate {
        layout: page.layout(post.title.clone()).await,
        post,
        recent_posts,
    })
}
