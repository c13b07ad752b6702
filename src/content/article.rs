//! Article Module
//!
//! The reader-facing article shape and its construction from platform posts.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::platform::models::RawPost;

/// Post statuses that are visible on the site.
pub const PUBLISHED_STATUSES: [&str; 3] = ["confirmed", "published", "live"];

/// Byline used when a post names no author.
pub const DEFAULT_AUTHOR: &str = "The OG Project";

/// Display date used when a post has no usable publish date.
pub const DEFAULT_DISPLAY_DATE: &str = "Oct 24, 2025";

// == Category ==
/// Site section an article is filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    News,
    Lifestyle,
    Events,
    Spotlight,
    #[serde(rename = "Hot Topic")]
    HotTopic,
    Culture,
}

impl Category {
    /// Every category, in navigation order.
    pub const ALL: [Category; 6] = [
        Category::News,
        Category::Lifestyle,
        Category::Events,
        Category::Spotlight,
        Category::HotTopic,
        Category::Culture,
    ];

    /// Maps a platform tag to a category, case-insensitively. Unknown or
    /// missing tags file under `News`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        let Some(tag) = tag else {
            return Category::News;
        };
        match tag.trim().to_lowercase().as_str() {
            "news" => Category::News,
            "lifestyle" => Category::Lifestyle,
            "events" => Category::Events,
            "spotlight" => Category::Spotlight,
            "hot topic" | "hot topics" => Category::HotTopic,
            "culture" => Category::Culture,
            _ => Category::News,
        }
    }

    /// Display name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::News => "News",
            Category::Lifestyle => "Lifestyle",
            Category::Events => "Events",
            Category::Spotlight => "Spotlight",
            Category::HotTopic => "Hot Topic",
            Category::Culture => "Culture",
        }
    }
}

// == Article ==
/// An article as served to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    /// Body paragraphs, in order
    pub content: Vec<String>,
    pub category: Category,
    pub author: String,
    /// Human-readable publish date, e.g. `Oct 24, 2025`
    pub date: String,
    pub image: String,
    pub is_featured: bool,
    /// Canonical URL on the newsletter platform
    pub slug_url: String,
}

impl Article {
    /// Whether a post with this status should be shown.
    pub fn is_published(status: Option<&str>) -> bool {
        status.is_some_and(|s| PUBLISHED_STATUSES.contains(&s))
    }

    /// Builds an article from a platform post.
    pub fn from_post(post: RawPost) -> Self {
        let category = Category::from_tag(first_non_empty([
            post.tag.as_deref(),
            post.category.as_deref(),
        ]));

        Self {
            excerpt: first_non_empty([
                post.subtitle.as_deref(),
                post.preview_text.as_deref(),
                post.excerpt.as_deref(),
            ])
            .unwrap_or_default()
            .to_string(),
            content: paragraphs(&post),
            category,
            author: author_of(&post),
            date: format_publish_date(post.publish_date),
            image: post.thumbnail_url.unwrap_or_default(),
            is_featured: post.featured.unwrap_or(false),
            slug_url: first_non_empty([post.slug_url.as_deref(), post.web_url.as_deref()])
                .unwrap_or_default()
                .to_string(),
            title: post.title.unwrap_or_default(),
            id: post.id,
        }
    }
}

/// Keeps published posts and converts them, preserving upstream order.
pub fn transform_posts(posts: Vec<RawPost>) -> Vec<Article> {
    posts
        .into_iter()
        .filter(|post| Article::is_published(post.status.as_deref()))
        .map(Article::from_post)
        .collect()
}

/// Formats Unix seconds as `Mon D, YYYY`.
pub fn format_publish_date(unix_seconds: Option<i64>) -> String {
    unix_seconds
        .filter(|secs| *secs != 0)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| DEFAULT_DISPLAY_DATE.to_string())
}

fn first_non_empty<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}

fn paragraphs(post: &RawPost) -> Vec<String> {
    let Some(blocks) = post.content.as_ref().and_then(|c| c.blocks.as_ref()) else {
        return vec![String::new()];
    };

    blocks
        .iter()
        .filter_map(|block| block.paragraph_text())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

fn author_of(post: &RawPost) -> String {
    let listed = post
        .authors
        .as_ref()
        .and_then(|authors| authors.first())
        .and_then(|first| match first {
            Value::String(name) => Some(name.as_str()),
            Value::Object(map) => map.get("name").and_then(Value::as_str),
            _ => None,
        });

    first_non_empty([
        listed,
        post.author.as_ref().and_then(|a| a.name.as_deref()),
    ])
    .unwrap_or(DEFAULT_AUTHOR)
    .to_string()
}
