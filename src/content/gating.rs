//! Content Gating Policy
//!
//! Decides how much of an article a reader may see. The excerpt and first
//! paragraph are public; the rest is for verified subscribers. Locked
//! paragraphs are removed from the payload, not merely hidden by the UI.

use serde::Serialize;

use crate::auth::SubscriberSession;
use crate::content::Article;

/// Paragraphs shown to every reader.
pub const PUBLIC_PARAGRAPHS: usize = 1;

/// An article trimmed to what the session may read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatedArticle {
    #[serde(flatten)]
    pub article: Article,
    /// True when paragraphs were withheld
    pub is_locked: bool,
    /// Number of withheld paragraphs
    pub locked_paragraphs: usize,
}

/// Applies the policy to one article.
pub fn gate(article: &Article, session: &SubscriberSession) -> GatedArticle {
    let mut visible = article.clone();
    let locked_paragraphs = if session.is_subscribed {
        0
    } else {
        let withheld = visible.content.len().saturating_sub(PUBLIC_PARAGRAPHS);
        visible.content.truncate(PUBLIC_PARAGRAPHS);
        withheld
    };

    GatedArticle {
        article: visible,
        is_locked: locked_paragraphs > 0,
        locked_paragraphs,
    }
}

/// Applies the policy to every article.
pub fn gate_all(articles: &[Article], session: &SubscriberSession) -> Vec<GatedArticle> {
    articles.iter().map(|article| gate(article, session)).collect()
}
