//! Content Module
//!
//! Article model, platform post transformation and the gating policy.

pub mod article;
pub mod gating;


pub use article::{transform_posts, Article, Category};
pub use gating::{gate, gate_all, GatedArticle};
