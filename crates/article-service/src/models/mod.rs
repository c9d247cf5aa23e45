//! Article model and static lookup.

use serde::Serialize;

/// A published article.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: u32,
    pub title: String,
    pub content: String,
}

fn article(id: u32, title: &str, content: &str) -> Article {
    Article {
        id,
        title: title.to_string(),
        content: content.to_string(),
    }
}

/// Every published article.
pub fn all_articles() -> Vec<Article> {
    vec![
        article(1, "Article 1", "Article 1 body"),
        article(2, "Article 2", "Article 2 body"),
    ]
}

/// Look up a single article.
pub fn article_by_id(id: u32) -> Option<Article> {
    all_articles().into_iter().find(|a| a.id == id)
}
