//! Discourse wire types.
use serde::{Deserialize, Serialize};

/// Body of `POST /posts.json` creating a new topic.
#[derive(Debug, Serialize)]
pub struct NewTopic<'a> {
    pub title: &'a str,
    pub raw: &'a str,
    pub category: &'a str,
}

/// The fields we need from a successful topic creation.
#[derive(Debug, Deserialize)]
pub struct CreatedPost {
    pub topic_id: u64,
    pub topic_slug: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub topics: Vec<SearchTopic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTopic {
    pub id: u64,
    pub slug: String,
    #[serde(rename = "category_id", default)]
    pub category: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesResponse {
    pub category_list: CategoryList,
}

#[derive(Debug, Deserialize)]
pub struct CategoryList {
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}
