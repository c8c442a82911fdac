use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{BlogPost, BlogTag, Faq, PortfolioImage};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFaqRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBlogPostRequest {
    pub title: String,
    pub content: String,
    pub links: Option<String>,
    #[serde(default)]
    pub tag: BlogTag,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBlogPostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub links: Option<String>,
    pub tag: Option<BlogTag>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FaqList {
    #[schema(value_type = Vec<Faq>)]
    pub items: Vec<Faq>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PortfolioList {
    #[schema(value_type = Vec<PortfolioImage>)]
    pub items: Vec<PortfolioImage>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct BlogPostList {
    #[schema(value_type = Vec<BlogPost>)]
    pub items: Vec<BlogPost>,
}
