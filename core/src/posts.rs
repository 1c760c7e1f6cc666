//! Request builder and response parser for the post routes.

use std::collections::HashSet;

use crate::client::{decode, decode_page, expect_empty, Endpoint};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreatePostRequest, Id, PageRequest, Post, SearchQuery};

/// Stateless client for `/api/posts` on the post service.
#[derive(Debug, Clone)]
pub struct PostClient {
    endpoint: Endpoint,
}

impl PostClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: Endpoint::new(base_url),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn build_list_posts(&self, page: PageRequest) -> HttpRequest {
        let url = self.endpoint.url_with_query("/api/posts", &paging(page));
        self.endpoint.request(HttpMethod::Get, url)
    }

    pub fn build_get_post(&self, id: Id) -> HttpRequest {
        let url = self.endpoint.url(&format!("/api/posts/{id}"));
        self.endpoint.request(HttpMethod::Get, url)
    }

    pub fn build_create_post(&self, input: &CreatePostRequest) -> Result<HttpRequest, ApiError> {
        validate_photos(&input.photos)?;
        let url = self.endpoint.url("/api/posts");
        self.endpoint.json_request(HttpMethod::Post, url, input)
    }

    /// Full replace: every field of `input` overwrites the stored post.
    pub fn build_update_post(&self, id: Id, input: &CreatePostRequest) -> Result<HttpRequest, ApiError> {
        validate_photos(&input.photos)?;
        let url = self.endpoint.url(&format!("/api/posts/{id}"));
        self.endpoint.json_request(HttpMethod::Put, url, input)
    }

    pub fn build_delete_post(&self, id: Id) -> HttpRequest {
        let url = self.endpoint.url(&format!("/api/posts/{id}"));
        self.endpoint.request(HttpMethod::Delete, url)
    }

    pub fn build_like_post(&self, id: Id) -> HttpRequest {
        let url = self.endpoint.url(&format!("/api/posts/{id}/like"));
        self.endpoint.request(HttpMethod::Post, url)
    }

    pub fn build_unlike_post(&self, id: Id) -> HttpRequest {
        let url = self.endpoint.url(&format!("/api/posts/{id}/like"));
        self.endpoint.request(HttpMethod::Delete, url)
    }

    pub fn build_search_posts(&self, query: &SearchQuery) -> HttpRequest {
        let mut params = Vec::new();
        if let Some(location) = present(query.location.as_deref()) {
            params.push(("location", location.to_string()));
        }
        if let Some(adventure_type) = present(query.adventure_type.as_deref()) {
            params.push(("adventureType", adventure_type.to_string()));
        }
        let url = self.endpoint.url_with_query("/api/posts/search", &params);
        self.endpoint.request(HttpMethod::Get, url)
    }

    pub fn build_posts_by_user(&self, user_id: Id) -> HttpRequest {
        let url = self.endpoint.url(&format!("/api/posts/user/{user_id}"));
        self.endpoint.request(HttpMethod::Get, url)
    }

    pub fn build_feed(&self, page: PageRequest) -> HttpRequest {
        let url = self.endpoint.url_with_query("/api/posts/feed", &paging(page));
        self.endpoint.request(HttpMethod::Get, url)
    }

    pub fn parse_list_posts(&self, response: &HttpResponse) -> Result<Vec<Post>, ApiError> {
        decode_page(response)
    }

    pub fn parse_get_post(&self, response: &HttpResponse) -> Result<Post, ApiError> {
        decode(response)
    }

    pub fn parse_create_post(&self, response: &HttpResponse) -> Result<Post, ApiError> {
        decode(response)
    }

    pub fn parse_update_post(&self, response: &HttpResponse) -> Result<Post, ApiError> {
        decode(response)
    }

    pub fn parse_delete_post(&self, response: &HttpResponse) -> Result<(), ApiError> {
        expect_empty(response)
    }

    pub fn parse_like_post(&self, response: &HttpResponse) -> Result<(), ApiError> {
        expect_empty(response)
    }

    pub fn parse_unlike_post(&self, response: &HttpResponse) -> Result<(), ApiError> {
        expect_empty(response)
    }

    pub fn parse_search_posts(&self, response: &HttpResponse) -> Result<Vec<Post>, ApiError> {
        decode_page(response)
    }

    pub fn parse_posts_by_user(&self, response: &HttpResponse) -> Result<Vec<Post>, ApiError> {
        decode(response)
    }

    pub fn parse_feed(&self, response: &HttpResponse) -> Result<Vec<Post>, ApiError> {
        decode_page(response)
    }
}

fn paging(page: PageRequest) -> [(&'static str, String); 2] {
    [("page", page.page.to_string()), ("size", page.size.to_string())]
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Photos must be absolute URLs and may not repeat.
pub fn validate_photos(photos: &[String]) -> Result<(), ApiError> {
    let mut seen = HashSet::with_capacity(photos.len());
    for photo in photos {
        url::Url::parse(photo)
            .map_err(|e| ApiError::InvalidPayload(format!("photo {photo:?} is not an absolute URL: {e}")))?;
        if !seen.insert(photo.as_str()) {
            return Err(ApiError::InvalidPayload(format!("photo {photo:?} is listed twice")));
        }
    }
    Ok(())
}
