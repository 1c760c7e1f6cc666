//! Request builder and response parser for `/api/comments`.

use crate::client::{decode, expect_empty, Endpoint};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Comment, CreateCommentRequest, Id};

/// Stateless client for comments. Comments live on the post service.
#[derive(Debug, Clone)]
pub struct CommentClient {
    endpoint: Endpoint,
}

impl CommentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: Endpoint::new(base_url),
        }
    }

    pub fn build_comments_by_post(&self, post_id: Id) -> HttpRequest {
        let url = self
            .endpoint
            .url_with_query("/api/comments", &[("postId", post_id.to_string())]);
        self.endpoint.request(HttpMethod::Get, url)
    }

    pub fn build_create_comment(&self, input: &CreateCommentRequest) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint.url("/api/comments");
        self.endpoint.json_request(HttpMethod::Post, url, input)
    }

    pub fn build_delete_comment(&self, id: Id) -> HttpRequest {
        let url = self.endpoint.url(&format!("/api/comments/{id}"));
        self.endpoint.request(HttpMethod::Delete, url)
    }

    pub fn parse_comments_by_post(&self, response: &HttpResponse) -> Result<Vec<Comment>, ApiError> {
        decode(response)
    }

    pub fn parse_create_comment(&self, response: &HttpResponse) -> Result<Comment, ApiError> {
        decode(response)
    }

    pub fn parse_delete_comment(&self, response: &HttpResponse) -> Result<(), ApiError> {
        expect_empty(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CommentClient {
        CommentClient::new("http://localhost:8081")
    }

    #[test]
    fn build_comments_by_post_uses_query() {
        let req = client().build_comments_by_post(3);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8081/api/comments?postId=3");
    }

    #[test]
    fn build_create_comment_produces_json() {
        let input = CreateCommentRequest {
            content: "Great route".to_string(),
            post_id: 3,
            user_id: 1,
            user_name: "ana".to_string(),
        };
        let req = client().build_create_comment(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8081/api/comments");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["postId"], 3);
        assert_eq!(body["userName"], "ana");
    }

    #[test]
    fn build_delete_comment_produces_correct_request() {
        let req = client().build_delete_comment(8);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:8081/api/comments/8");
    }

    #[test]
    fn parse_create_comment_success() {
        let response = HttpResponse::new(
            201,
            r#"{"id":5,"content":"Nice","postId":3,"userId":1,"userName":"ana","createdAt":"2024-06-01T12:00:00"}"#,
        );
        let comment = client().parse_create_comment(&response).unwrap();
        assert_eq!(comment.id, 5);
        assert_eq!(comment.post_id, 3);
    }

    #[test]
    fn parse_comments_by_post_bad_json() {
        let err = client()
            .parse_comments_by_post(&HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_delete_comment_not_found() {
        let err = client().parse_delete_comment(&HttpResponse::new(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }
}
