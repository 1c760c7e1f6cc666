//! Async service façade: one method per remote operation.
//!
//! Every method builds a request with the core client, hands it to the
//! transport exactly once, and parses the response. Nothing is cached or
//! retried, and failures come back as the core's `ApiError` untouched.

use std::sync::Arc;

use aventura_core::{
    ApiError, AuthResponse, Comment, CommentClient, CreateCommentRequest, CreatePostRequest, Id, LoginRequest,
    PageRequest, Post, PostClient, RegisterRequest, SearchQuery, User, UserClient,
};
use tracing::debug;

use crate::transport::Transport;

#[derive(Clone)]
pub struct PostService {
    client: PostClient,
    transport: Arc<dyn Transport>,
}

impl PostService {
    pub fn new(client: PostClient, transport: Arc<dyn Transport>) -> Self {
        Self { client, transport }
    }

    pub async fn list_posts(&self, page: PageRequest) -> Result<Vec<Post>, ApiError> {
        let response = self.transport.execute(self.client.build_list_posts(page)).await?;
        let posts = self.client.parse_list_posts(&response)?;
        debug!(page = page.page, size = page.size, count = posts.len(), "listed posts");
        Ok(posts)
    }

    /// First six posts, for the landing page.
    pub async fn home_posts(&self) -> Result<Vec<Post>, ApiError> {
        self.list_posts(PageRequest::HOME).await
    }

    /// First fifty posts, for the explore grid.
    pub async fn explore_posts(&self) -> Result<Vec<Post>, ApiError> {
        self.list_posts(PageRequest::EXPLORE).await
    }

    pub async fn community_posts(&self) -> Result<Vec<Post>, ApiError> {
        self.list_posts(PageRequest::COMMUNITY).await
    }

    pub async fn get_post(&self, id: Id) -> Result<Post, ApiError> {
        let response = self.transport.execute(self.client.build_get_post(id)).await?;
        self.client.parse_get_post(&response)
    }

    pub async fn create_post(&self, input: &CreatePostRequest) -> Result<Post, ApiError> {
        let request = self.client.build_create_post(input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create_post(&response)
    }

    pub async fn update_post(&self, id: Id, input: &CreatePostRequest) -> Result<Post, ApiError> {
        let request = self.client.build_update_post(id, input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_post(&response)
    }

    pub async fn delete_post(&self, id: Id) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_post(id)).await?;
        self.client.parse_delete_post(&response)
    }

    pub async fn like_post(&self, id: Id) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_like_post(id)).await?;
        self.client.parse_like_post(&response)
    }

    pub async fn unlike_post(&self, id: Id) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_unlike_post(id)).await?;
        self.client.parse_unlike_post(&response)
    }

    pub async fn search_posts(&self, query: &SearchQuery) -> Result<Vec<Post>, ApiError> {
        let response = self.transport.execute(self.client.build_search_posts(query)).await?;
        let posts = self.client.parse_search_posts(&response)?;
        debug!(?query, count = posts.len(), "searched posts");
        Ok(posts)
    }

    pub async fn posts_by_user(&self, user_id: Id) -> Result<Vec<Post>, ApiError> {
        let response = self.transport.execute(self.client.build_posts_by_user(user_id)).await?;
        self.client.parse_posts_by_user(&response)
    }

    pub async fn feed(&self, page: PageRequest) -> Result<Vec<Post>, ApiError> {
        let response = self.transport.execute(self.client.build_feed(page)).await?;
        self.client.parse_feed(&response)
    }
}

#[derive(Clone)]
pub struct CommentService {
    client: CommentClient,
    transport: Arc<dyn Transport>,
}

impl CommentService {
    pub fn new(client: CommentClient, transport: Arc<dyn Transport>) -> Self {
        Self { client, transport }
    }

    pub async fn comments_by_post(&self, post_id: Id) -> Result<Vec<Comment>, ApiError> {
        let response = self.transport.execute(self.client.build_comments_by_post(post_id)).await?;
        self.client.parse_comments_by_post(&response)
    }

    pub async fn create_comment(&self, input: &CreateCommentRequest) -> Result<Comment, ApiError> {
        let request = self.client.build_create_comment(input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create_comment(&response)
    }

    pub async fn delete_comment(&self, id: Id) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_comment(id)).await?;
        self.client.parse_delete_comment(&response)
    }
}

#[derive(Clone)]
pub struct UserService {
    client: UserClient,
    transport: Arc<dyn Transport>,
}

impl UserService {
    pub fn new(client: UserClient, transport: Arc<dyn Transport>) -> Self {
        Self { client, transport }
    }

    pub async fn register(&self, input: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let request = self.client.build_register(input)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_register(&response)
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let request = self.client.build_login(credentials)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_login(&response)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let response = self.transport.execute(self.client.build_list_users()).await?;
        self.client.parse_list_users(&response)
    }

    /// `user_id` starts following `target_id`; returns the server's message.
    pub async fn follow_user(&self, user_id: Id, target_id: Id) -> Result<String, ApiError> {
        let request = self.client.build_follow_user(user_id, target_id);
        let response = self.transport.execute(request).await?;
        self.client.parse_follow_user(&response)
    }
}

#[cfg(test)]
mod tests {
    use aventura_core::{HttpMethod, HttpResponse};
    use serde_json::json;

    use super::*;
    use crate::transport::StubTransport;

    const BASE: &str = "http://posts.test";

    fn post_json(id: Id) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Ridge",
            "location": "Gredos",
            "userId": 1,
            "userName": "ana",
            "photos": [],
            "likesCount": 0,
            "commentsCount": 0,
            "createdAt": "2024-05-01T09:30:00",
            "updatedAt": "2024-05-01T09:30:00"
        })
    }

    fn posts(stub: &Arc<StubTransport>) -> PostService {
        PostService::new(PostClient::new(BASE), stub.clone())
    }

    #[tokio::test]
    async fn create_post_issues_one_post_with_exact_payload() {
        let stub = Arc::new(StubTransport::new().reply_json(201, post_json(4)));
        let input = CreatePostRequest {
            title: "Ridge".to_string(),
            location: "Gredos".to_string(),
            user_id: 1,
            user_name: "ana".to_string(),
            ..Default::default()
        };

        let post = posts(&stub).create_post(&input).await.unwrap();

        assert_eq!(post.id, 4);
        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].path, "http://posts.test/api/posts");
        let sent: CreatePostRequest = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, input);
    }

    #[tokio::test]
    async fn invalid_photos_never_reach_the_transport() {
        let stub = Arc::new(StubTransport::new());
        let input = CreatePostRequest {
            photos: vec!["https://a/1.jpg".to_string(), "https://a/1.jpg".to_string()],
            ..Default::default()
        };
        let err = posts(&stub).create_post(&input).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidPayload(_)));
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn delete_post_resolves_empty() {
        let stub = Arc::new(StubTransport::new().reply(HttpResponse::new(204, "")));
        posts(&stub).delete_post(9).await.unwrap();
        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Delete);
        assert_eq!(requests[0].path, "http://posts.test/api/posts/9");
    }

    #[tokio::test]
    async fn list_posts_defaults_and_missing_content() {
        let stub = Arc::new(StubTransport::new().reply_json(200, json!({"totalElements": 0})));
        let listed = posts(&stub).list_posts(PageRequest::default()).await.unwrap();
        assert!(listed.is_empty());
        assert_eq!(stub.requests()[0].path, "http://posts.test/api/posts?page=0&size=10");
    }

    #[tokio::test]
    async fn home_and_explore_use_their_sizes() {
        let stub = Arc::new(
            StubTransport::new()
                .reply_json(200, json!({"content": [post_json(1)]}))
                .reply_json(200, json!({"content": []})),
        );
        let service = posts(&stub);
        assert_eq!(service.home_posts().await.unwrap().len(), 1);
        assert!(service.explore_posts().await.unwrap().is_empty());
        let paths: Vec<String> = stub.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                "http://posts.test/api/posts?page=0&size=6".to_string(),
                "http://posts.test/api/posts?page=0&size=50".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn network_failure_is_rethrown_from_list() {
        let stub = Arc::new(StubTransport::new().fail("connection refused"));
        let err = posts(&stub).list_posts(PageRequest::default()).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn server_error_carries_status_and_body() {
        let stub = Arc::new(StubTransport::new().reply(HttpResponse::new(500, "boom")));
        let err = posts(&stub).get_post(1).await.unwrap_err();
        match err {
            ApiError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_sends_only_present_terms() {
        let stub = Arc::new(
            StubTransport::new()
                .reply_json(200, json!({"content": []}))
                .reply_json(200, json!({"content": []}))
                .reply_json(200, json!({"content": []})),
        );
        let service = posts(&stub);
        service.search_posts(&SearchQuery::location("Gredos")).await.unwrap();
        service.search_posts(&SearchQuery::adventure_type("kayak")).await.unwrap();
        service.search_posts(&SearchQuery::default()).await.unwrap();
        let paths: Vec<String> = stub.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths[0], "http://posts.test/api/posts/search?location=Gredos");
        assert_eq!(paths[1], "http://posts.test/api/posts/search?adventureType=kayak");
        assert_eq!(paths[2], "http://posts.test/api/posts/search");
    }

    #[tokio::test]
    async fn comments_round_trip_through_stub() {
        let stub = Arc::new(
            StubTransport::new()
                .reply_json(
                    200,
                    json!([{"id": 1, "content": "Nice", "postId": 3, "userId": 2,
                            "userName": "leo", "createdAt": "2024-06-01T12:00:00"}]),
                )
                .reply(HttpResponse::new(204, "")),
        );
        let service = CommentService::new(CommentClient::new(BASE), stub.clone());
        let comments = service.comments_by_post(3).await.unwrap();
        assert_eq!(comments[0].user_name, "leo");
        service.delete_comment(1).await.unwrap();
        assert_eq!(stub.requests()[0].path, "http://posts.test/api/comments?postId=3");
        assert_eq!(stub.requests()[1].path, "http://posts.test/api/comments/1");
    }

    #[tokio::test]
    async fn follow_returns_server_text() {
        let stub = Arc::new(StubTransport::new().reply(HttpResponse::new(200, "Ahora sigues a leo")));
        let service = UserService::new(UserClient::new("http://users.test"), stub.clone());
        let text = service.follow_user(1, 2).await.unwrap();
        assert_eq!(text, "Ahora sigues a leo");
        assert_eq!(stub.requests()[0].path, "http://users.test/api/users/1/follow/2");
    }
}
