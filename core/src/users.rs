//! Request builder and response parser for `/api/users` on the user service.

use crate::client::{check_status, decode, Endpoint};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AuthResponse, Id, LoginRequest, RegisterRequest, User};

#[derive(Debug, Clone)]
pub struct UserClient {
    endpoint: Endpoint,
}

impl UserClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: Endpoint::new(base_url),
        }
    }

    pub fn build_register(&self, input: &RegisterRequest) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint.url("/api/users/register");
        self.endpoint.json_request(HttpMethod::Post, url, input)
    }

    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        let url = self.endpoint.url("/api/users/login");
        self.endpoint.json_request(HttpMethod::Post, url, input)
    }

    pub fn build_list_users(&self) -> HttpRequest {
        let url = self.endpoint.url("/api/users");
        self.endpoint.request(HttpMethod::Get, url)
    }

    /// `user_id` follows `target_id`.
    pub fn build_follow_user(&self, user_id: Id, target_id: Id) -> HttpRequest {
        let url = self.endpoint.url(&format!("/api/users/{user_id}/follow/{target_id}"));
        self.endpoint.request(HttpMethod::Post, url)
    }

    /// Rejected registrations come back as 400 with an `AuthResponse` body;
    /// they surface as `ApiError::Http` and the message is available through
    /// [`ApiError::server_message`].
    pub fn parse_register(&self, response: &HttpResponse) -> Result<AuthResponse, ApiError> {
        decode(response)
    }

    pub fn parse_login(&self, response: &HttpResponse) -> Result<AuthResponse, ApiError> {
        decode(response)
    }

    pub fn parse_list_users(&self, response: &HttpResponse) -> Result<Vec<User>, ApiError> {
        decode(response)
    }

    /// The service answers follow calls with a plain-text confirmation.
    pub fn parse_follow_user(&self, response: &HttpResponse) -> Result<String, ApiError> {
        check_status(response)?;
        Ok(response.body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UserClient {
        UserClient::new("http://localhost:8080/")
    }

    #[test]
    fn build_login_produces_correct_request() {
        let input = LoginRequest {
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
        };
        let req = client().build_login(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/api/users/login");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["email"], "ana@example.com");
        assert_eq!(body["password"], "secret");
    }

    #[test]
    fn build_register_produces_correct_request() {
        let input = RegisterRequest {
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
        };
        let req = client().build_register(&input).unwrap();
        assert_eq!(req.path, "http://localhost:8080/api/users/register");
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn build_follow_user_path() {
        let req = client().build_follow_user(1, 2);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/api/users/1/follow/2");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_login_success() {
        let response = HttpResponse::new(
            200,
            r#"{"message":"Login exitoso","user":{"id":1,"username":"ana","email":"ana@example.com"}}"#,
        );
        let auth = client().parse_login(&response).unwrap();
        assert_eq!(auth.user.unwrap().username, "ana");
    }

    #[test]
    fn parse_login_rejected_carries_message() {
        let response = HttpResponse::new(400, r#"{"message":"Error en el login: Credenciales inválidas"}"#);
        let err = client().parse_login(&response).unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.server_message().as_deref(),
            Some("Error en el login: Credenciales inválidas")
        );
    }

    #[test]
    fn parse_list_users_success() {
        let response = HttpResponse::new(
            200,
            r#"[{"id":1,"username":"ana","email":"a@x.io","followersCount":4},{"id":2,"username":"leo","email":"l@x.io"}]"#,
        );
        let users = client().parse_list_users(&response).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].followers_count, Some(4));
    }

    #[test]
    fn parse_follow_user_returns_text() {
        let text = client()
            .parse_follow_user(&HttpResponse::new(200, "Ahora sigues a leo"))
            .unwrap();
        assert_eq!(text, "Ahora sigues a leo");
    }
}
