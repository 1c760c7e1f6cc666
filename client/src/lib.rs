//! Async host for the Aventura client core.
//!
//! # Overview
//! `aventura-core` builds and parses plain-data HTTP messages. This crate
//! performs the round-trips: it reads configuration, executes requests through
//! a [`Transport`], exposes one async method per remote operation, and keeps
//! the locally persisted session.
//!
//! # Design
//! - [`Aventura`] is the composition root. It wires one transport per backend
//!   service into the three service façades and owns the [`SessionStore`].
//! - Tests swap in [`StubTransport`] through [`Aventura::with_transports`];
//!   production code never branches on it.
//! - Errors from remote calls stay `ApiError`; flows that also touch the
//!   session return [`ClientError`].

pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod transport;

use std::sync::Arc;

use aventura_core::{CommentClient, Id, LoginRequest, PostClient, RegisterRequest, User, UserClient};
use tracing::info;

pub use config::{ClientConfig, LogLevel, ServiceConfig};
pub use error::{ClientError, SessionError};
pub use services::{CommentService, PostService, UserService};
pub use session::{FileStorage, MemoryStorage, Session, SessionStorage, SessionStore, USER_KEY};
pub use transport::{ReqwestTransport, StubTransport, Transport};

pub struct Aventura<S> {
    posts: PostService,
    comments: CommentService,
    users: UserService,
    session: SessionStore<S>,
}

impl Aventura<FileStorage> {
    /// Configure from the environment and restore the session from disk.
    pub fn from_env() -> Result<Self, ClientError> {
        let config = ClientConfig::from_env()?;
        let dir = config
            .data_dir
            .clone()
            .unwrap_or_else(FileStorage::default_location);
        Self::connect(&config, FileStorage::new(dir))
    }
}

impl<S: SessionStorage> Aventura<S> {
    /// Build reqwest transports for both services.
    pub fn connect(config: &ClientConfig, storage: S) -> Result<Self, ClientError> {
        let posts = ReqwestTransport::new("posts", &config.posts)?;
        let users = ReqwestTransport::new("users", &config.users)?;
        Ok(Self::with_transports(config, Arc::new(posts), Arc::new(users), storage))
    }

    /// `post_transport` serves posts and comments, `user_transport` users.
    pub fn with_transports(
        config: &ClientConfig,
        post_transport: Arc<dyn Transport>,
        user_transport: Arc<dyn Transport>,
        storage: S,
    ) -> Self {
        let posts_url = config.posts.base_url.as_str();
        Self {
            posts: PostService::new(PostClient::new(posts_url), post_transport.clone()),
            comments: CommentService::new(CommentClient::new(posts_url), post_transport),
            users: UserService::new(UserClient::new(&config.users.base_url), user_transport),
            session: SessionStore::restore(storage),
        }
    }

    pub fn posts(&self) -> &PostService {
        &self.posts
    }

    pub fn comments(&self) -> &CommentService {
        &self.comments
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.current()
    }

    /// Authenticate and remember the returned user.
    pub async fn login(&mut self, credentials: &LoginRequest) -> Result<User, ClientError> {
        let auth = self.users.login(credentials).await?;
        self.remember(auth.user, auth.message)
    }

    /// Create an account and log in as it.
    pub async fn register(&mut self, request: &RegisterRequest) -> Result<User, ClientError> {
        let auth = self.users.register(request).await?;
        self.remember(auth.user, auth.message)
    }

    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.session.logout()?;
        Ok(())
    }

    /// Follow `target_id` as the logged-in user.
    pub async fn follow(&self, target_id: Id) -> Result<String, ClientError> {
        let user_id = self.current_user().ok_or(ClientError::NotLoggedIn)?.id;
        let message = self.users.follow_user(user_id, target_id).await?;
        info!(user_id, target_id, "followed user");
        Ok(message)
    }

    fn remember(&mut self, user: Option<User>, message: String) -> Result<User, ClientError> {
        let user = user.ok_or(ClientError::MissingUser(message))?;
        self.session.login(user.clone())?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use aventura_core::{ApiError, HttpResponse};
    use serde_json::json;

    use super::*;

    fn user_json(id: Id, name: &str) -> serde_json::Value {
        json!({"id": id, "username": name, "email": format!("{name}@example.com")})
    }

    fn app(users: StubTransport) -> (Aventura<MemoryStorage>, Arc<StubTransport>) {
        let users = Arc::new(users);
        let config = ClientConfig::with_base_urls("http://posts.test", "http://users.test");
        let app = Aventura::with_transports(&config, Arc::new(StubTransport::new()), users.clone(), MemoryStorage::new());
        (app, users)
    }

    fn credentials() -> LoginRequest {
        LoginRequest {
            email: "ana@example.com".to_string(),
            password: "pw".to_string(),
        }
    }

    #[tokio::test]
    async fn login_with_user_authenticates() {
        let (mut app, _) = app(StubTransport::new().reply_json(
            200,
            json!({"message": "Login exitoso", "user": user_json(1, "ana")}),
        ));
        let user = app.login(&credentials()).await.unwrap();
        assert_eq!(user.username, "ana");
        assert_eq!(app.current_user().map(|u| u.id), Some(1));
        assert!(app.session().storage().get(USER_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn login_without_user_stays_anonymous() {
        let (mut app, _) = app(StubTransport::new().reply_json(200, json!({"message": "Cuenta bloqueada"})));
        let err = app.login(&credentials()).await.unwrap_err();
        match err {
            ClientError::MissingUser(message) => assert_eq!(message, "Cuenta bloqueada"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(app.current_user().is_none());
    }

    #[tokio::test]
    async fn rejected_login_keeps_server_message() {
        let (mut app, _) = app(StubTransport::new().reply(HttpResponse::new(
            400,
            r#"{"message":"Error en el login: credenciales incorrectas"}"#,
        )));
        let err = app.login(&credentials()).await.unwrap_err();
        let ClientError::Api(api) = err else {
            panic!("expected an API error");
        };
        assert_eq!(api.status(), Some(400));
        assert_eq!(api.server_message().as_deref(), Some("Error en el login: credenciales incorrectas"));
        assert!(app.current_user().is_none());
    }

    #[tokio::test]
    async fn follow_requires_login() {
        let (app, stub) = app(StubTransport::new());
        let err = app.follow(2).await.unwrap_err();
        assert!(matches!(err, ClientError::NotLoggedIn));
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn register_then_follow_then_logout() {
        let (mut app, stub) = app(
            StubTransport::new()
                .reply_json(200, json!({"message": "Registro exitoso", "user": user_json(5, "ana")}))
                .reply(HttpResponse::new(200, "Ahora sigues a leo")),
        );
        let request = RegisterRequest {
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "pw".to_string(),
        };
        app.register(&request).await.unwrap();
        assert_eq!(app.follow(7).await.unwrap(), "Ahora sigues a leo");
        assert_eq!(stub.requests()[1].path, "http://users.test/api/users/5/follow/7");

        app.logout().unwrap();
        assert!(app.current_user().is_none());
        assert!(matches!(app.follow(7).await.unwrap_err(), ClientError::NotLoggedIn));
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_api_error() {
        let (mut app, _) = app(StubTransport::new().fail("connection refused"));
        let err = app.login(&credentials()).await.unwrap_err();
        assert!(matches!(err, ClientError::Api(ApiError::Transport(_))));
    }
}
