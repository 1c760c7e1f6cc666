//! Synchronous API client core for the Aventura post and user services.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `PostClient`, `CommentClient` and `UserClient` are stateless; each holds
//!   only the base URL of the service it talks to.
//! - Each remote operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Paginated routes are unwrapped to their items; an absent envelope is
//!   empty, a malformed one is an error.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod comments;
pub mod error;
pub mod http;
pub mod posts;
pub mod types;
pub mod users;

pub use client::Endpoint;
pub use comments::CommentClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use posts::PostClient;
pub use types::{
    AuthResponse, Comment, CreateCommentRequest, CreatePostRequest, Id, LoginRequest, Page, PageRequest, Post,
    RegisterRequest, SearchQuery, User,
};
pub use users::UserClient;
