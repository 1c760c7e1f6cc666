//! In-memory stand-ins for the Aventura post and user services.
//!
//! `post_app()` serves posts and comments, `user_app()` serves users. Both
//! keep their state in a `RwLock`ed store that lives as long as the router,
//! and answer with the status codes the real services use.

use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

pub type Id = i64;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub adventure_type: Option<String>,
    pub difficulty_level: Option<String>,
    pub estimated_duration: Option<String>,
    pub user_id: Id,
    pub user_name: String,
    pub photos: Vec<String>,
    pub likes_count: u32,
    pub comments_count: u32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub adventure_type: Option<String>,
    pub difficulty_level: Option<String>,
    pub estimated_duration: Option<String>,
    pub user_id: Id,
    pub user_name: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl CreatePost {
    fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.location.trim().is_empty() && !self.user_name.trim().is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub content: String,
    pub post_id: Id,
    pub user_id: Id,
    pub user_name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub content: String,
    pub post_id: Id,
    pub user_id: Id,
    pub user_name: String,
}

/// Spring-style page envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub pageable: Pageable,
    pub total_pages: u32,
    pub total_elements: u64,
    pub last: bool,
    pub size: u32,
    pub number: u32,
    pub number_of_elements: u32,
    pub first: bool,
    pub empty: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pageable {
    pub page_number: u32,
    pub page_size: u32,
}

#[derive(Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

const fn default_size() -> u32 {
    10
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub location: Option<String>,
    pub adventure_type: Option<String>,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentParams {
    pub post_id: Id,
}

#[derive(Default)]
pub struct PostStore {
    posts: BTreeMap<Id, Post>,
    comments: BTreeMap<Id, Comment>,
    last_post_id: Id,
    last_comment_id: Id,
}

pub type PostDb = Arc<RwLock<PostStore>>;

pub fn post_app() -> Router {
    let db: PostDb = Arc::new(RwLock::new(PostStore::default()));
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/search", get(search_posts))
        .route("/api/posts/feed", get(feed))
        .route("/api/posts/user/{user_id}", get(posts_by_user))
        .route("/api/posts/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/api/posts/{id}/like", post(like_post).delete(unlike_post))
        .route("/api/comments", get(list_comments).post(create_comment))
        .route("/api/comments/post/{post_id}", get(comments_by_post_path))
        .route("/api/comments/{id}", delete(delete_comment))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Newest first, like the real service's `createdAt DESC` ordering.
fn newest_first<'a>(posts: impl Iterator<Item = &'a Post>) -> Vec<Post> {
    let mut posts: Vec<Post> = posts.cloned().collect();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    posts
}

fn paginate<T>(items: Vec<T>, page: u32, size: u32) -> Result<Page<T>, StatusCode> {
    if size == 0 {
        return Err(StatusCode::BAD_REQUEST);
    }
    let total = items.len() as u64;
    let total_pages = total.div_ceil(u64::from(size)) as u32;
    let content: Vec<T> = items
        .into_iter()
        .skip(page as usize * size as usize)
        .take(size as usize)
        .collect();
    let count = content.len() as u32;
    Ok(Page {
        pageable: Pageable {
            page_number: page,
            page_size: size,
        },
        total_pages,
        total_elements: total,
        last: page.saturating_add(1) >= total_pages,
        size,
        number: page,
        number_of_elements: count,
        first: page == 0,
        empty: count == 0,
        content,
    })
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

async fn list_posts(
    State(db): State<PostDb>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Post>>, StatusCode> {
    let store = db.read().await;
    let posts = newest_first(store.posts.values());
    paginate(posts, params.page, params.size).map(Json)
}

async fn create_post(
    State(db): State<PostDb>,
    Json(input): Json<CreatePost>,
) -> Result<(StatusCode, Json<Post>), StatusCode> {
    if !input.is_valid() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    store.last_post_id += 1;
    let created = now();
    let post = Post {
        id: store.last_post_id,
        title: input.title,
        description: input.description,
        location: input.location,
        adventure_type: input.adventure_type,
        difficulty_level: input.difficulty_level,
        estimated_duration: input.estimated_duration,
        user_id: input.user_id,
        user_name: input.user_name,
        photos: input.photos,
        likes_count: 0,
        comments_count: 0,
        created_at: created,
        updated_at: created,
    };
    store.posts.insert(post.id, post.clone());
    Ok((StatusCode::CREATED, Json(post)))
}

async fn get_post(State(db): State<PostDb>, Path(id): Path<Id>) -> Result<Json<Post>, StatusCode> {
    let store = db.read().await;
    store.posts.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_post(
    State(db): State<PostDb>,
    Path(id): Path<Id>,
    Json(input): Json<CreatePost>,
) -> Result<Json<Post>, StatusCode> {
    if !input.is_valid() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    let post = store.posts.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    post.title = input.title;
    post.description = input.description;
    post.location = input.location;
    post.adventure_type = input.adventure_type;
    post.difficulty_level = input.difficulty_level;
    post.estimated_duration = input.estimated_duration;
    post.user_id = input.user_id;
    post.user_name = input.user_name;
    post.photos = input.photos;
    post.updated_at = now();
    Ok(Json(post.clone()))
}

async fn delete_post(State(db): State<PostDb>, Path(id): Path<Id>) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store.posts.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    store.comments.retain(|_, comment| comment.post_id != id);
    Ok(StatusCode::NO_CONTENT)
}

async fn like_post(State(db): State<PostDb>, Path(id): Path<Id>) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let post = store.posts.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    post.likes_count += 1;
    Ok(StatusCode::OK)
}

async fn unlike_post(State(db): State<PostDb>, Path(id): Path<Id>) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let post = store.posts.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    post.likes_count = post.likes_count.saturating_sub(1);
    Ok(StatusCode::OK)
}

async fn search_posts(
    State(db): State<PostDb>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Page<Post>>, StatusCode> {
    let store = db.read().await;
    let matches = store.posts.values().filter(|post| {
        let by_location = params
            .location
            .as_deref()
            .map_or(true, |location| contains_ignore_case(Some(&post.location), location));
        let by_type = params
            .adventure_type
            .as_deref()
            .map_or(true, |kind| contains_ignore_case(post.adventure_type.as_deref(), kind));
        by_location && by_type
    });
    paginate(newest_first(matches), params.page, params.size).map(Json)
}

async fn feed(
    State(db): State<PostDb>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Post>>, StatusCode> {
    let store = db.read().await;
    paginate(newest_first(store.posts.values()), params.page, params.size).map(Json)
}

async fn posts_by_user(State(db): State<PostDb>, Path(user_id): Path<Id>) -> Json<Vec<Post>> {
    let store = db.read().await;
    Json(newest_first(store.posts.values().filter(|post| post.user_id == user_id)))
}

fn comments_for(store: &PostStore, post_id: Id) -> Vec<Comment> {
    store
        .comments
        .values()
        .filter(|comment| comment.post_id == post_id)
        .cloned()
        .collect()
}

async fn list_comments(State(db): State<PostDb>, Query(params): Query<CommentParams>) -> Json<Vec<Comment>> {
    let store = db.read().await;
    Json(comments_for(&store, params.post_id))
}

async fn comments_by_post_path(State(db): State<PostDb>, Path(post_id): Path<Id>) -> Json<Vec<Comment>> {
    let store = db.read().await;
    Json(comments_for(&store, post_id))
}

async fn create_comment(
    State(db): State<PostDb>,
    Json(input): Json<CreateComment>,
) -> Result<(StatusCode, Json<Comment>), StatusCode> {
    if input.content.trim().is_empty() || input.user_name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    let post = store.posts.get_mut(&input.post_id).ok_or(StatusCode::NOT_FOUND)?;
    post.comments_count += 1;
    store.last_comment_id += 1;
    let comment = Comment {
        id: store.last_comment_id,
        content: input.content,
        post_id: input.post_id,
        user_id: input.user_id,
        user_name: input.user_name,
        created_at: now(),
    };
    store.comments.insert(comment.id, comment.clone());
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn delete_comment(State(db): State<PostDb>, Path(id): Path<Id>) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    let comment = store.comments.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(post) = store.posts.get_mut(&comment.post_id) {
        post.comments_count = post.comments_count.saturating_sub(1);
    }
    Ok(StatusCode::NO_CONTENT)
}

// --- user service ---

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub followers_count: u32,
    pub following_count: u32,
}

/// The slim user shape register and login answer with.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Id,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDto>,
}

impl AuthResponse {
    fn rejected(message: String) -> (StatusCode, Json<Self>) {
        (StatusCode::BAD_REQUEST, Json(Self { message, user: None }))
    }
}

#[derive(Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

struct Account {
    user: User,
    password: String,
    following: Vec<Id>,
}

#[derive(Default)]
pub struct UserStore {
    accounts: BTreeMap<Id, Account>,
    last_id: Id,
}

pub type UserDb = Arc<RwLock<UserStore>>;

pub fn user_app() -> Router {
    let db: UserDb = Arc::new(RwLock::new(UserStore::default()));
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/users/{user_id}/follow/{target_id}", post(follow_user))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

fn dto(user: &User) -> UserDto {
    UserDto {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
    }
}

async fn list_users(State(db): State<UserDb>) -> Json<Vec<User>> {
    let store = db.read().await;
    Json(store.accounts.values().map(|account| account.user.clone()).collect())
}

async fn register(
    State(db): State<UserDb>,
    Json(input): Json<RegisterUser>,
) -> (StatusCode, Json<AuthResponse>) {
    if input.username.trim().is_empty() || !input.email.contains('@') || input.password.is_empty() {
        return AuthResponse::rejected("Error en el registro: datos inválidos".to_string());
    }
    let mut store = db.write().await;
    let taken = store
        .accounts
        .values()
        .any(|account| account.user.email == input.email || account.user.username == input.username);
    if taken {
        return AuthResponse::rejected("Error en el registro: el usuario ya existe".to_string());
    }
    store.last_id += 1;
    let user = User {
        id: store.last_id,
        username: input.username,
        email: input.email,
        profile_picture: None,
        bio: None,
        followers_count: 0,
        following_count: 0,
    };
    let response = AuthResponse {
        message: "Usuario registrado exitosamente".to_string(),
        user: Some(dto(&user)),
    };
    store.accounts.insert(
        user.id,
        Account {
            user,
            password: input.password,
            following: Vec::new(),
        },
    );
    (StatusCode::OK, Json(response))
}

async fn login(State(db): State<UserDb>, Json(input): Json<LoginUser>) -> (StatusCode, Json<AuthResponse>) {
    let store = db.read().await;
    let account = store
        .accounts
        .values()
        .find(|account| account.user.email == input.email && account.password == input.password);
    match account {
        Some(account) => (
            StatusCode::OK,
            Json(AuthResponse {
                message: "Login exitoso".to_string(),
                user: Some(dto(&account.user)),
            }),
        ),
        None => AuthResponse::rejected("Error en el login: credenciales inválidas".to_string()),
    }
}

async fn follow_user(
    State(db): State<UserDb>,
    Path((user_id, target_id)): Path<(Id, Id)>,
) -> (StatusCode, String) {
    let mut store = db.write().await;
    let rejected = |reason: &str| (StatusCode::BAD_REQUEST, format!("Error al seguir usuario: {reason}"));
    if user_id == target_id {
        return rejected("no puedes seguirte a ti mismo");
    }
    if !store.accounts.contains_key(&target_id) {
        return rejected("usuario no encontrado");
    }
    let Some(follower) = store.accounts.get_mut(&user_id) else {
        return rejected("usuario no encontrado");
    };
    if follower.following.contains(&target_id) {
        return rejected("ya sigues a este usuario");
    }
    follower.following.push(target_id);
    follower.user.following_count += 1;
    let Some(target) = store.accounts.get_mut(&target_id) else {
        return rejected("usuario no encontrado");
    };
    target.user.followers_count += 1;
    (StatusCode::OK, format!("Ahora sigues a {}", target.user.username))
}

/// Which of the two backends to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Posts,
    Users,
}

impl Service {
    pub fn app(self) -> Router {
        match self {
            Service::Posts => post_app(),
            Service::Users => user_app(),
        }
    }
}

pub async fn run(listener: TcpListener, service: Service) -> Result<(), std::io::Error> {
    axum::serve(listener, service.app()).await
}

/// Serve `service` on a random local port from a background thread and
/// return its address. Used by integration tests of the client crates.
pub fn spawn(service: Service) -> Result<SocketAddr, std::io::Error> {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = std_listener.local_addr()?;
    std_listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(error = %e, ?service, "failed to start runtime");
                return;
            }
        };
        let result = rt.block_on(async {
            let listener = TcpListener::from_std(std_listener)?;
            run(listener, service).await
        });
        if let Err(e) = result {
            tracing::error!(error = %e, ?service, "mock service stopped");
        }
    });

    Ok(addr)
}
