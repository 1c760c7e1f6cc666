//! Domain DTOs for the Aventura post and user services.
//!
//! # Design
//! These types mirror the JSON the services produce (camelCase, `Long` ids,
//! zone-less timestamps) but are defined independently from the mock-server
//! crate. Integration tests catch schema drift between the two.
//!
//! Nothing here validates. Payload checks live next to the request builders.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Numeric identifier used by both services for users, posts and comments.
pub type Id = i64;

/// A registered user as returned by the user service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following_count: Option<u32>,
}

/// An adventure post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    #[serde(default)]
    pub adventure_type: Option<String>,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default)]
    pub estimated_duration: Option<String>,
    pub user_id: Id,
    pub user_name: String,
    /// Photo URLs in display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub photos: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments_count: u32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for creating a post, and for replacing one wholesale on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adventure_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    pub user_id: Id,
    pub user_name: String,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl From<&Post> for CreatePostRequest {
    /// Start an edit from the stored post; the update route replaces every field.
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            description: post.description.clone(),
            location: post.location.clone(),
            adventure_type: post.adventure_type.clone(),
            difficulty_level: post.difficulty_level.clone(),
            estimated_duration: post.estimated_duration.clone(),
            user_id: post.user_id,
            user_name: post.user_name.clone(),
            photos: post.photos.clone(),
        }
    }
}

/// A comment attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id,
    pub content: String,
    pub post_id: Id,
    pub user_id: Id,
    pub user_name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub post_id: Id,
    pub user_id: Id,
    pub user_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of both successful and rejected register/login calls.
///
/// The user service sends the same shape with a 400 status on failure, minus
/// the `user` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Paging metadata nested in a [`Page`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pageable {
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub page_size: u32,
}

/// The paginated envelope returned by list endpoints of the post service.
///
/// Only `content` is required by callers; the counters are kept for anyone
/// rendering pagination controls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(
        default = "Vec::new",
        deserialize_with = "null_as_default",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub content: Vec<T>,
    #[serde(default, deserialize_with = "pageable_or_none")]
    pub pageable: Option<Pageable>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub last: bool,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub number_of_elements: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub empty: bool,
}

/// Zero-based page index and page size for paginated list calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Server-side defaults of the list endpoints.
    pub const DEFAULT: Self = Self::first(10);
    /// Landing page preview.
    pub const HOME: Self = Self::first(6);
    /// Explore grid.
    pub const EXPLORE: Self = Self::first(50);
    /// Community directory activity panel.
    pub const COMMUNITY: Self = Self::first(20);

    pub const fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub const fn first(size: u32) -> Self {
        Self { page: 0, size }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Filters for post search. Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub location: Option<String>,
    pub adventure_type: Option<String>,
}

impl SearchQuery {
    pub fn new(location: Option<&str>, adventure_type: Option<&str>) -> Self {
        Self {
            location: location.map(str::to_string),
            adventure_type: adventure_type.map(str::to_string),
        }
    }

    pub fn location(location: &str) -> Self {
        Self::new(Some(location), None)
    }

    pub fn adventure_type(adventure_type: &str) -> Self {
        Self::new(None, Some(adventure_type))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Unpaged results serialize `pageable` as the string `"INSTANCE"`.
fn pageable_or_none<'de, D>(deserializer: D) -> Result<Option<Pageable>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST_JSON: &str = r#"{
        "id": 7,
        "title": "Ridge walk",
        "description": null,
        "location": "Picos de Europa",
        "adventureType": "hiking",
        "userId": 3,
        "userName": "ana",
        "photos": null,
        "likesCount": null,
        "commentsCount": 2,
        "createdAt": "2024-05-01T09:30:00",
        "updatedAt": "2024-05-01T09:30:00.123456"
    }"#;

    #[test]
    fn post_tolerates_null_collections_and_counters() {
        let post: Post = serde_json::from_str(POST_JSON).unwrap();
        assert_eq!(post.id, 7);
        assert!(post.photos.is_empty());
        assert_eq!(post.likes_count, 0);
        assert_eq!(post.comments_count, 2);
        assert_eq!(post.adventure_type.as_deref(), Some("hiking"));
        assert!(post.difficulty_level.is_none());
    }

    #[test]
    fn create_post_request_uses_camel_case_and_skips_absent_fields() {
        let input = CreatePostRequest {
            title: "Canyon".to_string(),
            location: "Guara".to_string(),
            adventure_type: Some("canyoning".to_string()),
            user_id: 1,
            user_name: "ana".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["adventureType"], "canyoning");
        assert_eq!(json["userId"], 1);
        assert_eq!(json["userName"], "ana");
        assert!(json.get("description").is_none());
        assert_eq!(json["photos"], serde_json::json!([]));
    }

    #[test]
    fn create_post_request_from_post_keeps_editable_fields() {
        let post: Post = serde_json::from_str(POST_JSON).unwrap();
        let edit = CreatePostRequest::from(&post);
        assert_eq!(edit.title, "Ridge walk");
        assert_eq!(edit.user_id, 3);
        assert_eq!(edit.adventure_type.as_deref(), Some("hiking"));
    }

    #[test]
    fn user_from_login_response_has_no_profile_fields() {
        let user: User =
            serde_json::from_str(r#"{"id":1,"username":"ana","email":"ana@example.com"}"#).unwrap();
        assert!(user.bio.is_none());
        assert!(user.followers_count.is_none());
        let back = serde_json::to_value(&user).unwrap();
        assert!(back.get("bio").is_none());
    }

    #[test]
    fn auth_response_without_user() {
        let res: AuthResponse =
            serde_json::from_str(r#"{"message":"Error en el login: bad credentials"}"#).unwrap();
        assert!(res.user.is_none());
        assert!(res.message.starts_with("Error en el login"));
    }

    #[test]
    fn page_without_content_is_empty() {
        let page: Page<Post> = serde_json::from_str(r#"{"totalPages":0}"#).unwrap();
        assert!(page.content.is_empty());
    }

    #[test]
    fn page_with_null_content_is_empty() {
        let page: Page<Post> = serde_json::from_str(r#"{"content":null,"totalElements":0}"#).unwrap();
        assert!(page.content.is_empty());
    }

    #[test]
    fn page_with_unpaged_marker() {
        let page: Page<Post> =
            serde_json::from_str(r#"{"content":[],"pageable":"INSTANCE"}"#).unwrap();
        assert!(page.pageable.is_none());
    }

    #[test]
    fn page_request_presets() {
        assert_eq!(PageRequest::default(), PageRequest::new(0, 10));
        assert_eq!(PageRequest::HOME.size, 6);
        assert_eq!(PageRequest::EXPLORE.size, 50);
        assert_eq!(PageRequest::COMMUNITY.size, 20);
    }
}
