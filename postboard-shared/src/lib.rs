pub mod model {
    use serde::{Deserialize, Deserializer};

    pub type PostId = i64;
    pub type CommentId = i64;

    pub const DEFAULT_USERNAME: &str = "Anonymous";
    pub const DEFAULT_USER_IMAGE_URL: &str = "https://randomuser.me/api/portraits/lego/1.jpg";

    /// Stored records may carry `null` or miss fields entirely; both decode to the default.
    fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Post {
        pub id: PostId,
        #[serde(default, deserialize_with = "null_as_default")]
        pub username: String,
        #[serde(default, deserialize_with = "null_as_default")]
        pub user_image_url: String,
        #[serde(default, deserialize_with = "null_as_default")]
        pub content: String,
        #[serde(default, deserialize_with = "null_as_default")]
        pub like_count: u64,
        #[serde(default, deserialize_with = "null_as_default")]
        pub share_count: u64,
        #[serde(default, deserialize_with = "null_as_default")]
        pub comments: Vec<Comment>,
    }

    impl Post {
        pub fn comment(&self, comment_id: CommentId) -> Option<&Comment> {
            self.comments.iter().find(|comment| comment.id == comment_id)
        }

        pub fn comment_mut(&mut self, comment_id: CommentId) -> Option<&mut Comment> {
            self.comments
                .iter_mut()
                .find(|comment| comment.id == comment_id)
        }

        pub fn to_edit(&self) -> PostEdit {
            PostEdit {
                id: self.id,
                username: self.username.clone(),
                user_image_url: self.user_image_url.clone(),
                content: self.content.clone(),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Comment {
        pub id: CommentId,
        #[serde(default, deserialize_with = "null_as_default")]
        pub username: String,
        #[serde(default, deserialize_with = "null_as_default")]
        pub user_image_url: String,
        #[serde(default, deserialize_with = "null_as_default")]
        pub content: String,
        #[serde(default, deserialize_with = "null_as_default")]
        pub like_count: u64,
    }

    #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct User {
        pub username: String,
        pub user_image_url: String,
    }

    impl Default for User {
        fn default() -> Self {
            Self {
                username: DEFAULT_USERNAME.to_string(),
                user_image_url: DEFAULT_USER_IMAGE_URL.to_string(),
            }
        }
    }

    impl User {
        pub fn new(username: impl Into<String>, user_image_url: impl Into<String>) -> Self {
            Self {
                username: username.into(),
                user_image_url: user_image_url.into(),
            }
        }

        /// Display gate for the edit/delete controls of a comment.
        /// The backend does not enforce it.
        pub fn can_modify(&self, comment: &Comment) -> bool {
            comment.username == self.username
        }

        pub fn post_draft(&self, content: impl Into<String>) -> PostDraft {
            PostDraft {
                username: self.username.clone(),
                user_image_url: self.user_image_url.clone(),
                content: content.into(),
            }
        }

        pub fn comment_draft(&self, content: impl Into<String>) -> CommentDraft {
            CommentDraft {
                username: self.username.clone(),
                user_image_url: self.user_image_url.clone(),
                content: content.into(),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PostDraft {
        #[serde(default, deserialize_with = "null_as_default")]
        pub username: String,
        #[serde(default, deserialize_with = "null_as_default")]
        pub user_image_url: String,
        #[serde(default, deserialize_with = "null_as_default")]
        pub content: String,
    }

    #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PostEdit {
        pub id: PostId,
        pub username: String,
        pub user_image_url: String,
        pub content: String,
    }

    #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CommentDraft {
        #[serde(default, deserialize_with = "null_as_default")]
        pub username: String,
        #[serde(default, deserialize_with = "null_as_default")]
        pub user_image_url: String,
        #[serde(default, deserialize_with = "null_as_default")]
        pub content: String,
    }

    #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    pub struct CommentEdit {
        pub content: String,
    }

}

pub mod valid {
    use tracing::trace;

    pub mod post {
        use super::Validator;
        use crate::model::PostEdit;
        use thiserror::Error;
        use tracing::trace;

        pub const BULK_SAMPLE: &str = r#"[
  {
    "username": "User1",
    "userImageUrl": "https://randomuser.me/api/portraits/women/1.jpg",
    "content": "First sample post"
  },
  {
    "username": "User2",
    "userImageUrl": "https://randomuser.me/api/portraits/men/1.jpg",
    "content": "Second sample post"
  }
]"#;

        #[derive(Error, Debug, Clone, PartialEq)]
        pub enum BulkErr {
            #[error("Invalid JSON format")]
            InvalidFormat(String),
        }

        /// Blank content is refused. Anything else is sent exactly as typed.
        pub fn process_post_content<S: AsRef<str>>(content: S) -> Result<String, String> {
            let input = content.as_ref().to_string();
            if input.is_blank() {
                trace!("errors content is blank");
                return Err("content must not be empty".to_string());
            }
            Ok(input)
        }

        pub fn process_comment_content<S: AsRef<str>>(content: S) -> Result<String, String> {
            let input = content.as_ref().to_string();
            if input.is_blank() {
                trace!("errors comment is blank");
                return Err("comment must not be empty".to_string());
            }
            Ok(input)
        }

        pub fn process_post_edit(edit: PostEdit) -> Result<PostEdit, String> {
            let mut errors = String::new();
            if edit.username.is_blank() {
                errors += "username must not be empty\n";
            }
            if edit.user_image_url.is_blank() {
                errors += "profile image url must not be empty\n";
            }
            if edit.content.is_blank() {
                errors += "content must not be empty\n";
            }

            if errors.is_empty() {
                Ok(edit)
            } else {
                let _ = errors.pop();
                trace!("errors {errors}");
                Err(errors)
            }
        }

        /// Parses the bulk upload textarea. Only text that is not JSON at all is rejected here;
        /// whether the value is a usable list of posts is up to the backend.
        pub fn process_bulk_posts<S: AsRef<str>>(input: S) -> Result<serde_json::Value, BulkErr> {
            serde_json::from_str::<serde_json::Value>(input.as_ref())
                .inspect_err(|err| trace!("bulk input rejected: {err}"))
                .map_err(|err| BulkErr::InvalidFormat(err.to_string()))
        }

    }

    pub trait Validator {
        fn is_blank(&self) -> bool;
    }

    impl<S: AsRef<str>> Validator for S {
        fn is_blank(&self) -> bool {
            let blank = self.as_ref().trim().is_empty();
            if blank {
                trace!("blank input");
            }
            blank
        }
    }

}

pub mod path {
    use crate::model::{CommentId, PostId};

    pub const PATH_API_POSTS: &str = "/api/posts";
    pub const PATH_POSTS: &str = "";
    pub const PATH_POSTS_BULK: &str = "/bulk";

    pub fn link_post(post_id: PostId) -> String {
        format!("/{post_id}")
    }

    pub fn link_post_like(post_id: PostId) -> String {
        format!("/{post_id}/like")
    }

    pub fn link_post_share(post_id: PostId) -> String {
        format!("/{post_id}/share")
    }

    pub fn link_post_comments(post_id: PostId) -> String {
        format!("/{post_id}/comments")
    }

    pub fn link_post_comment(post_id: PostId, comment_id: CommentId) -> String {
        format!("/{post_id}/comments/{comment_id}")
    }

    pub fn link_post_comment_like(post_id: PostId, comment_id: CommentId) -> String {
        format!("/{post_id}/comments/{comment_id}/like")
    }

}
