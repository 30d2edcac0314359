//! In-memory stand-in for the posts backend, used by tests to drive the client over real HTTP.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_test::TestServer;
use postboard_shared::model::{
    Comment, CommentDraft, CommentEdit, CommentId, Post, PostDraft, PostEdit, PostId,
};
use postboard_shared::path::PATH_API_POSTS;
use reqwest::{Method, RequestBuilder};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::Api;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum MockRoute {
    GetPosts,
    GetPost,
    AddPost,
    AddPostsBulk,
    UpdatePost,
    DeletePost,
    LikePost,
    SharePost,
    GetComments,
    AddComment,
    UpdateComment,
    DeleteComment,
    LikeComment,
}

#[derive(Error, Debug)]
pub enum MockErr {
    #[error("post \"{0}\" was not found")]
    PostNotFound(PostId),

    #[error("comment \"{0}\" was not found")]
    CommentNotFound(CommentId),

    #[error("route {0} was told to fail")]
    Injected(MockRoute),
}

impl IntoResponse for MockErr {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            MockErr::PostNotFound(_) | MockErr::CommentNotFound(_) => StatusCode::NOT_FOUND,
            MockErr::Injected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Default)]
pub struct MockDb {
    pub posts: Vec<Post>,
    pub failing: HashSet<MockRoute>,
    pub calls: Vec<MockRoute>,
    next_post_id: PostId,
    next_comment_id: CommentId,
}

impl MockDb {
    fn hit(&mut self, route: MockRoute) -> Result<(), MockErr> {
        trace!("mock hit {route}");
        self.calls.push(route);
        if self.failing.contains(&route) {
            return Err(MockErr::Injected(route));
        }
        Ok(())
    }

    fn insert(&mut self, draft: PostDraft) -> Post {
        self.next_post_id += 1;
        let post = Post {
            id: self.next_post_id,
            username: draft.username,
            user_image_url: draft.user_image_url,
            content: draft.content,
            like_count: 0,
            share_count: 0,
            comments: Vec::new(),
        };
        self.posts.push(post.clone());
        post
    }

    fn post_mut(&mut self, post_id: PostId) -> Result<&mut Post, MockErr> {
        self.posts
            .iter_mut()
            .find(|post| post.id == post_id)
            .ok_or(MockErr::PostNotFound(post_id))
    }

    fn comment_mut(
        &mut self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> Result<&mut Comment, MockErr> {
        self.post_mut(post_id)?
            .comment_mut(comment_id)
            .ok_or(MockErr::CommentNotFound(comment_id))
    }
}

#[derive(Clone, Default)]
pub struct MockState {
    pub db: Arc<Mutex<MockDb>>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail(&self, route: MockRoute) {
        self.db.lock().await.failing.insert(route);
    }

    pub async fn recover(&self, route: MockRoute) {
        self.db.lock().await.failing.remove(&route);
    }

    pub async fn calls(&self) -> Vec<MockRoute> {
        self.db.lock().await.calls.clone()
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.db.lock().await.posts.clone()
    }

    pub async fn seed(&self, drafts: Vec<PostDraft>) -> Vec<Post> {
        let mut db = self.db.lock().await;
        drafts.into_iter().map(|draft| db.insert(draft)).collect()
    }

    pub async fn seed_comment(&self, post_id: PostId, draft: CommentDraft) -> Option<Comment> {
        let mut db = self.db.lock().await;
        db.next_comment_id += 1;
        let comment = Comment {
            id: db.next_comment_id,
            username: draft.username,
            user_image_url: draft.user_image_url,
            content: draft.content,
            like_count: 0,
        };
        let post = db.post_mut(post_id).ok()?;
        post.comments.push(comment.clone());
        Some(comment)
    }
}

pub fn create_mock_router() -> Router<MockState> {
    Router::new()
        .route(PATH_API_POSTS, get(get_posts).post(add_post))
        .route(&format!("{PATH_API_POSTS}/bulk"), post(add_posts_bulk))
        .route(
            &format!("{PATH_API_POSTS}/{{id}}"),
            get(get_post).put(update_post).delete(delete_post),
        )
        .route(&format!("{PATH_API_POSTS}/{{id}}/like"), post(like_post))
        .route(&format!("{PATH_API_POSTS}/{{id}}/share"), post(share_post))
        .route(
            &format!("{PATH_API_POSTS}/{{id}}/comments"),
            get(get_comments).post(add_comment),
        )
        .route(
            &format!("{PATH_API_POSTS}/{{id}}/comments/{{comment_id}}"),
            put(update_comment).delete(delete_comment),
        )
        .route(
            &format!("{PATH_API_POSTS}/{{id}}/comments/{{comment_id}}/like"),
            post(like_comment),
        )
}

pub async fn get_posts(State(state): State<MockState>) -> Result<Json<Vec<Post>>, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::GetPosts)?;
    Ok(Json(db.posts.clone()))
}

pub async fn get_post(
    State(state): State<MockState>,
    Path(post_id): Path<PostId>,
) -> Result<Json<Post>, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::GetPost)?;
    Ok(Json(db.post_mut(post_id)?.clone()))
}

pub async fn add_post(
    State(state): State<MockState>,
    Json(draft): Json<PostDraft>,
) -> Result<Json<Post>, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::AddPost)?;
    let post = db.insert(draft);
    debug!("mock added post {post:?}");
    Ok(Json(post))
}

pub async fn add_posts_bulk(
    State(state): State<MockState>,
    Json(drafts): Json<Vec<PostDraft>>,
) -> Result<Json<Vec<Post>>, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::AddPostsBulk)?;
    let posts = drafts
        .into_iter()
        .map(|draft| db.insert(draft))
        .collect::<Vec<Post>>();
    Ok(Json(posts))
}

pub async fn update_post(
    State(state): State<MockState>,
    Path(post_id): Path<PostId>,
    Json(edit): Json<PostEdit>,
) -> Result<Json<Post>, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::UpdatePost)?;
    let post = db.post_mut(post_id)?;
    post.username = edit.username;
    post.user_image_url = edit.user_image_url;
    post.content = edit.content;
    Ok(Json(post.clone()))
}

pub async fn delete_post(
    State(state): State<MockState>,
    Path(post_id): Path<PostId>,
) -> Result<StatusCode, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::DeletePost)?;
    db.post_mut(post_id)?;
    db.posts.retain(|post| post.id != post_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like_post(
    State(state): State<MockState>,
    Path(post_id): Path<PostId>,
) -> Result<Json<Post>, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::LikePost)?;
    let post = db.post_mut(post_id)?;
    post.like_count += 1;
    Ok(Json(post.clone()))
}

pub async fn share_post(
    State(state): State<MockState>,
    Path(post_id): Path<PostId>,
) -> Result<Json<Post>, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::SharePost)?;
    let post = db.post_mut(post_id)?;
    post.share_count += 1;
    Ok(Json(post.clone()))
}

pub async fn get_comments(
    State(state): State<MockState>,
    Path(post_id): Path<PostId>,
) -> Result<Json<Vec<Comment>>, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::GetComments)?;
    Ok(Json(db.post_mut(post_id)?.comments.clone()))
}

pub async fn add_comment(
    State(state): State<MockState>,
    Path(post_id): Path<PostId>,
    Json(draft): Json<CommentDraft>,
) -> Result<Json<Post>, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::AddComment)?;
    db.post_mut(post_id)?;
    db.next_comment_id += 1;
    let comment = Comment {
        id: db.next_comment_id,
        username: draft.username,
        user_image_url: draft.user_image_url,
        content: draft.content,
        like_count: 0,
    };
    let post = db.post_mut(post_id)?;
    post.comments.push(comment);
    Ok(Json(post.clone()))
}

pub async fn update_comment(
    State(state): State<MockState>,
    Path((post_id, comment_id)): Path<(PostId, CommentId)>,
    Json(edit): Json<CommentEdit>,
) -> Result<Json<Post>, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::UpdateComment)?;
    db.comment_mut(post_id, comment_id)?.content = edit.content;
    Ok(Json(db.post_mut(post_id)?.clone()))
}

pub async fn delete_comment(
    State(state): State<MockState>,
    Path((post_id, comment_id)): Path<(PostId, CommentId)>,
) -> Result<Json<Post>, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::DeleteComment)?;
    db.comment_mut(post_id, comment_id)?;
    let post = db.post_mut(post_id)?;
    post.comments.retain(|comment| comment.id != comment_id);
    Ok(Json(post.clone()))
}

pub async fn like_comment(
    State(state): State<MockState>,
    Path((post_id, comment_id)): Path<(PostId, CommentId)>,
) -> Result<Json<Post>, MockErr> {
    let mut db = state.db.lock().await;
    db.hit(MockRoute::LikeComment)?;
    db.comment_mut(post_id, comment_id)?.like_count += 1;
    Ok(Json(db.post_mut(post_id)?.clone()))
}

pub struct ApiTest {
    pub server: TestServer,
}

impl ApiTest {
    pub fn new(server: TestServer) -> Self {
        Self { server }
    }
}

impl Api for ApiTest {
    fn provide_builder(&self, method: Method, path: impl AsRef<str>) -> RequestBuilder {
        let path = path.as_ref();
        let url = format!("{PATH_API_POSTS}{path}");
        match method {
            Method::GET => self.server.reqwest_get(&url),
            Method::PUT => self.server.reqwest_put(&url),
            Method::DELETE => self.server.reqwest_delete(&url),
            _ => self.server.reqwest_post(&url),
        }
    }
}

pub struct MockApp {
    pub state: MockState,
    pub api: ApiTest,
}

impl MockApp {
    pub async fn new() -> Self {
        let state = MockState::new();
        let router = create_mock_router().with_state(state.clone());
        let server = TestServer::builder()
            .http_transport()
            .build(router)
            .expect("failed to start mock server");
        let api = ApiTest::new(server);
        Self { state, api }
    }
}
