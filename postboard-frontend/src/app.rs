use std::collections::HashMap;

use postboard_api::{Api, ServerErr, ServerRes};
use postboard_shared::model::{CommentId, PostEdit, PostId, User};
use postboard_shared::valid::Validator;
use postboard_shared::valid::post::{
    process_bulk_posts, process_comment_content, process_post_content, process_post_edit,
};
use tracing::{debug, error, trace, warn};

use alerts::{AlertId, AlertKind, AlertQueue};
use clock::Clock;
use feed::Feed;
use hook::bulk_upload::{BulkUpload, BulkUploadStage};
use hook::post_comment::AddCommentStage;
use hook::post_delete::PostDelete;
use hook::post_form::PostForm;

pub mod alerts;
pub mod clock;
pub mod feed;
pub mod hook;

pub const MSG_FETCH_FAILED: &str = "Failed to fetch posts";
pub const MSG_POST_CREATED: &str = "Post created successfully!";
pub const MSG_POST_CREATE_FAILED: &str = "Failed to create post";
pub const MSG_POSTS_CREATE_FAILED: &str = "Failed to create posts";
pub const MSG_POST_UPDATED: &str = "Post updated successfully!";
pub const MSG_POST_UPDATE_FAILED: &str = "Failed to update post";
pub const MSG_POST_DELETED: &str = "Post deleted successfully!";
pub const MSG_POST_DELETE_FAILED: &str = "Failed to delete post";
pub const MSG_POST_LIKE_FAILED: &str = "Failed to like post";
pub const MSG_POST_SHARED: &str = "Post shared!";
pub const MSG_POST_SHARE_FAILED: &str = "Failed to share post";
pub const MSG_POST_REFRESH_FAILED: &str = "Failed to refresh post";
pub const MSG_COMMENT_ADD_FAILED: &str = "Failed to add comment";
pub const MSG_COMMENT_UPDATE_FAILED: &str = "Failed to update comment";
pub const MSG_COMMENT_DELETE_FAILED: &str = "Failed to delete comment";
pub const MSG_COMMENT_LIKE_FAILED: &str = "Failed to like comment";
pub const MSG_COMMENTS_FETCH_FAILED: &str = "Failed to fetch comments";
pub const MSG_PROFILE_UPDATED: &str = "Profile updated!";

pub fn msg_posts_created(count: usize) -> String {
    format!("{count} posts created successfully!")
}

/// Client state for one session: the post cache, the alert queue and the form controllers.
///
/// Every call is awaited through `&mut self`, so responses are applied one at a time in the
/// order the driver awaits them. A failed call never touches [`Feed`]; it only raises an alert.
pub struct App<A: Api> {
    pub api: A,
    pub clock: Clock,
    pub feed: Feed,
    pub alerts: AlertQueue,
    pub post_form: PostForm,
    pub post_delete: PostDelete,
    pub bulk_upload: BulkUpload,
    pub comment_stages: HashMap<PostId, AddCommentStage>,
    lifetime_ms: u128,
}

impl<A: Api> App<A> {
    pub fn new(api: A, clock: Clock, alert_lifetime_ms: u64) -> Self {
        Self {
            api,
            clock,
            feed: Feed::new(),
            alerts: AlertQueue::new(alert_lifetime_ms),
            post_form: PostForm::default(),
            post_delete: PostDelete::default(),
            bulk_upload: BulkUpload::default(),
            comment_stages: HashMap::new(),
            lifetime_ms: alert_lifetime_ms as u128,
        }
    }

    /// Expires alerts and the bulk form message.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.alerts.poll(now);
        self.bulk_upload.poll(now);
    }

    /// Earliest moment [`App::tick`] has something to expire.
    pub fn next_expiry(&self) -> Option<u128> {
        let bulk = self
            .bulk_upload
            .message
            .as_ref()
            .and_then(|message| message.expires_at);
        match (self.alerts.next_expiry(), bulk) {
            (Some(alert), Some(bulk)) => Some(alert.min(bulk)),
            (alert, bulk) => alert.or(bulk),
        }
    }

    pub fn alert(&mut self, message: impl Into<String>, kind: AlertKind) -> AlertId {
        let now = self.clock.now();
        self.alerts.poll(now);
        self.alerts.push(now, message, kind)
    }

    fn fail(&mut self, op: &str, message: &str, err: ServerErr) {
        error!("{op}: {err}");
        self.alert(message, AlertKind::Error);
    }

    pub async fn load_posts(&mut self) -> bool {
        let result = self
            .api
            .get_posts()
            .send_native()
            .await
            .and_then(ServerRes::into_posts);
        match result {
            Ok(posts) => {
                self.feed.replace_all(posts);
                let feed = &self.feed;
                self.comment_stages
                    .retain(|post_id, _| feed.get(*post_id).is_some());
                true
            }
            Err(err) => {
                self.fail("load_posts", MSG_FETCH_FAILED, err);
                false
            }
        }
    }

    pub async fn create_post(&mut self, user: &User, content: impl AsRef<str>) -> bool {
        let content = match process_post_content(content) {
            Ok(content) => content,
            Err(err) => {
                trace!("create_post rejected: {err}");
                return false;
            }
        };
        let result = self
            .api
            .add_post(user.post_draft(content))
            .send_native()
            .await
            .and_then(ServerRes::into_post);
        match result {
            Ok(post) => {
                debug!("post {} created", post.id);
                self.feed.prepend(post);
                self.alert(MSG_POST_CREATED, AlertKind::Success);
                true
            }
            Err(err) => {
                self.fail("create_post", MSG_POST_CREATE_FAILED, err);
                false
            }
        }
    }

    pub async fn bulk_create(&mut self, body: serde_json::Value) -> bool {
        let result = self
            .api
            .add_posts_bulk(body)
            .send_native()
            .await
            .and_then(ServerRes::into_posts);
        match result {
            Ok(posts) => {
                let count = posts.len();
                self.feed.prepend_many(posts);
                self.alert(msg_posts_created(count), AlertKind::Success);
                true
            }
            Err(err) => {
                self.fail("bulk_create", MSG_POSTS_CREATE_FAILED, err);
                false
            }
        }
    }

    /// Parses the bulk form text and sends it. Text that is not JSON never reaches the backend and
    /// is reported on the form's own message, not as an alert.
    pub async fn submit_bulk_upload(&mut self) -> BulkUploadStage {
        let stage = match process_bulk_posts(&self.bulk_upload.input) {
            Ok(body) => {
                if self.bulk_create(body).await {
                    BulkUploadStage::Created
                } else {
                    BulkUploadStage::Failed
                }
            }
            Err(err) => {
                debug!("bulk upload rejected: {err:?}");
                BulkUploadStage::Invalid
            }
        };
        let now = self.clock.now();
        self.bulk_upload.set_message(stage, now, self.lifetime_ms);
        stage
    }

    pub async fn update_post(&mut self, edit: PostEdit) -> bool {
        let edit = match process_post_edit(edit) {
            Ok(edit) => edit,
            Err(err) => {
                trace!("update_post rejected: {err}");
                return false;
            }
        };
        let result = self
            .api
            .update_post(edit)
            .send_native()
            .await
            .and_then(ServerRes::into_post);
        match result {
            Ok(post) => {
                self.feed.replace(post);
                self.alert(MSG_POST_UPDATED, AlertKind::Success);
                true
            }
            Err(err) => {
                self.fail("update_post", MSG_POST_UPDATE_FAILED, err);
                false
            }
        }
    }

    pub fn begin_edit(&mut self, post_id: PostId) -> bool {
        let Some(post) = self.feed.get(post_id) else {
            warn!("begin_edit: post {post_id} is not in the feed");
            return false;
        };
        self.post_form.begin_edit(post);
        true
    }

    pub fn cancel_edit(&mut self) {
        self.post_form.cancel_edit();
    }

    /// Submits the post form as an update when a post is loaded for editing, else as a create.
    pub async fn submit_post_form(&mut self, user: &User) -> bool {
        match self.post_form.edit() {
            Some(edit) => {
                let updated = self.update_post(edit).await;
                if updated {
                    self.post_form.cancel_edit();
                }
                updated
            }
            None => {
                let content = self.post_form.content.clone();
                let created = self.create_post(user, content).await;
                if created {
                    self.post_form.content.clear();
                }
                created
            }
        }
    }

    pub fn request_delete(&mut self, post_id: PostId) {
        self.post_delete.request(post_id);
    }

    pub fn cancel_delete(&mut self) -> Option<PostId> {
        self.post_delete.cancel()
    }

    pub async fn confirm_delete(&mut self) -> bool {
        let Some(post_id) = self.post_delete.take() else {
            warn!("confirm_delete: nothing to confirm");
            return false;
        };
        let result = self
            .api
            .delete_post(post_id)
            .send_native()
            .await
            .and_then(ServerRes::into_ok);
        match result {
            Ok(()) => {
                self.feed.remove(post_id);
                self.comment_stages.remove(&post_id);
                self.alert(MSG_POST_DELETED, AlertKind::Success);
                true
            }
            Err(err) => {
                self.fail("confirm_delete", MSG_POST_DELETE_FAILED, err);
                false
            }
        }
    }

    pub async fn like_post(&mut self, post_id: PostId) -> bool {
        let result = self
            .api
            .like_post(post_id)
            .send_native()
            .await
            .and_then(ServerRes::into_post);
        match result {
            Ok(post) => {
                self.feed.replace(post);
                true
            }
            Err(err) => {
                self.fail("like_post", MSG_POST_LIKE_FAILED, err);
                false
            }
        }
    }

    pub async fn share_post(&mut self, post_id: PostId) -> bool {
        let result = self
            .api
            .share_post(post_id)
            .send_native()
            .await
            .and_then(ServerRes::into_post);
        match result {
            Ok(post) => {
                self.feed.replace(post);
                self.alert(MSG_POST_SHARED, AlertKind::Success);
                true
            }
            Err(err) => {
                self.fail("share_post", MSG_POST_SHARE_FAILED, err);
                false
            }
        }
    }

    pub fn comment_stage(&self, post_id: PostId) -> Option<AddCommentStage> {
        self.comment_stages.get(&post_id).copied()
    }

    fn set_comment_stage(&mut self, post_id: PostId, stage: AddCommentStage) -> AddCommentStage {
        trace!("comment stage of post {post_id}: {stage}");
        self.comment_stages.insert(post_id, stage);
        stage
    }

    /// Creates the comment and then refetches the parent post.
    pub async fn add_comment(
        &mut self,
        user: &User,
        post_id: PostId,
        content: impl AsRef<str>,
    ) -> AddCommentStage {
        let stage = self.send_comment(user, post_id, content).await;
        if !stage.is_sent() {
            return stage;
        }
        self.finish_comment(post_id).await
    }

    /// First half of [`App::add_comment`]. The returned post body is ignored; the comment is not
    /// visible locally until [`App::finish_comment`] refetches the post.
    pub async fn send_comment(
        &mut self,
        user: &User,
        post_id: PostId,
        content: impl AsRef<str>,
    ) -> AddCommentStage {
        let content = match process_comment_content(content) {
            Ok(content) => content,
            Err(err) => {
                trace!("send_comment rejected: {err}");
                return self.set_comment_stage(post_id, AddCommentStage::Rejected);
            }
        };
        let result = self
            .api
            .add_post_comment(post_id, user.comment_draft(content))
            .send_native()
            .await
            .and_then(ServerRes::into_post);
        match result {
            Ok(_) => self.set_comment_stage(post_id, AddCommentStage::Sent),
            Err(err) => {
                self.fail("send_comment", MSG_COMMENT_ADD_FAILED, err);
                self.set_comment_stage(post_id, AddCommentStage::Failed)
            }
        }
    }

    /// Second half of [`App::add_comment`]. A failed refetch leaves the comment on the backend
    /// but not in the feed until the next full load.
    pub async fn finish_comment(&mut self, post_id: PostId) -> AddCommentStage {
        match self.comment_stage(post_id) {
            Some(AddCommentStage::Sent) => {}
            stage => {
                warn!("finish_comment: post {post_id} has no sent comment, stage {stage:?}");
            }
        }
        let result = self
            .api
            .get_post(post_id)
            .send_native()
            .await
            .and_then(ServerRes::into_post);
        match result {
            Ok(post) => {
                self.feed.replace(post);
                self.set_comment_stage(post_id, AddCommentStage::Visible)
            }
            Err(err) => {
                self.fail("finish_comment", MSG_POST_REFRESH_FAILED, err);
                self.set_comment_stage(post_id, AddCommentStage::NotVisible)
            }
        }
    }

    pub async fn fetch_comments(&mut self, post_id: PostId) -> bool {
        let result = self
            .api
            .get_post_comments(post_id)
            .send_native()
            .await
            .and_then(ServerRes::into_comments);
        match result {
            Ok(comments) => self.feed.set_comments(post_id, comments),
            Err(err) => {
                self.fail("fetch_comments", MSG_COMMENTS_FETCH_FAILED, err);
                false
            }
        }
    }

    pub async fn update_comment(
        &mut self,
        post_id: PostId,
        comment_id: CommentId,
        content: impl AsRef<str>,
    ) -> bool {
        let content = match process_comment_content(content) {
            Ok(content) => content,
            Err(err) => {
                trace!("update_comment rejected: {err}");
                return false;
            }
        };
        let result = self
            .api
            .update_post_comment(post_id, comment_id, content.clone())
            .send_native()
            .await;
        match result {
            Ok(_) => self
                .feed
                .update_comment_content(post_id, comment_id, content),
            Err(err) => {
                self.fail("update_comment", MSG_COMMENT_UPDATE_FAILED, err);
                false
            }
        }
    }

    pub async fn delete_comment(&mut self, post_id: PostId, comment_id: CommentId) -> bool {
        let result = self
            .api
            .delete_post_comment(post_id, comment_id)
            .send_native()
            .await;
        match result {
            Ok(_) => self.feed.remove_comment(post_id, comment_id),
            Err(err) => {
                self.fail("delete_comment", MSG_COMMENT_DELETE_FAILED, err);
                false
            }
        }
    }

    /// Only the like counter of the comment is taken from the response.
    pub async fn like_comment(&mut self, post_id: PostId, comment_id: CommentId) -> bool {
        let result = self
            .api
            .like_post_comment(post_id, comment_id)
            .send_native()
            .await
            .and_then(ServerRes::into_post);
        match result {
            Ok(post) => {
                let Some(like_count) = post.comment(comment_id).map(|comment| comment.like_count)
                else {
                    warn!("like_comment: comment {comment_id} missing from response");
                    return false;
                };
                self.feed
                    .set_comment_like_count(post_id, comment_id, like_count)
            }
            Err(err) => {
                self.fail("like_comment", MSG_COMMENT_LIKE_FAILED, err);
                false
            }
        }
    }

    pub fn update_profile(&mut self, user: &mut User, new_user: User) -> bool {
        if new_user.username.is_blank() || new_user.user_image_url.is_blank() {
            trace!("update_profile rejected: {new_user:?}");
            return false;
        }
        *user = new_user;
        self.alert(MSG_PROFILE_UPDATED, AlertKind::Success);
        true
    }
}
