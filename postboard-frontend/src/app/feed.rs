use postboard_shared::model::{Comment, CommentId, Post, PostId};
use tracing::{trace, warn};

/// Local, ordered cache of posts. Every method is a single reconciliation step applied after
/// the backend confirmed the matching call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    posts: Vec<Post>,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, post_id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == post_id)
    }

    pub fn position(&self, post_id: PostId) -> Option<usize> {
        self.posts.iter().position(|post| post.id == post_id)
    }

    fn get_mut(&mut self, post_id: PostId) -> Option<&mut Post> {
        let post = self.posts.iter_mut().find(|post| post.id == post_id);
        if post.is_none() {
            warn!("post {post_id} is not in the feed");
        }
        post
    }

    pub fn replace_all(&mut self, posts: Vec<Post>) {
        trace!("feed replaced with {} posts", posts.len());
        self.posts = posts;
    }

    pub fn prepend(&mut self, post: Post) {
        self.prepend_many(vec![post]);
    }

    /// Puts `posts` in front, keeping their order. Stale copies with the same ids are dropped.
    pub fn prepend_many(&mut self, mut posts: Vec<Post>) {
        self.posts
            .retain(|old| !posts.iter().any(|post| post.id == old.id));
        posts.append(&mut self.posts);
        self.posts = posts;
    }

    /// Swaps the post with the same id in place.
    pub fn replace(&mut self, post: Post) -> bool {
        let Some(old) = self.get_mut(post.id) else {
            return false;
        };
        *old = post;
        true
    }

    pub fn remove(&mut self, post_id: PostId) -> Option<Post> {
        let index = self.position(post_id)?;
        Some(self.posts.remove(index))
    }

    pub fn set_comments(&mut self, post_id: PostId, comments: Vec<Comment>) -> bool {
        let Some(post) = self.get_mut(post_id) else {
            return false;
        };
        post.comments = comments;
        true
    }

    pub fn update_comment_content(
        &mut self,
        post_id: PostId,
        comment_id: CommentId,
        content: impl Into<String>,
    ) -> bool {
        let Some(comment) = self.comment_mut(post_id, comment_id) else {
            return false;
        };
        comment.content = content.into();
        true
    }

    pub fn remove_comment(&mut self, post_id: PostId, comment_id: CommentId) -> bool {
        let Some(post) = self.get_mut(post_id) else {
            return false;
        };
        let len = post.comments.len();
        post.comments.retain(|comment| comment.id != comment_id);
        len != post.comments.len()
    }

    pub fn set_comment_like_count(
        &mut self,
        post_id: PostId,
        comment_id: CommentId,
        like_count: u64,
    ) -> bool {
        let Some(comment) = self.comment_mut(post_id, comment_id) else {
            return false;
        };
        comment.like_count = like_count;
        true
    }

    fn comment_mut(&mut self, post_id: PostId, comment_id: CommentId) -> Option<&mut Comment> {
        let comment = self.get_mut(post_id)?.comment_mut(comment_id);
        if comment.is_none() {
            warn!("comment {comment_id} is not in post {post_id}");
        }
        comment
    }
}
