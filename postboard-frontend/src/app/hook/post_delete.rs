use postboard_shared::model::PostId;
use tracing::trace;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIs)]
#[strum(serialize_all = "lowercase")]
pub enum PostDeleteStage {
    #[default]
    Idle,
    Confirming(PostId),
}

/// Confirmation step in front of a post delete. Nothing is sent until [`PostDelete::take`]
/// hands the id out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PostDelete {
    pub stage: PostDeleteStage,
}

impl PostDelete {
    pub fn request(&mut self, post_id: PostId) {
        trace!("delete of post {post_id} waiting for confirmation");
        self.stage = PostDeleteStage::Confirming(post_id);
    }

    pub fn cancel(&mut self) -> Option<PostId> {
        self.take()
    }

    pub fn take(&mut self) -> Option<PostId> {
        match std::mem::take(&mut self.stage) {
            PostDeleteStage::Confirming(post_id) => Some(post_id),
            PostDeleteStage::Idle => None,
        }
    }

    pub fn pending(&self) -> Option<PostId> {
        match self.stage {
            PostDeleteStage::Confirming(post_id) => Some(post_id),
            PostDeleteStage::Idle => None,
        }
    }
}
