use postboard_shared::model::{Post, PostEdit};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIs)]
#[strum(serialize_all = "lowercase")]
pub enum PostFormStage {
    #[default]
    Create,
    Edit,
}

/// The top-level post form. Submits as a create unless a post was loaded for editing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PostForm {
    pub content: String,
    pub editing: Option<PostEdit>,
}

impl PostForm {
    pub fn stage(&self) -> PostFormStage {
        if self.editing.is_some() {
            PostFormStage::Edit
        } else {
            PostFormStage::Create
        }
    }

    pub fn begin_edit(&mut self, post: &Post) {
        self.content = post.content.clone();
        self.editing = Some(post.to_edit());
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.content.clear();
    }

    /// The edit to send: the loaded post with the form's current text.
    pub fn edit(&self) -> Option<PostEdit> {
        self.editing.as_ref().map(|edit| PostEdit {
            content: self.content.clone(),
            ..edit.clone()
        })
    }
}
