/// Progress of an add-comment sequence: create the comment, then refetch the parent post.
///
/// `Sent` is the window where the comment exists on the backend but the local post has not been
/// refetched yet. A failed refetch ends in `NotVisible` and the create is not rolled back.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::EnumIs,
)]
#[strum(serialize_all = "snake_case")]
pub enum AddCommentStage {
    Rejected,
    Failed,
    Sent,
    Visible,
    NotVisible,
}

impl AddCommentStage {
    pub fn is_on_server(&self) -> bool {
        matches!(self, Self::Sent | Self::Visible | Self::NotVisible)
    }
}

#[cfg(test)]
mod post_comment_tests {
    use super::AddCommentStage;
    use std::str::FromStr;
    use strum::IntoEnumIterator;
    use test_log::test;

    #[test]
    fn test_add_comment_stage() {
        let on_server = AddCommentStage::iter()
            .filter(AddCommentStage::is_on_server)
            .collect::<Vec<_>>();
        assert_eq!(
            on_server,
            vec![
                AddCommentStage::Sent,
                AddCommentStage::Visible,
                AddCommentStage::NotVisible
            ]
        );
        assert_eq!(AddCommentStage::NotVisible.to_string(), "not_visible");
        assert_eq!(
            AddCommentStage::from_str("sent"),
            Ok(AddCommentStage::Sent)
        );
    }
}
