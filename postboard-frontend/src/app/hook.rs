pub mod bulk_upload;
pub mod post_comment;
pub mod post_delete;
pub mod post_form;
