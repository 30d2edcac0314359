use std::str::FromStr;

use postboard_api::Api;
use postboard_frontend::app::App;
use postboard_frontend::app::hook::bulk_upload::BulkUploadStage;
use postboard_frontend::app::hook::post_comment::AddCommentStage;
use postboard_shared::model::{CommentId, PostId, User};
use thiserror::Error;
use tracing::trace;

use crate::render::{render_feed, render_post};

pub const HELP: &str = "\
commands:
  list                               show the feed
  reload                             fetch every post again
  post <text>                        create a post, or save the post being edited
  edit <post>                        load a post into the form
  cancel-edit                        leave edit mode
  delete <post>                      ask to delete a post
  confirm | cancel                   answer the pending delete
  like <post> | share <post>
  comment <post> <text>
  comments <post>                    fetch the comments of a post
  comment-edit <post> <comment> <text>
  comment-delete <post> <comment>
  comment-like <post> <comment>
  bulk <file>                        create every post in a json file
  bulk-sample                        create the sample posts
  user <name> <image url>            change the current user
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Reload,
    Post(String),
    Edit(PostId),
    CancelEdit,
    Delete(PostId),
    Confirm,
    Cancel,
    Like(PostId),
    Share(PostId),
    Comment(PostId, String),
    Comments(PostId),
    CommentEdit(PostId, CommentId, String),
    CommentDelete(PostId, CommentId),
    CommentLike(PostId, CommentId),
    Bulk(String),
    BulkSample,
    User(String, String),
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandErr {
    #[error("unknown command \"{0}\", type help")]
    Unknown(String),

    #[error("missing argument <{0}>")]
    Missing(&'static str),

    #[error("invalid id \"{0}\"")]
    InvalidId(String),
}

/// Pops the next whitespace separated word off `args`.
fn next_arg<'a>(args: &mut &'a str) -> Option<&'a str> {
    let line = args.trim_start();
    if line.is_empty() {
        *args = line;
        return None;
    }
    let mut parts = line.splitn(2, char::is_whitespace);
    let arg = parts.next()?;
    *args = parts.next().unwrap_or_default();
    Some(arg)
}

fn next_id(args: &mut &str, name: &'static str) -> Result<i64, CommandErr> {
    let arg = next_arg(args).ok_or(CommandErr::Missing(name))?;
    arg.parse::<i64>()
        .map_err(|_| CommandErr::InvalidId(arg.to_string()))
}

/// The rest of the line as typed, minus the separator in front of it.
fn rest(args: &str, name: &'static str) -> Result<String, CommandErr> {
    let text = args.trim_start();
    if text.trim().is_empty() {
        return Err(CommandErr::Missing(name));
    }
    Ok(text.to_string())
}

impl FromStr for Command {
    type Err = CommandErr;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut args = line;
        let Some(name) = next_arg(&mut args) else {
            return Ok(Command::List);
        };
        let command = match name {
            "list" | "ls" => Command::List,
            "reload" => Command::Reload,
            "post" => Command::Post(rest(args, "text")?),
            "edit" => Command::Edit(next_id(&mut args, "post")?),
            "cancel-edit" => Command::CancelEdit,
            "delete" => Command::Delete(next_id(&mut args, "post")?),
            "confirm" => Command::Confirm,
            "cancel" => Command::Cancel,
            "like" => Command::Like(next_id(&mut args, "post")?),
            "share" => Command::Share(next_id(&mut args, "post")?),
            "comment" => {
                let post_id = next_id(&mut args, "post")?;
                Command::Comment(post_id, rest(args, "text")?)
            }
            "comments" => Command::Comments(next_id(&mut args, "post")?),
            "comment-edit" => {
                let post_id = next_id(&mut args, "post")?;
                let comment_id = next_id(&mut args, "comment")?;
                Command::CommentEdit(post_id, comment_id, rest(args, "text")?)
            }
            "comment-delete" => {
                let post_id = next_id(&mut args, "post")?;
                Command::CommentDelete(post_id, next_id(&mut args, "comment")?)
            }
            "comment-like" => {
                let post_id = next_id(&mut args, "post")?;
                Command::CommentLike(post_id, next_id(&mut args, "comment")?)
            }
            "bulk" => Command::Bulk(rest(args, "file")?.trim_end().to_string()),
            "bulk-sample" => Command::BulkSample,
            "user" => {
                let username = next_arg(&mut args)
                    .ok_or(CommandErr::Missing("name"))?
                    .to_string();
                Command::User(username, rest(args, "image url")?.trim_end().to_string())
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandErr::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

impl Command {
    /// Runs the command and returns what should be printed. Alerts are printed separately.
    pub async fn run<A: Api>(self, app: &mut App<A>, user: &mut User) -> String {
        trace!("running {self:?}");
        match self {
            Command::List => render_feed(app.feed.posts(), user),
            Command::Reload => {
                app.load_posts().await;
                render_feed(app.feed.posts(), user)
            }
            Command::Post(text) => {
                app.post_form.content = text;
                if app.submit_post_form(user).await {
                    render_feed(app.feed.posts(), user)
                } else {
                    String::new()
                }
            }
            Command::Edit(post_id) => {
                if app.begin_edit(post_id) {
                    format!(
                        "editing post {post_id}: {}\nsend the new text with post <text>",
                        app.post_form.content
                    )
                } else {
                    format!("post {post_id} is not in the feed")
                }
            }
            Command::CancelEdit => {
                app.cancel_edit();
                "edit cancelled".to_string()
            }
            Command::Delete(post_id) => {
                if app.feed.get(post_id).is_none() {
                    return format!("post {post_id} is not in the feed");
                }
                app.request_delete(post_id);
                format!("delete post {post_id}? confirm or cancel")
            }
            Command::Confirm => {
                if app.post_delete.pending().is_none() {
                    return "nothing to confirm".to_string();
                }
                app.confirm_delete().await;
                render_feed(app.feed.posts(), user)
            }
            Command::Cancel => match app.cancel_delete() {
                Some(post_id) => format!("post {post_id} kept"),
                None => "nothing to cancel".to_string(),
            },
            Command::Like(post_id) => {
                app.like_post(post_id).await;
                show_post(app, user, post_id)
            }
            Command::Share(post_id) => {
                app.share_post(post_id).await;
                show_post(app, user, post_id)
            }
            Command::Comment(post_id, text) => {
                let stage = app.add_comment(user, post_id, text).await;
                match stage {
                    AddCommentStage::Visible => show_post(app, user, post_id),
                    AddCommentStage::NotVisible => {
                        "comment saved, reload to see it".to_string()
                    }
                    AddCommentStage::Rejected => "comment is empty".to_string(),
                    _ => String::new(),
                }
            }
            Command::Comments(post_id) => {
                app.fetch_comments(post_id).await;
                show_post(app, user, post_id)
            }
            Command::CommentEdit(post_id, comment_id, text) => {
                if let Some(err) = deny_modify(app, user, post_id, comment_id) {
                    return err;
                }
                app.update_comment(post_id, comment_id, text).await;
                show_post(app, user, post_id)
            }
            Command::CommentDelete(post_id, comment_id) => {
                if let Some(err) = deny_modify(app, user, post_id, comment_id) {
                    return err;
                }
                app.delete_comment(post_id, comment_id).await;
                show_post(app, user, post_id)
            }
            Command::CommentLike(post_id, comment_id) => {
                app.like_comment(post_id, comment_id).await;
                show_post(app, user, post_id)
            }
            Command::Bulk(file) => match tokio::fs::read_to_string(&file).await {
                Ok(input) => {
                    app.bulk_upload.input = input;
                    submit_bulk(app, user).await
                }
                Err(err) => format!("failed to read {file}: {err}"),
            },
            Command::BulkSample => {
                app.bulk_upload.load_sample();
                submit_bulk(app, user).await
            }
            Command::User(username, user_image_url) => {
                if app.update_profile(user, User::new(username, user_image_url)) {
                    format!("posting as {}", user.username)
                } else {
                    "username and image url are required".to_string()
                }
            }
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        }
    }
}

fn show_post<A: Api>(app: &App<A>, user: &User, post_id: PostId) -> String {
    app.feed
        .get(post_id)
        .map(|post| render_post(post, user))
        .unwrap_or_else(|| format!("post {post_id} is not in the feed"))
}

/// Edit and delete are only offered on comments written under the current username.
fn deny_modify<A: Api>(
    app: &App<A>,
    user: &User,
    post_id: PostId,
    comment_id: CommentId,
) -> Option<String> {
    let Some(comment) = app
        .feed
        .get(post_id)
        .and_then(|post| post.comment(comment_id))
    else {
        return Some(format!("comment {comment_id} is not in post {post_id}"));
    };
    if user.can_modify(comment) {
        None
    } else {
        Some("only your own comments can be changed".to_string())
    }
}

async fn submit_bulk<A: Api>(app: &mut App<A>, user: &User) -> String {
    let stage = app.submit_bulk_upload().await;
    let message = app
        .bulk_upload
        .message
        .as_ref()
        .map(|message| message.text.clone())
        .unwrap_or_default();
    match stage {
        BulkUploadStage::Created => format!("{message}\n{}", render_feed(app.feed.posts(), user)),
        BulkUploadStage::Invalid | BulkUploadStage::Failed => message,
    }
}

#[cfg(test)]
mod command_tests {
    use std::str::FromStr;

    use postboard_api::mock::{MockApp, MockRoute};
    use postboard_frontend::app::App;
    use postboard_frontend::app::clock::Clock;
    use postboard_shared::model::User;
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::{Command, CommandErr};

    #[test]
    fn test_parse() {
        assert_eq!(Command::from_str(""), Ok(Command::List));
        assert_eq!(
            Command::from_str("post hello   world"),
            Ok(Command::Post("hello   world".to_string()))
        );
        assert_eq!(
            Command::from_str("  comment   4  a\tb  "),
            Ok(Command::Comment(4, "a\tb  ".to_string()))
        );
        assert_eq!(
            Command::from_str("bulk posts.json  "),
            Ok(Command::Bulk("posts.json".to_string()))
        );
        assert_eq!(Command::from_str("comment 4   "), Err(CommandErr::Missing("text")));
        assert_eq!(
            Command::from_str("comment-edit 1 2 fixed typo"),
            Ok(Command::CommentEdit(1, 2, "fixed typo".to_string()))
        );
        assert_eq!(
            Command::from_str("user bob https://img/bob.png"),
            Ok(Command::User(
                "bob".to_string(),
                "https://img/bob.png".to_string()
            ))
        );
        assert_eq!(Command::from_str("post"), Err(CommandErr::Missing("text")));
        assert_eq!(
            Command::from_str("like x"),
            Err(CommandErr::InvalidId("x".to_string()))
        );
        assert_eq!(
            Command::from_str("dance"),
            Err(CommandErr::Unknown("dance".to_string()))
        );
    }

    #[test(tokio::test)]
    async fn test_comment_modify_gate() {
        let MockApp { state, api } = MockApp::new().await;
        let posts = state
            .seed(vec![User::new("A", "u1").post_draft("hi")])
            .await;
        let post_id = posts[0].id;
        let other = state
            .seed_comment(post_id, User::new("B", "u2").comment_draft("theirs"))
            .await
            .unwrap();
        let mut app = App::new(api, Clock::system(), 3000);
        let mut user = User::new("C", "u3");
        app.load_posts().await;

        let out = Command::CommentDelete(post_id, other.id)
            .run(&mut app, &mut user)
            .await;
        assert_eq!(out, "only your own comments can be changed");
        assert!(!state.calls().await.contains(&MockRoute::DeleteComment));

        let out = Command::Comment(post_id, "mine".to_string())
            .run(&mut app, &mut user)
            .await;
        assert!(out.contains("mine"));
        let mine = app.feed.get(post_id).unwrap().comments[1].id;

        Command::CommentEdit(post_id, mine, "mine, edited".to_string())
            .run(&mut app, &mut user)
            .await;
        assert_eq!(
            app.feed.get(post_id).unwrap().comment(mine).unwrap().content,
            "mine, edited"
        );
    }

    #[test(tokio::test)]
    async fn test_delete_flow() {
        let MockApp { state, api } = MockApp::new().await;
        let posts = state
            .seed(vec![User::default().post_draft("bye")])
            .await;
        let mut app = App::new(api, Clock::system(), 3000);
        let mut user = User::default();
        app.load_posts().await;

        let out = Command::Delete(posts[0].id).run(&mut app, &mut user).await;
        assert!(out.contains("confirm or cancel"));
        let out = Command::Cancel.run(&mut app, &mut user).await;
        assert_eq!(out, format!("post {} kept", posts[0].id));
        assert_eq!(
            Command::Confirm.run(&mut app, &mut user).await,
            "nothing to confirm"
        );

        Command::Delete(posts[0].id).run(&mut app, &mut user).await;
        Command::Confirm.run(&mut app, &mut user).await;
        assert!(app.feed.is_empty());
        assert_eq!(
            state.calls().await,
            vec![MockRoute::GetPosts, MockRoute::DeletePost]
        );
    }
}
