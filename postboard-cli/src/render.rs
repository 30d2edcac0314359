use colored::Colorize;
use itertools::Itertools;
use postboard_frontend::app::alerts::{Alert, AlertKind};
use postboard_shared::model::{Comment, Post, User};

pub fn render_feed(posts: &[Post], user: &User) -> String {
    if posts.is_empty() {
        return "no posts yet".dimmed().to_string();
    }
    posts.iter().map(|post| render_post(post, user)).join("\n\n")
}

pub fn render_post(post: &Post, user: &User) -> String {
    let header = format!(
        "#{} {} {}",
        post.id,
        post.username.bold(),
        format!("({})", post.user_image_url).dimmed()
    );
    let stats = format!(
        "♥ {}  ⇪ {}  ✉ {}",
        post.like_count,
        post.share_count,
        post.comments.len()
    )
    .dimmed();
    let comments = post
        .comments
        .iter()
        .map(|comment| format!("    {}", render_comment(comment, user)))
        .join("\n");

    if comments.is_empty() {
        format!("{header}\n  {}\n  {stats}", post.content)
    } else {
        format!("{header}\n  {}\n  {stats}\n{comments}", post.content)
    }
}

/// Comments written under the current username carry the edit/delete markers.
pub fn render_comment(comment: &Comment, user: &User) -> String {
    let controls = if user.can_modify(comment) {
        format!(" {}", "[edit] [delete]".yellow())
    } else {
        String::new()
    };
    format!(
        "#{} {}: {} ♥ {}{controls}",
        comment.id,
        comment.username.bold(),
        comment.content,
        comment.like_count
    )
}

pub fn render_alert(alert: &Alert) -> String {
    match alert.kind {
        AlertKind::Success => format!("✔ {}", alert.message).green().to_string(),
        AlertKind::Error => format!("✘ {}", alert.message).red().to_string(),
    }
}

pub fn render_alerts(alerts: &[Alert]) -> Option<String> {
    if alerts.is_empty() {
        return None;
    }
    Some(alerts.iter().map(render_alert).join("\n"))
}
