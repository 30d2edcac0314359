use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use postboard_api::ApiNative;
use postboard_api::settings::Settings;
use postboard_frontend::app::App;
use postboard_frontend::app::alerts::AlertId;
use postboard_frontend::app::clock::Clock;
use postboard_shared::model::User;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, trace};

use command::{Command, HELP};
use render::{render_alerts, render_feed};

mod command;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(true)
                .with_line_number(true),
        )
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to init tracing: {err}"))?;

    trace!("started!");

    let settings = Settings::new_from_file().context("failed to read settings")?;
    debug!("settings: {settings:?}");

    let api = ApiNative::new(settings.api.url.clone());
    let mut app = App::new(api, Clock::system(), settings.alert.lifetime_ms);
    let mut user: User = settings.user.into();

    app.load_posts().await;
    println!("{}\n\n{HELP}", render_feed(app.feed.posts(), &user));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown: Option<AlertId> = None;
    loop {
        app.tick();
        let fresh = app
            .alerts
            .alerts()
            .iter()
            .filter(|alert| shown.is_none_or(|shown| alert.id > shown))
            .cloned()
            .collect::<Vec<_>>();
        if let Some(alerts) = render_alerts(&fresh) {
            println!("{alerts}");
        }
        shown = fresh.last().map(|alert| alert.id).or(shown);
        print!("{}> ", user.username);
        std::io::stdout().flush()?;

        let line = loop {
            let wait = app
                .next_expiry()
                .map(|at| at.saturating_sub(app.clock.now()));
            tokio::select! {
                line = lines.next_line() => break line?,
                _ = sleep_for(wait) => app.tick(),
            }
        };
        let Some(line) = line else {
            break;
        };
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        let out = command.run(&mut app, &mut user).await;
        if !out.is_empty() {
            println!("{out}");
        }
    }

    trace!("bye");
    Ok(())
}

/// Resolves after `wait_ms`, or never when nothing is scheduled.
async fn sleep_for(wait_ms: Option<u128>) {
    match wait_ms {
        Some(wait_ms) => {
            let wait_ms = u64::try_from(wait_ms).unwrap_or(u64::MAX);
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        }
        None => std::future::pending::<()>().await,
    }
}
