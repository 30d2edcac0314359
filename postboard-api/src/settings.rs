use config::{Config, ConfigError, Environment, File};
use postboard_shared::model::{DEFAULT_USER_IMAGE_URL, DEFAULT_USERNAME, User};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/posts";
pub const DEFAULT_ALERT_LIFETIME_MS: u64 = 3000;

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub user: UserSettings,
    pub alert: AlertSettings,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ApiSettings {
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UserSettings {
    pub username: String,
    pub user_image_url: String,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AlertSettings {
    pub lifetime_ms: u64,
}

impl From<UserSettings> for User {
    fn from(value: UserSettings) -> Self {
        User::new(value.username, value.user_image_url)
    }
}

impl Settings {
    /// Reads the optional `postboard.{toml,yaml,json}` file, then `POSTBOARD__*` env vars,
    /// e.g. `POSTBOARD__API__URL`.
    pub fn new_from_file() -> Result<Self, ConfigError> {
        Self::builder("postboard")?
            .add_source(
                Environment::with_prefix("POSTBOARD")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    fn builder(
        file_name: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("api.url", DEFAULT_API_URL)?
            .set_default("user.username", DEFAULT_USERNAME)?
            .set_default("user.user_image_url", DEFAULT_USER_IMAGE_URL)?
            .set_default("alert.lifetime_ms", DEFAULT_ALERT_LIFETIME_MS)?
            .add_source(File::with_name(file_name).required(false)))
    }

    pub fn new_testing() -> Self {
        Self {
            api: ApiSettings {
                url: "http://localhost:8080/api/posts".to_string(),
            },
            user: UserSettings {
                username: "tester".to_string(),
                user_image_url: "https://example.com/tester.png".to_string(),
            },
            alert: AlertSettings {
                lifetime_ms: DEFAULT_ALERT_LIFETIME_MS,
            },
        }
    }
}
