use std::sync::OnceLock;

use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    #[serde(default = "default_app_env")]
    pub app_env: String,
}

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "tubenotes.db".into()
}

fn default_jwt_secret() -> String {
    "dev-secret-change-me".into()
}

fn default_token_ttl_hours() -> i64 {
    168 // 7 days
}

fn default_cors_origin() -> String {
    "*".into()
}

fn default_store_timeout_secs() -> u64 {
    5
}

fn default_backup_dir() -> String {
    "backups".into()
}

fn default_app_env() -> String {
    "local".into()
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Self>().unwrap();

        if config.jwt_secret == default_jwt_secret() {
            tracing::warn!("JWT_SECRET is not set, falling back to the development default");
        }

        config
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

#[cfg(test)]
pub fn config_override<F>(override_config: F) -> &'static Config
where
    F: FnOnce(Config) -> Config,
{
    CONFIG.get_or_init(|| override_config(Config::from_env()))
}
