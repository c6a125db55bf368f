use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_busy_timeout_secs: u64,
    pub model_path: String,
    pub rapid_api_key: String,
    pub profile_api_url: String,
    pub profile_api_host: String,
    pub profile_api_timeout_secs: u64,
    pub server_host: String,
    pub server_port: u16,
}

// 可选项读取失败时使用默认值
fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: var_or("DATABASE_URL", "sqlite://botguard.db"),
            database_max_connections: var_or("DATABASE_MAX_CONNECTIONS", "5")
                .parse()
                .unwrap_or(5),
            database_busy_timeout_secs: var_or("DATABASE_BUSY_TIMEOUT_SECS", "5")
                .parse()
                .unwrap_or(5),
            model_path: var_or("MODEL_PATH", "bot_detector.json"),
            rapid_api_key: env::var("RAPID_API_KEY")?,
            profile_api_url: var_or("PROFILE_API_URL", "https://twitter241.p.rapidapi.com/user"),
            profile_api_host: var_or("PROFILE_API_HOST", "twitter241.p.rapidapi.com"),
            profile_api_timeout_secs: var_or("PROFILE_API_TIMEOUT_SECS", "10")
                .parse()
                .unwrap_or(10),
            server_host: var_or("SERVER_HOST", "0.0.0.0"),
            server_port: var_or("SERVER_PORT", "8000").parse().unwrap_or(8000),
        })
    }

    pub fn database_busy_timeout(&self) -> Duration {
        Duration::from_secs(self.database_busy_timeout_secs)
    }

    pub fn profile_api_timeout(&self) -> Duration {
        Duration::from_secs(self.profile_api_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://botguard.db".into(),
            database_max_connections: 5,
            database_busy_timeout_secs: 5,
            model_path: "bot_detector.json".into(),
            rapid_api_key: String::new(),
            profile_api_url: "https://twitter241.p.rapidapi.com/user".into(),
            profile_api_host: "twitter241.p.rapidapi.com".into(),
            profile_api_timeout_secs: 10,
            server_host: "0.0.0.0".into(),
            server_port: 8000,
        }
    }
}
