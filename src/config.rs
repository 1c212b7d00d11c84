use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the JSON menu catalog used to seed the item store
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Path to the JSON ratings file used to seed the ratings store
    #[serde(default = "default_ratings_path")]
    pub ratings_path: String,

    /// Directory where trained model artifacts are persisted
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Scoring weight for the time-of-day match indicator
    #[serde(default = "default_time_weight")]
    pub time_weight: f64,

    /// Scoring weight for the weather match indicator
    #[serde(default = "default_weather_weight")]
    pub weather_weight: f64,

    /// Scoring weight per currency unit of item price.
    /// Positive: the selector prefers to use the available budget.
    #[serde(default = "default_price_weight")]
    pub price_weight: f64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_catalog_path() -> String {
    "data/menu.json".to_string()
}

fn default_ratings_path() -> String {
    "data/ratings.json".to_string()
}

fn default_model_dir() -> String {
    "data/models".to_string()
}

fn default_time_weight() -> f64 {
    0.5
}

fn default_weather_weight() -> f64 {
    0.5
}

fn default_price_weight() -> f64 {
    0.02
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            catalog_path: default_catalog_path(),
            ratings_path: default_ratings_path(),
            model_dir: default_model_dir(),
            time_weight: default_time_weight(),
            weather_weight: default_weather_weight(),
            price_weight: default_price_weight(),
        }
    }
}
