use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub api_keys: ApiKeySettings,
    pub search: SearchSettings,
    pub history: HistorySettings,
    pub export: ExportSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub static_dir: String,
}

#[derive(Deserialize, Clone, Default)]
pub struct ApiKeySettings {
    pub google_places: Option<String>,
    pub yelp: Option<String>,
    pub apollo: Option<String>,
}

impl ApiKeySettings {
    pub fn google_places(&self) -> Option<String> {
        usable(&self.google_places)
    }

    pub fn yelp(&self) -> Option<String> {
        usable(&self.yelp)
    }

    pub fn apollo(&self) -> Option<String> {
        usable(&self.apollo)
    }

    /// Searching needs at least one of the two directory providers.
    pub fn has_primary(&self) -> bool {
        self.google_places().is_some() || self.yelp().is_some()
    }
}

fn usable(key: &Option<String>) -> Option<String> {
    key.as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

#[derive(Deserialize, Clone)]
pub struct SearchSettings {
    pub result_cap: usize,
    pub time_budget_secs: u64,
    pub min_results: usize,
    pub per_call_limit: usize,
    pub detail_margin_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct HistorySettings {
    pub file_path: String,
    pub max_items: usize,
}

#[derive(Deserialize, Clone)]
pub struct ExportSettings {
    pub directory: String,
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    dotenvy::dotenv().ok();

    let base_path = std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("api_keys.google_places", std::env::var("GOOGLE_PLACES_API_KEY").ok())?
        .set_override_option("api_keys.yelp", std::env::var("YELP_API_KEY").ok())?
        .set_override_option("api_keys.apollo", std::env::var("APOLLO_API_KEY").ok())?
        .set_override_option("application.port", std::env::var("PORT").ok())?
        .build()?;

    settings.try_deserialize::<Settings>()
}
