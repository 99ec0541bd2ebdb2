use serde::Deserialize;
use std::env;

pub const DEFAULT_SECTIONS: [&str; 2] = ["A", "B"];
pub const DEFAULT_SECTION_CAPACITY: u32 = 10;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_sections")]
    pub sections: Vec<String>,
    #[serde(default = "default_capacity")]
    pub section_capacity: u32,
    /// Let booking owners remove or relocate their own bookings; everyone
    /// else still needs the administrator role.
    #[serde(default)]
    pub owner_or_admin_only: bool,
    #[serde(default)]
    pub route: RouteConfig,
}

/// The single fixed route every booking is sold on.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RouteConfig {
    pub origin: String,
    pub destination: String,
    pub fare: f64,
}

fn default_sections() -> Vec<String> {
    DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect()
}

fn default_capacity() -> u32 {
    DEFAULT_SECTION_CAPACITY
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            origin: "London".to_string(),
            destination: "Paris".to_string(),
            fare: 20.0,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            section_capacity: DEFAULT_SECTION_CAPACITY,
            owner_or_admin_only: false,
            route: RouteConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections = sections.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_section_capacity(mut self, capacity: u32) -> Self {
        self.section_capacity = capacity;
        self
    }

    pub fn with_owner_or_admin_only(mut self, enabled: bool) -> Self {
        self.owner_or_admin_only = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sections.is_empty() {
            return Err(ConfigError::NoSections);
        }
        if let Some(blank) = self.sections.iter().find(|s| s.trim().is_empty()) {
            return Err(ConfigError::BlankSection(blank.clone()));
        }
        if self.section_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !self.route.fare.is_finite() || self.route.fare < 0.0 {
            return Err(ConfigError::InvalidFare(self.route.fare));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("at least one section must be configured")]
    NoSections,

    #[error("section names must not be blank: {0:?}")]
    BlankSection(String),

    #[error("section capacity must be greater than zero")]
    ZeroCapacity,

    #[error("fare must be a non-negative amount, got {0}")]
    InvalidFare(f64),
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("server.port", 50051_i64)?
            .set_default("auth.jwt_secret", "my-secret-key")?
            .set_default("auth.jwt_expiration_seconds", 3600_i64)?
            .set_default("engine.sections", default_sections())?
            .set_default("engine.section_capacity", i64::from(DEFAULT_SECTION_CAPACITY))?
            .set_default("engine.owner_or_admin_only", false)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `RAILBOOK__ENGINE__SECTION_CAPACITY=20`
            .add_source(
                config::Environment::with_prefix("RAILBOOK")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("engine.sections"),
            )
            // Secret variable understood by earlier deployments
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET_KEY").ok())?
            .build()?;

        s.try_deserialize()
    }
}
