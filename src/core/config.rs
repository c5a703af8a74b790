use std::env;

use thiserror::Error;

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    runtime: RuntimeSettings,
    scheduler: SchedulerSettings,
    email: EmailSettings,
    telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct SchedulerSettings {
    pub(crate) reminder_interval_seconds: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct EmailSettings {
    pub(crate) enabled: bool,
    pub(crate) smtp_host: String,
    pub(crate) smtp_port: u16,
    pub(crate) smtp_username: String,
    pub(crate) smtp_password: String,
    pub(crate) from_name: String,
    pub(crate) from_address: String,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Test => "test",
        }
    }

    fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("missing required secret for {0}")]
    MissingSecret(&'static str),
}

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let environment = parse_environment(
            env_optional("PEERTRACK_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config =
            env_optional("PEERTRACK_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let reminder_interval_seconds = parse_u64(
            "REMINDER_INTERVAL_SECONDS",
            env_or_default("REMINDER_INTERVAL_SECONDS", "86400"),
        )?;

        let email_enabled =
            env_optional("EMAIL_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);
        let smtp_host = env_or_default("SMTP_HOST", "localhost");
        let smtp_port = parse_u16("SMTP_PORT", env_or_default("SMTP_PORT", "587"))?;
        let smtp_username = env_or_default("SMTP_USERNAME", "");
        let smtp_password = env_or_default("SMTP_PASSWORD", "");
        let from_name = env_or_default("EMAIL_FROM_NAME", "PeerTrack");
        let from_address = env_or_default("EMAIL_FROM_ADDRESS", "no-reply@peertrack.app");

        let log_level = env_or_default("PEERTRACK_LOG_LEVEL", "info");
        let json =
            env_optional("PEERTRACK_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            scheduler: SchedulerSettings { reminder_interval_seconds },
            email: EmailSettings {
                enabled: email_enabled,
                smtp_host,
                smtp_port,
                smtp_username,
                smtp_password,
                from_name,
                from_address,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub(crate) fn scheduler(&self) -> &SchedulerSettings {
        &self.scheduler
    }

    pub(crate) fn email(&self) -> &EmailSettings {
        &self.email
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.reminder_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "REMINDER_INTERVAL_SECONDS",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.email.enabled {
            if self.email.smtp_username.is_empty() || self.email.smtp_password.is_empty() {
                return Err(ConfigError::MissingSecret("SMTP_USERNAME/SMTP_PASSWORD"));
            }
            if self.email.smtp_host.is_empty() {
                return Err(ConfigError::MissingSecret("SMTP_HOST"));
            }
        }

        Ok(())
    }
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_u16(field: &'static str, value: String) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref().map(|val| val.to_lowercase()) {
        Some(ref val) if val == "production" || val == "prod" => Environment::Production,
        Some(ref val) if val == "staging" => Environment::Staging,
        Some(ref val) if val == "test" || val == "testing" => Environment::Test,
        _ => Environment::Development,
    }
}
