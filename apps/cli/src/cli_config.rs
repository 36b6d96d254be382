use std::env;
use std::str::FromStr;
use std::time::Duration;

use scopegate_core::{AppError, AppResult};
use scopegate_domain::UserId;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub query_timeout: Duration,
}

impl CliConfig {
    pub fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let max_connections = parse_env_u32("DATABASE_MAX_CONNECTIONS", 5)?;
        let query_timeout_ms = parse_env_u64("SCOPE_QUERY_TIMEOUT_MS", 5000)?;

        if max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        if query_timeout_ms == 0 {
            return Err(AppError::Validation(
                "SCOPE_QUERY_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
            query_timeout: Duration::from_millis(query_timeout_ms),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Migrate,
    ListUserScopes {
        user_id: UserId,
    },
    ListAllScopes,
    ValidateScopes {
        user_id: UserId,
        scope_parameter: String,
    },
}

impl Command {
    pub fn parse(args: &[String]) -> AppResult<Self> {
        let (name, rest) = args
            .split_first()
            .ok_or_else(|| AppError::Validation(usage()))?;

        match (name.as_str(), rest) {
            ("migrate", []) => Ok(Self::Migrate),
            ("list-all", []) => Ok(Self::ListAllScopes),
            ("list-user", [user_id]) => Ok(Self::ListUserScopes {
                user_id: UserId::from_str(user_id)?,
            }),
            ("validate", [user_id, scopes @ ..]) => Ok(Self::ValidateScopes {
                user_id: UserId::from_str(user_id)?,
                scope_parameter: scopes.join(" "),
            }),
            _ => Err(AppError::Validation(usage())),
        }
    }
}

fn usage() -> String {
    "usage: scopegate-cli <migrate | list-all | list-user <user-id> | validate <user-id> [scope...]>"
        .to_owned()
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    let value =
        env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_env_u32(name: &str, default: u32) -> AppResult<u32> {
    match env::var(name) {
        Ok(value) => value.parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::Command;

    const USER_ID: &str = "6f1c1a3e-52a4-4c77-9d2b-3f0a8f3a5e10";

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn validate_joins_remaining_arguments_into_scope_parameter() {
        let command = Command::parse(&args(&["validate", USER_ID, "openid team", "department"]));
        assert!(matches!(
            command,
            Ok(Command::ValidateScopes { scope_parameter, .. })
                if scope_parameter == "openid team department"
        ));
    }

    #[test]
    fn validate_without_scopes_is_accepted() {
        let command = Command::parse(&args(&["validate", USER_ID]));
        assert!(matches!(
            command,
            Ok(Command::ValidateScopes { scope_parameter, .. }) if scope_parameter.is_empty()
        ));
    }

    #[test]
    fn list_user_requires_valid_user_id() {
        assert!(Command::parse(&args(&["list-user", "alice"])).is_err());
        assert!(Command::parse(&args(&["list-user", USER_ID])).is_ok());
    }

    #[test]
    fn unknown_or_missing_command_is_rejected() {
        assert!(Command::parse(&[]).is_err());
        assert!(Command::parse(&args(&["list-all", "extra"])).is_err());
        assert!(Command::parse(&args(&["grant", USER_ID])).is_err());
    }

    #[test]
    fn simple_commands_parse() {
        assert_eq!(Command::parse(&args(&["migrate"])).ok(), Some(Command::Migrate));
        assert_eq!(
            Command::parse(&args(&["list-all"])).ok(),
            Some(Command::ListAllScopes)
        );
    }
}
