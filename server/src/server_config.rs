use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use tictactoe_engine::Difficulty;

const MAX_ENGINE_MOVE_DELAY_MS: u64 = 10_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub default_difficulty: Difficulty,
    pub engine_move_delay_ms: u64,
    pub rng_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_difficulty: Difficulty::Easy,
            engine_move_delay_ms: 500,
            rng_seed: None,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.engine_move_delay_ms > MAX_ENGINE_MOVE_DELAY_MS {
            return Err(format!(
                "engine_move_delay_ms must not exceed {}, got {}",
                MAX_ENGINE_MOVE_DELAY_MS, self.engine_move_delay_ms
            ));
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<ServerConfig, String> {
    let config: ServerConfig = serde_yaml_ng::from_str(content)
        .map_err(|e| format!("Failed to deserialize config: {}", e))?;
    config
        .validate()
        .map_err(|e| format!("Config validation error: {}", e))?;
    Ok(config)
}

pub fn load_config(path: Option<&str>) -> Result<ServerConfig, String> {
    let Some(path) = path else {
        return Ok(ServerConfig::default());
    };

    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(ServerConfig::default()),
        Err(err) => Err(format!("Failed to read config file: {}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_parse_overrides_defaults() {
        let config = parse_config("default_difficulty: hard\nengine_move_delay_ms: 0\n").unwrap();
        assert_eq!(config.default_difficulty, Difficulty::Hard);
        assert_eq!(config.engine_move_delay_ms, 0);
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn test_parse_reads_seed() {
        let config = parse_config("rng_seed: 42\n").unwrap();
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.default_difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_excessive_delay_is_rejected() {
        assert!(parse_config("engine_move_delay_ms: 60000\n").is_err());
    }

    #[test]
    fn test_unknown_difficulty_is_rejected() {
        assert!(parse_config("default_difficulty: impossible\n").is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_config(Some("/nonexistent/tictactoe.yaml")).unwrap();
        assert_eq!(config, ServerConfig::default());
    }
}
