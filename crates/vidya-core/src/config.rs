use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub gateway: GatewayConfig,
    pub lessons: LessonsConfig,
    pub memory: MemoryConfig,
    pub tts: TtsConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    /// Gemini API key; usually supplied via `GEMINI_API_KEY` instead of
    /// the config file.
    #[serde(default)]
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct GatewayConfig {
    pub bind: String,
    pub port: u16,
    pub rate_limit: u32,
    pub max_body_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct LessonsConfig {
    pub dir: String,
}

#[derive(Debug, Deserialize)]
pub struct MemoryConfig {
    pub sqlite_path: String,
}

#[derive(Debug, Deserialize)]
pub struct TtsConfig {
    pub base_url: String,
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("GEMINI_API_KEY") {
            self.llm.api_key = v;
        }
        if let Ok(v) = std::env::var("VIDYA_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("VIDYA_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("VIDYA_GATEWAY_PORT")
            && let Ok(port) = v.parse()
        {
            self.gateway.port = port;
        }
        if let Ok(v) = std::env::var("VIDYA_LESSONS_DIR") {
            self.lessons.dir = v;
        }
        if let Ok(v) = std::env::var("VIDYA_SQLITE_PATH") {
            self.memory.sqlite_path = v;
        }
    }

    fn default() -> Self {
        Self {
            llm: LlmConfig {
                api_key: String::new(),
                base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
                model: "gemini-2.5-flash".into(),
                max_output_tokens: 2048,
            },
            gateway: GatewayConfig {
                bind: "127.0.0.1".into(),
                port: 5000,
                rate_limit: 120,
                max_body_size: 1_048_576,
            },
            lessons: LessonsConfig {
                dir: "lesson_dataset".into(),
            },
            memory: MemoryConfig {
                sqlite_path: "./data/vidya.db".into(),
            },
            tts: TtsConfig {
                base_url: "https://translate.google.com".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;

    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let config = Config::default();
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.lessons.dir, "lesson_dataset");
        assert_eq!(config.gateway.rate_limit, 120);
    }

    #[test]
    #[serial]
    fn parse_valid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vidya.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"
[llm]
base_url = "http://localhost:9999"
model = "gemini-test"
max_output_tokens = 512

[gateway]
bind = "0.0.0.0"
port = 8080
rate_limit = 30
max_body_size = 65536

[lessons]
dir = "./fixtures"

[memory]
sqlite_path = ":memory:"

[tts]
base_url = "http://localhost:9998"
"#
        )
        .unwrap();

        for key in [
            "VIDYA_LLM_BASE_URL",
            "VIDYA_LLM_MODEL",
            "VIDYA_GATEWAY_PORT",
            "VIDYA_LESSONS_DIR",
            "VIDYA_SQLITE_PATH",
        ] {
            unsafe { std::env::remove_var(key) };
        }

        let config = Config::load(&path).unwrap();
        assert_eq!(config.llm.model, "gemini-test");
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.lessons.dir, "./fixtures");
        assert_eq!(config.tts.base_url, "http://localhost:9998");
    }

    #[test]
    #[serial]
    fn env_overrides_model() {
        let mut config = Config::default();
        unsafe { std::env::set_var("VIDYA_LLM_MODEL", "gemini-other") };
        config.apply_env_overrides();
        unsafe { std::env::remove_var("VIDYA_LLM_MODEL") };
        assert_eq!(config.llm.model, "gemini-other");
    }

    #[test]
    #[serial]
    fn invalid_port_override_ignored() {
        let mut config = Config::default();
        unsafe { std::env::set_var("VIDYA_GATEWAY_PORT", "not-a-port") };
        config.apply_env_overrides();
        unsafe { std::env::remove_var("VIDYA_GATEWAY_PORT") };
        assert_eq!(config.gateway.port, 5000);
    }
}
