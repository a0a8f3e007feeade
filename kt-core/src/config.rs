use std::fs::File;
use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};

use crate::prelude::*;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            base_url: DEFAULT_BACKEND_URL.into(),
            model: DEFAULT_MODEL.into(),
            api_key_env: DEFAULT_API_KEY_ENV_VAR.into(),
            temperature: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionsConfig {
    pub log_tail_lines: i64,
    pub retry_delay_ms: u64,
}

impl ActionsConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for ActionsConfig {
    fn default() -> Self {
        ActionsConfig {
            log_tail_lines: DEFAULT_LOG_TAIL_LINES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub max_action_rounds: usize,

    // 0 means "never truncate"
    pub display_truncate_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_action_rounds: DEFAULT_MAX_ACTION_ROUNDS,
            display_truncate_chars: DEFAULT_DISPLAY_TRUNCATE_CHARS,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TriageConfig {
    pub backend: BackendConfig,
    pub actions: ActionsConfig,
    pub session: SessionConfig,
}

impl TriageConfig {
    pub fn load(filename: &str) -> anyhow::Result<TriageConfig> {
        Ok(serde_yaml::from_reader(File::open(filename)?)?)
    }
}
