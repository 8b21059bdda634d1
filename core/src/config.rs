use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::agent::AgentConfig;
use crate::context_store::ChromaConfig;
use crate::guardrail::GuardrailConfig;
use crate::llm::{EmbedderKind, LlmClientConfig};
use crate::tools::native::SearchConfig;

/// HTTP listener settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HERALD_HOST")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: std::env::var("HERALD_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// High-level configuration for the Herald service
#[derive(Clone, Debug, Default)]
pub struct HeraldConfig {
    pub server: ServerConfig,
    pub llm: LlmClientConfig,
    pub chroma: ChromaConfig,
    pub search: SearchConfig,
    pub agent: AgentConfig,
    pub guardrail: GuardrailConfig,
}

impl HeraldConfig {
    /// Load configuration from a TOML file (path via HERALD_CONFIG or ./herald.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let path = std::env::var("HERALD_CONFIG").unwrap_or_else(|_| "herald.toml".into());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(p: &Path) -> Self {
        let default = Self::default();
        if !p.exists() {
            tracing::info!(target: "config", path = %p.display(), "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match Self::from_toml_str(&s, default.clone()) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(target: "config", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "config", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    /// Overlay a TOML document onto `base`; absent keys keep their base value
    pub fn from_toml_str(s: &str, base: Self) -> Result<Self, toml::de::Error> {
        let t = toml::from_str::<HeraldToml>(s)?;
        Ok(t.overlay(base))
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.agent.tool_timeout_ms)
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct HeraldToml {
    pub server: Option<ServerToml>,
    pub llm: Option<LlmToml>,
    pub chroma: Option<ChromaToml>,
    pub search: Option<SearchToml>,
    pub agent: Option<AgentToml>,
    pub guardrail: Option<GuardrailToml>,
}

impl HeraldToml {
    fn overlay(self, mut base: HeraldConfig) -> HeraldConfig {
        if let Some(s) = self.server {
            s.apply(&mut base.server);
        }
        if let Some(l) = self.llm {
            l.apply(&mut base.llm);
        }
        if let Some(c) = self.chroma {
            c.apply(&mut base.chroma);
        }
        if let Some(s) = self.search {
            s.apply(&mut base.search);
        }
        if let Some(a) = self.agent {
            a.apply(&mut base.agent);
        }
        if let Some(g) = self.guardrail {
            g.apply(&mut base.guardrail);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerToml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ServerToml {
    fn apply(self, c: &mut ServerConfig) {
        if let Some(v) = self.host {
            c.host = v;
        }
        if let Some(v) = self.port {
            c.port = v;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct LlmToml {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub embedding_model: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub temperature: Option<f32>,
}

impl LlmToml {
    fn apply(self, c: &mut LlmClientConfig) {
        if let Some(v) = self.base_url {
            c.base_url = v;
        }
        if let Some(v) = self.model {
            c.model = v;
        }
        if let Some(v) = self.embedding_model {
            c.embedding_model = v;
        }
        if let Some(v) = self.api_key {
            c.api_key = Some(v);
        }
        if let Some(v) = self.request_timeout_ms {
            c.request_timeout_ms = v;
        }
        if let Some(v) = self.temperature {
            c.temperature = v;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ChromaToml {
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub tenant: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub n_results: Option<usize>,
    pub request_timeout_ms: Option<u64>,
    pub embedder: Option<EmbedderKind>,
}

impl ChromaToml {
    fn apply(self, c: &mut ChromaConfig) {
        if let Some(v) = self.host {
            c.host = v;
        }
        if let Some(v) = self.api_key {
            c.api_key = Some(v);
        }
        if let Some(v) = self.tenant {
            c.tenant = v;
        }
        if let Some(v) = self.database {
            c.database = v;
        }
        if let Some(v) = self.collection {
            c.collection = v;
        }
        if let Some(v) = self.n_results {
            c.n_results = v.max(1);
        }
        if let Some(v) = self.request_timeout_ms {
            c.request_timeout_ms = v;
        }
        if let Some(v) = self.embedder {
            c.embedder = v;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchToml {
    pub enabled: Option<bool>,
    pub api_key: Option<String>,
    pub max_results: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl SearchToml {
    fn apply(self, c: &mut SearchConfig) {
        if let Some(v) = self.enabled {
            c.enabled = v;
        }
        if let Some(v) = self.api_key {
            c.api_key = Some(v);
        }
        if let Some(v) = self.max_results {
            c.max_results = v;
        }
        if let Some(v) = self.timeout_ms {
            c.timeout_ms = v;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct AgentToml {
    pub subject_name: Option<String>,
    pub max_iterations: Option<usize>,
    pub tool_timeout_ms: Option<u64>,
    pub max_tokens_before_summary: Option<usize>,
    pub messages_to_keep: Option<usize>,
}

impl AgentToml {
    fn apply(self, c: &mut AgentConfig) {
        if let Some(v) = self.subject_name {
            c.subject_name = v;
        }
        if let Some(v) = self.max_iterations {
            c.max_iterations = v;
        }
        if let Some(v) = self.tool_timeout_ms {
            c.tool_timeout_ms = v;
        }
        if let Some(v) = self.max_tokens_before_summary {
            c.summarization.max_tokens_before_summary = v;
        }
        if let Some(v) = self.messages_to_keep {
            c.summarization.messages_to_keep = v;
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct GuardrailToml {
    pub enabled: Option<bool>,
}

impl GuardrailToml {
    fn apply(self, c: &mut GuardrailConfig) {
        if let Some(v) = self.enabled {
            c.enabled = v;
        }
    }
}
