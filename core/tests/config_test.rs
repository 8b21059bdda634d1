use herald_core::config::HeraldConfig;
use herald_core::llm::{EmbedderKind, LlmClientConfig};
use serial_test::serial;
use std::path::Path;

const ENV_VARS: &[&str] = &[
    "OPENAI_BASE_URL",
    "OPENAI_MODEL",
    "OPENAI_EMBEDDING_MODEL",
    "OPENAI_API_KEY",
    "OPENAI_TEMPERATURE",
    "REQUEST_TIMEOUT_MS",
    "CHROMA_HOST",
    "CHROMA_API_KEY",
    "CHROMA_TENANT",
    "CHROMA_DATABASE",
    "CHROMA_COLLECTION",
    "CHROMA_EMBEDDER",
    "TAVILY_API_KEY",
    "HERALD_SEARCH_ENABLED",
    "HERALD_GUARDRAIL_ENABLED",
    "HERALD_SUBJECT_NAME",
    "HERALD_HOST",
    "HERALD_PORT",
    "PORT",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn defaults_without_env() {
    clear_env();

    let cfg = HeraldConfig::default();
    assert_eq!(cfg.server.addr(), "0.0.0.0:8000");
    assert_eq!(cfg.llm.base_url, "https://api.openai.com/v1");
    assert_eq!(cfg.llm.model, "gpt-4o");
    assert_eq!(cfg.llm.embedding_model, "text-embedding-3-small");
    assert_eq!(cfg.llm.api_key, None);
    assert_eq!(cfg.llm.temperature, 0.7);
    assert_eq!(cfg.chroma.host, "https://api.trychroma.com");
    assert_eq!(cfg.chroma.collection, "context_data");
    assert_eq!(cfg.chroma.n_results, 3);
    assert_eq!(cfg.chroma.embedder, EmbedderKind::default());
    assert!(!cfg.search.enabled);
    assert!(cfg.guardrail.enabled);
    assert_eq!(cfg.agent.subject_name, "Aman Obaid");
    assert_eq!(cfg.agent.summarization.max_tokens_before_summary, 2000);
    assert_eq!(cfg.agent.summarization.messages_to_keep, 11);
}

#[test]
#[serial]
fn env_overrides_defaults() {
    clear_env();
    std::env::set_var("OPENAI_BASE_URL", "http://localhost:11434/v1");
    std::env::set_var("OPENAI_MODEL", "test-model");
    std::env::set_var("OPENAI_API_KEY", "sk-test");
    std::env::set_var("OPENAI_TEMPERATURE", "0.2");
    std::env::set_var("CHROMA_TENANT", "tenant-1");
    std::env::set_var("CHROMA_DATABASE", "profile");
    std::env::set_var("CHROMA_EMBEDDER", "minilm");
    std::env::set_var("HERALD_SEARCH_ENABLED", "true");
    std::env::set_var("HERALD_GUARDRAIL_ENABLED", "false");
    std::env::set_var("HERALD_SUBJECT_NAME", "Jane Doe");
    std::env::set_var("PORT", "9100");

    let cfg = HeraldConfig::default();
    assert_eq!(cfg.llm.base_url, "http://localhost:11434/v1");
    assert_eq!(cfg.llm.model, "test-model");
    assert_eq!(cfg.llm.api_key.as_deref(), Some("sk-test"));
    assert_eq!(cfg.llm.temperature, 0.2);
    assert_eq!(cfg.chroma.tenant, "tenant-1");
    assert_eq!(cfg.chroma.database, "profile");
    assert_eq!(cfg.chroma.embedder, EmbedderKind::MiniLm);
    assert!(cfg.search.enabled);
    assert!(!cfg.guardrail.enabled);
    assert_eq!(cfg.agent.subject_name, "Jane Doe");
    assert_eq!(cfg.server.port, 9100);

    clear_env();
}

#[test]
#[serial]
fn empty_env_values_fall_back() {
    clear_env();
    std::env::set_var("OPENAI_MODEL", "");
    std::env::set_var("OPENAI_API_KEY", "");

    let cfg = LlmClientConfig::default();
    assert_eq!(cfg.model, "gpt-4o");
    assert_eq!(cfg.api_key, None);

    clear_env();
}

#[test]
#[serial]
fn toml_overlay_replaces_only_present_keys() {
    clear_env();
    let toml = r#"
        [server]
        port = 9000

        [llm]
        model = "gpt-4o-mini"

        [chroma]
        collection = "resume"
        n_results = 5
        embedder = "openai"

        [search]
        enabled = true

        [agent]
        subject_name = "Jane Doe"
        messages_to_keep = 6

        [guardrail]
        enabled = false
    "#;

    let cfg = HeraldConfig::from_toml_str(toml, HeraldConfig::default()).unwrap();
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.llm.model, "gpt-4o-mini");
    assert_eq!(cfg.llm.base_url, "https://api.openai.com/v1");
    assert_eq!(cfg.chroma.collection, "resume");
    assert_eq!(cfg.chroma.n_results, 5);
    assert_eq!(cfg.chroma.embedder, EmbedderKind::OpenAi);
    assert!(cfg.search.enabled);
    assert_eq!(cfg.agent.subject_name, "Jane Doe");
    assert_eq!(cfg.agent.summarization.messages_to_keep, 6);
    assert_eq!(cfg.agent.summarization.max_tokens_before_summary, 2000);
    assert!(!cfg.guardrail.enabled);
}

#[test]
#[serial]
fn unknown_section_is_rejected() {
    clear_env();
    let err = HeraldConfig::from_toml_str("[telemetry]\nenabled = true\n", HeraldConfig::default());
    assert!(err.is_err());
}

#[test]
#[serial]
fn misspelled_key_is_rejected() {
    clear_env();
    let err = HeraldConfig::from_toml_str(
        "[chroma]\ncolection = \"resume\"\n",
        HeraldConfig::default(),
    );
    assert!(err.is_err());

    let err = HeraldConfig::from_toml_str("[agent]\nmax_iteration = 3\n", HeraldConfig::default());
    assert!(err.is_err());
}

#[test]
#[serial]
fn unknown_embedder_is_rejected() {
    clear_env();
    let err = HeraldConfig::from_toml_str("[chroma]\nembedder = \"word2vec\"\n", HeraldConfig::default());
    assert!(err.is_err());
}

#[test]
#[serial]
fn missing_file_uses_defaults() {
    clear_env();
    let cfg = HeraldConfig::load_from(Path::new("/definitely/not/here/herald.toml"));
    assert_eq!(cfg.server.port, 8000);
    assert_eq!(cfg.agent.max_iterations, 25);
    assert_eq!(cfg.tool_timeout().as_millis(), 30_000);
}
