use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use llm_chat::{ChatClient, ChatConfig};
use makaam_core::config::{Config, LlmConfig, ENV_JWT_SECRET};
use makaam_core::paths;
use makaam_core::store::Store;

use crate::auth::{self, JwtKeys};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub store: Arc<Store>,
    pub jwt: Arc<JwtKeys>,
    /// `None` when the LLM is disabled or has no key; roadmaps then come
    /// from the built-in generator.
    pub llm: Option<Arc<ChatClient>>,
}

impl AppState {
    pub fn new(root: PathBuf, config: Config) -> anyhow::Result<Self> {
        let store = Store::open(&paths::db_path(&root))?;

        let secret = match config
            .auth
            .jwt_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            Some(s) => s.to_string(),
            None => {
                tracing::warn!(
                    "no JWT secret configured (auth.jwt_secret or {ENV_JWT_SECRET}); \
                     using a random secret, issued tokens will not survive a restart"
                );
                auth::random_secret()
            }
        };
        let jwt = JwtKeys::new(secret.as_bytes(), config.auth.token_ttl_hours);
        let llm = build_llm(&config.llm)?.map(Arc::new);

        Ok(Self {
            root,
            config: Arc::new(config),
            store: Arc::new(store),
            jwt: Arc::new(jwt),
            llm,
        })
    }
}

fn build_llm(cfg: &LlmConfig) -> anyhow::Result<Option<ChatClient>> {
    if !cfg.enabled {
        tracing::info!("llm disabled; using the built-in roadmap generator");
        return Ok(None);
    }
    let Some(api_key) = cfg.resolve_api_key() else {
        tracing::warn!(
            "llm enabled but no API key found (llm.api_key or ${}); using the built-in roadmap generator",
            cfg.api_key_env
        );
        return Ok(None);
    };
    let client = ChatClient::new(ChatConfig {
        base_url: cfg.base_url.clone(),
        api_key: Some(api_key),
        model: cfg.model.clone(),
        temperature: cfg.temperature,
        timeout: Duration::from_secs(cfg.timeout_secs),
        json_mode: cfg.json_mode,
    })?;
    tracing::info!(model = %cfg.model, base_url = %cfg.base_url, "llm roadmap generation enabled");
    Ok(Some(client))
}
