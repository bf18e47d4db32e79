use anyhow::Context;
use makaam_core::config::{Config, WarnLevel};
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>, host: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load(root).context("failed to load config")?;
    config.apply_env();
    if let Some(p) = port {
        config.server.port = p;
    }
    if let Some(h) = host {
        config.server.host = h;
    }

    let errors: Vec<String> = config
        .validate()
        .into_iter()
        .filter(|w| w.level == WarnLevel::Error)
        .map(|w| w.message)
        .collect();
    if !errors.is_empty() {
        anyhow::bail!("invalid config:\n  {}", errors.join("\n  "));
    }

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        println!("makaam API → http://{}", listener.local_addr()?);

        tokio::select! {
            res = makaam_server::serve_on(root_buf, config, listener) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
