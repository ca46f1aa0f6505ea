use std::path::Path;
use vault_core::config::Config;

pub fn run(
    root: &Path,
    host: Option<&str>,
    port: Option<u16>,
    no_open: bool,
) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let host = host.unwrap_or(&config.server.host).to_string();
    let port = port.unwrap_or(config.server.port);
    let root = root.to_path_buf();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
        vault_server::serve_on(root, listener, !no_open).await
    })
}
