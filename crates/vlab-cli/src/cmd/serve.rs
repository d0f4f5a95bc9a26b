use anyhow::Result;
use vlab_core::config::ProviderConfig;

/// Run the HTTP service until Ctrl-C.
pub fn run(
    mut config: ProviderConfig,
    host: Option<String>,
    port: Option<u16>,
    open_browser: bool,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let actual_port = listener.local_addr()?.port();

        println!(
            "{} → http://localhost:{actual_port}  (PID {})",
            config.deploy.module_name,
            std::process::id()
        );

        tokio::select! {
            res = vlab_server::serve_on(config, listener, open_browser) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
