//! TCP listener loop.

use crate::routes::build_router;
use crate::state::AppState;
use log::{info, warn};
use tokio::net::TcpListener;

/// Serves the application on `bind` until Ctrl-C.
pub async fn run_server(state: AppState, bind: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    let local = listener.local_addr()?;
    info!("event=server_start module=web status=ok addr={local}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=web status=ok addr={local}");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=server_signal module=web status=error error={err}");
    }
}
