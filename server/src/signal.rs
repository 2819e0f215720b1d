use log::{debug, error};
use tokio::sync::watch;

/// Spawns a task that flips the returned watch once the process is asked
/// to stop.
pub fn shutdown_watch() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        wait_shutdown().await;
        if let Err(e) = tx.send(true) {
            error!("error, shutdown watch, {:?}", e);
        }
    });

    rx
}

#[cfg(windows)]
async fn wait_shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!("error, ctrl_c, {:?}", e);
    }
    debug!("recv ctrl_c, shutdown");
}

#[cfg(unix)]
async fn wait_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(v) => v,
        Err(e) => {
            debug!("error, signal, {:?}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = terminate.recv() => debug!("recv terminate signal"),
        s = tokio::signal::ctrl_c() => debug!("recv ctrl_c signal, {:?}", s),
    }
}
