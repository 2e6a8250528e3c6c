use crate::events::AppEvent;
use crate::sys::{server, watcher};
use async_channel::Sender;
use std::thread;
use tokio::runtime::Runtime;
use tokio::task::JoinSet;

/// Runs the socket server and the config watcher on their own thread. The
/// thread ends once both have stopped.
pub fn start_background_services(tx: Sender<AppEvent>) -> std::io::Result<()> {
    let rt = Runtime::new()?;

    thread::Builder::new()
        .name("inkhex-services".into())
        .spawn(move || {
            rt.block_on(async move {
                let mut services = JoinSet::new();
                services.spawn(server::run_server(tx.clone()));
                services.spawn(watcher::watch_config(tx));

                while let Some(res) = services.join_next().await {
                    if let Err(e) = res {
                        log::error!("Background service failed: {}", e);
                    }
                }
                log::warn!("Background services stopped");
            });
        })?;

    Ok(())
}
