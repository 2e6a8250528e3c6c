use crate::config::{ConfigError, get_config_path};
use crate::events::AppEvent;
use async_channel::{Receiver, Sender};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::time::Duration;

/// Editors save in bursts (truncate, write, rename). One reload per burst.
const QUIET_PERIOD: Duration = Duration::from_millis(150);

fn touches_config(event: &Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}

/// Swallows events until `quiet` passes without one or the channel closes.
/// Returns how many were swallowed.
async fn settle<T>(rx: &Receiver<T>, quiet: Duration) -> usize {
    let mut absorbed = 0;
    while let Ok(Ok(_)) = tokio::time::timeout(quiet, rx.recv()).await {
        absorbed += 1;
    }
    absorbed
}

type WatchResult = notify::Result<Event>;

fn watch_dir(dir: &Path) -> Result<(RecommendedWatcher, Receiver<WatchResult>), ConfigError> {
    fs_err::create_dir_all(dir)?;

    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok((watcher, bridge_rx))
}

/// Sends [`AppEvent::ConfigReload`] after each burst of changes to the
/// config file. Runs until the app side hangs up.
pub async fn watch_config(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let Some(config_dir) = config_path.parent() else {
        return;
    };

    // the watcher stops when dropped
    let (_watcher, bridge_rx) = match watch_dir(config_dir) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to watch {}: {}", config_dir.display(), e);
            return;
        }
    };
    log::info!("Watching {}", config_path.display());

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) if touches_config(&event, &config_path) => {
                let absorbed = settle(&bridge_rx, QUIET_PERIOD).await;
                log::debug!("Config changed ({} more events in burst)", absorbed);
                if tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use std::path::PathBuf;

    #[test]
    fn test_only_changes_to_the_config_count() {
        let config = PathBuf::from("/cfg/inkhex/config.toml");
        let event = |kind, path: &str| Event::new(kind).add_path(PathBuf::from(path));

        assert!(touches_config(
            &event(EventKind::Modify(ModifyKind::Any), "/cfg/inkhex/config.toml"),
            &config
        ));
        assert!(touches_config(
            &event(EventKind::Create(CreateKind::File), "/cfg/inkhex/config.toml"),
            &config
        ));
        assert!(!touches_config(
            &event(EventKind::Access(AccessKind::Any), "/cfg/inkhex/config.toml"),
            &config
        ));
        assert!(!touches_config(
            &event(EventKind::Modify(ModifyKind::Any), "/cfg/inkhex/.config.toml.swp"),
            &config
        ));
    }

    #[tokio::test]
    async fn test_settle_absorbs_a_burst() {
        let (tx, rx) = async_channel::unbounded();
        for _ in 0..3 {
            tx.send(()).await.unwrap();
        }
        assert_eq!(settle(&rx, Duration::from_millis(20)).await, 3);

        tokio::spawn(async move {
            for _ in 0..4 {
                tokio::time::sleep(Duration::from_millis(5)).await;
                tx.send(()).await.unwrap();
            }
        });
        assert_eq!(settle(&rx, Duration::from_millis(200)).await, 4);
    }

    #[tokio::test]
    async fn test_settle_returns_when_quiet() {
        let (_tx, rx) = async_channel::unbounded::<()>();
        assert_eq!(settle(&rx, Duration::from_millis(10)).await, 0);
    }
}
