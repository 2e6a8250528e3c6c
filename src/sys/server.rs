use crate::events::AppEvent;
use crate::menu::geometry::Point;
use crate::sys::SOCKET_PATH;
use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

fn parse_point(args: &[&str]) -> Option<Point> {
    match args {
        [x, y] => Some(Point::new(x.parse().ok()?, y.parse().ok()?)),
        _ => None,
    }
}

/// One line of the socket protocol.
pub fn parse_command(line: &str) -> Option<AppEvent> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let (command, args) = words.split_first()?;

    match (*command, args) {
        ("show", []) => Some(AppEvent::Show(None)),
        ("show", args) => parse_point(args).map(|p| AppEvent::Show(Some(p))),
        ("move", args) => parse_point(args).map(AppEvent::CursorMove),
        ("hide", []) => Some(AppEvent::Hide),
        ("click", []) => Some(AppEvent::Click),
        ("copy", []) => Some(AppEvent::Copy),
        ("quit", []) => Some(AppEvent::Quit),
        _ => None,
    }
}

pub async fn run_server(tx: Sender<AppEvent>) {
    // Cleanup old socket if it exists
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };
    log::info!("Listening on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        let Some(event) = parse_command(&line) else {
                            log::warn!("Ignoring unknown command {:?}", line.trim());
                            continue;
                        };
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}
