pub mod clipboard;
pub mod runtime;
pub mod server;
pub mod watcher;

pub const SOCKET_PATH: &str = "/tmp/inkhex.sock";
