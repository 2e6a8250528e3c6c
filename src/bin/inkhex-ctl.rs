use clap::{Parser, Subcommand};
use inkhex::config;
use inkhex::sys::SOCKET_PATH;
use std::io::Write;
use std::os::unix::net::UnixStream;

#[derive(Parser, Debug)]
#[command(name = "inkhex-ctl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Open the menu, at the given position or at the last known cursor
    Show {
        #[arg(requires = "y")]
        x: Option<f64>,
        y: Option<f64>,
    },
    /// Copy the composed style of the root and close the menu
    Hide,
    /// Report the pointer position
    Move { x: f64, y: f64 },
    /// Click at the current pointer position
    Click,
    /// Copy the composed style under the pointer
    Copy,
    /// Stop the daemon
    Quit,
    /// Write the default config file if none exists
    InitConfig,
}

impl Commands {
    /// The socket protocol line, if the command goes to the daemon.
    fn line(&self) -> Option<String> {
        match self {
            Self::Show { x: Some(x), y: Some(y) } => Some(format!("show {x} {y}")),
            Self::Show { .. } => Some("show".into()),
            Self::Hide => Some("hide".into()),
            Self::Move { x, y } => Some(format!("move {x} {y}")),
            Self::Click => Some("click".into()),
            Self::Copy => Some("copy".into()),
            Self::Quit => Some("quit".into()),
            Self::InitConfig => None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command.line() {
        Some(line) => send_command(&line),
        None => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn send_command(cmd: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to inkhex daemon at {}: {}. Is inkhex running?",
            SOCKET_PATH,
            e
        )
    })?;
    writeln!(stream, "{}", cmd)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkhex::sys::server::parse_command;

    #[test]
    fn test_lines_parse_on_the_daemon_side() {
        let commands = [
            Commands::Show { x: None, y: None },
            Commands::Show { x: Some(12.5), y: Some(-3.0) },
            Commands::Hide,
            Commands::Move { x: 1.0, y: 2.0 },
            Commands::Click,
            Commands::Copy,
            Commands::Quit,
        ];
        for command in commands {
            let line = command.line().unwrap();
            assert!(parse_command(&line).is_some(), "{line}");
        }
        assert_eq!(Commands::InitConfig.line(), None);
    }

    #[test]
    fn test_cli_parses_negative_coordinates() {
        let cli = Cli::try_parse_from(["inkhex-ctl", "move", "--", "-4", "8"]).unwrap();
        assert!(matches!(cli.command, Commands::Move { x, y } if x == -4.0 && y == 8.0));
    }
}
