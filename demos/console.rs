//! Example: Interactive RCON console
//!
//! Reads commands from stdin and prints each reply. Settings come from a TOML
//! file given as the first argument, or from `RCON_HOST` / `RCON_PORT` /
//! `RCON_PASSWORD` otherwise.
//!
//! Run with: `RCON_PASSWORD=secret cargo run --example console`

use rcon_session::utils::logging::init_logging;
use rcon_session::{PlayerList, RconClient, Settings};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::from_file(path)?,
        None => Settings::from_env()?,
    };
    settings.validate_strict()?;
    init_logging(&settings.logging)?;

    let client = RconClient::new(settings.rcon);
    println!("RCON console for {} (Ctrl-D to quit)", client.config().address());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        match client.send(command).await {
            Ok(reply) if command == "list" => match PlayerList::parse(&reply) {
                Some(list) => println!(
                    "{}/{} online: {}",
                    list.online,
                    list.max,
                    list.players.join(", ")
                ),
                None => println!("{reply}"),
            },
            Ok(reply) => println!("{reply}"),
            Err(e) => eprintln!("error ({:?}): {e}", e.kind()),
        }
    }

    client.metrics().log_metrics();
    client.close().await;
    Ok(())
}
