use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use todolist::app::AppSession;
use todolist::config::Config;
use todolist::logger::Logger;
use todolist::shell::{execute, parse_command, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    if let Some(arg) = args.next() {
        if arg == "--generate-config" {
            let path = match args.next() {
                Some(path) => std::path::PathBuf::from(path),
                None => Config::get_default_config_path()?,
            };
            return Config::generate_default_config(path);
        }
        anyhow::bail!("Unknown argument '{}'. Usage: todolist [--generate-config [PATH]]", arg);
    }

    let config = Config::load().context("Failed to load configuration")?;
    let logger = Logger::from_config(&config.logging)?;
    if logger.has_file_writer() {
        log::info!("todolist starting, logging to {}", Logger::get_log_file_path()?.display());
    }

    let (mut app, memory) = AppSession::with_memory_providers(config, logger);

    println!("todolist - type 'help' for commands");
    prompt(&app)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                for output in execute(&mut app, &memory, command).await {
                    println!("{}", output);
                }
            }
            Err(message) => println!("❌ {}", message),
        }
        prompt(&app)?;
    }

    Ok(())
}

fn prompt(app: &AppSession) -> Result<()> {
    print!("{}> ", app.route());
    std::io::stdout().flush().context("Failed to flush stdout")
}
