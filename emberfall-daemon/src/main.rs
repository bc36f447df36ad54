//! Healing daemon CLI.
//!
//! Runs the health-regeneration loops outside the web process, sharing the
//! save file and coordinating through the command/status JSON files.
//!
//! ```bash
//! emberfall-daemon              # interactive REPL
//! emberfall-daemon status      # print the last published status snapshot
//! emberfall-daemon heal 3      # start healing hero 3, then drop into the REPL
//! emberfall-daemon damage 3 40 # damage hero 3 (healing starts if they live)
//! emberfall-daemon rest 3      # instantly heal hero 3 to full
//! emberfall-daemon passive     # sweep loop until ctrl-c
//! ```

use std::io::Write;
use std::sync::Arc;

use emberfall_core::store::StoreError;
use emberfall_core::{Config, DaemonConfig, DaemonStatus, GameStore, HealingDaemon};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!("usage: emberfall-daemon [status | heal <id> | damage <id> <amount> | rest <id> | passive]");
    std::process::exit(2);
}

fn parse_or_usage<T: std::str::FromStr>(arg: Option<&String>) -> T {
    match arg.map(|a| a.parse()) {
        Some(Ok(value)) => value,
        _ => usage(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();

    // `status` only reads the snapshot files; it must not restart heal loops.
    if args.first().map(String::as_str) == Some("status") {
        return print_status_snapshot(&config).await;
    }

    let store = GameStore::open(config.store_path()).await;
    let daemon = HealingDaemon::new(
        Arc::new(Mutex::new(store)),
        DaemonConfig::from_config(&config),
    );

    match args.first().map(String::as_str) {
        None => {
            daemon.resume().await;
            run_repl(&daemon).await;
            daemon.shutdown().await;
        }
        Some("heal") => {
            daemon.resume().await;
            heal_command(&daemon, parse_or_usage(args.get(1))).await;
            run_repl(&daemon).await;
            daemon.shutdown().await;
        }
        Some("damage") => {
            // One-shot: resume first so shutdown writes the full state back,
            // and the next resumed daemon picks up any new heal entry.
            daemon.resume().await;
            damage_command(
                &daemon,
                parse_or_usage(args.get(1)),
                parse_or_usage(args.get(2)),
            )
            .await;
            daemon.shutdown().await;
        }
        Some("rest") => {
            daemon.resume().await;
            rest_command(&daemon, parse_or_usage(args.get(1))).await;
            daemon.shutdown().await;
        }
        Some("passive") => {
            daemon.resume().await;
            println!("Passive mode: sweeping every {}s, ctrl-c to stop", config.sweep_interval.as_secs());
            tokio::select! {
                _ = daemon.run_passive() => {}
                _ = tokio::signal::ctrl_c() => {
                    println!("\nShutting down...");
                }
            }
            daemon.shutdown().await;
        }
        Some(_) => usage(),
    }
    Ok(())
}

async fn print_status_snapshot(
    config: &Config,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match DaemonStatus::read(&config.status_path()).await? {
        Some(status) => {
            println!(
                "Daemon {} (as of {})",
                if status.running { "running" } else { "stopped" },
                status.updated_at
            );
            if status.healing.is_empty() {
                println!("No heroes currently being healed");
            } else {
                println!("Active healing sessions: {}", status.healing.len());
                for entry in &status.healing {
                    let last = entry
                        .last_heal
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "never".to_string());
                    println!(
                        "  {}: {}/{} HP (last heal: {last})",
                        entry.name, entry.current_health, entry.max_health
                    );
                }
            }
        }
        None => println!("No status snapshot found; is the daemon running?"),
    }
    Ok(())
}

async fn hero_label(daemon: &HealingDaemon, hero_id: u64) -> String {
    let store = daemon.store().lock().await;
    match store.hero(hero_id) {
        Ok(hero) => format!(
            "{} ({}/{} HP)",
            hero.name, hero.current_health, hero.max_health
        ),
        Err(_) => format!("hero {hero_id}"),
    }
}

async fn heal_command(daemon: &HealingDaemon, hero_id: u64) {
    match daemon.start_hero_healing(hero_id).await {
        Ok(true) => println!("Healing {}", hero_label(daemon, hero_id).await),
        Ok(false) => println!("{} is already at full health", hero_label(daemon, hero_id).await),
        Err(StoreError::HeroNotFound(id)) => println!("Hero {id} not found"),
        Err(err) => println!("Error: {err}"),
    }
}

async fn damage_command(daemon: &HealingDaemon, hero_id: u64, amount: i32) {
    match daemon.damage_hero(hero_id, amount).await {
        Ok(()) => {
            println!("Damaged {}", hero_label(daemon, hero_id).await);
            if daemon.is_healing(hero_id).await {
                println!("Healing started");
            }
        }
        Err(StoreError::HeroNotFound(id)) => println!("Hero {id} not found"),
        Err(err) => println!("Error: {err}"),
    }
}

async fn rest_command(daemon: &HealingDaemon, hero_id: u64) {
    match daemon.rest_hero(hero_id).await {
        Ok(true) => println!("{} rested to full health", hero_label(daemon, hero_id).await),
        Ok(false) => println!("{} is already at full health", hero_label(daemon, hero_id).await),
        Err(StoreError::HeroNotFound(id)) => println!("Hero {id} not found"),
        Err(err) => println!("Error: {err}"),
    }
}

async fn print_live_status(daemon: &HealingDaemon) {
    let status = daemon.status().await;
    println!("Active healing sessions: {}", status.healing.len());
    if status.healing.is_empty() {
        println!("No heroes currently being healed");
        return;
    }
    for entry in &status.healing {
        let last = entry
            .last_heal
            .map(|t| t.to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "  {}: {}/{} HP (last heal: {last})",
            entry.name, entry.current_health, entry.max_health
        );
    }
}

async fn list_heroes(daemon: &HealingDaemon) {
    let store = daemon.store().lock().await;
    let mut any = false;
    for hero in store.heroes() {
        any = true;
        println!(
            "  ID {}: {} - {}/{} HP{}",
            hero.id,
            hero.name,
            hero.current_health,
            hero.max_health,
            if hero.in_combat { " (in combat)" } else { "" }
        );
    }
    if !any {
        println!("  No heroes yet");
    }
}

async fn run_repl(daemon: &HealingDaemon) {
    println!("Interactive healing daemon");
    println!("Commands:");
    println!("  heal <hero_id>            - Start healing a hero");
    println!("  stop <hero_id>            - Stop healing a hero");
    println!("  rest <hero_id>            - Instantly heal a hero to full");
    println!("  damage <hero_id> <amount> - Damage a hero");
    println!("  status                    - Show healing status");
    println!("  heroes                    - List all heroes");
    println!("  quit                      - Exit");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("Healing> ");
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                eprintln!("Error reading input: {err}");
                break;
            }
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&cmd) = parts.first() else {
            continue;
        };

        match (cmd, parts.get(1), parts.get(2)) {
            ("quit", _, _) | ("exit", _, _) => break,
            ("status", _, _) => print_live_status(daemon).await,
            ("heroes", _, _) => list_heroes(daemon).await,
            ("heal", Some(id), _) => match id.parse() {
                Ok(id) => heal_command(daemon, id).await,
                Err(_) => println!("Not a hero id: {id}"),
            },
            ("stop", Some(id), _) => match id.parse() {
                Ok(id) => {
                    if daemon.stop_hero_healing(id).await {
                        println!("Stopped healing hero {id}");
                    } else {
                        println!("Hero {id} was not being healed");
                    }
                }
                Err(_) => println!("Not a hero id: {id}"),
            },
            ("rest", Some(id), _) => match id.parse() {
                Ok(id) => rest_command(daemon, id).await,
                Err(_) => println!("Not a hero id: {id}"),
            },
            ("damage", Some(id), Some(amount)) => match (id.parse(), amount.parse()) {
                (Ok(id), Ok(amount)) => damage_command(daemon, id, amount).await,
                _ => println!("Usage: damage <hero_id> <amount>"),
            },
            _ => println!("Unknown command or missing arguments"),
        }
    }
    println!("Goodbye!");
}
