//! Management command: damage a hero from the shell.
//!
//! Usage: `damage_hero <hero_id> <amount>`. Applies the damage, saves the
//! store, and signals the daemon to start healing if the hero survived.

use emberfall_core::{CommandChannel, Config, DaemonCommand, GameStore};
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!("usage: damage_hero <hero_id> <amount>");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(hero_id), Some(amount)) = (args.next(), args.next()) else {
        usage();
    };
    let Ok(hero_id) = hero_id.parse::<u64>() else {
        usage();
    };
    let Ok(amount) = amount.parse::<i32>() else {
        usage();
    };

    let config = Config::from_env();
    let mut store = GameStore::load(config.store_path()).await?;
    let mut hero = store.hero(hero_id)?.clone();

    let needs_healing = hero.take_damage(amount);
    println!(
        "{} takes {} damage: {}/{} HP",
        hero.name, amount, hero.current_health, hero.max_health
    );
    let dead = hero.current_health == 0;
    store.put_hero(hero)?;
    store.save().await?;

    if dead {
        println!("The hero has fallen.");
    } else if needs_healing {
        let channel = CommandChannel::new(config.command_path());
        channel
            .send(DaemonCommand::StartHealing { hero_id })
            .await?;
        println!("Healing requested from the daemon.");
    }
    Ok(())
}
