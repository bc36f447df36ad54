//! Emberfall RPG engine.
//!
//! This crate provides:
//! - The game data model: heroes, classes, the item variants, inventories,
//!   and per-hero equipment
//! - Character creation with class seeding and stat-point allocation
//! - A versioned JSON game store shared by the web and daemon processes
//! - The healing daemon and its file-based command channel
//!
//! # Quick Start
//!
//! ```ignore
//! use emberfall_core::{catalog, CharacterForm, GameStore, Stat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = GameStore::open("game.json").await;
//!     catalog::populate(&mut store)?;
//!
//!     let class_id = store.add_class(
//!         emberfall_core::HeroClass::new("Warrior", "A brave warrior."),
//!     );
//!     let mut form = CharacterForm::for_class(store.class(class_id)?);
//!     form.set_name("Aldric");
//!     form.allocate(Stat::Constitution, 10);
//!     let hero_id = store.create_hero(form.build().map_err(|e| format!("{e:?}"))?)?;
//!
//!     store.save().await?;
//!     println!("created hero {hero_id}");
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod catalog;
pub mod channel;
pub mod config;
pub mod daemon;
pub mod hero;
pub mod inventory;
pub mod item;
pub mod store;

// Primary public API
pub use builder::{CharacterForm, FormError, HeroDraft, Stat, ALLOCATION_POINTS};
pub use channel::{CommandChannel, DaemonCommand, DaemonStatus};
pub use config::Config;
pub use daemon::{DaemonConfig, HealingDaemon, SharedStore};
pub use hero::{Hero, HeroClass, HeroId};
pub use inventory::{Equipment, Inventory};
pub use item::{EquipmentSlot, Item, ItemKind, Rarity};
pub use store::{GameStore, StoreError};
