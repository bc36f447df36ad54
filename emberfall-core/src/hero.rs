//! Hero and hero-class records with their derived stats.
//!
//! A [`Hero`] is a persisted player character: identity, level and
//! experience, four attribute scores, and health/mana pools. Derived values
//! (max health, regeneration rates, progress percentages) are computed from
//! the attributes rather than stored, except for `max_health`, which is
//! cached on the record so the healing daemon can clamp against it without
//! a class lookup.

use serde::{Deserialize, Serialize};

use crate::inventory::InventoryId;

pub type HeroId = u64;
pub type ClassId = u64;

/// Experience required per level: 100 XP times the current level.
pub const XP_PER_LEVEL: i32 = 100;

/// A class template applied at character creation.
///
/// Once a hero references a class, the class is immutable; the store
/// enforces this. There is no cascading recompute of existing heroes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroClass {
    pub id: ClassId,
    pub name: String,
    pub description: String,
    pub base_health: i32,
    pub base_strength: i32,
    pub base_constitution: i32,
    pub base_agility: i32,
    pub base_intelligence: i32,
}

impl HeroClass {
    /// Create a class with the default stat line (100 HP, 10 in everything).
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
            base_health: 100,
            base_strength: 10,
            base_constitution: 10,
            base_agility: 10,
            base_intelligence: 10,
        }
    }

    /// Override the base stat line.
    pub fn with_base_stats(
        mut self,
        health: i32,
        strength: i32,
        constitution: i32,
        agility: i32,
        intelligence: i32,
    ) -> Self {
        self.base_health = health;
        self.base_strength = strength;
        self.base_constitution = constitution;
        self.base_agility = agility;
        self.base_intelligence = intelligence;
        self
    }
}

/// A player-controlled character record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hero {
    pub id: HeroId,
    pub name: String,
    pub level: i32,
    pub experience: i32,
    pub class_id: ClassId,

    pub strength: i32,
    pub constitution: i32,
    pub agility: i32,
    pub intelligence: i32,

    pub max_health: i32,
    pub current_health: i32,
    pub max_mana: i32,
    pub current_mana: i32,

    pub in_combat: bool,
    pub inventory_id: InventoryId,
}

impl Hero {
    /// Max health from class base, constitution, and level:
    /// base + (CON - 10) * 2 + (level - 1) * 5.
    pub fn calculate_max_health(&self, base_health: i32) -> i32 {
        let constitution_bonus = (self.constitution - 10) * 2;
        let level_bonus = (self.level - 1) * 5;
        base_health + constitution_bonus + level_bonus
    }

    /// Recompute max health from the class base and restore to full.
    pub fn update_health(&mut self, base_health: i32) {
        self.max_health = self.calculate_max_health(base_health);
        self.current_health = self.max_health;
    }

    /// XP needed to reach the next level.
    pub fn next_level_xp(&self) -> i32 {
        XP_PER_LEVEL * self.level
    }

    /// Progress toward the next level, clamped to 100.
    pub fn experience_percentage(&self) -> f64 {
        let next = self.next_level_xp();
        if next <= 0 {
            return 0.0;
        }
        (f64::from(self.experience) / f64::from(next) * 100.0).min(100.0)
    }

    pub fn health_percentage(&self) -> f64 {
        if self.max_health <= 0 {
            return 0.0;
        }
        f64::from(self.current_health) / f64::from(self.max_health) * 100.0
    }

    pub fn mana_percentage(&self) -> f64 {
        if self.max_mana <= 0 {
            return 0.0;
        }
        f64::from(self.current_mana) / f64::from(self.max_mana) * 100.0
    }

    /// HP regenerated per tick: 5 base, +1 per 2 points of CON above 10.
    pub fn health_regeneration_rate(&self) -> i32 {
        if self.constitution <= 10 {
            5
        } else {
            5 + (self.constitution - 10) / 2
        }
    }

    /// MP regenerated per tick: 5 base, +1 per 2 points of INT above 10.
    pub fn mana_regeneration_rate(&self) -> i32 {
        if self.intelligence <= 10 {
            5
        } else {
            5 + (self.intelligence - 10) / 2
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current_health <= 0
    }

    pub fn is_full_health(&self) -> bool {
        self.current_health >= self.max_health
    }

    /// Apply damage, flooring at zero.
    ///
    /// Returns true when a healing loop should start: the hero survived and
    /// is below max health.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.current_health = (self.current_health - amount.max(0)).max(0);
        self.current_health > 0 && self.current_health < self.max_health
    }

    /// Restore health, capped at max.
    pub fn heal(&mut self, amount: i32) {
        self.current_health = (self.current_health + amount.max(0)).min(self.max_health);
    }

    /// Restore mana, capped at max.
    pub fn restore_mana(&mut self, amount: i32) {
        self.current_mana = (self.current_mana + amount.max(0)).min(self.max_mana);
    }

    /// Add experience, leveling up at each threshold.
    ///
    /// Max health is recomputed on level-up; current health keeps its value
    /// (clamped into the new range). Returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: i32, base_health: i32) -> i32 {
        self.experience += amount.max(0);
        let mut levels = 0;
        while self.experience >= self.next_level_xp() {
            self.experience -= self.next_level_xp();
            self.level += 1;
            levels += 1;
        }
        if levels > 0 {
            self.max_health = self.calculate_max_health(base_health);
            self.current_health = self.current_health.min(self.max_health);
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warrior_class() -> HeroClass {
        HeroClass::new("Warrior", "A brave warrior.")
    }

    fn test_hero(class: &HeroClass) -> Hero {
        let mut hero = Hero {
            id: 1,
            name: "Test Hero".to_string(),
            level: 1,
            experience: 0,
            class_id: class.id,
            strength: 10,
            constitution: 10,
            agility: 10,
            intelligence: 10,
            max_health: 100,
            current_health: 100,
            max_mana: 50,
            current_mana: 50,
            in_combat: false,
            inventory_id: 1,
        };
        hero.update_health(class.base_health);
        hero
    }

    #[test]
    fn calculate_max_health_formula() {
        let class = warrior_class();
        let hero = test_hero(&class);
        let expected = class.base_health + (hero.constitution - 10) * 2 + (hero.level - 1) * 5;
        assert_eq!(hero.calculate_max_health(class.base_health), expected);
    }

    #[test]
    fn update_health_restores_to_new_max() {
        let class = warrior_class();
        let mut hero = test_hero(&class);
        hero.constitution = 15;
        hero.level = 3;
        hero.update_health(class.base_health);
        assert_eq!(hero.max_health, 100 + 10 + 10);
        assert_eq!(hero.current_health, hero.max_health);
    }

    #[test]
    fn experience_percentage_clamps() {
        let class = warrior_class();
        let mut hero = test_hero(&class);
        hero.experience = 50;
        assert_eq!(hero.experience_percentage(), 50.0);
        hero.experience = 150;
        assert_eq!(hero.experience_percentage(), 100.0);
        hero.experience = 0;
        assert_eq!(hero.experience_percentage(), 0.0);
        hero.level = 0;
        assert_eq!(hero.experience_percentage(), 0.0);
    }

    #[test]
    fn health_percentage_guards_zero_max() {
        let class = warrior_class();
        let mut hero = test_hero(&class);
        hero.max_health = 200;
        hero.current_health = 100;
        assert_eq!(hero.health_percentage(), 50.0);
        hero.current_health = 0;
        assert_eq!(hero.health_percentage(), 0.0);
        hero.max_health = 0;
        assert_eq!(hero.health_percentage(), 0.0);
    }

    #[test]
    fn take_damage_floors_at_zero() {
        let class = warrior_class();
        let mut hero = test_hero(&class);
        let initial = hero.current_health;
        assert!(hero.take_damage(20));
        assert_eq!(hero.current_health, initial - 20);
        assert!(!hero.take_damage(500));
        assert_eq!(hero.current_health, 0);
    }

    #[test]
    fn take_damage_at_full_health_is_noop() {
        let class = warrior_class();
        let mut hero = test_hero(&class);
        assert!(!hero.take_damage(0));
        assert_eq!(hero.current_health, hero.max_health);
    }

    #[test]
    fn heal_caps_at_max() {
        let class = warrior_class();
        let mut hero = test_hero(&class);
        hero.current_health = 50;
        hero.heal(30);
        assert_eq!(hero.current_health, 80);
        hero.heal(500);
        assert_eq!(hero.current_health, hero.max_health);
    }

    #[test]
    fn regeneration_rates_scale_with_stats() {
        let class = warrior_class();
        let mut hero = test_hero(&class);
        assert_eq!(hero.health_regeneration_rate(), 5);
        hero.constitution = 14;
        assert_eq!(hero.health_regeneration_rate(), 7);
        hero.intelligence = 8;
        assert_eq!(hero.mana_regeneration_rate(), 5);
        hero.intelligence = 16;
        assert_eq!(hero.mana_regeneration_rate(), 8);
    }

    #[test]
    fn gain_experience_levels_up() {
        let class = warrior_class();
        let mut hero = test_hero(&class);
        assert_eq!(hero.gain_experience(50, class.base_health), 0);
        assert_eq!(hero.level, 1);
        // 100 needed for level 2, then 200 for level 3.
        assert_eq!(hero.gain_experience(260, class.base_health), 2);
        assert_eq!(hero.level, 3);
        assert_eq!(hero.experience, 10);
        assert_eq!(hero.max_health, hero.calculate_max_health(class.base_health));
        assert!(hero.current_health <= hero.max_health);
    }
}
