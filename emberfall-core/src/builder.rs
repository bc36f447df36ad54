//! Character creation form: class selection and stat allocation.
//!
//! Mirrors the interactive creation screen: picking a class seeds the four
//! attributes from its base line, and a pool of allocation points can be
//! spent one at a time on top of them. `build` validates the form and
//! produces a [`HeroDraft`] for the store to persist (the store enforces
//! name uniqueness on insert).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hero::{ClassId, HeroClass};

/// Points available to spend during creation.
pub const ALLOCATION_POINTS: i32 = 10;

/// The four allocatable attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Strength,
    Constitution,
    Agility,
    Intelligence,
}

impl Stat {
    pub const ALL: [Stat; 4] = [
        Stat::Strength,
        Stat::Constitution,
        Stat::Agility,
        Stat::Intelligence,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stat::Strength => "strength",
            Stat::Constitution => "constitution",
            Stat::Agility => "agility",
            Stat::Intelligence => "intelligence",
        }
    }
}

/// Validation failures from the creation form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("a name is required")]
    MissingName,

    #[error("a class must be selected")]
    MissingClass,

    #[error("all allocation points must be spent ({0} remaining)")]
    UnspentPoints(i32),
}

/// A validated character ready to be inserted into the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroDraft {
    pub name: String,
    pub class_id: ClassId,
    pub strength: i32,
    pub constitution: i32,
    pub agility: i32,
    pub intelligence: i32,
}

/// The character creation form.
#[derive(Debug, Clone, Default)]
pub struct CharacterForm {
    name: String,
    class: Option<HeroClass>,
    strength: i32,
    constitution: i32,
    agility: i32,
    intelligence: i32,
    strength_mod: i32,
    constitution_mod: i32,
    agility_mod: i32,
    intelligence_mod: i32,
    points_available: i32,
}

impl CharacterForm {
    pub fn new() -> Self {
        Self {
            points_available: ALLOCATION_POINTS,
            ..Self::default()
        }
    }

    /// Start from a class, seeding base stats immediately.
    pub fn for_class(class: &HeroClass) -> Self {
        let mut form = Self::new();
        form.select_class(class);
        form
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Select a class, re-seeding the base attribute line.
    ///
    /// Spent points are kept; they apply on top of the new base.
    pub fn select_class(&mut self, class: &HeroClass) {
        self.strength = class.base_strength;
        self.constitution = class.base_constitution;
        self.agility = class.base_agility;
        self.intelligence = class.base_intelligence;
        self.class = Some(class.clone());
    }

    fn stat_mod(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Strength => &mut self.strength_mod,
            Stat::Constitution => &mut self.constitution_mod,
            Stat::Agility => &mut self.agility_mod,
            Stat::Intelligence => &mut self.intelligence_mod,
        }
    }

    /// Spend one point on a stat. No-op when the pool is empty.
    pub fn increase_stat(&mut self, stat: Stat) {
        if self.points_available > 0 {
            self.points_available -= 1;
            *self.stat_mod(stat) += 1;
        }
    }

    /// Refund one point from a stat. No-op when nothing was spent on it.
    pub fn decrease_stat(&mut self, stat: Stat) {
        if *self.stat_mod(stat) > 0 {
            *self.stat_mod(stat) -= 1;
            self.points_available += 1;
        }
    }

    /// Spend several points on a stat at once (capped by the pool).
    pub fn allocate(&mut self, stat: Stat, points: i32) {
        for _ in 0..points.max(0) {
            self.increase_stat(stat);
        }
    }

    pub fn points_available(&self) -> i32 {
        self.points_available
    }

    pub fn strength_total(&self) -> i32 {
        self.strength + self.strength_mod
    }

    pub fn constitution_total(&self) -> i32 {
        self.constitution + self.constitution_mod
    }

    pub fn agility_total(&self) -> i32 {
        self.agility + self.agility_mod
    }

    pub fn intelligence_total(&self) -> i32 {
        self.intelligence + self.intelligence_mod
    }

    pub fn selected_class(&self) -> Option<&HeroClass> {
        self.class.as_ref()
    }

    /// Check the form without consuming it, collecting every failure.
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FormError::MissingName);
        }
        if self.class.is_none() {
            errors.push(FormError::MissingClass);
        }
        if self.points_available != 0 {
            errors.push(FormError::UnspentPoints(self.points_available));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and produce a draft for the store.
    pub fn build(&self) -> Result<HeroDraft, Vec<FormError>> {
        self.validate()?;
        // validate() guarantees the class is present
        let class = self.class.as_ref().ok_or_else(|| vec![FormError::MissingClass])?;
        Ok(HeroDraft {
            name: self.name.trim().to_string(),
            class_id: class.id,
            strength: self.strength_total(),
            constitution: self.constitution_total(),
            agility: self.agility_total(),
            intelligence: self.intelligence_total(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mage() -> HeroClass {
        let mut class = HeroClass::new("Mage", "A wielder of the arcane.")
            .with_base_stats(80, 8, 8, 10, 16);
        class.id = 2;
        class
    }

    fn spend_all(form: &mut CharacterForm) {
        form.allocate(Stat::Constitution, ALLOCATION_POINTS);
    }

    #[test]
    fn class_selection_seeds_base_stats() {
        let form = CharacterForm::for_class(&mage());
        assert_eq!(form.strength_total(), 8);
        assert_eq!(form.intelligence_total(), 16);
        assert_eq!(form.points_available(), ALLOCATION_POINTS);
    }

    #[test]
    fn point_pool_is_bounded() {
        let mut form = CharacterForm::for_class(&mage());
        for _ in 0..20 {
            form.increase_stat(Stat::Strength);
        }
        assert_eq!(form.points_available(), 0);
        assert_eq!(form.strength_total(), 8 + ALLOCATION_POINTS);

        for _ in 0..20 {
            form.decrease_stat(Stat::Strength);
        }
        assert_eq!(form.points_available(), ALLOCATION_POINTS);
        assert_eq!(form.strength_total(), 8);
    }

    #[test]
    fn decrease_without_spend_is_noop() {
        let mut form = CharacterForm::for_class(&mage());
        form.decrease_stat(Stat::Agility);
        assert_eq!(form.points_available(), ALLOCATION_POINTS);
        assert_eq!(form.agility_total(), 10);
    }

    #[test]
    fn reselecting_class_keeps_spent_points() {
        let mut form = CharacterForm::for_class(&mage());
        form.allocate(Stat::Strength, 3);
        let warrior = HeroClass::new("Warrior", "Strong.").with_base_stats(120, 14, 12, 10, 6);
        form.select_class(&warrior);
        assert_eq!(form.strength_total(), 14 + 3);
        assert_eq!(form.points_available(), ALLOCATION_POINTS - 3);
    }

    #[test]
    fn validation_collects_all_errors() {
        let form = CharacterForm::new();
        let errors = form.validate().unwrap_err();
        assert!(errors.contains(&FormError::MissingName));
        assert!(errors.contains(&FormError::MissingClass));
        assert!(errors.contains(&FormError::UnspentPoints(ALLOCATION_POINTS)));
    }

    #[test]
    fn build_produces_totals() {
        let mut form = CharacterForm::for_class(&mage());
        form.set_name("Eldrin");
        form.allocate(Stat::Intelligence, 6);
        form.allocate(Stat::Constitution, 4);
        let draft = form.build().expect("form should validate");
        assert_eq!(draft.name, "Eldrin");
        assert_eq!(draft.class_id, 2);
        assert_eq!(draft.intelligence, 22);
        assert_eq!(draft.constitution, 12);
    }

    #[test]
    fn build_rejects_unspent_points() {
        let mut form = CharacterForm::for_class(&mage());
        form.set_name("Eldrin");
        form.allocate(Stat::Strength, 9);
        let errors = form.build().unwrap_err();
        assert_eq!(errors, vec![FormError::UnspentPoints(1)]);
        spend_all(&mut form);
        assert!(form.build().is_ok());
    }
}
