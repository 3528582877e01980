//! Damage-type versus armor-type effectiveness.

use serde::{Deserialize, Serialize};

/// Classes of damage a tower can deal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DamageType {
    /// Arrows and blades; blunted by heavy armor, useless against ethereal foes.
    Physical,
    /// Arcane energy; pierces heavy armor but fizzles on magic-immune foes.
    Magic,
    /// Unmitigated damage used by damage-over-time effects.
    Pure,
}

/// Armor classes carried by enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArmorType {
    /// Cloth and leather.
    Light,
    /// Plate.
    Heavy,
    /// Warded against spells.
    MagicImmune,
    /// Incorporeal.
    Ethereal,
}

/// Returns the multiplier applied when `damage` strikes `armor`.
///
/// Combinations that carry no explicit entry resolve to `1.0`.
#[must_use]
pub fn damage_multiplier(damage: DamageType, armor: ArmorType) -> f32 {
    match (damage, armor) {
        (DamageType::Physical, ArmorType::Heavy) => 0.5,
        (DamageType::Physical, ArmorType::Ethereal) => 0.0,
        (DamageType::Magic, ArmorType::Heavy) => 1.5,
        (DamageType::Magic, ArmorType::MagicImmune) => 0.0,
        (DamageType::Magic, ArmorType::Ethereal) => 1.25,
        _ => 1.0,
    }
}

/// Applies armor penetration to a base multiplier.
///
/// Penetration closes the gap between a sub-unity multiplier and `1.0` by the
/// given fraction. Immunities (a multiplier of zero) and bonuses are untouched.
#[must_use]
pub fn penetrated_multiplier(multiplier: f32, penetration: f32) -> f32 {
    if multiplier <= 0.0 || multiplier >= 1.0 {
        return multiplier;
    }
    let penetration = penetration.clamp(0.0, 1.0);
    multiplier + (1.0 - multiplier) * penetration
}
