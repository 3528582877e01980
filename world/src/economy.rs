//! Gold, lives and the rules that pay them out.

use realm_defence_core::{BuildError, EconomyConfig, ElementError, UpgradeError};

use crate::towers::TowerRegistry;

/// Gold and lives held by the player.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Treasury {
    gold: u32,
    lives: u32,
    fraction: f32,
}

impl Treasury {
    pub(crate) fn new(economy: &EconomyConfig) -> Self {
        Self {
            gold: economy.starting_gold,
            lives: economy.starting_lives,
            fraction: 0.0,
        }
    }

    pub(crate) fn gold(&self) -> u32 {
        self.gold
    }

    pub(crate) fn lives(&self) -> u32 {
        self.lives
    }

    pub(crate) fn earn(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Adds fractional gold, paying out whole coins as they accumulate.
    /// Returns the number of whole coins earned.
    pub(crate) fn accrue(&mut self, amount: f32) -> u32 {
        if amount <= 0.0 {
            return 0;
        }
        self.fraction += amount;
        let whole = self.fraction.floor();
        self.fraction -= whole;
        let coins = whole as u32;
        self.earn(coins);
        coins
    }

    /// Reports the shortfall if `cost` cannot be paid right now.
    pub(crate) fn ensure(&self, cost: u32) -> Result<(), Shortfall> {
        if self.gold < cost {
            return Err(Shortfall {
                required: cost,
                available: self.gold,
            });
        }
        Ok(())
    }

    /// Deducts `cost` or reports the shortfall without touching the balance.
    pub(crate) fn spend(&mut self, cost: u32) -> Result<(), Shortfall> {
        self.ensure(cost)?;
        self.gold -= cost;
        Ok(())
    }

    /// Removes one life and returns how many remain.
    pub(crate) fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }
}

/// Gold missing for a purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Shortfall {
    pub(crate) required: u32,
    pub(crate) available: u32,
}

impl From<Shortfall> for BuildError {
    fn from(shortfall: Shortfall) -> Self {
        BuildError::InsufficientGold {
            required: shortfall.required,
            available: shortfall.available,
        }
    }
}

impl From<Shortfall> for UpgradeError {
    fn from(shortfall: Shortfall) -> Self {
        UpgradeError::InsufficientGold {
            required: shortfall.required,
            available: shortfall.available,
        }
    }
}

impl From<Shortfall> for ElementError {
    fn from(shortfall: Shortfall) -> Self {
        ElementError::InsufficientGold {
            required: shortfall.required,
            available: shortfall.available,
        }
    }
}

/// Economy bonuses contributed by every standing tower.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct EconomyModifiers {
    pub(crate) interest_rate: f32,
    pub(crate) wave_bonus: u32,
    pub(crate) kill_bonus: u32,
    pub(crate) double_gold_chance: f32,
    pub(crate) lifesteal: f32,
    pub(crate) gold_damage_bonus: f32,
    pub(crate) gold_steal: u32,
}

impl EconomyModifiers {
    /// Folds tower abilities into economy-wide modifiers.
    ///
    /// The interest rate is the best treasury rate (never below the base
    /// rate) plus every flat interest bonus. Lifesteal here only counts
    /// towers that never attack; attacking towers drain for themselves.
    pub(crate) fn collect(economy: &EconomyConfig, towers: &TowerRegistry) -> Self {
        let mut best_interest = economy.interest_rate;
        let mut modifiers = Self {
            double_gold_chance: economy.double_gold_chance,
            ..Self::default()
        };
        for tower in towers.iter() {
            let abilities = &tower.abilities;
            best_interest = best_interest.max(abilities.interest);
            modifiers.interest_rate += abilities.interest_bonus;
            modifiers.wave_bonus += abilities.wave_bonus;
            modifiers.kill_bonus += abilities.kill_bonus;
            modifiers.double_gold_chance += abilities.double_gold;
            modifiers.gold_damage_bonus =
                modifiers.gold_damage_bonus.max(abilities.gold_damage_bonus);
            modifiers.gold_steal += abilities.gold_steal;
            if !tower.attacks {
                modifiers.lifesteal += abilities.lifesteal;
            }
        }
        modifiers.interest_rate += best_interest;
        modifiers
    }

    /// Flat damage every tower gains from the gold currently held.
    pub(crate) fn flat_damage(&self, gold: u32) -> f32 {
        (f64::from(gold) * f64::from(self.gold_damage_bonus)).floor() as f32
    }
}

/// Interest paid after completing `wave`, capped by wave tier.
pub(crate) fn interest(economy: &EconomyConfig, gold: u32, rate: f32, wave: u32) -> u32 {
    let interval = economy.interest_cap_interval.max(1);
    let cap = economy
        .interest_base_cap
        .saturating_add((wave / interval).saturating_mul(economy.interest_cap_step));
    let earned = (f64::from(gold) * f64::from(rate)).floor();
    let earned = if earned.is_finite() && earned > 0.0 {
        earned.min(f64::from(u32::MAX)) as u32
    } else {
        0
    };
    earned.min(cap)
}

/// Completion reward: the wave's own bonus, or the linear fallback.
pub(crate) fn completion_reward(economy: &EconomyConfig, wave: u32, bonus: Option<u32>) -> u32 {
    bonus.unwrap_or_else(|| {
        economy
            .fallback_reward_base
            .saturating_add(economy.fallback_reward_per_wave.saturating_mul(wave))
    })
}

pub(crate) fn milestone_bonus(economy: &EconomyConfig, wave: u32) -> u32 {
    economy
        .milestone_bonuses
        .iter()
        .filter(|milestone| milestone.wave == wave)
        .map(|milestone| milestone.gold)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_defence_core::{CellCoord, GameConfig, TowerKind, WorldPoint};

    #[test]
    fn spending_is_atomic() {
        let mut treasury = Treasury::new(&EconomyConfig::default());
        assert_eq!(treasury.spend(40), Ok(()));
        assert_eq!(treasury.gold(), 160);
        assert_eq!(
            treasury.spend(500),
            Err(Shortfall {
                required: 500,
                available: 160,
            })
        );
        assert_eq!(treasury.gold(), 160);
    }

    #[test]
    fn fractional_gold_accumulates() {
        let mut treasury = Treasury::new(&EconomyConfig::default());
        assert_eq!(treasury.accrue(0.6), 0);
        assert_eq!(treasury.accrue(0.6), 1);
        assert_eq!(treasury.gold(), 201);
    }

    #[test]
    fn interest_is_capped_by_wave_tier() {
        let economy = EconomyConfig::default();
        assert_eq!(interest(&economy, 160, 0.1, 1), 16);
        assert_eq!(interest(&economy, 2000, 0.1, 1), 50);
        assert_eq!(interest(&economy, 2000, 0.1, 5), 75);
        assert_eq!(interest(&economy, 2000, 0.1, 12), 100);
    }

    #[test]
    fn rewards_fall_back_to_linear_formula() {
        let economy = EconomyConfig::default();
        assert_eq!(completion_reward(&economy, 3, None), 80);
        assert_eq!(completion_reward(&economy, 3, Some(25)), 25);
        assert_eq!(milestone_bonus(&economy, 5), 100);
        assert_eq!(milestone_bonus(&economy, 10), 200);
        assert_eq!(milestone_bonus(&economy, 7), 0);
    }

    #[test]
    fn lives_never_underflow() {
        let mut treasury = Treasury::new(&EconomyConfig {
            starting_lives: 1,
            ..EconomyConfig::default()
        });
        assert_eq!(treasury.lose_life(), 0);
        assert_eq!(treasury.lose_life(), 0);
    }

    #[test]
    fn vault_tiers_raise_interest_and_kill_bonus() {
        let config = GameConfig::default();
        let mut towers = TowerRegistry::new();
        let vault = towers.insert(
            config.tower(TowerKind::Vault).expect("vault configured"),
            CellCoord::new(0, 0),
            WorldPoint::default(),
        );
        let state = towers.get_mut(vault).expect("vault exists");
        state.abilities.interest = 0.25;
        state.abilities.interest_bonus = 0.05;
        state.abilities.kill_bonus = 4;
        state.abilities.lifesteal = 0.05;

        let modifiers = EconomyModifiers::collect(&config.economy, &towers);
        assert!((modifiers.interest_rate - 0.30).abs() < 1e-6);
        assert_eq!(modifiers.kill_bonus, 4);
        assert!((modifiers.lifesteal - 0.05).abs() < 1e-6);
    }

    #[test]
    fn gold_scaled_damage_is_whole() {
        let modifiers = EconomyModifiers {
            gold_damage_bonus: 0.01,
            ..EconomyModifiers::default()
        };
        assert_eq!(modifiers.flat_damage(250), 2.0);
    }
}
