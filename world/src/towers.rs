//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use realm_defence_core::{
    CellCoord, DamageType, Element, ElementError, EnemyId, TowerId, TowerKind, TowerSnapshot,
    TowerStats, UpgradeBranch, UpgradeError, UpgradeTier, WorldPoint,
};

/// Special abilities accumulated from upgrade and elemental tiers.
///
/// Optional tier values keep the strongest value seen so far; additive tier
/// values are summed.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TowerAbilities {
    pub(crate) can_target_flying: bool,
    pub(crate) crit_chance: f32,
    pub(crate) armor_penetration: f32,
    pub(crate) splash_radius: f32,
    pub(crate) multi_target: u32,
    pub(crate) ricochet_targets: u32,
    pub(crate) poison_dps: f32,
    pub(crate) poison_duration: f32,
    pub(crate) poison_explodes: bool,
    pub(crate) slow: f32,
    pub(crate) slow_duration: f32,
    pub(crate) armor_reduction: f32,
    pub(crate) chain_targets: u32,
    pub(crate) stun_duration: f32,
    pub(crate) stun_chance: f32,
    pub(crate) freeze_chance: f32,
    pub(crate) freeze_duration: f32,
    pub(crate) bonus_vs_frozen: f32,
    pub(crate) fire_damage: f32,
    pub(crate) burn_duration: f32,
    pub(crate) aura_speed: f32,
    pub(crate) aura_damage: f32,
    pub(crate) aura_range: f32,
    pub(crate) global_aura: bool,
    pub(crate) income: u32,
    pub(crate) interest: f32,
    pub(crate) interest_bonus: f32,
    pub(crate) wave_bonus: u32,
    pub(crate) kill_bonus: u32,
    pub(crate) double_gold: f32,
    pub(crate) lifesteal: f32,
    pub(crate) gold_damage_bonus: f32,
    pub(crate) gold_steal: u32,
}

impl TowerAbilities {
    fn absorb(&mut self, tier: &UpgradeTier) {
        fn keep_max(slot: &mut f32, value: Option<f32>) {
            if let Some(value) = value {
                *slot = slot.max(value);
            }
        }
        fn keep_max_count(slot: &mut u32, value: Option<u32>) {
            if let Some(value) = value {
                *slot = (*slot).max(value);
            }
        }

        self.can_target_flying |= tier.can_target_flying;
        self.poison_explodes |= tier.poison_explodes;
        self.global_aura |= tier.global_aura;

        keep_max(&mut self.crit_chance, tier.crit_chance);
        keep_max(&mut self.armor_penetration, tier.armor_penetration);
        keep_max(&mut self.splash_radius, tier.splash_radius);
        keep_max_count(&mut self.multi_target, tier.multi_target);
        keep_max_count(&mut self.ricochet_targets, tier.ricochet_targets);
        keep_max(&mut self.poison_dps, tier.poison_dps);
        keep_max(&mut self.poison_duration, tier.poison_duration);
        keep_max(&mut self.slow, tier.slow);
        keep_max(&mut self.slow_duration, tier.slow_duration);
        keep_max(&mut self.armor_reduction, tier.armor_reduction);
        keep_max_count(&mut self.chain_targets, tier.chain_targets);
        keep_max(&mut self.stun_duration, tier.stun_duration);
        keep_max(&mut self.stun_chance, tier.stun_chance);
        keep_max(&mut self.freeze_chance, tier.freeze_chance);
        keep_max(&mut self.freeze_duration, tier.freeze_duration);
        keep_max(&mut self.bonus_vs_frozen, tier.bonus_vs_frozen);
        keep_max(&mut self.burn_duration, tier.burn_duration);
        keep_max(&mut self.aura_speed, tier.aura_speed);
        keep_max(&mut self.aura_damage, tier.aura_damage);
        keep_max(&mut self.aura_range, tier.aura_range);
        keep_max(&mut self.interest, tier.interest);
        keep_max_count(&mut self.kill_bonus, tier.kill_bonus);
        keep_max(&mut self.double_gold, tier.double_gold);
        keep_max(&mut self.lifesteal, tier.lifesteal);
        keep_max(&mut self.gold_damage_bonus, tier.gold_damage_bonus);

        self.fire_damage += tier.fire_damage;
        self.income += tier.income;
        self.interest_bonus += tier.interest_bonus;
        self.wave_bonus += tier.wave_bonus;
        self.gold_steal += tier.gold_steal;
    }

    fn has_aura(&self) -> bool {
        self.aura_speed > 0.0 || self.aura_damage > 0.0 || self.aura_range > 0.0
    }
}

/// Bonuses granted by auras and the treasury, rebuilt every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct AuraBonus {
    pub(crate) speed: f32,
    pub(crate) damage: f32,
    pub(crate) range: f32,
    pub(crate) flat_damage: f32,
}

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Cell occupied by the tower.
    pub(crate) cell: CellCoord,
    pub(crate) position: WorldPoint,
    pub(crate) level: u8,
    pub(crate) branch: Option<UpgradeBranch>,
    pub(crate) total_invested: u32,
    pub(crate) damage_type: DamageType,
    pub(crate) attacks: bool,
    base_damage: f32,
    base_attack_speed: f32,
    base_range: f32,
    pub(crate) abilities: TowerAbilities,
    pub(crate) aura: AuraBonus,
    pub(crate) cooldown: f32,
    pub(crate) target: Option<EnemyId>,
    pub(crate) income_timer: f32,
    elemental_tiers: BTreeMap<Element, u8>,
}

impl TowerState {
    fn new(id: TowerId, stats: &TowerStats, cell: CellCoord, position: WorldPoint) -> Self {
        Self {
            id,
            kind: stats.kind,
            cell,
            position,
            level: 1,
            branch: None,
            total_invested: stats.cost,
            damage_type: stats.damage_type,
            attacks: stats.attacks,
            base_damage: stats.damage,
            base_attack_speed: stats.attack_speed,
            base_range: stats.range,
            abilities: TowerAbilities {
                income: stats.income,
                ..TowerAbilities::default()
            },
            aura: AuraBonus::default(),
            cooldown: 0.0,
            target: None,
            income_timer: 0.0,
            elemental_tiers: BTreeMap::new(),
        }
    }

    /// Damage per hit including auras and the treasury bonus.
    pub(crate) fn effective_damage(&self) -> f32 {
        self.base_damage * (1.0 + self.aura.damage) + self.aura.flat_damage
    }

    pub(crate) fn effective_attack_speed(&self) -> f32 {
        self.base_attack_speed * (1.0 + self.aura.speed)
    }

    pub(crate) fn effective_range(&self) -> f32 {
        self.base_range * (1.0 + self.aura.range)
    }

    pub(crate) fn ready(&self) -> bool {
        self.attacks && self.cooldown <= 0.0
    }

    /// Seconds between attacks at the current attack speed.
    pub(crate) fn attack_interval(&self) -> f32 {
        let speed = self.effective_attack_speed();
        if speed > 0.0 {
            1.0 / speed
        } else {
            f32::INFINITY
        }
    }

    /// Gold returned when the tower is sold. The ratio is applied in whole
    /// percent so that `floor(0.7 × invested)` is exact.
    pub(crate) fn sell_value(&self, ratio: f32) -> u32 {
        let percent = (ratio.clamp(0.0, 1.0) * 100.0).round() as u64;
        let refund = u64::from(self.total_invested) * percent / 100;
        u32::try_from(refund).unwrap_or(u32::MAX)
    }

    /// Finds the tier the next upgrade on `branch` would apply.
    pub(crate) fn next_upgrade<'a>(
        &self,
        branch: UpgradeBranch,
        stats: &'a TowerStats,
        max_level: u8,
    ) -> Result<&'a UpgradeTier, UpgradeError> {
        if self.level >= max_level {
            return Err(UpgradeError::MaxLevelReached);
        }
        if let Some(locked) = self.branch {
            if locked != branch {
                return Err(UpgradeError::BranchConflict { locked });
            }
        }
        let tier_index = usize::from(self.level.saturating_sub(1));
        stats
            .branches
            .get(branch.index())
            .and_then(|spec| spec.tiers.get(tier_index))
            .ok_or(UpgradeError::MaxLevelReached)
    }

    pub(crate) fn apply_upgrade(&mut self, branch: UpgradeBranch, tier: &UpgradeTier) {
        self.branch = Some(branch);
        self.level = self.level.saturating_add(1);
        self.total_invested = self.total_invested.saturating_add(tier.cost);
        self.absorb(tier);
    }

    /// Finds the next tier of an elemental branch.
    pub(crate) fn next_elemental<'a>(
        &self,
        element: Element,
        stats: &'a TowerStats,
    ) -> Result<&'a UpgradeTier, ElementError> {
        let applied = usize::from(self.elemental_tier(element));
        stats
            .elemental(element)
            .and_then(|spec| spec.tiers.get(applied))
            .ok_or(ElementError::MaxTierReached)
    }

    /// Applies an elemental tier and returns the number of tiers now held.
    pub(crate) fn apply_elemental(&mut self, element: Element, tier: &UpgradeTier) -> u8 {
        let applied = self.elemental_tiers.entry(element).or_insert(0);
        *applied = applied.saturating_add(1);
        let now = *applied;
        self.total_invested = self.total_invested.saturating_add(tier.cost);
        self.absorb(tier);
        now
    }

    pub(crate) fn elemental_tier(&self, element: Element) -> u8 {
        self.elemental_tiers.get(&element).copied().unwrap_or(0)
    }

    fn absorb(&mut self, tier: &UpgradeTier) {
        self.base_damage += tier.damage;
        self.base_attack_speed += tier.attack_speed;
        self.base_range += tier.range;
        self.abilities.absorb(tier);
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            level: self.level,
            branch: self.branch,
            total_invested: self.total_invested,
            attacks: self.attacks,
            damage: self.effective_damage(),
            range: self.effective_range(),
            can_target_flying: self.abilities.can_target_flying,
            ready: self.ready(),
            target: self.target,
            multi_target: self.abilities.multi_target.max(1),
            chain_targets: self.abilities.chain_targets,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Identifier the next inserted tower will receive.
    pub(crate) fn peek_id(&self) -> TowerId {
        self.next_tower_id
    }

    pub(crate) fn insert(
        &mut self,
        stats: &TowerStats,
        cell: CellCoord,
        position: WorldPoint,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self
            .entries
            .insert(id, TowerState::new(id, stats, cell, position));
        id
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }

    pub(crate) fn count_of(&self, kind: TowerKind) -> usize {
        self.entries.values().filter(|tower| tower.kind == kind).count()
    }

    /// Rebuilds every tower's aura bonuses from scratch.
    pub(crate) fn recompute_auras(&mut self, radius: f32, flat_damage: f32) {
        let sources: Vec<(WorldPoint, bool, f32, f32, f32)> = self
            .entries
            .values()
            .filter(|tower| tower.abilities.has_aura())
            .map(|tower| {
                (
                    tower.position,
                    tower.abilities.global_aura,
                    tower.abilities.aura_speed,
                    tower.abilities.aura_damage,
                    tower.abilities.aura_range,
                )
            })
            .collect();

        for tower in self.entries.values_mut() {
            let mut bonus = AuraBonus {
                flat_damage,
                ..AuraBonus::default()
            };
            for (origin, global, speed, damage, range) in &sources {
                if *global || origin.distance(tower.position) <= radius {
                    bonus.speed += speed;
                    bonus.damage += damage;
                    bonus.range += range;
                }
            }
            tower.aura = bonus;
        }
    }
}
