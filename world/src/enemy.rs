//! Enemy entities: health, movement along a route and per-kind abilities.

use realm_defence_core::{
    damage_multiplier, penetrated_multiplier, ArmorType, DamageType, EnemyAbility, EnemyId,
    EnemyKind, EnemySnapshot, EnemyStats, EnemyTuning, WorldPoint,
};

use crate::status::StatusEffects;

/// Lifecycle of an enemy. `Dead` and `Exited` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnemyState {
    Alive,
    Dead,
    Exited,
}

/// Side effects an enemy asks the world to carry out after its update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnemyAction {
    /// Announce an ability that needs no further handling.
    Announce(EnemyAbility),
    /// Hasten every other living enemy near the roaring one.
    Roar,
    /// Bring new enemies onto the field at the summoner's position.
    Summon {
        kind: EnemyKind,
        count: u32,
        ability: EnemyAbility,
    },
    /// Shake towers near the enemy.
    Earthquake,
    /// Damage over time finished the enemy off.
    Killed,
    /// The enemy crossed its final waypoint.
    Exited,
}

/// A single hit before armor is taken into account.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Damage {
    pub(crate) amount: f32,
    pub(crate) kind: DamageType,
    pub(crate) penetration: f32,
}

impl Damage {
    pub(crate) const fn new(amount: f32, kind: DamageType) -> Self {
        Self {
            amount,
            kind,
            penetration: 0.0,
        }
    }

    pub(crate) const fn with_penetration(mut self, penetration: f32) -> Self {
        self.penetration = penetration;
        self
    }
}

/// Result of a hit landing on an enemy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct DamageOutcome {
    /// Health actually removed.
    pub(crate) dealt: f32,
    /// Whether this hit transitioned the enemy to `Dead`.
    pub(crate) killed: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct AbilityTimers {
    roar: f32,
    summon: f32,
    raise: f32,
    quake: f32,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    armor: ArmorType,
    flying: bool,
    reward: u32,
    wave_index: u32,
    max_health: f32,
    health: f32,
    speed: f32,
    boost: f32,
    position: WorldPoint,
    route: Vec<WorldPoint>,
    remaining_from: Vec<f32>,
    path_index: usize,
    travelled: f32,
    pub(crate) status: StatusEffects,
    state: EnemyState,
    timers: AbilityTimers,
    next_shell_threshold: f32,
    summoned: u32,
}

impl Enemy {
    /// Creates an enemy at the head of `route`, scaled for the zero-based wave.
    pub(crate) fn spawn(
        id: EnemyId,
        stats: &EnemyStats,
        wave_index: u32,
        tuning: &EnemyTuning,
        route: Vec<WorldPoint>,
    ) -> Self {
        let max_health = stats.health * tuning.health_growth.powi(wave_index as i32);
        let speed = stats.speed * (1.0 + wave_index as f32 * tuning.speed_growth);
        let position = route.first().copied().unwrap_or_default();
        let mut enemy = Self {
            id,
            kind: stats.kind,
            armor: stats.armor,
            flying: stats.flying,
            reward: stats.reward,
            wave_index,
            max_health,
            health: max_health,
            speed,
            boost: 1.0,
            position,
            route: Vec::new(),
            remaining_from: Vec::new(),
            path_index: 0,
            travelled: 0.0,
            status: StatusEffects::new(),
            state: EnemyState::Alive,
            timers: AbilityTimers::default(),
            next_shell_threshold: 1.0 - tuning.shell_step,
            summoned: 0,
        };
        enemy.assign_route(route);
        enemy
    }

    /// Creates a minion standing where `summoner` stands, sharing its route.
    pub(crate) fn summoned_by(
        id: EnemyId,
        stats: &EnemyStats,
        tuning: &EnemyTuning,
        summoner: &Enemy,
    ) -> Self {
        let mut minion = Self::spawn(id, stats, summoner.wave_index, tuning, Vec::new());
        minion.route = summoner.route.clone();
        minion.remaining_from = summoner.remaining_from.clone();
        minion.path_index = summoner.path_index;
        minion.position = summoner.position;
        minion.travelled = summoner.travelled;
        minion
    }

    /// Replaces the route, starting from the enemy's current position.
    pub(crate) fn assign_route(&mut self, route: Vec<WorldPoint>) {
        let mut remaining_from = vec![0.0; route.len()];
        for index in (0..route.len().saturating_sub(1)).rev() {
            remaining_from[index] =
                remaining_from[index + 1] + route[index].distance(route[index + 1]);
        }
        self.route = route;
        self.remaining_from = remaining_from;
        self.path_index = 0;
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> EnemyState {
        self.state
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive
    }

    pub(crate) fn is_flying(&self) -> bool {
        self.flying
    }

    pub(crate) fn position(&self) -> WorldPoint {
        self.position
    }

    pub(crate) fn reward(&self) -> u32 {
        self.reward
    }

    fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    /// Fraction of the route covered so far, from 0 to 1.
    pub(crate) fn progress(&self) -> f32 {
        let remaining = self.remaining_distance();
        let total = self.travelled + remaining;
        if total <= f32::EPSILON {
            return if self.path_index + 1 >= self.route.len() {
                1.0
            } else {
                0.0
            };
        }
        (self.travelled / total).clamp(0.0, 1.0)
    }

    fn remaining_distance(&self) -> f32 {
        let next = self.path_index + 1;
        match (self.route.get(next), self.remaining_from.get(next)) {
            (Some(waypoint), Some(rest)) => self.position.distance(*waypoint) + rest,
            _ => 0.0,
        }
    }

    /// Applies one hit and reports the kill exactly once.
    pub(crate) fn take_damage(&mut self, damage: Damage, reduction_factor: f32) -> DamageOutcome {
        if self.state != EnemyState::Alive {
            return DamageOutcome::default();
        }
        if damage.kind == DamageType::Magic && self.status.shell_active() {
            return DamageOutcome::default();
        }

        let multiplier = penetrated_multiplier(
            damage_multiplier(damage.kind, self.armor),
            damage.penetration,
        );
        let amplified = 1.0 + self.status.armor_reduction() * reduction_factor;
        let amount = (damage.amount * multiplier * amplified).max(0.0);

        let dealt = amount.min(self.health.max(0.0));
        self.health -= amount;
        let killed = self.health <= 0.0;
        if killed {
            self.state = EnemyState::Dead;
        }
        DamageOutcome { dealt, killed }
    }

    /// Advances status timers, abilities and movement by `dt` seconds.
    pub(crate) fn update(
        &mut self,
        dt: f32,
        tuning: &EnemyTuning,
        reduction_factor: f32,
        out: &mut Vec<EnemyAction>,
    ) {
        if self.state != EnemyState::Alive {
            return;
        }

        let due = self.status.decay(dt);
        if due > 0.0 {
            let outcome = self.take_damage(Damage::new(due, DamageType::Pure), reduction_factor);
            if outcome.killed {
                out.push(EnemyAction::Killed);
                return;
            }
        }

        self.run_abilities(dt, tuning, out);

        if self.kind == EnemyKind::Runner
            && self.boost <= 1.0
            && self.health_fraction() <= tuning.runner_boost_threshold
        {
            self.boost = tuning.runner_boost;
            out.push(EnemyAction::Announce(EnemyAbility::Sprint));
        }

        if !self.status.movement_blocked() {
            let budget =
                self.speed * self.boost * self.status.speed_factor() * tuning.frame_rate * dt;
            if self.advance(budget, tuning.waypoint_tolerance) {
                self.state = EnemyState::Exited;
                out.push(EnemyAction::Exited);
            }
        }
    }

    fn run_abilities(&mut self, dt: f32, tuning: &EnemyTuning, out: &mut Vec<EnemyAction>) {
        match self.kind {
            EnemyKind::Warlord => {
                self.timers.roar -= dt;
                if self.timers.roar <= 0.0 {
                    self.timers.roar = tuning.roar_interval;
                    out.push(EnemyAction::Roar);
                }

                self.timers.summon -= dt;
                if self.timers.summon <= 0.0 {
                    self.timers.summon = tuning.warlord_summon_interval;
                    out.push(EnemyAction::Summon {
                        kind: EnemyKind::Grunt,
                        count: tuning.warlord_summon_count,
                        ability: EnemyAbility::Summon,
                    });
                }

                if !self.status.shell_active()
                    && self.next_shell_threshold > 0.0
                    && self.health_fraction() <= self.next_shell_threshold
                {
                    self.status.raise_shell(tuning.shell_duration);
                    self.next_shell_threshold -= tuning.shell_step;
                    out.push(EnemyAction::Announce(EnemyAbility::Shell));
                }
            }
            EnemyKind::Necromancer => {
                self.timers.raise -= dt;
                if self.timers.raise <= 0.0 {
                    self.timers.raise = tuning.necromancer_interval;
                    let count = tuning
                        .necromancer_batch
                        .min(tuning.necromancer_max_summons.saturating_sub(self.summoned));
                    if count > 0 {
                        self.summoned += count;
                        out.push(EnemyAction::Summon {
                            kind: EnemyKind::Skeleton,
                            count,
                            ability: EnemyAbility::RaiseDead,
                        });
                    }
                }
            }
            EnemyKind::Behemoth => {
                self.timers.quake -= dt;
                if self.timers.quake <= 0.0 {
                    self.timers.quake = tuning.earthquake_interval;
                    out.push(EnemyAction::Earthquake);
                }
                self.health =
                    (self.health + self.max_health * tuning.regeneration_fraction * dt)
                        .min(self.max_health);
            }
            _ => {}
        }
    }

    /// Moves up to `budget` units along the route. Returns `true` on exit.
    fn advance(&mut self, mut budget: f32, tolerance: f32) -> bool {
        loop {
            let Some(target) = self.route.get(self.path_index + 1).copied() else {
                return true;
            };
            let distance = self.position.distance(target);
            if distance < tolerance {
                self.path_index += 1;
                continue;
            }
            if budget <= 0.0 {
                return false;
            }
            let before = self.position;
            self.position = self.position.step_toward(target, budget);
            let moved = before.distance(self.position);
            self.travelled += moved;
            budget -= moved;
            if self.position == target {
                self.path_index += 1;
            } else {
                return false;
            }
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            progress: self.progress(),
            flying: self.flying,
            status: self.status.flags(),
        }
    }
}
