//! Projectile flight and hit resolution.

use rand::Rng;
use realm_defence_core::{
    CombatConfig, DamageType, EnemyId, ProjectileId, ProjectileSnapshot, TowerId, WorldPoint,
};

use crate::{
    enemy::{Damage, Enemy},
    towers::TowerState,
};

/// Everything a hit carries, rolled once when the tower attacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct HitPayload {
    pub(crate) tower: TowerId,
    damage: f32,
    ricochet_damage: f32,
    damage_type: DamageType,
    penetration: f32,
    splash_radius: f32,
    ricochet_targets: u32,
    ricochet_range: f32,
    poison: Option<(f32, f32, bool)>,
    armor_reduction: Option<(f32, f32)>,
    slow: Option<(f32, f32)>,
    freeze: Option<f32>,
    burn: Option<(f32, f32)>,
    stun: Option<f32>,
    chain_stun: f32,
    bonus_vs_frozen: f32,
    lifesteal: f32,
}

impl HitPayload {
    /// Rolls crit, freeze and stun chances for one attack of `tower`.
    pub(crate) fn roll<R: Rng + ?Sized>(
        tower: &TowerState,
        combat: &CombatConfig,
        global_lifesteal: f32,
        rng: &mut R,
    ) -> Self {
        let abilities = &tower.abilities;
        let base = tower.effective_damage();
        let damage = if abilities.crit_chance > 0.0 && rng.gen::<f32>() < abilities.crit_chance {
            base * combat.crit_multiplier
        } else {
            base
        };

        let poison_duration = if abilities.poison_duration > 0.0 {
            abilities.poison_duration
        } else {
            combat.default_poison_duration
        };
        let poison = (abilities.poison_dps > 0.0).then_some((
            abilities.poison_dps,
            poison_duration,
            abilities.poison_explodes,
        ));
        let armor_reduction = (abilities.armor_reduction > 0.0).then(|| {
            let duration = if abilities.poison_dps > 0.0 {
                poison_duration
            } else {
                combat.default_armor_reduction_duration
            };
            (abilities.armor_reduction, duration)
        });
        let slow = (abilities.slow > 0.0).then(|| {
            let duration = if abilities.slow_duration > 0.0 {
                abilities.slow_duration
            } else {
                combat.default_slow_duration
            };
            ((1.0 - abilities.slow).max(0.0), duration)
        });
        let freeze = (abilities.freeze_chance > 0.0
            && rng.gen::<f32>() < abilities.freeze_chance)
            .then(|| or_default(abilities.freeze_duration, combat.default_freeze_duration));
        let burn = (abilities.fire_damage > 0.0).then(|| {
            (
                abilities.fire_damage,
                or_default(abilities.burn_duration, combat.default_burn_duration),
            )
        });
        let stun = (abilities.stun_chance > 0.0 && rng.gen::<f32>() < abilities.stun_chance)
            .then(|| or_default(abilities.stun_duration, combat.default_stun_duration));

        Self {
            tower: tower.id,
            damage,
            ricochet_damage: base * combat.ricochet_damage_fraction,
            damage_type: tower.damage_type,
            penetration: abilities.armor_penetration,
            splash_radius: abilities.splash_radius,
            ricochet_targets: abilities.ricochet_targets,
            ricochet_range: tower.effective_range() * combat.ricochet_range_fraction,
            poison,
            armor_reduction,
            slow,
            freeze,
            burn,
            stun,
            chain_stun: abilities.stun_duration,
            bonus_vs_frozen: abilities.bonus_vs_frozen,
            lifesteal: abilities.lifesteal + global_lifesteal,
        }
    }
}

fn or_default(value: f32, fallback: f32) -> f32 {
    if value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Outcome of resolving hits, collected for the world to act on.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct HitLog {
    /// Enemies killed, in the order they died.
    pub(crate) kills: Vec<EnemyId>,
    /// Number of direct hits landed.
    pub(crate) hits: u32,
    /// Gold earned through lifesteal, possibly fractional.
    pub(crate) drained_gold: f32,
}

/// Homing shot travelling toward an enemy.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    id: ProjectileId,
    target: EnemyId,
    position: WorldPoint,
    payload: HitPayload,
    damage: f32,
    ricochets_left: u32,
    struck: Vec<EnemyId>,
}

impl Projectile {
    pub(crate) fn new(
        id: ProjectileId,
        origin: WorldPoint,
        target: EnemyId,
        payload: HitPayload,
    ) -> Self {
        Self {
            id,
            target,
            position: origin,
            damage: payload.damage,
            ricochets_left: payload.ricochet_targets,
            payload,
            struck: Vec::new(),
        }
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            tower: self.payload.tower,
            target: self.target,
            position: self.position,
        }
    }
}

/// Moves every projectile and resolves those that connect.
///
/// A projectile whose target is no longer alive is discarded without effect.
pub(crate) fn advance_projectiles(
    projectiles: &mut Vec<Projectile>,
    enemies: &mut [Enemy],
    combat: &CombatConfig,
    dt: f32,
    log: &mut HitLog,
) {
    projectiles.retain_mut(|projectile| {
        let Some(target) = find(enemies, projectile.target) else {
            return false;
        };
        if !enemies[target].is_alive() {
            return false;
        }

        let destination = enemies[target].position();
        projectile.position = projectile
            .position
            .step_toward(destination, combat.projectile_speed * dt);
        if projectile.position.distance(destination) >= combat.hit_radius {
            return true;
        }

        resolve_hit(enemies, target, &projectile.payload, projectile.damage, combat, log);
        projectile.struck.push(projectile.target);
        if projectile.ricochets_left == 0 {
            return false;
        }
        projectile.ricochets_left -= 1;
        match next_ricochet(
            enemies,
            target,
            &projectile.struck,
            projectile.payload.ricochet_range,
        ) {
            Some(next) => {
                projectile.target = enemies[next].id;
                projectile.damage = projectile.payload.ricochet_damage;
                true
            }
            None => false,
        }
    })
}

/// Resolves a hit and every ricochet it causes within the same tick.
pub(crate) fn resolve_instant(
    enemies: &mut [Enemy],
    target: EnemyId,
    payload: &HitPayload,
    combat: &CombatConfig,
    log: &mut HitLog,
) {
    let Some(mut index) = find(enemies, target) else {
        return;
    };
    if !enemies[index].is_alive() {
        return;
    }

    let mut damage = payload.damage;
    let mut struck = Vec::new();
    let mut ricochets_left = payload.ricochet_targets;
    loop {
        resolve_hit(enemies, index, payload, damage, combat, log);
        struck.push(enemies[index].id);
        if ricochets_left == 0 {
            break;
        }
        ricochets_left -= 1;
        match next_ricochet(enemies, index, &struck, payload.ricochet_range) {
            Some(next) => {
                index = next;
                damage = payload.ricochet_damage;
            }
            None => break,
        }
    }
}

/// Direct damage, carried effects, then splash.
fn resolve_hit(
    enemies: &mut [Enemy],
    index: usize,
    payload: &HitPayload,
    damage: f32,
    combat: &CombatConfig,
    log: &mut HitLog,
) {
    let target = &mut enemies[index];
    let amount = if payload.bonus_vs_frozen > 0.0 && target.status.is_frozen() {
        damage * payload.bonus_vs_frozen
    } else {
        damage
    };
    log.hits += 1;
    strike(target, amount, payload, combat, log);

    if target.is_alive() {
        let status = &mut target.status;
        if let Some((dps, duration, explodes)) = payload.poison {
            status.apply_poison(dps, duration, combat.poison_slow_factor, explodes);
        }
        if let Some((amount, duration)) = payload.armor_reduction {
            status.apply_armor_reduction(amount, duration);
        }
        if let Some((multiplier, duration)) = payload.slow {
            status.apply_slow(multiplier, duration);
        }
        if let Some(duration) = payload.freeze {
            status.apply_freeze(duration);
        }
        if let Some((dps, duration)) = payload.burn {
            status.apply_burn(dps, duration);
        }
        if let Some(duration) = payload.stun {
            status.apply_stun(duration);
            status.mark_lightning(combat.lightning_mark_secs);
        }
    }

    if payload.splash_radius > 0.0 {
        let centre = enemies[index].position();
        let splash = damage * combat.splash_fraction;
        for (other, enemy) in enemies.iter_mut().enumerate() {
            if other == index || !enemy.is_alive() {
                continue;
            }
            if enemy.position().distance(centre) <= payload.splash_radius {
                strike(enemy, splash, payload, combat, log);
            }
        }
    }
}

/// Arcs lightning through `links`, primary first, with decaying damage.
pub(crate) fn resolve_chain(
    enemies: &mut [Enemy],
    links: &[EnemyId],
    payload: &HitPayload,
    combat: &CombatConfig,
    log: &mut HitLog,
) {
    for (hop, link) in links.iter().enumerate() {
        let Some(index) = find(enemies, *link) else {
            continue;
        };
        let (damage, stun) = if hop == 0 {
            (payload.damage, payload.chain_stun)
        } else {
            let falloff =
                (combat.chain_falloff - combat.chain_falloff_step * (hop - 1) as f32).max(0.0);
            (payload.damage * falloff, payload.chain_stun * 0.5)
        };

        let enemy = &mut enemies[index];
        if !enemy.is_alive() {
            continue;
        }
        log.hits += 1;
        strike(enemy, damage, payload, combat, log);
        if enemy.is_alive() {
            if stun > 0.0 {
                enemy.status.apply_stun(stun);
            }
            enemy.status.mark_lightning(combat.lightning_mark_secs);
        }
    }
}

fn strike(
    enemy: &mut Enemy,
    amount: f32,
    payload: &HitPayload,
    combat: &CombatConfig,
    log: &mut HitLog,
) {
    let damage = Damage::new(amount, payload.damage_type).with_penetration(payload.penetration);
    let outcome = enemy.take_damage(damage, combat.armor_reduction_factor);
    log.drained_gold += outcome.dealt * payload.lifesteal;
    if outcome.killed {
        log.kills.push(enemy.id);
    }
}

/// Nearest living enemy not yet struck within `range` of the enemy at `from`.
fn next_ricochet(enemies: &[Enemy], from: usize, struck: &[EnemyId], range: f32) -> Option<usize> {
    let origin = enemies[from].position();
    let mut best: Option<(usize, f32)> = None;
    for (index, enemy) in enemies.iter().enumerate() {
        if !enemy.is_alive() || struck.contains(&enemy.id) {
            continue;
        }
        let distance = enemy.position().distance(origin);
        if distance > range {
            continue;
        }
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}

fn find(enemies: &[Enemy], id: EnemyId) -> Option<usize> {
    enemies.iter().position(|enemy| enemy.id == id)
}
