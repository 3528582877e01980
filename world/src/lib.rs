#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Realm Defence.
//!
//! The [`World`] owns the grid, the wave scheduler, every tower, enemy and
//! projectile, the treasury and the random number generator. Adapters drive
//! it exclusively through [`apply`] and observe it through [`query`] and the
//! events each command produces.

mod combat;
mod economy;
mod elements;
mod enemy;
mod grid;
mod status;
mod towers;

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use realm_defence_core::{
    AttackKind, AttackPlan, BuildError, CellCoord, Command, CommandError, ConfigError, Delivery,
    Element, ElementError, EnemyAbility, EnemyId, EnemyKind, EnemyView, Event, GameConfig,
    GamePhase, ProjectileId, SellError, SoundEffect, TowerId, TowerKind, TowerTarget, TowerView,
    UpgradeBranch, UpgradeError,
};
use realm_defence_system_tower_combat::{self as tower_combat, TowerCombat};
use realm_defence_system_tower_targeting::TowerTargeting;
use realm_defence_system_waves::{self as waves, WaveAction, WaveScheduler};

use crate::{
    combat::{advance_projectiles, resolve_chain, resolve_instant, HitLog, HitPayload, Projectile},
    economy::{EconomyModifiers, Treasury},
    elements::ElementState,
    enemy::{Enemy, EnemyAction},
    grid::PathGrid,
    towers::TowerRegistry,
};

/// Represents the authoritative Realm Defence world state.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    grid: PathGrid,
    scheduler: WaveScheduler,
    targeting: TowerTargeting,
    attack_planner: TowerCombat,
    towers: TowerRegistry,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    treasury: Treasury,
    elements: ElementState,
    rng: ChaCha8Rng,
    phase: GamePhase,
    paused: bool,
    game_speed: f32,
    selected_kind: Option<TowerKind>,
    next_enemy_id: u32,
    next_projectile_id: u32,
    kills: u32,
    wave_actions: Vec<WaveAction>,
    tower_targets: Vec<TowerTarget>,
    attack_plans: Vec<AttackPlan>,
    enemy_actions: Vec<EnemyAction>,
}

impl World {
    /// Creates a new world running the built-in campaign.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(GameConfig::default())
    }

    /// Creates a world from a custom configuration after validating it.
    pub fn with_config(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: GameConfig) -> Self {
        let grid = PathGrid::new(&config.grid);
        let scheduler = WaveScheduler::new(waves::Config::new(
            config.waves.clone(),
            secs(config.timing.initial_preparation_secs),
        ));
        let attack_planner =
            TowerCombat::new(tower_combat::Config::new(config.combat.chain_range_fraction));

        Self {
            grid,
            scheduler,
            targeting: TowerTargeting::new(),
            attack_planner,
            towers: TowerRegistry::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            treasury: Treasury::new(&config.economy),
            elements: ElementState::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            phase: GamePhase::Preparation,
            paused: false,
            game_speed: 1.0,
            selected_kind: None,
            next_enemy_id: 0,
            next_projectile_id: 0,
            kills: 0,
            wave_actions: Vec::new(),
            tower_targets: Vec::new(),
            attack_plans: Vec::new(),
            enemy_actions: Vec::new(),
            config,
        }
    }

    fn execute(&mut self, command: Command, out: &mut Vec<Event>) -> Result<(), CommandError> {
        if self.phase.is_terminal() {
            return match command {
                Command::RestartGame => {
                    self.restart(out);
                    Ok(())
                }
                Command::Tick { .. } => Ok(()),
                _ => Err(CommandError::GameFinished),
            };
        }

        match command {
            Command::Tick { dt } => {
                if !self.paused {
                    self.tick(dt, out);
                }
            }
            Command::SelectTowerKind { kind } => {
                self.selected_kind = kind;
                out.push(Event::TowerKindSelected { kind });
            }
            Command::BuildTower { cell } => self.build(cell, out)?,
            Command::UpgradeTower { tower, branch } => self.upgrade(tower, branch, out)?,
            Command::UpgradeElemental { tower, element } => {
                self.upgrade_elemental(tower, element, out)?;
            }
            Command::ChooseElement { element } => {
                self.elements.choose(element)?;
                log::debug!("unlocked element {element:?}");
                out.push(Event::ElementUnlocked { element });
            }
            Command::SellTower { tower } => self.sell(tower, out)?,
            Command::TogglePause => {
                self.paused = !self.paused;
                out.push(Event::PauseToggled {
                    paused: self.paused,
                });
            }
            Command::SetGameSpeed { multiplier } => {
                let max = self.config.timing.max_game_speed;
                if !multiplier.is_finite() || multiplier <= 0.0 || multiplier > max {
                    return Err(CommandError::InvalidGameSpeed(multiplier));
                }
                self.game_speed = multiplier;
                out.push(Event::GameSpeedChanged { multiplier });
            }
            Command::SkipPreparation => {
                if !self.scheduler.skip_preparation() {
                    return Err(CommandError::NotInPreparation);
                }
            }
            Command::RestartGame => self.restart(out),
            Command::SpawnEnemy { kind } => {
                let wave_index = self.scheduler.current_wave().saturating_sub(1);
                self.spawn_enemy(kind, wave_index, out);
            }
        }
        Ok(())
    }

    fn restart(&mut self, out: &mut Vec<Event>) {
        let config = std::mem::take(&mut self.config);
        *self = Self::from_config(config);
        log::info!("game restarted");
        out.push(Event::GameRestarted);
        out.push(Event::GoldChanged {
            gold: self.treasury.gold(),
        });
        out.push(Event::LivesChanged {
            lives: self.treasury.lives(),
        });
    }

    fn build(&mut self, cell: CellCoord, out: &mut Vec<Event>) -> Result<(), BuildError> {
        let kind = self.selected_kind.ok_or(BuildError::NoTowerSelected)?;
        let stats = self.config.tower(kind).ok_or(BuildError::NoTowerSelected)?;
        if let Some(limit) = stats.max_count {
            if self.towers.count_of(kind) >= usize::try_from(limit).unwrap_or(usize::MAX) {
                return Err(BuildError::KindLimitReached { kind, limit });
            }
        }
        self.treasury.ensure(stats.cost)?;
        self.grid.place_tower(cell, self.towers.peek_id())?;
        self.treasury.spend(stats.cost)?;

        let position = self.grid.grid_to_world(cell);
        let tower = self.towers.insert(stats, cell, position);
        log::debug!("built {kind:?} tower {} at {cell:?}", tower.get());
        out.push(Event::TowerBuilt {
            tower,
            kind,
            cell,
            cost: stats.cost,
        });
        out.push(Event::GoldChanged {
            gold: self.treasury.gold(),
        });
        out.push(Event::SoundRequested {
            effect: SoundEffect::Build,
        });

        self.reroute_ground_enemies();
        Ok(())
    }

    fn upgrade(
        &mut self,
        id: TowerId,
        branch: UpgradeBranch,
        out: &mut Vec<Event>,
    ) -> Result<(), UpgradeError> {
        let tower = self.towers.get(id).ok_or(UpgradeError::UnknownTower)?;
        let stats = self
            .config
            .tower(tower.kind)
            .ok_or(UpgradeError::UnknownTower)?;
        let tier = tower.next_upgrade(branch, stats, self.config.economy.max_level)?;
        self.treasury.spend(tier.cost)?;

        let tower = self.towers.get_mut(id).ok_or(UpgradeError::UnknownTower)?;
        tower.apply_upgrade(branch, tier);
        let level = tower.level;
        log::debug!(
            "upgraded tower {} along {branch:?} to level {level}: {}",
            id.get(),
            tier.description
        );
        out.push(Event::TowerUpgraded {
            tower: id,
            branch,
            level,
            cost: tier.cost,
        });
        out.push(Event::GoldChanged {
            gold: self.treasury.gold(),
        });
        out.push(Event::SoundRequested {
            effect: SoundEffect::Upgrade,
        });
        Ok(())
    }

    fn upgrade_elemental(
        &mut self,
        id: TowerId,
        element: Element,
        out: &mut Vec<Event>,
    ) -> Result<(), ElementError> {
        let tower = self.towers.get(id).ok_or(ElementError::UnknownTower)?;
        if !self.elements.is_unlocked(element) {
            return Err(ElementError::Locked(element));
        }
        let stats = self
            .config
            .tower(tower.kind)
            .ok_or(ElementError::UnknownTower)?;
        let tier = tower.next_elemental(element, stats)?;
        self.treasury.spend(tier.cost)?;

        let tower = self.towers.get_mut(id).ok_or(ElementError::UnknownTower)?;
        let applied = tower.apply_elemental(element, tier);
        log::debug!(
            "tower {} gained {element:?} tier {applied}: {}",
            id.get(),
            tier.description
        );
        out.push(Event::TowerElementUpgraded {
            tower: id,
            element,
            tier: applied,
            cost: tier.cost,
        });
        out.push(Event::GoldChanged {
            gold: self.treasury.gold(),
        });
        out.push(Event::SoundRequested {
            effect: SoundEffect::Upgrade,
        });
        Ok(())
    }

    fn sell(&mut self, id: TowerId, out: &mut Vec<Event>) -> Result<(), SellError> {
        let tower = self.towers.remove(id).ok_or(SellError::UnknownTower)?;
        let _ = self.grid.remove_tower(tower.cell);
        let refund = tower.sell_value(self.config.economy.sell_refund_ratio);
        self.treasury.earn(refund);
        log::debug!(
            "sold {:?} tower {} for {refund} gold",
            tower.kind,
            id.get()
        );
        out.push(Event::TowerSold {
            tower: id,
            cell: tower.cell,
            refund,
        });
        out.push(Event::GoldChanged {
            gold: self.treasury.gold(),
        });

        self.reroute_ground_enemies();
        Ok(())
    }

    /// Sends every walking enemy along the freshly computed route.
    ///
    /// Enemies cut off from the exit keep their previous waypoints.
    fn reroute_ground_enemies(&mut self) {
        if !self.grid.is_open_layout() {
            return;
        }
        for enemy in self.enemies.iter_mut() {
            if !enemy.is_alive() || enemy.is_flying() {
                continue;
            }
            let position = enemy.position();
            let route = self
                .grid
                .world_to_grid(position)
                .and_then(|cell| self.grid.route_from(cell));
            if let Some(mut route) = route {
                if let Some(first) = route.first_mut() {
                    *first = position;
                }
                enemy.assign_route(route);
            }
        }
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, wave_index: u32, out: &mut Vec<Event>) {
        let Some(stats) = self.config.enemy(kind) else {
            log::warn!("no stats configured for {kind:?}");
            return;
        };
        let route = if stats.flying {
            self.grid.flight_path()
        } else {
            self.grid.ground_path().to_vec()
        };
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        let enemy = Enemy::spawn(id, stats, wave_index, &self.config.enemy_tuning, route);
        log::trace!("spawned {kind:?} {} for wave index {wave_index}", id.get());
        out.push(Event::EnemySpawned {
            enemy: id,
            kind,
            position: enemy.position(),
        });
        self.enemies.push(enemy);
    }

    fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let clamped = dt.min(secs(self.config.timing.max_step_secs));
        let scaled = clamped.mul_f32(self.game_speed);
        let dt_secs = scaled.as_secs_f32();
        out.push(Event::TimeAdvanced { dt: scaled });

        let gold_before = self.treasury.gold();
        let modifiers = EconomyModifiers::collect(&self.config.economy, &self.towers);

        let mut actions = std::mem::take(&mut self.wave_actions);
        actions.clear();
        self.scheduler.advance(scaled, &mut actions);
        for action in actions.drain(..) {
            self.handle_wave_action(action, &modifiers, out);
        }
        self.wave_actions = actions;

        let tank_cells: Vec<CellCoord> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.is_alive() && enemy.kind == EnemyKind::Tank)
            .filter_map(|enemy| self.grid.world_to_grid(enemy.position()))
            .collect();
        self.grid.set_enemy_blocked(tank_cells);

        self.towers.recompute_auras(
            self.config.combat.aura_radius,
            modifiers.flat_damage(self.treasury.gold()),
        );
        self.pay_income(dt_secs, out);

        let mut hits = HitLog::default();
        self.run_towers(dt_secs, &modifiers, &mut hits, out);
        self.update_enemies(dt_secs, &mut hits, out);
        advance_projectiles(
            &mut self.projectiles,
            &mut self.enemies,
            &self.config.combat,
            dt_secs,
            &mut hits,
        );
        self.settle_hits(hits, &modifiers, out);

        self.enemies.retain(Enemy::is_alive);

        if !self.phase.is_terminal() {
            let mut actions = std::mem::take(&mut self.wave_actions);
            actions.clear();
            self.scheduler
                .check_completion(self.enemies.len(), &mut actions);
            for action in actions.drain(..) {
                self.handle_wave_action(action, &modifiers, out);
            }
            self.wave_actions = actions;
        }

        if self.treasury.gold() != gold_before {
            out.push(Event::GoldChanged {
                gold: self.treasury.gold(),
            });
        }
    }

    fn handle_wave_action(
        &mut self,
        action: WaveAction,
        modifiers: &EconomyModifiers,
        out: &mut Vec<Event>,
    ) {
        match action {
            WaveAction::WaveStarted { wave } => {
                self.phase = GamePhase::WaveActive;
                log::info!("wave {wave} started");
                out.push(Event::WaveStarted { wave });
                out.push(Event::SoundRequested {
                    effect: SoundEffect::WaveStart,
                });
            }
            WaveAction::Spawn { kind, wave } => {
                self.spawn_enemy(kind, wave.saturating_sub(1), out);
            }
            WaveAction::WaveCompleted { wave, bonus } => {
                self.complete_wave(wave, bonus, modifiers, out);
            }
            WaveAction::PreparationStarted {
                next_wave,
                duration,
            } => {
                self.phase = GamePhase::Preparation;
                out.push(Event::PreparationStarted {
                    next_wave,
                    duration,
                });
            }
            WaveAction::Victory => {
                self.phase = GamePhase::Victory;
                log::info!("victory after wave {}", self.scheduler.current_wave());
                out.push(Event::Victory);
                out.push(Event::SoundRequested {
                    effect: SoundEffect::Victory,
                });
            }
        }
    }

    fn complete_wave(
        &mut self,
        wave: u32,
        bonus: Option<u32>,
        modifiers: &EconomyModifiers,
        out: &mut Vec<Event>,
    ) {
        let settings = &self.config.economy;
        let reward = economy::completion_reward(settings, wave, bonus)
            .saturating_add(modifiers.wave_bonus);
        self.treasury.earn(reward);
        let interest =
            economy::interest(settings, self.treasury.gold(), modifiers.interest_rate, wave);
        self.treasury.earn(interest);
        let milestone = economy::milestone_bonus(settings, wave);
        self.treasury.earn(milestone);

        log::info!(
            "wave {wave} completed: reward {reward}, interest {interest}, milestone {milestone}"
        );
        out.push(Event::WaveCompleted {
            wave,
            reward,
            interest,
            milestone,
        });
        out.push(Event::SoundRequested {
            effect: SoundEffect::Gold,
        });

        if settings.element_milestones.contains(&wave) {
            let size = settings.element_offer_size;
            let choices = self.elements.offer(&mut self.rng, size).to_vec();
            if !choices.is_empty() {
                log::info!("offering elements {choices:?}");
                out.push(Event::ElementChoiceOffered { choices });
            }
        }
    }

    fn pay_income(&mut self, dt: f32, out: &mut Vec<Event>) {
        let interval = self.config.economy.vault_income_interval_secs;
        if interval <= 0.0 {
            return;
        }
        let mut earned = 0u32;
        for tower in self.towers.iter_mut() {
            if tower.abilities.income == 0 {
                continue;
            }
            tower.income_timer += dt;
            while tower.income_timer >= interval {
                tower.income_timer -= interval;
                earned = earned.saturating_add(tower.abilities.income);
            }
        }
        if earned > 0 {
            self.treasury.earn(earned);
            out.push(Event::SoundRequested {
                effect: SoundEffect::Gold,
            });
        }
    }

    fn run_towers(
        &mut self,
        dt: f32,
        modifiers: &EconomyModifiers,
        hits: &mut HitLog,
        out: &mut Vec<Event>,
    ) {
        for tower in self.towers.iter_mut() {
            tower.cooldown = (tower.cooldown - dt).max(0.0);
        }

        let tower_view = self.tower_view();
        let enemy_view = self.enemy_view();
        self.targeting
            .handle(&tower_view, &enemy_view, &mut self.tower_targets);
        for tower in self.towers.iter_mut() {
            tower.target = self
                .tower_targets
                .iter()
                .find(|assignment| assignment.tower == tower.id)
                .map(|assignment| assignment.enemy);
        }

        self.attack_plans.clear();
        self.attack_planner.handle(
            &tower_view,
            &enemy_view,
            &self.tower_targets,
            &mut self.attack_plans,
        );
        let plans = std::mem::take(&mut self.attack_plans);
        for plan in &plans {
            self.execute_attack(plan, modifiers, hits, out);
        }
        self.attack_plans = plans;
    }

    fn execute_attack(
        &mut self,
        plan: &AttackPlan,
        modifiers: &EconomyModifiers,
        hits: &mut HitLog,
        out: &mut Vec<Event>,
    ) {
        let Some(tower) = self.towers.get_mut(plan.tower) else {
            return;
        };
        tower.cooldown = tower.attack_interval();
        let origin = tower.position;
        let payload =
            HitPayload::roll(tower, &self.config.combat, modifiers.lifesteal, &mut self.rng);

        let targets = match &plan.kind {
            AttackKind::Projectiles { targets } => targets,
            AttackKind::Chain { links } => links,
        };
        log::trace!("tower {} attacks {targets:?}", plan.tower.get());
        out.push(Event::TowerAttacked {
            tower: plan.tower,
            targets: targets.clone(),
        });
        out.push(Event::SoundRequested {
            effect: SoundEffect::Shoot,
        });

        let combat = &self.config.combat;
        match &plan.kind {
            AttackKind::Chain { links } => {
                resolve_chain(&mut self.enemies, links, &payload, combat, hits);
            }
            AttackKind::Projectiles { targets } => {
                for target in targets {
                    match combat.delivery {
                        Delivery::Instant => {
                            resolve_instant(&mut self.enemies, *target, &payload, combat, hits);
                        }
                        Delivery::Homing => {
                            let id = ProjectileId::new(self.next_projectile_id);
                            self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
                            self.projectiles
                                .push(Projectile::new(id, origin, *target, payload));
                        }
                    }
                }
            }
        }
    }

    fn update_enemies(&mut self, dt: f32, hits: &mut HitLog, out: &mut Vec<Event>) {
        let mut actions = std::mem::take(&mut self.enemy_actions);
        let count = self.enemies.len();
        for index in 0..count {
            actions.clear();
            self.enemies[index].update(
                dt,
                &self.config.enemy_tuning,
                self.config.combat.armor_reduction_factor,
                &mut actions,
            );
            for action in actions.drain(..) {
                self.handle_enemy_action(index, action, hits, out);
            }
        }
        self.enemy_actions = actions;
    }

    fn handle_enemy_action(
        &mut self,
        index: usize,
        action: EnemyAction,
        hits: &mut HitLog,
        out: &mut Vec<Event>,
    ) {
        let (id, kind, position) = {
            let enemy = &self.enemies[index];
            (enemy.id, enemy.kind, enemy.position())
        };
        let tuning = &self.config.enemy_tuning;

        match action {
            EnemyAction::Announce(ability) => {
                out.push(Event::AbilityUsed { enemy: id, ability });
            }
            EnemyAction::Roar => {
                for (other, enemy) in self.enemies.iter_mut().enumerate() {
                    if other == index || !enemy.is_alive() {
                        continue;
                    }
                    if enemy.position().distance(position) <= tuning.roar_radius {
                        enemy
                            .status
                            .apply_haste(tuning.roar_multiplier, tuning.roar_duration);
                    }
                }
                out.push(Event::AbilityUsed {
                    enemy: id,
                    ability: EnemyAbility::Roar,
                });
            }
            EnemyAction::Summon {
                kind: minion_kind,
                count,
                ability,
            } => {
                let Some(stats) = self.config.enemy(minion_kind) else {
                    log::warn!("no stats configured for {minion_kind:?}");
                    return;
                };
                for _ in 0..count {
                    let minion_id = EnemyId::new(self.next_enemy_id);
                    self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
                    let minion = Enemy::summoned_by(minion_id, stats, tuning, &self.enemies[index]);
                    out.push(Event::EnemySpawned {
                        enemy: minion_id,
                        kind: minion_kind,
                        position: minion.position(),
                    });
                    self.enemies.push(minion);
                }
                log::trace!("{kind:?} {} summoned {count} {minion_kind:?}", id.get());
                out.push(Event::AbilityUsed { enemy: id, ability });
            }
            EnemyAction::Earthquake => {
                let towers = self
                    .towers
                    .iter()
                    .filter(|tower| tower.position.distance(position) <= tuning.earthquake_radius)
                    .count();
                out.push(Event::AbilityUsed {
                    enemy: id,
                    ability: EnemyAbility::Earthquake {
                        towers: u32::try_from(towers).unwrap_or(u32::MAX),
                    },
                });
            }
            EnemyAction::Killed => hits.kills.push(id),
            EnemyAction::Exited => self.enemy_escaped(id, kind, out),
        }
    }

    fn enemy_escaped(&mut self, id: EnemyId, kind: EnemyKind, out: &mut Vec<Event>) {
        let lives = self.treasury.lose_life();
        log::debug!("{kind:?} {} escaped, {lives} lives left", id.get());
        out.push(Event::EnemyEscaped { enemy: id, kind });
        out.push(Event::LivesChanged { lives });

        if lives == 0 && !self.phase.is_terminal() {
            self.phase = GamePhase::GameOver;
            self.scheduler.halt();
            log::info!("game over during wave {}", self.scheduler.current_wave());
            out.push(Event::GameOver);
            out.push(Event::SoundRequested {
                effect: SoundEffect::GameOver,
            });
        }
    }

    /// Pays out kills and lifesteal gathered during the tick.
    fn settle_hits(&mut self, hits: HitLog, modifiers: &EconomyModifiers, out: &mut Vec<Event>) {
        for _ in 0..hits.hits {
            out.push(Event::SoundRequested {
                effect: SoundEffect::Hit,
            });
        }

        for enemy_id in hits.kills {
            let Some(index) = self.enemies.iter().position(|enemy| enemy.id == enemy_id) else {
                continue;
            };
            let enemy = &self.enemies[index];
            let (kind, position) = (enemy.kind, enemy.position());
            let spreading = enemy.status.exploding_poison();

            let mut reward = enemy.reward().saturating_add(modifiers.kill_bonus);
            if modifiers.double_gold_chance > 0.0
                && self.rng.gen::<f32>() < modifiers.double_gold_chance
            {
                reward = reward.saturating_mul(2);
            }
            reward = reward.saturating_add(modifiers.gold_steal);
            self.treasury.earn(reward);
            self.kills = self.kills.saturating_add(1);

            log::trace!("{kind:?} {} killed for {reward} gold", enemy_id.get());
            out.push(Event::EnemyKilled {
                enemy: enemy_id,
                kind,
                reward,
            });
            out.push(Event::SoundRequested {
                effect: SoundEffect::Explosion,
            });

            if let Some((dps, duration)) = spreading {
                let combat = &self.config.combat;
                for neighbour in self.enemies.iter_mut() {
                    if neighbour.is_alive()
                        && neighbour.position().distance(position) <= combat.poison_explosion_radius
                    {
                        neighbour.status.apply_poison(
                            dps,
                            duration,
                            combat.poison_slow_factor,
                            false,
                        );
                    }
                }
            }
        }

        let _ = self.treasury.accrue(hits.drained_gold);
    }

    fn enemy_view(&self) -> EnemyView {
        EnemyView::from_snapshots(
            self.enemies
                .iter()
                .filter(|enemy| enemy.is_alive())
                .map(Enemy::snapshot)
                .collect(),
        )
    }

    fn tower_view(&self) -> TowerView {
        TowerView::from_snapshots(self.towers.iter().map(|tower| tower.snapshot()).collect())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn secs(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world untouched, are broadcast as
/// [`Event::CommandRejected`] and are returned as the error. Once the run has
/// ended only [`Command::RestartGame`] is accepted; ticks become no-ops.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    let result = world.execute(command, out_events);
    if let Err(error) = result {
        log::warn!("command rejected: {error}");
        out_events.push(Event::CommandRejected { error });
    }
    result
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use realm_defence_core::{
        CellCoord, Element, EnemyView, GameConfig, GamePhase, ProjectileSnapshot, TowerId,
        TowerKind, TowerView, UpgradeBranch, UpgradeError, WorldPoint,
    };

    use super::World;

    /// Gold currently held.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.treasury.gold()
    }

    /// Lives remaining.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.treasury.lives()
    }

    /// High-level state of the run.
    #[must_use]
    pub fn phase(world: &World) -> GamePhase {
        world.phase
    }

    /// One-based number of the latest wave started, or zero before the first.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.scheduler.current_wave()
    }

    /// Number of waves in the campaign.
    #[must_use]
    pub fn total_waves(world: &World) -> usize {
        world.scheduler.total_waves()
    }

    /// Time left before the next wave, while preparing.
    #[must_use]
    pub fn preparation_remaining(world: &World) -> Option<Duration> {
        world.scheduler.preparation_remaining()
    }

    /// Spawns still queued for the active wave.
    #[must_use]
    pub fn pending_spawns(world: &World) -> usize {
        world.scheduler.pending_spawns()
    }

    /// Reports whether the simulation is paused.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Multiplier applied to simulated time.
    #[must_use]
    pub fn game_speed(world: &World) -> f32 {
        world.game_speed
    }

    /// Tower kind used by the next build request.
    #[must_use]
    pub fn selected_tower_kind(world: &World) -> Option<TowerKind> {
        world.selected_kind
    }

    /// Total number of enemies killed this run.
    #[must_use]
    pub fn kills(world: &World) -> u32 {
        world.kills
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Captures a read-only view of every living enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        world.enemy_view()
    }

    /// Captures a read-only view of every tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        world.tower_view()
    }

    /// Snapshots of the projectiles currently in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world.projectiles.iter().map(|projectile| projectile.snapshot()).collect()
    }

    /// Gold a sale of the tower would refund right now.
    #[must_use]
    pub fn sell_value(world: &World, tower: TowerId) -> Option<u32> {
        world
            .towers
            .get(tower)
            .map(|state| state.sell_value(world.config.economy.sell_refund_ratio))
    }

    /// Cost of the next tier along `branch`, or the reason it is unavailable.
    /// Gold is not considered.
    pub fn upgrade_cost(
        world: &World,
        tower: TowerId,
        branch: UpgradeBranch,
    ) -> Result<u32, UpgradeError> {
        let state = world.towers.get(tower).ok_or(UpgradeError::UnknownTower)?;
        let stats = world
            .config
            .tower(state.kind)
            .ok_or(UpgradeError::UnknownTower)?;
        state
            .next_upgrade(branch, stats, world.config.economy.max_level)
            .map(|tier| tier.cost)
    }

    /// Number of tiers of `element` applied to the tower.
    #[must_use]
    pub fn elemental_tier(world: &World, tower: TowerId, element: Element) -> Option<u8> {
        world
            .towers
            .get(tower)
            .map(|state| state.elemental_tier(element))
    }

    /// Elements currently offered for unlocking.
    #[must_use]
    pub fn pending_element_choices(world: &World) -> &[Element] {
        world.elements.pending()
    }

    /// Elements unlocked so far, in declaration order.
    #[must_use]
    pub fn unlocked_elements(world: &World) -> Vec<Element> {
        world.elements.unlocked().collect()
    }

    /// Number of columns and rows of the grid.
    #[must_use]
    pub fn grid_dimensions(world: &World) -> (u32, u32) {
        (world.grid.columns(), world.grid.rows())
    }

    /// Side length of a grid cell in world units.
    #[must_use]
    pub fn cell_size(world: &World) -> f32 {
        world.grid.cell_size()
    }

    /// Reports whether towers may be placed on the enemy route.
    #[must_use]
    pub fn is_open_layout(world: &World) -> bool {
        world.grid.is_open_layout()
    }

    /// Cell where enemies enter the field.
    #[must_use]
    pub fn spawn_cell(world: &World) -> CellCoord {
        world.grid.spawn()
    }

    /// Cell enemies try to reach.
    #[must_use]
    pub fn exit_cell(world: &World) -> CellCoord {
        world.grid.exit()
    }

    /// Waypoints walked by ground enemies.
    #[must_use]
    pub fn ground_path(world: &World) -> &[WorldPoint] {
        world.grid.ground_path()
    }

    /// Straight route flown by airborne enemies.
    #[must_use]
    pub fn flight_path(world: &World) -> Vec<WorldPoint> {
        world.grid.flight_path()
    }

    /// Reports whether the cell belongs to the fixed zigzag route.
    #[must_use]
    pub fn is_path(world: &World, cell: CellCoord) -> bool {
        world.grid.is_path(cell)
    }

    /// Reports whether a tower could be placed on the cell right now.
    #[must_use]
    pub fn is_buildable(world: &World, cell: CellCoord) -> bool {
        world.grid.is_buildable(cell)
    }

    /// Tower occupying the cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.grid.tower_at(cell)
    }

    /// Maps a world position to the grid cell containing it.
    #[must_use]
    pub fn world_to_grid(world: &World, point: WorldPoint) -> Option<CellCoord> {
        world.grid.world_to_grid(point)
    }

    /// Centre of a cell in world units.
    #[must_use]
    pub fn grid_to_world(world: &World, cell: CellCoord) -> WorldPoint {
        world.grid.grid_to_world(cell)
    }

    /// A* route between two cells over the current occupancy.
    #[must_use]
    pub fn compute_path(world: &World, start: CellCoord, end: CellCoord) -> Option<Vec<CellCoord>> {
        world.grid.compute_path(start, end)
    }
}
