//! Serde-backed tuning tables that parameterise a run.
//!
//! [`GameConfig::default`] reproduces the stock campaign: nine enemy kinds,
//! three tower kinds with three upgrade branches and five elemental branches
//! each, and thirty waves. Adapters may deserialize overrides from any serde
//! format; missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ArmorType, CellCoord, DamageType, Element, EnemyKind, TowerKind};

/// Complete description of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for every random roll made during the run.
    pub rng_seed: u64,
    /// Clock handling and phase durations.
    pub timing: TimingConfig,
    /// Starting resources, rewards and interest.
    pub economy: EconomyConfig,
    /// Grid dimensions and path layout.
    pub grid: GridConfig,
    /// Projectile and on-hit tuning.
    pub combat: CombatConfig,
    /// Wave scaling and enemy ability tuning.
    pub enemy_tuning: EnemyTuning,
    /// Base statistics for every enemy kind.
    pub enemies: Vec<EnemyStats>,
    /// Base statistics and upgrade tables for every tower kind.
    pub towers: Vec<TowerStats>,
    /// Ordered wave definitions.
    pub waves: Vec<WaveSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rng_seed: 0x5eed_0f_7e41_3d,
            timing: TimingConfig::default(),
            economy: EconomyConfig::default(),
            grid: GridConfig::default(),
            combat: CombatConfig::default(),
            enemy_tuning: EnemyTuning::default(),
            enemies: default_enemies(),
            towers: default_towers(),
            waves: default_waves(),
        }
    }
}

impl GameConfig {
    /// Looks up the statistics for an enemy kind.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind) -> Option<&EnemyStats> {
        self.enemies.iter().find(|stats| stats.kind == kind)
    }

    /// Looks up the statistics for a tower kind.
    #[must_use]
    pub fn tower(&self, kind: TowerKind) -> Option<&TowerStats> {
        self.towers.iter().find(|stats| stats.kind == kind)
    }

    /// Checks the tables for omissions and nonsensical values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in EnemyKind::ALL {
            let stats = self.enemy(kind).ok_or(ConfigError::MissingEnemy(kind))?;
            ensure_finite("enemy health", stats.health)?;
            ensure_finite("enemy speed", stats.speed)?;
        }

        let required_tiers = usize::from(self.economy.max_level.saturating_sub(1));
        for kind in TowerKind::ALL {
            let stats = self.tower(kind).ok_or(ConfigError::MissingTower(kind))?;
            if stats.branches.len() != UPGRADE_BRANCH_COUNT {
                return Err(ConfigError::BranchCount {
                    kind,
                    found: stats.branches.len(),
                });
            }
            for (branch, spec) in stats.branches.iter().enumerate() {
                if spec.tiers.len() < required_tiers {
                    return Err(ConfigError::TierCount {
                        kind,
                        branch,
                        found: spec.tiers.len(),
                        required: required_tiers,
                    });
                }
            }
            if stats.attacks {
                ensure_finite("tower attack speed", stats.attack_speed)?;
                if stats.attack_speed <= 0.0 {
                    return Err(ConfigError::InvalidValue {
                        field: "tower attack speed",
                        value: stats.attack_speed,
                    });
                }
            }
        }

        self.grid.validate()?;
        ensure_finite("max step", self.timing.max_step_secs)?;
        ensure_finite("initial preparation", self.timing.initial_preparation_secs)?;
        ensure_finite("vault income interval", self.economy.vault_income_interval_secs)?;
        for wave in &self.waves {
            ensure_finite("wave preparation", wave.preparation_secs)?;
        }
        Ok(())
    }
}

fn ensure_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

/// Number of regular upgrade branches every tower kind exposes.
pub const UPGRADE_BRANCH_COUNT: usize = 3;

/// Problems detected while validating a [`GameConfig`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// No statistics were provided for an enemy kind.
    #[error("missing enemy statistics for {0:?}")]
    MissingEnemy(EnemyKind),
    /// No statistics were provided for a tower kind.
    #[error("missing tower statistics for {0:?}")]
    MissingTower(TowerKind),
    /// A tower kind did not list exactly three upgrade branches.
    #[error("{kind:?} lists {found} upgrade branches")]
    BranchCount {
        /// Tower kind at fault.
        kind: TowerKind,
        /// Number of branches found.
        found: usize,
    },
    /// A branch holds fewer tiers than the level cap requires.
    #[error("{kind:?} branch {branch} has {found} tiers, {required} required")]
    TierCount {
        /// Tower kind at fault.
        kind: TowerKind,
        /// Zero-based branch index.
        branch: usize,
        /// Number of tiers found.
        found: usize,
        /// Number of tiers the level cap needs.
        required: usize,
    },
    /// The grid has no cells.
    #[error("grid must contain at least one cell")]
    EmptyGrid,
    /// The path layout references cells outside the grid or is malformed.
    #[error("invalid path layout: {0}")]
    InvalidLayout(&'static str),
    /// A numeric field is negative, infinite or NaN.
    #[error("{field} must be finite and non-negative, found {value}")]
    InvalidValue {
        /// Human-readable field name.
        field: &'static str,
        /// Offending value.
        value: f32,
    },
}

/// Clock handling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Longest real-time step accepted per tick before game-speed scaling.
    pub max_step_secs: f32,
    /// Largest accepted game-speed multiplier.
    pub max_game_speed: f32,
    /// Countdown before the first wave.
    pub initial_preparation_secs: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            max_step_secs: 0.1,
            max_game_speed: 4.0,
            initial_preparation_secs: 15.0,
        }
    }
}

/// Starting resources, rewards and interest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Gold available when a run starts.
    pub starting_gold: u32,
    /// Lives available when a run starts.
    pub starting_lives: u32,
    /// Fraction of the invested gold refunded on sale.
    pub sell_refund_ratio: f32,
    /// Highest tower level; a tower starts at level 1.
    pub max_level: u8,
    /// Base interest rate paid on held gold after each wave.
    pub interest_rate: f32,
    /// Interest cap before any growth.
    pub interest_base_cap: u32,
    /// Cap growth applied every `interest_cap_interval` waves.
    pub interest_cap_step: u32,
    /// Number of waves between interest cap increases.
    pub interest_cap_interval: u32,
    /// Flat wave reward used when a wave defines no bonus.
    pub fallback_reward_base: u32,
    /// Per-wave increment of the fallback reward.
    pub fallback_reward_per_wave: u32,
    /// One-off bonuses paid when specific waves complete.
    pub milestone_bonuses: Vec<MilestoneBonus>,
    /// Chance that a kill reward is doubled.
    pub double_gold_chance: f32,
    /// Seconds between vault income payouts.
    pub vault_income_interval_secs: f32,
    /// Waves whose completion offers a new element.
    pub element_milestones: Vec<u32>,
    /// Maximum number of elements offered at once.
    pub element_offer_size: usize,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_gold: 200,
            starting_lives: 25,
            sell_refund_ratio: 0.7,
            max_level: 4,
            interest_rate: 0.1,
            interest_base_cap: 50,
            interest_cap_step: 25,
            interest_cap_interval: 5,
            fallback_reward_base: 50,
            fallback_reward_per_wave: 10,
            milestone_bonuses: vec![
                MilestoneBonus { wave: 5, gold: 100 },
                MilestoneBonus { wave: 10, gold: 200 },
            ],
            double_gold_chance: 0.2,
            vault_income_interval_secs: 3.0,
            element_milestones: vec![5, 10, 15, 20, 25],
            element_offer_size: 3,
        }
    }
}

/// Gold paid once when a specific wave completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneBonus {
    /// One-based wave number.
    pub wave: u32,
    /// Gold awarded.
    pub gold: u32,
}

/// Grid dimensions and path layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of cell columns.
    pub columns: u32,
    /// Number of cell rows.
    pub rows: u32,
    /// Side length of a cell in world units.
    pub cell_size: f32,
    /// Spacing of interpolated ground waypoints along a zigzag path.
    pub waypoint_spacing: f32,
    /// How the enemy path is determined.
    pub layout: PathLayout,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 20,
            rows: 12,
            cell_size: 40.0,
            waypoint_spacing: 20.0,
            layout: PathLayout::default(),
        }
    }
}

impl GridConfig {
    fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        ensure_finite("cell size", self.cell_size)?;
        if self.waypoint_spacing <= 0.0 || !self.waypoint_spacing.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "waypoint spacing",
                value: self.waypoint_spacing,
            });
        }

        match &self.layout {
            PathLayout::Zigzag { corners } => {
                if corners.len() < 2 {
                    return Err(ConfigError::InvalidLayout("zigzag needs two corners"));
                }
                if !corners.iter().all(|corner| self.contains(*corner)) {
                    return Err(ConfigError::InvalidLayout("corner outside the grid"));
                }
                let straight = corners.windows(2).all(|pair| {
                    pair[0].column() == pair[1].column() || pair[0].row() == pair[1].row()
                });
                if !straight {
                    return Err(ConfigError::InvalidLayout("segments must be straight"));
                }
            }
            PathLayout::Open { spawn, exit } => {
                if !self.contains(*spawn) || !self.contains(*exit) {
                    return Err(ConfigError::InvalidLayout("spawn or exit outside the grid"));
                }
                if spawn == exit {
                    return Err(ConfigError::InvalidLayout("spawn and exit coincide"));
                }
            }
        }
        Ok(())
    }
}

/// Strategy used to lay out the enemy path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathLayout {
    /// Fixed path through straight segments joining the listed corners.
    ///
    /// Path cells are never buildable.
    Zigzag {
        /// Ordered corner cells; the first is the spawn and the last the exit.
        corners: Vec<CellCoord>,
    },
    /// Towers may be placed anywhere as long as a route remains.
    Open {
        /// Cell where enemies appear.
        spawn: CellCoord,
        /// Cell enemies try to reach.
        exit: CellCoord,
    },
}

impl Default for PathLayout {
    fn default() -> Self {
        let corners = [
            (0, 10),
            (2, 10),
            (2, 2),
            (5, 2),
            (5, 9),
            (8, 9),
            (8, 2),
            (11, 2),
            (11, 9),
            (14, 9),
            (14, 2),
            (17, 2),
            (17, 10),
            (19, 10),
        ];
        Self::Zigzag {
            corners: corners
                .into_iter()
                .map(|(column, row)| CellCoord::new(column, row))
                .collect(),
        }
    }
}

/// How attacks reach their targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Projectiles travel and home in on their target.
    #[default]
    Homing,
    /// Hits resolve at the moment of attack.
    Instant,
}

/// Projectile and on-hit tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Whether projectiles travel or resolve instantly.
    pub delivery: Delivery,
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
    /// Distance at which a homing projectile connects.
    pub hit_radius: f32,
    /// Fraction of the hit damage dealt to splashed enemies.
    pub splash_fraction: f32,
    /// Ricochet search radius as a fraction of the tower range.
    pub ricochet_range_fraction: f32,
    /// Ricochet damage as a fraction of the tower's effective damage.
    pub ricochet_damage_fraction: f32,
    /// Chain hop search radius as a fraction of the tower range.
    pub chain_range_fraction: f32,
    /// Damage fraction of the first chain hop.
    pub chain_falloff: f32,
    /// Reduction of the damage fraction for each subsequent hop.
    pub chain_falloff_step: f32,
    /// Damage multiplier of a critical hit.
    pub crit_multiplier: f32,
    /// Radius within which an aura tower buffs its neighbours.
    pub aura_radius: f32,
    /// Extra damage taken per point of armor reduction.
    pub armor_reduction_factor: f32,
    /// Speed factor ceiling while poisoned.
    pub poison_slow_factor: f32,
    /// Radius over which an exploding poison spreads on death.
    pub poison_explosion_radius: f32,
    /// Slow duration used when an upgrade names none.
    pub default_slow_duration: f32,
    /// Poison duration used when an upgrade names none.
    pub default_poison_duration: f32,
    /// Armor reduction duration used when no poison duration exists.
    pub default_armor_reduction_duration: f32,
    /// Burn duration used when an upgrade names none.
    pub default_burn_duration: f32,
    /// Stun duration used when an upgrade grants a stun chance only.
    pub default_stun_duration: f32,
    /// Freeze duration used when an upgrade grants a freeze chance only.
    pub default_freeze_duration: f32,
    /// Duration of the cosmetic lightning mark.
    pub lightning_mark_secs: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            delivery: Delivery::Homing,
            projectile_speed: 400.0,
            hit_radius: 10.0,
            splash_fraction: 0.5,
            ricochet_range_fraction: 0.5,
            ricochet_damage_fraction: 0.6,
            chain_range_fraction: 0.6,
            chain_falloff: 0.7,
            chain_falloff_step: 0.1,
            crit_multiplier: 2.0,
            aura_radius: 150.0,
            armor_reduction_factor: 0.05,
            poison_slow_factor: 0.8,
            poison_explosion_radius: 60.0,
            default_slow_duration: 3.0,
            default_poison_duration: 3.0,
            default_armor_reduction_duration: 5.0,
            default_burn_duration: 3.0,
            default_stun_duration: 0.5,
            default_freeze_duration: 1.0,
            lightning_mark_secs: 1.0,
        }
    }
}

/// Wave scaling and enemy ability tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Health multiplier compounded for each zero-based wave index.
    pub health_growth: f32,
    /// Speed increment per zero-based wave index.
    pub speed_growth: f32,
    /// Frames per second the speed statistic is expressed against.
    pub frame_rate: f32,
    /// Distance at which a waypoint counts as reached.
    pub waypoint_tolerance: f32,
    /// Health fraction at which runners sprint.
    pub runner_boost_threshold: f32,
    /// Permanent speed multiplier of a sprinting runner.
    pub runner_boost: f32,
    /// Seconds between warlord roars.
    pub roar_interval: f32,
    /// Reach of a warlord roar.
    pub roar_radius: f32,
    /// Speed multiplier granted by a roar.
    pub roar_multiplier: f32,
    /// Duration of a roar's haste.
    pub roar_duration: f32,
    /// Seconds between warlord summons.
    pub warlord_summon_interval: f32,
    /// Grunts summoned per warlord summon.
    pub warlord_summon_count: u32,
    /// Health fraction step between warlord shells.
    pub shell_step: f32,
    /// Duration of a warlord shell.
    pub shell_duration: f32,
    /// Seconds between necromancer raisings.
    pub necromancer_interval: f32,
    /// Skeletons raised per raising.
    pub necromancer_batch: u32,
    /// Skeletons a necromancer may raise over its lifetime.
    pub necromancer_max_summons: u32,
    /// Seconds between behemoth earthquakes.
    pub earthquake_interval: f32,
    /// Reach of a behemoth earthquake.
    pub earthquake_radius: f32,
    /// Fraction of maximum health a behemoth regenerates per second.
    pub regeneration_fraction: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            health_growth: 1.15,
            speed_growth: 0.02,
            frame_rate: 60.0,
            waypoint_tolerance: 5.0,
            runner_boost_threshold: 0.25,
            runner_boost: 1.7,
            roar_interval: 30.0,
            roar_radius: 150.0,
            roar_multiplier: 1.5,
            roar_duration: 5.0,
            warlord_summon_interval: 15.0,
            warlord_summon_count: 2,
            shell_step: 0.25,
            shell_duration: 5.0,
            necromancer_interval: 4.0,
            necromancer_batch: 3,
            necromancer_max_summons: 15,
            earthquake_interval: 8.0,
            earthquake_radius: 150.0,
            regeneration_fraction: 0.005,
        }
    }
}

/// Base statistics of an enemy kind before wave scaling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Kind described by the entry.
    pub kind: EnemyKind,
    /// Unscaled maximum health.
    pub health: f32,
    /// Unscaled speed in world units per frame.
    pub speed: f32,
    /// Armor class.
    pub armor: ArmorType,
    /// Gold awarded on death.
    pub reward: u32,
    /// Whether the enemy flies straight from spawn to exit.
    #[serde(default)]
    pub flying: bool,
}

/// Base statistics and upgrade tables of a tower kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Kind described by the entry.
    pub kind: TowerKind,
    /// Construction cost.
    pub cost: u32,
    /// Damage per hit.
    pub damage: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Class of damage dealt.
    pub damage_type: DamageType,
    /// Whether the tower attacks at all.
    pub attacks: bool,
    /// Gold produced per income interval.
    #[serde(default)]
    pub income: u32,
    /// Maximum number of towers of this kind.
    #[serde(default)]
    pub max_count: Option<u32>,
    /// Mutually exclusive upgrade branches.
    pub branches: Vec<UpgradeBranchSpec>,
    /// Elemental upgrade branches keyed by element.
    #[serde(default)]
    pub elements: Vec<ElementalBranchSpec>,
}

impl TowerStats {
    /// Looks up the elemental branch for `element`.
    #[must_use]
    pub fn elemental(&self, element: Element) -> Option<&ElementalBranchSpec> {
        self.elements.iter().find(|spec| spec.element == element)
    }
}

/// Named sequence of upgrade tiers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeBranchSpec {
    /// Display name of the branch.
    pub name: String,
    /// Tiers applied in order.
    pub tiers: Vec<UpgradeTier>,
}

/// Elemental upgrade branch of a tower kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementalBranchSpec {
    /// Element that must be unlocked.
    pub element: Element,
    /// Display name of the branch.
    pub name: String,
    /// Tiers applied in order.
    pub tiers: Vec<UpgradeTier>,
}

/// Cost and effects of a single upgrade tier.
///
/// Additive fields (`damage`, `attack_speed`, `range`, `fire_damage`,
/// `income`, `interest_bonus`, `wave_bonus`, `gold_steal`) accumulate across
/// tiers. Optional fields keep the largest value granted so far.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeTier {
    /// Gold cost of the tier.
    pub cost: u32,
    /// Player-facing summary.
    pub description: String,
    /// Damage added per hit.
    pub damage: f32,
    /// Attacks per second added.
    pub attack_speed: f32,
    /// Range added.
    pub range: f32,
    /// Allows flying enemies to be targeted.
    pub can_target_flying: bool,
    /// Chance of a critical hit.
    pub crit_chance: Option<f32>,
    /// Fraction of armor mitigation ignored.
    pub armor_penetration: Option<f32>,
    /// Splash radius around the primary target.
    pub splash_radius: Option<f32>,
    /// Number of targets struck per attack.
    pub multi_target: Option<u32>,
    /// Number of ricochet bounces.
    pub ricochet_targets: Option<u32>,
    /// Poison damage per second.
    pub poison_dps: Option<f32>,
    /// Poison duration.
    pub poison_duration: Option<f32>,
    /// Poison spreads to neighbours when the victim dies.
    pub poison_explodes: bool,
    /// Fraction of speed removed by the slow.
    pub slow: Option<f32>,
    /// Slow duration.
    pub slow_duration: Option<f32>,
    /// Armor reduction applied on hit.
    pub armor_reduction: Option<f32>,
    /// Number of chain lightning targets.
    pub chain_targets: Option<u32>,
    /// Stun duration applied by lightning.
    pub stun_duration: Option<f32>,
    /// Chance of stunning on hit.
    pub stun_chance: Option<f32>,
    /// Chance of freezing on hit.
    pub freeze_chance: Option<f32>,
    /// Freeze duration.
    pub freeze_duration: Option<f32>,
    /// Damage multiplier against frozen enemies.
    pub bonus_vs_frozen: Option<f32>,
    /// Burn damage per second added.
    pub fire_damage: f32,
    /// Burn duration.
    pub burn_duration: Option<f32>,
    /// Attack-speed bonus granted to nearby towers.
    pub aura_speed: Option<f32>,
    /// Damage bonus granted to nearby towers.
    pub aura_damage: Option<f32>,
    /// Range bonus granted to nearby towers.
    pub aura_range: Option<f32>,
    /// Aura reaches every tower on the map.
    pub global_aura: bool,
    /// Gold per income interval added.
    pub income: u32,
    /// Interest rate offered by the vault.
    pub interest: Option<f32>,
    /// Interest rate added on top of the best rate.
    pub interest_bonus: f32,
    /// Gold added to every wave reward.
    pub wave_bonus: u32,
    /// Gold added to every kill reward.
    pub kill_bonus: Option<u32>,
    /// Extra chance of doubling kill rewards.
    pub double_gold: Option<f32>,
    /// Fraction of dealt damage converted to gold.
    pub lifesteal: Option<f32>,
    /// Flat damage granted per gold held.
    pub gold_damage_bonus: Option<f32>,
    /// Gold stolen whenever an enemy dies.
    pub gold_steal: u32,
}

/// Ordered spawn groups of a single wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    /// Groups spawned back to back.
    pub groups: Vec<SpawnGroup>,
    /// Preparation countdown that precedes this wave when it is next.
    pub preparation_secs: f32,
    /// Reward paid on completion; `None` uses the fallback formula.
    #[serde(default)]
    pub bonus: Option<u32>,
}

/// A run of identical enemies separated by a fixed interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Kind of enemy spawned.
    pub kind: EnemyKind,
    /// Number of enemies in the group.
    pub count: u32,
    /// Milliseconds waited after each spawn of this group.
    pub interval_ms: u64,
}

fn enemy(kind: EnemyKind, health: f32, speed: f32, armor: ArmorType, reward: u32) -> EnemyStats {
    EnemyStats {
        kind,
        health,
        speed,
        armor,
        reward,
        flying: false,
    }
}

fn default_enemies() -> Vec<EnemyStats> {
    use ArmorType::{Ethereal, Heavy, Light};
    vec![
        enemy(EnemyKind::Grunt, 50.0, 1.5, Light, 8),
        enemy(EnemyKind::Runner, 30.0, 2.5, Light, 10),
        enemy(EnemyKind::Tank, 150.0, 0.8, Heavy, 20),
        EnemyStats {
            flying: true,
            ..enemy(EnemyKind::Flyer, 40.0, 2.0, Light, 12)
        },
        enemy(EnemyKind::Warlord, 600.0, 0.6, Heavy, 200),
        enemy(EnemyKind::Swarm, 15.0, 3.5, Light, 3),
        enemy(EnemyKind::Necromancer, 250.0, 0.5, Ethereal, 120),
        enemy(EnemyKind::Skeleton, 35.0, 1.8, Light, 2),
        enemy(EnemyKind::Behemoth, 3000.0, 0.25, Heavy, 800),
    ]
}

fn tier(cost: u32, description: &str) -> UpgradeTier {
    UpgradeTier {
        cost,
        description: description.to_owned(),
        ..UpgradeTier::default()
    }
}

fn branch(name: &str, tiers: Vec<UpgradeTier>) -> UpgradeBranchSpec {
    UpgradeBranchSpec {
        name: name.to_owned(),
        tiers,
    }
}

fn elemental(element: Element, name: &str, tiers: Vec<UpgradeTier>) -> ElementalBranchSpec {
    ElementalBranchSpec {
        element,
        name: name.to_owned(),
        tiers,
    }
}

fn default_towers() -> Vec<TowerStats> {
    vec![archer(), crystal(), vault()]
}

fn archer() -> TowerStats {
    TowerStats {
        kind: TowerKind::Archer,
        cost: 40,
        damage: 18.0,
        attack_speed: 1.1,
        range: 120.0,
        damage_type: DamageType::Physical,
        attacks: true,
        income: 0,
        max_count: None,
        branches: vec![
            branch(
                "Sniper",
                vec![
                    UpgradeTier {
                        damage: 10.0,
                        range: 30.0,
                        ..tier(75, "+10 damage, +30 range")
                    },
                    UpgradeTier {
                        damage: 20.0,
                        can_target_flying: true,
                        ..tier(120, "+20 damage, can target flying")
                    },
                    UpgradeTier {
                        damage: 40.0,
                        crit_chance: Some(0.25),
                        ..tier(200, "+40 damage, 25% critical hits")
                    },
                    UpgradeTier {
                        damage: 80.0,
                        armor_penetration: Some(0.5),
                        ..tier(350, "+80 damage, 50% armor penetration")
                    },
                ],
            ),
            branch(
                "Rapid Fire",
                vec![
                    UpgradeTier {
                        attack_speed: 0.3,
                        splash_radius: Some(30.0),
                        ..tier(60, "+0.3 attack speed, splash")
                    },
                    UpgradeTier {
                        attack_speed: 0.3,
                        range: 30.0,
                        ..tier(100, "+0.3 attack speed, +30 range")
                    },
                    UpgradeTier {
                        multi_target: Some(3),
                        ..tier(180, "3 targets at once")
                    },
                    UpgradeTier {
                        attack_speed: 0.4,
                        ricochet_targets: Some(2),
                        ..tier(300, "+0.4 attack speed, ricochet to 2 targets")
                    },
                ],
            ),
            branch(
                "Poisoner",
                vec![
                    UpgradeTier {
                        poison_dps: Some(10.0),
                        poison_duration: Some(3.0),
                        ..tier(70, "Poison: 10 damage per second")
                    },
                    UpgradeTier {
                        slow: Some(0.2),
                        ..tier(110, "Poison slows by 20%")
                    },
                    UpgradeTier {
                        armor_reduction: Some(5.0),
                        ..tier(190, "Reduces armor by 5")
                    },
                    UpgradeTier {
                        poison_explodes: true,
                        ..tier(320, "Poison spreads on death")
                    },
                ],
            ),
        ],
        elements: vec![
            elemental(
                Element::Fire,
                "Pyromancer",
                vec![
                    UpgradeTier {
                        fire_damage: 5.0,
                        burn_duration: Some(3.0),
                        ..tier(0, "Burning arrows")
                    },
                    UpgradeTier {
                        fire_damage: 10.0,
                        splash_radius: Some(40.0),
                        ..tier(100, "Flame burst")
                    },
                    UpgradeTier {
                        fire_damage: 15.0,
                        ..tier(250, "Inferno")
                    },
                    UpgradeTier {
                        fire_damage: 25.0,
                        ..tier(500, "Phoenix strike")
                    },
                ],
            ),
            elemental(
                Element::Ice,
                "Cryomancer",
                vec![
                    UpgradeTier {
                        slow: Some(0.25),
                        slow_duration: Some(2.0),
                        ..tier(0, "Frost arrows")
                    },
                    UpgradeTier {
                        freeze_chance: Some(0.15),
                        freeze_duration: Some(1.0),
                        ..tier(100, "Freezing shot")
                    },
                    UpgradeTier {
                        bonus_vs_frozen: Some(2.0),
                        ..tier(250, "Shatter")
                    },
                    tier(500, "Blizzard"),
                ],
            ),
            elemental(
                Element::Lightning,
                "Storm Archer",
                vec![
                    UpgradeTier {
                        chain_targets: Some(2),
                        ..tier(0, "Charged arrows")
                    },
                    UpgradeTier {
                        stun_chance: Some(0.2),
                        stun_duration: Some(1.0),
                        ..tier(100, "Thunder shot")
                    },
                    UpgradeTier {
                        attack_speed: 0.5,
                        ..tier(250, "Rapid thunder")
                    },
                    tier(500, "Lightning storm"),
                ],
            ),
            elemental(
                Element::Nature,
                "Ranger",
                vec![
                    UpgradeTier {
                        poison_dps: Some(15.0),
                        poison_duration: Some(4.0),
                        ..tier(0, "Poison arrows")
                    },
                    tier(100, "Life sap"),
                    tier(250, "Thorns"),
                    tier(500, "Forest blessing"),
                ],
            ),
            elemental(
                Element::Shadow,
                "Dark Archer",
                vec![
                    UpgradeTier {
                        lifesteal: Some(0.1),
                        ..tier(0, "Life drain")
                    },
                    tier(100, "Cursed arrows"),
                    tier(250, "Fear shot"),
                    tier(500, "Shadow form"),
                ],
            ),
        ],
    }
}

fn crystal() -> TowerStats {
    TowerStats {
        kind: TowerKind::Crystal,
        cost: 70,
        damage: 12.0,
        attack_speed: 0.8,
        range: 100.0,
        damage_type: DamageType::Magic,
        attacks: true,
        income: 0,
        max_count: None,
        branches: vec![
            branch(
                "Frost Nova",
                vec![
                    UpgradeTier {
                        damage: 5.0,
                        slow: Some(0.3),
                        ..tier(100, "+5 damage, 30% slow")
                    },
                    UpgradeTier {
                        damage: 8.0,
                        slow: Some(0.45),
                        ..tier(160, "+8 damage, 45% slow")
                    },
                    UpgradeTier {
                        freeze_chance: Some(0.1),
                        ..tier(280, "10% freeze chance")
                    },
                    UpgradeTier {
                        freeze_chance: Some(0.25),
                        bonus_vs_frozen: Some(2.0),
                        ..tier(450, "25% freeze, double damage to frozen")
                    },
                ],
            ),
            branch(
                "Lightning",
                vec![
                    UpgradeTier {
                        chain_targets: Some(3),
                        ..tier(90, "Chain to 3 targets")
                    },
                    UpgradeTier {
                        chain_targets: Some(5),
                        stun_duration: Some(0.5),
                        ..tier(150, "Chain to 5, stun 0.5s")
                    },
                    UpgradeTier {
                        chain_targets: Some(7),
                        stun_duration: Some(0.75),
                        damage: 10.0,
                        ..tier(260, "Chain to 7, stun 0.75s")
                    },
                    UpgradeTier {
                        chain_targets: Some(999),
                        stun_duration: Some(1.0),
                        damage: 15.0,
                        ..tier(420, "Chain through everything in range, stun 1s")
                    },
                ],
            ),
            branch(
                "Aura",
                vec![
                    UpgradeTier {
                        aura_speed: Some(0.15),
                        ..tier(120, "+15% attack speed to nearby towers")
                    },
                    UpgradeTier {
                        aura_damage: Some(0.1),
                        ..tier(200, "+10% damage to nearby towers")
                    },
                    UpgradeTier {
                        aura_range: Some(0.2),
                        ..tier(350, "+20% range to nearby towers")
                    },
                    UpgradeTier {
                        global_aura: true,
                        ..tier(550, "Aura covers the whole map")
                    },
                ],
            ),
        ],
        elements: vec![
            elemental(
                Element::Fire,
                "Magma Crystal",
                vec![
                    UpgradeTier {
                        fire_damage: 12.0,
                        ..tier(0, "Fire crystal")
                    },
                    tier(120, "Meteor strike"),
                    tier(280, "Inferno zone"),
                    tier(550, "Volcano eruption"),
                ],
            ),
            elemental(
                Element::Ice,
                "Glacier Crystal",
                vec![
                    UpgradeTier {
                        slow: Some(0.4),
                        slow_duration: Some(3.0),
                        ..tier(0, "Frozen aura")
                    },
                    UpgradeTier {
                        freeze_chance: Some(0.25),
                        freeze_duration: Some(1.0),
                        ..tier(120, "Deep freeze")
                    },
                    tier(280, "Ice armor"),
                    tier(550, "Absolute zero"),
                ],
            ),
            elemental(
                Element::Lightning,
                "Storm Crystal",
                vec![
                    UpgradeTier {
                        chain_targets: Some(4),
                        ..tier(0, "Arc crystal")
                    },
                    UpgradeTier {
                        stun_chance: Some(0.3),
                        stun_duration: Some(1.5),
                        ..tier(120, "Stun field")
                    },
                    tier(280, "Overload"),
                    tier(550, "Tempest"),
                ],
            ),
            elemental(
                Element::Nature,
                "Nature Crystal",
                vec![
                    UpgradeTier {
                        poison_dps: Some(20.0),
                        poison_duration: Some(5.0),
                        ..tier(0, "Toxic crystal")
                    },
                    tier(120, "Growth aura"),
                    tier(280, "Entangle"),
                    tier(550, "Mother nature"),
                ],
            ),
            elemental(
                Element::Shadow,
                "Void Crystal",
                vec![
                    UpgradeTier {
                        lifesteal: Some(0.15),
                        ..tier(0, "Void drain")
                    },
                    tier(120, "Void zone"),
                    tier(280, "Consume"),
                    tier(550, "Black hole"),
                ],
            ),
        ],
    }
}

fn vault() -> TowerStats {
    TowerStats {
        kind: TowerKind::Vault,
        cost: 100,
        damage: 0.0,
        attack_speed: 0.0,
        range: 0.0,
        damage_type: DamageType::Pure,
        attacks: false,
        income: 1,
        max_count: Some(3),
        branches: vec![
            branch(
                "Treasury",
                vec![
                    UpgradeTier {
                        income: 3,
                        ..tier(150, "+3 gold per payout")
                    },
                    UpgradeTier {
                        income: 6,
                        ..tier(250, "+6 gold per payout")
                    },
                    UpgradeTier {
                        interest: Some(0.15),
                        ..tier(400, "15% interest")
                    },
                    UpgradeTier {
                        interest: Some(0.25),
                        wave_bonus: 100,
                        ..tier(700, "25% interest, +100 wave bonus")
                    },
                ],
            ),
            branch(
                "Trade",
                vec![
                    UpgradeTier {
                        kill_bonus: Some(2),
                        ..tier(130, "+2 gold per kill")
                    },
                    UpgradeTier {
                        kill_bonus: Some(4),
                        ..tier(220, "+4 gold per kill")
                    },
                    tier(380, "Enemies drop gold"),
                    UpgradeTier {
                        double_gold: Some(0.2),
                        ..tier(650, "+20% double gold chance")
                    },
                ],
            ),
            branch(
                "Battle Fund",
                vec![
                    UpgradeTier {
                        aura_damage: Some(0.2),
                        ..tier(140, "+20% damage to nearby towers")
                    },
                    UpgradeTier {
                        lifesteal: Some(0.05),
                        ..tier(240, "5% of all damage becomes gold")
                    },
                    UpgradeTier {
                        gold_damage_bonus: Some(0.01),
                        ..tier(420, "+1 damage per 100 gold held")
                    },
                    tier(750, "Gold projectiles"),
                ],
            ),
        ],
        elements: vec![
            elemental(
                Element::Fire,
                "Dragon Hoard",
                vec![
                    UpgradeTier {
                        aura_damage: Some(0.1),
                        ..tier(0, "Dragon's presence")
                    },
                    tier(150, "Burning gold"),
                    tier(300, "Phoenix blessing"),
                    tier(600, "Dragon transformation"),
                ],
            ),
            elemental(
                Element::Ice,
                "Frozen Treasury",
                vec![
                    UpgradeTier {
                        interest_bonus: 0.05,
                        ..tier(0, "Frozen assets")
                    },
                    tier(150, "Economic freeze"),
                    tier(300, "Cold storage"),
                    tier(600, "Wealth freeze"),
                ],
            ),
            elemental(
                Element::Lightning,
                "Golden Generator",
                vec![
                    UpgradeTier {
                        income: 2,
                        ..tier(0, "Turbo charge")
                    },
                    tier(150, "Rapid production"),
                    tier(300, "Power surge"),
                    tier(600, "Infinite energy"),
                ],
            ),
            elemental(
                Element::Nature,
                "Verdant Vault",
                vec![
                    UpgradeTier {
                        wave_bonus: 1,
                        ..tier(0, "Natural growth")
                    },
                    tier(150, "Harvest bonus"),
                    tier(300, "Regrowth"),
                    tier(600, "Abundance"),
                ],
            ),
            elemental(
                Element::Shadow,
                "Cursed Coffers",
                vec![
                    UpgradeTier {
                        gold_steal: 1,
                        ..tier(0, "Shadow theft")
                    },
                    tier(150, "Cursed wealth"),
                    tier(300, "Sacrifice"),
                    tier(600, "Dark ritual"),
                ],
            ),
        ],
    }
}

fn wave(preparation_secs: f32, bonus: u32, groups: &[(EnemyKind, u32, u64)]) -> WaveSpec {
    WaveSpec {
        groups: groups
            .iter()
            .map(|&(kind, count, interval_ms)| SpawnGroup {
                kind,
                count,
                interval_ms,
            })
            .collect(),
        preparation_secs,
        bonus: Some(bonus),
    }
}

fn default_waves() -> Vec<WaveSpec> {
    use EnemyKind::{
        Behemoth as B, Flyer as F, Grunt as G, Necromancer as N, Runner as R, Skeleton as S,
        Swarm as W, Tank as T, Warlord as L,
    };
    vec![
        wave(20.0, 100, &[(G, 8, 1000)]),
        wave(20.0, 120, &[(G, 6, 900), (R, 3, 800)]),
        wave(20.0, 140, &[(G, 5, 800), (R, 3, 700), (T, 1, 2000)]),
        wave(20.0, 160, &[(G, 4, 700), (R, 4, 600), (T, 2, 1800)]),
        wave(
            25.0,
            180,
            &[(G, 6, 600), (R, 3, 500), (T, 2, 1500), (F, 2, 900)],
        ),
        wave(25.0, 200, &[(R, 8, 500), (T, 3, 1400)]),
        wave(25.0, 220, &[(G, 10, 500), (T, 3, 1300), (F, 4, 700)]),
        wave(25.0, 240, &[(R, 6, 450), (T, 4, 1200), (F, 5, 650)]),
        wave(25.0, 260, &[(G, 12, 400), (T, 4, 1100), (F, 6, 600)]),
        wave(30.0, 500, &[(G, 6, 500), (T, 2, 1500), (L, 1, 3000)]),
        wave(30.0, 300, &[(R, 12, 400), (T, 5, 1000), (F, 6, 550)]),
        wave(30.0, 320, &[(T, 6, 900), (F, 8, 500)]),
        wave(30.0, 350, &[(R, 15, 350), (T, 6, 800), (F, 8, 450)]),
        wave(35.0, 600, &[(T, 8, 700), (F, 10, 400), (L, 1, 4000)]),
        wave(40.0, 1000, &[(G, 10, 400), (T, 4, 1000), (L, 2, 5000)]),
        wave(35.0, 400, &[(G, 20, 300), (R, 10, 250), (T, 8, 600)]),
        wave(35.0, 450, &[(W, 50, 100), (R, 12, 300), (F, 10, 500)]),
        wave(38.0, 600, &[(T, 10, 500), (L, 1, 3000), (G, 25, 250)]),
        wave(38.0, 550, &[(F, 15, 350), (W, 80, 80), (T, 6, 700)]),
        wave(40.0, 800, &[(W, 100, 60), (T, 6, 800), (L, 1, 5000)]),
        wave(45.0, 600, &[(N, 1, 3000), (S, 20, 200), (T, 5, 600)]),
        wave(45.0, 700, &[(N, 2, 4000), (S, 40, 150), (R, 15, 300)]),
        wave(48.0, 900, &[(W, 150, 50), (N, 1, 5000), (L, 1, 8000)]),
        wave(50.0, 1500, &[(B, 1, 10000), (T, 10, 500), (G, 30, 200)]),
        wave(55.0, 1800, &[(N, 3, 5000), (L, 2, 7000), (S, 60, 100)]),
        wave(55.0, 1000, &[(W, 200, 40), (T, 15, 400), (F, 20, 300)]),
        wave(55.0, 1200, &[(N, 2, 6000), (S, 100, 80), (T, 12, 450)]),
        wave(58.0, 2000, &[(B, 1, 12000), (L, 1, 8000), (W, 150, 50)]),
        wave(60.0, 2500, &[(N, 4, 5000), (B, 1, 15000), (T, 20, 350)]),
        wave(
            65.0,
            5000,
            &[(B, 2, 15000), (L, 3, 10000), (N, 5, 6000), (W, 300, 30)],
        ),
    ]
}
