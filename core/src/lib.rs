#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Realm Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point and broadcasts [`Event`] values describing what
//! happened. Pure systems read immutable views such as [`EnemyView`] and
//! [`TowerView`] and answer with plans the world carries out.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod config;
mod damage;
mod errors;

pub use config::{
    CombatConfig, ConfigError, Delivery, EconomyConfig, ElementalBranchSpec, EnemyStats,
    EnemyTuning, GameConfig, GridConfig, MilestoneBonus, PathLayout, SpawnGroup, TimingConfig,
    TowerStats, UpgradeBranchSpec, UpgradeTier, WaveSpec, UPGRADE_BRANCH_COUNT,
};
pub use damage::{damage_multiplier, penetrated_multiplier, ArmorType, DamageType};
pub use errors::{BuildError, CommandError, ElementError, SellError, UpgradeError};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided real-time delta.
    Tick {
        /// Real time elapsed since the previous tick.
        dt: Duration,
    },
    /// Chooses the tower kind used by subsequent build requests.
    SelectTowerKind {
        /// Kind to build, or `None` to cancel building.
        kind: Option<TowerKind>,
    },
    /// Requests construction of the selected tower kind.
    BuildTower {
        /// Cell that should hold the tower.
        cell: CellCoord,
    },
    /// Requests the next tier of an upgrade branch.
    UpgradeTower {
        /// Tower being upgraded.
        tower: TowerId,
        /// Branch the tier is drawn from.
        branch: UpgradeBranch,
    },
    /// Requests the next tier of an elemental branch.
    UpgradeElemental {
        /// Tower being upgraded.
        tower: TowerId,
        /// Element whose branch is advanced.
        element: Element,
    },
    /// Unlocks one of the currently offered elements.
    ChooseElement {
        /// Element to unlock.
        element: Element,
    },
    /// Requests the sale of a tower.
    SellTower {
        /// Tower being sold.
        tower: TowerId,
    },
    /// Pauses or resumes the simulation.
    TogglePause,
    /// Scales simulated time relative to real time.
    SetGameSpeed {
        /// Multiplier applied to every clamped tick.
        multiplier: f32,
    },
    /// Ends the current preparation countdown immediately.
    SkipPreparation,
    /// Discards the current run and starts afresh.
    RestartGame,
    /// Spawns an enemy at the path entrance outside the wave schedule.
    SpawnEnemy {
        /// Kind of enemy to spawn.
        kind: EnemyKind,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Simulated time that elapsed after clamping and speed scaling.
        dt: Duration,
    },
    /// Reports the treasury after any change.
    GoldChanged {
        /// Gold now held.
        gold: u32,
    },
    /// Reports the remaining lives after any change.
    LivesChanged {
        /// Lives now remaining.
        lives: u32,
    },
    /// Confirms that the build selection changed.
    TowerKindSelected {
        /// Kind now selected, if any.
        kind: Option<TowerKind>,
    },
    /// Confirms that a tower was built.
    TowerBuilt {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Kind of tower built.
        kind: TowerKind,
        /// Cell the tower occupies.
        cell: CellCoord,
        /// Gold spent.
        cost: u32,
    },
    /// Confirms that a tower advanced along an upgrade branch.
    TowerUpgraded {
        /// Upgraded tower.
        tower: TowerId,
        /// Branch the tier was drawn from.
        branch: UpgradeBranch,
        /// Level reached.
        level: u8,
        /// Gold spent.
        cost: u32,
    },
    /// Confirms that a tower advanced along an elemental branch.
    TowerElementUpgraded {
        /// Upgraded tower.
        tower: TowerId,
        /// Element advanced.
        element: Element,
        /// Number of elemental tiers now applied.
        tier: u8,
        /// Gold spent.
        cost: u32,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Sold tower.
        tower: TowerId,
        /// Cell freed by the sale.
        cell: CellCoord,
        /// Gold refunded.
        refund: u32,
    },
    /// Announces that an enemy entered the field.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of enemy spawned.
        kind: EnemyKind,
        /// Position the enemy appeared at.
        position: WorldPoint,
    },
    /// Announces that an enemy died.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Gold awarded for the kill.
        reward: u32,
    },
    /// Announces that an enemy escaped through the exit.
    EnemyEscaped {
        /// Enemy that escaped.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
    },
    /// Announces that a boss or variant used an ability.
    AbilityUsed {
        /// Enemy that used the ability.
        enemy: EnemyId,
        /// Ability used.
        ability: EnemyAbility,
    },
    /// Announces that a tower attacked.
    TowerAttacked {
        /// Attacking tower.
        tower: TowerId,
        /// Enemies targeted, primary first.
        targets: Vec<EnemyId>,
    },
    /// Announces the start of a preparation countdown.
    PreparationStarted {
        /// One-based number of the wave that follows.
        next_wave: u32,
        /// Length of the countdown.
        duration: Duration,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
    },
    /// Announces that every enemy of a wave was dealt with.
    WaveCompleted {
        /// One-based wave number.
        wave: u32,
        /// Completion reward paid.
        reward: u32,
        /// Interest paid.
        interest: u32,
        /// Milestone bonus paid.
        milestone: u32,
    },
    /// Offers a choice between newly available elements.
    ElementChoiceOffered {
        /// Elements on offer.
        choices: Vec<Element>,
    },
    /// Confirms that an element was unlocked.
    ElementUnlocked {
        /// Element unlocked.
        element: Element,
    },
    /// Confirms a change of the pause state.
    PauseToggled {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// Confirms a change of the game speed.
    GameSpeedChanged {
        /// Multiplier now applied.
        multiplier: f32,
    },
    /// Confirms that the run was restarted.
    GameRestarted,
    /// Announces that the final wave was cleared.
    Victory,
    /// Announces that the last life was lost.
    GameOver,
    /// Requests playback of a sound effect.
    SoundRequested {
        /// Effect to play.
        effect: SoundEffect,
    },
    /// Reports that a command was rejected.
    CommandRejected {
        /// Reason for the rejection.
        error: CommandError,
    },
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Continuous position in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: WorldPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Moves up to `step` units toward `target`, never overshooting.
    #[must_use]
    pub fn step_toward(self, target: WorldPoint, step: f32) -> WorldPoint {
        let distance = self.distance(target);
        if distance <= step || distance <= f32::EPSILON {
            return target;
        }
        let ratio = step / distance;
        WorldPoint::new(
            self.x + (target.x - self.x) * ratio,
            self.y + (target.y - self.y) * ratio,
        )
    }
}

/// Kinds of enemies that march along the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline foot soldier.
    Grunt,
    /// Fast, fragile scout that sprints when wounded.
    Runner,
    /// Slow armored brute that blocks construction where it stands.
    Tank,
    /// Airborne raider that ignores the path.
    Flyer,
    /// Boss that roars, summons grunts and shells itself.
    Warlord,
    /// Tiny, numerous and quick.
    Swarm,
    /// Ethereal caster that raises skeletons.
    Necromancer,
    /// Minion raised by necromancers.
    Skeleton,
    /// Colossal regenerating boss.
    Behemoth,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [EnemyKind; 9] = [
        Self::Grunt,
        Self::Runner,
        Self::Tank,
        Self::Flyer,
        Self::Warlord,
        Self::Swarm,
        Self::Necromancer,
        Self::Skeleton,
        Self::Behemoth,
    ];

    /// Reports whether the kind is a boss.
    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(self, Self::Warlord | Self::Behemoth)
    }
}

/// Abilities enemies trigger on their own timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyAbility {
    /// Runner sprint on low health.
    Sprint,
    /// Warlord haste aura.
    Roar,
    /// Warlord grunt summon.
    Summon,
    /// Warlord magic shell.
    Shell,
    /// Necromancer skeleton raising.
    RaiseDead,
    /// Behemoth earthquake shaking the given number of towers.
    Earthquake {
        /// Towers within reach of the quake.
        towers: u32,
    },
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Cheap physical single-target tower.
    Archer,
    /// Magic tower with crowd-control branches.
    Crystal,
    /// Economic building that never attacks.
    Vault,
}

impl TowerKind {
    /// Every tower kind in declaration order.
    pub const ALL: [TowerKind; 3] = [Self::Archer, Self::Crystal, Self::Vault];
}

/// One of the three mutually exclusive upgrade branches of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeBranch {
    /// Sniper, Frost Nova or Treasury.
    First,
    /// Rapid Fire, Lightning or Trade.
    Second,
    /// Poisoner, Aura or Battle Fund.
    Third,
}

impl UpgradeBranch {
    /// Every branch in table order.
    pub const ALL: [UpgradeBranch; 3] = [Self::First, Self::Second, Self::Third];

    /// Zero-based position of the branch within a tower's branch table.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
        }
    }
}

/// Elements unlocked at milestone waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    /// Burning damage over time.
    Fire,
    /// Slows and freezes.
    Ice,
    /// Chains and stuns.
    Lightning,
    /// Poison.
    Nature,
    /// Gold drain.
    Shadow,
}

impl Element {
    /// Every element in declaration order.
    pub const ALL: [Element; 5] = [
        Self::Fire,
        Self::Ice,
        Self::Lightning,
        Self::Nature,
        Self::Shadow,
    ];
}

/// Sound effects the simulation asks the audio adapter to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// A tower fired.
    Shoot,
    /// A projectile connected.
    Hit,
    /// An enemy died.
    Explosion,
    /// Gold was earned.
    Gold,
    /// A wave started.
    WaveStart,
    /// A tower was upgraded.
    Upgrade,
    /// A tower was built.
    Build,
    /// The run was lost.
    GameOver,
    /// The run was won.
    Victory,
}

/// High-level state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Counting down toward the next wave.
    Preparation,
    /// A wave is spawning or its enemies are still alive.
    WaveActive,
    /// The final wave was cleared.
    Victory,
    /// Every life was lost.
    GameOver,
}

impl GamePhase {
    /// Reports whether the run has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::GameOver)
    }
}

/// Status effects currently affecting an enemy, for presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StatusFlags {
    /// Speed multiplier below one is active.
    pub slowed: bool,
    /// Speed multiplier above one is active.
    pub hasted: bool,
    /// Movement suppressed by a stun.
    pub stunned: bool,
    /// Movement suppressed by a freeze.
    pub frozen: bool,
    /// Poison is ticking.
    pub poisoned: bool,
    /// Burn is ticking.
    pub burning: bool,
    /// Armor is reduced.
    pub armor_reduced: bool,
    /// Recently struck by lightning.
    pub lightning: bool,
    /// Magic shell is up.
    pub shelled: bool,
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Current position.
    pub position: WorldPoint,
    /// Remaining health.
    pub health: f32,
    /// Maximum health after wave scaling.
    pub max_health: f32,
    /// Fraction of the route already covered, from 0 to 1.
    pub progress: f32,
    /// Whether the enemy flies.
    pub flying: bool,
    /// Active status effects.
    pub status: StatusFlags,
}

impl EnemySnapshot {
    /// Remaining health as a fraction of the maximum.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }
}

/// Read-only snapshot describing every living enemy.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Centre of the tower in world units.
    pub position: WorldPoint,
    /// Current level, starting at 1.
    pub level: u8,
    /// Branch locked by the first upgrade.
    pub branch: Option<UpgradeBranch>,
    /// Gold spent on construction and upgrades.
    pub total_invested: u32,
    /// Whether the tower attacks at all.
    pub attacks: bool,
    /// Effective damage per hit including auras.
    pub damage: f32,
    /// Effective targeting radius including auras.
    pub range: f32,
    /// Whether flying enemies may be targeted.
    pub can_target_flying: bool,
    /// Whether the attack cooldown has elapsed.
    pub ready: bool,
    /// Enemy targeted during the previous tick.
    pub target: Option<EnemyId>,
    /// Number of enemies struck per attack.
    pub multi_target: u32,
    /// Number of chain lightning targets; zero disables chaining.
    pub chain_targets: u32,
}

/// Read-only snapshot describing all towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific tower.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of an in-flight projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Tower that fired it.
    pub tower: TowerId,
    /// Enemy it is homing on.
    pub target: EnemyId,
    /// Current position.
    pub position: WorldPoint,
}

/// Target assignment chosen for a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TowerTarget {
    /// Tower holding the target.
    pub tower: TowerId,
    /// Enemy targeted.
    pub enemy: EnemyId,
}

/// Shape of a planned attack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttackKind {
    /// Fire one projectile at each listed enemy, primary first.
    Projectiles {
        /// Enemies struck.
        targets: Vec<EnemyId>,
    },
    /// Arc lightning through the listed enemies in order.
    Chain {
        /// Enemies struck, primary first.
        links: Vec<EnemyId>,
    },
}

/// Attack a ready tower should perform this tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackPlan {
    /// Attacking tower.
    pub tower: TowerId,
    /// How the attack is delivered.
    pub kind: AttackKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn step_toward_stops_at_target() {
        let origin = WorldPoint::new(0.0, 0.0);
        let target = WorldPoint::new(3.0, 4.0);
        let halfway = origin.step_toward(target, 2.5);
        assert!((halfway.x() - 1.5).abs() < 1e-6);
        assert!((halfway.y() - 2.0).abs() < 1e-6);
        assert_eq!(origin.step_toward(target, 10.0), target);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&TowerId::new(42));
        assert_round_trip(&EnemyId::new(7));
        assert_round_trip(&CellCoord::new(5, 7));
    }

    #[test]
    fn command_errors_round_trip_through_bincode() {
        assert_round_trip(&CommandError::from(BuildError::InsufficientGold {
            required: 70,
            available: 12,
        }));
        assert_round_trip(&CommandError::from(UpgradeError::BranchConflict {
            locked: UpgradeBranch::Second,
        }));
        assert_round_trip(&CommandError::from(ElementError::NotOffered(
            Element::Shadow,
        )));
    }

    #[test]
    fn build_error_messages_are_readable() {
        let error = BuildError::InsufficientGold {
            required: 40,
            available: 10,
        };
        assert_eq!(
            error.to_string(),
            "not enough gold: 40 required, 10 available"
        );
    }

    #[test]
    fn enemy_view_sorts_and_finds_by_id() {
        let snapshot = |id: u32| EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Grunt,
            position: WorldPoint::default(),
            health: 10.0,
            max_health: 20.0,
            progress: 0.0,
            flying: false,
            status: StatusFlags::default(),
        };
        let view = EnemyView::from_snapshots(vec![snapshot(9), snapshot(2), snapshot(5)]);
        let ids: Vec<u32> = view.iter().map(|enemy| enemy.id.get()).collect();
        assert_eq!(ids, vec![2, 5, 9]);
        assert!(view.get(EnemyId::new(5)).is_some());
        assert!(view.get(EnemyId::new(4)).is_none());
        assert!((snapshot(1).health_fraction() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn branch_indices_follow_table_order() {
        let indices: Vec<usize> = UpgradeBranch::ALL.iter().map(|b| b.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
