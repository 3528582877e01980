//! Reasons the world may reject a command.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Element, TowerKind, UpgradeBranch};

/// Reasons a tower construction request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum BuildError {
    /// No tower kind is currently selected.
    #[error("no tower kind selected")]
    NoTowerSelected,
    /// The treasury cannot cover the construction cost.
    #[error("not enough gold: {required} required, {available} available")]
    InsufficientGold {
        /// Gold the construction costs.
        required: u32,
        /// Gold held when the request was evaluated.
        available: u32,
    },
    /// The cell is out of bounds, occupied, on the path or blocked.
    #[error("cell cannot hold a tower")]
    InvalidPlacement,
    /// Placing the tower would disconnect spawn from exit.
    #[error("placement would block the path")]
    PathWouldBeBlocked,
    /// The per-kind construction limit was reached.
    #[error("limit of {limit} {kind:?} towers reached")]
    KindLimitReached {
        /// Kind of tower requested.
        kind: TowerKind,
        /// Maximum number of towers of that kind.
        limit: u32,
    },
}

/// Reasons a branch upgrade request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower exists with the provided identifier.
    #[error("unknown tower")]
    UnknownTower,
    /// The tower already reached its final level.
    #[error("tower is at maximum level")]
    MaxLevelReached,
    /// A different branch was locked by an earlier upgrade.
    #[error("tower is locked to the {locked:?} branch")]
    BranchConflict {
        /// Branch chosen by the tower's first upgrade.
        locked: UpgradeBranch,
    },
    /// The treasury cannot cover the upgrade cost.
    #[error("not enough gold: {required} required, {available} available")]
    InsufficientGold {
        /// Gold the upgrade costs.
        required: u32,
        /// Gold held when the request was evaluated.
        available: u32,
    },
}

/// Reasons a sale request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum SellError {
    /// No tower exists with the provided identifier.
    #[error("unknown tower")]
    UnknownTower,
}

/// Reasons an element selection or elemental upgrade may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum ElementError {
    /// The element is not part of the pending offer.
    #[error("{0:?} is not currently offered")]
    NotOffered(Element),
    /// The element was unlocked earlier.
    #[error("{0:?} is already unlocked")]
    AlreadyUnlocked(Element),
    /// The element has not been unlocked yet.
    #[error("{0:?} is locked")]
    Locked(Element),
    /// No tower exists with the provided identifier.
    #[error("unknown tower")]
    UnknownTower,
    /// Every tier of the element was already applied to the tower.
    #[error("elemental branch fully upgraded")]
    MaxTierReached,
    /// The treasury cannot cover the tier cost.
    #[error("not enough gold: {required} required, {available} available")]
    InsufficientGold {
        /// Gold the tier costs.
        required: u32,
        /// Gold held when the request was evaluated.
        available: u32,
    },
}

/// Umbrella error returned by the world's command entry point.
#[derive(Clone, Copy, Debug, PartialEq, Error, Serialize, Deserialize)]
pub enum CommandError {
    /// Construction failed.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// Branch upgrade failed.
    #[error(transparent)]
    Upgrade(#[from] UpgradeError),
    /// Sale failed.
    #[error(transparent)]
    Sell(#[from] SellError),
    /// Element selection or elemental upgrade failed.
    #[error(transparent)]
    Element(#[from] ElementError),
    /// The run ended in victory or defeat; only a restart is accepted.
    #[error("the game is over")]
    GameFinished,
    /// The requested game speed is not a finite value within bounds.
    #[error("invalid game speed {0}")]
    InvalidGameSpeed(f32),
    /// Preparation can only be skipped between waves.
    #[error("not in a preparation phase")]
    NotInPreparation,
}
