#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.
//!
//! A tower keeps its previous target while that enemy stays alive, in range
//! and targetable. Otherwise it switches to the valid enemy that has covered
//! the largest share of its route, with lower identifiers winning ties.

use realm_defence_core::{
    EnemyId, EnemySnapshot, EnemyView, TowerId, TowerSnapshot, TowerTarget, TowerView, WorldPoint,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Towers that do not attack never receive a target.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if enemies.is_empty() {
            return;
        }

        self.prepare_tower_workspace(towers);

        for tower in &self.tower_workspace {
            if let Some(current) = tower.previous.and_then(|id| enemies.get(id)) {
                if tower.can_engage(current) {
                    out.push(TowerTarget {
                        tower: tower.id,
                        enemy: current.id,
                    });
                    continue;
                }
            }

            let mut best: Option<BestCandidate> = None;
            for enemy in enemies.iter() {
                if !tower.can_engage(enemy) {
                    continue;
                }

                let current = BestCandidate {
                    progress: enemy.progress,
                    enemy: enemy.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        let (lower, _) = towers.iter().size_hint();
        self.tower_workspace.reserve(lower);

        for snapshot in towers.iter().filter(|snapshot| snapshot.attacks) {
            if snapshot.range <= 0.0 {
                continue;
            }
            self.tower_workspace.push(TowerWorkspace::from_snapshot(snapshot));
        }
    }
}

/// Reports whether `tower` may attack `enemy`: in range, alive and, for
/// flying enemies, only when the tower can target them.
#[must_use]
pub fn can_engage(tower: &TowerSnapshot, enemy: &EnemySnapshot) -> bool {
    TowerWorkspace::from_snapshot(tower).can_engage(enemy)
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: WorldPoint,
    range: f32,
    can_target_flying: bool,
    previous: Option<EnemyId>,
}

impl TowerWorkspace {
    fn from_snapshot(snapshot: &TowerSnapshot) -> Self {
        Self {
            id: snapshot.id,
            position: snapshot.position,
            range: snapshot.range,
            can_target_flying: snapshot.can_target_flying,
            previous: snapshot.target,
        }
    }

    fn can_engage(&self, enemy: &EnemySnapshot) -> bool {
        if enemy.health <= 0.0 {
            return false;
        }
        if enemy.flying && !self.can_target_flying {
            return false;
        }
        self.position.distance(enemy.position) <= self.range
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    progress: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.progress != other.progress {
            return self.progress > other.progress;
        }

        self.enemy < other.enemy
    }
}

#[cfg(test)]
mod tests {
    use super::{can_engage, TowerTargeting};
    use realm_defence_core::{
        CellCoord, EnemyId, EnemyKind, EnemySnapshot, EnemyView, StatusFlags, TowerId, TowerKind,
        TowerSnapshot, TowerTarget, TowerView, WorldPoint,
    };

    fn tower_snapshot(id: u32, position: (f32, f32), range: f32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKind::Archer,
            cell: CellCoord::new(0, 0),
            position: WorldPoint::new(position.0, position.1),
            level: 1,
            branch: None,
            total_invested: 40,
            attacks: true,
            damage: 18.0,
            range,
            can_target_flying: false,
            ready: true,
            target: None,
            multi_target: 1,
            chain_targets: 0,
        }
    }

    fn enemy_snapshot(id: u32, position: (f32, f32), progress: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Grunt,
            position: WorldPoint::new(position.0, position.1),
            health: 50.0,
            max_health: 50.0,
            progress,
            flying: false,
            status: StatusFlags::default(),
        }
    }

    fn run(towers: Vec<TowerSnapshot>, enemies: Vec<EnemySnapshot>) -> Vec<TowerTarget> {
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();
        system.handle(
            &TowerView::from_snapshots(towers),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    #[test]
    fn targets_enemy_within_range() {
        let out = run(
            vec![tower_snapshot(1, (100.0, 100.0), 120.0)],
            vec![enemy_snapshot(2, (150.0, 100.0), 0.1)],
        );

        assert_eq!(
            out,
            vec![TowerTarget {
                tower: TowerId::new(1),
                enemy: EnemyId::new(2),
            }]
        );
    }

    #[test]
    fn enemy_outside_range_is_ignored() {
        let out = run(
            vec![tower_snapshot(1, (0.0, 0.0), 120.0)],
            vec![enemy_snapshot(2, (400.0, 0.0), 0.5)],
        );

        assert!(out.is_empty());
    }

    #[test]
    fn furthest_along_enemy_is_preferred() {
        let out = run(
            vec![tower_snapshot(1, (0.0, 0.0), 200.0)],
            vec![
                enemy_snapshot(1, (10.0, 0.0), 0.2),
                enemy_snapshot(2, (90.0, 0.0), 0.6),
                enemy_snapshot(3, (50.0, 0.0), 0.4),
            ],
        );

        assert_eq!(out[0].enemy, EnemyId::new(2));
    }

    #[test]
    fn smaller_enemy_id_is_preferred_when_progress_matches() {
        let out = run(
            vec![tower_snapshot(1, (0.0, 0.0), 200.0)],
            vec![
                enemy_snapshot(20, (10.0, 0.0), 0.5),
                enemy_snapshot(10, (90.0, 0.0), 0.5),
            ],
        );

        assert_eq!(out[0].enemy, EnemyId::new(10));
    }

    #[test]
    fn previous_target_is_kept_while_valid() {
        let mut tower = tower_snapshot(1, (0.0, 0.0), 200.0);
        tower.target = Some(EnemyId::new(5));
        let out = run(
            vec![tower],
            vec![
                enemy_snapshot(5, (50.0, 0.0), 0.1),
                enemy_snapshot(6, (60.0, 0.0), 0.9),
            ],
        );

        assert_eq!(out[0].enemy, EnemyId::new(5), "sticky target retained");
    }

    #[test]
    fn previous_target_is_dropped_once_out_of_range() {
        let mut tower = tower_snapshot(1, (0.0, 0.0), 100.0);
        tower.target = Some(EnemyId::new(5));
        let out = run(
            vec![tower],
            vec![
                enemy_snapshot(5, (150.0, 0.0), 0.9),
                enemy_snapshot(6, (60.0, 0.0), 0.1),
            ],
        );

        assert_eq!(out[0].enemy, EnemyId::new(6));
    }

    #[test]
    fn flying_enemies_require_capability() {
        let mut flyer = enemy_snapshot(3, (20.0, 0.0), 0.9);
        flyer.flying = true;
        let grounded = tower_snapshot(1, (0.0, 0.0), 100.0);
        assert!(!can_engage(&grounded, &flyer));

        let out = run(vec![grounded], vec![flyer]);
        assert!(out.is_empty(), "grounded tower must ignore flyers");

        let mut sniper = tower_snapshot(2, (0.0, 0.0), 100.0);
        sniper.can_target_flying = true;
        assert!(can_engage(&sniper, &flyer));
    }

    #[test]
    fn non_attacking_towers_produce_no_target() {
        let mut vault = tower_snapshot(1, (0.0, 0.0), 100.0);
        vault.kind = TowerKind::Vault;
        vault.attacks = false;
        let out = run(vec![vault], vec![enemy_snapshot(1, (10.0, 0.0), 0.3)]);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_collections_produce_no_targets() {
        assert!(run(Vec::new(), vec![enemy_snapshot(1, (1.0, 1.0), 0.0)]).is_empty());
        assert!(run(vec![tower_snapshot(1, (0.0, 0.0), 100.0)], Vec::new()).is_empty());
    }
}
