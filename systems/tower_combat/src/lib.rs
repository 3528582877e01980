#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that plans attacks for towers whose cooldown has elapsed.
//!
//! Each ready tower with a target produces exactly one [`AttackPlan`]: a
//! chain when the tower carries chain targets, a volley when it strikes
//! several enemies at once, and a single projectile otherwise.

use std::cmp::Ordering;

use realm_defence_core::{
    AttackKind, AttackPlan, EnemyId, EnemySnapshot, EnemyView, TowerSnapshot, TowerTarget,
    TowerView, WorldPoint,
};

/// Tuning for attack planning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    chain_range_fraction: f32,
}

impl Config {
    /// Creates a configuration where each chain hop reaches
    /// `chain_range_fraction` of the tower's range.
    #[must_use]
    pub const fn new(chain_range_fraction: f32) -> Self {
        Self {
            chain_range_fraction,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(0.6)
    }
}

/// Tower combat system that plans attacks for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    config: Config,
    candidates: Vec<Candidate>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            candidates: Vec::new(),
        }
    }

    /// Appends an [`AttackPlan`] for every targeted tower that is ready.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        enemies: &EnemyView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<AttackPlan>,
    ) {
        if tower_targets.is_empty() || enemies.is_empty() {
            return;
        }

        for target in tower_targets {
            let Some(tower) = towers.get(target.tower) else {
                continue;
            };
            if !tower.ready || !tower.attacks {
                continue;
            }
            if enemies.get(target.enemy).is_none() {
                continue;
            }

            let kind = if tower.chain_targets > 0 {
                let links = self.plan_chain(tower, enemies);
                if links.is_empty() {
                    continue;
                }
                AttackKind::Chain { links }
            } else if tower.multi_target > 1 {
                self.collect_candidates(tower, enemies);
                let limit = usize::try_from(tower.multi_target).unwrap_or(usize::MAX);
                let targets: Vec<EnemyId> = self
                    .candidates
                    .iter()
                    .take(limit)
                    .map(|candidate| candidate.id)
                    .collect();
                AttackKind::Projectiles { targets }
            } else {
                AttackKind::Projectiles {
                    targets: vec![target.enemy],
                }
            };

            out.push(AttackPlan {
                tower: tower.id,
                kind,
            });
        }
    }

    fn plan_chain(&mut self, tower: &TowerSnapshot, enemies: &EnemyView) -> Vec<EnemyId> {
        self.collect_candidates(tower, enemies);
        let Some(primary) = self.candidates.first().copied() else {
            return Vec::new();
        };

        let hop_range = tower.range * self.config.chain_range_fraction;
        let hops = usize::try_from(tower.chain_targets)
            .unwrap_or(usize::MAX)
            .min(self.candidates.len());

        let mut links = Vec::with_capacity(hops);
        links.push(primary.id);
        let mut last = primary.position;

        while links.len() < hops {
            let next = self
                .candidates
                .iter()
                .filter(|candidate| !links.contains(&candidate.id))
                .map(|candidate| (candidate, last.distance(candidate.position)))
                .filter(|(_, distance)| *distance <= hop_range)
                .min_by(|(a, da), (b, db)| {
                    da.partial_cmp(db)
                        .unwrap_or(Ordering::Equal)
                        .then_with(|| a.id.cmp(&b.id))
                });

            let Some((candidate, _)) = next else {
                break;
            };
            links.push(candidate.id);
            last = candidate.position;
        }

        links
    }

    /// Gathers every engageable enemy ordered by descending route progress.
    fn collect_candidates(&mut self, tower: &TowerSnapshot, enemies: &EnemyView) {
        self.candidates.clear();
        self.candidates.extend(
            enemies
                .iter()
                .filter(|enemy| in_reach(tower, enemy))
                .map(|enemy| Candidate {
                    id: enemy.id,
                    progress: enemy.progress,
                    position: enemy.position,
                }),
        );
        self.candidates.sort_by(|a, b| {
            b.progress
                .partial_cmp(&a.progress)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
    }
}

fn in_reach(tower: &TowerSnapshot, enemy: &EnemySnapshot) -> bool {
    enemy.health > 0.0
        && (!enemy.flying || tower.can_target_flying)
        && tower.position.distance(enemy.position) <= tower.range
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: EnemyId,
    progress: f32,
    position: WorldPoint,
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_defence_core::{
        CellCoord, EnemyKind, StatusFlags, TowerId, TowerKind, TowerSnapshot, WorldPoint,
    };

    fn tower(id: u32, ready: bool) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKind::Crystal,
            cell: CellCoord::new(0, 0),
            position: WorldPoint::new(0.0, 0.0),
            level: 1,
            branch: None,
            total_invested: 70,
            attacks: true,
            damage: 12.0,
            range: 100.0,
            can_target_flying: false,
            ready,
            target: None,
            multi_target: 1,
            chain_targets: 0,
        }
    }

    fn enemy(id: u32, x: f32, progress: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Grunt,
            position: WorldPoint::new(x, 0.0),
            health: 50.0,
            max_health: 50.0,
            progress,
            flying: false,
            status: StatusFlags::default(),
        }
    }

    fn target(tower: u32, enemy: u32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            enemy: EnemyId::new(enemy),
        }
    }

    fn ids(values: &[u32]) -> Vec<EnemyId> {
        values.iter().copied().map(EnemyId::new).collect()
    }

    #[test]
    fn firing_respects_cooldown_readiness() {
        let mut system = TowerCombat::default();
        let towers = TowerView::from_snapshots(vec![tower(2, true), tower(5, false)]);
        let enemies = EnemyView::from_snapshots(vec![enemy(4, 10.0, 0.1), enemy(1, 20.0, 0.2)]);
        let mut out = Vec::new();

        system.handle(&towers, &enemies, &[target(2, 4), target(5, 1)], &mut out);

        assert_eq!(
            out,
            vec![AttackPlan {
                tower: TowerId::new(2),
                kind: AttackKind::Projectiles { targets: ids(&[4]) },
            }],
        );
    }

    #[test]
    fn missing_towers_and_enemies_are_skipped() {
        let mut system = TowerCombat::default();
        let towers = TowerView::from_snapshots(vec![tower(8, true)]);
        let enemies = EnemyView::from_snapshots(vec![enemy(2, 10.0, 0.1)]);
        let mut out = Vec::new();

        system.handle(&towers, &enemies, &[target(42, 2), target(8, 99)], &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn multi_target_strikes_leading_enemies() {
        let mut system = TowerCombat::default();
        let mut volley = tower(1, true);
        volley.multi_target = 2;
        let towers = TowerView::from_snapshots(vec![volley]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(1, 10.0, 0.1),
            enemy(2, 20.0, 0.5),
            enemy(3, 30.0, 0.3),
            enemy(4, 500.0, 0.9),
        ]);
        let mut out = Vec::new();

        system.handle(&towers, &enemies, &[target(1, 2)], &mut out);

        assert_eq!(
            out[0].kind,
            AttackKind::Projectiles {
                targets: ids(&[2, 3])
            },
            "out-of-range enemy 4 must not be struck"
        );
    }

    #[test]
    fn chain_hops_to_nearest_unvisited_neighbour() {
        let mut system = TowerCombat::new(Config::new(0.6));
        let mut arc = tower(1, true);
        arc.chain_targets = 3;
        let towers = TowerView::from_snapshots(vec![arc]);
        // Hop radius is 60 units.
        let enemies = EnemyView::from_snapshots(vec![
            enemy(1, 90.0, 0.9),
            enemy(2, 40.0, 0.2),
            enemy(3, 70.0, 0.1),
        ]);
        let mut out = Vec::new();

        system.handle(&towers, &enemies, &[target(1, 2)], &mut out);

        assert_eq!(
            out[0].kind,
            AttackKind::Chain {
                links: ids(&[1, 3, 2])
            }
        );
    }

    #[test]
    fn chain_stops_when_no_neighbour_is_close_enough() {
        let mut system = TowerCombat::default();
        let mut arc = tower(1, true);
        arc.chain_targets = 999;
        arc.range = 200.0;
        let towers = TowerView::from_snapshots(vec![arc]);
        let enemies = EnemyView::from_snapshots(vec![enemy(1, 10.0, 0.8), enemy(2, 190.0, 0.2)]);
        let mut out = Vec::new();

        system.handle(&towers, &enemies, &[target(1, 1)], &mut out);

        assert_eq!(out[0].kind, AttackKind::Chain { links: ids(&[1]) });
    }
}
