use std::time::Duration;

use realm_defence_core::{
    BuildError, CellCoord, Command, CommandError, Delivery, Element, ElementError, EnemyKind,
    Event, GameConfig, GamePhase, GridConfig, PathLayout, SpawnGroup, TowerId, TowerKind,
    UpgradeBranch, UpgradeError, WaveSpec, WorldPoint,
};
use realm_defence_world::{self as world, query, World};

const ARCHER_CELL: CellCoord = CellCoord::new(1, 9);
const STEP: Duration = Duration::from_millis(50);

fn instant_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.combat.delivery = Delivery::Instant;
    config.economy.double_gold_chance = 0.0;
    config
}

fn run(world: &mut World, command: Command) -> (Result<(), CommandError>, Vec<Event>) {
    let mut events = Vec::new();
    let result = world::apply(world, command, &mut events);
    (result, events)
}

fn build(world: &mut World, kind: TowerKind, cell: CellCoord) -> TowerId {
    let _ = run(world, Command::SelectTowerKind { kind: Some(kind) });
    let (result, events) = run(world, Command::BuildTower { cell });
    result.expect("build accepted");
    events
        .iter()
        .find_map(|event| match event {
            Event::TowerBuilt { tower, .. } => Some(*tower),
            _ => None,
        })
        .expect("tower built event")
}

fn tick(world: &mut World, steps: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..steps {
        world::apply(world, Command::Tick { dt: STEP }, &mut events).expect("tick accepted");
    }
    events
}

#[test]
fn archer_hits_grunt_end_to_end() {
    let mut world = World::with_config(instant_config()).expect("valid config");
    assert_eq!(query::gold(&world), 200);

    let _ = build(&mut world, TowerKind::Archer, ARCHER_CELL);
    assert_eq!(query::gold(&world), 160, "archer costs 40");

    let (result, _) = run(&mut world, Command::SpawnEnemy { kind: EnemyKind::Grunt });
    result.expect("spawn accepted");
    let events = tick(&mut world, 1);

    let enemies = query::enemy_view(&world);
    let grunt = enemies.iter().next().expect("grunt alive");
    assert!((grunt.health - 32.0).abs() < 1e-4, "health {}", grunt.health);
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::EnemyKilled { .. })),
        "grunt survives a single arrow"
    );
    assert!(events.iter().any(|event| matches!(
        event,
        Event::TowerAttacked { targets, .. } if targets == &vec![grunt.id]
    )));
}

#[test]
fn homing_projectile_travels_before_hitting() {
    let mut config = GameConfig::default();
    config.economy.double_gold_chance = 0.0;
    let mut world = World::with_config(config).expect("valid config");
    let _ = build(&mut world, TowerKind::Archer, ARCHER_CELL);
    let _ = run(&mut world, Command::SpawnEnemy { kind: EnemyKind::Grunt });

    let _ = tick(&mut world, 1);
    assert_eq!(query::projectiles(&world).len(), 1, "arrow in flight");
    assert!((query::enemy_view(&world).iter().next().expect("grunt").health - 50.0).abs() < 1e-4);

    let _ = tick(&mut world, 4);
    let grunt = query::enemy_view(&world);
    let grunt = grunt.iter().next().expect("grunt alive");
    assert!((grunt.health - 32.0).abs() < 1e-4, "health {}", grunt.health);
}

#[test]
fn death_is_reported_once() {
    let mut config = instant_config();
    for stats in &mut config.enemies {
        if stats.kind == EnemyKind::Grunt {
            stats.health = 10.0;
        }
    }
    let mut world = World::with_config(config).expect("valid config");
    let _ = build(&mut world, TowerKind::Archer, ARCHER_CELL);
    let _ = build(&mut world, TowerKind::Archer, CellCoord::new(1, 11));
    assert_eq!(query::gold(&world), 120);

    let _ = run(&mut world, Command::SpawnEnemy { kind: EnemyKind::Grunt });
    let events = tick(&mut world, 5);

    let kills: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemyKilled { reward, .. } => Some(*reward),
            _ => None,
        })
        .collect();
    assert_eq!(kills, vec![8], "single kill with the grunt reward");
    assert_eq!(query::gold(&world), 128);
    assert_eq!(query::kills(&world), 1);
    assert!(query::enemy_view(&world).is_empty());
}

#[test]
fn branch_lock_and_level_cap() {
    let mut config = GameConfig::default();
    config.economy.starting_gold = 2000;
    let mut world = World::with_config(config).expect("valid config");
    let archer = build(&mut world, TowerKind::Archer, ARCHER_CELL);

    let (result, events) = run(
        &mut world,
        Command::UpgradeTower {
            tower: archer,
            branch: UpgradeBranch::First,
        },
    );
    result.expect("first upgrade");
    assert!(events.contains(&Event::TowerUpgraded {
        tower: archer,
        branch: UpgradeBranch::First,
        level: 2,
        cost: 75,
    }));

    let (result, _) = run(
        &mut world,
        Command::UpgradeTower {
            tower: archer,
            branch: UpgradeBranch::Second,
        },
    );
    assert_eq!(
        result,
        Err(CommandError::Upgrade(UpgradeError::BranchConflict {
            locked: UpgradeBranch::First,
        }))
    );

    for _ in 0..2 {
        let (result, _) = run(
            &mut world,
            Command::UpgradeTower {
                tower: archer,
                branch: UpgradeBranch::First,
            },
        );
        result.expect("same branch upgrade");
    }
    let tower = query::tower_view(&world);
    let tower = tower.get(archer).expect("archer exists");
    assert_eq!(tower.level, 4);
    assert_eq!(tower.total_invested, 40 + 75 + 120 + 200);
    assert!(tower.can_target_flying);

    let (result, _) = run(
        &mut world,
        Command::UpgradeTower {
            tower: archer,
            branch: UpgradeBranch::First,
        },
    );
    assert_eq!(
        result,
        Err(CommandError::Upgrade(UpgradeError::MaxLevelReached))
    );
    assert_eq!(query::gold(&world), 2000 - 435);
}

#[test]
fn selling_refunds_and_frees_the_cell() {
    let mut world = World::new();
    let archer = build(&mut world, TowerKind::Archer, ARCHER_CELL);
    assert!(!query::is_buildable(&world, ARCHER_CELL));

    let (result, events) = run(&mut world, Command::SellTower { tower: archer });
    result.expect("sale accepted");
    assert!(events.contains(&Event::TowerSold {
        tower: archer,
        cell: ARCHER_CELL,
        refund: 28,
    }));
    assert_eq!(query::gold(&world), 188);
    assert!(query::is_buildable(&world, ARCHER_CELL));
    assert_eq!(query::tower_at(&world, ARCHER_CELL), None);

    let (result, _) = run(&mut world, Command::SellTower { tower: archer });
    assert_eq!(
        result,
        Err(CommandError::Sell(realm_defence_core::SellError::UnknownTower))
    );
}

#[test]
fn open_layout_rejects_disconnecting_placement() {
    let mut config = GameConfig::default();
    config.grid = GridConfig {
        columns: 3,
        rows: 3,
        layout: PathLayout::Open {
            spawn: CellCoord::new(0, 1),
            exit: CellCoord::new(2, 1),
        },
        ..GridConfig::default()
    };
    let mut world = World::with_config(config).expect("valid config");
    let _ = build(&mut world, TowerKind::Archer, CellCoord::new(1, 0));
    let _ = build(&mut world, TowerKind::Archer, CellCoord::new(1, 2));
    let path_before = query::ground_path(&world).to_vec();

    let (result, events) = run(
        &mut world,
        Command::BuildTower {
            cell: CellCoord::new(1, 1),
        },
    );
    assert_eq!(
        result,
        Err(CommandError::Build(BuildError::PathWouldBeBlocked))
    );
    assert!(events.contains(&Event::CommandRejected {
        error: CommandError::Build(BuildError::PathWouldBeBlocked),
    }));
    assert_eq!(query::gold(&world), 120, "no gold spent");
    assert_eq!(query::tower_at(&world, CellCoord::new(1, 1)), None);
    assert_eq!(query::tower_view(&world).into_vec().len(), 2);
    assert_eq!(query::ground_path(&world), path_before.as_slice());
}

#[test]
fn rejected_builds_leave_state_untouched() {
    let mut config = GameConfig::default();
    config.economy.starting_gold = 10;
    let mut world = World::with_config(config).expect("valid config");

    let (result, _) = run(&mut world, Command::BuildTower { cell: ARCHER_CELL });
    assert_eq!(result, Err(CommandError::Build(BuildError::NoTowerSelected)));

    let _ = run(
        &mut world,
        Command::SelectTowerKind {
            kind: Some(TowerKind::Archer),
        },
    );
    let (result, _) = run(&mut world, Command::BuildTower { cell: ARCHER_CELL });
    assert_eq!(
        result,
        Err(CommandError::Build(BuildError::InsufficientGold {
            required: 40,
            available: 10,
        }))
    );

    let on_path = CellCoord::new(0, 10);
    let (result, _) = run(&mut world, Command::BuildTower { cell: on_path });
    assert!(result.is_err(), "path cells never hold towers");
    assert_eq!(query::gold(&world), 10);
    assert!(query::tower_view(&world).into_vec().is_empty());
    assert!(query::is_buildable(&world, ARCHER_CELL));
}

#[test]
fn vaults_are_limited_and_pay_income() {
    let mut config = GameConfig::default();
    config.economy.starting_gold = 1000;
    let mut world = World::with_config(config).expect("valid config");
    for column in [0, 1, 3] {
        let _ = build(&mut world, TowerKind::Vault, CellCoord::new(column, 0));
    }
    assert_eq!(query::gold(&world), 700);

    let (result, _) = run(
        &mut world,
        Command::BuildTower {
            cell: CellCoord::new(4, 0),
        },
    );
    assert_eq!(
        result,
        Err(CommandError::Build(BuildError::KindLimitReached {
            kind: TowerKind::Vault,
            limit: 3,
        }))
    );

    let _ = tick(&mut world, 62);
    assert_eq!(query::gold(&world), 703, "each vault pays once per three seconds");
}

#[test]
fn wave_completes_exactly_once() {
    let mut config = instant_config();
    config.timing.initial_preparation_secs = 0.0;
    for stats in &mut config.enemies {
        if stats.kind == EnemyKind::Grunt {
            stats.health = 1.0;
        }
    }
    config.waves = vec![
        WaveSpec {
            groups: vec![SpawnGroup {
                kind: EnemyKind::Grunt,
                count: 3,
                interval_ms: 1000,
            }],
            preparation_secs: 0.0,
            bonus: None,
        },
        WaveSpec {
            groups: vec![SpawnGroup {
                kind: EnemyKind::Grunt,
                count: 1,
                interval_ms: 1000,
            }],
            preparation_secs: 500.0,
            bonus: None,
        },
    ];
    let mut world = World::with_config(config).expect("valid config");
    let _ = build(&mut world, TowerKind::Archer, ARCHER_CELL);

    let events = tick(&mut world, 1200);
    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count();
    let completed: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::WaveCompleted { .. }))
        .collect();
    let preparations = events
        .iter()
        .filter(|event| matches!(event, Event::PreparationStarted { next_wave: 2, .. }))
        .count();

    assert_eq!(spawned, 3);
    assert_eq!(completed.len(), 1, "completion fires once");
    assert!(matches!(
        completed[0],
        Event::WaveCompleted {
            wave: 1,
            reward: 60,
            ..
        }
    ));
    assert_eq!(preparations, 1);
    assert_eq!(query::phase(&world), GamePhase::Preparation);
}

#[test]
fn escaping_enemies_end_the_run() {
    let mut config = GameConfig::default();
    config.economy.starting_lives = 1;
    let mut world = World::with_config(config).expect("valid config");
    let _ = run(&mut world, Command::SpawnEnemy { kind: EnemyKind::Flyer });

    let events = tick(&mut world, 200);
    let game_overs = events
        .iter()
        .filter(|event| matches!(event, Event::GameOver))
        .count();
    assert_eq!(game_overs, 1);
    assert!(events.contains(&Event::LivesChanged { lives: 0 }));
    assert_eq!(query::phase(&world), GamePhase::GameOver);

    let (result, _) = run(
        &mut world,
        Command::SelectTowerKind {
            kind: Some(TowerKind::Archer),
        },
    );
    assert_eq!(result, Err(CommandError::GameFinished));
    let (result, _) = run(&mut world, Command::Tick { dt: STEP });
    assert_eq!(result, Ok(()), "ticks are ignored once the run ended");

    let (result, events) = run(&mut world, Command::RestartGame);
    result.expect("restart accepted");
    assert!(events.contains(&Event::GameRestarted));
    assert_eq!(query::phase(&world), GamePhase::Preparation);
    assert_eq!(query::lives(&world), 1);
}

#[test]
fn speed_pause_and_skip_are_validated() {
    let mut world = World::new();

    for invalid in [0.0, -1.0, 4.5, f32::INFINITY] {
        let (result, _) = run(&mut world, Command::SetGameSpeed { multiplier: invalid });
        assert!(
            matches!(result, Err(CommandError::InvalidGameSpeed(_))),
            "{invalid} rejected"
        );
    }
    let (result, _) = run(&mut world, Command::SetGameSpeed { multiplier: f32::NAN });
    assert!(matches!(result, Err(CommandError::InvalidGameSpeed(_))));
    let (result, _) = run(&mut world, Command::SetGameSpeed { multiplier: 2.0 });
    result.expect("speed accepted");
    assert_eq!(query::game_speed(&world), 2.0);

    let _ = run(&mut world, Command::TogglePause);
    assert!(query::is_paused(&world));
    let events = tick(&mut world, 3);
    assert!(events.is_empty(), "paused ticks do nothing");
    let _ = run(&mut world, Command::TogglePause);

    let (result, _) = run(&mut world, Command::SkipPreparation);
    result.expect("skip during preparation");
    let events = tick(&mut world, 1);
    assert!(events.contains(&Event::WaveStarted { wave: 1 }));
    let advanced = events
        .iter()
        .find_map(|event| match event {
            Event::TimeAdvanced { dt } => Some(*dt),
            _ => None,
        })
        .expect("time advanced");
    assert!(
        (advanced.as_secs_f32() - 0.1).abs() < 1e-4,
        "double speed scales the step, got {advanced:?}"
    );
    assert_eq!(query::phase(&world), GamePhase::WaveActive);

    let (result, _) = run(&mut world, Command::SkipPreparation);
    assert_eq!(result, Err(CommandError::NotInPreparation));
}

#[test]
fn elements_require_an_offer_and_an_unlock() {
    let mut world = World::new();
    let archer = build(&mut world, TowerKind::Archer, ARCHER_CELL);

    let (result, _) = run(
        &mut world,
        Command::ChooseElement {
            element: Element::Fire,
        },
    );
    assert_eq!(
        result,
        Err(CommandError::Element(ElementError::NotOffered(Element::Fire)))
    );

    let (result, _) = run(
        &mut world,
        Command::UpgradeElemental {
            tower: archer,
            element: Element::Fire,
        },
    );
    assert_eq!(
        result,
        Err(CommandError::Element(ElementError::Locked(Element::Fire)))
    );
    assert_eq!(query::elemental_tier(&world, archer, Element::Fire), Some(0));
    assert!(query::pending_element_choices(&world).is_empty());
}

#[test]
fn restart_resets_the_run() {
    let mut world = World::new();
    let _ = build(&mut world, TowerKind::Archer, ARCHER_CELL);
    let _ = run(&mut world, Command::SetGameSpeed { multiplier: 3.0 });

    let (result, _) = run(&mut world, Command::RestartGame);
    result.expect("restart accepted");
    assert_eq!(query::gold(&world), 200);
    assert!(query::tower_view(&world).into_vec().is_empty());
    assert_eq!(query::game_speed(&world), 1.0);
    assert_eq!(query::wave(&world), 0);
    assert!(query::is_buildable(&world, ARCHER_CELL));
}

#[test]
fn cursor_positions_on_grid_edges_map_to_their_cell() {
    let world = World::new();
    assert_eq!(
        query::world_to_grid(&world, WorldPoint::new(0.0, 0.0)),
        Some(CellCoord::new(0, 0))
    );
    assert_eq!(
        query::world_to_grid(&world, WorldPoint::new(40.0, 0.0)),
        Some(CellCoord::new(1, 0))
    );
    let centre = query::grid_to_world(&world, ARCHER_CELL);
    assert_eq!(query::world_to_grid(&world, centre), Some(ARCHER_CELL));
}
