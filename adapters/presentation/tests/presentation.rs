use glam::Vec2;
use realm_defence_core::{
    CellCoord, EnemyId, EnemyKind, EnemySnapshot, EnemyView, Event, GamePhase, ProjectileId,
    ProjectileSnapshot, SoundEffect, StatusFlags, TowerId, TowerKind, TowerSnapshot, TowerView,
    WorldPoint,
};
use realm_defence_presentation::{
    present, AudioSink, Dispatcher, HudState, RenderSink, Scene, SceneEntity, UiSink,
};

#[derive(Default)]
struct Recorder {
    drawn: Vec<SceneEntity>,
    played: Vec<SoundEffect>,
    refreshed: Vec<(Event, u32)>,
}

impl RenderSink for Recorder {
    fn draw(&mut self, entity: &SceneEntity) {
        self.drawn.push(*entity);
    }
}

impl AudioSink for Recorder {
    fn play(&mut self, effect: SoundEffect) {
        self.played.push(effect);
    }
}

impl UiSink for Recorder {
    fn update(&mut self, event: &Event, hud: &HudState) {
        self.refreshed.push((event.clone(), hud.gold));
    }
}

fn grunt(id: u32, health: f32) -> EnemySnapshot {
    EnemySnapshot {
        id: EnemyId::new(id),
        kind: EnemyKind::Grunt,
        position: WorldPoint::new(20.0, 420.0),
        health,
        max_health: 50.0,
        progress: 0.1,
        flying: false,
        status: StatusFlags::default(),
    }
}

fn vault() -> TowerSnapshot {
    TowerSnapshot {
        id: TowerId::new(0),
        kind: TowerKind::Vault,
        cell: CellCoord::new(0, 0),
        position: WorldPoint::new(20.0, 20.0),
        level: 1,
        branch: None,
        total_invested: 100,
        attacks: false,
        damage: 0.0,
        range: 90.0,
        can_target_flying: false,
        ready: false,
        target: None,
        multi_target: 1,
        chain_targets: 0,
    }
}

#[test]
fn scene_draws_each_entity_once() {
    let enemies = EnemyView::from_snapshots(vec![grunt(3, 25.0), grunt(1, 50.0)]);
    let towers = TowerView::from_snapshots(vec![vault()]);
    let projectiles = [ProjectileSnapshot {
        id: ProjectileId::new(0),
        tower: TowerId::new(0),
        target: EnemyId::new(1),
        position: WorldPoint::new(30.0, 30.0),
    }];

    let scene = Scene::from_views(&enemies, &towers, &projectiles);
    let mut recorder = Recorder::default();
    present(&scene, &mut recorder);

    assert_eq!(recorder.drawn, scene.entities, "drawn in scene order");
    assert_eq!(scene.len(), 4);
    match scene.entities[0] {
        SceneEntity::Tower { range, .. } => assert_eq!(range, 0.0, "vaults show no range"),
        other => panic!("expected the tower first, got {other:?}"),
    }
    match scene.entities[2] {
        SceneEntity::Enemy {
            id,
            position,
            health_fraction,
            ..
        } => {
            assert_eq!(id, EnemyId::new(3));
            assert_eq!(position, Vec2::new(20.0, 420.0));
            assert!((health_fraction - 0.5).abs() < 1e-6);
        }
        other => panic!("expected an enemy, got {other:?}"),
    }
    assert!(matches!(
        scene.entities[3],
        SceneEntity::Projectile { .. }
    ));
}

#[test]
fn dispatcher_routes_sounds_and_hud_events() {
    let mut dispatcher = Dispatcher::default();
    let mut audio = Recorder::default();
    let mut ui = Recorder::default();

    dispatcher.dispatch(
        &[
            Event::TowerBuilt {
                tower: TowerId::new(0),
                kind: TowerKind::Archer,
                cell: CellCoord::new(1, 9),
                cost: 40,
            },
            Event::GoldChanged { gold: 160 },
            Event::SoundRequested {
                effect: SoundEffect::Build,
            },
            Event::WaveStarted { wave: 1 },
            Event::SoundRequested {
                effect: SoundEffect::WaveStart,
            },
        ],
        &mut audio,
        &mut ui,
    );

    assert_eq!(audio.played, vec![SoundEffect::Build, SoundEffect::WaveStart]);
    assert!(ui.played.is_empty(), "sounds never reach the UI");
    assert_eq!(
        ui.refreshed,
        vec![
            (Event::GoldChanged { gold: 160 }, 160),
            (Event::WaveStarted { wave: 1 }, 160),
        ]
    );
    let hud = dispatcher.hud();
    assert_eq!(hud.wave, 1);
    assert_eq!(hud.phase, GamePhase::WaveActive);
}

#[test]
fn restart_clears_run_progress() {
    let mut dispatcher = Dispatcher::default();
    let mut sink = Recorder::default();
    dispatcher.dispatch(
        &[
            Event::WaveStarted { wave: 4 },
            Event::PauseToggled { paused: true },
            Event::GameOver,
        ],
        &mut Recorder::default(),
        &mut sink,
    );
    assert_eq!(dispatcher.hud().phase, GamePhase::GameOver);

    dispatcher.dispatch(
        &[
            Event::GameRestarted,
            Event::GoldChanged { gold: 200 },
            Event::LivesChanged { lives: 25 },
        ],
        &mut Recorder::default(),
        &mut sink,
    );
    let hud = dispatcher.hud();
    assert_eq!(hud.wave, 0);
    assert!(!hud.paused);
    assert_eq!(hud.phase, GamePhase::Preparation);
    assert_eq!((hud.gold, hud.lives), (200, 25));
}
