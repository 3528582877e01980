use std::{collections::VecDeque, fmt, time::Duration};

use anyhow::{Context, Result};
use realm_defence_core::{BuildError, Command, CommandError, Event, GamePhase, SoundEffect};
use realm_defence_presentation::{
    present, AudioSink, Dispatcher, HudState, RenderSink, Scene, SceneEntity, UiSink,
};
use realm_defence_system_builder::{Builder, BuilderInput, PlacementPreview};
use realm_defence_world::{self as world, query, World};

use crate::build_order::BuildOrder;

/// Simulated time between two scene snapshots.
const FRAME_INTERVAL: Duration = Duration::from_secs(1);

/// Parameters of a headless run.
#[derive(Clone, Debug)]
pub(crate) struct RunOptions {
    pub(crate) step: Duration,
    pub(crate) max_time: Duration,
    pub(crate) auto_skip: bool,
    pub(crate) speed: Option<f32>,
    pub(crate) orders: Vec<BuildOrder>,
}

/// Final state of a headless run.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Summary {
    pub(crate) phase: GamePhase,
    pub(crate) wave: u32,
    pub(crate) total_waves: usize,
    pub(crate) gold: u32,
    pub(crate) lives: u32,
    pub(crate) kills: u32,
    pub(crate) elapsed: Duration,
    pub(crate) sounds: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.phase {
            GamePhase::Victory => "victory",
            GamePhase::GameOver => "defeat",
            GamePhase::Preparation | GamePhase::WaveActive => "time limit reached",
        };
        writeln!(f, "outcome: {outcome}")?;
        writeln!(f, "wave:    {}/{}", self.wave, self.total_waves)?;
        writeln!(f, "gold:    {}", self.gold)?;
        writeln!(f, "lives:   {}", self.lives)?;
        writeln!(f, "kills:   {}", self.kills)?;
        writeln!(f, "sounds:  {}", self.sounds)?;
        write!(f, "time:    {:.1}s", self.elapsed.as_secs_f32())
    }
}

#[derive(Debug, Default)]
struct HeadlessAudio {
    played: usize,
}

impl AudioSink for HeadlessAudio {
    fn play(&mut self, effect: SoundEffect) {
        self.played += 1;
        log::trace!("play {effect:?}");
    }
}

#[derive(Debug, Default)]
struct HeadlessUi;

impl UiSink for HeadlessUi {
    fn update(&mut self, event: &Event, hud: &HudState) {
        match event {
            Event::CommandRejected { error } => log::debug!("hud: rejected ({error})"),
            _ => log::debug!(
                "hud: gold {} lives {} wave {} {:?}",
                hud.gold,
                hud.lives,
                hud.wave,
                hud.phase
            ),
        }
    }
}

#[derive(Debug, Default)]
struct FrameCounter {
    towers: usize,
    enemies: usize,
    projectiles: usize,
}

impl RenderSink for FrameCounter {
    fn draw(&mut self, entity: &SceneEntity) {
        match entity {
            SceneEntity::Tower { .. } => self.towers += 1,
            SceneEntity::Enemy { .. } => self.enemies += 1,
            SceneEntity::Projectile { .. } => self.projectiles += 1,
        }
    }
}

/// Drives the world headlessly until the run ends or the time limit passes.
pub(crate) fn run(world: &mut World, options: &RunOptions) -> Result<Summary> {
    let mut session = Session {
        builder: Builder::new(),
        dispatcher: Dispatcher::new(HudState::new(&query::config(world).economy)),
        audio: HeadlessAudio::default(),
        ui: HeadlessUi,
        pending: options.orders.iter().copied().collect(),
        events: Vec::new(),
    };

    if let Some(multiplier) = options.speed {
        session
            .submit(world, Command::SetGameSpeed { multiplier })
            .with_context(|| format!("invalid --speed {multiplier}"))?;
    }
    session.place_pending(world);

    let mut elapsed = Duration::ZERO;
    let mut since_frame = Duration::ZERO;
    while elapsed < options.max_time && !query::phase(world).is_terminal() {
        if options.auto_skip
            && query::preparation_remaining(world).is_some_and(|left| left > Duration::ZERO)
        {
            if let Err(error) = session.submit(world, Command::SkipPreparation) {
                log::warn!("could not skip preparation: {error}");
            }
        }
        session
            .submit(world, Command::Tick { dt: options.step })
            .context("world rejected a tick")?;
        elapsed += options.step;

        let wave_cleared = session
            .events
            .iter()
            .any(|event| matches!(event, Event::WaveCompleted { .. }));
        if wave_cleared {
            session.place_pending(world);
        }
        session.flush();

        since_frame += options.step;
        if since_frame >= FRAME_INTERVAL {
            since_frame = Duration::ZERO;
            snapshot(world);
        }
    }

    Ok(Summary {
        phase: query::phase(world),
        wave: query::wave(world),
        total_waves: query::total_waves(world),
        gold: query::gold(world),
        lives: query::lives(world),
        kills: query::kills(world),
        elapsed,
        sounds: session.audio.played,
    })
}

fn snapshot(world: &World) {
    let scene = Scene::from_views(
        &query::enemy_view(world),
        &query::tower_view(world),
        &query::projectiles(world),
    );
    let mut counter = FrameCounter::default();
    present(&scene, &mut counter);
    log::debug!(
        "frame: {} towers, {} enemies, {} projectiles",
        counter.towers,
        counter.enemies,
        counter.projectiles
    );
}

struct Session {
    builder: Builder,
    dispatcher: Dispatcher,
    audio: HeadlessAudio,
    ui: HeadlessUi,
    pending: VecDeque<BuildOrder>,
    events: Vec<Event>,
}

impl Session {
    fn submit(&mut self, world: &mut World, command: Command) -> Result<(), CommandError> {
        world::apply(world, command, &mut self.events)
    }

    fn flush(&mut self) {
        self.dispatcher
            .dispatch(&self.events, &mut self.audio, &mut self.ui);
        self.events.clear();
    }

    /// Builds queued orders in sequence, stopping at the first one that is
    /// not yet affordable.
    fn place_pending(&mut self, world: &mut World) {
        while let Some(order) = self.pending.front().copied() {
            let preview = PlacementPreview::new(
                order.kind,
                order.cell,
                query::is_buildable(world, order.cell),
            );
            let input = BuilderInput {
                select: (self.builder.selected() != Some(order.kind)).then_some(order.kind),
                confirm_action: true,
                cursor_cell: Some(order.cell),
                ..BuilderInput::default()
            };
            let mut commands = Vec::new();
            self.builder.handle(
                &self.events,
                Some(preview),
                input,
                |cell| query::tower_at(world, cell),
                &mut commands,
            );

            let mut outcome = Ok(());
            for command in commands {
                outcome = self.submit(world, command);
            }
            // Selection confirmations must reach the builder before the next order.
            self.builder.handle(
                &self.events,
                None,
                BuilderInput::default(),
                |_| None,
                &mut Vec::new(),
            );
            self.flush();

            match outcome {
                Err(CommandError::Build(BuildError::InsufficientGold { .. })) => return,
                Err(error) => {
                    log::warn!("dropping build order {order:?}: {error}");
                    let _ = self.pending.pop_front();
                }
                Ok(()) => {
                    if !query::is_buildable(world, order.cell)
                        && query::tower_at(world, order.cell).is_some()
                    {
                        log::info!("built {:?} at {:?}", order.kind, order.cell);
                    } else {
                        log::warn!("build order {order:?} was not placeable");
                    }
                    let _ = self.pending.pop_front();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_defence_core::{CellCoord, GameConfig, TowerKind};

    fn options(orders: Vec<BuildOrder>) -> RunOptions {
        RunOptions {
            step: Duration::from_millis(50),
            max_time: Duration::from_secs(5),
            auto_skip: true,
            speed: None,
            orders,
        }
    }

    #[test]
    fn orders_are_built_in_sequence() {
        let mut world = World::new();
        let orders = vec![
            BuildOrder {
                kind: TowerKind::Archer,
                cell: CellCoord::new(1, 9),
            },
            BuildOrder {
                kind: TowerKind::Crystal,
                cell: CellCoord::new(3, 8),
            },
        ];
        let summary = run(&mut world, &options(orders)).expect("run completes");

        assert_eq!(query::tower_view(&world).iter().count(), 2);
        assert_eq!(summary.wave, 1, "auto-skip starts the first wave");
        assert!(summary.sounds > 0, "build and wave sounds were requested");
    }

    #[test]
    fn unaffordable_orders_wait() {
        let mut world = World::with_config(GameConfig {
            economy: realm_defence_core::EconomyConfig {
                starting_gold: 50,
                ..realm_defence_core::EconomyConfig::default()
            },
            ..GameConfig::default()
        })
        .expect("valid config");
        let orders = vec![
            BuildOrder {
                kind: TowerKind::Vault,
                cell: CellCoord::new(0, 0),
            },
            BuildOrder {
                kind: TowerKind::Archer,
                cell: CellCoord::new(1, 9),
            },
        ];
        let summary = run(&mut world, &options(orders)).expect("run completes");

        assert_eq!(
            query::tower_view(&world).iter().count(),
            0,
            "the vault blocks the queue until gold arrives"
        );
        assert_eq!(summary.gold, 50);
    }

    #[test]
    fn out_of_range_speed_stops_the_run() {
        for multiplier in [0.0, 10.0, f32::NAN] {
            let mut world = World::new();
            let options = RunOptions {
                speed: Some(multiplier),
                ..options(Vec::new())
            };
            let error = run(&mut world, &options).expect_err("speed rejected");
            assert!(
                error.to_string().contains("--speed"),
                "unexpected error: {error:#}"
            );
            assert_eq!(query::wave(&world), 0, "no tick ran");
        }
    }

    #[test]
    fn supported_speed_is_applied() {
        let mut world = World::new();
        let options = RunOptions {
            speed: Some(2.0),
            max_time: Duration::from_millis(500),
            ..options(Vec::new())
        };
        let summary = run(&mut world, &options).expect("run completes");
        assert_eq!(summary.elapsed, Duration::from_millis(500));
        assert_eq!(query::game_speed(&world), 2.0);
    }

    #[test]
    fn summary_reports_outcome() {
        let summary = Summary {
            phase: GamePhase::Victory,
            wave: 30,
            total_waves: 30,
            gold: 12,
            lives: 3,
            kills: 900,
            elapsed: Duration::from_secs(3),
            sounds: 0,
        };
        let text = summary.to_string();
        assert!(text.starts_with("outcome: victory"));
        assert!(text.contains("wave:    30/30"));
    }
}
