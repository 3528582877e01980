#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation contracts shared by Realm Defence adapters.
//!
//! Adapters never reach into the world directly. They build a [`Scene`] from
//! the read-only views the world exposes, hand it to a [`RenderSink`], and
//! route the events produced by each command through a [`Dispatcher`] that
//! feeds an [`AudioSink`] and a [`UiSink`].

mod hud;

use glam::Vec2;
use realm_defence_core::{
    EnemyId, EnemyKind, EnemyView, Event, ProjectileId, ProjectileSnapshot, SoundEffect,
    StatusFlags, TowerId, TowerKind, TowerView, WorldPoint,
};

pub use hud::HudState;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        self.mix(Color::new(1.0, 1.0, 1.0, self.alpha), amount)
    }

    /// Blends towards `other` by `amount`, keeping this color's alpha.
    #[must_use]
    pub fn mix(self, other: Color, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        Self {
            red: blend_channel(self.red, other.red, amount),
            green: blend_channel(self.green, other.green, amount),
            blue: blend_channel(self.blue, other.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn blend_channel(from: f32, to: f32, amount: f32) -> f32 {
    from + (to - from) * amount
}

/// Per-kind colors and status tints used when building scenes.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    /// Fallback for kinds without a dedicated color.
    pub default_enemy: Color,
    /// Color of projectiles in flight.
    pub projectile: Color,
    /// Tint applied to frozen enemies.
    pub frozen: Color,
    /// Tint applied to poisoned enemies.
    pub poisoned: Color,
    /// Tint applied to burning enemies.
    pub burning: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            default_enemy: Color::from_rgb_u8(200, 60, 60),
            projectile: Color::from_rgb_u8(250, 230, 120),
            frozen: Color::from_rgb_u8(150, 210, 255),
            poisoned: Color::from_rgb_u8(90, 200, 80),
            burning: Color::from_rgb_u8(255, 130, 40),
        }
    }
}

impl Palette {
    /// Base body color of an enemy kind.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind) -> Color {
        match kind {
            EnemyKind::Grunt => self.default_enemy,
            EnemyKind::Runner => Color::from_rgb_u8(230, 180, 60),
            EnemyKind::Tank => Color::from_rgb_u8(110, 110, 120),
            EnemyKind::Flyer => Color::from_rgb_u8(170, 120, 220),
            EnemyKind::Warlord => Color::from_rgb_u8(140, 20, 20),
            EnemyKind::Swarm => Color::from_rgb_u8(220, 100, 150),
            EnemyKind::Necromancer => Color::from_rgb_u8(60, 40, 90),
            EnemyKind::Skeleton => Color::from_rgb_u8(225, 225, 210),
            EnemyKind::Behemoth => Color::from_rgb_u8(70, 50, 30),
        }
    }

    /// Base color of a tower kind.
    #[must_use]
    pub fn tower(&self, kind: TowerKind) -> Color {
        match kind {
            TowerKind::Archer => Color::from_rgb_u8(120, 90, 50),
            TowerKind::Crystal => Color::from_rgb_u8(80, 140, 230),
            TowerKind::Vault => Color::from_rgb_u8(230, 190, 40),
        }
    }

    fn tinted(&self, base: Color, status: StatusFlags) -> Color {
        if status.frozen {
            base.mix(self.frozen, 0.6)
        } else if status.burning {
            base.mix(self.burning, 0.4)
        } else if status.poisoned {
            base.mix(self.poisoned, 0.4)
        } else {
            base
        }
    }
}

/// Single drawable item of a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneEntity {
    /// Living enemy.
    Enemy {
        /// Enemy identifier.
        id: EnemyId,
        /// Kind, for sprite selection.
        kind: EnemyKind,
        /// Centre in world units.
        position: Vec2,
        /// Body radius in world units.
        radius: f32,
        /// Body color after status tinting.
        color: Color,
        /// Remaining health from 0 to 1.
        health_fraction: f32,
        /// Status flags, for overlays.
        status: StatusFlags,
    },
    /// Standing tower.
    Tower {
        /// Tower identifier.
        id: TowerId,
        /// Kind, for sprite selection.
        kind: TowerKind,
        /// Centre in world units.
        position: Vec2,
        /// Targeting radius; zero for towers that never attack.
        range: f32,
        /// Current level.
        level: u8,
        /// Body color, lightened with level.
        color: Color,
    },
    /// Projectile in flight.
    Projectile {
        /// Projectile identifier.
        id: ProjectileId,
        /// Current position in world units.
        position: Vec2,
        /// Fill color.
        color: Color,
    },
}

/// Draw list built from the world's read-only views.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Towers first, then enemies, then projectiles.
    pub entities: Vec<SceneEntity>,
}

impl Scene {
    /// Builds a scene with the default palette.
    #[must_use]
    pub fn from_views(
        enemies: &EnemyView,
        towers: &TowerView,
        projectiles: &[ProjectileSnapshot],
    ) -> Self {
        Self::from_views_with_palette(enemies, towers, projectiles, &Palette::default())
    }

    /// Builds a scene using the provided palette.
    #[must_use]
    pub fn from_views_with_palette(
        enemies: &EnemyView,
        towers: &TowerView,
        projectiles: &[ProjectileSnapshot],
        palette: &Palette,
    ) -> Self {
        let mut entities = Vec::with_capacity(enemies.len() + projectiles.len());
        entities.extend(towers.iter().map(|tower| SceneEntity::Tower {
            id: tower.id,
            kind: tower.kind,
            position: to_vec2(tower.position),
            range: if tower.attacks { tower.range } else { 0.0 },
            level: tower.level,
            color: palette
                .tower(tower.kind)
                .lighten(f32::from(tower.level.saturating_sub(1)) * 0.1),
        }));
        entities.extend(enemies.iter().map(|enemy| SceneEntity::Enemy {
            id: enemy.id,
            kind: enemy.kind,
            position: to_vec2(enemy.position),
            radius: body_radius(enemy.kind),
            color: palette.tinted(palette.enemy(enemy.kind), enemy.status),
            health_fraction: enemy.health_fraction(),
            status: enemy.status,
        }));
        entities.extend(
            projectiles
                .iter()
                .map(|projectile| SceneEntity::Projectile {
                    id: projectile.id,
                    position: to_vec2(projectile.position),
                    color: palette.projectile,
                }),
        );
        Self { entities }
    }

    /// Number of drawable entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Reports whether nothing would be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

fn to_vec2(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}

fn body_radius(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::Swarm | EnemyKind::Skeleton => 6.0,
        EnemyKind::Tank => 14.0,
        EnemyKind::Warlord => 18.0,
        EnemyKind::Behemoth => 22.0,
        _ => 10.0,
    }
}

/// Backend that draws scene entities.
pub trait RenderSink {
    /// Draws one entity.
    fn draw(&mut self, entity: &SceneEntity);
}

/// Backend that plays sound effects.
pub trait AudioSink {
    /// Plays an effect; failures are the sink's concern.
    fn play(&mut self, effect: SoundEffect);
}

/// Backend that refreshes the player's HUD.
pub trait UiSink {
    /// Receives a UI-relevant event together with the refreshed HUD state.
    fn update(&mut self, event: &Event, hud: &HudState);
}

/// Draws every entity of the scene exactly once, in order.
pub fn present<R>(scene: &Scene, sink: &mut R)
where
    R: RenderSink + ?Sized,
{
    for entity in &scene.entities {
        sink.draw(entity);
    }
}

/// Routes world events to audio and UI sinks.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    hud: HudState,
}

impl Dispatcher {
    /// Creates a dispatcher starting from the provided HUD state.
    #[must_use]
    pub fn new(hud: HudState) -> Self {
        Self { hud }
    }

    /// HUD state folded from every event dispatched so far.
    #[must_use]
    pub fn hud(&self) -> &HudState {
        &self.hud
    }

    /// Forwards sound requests to `audio` and UI-relevant events to `ui`.
    pub fn dispatch<A, U>(&mut self, events: &[Event], audio: &mut A, ui: &mut U)
    where
        A: AudioSink + ?Sized,
        U: UiSink + ?Sized,
    {
        for event in events {
            if let Event::SoundRequested { effect } = event {
                log::trace!("sound {effect:?}");
                audio.play(*effect);
                continue;
            }
            if self.hud.apply(event) {
                ui.update(event, &self.hud);
            }
        }
    }
}
