//! HUD state folded from world events.

use realm_defence_core::{CommandError, Element, EconomyConfig, Event, GamePhase};

/// Everything the HUD shows, kept current by folding events.
#[derive(Clone, Debug, PartialEq)]
pub struct HudState {
    /// Gold held.
    pub gold: u32,
    /// Lives remaining.
    pub lives: u32,
    /// Latest wave started.
    pub wave: u32,
    /// Current phase of the run.
    pub phase: GamePhase,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Current game speed.
    pub speed: f32,
    /// Elements waiting for the player's choice.
    pub element_offer: Vec<Element>,
    /// Most recent rejection, cleared by the next accepted change.
    pub last_rejection: Option<CommandError>,
}

impl Default for HudState {
    fn default() -> Self {
        Self::new(&EconomyConfig::default())
    }
}

impl HudState {
    /// Creates the HUD state of a fresh run.
    #[must_use]
    pub fn new(economy: &EconomyConfig) -> Self {
        Self {
            gold: economy.starting_gold,
            lives: economy.starting_lives,
            wave: 0,
            phase: GamePhase::Preparation,
            paused: false,
            speed: 1.0,
            element_offer: Vec::new(),
            last_rejection: None,
        }
    }

    /// Folds one event; returns `true` when the event concerns the HUD.
    pub fn apply(&mut self, event: &Event) -> bool {
        match event {
            Event::GoldChanged { gold } => self.gold = *gold,
            Event::LivesChanged { lives } => self.lives = *lives,
            Event::WaveStarted { wave } => {
                self.wave = *wave;
                self.phase = GamePhase::WaveActive;
            }
            Event::WaveCompleted { .. } => {}
            Event::PreparationStarted { .. } => self.phase = GamePhase::Preparation,
            Event::ElementChoiceOffered { choices } => self.element_offer.clone_from(choices),
            Event::ElementUnlocked { .. } => self.element_offer.clear(),
            Event::PauseToggled { paused } => self.paused = *paused,
            Event::GameSpeedChanged { multiplier } => self.speed = *multiplier,
            Event::Victory => self.phase = GamePhase::Victory,
            Event::GameOver => self.phase = GamePhase::GameOver,
            Event::GameRestarted => {
                let (gold, lives) = (self.gold, self.lives);
                *self = Self {
                    gold,
                    lives,
                    ..Self::default()
                };
            }
            Event::CommandRejected { error } => {
                self.last_rejection = Some(*error);
                return true;
            }
            _ => return false,
        }
        self.last_rejection = None;
        true
    }
}
