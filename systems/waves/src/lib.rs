#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduler that paces enemy spawns.
//!
//! The scheduler alternates between a preparation countdown and an active
//! wave. While a wave is active it releases queued spawns as simulated time
//! accumulates; the world reports how many enemies remain alive and the
//! scheduler announces completion exactly once per wave.

use std::{collections::VecDeque, time::Duration};

use realm_defence_core::{EnemyKind, WaveSpec};

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Debug)]
pub struct Config {
    waves: Vec<WaveSpec>,
    initial_preparation: Duration,
}

impl Config {
    /// Creates a new configuration from the wave table and the countdown that
    /// precedes the first wave.
    #[must_use]
    pub fn new(waves: Vec<WaveSpec>, initial_preparation: Duration) -> Self {
        Self {
            waves,
            initial_preparation,
        }
    }
}

/// Current stage of the wave cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// Counting down before the next wave.
    Preparation {
        /// Time left before the wave starts.
        remaining: Duration,
    },
    /// Spawning enemies or waiting for the survivors to be cleared.
    Active,
    /// Every wave was cleared.
    Victory,
    /// The run was lost; nothing further is scheduled.
    Halted,
}

/// Transitions and spawn requests produced by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveAction {
    /// A wave began.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
    },
    /// An enemy should enter the field.
    Spawn {
        /// Kind of enemy to spawn.
        kind: EnemyKind,
        /// One-based wave number the enemy belongs to.
        wave: u32,
    },
    /// A wave was fully cleared.
    WaveCompleted {
        /// One-based wave number.
        wave: u32,
        /// Completion bonus defined by the wave, if any.
        bonus: Option<u32>,
    },
    /// A preparation countdown began.
    PreparationStarted {
        /// One-based number of the wave that follows.
        next_wave: u32,
        /// Length of the countdown.
        duration: Duration,
    },
    /// The final wave was cleared.
    Victory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct QueuedSpawn {
    kind: EnemyKind,
    interval: Duration,
}

/// Pure system that owns the wave cycle.
#[derive(Debug)]
pub struct WaveScheduler {
    waves: Vec<WaveSpec>,
    phase: WavePhase,
    current_wave: u32,
    queue: VecDeque<QueuedSpawn>,
    spawn_debt: Duration,
}

impl WaveScheduler {
    /// Creates a new scheduler counting down toward the first wave.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            waves: config.waves,
            phase: WavePhase::Preparation {
                remaining: config.initial_preparation,
            },
            current_wave: 0,
            queue: VecDeque::new(),
            spawn_debt: Duration::ZERO,
        }
    }

    /// Current stage of the wave cycle.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// One-based number of the latest wave started, or zero before the first.
    #[must_use]
    pub fn current_wave(&self) -> u32 {
        self.current_wave
    }

    /// Number of waves in the campaign.
    #[must_use]
    pub fn total_waves(&self) -> usize {
        self.waves.len()
    }

    /// Number of spawns still queued for the active wave.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.queue.len()
    }

    /// Time left in the current preparation countdown.
    #[must_use]
    pub fn preparation_remaining(&self) -> Option<Duration> {
        match self.phase {
            WavePhase::Preparation { remaining } => Some(remaining),
            _ => None,
        }
    }

    /// Ends the current preparation countdown; the wave starts on the next
    /// advance. Returns `false` outside of preparation.
    pub fn skip_preparation(&mut self) -> bool {
        match &mut self.phase {
            WavePhase::Preparation { remaining } => {
                *remaining = Duration::ZERO;
                true
            }
            _ => false,
        }
    }

    /// Stops all scheduling after the run was lost.
    pub fn halt(&mut self) {
        self.phase = WavePhase::Halted;
        self.queue.clear();
    }

    /// Advances the countdown or releases due spawns.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<WaveAction>) {
        match self.phase {
            WavePhase::Preparation { remaining } => {
                if dt < remaining {
                    self.phase = WavePhase::Preparation {
                        remaining: remaining - dt,
                    };
                    return;
                }
                let leftover = dt - remaining;
                self.start_next_wave(out);
                if self.phase == WavePhase::Active {
                    self.release_spawns(leftover, out);
                }
            }
            WavePhase::Active => self.release_spawns(dt, out),
            WavePhase::Victory | WavePhase::Halted => {}
        }
    }

    /// Announces completion once the queue is drained and nothing is alive.
    pub fn check_completion(&mut self, alive: usize, out: &mut Vec<WaveAction>) {
        if self.phase != WavePhase::Active || !self.queue.is_empty() || alive > 0 {
            return;
        }

        let bonus = self.wave_spec(self.current_wave).and_then(|spec| spec.bonus);
        out.push(WaveAction::WaveCompleted {
            wave: self.current_wave,
            bonus,
        });

        match self.wave_spec(self.current_wave + 1) {
            Some(next) => {
                let duration =
                    Duration::try_from_secs_f32(next.preparation_secs).unwrap_or(Duration::ZERO);
                self.phase = WavePhase::Preparation {
                    remaining: duration,
                };
                out.push(WaveAction::PreparationStarted {
                    next_wave: self.current_wave + 1,
                    duration,
                });
            }
            None => {
                self.phase = WavePhase::Victory;
                out.push(WaveAction::Victory);
            }
        }
    }

    fn wave_spec(&self, wave: u32) -> Option<&WaveSpec> {
        let index = usize::try_from(wave.checked_sub(1)?).ok()?;
        self.waves.get(index)
    }

    fn start_next_wave(&mut self, out: &mut Vec<WaveAction>) {
        let next = self.current_wave + 1;
        let Some(spec) = self.wave_spec(next) else {
            self.phase = WavePhase::Victory;
            out.push(WaveAction::Victory);
            return;
        };

        let queue: VecDeque<QueuedSpawn> = spec
            .groups
            .iter()
            .flat_map(|group| {
                let entry = QueuedSpawn {
                    kind: group.kind,
                    interval: Duration::from_millis(group.interval_ms),
                };
                (0..group.count).map(move |_| entry)
            })
            .collect();

        self.queue = queue;
        self.current_wave = next;
        self.spawn_debt = Duration::ZERO;
        self.phase = WavePhase::Active;
        out.push(WaveAction::WaveStarted { wave: next });
    }

    fn release_spawns(&mut self, mut available: Duration, out: &mut Vec<WaveAction>) {
        while let Some(entry) = self.queue.front().copied() {
            if self.spawn_debt > available {
                self.spawn_debt -= available;
                return;
            }
            available -= self.spawn_debt;
            let _ = self.queue.pop_front();
            out.push(WaveAction::Spawn {
                kind: entry.kind,
                wave: self.current_wave,
            });
            self.spawn_debt = entry.interval;
        }
    }
}
