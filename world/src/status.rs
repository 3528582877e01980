//! Timed modifiers carried by each enemy.

use realm_defence_core::StatusFlags;

/// Damage-over-time ticks are granted once this much time has accumulated.
const DOT_PERIOD_SECS: f32 = 1.0;
const DOT_EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Timed {
    value: f32,
    remaining: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DamageOverTime {
    dps: f32,
    remaining: f32,
    accumulated: f32,
}

impl DamageOverTime {
    fn tick(&mut self, dt: f32) -> f32 {
        let elapsed = dt.min(self.remaining.max(0.0));
        self.accumulated += elapsed;
        self.remaining -= dt;

        let mut damage = 0.0;
        while self.accumulated + DOT_EPSILON >= DOT_PERIOD_SECS {
            self.accumulated -= DOT_PERIOD_SECS;
            damage += self.dps;
        }
        damage
    }
}

/// Independent countdowns for every effect an enemy can suffer.
///
/// Re-applying an effect keeps the stronger magnitude and the longer
/// remaining duration. The Warlord roar is the single exception: it
/// overwrites the slow channel with a multiplier above one.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct StatusEffects {
    slow: Option<Timed>,
    stun: f32,
    freeze: f32,
    poison: Option<DamageOverTime>,
    poison_slow: f32,
    poison_explodes: bool,
    burn: Option<DamageOverTime>,
    armor_reduction: Option<Timed>,
    lightning: f32,
    shell: f32,
}

impl StatusEffects {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Merges a slow: lowest multiplier, longest duration.
    pub(crate) fn apply_slow(&mut self, multiplier: f32, duration: f32) {
        if duration <= 0.0 {
            return;
        }
        self.slow = Some(match self.slow {
            Some(current) => Timed {
                value: current.value.min(multiplier),
                remaining: current.remaining.max(duration),
            },
            None => Timed {
                value: multiplier,
                remaining: duration,
            },
        });
    }

    /// Overwrites the slow channel with a speed-up.
    pub(crate) fn apply_haste(&mut self, multiplier: f32, duration: f32) {
        self.slow = Some(Timed {
            value: multiplier,
            remaining: duration,
        });
    }

    pub(crate) fn apply_stun(&mut self, duration: f32) {
        self.stun = self.stun.max(duration);
    }

    pub(crate) fn apply_freeze(&mut self, duration: f32) {
        self.freeze = self.freeze.max(duration);
    }

    /// Merges poison, which also slows its victim by `slow_factor`.
    pub(crate) fn apply_poison(
        &mut self,
        dps: f32,
        duration: f32,
        slow_factor: f32,
        explodes: bool,
    ) {
        if duration <= 0.0 {
            return;
        }
        if self.poison.is_none() {
            self.poison_explodes = false;
        }
        self.poison = Some(merge_dot(self.poison, dps, duration));
        self.poison_slow = slow_factor;
        self.poison_explodes |= explodes;
    }

    pub(crate) fn apply_burn(&mut self, dps: f32, duration: f32) {
        if duration <= 0.0 {
            return;
        }
        self.burn = Some(merge_dot(self.burn, dps, duration));
    }

    pub(crate) fn apply_armor_reduction(&mut self, amount: f32, duration: f32) {
        if duration <= 0.0 {
            return;
        }
        self.armor_reduction = Some(match self.armor_reduction {
            Some(current) => Timed {
                value: current.value.max(amount),
                remaining: current.remaining.max(duration),
            },
            None => Timed {
                value: amount,
                remaining: duration,
            },
        });
    }

    pub(crate) fn mark_lightning(&mut self, duration: f32) {
        self.lightning = self.lightning.max(duration);
    }

    pub(crate) fn raise_shell(&mut self, duration: f32) {
        self.shell = self.shell.max(duration);
    }

    /// Counts every timer down and returns the pure damage that came due.
    pub(crate) fn decay(&mut self, dt: f32) -> f32 {
        let mut damage = 0.0;

        if let Some(poison) = self.poison.as_mut() {
            damage += poison.tick(dt);
            if poison.remaining <= 0.0 {
                self.poison = None;
            }
        }
        if let Some(burn) = self.burn.as_mut() {
            damage += burn.tick(dt);
            if burn.remaining <= 0.0 {
                self.burn = None;
            }
        }

        self.slow = decay_timed(self.slow, dt);
        self.armor_reduction = decay_timed(self.armor_reduction, dt);
        self.stun = (self.stun - dt).max(0.0);
        self.freeze = (self.freeze - dt).max(0.0);
        self.lightning = (self.lightning - dt).max(0.0);
        self.shell = (self.shell - dt).max(0.0);

        damage
    }

    /// Multiplier applied to the enemy's base speed.
    pub(crate) fn speed_factor(&self) -> f32 {
        let slow = self.slow.map_or(1.0, |slow| slow.value);
        if self.poison.is_some() {
            slow.min(self.poison_slow)
        } else {
            slow
        }
    }

    /// Current slow multiplier and remaining duration, if any.
    #[cfg(test)]
    pub(crate) fn slow(&self) -> Option<(f32, f32)> {
        self.slow.map(|slow| (slow.value, slow.remaining))
    }

    /// Poison strength and remaining duration, if any.
    pub(crate) fn poison(&self) -> Option<(f32, f32)> {
        self.poison.map(|poison| (poison.dps, poison.remaining))
    }

    /// Poison that spreads to neighbours when its carrier dies.
    pub(crate) fn exploding_poison(&self) -> Option<(f32, f32)> {
        self.poison().filter(|_| self.poison_explodes)
    }

    pub(crate) fn movement_blocked(&self) -> bool {
        self.stun > 0.0 || self.freeze > 0.0
    }

    pub(crate) fn is_frozen(&self) -> bool {
        self.freeze > 0.0
    }

    pub(crate) fn shell_active(&self) -> bool {
        self.shell > 0.0
    }

    /// Armor reduction points currently applied.
    pub(crate) fn armor_reduction(&self) -> f32 {
        self.armor_reduction.map_or(0.0, |reduction| reduction.value)
    }

    pub(crate) fn flags(&self) -> StatusFlags {
        let slow = self.speed_factor();
        StatusFlags {
            slowed: slow < 1.0,
            hasted: slow > 1.0,
            stunned: self.stun > 0.0,
            frozen: self.freeze > 0.0,
            poisoned: self.poison.is_some(),
            burning: self.burn.is_some(),
            armor_reduced: self.armor_reduction.is_some(),
            lightning: self.lightning > 0.0,
            shelled: self.shell > 0.0,
        }
    }
}

fn merge_dot(current: Option<DamageOverTime>, dps: f32, duration: f32) -> DamageOverTime {
    match current {
        Some(current) => DamageOverTime {
            dps: current.dps.max(dps),
            remaining: current.remaining.max(duration),
            accumulated: current.accumulated,
        },
        None => DamageOverTime {
            dps,
            remaining: duration,
            accumulated: 0.0,
        },
    }
}

fn decay_timed(timed: Option<Timed>, dt: f32) -> Option<Timed> {
    let mut timed = timed?;
    timed.remaining -= dt;
    (timed.remaining > 0.0).then_some(timed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-4
    }

    #[test]
    fn slow_merge_keeps_strongest_multiplier_and_longest_duration() {
        let mut status = StatusEffects::new();
        status.apply_slow(0.7, 2.0);
        status.apply_slow(0.5, 1.0);

        let (multiplier, remaining) = status.slow().expect("slow active");
        assert!(approx(multiplier, 0.5));
        assert!(approx(remaining, 2.0));
    }

    #[test]
    fn weaker_slow_does_not_override() {
        let mut status = StatusEffects::new();
        status.apply_slow(0.5, 1.0);
        status.apply_slow(0.9, 4.0);

        let (multiplier, remaining) = status.slow().expect("slow active");
        assert!(approx(multiplier, 0.5));
        assert!(approx(remaining, 4.0));
    }

    #[test]
    fn haste_overwrites_slow_channel() {
        let mut status = StatusEffects::new();
        status.apply_slow(0.5, 10.0);
        status.apply_haste(1.5, 5.0);

        assert!(approx(status.speed_factor(), 1.5));
        assert!(status.flags().hasted);
        let _ = status.decay(5.0);
        assert!(approx(status.speed_factor(), 1.0), "roar replaced the slow");
    }

    #[test]
    fn timers_expire_independently() {
        let mut status = StatusEffects::new();
        status.apply_stun(0.5);
        status.apply_freeze(1.0);
        assert!(status.movement_blocked());

        let _ = status.decay(0.6);
        assert!(!status.flags().stunned);
        assert!(status.is_frozen());

        let _ = status.decay(0.5);
        assert!(!status.movement_blocked());
    }

    #[test]
    fn poison_ticks_once_per_accumulated_second() {
        let mut status = StatusEffects::new();
        status.apply_poison(4.0, 3.0, 0.8, false);
        assert!(approx(status.speed_factor(), 0.8));

        let mut total = 0.0;
        for _ in 0..40 {
            total += status.decay(0.1);
        }
        assert!(approx(total, 12.0), "three ticks of four damage, got {total}");
        assert!(status.poison().is_none());
        assert!(approx(status.speed_factor(), 1.0));
    }

    #[test]
    fn burn_and_poison_stack_as_separate_channels() {
        let mut status = StatusEffects::new();
        status.apply_poison(2.0, 1.0, 0.8, true);
        assert!(status.exploding_poison().is_some());
        status.apply_burn(5.0, 1.0);
        assert!(approx(status.decay(1.0), 7.0));
    }

    #[test]
    fn armor_reduction_takes_the_larger_value() {
        let mut status = StatusEffects::new();
        status.apply_armor_reduction(5.0, 2.0);
        status.apply_armor_reduction(3.0, 6.0);
        assert!(approx(status.armor_reduction(), 5.0));
        let _ = status.decay(3.0);
        assert!(approx(status.armor_reduction(), 5.0), "duration was extended");
    }
}
