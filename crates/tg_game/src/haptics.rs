//! Haptic feedback dispatch.
//!
//! The game asks for a kind of feedback; the backend decides what that means
//! on the current machine. Without a rumble-capable device the request is
//! only logged.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    /// Light tick for every tap.
    VirtualKey,
    /// Strong pulse for a hit.
    LongPress,
}

pub trait HapticFeedback {
    fn perform(&mut self, kind: HapticKind);

    /// Give the backend a chance to process device events once per frame.
    fn poll(&mut self) {}
}

/// Records requests in the log.
#[derive(Debug, Default)]
pub struct LogHaptics {
    performed: u64,
}

impl LogHaptics {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HapticFeedback for LogHaptics {
    fn perform(&mut self, kind: HapticKind) {
        self.performed += 1;
        log::debug!("Haptic feedback #{}: {:?}", self.performed, kind);
    }
}

/// Pick the best available backend.
pub fn default_haptics() -> Box<dyn HapticFeedback> {
    #[cfg(feature = "rumble")]
    {
        match rumble::RumbleHaptics::new() {
            Ok(haptics) => return Box::new(haptics),
            Err(err) => log::warn!("Gamepad rumble unavailable, falling back to log: {err}"),
        }
    }
    Box::new(LogHaptics::new())
}

#[cfg(feature = "rumble")]
mod rumble {
    use super::{HapticFeedback, HapticKind};
    use gilrs::ff::{BaseEffect, BaseEffectType, Effect, EffectBuilder, Replay, Ticks};
    use gilrs::{GamepadId, Gilrs};

    /// Force feedback on every connected gamepad that supports it.
    pub struct RumbleHaptics {
        gilrs: Gilrs,
        // Dropping an effect stops it, so the last one is kept alive.
        active: Option<Effect>,
    }

    impl RumbleHaptics {
        pub fn new() -> Result<Self, String> {
            let gilrs = Gilrs::new().map_err(|e| format!("Failed to open gamepads: {e}"))?;
            log::info!("Gamepad rumble enabled");
            Ok(Self {
                gilrs,
                active: None,
            })
        }

        fn ff_gamepads(&self) -> Vec<GamepadId> {
            self.gilrs
                .gamepads()
                .filter(|(_, gamepad)| gamepad.is_ff_supported())
                .map(|(id, _)| id)
                .collect()
        }
    }

    fn effect_for(kind: HapticKind) -> BaseEffect {
        let (effect_kind, millis) = match kind {
            HapticKind::VirtualKey => (BaseEffectType::Weak { magnitude: 20_000 }, 30),
            HapticKind::LongPress => (BaseEffectType::Strong { magnitude: 60_000 }, 120),
        };
        BaseEffect {
            kind: effect_kind,
            scheduling: Replay {
                play_for: Ticks::from_ms(millis),
                ..Default::default()
            },
            envelope: Default::default(),
        }
    }

    impl HapticFeedback for RumbleHaptics {
        fn perform(&mut self, kind: HapticKind) {
            let targets = self.ff_gamepads();
            if targets.is_empty() {
                log::debug!("Haptic feedback {:?}: no force-feedback gamepad", kind);
                return;
            }
            let effect = EffectBuilder::new()
                .add_effect(effect_for(kind))
                .gamepads(&targets)
                .finish(&mut self.gilrs);
            match effect {
                Ok(effect) => {
                    if let Err(err) = effect.play() {
                        log::warn!("Failed to play rumble effect: {err}");
                    }
                    self.active = Some(effect);
                }
                Err(err) => log::warn!("Failed to build rumble effect: {err}"),
            }
        }

        fn poll(&mut self) {
            while self.gilrs.next_event().is_some() {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_haptics_counts_requests() {
        let mut haptics = LogHaptics::new();
        haptics.perform(HapticKind::VirtualKey);
        haptics.perform(HapticKind::LongPress);
        haptics.poll();
        assert_eq!(haptics.performed, 2);
    }
}
