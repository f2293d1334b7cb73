//! The bridge's one piece of shared state: the last known light state.

use std::sync::{Arc, Mutex};

use crate::color::PackedColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Power {
    On,
    Off,
}

/// Last known or commanded state of the light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    /// Last known power state.
    pub power: Power,
    /// Last color sent to or reported by the device. None until a
    /// first color is established; never the blank (zero) value.
    pub color: Option<PackedColor>,
}

/// Synchronized handle to the light state, shared by both translators.
///
/// Every accessor takes the lock for the duration of a copy or an
/// assignment and nothing more; no I/O happens under the lock.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<Mutex<LightState>>,
}

impl SharedState {
    pub fn new() -> SharedState {
        SharedState {
            inner: Arc::new(Mutex::new(LightState {
                power: Power::Off,
                color: None,
            })),
        }
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> LightState {
        *self.inner.lock().expect("light state lock poisoned")
    }

    pub fn set_power(&self, power: Power) {
        self.inner.lock().expect("light state lock poisoned").power = power;
    }

    pub fn set_color(&self, color: PackedColor) {
        self.inner.lock().expect("light state lock poisoned").color = Some(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_off_with_no_color() {
        let state = SharedState::new();
        let snapshot = state.get();
        assert_eq!(snapshot.power, Power::Off);
        assert_eq!(snapshot.color, None);
    }

    #[test]
    fn updates_are_visible_through_clones() {
        let state = SharedState::new();
        let other = state.clone();
        state.set_power(Power::On);
        other.set_color(PackedColor::from_rgb(10, 20, 30));
        assert_eq!(state.get().color, Some(PackedColor::from_rgb(10, 20, 30)));
        assert_eq!(other.get().power, Power::On);
    }

    #[test]
    fn set_power_leaves_color_alone() {
        let state = SharedState::new();
        state.set_color(PackedColor::from_rgb(1, 2, 3));
        state.set_power(Power::Off);
        assert_eq!(state.get().color, Some(PackedColor::from_rgb(1, 2, 3)));
    }
}
