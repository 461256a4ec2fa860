//! Per-frame cross-fade and idle spin update.

use std::f32::consts::TAU;

use super::blend::BlendState;

/// Advance every running fade by `dt` seconds. Finished fades are left
/// untouched. Returns how many are still running.
pub fn advance<'a>(
    states: impl IntoIterator<Item = &'a mut BlendState>,
    dt: f32,
    duration: f32,
) -> usize {
    states
        .into_iter()
        .filter(|s| s.is_animating())
        .map(|s| s.advance(dt, duration))
        .filter(|&running| running)
        .count()
}

/// Idle rotation angle after `dt` seconds, kept within one turn.
pub fn advance_spin(angle: f32, dt: f32, speed: f32) -> f32 {
    (angle + speed * dt.max(0.0)).rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::texture::{TextureHandle, TextureImage};
    use std::sync::Arc;

    fn tex(key: &str) -> TextureHandle {
        Arc::new(TextureImage::solid(key, [255, 255, 255, 255]))
    }

    fn fading() -> Vec<BlendState> {
        (0..3)
            .map(|i| {
                let mut s = BlendState::settled(tex(&format!("old{}", i)), tex("noise"));
                s.retarget(tex("new"));
                s
            })
            .collect()
    }

    #[test]
    fn test_reaches_exactly_one_at_any_granularity() {
        for steps in [1usize, 2, 3, 7, 48, 50, 120, 1000] {
            let mut states = fading();
            let dt = 0.8 / steps as f32;
            let mut last = 0.0;
            for _ in 0..steps {
                advance(states.iter_mut(), dt, 0.8);
                let p = states[0].transition_progress;
                assert!(p >= last, "progress went backwards");
                assert!(p <= 1.0);
                last = p;
            }
            for s in &states {
                assert_eq!(s.transition_progress, 1.0, "{} steps", steps);
                assert_eq!(s.blend_factor, 1.0);
            }
        }
    }

    #[test]
    fn test_overshoot_clamps() {
        let mut states = fading();
        assert_eq!(advance(states.iter_mut(), 5.0, 0.8), 0);
        assert!(states.iter().all(|s| s.transition_progress == 1.0));
    }

    #[test]
    fn test_finished_states_skipped() {
        let mut states = fading();
        states.push(BlendState::settled(tex("done"), tex("noise")));
        assert_eq!(advance(states.iter_mut(), 0.4, 0.8), 3);
        assert_eq!(states[3].transition_progress, 1.0);
        assert!((states[0].transition_progress - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_spin_wraps() {
        let angle = advance_spin(TAU - 0.01, 1.0, 0.15);
        assert!((angle - 0.14).abs() < 1e-4);
        assert_eq!(advance_spin(1.0, -2.0, 0.15), 1.0);
    }
}
