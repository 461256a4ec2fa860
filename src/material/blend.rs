//! Per-material cross-fade state.

use crate::assets::texture::{TextureHandle, same_texture};

/// Progress closer than this to 1 snaps to 1, absorbing float drift from
/// summing many small frame steps.
const PROGRESS_EPSILON: f32 = 1e-4;

/// Inputs of the dissolve blend attached to one patched material.
#[derive(Clone, Debug)]
pub struct BlendState {
    pub previous_map: TextureHandle,
    pub next_map: TextureHandle,
    pub noise_map: TextureHandle,
    /// Value handed to the shader
    pub blend_factor: f32,
    pub transition_progress: f32,
}

impl BlendState {
    /// A finished transition resting on `map`.
    pub fn settled(map: TextureHandle, noise_map: TextureHandle) -> Self {
        Self {
            previous_map: map.clone(),
            next_map: map,
            noise_map,
            blend_factor: 1.0,
            transition_progress: 1.0,
        }
    }

    /// The map the material is heading to (or resting on).
    pub fn effective_map(&self) -> &TextureHandle {
        &self.next_map
    }

    /// Start a fade from the effective map to `map`. Retargeting to the map
    /// already being shown is a no-op and returns false.
    pub fn retarget(&mut self, map: TextureHandle) -> bool {
        if same_texture(self.effective_map(), &map) {
            return false;
        }
        self.previous_map = std::mem::replace(&mut self.next_map, map);
        self.transition_progress = 0.0;
        self.blend_factor = 0.0;
        true
    }

    pub fn is_animating(&self) -> bool {
        self.transition_progress < 1.0
    }

    /// Step the fade by `dt` seconds. Returns whether it is still running.
    pub fn advance(&mut self, dt: f32, duration: f32) -> bool {
        if !self.is_animating() {
            return false;
        }
        let step = if duration > 0.0 { dt.max(0.0) / duration } else { 1.0 };
        let mut progress = (self.transition_progress + step).min(1.0);
        if progress > 1.0 - PROGRESS_EPSILON {
            progress = 1.0;
        }
        self.transition_progress = progress;
        self.blend_factor = progress;
        self.is_animating()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::texture::TextureImage;
    use std::sync::Arc;

    fn tex(key: &str) -> TextureHandle {
        Arc::new(TextureImage::solid(key, [1, 2, 3, 255]))
    }

    #[test]
    fn test_retarget_resets_progress() {
        let mut state = BlendState::settled(tex("a"), tex("noise"));
        assert!(state.retarget(tex("b")));
        assert_eq!(state.previous_map.key, "a");
        assert_eq!(state.next_map.key, "b");
        assert_eq!(state.transition_progress, 0.0);
        assert_eq!(state.blend_factor, 0.0);
    }

    #[test]
    fn test_retarget_same_map_is_noop() {
        let mut state = BlendState::settled(tex("a"), tex("noise"));
        assert!(!state.retarget(tex("a")));
        assert!(!state.is_animating());
    }

    #[test]
    fn test_zero_duration_jumps() {
        let mut state = BlendState::settled(tex("a"), tex("noise"));
        state.retarget(tex("b"));
        assert!(!state.advance(0.0, 0.0));
        assert_eq!(state.transition_progress, 1.0);
    }

    #[test]
    fn test_negative_dt_does_not_rewind() {
        let mut state = BlendState::settled(tex("a"), tex("noise"));
        state.retarget(tex("b"));
        state.advance(0.4, 0.8);
        state.advance(-1.0, 0.8);
        assert!((state.transition_progress - 0.5).abs() < 1e-6);
    }
}
