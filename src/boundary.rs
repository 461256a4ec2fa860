//! Failure boundary around the model subtree.
//!
//! A model that fails to load or prepare flips the boundary to `Failed`. It
//! stays failed, with no retry, until the user picks a different model or
//! texture.

use std::fmt;

/// Identity of what the boundary is guarding: model URL plus texture override.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BoundaryKey {
    pub model_url: String,
    pub texture_id: Option<String>,
}

impl BoundaryKey {
    pub fn new(model_url: impl Into<String>, texture_id: Option<&str>) -> Self {
        Self {
            model_url: model_url.into(),
            texture_id: texture_id.map(str::to_string),
        }
    }
}

impl fmt::Display for BoundaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.texture_id {
            Some(t) => write!(f, "{}+{}", self.model_url, t),
            None => write!(f, "{}", self.model_url),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundaryState {
    Healthy,
    Failed { reason: String },
}

#[derive(Clone, Debug)]
pub struct FailureBoundary {
    key: BoundaryKey,
    state: BoundaryState,
}

impl FailureBoundary {
    pub fn new(key: BoundaryKey) -> Self {
        Self {
            key,
            state: BoundaryState::Healthy,
        }
    }

    pub fn state(&self) -> &BoundaryState {
        &self.state
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, BoundaryState::Failed { .. })
    }

    pub fn key(&self) -> &BoundaryKey {
        &self.key
    }

    /// Report the current key. A changed key resets a failure; returns true
    /// when that happened.
    pub fn observe(&mut self, key: BoundaryKey) -> bool {
        if key == self.key {
            return false;
        }
        self.key = key;
        if self.is_failed() {
            log::info!("Selection changed to {}, clearing failure", self.key);
            self.state = BoundaryState::Healthy;
            return true;
        }
        false
    }

    /// Tag the boundary failed.
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("Model view failed for {}: {}", self.key, reason);
        self.state = BoundaryState::Failed { reason };
    }

    /// Run `f` inside the boundary, catching its error. Returns `None` when
    /// the boundary is failed or `f` fails.
    pub fn guard<T, E: fmt::Display>(&mut self, f: impl FnOnce() -> Result<T, E>) -> Option<T> {
        if self.is_failed() {
            return None;
        }
        match f() {
            Ok(value) => Some(value),
            Err(e) => {
                self.fail(e.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_then_key_change_recovers() {
        let mut b = FailureBoundary::new(BoundaryKey::new("bad.glb", None));
        b.fail("parse error");
        assert!(b.is_failed());
        // Same key: still failed
        assert!(!b.observe(BoundaryKey::new("bad.glb", None)));
        assert!(b.is_failed());
        assert!(b.observe(BoundaryKey::new("builtin:cube", None)));
        assert_eq!(b.state(), &BoundaryState::Healthy);
    }

    #[test]
    fn test_texture_change_also_resets() {
        let mut b = FailureBoundary::new(BoundaryKey::new("bad.glb", None));
        b.fail("nope");
        assert!(b.observe(BoundaryKey::new("bad.glb", Some("checker"))));
        assert!(!b.is_failed());
    }

    #[test]
    fn test_guard_catches() {
        let mut b = FailureBoundary::new(BoundaryKey::default());
        assert_eq!(b.guard(|| Ok::<_, String>(3)), Some(3));
        assert_eq!(b.guard(|| Err::<i32, _>("boom".to_string())), None);
        assert_eq!(b.state(), &BoundaryState::Failed { reason: "boom".into() });
        // No retry while failed
        assert_eq!(b.guard(|| Ok::<_, String>(4)), None);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(BoundaryKey::new("a.glb", Some("uv")).to_string(), "a.glb+uv");
        assert_eq!(BoundaryKey::new("a.glb", None).to_string(), "a.glb");
    }
}
