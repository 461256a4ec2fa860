//! Material patch engine.
//!
//! Every distinct material of a loaded model gets one [`BlendState`] in a
//! side-table keyed by [`MaterialId`]. Patching twice never installs twice,
//! but every texture change retargets all installed states.

use std::collections::HashMap;

use crate::assets::texture::TextureHandle;
use crate::scene::{MaterialId, SceneGraph};

use super::blend::BlendState;

pub const DEFAULT_METALNESS: f32 = 0.2;
pub const DEFAULT_ROUGHNESS: f32 = 0.6;

/// Authored base-colour maps of the current model, captured at load.
#[derive(Clone, Debug, Default)]
pub struct OriginalTextures {
    maps: HashMap<MaterialId, TextureHandle>,
}

impl OriginalTextures {
    pub fn capture(graph: &SceneGraph) -> Self {
        let maps = graph
            .materials()
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.base_color_texture.clone().map(|t| (MaterialId(i), t)))
            .collect();
        Self { maps }
    }

    pub fn get(&self, material: MaterialId) -> Option<&TextureHandle> {
        self.maps.get(&material)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

/// Outcome of one patch pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub installed: usize,
    pub retargeted: usize,
}

/// Side-table of blend states for one loaded model.
pub struct MaterialPatcher {
    states: HashMap<MaterialId, BlendState>,
    order: Vec<MaterialId>,
    noise: TextureHandle,
    fallback: TextureHandle,
    installs: usize,
}

impl MaterialPatcher {
    pub fn new(noise: TextureHandle, fallback: TextureHandle) -> Self {
        Self {
            states: HashMap::new(),
            order: Vec::new(),
            noise,
            fallback,
            installs: 0,
        }
    }

    /// Install the blend on every material the mesh graph uses and point it
    /// at `active` (or the authored map when there is no override).
    ///
    /// Materials missing PBR parameters get the defaults here.
    pub fn patch(
        &mut self,
        graph: &mut SceneGraph,
        originals: &OriginalTextures,
        active: Option<&TextureHandle>,
    ) -> PatchReport {
        let mut report = PatchReport::default();
        for id in graph.materials_in_use() {
            if !self.states.contains_key(&id) {
                if let Some(material) = graph.material_mut(id) {
                    material.metalness.get_or_insert(DEFAULT_METALNESS);
                    material.roughness.get_or_insert(DEFAULT_ROUGHNESS);
                }
                let authored = self.authored_map(originals, id);
                self.states.insert(id, BlendState::settled(authored, self.noise.clone()));
                self.order.push(id);
                self.installs += 1;
                report.installed += 1;
            }
        }
        report.retargeted = self.apply_texture(originals, active);
        if report.installed > 0 {
            log::debug!("Patched {} material(s)", report.installed);
        }
        report
    }

    /// Fade every patched material to `active`, or back to its authored map
    /// when `active` is `None`. Returns how many fades started.
    pub fn apply_texture(&mut self, originals: &OriginalTextures, active: Option<&TextureHandle>) -> usize {
        let mut retargeted = 0;
        for &id in &self.order {
            let target = match active {
                Some(map) => map.clone(),
                None => originals.get(id).cloned().unwrap_or_else(|| self.fallback.clone()),
            };
            if let Some(state) = self.states.get_mut(&id) {
                if state.retarget(target) {
                    retargeted += 1;
                }
            }
        }
        retargeted
    }

    fn authored_map(&self, originals: &OriginalTextures, id: MaterialId) -> TextureHandle {
        originals.get(id).cloned().unwrap_or_else(|| self.fallback.clone())
    }

    pub fn state(&self, id: MaterialId) -> Option<&BlendState> {
        self.states.get(&id)
    }

    /// Number of hook installations performed
    pub fn install_count(&self) -> usize {
        self.installs
    }

    /// Patched states in installation order.
    pub fn states(&self) -> impl Iterator<Item = (MaterialId, &BlendState)> {
        self.order.iter().filter_map(|id| self.states.get(id).map(|s| (*id, s)))
    }

    pub fn states_mut(&mut self) -> impl Iterator<Item = &mut BlendState> {
        self.states.values_mut()
    }

}
