//! Auto-framing: uniform rescale and recentre of a freshly loaded model.

use glam::Vec3;

use super::graph::SceneGraph;
use super::node::LocalTransform;

/// What auto-framing applied to the root node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalization {
    pub scale: f32,
    pub offset: Vec3,
}

impl Normalization {
    pub const IDENTITY: Self = Self { scale: 1.0, offset: Vec3::ZERO };
}

/// Scale the whole hierarchy so its largest extent equals `target_size`, then
/// translate it so the bounds are centred on the origin.
///
/// Degenerate extents (zero, NaN, infinite) keep unit scale. A model without
/// vertices keeps the identity transform.
pub fn normalize(graph: &mut SceneGraph, target_size: f32) -> Normalization {
    let root = graph.root();
    graph.set_transform(root, LocalTransform::identity());

    let Some(bounds) = graph.bounds() else {
        log::debug!("Auto-frame skipped: model has no vertices");
        return Normalization::IDENTITY;
    };

    let extent = bounds.max_extent();
    let scale = if extent.is_finite() && extent > 0.0 {
        target_size / extent
    } else {
        log::warn!("Degenerate model extent {}, keeping unit scale", extent);
        1.0
    };

    let scaled = LocalTransform {
        scale: Vec3::splat(scale),
        ..Default::default()
    };
    graph.set_transform(root, scaled.clone());

    // Bounds again after scaling, then recentre
    let center = graph.bounds().map(|b| b.center()).unwrap_or(Vec3::ZERO);
    let offset = -center;
    graph.set_transform(root, LocalTransform { position: offset, ..scaled });
    graph.propagate_transforms();

    log::debug!("Auto-frame: extent {:.4} -> scale {:.4}, offset {:?}", extent, scale, offset);
    Normalization { scale, offset }
}
