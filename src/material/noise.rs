//! Tiling dissolve noise.

use std::f64::consts::TAU;
use std::sync::Arc;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::assets::texture::{ColorSpace, TextureHandle, TextureImage};

pub const NOISE_KEY: &str = "noise:dissolve";

/// Generate a square, seamlessly tiling grey-scale noise image.
///
/// The plane is wrapped onto a torus in 4D so opposite edges sample the same
/// points. Values are stretched to the full 0..255 range so the dissolve
/// threshold sweeps evenly.
pub fn dissolve_noise(size: u32, seed: u32) -> TextureHandle {
    let size = size.max(1);
    let fbm = Fbm::<Perlin>::new(seed).set_octaves(3).set_frequency(1.0);
    let radius = 1.2;

    let mut values = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        let b = TAU * y as f64 / size as f64;
        for x in 0..size {
            let a = TAU * x as f64 / size as f64;
            values.push(fbm.get([
                a.cos() * radius,
                a.sin() * radius,
                b.cos() * radius,
                b.sin() * radius,
            ]));
        }
    }

    let (min, max) = values
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = (max - min).max(1e-9);

    let mut rgba = Vec::with_capacity(values.len() * 4);
    for v in values {
        let c = (((v - min) / range) * 255.0).round() as u8;
        rgba.extend_from_slice(&[c, c, c, 255]);
    }

    Arc::new(TextureImage {
        key: NOISE_KEY.to_string(),
        width: size,
        height: size,
        rgba,
        color_space: ColorSpace::Linear,
    })
}
