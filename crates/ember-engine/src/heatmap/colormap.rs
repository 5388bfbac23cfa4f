//! Colormap identifiers and key tables.
//!
//! A colormap is an ordered list of packed colors uploaded once as a one-row lookup
//! texture. The plotting host decides which index a plot uses; the renderer only
//! stores the texture handles in registration order.

use crate::paint::Rgba8;

/// Position of a colormap in registration order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColormapId(pub usize);

/// Key colors of a few common palettes.
pub mod keys {
    use crate::paint::Rgba8;

    pub const GREYS: [Rgba8; 2] = [Rgba8::BLACK, Rgba8::WHITE];

    pub const VIRIDIS: [Rgba8; 10] = [
        Rgba8::opaque(68, 1, 84),
        Rgba8::opaque(71, 39, 117),
        Rgba8::opaque(62, 72, 135),
        Rgba8::opaque(49, 102, 141),
        Rgba8::opaque(38, 130, 141),
        Rgba8::opaque(36, 157, 136),
        Rgba8::opaque(55, 181, 121),
        Rgba8::opaque(111, 202, 95),
        Rgba8::opaque(176, 222, 63),
        Rgba8::opaque(253, 231, 36),
    ];

    pub const PLASMA: [Rgba8; 9] = [
        Rgba8::opaque(12, 7, 134),
        Rgba8::opaque(76, 2, 161),
        Rgba8::opaque(126, 3, 167),
        Rgba8::opaque(170, 35, 149),
        Rgba8::opaque(203, 71, 119),
        Rgba8::opaque(229, 108, 91),
        Rgba8::opaque(248, 149, 64),
        Rgba8::opaque(253, 195, 40),
        Rgba8::opaque(239, 248, 33),
    ];

    pub const HOT: [Rgba8; 4] = [
        Rgba8::BLACK,
        Rgba8::opaque(255, 0, 0),
        Rgba8::opaque(255, 255, 0),
        Rgba8::WHITE,
    ];
}

/// Expands `keys` into an evenly spaced table of `size` colors.
///
/// Keys are treated as equally spaced stops on `[0, 1]` and interpolated
/// linearly. A single key yields a flat table; `size == 0` or no keys yields an
/// empty table.
pub fn sample_table(keys: &[Rgba8], size: usize) -> Vec<Rgba8> {
    match (keys.len(), size) {
        (0, _) | (_, 0) => Vec::new(),
        (1, n) => vec![keys[0]; n],
        (_, 1) => vec![keys[0]],
        (k, n) => (0..n)
            .map(|i| {
                let t = i as f32 / (n - 1) as f32 * (k - 1) as f32;
                let lo = (t.floor() as usize).min(k - 2);
                keys[lo].lerp(keys[lo + 1], t - lo as f32)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_hits_both_ends() {
        let t = sample_table(&keys::GREYS, 5);
        assert_eq!(t.len(), 5);
        assert_eq!(t[0], Rgba8::BLACK);
        assert_eq!(t[4], Rgba8::WHITE);
        assert_eq!(t[2], Rgba8::opaque(128, 128, 128));
    }

    #[test]
    fn table_passes_through_interior_keys() {
        let t = sample_table(&keys::HOT, 7);
        assert_eq!(t[2], Rgba8::opaque(255, 0, 0));
        assert_eq!(t[4], Rgba8::opaque(255, 255, 0));
    }

    #[test]
    fn degenerate_inputs() {
        assert!(sample_table(&[], 4).is_empty());
        assert!(sample_table(&keys::GREYS, 0).is_empty());
        assert_eq!(sample_table(&[Rgba8::WHITE], 3), vec![Rgba8::WHITE; 3]);
        assert_eq!(sample_table(&keys::VIRIDIS, 1), vec![keys::VIRIDIS[0]]);
    }
}
