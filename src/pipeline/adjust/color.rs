//! RGB ↔ HSL conversions on normalized (0.0–1.0) channel values.
//!
//! Hue is in degrees (0–360). Saturation uses the lightness-conditional
//! formula, so a pixel's saturation here matches what the statistics
//! analyzer and the selective-color bands measure.

/// Convert normalized RGB to (hue°, saturation, lightness).
pub fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;

    if delta == 0.0 {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let h = if max == r {
        ((g - b) / delta + if g < b { 6.0 } else { 0.0 }) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };

    (h * 360.0, s, l)
}

/// Convert (hue°, saturation, lightness) back to normalized RGB.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }

    let h = h / 360.0;
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    (
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() < eps, "{a} vs {b}");
    }

    #[test]
    fn gray_has_zero_saturation() {
        let (h, s, l) = rgb_to_hsl(0.5, 0.5, 0.5);
        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
        assert_close(l, 0.5, 1e-6);
    }

    #[test]
    fn pure_red_is_hue_zero() {
        let (h, s, l) = rgb_to_hsl(1.0, 0.0, 0.0);
        assert_close(h, 0.0, 1e-3);
        assert_close(s, 1.0, 1e-6);
        assert_close(l, 0.5, 1e-6);
    }

    #[test]
    fn sky_blue_lands_in_blue_band() {
        // Hue 230° at s=0.5, l=0.6 — the canonical sky-blue test pixel.
        let (r, g, b) = hsl_to_rgb(230.0, 0.5, 0.6);
        let (h, s, l) = rgb_to_hsl(r, g, b);
        assert_close(h, 230.0, 0.5);
        assert_close(s, 0.5, 1e-3);
        assert_close(l, 0.6, 1e-3);
    }

    #[test]
    fn round_trip_is_stable_across_hues() {
        for hue in [10.0, 60.0, 120.0, 200.0, 290.0, 350.0] {
            let (r, g, b) = hsl_to_rgb(hue, 0.7, 0.45);
            let (h, s, l) = rgb_to_hsl(r, g, b);
            assert_close(h, hue, 0.5);
            assert_close(s, 0.7, 1e-3);
            assert_close(l, 0.45, 1e-3);
        }
    }

    #[test]
    fn achromatic_round_trip() {
        let (r, g, b) = hsl_to_rgb(123.0, 0.0, 0.3);
        assert_eq!((r, g, b), (0.3, 0.3, 0.3));
    }
}
