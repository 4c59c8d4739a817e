// ---------------------------------------------------------------------------
// 2D gradient (Perlin) noise, remapped to roughly [0, 1]
// ---------------------------------------------------------------------------

const PERMUTATION: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

fn hash(i: i64) -> usize {
    PERMUTATION[(i & 255) as usize] as usize
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn grad(hash: usize, x: f64, y: f64) -> f64 {
    match hash & 7 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x,
        5 => -x,
        6 => y,
        _ => -y,
    }
}

/// Coherent noise: continuous in both arguments, deterministic, 0.5 at
/// every lattice point, and within [0, 1].
pub fn perlin(x: f64, y: f64) -> f64 {
    let (xf, yf) = (x.floor(), y.floor());
    let (xi, yi) = (xf as i64, yf as i64);
    let (dx, dy) = (x - xf, y - yf);
    let (u, v) = (fade(dx), fade(dy));

    let aa = hash(hash(xi) as i64 + yi);
    let ab = hash(hash(xi) as i64 + yi + 1);
    let ba = hash(hash(xi + 1) as i64 + yi);
    let bb = hash(hash(xi + 1) as i64 + yi + 1);

    let x1 = lerp(grad(aa, dx, dy), grad(ba, dx - 1.0, dy), u);
    let x2 = lerp(grad(ab, dx, dy - 1.0), grad(bb, dx - 1.0, dy - 1.0), u);
    let n = lerp(x1, x2, v);

    // |n| <= 1 for these gradients
    ((n + 1.0) * 0.5).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_points_are_midpoint() {
        for i in -3..5 {
            assert_eq!(perlin(i as f64, 0.0), 0.5);
        }
    }

    #[test]
    fn stays_in_unit_range() {
        for k in 0..2000 {
            let x = k as f64 * 0.037 - 20.0;
            let n = perlin(x, x * 0.3);
            assert!((0.0..=1.0).contains(&n), "perlin({x}) = {n}");
        }
    }

    #[test]
    fn is_continuous() {
        let mut prev = perlin(0.0, 0.0);
        for k in 1..1000 {
            let n = perlin(k as f64 * 0.001, 0.0);
            assert!((n - prev).abs() < 0.01);
            prev = n;
        }
    }

    #[test]
    fn varies_between_lattice_points() {
        let samples: Vec<f64> = (0..40).map(|k| perlin(k as f64 * 0.25 + 0.1, 0.0)).collect();
        assert!(samples.iter().any(|&n| (n - 0.5).abs() > 0.02));
    }
}
