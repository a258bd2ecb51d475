//! Normal distribution: the family of the quadratic approximation.

use std::f64::consts::SQRT_2;

use super::stable::LOG_SQRT_2PI;

// Acklam's rational approximation to the standard normal quantile.
const QUANTILE_A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_690e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const QUANTILE_B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const QUANTILE_C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const QUANTILE_D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];
const QUANTILE_P_LOW: f64 = 0.024_25;

/// Log of the Normal(mean, sd^2) PDF at x.
pub fn normal_log_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    if x.is_nan() || mean.is_nan() || sd.is_nan() {
        return f64::NAN;
    }
    if sd <= 0.0 || !sd.is_finite() {
        return f64::NAN;
    }
    let z = (x - mean) / sd;
    -0.5 * z * z - sd.ln() - LOG_SQRT_2PI
}

/// Normal(mean, sd^2) PDF at x:
/// `(1 / (sd * sqrt(2*pi))) * exp(-(x - mean)^2 / (2 * sd^2))`.
pub fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    let log_pdf = normal_log_pdf(x, mean, sd);
    if log_pdf.is_nan() {
        return f64::NAN;
    }
    log_pdf.exp()
}

/// Normal(mean, sd^2) CDF at x.
pub fn normal_cdf(x: f64, mean: f64, sd: f64) -> f64 {
    if x.is_nan() || mean.is_nan() || sd.is_nan() || sd <= 0.0 {
        return f64::NAN;
    }
    0.5 * erfc(-(x - mean) / (sd * SQRT_2))
}

/// Quantile (inverse CDF) of Normal(mean, sd^2).
///
/// Relative error of the underlying standard quantile is about 1.2e-9.
pub fn normal_quantile(p: f64, mean: f64, sd: f64) -> f64 {
    if p.is_nan() || mean.is_nan() || sd.is_nan() || sd <= 0.0 {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    mean + sd * standard_quantile(p)
}

fn standard_quantile(p: f64) -> f64 {
    let (a, b, c, d) = (QUANTILE_A, QUANTILE_B, QUANTILE_C, QUANTILE_D);
    if p < QUANTILE_P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    } else if p <= 1.0 - QUANTILE_P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((a[0] * r + a[1]) * r + a[2]) * r + a[3]) * r + a[4]) * r + a[5]) * q
            / (((((b[0] * r + b[1]) * r + b[2]) * r + b[3]) * r + b[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((c[0] * q + c[1]) * q + c[2]) * q + c[3]) * q + c[4]) * q + c[5])
            / ((((d[0] * q + d[1]) * q + d[2]) * q + d[3]) * q + 1.0)
    }
}

/// Complementary error function (Numerical Recipes `erfcc`, fractional
/// error below 1.2e-7).
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87
                                    + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn pdf_peak_value() {
        let sd = 0.0861;
        let peak = normal_pdf(0.5, 0.5, sd);
        assert!(approx_eq(peak, 1.0 / (sd * (2.0 * PI).sqrt()), 1e-12));
    }

    #[test]
    fn pdf_symmetry() {
        let left = normal_pdf(0.4, 0.6, 0.1);
        let right = normal_pdf(0.8, 0.6, 0.1);
        assert!(approx_eq(left, right, 1e-12));
    }

    #[test]
    fn pdf_invalid_sd_is_nan() {
        assert!(normal_pdf(0.0, 0.0, 0.0).is_nan());
        assert!(normal_pdf(0.0, 0.0, -1.0).is_nan());
    }

    #[test]
    fn cdf_known_values() {
        assert!(approx_eq(normal_cdf(0.0, 0.0, 1.0), 0.5, 1e-7));
        assert!(approx_eq(normal_cdf(1.959_964, 0.0, 1.0), 0.975, 1e-6));
        assert!(approx_eq(normal_cdf(-1.0, 0.0, 1.0), 0.158_655_25, 1e-6));
    }

    #[test]
    fn quantile_known_values() {
        assert!(approx_eq(normal_quantile(0.5, 0.0, 1.0), 0.0, 1e-9));
        assert!(approx_eq(normal_quantile(0.975, 0.0, 1.0), 1.959_963_985, 1e-6));
        assert!(approx_eq(normal_quantile(0.01, 0.0, 1.0), -2.326_347_874, 1e-6));
        assert!(approx_eq(normal_quantile(0.055, 2.0, 0.5), 2.0 - 0.5 * 1.598_193_1, 1e-6));
    }

    #[test]
    fn quantile_matches_reference_values() {
        // Acklam alone, no refinement step: relative error about 1.2e-9
        for (p, z) in [
            (0.975, 1.959_963_984_540_054),
            (0.01, -2.326_347_874_040_841),
            (0.3, -0.524_400_512_708_041),
            (1e-6, -4.753_424_308_822_899),
        ] {
            let got = normal_quantile(p, 0.0, 1.0);
            assert!(((got - z) / z).abs() < 1.5e-9, "p = {}: {} vs {}", p, got, z);
        }
    }

    #[test]
    fn quantile_inverts_cdf() {
        for p in [0.001, 0.02, 0.3, 0.5, 0.77, 0.99, 0.9995] {
            let x = normal_quantile(p, 0.3, 0.2);
            assert!(approx_eq(normal_cdf(x, 0.3, 0.2), p, 1e-6), "p = {}", p);
        }
    }

    #[test]
    fn quantile_edges() {
        assert!(normal_quantile(0.0, 0.0, 1.0).is_infinite());
        assert!(normal_quantile(1.0, 0.0, 1.0).is_infinite());
        assert!(normal_quantile(0.5, 0.0, 0.0).is_nan());
    }
}
