use anyhow::Result;
use rand::distr::Open01;
use rand::seq::SliceRandom;
use rand::Rng;
use statrs::distribution::{ContinuousCDF, Normal};

/// Nominal significance threshold for a single effect
pub const NOMINAL_PVALUE: f64 = 0.05;

/// Standardized effect sizes drawn for one synthetic gene
#[derive(Debug, Clone)]
pub struct EffectSizes {
    /// `n` effects with implied p-value below `0.05 / x`
    pub significant: Vec<f64>,
    /// `n` effects with implied p-value in `(0.05, 1)`
    pub non_significant: Vec<f64>,
    /// non-significant ++ significant, shuffled (length `2n`)
    pub mixed: Vec<f64>,
}

/// Scale factor applied to the significance bound of the `i`-th
/// significant draw: 1, 1, 10, 10, 100, 100, ...
pub fn significance_scale(i: usize) -> f64 {
    10_f64.powi((i / 2) as i32)
}

/// Two-sided normal quantile `Φ⁻¹(1 - p/2)`
///
/// Evaluated as `-Φ⁻¹(p/2)` so that tiny p-values do not collapse
/// `1 - p/2` to exactly one.
pub fn pvalue_to_effect(normal: &Normal, pval: f64) -> f64 {
    -normal.inverse_cdf(pval / 2.0)
}

/// Inverse of [`pvalue_to_effect`]: two-sided p-value implied by `|beta|`
pub fn effect_to_pvalue(normal: &Normal, beta: f64) -> f64 {
    2.0 * normal.cdf(-beta.abs())
}

/// Draw `n` significant and `n` non-significant effect sizes
///
/// # Model
/// * significant: `p_i ~ U(0, 0.05 / x_i)` with `x_i` from [`significance_scale`]
/// * non-significant: `p_i ~ U(0.05, 1)`
/// * `beta_i = Φ⁻¹(1 - p_i / 2)`
///
/// Both intervals are open, so every effect is finite.
pub fn draw_effect_sizes<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<EffectSizes> {
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| anyhow::anyhow!("Failed to create Normal distribution: {}", e))?;

    let significant: Vec<f64> = (0..n)
        .map(|i| {
            let upper = NOMINAL_PVALUE / significance_scale(i);
            let u: f64 = rng.sample(Open01);
            pvalue_to_effect(&normal, upper * u)
        })
        .collect();

    let non_significant: Vec<f64> = (0..n)
        .map(|_| {
            let u: f64 = rng.sample(Open01);
            pvalue_to_effect(&normal, NOMINAL_PVALUE + (1.0 - NOMINAL_PVALUE) * u)
        })
        .collect();

    let mut mixed = Vec::with_capacity(2 * n);
    mixed.extend_from_slice(&non_significant);
    mixed.extend_from_slice(&significant);
    mixed.shuffle(rng);

    Ok(EffectSizes {
        significant,
        non_significant,
        mixed,
    })
}
