use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::effect_sizes::draw_effect_sizes;

/// Betas of one synthetic gene, index `i` ↔ cell type `i`
#[derive(Debug, Clone, PartialEq)]
pub struct GeneBetas {
    /// main effect of each cell type
    pub cc_betas: Vec<f64>,
    /// cell type × genotype interaction effects (shared sign)
    pub cc_gt_betas: Vec<f64>,
}

/// Draw the main and interaction betas of one gene
///
/// Both vectors are the first `num_cell_types` entries of two
/// independent shuffles of the same `2k` mixed pool. The whole
/// interaction vector is negated with probability 1/2.
pub fn draw_gene_betas<R: Rng + ?Sized>(num_cell_types: usize, rng: &mut R) -> Result<GeneBetas> {
    let pool = draw_effect_sizes(num_cell_types, rng)?.mixed;

    let mut cc_betas = pool.clone();
    cc_betas.shuffle(rng);
    cc_betas.truncate(num_cell_types);

    let mut cc_gt_betas = pool;
    cc_gt_betas.shuffle(rng);
    cc_gt_betas.truncate(num_cell_types);

    if rng.random_bool(0.5) {
        cc_gt_betas.iter_mut().for_each(|b| *b = -*b);
    }

    Ok(GeneBetas {
        cc_betas,
        cc_gt_betas,
    })
}

/// Pre-drawn `N(0, 1)` values shared by all genes of a run
#[derive(Debug, Clone)]
pub struct NoisePool {
    values: Vec<f64>,
}

impl NoisePool {
    /// `num_genotype_lines + 2` standard normal draws
    pub fn sample<R: Rng + ?Sized>(num_genotype_lines: usize, rng: &mut R) -> Result<Self> {
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| anyhow::anyhow!("Failed to create Normal distribution: {}", e))?;
        let values = (0..(num_genotype_lines + 2))
            .map(|_| normal.sample(rng))
            .collect();
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a uniformly random entry; genes may share a value
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.values[rng.random_range(0..self.values.len())]
    }
}

/// Expression of one sample for one gene
///
/// ```text
/// y = Σ_i ( cc_beta[i] * cc[i] + cc_gt_beta[i] * cc[i] * dosage ) + noise
/// ```
pub fn expression_value(betas: &GeneBetas, cell_counts: &[f64], dosage: f64, noise: f64) -> f64 {
    let mut expression = 0.0;
    for ((&cc, &beta), &gt_beta) in cell_counts
        .iter()
        .zip(betas.cc_betas.iter())
        .zip(betas.cc_gt_betas.iter())
    {
        expression += beta * cc;
        expression += gt_beta * cc * dosage;
    }
    expression + noise
}
