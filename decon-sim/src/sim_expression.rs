use anyhow::Result;
use clap::Args;
use log::info;
use rand::SeedableRng;

use decon_sim::simulate::{simulate_expression, SimulationParams};

#[derive(Args, Debug, Clone)]
pub struct SimExpressionArgs {
    /// File containing cell counts (samples × cell types)
    pub cellcount_file: String,

    /// File containing genotypes (SNPs × samples, same sample order)
    pub genotype_file: String,

    /// Output directory to write the simulated data to
    pub out_dir: String,

    /// Number of samples to simulate
    pub number_of_samples: usize,

    /// Number of SNPs (= synthetic genes) to simulate
    pub number_of_snps: usize,

    /// Name of the batch, used in output file names
    pub batch: String,

    /// Random seed (drawn from OS entropy if not given)
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn sim_expression(args: &SimExpressionArgs) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("Random seed: {}", seed);
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let params = SimulationParams {
        cellcount_file: args.cellcount_file.clone(),
        genotype_file: args.genotype_file.clone(),
        out_dir: args.out_dir.clone(),
        number_of_samples: args.number_of_samples,
        number_of_snps: args.number_of_snps,
        batch: args.batch.clone(),
    };

    let summary = simulate_expression(&params, &mut rng)?;
    info!(
        "Simulated {} genes × {} samples ({} cell types)",
        summary.num_genes, summary.num_samples, summary.num_cell_types
    );
    Ok(())
}
