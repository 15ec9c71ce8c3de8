use anyhow::Result;
use log::info;
use rand::Rng;

use crate::expression::{draw_gene_betas, expression_value, NoisePool};
use crate::input::{read_cell_counts, read_genotypes};
use crate::output::{OutputPaths, OutputSinks};
use crate::sample_selection::select_samples;

const PROGRESS_INTERVAL: usize = 100;

/// Inputs of one simulation run
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub cellcount_file: String,
    pub genotype_file: String,
    pub out_dir: String,
    pub number_of_samples: usize,
    pub number_of_snps: usize,
    pub batch: String,
}

#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub paths: OutputPaths,
    pub num_genes: usize,
    pub num_samples: usize,
    pub num_cell_types: usize,
}

/// Simulate expression with `expression ~ cc1 + cc2 + ... + snp:cc1 + snp:cc2 + ...`
///
/// Random draws happen in a fixed order: sample shuffle, noise pool,
/// then per genotype row the betas, their shuffles, the sign flip and
/// the noise lookup.
///
/// Both inputs are read and cross-checked before anything is written.
pub fn simulate_expression<R: Rng + ?Sized>(
    params: &SimulationParams,
    rng: &mut R,
) -> Result<SimulationSummary> {
    let cell_counts = read_cell_counts(&params.cellcount_file)?;
    let genotypes = read_genotypes(
        &params.genotype_file,
        &cell_counts.samples,
        params.number_of_snps,
    )?;
    let k = cell_counts.num_cell_types();

    let selected = select_samples(&cell_counts.samples, params.number_of_samples, rng);
    info!(
        "Selected {} of {} samples",
        selected.len(),
        cell_counts.num_samples()
    );

    let noise_pool = NoisePool::sample(genotypes.num_data_lines, rng)?;

    let mut selected_counts: Vec<(&str, &[f64])> = Vec::with_capacity(selected.len());
    for s in selected.samples.iter() {
        selected_counts.push((s.as_ref(), cell_counts.counts_of(s)?));
    }

    let paths = OutputPaths::new(&params.out_dir, &params.batch, params.number_of_samples);
    let mut sinks = OutputSinks::create(&paths)?;

    sinks.write_headers(&cell_counts.cell_type_names, selected_counts.iter().copied())?;

    info!("Simulating betas and expression");

    let mut dosages = Vec::with_capacity(selected.len());
    let mut expression = Vec::with_capacity(selected.len());

    for (i, row) in genotypes.rows.iter().enumerate() {
        if i % PROGRESS_INTERVAL == 0 {
            info!("processed {} lines", i);
        }

        let gene = format!("gene_{}", row.line_index);
        sinks.write_snp_to_test(&gene, &row.snp_id)?;

        let betas = draw_gene_betas(k, rng)?;
        let noise = noise_pool.draw(rng);
        sinks.write_betas(&gene, &row.snp_id, &betas, noise)?;

        dosages.clear();
        expression.clear();
        for ((_, orig_idx), &(_, counts)) in selected.iter().zip(selected_counts.iter()) {
            let dosage = row.dosages[orig_idx];
            dosages.push(dosage);
            expression.push(expression_value(&betas, counts, dosage, noise));
        }

        sinks.write_genotypes(&row.snp_id, &dosages)?;
        sinks.write_expression(&gene, &expression)?;
    }

    sinks.finish()?;

    info!("output written to {}/", params.out_dir);
    for file in paths.all() {
        info!("  {}", file);
    }

    Ok(SimulationSummary {
        num_genes: genotypes.num_snps(),
        num_samples: selected.len(),
        num_cell_types: k,
        paths,
    })
}
