use anyhow::Result;
use std::io::Write;
use std::path::Path;

use crate::common_io::{mkdir_parent, open_buf_writer};
use crate::expression::GeneBetas;

/// Locations of the five files written by one run
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub beta_info: Box<str>,
    pub genotypes: Box<str>,
    pub cell_counts: Box<str>,
    pub expression: Box<str>,
    pub snps_to_test: Box<str>,
}

impl OutputPaths {
    /// `<out_dir>/{betas,genotypes,cellcounts,expression,snpsToTest}/...`
    pub fn new(out_dir: &str, batch: &str, number_of_samples: usize) -> Self {
        let file = |sub: &str, name: String| -> Box<str> {
            Box::from(Path::new(out_dir).join(sub).join(name).to_string_lossy())
        };
        let tag = format!("{}.{}samples", batch, number_of_samples);
        Self {
            beta_info: file("betas", format!("beta_info_cc{}.txt", tag)),
            genotypes: file("genotypes", format!("genotypes_{}.txt", tag)),
            cell_counts: file("cellcounts", format!("cellcounts_{}.txt", tag)),
            expression: file("expression", format!("simulated_expression_{}.txt", tag)),
            snps_to_test: file("snpsToTest", format!("snpsToTest_{}.txt", batch)),
        }
    }

    pub fn all(&self) -> [&str; 5] {
        [
            self.beta_info.as_ref(),
            self.genotypes.as_ref(),
            self.cell_counts.as_ref(),
            self.expression.as_ref(),
            self.snps_to_test.as_ref(),
        ]
    }
}

/// Open writers for all five outputs
///
/// Dropping the sinks closes every file; [`OutputSinks::finish`]
/// additionally flushes and reports write errors.
pub struct OutputSinks {
    beta_info: Box<dyn Write>,
    genotypes: Box<dyn Write>,
    cell_counts: Box<dyn Write>,
    expression: Box<dyn Write>,
    snps_to_test: Box<dyn Write>,
}

fn create_writer(file: &str) -> Result<Box<dyn Write>> {
    mkdir_parent(file)?;
    open_buf_writer(file)
}

fn write_row<W: Write + ?Sized, T: std::fmt::Display>(
    writer: &mut W,
    first: &str,
    rest: impl IntoIterator<Item = T>,
) -> std::io::Result<()> {
    write!(writer, "{}", first)?;
    for x in rest {
        write!(writer, "\t{}", x)?;
    }
    writeln!(writer)
}

impl OutputSinks {
    /// Create the output directories and open every file
    pub fn create(paths: &OutputPaths) -> Result<Self> {
        Ok(Self {
            beta_info: create_writer(&paths.beta_info)?,
            genotypes: create_writer(&paths.genotypes)?,
            cell_counts: create_writer(&paths.cell_counts)?,
            expression: create_writer(&paths.expression)?,
            snps_to_test: create_writer(&paths.snps_to_test)?,
        })
    }

    /// Header rows of all files plus the selected samples' cell counts
    ///
    /// * `cell_type_names` - cell types in column order
    /// * `samples` - selected samples in output order, with their counts
    pub fn write_headers<'a>(
        &mut self,
        cell_type_names: &[Box<str>],
        samples: impl IntoIterator<Item = (&'a str, &'a [f64])>,
    ) -> Result<()> {
        write!(self.beta_info, "gene\tsnp")?;
        for cc in cell_type_names {
            write!(self.beta_info, "\t{}_beta\t{}:GT_beta", cc, cc)?;
        }
        writeln!(self.beta_info, "\terror")?;

        write_row(&mut self.cell_counts, "", cell_type_names)?;

        let mut names = vec![];
        for (sample, counts) in samples {
            write_row(&mut self.cell_counts, sample, counts)?;
            names.push(sample);
        }

        write_row(&mut self.genotypes, "", &names)?;
        write_row(&mut self.expression, "", &names)?;
        writeln!(self.snps_to_test, "gene\tsnp")?;
        Ok(())
    }

    /// Ground truth of one gene: `gene snp (beta gt_beta)... error`
    pub fn write_betas(
        &mut self,
        gene: &str,
        snp: &str,
        betas: &GeneBetas,
        noise: f64,
    ) -> Result<()> {
        write!(self.beta_info, "{}\t{}", gene, snp)?;
        for (b, gb) in betas.cc_betas.iter().zip(betas.cc_gt_betas.iter()) {
            write!(self.beta_info, "\t{}\t{}", b, gb)?;
        }
        writeln!(self.beta_info, "\t{}", noise)?;
        Ok(())
    }

    pub fn write_genotypes(&mut self, snp: &str, dosages: &[f64]) -> Result<()> {
        write_row(&mut self.genotypes, snp, dosages)?;
        Ok(())
    }

    pub fn write_expression(&mut self, gene: &str, values: &[f64]) -> Result<()> {
        write_row(&mut self.expression, gene, values)?;
        Ok(())
    }

    pub fn write_snp_to_test(&mut self, gene: &str, snp: &str) -> Result<()> {
        writeln!(self.snps_to_test, "{}\t{}", gene, snp)?;
        Ok(())
    }

    /// Flush and close all files
    pub fn finish(mut self) -> Result<()> {
        self.beta_info.flush()?;
        self.genotypes.flush()?;
        self.cell_counts.flush()?;
        self.expression.flush()?;
        self.snps_to_test.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::new("/tmp/sim", "b1", 100);
        assert_eq!(
            paths.beta_info.as_ref(),
            "/tmp/sim/betas/beta_info_ccb1.100samples.txt"
        );
        assert_eq!(
            paths.genotypes.as_ref(),
            "/tmp/sim/genotypes/genotypes_b1.100samples.txt"
        );
        assert_eq!(
            paths.cell_counts.as_ref(),
            "/tmp/sim/cellcounts/cellcounts_b1.100samples.txt"
        );
        assert_eq!(
            paths.expression.as_ref(),
            "/tmp/sim/expression/simulated_expression_b1.100samples.txt"
        );
        assert_eq!(
            paths.snps_to_test.as_ref(),
            "/tmp/sim/snpsToTest/snpsToTest_b1.txt"
        );
    }

    #[test]
    fn test_headers_and_rows() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let paths = OutputPaths::new(dir.path().to_str().unwrap(), "t", 2);

        let names: Vec<Box<str>> = vec![Box::from("CC1"), Box::from("CC2")];
        let s2 = [20.0, 1.0];
        let s1 = [10.0, 5.5];

        let mut sinks = OutputSinks::create(&paths)?;
        sinks.write_headers(&names, vec![("s2", &s2[..]), ("s1", &s1[..])])?;
        let betas = GeneBetas {
            cc_betas: vec![1.5, 0.25],
            cc_gt_betas: vec![-2.0, -0.125],
        };
        sinks.write_betas("gene_0", "rs1", &betas, 0.5)?;
        sinks.write_genotypes("rs1", &[2.0, 0.0])?;
        sinks.write_expression("gene_0", &[1.0, -3.5])?;
        sinks.write_snp_to_test("gene_0", "rs1")?;
        sinks.finish()?;

        let read = |f: &str| std::fs::read_to_string(f).unwrap();
        assert_eq!(
            read(&paths.beta_info),
            "gene\tsnp\tCC1_beta\tCC1:GT_beta\tCC2_beta\tCC2:GT_beta\terror\n\
             gene_0\trs1\t1.5\t-2\t0.25\t-0.125\t0.5\n"
        );
        assert_eq!(read(&paths.cell_counts), "\tCC1\tCC2\ns2\t20\t1\ns1\t10\t5.5\n");
        assert_eq!(read(&paths.genotypes), "\ts2\ts1\nrs1\t2\t0\n");
        assert_eq!(read(&paths.expression), "\ts2\ts1\ngene_0\t1\t-3.5\n");
        assert_eq!(read(&paths.snps_to_test), "gene\tsnp\ngene_0\trs1\n");
        Ok(())
    }
}
