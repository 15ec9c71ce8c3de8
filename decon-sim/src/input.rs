use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::io::BufRead;

use crate::common_io::{open_buf_reader, split_tab};

/// Per-sample cell type counts (or proportions)
///
/// ```text
///          CC1    CC2
/// sample1  75     14
/// sample2  84     4
/// ```
#[derive(Debug, Clone)]
pub struct CellCountTable {
    pub cell_type_names: Vec<Box<str>>,
    /// Canonical sample order (order of first appearance)
    pub samples: Vec<Box<str>>,
    /// Counts per sample, aligned with `cell_type_names`
    pub counts: HashMap<Box<str>, Vec<f64>>,
}

impl CellCountTable {
    pub fn num_cell_types(&self) -> usize {
        self.cell_type_names.len()
    }

    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn counts_of(&self, sample: &str) -> Result<&[f64]> {
        self.counts
            .get(sample)
            .map(|x| x.as_slice())
            .ok_or_else(|| anyhow::anyhow!("no cell counts for sample {}", sample))
    }
}

/// One SNP line of the genotype file
#[derive(Debug, Clone)]
pub struct GenotypeRow {
    /// 0-based data line index (header excluded)
    pub line_index: usize,
    pub snp_id: Box<str>,
    /// Dosage per sample in the original header order
    pub dosages: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct GenotypeTable {
    pub samples: Vec<Box<str>>,
    pub rows: Vec<GenotypeRow>,
    /// All data lines in the file, including skipped and unparsed ones
    pub num_data_lines: usize,
}

impl GenotypeTable {
    pub fn num_snps(&self) -> usize {
        self.rows.len()
    }
}

fn parse_value(token: &str, what: &str, file: &str, line_no: usize) -> Result<f64> {
    token.trim().parse::<f64>().with_context(|| {
        format!(
            "{}:{}: failed to parse {} '{}' as a number",
            file, line_no, what, token
        )
    })
}

/// Read the cell count file
///
/// The first header token labels the sample column and is discarded.
/// A header with no such label (as many names as count columns) is
/// taken as-is.
pub fn read_cell_counts(cellcount_file: &str) -> Result<CellCountTable> {
    info!("Reading cell counts from {}", cellcount_file);

    let mut lines = open_buf_reader(cellcount_file)?.lines();

    let header = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("Empty cell count file: {}", cellcount_file))??;
    let header: Vec<Box<str>> = split_tab(&header).into_iter().map(Box::from).collect();

    let mut samples: Vec<Box<str>> = vec![];
    let mut counts: HashMap<Box<str>, Vec<f64>> = HashMap::new();
    let mut num_columns: Option<usize> = None;

    for (i, line) in lines.enumerate() {
        let line = line?;
        let line_no = i + 2;
        if line.trim().is_empty() {
            continue;
        }
        let words = split_tab(&line);
        let ncol = words.len() - 1;

        match num_columns {
            None => num_columns = Some(ncol),
            Some(n) if n != ncol => anyhow::bail!(
                "{}:{}: expected {} cell counts, found {}",
                cellcount_file,
                line_no,
                n,
                ncol
            ),
            _ => {}
        }

        let sample: Box<str> = Box::from(words[0]);
        let values = words[1..]
            .iter()
            .map(|x| parse_value(x, "cell count", cellcount_file, line_no))
            .collect::<Result<Vec<f64>>>()?;

        if counts.insert(sample.clone(), values).is_some() {
            anyhow::bail!(
                "{}:{}: duplicate sample {}",
                cellcount_file,
                line_no,
                sample
            );
        }
        samples.push(sample);
    }

    let num_columns = num_columns
        .ok_or_else(|| anyhow::anyhow!("No samples in cell count file: {}", cellcount_file))?;

    let cell_type_names = if header.len() == num_columns {
        header
    } else if header.len() == num_columns + 1 {
        header[1..].to_vec()
    } else {
        anyhow::bail!(
            "{}: header has {} names but rows have {} cell counts",
            cellcount_file,
            header.len(),
            num_columns
        );
    };

    info!(
        "Loaded {} samples × {} cell types",
        samples.len(),
        cell_type_names.len()
    );

    Ok(CellCountTable {
        cell_type_names,
        samples,
        counts,
    })
}

/// Check that the genotype header lists exactly the canonical samples
pub fn check_sample_order(expected: &[Box<str>], found: &[Box<str>]) -> Result<()> {
    let first_mismatch = expected
        .iter()
        .zip(found.iter())
        .position(|(e, f)| e != f)
        .or_else(|| (expected.len() != found.len()).then(|| expected.len().min(found.len())));

    if let Some(idx) = first_mismatch {
        for (i, (e, f)) in expected.iter().zip(found.iter()).enumerate().take(idx + 1) {
            debug!("{}\t{}\t{}", i, e, f);
        }
        anyhow::bail!(
            "genotype header and cell count samples are not in the same order: \
             index {} has {} in the cell counts but {} in the genotypes \
             ({} vs {} samples)",
            idx,
            expected.get(idx).map(|x| x.as_ref()).unwrap_or("<none>"),
            found.get(idx).map(|x| x.as_ref()).unwrap_or("<none>"),
            expected.len(),
            found.len()
        );
    }
    Ok(())
}

/// Read the genotype file and validate its header against `samples`
///
/// * `genotype_file` - header = sample ids; rows = `snp_id dosage...`
/// * `samples` - canonical sample order from the cell count file
/// * `max_snps` - parse at most this many data lines into rows
///
/// Rows with a blank SNP id are skipped. Every data line is still
/// counted in `num_data_lines`.
pub fn read_genotypes(
    genotype_file: &str,
    samples: &[Box<str>],
    max_snps: usize,
) -> Result<GenotypeTable> {
    info!("Reading genotypes from {}", genotype_file);

    let mut lines = open_buf_reader(genotype_file)?.lines();

    let header = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("Empty genotype file: {}", genotype_file))??;
    let header: Vec<Box<str>> = header.trim().split('\t').map(Box::from).collect();

    check_sample_order(samples, &header)?;

    let n = header.len();
    let mut rows = vec![];
    let mut num_data_lines = 0;
    let mut num_skipped = 0;

    for (line_index, line) in lines.enumerate() {
        let line = line?;
        num_data_lines += 1;

        if line_index >= max_snps {
            continue;
        }

        let words = split_tab(&line);
        let snp_id = words[0].trim();
        if snp_id.is_empty() {
            num_skipped += 1;
            continue;
        }

        if words.len() < n + 1 {
            anyhow::bail!(
                "{}:{}: SNP {} has {} dosages, expected {}",
                genotype_file,
                line_index + 2,
                snp_id,
                words.len() - 1,
                n
            );
        }

        let dosages = words[1..=n]
            .iter()
            .map(|x| parse_value(x, "dosage", genotype_file, line_index + 2))
            .collect::<Result<Vec<f64>>>()?;

        rows.push(GenotypeRow {
            line_index,
            snp_id: Box::from(snp_id),
            dosages,
        });
    }

    info!(
        "Loaded {} SNPs ({} blank rows skipped, {} data lines in total)",
        rows.len(),
        num_skipped,
        num_data_lines
    );

    Ok(GenotypeTable {
        samples: header,
        rows,
        num_data_lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &std::path::Path, name: &str, text: &str) -> String {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(text.as_bytes()).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn boxed(xs: &[&str]) -> Vec<Box<str>> {
        xs.iter().map(|&x| Box::from(x)).collect()
    }

    #[test]
    fn test_read_cell_counts() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = write_file(
            dir.path(),
            "cc.txt",
            "sample\tneut\tlymph\ns2\t20\t1\ns1\t10\t5.5\n",
        );
        let cc = read_cell_counts(&file)?;
        assert_eq!(cc.cell_type_names, boxed(&["neut", "lymph"]));
        assert_eq!(cc.samples, boxed(&["s2", "s1"]));
        assert_eq!(cc.counts_of("s1")?, &[10.0, 5.5]);
        assert!(cc.counts_of("s3").is_err());
        Ok(())
    }

    #[test]
    fn test_cell_count_header_without_label() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let leading_tab = write_file(dir.path(), "a.txt", "\tCC1\tCC2\ns1\t1\t2\n");
        let no_label = write_file(dir.path(), "b.txt", "CC1\tCC2\ns1\t1\t2\n");
        assert_eq!(
            read_cell_counts(&leading_tab)?.cell_type_names,
            boxed(&["CC1", "CC2"])
        );
        assert_eq!(
            read_cell_counts(&no_label)?.cell_type_names,
            boxed(&["CC1", "CC2"])
        );
        Ok(())
    }

    #[test]
    fn test_cell_count_errors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let ragged = write_file(dir.path(), "r.txt", "s\tA\tB\ns1\t1\t2\ns2\t1\n");
        let text = write_file(dir.path(), "t.txt", "s\tA\ns1\tmany\n");
        let empty = write_file(dir.path(), "e.txt", "");
        assert!(read_cell_counts(&ragged).is_err());
        assert!(read_cell_counts(&text).is_err());
        assert!(read_cell_counts(&empty).is_err());
        Ok(())
    }

    #[test]
    fn test_check_sample_order() {
        let expected = boxed(&["s1", "s2", "s3"]);
        assert!(check_sample_order(&expected, &boxed(&["s1", "s2", "s3"])).is_ok());

        let err = check_sample_order(&expected, &boxed(&["s1", "s3", "s2"])).unwrap_err();
        assert!(err.to_string().contains("index 1"));

        let err = check_sample_order(&expected, &boxed(&["s1", "s2"])).unwrap_err();
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn test_read_genotypes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = write_file(
            dir.path(),
            "gt.txt",
            "\ts1\ts2\nrs1\t0\t2\n  \t1\t1\nrs3\t1\t0.5\nrs4\t2\t2\n",
        );
        let samples = boxed(&["s1", "s2"]);

        let gt = read_genotypes(&file, &samples, 3)?;
        assert_eq!(gt.num_data_lines, 4);
        assert_eq!(gt.num_snps(), 2);
        assert_eq!(gt.rows[0].snp_id.as_ref(), "rs1");
        assert_eq!(gt.rows[0].dosages, vec![0.0, 2.0]);
        assert_eq!(gt.rows[1].snp_id.as_ref(), "rs3");
        assert_eq!(gt.rows[1].line_index, 2);

        let gt = read_genotypes(&file, &samples, 100)?;
        assert_eq!(gt.num_snps(), 3);
        Ok(())
    }

    #[test]
    fn test_genotype_header_mismatch() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let file = write_file(dir.path(), "gt.txt", "s2\ts1\nrs1\t0\t2\n");
        let samples = boxed(&["s1", "s2"]);
        let err = read_genotypes(&file, &samples, 10).unwrap_err();
        assert!(err.to_string().contains("index 0"));
        Ok(())
    }
}
