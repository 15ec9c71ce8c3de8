use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

///
/// Open a file for reading, and return a buffered reader
/// * `input_file` - file name--either gzipped or not
///
pub fn open_buf_reader(input_file: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let file = File::open(input_file)
        .map_err(|e| anyhow::anyhow!("failed to open {}: {}", input_file, e))?;
    match Path::new(input_file).extension().and_then(|x| x.to_str()) {
        Some("gz") => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

///
/// Open a file for writing, and return a buffered writer
/// * `output_file` - file name--either gzipped or not
///
pub fn open_buf_writer(output_file: &str) -> anyhow::Result<Box<dyn Write>> {
    let file = File::create(output_file)
        .map_err(|e| anyhow::anyhow!("failed to create {}: {}", output_file, e))?;
    match Path::new(output_file).extension().and_then(|x| x.to_str()) {
        Some("gz") => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            Ok(Box::new(BufWriter::new(encoder)))
        }
        _ => Ok(Box::new(BufWriter::new(file))),
    }
}

///
/// Create the parent directory of a file if needed
/// * `file` - file name
///
pub fn mkdir_parent(file: &str) -> anyhow::Result<()> {
    let dir = Path::new(file)
        .parent()
        .ok_or(anyhow::anyhow!("no parent: {}", file))?;
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Split one tab-delimited line, dropping the trailing newline (and `\r`)
pub fn split_tab(line: &str) -> Vec<&str> {
    line.trim_end_matches(['\n', '\r']).split('\t').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_split_tab_keeps_empty_cells() {
        assert_eq!(split_tab("\tCC1\tCC2\r\n"), vec!["", "CC1", "CC2"]);
        assert_eq!(split_tab("s1\t10"), vec!["s1", "10"]);
    }

    #[test]
    fn test_gz_round_trip() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("nested/lines.txt.gz");
        let file = file.to_str().unwrap();

        mkdir_parent(file)?;
        {
            let mut writer = open_buf_writer(file)?;
            writeln!(writer, "a\tb")?;
            writer.flush()?;
        }

        let mut reader = open_buf_reader(file)?;
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        assert_eq!(text, "a\tb\n");
        Ok(())
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = open_buf_reader("/nonexistent/cellcounts.txt").err().unwrap();
        assert!(err.to_string().contains("/nonexistent/cellcounts.txt"));
    }
}
