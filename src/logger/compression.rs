//! Gzip compression of rotated log files

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

/// Compresses `path` into `path.gz` and removes the original.
pub fn compress_file(path: &Path) -> io::Result<PathBuf> {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    let target = PathBuf::from(name);

    let mut input = BufReader::new(File::open(path)?);
    let output = BufWriter::new(File::create(&target)?);
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use proptest::prelude::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_compress_replaces_original() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log.1");
        fs::write(&path, "line one\nline two\n").unwrap();

        let target = compress_file(&path).unwrap();

        assert!(!path.exists());
        assert_eq!(target, dir.path().join("app.log.1.gz"));
        assert!(target.exists());
    }

    proptest! {
        #[test]
        fn prop_compressed_content_decodes_back(content in "[a-zA-Z0-9 \n]{1,512}") {
            let dir = tempdir().unwrap();
            let path = dir.path().join("app.log.2");
            fs::write(&path, &content).unwrap();

            let target = compress_file(&path).unwrap();
            let mut decoded = String::new();
            GzDecoder::new(File::open(target).unwrap())
                .read_to_string(&mut decoded)
                .unwrap();

            prop_assert_eq!(decoded, content);
        }
    }
}
