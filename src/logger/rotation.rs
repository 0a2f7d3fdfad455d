//! Numbered size-based rotation: `app.log` → `app.log.1` → `app.log.2` ...

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::logger::compression::compress_file;
use crate::logger::config::RotationConfig;

pub struct RotationManager {
    config: RotationConfig,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self { config }
    }

    pub fn should_rotate(&self, current_size: u64) -> bool {
        current_size >= self.config.max_size
    }

    /// Shifts every rotated file up by one index, dropping the oldest, and
    /// moves the active file into slot 1.
    pub fn rotate(&self, active: &Path) -> io::Result<()> {
        let max = self.config.max_files;

        for candidate in [numbered(active, max), gz(&numbered(active, max))] {
            if candidate.exists() {
                fs::remove_file(candidate)?;
            }
        }

        for index in (1..max).rev() {
            let from = numbered(active, index);
            let to = numbered(active, index + 1);
            if from.exists() {
                fs::rename(&from, &to)?;
            }
            let (from_gz, to_gz) = (gz(&from), gz(&to));
            if from_gz.exists() {
                fs::rename(from_gz, to_gz)?;
            }
        }

        if active.exists() {
            let first = numbered(active, 1);
            fs::rename(active, &first)?;
            if self.config.compress {
                compress_file(&first)?;
            }
        }
        Ok(())
    }
}

fn numbered(active: &Path, index: usize) -> PathBuf {
    let mut name = active.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

fn gz(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn manager(max_files: usize, compress: bool) -> RotationManager {
        RotationManager::new(RotationConfig {
            max_size: 16,
            max_files,
            compress,
        })
    }

    #[test]
    fn test_should_rotate_at_threshold() {
        let m = manager(3, false);
        assert!(!m.should_rotate(15));
        assert!(m.should_rotate(16));
    }

    #[test]
    fn test_rotation_keeps_at_most_max_files() {
        let dir = tempdir().unwrap();
        let active = dir.path().join("app.log");
        let m = manager(2, false);

        for generation in 0..4 {
            fs::write(&active, format!("generation {generation}")).unwrap();
            m.rotate(&active).unwrap();
        }

        assert!(!active.exists());
        assert_eq!(fs::read_to_string(numbered(&active, 1)).unwrap(), "generation 3");
        assert_eq!(fs::read_to_string(numbered(&active, 2)).unwrap(), "generation 2");
        assert!(!numbered(&active, 3).exists());
    }

    #[test]
    fn test_rotation_compresses_when_enabled() {
        let dir = tempdir().unwrap();
        let active = dir.path().join("app.log");
        let m = manager(3, true);

        fs::write(&active, "first").unwrap();
        m.rotate(&active).unwrap();
        fs::write(&active, "second").unwrap();
        m.rotate(&active).unwrap();

        assert!(gz(&numbered(&active, 1)).exists());
        assert!(gz(&numbered(&active, 2)).exists());
        assert!(!numbered(&active, 1).exists());
    }
}
