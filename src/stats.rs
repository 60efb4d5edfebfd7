use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::piece::Side;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Stats file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed stats record: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinCounts {
    pub blue: u32,
    pub pink: u32,
}

impl WinCounts {
    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Blue => self.blue,
            Side::Pink => self.pink,
        }
    }

    fn bump(&mut self, side: Side) {
        match side {
            Side::Blue => self.blue += 1,
            Side::Pink => self.pink += 1,
        }
    }

    /// Parse the `"<blue>,<pink>"` record.
    pub fn parse(text: &str) -> Result<Self, StatsError> {
        let (blue, pink) = text
            .trim()
            .split_once(',')
            .ok_or_else(|| StatsError::Parse(text.to_string()))?;

        let number = |s: &str| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| StatsError::Parse(text.to_string()))
        };

        Ok(WinCounts {
            blue: number(blue)?,
            pink: number(pink)?,
        })
    }

    pub fn to_record(&self) -> String {
        format!("{},{}", self.blue, self.pink)
    }
}

/// Keeps the tally of games won by each side across games.
pub trait WinRecorder: Send {
    /// Called once per finished game
    fn record_win(&mut self, side: Side) -> Result<(), StatsError>;

    fn counts(&self) -> WinCounts;

    fn reset(&mut self) -> Result<(), StatsError>;
}

/// Counts that live only as long as the process
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    counts: WinCounts,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WinRecorder for MemoryRecorder {
    fn record_win(&mut self, side: Side) -> Result<(), StatsError> {
        self.counts.bump(side);
        Ok(())
    }

    fn counts(&self) -> WinCounts {
        self.counts
    }

    fn reset(&mut self) -> Result<(), StatsError> {
        self.counts = WinCounts::default();
        Ok(())
    }
}

/// Counts persisted to a one-line text file.
#[derive(Debug)]
pub struct FileRecorder {
    path: PathBuf,
    counts: WinCounts,
}

impl FileRecorder {
    /// Open the counts file at `path`. A missing or unreadable record starts
    /// from zero and is rewritten.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StatsError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let loaded = fs::read_to_string(&path)
            .map_err(StatsError::from)
            .and_then(|text| WinCounts::parse(&text));

        let mut recorder = FileRecorder {
            path,
            counts: WinCounts::default(),
        };

        match loaded {
            Ok(counts) => recorder.counts = counts,
            Err(e) => {
                warn!(path = %recorder.path.display(), error = %e, "starting win counts from zero");
                recorder.save()?;
            }
        }

        Ok(recorder)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StatsError> {
        fs::write(&self.path, self.counts.to_record())?;
        Ok(())
    }
}

impl WinRecorder for FileRecorder {
    fn record_win(&mut self, side: Side) -> Result<(), StatsError> {
        self.counts.bump(side);
        self.save()
    }

    fn counts(&self) -> WinCounts {
        self.counts
    }

    fn reset(&mut self) -> Result<(), StatsError> {
        self.counts = WinCounts::default();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_path(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join(format!("checkers-arena-{}-{}", std::process::id(), n))
            .join(name)
    }

    #[test]
    fn test_parse_record() {
        assert_eq!(WinCounts::parse("3,5").unwrap(), WinCounts { blue: 3, pink: 5 });
        assert_eq!(WinCounts::parse(" 0, 12\n").unwrap(), WinCounts { blue: 0, pink: 12 });
        assert!(WinCounts::parse("").is_err());
        assert!(WinCounts::parse("7").is_err());
        assert!(WinCounts::parse("a,b").is_err());
    }

    #[test]
    fn test_memory_recorder() {
        let mut stats = MemoryRecorder::new();
        stats.record_win(Side::Blue).unwrap();
        stats.record_win(Side::Blue).unwrap();
        stats.record_win(Side::Pink).unwrap();

        assert_eq!(stats.counts().get(Side::Blue), 2);
        assert_eq!(stats.counts().get(Side::Pink), 1);

        stats.reset().unwrap();
        assert_eq!(stats.counts(), WinCounts::default());
    }

    #[test]
    fn test_file_recorder_creates_missing_file() {
        let path = temp_path("stats.txt");
        let stats = FileRecorder::open(&path).unwrap();

        assert_eq!(stats.counts(), WinCounts::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "0,0");
    }

    #[test]
    fn test_file_recorder_persists() {
        let path = temp_path("stats.txt");
        {
            let mut stats = FileRecorder::open(&path).unwrap();
            stats.record_win(Side::Pink).unwrap();
            stats.record_win(Side::Blue).unwrap();
            stats.record_win(Side::Pink).unwrap();
        }

        let reopened = FileRecorder::open(&path).unwrap();
        assert_eq!(reopened.counts(), WinCounts { blue: 1, pink: 2 });
    }

    #[test]
    fn test_file_recorder_recovers_from_garbage() {
        let path = temp_path("stats.txt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not a record").unwrap();

        let stats = FileRecorder::open(&path).unwrap();
        assert_eq!(stats.counts(), WinCounts::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "0,0");
    }

    #[test]
    fn test_file_recorder_reset() {
        let path = temp_path("stats.txt");
        let mut stats = FileRecorder::open(&path).unwrap();
        stats.record_win(Side::Blue).unwrap();
        stats.reset().unwrap();

        assert_eq!(fs::read_to_string(stats.path()).unwrap(), "0,0");
    }
}
