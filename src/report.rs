//! Learning curve produced by the evaluation blocks of a run

use std::{fmt, fs::File, io::Write, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Average evaluation reward measured after some number of training episodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestBlockRecord {
    /// Training episodes completed when the block was played
    pub episodes_played: usize,
    /// Cumulative discounted test reward divided by the block size
    pub average_reward: f64,
}

/// Ordered list of evaluation results, one per completed block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearningCurve {
    records: Vec<TestBlockRecord>,
}

impl LearningCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TestBlockRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TestBlockRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&TestBlockRecord> {
        self.records.last()
    }

    /// Save as a JSON array
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref()).map_err(|source| Error::Io {
            operation: format!("create {}", path.as_ref().display()),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Write `episodes_played,average_reward` rows with a header
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &self.records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref()).map_err(|source| Error::Io {
            operation: format!("create {}", path.as_ref().display()),
            source,
        })?;
        self.write_csv(file)
    }
}

impl fmt::Display for LearningCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#")?;
        writeln!(f, "#Games Played      Average Cumulative Reward")?;
        writeln!(f, "#-------------     -------------------------")?;
        for record in &self.records {
            writeln!(
                f,
                " {:<18}{:.2}",
                record.episodes_played, record.average_reward
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn curve() -> LearningCurve {
        let mut curve = LearningCurve::new();
        curve.push(TestBlockRecord {
            episodes_played: 10,
            average_reward: -312.456,
        });
        curve.push(TestBlockRecord {
            episodes_played: 20,
            average_reward: 87.5,
        });
        curve
    }

    #[test]
    fn table_has_one_row_per_block() {
        let rendered = curve().to_string();
        let rows: Vec<&str> = rendered.lines().filter(|l| !l.starts_with('#')).collect();

        assert_eq!(rows.len(), 2);
        assert!(rows[0].trim_start().starts_with("10"));
        assert!(rows[0].ends_with("-312.46"));
        assert!(rows[1].ends_with("87.50"));
    }

    #[test]
    fn csv_has_header_and_rows() {
        let mut buffer = Vec::new();
        curve().write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("episodes_played,average_reward"));
        assert_eq!(lines.next(), Some("10,-312.456"));
        assert_eq!(lines.next(), Some("20,87.5"));
    }

    #[test]
    fn json_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("curve.json");
        curve().save_json(&path).unwrap();

        let loaded: LearningCurve =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(loaded, curve());
    }
}
