use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::domain::CandidateRecord;
use super::repository::{CandidateRepository, RepositoryError};

/// Column header written at the top of every dataset file.
pub const DATASET_COLUMNS: [&str; 18] = [
    "Name",
    "Username",
    "Age",
    "Gender",
    "EdLevel",
    "YearsCode",
    "YearsCodePro",
    "Country",
    "PreviousSalary",
    "HaveWorkedWith",
    "ComputerSkills",
    "MentalHealth",
    "Employed",
    "JobRole",
    "Status",
    "Feedback",
    "ApplicationDate",
    "PriorityScore",
];

pub fn read_candidates<R: Read>(reader: R) -> Result<Vec<CandidateRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize::<CandidateRecord>().collect()
}

pub fn write_candidates<W: Write>(
    writer: W,
    records: &[CandidateRecord],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(DATASET_COLUMNS)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Candidate dataset kept in a single CSV file.
#[derive(Debug, Clone)]
pub struct CsvCandidateStore {
    path: PathBuf,
}

impl CsvCandidateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CandidateRepository for CsvCandidateStore {
    /// A missing file is created with just the header row.
    fn load_all(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "creating empty candidate dataset");
            self.save_all(&[])?;
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path)?;
        let records = read_candidates(file)?;
        debug!(path = %self.path.display(), rows = records.len(), "loaded candidate dataset");
        Ok(records)
    }

    fn save_all(&self, records: &[CandidateRecord]) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = self.path.with_extension("csv.tmp");
        write_candidates(fs::File::create(&staging)?, records)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}
