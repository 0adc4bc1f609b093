// Table store - whole-file load/save of one entity's records

use crate::error::{CampusDbError, Result};
use crate::schema::{Entity, Record};
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The backing file of one entity. Every write replaces the whole file.
#[derive(Debug, Clone)]
pub struct Table<R> {
    path: PathBuf,
    delimiter: u8,
    _record: PhantomData<R>,
}

impl<R: Record> Table<R> {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8) -> Self {
        Table {
            path: path.into(),
            delimiter,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every record. A missing or zero-length file is an empty table.
    pub fn load(&self) -> Result<Vec<R>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("{} table {} absent, treating as empty", R::ENTITY, self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if file.metadata()?.len() == 0 {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(file);

        let headers = reader.headers().map_err(|e| self.row_error(e))?.clone();
        let expected = R::header();
        if !headers.iter().eq(expected.iter().copied()) {
            return Err(self.storage_error(format!(
                "header mismatch: expected [{}], found [{}]",
                expected.join(", "),
                headers.iter().collect::<Vec<_>>().join(", ")
            )));
        }

        let mut records = Vec::new();
        for row in reader.deserialize::<R>() {
            records.push(row.map_err(|e| self.row_error(e))?);
        }

        log::debug!(
            "Loaded {} {} record(s) from {}",
            records.len(),
            R::ENTITY,
            self.path.display()
        );
        Ok(records)
    }

    /// Like [`Table::load`], but a missing file is a storage error. Used by
    /// updates and deletes, which need existing data to act on.
    pub fn load_existing(&self) -> Result<Vec<R>> {
        if !self.exists() {
            return Err(self.storage_error(format!(
                "{} table does not exist",
                R::ENTITY
            )));
        }
        self.load()
    }

    /// Write the header and `records` to a temp file beside the table.
    /// Nothing is visible until the returned [`StagedTable`] is committed.
    pub fn stage(&self, records: &[R]) -> Result<StagedTable> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut file = tempfile::Builder::new()
            .prefix(".campusdb-")
            .suffix(".tmp")
            .tempfile_in(&dir)?;

        {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(self.delimiter)
                .has_headers(false)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(&mut file);
            writer.write_record(R::header())?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        file.flush()?;
        file.as_file().sync_all()?;

        Ok(StagedTable {
            entity: R::ENTITY,
            target: self.path.clone(),
            file,
            rows: records.len(),
        })
    }

    /// Replace the table's content with `records`.
    pub fn save_all(&self, records: &[R]) -> Result<()> {
        self.stage(records)?.commit()
    }

    fn storage_error(&self, message: String) -> CampusDbError {
        CampusDbError::Storage {
            path: self.path.clone(),
            message,
        }
    }

    fn row_error(&self, err: csv::Error) -> CampusDbError {
        let message = match err.kind() {
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => {
                let line = pos.as_ref().map(|p| p.line()).unwrap_or_default();
                format!("malformed row at line {line}: expected {expected_len} fields, found {len}")
            }
            _ => match err.position() {
                Some(pos) => format!("malformed row at line {}: {err}", pos.line()),
                None => format!("malformed data: {err}"),
            },
        };
        self.storage_error(message)
    }
}

/// New table content written to a temp file, waiting to be moved into place.
/// Dropping it without committing discards the temp file.
#[derive(Debug)]
pub struct StagedTable {
    entity: Entity,
    target: PathBuf,
    file: NamedTempFile,
    rows: usize,
}

impl StagedTable {
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Atomically rename the staged content over the table file.
    pub fn commit(self) -> Result<()> {
        let StagedTable {
            entity,
            target,
            file,
            rows,
        } = self;
        file.persist(&target).map_err(|e| CampusDbError::Io(e.error))?;
        log::debug!("Wrote {rows} {entity} record(s) to {}", target.display());
        Ok(())
    }
}
