use crate::config::WriteMode;
use crate::error::CatalogError;
use crate::results::{COLUMNS, Product};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// CSV dataset of product records
///
/// Every write lands in a temporary file next to the dataset and is then
/// renamed over it, so readers never observe a partially written file.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `records` to the dataset according to `mode`
    pub fn persist(&self, records: &[Product], mode: WriteMode) -> Result<usize, CatalogError> {
        match mode {
            WriteMode::Overwrite => {
                self.write_all(records)?;
                ::log::info!(
                    "Wrote {} records to {}",
                    records.len(),
                    self.path.display()
                );
                Ok(records.len())
            }
            WriteMode::Append => {
                let mut combined = self.read_existing()?;
                combined.extend_from_slice(records);
                self.write_all(&combined)?;
                ::log::info!(
                    "Appended {} records to {} ({} in total)",
                    records.len(),
                    self.path.display(),
                    combined.len()
                );
                Ok(combined.len())
            }
        }
    }

    /// Read the persisted dataset
    pub fn read(&self) -> Result<Vec<Product>, CatalogError> {
        let file = File::open(&self.path).map_err(|e| self.read_error(e))?;
        let mut reader = csv::Reader::from_reader(file);

        let headers = reader.headers().map_err(|e| self.read_error(e))?;
        if headers.iter().ne(COLUMNS.iter().copied()) {
            return Err(self.read_error(format!(
                "columns are [{}], expected [{}]",
                headers.iter().collect::<Vec<_>>().join(", "),
                COLUMNS.join(", ")
            )));
        }

        reader
            .deserialize::<Product>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.read_error(e))
    }

    /// Existing records, or none when the dataset does not exist yet
    fn read_existing(&self) -> Result<Vec<Product>, CatalogError> {
        match self.path.try_exists() {
            Ok(true) => self.read(),
            Ok(false) => {
                ::log::debug!("No existing dataset at {}", self.path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(self.read_error(e)),
        }
    }

    fn write_all(&self, records: &[Product]) -> Result<(), CatalogError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let tmp = Self::temp_file(dir)?;

        // Header written by hand so an empty dataset still carries it
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file());
        writer.write_record(COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        drop(writer);

        // The replacement keeps the permissions of the dataset it replaces
        if let Ok(existing) = std::fs::metadata(&self.path) {
            tmp.as_file().set_permissions(existing.permissions())?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| CatalogError::Io(e.error))?;
        Ok(())
    }

    /// Temporary file created with the mode of a regular new file
    fn temp_file(dir: &Path) -> Result<NamedTempFile, CatalogError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(".catalog-").suffix(".csv.tmp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Subject to the process umask, as with File::create
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        Ok(builder.tempfile_in(dir)?)
    }

    fn read_error(&self, reason: impl ToString) -> CatalogError {
        CatalogError::SinkRead {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}
