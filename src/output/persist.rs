//! Result persistence
//!
//! Files are written to a hidden temporary sibling first and renamed into
//! place, so a failed write never leaves a truncated result file behind.

use crate::config::OutputFormat;
use crate::extract::Record;
use crate::output::{PersistError, PersistResult, RunStamp};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes the aggregate results of a run to `<directory>/<target>-<timestamp>.<ext>`
///
/// # Returns
///
/// * `Ok(Some(path))` - The file that was written
/// * `Ok(None)` - There were no records, nothing was written
/// * `Err(PersistError)` - The directory or file could not be written
pub fn persist_results(
    records: &[Record],
    directory: &Path,
    target: &str,
    format: OutputFormat,
    stamp: &RunStamp,
) -> PersistResult<Option<PathBuf>> {
    if records.is_empty() {
        return Ok(None);
    }

    let path = directory.join(format!(
        "{}-{}.{}",
        target,
        stamp.timestamp(),
        format.extension()
    ));

    let bytes = match format {
        OutputFormat::Json => encode_json(records)?,
        OutputFormat::Csv => encode_csv(records)?,
    };

    write_atomically(&path, &bytes)?;
    Ok(Some(path))
}

/// Writes one genre's records to `<run_dir>/<genre_dir>/<genre_dir>-<timestamp>.json`
///
/// Returns `Ok(None)` without touching the filesystem when `records` is empty.
pub fn persist_genre_results(
    records: &[Record],
    run_dir: &Path,
    genre_dir: &str,
    stamp: &RunStamp,
) -> PersistResult<Option<PathBuf>> {
    if records.is_empty() {
        return Ok(None);
    }

    let path = run_dir
        .join(genre_dir)
        .join(format!("{}-{}.json", genre_dir, stamp.timestamp()));

    write_atomically(&path, &encode_json(records)?)?;
    Ok(Some(path))
}

fn encode_json(records: &[Record]) -> PersistResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

/// CSV with the first record's keys as header row
///
/// Records lacking one of those keys get an empty cell; keys the first record
/// does not have are not written.
fn encode_csv(records: &[Record]) -> PersistResult<Vec<u8>> {
    let header: Vec<&'static str> = records
        .first()
        .map(|first| first.fields().into_iter().map(|(key, _)| key).collect())
        .unwrap_or_default();

    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(&header)?;

        for record in records {
            let fields = record.fields();
            let row: Vec<&str> = header
                .iter()
                .map(|key| {
                    fields
                        .iter()
                        .find(|(name, _)| name == key)
                        .map(|(_, value)| value.as_str())
                        .unwrap_or("")
                })
                .collect();
            writer.write_record(&row)?;
        }

        writer.flush().map_err(csv::Error::from)?;
    }

    Ok(buffer)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> PersistResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| PersistError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{}.tmp", file_name));

    let result = fs::File::create(&temp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp, path));

    if let Err(source) = result {
        let _ = fs::remove_file(&temp);
        return Err(PersistError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}
