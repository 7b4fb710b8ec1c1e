use crate::errors::{CollectorError, Result};
use crate::types::{InferenceRecord, TopicId};
use std::fs;
use std::path::{Path, PathBuf};

/// Presentation header row; field names are uppercased for the exported
/// dataset
const HEADER: &str = "BLOCK_HEIGHT,BLOCK_TIMESTAMP,ALLORA_PREDICTED_VALUE";

/// Default dataset location for a topic
#[must_use]
pub fn default_output_path(topic_id: TopicId) -> PathBuf {
    PathBuf::from(format!("data/allora_chain_data_topic_{topic_id}.csv"))
}

/// Writes the collected dataset as CSV, one row per record in collection
/// order.
///
/// Creates the parent directory if needed. Spreadsheet styling is not this
/// crate's concern; the output is plain comma-separated text.
pub fn write_csv(records: &[InferenceRecord], path: &Path) -> Result<()> {
    let mut contents = String::from(HEADER);
    contents.push('\n');

    for record in records {
        contents.push_str(&format!(
            "{},{},{}\n",
            record.block_height,
            record.block_timestamp.to_rfc3339(),
            record.combined_value
        ));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                CollectorError::internal(format!(
                    "failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }

    fs::write(path, contents).map_err(|e| {
        CollectorError::internal(format!("failed to write {}: {e}", path.display()))
    })
}
