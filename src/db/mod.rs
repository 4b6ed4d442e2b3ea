pub mod tables;

use redb::{Database, Error as RedbError};
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;

/// Database handle type (Arc-wrapped for sharing across handlers)
pub type Db = Arc<Database>;

/// Bincode configuration used for every stored document
pub const BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

/// Serialize a document for storage
pub fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serde::encode_to_vec(value, BINCODE_CONFIG)?)
}

/// Deserialize a stored document
pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (value, _) = bincode::serde::decode_from_slice(bytes, BINCODE_CONFIG)?;
    Ok(value)
}

/// Open or create the redb database at the given path
///
/// Creates all required tables on first run.
#[allow(clippy::result_large_err)]
pub fn open_database(path: impl AsRef<Path>) -> std::result::Result<Db, RedbError> {
    tracing::info!("Opening database at: {:?}", path.as_ref());

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.as_ref().parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                tracing::error!("Failed to create database directory: {}", e);
                RedbError::Io(e)
            })?;
        }
    }

    let db = Database::create(path)?;

    // Initialize tables on first run
    let write_txn = db.begin_write()?;
    {
        // Create tables if they don't exist by opening them
        let _ = write_txn.open_table(tables::USERS)?;
        let _ = write_txn.open_table(tables::EMAIL_INDEX)?;
        let _ = write_txn.open_table(tables::ROLES)?;
        let _ = write_txn.open_table(tables::LEVELS)?;
        let _ = write_txn.open_table(tables::CATEGORIES)?;
        let _ = write_txn.open_table(tables::VIDEOS)?;
        let _ = write_txn.open_table(tables::VIDEO_SOURCES)?;
        let _ = write_txn.open_table(tables::COURSES)?;
        let _ = write_txn.open_table(tables::COURSE_SOURCES)?;
        let _ = write_txn.open_table(tables::TESTS)?;
        let _ = write_txn.open_table(tables::TEST_CONTENT)?;
        let _ = write_txn.open_table(tables::SUBSCRIPTIONS)?;
        let _ = write_txn.open_table(tables::MESSAGES)?;
        let _ = write_txn.open_table(tables::TEST_RESULTS)?;
        let _ = write_txn.open_table(tables::RESULT_INDEX)?;
    }
    write_txn.commit()?;

    tracing::info!("Database initialized successfully");

    Ok(Arc::new(db))
}
