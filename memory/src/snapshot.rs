//! # Snapshot Codec
//!
//! Paired on-disk representation of a vector memory store: a binary vector
//! index (`index.vec`) and a JSON metadata file (`memories.json`), written
//! together and read together.
//!
//! ## Index layout
//!
//! ```text
//! magic   4 bytes  b"VIDX"
//! version u32 LE
//! rows    u32 LE
//! dim     u32 LE
//! data    rows * dim * f32 LE, row-major
//! ```
//!
//! A pair where only one artifact exists, whose index header is malformed,
//! or whose metadata count disagrees with the index row count is rejected
//! whole — a partial load would silently misalign ids and vectors.

use crate::error::MemoryError;
use crate::types::MemoryRecord;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Vector index artifact file name.
pub const INDEX_FILE: &str = "index.vec";
/// Metadata artifact file name.
pub const METADATA_FILE: &str = "memories.json";

const MAGIC: [u8; 4] = *b"VIDX";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// A fully validated snapshot, ready to seed a store.
#[derive(Debug)]
pub(crate) struct SnapshotData {
    pub records: Vec<MemoryRecord>,
    pub vectors: Vec<Vec<f32>>,
    pub dimension: usize,
}

/// Writes the snapshot pair, creating the directory if needed.
pub(crate) async fn write(
    dir: &Path,
    records: &[MemoryRecord],
    vectors: &[Vec<f32>],
    dimension: usize,
) -> Result<(), MemoryError> {
    fs::create_dir_all(dir).await?;

    let metadata = serde_json::to_vec_pretty(records)?;
    fs::write(dir.join(METADATA_FILE), metadata).await?;
    fs::write(dir.join(INDEX_FILE), encode_index(vectors, dimension)).await?;

    debug!(rows = vectors.len(), dimension, "snapshot pair written");
    Ok(())
}

/// Loads the snapshot pair from `dir`.
///
/// Returns `Ok(None)` when neither artifact exists (fresh store). An
/// incomplete pair or a count mismatch between the two artifacts is a
/// fatal configuration error, never a partial load.
pub(crate) async fn load(dir: &Path) -> Result<Option<SnapshotData>, MemoryError> {
    let index_path = dir.join(INDEX_FILE);
    let metadata_path = dir.join(METADATA_FILE);

    let have_index = fs::try_exists(&index_path).await?;
    let have_metadata = fs::try_exists(&metadata_path).await?;

    match (have_index, have_metadata) {
        (false, false) => Ok(None),
        (true, true) => {
            let index_bytes = fs::read(&index_path).await?;
            let (vectors, dimension) = decode_index(&index_bytes)?;

            let metadata_bytes = fs::read(&metadata_path).await?;
            let records: Vec<MemoryRecord> = serde_json::from_slice(&metadata_bytes)?;

            if records.len() != vectors.len() {
                return Err(MemoryError::SnapshotMismatch {
                    records: records.len(),
                    rows: vectors.len(),
                });
            }

            Ok(Some(SnapshotData {
                records,
                vectors,
                dimension,
            }))
        }
        _ => Err(MemoryError::MalformedSnapshot(format!(
            "incomplete snapshot pair in {}: {} and {} must exist together",
            dir.display(),
            INDEX_FILE,
            METADATA_FILE
        ))),
    }
}

fn encode_index(vectors: &[Vec<f32>], dimension: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + vectors.len() * dimension * 4);
    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend_from_slice(&(vectors.len() as u32).to_le_bytes());
    buf.extend_from_slice(&(dimension as u32).to_le_bytes());
    for vector in vectors {
        for value in vector {
            buf.extend_from_slice(&value.to_le_bytes());
        }
    }
    buf
}

fn decode_index(bytes: &[u8]) -> Result<(Vec<Vec<f32>>, usize), MemoryError> {
    if bytes.len() < HEADER_LEN {
        return Err(MemoryError::MalformedSnapshot(format!(
            "index header truncated: {} bytes",
            bytes.len()
        )));
    }
    if bytes[..4] != MAGIC {
        return Err(MemoryError::MalformedSnapshot(
            "index magic does not match".to_string(),
        ));
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != VERSION {
        return Err(MemoryError::MalformedSnapshot(format!(
            "unsupported index version {}",
            version
        )));
    }

    let rows = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let dimension = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;

    let body = &bytes[HEADER_LEN..];
    if body.len() != rows * dimension * 4 {
        return Err(MemoryError::MalformedSnapshot(format!(
            "index body is {} bytes, expected {} for {} rows of dimension {}",
            body.len(),
            rows * dimension * 4,
            rows,
            dimension
        )));
    }

    let values: Vec<f32> = body
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    let vectors = values
        .chunks(dimension.max(1))
        .map(|row| row.to_vec())
        .take(rows)
        .collect();

    Ok((vectors, dimension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_codec_round_trip() {
        let vectors = vec![vec![1.0, 2.0, 3.0], vec![-0.5, 0.25, 4.0]];
        let encoded = encode_index(&vectors, 3);
        let (decoded, dimension) = decode_index(&encoded).unwrap();
        assert_eq!(decoded, vectors);
        assert_eq!(dimension, 3);
    }

    #[test]
    fn test_index_codec_empty() {
        let encoded = encode_index(&[], 384);
        let (decoded, dimension) = decode_index(&encoded).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(dimension, 384);
    }

    #[test]
    fn test_decode_rejects_truncated_header() {
        let err = decode_index(&[0u8; 7]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_decode_rejects_wrong_magic() {
        let mut encoded = encode_index(&[vec![1.0]], 1);
        encoded[0] = b'X';
        assert!(decode_index(&encoded).is_err());
    }

    #[test]
    fn test_decode_rejects_short_body() {
        let mut encoded = encode_index(&[vec![1.0, 2.0]], 2);
        encoded.truncate(encoded.len() - 4);
        assert!(decode_index(&encoded).is_err());
    }

    #[tokio::test]
    async fn test_load_missing_pair_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_rejects_lone_metadata() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join(METADATA_FILE), b"[]")
            .await
            .unwrap();

        let err = load(dir.path()).await.unwrap_err();
        assert!(err.is_configuration());
    }
}
