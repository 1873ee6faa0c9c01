use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::grid::GridDocument;

const MAGIC: &[u8; 4] = b"TWLD";
pub(crate) const LEVEL_FORMAT_VERSION: u16 = 1;
const CELL_BYTES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid level document: {0}")]
    InvalidFormat(String),
}

/// Layout: magic, format version, rows, cols, sha256 of the payload, then
/// the payload of `rows * cols` little-endian `i32` cells in row-major order.
pub(crate) fn encode_document(doc: &GridDocument) -> Result<Vec<u8>, CodecError> {
    let rows = u32::try_from(doc.rows()).map_err(|_| invalid_format("too many rows"))?;
    let cols = u32::try_from(doc.cols()).map_err(|_| invalid_format("too many columns"))?;

    let mut payload = Vec::<u8>::with_capacity(doc.cells().len() * CELL_BYTES);
    for cell in doc.cells() {
        payload.extend_from_slice(&cell.to_le_bytes());
    }
    let payload_hash = sha256_bytes(&payload);

    let mut bytes = Vec::<u8>::with_capacity(payload.len() + 46);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&LEVEL_FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&rows.to_le_bytes());
    bytes.extend_from_slice(&cols.to_le_bytes());
    bytes.extend_from_slice(&payload_hash);
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

pub(crate) fn decode_document(bytes: &[u8]) -> Result<GridDocument, CodecError> {
    let mut cursor = 0usize;

    let magic = read_exact(bytes, &mut cursor, MAGIC.len())?;
    if magic != MAGIC {
        return Err(invalid_format("invalid magic"));
    }

    let version = read_u16(bytes, &mut cursor)?;
    if version != LEVEL_FORMAT_VERSION {
        return Err(CodecError::InvalidFormat(format!(
            "unsupported format version {version}, expected {LEVEL_FORMAT_VERSION}"
        )));
    }

    let rows = read_u32(bytes, &mut cursor)? as usize;
    let cols = read_u32(bytes, &mut cursor)? as usize;
    let expected_hash = read_exact(bytes, &mut cursor, 32)?;
    let payload_len = rows
        .checked_mul(cols)
        .and_then(|count| count.checked_mul(CELL_BYTES))
        .ok_or_else(|| invalid_format("grid dimensions overflow"))?;
    let payload = read_exact(bytes, &mut cursor, payload_len)?;
    if cursor != bytes.len() {
        return Err(invalid_format("unexpected trailing bytes"));
    }

    if expected_hash != sha256_bytes(payload) {
        return Err(invalid_format("payload hash mismatch"));
    }

    let cells = payload
        .chunks_exact(CELL_BYTES)
        .map(|chunk| {
            <[u8; CELL_BYTES]>::try_from(chunk)
                .map(i32::from_le_bytes)
                .map_err(|_| invalid_format("invalid cell encoding"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    GridDocument::from_cells(rows, cols, cells)
        .ok_or_else(|| invalid_format("cell count does not match dimensions"))
}

fn read_u16(bytes: &[u8], cursor: &mut usize) -> Result<u16, CodecError> {
    Ok(u16::from_le_bytes(
        read_exact(bytes, cursor, 2)?
            .try_into()
            .map_err(|_| invalid_format("invalid u16 encoding"))?,
    ))
}

fn read_u32(bytes: &[u8], cursor: &mut usize) -> Result<u32, CodecError> {
    Ok(u32::from_le_bytes(
        read_exact(bytes, cursor, 4)?
            .try_into()
            .map_err(|_| invalid_format("invalid u32 encoding"))?,
    ))
}

fn read_exact<'a>(bytes: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8], CodecError> {
    let end = cursor.saturating_add(len);
    if end > bytes.len() {
        return Err(invalid_format("unexpected end of file"));
    }
    let out = &bytes[*cursor..end];
    *cursor = end;
    Ok(out)
}

fn sha256_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

fn invalid_format(message: &str) -> CodecError {
    CodecError::InvalidFormat(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> GridDocument {
        GridDocument::from_rows(vec![vec![-1, 0, 8], vec![1, 2, 3], vec![6, 7, 0]]).expect("doc")
    }

    #[test]
    fn decode_restores_cells_and_dimensions() {
        let doc = sample_document();
        let bytes = encode_document(&doc).expect("encode");

        let decoded = decode_document(&bytes).expect("decode");

        assert_eq!(decoded, doc);
    }

    #[test]
    fn empty_document_survives_encoding() {
        let doc = GridDocument::filled(0, 0, 0);
        let decoded = decode_document(&encode_document(&doc).expect("encode")).expect("decode");
        assert_eq!(decoded.rows(), 0);
        assert_eq!(decoded.cols(), 0);
    }

    #[test]
    fn flipped_payload_byte_fails_hash_check() {
        let mut bytes = encode_document(&sample_document()).expect("encode");
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;

        let err = decode_document(&bytes).expect_err("corrupt");
        assert_eq!(err, invalid_format("payload hash mismatch"));
    }

    #[test]
    fn truncated_and_padded_files_are_rejected() {
        let bytes = encode_document(&sample_document()).expect("encode");

        let truncated = decode_document(&bytes[..bytes.len() - 2]).expect_err("truncated");
        assert_eq!(truncated, invalid_format("unexpected end of file"));

        let mut padded = bytes.clone();
        padded.push(0);
        let padded = decode_document(&padded).expect_err("padded");
        assert_eq!(padded, invalid_format("unexpected trailing bytes"));
    }

    #[test]
    fn foreign_magic_and_future_version_are_rejected() {
        let mut bytes = encode_document(&sample_document()).expect("encode");
        bytes[0] = b'X';
        assert_eq!(
            decode_document(&bytes).expect_err("magic"),
            invalid_format("invalid magic")
        );

        let mut bytes = encode_document(&sample_document()).expect("encode");
        bytes[4..6].copy_from_slice(&2u16.to_le_bytes());
        assert!(matches!(
            decode_document(&bytes),
            Err(CodecError::InvalidFormat(message)) if message.contains("version 2")
        ));
    }
}
