use crate::{ByteOrder, Dtype, Result, StreamMetadata, TransportError};

/// Rows dropped from each end of a decoded buffer before row parsing. The
/// upstream producer frames the data with header and trailer rows; the count
/// has not been confirmed against the producer and is kept fixed here.
pub const BOUNDARY_ROWS: usize = 3;

/// Reinterpret `payload` per `md` and render each row as one text line, cells
/// joined by a single space.
pub fn decode_rows(md: &StreamMetadata, payload: &[u8]) -> Result<Vec<String>> {
    let dtype = md.dtype()?;
    let (rows, cols) = md.dims()?;
    let item = dtype.itemsize()?;
    if cols == 0 || item == 0 {
        return Err(TransportError::InvalidShape(format!(
            "{:?} of {}",
            md.shape, md.dtype
        )));
    }

    let row_bytes = cols
        .checked_mul(item)
        .ok_or_else(|| TransportError::InvalidShape(format!("{:?}", md.shape)))?;
    let expected = rows
        .checked_mul(row_bytes)
        .ok_or_else(|| TransportError::InvalidShape(format!("{:?}", md.shape)))?;
    if payload.len() != expected {
        return Err(TransportError::ShapeMismatch {
            expected,
            actual: payload.len(),
        });
    }

    let out = payload
        .chunks_exact(row_bytes)
        .map(|row| {
            row.chunks_exact(item)
                .map(|cell| render_cell(dtype, cell))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    Ok(out)
}

/// Rows left after dropping the boundary rows; empty when the buffer holds
/// nothing but boundary rows.
pub fn data_rows<T>(rows: &[T]) -> &[T] {
    if rows.len() <= 2 * BOUNDARY_ROWS {
        &[]
    } else {
        &rows[BOUNDARY_ROWS..rows.len() - BOUNDARY_ROWS]
    }
}

fn render_cell(dtype: Dtype, cell: &[u8]) -> String {
    match dtype {
        Dtype::Bytes(_) => {
            let end = cell.iter().position(|b| *b == 0).unwrap_or(cell.len());
            String::from_utf8_lossy(&cell[..end]).into_owned()
        }
        Dtype::Utf32 { order, .. } => cell
            .chunks_exact(4)
            .map(|cp| u32_from(order, cp))
            .take_while(|cp| *cp != 0)
            .map(|cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
        Dtype::F32(order) => {
            let b = bytes::<4>(cell);
            match order {
                ByteOrder::Little => f32::from_le_bytes(b),
                ByteOrder::Big => f32::from_be_bytes(b),
            }
            .to_string()
        }
        Dtype::F64(order) => {
            let b = bytes::<8>(cell);
            match order {
                ByteOrder::Little => f64::from_le_bytes(b),
                ByteOrder::Big => f64::from_be_bytes(b),
            }
            .to_string()
        }
        Dtype::I32(order) => {
            let b = bytes::<4>(cell);
            match order {
                ByteOrder::Little => i32::from_le_bytes(b),
                ByteOrder::Big => i32::from_be_bytes(b),
            }
            .to_string()
        }
        Dtype::I64(order) => {
            let b = bytes::<8>(cell);
            match order {
                ByteOrder::Little => i64::from_le_bytes(b),
                ByteOrder::Big => i64::from_be_bytes(b),
            }
            .to_string()
        }
        Dtype::U8 => cell.first().copied().unwrap_or_default().to_string(),
    }
}

fn u32_from(order: ByteOrder, cp: &[u8]) -> u32 {
    let b = bytes::<4>(cp);
    match order {
        ByteOrder::Little => u32::from_le_bytes(b),
        ByteOrder::Big => u32::from_be_bytes(b),
    }
}

// Cells come from chunks_exact(itemsize), so they are never shorter than N.
fn bytes<const N: usize>(cell: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let n = cell.len().min(N);
    out[..n].copy_from_slice(&cell[..n]);
    out
}
