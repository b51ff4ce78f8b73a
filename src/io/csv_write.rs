use csv::{Terminator, WriterBuilder};

use crate::error::Result;
use crate::model::{CANONICAL_COLUMNS, CanonicalRow};

/// Serialises the aggregated bookings as CSV: a header row with the canonical
/// column names followed by one record per booking.
pub fn write_bookings(rows: &[CanonicalRow]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CANONICAL_COLUMNS)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| error.into_error())?;
    Ok(bytes)
}
