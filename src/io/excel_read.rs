use std::io::Cursor;

use calamine::{DataType, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, instrument};

use crate::error::{Result, ToolError};
use crate::model::SourceTable;

/// Opens an XLSX payload held in memory and extracts its first worksheet.
#[instrument(level = "debug", skip(bytes), fields(size = bytes.len()))]
pub fn read_first_sheet(bytes: &[u8], has_header: bool) -> Result<SourceTable> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::InvalidWorkbook("workbook has no worksheets".into()))?
        .map_err(ToolError::from)?;
    let table = extract(&range, has_header);
    debug!(
        columns = table.columns.len(),
        rows = table.rows.len(),
        "worksheet extracted"
    );
    Ok(table)
}

/// Converts a worksheet range into a [`SourceTable`].
///
/// Coordinates are anchored at A1 regardless of where the populated area
/// starts, so row 1 is always the header row.
pub fn extract(range: &Range<DataType>, has_header: bool) -> SourceTable {
    let Some((last_row, last_col)) = range.end() else {
        return SourceTable::default();
    };

    let columns = (0..=last_col)
        .map(|col| {
            if has_header {
                cell_text(range.get_value((0, col)))
            } else {
                format!("Column {}", col + 1)
            }
        })
        .collect();

    let first_row = if has_header { 1 } else { 0 };
    let rows = (first_row..=last_row)
        .map(|row| {
            (0..=last_col)
                .map(|col| cell_text(range.get_value((row, col))))
                .collect()
        })
        .collect();

    SourceTable { columns, rows }
}

/// Renders a cell the way a spreadsheet displays it under the general format.
fn cell_text(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => (if *value { "TRUE" } else { "FALSE" }).to_string(),
        Some(DataType::DateTime(serial)) => serial_text(*serial),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Renders a 1900-system serial as a date, a timestamp, or a bare time of
/// day when the serial carries no day part.
fn serial_text(serial: f64) -> String {
    if !serial.is_finite() || serial < 0.0 {
        return serial.to_string();
    }
    let millis = (serial * 86_400_000.0).round() as i64;
    let day_millis = millis % 86_400_000;
    let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(
        (day_millis / 1000) as u32,
        ((day_millis % 1000) * 1_000_000) as u32,
    ) else {
        return serial.to_string();
    };
    if serial < 1.0 {
        return time.format("%H:%M:%S").to_string();
    }
    // Serial 60 is the 1900-02-29 the 1900 date system pretends exists.
    if millis / 86_400_000 == 60 {
        return with_time("1900-02-29".to_string(), time);
    }
    match serial_to_datetime(millis) {
        Some(value) => with_time(value.format("%Y-%m-%d").to_string(), value.time()),
        None => serial.to_string(),
    }
}

fn serial_to_datetime(millis: i64) -> Option<NaiveDateTime> {
    // Serials before 1900-03-01 are offset by the phantom leap day.
    let epoch = if millis < 60 * 86_400_000 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::milliseconds(millis))
}

fn with_time(date: String, time: NaiveTime) -> String {
    if time.num_seconds_from_midnight() == 0 {
        date
    } else {
        format!("{date} {}", time.format("%H:%M:%S"))
    }
}
