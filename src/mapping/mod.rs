use crate::error::{Result, ToolError};
use crate::model::{CanonicalRow, SourceRow, SourceTable};

/// Source column copied into both dealer fields.
pub const SALES_LOCATION: &str = "SalesLocationName";
/// Source column holding the booking creation date.
pub const BOOKING_CREATE_DATE: &str = "BookingCreateDate";
/// Source column holding the booked slot, used for job start and end.
pub const BOOKING_DATE: &str = "BookingDate";
/// Source column holding the registration number.
pub const REGNO: &str = "Regno";
/// Source column holding the vehicle make.
pub const VEHICLE_MAKE: &str = "VehicleMake";
/// Source column classifying the booking (service, MOT, ...).
pub const BOOKING_TYPE: &str = "BookingType";
/// Source column holding the customer email.
pub const EMAIL: &str = "Email";

const SERVICE_MARKER: &str = "SERVICE";
const MOT_MARKER: &str = "MOT";

/// Converts a booking-export row into the canonical schema.
///
/// Fields without a source counterpart stay empty, `TotalJobTime` is always
/// zero. Any referenced column missing from the source is an error.
pub fn map_row(row: &SourceRow<'_>) -> Result<CanonicalRow> {
    let dealer = required(row, SALES_LOCATION)?;
    let booking_date = required(row, BOOKING_DATE)?;
    let booking_type = required(row, BOOKING_TYPE)?.to_ascii_uppercase();

    Ok(CanonicalRow {
        dealer_name: dealer.to_string(),
        dealer_code: dealer.to_string(),
        booking_created_date: required(row, BOOKING_CREATE_DATE)?.to_string(),
        job_start_date_time: booking_date.to_string(),
        job_end_date_time: booking_date.to_string(),
        regno: required(row, REGNO)?.to_string(),
        make_model: required(row, VEHICLE_MAKE)?.to_string(),
        op_code_desc: if booking_type.contains(SERVICE_MARKER) {
            SERVICE_MARKER.to_string()
        } else {
            String::new()
        },
        total_job_time: 0,
        is_mot: booking_type.contains(MOT_MARKER),
        email: required(row, EMAIL)?.to_string(),
        ..CanonicalRow::default()
    })
}

/// Maps every row of a table in order, stopping at the first failure.
pub fn map_table(table: &SourceTable) -> Result<Vec<CanonicalRow>> {
    table.iter_rows().map(|row| map_row(&row)).collect()
}

fn required<'a>(row: &SourceRow<'a>, column: &str) -> Result<&'a str> {
    row.get(column).ok_or_else(|| ToolError::MissingColumn {
        column: column.to_string(),
    })
}
