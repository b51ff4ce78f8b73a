/// Column names of the canonical booking schema, in output order.
pub const CANONICAL_COLUMNS: [&str; 20] = [
    "DealerName",
    "DealerCode",
    "JobCardNumber",
    "BookingCreatedDate",
    "JobStartDateTime",
    "JobEndDateTime",
    "Regno",
    "Vin",
    "MakeModel",
    "BookingAdvisor",
    "JobSequence",
    "OperationCode",
    "OpCodeDesc",
    "TotalJobTime",
    "isMOT",
    "isWarranty",
    "Mobile",
    "Email",
    "NextServiceDate",
    "NextMotDate",
];

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Final path component, used for pattern matching.
    pub name: String,
    /// Full path as reported by the store.
    pub path: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl RemoteFile {
    /// Creates a reference to a regular file.
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: false,
        }
    }

    /// Creates a reference to a directory.
    pub fn dir(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: true,
        }
    }
}

/// In-memory table extracted from one worksheet.
///
/// Every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    /// Iterates the rows as name-addressable views.
    pub fn iter_rows(&self) -> impl Iterator<Item = SourceRow<'_>> {
        self.rows.iter().map(|values| SourceRow {
            columns: &self.columns,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Borrowed view of a single source row.
#[derive(Debug, Clone, Copy)]
pub struct SourceRow<'a> {
    columns: &'a [String],
    values: &'a [String],
}

impl<'a> SourceRow<'a> {
    pub fn new(columns: &'a [String], values: &'a [String]) -> Self {
        Self { columns, values }
    }

    /// Looks up a cell by column name. When the header repeats a name the
    /// right-most column wins.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.columns.iter().rposition(|name| name == column)?;
        Some(self.values.get(index).map(String::as_str).unwrap_or(""))
    }
}

/// A booking in the canonical schema.
///
/// Flags and counters keep their real types until [`CanonicalRow::to_record`]
/// renders them as text for the output file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalRow {
    pub dealer_name: String,
    pub dealer_code: String,
    pub job_card_number: String,
    pub booking_created_date: String,
    pub job_start_date_time: String,
    pub job_end_date_time: String,
    pub regno: String,
    pub vin: String,
    pub make_model: String,
    pub booking_advisor: String,
    pub job_sequence: String,
    pub operation_code: String,
    pub op_code_desc: String,
    pub total_job_time: u32,
    pub is_mot: bool,
    pub is_warranty: String,
    pub mobile: String,
    pub email: String,
    pub next_service_date: String,
    pub next_mot_date: String,
}

impl CanonicalRow {
    /// Renders the row as text cells aligned with [`CANONICAL_COLUMNS`].
    pub fn to_record(&self) -> [String; 20] {
        [
            self.dealer_name.clone(),
            self.dealer_code.clone(),
            self.job_card_number.clone(),
            self.booking_created_date.clone(),
            self.job_start_date_time.clone(),
            self.job_end_date_time.clone(),
            self.regno.clone(),
            self.vin.clone(),
            self.make_model.clone(),
            self.booking_advisor.clone(),
            self.job_sequence.clone(),
            self.operation_code.clone(),
            self.op_code_desc.clone(),
            self.total_job_time.to_string(),
            (if self.is_mot { "1" } else { "0" }).to_string(),
            self.is_warranty.clone(),
            self.mobile.clone(),
            self.email.clone(),
            self.next_service_date.clone(),
            self.next_mot_date.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_row_renders_twenty_cells() {
        let record = CanonicalRow::default().to_record();
        assert_eq!(record.len(), CANONICAL_COLUMNS.len());
        for (column, value) in CANONICAL_COLUMNS.iter().zip(record.iter()) {
            match *column {
                "TotalJobTime" | "isMOT" => assert_eq!(value, "0"),
                _ => assert!(value.is_empty(), "{column} should be empty"),
            }
        }
    }

    #[test]
    fn flags_render_as_digits() {
        let row = CanonicalRow {
            is_mot: true,
            total_job_time: 45,
            ..CanonicalRow::default()
        };
        let record = row.to_record();
        assert_eq!(record[13], "45");
        assert_eq!(record[14], "1");
    }

    #[test]
    fn lookup_prefers_last_duplicate_column() {
        let columns = vec!["Regno".to_string(), "Email".to_string(), "Regno".to_string()];
        let values = vec!["first".to_string(), "a@x.com".to_string(), "second".to_string()];
        let row = SourceRow::new(&columns, &values);
        assert_eq!(row.get("Regno"), Some("second"));
        assert_eq!(row.get("Email"), Some("a@x.com"));
        assert_eq!(row.get("Mobile"), None);
    }
}
