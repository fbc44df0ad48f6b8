//! Record grammar for bulk import lines.

/// Separator between record fields.
pub const FIELD_SEPARATOR: char = '-';
/// Maximum number of fields a line is split into.
pub const MAX_FIELDS: usize = 5;

/// Trimmed field strings of one record.
///
/// Missing fields are empty. Nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPlantRecord {
    pub name: String,
    pub species: String,
    pub watering_frequency: String,
    pub notes: String,
    /// Everything after the fourth separator; currently unused.
    pub reserved: String,
}

/// Splits one line into record fields.
///
/// Returns `None` for blank lines. Never fails otherwise.
pub fn parse_record_line(line: &str) -> Option<RawPlantRecord> {
    let entry = line.trim();
    if entry.is_empty() {
        return None;
    }

    let mut fields = entry
        .splitn(MAX_FIELDS, FIELD_SEPARATOR)
        .map(|field| field.trim().to_string());
    let mut next = || fields.next().unwrap_or_default();

    Some(RawPlantRecord {
        name: next(),
        species: next(),
        watering_frequency: next(),
        notes: next(),
        reserved: next(),
    })
}
