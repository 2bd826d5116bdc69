//! Collision CSV Schema
//! Source column names, canonical column names, and the rename table between them.

/// Canonical column holding the combined crash date and time.
pub const DATE_TIME: &str = "date/time";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const INJURED_PERSONS: &str = "injured_persons";
pub const INJURED_PEDESTRIANS: &str = "injured_pedestrians";
pub const INJURED_CYCLISTS: &str = "injured_cyclists";
pub const INJURED_MOTORISTS: &str = "injured_motorists";
pub const ON_STREET_NAME: &str = "on street name";

/// Source date and time fields, matched case-insensitively.
pub const SOURCE_CRASH_DATE: &str = "crash date";
pub const SOURCE_CRASH_TIME: &str = "crash time";

/// Injury count columns in canonical form.
pub const INJURY_COLUMNS: [&str; 4] = [
    INJURED_PERSONS,
    INJURED_PEDESTRIANS,
    INJURED_CYCLISTS,
    INJURED_MOTORISTS,
];

/// Columns that must be present in the source file (upper case as published).
pub const REQUIRED_SOURCE_COLUMNS: [&str; 9] = [
    "CRASH DATE",
    "CRASH TIME",
    "LATITUDE",
    "LONGITUDE",
    "NUMBER OF PERSONS INJURED",
    "NUMBER OF PEDESTRIANS INJURED",
    "NUMBER OF CYCLIST INJURED",
    "NUMBER OF MOTORIST INJURED",
    "ON STREET NAME",
];

/// Explicit renames applied after lower-casing. Everything else keeps its lower-cased name.
const RENAMES: [(&str, &str); 4] = [
    ("number of persons injured", INJURED_PERSONS),
    ("number of pedestrians injured", INJURED_PEDESTRIANS),
    ("number of cyclist injured", INJURED_CYCLISTS),
    ("number of motorist injured", INJURED_MOTORISTS),
];

/// Normalize a raw header for matching: trimmed and lower-cased.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Map a source header to its canonical column name.
pub fn canonical_name(raw: &str) -> String {
    let lower = normalize_header(raw);
    RENAMES
        .iter()
        .find(|(source, _)| *source == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(lower)
}

/// Return the required source columns absent from `headers`.
pub fn missing_required<'a, I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let present: Vec<String> = headers.into_iter().map(normalize_header).collect();
    REQUIRED_SOURCE_COLUMNS
        .iter()
        .filter(|required| !present.contains(&normalize_header(required)))
        .map(|required| required.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injury_columns_are_renamed() {
        assert_eq!(canonical_name("NUMBER OF CYCLIST INJURED"), INJURED_CYCLISTS);
        assert_eq!(canonical_name("Number Of Persons Injured"), INJURED_PERSONS);
        assert_eq!(canonical_name(" NUMBER OF MOTORIST INJURED "), INJURED_MOTORISTS);
    }

    #[test]
    fn test_other_columns_are_lower_cased() {
        assert_eq!(canonical_name("ON STREET NAME"), ON_STREET_NAME);
        assert_eq!(canonical_name("LATITUDE"), LATITUDE);
        assert_eq!(canonical_name("ZIP CODE"), "zip code");
    }

    #[test]
    fn test_missing_required_lists_every_gap() {
        let headers = ["crash date", "CRASH TIME", "Latitude", "ON STREET NAME"];
        let missing = missing_required(headers);
        assert_eq!(
            missing,
            vec![
                "LONGITUDE",
                "NUMBER OF PERSONS INJURED",
                "NUMBER OF PEDESTRIANS INJURED",
                "NUMBER OF CYCLIST INJURED",
                "NUMBER OF MOTORIST INJURED",
            ]
        );
    }

    #[test]
    fn test_missing_required_empty_when_complete() {
        assert!(missing_required(REQUIRED_SOURCE_COLUMNS).is_empty());
    }
}
