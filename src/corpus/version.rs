//! Dataset release date taken from the data directory name, e.g. `cord19-2021-05-03`.

use std::fmt;
use std::path::Path;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Release date of the indexed snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetVersion {
    /// Release date.
    pub date: Date,
}

impl DatasetVersion {
    /// Parse the last three dash-delimited components of `name` as a date.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        let mut parts = name.trim_end_matches('/').rsplitn(4, '-');
        let day = parts.next()?;
        let month = parts.next()?;
        let year = parts.next()?;
        let token = format!("{year}-{month}-{day}");
        Date::parse(&token, DATE_FORMAT)
            .ok()
            .map(|date| Self { date })
    }

    /// Derive the version from the final component of the data directory path.
    pub fn from_data_dir(data_dir: &Path) -> Option<Self> {
        let name = match data_dir.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => data_dir
                .canonicalize()
                .ok()?
                .file_name()?
                .to_string_lossy()
                .into_owned(),
        };
        Self::from_dir_name(&name)
    }

    /// Record persisted in the version store.
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({ "version": self.to_string() })
    }
}

impl fmt::Display for DatasetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date.format(DATE_FORMAT) {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn date_suffix_becomes_the_version() {
        let version = DatasetVersion::from_dir_name("corpus-2021-05-03").expect("version");
        assert_eq!(version.to_string(), "2021-05-03");
        assert_eq!(version.to_record()["version"], "2021-05-03");
    }

    #[test]
    fn bare_date_is_accepted() {
        assert!(DatasetVersion::from_dir_name("2020-12-31").is_some());
    }

    #[test]
    fn names_without_a_date_yield_nothing() {
        assert!(DatasetVersion::from_dir_name("corpus-latest").is_none());
        assert!(DatasetVersion::from_dir_name("cord19").is_none());
        assert!(DatasetVersion::from_dir_name("cord19-2021-13-40").is_none());
    }

    #[test]
    fn data_dir_uses_final_path_component() {
        let path = PathBuf::from("data/cord19-2021-05-03/");
        let version = DatasetVersion::from_data_dir(&path).expect("version");
        assert_eq!(version.to_string(), "2021-05-03");
        assert!(DatasetVersion::from_data_dir(Path::new("data/corpus-latest")).is_none());
    }
}
