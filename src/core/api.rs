use std::fmt;
use std::str::FromStr;

use super::error::GoogleError;

/// The Google APIs this crate talks to, with their endpoints and OAuth scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoogleApi {
    Drive,
    Sheets,
    Slides,
    Docs,
    Tasks,
    Storage,
}

impl GoogleApi {
    pub const ALL: [GoogleApi; 6] = [
        GoogleApi::Drive,
        GoogleApi::Sheets,
        GoogleApi::Slides,
        GoogleApi::Docs,
        GoogleApi::Tasks,
        GoogleApi::Storage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GoogleApi::Drive => "drive",
            GoogleApi::Sheets => "sheets",
            GoogleApi::Slides => "slides",
            GoogleApi::Docs => "docs",
            GoogleApi::Tasks => "tasks",
            GoogleApi::Storage => "storage",
        }
    }

    pub fn version(&self) -> &'static str {
        match self {
            GoogleApi::Drive => "v3",
            GoogleApi::Sheets => "v4",
            GoogleApi::Slides | GoogleApi::Docs | GoogleApi::Tasks | GoogleApi::Storage => "v1",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            GoogleApi::Drive => "https://www.googleapis.com/drive/v3",
            GoogleApi::Sheets => "https://sheets.googleapis.com/v4",
            GoogleApi::Slides => "https://slides.googleapis.com/v1",
            GoogleApi::Docs => "https://docs.googleapis.com/v1",
            GoogleApi::Tasks => "https://tasks.googleapis.com/tasks/v1",
            GoogleApi::Storage => "https://storage.googleapis.com/storage/v1",
        }
    }

    /// Media upload endpoint, for the APIs that have one.
    pub fn upload_url(&self) -> Option<&'static str> {
        match self {
            GoogleApi::Drive => Some("https://www.googleapis.com/upload/drive/v3"),
            GoogleApi::Storage => Some("https://storage.googleapis.com/upload/storage/v1"),
            _ => None,
        }
    }

    pub fn scope(&self) -> &'static str {
        match self {
            GoogleApi::Drive => "https://www.googleapis.com/auth/drive",
            GoogleApi::Sheets => "https://www.googleapis.com/auth/spreadsheets",
            GoogleApi::Slides => "https://www.googleapis.com/auth/presentations",
            GoogleApi::Docs => "https://www.googleapis.com/auth/documents",
            GoogleApi::Tasks => "https://www.googleapis.com/auth/tasks",
            GoogleApi::Storage => "https://www.googleapis.com/auth/devstorage.read_write",
        }
    }
}

impl fmt::Display for GoogleApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.version())
    }
}

impl FromStr for GoogleApi {
    type Err = GoogleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drive" => Ok(GoogleApi::Drive),
            "sheets" | "spreadsheets" => Ok(GoogleApi::Sheets),
            "slides" | "presentations" => Ok(GoogleApi::Slides),
            "docs" | "documents" => Ok(GoogleApi::Docs),
            "tasks" => Ok(GoogleApi::Tasks),
            "storage" => Ok(GoogleApi::Storage),
            other => Err(GoogleError::InvalidArgument(format!(
                "Unknown Google API '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_matches_published_endpoints() {
        assert_eq!(
            GoogleApi::Slides.scope(),
            "https://www.googleapis.com/auth/presentations"
        );
        assert_eq!(GoogleApi::Sheets.version(), "v4");
        assert_eq!(GoogleApi::Drive.version(), "v3");
        assert!(GoogleApi::Drive.base_url().ends_with("/drive/v3"));
        assert!(GoogleApi::Slides.upload_url().is_none());
    }

    #[test]
    fn parses_api_aliases() {
        assert_eq!("spreadsheets".parse::<GoogleApi>().unwrap(), GoogleApi::Sheets);
        assert_eq!("Sheets".parse::<GoogleApi>().unwrap(), GoogleApi::Sheets);
        assert!("gmail".parse::<GoogleApi>().is_err());
    }

    #[test]
    fn every_api_round_trips_through_its_name() {
        for api in GoogleApi::ALL {
            assert_eq!(api.name().parse::<GoogleApi>().unwrap(), api);
        }
    }
}
