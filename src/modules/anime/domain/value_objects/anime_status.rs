use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[ExistingTypePath = "crate::schema::sql_types::AnimeStatus"]
pub enum AnimeStatus {
    Ongoing,
    Completed,
    Upcoming,
    Hiatus,
}

impl AnimeStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            AnimeStatus::Ongoing => "Ongoing",
            AnimeStatus::Completed => "Completed",
            AnimeStatus::Upcoming => "Upcoming",
            AnimeStatus::Hiatus => "Hiatus",
        }
    }

    /// Lenient parse for filter input. Unrecognized values yield `None`,
    /// which list queries treat as "no status filter".
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl fmt::Display for AnimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for AnimeStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ongoing" => Ok(AnimeStatus::Ongoing),
            "completed" => Ok(AnimeStatus::Completed),
            "upcoming" => Ok(AnimeStatus::Upcoming),
            "hiatus" => Ok(AnimeStatus::Hiatus),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(AnimeStatus::parse("ONGOING"), Some(AnimeStatus::Ongoing));
        assert_eq!(AnimeStatus::parse("Hiatus"), Some(AnimeStatus::Hiatus));
    }

    #[test]
    fn unknown_status_parses_to_none() {
        assert_eq!(AnimeStatus::parse("airing"), None);
        assert_eq!(AnimeStatus::parse(""), None);
    }
}
