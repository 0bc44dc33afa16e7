use regex::Regex;
use std::sync::OnceLock;

use crate::shared::errors::FieldErrors;

fn name_charset() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w\s\-'!:&\.]+$").unwrap())
}

pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_NAME_LEN: usize = 100;
pub const MIN_RELEASE_YEAR: i32 = 1900;
pub const MAX_RELEASE_YEAR: i32 = 2100;

/// Per-field checks. Each returns the message to record against the field,
/// or `None` when the value passes; callers accumulate into a `FieldErrors`.
pub struct Validator;

impl Validator {
    pub fn check_title(title: &str) -> Option<&'static str> {
        if title.trim().is_empty() {
            return Some("Title is required");
        }
        if title.len() > MAX_TITLE_LEN {
            return Some("Title too long (max 255 characters)");
        }
        None
    }

    pub fn check_entity_name(name: &str) -> Option<&'static str> {
        if name.trim().is_empty() {
            return Some("Name is required");
        }
        if name.len() > MAX_NAME_LEN {
            return Some("Name too long (max 100 characters)");
        }
        if !name_charset().is_match(name) {
            return Some("Name contains invalid characters");
        }
        None
    }

    pub fn check_rating(rating: f32) -> Option<&'static str> {
        if !(0.0..=10.0).contains(&rating) {
            return Some("Rating must be between 0 and 10");
        }
        None
    }

    pub fn check_release_year(year: i32) -> Option<&'static str> {
        if !(MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR).contains(&year) {
            return Some("Release year is out of range");
        }
        None
    }

    pub fn check_total_episodes(episodes: i32) -> Option<&'static str> {
        if episodes <= 0 {
            return Some("Episode count must be positive");
        }
        None
    }

    /// Record a failed check against a field.
    pub fn note(errors: &mut FieldErrors, field: &str, result: Option<&str>) {
        if let Some(message) = result {
            errors.add(field, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_bounds() {
        assert!(Validator::check_title("Naruto").is_none());
        assert!(Validator::check_title("   ").is_some());
        assert!(Validator::check_title(&"x".repeat(256)).is_some());
    }

    #[test]
    fn entity_name_charset() {
        assert!(Validator::check_entity_name("Slice of Life").is_none());
        assert!(Validator::check_entity_name("Sci-Fi & Fantasy").is_none());
        assert!(Validator::check_entity_name("bad<script>").is_some());
        assert!(Validator::check_entity_name("").is_some());
    }

    #[test]
    fn rating_is_inclusive_at_both_ends() {
        assert!(Validator::check_rating(0.0).is_none());
        assert!(Validator::check_rating(10.0).is_none());
        assert!(Validator::check_rating(10.1).is_some());
        assert!(Validator::check_rating(-0.1).is_some());
    }

    #[test]
    fn note_accumulates_only_failures() {
        let mut errors = FieldErrors::new();
        Validator::note(&mut errors, "title", Validator::check_title("ok"));
        Validator::note(&mut errors, "rating", Validator::check_rating(11.0));
        assert_eq!(errors.len(), 1);
        assert!(errors.get("rating").is_some());
    }
}
