//! Slug derivation and collision resolution.
//!
//! One canonical normalizer for every call site, and one resolver with a
//! collision policy flag. The resolver's existence check is a fast pre-flight
//! only; the database unique constraint remains the actual guarantee, and
//! creating services retry on a conflicting insert.

use async_trait::async_trait;
use uuid::Uuid;

use crate::shared::errors::{AppError, AppResult};

/// Maximum resolve-then-insert attempts a creating service should make when
/// the unique-constraint backstop fires under concurrent creation.
pub const SLUG_INSERT_ATTEMPTS: u32 = 3;

/// Normalize a display name into a URL-safe slug.
///
/// Lowercases, keeps only ASCII letters, digits, whitespace and hyphens,
/// maps whitespace and hyphen runs to a single hyphen, and trims hyphens at
/// both ends. Idempotent: feeding a slug back in returns it unchanged.
/// A name with no usable characters normalizes to `""`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c);
            pending_hyphen = false;
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }

    slug
}

/// Existence check supplied by the persistence side. `exclude` skips one
/// record id so a rename does not collide with itself.
#[async_trait]
pub trait SlugLookup: Send + Sync {
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> AppResult<bool>;
}

/// What to do when the normalized name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Append the smallest numeric suffix that resolves the collision.
    Suffix,
    /// Fail with a conflict (quick-add flows).
    Reject,
}

/// Derive a slug for `name` that is free according to `lookup`.
///
/// Deterministic and minimal: returns the bare normalized name when free,
/// otherwise the lowest-numbered `base-k` candidate. Names that normalize to
/// the empty string get a generated `entry-xxxxxxxx` base first.
pub async fn resolve_slug(
    lookup: &dyn SlugLookup,
    name: &str,
    exclude: Option<Uuid>,
    policy: CollisionPolicy,
) -> AppResult<String> {
    let mut base = slugify(name);
    if base.is_empty() {
        base = generated_base();
    }

    if !lookup.slug_exists(&base, exclude).await? {
        return Ok(base);
    }

    if policy == CollisionPolicy::Reject {
        return Err(AppError::Conflict(format!(
            "Slug '{}' is already taken",
            base
        )));
    }

    let mut counter: u32 = 1;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !lookup.slug_exists(&candidate, exclude).await? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

fn generated_base() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("entry-{}", &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FixedSlugs(HashSet<String>);

    impl FixedSlugs {
        fn of(slugs: &[&str]) -> Self {
            Self(slugs.iter().map(|s| s.to_string()).collect())
        }
    }

    #[async_trait]
    impl SlugLookup for FixedSlugs {
        async fn slug_exists(&self, slug: &str, _exclude: Option<Uuid>) -> AppResult<bool> {
            Ok(self.0.contains(slug))
        }
    }

    // Normalizer

    #[test]
    fn slugify_basic_names() {
        assert_eq!(slugify("Slice of Life!"), "slice-of-life");
        assert_eq!(slugify("Attack on Titan"), "attack-on-titan");
        assert_eq!(slugify("Re:Zero"), "rezero");
        assert_eq!(slugify("K-On!"), "k-on");
        assert_eq!(slugify("91 Days"), "91-days");
    }

    #[test]
    fn slugify_collapses_runs_and_trims() {
        assert_eq!(slugify("  Spy  x   Family  "), "spy-x-family");
        assert_eq!(slugify("--hello--world--"), "hello-world");
        assert_eq!(slugify("a - b"), "a-b");
    }

    #[test]
    fn slugify_degenerate_inputs() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!???"), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("進撃の巨人"), "");
    }

    #[test]
    fn slugify_is_idempotent() {
        for name in [
            "Slice of Life!",
            "K-On!",
            "  Spy  x  Family ",
            "91 Days",
            "already-a-slug",
            "",
        ] {
            let once = slugify(name);
            assert_eq!(slugify(&once), once, "not idempotent for {:?}", name);
        }
    }

    #[test]
    fn slugify_output_range() {
        for name in ["Slice of Life!", "K-On!", "a!b@c#d", "--x--", "FooBAR 9"] {
            let slug = slugify(name);
            if slug.is_empty() {
                continue;
            }
            assert!(!slug.starts_with('-') && !slug.ends_with('-'), "{:?}", slug);
            assert!(!slug.contains("--"), "{:?}", slug);
            assert!(
                slug.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "{:?}",
                slug
            );
        }
    }

    // Resolver

    #[tokio::test]
    async fn free_name_resolves_to_its_bare_slug() {
        let existing = FixedSlugs::of(&["action"]);
        let slug = resolve_slug(&existing, "Romance", None, CollisionPolicy::Suffix)
            .await
            .unwrap();
        assert_eq!(slug, "romance");
    }

    #[tokio::test]
    async fn collision_takes_the_smallest_free_suffix() {
        let existing = FixedSlugs::of(&["action", "action-1"]);
        let slug = resolve_slug(&existing, "Action", None, CollisionPolicy::Suffix)
            .await
            .unwrap();
        assert_eq!(slug, "action-2");
    }

    #[tokio::test]
    async fn gaps_in_the_suffix_sequence_are_reused() {
        let existing = FixedSlugs::of(&["action", "action-2"]);
        let slug = resolve_slug(&existing, "Action", None, CollisionPolicy::Suffix)
            .await
            .unwrap();
        assert_eq!(slug, "action-1");
    }

    #[tokio::test]
    async fn resolved_slug_is_never_in_the_existing_set() {
        let existing = FixedSlugs::of(&["slice-of-life", "slice-of-life-1", "slice-of-life-2"]);
        let slug = resolve_slug(&existing, "Slice of Life!", None, CollisionPolicy::Suffix)
            .await
            .unwrap();
        assert!(!existing.0.contains(&slug));
        assert_eq!(slug, "slice-of-life-3");
    }

    #[tokio::test]
    async fn reject_policy_fails_on_collision() {
        let existing = FixedSlugs::of(&["action"]);
        let err = resolve_slug(&existing, "Action", None, CollisionPolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn reject_policy_passes_when_free() {
        let existing = FixedSlugs::of(&[]);
        let slug = resolve_slug(&existing, "Isekai", None, CollisionPolicy::Reject)
            .await
            .unwrap();
        assert_eq!(slug, "isekai");
    }

    #[tokio::test]
    async fn all_symbol_name_gets_a_generated_base() {
        let existing = FixedSlugs::of(&[]);
        let slug = resolve_slug(&existing, "!!!", None, CollisionPolicy::Suffix)
            .await
            .unwrap();
        assert!(slug.starts_with("entry-"));
        assert_eq!(slug.len(), "entry-".len() + 8);
    }
}
