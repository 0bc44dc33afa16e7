pub mod logger;
pub mod slug;
pub mod validation;

pub use slug::{resolve_slug, slugify, CollisionPolicy, SlugLookup, SLUG_INSERT_ATTEMPTS};
pub use validation::Validator;
