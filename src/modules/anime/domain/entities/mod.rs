pub mod anime;

pub use anime::{Anime, EntityRef, GenreRef};
