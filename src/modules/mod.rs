pub mod anime;
pub mod taxonomy;
