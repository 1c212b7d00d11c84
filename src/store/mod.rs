mod catalog;
mod ratings;

pub use catalog::{family_key, portion_key, Catalog, SUPPLEMENT_CUISINE};
pub use ratings::RatingStore;
