pub mod sanitizer;
pub mod tag_set;
