pub mod gallery;
pub mod model;
pub mod prompt;
