pub mod model;
pub mod result;
pub mod profile;
