pub mod drill;
pub mod proficiency;
pub mod result;
pub mod sentence;
pub mod validation;
