// Type definitions shared by the redaction and anonymization stages

pub mod detection;
pub mod geometry;
pub mod token;

pub use detection::*;
pub use geometry::*;
pub use token::*;
