//! Export of drug listings.

mod csv;

pub use csv::*;
