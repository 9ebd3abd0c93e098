//! Domain models for the MediTrack system.

mod drug;
mod history;
mod sale;
mod user;

pub use drug::*;
pub use history::*;
pub use sale::*;
pub use user::*;
