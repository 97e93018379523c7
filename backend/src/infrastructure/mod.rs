pub mod clock;
pub mod persistence;
