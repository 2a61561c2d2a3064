pub mod prelude;

pub mod donation;
pub mod donor;
pub mod volunteer;
pub mod volunteer_shift;
