pub use super::donation::Entity as Donation;
pub use super::donor::Entity as Donor;
pub use super::volunteer::Entity as Volunteer;
pub use super::volunteer_shift::Entity as VolunteerShift;
