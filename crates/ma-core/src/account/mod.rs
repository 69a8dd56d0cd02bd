//! Account domain module.
//!
//! The authoritative account record owned by the authentication service, the
//! HCP validation status, and the partial updates sent back to it.

pub mod record;
pub mod status;
pub mod update;

pub use record::{
    AuthRecord, AuthUser, Designation, EmailPermission, HcpValidation, License, MailingAddress,
    Section,
};
pub use status::HcpValidationStatus;
pub use update::{ChangePasswordRequest, PersonalUpdate, ProfessionalUpdate, ProfileUpdate};
