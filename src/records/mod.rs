//! Applicant records.
//!
//! Each record holds applicant metadata plus the address of one stored
//! document. Records and files have independent lifetimes.

mod model;
mod repository;

pub use model::{
    searchable, share_path, ApplicantFilter, ApplicantRecord, ApplicantStatus, ApplicantUpdate,
    NewApplicant, StatusCounts,
};
pub use repository::ApplicantRepository;
