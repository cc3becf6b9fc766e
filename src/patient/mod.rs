//! Patient Module - record, transfer shape and mapping between them

pub mod mapper;
pub mod model;

pub use model::{Patient, PatientDto};
