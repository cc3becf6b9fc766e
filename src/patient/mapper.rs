//! Conversion between `Patient` records and `PatientDto` transfer shapes

use super::model::{Patient, PatientDto};

/// Record to transfer shape, all nine fields copied; `Option::map` carries `None` through
impl From<Patient> for PatientDto {
    fn from(p: Patient) -> Self {
        Self {
            id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            address: p.address,
            city: p.city,
            state: p.state,
            zip_code: p.zip_code,
            phone_number: p.phone_number,
            email: p.email,
        }
    }
}

/// Transfer shape to record, id included; creation paths clear it afterwards
impl From<PatientDto> for Patient {
    fn from(d: PatientDto) -> Self {
        Self {
            id: d.id,
            first_name: d.first_name,
            last_name: d.last_name,
            address: d.address,
            city: d.city,
            state: d.state,
            zip_code: d.zip_code,
            phone_number: d.phone_number,
            email: d.email,
        }
    }
}
