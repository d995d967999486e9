//! Board orchestrators and their hardware-revision tables.

pub mod core_s3;
pub mod tab5;
