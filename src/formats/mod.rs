//! Binary resource format support

pub mod common;
pub mod erf;
pub mod gff;
pub mod twoda;
