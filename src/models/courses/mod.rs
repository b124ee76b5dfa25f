//! 课程、课时与测验

pub mod entities;
pub mod quiz;
pub mod requests;
pub mod responses;
