//! Commands module - service layer for the permissions report

mod report;
pub(crate) mod service;

pub use service::IamPermissionsService;
