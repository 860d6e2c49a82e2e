//! This crate provides the core logic for the IAM permissions reporter:
//! - enumeration of a user's attached managed policies, inline policies,
//!   and group memberships (with each group's policies)
//! - managed-policy default-version resolution
//! - JSON output sinks (console, full-record file, statements-only file)
//!

mod aws;
mod commands;
mod error;
mod output;
mod types;

// Re-exports for a small, focused public API
pub use aws::AwsError;
pub use commands::IamPermissionsService;
pub use error::{ReportError, ReportResult};
pub use output::{output_file_name, OutputMode, OutputSink};
pub use types::{
    AttachedPolicyRef, GroupPolicyRecord, GroupRef, ManagedPolicyRecord, PolicyRecord,
    PolicyVersionDetail, UserPolicyRecord,
};
