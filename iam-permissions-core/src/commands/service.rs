//! Permissions Report Service Layer
//!
//! This module provides the main service interface that holds the IAM client
//! and the per-run cache of resolved managed policies. The enumeration
//! operations live in `report.rs`.

use crate::error::ReportResult;
use crate::types::ManagedPolicyRecord;
use aws_sdk_iam::Client as IamClient;
use std::collections::HashMap;

/// Main service struct that holds the IAM client and provides the report operations
pub struct IamPermissionsService {
    pub(crate) iam_client: IamClient,
    /// Resolved managed policies keyed by ARN. A policy shared by several
    /// users/groups is fetched once per run.
    pub(crate) policy_cache: HashMap<String, ManagedPolicyRecord>,
}

impl IamPermissionsService {
    /// Create a new service instance with an IAM client
    ///
    /// The configuration is loaded using the default credential provider chain;
    /// region and credentials resolution is delegated entirely to the environment.
    pub async fn new() -> ReportResult<Self> {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;

        Ok(Self {
            iam_client: IamClient::new(&config),
            policy_cache: HashMap::new(),
        })
    }

    // report_user() and the per-kind enumerators are implemented in report.rs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_service_starts_with_empty_cache() {
        let service = IamPermissionsService::new()
            .await
            .expect("Failed to create service");
        assert!(service.policy_cache.is_empty());
    }
}
