//! Enumeration logic for the permissions report service

use crate::aws::iam_client;
use crate::error::ReportResult;
use crate::output::OutputSink;
use crate::types::{AttachedPolicyRef, ManagedPolicyRecord, PolicyRecord};
use log::info;

impl super::service::IamPermissionsService {
    /// Produce the full report for one user: truncate the sink's file, then
    /// enumerate managed policies, inline policies, and group policies in
    /// that fixed order.
    pub async fn report_user(&mut self, user_name: &str, sink: &OutputSink) -> ReportResult<()> {
        sink.truncate()?;
        self.managed_policies(user_name, sink).await?;
        self.inline_policies(user_name, sink).await?;
        self.group_policies(user_name, sink).await?;
        Ok(())
    }

    /// Enumerate managed policies attached directly to a user, resolving each
    /// to its default version document.
    pub async fn managed_policies(
        &mut self,
        user_name: &str,
        sink: &OutputSink,
    ) -> ReportResult<()> {
        let attached = iam_client::list_attached_user_policies(&self.iam_client, user_name).await?;
        info!(
            "{} managed policies attached to user '{}'",
            attached.len(),
            user_name
        );

        self.forward_managed(&attached, sink).await
    }

    /// Enumerate inline policies embedded in a user.
    pub async fn inline_policies(&self, user_name: &str, sink: &OutputSink) -> ReportResult<()> {
        let policy_names = iam_client::list_user_policies(&self.iam_client, user_name).await?;
        info!(
            "{} inline policies attached to user '{}'",
            policy_names.len(),
            user_name
        );

        for policy_name in &policy_names {
            let record =
                iam_client::get_user_policy(&self.iam_client, user_name, policy_name).await?;
            sink.write(&PolicyRecord::from(record))?;
        }
        Ok(())
    }

    /// Enumerate a user's groups; within each group, its attached managed
    /// policies and its inline policies.
    pub async fn group_policies(&mut self, user_name: &str, sink: &OutputSink) -> ReportResult<()> {
        let groups = iam_client::list_groups_for_user(&self.iam_client, user_name).await?;
        info!("{} groups assigned to user '{}'", groups.len(), user_name);

        for group in &groups {
            info!("checking group '{}' ({})", group.name, group.arn);

            let attached =
                iam_client::list_attached_group_policies(&self.iam_client, &group.name).await?;
            info!("{} managed policies on group '{}'", attached.len(), group.name);
            self.forward_managed(&attached, sink).await?;

            let policy_names =
                iam_client::list_group_policies(&self.iam_client, &group.name).await?;
            info!(
                "{} inline policies on group '{}'",
                policy_names.len(),
                group.name
            );
            for policy_name in &policy_names {
                let record =
                    iam_client::get_group_policy(&self.iam_client, &group.name, policy_name)
                        .await?;
                sink.write(&PolicyRecord::from(record))?;
            }
        }
        Ok(())
    }

    /// List every IAM user name in the account.
    pub async fn all_users(&self) -> ReportResult<Vec<String>> {
        Ok(iam_client::list_users(&self.iam_client).await?)
    }

    async fn forward_managed(
        &mut self,
        attached: &[AttachedPolicyRef],
        sink: &OutputSink,
    ) -> ReportResult<()> {
        for policy in attached {
            let record = self.resolve_managed_policy(&policy.arn).await?;
            sink.write(&PolicyRecord::from(record))?;
        }
        Ok(())
    }

    /// Resolve a managed policy's default version document, memoized by ARN
    /// for the duration of the run.
    async fn resolve_managed_policy(&mut self, arn: &str) -> ReportResult<ManagedPolicyRecord> {
        if let Some(record) = self.policy_cache.get(arn) {
            return Ok(record.clone());
        }

        let version_id = iam_client::get_default_policy_version(&self.iam_client, arn).await?;
        let record = iam_client::get_policy_version(&self.iam_client, arn, &version_id).await?;
        self.policy_cache.insert(arn.to_string(), record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::super::service::IamPermissionsService;
    use crate::types::{ManagedPolicyRecord, PolicyVersionDetail};
    use serde_json::json;

    fn resolved_record(version_id: &str) -> ManagedPolicyRecord {
        ManagedPolicyRecord {
            policy_version: PolicyVersionDetail {
                document: json!({
                    "Version": "2012-10-17",
                    "Statement": [{"Effect": "Allow", "Action": "s3:GetObject", "Resource": "*"}]
                }),
                version_id: version_id.to_string(),
                is_default_version: true,
                create_date: None,
            },
        }
    }

    #[tokio::test]
    async fn test_resolve_managed_policy_reuses_cached_record() {
        let mut service = IamPermissionsService::new()
            .await
            .expect("Failed to create service");
        let arn = "arn:aws:iam::aws:policy/ReadOnlyAccess";
        service
            .policy_cache
            .insert(arn.to_string(), resolved_record("v2"));

        // A cached ARN resolves without any IAM call; this test runs offline,
        // so a resolve that reached the client would fail instead.
        let record = service
            .resolve_managed_policy(arn)
            .await
            .expect("cached ARN should resolve without an IAM call");
        assert_eq!(record.policy_version.version_id, "v2");
        assert_eq!(record.policy_version.document["Statement"][0]["Action"], "s3:GetObject");

        // Repeated resolution does not grow the cache
        let again = service
            .resolve_managed_policy(arn)
            .await
            .expect("second resolve should also hit the cache");
        assert_eq!(again.policy_version.version_id, "v2");
        assert_eq!(service.policy_cache.len(), 1);
    }

    #[tokio::test]
    async fn test_cache_entries_are_keyed_per_arn() {
        let mut service = IamPermissionsService::new()
            .await
            .expect("Failed to create service");
        service.policy_cache.insert(
            "arn:aws:iam::aws:policy/ReadOnlyAccess".to_string(),
            resolved_record("v2"),
        );
        service.policy_cache.insert(
            "arn:aws:iam::123456789012:policy/deploy".to_string(),
            resolved_record("v5"),
        );

        // Distinct ARNs stay distinct entries; memoization only collapses
        // repeats of the same ARN.
        assert_eq!(service.policy_cache.len(), 2);
        let record = service
            .resolve_managed_policy("arn:aws:iam::123456789012:policy/deploy")
            .await
            .expect("cached ARN should resolve without an IAM call");
        assert_eq!(record.policy_version.version_id, "v5");
        assert_eq!(service.policy_cache.len(), 2);
    }
}
