//! Read-only IAM call wrappers used by the permissions report.
//!
//! Every wrapper issues a single unpaginated call; an account whose listings
//! exceed one page is out of scope for this tool.

use crate::aws::{AwsError, AwsResult};
use crate::types::{
    AttachedPolicyRef, GroupPolicyRecord, GroupRef, ManagedPolicyRecord, PolicyVersionDetail,
    UserPolicyRecord,
};
use aws_sdk_iam::Client as IamClient;

/// List the names of every IAM user in the account
pub(crate) async fn list_users(client: &IamClient) -> AwsResult<Vec<String>> {
    let response = client
        .list_users()
        .send()
        .await
        .map_err(|e| AwsError::IamError(format!("Failed to list users: {e}")))?;
    Ok(response.users.into_iter().map(|u| u.user_name).collect())
}

/// List managed policies attached directly to a user
pub(crate) async fn list_attached_user_policies(
    client: &IamClient,
    user_name: &str,
) -> AwsResult<Vec<AttachedPolicyRef>> {
    let response = client
        .list_attached_user_policies()
        .user_name(user_name)
        .send()
        .await
        .map_err(|e| {
            AwsError::IamError(format!(
                "Failed to list attached policies for user '{user_name}': {e}"
            ))
        })?;
    Ok(attached_policy_refs(response.attached_policies))
}

/// List inline policy names for a user
pub(crate) async fn list_user_policies(
    client: &IamClient,
    user_name: &str,
) -> AwsResult<Vec<String>> {
    let response = client
        .list_user_policies()
        .user_name(user_name)
        .send()
        .await
        .map_err(|e| {
            AwsError::IamError(format!(
                "Failed to list inline policies for user '{user_name}': {e}"
            ))
        })?;
    Ok(response.policy_names)
}

/// Fetch and parse a user's inline policy document
pub(crate) async fn get_user_policy(
    client: &IamClient,
    user_name: &str,
    policy_name: &str,
) -> AwsResult<UserPolicyRecord> {
    let response = client
        .get_user_policy()
        .user_name(user_name)
        .policy_name(policy_name)
        .send()
        .await
        .map_err(|e| AwsError::IamError(format!("Failed to get user policy: {e}")))?;

    Ok(UserPolicyRecord {
        user_name: response.user_name,
        policy_name: response.policy_name,
        policy_document: decode_policy_document(&response.policy_document)?,
    })
}

/// List the groups a user belongs to
pub(crate) async fn list_groups_for_user(
    client: &IamClient,
    user_name: &str,
) -> AwsResult<Vec<GroupRef>> {
    let response = client
        .list_groups_for_user()
        .user_name(user_name)
        .send()
        .await
        .map_err(|e| {
            AwsError::IamError(format!("Failed to list groups for user '{user_name}': {e}"))
        })?;
    Ok(response
        .groups
        .into_iter()
        .map(|g| GroupRef {
            name: g.group_name,
            arn: g.arn,
        })
        .collect())
}

/// List managed policies attached to a group
pub(crate) async fn list_attached_group_policies(
    client: &IamClient,
    group_name: &str,
) -> AwsResult<Vec<AttachedPolicyRef>> {
    let response = client
        .list_attached_group_policies()
        .group_name(group_name)
        .send()
        .await
        .map_err(|e| {
            AwsError::IamError(format!(
                "Failed to list attached policies for group '{group_name}': {e}"
            ))
        })?;
    Ok(attached_policy_refs(response.attached_policies))
}

/// List inline policy names for a group
pub(crate) async fn list_group_policies(
    client: &IamClient,
    group_name: &str,
) -> AwsResult<Vec<String>> {
    let response = client
        .list_group_policies()
        .group_name(group_name)
        .send()
        .await
        .map_err(|e| {
            AwsError::IamError(format!(
                "Failed to list inline policies for group '{group_name}': {e}"
            ))
        })?;
    Ok(response.policy_names)
}

/// Fetch and parse a group's inline policy document
pub(crate) async fn get_group_policy(
    client: &IamClient,
    group_name: &str,
    policy_name: &str,
) -> AwsResult<GroupPolicyRecord> {
    let response = client
        .get_group_policy()
        .group_name(group_name)
        .policy_name(policy_name)
        .send()
        .await
        .map_err(|e| AwsError::IamError(format!("Failed to get group policy: {e}")))?;

    Ok(GroupPolicyRecord {
        group_name: response.group_name,
        policy_name: response.policy_name,
        policy_document: decode_policy_document(&response.policy_document)?,
    })
}

/// Resolve the default version id of a managed policy
pub(crate) async fn get_default_policy_version(
    client: &IamClient,
    policy_arn: &str,
) -> AwsResult<String> {
    let response = client
        .get_policy()
        .policy_arn(policy_arn)
        .send()
        .await
        .map_err(|e| AwsError::IamError(format!("Failed to get policy '{policy_arn}': {e}")))?;

    response
        .policy
        .and_then(|p| p.default_version_id)
        .ok_or_else(|| {
            AwsError::PolicyError(format!("Policy '{policy_arn}' has no default version id"))
        })
}

/// Fetch a specific managed policy version and parse its document
pub(crate) async fn get_policy_version(
    client: &IamClient,
    policy_arn: &str,
    version_id: &str,
) -> AwsResult<ManagedPolicyRecord> {
    let response = client
        .get_policy_version()
        .policy_arn(policy_arn)
        .version_id(version_id)
        .send()
        .await
        .map_err(|e| {
            AwsError::IamError(format!(
                "Failed to get version '{version_id}' of policy '{policy_arn}': {e}"
            ))
        })?;

    let version = response.policy_version.ok_or_else(|| {
        AwsError::PolicyError(format!("Policy '{policy_arn}' returned no version payload"))
    })?;
    let raw_document = version.document.ok_or_else(|| {
        AwsError::PolicyError(format!("Policy '{policy_arn}' version has no document"))
    })?;

    Ok(ManagedPolicyRecord {
        policy_version: PolicyVersionDetail {
            document: decode_policy_document(&raw_document)?,
            version_id: version.version_id.unwrap_or_default(),
            is_default_version: version.is_default_version,
            create_date: version.create_date.and_then(|d| {
                chrono::DateTime::from_timestamp(d.secs(), d.subsec_nanos())
                    .map(|dt| dt.to_rfc3339())
            }),
        },
    })
}

fn attached_policy_refs(
    attached: Option<Vec<aws_sdk_iam::types::AttachedPolicy>>,
) -> Vec<AttachedPolicyRef> {
    attached
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| {
            Some(AttachedPolicyRef {
                name: p.policy_name?,
                arn: p.policy_arn?,
            })
        })
        .collect()
}

/// Decode a URL-encoded policy document (IAM returns URL-encoded JSON)
fn decode_policy_document(raw: &str) -> AwsResult<serde_json::Value> {
    let decoded = percent_encoding::percent_decode_str(raw)
        .decode_utf8()
        .map_err(|e| AwsError::PolicyError(format!("Failed to URL decode policy document: {e}")))?;

    serde_json::from_str(&decoded)
        .map_err(|e| AwsError::PolicyError(format!("Failed to parse policy document JSON: {e}")))
}
