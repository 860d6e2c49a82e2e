//! Record types emitted by the report.
//!
//! Records serialize with the IAM API's field names so the JSON output matches
//! the response shapes of `GetPolicyVersion`, `GetUserPolicy`, and
//! `GetGroupPolicy`.

use serde::Serialize;
use serde_json::Value;

/// A managed policy's default version, as fetched from `GetPolicyVersion`.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyVersionDetail {
    #[serde(rename = "Document")]
    pub document: Value,
    #[serde(rename = "VersionId")]
    pub version_id: String,
    #[serde(rename = "IsDefaultVersion")]
    pub is_default_version: bool,
    #[serde(rename = "CreateDate", skip_serializing_if = "Option::is_none")]
    pub create_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManagedPolicyRecord {
    #[serde(rename = "PolicyVersion")]
    pub policy_version: PolicyVersionDetail,
}

/// An inline policy embedded in a user, as fetched from `GetUserPolicy`.
#[derive(Debug, Clone, Serialize)]
pub struct UserPolicyRecord {
    #[serde(rename = "UserName")]
    pub user_name: String,
    #[serde(rename = "PolicyName")]
    pub policy_name: String,
    #[serde(rename = "PolicyDocument")]
    pub policy_document: Value,
}

/// An inline policy embedded in a group, as fetched from `GetGroupPolicy`.
#[derive(Debug, Clone, Serialize)]
pub struct GroupPolicyRecord {
    #[serde(rename = "GroupName")]
    pub group_name: String,
    #[serde(rename = "PolicyName")]
    pub policy_name: String,
    #[serde(rename = "PolicyDocument")]
    pub policy_document: Value,
}

/// Any record the enumerator forwards to the output sink.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PolicyRecord {
    Managed(ManagedPolicyRecord),
    UserInline(UserPolicyRecord),
    GroupInline(GroupPolicyRecord),
}

impl PolicyRecord {
    /// The policy document carried by this record.
    pub fn document(&self) -> &Value {
        match self {
            Self::Managed(r) => &r.policy_version.document,
            Self::UserInline(r) => &r.policy_document,
            Self::GroupInline(r) => &r.policy_document,
        }
    }

    /// The document's individual statements.
    ///
    /// IAM allows `Statement` to be a list or a single object; a bare object
    /// counts as one statement, a missing key as zero.
    pub fn statements(&self) -> Vec<&Value> {
        match self.document().get("Statement") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single) => vec![single],
            None => Vec::new(),
        }
    }
}

impl From<ManagedPolicyRecord> for PolicyRecord {
    fn from(record: ManagedPolicyRecord) -> Self {
        Self::Managed(record)
    }
}

impl From<UserPolicyRecord> for PolicyRecord {
    fn from(record: UserPolicyRecord) -> Self {
        Self::UserInline(record)
    }
}

impl From<GroupPolicyRecord> for PolicyRecord {
    fn from(record: GroupPolicyRecord) -> Self {
        Self::GroupInline(record)
    }
}

/// A managed policy listing entry (name + ARN), before version resolution.
#[derive(Debug, Clone)]
pub struct AttachedPolicyRef {
    pub name: String,
    pub arn: String,
}

/// A group listing entry from `ListGroupsForUser`.
#[derive(Debug, Clone)]
pub struct GroupRef {
    pub name: String,
    pub arn: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn managed_record(document: Value) -> PolicyRecord {
        PolicyRecord::Managed(ManagedPolicyRecord {
            policy_version: PolicyVersionDetail {
                document,
                version_id: "v3".to_string(),
                is_default_version: true,
                create_date: None,
            },
        })
    }

    #[test]
    fn test_statements_from_array() {
        let record = managed_record(json!({
            "Version": "2012-10-17",
            "Statement": [
                {"Effect": "Allow", "Action": "s3:GetObject", "Resource": "*"},
                {"Effect": "Deny", "Action": "iam:*", "Resource": "*"}
            ]
        }));
        let statements = record.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0]["Effect"], "Allow");
        assert_eq!(statements[1]["Effect"], "Deny");
    }

    #[test]
    fn test_statements_from_single_object() {
        let record = managed_record(json!({
            "Version": "2012-10-17",
            "Statement": {"Effect": "Allow", "Action": "s3:ListBucket", "Resource": "*"}
        }));
        let statements = record.statements();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0]["Action"], "s3:ListBucket");
    }

    #[test]
    fn test_statements_missing_key() {
        let record = managed_record(json!({"Version": "2012-10-17"}));
        assert!(record.statements().is_empty());
    }

    #[test]
    fn test_managed_record_serializes_with_aws_field_names() {
        let record = managed_record(json!({"Version": "2012-10-17", "Statement": []}));
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["PolicyVersion"]["VersionId"], "v3");
        assert_eq!(value["PolicyVersion"]["IsDefaultVersion"], true);
        assert_eq!(value["PolicyVersion"]["Document"]["Version"], "2012-10-17");
        // CreateDate is omitted when absent
        assert!(value["PolicyVersion"].get("CreateDate").is_none());
    }

    #[test]
    fn test_user_inline_record_serializes_flat() {
        let record = PolicyRecord::UserInline(UserPolicyRecord {
            user_name: "alice".to_string(),
            policy_name: "inline-s3".to_string(),
            policy_document: json!({"Statement": []}),
        });
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["UserName"], "alice");
        assert_eq!(value["PolicyName"], "inline-s3");
        assert!(value.get("PolicyVersion").is_none());
    }
}
