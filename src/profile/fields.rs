//! Questionnaire field registry
//!
//! Every answer the engine understands, with the kind that decides how an
//! imported value is coerced.

/// How a field's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Positive count, at least 1 (e.g. number of employees)
    Count,
    /// Yes / partly / no / unanswered
    YesNo,
    /// Yes / no, always answered
    YesNoRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileField {
    pub id: &'static str,
    pub kind: FieldKind,
    pub category: &'static str,
}

/// Field that switches the engine into the critical-infrastructure policy.
pub const CRITICAL_INFRASTRUCTURE_FIELD: &str = "is_critical_infrastructure";

const fn yes_no(id: &'static str, category: &'static str) -> ProfileField {
    ProfileField { id, kind: FieldKind::YesNo, category }
}

pub const PROFILE_FIELDS: &[ProfileField] = &[
    ProfileField { id: "employees", kind: FieldKind::Count, category: "company" },
    ProfileField { id: CRITICAL_INFRASTRUCTURE_FIELD, kind: FieldKind::YesNoRequired, category: "company" },

    yes_no("has_security_role", "organisation"),
    yes_no("has_security_policies", "organisation"),
    yes_no("policies_reviewed", "organisation"),
    yes_no("has_asset_inventory", "organisation"),
    yes_no("has_incident_plan", "organisation"),
    yes_no("access_list_exists", "organisation"),
    yes_no("access_list_reviewed", "organisation"),
    yes_no("audits_done", "organisation"),

    yes_no("has_mfa", "identity"),
    yes_no("has_password_rules", "identity"),
    yes_no("has_password_manager", "identity"),
    yes_no("has_least_privilege", "identity"),
    yes_no("inactive_accounts_removed", "identity"),
    yes_no("has_account_lifecycle", "identity"),
    yes_no("admin_accounts_protected", "identity"),
    yes_no("has_sso", "identity"),
    yes_no("login_monitoring", "identity"),

    yes_no("has_patch_mgmt", "infrastructure"),
    yes_no("has_vuln_scans", "infrastructure"),
    yes_no("has_edr", "infrastructure"),
    yes_no("has_firewall", "infrastructure"),
    yes_no("network_segmented", "infrastructure"),
    yes_no("has_mdm", "infrastructure"),
    yes_no("logging_enabled", "infrastructure"),
    yes_no("logs_reviewed", "infrastructure"),
    yes_no("has_ids_ips", "infrastructure"),

    yes_no("daily_backups", "backup"),
    yes_no("has_offsite_backup", "backup"),
    yes_no("backup_tested", "backup"),
    yes_no("device_loss_protection", "backup"),

    yes_no("uses_cloud", "cloud"),
    yes_no("cloud_config_secure", "cloud"),
    yes_no("cloud_mfa_enabled", "cloud"),
    yes_no("cloud_logging", "cloud"),
    yes_no("cloud_shares_controlled", "cloud"),
    yes_no("cloud_permissions_reviewed", "cloud"),
    yes_no("cloud_policy_exists", "cloud"),
    yes_no("cloud_config_tested", "cloud"),
    yes_no("cloud_dlp", "cloud"),

    yes_no("has_training", "people"),
    yes_no("has_phishing_tests", "people"),
    yes_no("email_awareness", "people"),
    yes_no("has_incident_reporting", "people"),
    yes_no("has_byod_rules", "people"),
    yes_no("has_mobile_device_policy", "people"),

    yes_no("has_data_classification", "data"),
    yes_no("gdpr_compliant", "data"),
    yes_no("data_retention_rules", "data"),
    yes_no("data_encrypted_at_rest", "data"),
    yes_no("data_encrypted_in_transit", "data"),
    yes_no("vendors_checked", "data"),
    yes_no("vendors_have_avv", "data"),
];

pub fn field(id: &str) -> Option<&'static ProfileField> {
    PROFILE_FIELDS.iter().find(|f| f.id == id)
}
