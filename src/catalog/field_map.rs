//! Legacy vulnerability → questionnaire field table
//!
//! Catalogs written before `control_field` existed rely on this table. It is
//! consulted once while the catalog loads; afterwards the field lives on the
//! vulnerability itself.

/// (vulnerability id, profile field) pairs.
pub const LEGACY_CONTROL_FIELDS: &[(&str, &str)] = &[
    // Organisation
    ("V_SECURITY_ROLE_MISSING", "has_security_role"),
    ("V_SECURITY_POLICIES_MISSING", "has_security_policies"),
    ("V_POLICIES_NOT_REVIEWED", "policies_reviewed"),
    ("V_NO_ASSET_INVENTORY", "has_asset_inventory"),
    ("V_NO_INCIDENT_PLAN", "has_incident_plan"),
    ("V_NO_ACCESS_LIST", "access_list_exists"),
    ("V_ACCESS_LIST_NOT_REVIEWED", "access_list_reviewed"),
    ("V_NO_AUDITS", "audits_done"),

    // Identity and access
    ("V_MFA_MISSING", "has_mfa"),
    ("V_WEAK_PASSWORD_POLICY", "has_password_rules"),
    ("V_NO_PASSWORD_MANAGER", "has_password_manager"),
    ("V_NO_LEAST_PRIVILEGE", "has_least_privilege"),
    ("V_OLD_ACCOUNTS_ACTIVE", "inactive_accounts_removed"),
    ("V_NO_ACCOUNT_LIFECYCLE", "has_account_lifecycle"),
    ("V_ADMIN_ACCOUNTS_WEAK", "admin_accounts_protected"),
    ("V_NO_SSO", "has_sso"),
    ("V_LOGIN_MONITORING_MISSING", "login_monitoring"),

    // Infrastructure
    ("V_PATCH_MISSING", "has_patch_mgmt"),
    ("V_NO_VULN_SCAN", "has_vuln_scans"),
    ("V_EDR_MISSING", "has_edr"),
    ("V_FIREWALL_MISSING", "has_firewall"),
    ("V_NO_SEGMENTATION", "network_segmented"),
    ("V_NO_MDM", "has_mdm"),
    ("V_LOGGING_DISABLED", "logging_enabled"),
    ("V_LOGS_NOT_REVIEWED", "logs_reviewed"),
    ("V_NO_IDS_IPS", "has_ids_ips"),

    // Backup and recovery
    ("V_BACKUP_DAILY_MISSING", "daily_backups"),
    ("V_NO_OFFSITE_BACKUP", "has_offsite_backup"),
    ("V_BACKUP_UNTESTED", "backup_tested"),
    ("V_DEVICE_NOT_PROTECTED", "device_loss_protection"),

    // Cloud
    ("V_CLOUD_CONFIG_WEAK", "cloud_config_secure"),
    ("V_CLOUD_MFA_MISSING", "cloud_mfa_enabled"),
    ("V_CLOUD_LOGGING_MISSING", "cloud_logging"),
    ("V_CLOUD_PUBLIC_SHARES", "cloud_shares_controlled"),
    ("V_CLOUD_PERMISSIONS_UNCHECKED", "cloud_permissions_reviewed"),
    ("V_CLOUD_POLICY_MISSING", "cloud_policy_exists"),
    ("V_CLOUD_CONFIG_UNTESTED", "cloud_config_tested"),
    ("V_CLOUD_DLP_MISSING", "cloud_dlp"),
    ("V_CLOUD_NOT_USED", "uses_cloud"),

    // People
    ("V_NO_TRAINING", "has_training"),
    ("V_NO_PHISHING_TESTS", "has_phishing_tests"),
    ("V_LOW_AWARENESS", "email_awareness"),
    ("V_NO_INCIDENT_REPORTING", "has_incident_reporting"),
    ("V_NO_BYOD_RULES", "has_byod_rules"),
    ("V_NO_MOBILE_POLICY", "has_mobile_device_policy"),

    // Data protection
    ("V_NO_DATA_CLASSIFICATION", "has_data_classification"),
    ("V_GDPR_NON_COMPLIANT", "gdpr_compliant"),
    ("V_NO_RETENTION_RULES", "data_retention_rules"),
    ("V_DATA_UNENCRYPTED_REST", "data_encrypted_at_rest"),
    ("V_DATA_UNENCRYPTED_TRANSIT", "data_encrypted_in_transit"),
    ("V_VENDOR_NOT_CHECKED", "vendors_checked"),
    ("V_VENDOR_NO_AVV", "vendors_have_avv"),
];

/// Look up the legacy control field for a vulnerability id.
pub fn legacy_control_field(vuln_id: &str) -> Option<&'static str> {
    LEGACY_CONTROL_FIELDS
        .iter()
        .find(|(id, _)| *id == vuln_id)
        .map(|(_, field)| *field)
}
