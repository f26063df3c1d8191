//! Query Vocabulary
//!
//! Synonym groups, category bundles and awareness keywords used to turn a risk
//! scenario into a retrieval query and to filter the hits it returns.

/// Any token containing `key` is expanded with `terms`.
#[derive(Debug, Clone, Copy)]
pub struct SynonymGroup {
    pub key: &'static str,
    pub terms: &'static [&'static str],
}

/// Extra query terms added when a vulnerability name contains any trigger.
#[derive(Debug, Clone, Copy)]
pub struct KeywordBundle {
    pub name: &'static str,
    pub triggers: &'static [&'static str],
    pub terms: &'static [&'static str],
}

pub const SYNONYM_GROUPS: &[SynonymGroup] = &[
    SynonymGroup {
        key: "mfa",
        terms: &["mfa", "2fa", "multi factor", "multi-faktor", "auth", "identity", "multi faktor"],
    },
    SynonymGroup {
        key: "password",
        terms: &["password", "passwort", "pw", "credential"],
    },
    SynonymGroup {
        key: "backup",
        terms: &["backup", "sicherung", "datensicherung", "recovery", "offsite"],
    },
    SynonymGroup {
        key: "patch",
        terms: &["patch", "update", "vulnerability management", "security update"],
    },
    SynonymGroup {
        key: "cloud",
        terms: &["cloud", "saas", "onedrive", "sharepoint", "microsoft 365", "google"],
    },
    SynonymGroup {
        key: "firewall",
        terms: &["firewall", "netzwerk", "network security"],
    },
    SynonymGroup {
        key: "logging",
        terms: &["logging", "logs", "audit", "überwachung"],
    },
    SynonymGroup {
        key: "edr",
        terms: &["antivirus", "virenschutz", "endpoint detection", "edr", "xdr"],
    },
    SynonymGroup {
        key: "phishing",
        terms: &["phishing", "social engineering", "email fraud"],
    },
    SynonymGroup {
        key: "encryption",
        terms: &["verschlüsselung", "encryption", "crypto"],
    },
    SynonymGroup {
        key: "classification",
        terms: &["klassifizierung", "classification", "sensitive data"],
    },
    SynonymGroup {
        key: "dlp",
        terms: &["dlp", "data loss prevention", "shared files"],
    },
];

pub const KEYWORD_BUNDLES: &[KeywordBundle] = &[
    KeywordBundle {
        name: "patch management",
        triggers: &["patch", "update"],
        terms: &["patch", "update", "patchmanagement", "vulnerability management", "security update"],
    },
    KeywordBundle {
        name: "backup",
        triggers: &["backup", "sicherung"],
        terms: &["backup", "recovery", "restore", "offsite"],
    },
    KeywordBundle {
        name: "authentication",
        triggers: &["mfa", "2fa", "authent"],
        terms: &["mfa", "2fa", "strong authentication"],
    },
    KeywordBundle {
        name: "network",
        triggers: &["firewall", "netz"],
        terms: &["firewall", "network security"],
    },
    KeywordBundle {
        name: "awareness",
        triggers: &["phish", "social engineering", "awareness", "schulung"],
        terms: &["phishing", "social engineering", "awareness"],
    },
    KeywordBundle {
        name: "encryption",
        triggers: &["encrypt", "verschlüssel"],
        terms: &["encryption", "crypto", "tls"],
    },
    KeywordBundle {
        name: "dlp",
        triggers: &["dlp"],
        terms: &["dlp", "data loss prevention"],
    },
];

/// Vulnerability names containing any of these are awareness-related.
pub const AWARENESS_VULN_KEYWORDS: &[&str] = &[
    "schulung",
    "training",
    "awareness",
    "phishing",
    "social engineering",
    "mitarbeiter",
];

/// Hit text containing any of these is awareness content.
pub const AWARENESS_HIT_KEYWORDS: &[&str] = &[
    "schulung",
    "training",
    "sensibilisierung",
    "awareness",
    "phishing",
    "social engineering",
];
