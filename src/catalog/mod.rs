//! Catalog Store
//!
//! Static reference data (assets, threats, vulnerabilities) loaded once from a
//! YAML document, plus the per-session fine-tuning overrides that replace an
//! asset's impact or a threat's likelihood.

mod field_map;

pub use field_map::{legacy_control_field, LEGACY_CONTROL_FIELDS};

use crate::errors::{RiskError, RiskResult};
use crate::models::{Asset, Threat, Vulnerability};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Lower bound of the catalog scale (and of fine-tuning values)
pub const SCALE_MIN: f64 = 1.0;
/// Upper bound of the catalog scale
pub const SCALE_MAX: f64 = 5.0;

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    assets: Vec<Asset>,
    #[serde(default)]
    threats: Vec<Threat>,
    #[serde(default)]
    vulnerabilities: Vec<Vulnerability>,
}

/// Read-only catalog with id indexes.
#[derive(Debug, Clone)]
pub struct Catalog {
    assets: Vec<Asset>,
    threats: Vec<Threat>,
    vulnerabilities: Vec<Vulnerability>,
    asset_index: HashMap<String, usize>,
    threat_index: HashMap<String, usize>,
    vuln_index: HashMap<String, usize>,
}

impl Catalog {
    /// Load a catalog from a YAML file
    pub fn load(path: &Path) -> RiskResult<Self> {
        log::info!("Loading risk catalog from {:?}", path);
        let raw = std::fs::read_to_string(path).map_err(|e| RiskError::io(e, path.to_path_buf()))?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> RiskResult<Self> {
        let doc: CatalogDocument = serde_yaml::from_str(raw)?;
        Self::from_parts(doc.assets, doc.threats, doc.vulnerabilities)
    }

    /// Build and validate a catalog.
    ///
    /// Vulnerabilities without a `control_field` get the legacy mapping filled
    /// in here, so gating has a single source afterwards.
    pub fn from_parts(
        assets: Vec<Asset>,
        threats: Vec<Threat>,
        mut vulnerabilities: Vec<Vulnerability>,
    ) -> RiskResult<Self> {
        let asset_index = build_index("asset", assets.iter().map(|a| a.id.as_str()))?;
        let threat_index = build_index("threat", threats.iter().map(|t| t.id.as_str()))?;
        let vuln_index = build_index("vulnerability", vulnerabilities.iter().map(|v| v.id.as_str()))?;

        for asset in &assets {
            check_scale("asset", &asset.id, asset.impact)?;
        }
        for threat in &threats {
            check_scale("threat", &threat.id, threat.likelihood)?;
        }

        for vuln in &mut vulnerabilities {
            if let Some(id) = vuln.assets.iter().find(|id| !asset_index.contains_key(*id)) {
                return Err(RiskError::InvalidCatalog(format!(
                    "vulnerability '{}' references unknown asset '{}'",
                    vuln.id, id
                )));
            }
            if let Some(id) = vuln.threats.iter().find(|id| !threat_index.contains_key(*id)) {
                return Err(RiskError::InvalidCatalog(format!(
                    "vulnerability '{}' references unknown threat '{}'",
                    vuln.id, id
                )));
            }
            if vuln.control_field.is_none() {
                vuln.control_field = legacy_control_field(&vuln.id).map(str::to_string);
            }
            if vuln.control_field.is_none() {
                log::debug!("Vulnerability {} has no control field and is always scored", vuln.id);
            }
        }

        log::info!(
            "Catalog ready: {} assets, {} threats, {} vulnerabilities",
            assets.len(),
            threats.len(),
            vulnerabilities.len()
        );

        Ok(Self {
            assets,
            threats,
            vulnerabilities,
            asset_index,
            threat_index,
            vuln_index,
        })
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn threats(&self) -> &[Threat] {
        &self.threats
    }

    pub fn vulnerabilities(&self) -> &[Vulnerability] {
        &self.vulnerabilities
    }

    pub fn asset(&self, id: &str) -> RiskResult<&Asset> {
        self.asset_index
            .get(id)
            .map(|&i| &self.assets[i])
            .ok_or_else(|| RiskError::unknown("asset", id))
    }

    pub fn threat(&self, id: &str) -> RiskResult<&Threat> {
        self.threat_index
            .get(id)
            .map(|&i| &self.threats[i])
            .ok_or_else(|| RiskError::unknown("threat", id))
    }

    pub fn vulnerability(&self, id: &str) -> RiskResult<&Vulnerability> {
        self.vuln_index
            .get(id)
            .map(|&i| &self.vulnerabilities[i])
            .ok_or_else(|| RiskError::unknown("vulnerability", id))
    }
}

fn build_index<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
) -> RiskResult<HashMap<String, usize>> {
    let mut index = HashMap::new();
    for (i, id) in ids.enumerate() {
        if index.insert(id.to_string(), i).is_some() {
            return Err(RiskError::InvalidCatalog(format!("duplicate {} id '{}'", kind, id)));
        }
    }
    Ok(index)
}

fn check_scale(kind: &str, id: &str, value: f64) -> RiskResult<()> {
    if !(SCALE_MIN..=SCALE_MAX).contains(&value) {
        return Err(RiskError::InvalidCatalog(format!(
            "{} '{}' has base value {} outside [{}, {}]",
            kind, id, value, SCALE_MIN, SCALE_MAX
        )));
    }
    Ok(())
}

/// Session-local replacement of catalog base values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FineTuning {
    /// Asset id → impact
    #[serde(default)]
    pub assets: BTreeMap<String, f64>,
    /// Threat id → likelihood
    #[serde(default)]
    pub threats: BTreeMap<String, f64>,
}

impl FineTuning {
    /// Load overrides from a JSON file and check them against the catalog
    pub fn load(path: &Path, catalog: &Catalog) -> RiskResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| RiskError::io(e, path.to_path_buf()))?;
        let tuning: FineTuning = serde_json::from_str(&raw)?;
        tuning.validate(catalog)?;
        Ok(tuning)
    }

    pub fn validate(&self, catalog: &Catalog) -> RiskResult<()> {
        for (id, &value) in &self.assets {
            catalog.asset(id)?;
            check_override(id, value)?;
        }
        for (id, &value) in &self.threats {
            catalog.threat(id)?;
            check_override(id, value)?;
        }
        Ok(())
    }

    pub fn set_asset_impact(&mut self, catalog: &Catalog, id: &str, impact: f64) -> RiskResult<()> {
        catalog.asset(id)?;
        check_override(id, impact)?;
        self.assets.insert(id.to_string(), impact);
        Ok(())
    }

    pub fn set_threat_likelihood(&mut self, catalog: &Catalog, id: &str, likelihood: f64) -> RiskResult<()> {
        catalog.threat(id)?;
        check_override(id, likelihood)?;
        self.threats.insert(id.to_string(), likelihood);
        Ok(())
    }

    pub fn asset_impact(&self, id: &str) -> Option<f64> {
        self.assets.get(id).copied()
    }

    pub fn threat_likelihood(&self, id: &str) -> Option<f64> {
        self.threats.get(id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.threats.is_empty()
    }

    pub fn clear(&mut self) {
        self.assets.clear();
        self.threats.clear();
    }
}

fn check_override(id: &str, value: f64) -> RiskResult<()> {
    if !(SCALE_MIN..=SCALE_MAX).contains(&value) {
        return Err(RiskError::InvalidOverride {
            id: id.to_string(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_CATALOG: &str = include_str!("../../data/risk_catalog.yaml");

    pub(crate) fn tiny_catalog() -> Catalog {
        Catalog::from_yaml_str(
            r#"
assets:
  - { id: A1, name: "Kundendaten", impact: 3 }
  - { id: A2, name: "Fileserver", impact: 4.5 }
threats:
  - { id: T1, name: "Ransomware", likelihood: 4 }
  - { id: T2, name: "Phishing", likelihood: 2 }
vulnerabilities:
  - id: V1
    name: "Fehlende Firewall"
    assets: [A1]
    threats: [T1]
    likelihood_mod: 0
    impact_mod: 1
    control_field: has_firewall
  - id: V2
    name: "Keine Mitarbeiterschulung"
    assets: [A1, A2]
    threats: [T1, T2]
    likelihood_mod: 0.5
    impact_mod: 0
    control_field: has_training
  - id: V3
    name: "Veraltete Hardware"
    assets: [A2]
    threats: [T1]
    likelihood_mod: -1
    impact_mod: 0.5
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_sample_catalog_loads() {
        let catalog = Catalog::from_yaml_str(SAMPLE_CATALOG).unwrap();
        assert!(!catalog.assets().is_empty());
        assert!(!catalog.threats().is_empty());
        assert!(catalog.vulnerabilities().len() >= 10);
    }

    #[test]
    fn test_legacy_field_filled_in() {
        let catalog = Catalog::from_yaml_str(
            r#"
assets: [{ id: A1, name: "Server", impact: 3 }]
threats: [{ id: T1, name: "Exploit", likelihood: 3 }]
vulnerabilities:
  - { id: V_PATCH_MISSING, name: "Fehlendes Patchmanagement", assets: [A1], threats: [T1] }
"#,
        )
        .unwrap();
        let vuln = catalog.vulnerability("V_PATCH_MISSING").unwrap();
        assert_eq!(vuln.control_field.as_deref(), Some("has_patch_mgmt"));
    }

    #[test]
    fn test_explicit_field_wins_over_legacy_table() {
        let catalog = Catalog::from_yaml_str(
            r#"
assets: [{ id: A1, name: "Server", impact: 3 }]
threats: [{ id: T1, name: "Exploit", likelihood: 3 }]
vulnerabilities:
  - { id: V_PATCH_MISSING, name: "Patch", assets: [A1], threats: [T1], control_field: has_vuln_scans }
"#,
        )
        .unwrap();
        let vuln = catalog.vulnerability("V_PATCH_MISSING").unwrap();
        assert_eq!(vuln.control_field.as_deref(), Some("has_vuln_scans"));
    }

    #[test]
    fn test_unknown_cross_reference_rejected() {
        let err = Catalog::from_yaml_str(
            r#"
assets: [{ id: A1, name: "Server", impact: 3 }]
threats: [{ id: T1, name: "Exploit", likelihood: 3 }]
vulnerabilities:
  - { id: V1, name: "X", assets: [A9], threats: [T1] }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, RiskError::InvalidCatalog(_)));
        assert!(err.to_string().contains("A9"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Catalog::from_yaml_str(
            r#"
assets:
  - { id: A1, name: "Server", impact: 3 }
  - { id: A1, name: "Laptop", impact: 2 }
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate asset id"));
    }

    #[test]
    fn test_lookup_unknown_id() {
        let catalog = tiny_catalog();
        assert!(catalog.asset("A1").is_ok());
        assert!(matches!(
            catalog.threat("T404"),
            Err(RiskError::UnknownId { kind: "threat", .. })
        ));
    }

    #[test]
    fn test_fine_tuning_bounds() {
        let catalog = tiny_catalog();
        let mut tuning = FineTuning::default();
        tuning.set_asset_impact(&catalog, "A1", 5.0).unwrap();
        tuning.set_threat_likelihood(&catalog, "T2", 1.0).unwrap();
        assert_eq!(tuning.asset_impact("A1"), Some(5.0));
        assert_eq!(tuning.threat_likelihood("T2"), Some(1.0));

        assert!(matches!(
            tuning.set_asset_impact(&catalog, "A1", 0.5),
            Err(RiskError::InvalidOverride { .. })
        ));
        assert!(tuning.set_threat_likelihood(&catalog, "T9", 3.0).is_err());

        tuning.clear();
        assert!(tuning.is_empty());
    }
}
