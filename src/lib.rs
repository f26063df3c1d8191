//! riskmap
//!
//! Questionnaire-driven cyber risk scoring with policy evidence retrieval.
//! Scores asset × threat × vulnerability scenarios from a static catalog and an
//! answer profile, aggregates them into ranked views, and looks up policy
//! passages that back each remediation.

pub mod aggregate;
pub mod catalog;
pub mod cli;
pub mod errors;
pub mod models;
pub mod policy;
pub mod profile;
pub mod recommend;
pub mod reporter;
pub mod scenario;
pub mod scoring;
pub mod session;
pub mod ui;

pub use catalog::{Catalog, FineTuning};
pub use errors::{RiskError, RiskResult};
pub use policy::PolicyIndex;
pub use profile::Profile;
pub use session::{Assessment, Session};
