//! Compatibility checker run before a module may register.
//!
//! Validation is pure: it inspects a [`ModuleDescriptor`] against the host's
//! supported interface range and reports every problem it finds. Callers
//! decide what to log.

use std::fmt;

use serde::Serialize;

use iris_core::types::InterfaceRange;
use iris_entity::ModuleType;

use crate::descriptor::ModuleDescriptor;

/// A single reason a module is not compatible with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// The declared interface version is outside the supported range or unparsable.
    IncompatibleInterface {
        /// Version as declared by the module.
        declared: String,
        /// Supported range.
        supported: String,
    },
    /// The declared module type is not `pipeline` or `processor`.
    UnrecognizedModuleType {
        /// Type as declared by the module.
        declared: String,
    },
    /// The pipeline declaration is inconsistent or incomplete.
    InvalidPipelineDeclaration {
        /// What is wrong.
        reason: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompatibleInterface { declared, supported } => write!(
                f,
                "Module interface {declared} not compatible with server. Expected a version in {supported}"
            ),
            Self::UnrecognizedModuleType { declared } => write!(
                f,
                "Unrecognised module type. Expected pipeline or processor, got '{declared}'"
            ),
            Self::InvalidPipelineDeclaration { reason } => write!(f, "Invalid pipeline declaration: {reason}"),
        }
    }
}

/// Everything wrong with a module, empty when the module is compatible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Issues found, in check order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Whether no issue was found.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether an interface version issue was found.
    pub fn has_incompatible_interface(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue, ValidationIssue::IncompatibleInterface { .. }))
    }

    /// Human-readable lines, one per issue.
    pub fn logs(&self) -> Vec<String> {
        self.issues.iter().map(|issue| format!("Error - {issue}")).collect()
    }

    fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.logs().join("; "))
    }
}

/// Validates module descriptors against the host interface range.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityChecker {
    /// Supported interface versions.
    range: InterfaceRange,
}

impl CompatibilityChecker {
    /// Creates a checker for the given range.
    pub fn new(range: InterfaceRange) -> Self {
        Self { range }
    }

    /// The supported interface range.
    pub fn range(&self) -> InterfaceRange {
        self.range
    }

    /// Validates a descriptor.
    pub fn validate(&self, descriptor: &ModuleDescriptor) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::default();

        let compatible = descriptor
            .parsed_interface_version()
            .is_some_and(|version| self.range.contains(version));
        if !compatible {
            report.push(ValidationIssue::IncompatibleInterface {
                declared: descriptor.interface_version.clone(),
                supported: self.range.to_string(),
            });
        }

        let module_type = descriptor.parsed_module_type();
        if module_type.is_none() {
            report.push(ValidationIssue::UnrecognizedModuleType {
                declared: descriptor.module_type.clone(),
            });
        }

        if module_type == Some(ModuleType::Pipeline) && !descriptor.provides_pipeline {
            report.push(ValidationIssue::InvalidPipelineDeclaration {
                reason: "module of type pipeline has no pipelines".to_string(),
            });
        }

        if descriptor.provides_pipeline {
            check_pipeline(descriptor, &mut report);
        }

        if report.is_empty() { Ok(()) } else { Err(report) }
    }
}

fn check_pipeline(descriptor: &ModuleDescriptor, report: &mut ValidationReport) {
    if !descriptor.pipeline_info.is_object() {
        report.push(ValidationIssue::InvalidPipelineDeclaration {
            reason: "pipeline args are not json".to_string(),
        });
        return;
    }

    for field in descriptor.missing_pipeline_fields() {
        report.push(ValidationIssue::InvalidPipelineDeclaration {
            reason: format!("{field} missing from pipeline config"),
        });
    }

    for error in &descriptor.pipeline_arg_errors {
        report.push(ValidationIssue::InvalidPipelineDeclaration { reason: error.clone() });
    }
}
