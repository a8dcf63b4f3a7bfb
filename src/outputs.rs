// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack outputs
//!
//! Outputs are the externally visible result of a build. Stages append to an
//! [`OutputSet`] as they complete; the set only ever grows and keeps emission
//! order.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::deploy::CommittedStack;
use crate::errors::ProvisioningError;
use crate::graph::ResourceId;

/// Scheme-qualified CDN URL, always emitted
pub const DEFAULT_URL: &str = "defaultUrl";

/// Access-control list identifier, emitted when the access policy is built
pub const ACCESS_POLICY_ID: &str = "accessPolicyId";

/// Custom domain URL, emitted when the DNS alias is bound
pub const CUSTOM_URL: &str = "customUrl";

/// Value of an output, computed from an upstream resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputValue {
    /// Known at build time
    Literal(String),

    /// Generated attribute of a resource, known after apply
    Attribute {
        resource: ResourceId,
        attribute: String,
    },

    /// Fixed prefix followed by a generated attribute
    Prefixed {
        prefix: String,
        resource: ResourceId,
        attribute: String,
    },
}

impl OutputValue {
    pub fn attribute(resource: &ResourceId, attribute: &str) -> Self {
        Self::Attribute {
            resource: resource.clone(),
            attribute: attribute.to_string(),
        }
    }

    pub fn prefixed(prefix: &str, resource: &ResourceId, attribute: &str) -> Self {
        Self::Prefixed {
            prefix: prefix.to_string(),
            resource: resource.clone(),
            attribute: attribute.to_string(),
        }
    }

    /// Template expression for this value
    pub fn to_template(&self) -> Value {
        match self {
            Self::Literal(value) => Value::String(value.clone()),
            Self::Attribute {
                resource,
                attribute,
            } => json!({ "Fn::GetAtt": [resource.as_str(), attribute] }),
            Self::Prefixed {
                prefix,
                resource,
                attribute,
            } => json!({
                "Fn::Join": ["", [prefix, { "Fn::GetAtt": [resource.as_str(), attribute] }]]
            }),
        }
    }

    /// Resource and attribute this value is computed from, if any
    pub fn source(&self) -> Option<(&ResourceId, &str)> {
        match self {
            Self::Literal(_) => None,
            Self::Attribute {
                resource,
                attribute,
            }
            | Self::Prefixed {
                resource,
                attribute,
                ..
            } => Some((resource, attribute.as_str())),
        }
    }
}

/// A named stack output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    pub description: String,
    pub value: OutputValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_name: Option<String>,
}

impl Output {
    pub fn new(name: impl Into<String>, description: impl Into<String>, value: OutputValue) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value,
            export_name: None,
        }
    }

    pub fn with_export(mut self, export_name: impl Into<String>) -> Self {
        self.export_name = Some(export_name.into());
        self
    }

    /// Concrete value from a committed stack
    ///
    /// Fails when the attribute the value is computed from was not committed.
    pub fn resolve(&self, committed: &CommittedStack) -> Result<String, ProvisioningError> {
        match &self.value {
            OutputValue::Literal(value) => Ok(value.clone()),
            OutputValue::Attribute {
                resource,
                attribute,
            } => committed
                .attribute(resource, attribute)
                .map(str::to_string)
                .ok_or_else(|| self.unresolved(resource, attribute)),
            OutputValue::Prefixed {
                prefix,
                resource,
                attribute,
            } => committed
                .attribute(resource, attribute)
                .map(|value| format!("{}{}", prefix, value))
                .ok_or_else(|| self.unresolved(resource, attribute)),
        }
    }

    fn unresolved(&self, resource: &ResourceId, attribute: &str) -> ProvisioningError {
        ProvisioningError::UnresolvedOutput {
            output: self.name.clone(),
            resource: resource.clone(),
            attribute: attribute.to_string(),
        }
    }
}

/// Append-only, emission-ordered collection of outputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputSet(Vec<Output>);

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, output: Output) {
        self.0.push(output);
    }

    pub fn get(&self, name: &str) -> Option<&Output> {
        self.0.iter().find(|output| output.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Output names in emission order
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|output| output.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Output> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a OutputSet {
    type Item = &'a Output;
    type IntoIter = std::slice::Iter<'a, Output>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emission_order_preserved() {
        let mut outputs = OutputSet::new();
        outputs.emit(Output::new(
            ACCESS_POLICY_ID,
            "ACL id",
            OutputValue::attribute(&ResourceId::from("webAcl"), "Id"),
        ));
        outputs.emit(Output::new(
            DEFAULT_URL,
            "CDN URL",
            OutputValue::prefixed("https://", &ResourceId::from("dist"), "DomainName"),
        ));

        assert_eq!(outputs.names(), vec![ACCESS_POLICY_ID, DEFAULT_URL]);
        assert!(outputs.contains(DEFAULT_URL));
        assert!(!outputs.contains(CUSTOM_URL));
    }

    #[test]
    fn test_template_expressions() {
        let dist = ResourceId::from("dist");
        assert_eq!(
            OutputValue::prefixed("https://", &dist, "DomainName").to_template(),
            json!({ "Fn::Join": ["", ["https://", { "Fn::GetAtt": ["dist", "DomainName"] }]] })
        );
        assert_eq!(
            OutputValue::Literal("https://www.example.com".to_string()).to_template(),
            json!("https://www.example.com")
        );
        assert_eq!(
            OutputValue::attribute(&dist, "Id").source(),
            Some((&dist, "Id"))
        );
        assert_eq!(OutputValue::Literal("x".to_string()).source(), None);
    }
}
