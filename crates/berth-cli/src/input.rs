//! Input files and arguments

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use berth_types::FlavorSpec;
use serde::Deserialize;

use crate::error::{CliError, CliResult};

/// One entry of the flavors file
#[derive(Debug, Deserialize)]
struct FlavorEntry {
    #[serde(default)]
    profile: Option<String>,

    #[serde(default)]
    scale: u32,
}

/// Load a YAML map of flavor name to `{ profile, scale }`
pub fn load_flavors(path: &Path) -> CliResult<BTreeMap<String, FlavorSpec>> {
    let raw = std::fs::read_to_string(path)?;
    parse_flavors(&raw)
}

fn parse_flavors(raw: &str) -> CliResult<BTreeMap<String, FlavorSpec>> {
    let entries: BTreeMap<String, FlavorEntry> = serde_yaml::from_str(raw)?;
    entries
        .into_iter()
        .map(|(name, entry)| {
            let flavor = FlavorSpec::new(name.as_str(), entry.profile.as_deref(), entry.scale)?;
            Ok((name, flavor))
        })
        .collect()
}

/// Load a YAML map of parameter name to default node count
pub fn load_counts(path: &Path) -> CliResult<BTreeMap<String, u32>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&raw)?)
}

/// Load the parameters of an existing stack; scalar values are kept as text
pub fn load_stack_parameters(path: &Path) -> CliResult<HashMap<String, String>> {
    let raw = std::fs::read_to_string(path)?;
    parse_stack_parameters(&raw)
}

fn parse_stack_parameters(raw: &str) -> CliResult<HashMap<String, String>> {
    let values: HashMap<String, serde_yaml::Value> = serde_yaml::from_str(raw)?;
    values
        .into_iter()
        .map(|(name, value)| {
            let text = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(CliError::InvalidInput(format!(
                        "stack parameter {name} is not a scalar: {other:?}"
                    )))
                }
            };
            Ok((name, text))
        })
        .collect()
}

/// Parse a `NAME=COUNT` argument
pub fn parse_count_param(raw: &str) -> CliResult<(String, u32)> {
    let (name, count) = raw
        .split_once('=')
        .ok_or_else(|| CliError::InvalidInput(format!("expected NAME=COUNT, got {raw:?}")))?;
    let count = count
        .trim()
        .parse()
        .map_err(|_| CliError::InvalidInput(format!("invalid count in {raw:?}")))?;
    Ok((name.trim().to_string(), count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flavors() {
        let flavors = parse_flavors("compute:\n  profile: compute\n  scale: 2\nbaremetal:\n  scale: 1\n").unwrap();
        assert_eq!(flavors["compute"].profile(), Some("compute"));
        assert_eq!(flavors["compute"].scale, 2);
        assert_eq!(flavors["baremetal"].profile(), None);
    }

    #[test]
    fn test_parse_flavors_rejects_bad_profile() {
        assert!(parse_flavors("compute:\n  profile: 'a:b'\n  scale: 1\n").is_err());
    }

    #[test]
    fn test_stack_parameters_as_text() {
        let params = parse_stack_parameters("ComputeCount: 3\nControllerCount: '1'\n").unwrap();
        assert_eq!(params["ComputeCount"], "3");
        assert_eq!(params["ControllerCount"], "1");
        assert!(parse_stack_parameters("ComputeCount: [1]\n").is_err());
    }

    #[test]
    fn test_parse_count_param() {
        assert_eq!(
            parse_count_param("ComputeCount=3").unwrap(),
            ("ComputeCount".to_string(), 3)
        );
        assert!(parse_count_param("ComputeCount").is_err());
        assert!(parse_count_param("ComputeCount=x").is_err());
    }
}
