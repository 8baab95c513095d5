//! Region models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use vultr_core::id::RegionId;
use vultr_core::Error;

/// A Vultr datacenter location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Region {
    /// Region code, e.g. `ewr`.
    pub id: RegionId,
    /// City name.
    pub city: String,
    /// Two-letter country code.
    pub country: String,
    /// Continent name.
    pub continent: String,
    /// Features offered in this region, e.g. `ddos_protection`.
    #[serde(default)]
    pub options: Vec<String>,
}

impl Region {
    /// Whether the region offers the named feature.
    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// Plan family filter for the availability endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    /// Every plan type.
    All,
    /// Cloud compute.
    Vc2,
    /// Dedicated cloud.
    Vdc,
    /// High frequency compute.
    Vhf,
    /// High performance compute.
    Vhp,
    /// Optimized cloud compute.
    Voc,
    /// Cloud GPU.
    Vcg,
    /// Bare metal.
    Vbm,
}

impl PlanType {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Vc2 => "vc2",
            Self::Vdc => "vdc",
            Self::Vhf => "vhf",
            Self::Vhp => "vhp",
            Self::Voc => "voc",
            Self::Vcg => "vcg",
            Self::Vbm => "vbm",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "vc2" => Ok(Self::Vc2),
            "vdc" => Ok(Self::Vdc),
            "vhf" => Ok(Self::Vhf),
            "vhp" => Ok(Self::Vhp),
            "voc" => Ok(Self::Voc),
            "vcg" => Ok(Self::Vcg),
            "vbm" => Ok(Self::Vbm),
            other => Err(Error::ValidationError(format!("unknown plan type `{other}`"))),
        }
    }
}

/// Plans that can currently be deployed in a region.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionAvailability {
    /// Plan ids, e.g. `vc2-1c-1gb`.
    #[serde(default)]
    pub available_plans: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn region_deserializes_without_options() {
        let region: Region = serde_json::from_value(json!({
            "id": "sjc",
            "city": "Silicon Valley",
            "country": "US",
            "continent": "North America"
        }))
        .unwrap();
        assert_eq!(region.id.as_str(), "sjc");
        assert!(region.options.is_empty());
        assert!(!region.has_option("ddos_protection"));
    }

    #[test]
    fn plan_type_round_trips_through_str() {
        assert_eq!("VHF".parse::<PlanType>().unwrap(), PlanType::Vhf);
        assert_eq!(PlanType::Vbm.to_string(), "vbm");
        assert!("gpu".parse::<PlanType>().is_err());
    }
}
