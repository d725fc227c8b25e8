//! Custom inheritance filter derivation
//!
//! For a custom inheritance search, every individual in the family gets an
//! effective affected status and expected genotype derived from the form
//! value and the pedigree. An explicit per-individual choice always wins;
//! otherwise unaffected parents of affected individuals inherit the
//! configured parental genotype, and everyone else falls back to the default
//! for their affected status.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Affected status of an individual
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AffectedStatus {
    /// Affected
    #[serde(rename = "A")]
    Affected,
    /// Unaffected
    #[serde(rename = "N")]
    Unaffected,
    /// Unknown
    #[serde(rename = "U")]
    Unknown,
}

/// Expected allele count for an individual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genotype {
    /// Homozygous reference
    RefRef,
    /// At least one reference allele
    HasRef,
    /// Heterozygous
    RefAlt,
    /// At least one alternate allele
    HasAlt,
    /// Homozygous alternate
    AltAlt,
    /// Not called
    NoCall,
}

/// One individual of the searched family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Individual {
    /// Portal-wide unique identifier
    pub individual_guid: String,
    /// Pedigree identifier, referenced by children's paternal id
    pub individual_id: String,
    /// Pedigree identifier of the father, if in the pedigree
    #[serde(default)]
    pub paternal_id: Option<String>,
    /// Affected status from the pedigree
    pub affected: AffectedStatus,
    /// Samples with loaded data; inheritance search is disabled for
    /// individuals without any
    #[serde(default)]
    pub sample_guids: Vec<String>,
}

impl Individual {
    /// Whether any data is loaded for this individual
    pub fn has_loaded_data(&self) -> bool {
        !self.sample_guids.is_empty()
    }
}

/// The custom inheritance form value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InheritanceFilter {
    /// Per-individual affected-status overrides, keyed by individual guid
    #[serde(default)]
    pub affected: BTreeMap<String, AffectedStatus>,
    /// Per-individual genotype overrides, keyed by individual guid
    #[serde(default)]
    pub genotype: BTreeMap<String, Genotype>,
    /// Genotype for unaffected fathers of affected individuals
    #[serde(default)]
    pub father: Option<Genotype>,
    /// Default genotype for affected individuals
    #[serde(rename = "A", default)]
    pub affected_default: Option<Genotype>,
    /// Default genotype for unaffected individuals
    #[serde(rename = "N", default)]
    pub unaffected_default: Option<Genotype>,
    /// Default genotype for individuals of unknown status
    #[serde(rename = "U", default)]
    pub unknown_default: Option<Genotype>,
    /// Allow no-call genotypes for unaffected individuals
    #[serde(rename = "allowNoCall", default)]
    pub allow_no_call: bool,
}

impl InheritanceFilter {
    fn default_for(&self, status: AffectedStatus) -> Option<Genotype> {
        match status {
            AffectedStatus::Affected => self.affected_default,
            AffectedStatus::Unaffected => self.unaffected_default,
            AffectedStatus::Unknown => self.unknown_default,
        }
    }
}

/// Effective filter derived for one individual
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndividualFilter {
    /// Effective affected status
    pub affected: AffectedStatus,
    /// Expected genotype, if any constraint applies
    pub genotype: Option<Genotype>,
}

/// Derive the effective per-individual filters for a family
pub fn derive_individual_filters(
    individuals: &[Individual],
    filter: &InheritanceFilter,
) -> BTreeMap<String, IndividualFilter> {
    // fathers of affected individuals, by pedigree id
    let mut parent_genotypes: BTreeMap<&str, Genotype> = BTreeMap::new();
    if let Some(father) = filter.father {
        for individual in individuals {
            if individual.affected == AffectedStatus::Affected {
                if let Some(paternal_id) = &individual.paternal_id {
                    parent_genotypes.insert(paternal_id, father);
                }
            }
        }
    }

    individuals
        .iter()
        .map(|individual| {
            let affected = filter
                .affected
                .get(&individual.individual_guid)
                .copied()
                .unwrap_or(individual.affected);

            let genotype = filter
                .genotype
                .get(&individual.individual_guid)
                .copied()
                .or_else(|| {
                    if affected == AffectedStatus::Unaffected {
                        if let Some(&parent) =
                            parent_genotypes.get(individual.individual_id.as_str())
                        {
                            return Some(parent);
                        }
                    }
                    filter.default_for(affected)
                });

            (
                individual.individual_guid.clone(),
                IndividualFilter { affected, genotype },
            )
        })
        .collect()
}

/// Custom inheritance search applies only when exactly one family is selected
pub fn single_family_guid(project_families: &serde_json::Value) -> Option<&str> {
    let families = project_families.as_array()?;
    if families.len() != 1 {
        return None;
    }
    let guids = families[0].get("familyGuids").and_then(|g| g.as_array())?;
    if guids.len() == 1 { guids[0].as_str() } else { None }
}
