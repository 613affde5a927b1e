use crate::data::conversion::{
    district_number, opt_amount, opt_string_or_number, parse_district, string_or_number,
};
use crate::prelude::HashMap;
use serde::{Deserialize, Serialize};
use std::io::Read;

pub use crate::core::constants::ALL_FUNDING_TYPES;

/// One grant award, as published in the awards dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantRecord {
    pub state_cd: String,
    #[serde(deserialize_with = "district_number")]
    pub district: i64,
    #[serde(deserialize_with = "string_or_number")]
    pub award_fy: String,
    #[serde(default)]
    pub funding_type_nm: Option<String>,
    #[serde(default)]
    pub grantee_nm: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub grant_num: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub accession_num: Option<String>,
    #[serde(default)]
    pub award_start_dt: Option<String>,
    #[serde(default)]
    pub award_end_dt: Option<String>,
    #[serde(default, deserialize_with = "opt_amount")]
    pub award_amt: Option<f64>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub program_area_cd: Option<String>,
    #[serde(default)]
    pub program_area_nm: Option<String>,
    #[serde(default)]
    pub proposal_title: Option<String>,
}

impl GrantRecord {
    /// Minimal record; descriptive fields start unset
    pub fn new(state_cd: impl Into<String>, district: i64, award_fy: impl Into<String>) -> Self {
        Self {
            state_cd: state_cd.into(),
            district,
            award_fy: award_fy.into(),
            funding_type_nm: None,
            grantee_nm: None,
            grant_num: None,
            accession_num: None,
            award_start_dt: None,
            award_end_dt: None,
            award_amt: None,
            program_area_cd: None,
            program_area_nm: None,
            proposal_title: None,
        }
    }

    fn matches_funding_type(&self, funding_type: &str) -> bool {
        funding_type == ALL_FUNDING_TYPES || self.funding_type_nm.as_deref() == Some(funding_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScopeKey {
    state_cd: String,
    district: i64,
    award_fy: String,
}

impl ScopeKey {
    fn of(record: &GrantRecord) -> Self {
        Self {
            state_cd: record.state_cd.clone(),
            district: record.district,
            award_fy: record.award_fy.clone(),
        }
    }
}

/// Read-only index over grant records keyed by (state, district, fiscal year)
#[derive(Debug, Clone, Default)]
pub struct GrantIndex {
    records: Vec<GrantRecord>,
    by_scope: HashMap<ScopeKey, Vec<usize>>,
}

impl GrantIndex {
    pub fn new(records: Vec<GrantRecord>) -> Self {
        let mut by_scope: HashMap<ScopeKey, Vec<usize>> = HashMap::default();
        for (position, record) in records.iter().enumerate() {
            by_scope.entry(ScopeKey::of(record)).or_default().push(position);
        }
        log::debug!(
            "indexed {} grant records into {} scopes",
            records.len(),
            by_scope.len()
        );
        Self { records, by_scope }
    }

    /// Parses a JSON array of records.
    ///
    /// Records that don't fit [`GrantRecord`] are skipped with a warning; only
    /// a document that isn't an array at all is an error.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let rows: Vec<serde_json::Value> = serde_json::from_str(json)?;
        Ok(Self::from_rows(rows))
    }

    /// Parses a JSON array of records from any reader
    pub fn from_reader<R: Read>(reader: R) -> crate::Result<Self> {
        let rows: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
        Ok(Self::from_rows(rows))
    }

    fn from_rows(rows: Vec<serde_json::Value>) -> Self {
        let total = rows.len();
        let records: Vec<GrantRecord> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match serde_json::from_value::<GrantRecord>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("skipping grant record #{}: {}", index, e);
                    None
                }
            })
            .collect();
        if records.len() < total {
            log::info!("kept {} of {} grant records", records.len(), total);
        }
        Self::new(records)
    }

    /// Records for one unit and year, optionally narrowed to a funding type.
    ///
    /// `district` is parsed as an integer, so `"08"` and `"8"` are the same
    /// district. Pass [`ALL_FUNDING_TYPES`] to skip the funding-type filter.
    /// Rows keep dataset order; no match yields an empty vector.
    pub fn query(
        &self,
        state_cd: &str,
        district: &str,
        fiscal_year: &str,
        funding_type: &str,
    ) -> Vec<&GrantRecord> {
        match parse_district(district) {
            Some(district) => self.query_district(state_cd, district, fiscal_year, funding_type),
            None => {
                log::debug!("district {:?} is not numeric; no grants match", district);
                Vec::new()
            }
        }
    }

    /// [`query`](Self::query) with an already-parsed district number
    pub fn query_district(
        &self,
        state_cd: &str,
        district: i64,
        fiscal_year: &str,
        funding_type: &str,
    ) -> Vec<&GrantRecord> {
        let key = ScopeKey {
            state_cd: state_cd.to_string(),
            district,
            award_fy: fiscal_year.to_string(),
        };
        self.by_scope
            .get(&key)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&i| &self.records[i])
                    .filter(|r| r.matches_funding_type(funding_type))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Distinct fiscal years, ascending
    pub fn fiscal_years(&self) -> Vec<String> {
        let mut years: Vec<String> = self.records.iter().map(|r| r.award_fy.clone()).collect();
        years.sort();
        years.dedup();
        years
    }

    /// Distinct funding types, ascending
    pub fn funding_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .records
            .iter()
            .filter_map(|r| r.funding_type_nm.clone())
            .collect();
        types.sort();
        types.dedup();
        types
    }

    pub fn records(&self) -> &[GrantRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
