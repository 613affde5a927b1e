//! Drill-down detail overlay
//!
//! The overlay moves `Hidden -> Populated -> Visible -> Hidden`. Content is
//! built once per selection from the grant index and kept after closing so
//! [`DetailOverlay::reopen`] can show it again unchanged.

use crate::{
    core::config::GlobalFilters,
    data::grants::{GrantIndex, GrantRecord},
    input::interaction::SelectionContext,
    prelude::HashMap,
    rendering::svg::escape_markup,
};
use once_cell::sync::Lazy;

/// Columns shown in the grant table, in display order
pub const GRANT_COLUMNS: [&str; 8] = [
    "grantee_nm",
    "grant_num",
    "award_start_dt",
    "award_end_dt",
    "award_amt",
    "funding_type_nm",
    "program_area_cd",
    "program_area_nm",
];

static COLUMN_HEADERS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("grantee_nm", "Grantee Name"),
        ("funding_type_nm", "Funding Type"),
        ("award_amt", "Award Amount ($)"),
        ("grant_num", "Award Number"),
        ("accession_num", "Accession No."),
        ("award_start_dt", "Award Start Date"),
        ("award_end_dt", "Award End Date"),
        ("program_area_cd", "Program Area Code"),
        ("program_area_nm", "Program Area"),
        ("proposal_title", "Proposal Title"),
    ]
    .into_iter()
    .collect()
});

/// Display label for a record field; unknown keys are shown as-is
pub fn column_header(key: &str) -> &str {
    COLUMN_HEADERS.get(key).copied().unwrap_or(key)
}

/// `1000000.0` -> `"$1,000,000"`; up to three fraction digits, trailing zeros dropped
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${}", amount);
    }
    let fixed = format!("{:.3}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && !fixed.trim_matches(|c: char| c == '0' || c == '.').is_empty() {
        "-"
    } else {
        ""
    };
    if fraction.is_empty() {
        format!("${}{}", sign, grouped)
    } else {
        format!("${}{}.{}", sign, grouped, fraction)
    }
}

fn cell(record: &GrantRecord, column: &str) -> String {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    match column {
        "grantee_nm" => text(&record.grantee_nm),
        "grant_num" => text(&record.grant_num),
        "accession_num" => text(&record.accession_num),
        "award_start_dt" => text(&record.award_start_dt),
        "award_end_dt" => text(&record.award_end_dt),
        "award_amt" => record.award_amt.map(format_currency).unwrap_or_default(),
        "funding_type_nm" => text(&record.funding_type_nm),
        "program_area_cd" => text(&record.program_area_cd),
        "program_area_nm" => text(&record.program_area_nm),
        "proposal_title" => text(&record.proposal_title),
        _ => String::new(),
    }
}

/// Rendered grant rows; every row has one cell per header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantTable {
    pub columns: Vec<&'static str>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl GrantTable {
    pub fn from_records(records: &[&GrantRecord]) -> Self {
        let columns = GRANT_COLUMNS.to_vec();
        Self {
            headers: columns.iter().map(|c| column_header(c).to_string()).collect(),
            rows: records
                .iter()
                .map(|r| columns.iter().map(|c| cell(r, c)).collect())
                .collect(),
            columns,
        }
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, key: &str) -> Option<Vec<&str>> {
        let position = self.columns.iter().position(|c| *c == key)?;
        Some(self.rows.iter().map(|row| row[position].as_str()).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything the overlay shows for one selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayContent {
    pub selection: SelectionContext,
    pub filters: GlobalFilters,
    pub header: String,
    pub table: GrantTable,
}

impl OverlayContent {
    /// Queries `grants` with the global fiscal year and funding type
    pub fn build(selection: SelectionContext, filters: &GlobalFilters, grants: &GrantIndex) -> Self {
        let rows = match selection.district {
            Some(district) => grants.query_district(
                &selection.state_cd,
                district,
                &filters.award_year,
                &filters.funding_type,
            ),
            None => Vec::new(),
        };
        log::debug!(
            "{} grants for {} (FY {}, {})",
            rows.len(),
            selection.label,
            filters.award_year,
            filters.funding_type
        );
        Self {
            header: format!(
                "Fiscal Year: {}, Funding Type: {}, {}",
                filters.award_year, filters.funding_type, selection.label
            ),
            table: GrantTable::from_records(&rows),
            filters: filters.clone(),
            selection,
        }
    }

    /// Header and table as an HTML fragment
    pub fn to_html(&self) -> String {
        let mut html = format!(
            r#"<div class="header"><h2>{}</h2><button class="close-btn" aria-label="Close">&times;</button></div>"#,
            escape_markup(&self.header)
        );
        html.push_str(r#"<div class="grant-table-container grant-details"><table><thead><tr>"#);
        for header in &self.table.headers {
            html.push_str(&format!("<th>{}</th>", escape_markup(header)));
        }
        html.push_str("</tr></thead><tbody>");
        for row in &self.table.rows {
            html.push_str("<tr>");
            for value in row {
                html.push_str(&format!("<td>{}</td>", escape_markup(value)));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table></div>");
        html
    }
}

/// Overlay lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Hidden,
    Populated(OverlayContent),
    Visible(OverlayContent),
}

impl OverlayState {
    pub fn content(&self) -> Option<&OverlayContent> {
        match self {
            OverlayState::Hidden => None,
            OverlayState::Populated(content) | OverlayState::Visible(content) => Some(content),
        }
    }
}

/// Modal detail view for the last selection
#[derive(Debug, Clone, Default)]
pub struct DetailOverlay {
    state: OverlayState,
    /// Content of the last selection while hidden
    retained: Option<OverlayContent>,
}

impl DetailOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previous content with a fresh query and shows it
    pub fn open(
        &mut self,
        selection: SelectionContext,
        filters: &GlobalFilters,
        grants: &GrantIndex,
    ) {
        self.populate(OverlayContent::build(selection, filters, grants));
        self.render();
    }

    /// Installs content without showing it
    pub fn populate(&mut self, content: OverlayContent) {
        self.retained = None;
        self.state = OverlayState::Populated(content);
    }

    /// `Populated -> Visible`; other states are left alone
    pub fn render(&mut self) {
        self.state = match std::mem::take(&mut self.state) {
            OverlayState::Populated(content) => OverlayState::Visible(content),
            other => other,
        };
    }

    /// Hides the overlay, keeping its content for [`reopen`](Self::reopen)
    pub fn close(&mut self) {
        match std::mem::take(&mut self.state) {
            OverlayState::Hidden => {}
            OverlayState::Populated(content) | OverlayState::Visible(content) => {
                self.retained = Some(content);
            }
        }
    }

    /// Shows the last content again. Returns false if nothing was ever opened.
    pub fn reopen(&mut self) -> bool {
        match &self.state {
            OverlayState::Visible(_) => true,
            OverlayState::Populated(_) => {
                self.render();
                true
            }
            OverlayState::Hidden => match self.retained.take() {
                Some(content) => {
                    self.state = OverlayState::Visible(content);
                    true
                }
                None => false,
            },
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, OverlayState::Visible(_))
    }

    /// Content currently populated or shown
    pub fn content(&self) -> Option<&OverlayContent> {
        self.state.content()
    }

    /// Content shown last, whether or not the overlay is open
    pub fn last_content(&self) -> Option<&OverlayContent> {
        self.state.content().or(self.retained.as_ref())
    }
}
