use serde::{Deserialize, Serialize};

/// What to do with father/mother/partner ids that are not in the record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// Dangling parents count as absent, dangling partners are ignored.
    #[default]
    Lenient,
    /// Any dangling reference is an [`crate::InvalidInput::UnknownReference`] error.
    Strict,
}

/// Geometry and validation knobs for one layout pass.
///
/// Positions are the top-left corner of a `node_width` × `node_height` box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    pub node_width: f64,
    pub node_height: f64,
    /// Space between the two boxes of a couple.
    pub partner_gap: f64,
    /// Space after each single or couple before the next one on the same row.
    pub family_gap: f64,
    /// Vertical distance between generation rows.
    pub row_height: f64,
    /// Space between sibling boxes when centered under their parents.
    pub sibling_gap: f64,
    /// Sibling groups wider than this wrap onto additional rows.
    pub max_siblings_per_row: usize,
    pub sibling_row_gap: f64,
    pub reference_policy: ReferencePolicy,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_width: 180.0,
            node_height: 60.0,
            partner_gap: 20.0,
            family_gap: 70.0,
            row_height: 200.0,
            sibling_gap: 70.0,
            max_siblings_per_row: 4,
            sibling_row_gap: 20.0,
            reference_policy: ReferencePolicy::Lenient,
        }
    }
}

impl LayoutOptions {
    pub fn strict() -> Self {
        Self {
            reference_policy: ReferencePolicy::Strict,
            ..Default::default()
        }
    }

    /// Reads a (possibly partial) JSON object; missing fields keep their defaults.
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn partner_offset(&self) -> f64 {
        self.node_width + self.partner_gap
    }

    pub fn single_advance(&self) -> f64 {
        self.node_width + self.family_gap
    }

    pub fn couple_advance(&self) -> f64 {
        2.0 * self.node_width + self.partner_gap + self.family_gap
    }

    pub fn sibling_spacing(&self) -> f64 {
        self.node_width + self.sibling_gap
    }

    pub fn sibling_row_offset(&self) -> f64 {
        self.node_height + self.sibling_row_gap
    }
}
