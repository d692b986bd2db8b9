//! Candidate landmark codes for each anchor used by the frame builder.
//!
//! Each list is tried in order; the first finite landmark wins. Clinics
//! with different naming conventions can override any list.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

/// Priority-ordered landmark codes for every frame anchor (FDI numbering).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Selectors {
    /// Left first molar: upper cusps first, lower as fallback.
    pub left_molar: Vec<String>,
    /// Right first molar: upper cusps first, lower as fallback.
    pub right_molar: Vec<String>,
    /// Upper right central incisor.
    pub incisor_11: Vec<String>,
    /// Upper left central incisor.
    pub incisor_21: Vec<String>,
    /// Lower left central incisor.
    pub incisor_31: Vec<String>,
    /// Lower right central incisor.
    pub incisor_41: Vec<String>,
    /// Lower left canine.
    pub canine_33: Vec<String>,
    /// Lower right canine.
    pub canine_43: Vec<String>,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            left_molar: codes(&["26mb", "26db", "26bg", "36mb", "36db", "36bg"]),
            right_molar: codes(&["16mb", "16db", "16bg", "46mb", "46db", "46bg"]),
            incisor_11: codes(&["11m", "11ma"]),
            incisor_21: codes(&["21m", "21ma"]),
            incisor_31: codes(&["31m", "31ma"]),
            incisor_41: codes(&["41m", "41ma"]),
            canine_33: codes(&["33m", "33mc"]),
            canine_43: codes(&["43m", "43mc"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_prefer_upper_molar_cusps() {
        let s = Selectors::default();
        assert_eq!(s.left_molar.first().map(String::as_str), Some("26mb"));
        assert_eq!(s.right_molar.first().map(String::as_str), Some("16mb"));
        assert_eq!(s.right_molar.len(), 6);
        assert_eq!(s.canine_43, vec!["43m".to_string(), "43mc".to_string()]);
    }
}
