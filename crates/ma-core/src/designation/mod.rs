//! Professional designation table and license requirement lookup.

use serde::{Deserialize, Serialize};

/// One option of the designation select list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectListItem {
    pub label: String,
    pub value: String,
    /// Whether holders of this designation must supply a license.
    #[serde(default)]
    pub requires_license: bool,
}

impl SelectListItem {
    pub fn new(label: &str, value: &str, requires_license: bool) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            requires_license,
        }
    }
}

/// Static designation → license requirement table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignationTable {
    items: Vec<SelectListItem>,
}

impl DesignationTable {
    pub fn new(items: Vec<SelectListItem>) -> Self {
        Self { items }
    }

    /// Built-in US designation list.
    pub fn us_default() -> Self {
        Self::new(vec![
            SelectListItem::new("Physician", "MD", true),
            SelectListItem::new("Doctor of Osteopathy", "DO", true),
            SelectListItem::new("Nurse Practitioner", "NP", true),
            SelectListItem::new("Physician Assistant", "PA", true),
            SelectListItem::new("Pharmacist", "RPH", true),
            SelectListItem::new("Dentist", "DDS", true),
            SelectListItem::new("Podiatrist", "DPM", true),
            SelectListItem::new("Optometrist", "OD", true),
            SelectListItem::new("Registered Nurse", "RN", false),
            SelectListItem::new("Licensed Practical Nurse", "LPN", false),
            SelectListItem::new("Medical Assistant", "MA", false),
            SelectListItem::new("Office Staff", "STAFF", false),
            SelectListItem::new("Student", "STUDENT", false),
            SelectListItem::new("Other", "OTHER", false),
        ])
    }

    /// Whether `designation` requires license fields.
    ///
    /// Linear scan by label; the first matching entry decides. Unknown or
    /// empty designations do not require a license.
    pub fn requires_license(&self, designation: &str) -> bool {
        self.items
            .iter()
            .find(|item| item.label == designation)
            .map(|item| item.requires_license)
            .unwrap_or(false)
    }

    pub fn items(&self) -> &[SelectListItem] {
        &self.items
    }
}

impl Default for DesignationTable {
    fn default() -> Self {
        Self::us_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physician_requires_license() {
        let table = DesignationTable::us_default();
        assert!(table.requires_license("Physician"));
        assert!(!table.requires_license("Student"));
    }

    #[test]
    fn unknown_designation_does_not_require_license() {
        let table = DesignationTable::us_default();
        assert!(!table.requires_license(""));
        assert!(!table.requires_license("physician"));
        assert!(!table.requires_license("Astronaut"));
    }

    #[test]
    fn first_match_wins() {
        let table = DesignationTable::new(vec![
            SelectListItem::new("Resident", "R1", false),
            SelectListItem::new("Resident", "R2", true),
        ]);
        assert!(!table.requires_license("Resident"));
    }
}
