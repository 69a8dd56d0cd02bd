use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::account::Section;

/// Named steps of the edit-account flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepName {
    /// Read-only overview.
    Account,
    EditPersonal,
    EditProfessional,
    EditPassword,
}

impl StepName {
    pub const ALL: [StepName; 4] = [
        StepName::Account,
        StepName::EditPersonal,
        StepName::EditProfessional,
        StepName::EditPassword,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::EditPersonal => "editPersonal",
            Self::EditProfessional => "editProfessional",
            Self::EditPassword => "editPassword",
        }
    }

    /// Section edited by this step; `None` for the overview.
    pub fn section(&self) -> Option<Section> {
        match self {
            Self::Account => None,
            Self::EditPersonal => Some(Section::Personal),
            Self::EditProfessional => Some(Section::Professional),
            Self::EditPassword => Some(Section::Password),
        }
    }

    pub fn for_section(section: Section) -> Self {
        match section {
            Section::Personal => Self::EditPersonal,
            Section::Professional => Self::EditProfessional,
            Section::Password => Self::EditPassword,
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStep(pub String);

impl fmt::Display for UnknownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown step: {}", self.0)
    }
}

impl std::error::Error for UnknownStep {}

impl FromStr for StepName {
    type Err = UnknownStep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| UnknownStep(s.to_string()))
    }
}

/// Declarative step definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub name: StepName,
    pub title: String,
    pub hide_back_button: bool,
    /// Set while the step's submission is in flight.
    pub loading: bool,
    /// Step-shown notifications for this name repopulate the section.
    pub auto_load_trigger: Option<StepName>,
    pub action_text: Option<String>,
}

impl Step {
    /// Steps declared at flow construction.
    pub fn declarations() -> Vec<Step> {
        StepName::ALL
            .into_iter()
            .map(|name| Step {
                name,
                title: "Account".to_string(),
                hide_back_button: true,
                loading: false,
                auto_load_trigger: name.section().map(|_| name),
                action_text: name.section().map(|_| "Save Changes".to_string()),
            })
            .collect()
    }
}
