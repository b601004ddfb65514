use serde::{Deserialize, Serialize};

/// The structured record rendered onto the CV page.
///
/// Serialized with the camelCase keys the page has always stored
/// (`socialMedia`, `workExperience`). Every field defaults, so an empty or
/// partially shaped document still loads and renders blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    /// Rich text: may embed inline markup such as a highlighted surname.
    pub name: String,
    pub title: String,
    pub contact: Vec<ContactItem>,
    pub social_media: Vec<ContactItem>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub profile: String,
    pub work_experience: Vec<WorkEntry>,
    pub reference: String,
    pub certifications: Vec<NamedEntry>,
    pub projects: Vec<NamedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactItem {
    /// Image filename, e.g. `phone.png`.
    pub icon: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub period: String,
    pub school: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkEntry {
    pub title: String,
    pub details: Vec<String>,
}

/// Shared shape of certifications and projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedEntry {
    pub name: String,
    pub description: String,
}

/// Rendering variant selected by a contact icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Phone,
    Email,
    Location,
    Other,
}

impl IconKind {
    /// Classifies an icon by its file stem: `phone.png` and `phone` are both `Phone`.
    pub fn from_icon(icon: &str) -> Self {
        let stem = icon.rsplit('/').next().unwrap_or(icon);
        let stem = stem.split('.').next().unwrap_or(stem);
        match stem {
            "phone" => IconKind::Phone,
            "email" => IconKind::Email,
            "location" => IconKind::Location,
            _ => IconKind::Other,
        }
    }

    /// Only phone and email map to an input field.
    pub fn is_input(self) -> bool {
        matches!(self, IconKind::Phone | IconKind::Email)
    }

    pub fn css_class(self) -> &'static str {
        match self {
            IconKind::Phone => "phone",
            IconKind::Email => "email",
            IconKind::Location => "address-field",
            IconKind::Other => "",
        }
    }
}

impl ContactItem {
    pub fn new(icon: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            text: text.into(),
        }
    }

    pub fn kind(&self) -> IconKind {
        IconKind::from_icon(&self.icon)
    }
}

#[cfg(test)]
impl Profile {
    /// Copy with every text field trimmed, the form in which a profile
    /// survives a trip through the page.
    pub fn trimmed(&self) -> Profile {
        let t = |s: &String| s.trim().to_string();
        let items = |v: &[ContactItem]| -> Vec<ContactItem> {
            v.iter()
                .map(|c| ContactItem::new(c.icon.trim(), c.text.trim()))
                .collect()
        };
        let named = |v: &[NamedEntry]| -> Vec<NamedEntry> {
            v.iter()
                .map(|n| NamedEntry {
                    name: t(&n.name),
                    description: t(&n.description),
                })
                .collect()
        };

        Profile {
            name: t(&self.name),
            title: t(&self.title),
            contact: items(&self.contact),
            social_media: items(&self.social_media),
            education: self
                .education
                .iter()
                .map(|e| EducationEntry {
                    period: t(&e.period),
                    school: t(&e.school),
                })
                .collect(),
            skills: self.skills.iter().map(t).collect(),
            languages: self.languages.iter().map(t).collect(),
            profile: t(&self.profile),
            work_experience: self
                .work_experience
                .iter()
                .map(|w| WorkEntry {
                    title: t(&w.title),
                    details: w.details.iter().map(t).collect(),
                })
                .collect(),
            reference: t(&self.reference),
            certifications: named(&self.certifications),
            projects: named(&self.projects),
        }
    }

    /// First contact entry of the given kind.
    pub fn contact_of(&self, kind: IconKind) -> Option<&ContactItem> {
        self.contact.iter().find(|c| c.kind() == kind)
    }
}
