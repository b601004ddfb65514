//! Region schema: the single mapping between page regions, profile fields and
//! the role markers the renderer emits and the extractor reads back.

/// Prefix under which icons and other page images live.
pub const PHOTO_PREFIX: &str = "photos/";

pub const ATTR_ENTRY: &str = "data-entry";
pub const ATTR_ROLE: &str = "data-role";
pub const ATTR_ENTER: &str = "data-enter";

/// Field-role markers carried by rendered elements.
pub mod role {
    pub const ICON: &str = "icon";
    pub const TEXT: &str = "text";
    pub const PERIOD: &str = "period";
    pub const TITLE: &str = "title";
    pub const DETAIL: &str = "detail";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const PARAGRAPH: &str = "paragraph";
}

/// A named area of the page populated from one profile field or list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Name,
    Title,
    Contact,
    Social,
    Education,
    Skills,
    Languages,
    Profile,
    Work,
    Reference,
    Certifications,
    Projects,
}

/// How a region's entries are laid out, shared by renderer and extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Inner markup kept verbatim.
    RichText,
    PlainText,
    /// One `{icon, text}` wrapper per entry.
    IconList,
    /// `<strong>period</strong><br>school` per entry.
    Education,
    /// One `<li>` per string.
    StringList,
    /// Single `<p>` paragraph.
    Paragraph,
    /// Title block plus detail bullets per entry.
    Work,
    /// Name block plus description block per entry.
    Named,
}

impl Region {
    pub const ALL: [Region; 12] = [
        Region::Name,
        Region::Title,
        Region::Contact,
        Region::Social,
        Region::Education,
        Region::Skills,
        Region::Languages,
        Region::Profile,
        Region::Work,
        Region::Reference,
        Region::Certifications,
        Region::Projects,
    ];

    /// Regions shown inside collapsible sections, in page order.
    pub const SECTIONS: [Region; 10] = [
        Region::Contact,
        Region::Social,
        Region::Education,
        Region::Skills,
        Region::Languages,
        Region::Profile,
        Region::Work,
        Region::Reference,
        Region::Certifications,
        Region::Projects,
    ];

    /// DOM id of the region container.
    pub fn dom_id(self) -> &'static str {
        match self {
            Region::Name => "userName",
            Region::Title => "userTitle",
            Region::Contact => "contactInfo",
            Region::Social => "socialMedia",
            Region::Education => "educationInfo",
            Region::Skills => "skillsInfo",
            Region::Languages => "languagesInfo",
            Region::Profile => "profileInfo",
            Region::Work => "workExperience",
            Region::Reference => "referenceInfo",
            Region::Certifications => "certificationsInfo",
            Region::Projects => "projectsInfo",
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            Region::Name => Shape::RichText,
            Region::Title => Shape::PlainText,
            Region::Contact | Region::Social => Shape::IconList,
            Region::Education => Shape::Education,
            Region::Skills | Region::Languages => Shape::StringList,
            Region::Profile | Region::Reference => Shape::Paragraph,
            Region::Work => Shape::Work,
            Region::Certifications | Region::Projects => Shape::Named,
        }
    }

    /// Value of the `data-entry` marker on each entry wrapper, for list regions.
    pub fn entry_marker(self) -> Option<&'static str> {
        match self {
            Region::Contact => Some("contact"),
            Region::Social => Some("social"),
            Region::Education => Some("education"),
            Region::Skills => Some("skill"),
            Region::Languages => Some("language"),
            Region::Work => Some("work"),
            Region::Certifications => Some("certification"),
            Region::Projects => Some("project"),
            Region::Name | Region::Title | Region::Profile | Region::Reference => None,
        }
    }

    /// Section heading on the accordion toggle.
    pub fn heading(self) -> &'static str {
        match self {
            Region::Name => "Name",
            Region::Title => "Title",
            Region::Contact => "Contact",
            Region::Social => "Social Media",
            Region::Education => "Education",
            Region::Skills => "Skills",
            Region::Languages => "Languages",
            Region::Profile => "Profile",
            Region::Work => "Work Experience",
            Region::Reference => "Reference",
            Region::Certifications => "Certifications",
            Region::Projects => "Projects",
        }
    }

    /// Whether phone and email entries become inputs. Social entries never do.
    pub fn allows_inputs(self) -> bool {
        self == Region::Contact
    }
}

/// What the line-break key does on a rendered surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterKey {
    /// Platform default; the page is not being edited.
    Default,
    /// Insert a single line break into editable text.
    LineBreak,
    /// Swallow the key inside inputs.
    Suppress,
}

impl EnterKey {
    pub fn attr_value(self) -> Option<&'static str> {
        match self {
            EnterKey::Default => None,
            EnterKey::LineBreak => Some("line-break"),
            EnterKey::Suppress => Some("suppress"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_dom_ids_are_unique() {
        let ids: HashSet<_> = Region::ALL.iter().map(|r| r.dom_id()).collect();
        assert_eq!(ids.len(), Region::ALL.len());
    }

    #[test]
    fn test_list_regions_have_entry_markers() {
        for region in Region::ALL {
            let is_list = matches!(
                region.shape(),
                Shape::IconList | Shape::Education | Shape::StringList | Shape::Work | Shape::Named
            );
            assert_eq!(region.entry_marker().is_some(), is_list, "{region:?}");
        }
    }

    #[test]
    fn test_only_contact_allows_inputs() {
        assert!(Region::Contact.allows_inputs());
        assert!(!Region::Social.allows_inputs());
    }
}
