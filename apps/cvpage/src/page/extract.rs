//! Persistence writer: reads a profile back out of a page snapshot.
//!
//! The inverse of [`crate::page::render`]. Regions are located by DOM id,
//! entries by their `data-entry` marker and fields by `data-role`.

use once_cell::sync::Lazy;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::editing::validation::ValidatedField;
use crate::models::profile::{ContactItem, EducationEntry, NamedEntry, Profile, WorkEntry};
use crate::page::schema::{role, Region, ATTR_ENTRY, ATTR_ROLE, PHOTO_PREFIX};

static ID_SEL: Lazy<Selector> = Lazy::new(|| selector("[id]"));
static ENTRY_SEL: Lazy<Selector> = Lazy::new(|| selector("[data-entry]"));
static ROLE_SEL: Lazy<Selector> = Lazy::new(|| selector("[data-role]"));
static IMG_SEL: Lazy<Selector> = Lazy::new(|| selector("img"));
static INPUT_SEL: Lazy<Selector> = Lazy::new(|| selector("input"));
static STRONG_SEL: Lazy<Selector> = Lazy::new(|| selector("strong"));
static P_SEL: Lazy<Selector> = Lazy::new(|| selector("p"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector parses")
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page snapshot has no #{0} region")]
    MissingRegion(&'static str),
}

/// A parsed copy of the live page.
///
/// Not `Send`: parse, read what is needed and drop it before awaiting.
pub struct PageSnapshot {
    doc: Html,
}

impl PageSnapshot {
    pub fn parse(markup: &str) -> Self {
        Self {
            doc: Html::parse_document(markup),
        }
    }

    fn region(&self, region: Region) -> Result<ElementRef<'_>, ExtractError> {
        let id = region.dom_id();
        self.doc
            .select(&ID_SEL)
            .find(|el| el.value().id() == Some(id))
            .ok_or(ExtractError::MissingRegion(id))
    }

    /// Rebuilds the whole profile. Nothing is merged with a previous value.
    pub fn extract_profile(&self) -> Result<Profile, ExtractError> {
        Ok(Profile {
            name: self.region(Region::Name)?.inner_html().trim().to_string(),
            title: text_of(self.region(Region::Title)?),
            contact: self.icon_list(Region::Contact)?,
            social_media: self.icon_list(Region::Social)?,
            education: entries(self.region(Region::Education)?, Region::Education)
                .map(education_entry)
                .collect(),
            skills: self.string_list(Region::Skills)?,
            languages: self.string_list(Region::Languages)?,
            profile: self.paragraph(Region::Profile)?,
            work_experience: entries(self.region(Region::Work)?, Region::Work)
                .map(work_entry)
                .collect(),
            reference: self.paragraph(Region::Reference)?,
            certifications: self.named_list(Region::Certifications)?,
            projects: self.named_list(Region::Projects)?,
        })
    }

    /// Current values of the first phone and email inputs in the contact region.
    pub fn validated_inputs(&self) -> Result<Vec<(ValidatedField, String)>, ExtractError> {
        let contact = self.region(Region::Contact)?;
        let mut found = Vec::new();
        for field in [ValidatedField::Phone, ValidatedField::Email] {
            let input = contact
                .select(&INPUT_SEL)
                .find(|el| el.value().classes().any(|c| c == field.as_str()));
            if let Some(input) = input {
                let value = input.value().attr("value").unwrap_or_default();
                found.push((field, value.to_string()));
            }
        }
        Ok(found)
    }

    /// `src` of every image on the page, in document order.
    pub fn image_sources(&self) -> Vec<String> {
        self.doc
            .select(&IMG_SEL)
            .filter_map(|img| img.value().attr("src"))
            .map(str::to_string)
            .collect()
    }

    fn icon_list(&self, region: Region) -> Result<Vec<ContactItem>, ExtractError> {
        Ok(entries(self.region(region)?, region)
            .map(icon_entry)
            .collect())
    }

    fn string_list(&self, region: Region) -> Result<Vec<String>, ExtractError> {
        Ok(entries(self.region(region)?, region).map(text_of).collect())
    }

    fn paragraph(&self, region: Region) -> Result<String, ExtractError> {
        let el = self.region(region)?;
        Ok(with_role(el, role::PARAGRAPH)
            .map(text_of)
            .unwrap_or_default())
    }

    fn named_list(&self, region: Region) -> Result<Vec<NamedEntry>, ExtractError> {
        Ok(entries(self.region(region)?, region)
            .map(|entry| NamedEntry {
                name: with_role(entry, role::NAME)
                    .or_else(|| entry.select(&P_SEL).next())
                    .map(text_of)
                    .unwrap_or_default(),
                description: with_role(entry, role::DESCRIPTION)
                    .map(text_of)
                    .unwrap_or_default(),
            })
            .collect())
    }
}

fn entries<'a>(scope: ElementRef<'a>, region: Region) -> impl Iterator<Item = ElementRef<'a>> {
    let marker = region.entry_marker();
    scope
        .select(&ENTRY_SEL)
        .filter(move |el| el.value().attr(ATTR_ENTRY) == marker)
}

fn with_role<'a>(scope: ElementRef<'a>, role: &str) -> Option<ElementRef<'a>> {
    scope
        .select(&ROLE_SEL)
        .find(|el| el.value().attr(ATTR_ROLE) == Some(role))
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Text of the element's own text nodes, skipping anything nested.
fn direct_text(el: ElementRef<'_>) -> String {
    el.children()
        .filter_map(|node| node.value().as_text().map(|t| &**t))
        .collect::<String>()
        .trim()
        .to_string()
}

fn icon_entry(entry: ElementRef<'_>) -> ContactItem {
    let icon = entry
        .select(&IMG_SEL)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| src.strip_prefix(PHOTO_PREFIX).unwrap_or(src))
        .unwrap_or_default();
    let text = match entry.select(&INPUT_SEL).next() {
        Some(input) => input.value().attr("value").unwrap_or_default().trim().to_string(),
        None => direct_text(entry),
    };
    ContactItem::new(icon, text)
}

/// Leading emphasis is the period; the school is whatever follows the line
/// break. Without emphasis the whole entry is the school.
fn education_entry(entry: ElementRef<'_>) -> EducationEntry {
    let Some(period_el) = with_role(entry, role::PERIOD).or_else(|| entry.select(&STRONG_SEL).next())
    else {
        return EducationEntry {
            period: String::new(),
            school: text_of(entry),
        };
    };

    let mut school = String::new();
    let mut after_break = false;
    for sibling in period_el.next_siblings() {
        if after_break {
            match sibling.value() {
                Node::Text(t) => school.push_str(t),
                Node::Element(_) => {
                    if let Some(el) = ElementRef::wrap(sibling) {
                        school.extend(el.text());
                    }
                }
                _ => {}
            }
            continue;
        }
        match sibling.value() {
            Node::Element(el) if el.name() == "br" => after_break = true,
            Node::Text(t) => school.push_str(t),
            _ => {}
        }
    }

    EducationEntry {
        period: text_of(period_el),
        school: school.trim().to_string(),
    }
}

fn work_entry(entry: ElementRef<'_>) -> WorkEntry {
    let title = with_role(entry, role::TITLE)
        .or_else(|| entry.select(&P_SEL).next())
        .map(text_of)
        .unwrap_or_default();
    let details = entry
        .select(&ROLE_SEL)
        .filter(|el| el.value().attr(ATTR_ROLE) == Some(role::DETAIL))
        .map(text_of)
        .collect();
    WorkEntry { title, details }
}
