//! Renderer: pure functions from a [`Profile`] and a [`PageView`] to markup.
//!
//! Every list entry gets a `data-entry` wrapper and every field a `data-role`
//! marker so that [`crate::page::extract`] can invert the output without
//! guessing from element positions. Text is escaped; only `name` is injected
//! as markup.

use std::fmt;

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::{Deserialize, Serialize};

use crate::editing::validation::{check_field, ValidatedField};
use crate::models::profile::{ContactItem, EducationEntry, IconKind, NamedEntry, Profile, WorkEntry};
use crate::page::schema::{role, EnterKey, Region, Shape, ATTR_ENTER, ATTR_ENTRY, ATTR_ROLE, PHOTO_PREFIX};

/// The two UI states of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    Viewing,
    Editing,
}

impl EditMode {
    pub fn is_editing(self) -> bool {
        self == EditMode::Editing
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EditMode::Viewing => "viewing",
            EditMode::Editing => "editing",
        }
    }
}

/// Text of the edit/save toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlLabel {
    #[default]
    Edit,
    Save,
    /// Transient confirmation after a successful save.
    Saved,
}

impl fmt::Display for ControlLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlLabel::Edit => f.write_str("Edit"),
            ControlLabel::Save => f.write_str("Save"),
            ControlLabel::Saved => f.write_str("Saved"),
        }
    }
}

/// Everything besides the profile that changes the rendered markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageView {
    pub mode: EditMode,
    /// Collapsible sections open.
    pub expanded: bool,
    pub label: ControlLabel,
    pub reset_enabled: bool,
}

#[cfg(test)]
impl PageView {
    pub fn editing() -> Self {
        Self {
            mode: EditMode::Editing,
            expanded: true,
            label: ControlLabel::Save,
            reset_enabled: false,
        }
    }
}

impl PageView {
    fn text_surface(&self) -> String {
        let mut attrs = format!(r#" contenteditable="{}""#, self.mode.is_editing());
        if let Some(enter) = self.enter_key(false).attr_value() {
            attrs.push_str(&format!(r#" {ATTR_ENTER}="{enter}""#));
        }
        attrs
    }

    /// Line-break key behaviour for a text surface or an input.
    pub fn enter_key(&self, is_input: bool) -> EnterKey {
        match (self.mode, is_input) {
            (EditMode::Viewing, _) => EnterKey::Default,
            (EditMode::Editing, true) => EnterKey::Suppress,
            (EditMode::Editing, false) => EnterKey::LineBreak,
        }
    }
}

/// Inner markup of one region.
pub fn render_region(profile: &Profile, region: Region, view: &PageView) -> String {
    match region.shape() {
        Shape::RichText => profile.name.clone(),
        Shape::PlainText => encode_text(&profile.title).into_owned(),
        Shape::IconList => {
            let items = match region {
                Region::Social => &profile.social_media,
                _ => &profile.contact,
            };
            items
                .iter()
                .map(|item| render_icon_entry(item, region, view))
                .collect()
        }
        Shape::Education => profile
            .education
            .iter()
            .map(|e| render_education(e, view))
            .collect(),
        Shape::StringList => {
            let items = match region {
                Region::Languages => &profile.languages,
                _ => &profile.skills,
            };
            render_string_list(items, region, view)
        }
        Shape::Paragraph => {
            let text = match region {
                Region::Reference => &profile.reference,
                _ => &profile.profile,
            };
            format!(
                r#"<p {ATTR_ROLE}="{}"{}>{}</p>"#,
                role::PARAGRAPH,
                view.text_surface(),
                encode_text(text)
            )
        }
        Shape::Work => profile
            .work_experience
            .iter()
            .map(|w| render_work(w, view))
            .collect(),
        Shape::Named => {
            let items = match region {
                Region::Projects => &profile.projects,
                _ => &profile.certifications,
            };
            items
                .iter()
                .map(|n| render_named(n, region, view))
                .collect()
        }
    }
}

/// Inner markup of every region keyed by DOM id, for re-applying to a live page.
pub fn render_regions(profile: &Profile, view: &PageView) -> Vec<(&'static str, String)> {
    Region::ALL
        .iter()
        .map(|&r| (r.dom_id(), render_region(profile, r, view)))
        .collect()
}

fn entry_marker(region: Region) -> &'static str {
    region.entry_marker().unwrap_or_default()
}

fn validated_field(kind: IconKind) -> Option<ValidatedField> {
    match kind {
        IconKind::Phone => Some(ValidatedField::Phone),
        IconKind::Email => Some(ValidatedField::Email),
        IconKind::Location | IconKind::Other => None,
    }
}

fn render_icon_entry(item: &ContactItem, region: Region, view: &PageView) -> String {
    let kind = item.kind();
    let src = encode_double_quoted_attribute(&item.icon);
    let marker = entry_marker(region);

    if region.allows_inputs() && kind.is_input() {
        let mut classes = kind.css_class().to_string();
        match view.mode {
            EditMode::Viewing => classes.push_str(" disabled-look"),
            EditMode::Editing => {
                // Pre-filled values are checked as soon as editing starts.
                let invalid = validated_field(kind)
                    .map(|field| check_field(field, &item.text).blocks_save())
                    .unwrap_or(false);
                if invalid {
                    classes.push_str(" invalid");
                }
            }
        }
        let state = match view.enter_key(true).attr_value() {
            Some(enter) => format!(r#" {ATTR_ENTER}="{enter}""#),
            None => " disabled".to_string(),
        };
        format!(
            r#"<div class="editable entry" {ATTR_ENTRY}="{marker}"><img src="{PHOTO_PREFIX}{src}" alt="{alt}" class="icon" {ATTR_ROLE}="{icon_role}"><input type="text" class="{classes}" {ATTR_ROLE}="{text_role}" value="{value}"{state}></div>"#,
            alt = kind.css_class(),
            icon_role = role::ICON,
            text_role = role::TEXT,
            value = encode_double_quoted_attribute(&item.text),
        )
    } else {
        let class = if kind == IconKind::Location {
            " address-field"
        } else {
            ""
        };
        format!(
            r#"<p class="editable entry{class}" {ATTR_ENTRY}="{marker}"{surface}><img src="{PHOTO_PREFIX}{src}" alt="icon" class="icon" {ATTR_ROLE}="{icon_role}">{text}</p>"#,
            surface = view.text_surface(),
            icon_role = role::ICON,
            text = encode_text(&item.text),
        )
    }
}

fn render_education(entry: &EducationEntry, view: &PageView) -> String {
    format!(
        r#"<p class="entry" {ATTR_ENTRY}="{marker}"{surface}><strong {ATTR_ROLE}="{period_role}">{period}</strong><br>{school}</p>"#,
        marker = entry_marker(Region::Education),
        surface = view.text_surface(),
        period_role = role::PERIOD,
        period = encode_text(&entry.period),
        school = encode_text(&entry.school),
    )
}

fn render_string_list(items: &[String], region: Region, view: &PageView) -> String {
    let marker = entry_marker(region);
    let surface = view.text_surface();
    let mut html = String::from(r#"<ul class="plain-list">"#);
    for item in items {
        html.push_str(&format!(
            r#"<li {ATTR_ENTRY}="{marker}"{surface}>{}</li>"#,
            encode_text(item)
        ));
    }
    html.push_str("</ul>");
    html
}

fn render_work(entry: &WorkEntry, view: &PageView) -> String {
    let surface = view.text_surface();
    let mut html = format!(
        r#"<div class="entry" {ATTR_ENTRY}="{marker}"><p {ATTR_ROLE}="{title_role}"{surface}><strong>{title}</strong></p><ul class="plain-list">"#,
        marker = entry_marker(Region::Work),
        title_role = role::TITLE,
        title = encode_text(&entry.title),
    );
    for detail in &entry.details {
        html.push_str(&format!(
            r#"<li {ATTR_ROLE}="{}"{surface}>{}</li>"#,
            role::DETAIL,
            encode_text(detail)
        ));
    }
    html.push_str("</ul></div>");
    html
}

fn render_named(entry: &NamedEntry, region: Region, view: &PageView) -> String {
    let surface = view.text_surface();
    format!(
        r#"<div class="entry" {ATTR_ENTRY}="{marker}"><p {ATTR_ROLE}="{name_role}"{surface}><strong>{name}</strong></p><p {ATTR_ROLE}="{desc_role}"{surface}>{description}</p></div>"#,
        marker = entry_marker(region),
        name_role = role::NAME,
        desc_role = role::DESCRIPTION,
        name = encode_text(&entry.name),
        description = encode_text(&entry.description),
    )
}

/// Full page document: header regions, toggles and one collapsible section per list region.
pub fn render_page(profile: &Profile, view: &PageView) -> String {
    let surface = view.text_surface();
    let reset = if view.reset_enabled {
        r#"<button id="resetBtn" type="button">Reset</button>"#
    } else {
        ""
    };
    let panel_class = if view.expanded {
        "accordion-panel active"
    } else {
        "accordion-panel"
    };

    let mut sections = String::new();
    for region in Region::SECTIONS {
        sections.push_str(&format!(
            r#"<section class="section"><button class="accordion-btn" type="button">{heading}</button><div class="{panel_class}"><div id="{id}">{inner}</div></div></section>"#,
            heading = region.heading(),
            id = region.dom_id(),
            inner = render_region(profile, region, view),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>CV</title>
<link rel="stylesheet" href="style.css">
</head>
<body data-mode="{mode}">
<div class="container">
<header class="header">
<img src="{PHOTO_PREFIX}profile.png" alt="profile photo" class="avatar">
<h1 id="{name_id}"{surface}>{name}</h1>
<h3 id="{title_id}"{surface}>{title}</h3>
<div class="controls"><button id="editBtn" type="button">{label}</button>{reset}<button id="downloadBtn" type="button">Download</button></div>
</header>
<main class="content">{sections}</main>
</div>
<script src="script.js"></script>
</body>
</html>
"#,
        mode = view.mode.as_str(),
        name_id = Region::Name.dom_id(),
        title_id = Region::Title.dom_id(),
        name = render_region(profile, Region::Name, view),
        title = render_region(profile, Region::Title, view),
        label = view.label,
    )
}
