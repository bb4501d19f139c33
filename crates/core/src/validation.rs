//! Ordered, short-circuiting form validation.
//!
//! Rules run in a fixed order: basic info first (title, slug, body, meta
//! fields), then each present section in [`SectionKind::ALL`] order. The
//! first violation stops validation and is returned as a single
//! [`ValidationFailure`] naming the field to focus and the tab it lives on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{EditableRecord, Project};
use crate::sections::{InfoItem, SectionKind, SectionsData};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum length of any title (record or section).
pub const TITLE_MAX_LEN: usize = 40;

/// Hero section description bounds.
pub const HERO_DESCRIPTION_LEN: (usize, usize) = (100, 400);

/// Info section description bounds.
pub const INFO_DESCRIPTION_LEN: (usize, usize) = (100, 1000);

/// Team section description bounds (only checked when non-empty).
pub const TEAM_DESCRIPTION_LEN: (usize, usize) = (100, 400);

/// Maximum length of sub-section long text (item descriptions, quotes,
/// bios, comments).
pub const SUB_TEXT_MAX_LEN: usize = 400;

pub const RATING_RANGE: (u8, u8) = (1, 5);

pub const MSG_TITLE_SLUG_REQUIRED: &str = "Title and slug are required";
pub const MSG_SLUG_FORMAT: &str = "Slug must contain only lowercase letters, numbers, and hyphens";

// ---------------------------------------------------------------------------
// Tabs and failures
// ---------------------------------------------------------------------------

/// Tabs of the multi-section editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormTab {
    #[default]
    BasicInfo,
    Images,
    Sections,
}

impl FormTab {
    pub fn label(self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Info",
            Self::Images => "Images",
            Self::Sections => "Sections",
        }
    }

    /// Tab holding the input for a field path or backend field name.
    /// Returns `None` for names the form does not know.
    pub fn for_field(field: &str) -> Option<FormTab> {
        const BASIC: &[&str] = &[
            "title",
            "slug",
            "content",
            "description",
            "excerpt",
            "meta_title",
            "meta_description",
            "published",
            "tag_ids",
            "client_name",
            "project_url",
        ];
        const IMAGES: &[&str] = &["images", "image_files", "og_image", "og_image_file", "image_file"];

        if BASIC.contains(&field) {
            return Some(FormTab::BasicInfo);
        }
        if IMAGES.contains(&field) {
            return Some(FormTab::Images);
        }
        if field == "sections_data"
            || field.starts_with("sections_data.")
            || field == "hero_section_image_file"
            || SectionKind::ALL
                .iter()
                .any(|k| field.starts_with(&format!("{}_", k.key())))
        {
            return Some(FormTab::Sections);
        }
        None
    }
}

impl fmt::Display for FormTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The first rule violation found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Path of the offending input, e.g. `title` or
    /// `sections_data.team_section.sub_sections.0.name`.
    pub field: String,
    pub tab: FormTab,
    pub message: String,
}

impl ValidationFailure {
    fn new(field: impl Into<String>, tab: FormTab, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            tab,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub type RuleResult = Result<(), ValidationFailure>;

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

/// Lowercase ASCII letters, digits and hyphens only.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Derive a slug from a title: lowercase, non-alphanumerics become single
/// hyphens, no leading or trailing hyphen.
pub fn generate_slug(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut prev_hyphen = true;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }
    result.trim_end_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// Rule helpers
// ---------------------------------------------------------------------------

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn require(value: &str, field: &str, tab: FormTab, message: String) -> RuleResult {
    if is_blank(value) {
        return Err(ValidationFailure::new(field, tab, message));
    }
    Ok(())
}

fn max_len(value: &str, max: usize, field: &str, tab: FormTab, message: String) -> RuleResult {
    if char_len(value) > max {
        return Err(ValidationFailure::new(field, tab, message));
    }
    Ok(())
}

fn len_between(
    value: &str,
    (min, max): (usize, usize),
    field: &str,
    tab: FormTab,
    what: &str,
) -> RuleResult {
    let len = char_len(value);
    if len < min || len > max {
        return Err(ValidationFailure::new(
            field,
            tab,
            format!("{what} must be between {min} and {max} characters"),
        ));
    }
    Ok(())
}

fn title_rules(title: &str, field: &str, tab: FormTab, what: &str) -> RuleResult {
    require(title, field, tab, format!("{what} title is required"))?;
    max_len(
        title,
        TITLE_MAX_LEN,
        field,
        tab,
        format!("{what} title must be {TITLE_MAX_LEN} characters or less"),
    )
}

// ---------------------------------------------------------------------------
// Record validation
// ---------------------------------------------------------------------------

/// Required title and slug, title length, slug format. Shared by every form.
fn title_and_slug(title: &str, slug: &str) -> RuleResult {
    let tab = FormTab::BasicInfo;
    if is_blank(title) || is_blank(slug) {
        let field = if is_blank(title) { "title" } else { "slug" };
        return Err(ValidationFailure::new(field, tab, MSG_TITLE_SLUG_REQUIRED));
    }
    max_len(
        title,
        TITLE_MAX_LEN,
        "title",
        tab,
        format!("title must be {TITLE_MAX_LEN} characters or less"),
    )?;
    if !is_valid_slug(slug) {
        return Err(ValidationFailure::new("slug", tab, MSG_SLUG_FORMAT));
    }
    Ok(())
}

/// Validate a multi-section record. Returns the first violation.
pub fn validate_record<R: EditableRecord>(record: &R) -> RuleResult {
    let basic = record.basic_info();
    let tab = FormTab::BasicInfo;

    title_and_slug(basic.title, basic.slug)?;
    require(
        basic.body,
        R::BODY_FIELD,
        tab,
        format!("{} is required", R::BODY_LABEL),
    )?;
    require(basic.meta_title, "meta_title", tab, "Meta title is required".into())?;
    require(
        basic.meta_description,
        "meta_description",
        tab,
        "Meta description is required".into(),
    )?;

    match record.sections() {
        Some(sections) => validate_sections(sections),
        None => Ok(()),
    }
}

/// Validate the simple project form: title/slug/description.
pub fn validate_project(project: &Project) -> RuleResult {
    title_and_slug(&project.title, &project.slug)?;
    require(
        &project.description,
        "description",
        FormTab::BasicInfo,
        "Description is required".into(),
    )
}

// ---------------------------------------------------------------------------
// Section validation
// ---------------------------------------------------------------------------

fn section_path(kind: SectionKind, rest: &str) -> String {
    format!("sections_data.{}.{rest}", kind.key())
}

fn item_path(kind: SectionKind, index: usize, field: &str) -> String {
    section_path(kind, &format!("sub_sections.{index}.{field}"))
}

/// Validate every present section, in fixed order.
pub fn validate_sections(data: &SectionsData) -> RuleResult {
    let tab = FormTab::Sections;

    if let Some(hero) = &data.hero_section {
        let kind = SectionKind::HeroSection;
        title_rules(&hero.title, &section_path(kind, "title"), tab, kind.label())?;
        require(
            &hero.description,
            &section_path(kind, "description"),
            tab,
            format!("{} description is required", kind.label()),
        )?;
        len_between(
            &hero.description,
            HERO_DESCRIPTION_LEN,
            &section_path(kind, "description"),
            tab,
            &format!("{} description", kind.label()),
        )?;
        info_items(kind, &hero.sub_sections)?;
    }

    if let Some(info) = &data.info_section {
        let kind = SectionKind::InfoSection;
        title_rules(&info.title, &section_path(kind, "title"), tab, kind.label())?;
        require(
            &info.description,
            &section_path(kind, "description"),
            tab,
            format!("{} description is required", kind.label()),
        )?;
        len_between(
            &info.description,
            INFO_DESCRIPTION_LEN,
            &section_path(kind, "description"),
            tab,
            &format!("{} description", kind.label()),
        )?;
        info_items(kind, &info.sub_sections)?;
    }

    if let Some(quote) = &data.quote_section {
        let kind = SectionKind::QuoteSection;
        title_rules(&quote.title, &section_path(kind, "title"), tab, kind.label())?;
        for (i, item) in quote.sub_sections.iter().enumerate() {
            let n = i + 1;
            require(
                &item.quote,
                &item_path(kind, i, "quote"),
                tab,
                format!("Quote {n}: quote text is required"),
            )?;
            max_len(
                &item.quote,
                SUB_TEXT_MAX_LEN,
                &item_path(kind, i, "quote"),
                tab,
                format!("Quote {n}: quote must be {SUB_TEXT_MAX_LEN} characters or less"),
            )?;
            require(
                &item.author,
                &item_path(kind, i, "author"),
                tab,
                format!("Quote {n}: author is required"),
            )?;
        }
    }

    if let Some(team) = &data.team_section {
        let kind = SectionKind::TeamSection;
        title_rules(&team.title, &section_path(kind, "title"), tab, kind.label())?;
        if !is_blank(&team.description) {
            len_between(
                &team.description,
                TEAM_DESCRIPTION_LEN,
                &section_path(kind, "description"),
                tab,
                &format!("{} description", kind.label()),
            )?;
        }
        for (i, member) in team.sub_sections.iter().enumerate() {
            let n = i + 1;
            require(
                &member.name,
                &item_path(kind, i, "name"),
                tab,
                format!("Team member {n}: name is required"),
            )?;
            require(
                &member.role,
                &item_path(kind, i, "role"),
                tab,
                format!("Team member {n}: role is required"),
            )?;
            max_len(
                &member.bio,
                SUB_TEXT_MAX_LEN,
                &item_path(kind, i, "bio"),
                tab,
                format!("Team member {n}: bio must be {SUB_TEXT_MAX_LEN} characters or less"),
            )?;
        }
    }

    if let Some(testimonials) = &data.testimonial_section {
        let kind = SectionKind::TestimonialSection;
        title_rules(
            &testimonials.title,
            &section_path(kind, "title"),
            tab,
            kind.label(),
        )?;
        for (i, t) in testimonials.sub_sections.iter().enumerate() {
            let n = i + 1;
            require(
                &t.name,
                &item_path(kind, i, "name"),
                tab,
                format!("Testimonial {n}: name is required"),
            )?;
            let (lo, hi) = RATING_RANGE;
            if t.rating < lo || t.rating > hi {
                return Err(ValidationFailure::new(
                    item_path(kind, i, "rating"),
                    tab,
                    format!("Testimonial {n}: rating must be between {lo} and {hi}"),
                ));
            }
            require(
                &t.comment,
                &item_path(kind, i, "comment"),
                tab,
                format!("Testimonial {n}: comment is required"),
            )?;
            max_len(
                &t.comment,
                SUB_TEXT_MAX_LEN,
                &item_path(kind, i, "comment"),
                tab,
                format!("Testimonial {n}: comment must be {SUB_TEXT_MAX_LEN} characters or less"),
            )?;
        }
    }

    Ok(())
}

fn info_items(kind: SectionKind, items: &[InfoItem]) -> RuleResult {
    let tab = FormTab::Sections;
    for (i, item) in items.iter().enumerate() {
        let what = format!("{} item {}:", kind.label(), i + 1);
        require(
            &item.title,
            &item_path(kind, i, "title"),
            tab,
            format!("{what} title is required"),
        )?;
        max_len(
            &item.title,
            TITLE_MAX_LEN,
            &item_path(kind, i, "title"),
            tab,
            format!("{what} title must be {TITLE_MAX_LEN} characters or less"),
        )?;
        require(
            &item.description,
            &item_path(kind, i, "description"),
            tab,
            format!("{what} description is required"),
        )?;
        max_len(
            &item.description,
            SUB_TEXT_MAX_LEN,
            &item_path(kind, i, "description"),
            tab,
            format!("{what} description must be {SUB_TEXT_MAX_LEN} characters or less"),
        )?;
    }
    Ok(())
}
