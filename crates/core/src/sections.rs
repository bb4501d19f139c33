//! Structured page sections attached to blogs, services and industries.
//!
//! The backend stores sections as a JSON object keyed by section name.
//! [`SectionsData`] models that object as a closed set of optional,
//! statically typed sections serialized under the same keys.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Section kinds
// ---------------------------------------------------------------------------

/// Known section identifiers, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    HeroSection,
    InfoSection,
    QuoteSection,
    TeamSection,
    TestimonialSection,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        Self::HeroSection,
        Self::InfoSection,
        Self::QuoteSection,
        Self::TeamSection,
        Self::TestimonialSection,
    ];

    /// JSON key under `sections_data`.
    pub fn key(self) -> &'static str {
        match self {
            Self::HeroSection => "hero_section",
            Self::InfoSection => "info_section",
            Self::QuoteSection => "quote_section",
            Self::TeamSection => "team_section",
            Self::TestimonialSection => "testimonial_section",
        }
    }

    /// Human-readable label used in validation messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::HeroSection => "Hero section",
            Self::InfoSection => "Info section",
            Self::QuoteSection => "Quote section",
            Self::TeamSection => "Team section",
            Self::TestimonialSection => "Testimonial section",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

// ---------------------------------------------------------------------------
// Sub-section entries
// ---------------------------------------------------------------------------

/// Title + description entry (hero and info sections).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// URL of an already-uploaded icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub author: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(default)]
    pub name: String,
    /// Star rating, 1-5.
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeroSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub sub_sections: Vec<InfoItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sub_sections: Vec<InfoItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sub_sections: Vec<QuoteItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sub_sections: Vec<TeamMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestimonialSection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sub_sections: Vec<Testimonial>,
}

/// Borrowed, kind-tagged view of one section.
#[derive(Debug, Clone, Copy)]
pub enum Section<'a> {
    Hero(&'a HeroSection),
    Info(&'a InfoSection),
    Quote(&'a QuoteSection),
    Team(&'a TeamSection),
    Testimonial(&'a TestimonialSection),
}

impl Section<'_> {
    pub fn kind(&self) -> SectionKind {
        match self {
            Section::Hero(_) => SectionKind::HeroSection,
            Section::Info(_) => SectionKind::InfoSection,
            Section::Quote(_) => SectionKind::QuoteSection,
            Section::Team(_) => SectionKind::TeamSection,
            Section::Testimonial(_) => SectionKind::TestimonialSection,
        }
    }
}

/// All structured sections of a record. Absent sections are omitted from
/// the serialized object; unknown keys from the backend are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionsData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_section: Option<HeroSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_section: Option<InfoSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_section: Option<QuoteSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_section: Option<TeamSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testimonial_section: Option<TestimonialSection>,
}

impl SectionsData {
    /// Present sections in [`SectionKind::ALL`] order.
    pub fn sections(&self) -> Vec<Section<'_>> {
        let mut out = Vec::new();
        if let Some(s) = &self.hero_section {
            out.push(Section::Hero(s));
        }
        if let Some(s) = &self.info_section {
            out.push(Section::Info(s));
        }
        if let Some(s) = &self.quote_section {
            out.push(Section::Quote(s));
        }
        if let Some(s) = &self.team_section {
            out.push(Section::Team(s));
        }
        if let Some(s) = &self.testimonial_section {
            out.push(Section::Testimonial(s));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.sections().is_empty()
    }

    pub fn contains(&self, kind: SectionKind) -> bool {
        self.sections().iter().any(|s| s.kind() == kind)
    }
}
