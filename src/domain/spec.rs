//! Slide specification types.
//!
//! [`PartialSpec`] is the wire shape every stage produces and consumes; it can
//! hold several content shapes at once. [`FinalSpec`] holds exactly one, as a
//! [`ContentShape`], and serializes back into the wire shape for the renderer.

use serde::{Deserialize, Serialize};

/// Slide layout identifiers understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    Title,
    #[default]
    TitleContent,
    TwoColumn,
    ImageLeft,
    ImageRight,
    FullImage,
    SectionHeader,
    Quote,
    Chart,
    Table,
    Blank,
}

impl Layout {
    pub const ALL: [Layout; 11] = [
        Layout::Title,
        Layout::TitleContent,
        Layout::TwoColumn,
        Layout::ImageLeft,
        Layout::ImageRight,
        Layout::FullImage,
        Layout::SectionHeader,
        Layout::Quote,
        Layout::Chart,
        Layout::Table,
        Layout::Blank,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Title => "title",
            Layout::TitleContent => "title-content",
            Layout::TwoColumn => "two-column",
            Layout::ImageLeft => "image-left",
            Layout::ImageRight => "image-right",
            Layout::FullImage => "full-image",
            Layout::SectionHeader => "section-header",
            Layout::Quote => "quote",
            Layout::Chart => "chart",
            Layout::Table => "table",
            Layout::Blank => "blank",
        }
    }

    /// Exact identifier lookup, as the schema accepts it.
    pub fn from_identifier(value: &str) -> Option<Layout> {
        Layout::ALL.into_iter().find(|layout| layout.as_str() == value)
    }

    /// Lenient lookup used by recovery: case, separators and common aliases.
    pub fn normalize(value: &str) -> Option<Layout> {
        let canonical = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let aliased = match canonical.as_str() {
            "title-and-content" | "content" | "title-body" => "title-content",
            "two-columns" | "comparison" => "two-column",
            "section" => "section-header",
            "title-only" | "title-slide" => "title",
            other => other,
        };
        Layout::from_identifier(aliased)
    }

    pub fn uses_image(&self) -> bool {
        matches!(self, Layout::ImageLeft | Layout::ImageRight | Layout::FullImage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
    Doughnut,
    Area,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Doughnut,
        ChartKind::Area,
        ChartKind::Scatter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Doughnut => "doughnut",
            ChartKind::Area => "area",
            ChartKind::Scatter => "scatter",
        }
    }

    pub fn from_identifier(value: &str) -> Option<ChartKind> {
        ChartKind::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(rename = "type", default)]
    pub kind: ChartKind,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    /// A chart with no plottable values cannot be rendered.
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|series| series.values.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|cell| cell.trim().is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteData {
    pub text: String,
    #[serde(default)]
    pub attribution: String,
}

impl QuoteData {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Presentation design values. Unset fields are left to the renderer's theme.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

impl DesignSettings {
    pub const FIELDS: [&'static str; 4] = ["theme", "backgroundColor", "accentColor", "fontFamily"];

    /// Returns `self` with every field set in `overrides` replaced.
    pub fn overlay(self, overrides: &DesignSettings) -> DesignSettings {
        DesignSettings {
            theme: overrides.theme.clone().or(self.theme),
            background_color: overrides.background_color.clone().or(self.background_color),
            accent_color: overrides.accent_color.clone().or(self.accent_color),
            font_family: overrides.font_family.clone().or(self.font_family),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.theme.is_none()
            && self.background_color.is_none()
            && self.accent_color.is_none()
            && self.font_family.is_none()
    }
}

/// Possibly-incomplete slide specification exchanged between stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSpec {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub paragraph: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuoteData>,
    #[serde(default)]
    pub image_prompt: String,
    #[serde(default)]
    pub speaker_notes: String,
    #[serde(default, skip_serializing_if = "DesignSettings::is_empty")]
    pub design: DesignSettings,
}

impl PartialSpec {
    /// Top-level field names accepted by the schema.
    pub const FIELDS: [&'static str; 11] = [
        "title",
        "subtitle",
        "layout",
        "bullets",
        "paragraph",
        "chart",
        "table",
        "quote",
        "imagePrompt",
        "speakerNotes",
        "design",
    ];

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            layout: Layout::default(),
            bullets: Vec::new(),
            paragraph: String::new(),
            chart: None,
            table: None,
            quote: None,
            image_prompt: String::new(),
            speaker_notes: String::new(),
            design: DesignSettings::default(),
        }
    }
}

/// Exactly one content shape of a finished slide.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentShape {
    Bullets(Vec<String>),
    Paragraph(String),
    Chart(ChartData),
    Table(TableData),
    Quote(QuoteData),
}

/// Validated, enforced slide specification handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "PartialSpec")]
pub struct FinalSpec {
    pub title: String,
    pub subtitle: String,
    pub layout: Layout,
    pub content: ContentShape,
    pub image_prompt: String,
    pub speaker_notes: String,
    pub design: DesignSettings,
}

impl From<FinalSpec> for PartialSpec {
    fn from(spec: FinalSpec) -> Self {
        let mut partial = PartialSpec {
            subtitle: spec.subtitle,
            layout: spec.layout,
            image_prompt: spec.image_prompt,
            speaker_notes: spec.speaker_notes,
            design: spec.design,
            ..PartialSpec::titled(spec.title)
        };
        match spec.content {
            ContentShape::Bullets(bullets) => partial.bullets = bullets,
            ContentShape::Paragraph(paragraph) => partial.paragraph = paragraph,
            ContentShape::Chart(chart) => partial.chart = Some(chart),
            ContentShape::Table(table) => partial.table = Some(table),
            ContentShape::Quote(quote) => partial.quote = Some(quote),
        }
        partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_normalization_accepts_aliases_and_separators() {
        assert_eq!(Layout::normalize("Two_Column"), Some(Layout::TwoColumn));
        assert_eq!(Layout::normalize("title and content"), Some(Layout::TitleContent));
        assert_eq!(Layout::normalize("hexagon"), None);
        assert_eq!(Layout::from_identifier("Two_Column"), None);
    }

    #[test]
    fn design_overlay_prefers_overrides() {
        let model = DesignSettings {
            theme: Some("ocean".into()),
            accent_color: Some("#112233".into()),
            ..DesignSettings::default()
        };
        let overrides =
            DesignSettings { theme: Some("corporate".into()), ..DesignSettings::default() };

        let merged = model.overlay(&overrides);
        assert_eq!(merged.theme.as_deref(), Some("corporate"));
        assert_eq!(merged.accent_color.as_deref(), Some("#112233"));
    }

    #[test]
    fn final_spec_serializes_single_shape_in_wire_format() {
        let spec = FinalSpec {
            title: "Roadmap".into(),
            subtitle: String::new(),
            layout: Layout::Quote,
            content: ContentShape::Quote(QuoteData {
                text: "Ship it".into(),
                attribution: "Team".into(),
            }),
            image_prompt: String::new(),
            speaker_notes: String::new(),
            design: DesignSettings::default(),
        };

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["layout"], "quote");
        assert_eq!(value["quote"]["text"], "Ship it");
        assert_eq!(value["bullets"], serde_json::json!([]));
        assert_eq!(value["paragraph"], "");
        assert!(value.get("chart").is_none());
    }
}
