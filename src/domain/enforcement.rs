//! Content enforcement: collapse a partial spec into exactly one content shape.

use crate::domain::{
    ChartData, ChartKind, ChartSeries, ContentShape, ContentType, FinalSpec, GenerationParams,
    Layout, PartialSpec, QuoteData, TableData, recovery::PLACEHOLDER_TITLE,
};

const PLACEHOLDER_BULLETS: [&str; 3] = ["Key point one", "Key point two", "Key point three"];
pub const PLACEHOLDER_PARAGRAPH: &str = "Content for this slide will be provided by the presenter.";
const PLACEHOLDER_QUOTE: &str = "The best way to predict the future is to create it.";
const PLACEHOLDER_ATTRIBUTION: &str = "Unknown";
const MAX_DERIVED_BULLETS: usize = 5;
const MAX_PLACEHOLDER_TITLE_CHARS: usize = 80;

/// Enforce the content shape requested by `params` (bullets when unset).
pub fn enforce(spec: PartialSpec, params: &GenerationParams) -> FinalSpec {
    enforce_as(spec, params.effective_content_type(), params.with_image)
}

/// Pure mapping from (chosen shape, spec) to a renderable [`FinalSpec`].
pub fn enforce_as(spec: PartialSpec, shape: ContentType, with_image: bool) -> FinalSpec {
    let PartialSpec {
        title,
        subtitle,
        layout,
        bullets,
        paragraph,
        chart,
        table,
        quote,
        image_prompt,
        speaker_notes,
        design,
    } = spec;

    let content = match shape {
        ContentType::Bullets => ContentShape::Bullets(bullets_or_derived(bullets, &paragraph)),
        ContentType::Paragraph => ContentShape::Paragraph(paragraph_or_derived(paragraph, &bullets)),
        ContentType::Chart => ContentShape::Chart(
            chart.filter(|chart| !chart.is_empty()).unwrap_or_else(placeholder_chart),
        ),
        ContentType::Table => ContentShape::Table(
            table.filter(|table| !table.is_empty()).unwrap_or_else(|| placeholder_table(&bullets)),
        ),
        ContentType::Quote => ContentShape::Quote(
            quote
                .filter(|quote| !quote.is_empty())
                .map(|quote| QuoteData { text: quote.text.trim().to_string(), ..quote })
                .unwrap_or_else(placeholder_quote),
        ),
    };

    let title = match title.trim() {
        "" => PLACEHOLDER_TITLE.to_string(),
        trimmed => trimmed.to_string(),
    };

    FinalSpec {
        title,
        subtitle,
        layout: align_layout(layout, shape, with_image),
        content,
        image_prompt: if with_image { image_prompt } else { String::new() },
        speaker_notes,
        design,
    }
}

/// Minimal spec built from the raw prompt when the content stage cannot produce one.
pub fn placeholder_spec(prompt: &str) -> PartialSpec {
    let topic = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
    let title = truncate_at_word(&topic, MAX_PLACEHOLDER_TITLE_CHARS);

    PartialSpec {
        paragraph: if topic.is_empty() {
            PLACEHOLDER_PARAGRAPH.to_string()
        } else {
            format!("{} {}", PLACEHOLDER_PARAGRAPH, topic)
        },
        ..PartialSpec::titled(if title.is_empty() { PLACEHOLDER_TITLE.to_string() } else { title })
    }
}

fn bullets_or_derived(bullets: Vec<String>, paragraph: &str) -> Vec<String> {
    let kept: Vec<String> = bullets
        .into_iter()
        .map(|bullet| bullet.trim().to_string())
        .filter(|bullet| !bullet.is_empty())
        .collect();
    if !kept.is_empty() {
        return kept;
    }

    let sentences = split_sentences(paragraph);
    if !sentences.is_empty() {
        return sentences.into_iter().take(MAX_DERIVED_BULLETS).collect();
    }

    PLACEHOLDER_BULLETS.iter().map(|bullet| bullet.to_string()).collect()
}

fn paragraph_or_derived(paragraph: String, bullets: &[String]) -> String {
    let trimmed = paragraph.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    let sentences: Vec<String> = bullets
        .iter()
        .map(|bullet| bullet.trim())
        .filter(|bullet| !bullet.is_empty())
        .map(|bullet| {
            if bullet.ends_with(['.', '!', '?']) { bullet.to_string() } else { format!("{}.", bullet) }
        })
        .collect();
    if sentences.is_empty() { PLACEHOLDER_PARAGRAPH.to_string() } else { sentences.join(" ") }
}

fn placeholder_chart() -> ChartData {
    ChartData {
        kind: ChartKind::Bar,
        labels: vec!["Q1".into(), "Q2".into(), "Q3".into(), "Q4".into()],
        series: vec![ChartSeries { name: "Series 1".into(), values: vec![10.0, 20.0, 30.0, 40.0] }],
    }
}

fn placeholder_table(bullets: &[String]) -> TableData {
    let mut rows: Vec<Vec<String>> = bullets
        .iter()
        .map(|bullet| bullet.trim())
        .filter(|bullet| !bullet.is_empty())
        .enumerate()
        .map(|(index, bullet)| vec![format!("{}", index + 1), bullet.to_string()])
        .collect();
    if rows.is_empty() {
        rows = (1..=3).map(|index| vec![index.to_string(), format!("Item {}", index)]).collect();
    }
    TableData { headers: vec!["#".into(), "Item".into()], rows }
}

fn placeholder_quote() -> QuoteData {
    QuoteData { text: PLACEHOLDER_QUOTE.into(), attribution: PLACEHOLDER_ATTRIBUTION.into() }
}

fn align_layout(layout: Layout, shape: ContentType, with_image: bool) -> Layout {
    let layout = if !with_image && layout.uses_image() { Layout::TitleContent } else { layout };
    match (shape, layout) {
        (ContentType::Chart, _) => Layout::Chart,
        (ContentType::Table, _) => Layout::Table,
        (ContentType::Quote, _) => Layout::Quote,
        (ContentType::Bullets | ContentType::Paragraph, Layout::Chart | Layout::Table | Layout::Quote) => {
            Layout::TitleContent
        }
        (_, other) => other,
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?' | '\n') {
            let sentence = current.trim().trim_end_matches('\n').trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }
    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(index) if index > 0 => format!("{}…", &cut[..index]),
        _ => format!("{}…", cut),
    }
}
