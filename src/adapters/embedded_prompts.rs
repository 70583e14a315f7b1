//! Prompt catalog backed by templates embedded at build time.

use include_dir::{Dir, include_dir};
use minijinja::{Environment, UndefinedBehavior, context};

use crate::domain::{AppError, GenerationParams, StageName};
use crate::ports::PromptCatalog;

static PROMPTS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets/prompts");

const SYSTEM_FILE: &str = "system.md";
const TEMPLATE_SUFFIX: &str = ".md.j2";

/// Renders the embedded `src/assets/prompts/*.md.j2` templates.
#[derive(Debug)]
pub struct EmbeddedPromptCatalog {
    env: Environment<'static>,
    system: &'static str,
}

impl EmbeddedPromptCatalog {
    pub fn new() -> Result<Self, AppError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);

        for file in PROMPTS_DIR.files() {
            let Some(name) = file.path().to_str() else {
                continue;
            };
            if !name.ends_with(TEMPLATE_SUFFIX) {
                continue;
            }
            let source = file.contents_utf8().ok_or_else(|| AppError::PromptTemplate {
                template: name.to_string(),
                details: "template is not valid UTF-8".to_string(),
            })?;
            env.add_template(name, source).map_err(|e| AppError::PromptTemplate {
                template: name.to_string(),
                details: e.to_string(),
            })?;
        }

        let system = PROMPTS_DIR
            .get_file(SYSTEM_FILE)
            .and_then(|file| file.contents_utf8())
            .ok_or_else(|| AppError::PromptTemplate {
                template: SYSTEM_FILE.to_string(),
                details: "embedded system instruction is missing".to_string(),
            })?;

        Ok(Self { env, system: system.trim_end() })
    }
}

fn template_name(stage: StageName) -> &'static str {
    match stage {
        StageName::Content => "content.md.j2",
        StageName::Layout => "layout.md.j2",
        StageName::Image => "image.md.j2",
        StageName::Refinement => "refine.md.j2",
    }
}

impl PromptCatalog for EmbeddedPromptCatalog {
    fn system_instruction(&self) -> &str {
        self.system
    }

    fn stage_prompt(&self, stage: StageName, params: &GenerationParams) -> Result<String, AppError> {
        let name = template_name(stage);
        let template = self.env.get_template(name).map_err(|e| AppError::PromptTemplate {
            template: name.to_string(),
            details: e.to_string(),
        })?;

        let rendered = template
            .render(context! {
                prompt => params.prompt.trim(),
                audience => params.audience.as_str(),
                tone => params.tone.as_str(),
                length => params.length.as_str(),
                length_hint => params.length.item_hint(),
                content_type => params.content_type.map(|content_type| content_type.as_str()),
                with_image => params.with_image,
            })
            .map_err(|e| AppError::PromptTemplate {
                template: name.to_string(),
                details: e.to_string(),
            })?;

        Ok(rendered.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentType;

    fn catalog() -> EmbeddedPromptCatalog {
        EmbeddedPromptCatalog::new().expect("embedded prompts load")
    }

    #[test]
    fn every_stage_has_a_template() {
        let catalog = catalog();
        let params = GenerationParams::new("Launch a new product");
        for stage in StageName::ALL {
            let prompt = catalog.stage_prompt(stage, &params).unwrap();
            assert!(!prompt.is_empty(), "{} prompt is empty", stage);
        }
    }

    #[test]
    fn content_prompt_carries_params() {
        let params = GenerationParams::new("Quarterly revenue").with_content_type(ContentType::Chart);
        let prompt = catalog().stage_prompt(StageName::Content, &params).unwrap();
        assert!(prompt.contains("Topic: Quarterly revenue"));
        assert!(prompt.contains("Populate only the \"chart\" field"));
        assert!(prompt.contains("Audience: general"));
    }

    #[test]
    fn layout_prompt_discourages_images_when_disabled() {
        let params = GenerationParams::new("Team offsite");
        let prompt = catalog().stage_prompt(StageName::Layout, &params).unwrap();
        assert!(prompt.contains("do not choose image-left"));
    }

    #[test]
    fn system_instruction_lists_schema_fields() {
        let catalog = catalog();
        let system = catalog.system_instruction();
        for field in crate::domain::PartialSpec::FIELDS {
            assert!(system.contains(&format!("\"{}\"", field)), "missing {}", field);
        }
    }
}
