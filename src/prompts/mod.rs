//! Prompt templates and the static pillar catalog.

pub mod pillars;
pub mod template;
pub mod tiers;


pub use pillars::{PILLAR_COUNT, PillarBrief, all_pillars, pillar_brief};
pub use template::{PromptTemplate, TemplateVars, render};
pub use tiers::{CITY_TEMPLATE, PILLAR_TEMPLATE, QUESTION_TEMPLATE};

/// Vars every tier template expects, pre-filled with the shared guidance blocks.
pub fn base_vars() -> TemplateVars {
    let mut vars = TemplateVars::new();
    vars.insert("trust_chain", tiers::TRUST_CHAIN.to_string());
    vars.insert("rubric", tiers::SCORING_RUBRIC.to_string());
    vars.insert("confidence_guide", tiers::CONFIDENCE_GUIDE.to_string());
    vars
}
