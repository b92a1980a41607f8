use std::collections::BTreeMap;

use crate::engine::Prompt;

/// Values substituted into `{name}` placeholders.
pub type TemplateVars = BTreeMap<&'static str, String>;

/// A system/user message pair with `{name}` placeholders.
///
/// `{{` and `}}` render as literal braces so JSON examples can be embedded.
/// Placeholders without a value are left as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub system: &'static str,
    pub user: &'static str,
}

impl PromptTemplate {
    pub fn render(&self, vars: &TemplateVars) -> Prompt {
        Prompt::new(render(self.system, vars), render(self.user, vars))
    }
}

/// Renders a single template string.
pub fn render(template: &str, vars: &TemplateVars) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
        } else if tail.starts_with('{') {
            match placeholder(tail) {
                Some((name, len)) => {
                    match vars.get(name) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&tail[..len]),
                    }
                    rest = &tail[len..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        } else {
            out.push('}');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

/// Parses `{identifier}` at the start of `text`, returning the name and total length.
fn placeholder(text: &str) -> Option<(&str, usize)> {
    let close = text.find('}')?;
    let name = &text[1..close];
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some((name, close + 1))
}
