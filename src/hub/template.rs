//! Chat Prompt Template
//!
//! A fetched prompt is an ordered list of message templates plus
//! placeholders. Rendering is single-pass `{variable}` substitution in
//! the f-string style the registry serializes; `{{` and `}}` escape to
//! literal braces.

use std::collections::HashMap;

use anyhow::Result;

/// One parameterized message body.
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    pub template: String,
    pub input_variables: Vec<String>,
}

impl PromptTemplate {
    pub fn format(&self, vars: &HashMap<String, String>) -> Result<String> {
        format_f_string(&self.template, vars)
    }
}

/// One entry in a chat prompt: a role-tagged template or a history
/// placeholder the memory store fills at run time.
#[derive(Clone, Debug)]
pub enum PromptMessage {
    System(PromptTemplate),
    Human(PromptTemplate),
    Ai(PromptTemplate),
    Placeholder { variable_name: String, optional: bool },
}

/// An ordered chat prompt as fetched from the registry.
#[derive(Clone, Debug)]
pub struct ChatPromptTemplate {
    pub input_variables: Vec<String>,
    pub messages: Vec<PromptMessage>,
}

impl ChatPromptTemplate {
    /// Render every system message with the given variables and join
    /// them into one system prompt.
    pub fn system_text(&self, vars: &HashMap<String, String>) -> Result<String> {
        let mut parts = Vec::new();
        for message in &self.messages {
            if let PromptMessage::System(template) = message {
                parts.push(template.format(vars)?);
            }
        }
        if parts.is_empty() {
            anyhow::bail!("Prompt template has no system message");
        }
        Ok(parts.join("\n\n"))
    }

    /// The first human message template, if the prompt defines one.
    pub fn human_template(&self) -> Option<&PromptTemplate> {
        self.messages.iter().find_map(|m| match m {
            PromptMessage::Human(template) => Some(template),
            _ => None,
        })
    }

    /// Whether the prompt declares a history placeholder with the given
    /// variable name.
    pub fn has_placeholder(&self, name: &str) -> bool {
        self.messages.iter().any(|m| {
            matches!(m, PromptMessage::Placeholder { variable_name, .. } if variable_name == name)
        })
    }
}

/// Substitute `{variable}` occurrences in an f-string template.
///
/// `{{` and `}}` produce literal braces. A `{name}` with no binding, or
/// an unbalanced brace, is an error.
pub fn format_f_string(template: &str, vars: &HashMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    name.push(inner);
                }
                if !closed {
                    anyhow::bail!("Unclosed '{{' in prompt template");
                }

                match vars.get(name.as_str()) {
                    Some(value) => out.push_str(value),
                    None => anyhow::bail!("Prompt template variable {:?} has no value", name),
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    anyhow::bail!("Unmatched '}}' in prompt template");
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}
