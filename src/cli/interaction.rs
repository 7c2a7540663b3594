//! Prompt surface the wizard runner talks to. The terminal implementation
//! uses dialoguer; tests script the answers instead.

use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::cli::output;
use crate::wizard::{FieldDescriptor, FieldKind};

/// Describes how a field prompt was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// User supplied a concrete value.
    Value(String),
    /// User chose to keep the default/current value.
    Keep,
    /// Go back to the previous field, or the previous step from a step's first field.
    Back,
    /// Abandon the wizard.
    Cancel,
    /// Request additional information for the current field.
    Help,
}

/// Responses accepted on the final step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResponse {
    Confirm,
    Back,
    Cancel,
}

pub struct PromptContext<'a> {
    pub step_label: &'a str,
    pub step_index: usize,
    pub step_total: usize,
    pub descriptor: &'a FieldDescriptor,
    pub default: Option<&'a str>,
    pub field_index: usize,
    pub field_total: usize,
}

impl PromptContext<'_> {
    pub fn is_first_prompt(&self) -> bool {
        self.step_index == 0 && self.field_index == 0
    }
}

pub trait WizardInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse;

    fn confirm(&mut self, lines: &[String]) -> ConfirmationResponse;
}

/// Lines explaining what a field accepts, listing choices where there are any.
pub(crate) fn kind_hint(kind: &FieldKind) -> Vec<String> {
    match kind {
        FieldKind::Text => Vec::new(),
        FieldKind::Integer => vec!["Whole number.".into()],
        FieldKind::Date => vec!["Date as YYYY-MM-DD.".into()],
        FieldKind::Boolean => vec!["yes or no.".into()],
        FieldKind::Choice(options) => vec![format!("One of: {}", options.join(", "))],
        FieldKind::List => vec!["Comma separated values.".into()],
        FieldKind::Selection(options) if options.is_empty() => {
            vec!["No options are available.".into()]
        }
        FieldKind::Selection(options) => {
            let mut lines = vec!["Comma separated numbers, names or values:".to_string()];
            lines.extend(
                options
                    .iter()
                    .enumerate()
                    .map(|(index, option)| format!("  {}. {} ({})", index + 1, option.name, option.value)),
            );
            lines
        }
        FieldKind::Policies => vec!["Comma separated ROLE:rw[:action|action] rules.".into()],
    }
}

/// Maps raw terminal input onto a response. `:back`, `:cancel` and `:help`
/// are reserved; input equal to the default keeps it.
pub fn parse_input(input: &str, default: Option<&str>) -> PromptResponse {
    let trimmed = input.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        ":back" | ":b" => PromptResponse::Back,
        ":cancel" | ":q" => PromptResponse::Cancel,
        ":help" | ":h" | "?" => PromptResponse::Help,
        _ => match default {
            Some(current) if trimmed.is_empty() || trimmed == current => PromptResponse::Keep,
            _ => PromptResponse::Value(trimmed.to_string()),
        },
    }
}

/// Terminal implementation backed by dialoguer prompts.
pub struct DialoguerInteraction {
    theme: ColorfulTheme,
}

impl DialoguerInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn print_header(&self, context: &PromptContext<'_>) {
        if context.field_index == 0 {
            output::section(format!(
                "Step {} / {}: {}",
                context.step_index + 1,
                context.step_total,
                context.step_label
            ));
        }
        for line in kind_hint(&context.descriptor.kind) {
            output::detail(line);
        }
        if context.is_first_prompt() {
            output::detail("Type :back to revisit a field, :help for details, :cancel to quit.");
        }
    }
}

impl Default for DialoguerInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardInteraction for DialoguerInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        self.print_header(context);
        let label = if context.descriptor.required {
            context.descriptor.label.to_string()
        } else {
            format!("{} (optional)", context.descriptor.label)
        };
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(label)
            .allow_empty(true);
        if let Some(default) = context.default {
            input = input.default(default.to_string()).show_default(true);
        }
        match input.interact_text() {
            Ok(raw) => parse_input(&raw, context.default),
            Err(_) => PromptResponse::Cancel,
        }
    }

    fn confirm(&mut self, lines: &[String]) -> ConfirmationResponse {
        output::section("Review");
        for line in lines {
            output::detail(line);
        }
        let items = ["Submit", "Back", "Cancel"];
        match Select::with_theme(&self.theme)
            .with_prompt("Submit this wizard?")
            .items(&items)
            .default(0)
            .interact()
        {
            Ok(0) => ConfirmationResponse::Confirm,
            Ok(1) => ConfirmationResponse::Back,
            _ => ConfirmationResponse::Cancel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::OptionItem;

    #[test]
    fn reserved_commands_are_recognised() {
        assert_eq!(parse_input(" :back ", None), PromptResponse::Back);
        assert_eq!(parse_input(":CANCEL", Some("x")), PromptResponse::Cancel);
        assert_eq!(parse_input("?", None), PromptResponse::Help);
    }

    #[test]
    fn empty_or_unchanged_input_keeps_the_default() {
        assert_eq!(parse_input("", Some("2024-05-01")), PromptResponse::Keep);
        assert_eq!(parse_input("2024-05-01", Some("2024-05-01")), PromptResponse::Keep);
        assert_eq!(
            parse_input("2024-05-02", Some("2024-05-01")),
            PromptResponse::Value("2024-05-02".into())
        );
        assert_eq!(parse_input("  ", None), PromptResponse::Value(String::new()));
    }

    #[test]
    fn selection_hint_numbers_options() {
        let hint = kind_hint(&FieldKind::Selection(vec![
            OptionItem::new("Admins", "ROLE_ADMIN"),
            OptionItem::new("Users", "ROLE_USER"),
        ]));
        assert_eq!(hint.len(), 3);
        assert_eq!(hint[2], "  2. Users (ROLE_USER)");
    }
}
