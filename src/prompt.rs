use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("prompt failed")]
pub struct PromptError(#[from] pub dialoguer::Error);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confirmation {
    Yes,
    No,
}

impl Confirmation {
    /// Only the literal words `yes` and `no` count, in any case.
    pub fn parse(input: &str) -> Option<Self> {
        match input.to_lowercase().as_str() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }

    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// The two questions the cleanup flow asks the operator.
pub trait Prompter {
    /// Index of the chosen item, `None` when the operator backs out.
    fn select(
        &mut self,
        label: &str,
        items: &[String],
    ) -> Result<Option<usize>, PromptError>;

    fn confirm(
        &mut self,
        label: &str,
    ) -> Result<Confirmation, PromptError>;
}

/// Prompts on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Prompter for TerminalPrompter {
    fn select(
        &mut self,
        label: &str,
        items: &[String],
    ) -> Result<Option<usize>, PromptError> {
        let choice = Select::with_theme(&self.theme)
            .with_prompt(label)
            .items(items)
            .default(0)
            .interact_opt()?;

        Ok(choice)
    }

    fn confirm(
        &mut self,
        label: &str,
    ) -> Result<Confirmation, PromptError> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(label)
            .validate_with(|input: &String| -> Result<(), &str> {
                Confirmation::parse(input)
                    .map(|_| ())
                    .ok_or("please enter 'yes' or 'no'")
            })
            .interact_text()?;

        // validated above, anything else is a refusal
        Ok(Confirmation::parse(&answer).unwrap_or(Confirmation::No))
    }
}
