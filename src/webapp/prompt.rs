use anyhow::Error;
use inquire::{Confirm, Text};

use crate::utils::handle_inquire_error;

/// Free-text inputs a web app needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Url,
    IconUrl,
}

impl Field {
    /// Collected first, in this order; the icon is asked for once a browser is settled.
    pub const REQUIRED: [Field; 2] = [Field::Name, Field::Url];

    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Url => "url",
            Field::IconUrl => "icon",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Field::IconUrl)
    }

    fn message(&self) -> &'static str {
        match self {
            Field::Name => "Name of the web app:",
            Field::Url => "URL (e.g. google.com):",
            Field::IconUrl => "URL of a PNG icon (optional):",
        }
    }

    fn help(&self) -> &'static str {
        match self {
            Field::Name => "Shown in your application menu",
            Field::Url => "https:// is added when no scheme is given",
            Field::IconUrl => "Press Enter to skip, or type 'auto' to use the site's favicon",
        }
    }
}

/// Source of answers for anything not given on the command line.
pub trait Prompt {
    fn is_interactive(&self) -> bool;

    /// `None` when nothing was entered.
    fn text(&mut self, field: Field) -> Result<Option<String>, Error>;

    /// One raw line typed at the numbered browser menu.
    fn browser_selection(&mut self, option_count: usize) -> Result<String, Error>;

    fn custom_browser(&mut self) -> Result<Option<String>, Error>;

    fn confirm(&mut self, message: &str) -> Result<bool, Error>;

    /// One raw line naming the launcher to remove.
    fn removal_selection(&mut self, entry_count: usize) -> Result<String, Error>;
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A value from the command line wins; otherwise ask.
pub fn resolve_field(
    field: Field,
    provided: Option<&str>,
    prompt: &mut dyn Prompt,
) -> Result<Option<String>, Error> {
    if let Some(value) = provided.map(str::to_string).and_then(non_empty) {
        return Ok(Some(value));
    }
    Ok(prompt.text(field)?.and_then(non_empty))
}

/// Terminal prompts backed by inquire.
pub struct InquirePrompt;

impl Prompt for InquirePrompt {
    fn is_interactive(&self) -> bool {
        true
    }

    fn text(&mut self, field: Field) -> Result<Option<String>, Error> {
        let context = format!("Failed to prompt for {}", field.key());
        let answer = Text::new(field.message())
            .with_help_message(field.help())
            .prompt()
            .map_err(|err| handle_inquire_error(err, &context))?;
        Ok(non_empty(answer))
    }

    fn browser_selection(&mut self, option_count: usize) -> Result<String, Error> {
        Text::new(&format!("Enter number (1-{}):", option_count))
            .prompt()
            .map_err(|err| handle_inquire_error(err, "Failed to prompt for browser"))
    }

    fn custom_browser(&mut self) -> Result<Option<String>, Error> {
        let answer = Text::new("Browser command or path:")
            .with_help_message("e.g. /opt/google/chrome/chrome or flatpak run com.brave.Browser")
            .prompt()
            .map_err(|err| handle_inquire_error(err, "Failed to prompt for custom browser"))?;
        Ok(non_empty(answer))
    }

    fn confirm(&mut self, message: &str) -> Result<bool, Error> {
        Confirm::new(message)
            .with_default(false)
            .prompt()
            .map_err(|err| handle_inquire_error(err, "Failed to get confirmation"))
    }

    fn removal_selection(&mut self, entry_count: usize) -> Result<String, Error> {
        let message = format!(
            "Enter number to remove (1-{}), or press Enter to cancel:",
            entry_count
        );
        Text::new(&message)
            .prompt()
            .map_err(|err| handle_inquire_error(err, "Failed to prompt for removal"))
    }
}

/// Used in automatic mode and when stdin is not a terminal: every question
/// goes unanswered.
pub struct NoPrompt;

impl Prompt for NoPrompt {
    fn is_interactive(&self) -> bool {
        false
    }

    fn text(&mut self, _field: Field) -> Result<Option<String>, Error> {
        Ok(None)
    }

    fn browser_selection(&mut self, _option_count: usize) -> Result<String, Error> {
        Ok(String::new())
    }

    fn custom_browser(&mut self) -> Result<Option<String>, Error> {
        Ok(None)
    }

    fn confirm(&mut self, _message: &str) -> Result<bool, Error> {
        Ok(false)
    }

    fn removal_selection(&mut self, _entry_count: usize) -> Result<String, Error> {
        Ok(String::new())
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;

    use super::*;

    /// Replays canned answers in order; running out is an error.
    #[derive(Default)]
    pub struct ScriptedPrompt {
        pub answers: VecDeque<String>,
        pub confirms: VecDeque<bool>,
        pub asked: Vec<String>,
    }

    impl ScriptedPrompt {
        pub fn new(answers: &[&str]) -> Self {
            ScriptedPrompt {
                answers: answers.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn with_confirms(mut self, confirms: &[bool]) -> Self {
            self.confirms = confirms.iter().copied().collect();
            self
        }

        fn next(&mut self, question: String) -> Result<String, Error> {
            self.asked.push(question.clone());
            self.answers
                .pop_front()
                .ok_or_else(|| Error::msg(format!("no scripted answer for {}", question)))
        }
    }

    impl Prompt for ScriptedPrompt {
        fn is_interactive(&self) -> bool {
            true
        }

        fn text(&mut self, field: Field) -> Result<Option<String>, Error> {
            self.next(field.key().to_string()).map(non_empty)
        }

        fn browser_selection(&mut self, _option_count: usize) -> Result<String, Error> {
            self.next("browser".to_string())
        }

        fn custom_browser(&mut self) -> Result<Option<String>, Error> {
            self.next("custom browser".to_string()).map(non_empty)
        }

        fn confirm(&mut self, message: &str) -> Result<bool, Error> {
            self.asked.push(message.to_string());
            self.confirms
                .pop_front()
                .ok_or_else(|| Error::msg("no scripted confirmation"))
        }

        fn removal_selection(&mut self, _entry_count: usize) -> Result<String, Error> {
            self.next("remove".to_string())
        }
    }
}
