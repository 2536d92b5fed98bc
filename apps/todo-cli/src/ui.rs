//! Terminal output and prompts.

use anyhow::Result;
use chrono::Local;
use console::{Style, Term, style};
use dialoguer::{Confirm, Input, Password, Sort, theme::ColorfulTheme};
use todo_core::{Rejection, Task, User};
use todo_store::{Status, Theme};

struct Palette {
    accent: Style,
    done: Style,
    muted: Style,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                accent: Style::new().blue().bold(),
                done: Style::new().green(),
                muted: Style::new().black().bright(),
            },
            Theme::Dark => Self {
                accent: Style::new().cyan().bold(),
                done: Style::new().green().bright(),
                muted: Style::new().white().dim(),
            },
        }
    }
}

pub struct Ui {
    term: Term,
    palette: Palette,
    prompts: ColorfulTheme,
}

impl Ui {
    pub fn new(theme: Theme) -> Self {
        Self {
            term: Term::stdout(),
            palette: Palette::for_theme(theme),
            prompts: ColorfulTheme::default(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.term.is_term()
    }

    pub fn success(&self, message: &str) -> Result<()> {
        self.term
            .write_line(&format!("{} {}", style("✓").green(), message))?;
        Ok(())
    }

    pub fn note(&self, message: &str) -> Result<()> {
        self.term
            .write_line(&self.palette.muted.apply_to(message).to_string())?;
        Ok(())
    }

    /// Field errors get one line per field.
    pub fn rejection(&self, rejection: &Rejection) -> Result<()> {
        let mark = style("✗").red().bold();
        match rejection.field_errors() {
            Some(fields) => {
                for (field, messages) in fields.iter() {
                    self.term.write_line(&format!(
                        "{} {}: {}",
                        mark,
                        style(field).red(),
                        messages.join(" ")
                    ))?;
                }
            }
            None => self.term.write_line(&format!("{} {}", mark, rejection))?,
        }
        Ok(())
    }

    pub fn user(&self, user: &User) -> Result<()> {
        self.term.write_line(&format!(
            "{} {}",
            self.palette.accent.apply_to(user.display_name()),
            self.palette.muted.apply_to(format!("@{} <{}>", user.username, user.email))
        ))?;
        Ok(())
    }

    pub fn tasks(&self, tasks: &[Task], status: Status) -> Result<()> {
        if tasks.is_empty() {
            let message = match status {
                Status::Failed => "Tasks could not be loaded.",
                _ => "No tasks yet.",
            };
            return self.note(message);
        }

        let today = Local::now().date_naive();
        for task in tasks {
            let check = if task.completed {
                self.palette.done.apply_to("[x]")
            } else {
                self.palette.muted.apply_to("[ ]")
            };
            let title = if task.completed {
                self.palette.muted.apply_to(task.title.as_str()).strikethrough()
            } else {
                Style::new().apply_to(task.title.as_str())
            };

            let mut line = format!(
                "{} {} {}",
                check,
                self.palette.accent.apply_to(format!("#{:<4}", task.id.0)),
                title
            );
            if let Some(due) = task.due_date {
                let label = format!("due {}", due.format("%Y-%m-%d"));
                let label = if due < today && !task.completed {
                    style(label).red().to_string()
                } else {
                    self.palette.muted.apply_to(label).to_string()
                };
                line.push_str(&format!("  {label}"));
            }
            self.term.write_line(&line)?;

            if let Some(description) = &task.description {
                self.term.write_line(&format!(
                    "         {}",
                    self.palette.muted.apply_to(description)
                ))?;
            }
        }
        Ok(())
    }

    pub fn input(&self, prompt: &str, initial: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.prompts).with_prompt(prompt);
        if let Some(initial) = initial {
            input = input.with_initial_text(initial);
        }
        Ok(input.interact_text()?)
    }

    pub fn optional_input(&self, prompt: &str) -> Result<String> {
        Ok(Input::<String>::with_theme(&self.prompts)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?)
    }

    pub fn password(&self, prompt: &str) -> Result<String> {
        Ok(Password::with_theme(&self.prompts)
            .with_prompt(prompt)
            .interact()?)
    }

    pub fn new_password(&self) -> Result<String> {
        Ok(Password::with_theme(&self.prompts)
            .with_prompt("New password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?)
    }

    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        Ok(Confirm::with_theme(&self.prompts)
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    /// Lets the user drag items into a new order. Returns original indices in
    /// their new order.
    pub fn arrange(&self, items: &[String]) -> Result<Vec<usize>> {
        Ok(Sort::with_theme(&self.prompts)
            .with_prompt("Reorder (space to pick up, enter when done)")
            .items(items)
            .interact()?)
    }
}
