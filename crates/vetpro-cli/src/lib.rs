use std::io::{BufRead, Write};

use chrono::NaiveTime;
use vetpro_core::{AppError, ErrorMetadata};
use vetpro_services::Confirmation;

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays clean JSON.
///
/// Production runs log JSON lines; everything else gets the human-readable format.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Message shown to the user when a command fails.
///
/// Application errors print their client message only; the full error chain goes to the log.
/// Context added on top of an application error is kept as a prefix.
pub fn user_message(err: &anyhow::Error) -> String {
    let Some(app_err) = err.chain().find_map(|e| e.downcast_ref::<AppError>()) else {
        return format!("{:#}", err);
    };

    tracing::error!(
        error_code = app_err.error_code(),
        details = %app_err.detailed_message(),
        "Command failed"
    );

    let message = app_err.client_message();
    let is_outermost = err
        .chain()
        .next()
        .and_then(|e| e.downcast_ref::<AppError>())
        .is_some();
    if is_outermost {
        message
    } else {
        format!("{}: {}", err, message)
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{}', expected HH:MM", value))
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí")
}

/// Asks on the terminal before destructive actions, unless `--yes` was given.
pub struct PromptConfirmation {
    pub assume_yes: bool,
}

impl Confirmation for PromptConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let mut stderr = std::io::stderr();
        if write!(stderr, "{} [y/N] ", prompt)
            .and_then(|_| stderr.flush())
            .is_err()
        {
            return false;
        }

        // Blocking read on the runtime thread; nothing else runs while a command waits here.
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read confirmation");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_time_accepts_minutes_and_seconds() {
        assert_eq!(parse_time("09:30"), Ok(NaiveTime::from_hms_opt(9, 30, 0).unwrap()));
        assert_eq!(
            parse_time("18:05:10"),
            Ok(NaiveTime::from_hms_opt(18, 5, 10).unwrap())
        );
        assert!(parse_time("9.30").is_err());
    }

    #[test]
    fn storage_errors_hide_details() {
        let err = anyhow::Error::from(AppError::Storage(
            "Read failed: /var/lib/vetpro/clients_demo_v10_x.json".to_string(),
        ));
        let message = user_message(&err);
        assert_eq!(message, "The operation could not be completed. Please try again.");
        assert!(!message.contains("/var/lib"));
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let err = anyhow::Error::from(AppError::validation("First name is required"));
        assert_eq!(user_message(&err), "First name is required");
    }

    #[test]
    fn context_prefixes_client_message() {
        let err = anyhow::Error::from(AppError::Internal("pool exhausted".to_string()))
            .context("Could not load clinic");
        assert_eq!(user_message(&err), "Could not load clinic: Unexpected error");
    }

    #[test]
    fn other_errors_print_their_chain() {
        let err = anyhow::anyhow!("connection refused").context("Sign in failed");
        assert_eq!(user_message(&err), "Sign in failed: connection refused");
    }

    #[test]
    fn affirmative_answers() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" Sí "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("no"));
    }

    #[test]
    fn assume_yes_skips_prompt() {
        let confirmation = PromptConfirmation { assume_yes: true };
        assert!(confirmation.confirm("Delete?"));
    }
}
