//! REPL Driver
//!
//! The read-eval-print loop: prompt for a line, detect exit keywords,
//! forward everything else to the agent executor, print the reply.
//! A failed turn is printed and the loop continues; only the operator
//! ends the session.

use anyhow::Result;
use colored::Colorize;
use dialoguer::Input;
use serde_json::{json, Value};
use tracing::debug;

use crate::agent::AgentExecutor;

/// Whether a line of input ends the session: absent/empty input, or the
/// literal `exit` / `quit` keywords, case-insensitively after trimming.
pub fn should_terminate(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("exit")
        || trimmed.eq_ignore_ascii_case("quit")
}

/// Extract the printable text from an executor reply: the `output`
/// field when the reply carries one, otherwise the raw reply value.
pub fn format_reply(reply: &Value) -> String {
    match reply.get("output") {
        Some(Value::String(text)) => text.clone(),
        Some(value) if !value.is_null() => value.to_string(),
        _ => reply.to_string(),
    }
}

/// Run the loop until the operator exits. Bootstrap has already
/// happened; nothing in here is fatal.
pub async fn run(executor: &mut AgentExecutor) -> Result<()> {
    println!("Hedera Agent CLI Chatbot — type \"exit\" to quit");

    loop {
        let line = match Input::<String>::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            // EOF or interrupt reads as absent input and ends the session.
            Err(err) => {
                debug!(error = %err, "input closed");
                String::new()
            }
        };

        if should_terminate(&line) {
            println!("Goodbye!");
            break;
        }

        // The raw line is forwarded untrimmed; trimming is only for
        // exit detection.
        match executor.invoke(json!({ "input": line })).await {
            Ok(reply) => println!("{} {}", "AI:".green().bold(), format_reply(&reply)),
            Err(err) => eprintln!("{} {:#}", "Error:".red(), err),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_keywords_terminate() {
        assert!(should_terminate("exit"));
        assert!(should_terminate("quit"));
        assert!(should_terminate("EXIT"));
        assert!(should_terminate("  Quit  "));
    }

    #[test]
    fn test_empty_input_terminates() {
        assert!(should_terminate(""));
        assert!(should_terminate("   "));
    }

    #[test]
    fn test_ordinary_input_does_not_terminate() {
        assert!(!should_terminate("What is my balance?"));
        assert!(!should_terminate("exit now"));
        assert!(!should_terminate("quitting"));
    }

    #[test]
    fn test_format_reply_prefers_output_field() {
        let reply = json!({ "input": "hi", "output": "Hello!" });
        assert_eq!(format_reply(&reply), "Hello!");
    }

    #[test]
    fn test_format_reply_falls_back_to_raw_value() {
        let reply = json!({ "input": "hi" });
        assert_eq!(format_reply(&reply), reply.to_string());

        let reply = json!({ "output": null, "other": 1 });
        assert_eq!(format_reply(&reply), reply.to_string());
    }

    #[test]
    fn test_format_reply_stringifies_non_string_output() {
        let reply = json!({ "output": { "nested": true } });
        assert_eq!(format_reply(&reply), "{\"nested\":true}");
    }
}
