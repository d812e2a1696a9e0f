//! History rendering — the model's only channel of memory.
//!
//! Each prompt after the first carries a rendered trace of every tool
//! invocation so far: iteration number, tool name, the raw argument string
//! exactly as sent, and the result rendering verbatim. Nothing else is
//! passed between turns, so rendering must be deterministic — the same
//! turn sequence always produces byte-identical text.

use quizforge_core::directive::Directive;
use quizforge_core::run::{Turn, TurnOutcome};

/// Render the turn sequence into a single history block.
///
/// Only dispatched tool calls appear; a terminal turn ends the run and is
/// never rendered back to the model.
pub fn render_history(turns: &[Turn]) -> String {
    let mut entries = Vec::new();
    for turn in turns {
        if let (
            Directive::ToolCall { name, raw_args },
            TurnOutcome::Dispatched(output),
        ) = (&turn.directive, &turn.outcome)
        {
            entries.push(format!(
                "In iteration {} you called {} with {} parameters, \
                 and the function returned {}.",
                turn.index + 1,
                name,
                raw_args,
                output.rendering
            ));
        }
    }
    entries.join("\n\n")
}

/// Assemble the full prompt for one iteration.
///
/// Iteration 0 is system prompt plus goal; later iterations append the
/// rendered history and a nudge asking for the next directive.
pub fn build_prompt(system_prompt: &str, goal: &str, history: &str) -> String {
    if history.is_empty() {
        format!("{system_prompt}\n\nQuery: {}", goal.trim())
    } else {
        format!(
            "{system_prompt}\n\nQuery: {}\n\n{history}\n\nWhat should I do next?",
            goal.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizforge_core::tool::ToolOutput;

    fn tool_turn(index: usize, name: &str, raw_args: &str, value: serde_json::Value) -> Turn {
        Turn {
            index,
            directive: Directive::ToolCall {
                name: name.into(),
                raw_args: raw_args.into(),
            },
            outcome: TurnOutcome::Dispatched(ToolOutput::new(value)),
        }
    }

    #[test]
    fn renders_invocations_in_order() {
        let turns = vec![
            tool_turn(0, "fibonacci_numbers", "6", serde_json::json!([0, 1, 1, 2, 3, 5])),
            tool_turn(1, "format_flash_card", "Q: A", serde_json::json!("Front: Q\nBack: A")),
        ];
        let history = render_history(&turns);
        assert_eq!(
            history,
            "In iteration 1 you called fibonacci_numbers with 6 parameters, \
             and the function returned [0,1,1,2,3,5].\n\n\
             In iteration 2 you called format_flash_card with Q: A parameters, \
             and the function returned Front: Q\nBack: A."
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let turns = vec![
            tool_turn(0, "strings_to_chars_to_int", "\"HI\"", serde_json::json!([72, 73])),
            tool_turn(1, "fibonacci_numbers", "3", serde_json::json!([0, 1, 1])),
        ];
        assert_eq!(render_history(&turns), render_history(&turns));
    }

    #[test]
    fn empty_turns_render_empty() {
        assert_eq!(render_history(&[]), "");
    }

    #[test]
    fn terminal_turns_are_not_rendered() {
        let turns = vec![Turn {
            index: 0,
            directive: Directive::FinalAnswer {
                raw_payload: "42".into(),
            },
            outcome: TurnOutcome::Terminal {
                raw_payload: "42".into(),
            },
        }];
        assert_eq!(render_history(&turns), "");
    }

    #[test]
    fn first_prompt_has_no_history_block() {
        let prompt = build_prompt("SYSTEM", "  the goal  ", "");
        assert_eq!(prompt, "SYSTEM\n\nQuery: the goal");
    }

    #[test]
    fn later_prompts_carry_history_and_nudge() {
        let prompt = build_prompt("SYSTEM", "goal", "HISTORY BLOCK");
        assert_eq!(
            prompt,
            "SYSTEM\n\nQuery: goal\n\nHISTORY BLOCK\n\nWhat should I do next?"
        );
    }
}
