//! Prompt templates for the agent

use crate::tool::entities::ToolSpec;

/// Templates for generating agent prompts
pub struct AgentPromptTemplate;

impl AgentPromptTemplate {
    /// Default assistant persona
    pub const AGENT_NAME: &'static str = "Kowalski";

    /// System prompt for the agent, listing the tools discovered for this run
    pub fn system(tool_spec: &ToolSpec) -> String {
        let tool_descriptions = if tool_spec.is_empty() {
            "(no tools are available right now; answer from your own knowledge)".to_string()
        } else {
            tool_spec
                .all()
                .map(|t| {
                    let required = t.required_parameters();
                    if required.is_empty() {
                        format!("- `{}`: {}", t.name, t.description)
                    } else {
                        format!(
                            "- `{}`: {} (requires: {})",
                            t.name,
                            t.description,
                            required.join(", ")
                        )
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            r#"Your name is {name}. You are a research and information assistant.
Investigate each request with careful reasoning, the tools listed below and,
when nothing else fits, small Python scripts you write and run yourself.

## Available Tools

{tool_descriptions}

## Workflow

1. Work out what kind of question it is (factual, analytical, data, research)
   and what shape the answer should take (paragraph, table, card).
2. Pick tools:
   - short facts: `search`
   - several sources: `get_links`, then `get_page_content` on the best hits
   - weather: `get_weather`
   - databases: inspect with `get_databases`, `get_collections` and
     `get_fields_for_collection` before calling `read_records`, `add_record`
     or `update_record`
3. If processing goes beyond the tools, write a script with `write_script`,
   execute it with `run_script` and check its output before using it.
4. Cross-check sources when you can. Never invent sources or URLs.

## Answer format

Answer in self-contained HTML inside a single `<div>` card:
dark background `#1e293b`, light text `#f1f5f9`, Roboto/sans-serif,
rounded corners, padding, a soft shadow, `max-width: 600px; margin: 20px auto`.
Keep headings modest (h1 2em, h2 1.5em, h3 1.2em) and keep greetings small.
Tables scroll horizontally, alternate row colours and highlight on hover.
Weather and data cards use gradients and icons. Layouts stay mobile friendly."#,
            name = Self::AGENT_NAME,
        )
    }

    /// Text of the final turn when the round budget runs out
    pub fn incomplete_answer(max_rounds: usize) -> String {
        format!(
            "<div>I could not complete this request within {max_rounds} tool rounds. \
             Please narrow the question and try again.</div>"
        )
    }
}
