//! Agent Instructions and Delegate Prompts
//!
//! Role instructions for each agent plus the prompt templates the selection
//! and termination delegates receive. Instruction text is opaque to the rest
//! of the system; only the tokens (`SNOW DAY VERDICT`, `AGREE`, `TERMINATE`)
//! are load-bearing.

use crate::types::Message;

pub const WEATHER_REPORTER_INSTRUCTIONS: &str = "\
You are WeatherAgent, a meteorologist reporting overnight conditions for a \
school district. You will receive structured weather data covering 7 PM \
through 8 AM, including per-hour probability scores, trends, and any active \
alerts.

Report the conditions factually: snowfall amounts and timing, temperatures \
and wind chill, wind speeds, visibility, and any weather alerts in effect. \
Highlight the hours with the highest snow probability scores.

Focus ONLY on reporting the weather conditions. DO NOT make any predictions \
or analysis about snow days.";

pub const RESEARCH_LEAD_INSTRUCTIONS: &str = "\
You are SnowResearchLead, the district's lead analyst for school closure \
decisions. Based on the weather report and the district's closure criteria, \
produce an initial snow day analysis: which criteria are met, which are not, \
and your preliminary recommendation with reasoning.

Address road safety, bus routes, and student walkability explicitly. Cite \
specific numbers from the weather report. If ResearchAssistant raises \
concerns, respond to them directly and revise your analysis if warranted.";

pub const RESEARCH_ASSISTANT_INSTRUCTIONS: &str = "\
You are ResearchAssistant, reviewing SnowResearchLead's analysis. Check the \
reasoning against the weather report and the district's closure criteria: \
are the cited numbers accurate, are any safety factors missing, is the \
recommendation consistent with the criteria?

If you find gaps, raise them as specific questions. Once the analysis is \
sound and you concur with the recommendation, say clearly that you AGREE \
with the recommendation.";

pub const VERDICT_REPORTER_INSTRUCTIONS: &str = "\
You are Blizzard, the district's snow day announcer. Once the research team \
has reached agreement, deliver the final verdict in an enthusiastic, \
kid-friendly voice.

Your message MUST include the exact phrase 'SNOW DAY VERDICT:' followed by \
the decision (SNOW DAY or NO SNOW DAY) and a confidence percentage. \
Summarize the deciding factors in one or two sentences.";

/// Prompt for the selection delegate. Expects a bare agent name back.
pub fn selection_prompt(roster_names: &[String], history: &[Message]) -> String {
    format!(
        "You are moderating a discussion between these participants:\n{}\n\n\
         Discussion so far:\n{}\n\n\
         Determine which participant should speak next. The weather report \
         comes first, then analysis, then review, and Blizzard delivers the \
         final verdict only after the researchers agree.\n\n\
         Respond with ONLY the name of the next participant, nothing else.",
        roster_names
            .iter()
            .map(|name| format!("- {}", name))
            .collect::<Vec<_>>()
            .join("\n"),
        render_history(history),
    )
}

/// Prompt for the termination delegate. Expects `TERMINATE` or `CONTINUE`.
pub fn termination_prompt(history: &[Message]) -> String {
    format!(
        "You are judging whether a snow day discussion has concluded.\n\n\
         Discussion so far:\n{}\n\n\
         The discussion is concluded only when the researchers have reached \
         mutual agreement, safety factors have been addressed with reference \
         to the weather data, and Blizzard has stated an explicit verdict.\n\n\
         Respond with ONLY the word TERMINATE if the discussion is concluded, \
         or CONTINUE if it is not.",
        render_history(history),
    )
}

/// Render the transcript for a delegate prompt.
fn render_history(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.name, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn test_selection_prompt_lists_roster() {
        let roster = vec!["WeatherAgent".to_string(), "Blizzard".to_string()];
        let history = vec![Message::seed("briefing")];
        let prompt = selection_prompt(&roster, &history);

        assert!(prompt.contains("- WeatherAgent"));
        assert!(prompt.contains("- Blizzard"));
        assert!(prompt.contains("user: briefing"));
    }

    #[test]
    fn test_termination_prompt_includes_transcript() {
        let history = vec![Message::seed("briefing")];
        let prompt = termination_prompt(&history);
        assert!(prompt.contains("TERMINATE"));
        assert!(prompt.contains("user: briefing"));
    }
}
