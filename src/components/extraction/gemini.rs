use super::Extractor;
use crate::components::calendar::{
    AV_BRIEF_DESCRIPTION_KEY, AV_OTHER_NOTES_KEY, AV_REQUEST_LOCATION_KEY, AV_REQUIREMENTS_KEY,
};
use crate::error::{extraction_error, MailcalResult};
use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use rig::completion::{Chat, Message};
use rig::providers::gemini::Client as GeminiClient;
use tracing::{debug, info};

const SYSTEM_PROMPT: &str = "You extract calendar events from emails sent to an events and AV support team. Output your findings as a JSON array of event objects and nothing else.";

const USER_PROMPT_TEMPLATE: &str = "Read the email below and list every task, booking or AV support request that has a date.

Today is {today} and all times are local to {zone} unless the email says otherwise.

Generate a JSON array where each object uses these keys:
[{
  \"title\": \"short summary\",
  \"start\": \"YYYY-MM-DDTHH:MM:SS\",
  \"end\": \"YYYY-MM-DDTHH:MM:SS\",
  \"location\": \"room or venue\",
  \"description\": \"anything else worth knowing\",
  \"{av_location}\": \"where AV support is needed\",
  \"{av_requirements}\": \"equipment or staff required\",
  \"{av_brief}\": \"one line summary of the AV job\",
  \"{av_notes}\": \"other AV notes\",
  \"attendees\": [{\"name\": \"Full Name\", \"email\": \"address@example.com\"}]
}]

Leave a key out when the email does not mention it. If no end time is given, assume one hour after the start.
Ensure the output contains *only* the JSON array. The response must start with `[` and end with `]`. Return `[]` if there are no events.

Email:
{email}";

/// Extraction through Google Gemini via rig
pub struct GeminiExtractor {
    client: GeminiClient,
    model: String,
    zone: Tz,
}

impl GeminiExtractor {
    pub fn new(api_key: &str, model: &str, zone: Tz) -> Self {
        info!("Using Gemini model: {}", model);
        Self {
            client: GeminiClient::new(api_key),
            model: model.to_string(),
            zone,
        }
    }

    fn prompt(&self, email_text: &str) -> String {
        let today = Utc::now().with_timezone(&self.zone).format("%A %Y-%m-%d");
        USER_PROMPT_TEMPLATE
            .replace("{today}", &today.to_string())
            .replace("{zone}", self.zone.name())
            .replace("{av_location}", AV_REQUEST_LOCATION_KEY)
            .replace("{av_requirements}", AV_REQUIREMENTS_KEY)
            .replace("{av_brief}", AV_BRIEF_DESCRIPTION_KEY)
            .replace("{av_notes}", AV_OTHER_NOTES_KEY)
            .replace("{email}", email_text)
    }
}

#[async_trait]
impl Extractor for GeminiExtractor {
    async fn extract(&self, email_text: &str) -> MailcalResult<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(SYSTEM_PROMPT)
            .temperature(0.2)
            .build();

        let response = agent
            .chat(self.prompt(email_text), Vec::<Message>::new())
            .await
            .map_err(|e| extraction_error(&format!("Gemini request failed: {}", e)))?;

        info!("Received response from Gemini");
        debug!("Gemini response: {}", response);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_GEMINI_MODEL;

    #[test]
    fn test_prompt_names_every_key() {
        let extractor =
            GeminiExtractor::new("test-key", DEFAULT_GEMINI_MODEL, chrono_tz::Australia::Sydney);
        let prompt = extractor.prompt("Soundcheck Monday 8am in the Main Hall");

        assert!(prompt.contains("\"AV Support requirements:\""));
        assert!(prompt.contains("\"AV Support other notes:\""));
        assert!(prompt.contains("Australia/Sydney"));
        assert!(prompt.ends_with("Soundcheck Monday 8am in the Main Hall"));
        assert!(!prompt.contains("{today}"));
    }
}
