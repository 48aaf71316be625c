use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};

#[derive(Serialize)]
struct AskRequest {
    question: String,
    language: String,
    session_id: String,
}

/// The backend returns `answer` either as one string or as a list of
/// paragraphs, depending on which retrieval path produced it.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Paragraphs(Vec<String>),
}

impl Answer {
    pub fn into_text(self) -> String {
        match self {
            Answer::Text(text) => text,
            Answer::Paragraphs(parts) => parts.join("\n"),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AskResponse {
    pub answer: Option<Answer>,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Clone)]
pub struct DikaiClient {
    client: Client,
    base_url: String,
}

impl DikaiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn ask(&self, question: &str) -> Result<AskResponse> {
        let url = format!("{}/ask", self.base_url);

        let request = AskRequest {
            question: question.to_string(),
            language: "en".to_string(),
            session_id: "default".to_string(),
        };

        let response = self
            .client
            .post(&url)
            // The backend is often reached through an ngrok tunnel, which
            // otherwise answers browser-looking clients with an HTML
            // interstitial instead of JSON.
            .header("ngrok-skip-browser-warning", "true")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "DIKAI request failed with status: {}",
                response.status()
            ));
        }

        let ask_response: AskResponse = response.json().await?;
        Ok(ask_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let client = DikaiClient::new("https://abc123.ngrok-free.app/");
        assert_eq!(client.base_url(), "https://abc123.ngrok-free.app");
    }

    #[test]
    fn request_carries_fixed_language_and_session() {
        let request = AskRequest {
            question: "How do I pay tuition fees?".to_string(),
            language: "en".to_string(),
            session_id: "default".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["question"], "How do I pay tuition fees?");
        assert_eq!(json["language"], "en");
        assert_eq!(json["session_id"], "default");
    }

    #[test]
    fn answer_deserializes_from_string() {
        let response: AskResponse =
            serde_json::from_str(r#"{"answer": "Pay at the Finance Office.", "sources": []}"#)
                .unwrap();
        assert_eq!(
            response.answer.unwrap().into_text(),
            "Pay at the Finance Office."
        );
        assert!(response.sources.is_empty());
    }

    #[test]
    fn answer_deserializes_from_list_and_joins_with_newlines() {
        let response: AskResponse =
            serde_json::from_str(r#"{"answer": ["A", "B"], "sources": ["http://x"]}"#).unwrap();
        assert_eq!(response.answer.unwrap().into_text(), "A\nB");
        assert_eq!(response.sources, vec!["http://x".to_string()]);
    }

    #[test]
    fn empty_object_defaults_every_field() {
        let response: AskResponse = serde_json::from_str("{}").unwrap();
        assert!(response.answer.is_none());
        assert!(response.sources.is_empty());
    }
}
