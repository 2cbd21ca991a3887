//! Hosted model graders.
//!
//! Each vendor gets the blueprint as base64 PDF plus the prompt from
//! [`build_prompt`](super::build_prompt), and answers with free text that
//! [`parse_grade_response`] normalizes. Request bodies and reply text
//! extraction are plain functions so they can be tested without a network.

use super::extract::parse_grade_response;
use super::{build_prompt, Blueprint, BlueprintGrader, GradingContext, GradingError};
use crate::model::GradeReport;
use base64::Engine;
use serde_json::{json, Value};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_OUTPUT_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    OpenAi,
    Gemini,
    Anthropic,
}

impl Vendor {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
        }
    }

    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Gemini => "gemini-2.0-flash",
            Self::Anthropic => "claude-3-5-sonnet-latest",
        }
    }

    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com",
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::Anthropic => "https://api.anthropic.com",
        }
    }

    /// Full request URL for a base URL and model.
    #[must_use]
    pub fn endpoint(self, base_url: &str, model: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            Self::OpenAi => format!("{base}/v1/chat/completions"),
            Self::Gemini => format!("{base}/v1beta/models/{model}:generateContent"),
            Self::Anthropic => format!("{base}/v1/messages"),
        }
    }
}

/// JSON body for one grading request.
#[must_use]
pub fn request_body(vendor: Vendor, model: &str, blueprint: &Blueprint, prompt: &str) -> Value {
    let data = base64::engine::general_purpose::STANDARD.encode(&blueprint.bytes);

    match vendor {
        Vendor::OpenAi => json!({
            "model": model,
            "response_format": { "type": "json_object" },
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "file",
                        "file": {
                            "filename": blueprint.file_name,
                            "file_data": format!("data:application/pdf;base64,{data}"),
                        }
                    },
                    { "type": "text", "text": prompt }
                ]
            }]
        }),
        Vendor::Gemini => json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": "application/pdf", "data": data } },
                    { "text": prompt }
                ]
            }],
            "generationConfig": { "responseMimeType": "application/json" }
        }),
        Vendor::Anthropic => json!({
            "model": model,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "document",
                        "source": {
                            "type": "base64",
                            "media_type": "application/pdf",
                            "data": data,
                        }
                    },
                    { "type": "text", "text": prompt }
                ]
            }]
        }),
    }
}

/// Pulls the model's text out of a vendor response body.
#[must_use]
pub fn response_text(vendor: Vendor, body: &Value) -> Option<String> {
    match vendor {
        Vendor::OpenAi => body
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string),
        Vendor::Gemini => join_text(body.pointer("/candidates/0/content/parts")?, |part| {
            part.get("text").and_then(Value::as_str)
        }),
        Vendor::Anthropic => join_text(body.get("content")?, |block| {
            (block.get("type").and_then(Value::as_str) == Some("text"))
                .then(|| block.get("text").and_then(Value::as_str))
                .flatten()
        }),
    }
}

fn join_text<'a>(items: &'a Value, text_of: impl Fn(&'a Value) -> Option<&'a str>) -> Option<String> {
    let text: Vec<&str> = items.as_array()?.iter().filter_map(text_of).collect();
    (!text.is_empty()).then(|| text.concat())
}

/// Grader backed by a hosted model API.
pub struct RemoteGrader {
    vendor: Vendor,
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::blocking::Client,
}

impl RemoteGrader {
    pub fn new(vendor: Vendor, api_key: String, timeout_secs: u64) -> Result<Self, GradingError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("land-audit/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            vendor,
            api_key,
            model: vendor.default_model().to_string(),
            base_url: vendor.default_base_url().to_string(),
            http,
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn url(&self) -> String {
        self.vendor.endpoint(&self.base_url, &self.model)
    }

    fn authorize(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match self.vendor {
            Vendor::OpenAi => request.bearer_auth(&self.api_key),
            Vendor::Gemini => request.header("x-goog-api-key", &self.api_key),
            Vendor::Anthropic => request
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
        }
    }
}

impl BlueprintGrader for RemoteGrader {
    fn name(&self) -> &'static str {
        self.vendor.name()
    }

    fn grade(
        &self,
        blueprint: &Blueprint,
        context: &GradingContext,
    ) -> Result<GradeReport, GradingError> {
        let prompt = build_prompt(context);
        let body = request_body(self.vendor, &self.model, blueprint, &prompt);

        tracing::info!(
            vendor = self.vendor.name(),
            model = %self.model,
            file = %blueprint.file_name,
            bytes = blueprint.bytes.len(),
            "requesting blueprint grade"
        );

        let resp = self.authorize(self.http.post(self.url())).json(&body).send()?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().unwrap_or_default();
            tracing::warn!(vendor = self.vendor.name(), status, "grading request failed");
            return Err(GradingError::Api { status, message });
        }

        let reply: Value = resp.json()?;
        let text = response_text(self.vendor, &reply)
            .ok_or_else(|| GradingError::Parse("response carried no text".to_string()))?;

        parse_grade_response(self.name(), &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blueprint() -> Blueprint {
        Blueprint::from_bytes("plan.pdf", b"%PDF-1.4".to_vec()).unwrap()
    }

    #[test]
    fn endpoints_per_vendor() {
        assert_eq!(
            Vendor::OpenAi.endpoint("https://api.openai.com/", "gpt-4o"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            Vendor::Gemini.endpoint("http://localhost:9000", "gemini-x"),
            "http://localhost:9000/v1beta/models/gemini-x:generateContent"
        );
        assert_eq!(
            Vendor::Anthropic.endpoint(Vendor::Anthropic.default_base_url(), "m"),
            "https://api.anthropic.com/v1/messages"
        );
    }

    #[test]
    fn bodies_embed_base64_pdf() {
        let encoded = "JVBERi0xLjQ=";

        let openai = request_body(Vendor::OpenAi, "gpt-4o", &blueprint(), "grade it");
        assert_eq!(openai["model"], "gpt-4o");
        assert_eq!(
            openai["messages"][0]["content"][0]["file"]["file_data"],
            format!("data:application/pdf;base64,{encoded}")
        );
        assert_eq!(openai["messages"][0]["content"][1]["text"], "grade it");

        let gemini = request_body(Vendor::Gemini, "g", &blueprint(), "grade it");
        assert_eq!(gemini["contents"][0]["parts"][0]["inline_data"]["data"], encoded);

        let anthropic = request_body(Vendor::Anthropic, "c", &blueprint(), "grade it");
        assert_eq!(anthropic["max_tokens"], 1024);
        assert_eq!(
            anthropic["messages"][0]["content"][0]["source"]["media_type"],
            "application/pdf"
        );
    }

    #[test]
    fn extracts_openai_text() {
        let body = json!({ "choices": [{ "message": { "content": "{\"summary\": \"ok\"}" } }] });
        assert_eq!(
            response_text(Vendor::OpenAi, &body).as_deref(),
            Some("{\"summary\": \"ok\"}")
        );
    }

    #[test]
    fn extracts_gemini_text_across_parts() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        });
        assert_eq!(response_text(Vendor::Gemini, &body).as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn extracts_only_anthropic_text_blocks() {
        let body = json!({
            "content": [
                { "type": "thinking", "thinking": "hmm" },
                { "type": "text", "text": "{}" }
            ]
        });
        assert_eq!(response_text(Vendor::Anthropic, &body).as_deref(), Some("{}"));
        assert_eq!(response_text(Vendor::Anthropic, &json!({ "content": [] })), None);
        assert_eq!(response_text(Vendor::OpenAi, &json!({ "error": "x" })), None);
    }

    #[test]
    fn builder_overrides() {
        let grader = RemoteGrader::new(Vendor::Gemini, "key".to_string(), 5)
            .unwrap()
            .with_model("gemini-pro")
            .with_base_url("http://127.0.0.1:1");
        assert_eq!(grader.model(), "gemini-pro");
        assert_eq!(
            grader.url(),
            "http://127.0.0.1:1/v1beta/models/gemini-pro:generateContent"
        );
        assert_eq!(grader.name(), "gemini");
    }
}
