//! Content-plan and caption helpers, end to end with a scripted assistant

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use socialgen_gateway::api::create_router;
use socialgen_gateway::backend::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ProviderError,
    ProviderRegistry, TextBackend,
};
use socialgen_gateway::config::Settings;
use socialgen_gateway::content::plan::{normalize_ideas, parse_ideas, PlanParameters};
use socialgen_gateway::content::PostType;
use socialgen_gateway::AppState;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Assistant that replies with a fixed text and remembers what it was asked
struct ScriptedAssistant {
    reply: Result<Option<String>, String>,
    seen: Mutex<Vec<ChatCompletionRequest>>,
}

impl ScriptedAssistant {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(Some(text.to_string())),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn silent() -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(None),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn last_request(&self) -> ChatCompletionRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl TextBackend for ScriptedAssistant {
    fn default_model(&self) -> &str {
        "gpt-4o-mini"
    }

    fn temperature(&self) -> f32 {
        0.7
    }

    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        self.seen.lock().unwrap().push(request);
        match &self.reply {
            Ok(content) => Ok(ChatCompletionResponse {
                model: Some("gpt-4o-mini".to_string()),
                choices: vec![ChatChoice {
                    message: ChatMessage {
                        role: "assistant".to_string(),
                        content: content.clone(),
                    },
                    finish_reason: Some("stop".to_string()),
                }],
            }),
            Err(message) => Err(ProviderError::Upstream {
                status: 500,
                message: message.clone(),
            }),
        }
    }
}

fn app(assistant: Option<Arc<ScriptedAssistant>>) -> Router {
    let mut settings = Settings::default();
    settings.auth.enabled = false;

    create_router(Arc::new(AppState {
        settings: Arc::new(settings),
        providers: Arc::new(ProviderRegistry::new()),
        assistant: assistant.map(|a| a as Arc<dyn TextBackend>),
    }))
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn params(dates: &[&str], platforms: &[&str]) -> PlanParameters {
    PlanParameters {
        goal: "Branding".to_string(),
        niche: "General".to_string(),
        platforms: platforms.iter().map(|p| p.to_string()).collect(),
        dates: dates.iter().map(|d| d.to_string()).collect(),
    }
}

// Reply parsing

#[test]
fn test_parse_bare_array_inside_prose() {
    let reply = r#"Sure! Here is the plan:
```json
[
  {"date": "2025-03-01", "type": "Video", "caption": "Behind the scenes", "platforms": ["TikTok"]},
  {"date": "2025-03-02", "type": "Carousel", "caption": "Top 5 tips", "platforms": ["Instagram", "LinkedIn"]}
]
```
Enjoy."#;

    let ideas = parse_ideas(reply).unwrap();

    assert_eq!(ideas.len(), 2);
    assert_eq!(ideas[0].post_type, PostType::Video);
    assert_eq!(ideas[0].platforms, vec!["TikTok"]);
    assert_eq!(ideas[1].post_type, PostType::Text);
}

#[test]
fn test_parse_object_with_aliases() {
    let reply = json!({
        "ideas": [
            { "day": "2025-03-01", "type": "Image", "text": "Sunrise shot" },
            { "date": "2025-03-02", "content": "Team intro" }
        ]
    })
    .to_string();

    let ideas = parse_ideas(&reply).unwrap();

    assert_eq!(ideas[0].date, "2025-03-01");
    assert_eq!(ideas[0].caption, "Sunrise shot");
    assert_eq!(ideas[0].post_type, PostType::Image);
    assert_eq!(ideas[0].platforms, vec!["Instagram", "LinkedIn"]);
    assert_eq!(ideas[1].caption, "Team intro");
    assert_eq!(ideas[1].post_type, PostType::Text);
}

#[test]
fn test_parse_items_key_and_unexpected_shapes() {
    let ideas = parse_ideas(r#"{"items": [{"caption": "hi"}]}"#).unwrap();
    assert_eq!(ideas.len(), 1);

    assert!(parse_ideas(r#"{"plan": "none"}"#).unwrap().is_empty());
    assert!(parse_ideas("I could not produce a plan.").is_err());
}

#[test]
fn test_normalize_fills_gaps() {
    let ideas = parse_ideas(r#"[{"caption": ""}, {"date": "2025-05-09", "caption": "Kept", "platforms": []}, {}]"#)
        .unwrap();
    let normalized = normalize_ideas(ideas, &params(&["2025-05-01", "2025-05-02"], &["Threads", "X"]));

    assert_eq!(normalized[0].date, "2025-05-01");
    assert_eq!(normalized[0].caption, "Content for day 1");
    assert_eq!(normalized[1].date, "2025-05-09");
    assert_eq!(normalized[1].caption, "Kept");
    assert_eq!(normalized[1].platforms, vec!["Threads"]);
    // past the end of the generated dates
    assert_eq!(normalized[2].date, "2025-05-01");
    assert_eq!(normalized[2].caption, "Content for day 3");
}

// Content-plan route

#[tokio::test]
async fn test_generate_plan_success() {
    let assistant = ScriptedAssistant::replying(
        r#"[{"date":"2025-01-30","type":"Image","caption":"New year, new look","platforms":["Instagram"]},
            {"type":"Video","caption":"","platforms":[]},
            {"date":"2025-02-01","type":"Text","caption":"Thanks for following","platforms":["LinkedIn"]}]"#,
    );
    let app = app(Some(assistant.clone()));

    let (status, json) = post(
        app,
        "/api/content-plan/generate",
        json!({
            "goal": "Launch",
            "duration": 3,
            "platforms": ["LinkedIn", "Instagram"],
            "niche": "Coffee",
            "startDate": "2025-01-30"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let ideas = json["data"]["ideas"].as_array().unwrap();
    assert_eq!(ideas.len(), 3);
    assert_eq!(ideas[0]["type"], "Image");
    assert_eq!(ideas[1]["date"], "2025-01-31");
    assert_eq!(ideas[1]["caption"], "Content for day 2");
    assert_eq!(ideas[1]["platforms"], json!(["LinkedIn"]));

    let request = assistant.last_request();
    assert_eq!(request.model, "gpt-4o-mini");
    assert_eq!(request.temperature, Some(0.7));
    assert_eq!(request.messages[0].role, "system");
    assert!(request.messages[0].content.as_deref().unwrap().contains("3-day"));
    let user = request.messages[1].content.as_deref().unwrap();
    assert!(user.contains("Goal: Launch. Niche: Coffee. Platforms: LinkedIn, Instagram."));
    assert!(user.contains("2025-01-30, 2025-01-31, 2025-02-01"));
}

#[tokio::test]
async fn test_generate_plan_defaults_and_cap() {
    let assistant = ScriptedAssistant::replying("[]");
    let app = app(Some(assistant.clone()));

    let (status, json) = post(
        app,
        "/api/content-plan/generate",
        json!({ "duration": 365, "startDate": "2025-01-01" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["ideas"], json!([]));

    let user = assistant.last_request().messages[1].content.clone().unwrap();
    assert!(user.contains("Goal: Branding. Niche: General. Platforms: Instagram, LinkedIn, Twitter."));
    assert!(user.contains("exactly 30 content ideas"));
    assert!(user.contains("2025-01-30"));
    assert!(!user.contains("2025-01-31"));
}

#[tokio::test]
async fn test_generate_plan_invalid_start_date() {
    let assistant = ScriptedAssistant::replying("[]");
    let (status, json) = post(
        app(Some(assistant.clone())),
        "/api/content-plan/generate",
        json!({ "startDate": "next monday" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid startDate");
    assert!(assistant.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_plan_without_assistant() {
    let (status, json) = post(app(None), "/api/content-plan/generate", json!({})).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "AI service not configured. Set OPENAI_API_KEY.");
}

#[tokio::test]
async fn test_generate_plan_empty_reply() {
    let (status, json) = post(
        app(Some(ScriptedAssistant::silent())),
        "/api/content-plan/generate",
        json!({ "duration": 2 }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "No response from AI");
}

#[tokio::test]
async fn test_generate_plan_unparseable_reply() {
    let (status, json) = post(
        app(Some(ScriptedAssistant::replying("Sorry, I can't help with that."))),
        "/api/content-plan/generate",
        json!({ "duration": 2 }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_generate_plan_upstream_failure() {
    let (status, json) = post(
        app(Some(ScriptedAssistant::failing("The model is overloaded"))),
        "/api/content-plan/generate",
        json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "The model is overloaded");
}

// Caption route

#[tokio::test]
async fn test_polish_caption_success() {
    let assistant = ScriptedAssistant::replying("  Fresh beans, fresh start. Come taste the difference!  ");
    let (status, json) = post(
        app(Some(assistant.clone())),
        "/api/content-plan/polish-caption",
        json!({ "description": "   new espresso blend launching monday   " }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["caption"], "Fresh beans, fresh start. Come taste the difference!");

    let request = assistant.last_request();
    assert!(request.messages[0].content.as_deref().unwrap().starts_with("You are a social media copywriter"));
    assert_eq!(
        request.messages[1].content.as_deref(),
        Some("new espresso blend launching monday")
    );
}

#[tokio::test]
async fn test_polish_caption_truncates_description() {
    let assistant = ScriptedAssistant::replying("Caption");
    let (status, _) = post(
        app(Some(assistant.clone())),
        "/api/content-plan/polish-caption",
        json!({ "description": "word ".repeat(100) }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let sent = assistant.last_request().messages[1].content.clone().unwrap();
    assert_eq!(sent.chars().count(), 200);
}

#[tokio::test]
async fn test_polish_caption_short_description() {
    let assistant = ScriptedAssistant::replying("Caption");

    for description in [json!("hey"), json!("    a    "), json!(12345), Value::Null] {
        let (status, json) = post(
            app(Some(assistant.clone())),
            "/api/content-plan/polish-caption",
            json!({ "description": description }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Description must be at least 5 characters");
    }
    assert!(assistant.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_polish_caption_validates_before_assistant_check() {
    let (status, _) = post(
        app(None),
        "/api/content-plan/polish-caption",
        json!({ "description": "hi" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        app(None),
        "/api/content-plan/polish-caption",
        json!({ "description": "long enough" }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_polish_caption_empty_reply() {
    let (status, json) = post(
        app(Some(ScriptedAssistant::replying("   "))),
        "/api/content-plan/polish-caption",
        json!({ "description": "weekend sale on all mugs" }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "No response from AI");
}
