//! Content-calendar planning: prompt construction and reply parsing

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Longest plan we will ask for, in days
pub const MAX_PLAN_DAYS: u32 = 30;

const DEFAULT_PLATFORMS: &str = "Instagram, LinkedIn, Twitter";
const FALLBACK_IDEA_PLATFORMS: [&str; 2] = ["Instagram", "LinkedIn"];

/// Kind of post an idea describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PostType {
    Video,
    Image,
    Text,
}

impl PostType {
    /// Anything other than the three known names becomes `Text`
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some("Video") => PostType::Video,
            Some("Image") => PostType::Image,
            _ => PostType::Text,
        }
    }
}

/// One planned post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContentIdea {
    pub date: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub caption: String,
    pub platforms: Vec<String>,
}

/// Inputs that shape the calendar
#[derive(Debug, Clone)]
pub struct PlanParameters {
    pub goal: String,
    pub niche: String,
    pub platforms: Vec<String>,
    pub dates: Vec<String>,
}

impl PlanParameters {
    /// Comma-separated platform list used in the prompt
    pub fn platform_list(&self) -> String {
        if self.platforms.is_empty() {
            DEFAULT_PLATFORMS.to_string()
        } else {
            self.platforms.join(", ")
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are a content strategist. Generate a {}-day social media content plan. \
             Return ONLY a valid JSON array of objects. Each object must have: \
             \"date\" (YYYY-MM-DD string), \"type\" (one of \"Video\", \"Image\", \"Text\"), \
             \"caption\" (short engaging social caption, 1-2 sentences), \
             \"platforms\" (array of strings, e.g. [\"Instagram\", \"LinkedIn\"]). No other text.",
            self.dates.len()
        )
    }

    pub fn user_prompt(&self) -> String {
        format!(
            "Goal: {}. Niche: {}. Platforms: {}. Start date: {}. \
             Generate exactly {} content ideas, one per day. \
             Use these dates in order: {}. Return the JSON array only.",
            self.goal,
            self.niche,
            self.platform_list(),
            self.dates.first().map(String::as_str).unwrap_or_default(),
            self.dates.len(),
            self.dates.join(", ")
        )
    }
}

/// Number of days to plan. Missing, zero, negative or non-numeric values
/// mean the full 30; a partial day counts as a whole one; larger values are
/// capped.
pub fn plan_length(duration: Option<&Value>) -> u32 {
    let requested = match duration {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match requested {
        Some(days) if days > 0.0 => days.ceil().min(f64::from(MAX_PLAN_DAYS)) as u32,
        _ => MAX_PLAN_DAYS,
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (taken as its UTC date)
pub fn parse_start_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

/// `days` consecutive ISO dates starting at `start`
pub fn plan_dates(start: NaiveDate, days: u32) -> Vec<String> {
    (0..days)
        .map(|offset| (start + Duration::days(i64::from(offset))).format("%Y-%m-%d").to_string())
        .collect()
}

/// Locate the JSON payload inside a chat reply that may carry prose or fences
fn json_span(text: &str) -> &str {
    for (start, ch) in text.char_indices() {
        let close = match ch {
            '{' => '}',
            '[' => ']',
            _ => continue,
        };
        if let Some(end) = text.rfind(close) {
            if end > start {
                return &text[start..=end];
            }
        }
    }
    text
}

fn string_field<'a>(item: &'a Value, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| item.get(*name).and_then(Value::as_str))
        .find(|value| !value.is_empty())
}

/// Parse the model's reply into raw ideas.
///
/// Accepts a bare array or an object holding `ideas` or `items`. Field
/// aliases: `day` for date, `text`/`content` for caption.
pub fn parse_ideas(reply: &str) -> Result<Vec<ContentIdea>, serde_json::Error> {
    let parsed: Value = serde_json::from_str(json_span(reply.trim()))?;

    let items = match parsed {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("ideas").or_else(|| map.remove("items")) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    Ok(items
        .iter()
        .map(|item| ContentIdea {
            date: string_field(item, &["date", "day"]).unwrap_or_default().to_string(),
            post_type: PostType::parse_lenient(item.get("type").and_then(Value::as_str)),
            caption: string_field(item, &["caption", "text", "content"])
                .unwrap_or_default()
                .to_string(),
            platforms: match item.get("platforms") {
                Some(Value::Array(values)) => values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                _ => FALLBACK_IDEA_PLATFORMS.iter().map(|p| p.to_string()).collect(),
            },
        })
        .collect())
}

/// Fill gaps left by the model: dates, captions and platforms
pub fn normalize_ideas(ideas: Vec<ContentIdea>, params: &PlanParameters) -> Vec<ContentIdea> {
    let platform_list = params.platform_list();
    let first_platform = platform_list
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    ideas
        .into_iter()
        .enumerate()
        .map(|(i, mut idea)| {
            if idea.date.is_empty() {
                idea.date = params
                    .dates
                    .get(i)
                    .or_else(|| params.dates.first())
                    .cloned()
                    .unwrap_or_default();
            }
            if idea.caption.is_empty() {
                idea.caption = format!("Content for day {}", i + 1);
            }
            if idea.platforms.is_empty() {
                idea.platforms = vec![first_platform.clone()];
            }
            idea
        })
        .collect()
}
