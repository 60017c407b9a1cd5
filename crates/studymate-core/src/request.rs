//! Provider-neutral model request/response contract.
//!
//! Tutor clients describe what they need as a [`ModelRequest`]; a
//! [`GenerationBackend`](crate::GenerationBackend) turns it into a provider
//! call and returns a [`ModelResponse`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{ChatMessage, ChatRole, Source};

/// Which class of model serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Latency-sensitive calls: summaries, chat.
    Fast,
    /// Reasoning-heavy calls: quizzes, progress audits, drills.
    Reasoning,
}

/// Author of a conversation turn, in provider terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One role-tagged turn of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

impl From<&ChatMessage> for Turn {
    fn from(msg: &ChatMessage) -> Self {
        match msg.role {
            ChatRole::User => Turn::user(msg.content.clone()),
            ChatRole::Assistant => Turn::model(msg.content.clone()),
        }
    }
}

/// Primitive types understood by the response schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// Strict response schema, serialized in the provider's OpenAPI subset.
///
/// Objects built with [`ResponseSchema::object`] mark every property as
/// required and keep declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ResponseSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, ResponseSchema>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
}

impl ResponseSchema {
    fn primitive(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            items: None,
            properties: None,
            required: Vec::new(),
            property_ordering: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::primitive(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::primitive(SchemaType::Integer)
    }

    pub fn number() -> Self {
        Self::primitive(SchemaType::Number)
    }

    pub fn boolean() -> Self {
        Self::primitive(SchemaType::Boolean)
    }

    pub fn array(items: ResponseSchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::primitive(SchemaType::Array)
        }
    }

    /// Object with the given fields, all required, in the given order.
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, ResponseSchema)>,
        K: Into<String>,
    {
        let mut properties = BTreeMap::new();
        let mut names = Vec::new();
        for (name, schema) in fields {
            let name = name.into();
            properties.insert(name.clone(), schema);
            names.push(name);
        }

        Self {
            properties: Some(properties),
            required: names.clone(),
            property_ordering: names,
            ..Self::primitive(SchemaType::Object)
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A complete request to the generation backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub tier: ModelTier,
    /// Conversation turns; the last one is the current user turn.
    pub contents: Vec<Turn>,
    pub system_instruction: Option<String>,
    pub response_schema: Option<ResponseSchema>,
    /// Enable the provider's web search tool.
    pub search: bool,
    pub temperature: Option<f32>,
}

impl ModelRequest {
    /// Single-turn request with the given prompt.
    pub fn prompt(tier: ModelTier, prompt: impl Into<String>) -> Self {
        Self {
            tier,
            contents: vec![Turn::user(prompt)],
            system_instruction: None,
            response_schema: None,
            search: false,
            temperature: None,
        }
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_search(mut self) -> Self {
        self.search = true;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Replay prior turns in order before the current prompt.
    pub fn with_history<I>(mut self, history: I) -> Self
    where
        I: IntoIterator<Item = Turn>,
    {
        let mut turns: Vec<Turn> = history.into_iter().collect();
        turns.append(&mut self.contents);
        self.contents = turns;
        self
    }

    /// Total byte length of all prompt text, for logging.
    pub fn prompt_len(&self) -> usize {
        self.contents.iter().map(|t| t.text.len()).sum::<usize>()
            + self.system_instruction.as_ref().map_or(0, String::len)
    }

    pub fn expects_json(&self) -> bool {
        self.response_schema.is_some()
    }
}

/// Text plus grounding citations returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    pub text: String,
    pub citations: Vec<Source>,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }
}
