//! Transcript entities

use serde::{Deserialize, Serialize};

/// Originator of a turn.
///
/// `human` is a synonym for `user`. Roles are kept with their original
/// spelling, so a transcript echoed back is unchanged, and roles this
/// service does not know about are carried as [`Role::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Human,
    Ai,
    Tool,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Human => "human",
            Role::Ai => "ai",
            Role::Tool => "tool",
            Role::Other(name) => name,
        }
    }

    /// `user` or `human`
    pub fn is_user(&self) -> bool {
        matches!(self, Role::User | Role::Human)
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        match name.as_str() {
            "user" => Role::User,
            "human" => Role::Human,
            "ai" => Role::Ai,
            "tool" => Role::Tool,
            _ => Role::Other(name),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One message in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Role::Ai, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }
}

/// Ordered conversation transcript.
///
/// Serialized as `{"messages": [...]}`, the shape used on the gateway's
/// `/chat` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub messages: Vec<Turn>,
}

impl Transcript {
    pub fn new(messages: Vec<Turn>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, turn: Turn) {
        self.messages.push(turn);
    }

    pub fn last(&self) -> Option<&Turn> {
        self.messages.last()
    }

    /// Whether the transcript can be handed to the agent
    pub fn ends_with_user_turn(&self) -> bool {
        matches!(self.last(), Some(turn) if turn.role.is_user())
    }

    /// The turns before the trailing user turn, plus that turn.
    ///
    /// Returns `None` when the transcript does not end in a user turn.
    pub fn split_last_user(&self) -> Option<(&[Turn], &Turn)> {
        if !self.ends_with_user_turn() {
            return None;
        }
        let (last, history) = self.messages.split_last()?;
        Some((history, last))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_human_is_a_user_turn() {
        let turn: Turn = serde_json::from_str(r#"{"role":"human","content":"hi"}"#).unwrap();
        assert_eq!(turn.role, Role::Human);
        assert!(turn.role.is_user());
        assert!(Transcript::new(vec![turn]).ends_with_user_turn());
    }

    #[test]
    fn test_roles_serialize_lowercase() {
        let json = serde_json::to_value(Turn::ai("hello")).unwrap();
        assert_eq!(json["role"], "ai");
    }

    #[test]
    fn test_role_spelling_survives_round_trip() {
        let raw = json!({
            "messages": [
                { "role": "system", "content": "be nice" },
                { "role": "human", "content": "hi" },
                { "role": "assistant", "content": "hello" }
            ]
        });
        let transcript: Transcript = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(transcript.messages[0].role, Role::Other("system".into()));
        assert!(!transcript.ends_with_user_turn());
        assert_eq!(serde_json::to_value(&transcript).unwrap(), raw);
    }

    #[test]
    fn test_ends_with_user_turn() {
        let mut transcript = Transcript::new(vec![Turn::user("hi")]);
        assert!(transcript.ends_with_user_turn());

        transcript.push(Turn::ai("hello"));
        assert!(!transcript.ends_with_user_turn());

        assert!(!Transcript::default().ends_with_user_turn());
    }

    #[test]
    fn test_split_last_user() {
        let transcript = Transcript::new(vec![
            Turn::user("first"),
            Turn::ai("answer"),
            Turn::user("second"),
        ]);

        let (history, last) = transcript.split_last_user().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(last.content, "second");

        let ended_by_ai = Transcript::new(vec![Turn::user("q"), Turn::ai("a")]);
        assert!(ended_by_ai.split_last_user().is_none());
    }
}
