use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Me,
    Them,
}

impl Speaker {
    pub fn toggle(self) -> Self {
        match self {
            Speaker::Me => Speaker::Them,
            Speaker::Them => Speaker::Me,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Speaker::Me => "me",
            Speaker::Them => "them",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub id: String,
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            speaker,
            text: text.into(),
        }
    }
}

/// Conversation in the order the user sees it. Never reordered; duplicate
/// texts are kept as separate turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    pub turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Append a batch (e.g. one screenshot's worth) after the existing turns.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = Turn>) {
        self.turns.extend(batch);
    }

    /// Manual entry starts as an empty message from the other person.
    pub fn add_manual(&mut self) -> &Turn {
        self.turns.push(Turn::new(Speaker::Them, ""));
        &self.turns[self.turns.len() - 1]
    }

    pub fn edit(&mut self, id: &str, text: impl Into<String>) -> Option<&Turn> {
        let turn = self.turns.iter_mut().find(|t| t.id == id)?;
        turn.text = text.into();
        Some(turn)
    }

    pub fn remove(&mut self, id: &str) -> Option<Turn> {
        let idx = self.turns.iter().position(|t| t.id == id)?;
        Some(self.turns.remove(idx))
    }

    pub fn toggle_speaker(&mut self, id: &str) -> Option<&Turn> {
        let turn = self.turns.iter_mut().find(|t| t.id == id)?;
        turn.speaker = turn.speaker.toggle();
        Some(turn)
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl FromIterator<Turn> for Transcript {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}
