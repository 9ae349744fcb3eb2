//! Conversation Buffer Memory
//!
//! An in-process, non-persistent record of prior turns. The executor
//! reads history before each model call and appends a turn only after
//! the call succeeds, so a failed turn leaves no trace here.

use crate::types::ChatMessage;

/// One completed exchange: what the operator said, what the agent replied.
#[derive(Clone, Debug)]
struct ConversationTurn {
    input: String,
    output: String,
}

/// Buffer memory keyed by fixed payload field names.
pub struct BufferMemory {
    memory_key: String,
    input_key: String,
    output_key: String,
    return_messages: bool,
    turns: Vec<ConversationTurn>,
}

impl Default for BufferMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferMemory {
    /// Memory configured the way the executor expects: history under
    /// `chat_history`, turn fields `input`/`output`, structured messages.
    pub fn new() -> Self {
        Self {
            memory_key: "chat_history".to_string(),
            input_key: "input".to_string(),
            output_key: "output".to_string(),
            return_messages: true,
            turns: Vec::new(),
        }
    }

    pub fn memory_key(&self) -> &str {
        &self.memory_key
    }

    pub fn input_key(&self) -> &str {
        &self.input_key
    }

    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    /// Prior turns as structured messages in arrival order.
    pub fn history(&self) -> Vec<ChatMessage> {
        if !self.return_messages {
            return Vec::new();
        }
        let mut messages = Vec::with_capacity(self.turns.len() * 2);
        for turn in &self.turns {
            messages.push(ChatMessage::user(turn.input.clone()));
            messages.push(ChatMessage::assistant(turn.output.clone()));
        }
        messages
    }

    /// Record one completed turn.
    pub fn save_turn(&mut self, input: &str, output: &str) {
        self.turns.push(ConversationTurn {
            input: input.to_string(),
            output: output.to_string(),
        });
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatRole;

    #[test]
    fn test_fixed_field_names() {
        let memory = BufferMemory::new();
        assert_eq!(memory.memory_key(), "chat_history");
        assert_eq!(memory.input_key(), "input");
        assert_eq!(memory.output_key(), "output");
    }

    #[test]
    fn test_history_preserves_arrival_order() {
        let mut memory = BufferMemory::new();
        memory.save_turn("first question", "first answer");
        memory.save_turn("second question", "second answer");

        let history = memory.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[0].content, "first question");
        assert_eq!(history[1].role, ChatRole::Assistant);
        assert_eq!(history[1].content, "first answer");
        assert_eq!(history[2].content, "second question");
        assert_eq!(history[3].content, "second answer");
    }

    #[test]
    fn test_new_memory_is_empty() {
        let memory = BufferMemory::new();
        assert_eq!(memory.turn_count(), 0);
        assert!(memory.history().is_empty());
    }
}
