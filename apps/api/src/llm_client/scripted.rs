//! In-memory `TextGenerator` for tests. Responses are keyed by a substring of
//! the prompt; every prompt is recorded for later assertions.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmError, TextGenerator};

struct Rule {
    needle: String,
    replies: VecDeque<Option<String>>,
}

#[derive(Default)]
pub struct ScriptedGenerator {
    rules: Mutex<Vec<Rule>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for prompts containing `needle`. The last queued reply repeats.
    pub fn reply(self, needle: &str, text: &str) -> Self {
        self.push(needle, Some(text.to_string()))
    }

    /// Queue a failed call for prompts containing `needle`.
    pub fn fail(self, needle: &str) -> Self {
        self.push(needle, None)
    }

    fn push(self, needle: &str, reply: Option<String>) -> Self {
        {
            let mut rules = self.rules.lock().unwrap();
            match rules.iter_mut().find(|r| r.needle == needle) {
                Some(rule) => rule.replies.push_back(reply),
                None => rules.push(Rule {
                    needle: needle.to_string(),
                    replies: VecDeque::from([reply]),
                }),
            }
        }
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of recorded prompts containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let mut rules = self.rules.lock().unwrap();
        let rule = rules
            .iter_mut()
            .find(|r| prompt.contains(&r.needle))
            .ok_or(LlmError::EmptyContent)?;

        let reply = if rule.replies.len() > 1 {
            rule.replies.pop_front().flatten()
        } else {
            rule.replies.front().cloned().flatten()
        };

        reply.ok_or(LlmError::Api {
            status: 503,
            message: format!("scripted failure for '{}'", rule.needle),
        })
    }
}
