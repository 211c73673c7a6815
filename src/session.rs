use std::sync::Arc;

use log::{ debug, info };
use tokio::sync::RwLock;

use crate::agent::TutorAgent;
use crate::models::chat::{ Message, Transcript };
use crate::submission::format_submission;

/// One learner's conversation: a transcript seeded with the greeting, grown
/// by user turns and the replies they produce.
///
/// The lock is never held across a provider call. Overlapping requests each
/// work from their own snapshot, and replies land in completion order.
#[derive(Clone)]
pub struct TutorSession {
    agent: Arc<TutorAgent>,
    transcript: Arc<RwLock<Transcript>>,
}

impl TutorSession {
    pub fn new(agent: Arc<TutorAgent>, greeting: &str) -> Self {
        Self {
            agent,
            transcript: Arc::new(RwLock::new(Transcript::seeded(greeting))),
        }
    }

    pub async fn transcript(&self) -> Transcript {
        self.transcript.read().await.clone()
    }

    /// Blank input is ignored and yields `None`.
    pub async fn send_message(&self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            debug!("Ignoring blank chat message");
            return None;
        }
        Some(self.exchange(Message::user(text)).await)
    }

    pub async fn submit_code(&self, code: &str, topic: &str) -> String {
        info!("Code submitted for topic '{}' ({} bytes)", topic, code.len());
        self.exchange(Message::user(format_submission(code, topic))).await
    }

    async fn exchange(&self, user_message: Message) -> String {
        let snapshot = {
            let mut guard = self.transcript.write().await;
            *guard = guard.appended(user_message);
            guard.clone()
        };

        let reply = self.agent.get_reply(&snapshot).await;

        let mut guard = self.transcript.write().await;
        *guard = guard.appended(Message::assistant(reply.clone()));
        reply
    }
}
