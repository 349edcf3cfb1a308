//! Round-robin group chat
//!
//! A fixed list of participants takes turns over one shared transcript. The
//! opening message is round 0 and belongs to the first participant; the
//! speaker for round `r` is `participants[r % n]`. The chat stops after
//! `max_round` rounds or as soon as a participant terminates.

use agent_core::{Agent, ChatMessage, Context, Error, Reply, Result, Transcript};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Default round cap, the opening message included
pub const DEFAULT_MAX_ROUND: usize = 9;

/// Why a chat stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The round cap was reached
    RoundLimit,
    /// A participant ended the exchange
    Terminated,
}

/// Result of a completed chat
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Full transcript, opening message first
    pub transcript: Transcript,
    /// Text of the last non-empty message, if any
    pub summary: Option<String>,
    /// Rounds played, the opening message included
    pub rounds: usize,
    /// Why the chat stopped
    pub stop_cause: StopCause,
}

/// Ordered participants with a round cap
pub struct GroupChat {
    participants: Vec<Arc<dyn Agent>>,
    max_round: usize,
}

impl GroupChat {
    /// Create a builder
    pub fn builder() -> GroupChatBuilder {
        GroupChatBuilder::default()
    }

    /// Participant names in speaking order
    pub fn participant_names(&self) -> Vec<&str> {
        self.participants.iter().map(|p| p.name()).collect()
    }

    /// Round cap
    pub fn max_round(&self) -> usize {
        self.max_round
    }

    /// Speaker of round `round`
    pub fn speaker_for(&self, round: usize) -> &Arc<dyn Agent> {
        &self.participants[round % self.participants.len()]
    }

    /// Run the chat with `request` as the first participant's opening message
    pub async fn run(&self, request: &str, context: &mut Context) -> Result<ChatOutcome> {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::text(self.speaker_for(0).name(), request));
        context.set_round(0);

        let mut stop_cause = StopCause::RoundLimit;
        let mut rounds = 1;

        while rounds < self.max_round {
            let round = rounds;
            let speaker = self.speaker_for(round);
            context.set_round(round as u64);
            info!(
                round,
                max_round = self.max_round,
                speaker = speaker.name(),
                run_id = context.run_id().unwrap_or_default(),
                "Group chat turn"
            );

            match speaker.reply(&transcript, context).await? {
                Reply::Terminate => {
                    info!(round, speaker = speaker.name(), "Participant ended the chat");
                    stop_cause = StopCause::Terminated;
                    break;
                }
                Reply::Messages(messages) => {
                    if let Some(stray) = messages.iter().find(|m| m.speaker != speaker.name()) {
                        return Err(Error::ProcessingFailed(format!(
                            "{} appended a message attributed to {}",
                            speaker.name(),
                            stray.speaker
                        )));
                    }
                    if messages.is_empty() {
                        warn!(round, speaker = speaker.name(), "Participant stayed silent");
                    }
                    transcript.extend(messages);
                }
            }
            rounds += 1;
        }

        let summary = transcript.last_spoken().map(|m| m.content.clone());
        info!(rounds, ?stop_cause, messages = transcript.len(), "Group chat finished");

        Ok(ChatOutcome {
            transcript,
            summary,
            rounds,
            stop_cause,
        })
    }
}

/// Builder for [`GroupChat`]
pub struct GroupChatBuilder {
    participants: Vec<Arc<dyn Agent>>,
    max_round: usize,
}

impl Default for GroupChatBuilder {
    fn default() -> Self {
        Self {
            participants: Vec::new(),
            max_round: DEFAULT_MAX_ROUND,
        }
    }
}

impl GroupChatBuilder {
    /// Append a participant; the first one opens the chat
    pub fn participant(mut self, agent: Arc<dyn Agent>) -> Self {
        self.participants.push(agent);
        self
    }

    /// Set the round cap
    pub fn max_round(mut self, max_round: usize) -> Self {
        self.max_round = max_round;
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<GroupChat> {
        if self.participants.is_empty() {
            return Err(Error::InitializationFailed("Group chat has no participants".to_string()));
        }
        if self.max_round == 0 {
            return Err(Error::InitializationFailed("max_round must be at least 1".to_string()));
        }

        let mut seen = HashSet::new();
        for participant in &self.participants {
            if !seen.insert(participant.name()) {
                return Err(Error::InitializationFailed(format!(
                    "Duplicate participant name: {}",
                    participant.name()
                )));
            }
        }

        Ok(GroupChat {
            participants: self.participants,
            max_round: self.max_round,
        })
    }
}
