// 🤖 Financial Coach - canned answers behind a simulated typing delay
//
// State machine: Idle → (submit) → Typing → (finish) → Idle.
// `submit` records the user message and hands back a `PendingReply`; the
// caller awaits it wherever it likes (a spawned task in the TUI, the request
// future in the API) and passes the `Reply` back to `finish`.
//
// Clearing the chat bumps an epoch so a reply that was already in flight is
// dropped instead of landing in the fresh transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FinanceError, FinanceResult};

/// Fixed delay before the coach answers
pub const REPLY_DELAY: Duration = Duration::from_millis(1500);

pub const GREETING: &str = "Hello! I'm your AI Financial Coach. I can help you understand your spending patterns, plan for goals, and make smarter money decisions. What would you like to know?";

pub const CLEARED_GREETING: &str = "Chat cleared. I'm ready for a fresh start! How can I help you today?";

pub const FALLBACK_REPLY: &str = "I understand you're asking about your finances. Based on your current data:\n\n- Your total spending this month is Birr 2,514\n- You have Birr 3,835 remaining in your budget\n- You're on track with your financial goals\n\nIs there something specific you'd like me to analyze or help you plan for?";

pub const SUGGESTED_QUESTIONS: [&str; 4] = [
    "Can I afford a Birr 1,000 vacation?",
    "How much did I spend on food this month?",
    "Where can I cut expenses?",
    "What are my biggest spending categories?",
];

const CANNED_ANSWERS: [&str; 4] = [
    "Based on your current finances, let me analyze this for you:\n\n**Current Status:**\n- Remaining budget this month: Birr 3,835\n- Average monthly savings: Birr 1,200\n\n**My Assessment:**\nYes, you can afford a Birr 1,000 vacation! Here's why:\n\n1. Your spending is 12% below average this month\n2. You have consistent income from your salary (Birr 5,500) plus occasional freelance work\n3. You've been meeting your savings goals\n\n**Recommendation:** I'd suggest booking for next month and setting aside Birr 250/week starting now. This way, you'll have the full amount ready without impacting your emergency fund. Would you like me to help you create a vacation savings plan?",
    "Here's your food spending breakdown for January:\n\n**Total Food Spending: Birr 455.92**\n\n**Breakdown:**\n- Groceries (Whole Foods, Trader Joe's): Birr 149.47\n- Dining Out: Birr 243.45\n- Coffee & Quick Bites: Birr 63.00\n\n**Compared to Last Month:** You spent 18% more on food this January.\n\n**Insight:** Your dining out expenses are higher than usual. Consider meal prepping 2-3 days a week to bring this down. Would you like me to suggest a weekly food budget?",
    "I've analyzed your spending patterns. Here are my top recommendations:\n\n**1. Subscriptions (Birr 158/month)**\nYou have 5 active subscriptions. The iCloud storage (Birr 2.99) and gym membership (Birr 49) have low usage based on your patterns.\n\n**2. Transport (Birr 320/month)**\nYou've already reduced this by 16% over 3 months—great job! Consider carpooling once a week for additional Birr 40-60/month savings.\n\n**3. Dining Out (Birr 243/month)**\nThis is 53% of your food budget. Cutting 2 restaurant visits/week could save Birr 150/month.\n\n**Total Potential Savings: Birr 200-250/month**\n\nWhich area would you like to focus on first?",
    "Here's your spending breakdown for January:\n\n**1. 🏠 Rent & Housing — Birr 1,800 (42%)**\nThis is your largest fixed expense. It's within the recommended 30-35% for your income, so you're doing well here.\n\n**2. 🍔 Food & Dining — Birr 455 (11%)**\nSlightly higher than last month. Most of this is dining out.\n\n**3. 🚗 Transport — Birr 320 (8%)**\nTrending down—you've saved Birr 80 compared to 3 months ago.\n\n**4. 💡 Utilities — Birr 204 (5%)**\nNormal for this time of year.\n\n**5. 🛍️ Shopping — Birr 203 (5%)**\nMostly Amazon and Target purchases.\n\nWould you like detailed advice on any of these categories?",
];

// ============================================================================
// CANNED RESPONDER
// ============================================================================

/// Exact-match lookup table with a fallback
#[derive(Debug, Clone)]
pub struct CannedResponder {
    responses: HashMap<String, String>,
    fallback: String,
}

impl CannedResponder {
    pub fn new(fallback: &str) -> Self {
        CannedResponder {
            responses: HashMap::new(),
            fallback: fallback.to_string(),
        }
    }

    /// The four suggested questions and their answers
    pub fn builtin() -> Self {
        let mut responder = CannedResponder::new(FALLBACK_REPLY);
        for (question, answer) in SUGGESTED_QUESTIONS.iter().zip(CANNED_ANSWERS.iter()) {
            responder.add_response(question, answer);
        }
        responder
    }

    pub fn add_response(&mut self, question: &str, answer: &str) {
        self.responses.insert(question.to_string(), answer.to_string());
    }

    /// Exact, case-sensitive lookup
    pub fn reply_for(&self, text: &str) -> &str {
        self.responses
            .get(text)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    pub fn knows(&self, text: &str) -> bool {
        self.responses.contains_key(text)
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// MESSAGES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: &str) -> Self {
        ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.to_string(),
            sent_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoachState {
    Idle,
    Typing,
}

// ============================================================================
// PENDING REPLY
// ============================================================================

/// The delayed half of an exchange. Owns everything it needs, so it can be
/// moved into a spawned task.
#[derive(Debug)]
pub struct PendingReply {
    epoch: u64,
    question: String,
    delay: Duration,
    responder: Arc<CannedResponder>,
}

/// A resolved answer waiting to be appended to the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    epoch: u64,
    pub content: String,
}

impl PendingReply {
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Wait out the typing delay, then look the question up
    pub async fn resolve(self) -> Reply {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Reply {
            epoch: self.epoch,
            content: self.responder.reply_for(&self.question).to_string(),
        }
    }
}

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone)]
pub struct CoachSession {
    messages: Vec<ChatMessage>,
    state: CoachState,
    epoch: u64,
    delay: Duration,
    responder: Arc<CannedResponder>,
}

impl CoachSession {
    pub fn new(responder: Arc<CannedResponder>, delay: Duration) -> Self {
        CoachSession {
            messages: vec![ChatMessage::new(Role::Assistant, GREETING)],
            state: CoachState::Idle,
            epoch: 0,
            delay,
            responder,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> CoachState {
        self.state
    }

    pub fn is_typing(&self) -> bool {
        self.state == CoachState::Typing
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record the user's message and start typing.
    /// Empty input and input while a reply is outstanding are rejected.
    pub fn submit(&mut self, text: &str) -> FinanceResult<PendingReply> {
        let text = text.trim();
        if text.is_empty() {
            return Err(FinanceError::EmptyMessage);
        }
        if self.is_typing() {
            warn!("coach is still typing, question rejected");
            return Err(FinanceError::CoachBusy);
        }

        self.messages.push(ChatMessage::new(Role::User, text));
        self.state = CoachState::Typing;
        debug!(question = text, known = self.responder.knows(text), "coach question");

        Ok(PendingReply {
            epoch: self.epoch,
            question: text.to_string(),
            delay: self.delay,
            responder: Arc::clone(&self.responder),
        })
    }

    /// Append a resolved reply and return to idle.
    /// Returns None when the chat was cleared after the question was asked.
    pub fn finish(&mut self, reply: Reply) -> Option<&ChatMessage> {
        if reply.epoch != self.epoch {
            debug!(stale_epoch = reply.epoch, epoch = self.epoch, "dropping stale coach reply");
            return None;
        }

        self.messages.push(ChatMessage::new(Role::Assistant, &reply.content));
        self.state = CoachState::Idle;
        self.messages.last()
    }

    /// Submit, wait, finish: one full exchange
    pub async fn ask(&mut self, text: &str) -> FinanceResult<ChatMessage> {
        let pending = self.submit(text)?;
        let reply = pending.resolve().await;
        let content = reply.content.clone();

        Ok(self
            .finish(reply)
            .cloned()
            .unwrap_or_else(|| ChatMessage::new(Role::Assistant, &content)))
    }

    /// Reset the transcript to a single "cleared" greeting
    pub fn clear(&mut self) {
        self.epoch += 1;
        self.state = CoachState::Idle;
        self.messages = vec![ChatMessage::new(Role::Assistant, CLEARED_GREETING)];
        debug!(epoch = self.epoch, "coach chat cleared");
    }
}

impl Default for CoachSession {
    fn default() -> Self {
        Self::new(Arc::new(CannedResponder::builtin()), REPLY_DELAY)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session(delay: Duration) -> CoachSession {
        CoachSession::new(Arc::new(CannedResponder::builtin()), delay)
    }

    #[test]
    fn test_every_suggestion_has_an_answer() {
        let responder = CannedResponder::builtin();

        for question in SUGGESTED_QUESTIONS {
            assert!(responder.knows(question));
            assert_ne!(responder.reply_for(question), FALLBACK_REPLY);
        }
    }

    #[test]
    fn test_answers_keep_their_wording() {
        let responder = CannedResponder::builtin();

        let cuts = responder.reply_for("Where can I cut expenses?");
        assert!(cuts.contains("by 16% over 3 months—great job! Consider carpooling"));

        let biggest = responder.reply_for("What are my biggest spending categories?");
        assert!(biggest.contains("**1. 🏠 Rent & Housing — Birr 1,800 (42%)**"));
        assert!(biggest.contains("Trending down—you've saved Birr 80"));
    }

    #[test]
    fn test_lookup_is_exact() {
        let responder = CannedResponder::builtin();

        assert_eq!(responder.reply_for("where can i cut expenses?"), FALLBACK_REPLY);
        assert_eq!(responder.reply_for("Where can I cut expenses"), FALLBACK_REPLY);
        assert_eq!(responder.reply_for("hello"), FALLBACK_REPLY);
        assert_eq!(responder.reply_for("Where can I cut expenses?"), CANNED_ANSWERS[2]);
    }

    #[test]
    fn test_starts_with_greeting() {
        let chat = session(REPLY_DELAY);

        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].role, Role::Assistant);
        assert_eq!(chat.messages()[0].content, GREETING);
        assert_eq!(chat.state(), CoachState::Idle);
    }

    #[test]
    fn test_empty_message_ignored() {
        let mut chat = session(REPLY_DELAY);

        assert_eq!(chat.submit("   ").unwrap_err(), FinanceError::EmptyMessage);
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.state(), CoachState::Idle);
    }

    #[test]
    fn test_submit_while_typing_is_rejected() {
        let mut chat = session(REPLY_DELAY);

        let _pending = chat.submit("hello").unwrap();
        assert!(chat.is_typing());
        assert_eq!(chat.submit("again").unwrap_err(), FinanceError::CoachBusy);
        assert_eq!(chat.messages().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_waits_for_delay() {
        let mut chat = session(REPLY_DELAY);
        let pending = chat.submit(SUGGESTED_QUESTIONS[1]).unwrap();

        let started = tokio::time::Instant::now();
        let reply = pending.resolve().await;
        assert!(started.elapsed() >= REPLY_DELAY);

        let message = chat.finish(reply).unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert!(message.content.contains("Birr 455.92"));
        assert_eq!(chat.state(), CoachState::Idle);
        assert_eq!(chat.messages().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ask_trims_and_falls_back() {
        let mut chat = session(REPLY_DELAY);

        let answer = chat.ask("  What should I do?  ").await.unwrap();
        assert_eq!(answer.content, FALLBACK_REPLY);
        assert_eq!(chat.messages()[1].content, "What should I do?");

        let answer = chat.ask(&format!(" {} ", SUGGESTED_QUESTIONS[0])).await.unwrap();
        assert_eq!(answer.content, CANNED_ANSWERS[0]);
    }

    #[tokio::test]
    async fn test_clear_discards_in_flight_reply() {
        let mut chat = session(Duration::ZERO);

        let pending = chat.submit(SUGGESTED_QUESTIONS[3]).unwrap();
        chat.clear();
        assert_eq!(chat.state(), CoachState::Idle);

        let reply = pending.resolve().await;
        assert!(chat.finish(reply).is_none());
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].content, CLEARED_GREETING);
    }

    #[tokio::test]
    async fn test_zero_delay_resolves_immediately() {
        let mut chat = session(Duration::ZERO);
        let message = chat.ask("Can I afford a Birr 1,000 vacation?").await.unwrap();

        assert!(message.content.starts_with("Based on your current finances"));
    }
}
