//! SupportOrchestrator - drives one customer turn at a time through a
//! support session.
//!
//! A turn is a sequence of short critical sections separated by pauses:
//! lock the session, mutate, unlock, pause, look the session up again. The
//! session lock is never held across a pause, so readers can observe
//! intermediate phases such as `Transferring`. When a pause ends and the
//! session has been removed from the store, the rest of the turn is dropped.
//!
//! Every scripted sequence runs on its own task. The caller only awaits the
//! result, so a dropped request never leaves a session half-transferred.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::conversation::{DisplayTag, Message, Sender};
use crate::domain::foundation::{CsatRating, DomainError, SessionId, Timestamp};
use crate::domain::support::{
    rating_acknowledgement, CancellationReason, FlowProfile, KeywordClassifier, Script, StepEffect, SupportFlow,
    SupportSession, TurnRoute, ASSISTANT_INITIALS, ESCALATION_ACCEPTED,
    ESCALATION_DECLINED,
};
use crate::ports::{
    AIError, Assistant, AssistantError, AssistantReply, AssistantRequest, Pacer, SessionHandle,
    SessionStore, SessionStoreError,
};

/// Pause between a star tap and its acknowledgement.
pub const RATING_ACK_DELAY: Duration = Duration::from_millis(500);

/// Errors from orchestrator operations.
#[derive(Debug, thiserror::Error)]
pub enum SupportError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] SessionStoreError),

    #[error("Scripted sequence for session {0} did not complete")]
    Interrupted(SessionId),
}

/// Messages appended during one operation, plus the session afterwards.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub appended: Vec<Message>,
    pub session: SupportSession,
}

/// Flow profile paired with the assistant that answers for it.
#[derive(Clone)]
pub struct FlowRuntime {
    pub profile: FlowProfile,
    pub assistant: Arc<dyn Assistant>,
}

impl FlowRuntime {
    pub fn new(profile: FlowProfile, assistant: Arc<dyn Assistant>) -> Self {
        Self { profile, assistant }
    }
}

/// How a scripted sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptEnd {
    Completed,
    /// An escalation had already fired; nothing was appended.
    AlreadyEscalated,
}

pub struct SupportOrchestrator {
    store: Arc<dyn SessionStore>,
    pacer: Arc<dyn Pacer>,
    classifier: Arc<KeywordClassifier>,
    appointment: FlowRuntime,
    explore: FlowRuntime,
    rng: StdMutex<StdRng>,
}

impl SupportOrchestrator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        pacer: Arc<dyn Pacer>,
        classifier: Arc<KeywordClassifier>,
        appointment: FlowRuntime,
        explore: FlowRuntime,
    ) -> Self {
        Self {
            store,
            pacer,
            classifier,
            appointment,
            explore,
            rng: StdMutex::new(StdRng::from_entropy()),
        }
    }

    /// Replaces the senior agent response picker (seeded in tests).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = StdMutex::new(rng);
        self
    }

    fn runtime(&self, flow: SupportFlow) -> &FlowRuntime {
        match flow {
            SupportFlow::Appointment => &self.appointment,
            SupportFlow::Explore => &self.explore,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a session and plays the flow's opening script.
    pub async fn start_session(
        self: &Arc<Self>,
        flow: SupportFlow,
    ) -> Result<TurnOutcome, SupportError> {
        let id = SessionId::new();
        self.store.insert(SupportSession::new(id, flow)).await?;
        tracing::info!(session_id = %id, flow = %flow, "Support session started");

        let this = Arc::clone(self);
        let appended = detached(id, async move {
            let opening = this.runtime(flow).profile.opening.clone();
            let mut appended = Vec::new();
            this.run_script(id, &opening, &mut appended).await?;
            Ok::<_, SupportError>(appended)
        })
        .await?;

        self.outcome(id, appended).await
    }

    pub async fn get_session(&self, id: SessionId) -> Result<SupportSession, SupportError> {
        let handle = self.handle(id).await?;
        let session = handle.lock().await;
        Ok(session.clone())
    }

    /// Destroys a session. Turns still running for it stop at their next step.
    pub async fn end_session(&self, id: SessionId) -> Result<(), SupportError> {
        if !self.store.remove(&id).await {
            return Err(SupportError::SessionNotFound(id));
        }
        tracing::info!(session_id = %id, "Support session ended");
        Ok(())
    }

    /// Ends every session with no activity for `max_idle`. Returns how many
    /// were ended.
    pub async fn expire_idle(&self, max_idle: Duration) -> usize {
        let mut expired = 0;
        for id in self.store.idle_sessions(max_idle).await {
            if self.end_session(id).await.is_ok() {
                tracing::debug!(session_id = %id, idle_secs = max_idle.as_secs(), "Idle session expired");
                expired += 1;
            }
        }
        expired
    }

    /// Runs [`Self::expire_idle`] every `every` until the handle is aborted.
    pub fn spawn_idle_sweep(self: &Arc<Self>, max_idle: Duration, every: Duration) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let expired = this.expire_idle(max_idle).await;
                if expired > 0 {
                    tracing::info!(expired, "Expired idle support sessions");
                }
            }
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Customer turn
    // ─────────────────────────────────────────────────────────────────────────

    /// Accepts a customer message and runs the reply sequence to completion.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if the session does not exist or ends mid-turn
    /// - `Domain` with `ValidationFailed`, `InputNotAccepted` or
    ///   `ReplyPending` if the message is refused
    pub async fn send_message(
        self: &Arc<Self>,
        id: SessionId,
        text: &str,
    ) -> Result<TurnOutcome, SupportError> {
        let handle = self.handle(id).await?;
        let (turn, flow) = {
            let mut session = handle.lock().await;
            let flow = session.flow();
            let window = self.runtime(flow).profile.history_window;
            (session.begin_user_turn(text, &self.classifier, window)?, flow)
        };

        if turn.declined {
            tracing::debug!(session_id = %id, "Customer message reads as a decline");
        }

        let this = Arc::clone(self);
        let text = text.to_owned();
        let appended = detached(id, async move {
            let mut appended = vec![turn.message];
            let result = this.run_turn(id, flow, turn.route, &text, &mut appended).await;
            this.release(id).await;
            result.map(|()| appended)
        })
        .await?;

        self.outcome(id, appended).await
    }

    async fn run_turn(
        &self,
        id: SessionId,
        flow: SupportFlow,
        route: TurnRoute,
        text: &str,
        appended: &mut Vec<Message>,
    ) -> Result<(), SupportError> {
        let runtime = self.runtime(flow);
        let profile = &runtime.profile;

        match route {
            TurnRoute::SeniorAgent => {
                tracing::debug!(session_id = %id, "Routing to senior agent");
                let reply = self.pick_senior_response(profile);
                self.pacer.pause(profile.typing.for_text(&reply)).await;

                let message = Message::new(Sender::SeniorAgent, reply)?
                    .with_initials(profile.senior_agent.initials.clone());
                self.with_session(id, |session| {
                    appended.push(session.append(message));
                    Ok(())
                })
                .await?;
            }
            TurnRoute::OpenRating => {
                tracing::debug!(session_id = %id, "Closure accepted, opening rating prompt");
                self.pacer.pause(profile.closure_accept_delay).await;
                self.with_session(id, |session| session.open_rating_prompt().map_err(Into::into))
                    .await?;
            }
            TurnRoute::Assistant { context } => {
                let request = AssistantRequest::new(text, context).for_session(id);
                match self.ask(runtime.assistant.as_ref(), request).await {
                    Ok(reply) => {
                        self.pacer.pause(profile.typing.for_text(&reply.text)).await;

                        let message = self.assistant_message(profile, &reply.text)?;
                        self.with_session(id, |session| {
                            appended.push(session.record_assistant_reply(message, &self.classifier));
                            Ok(())
                        })
                        .await?;

                        if reply.should_escalate {
                            tracing::info!(
                                session_id = %id,
                                escalation_type = ?reply.escalation_type,
                                "Escalation requested"
                            );
                            let script = profile.escalation_script();
                            self.run_script(id, &script, appended).await?;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(session_id = %id, error = %err, "Assistant reply failed, using fallback");
                        self.pacer.pause(profile.fallback_delay).await;

                        let message = self.assistant_message(profile, &profile.fallback_text)?;
                        self.with_session(id, |session| {
                            appended.push(session.append(message));
                            Ok(())
                        })
                        .await?;
                    }
                }

                let auto = self
                    .with_session(id, |session| {
                        Ok(session.should_auto_escalate(profile.auto_escalate_after))
                    })
                    .await?;
                if auto {
                    tracing::info!(session_id = %id, "Turn threshold reached, auto-escalating");
                    let script = profile.auto_escalation_script();
                    self.run_script(id, &script, appended).await?;
                }
            }
        }

        Ok(())
    }

    async fn ask(
        &self,
        assistant: &dyn Assistant,
        request: AssistantRequest,
    ) -> Result<AssistantReply, AssistantError> {
        let reply = assistant.reply(request).await?;
        if reply.text.trim().is_empty() {
            return Err(AIError::EmptyResponse.into());
        }
        Ok(reply)
    }

    fn pick_senior_response(&self, profile: &FlowProfile) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        profile.senior_agent.pick_response(&mut *rng).to_string()
    }

    fn assistant_message(&self, profile: &FlowProfile, text: &str) -> Result<Message, DomainError> {
        let mut message = Message::new(Sender::Agent, text)?;
        if let Some(initials) = &profile.assistant_initials {
            message = message.with_initials(initials.clone());
        }
        if profile.tag_tables {
            message = message.with_tag(DisplayTag::detect(text));
        }
        Ok(message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rating and post-rating escalation
    // ─────────────────────────────────────────────────────────────────────────

    /// Records a star rating, acknowledges it and moves to `Closed` or
    /// `EscalationPrompt`.
    ///
    /// # Errors
    ///
    /// - `Domain` with `OutOfRange` for stars outside 1..=5
    /// - `Domain` with `RatingAlreadySubmitted` or `InvalidStateTransition`
    pub async fn submit_rating(
        self: &Arc<Self>,
        id: SessionId,
        stars: u8,
    ) -> Result<TurnOutcome, SupportError> {
        let rating = CsatRating::new(stars).map_err(DomainError::from)?;
        let handle = self.handle(id).await?;
        handle.lock().await.submit_rating(rating)?;
        tracing::info!(session_id = %id, stars, "Rating submitted");

        let this = Arc::clone(self);
        let appended = detached(id, async move {
            let mut appended = Vec::new();
            let result = this.acknowledge_rating(id, stars, &mut appended).await;
            this.release(id).await;
            result.map(|()| appended)
        })
        .await?;

        self.outcome(id, appended).await
    }

    async fn acknowledge_rating(
        &self,
        id: SessionId,
        stars: u8,
        appended: &mut Vec<Message>,
    ) -> Result<(), SupportError> {
        self.pacer.pause(RATING_ACK_DELAY).await;

        let message = Message::system(rating_acknowledgement(stars))?;
        let next = self
            .with_session(id, |session| {
                appended.push(session.append(message));
                session.resolve_rating().map_err(Into::into)
            })
            .await?;

        tracing::debug!(session_id = %id, phase = %next, "Rating resolved");
        Ok(())
    }

    /// Answers the question shown after a one-star rating.
    pub async fn choose_escalation(
        self: &Arc<Self>,
        id: SessionId,
        escalate: bool,
    ) -> Result<TurnOutcome, SupportError> {
        let handle = self.handle(id).await?;
        let (flow, first) = {
            let mut session = handle.lock().await;
            session.choose_escalation(escalate)?;

            let text = if escalate { ESCALATION_ACCEPTED } else { ESCALATION_DECLINED };
            let message = Message::new(Sender::Agent, text)?.with_initials(ASSISTANT_INITIALS);
            (session.flow(), session.append(message))
        };

        let appended = if escalate {
            tracing::info!(session_id = %id, "Escalation accepted after low rating");
            let this = Arc::clone(self);
            detached(id, async move {
                let mut appended = vec![first];
                let script = this.runtime(flow).profile.escalation_script();
                let result = this.run_script(id, &script, &mut appended).await;
                this.release(id).await;
                result.map(|_| appended)
            })
            .await?
        } else {
            tracing::info!(session_id = %id, "Escalation declined, chat closed");
            vec![first]
        };

        self.outcome(id, appended).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Booking
    // ─────────────────────────────────────────────────────────────────────────

    /// Cancels the appointment behind an appointment chat.
    pub async fn cancel_appointment(
        &self,
        id: SessionId,
        reason: CancellationReason,
    ) -> Result<SupportSession, SupportError> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        session.cancel_appointment(reason)?;
        tracing::info!(session_id = %id, reason = %reason, "Appointment cancelled");
        Ok(session.clone())
    }

    /// Moves the appointment to one of the slots offered from today.
    pub async fn reschedule_appointment(
        &self,
        id: SessionId,
        date: NaiveDate,
        time: &str,
    ) -> Result<SupportSession, SupportError> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        session.reschedule_appointment(date, time, Timestamp::now().date())?;
        tracing::info!(session_id = %id, %date, time, "Appointment rescheduled");
        Ok(session.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scripts and session access
    // ─────────────────────────────────────────────────────────────────────────

    async fn run_script(
        &self,
        id: SessionId,
        script: &Script,
        appended: &mut Vec<Message>,
    ) -> Result<ScriptEnd, SupportError> {
        for step in script.steps() {
            self.pacer.pause(step.delay).await;

            let mut message = Message::new(step.sender, step.text.clone())?;
            if let Some(initials) = &step.initials {
                message = message.with_initials(initials.clone());
            }

            let end = self
                .with_session(id, |session| {
                    if step.effect == StepEffect::BeginTransfer && !session.begin_transfer()? {
                        return Ok(Some(ScriptEnd::AlreadyEscalated));
                    }
                    appended.push(session.append(message));
                    if step.effect == StepEffect::CompleteTransfer {
                        session.complete_transfer()?;
                    }
                    Ok(None)
                })
                .await?;

            if let Some(end) = end {
                tracing::debug!(session_id = %id, "Escalation already fired, script skipped");
                return Ok(end);
            }
            if step.effect == StepEffect::CompleteTransfer {
                tracing::info!(session_id = %id, "Senior agent joined");
            }
        }
        Ok(ScriptEnd::Completed)
    }

    async fn handle(&self, id: SessionId) -> Result<SessionHandle, SupportError> {
        self.store
            .get(&id)
            .await
            .ok_or(SupportError::SessionNotFound(id))
    }

    /// Runs `f` under the session lock, if the session still exists.
    async fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut SupportSession) -> Result<T, SupportError>,
    ) -> Result<T, SupportError> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        f(&mut session)
    }

    /// Releases the input lock. A session that is gone needs no release.
    async fn release(&self, id: SessionId) {
        if let Some(handle) = self.store.get(&id).await {
            handle.lock().await.finish_turn();
        }
    }

    async fn outcome(
        &self,
        id: SessionId,
        appended: Vec<Message>,
    ) -> Result<TurnOutcome, SupportError> {
        let session = self.get_session(id).await?;
        Ok(TurnOutcome { appended, session })
    }
}

/// Runs `work` on its own task and waits for it. Dropping the returned
/// future leaves the task running to completion.
async fn detached<T, F>(id: SessionId, work: F) -> Result<T, SupportError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, SupportError>> + Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(session_id = %id, error = %err, "Scripted sequence task failed");
            Err(SupportError::Interrupted(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::pacing::RecordingPacer;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::support::{
        EscalationType, PhraseLists, SeniorAgentProfile, SupportPhase, TypingDelay,
        TRANSFER_NOTICE,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use tokio::sync::Semaphore;

    // ════════════════════════════════════════════════════════════════════════
    // Fixtures
    // ════════════════════════════════════════════════════════════════════════

    /// Assistant that plays back queued replies; an empty queue fails.
    #[derive(Default)]
    struct ScriptedAssistant {
        replies: StdMutex<VecDeque<Option<AssistantReply>>>,
        requests: StdMutex<Vec<AssistantRequest>>,
    }

    impl ScriptedAssistant {
        fn replying(replies: Vec<Option<AssistantReply>>) -> Arc<Self> {
            Arc::new(Self {
                replies: StdMutex::new(replies.into()),
                requests: StdMutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_request(&self) -> AssistantRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Assistant for ScriptedAssistant {
        async fn reply(&self, request: AssistantRequest) -> Result<AssistantReply, AssistantError> {
            self.requests.lock().unwrap().push(request);
            match self.replies.lock().unwrap().pop_front().flatten() {
                Some(reply) => Ok(reply),
                None => Err(AIError::unavailable("scripted failure").into()),
            }
        }

        fn fallback_text(&self) -> &str {
            "fallback"
        }
    }

    struct Harness {
        orchestrator: Arc<SupportOrchestrator>,
        store: InMemorySessionStore,
        pacer: RecordingPacer,
        appointment: Arc<ScriptedAssistant>,
        explore: Arc<ScriptedAssistant>,
    }

    fn harness_with_pacer(
        appointment: Vec<Option<AssistantReply>>,
        explore: Vec<Option<AssistantReply>>,
        pacer: Arc<dyn Pacer>,
        store: InMemorySessionStore,
    ) -> (Arc<SupportOrchestrator>, Arc<ScriptedAssistant>, Arc<ScriptedAssistant>) {
        let appointment = ScriptedAssistant::replying(appointment);
        let explore = ScriptedAssistant::replying(explore);
        let orchestrator = SupportOrchestrator::new(
            Arc::new(store),
            pacer,
            Arc::new(KeywordClassifier::new(PhraseLists::default())),
            FlowRuntime::new(FlowProfile::appointment(), appointment.clone()),
            FlowRuntime::new(FlowProfile::explore(), explore.clone()),
        )
        .with_rng(StdRng::seed_from_u64(7));
        (Arc::new(orchestrator), appointment, explore)
    }

    fn harness(
        appointment: Vec<Option<AssistantReply>>,
        explore: Vec<Option<AssistantReply>>,
    ) -> Harness {
        let store = InMemorySessionStore::new();
        let pacer = RecordingPacer::new();
        let (orchestrator, appointment, explore) =
            harness_with_pacer(appointment, explore, Arc::new(pacer.clone()), store.clone());
        Harness {
            orchestrator,
            store,
            pacer,
            appointment,
            explore,
        }
    }

    fn plain(text: &str) -> Option<AssistantReply> {
        Some(AssistantReply::plain(text))
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    const CLOSURE_OFFER: &str = "I'm glad I could help. If you don't have any more queries, I'll go ahead and close this conversation. Would you like to share your feedback?";

    /// Appointment session sitting in the rating prompt.
    async fn session_at_rating_prompt(h: &Harness) -> SessionId {
        let id = h
            .orchestrator
            .start_session(SupportFlow::Appointment)
            .await
            .unwrap()
            .session
            .id()
            .to_owned();
        h.orchestrator.send_message(id, "thanks, that's everything").await.unwrap();
        let outcome = h.orchestrator.send_message(id, "sure").await.unwrap();
        assert_eq!(outcome.session.phase(), SupportPhase::RatingPrompt);
        h.pacer.clear();
        id
    }

    fn texts(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.text()).collect()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Openings
    // ════════════════════════════════════════════════════════════════════════

    mod openings {
        use super::*;

        #[tokio::test]
        async fn appointment_greets_after_join_notice() {
            let h = harness(vec![], vec![]);

            let outcome = h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap();

            assert_eq!(outcome.appended.len(), 2);
            assert_eq!(outcome.appended[0].sender(), Sender::System);
            assert_eq!(outcome.appended[1].sender(), Sender::Agent);
            assert_eq!(outcome.appended[1].initials(), Some("HS"));
            assert_eq!(h.pacer.pauses(), vec![Duration::ZERO, ms(1500)]);
            assert_eq!(outcome.session.phase(), SupportPhase::Bot);
            assert!(outcome.session.accepts_input());
            assert_eq!(h.store.len().await, 1);
        }

        #[tokio::test]
        async fn explore_opens_with_welcome_without_avatar() {
            let h = harness(vec![], vec![]);

            let outcome = h.orchestrator.start_session(SupportFlow::Explore).await.unwrap();

            assert_eq!(outcome.appended.len(), 1);
            assert!(outcome.appended[0].text().starts_with("👋 Welcome to Xplore"));
            assert_eq!(outcome.appended[0].initials(), None);
            assert_eq!(outcome.session.flow(), SupportFlow::Explore);
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Bot turns
    // ════════════════════════════════════════════════════════════════════════

    mod bot_turns {
        use super::*;

        #[tokio::test]
        async fn reply_is_paced_by_typing_delay() {
            let reply = "Your slot is 4:00 PM to 5:00 PM.";
            let h = harness(vec![plain(reply)], vec![]);
            let id = *h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();
            h.pacer.clear();

            let outcome = h.orchestrator.send_message(id, "When is my slot?").await.unwrap();

            assert_eq!(texts(&outcome.appended), vec!["When is my slot?", reply]);
            assert_eq!(outcome.appended[1].initials(), Some("HS"));
            assert_eq!(h.pacer.pauses(), vec![TypingDelay::conversational().for_text(reply)]);
            assert!(outcome.session.accepts_input());
            assert_eq!(outcome.session.phase(), SupportPhase::Bot);
        }

        #[tokio::test]
        async fn context_excludes_system_notices_and_current_message() {
            let h = harness(vec![plain("ok")], vec![]);
            let id = *h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();

            h.orchestrator.send_message(id, "Where is the technician?").await.unwrap();

            let request = h.appointment.last_request();
            assert_eq!(request.message, "Where is the technician?");
            assert_eq!(request.history.len(), 1);
            assert!(request.history[0].text.starts_with("Hello! I'm here to help"));
            assert_eq!(request.session_id, Some(id));
        }

        #[tokio::test]
        async fn failure_appends_fallback_and_leaves_escalation_alone() {
            let h = harness(vec![None], vec![]);
            let id = *h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();
            h.pacer.clear();

            let outcome = h.orchestrator.send_message(id, "I want a refund").await.unwrap();

            assert_eq!(
                outcome.appended[1].text(),
                "Sorry, I'm having a technical issue. I'm here to help with your Thyrocare Labs appointment though."
            );
            assert_eq!(h.pacer.pauses(), vec![ms(1200)]);
            assert!(!outcome.session.escalation_triggered());
            assert_eq!(outcome.session.phase(), SupportPhase::Bot);
            assert!(outcome.session.accepts_input());
        }

        #[tokio::test]
        async fn blank_message_is_refused_without_state_change() {
            let h = harness(vec![], vec![]);
            let id = *h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();

            let err = h.orchestrator.send_message(id, "   ").await.unwrap_err();

            assert!(matches!(err, SupportError::Domain(ref e) if e.code() == ErrorCode::ValidationFailed));
            let session = h.orchestrator.get_session(id).await.unwrap();
            assert_eq!(session.history().len(), 2);
            assert!(session.accepts_input());
            assert_eq!(h.appointment.calls(), 0);
        }

        #[tokio::test]
        async fn unknown_session_is_not_found() {
            let h = harness(vec![], vec![]);

            let err = h.orchestrator.send_message(SessionId::new(), "hi").await.unwrap_err();

            assert!(matches!(err, SupportError::SessionNotFound(_)));
        }

        #[tokio::test]
        async fn second_message_while_reply_pending_is_refused() {
            let store = InMemorySessionStore::new();
            let gate = Arc::new(GatePacer::new());
            let (orchestrator, _, _) =
                harness_with_pacer(vec![plain("first reply")], vec![], gate.clone(), store.clone());
            let id = *orchestrator.start_session(SupportFlow::Explore).await.unwrap().session.id();

            let running = {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move { orchestrator.send_message(id, "first").await })
            };
            while !orchestrator.get_session(id).await.unwrap().awaiting_reply() {
                tokio::task::yield_now().await;
            }

            let err = orchestrator.send_message(id, "second").await.unwrap_err();
            assert!(matches!(err, SupportError::Domain(ref e) if e.code() == ErrorCode::ReplyPending));

            gate.open();
            let outcome = running.await.unwrap().unwrap();
            assert_eq!(texts(&outcome.appended), vec!["first", "first reply"]);
            assert!(outcome.session.accepts_input());
        }
    }

    /// Pacer that blocks until opened. With `only` set, other delays pass.
    struct GatePacer {
        permits: Semaphore,
        only: Option<Duration>,
    }

    impl GatePacer {
        fn new() -> Self {
            Self {
                permits: Semaphore::new(0),
                only: None,
            }
        }

        fn stalling_on(delay: Duration) -> Self {
            Self {
                permits: Semaphore::new(0),
                only: Some(delay),
            }
        }

        fn open(&self) {
            self.permits.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    #[async_trait]
    impl Pacer for GatePacer {
        async fn pause(&self, duration: Duration) {
            if duration.is_zero() || self.only.is_some_and(|only| only != duration) {
                return;
            }
            if let Ok(permit) = self.permits.acquire().await {
                permit.forget();
            }
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Escalation
    // ════════════════════════════════════════════════════════════════════════

    mod escalation {
        use super::*;

        #[tokio::test]
        async fn keyword_escalation_runs_staged_transfer() {
            let reply = "I'm really sorry you're facing this. Let me transfer you to a senior agent right away.";
            let h = harness(
                vec![Some(AssistantReply::escalating(reply, EscalationType::General))],
                vec![],
            );
            let id = *h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();
            h.pacer.clear();

            let outcome = h.orchestrator.send_message(id, "I want to speak to senior staff, I'm angry").await.unwrap();

            let mk = SeniorAgentProfile::mk();
            assert_eq!(
                texts(&outcome.appended),
                vec![
                    "I want to speak to senior staff, I'm angry",
                    reply,
                    TRANSFER_NOTICE,
                    "MK (Senior Agent) has joined the chat.",
                    mk.greeting.as_str(),
                ]
            );
            assert_eq!(outcome.appended[4].sender(), Sender::SeniorAgent);
            assert_eq!(outcome.appended[4].initials(), Some("MK"));
            assert_eq!(
                h.pacer.pauses(),
                vec![
                    TypingDelay::conversational().for_text(reply),
                    ms(1000),
                    ms(3500),
                    ms(2000),
                ]
            );
            assert_eq!(outcome.session.phase(), SupportPhase::SeniorAgent);
            assert!(outcome.session.escalation_triggered());
            assert!(outcome.session.accepts_input());
        }

        #[tokio::test]
        async fn senior_agent_answers_without_assistant() {
            let h = harness(
                vec![Some(AssistantReply::escalating("Transferring", EscalationType::TechnicianContact))],
                vec![],
            );
            let id = *h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();
            h.orchestrator.send_message(id, "number not working").await.unwrap();

            let outcome = h.orchestrator.send_message(id, "I still want a refund").await.unwrap();

            assert_eq!(h.appointment.calls(), 1);
            assert_eq!(outcome.appended.len(), 2);
            let reply = &outcome.appended[1];
            assert_eq!(reply.sender(), Sender::SeniorAgent);
            assert_eq!(reply.initials(), Some("MK"));
            assert!(SeniorAgentProfile::mk().responses.iter().any(|r| r == reply.text()));
            assert_eq!(outcome.session.phase(), SupportPhase::SeniorAgent);
        }

        #[tokio::test]
        async fn explore_auto_escalates_on_fifth_turn() {
            let replies = (1..=5).map(|i| plain(&format!("answer {}", i))).collect();
            let h = harness(vec![], replies);
            let id = *h.orchestrator.start_session(SupportFlow::Explore).await.unwrap().session.id();

            for turn in 1..=4 {
                let outcome = h.orchestrator.send_message(id, &format!("question {}", turn)).await.unwrap();
                assert_eq!(outcome.appended.len(), 2);
                assert_eq!(outcome.session.phase(), SupportPhase::Bot);
            }
            h.pacer.clear();

            let outcome = h.orchestrator.send_message(id, "question 5").await.unwrap();

            let rahul = SeniorAgentProfile::rahul();
            assert_eq!(
                texts(&outcome.appended),
                vec![
                    "question 5",
                    "answer 5",
                    "Sorry to see we were unable to resolve your query, please wait we are escalating your issue to a senior agent.",
                    "Senior Agent is joining...",
                    rahul.greeting.as_str(),
                ]
            );
            assert_eq!(outcome.appended[2].sender(), Sender::System);
            assert_eq!(outcome.appended[2].initials(), None);
            assert_eq!(outcome.appended[4].initials(), Some("R"));
            assert_eq!(&h.pacer.pauses()[1..], &[ms(1000), ms(1500), ms(2000)]);
            assert_eq!(outcome.session.phase(), SupportPhase::SeniorAgent);
            assert_eq!(h.explore.calls(), 5);
        }

        #[tokio::test]
        async fn explore_tags_table_replies() {
            let table = "| Package | Price |\n|---|---|\n| Full Body | ₹799 |";
            let h = harness(vec![], vec![plain(table)]);
            let id = *h.orchestrator.start_session(SupportFlow::Explore).await.unwrap().session.id();

            let outcome = h.orchestrator.send_message(id, "compare packages").await.unwrap();

            assert_eq!(outcome.appended[1].tag(), Some(DisplayTag::Tabular));
            assert_eq!(outcome.appended[1].initials(), None);
        }

        #[tokio::test]
        async fn session_removed_mid_turn_stops_the_sequence() {
            let store = InMemorySessionStore::new();
            let pacer = Arc::new(ClearingPacer(store.clone()));
            let (orchestrator, _, explore) =
                harness_with_pacer(vec![], vec![None], pacer, store.clone());
            let id = *orchestrator.start_session(SupportFlow::Explore).await.unwrap().session.id();

            let result = orchestrator.send_message(id, "hello").await;

            assert!(matches!(result, Err(SupportError::SessionNotFound(missing)) if missing == id));
            assert_eq!(explore.calls(), 1);
            assert_eq!(store.len().await, 0);
        }
    }

    mod dropped_callers {
        use super::*;

        async fn wait_for(
            orchestrator: &SupportOrchestrator,
            id: SessionId,
            done: impl Fn(&SupportSession) -> bool,
        ) {
            while !done(&orchestrator.get_session(id).await.unwrap()) {
                tokio::task::yield_now().await;
            }
        }

        #[tokio::test]
        async fn transfer_completes_after_caller_is_dropped() {
            let gate = Arc::new(GatePacer::stalling_on(ms(3500)));
            let (orchestrator, _, _) = harness_with_pacer(
                vec![Some(AssistantReply::escalating(
                    "Let me try the technician and bring in a senior agent.",
                    EscalationType::TechnicianContact,
                ))],
                vec![],
                gate.clone(),
                InMemorySessionStore::new(),
            );
            let id = *orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();

            let caller = {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    orchestrator.send_message(id, "the technician is not picking up").await
                })
            };
            wait_for(&orchestrator, id, |s| s.phase() == SupportPhase::Transferring).await;
            caller.abort();
            assert!(caller.await.unwrap_err().is_cancelled());

            gate.open();
            wait_for(&orchestrator, id, |s| s.accepts_input()).await;

            let session = orchestrator.get_session(id).await.unwrap();
            assert_eq!(session.phase(), SupportPhase::SeniorAgent);
            assert_eq!(
                session.history().messages().last().map(|m| m.sender()),
                Some(Sender::SeniorAgent)
            );

            let outcome = orchestrator.send_message(id, "any update?").await.unwrap();
            assert_eq!(outcome.appended[1].sender(), Sender::SeniorAgent);
        }

        #[tokio::test]
        async fn rating_resolves_after_caller_is_dropped() {
            let gate = Arc::new(GatePacer::stalling_on(RATING_ACK_DELAY));
            let (orchestrator, _, _) = harness_with_pacer(
                vec![plain(CLOSURE_OFFER)],
                vec![],
                gate.clone(),
                InMemorySessionStore::new(),
            );
            let id = *orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();
            orchestrator.send_message(id, "thanks, that's everything").await.unwrap();
            orchestrator.send_message(id, "sure").await.unwrap();

            let caller = {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move { orchestrator.submit_rating(id, 5).await })
            };
            wait_for(&orchestrator, id, |s| s.csat_rating().is_some()).await;
            caller.abort();
            let _ = caller.await;

            gate.open();
            wait_for(&orchestrator, id, |s| s.phase() == SupportPhase::Closed).await;
            assert!(!orchestrator.get_session(id).await.unwrap().awaiting_reply());
        }
    }

    /// Pacer that ends every session whenever a real delay is requested.
    struct ClearingPacer(InMemorySessionStore);

    #[async_trait]
    impl Pacer for ClearingPacer {
        async fn pause(&self, duration: Duration) {
            if !duration.is_zero() {
                self.0.clear().await;
            }
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Closure and rating
    // ════════════════════════════════════════════════════════════════════════

    mod rating {
        use super::*;

        fn closing_harness() -> Harness {
            harness(vec![plain(CLOSURE_OFFER)], vec![])
        }

        #[tokio::test]
        async fn acceptance_after_closure_offer_opens_rating_without_assistant() {
            let h = closing_harness();
            let id = *h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();

            let offered = h.orchestrator.send_message(id, "thanks, that's everything").await.unwrap();
            assert!(offered.session.bot_offered_closure());
            h.pacer.clear();

            let outcome = h.orchestrator.send_message(id, "sure").await.unwrap();

            assert_eq!(h.appointment.calls(), 1);
            assert_eq!(texts(&outcome.appended), vec!["sure"]);
            assert_eq!(h.pacer.pauses(), vec![ms(1000)]);
            assert_eq!(outcome.session.phase(), SupportPhase::RatingPrompt);
            assert!(!outcome.session.bot_offered_closure());
            assert!(!outcome.session.accepts_input());
        }

        #[tokio::test]
        async fn high_rating_acknowledges_and_closes() {
            let h = closing_harness();
            let id = session_at_rating_prompt(&h).await;

            let outcome = h.orchestrator.submit_rating(id, 4).await.unwrap();

            assert_eq!(
                texts(&outcome.appended),
                vec!["Thank you for your 4-star rating! We appreciate your feedback."]
            );
            assert_eq!(outcome.appended[0].sender(), Sender::System);
            assert_eq!(h.pacer.pauses(), vec![RATING_ACK_DELAY]);
            assert_eq!(outcome.session.phase(), SupportPhase::Closed);
            assert_eq!(outcome.session.csat_rating().map(|r| r.stars()), Some(4));

            let err = h.orchestrator.send_message(id, "hello?").await.unwrap_err();
            assert!(matches!(err, SupportError::Domain(ref e) if e.code() == ErrorCode::InputNotAccepted));
        }

        #[tokio::test]
        async fn rating_is_final_and_bounded() {
            let h = closing_harness();
            let id = session_at_rating_prompt(&h).await;

            let err = h.orchestrator.submit_rating(id, 6).await.unwrap_err();
            assert!(matches!(err, SupportError::Domain(ref e) if e.code() == ErrorCode::OutOfRange));

            h.orchestrator.submit_rating(id, 3).await.unwrap();
            let err = h.orchestrator.submit_rating(id, 5).await.unwrap_err();
            assert!(matches!(err, SupportError::Domain(ref e) if e.code() == ErrorCode::RatingAlreadySubmitted));
        }

        #[tokio::test]
        async fn one_star_then_decline_closes() {
            let h = closing_harness();
            let id = session_at_rating_prompt(&h).await;

            let rated = h.orchestrator.submit_rating(id, 1).await.unwrap();
            assert_eq!(rated.session.phase(), SupportPhase::EscalationPrompt);

            let outcome = h.orchestrator.choose_escalation(id, false).await.unwrap();

            assert_eq!(texts(&outcome.appended), vec![ESCALATION_DECLINED]);
            assert_eq!(outcome.appended[0].initials(), Some("HS"));
            assert_eq!(outcome.session.phase(), SupportPhase::Closed);
            assert!(!outcome.session.escalation_triggered());
        }

        #[tokio::test]
        async fn one_star_then_escalate_hands_off_to_senior_agent() {
            let h = closing_harness();
            let id = session_at_rating_prompt(&h).await;
            h.orchestrator.submit_rating(id, 1).await.unwrap();
            h.pacer.clear();

            let outcome = h.orchestrator.choose_escalation(id, true).await.unwrap();

            assert_eq!(outcome.appended[0].text(), ESCALATION_ACCEPTED);
            assert_eq!(outcome.appended[1].text(), TRANSFER_NOTICE);
            assert_eq!(outcome.appended.len(), 4);
            assert_eq!(h.pacer.pauses(), vec![ms(1000), ms(3500), ms(2000)]);
            assert_eq!(outcome.session.phase(), SupportPhase::SeniorAgent);
            assert!(outcome.session.escalation_triggered());
            assert!(outcome.session.accepts_input());

            let err = h.orchestrator.choose_escalation(id, true).await.unwrap_err();
            assert!(matches!(err, SupportError::Domain(ref e) if e.code() == ErrorCode::InvalidStateTransition));
        }

        #[tokio::test]
        async fn rating_outside_prompt_is_rejected() {
            let h = harness(vec![], vec![]);
            let id = *h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();

            let err = h.orchestrator.submit_rating(id, 5).await.unwrap_err();

            assert!(matches!(err, SupportError::Domain(ref e) if e.code() == ErrorCode::InvalidStateTransition));
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Booking
    // ════════════════════════════════════════════════════════════════════════

    mod booking {
        use super::*;
        use crate::domain::support::AppointmentStatus;

        #[tokio::test]
        async fn cancel_records_the_reason() {
            let h = harness(vec![], vec![]);
            let id = *h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();

            let session = h
                .orchestrator
                .cancel_appointment(id, CancellationReason::PersonalEmergency)
                .await
                .unwrap();

            let booking = session.booking().unwrap();
            assert_eq!(booking.status(), AppointmentStatus::Cancelled);
            assert_eq!(booking.cancellation_reason(), Some(CancellationReason::PersonalEmergency));

            let err = h
                .orchestrator
                .cancel_appointment(id, CancellationReason::Other)
                .await
                .unwrap_err();
            assert!(matches!(err, SupportError::Domain(ref e) if e.code() == ErrorCode::InvalidStateTransition));
        }

        #[tokio::test]
        async fn reschedule_moves_to_an_offered_slot() {
            let h = harness(vec![], vec![]);
            let id = *h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();
            let tomorrow = Timestamp::now().date().succ_opt().unwrap();

            let session = h
                .orchestrator
                .reschedule_appointment(id, tomorrow, "07:00 AM")
                .await
                .unwrap();

            let booking = session.booking().unwrap();
            assert_eq!(booking.status(), AppointmentStatus::Rescheduled);
            assert_eq!(booking.date(), tomorrow);
            assert_eq!(booking.time(), "07:00 AM");
        }

        #[tokio::test]
        async fn explore_chat_cannot_cancel() {
            let h = harness(vec![], vec![]);
            let id = *h.orchestrator.start_session(SupportFlow::Explore).await.unwrap().session.id();

            let err = h
                .orchestrator
                .cancel_appointment(id, CancellationReason::Other)
                .await
                .unwrap_err();

            assert!(matches!(err, SupportError::Domain(ref e) if e.code() == ErrorCode::InvalidStateTransition));
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test(start_paused = true)]
    async fn idle_sweep_ends_abandoned_sessions() {
        let h = harness(vec![], vec![]);
        let abandoned = *h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();
        let sweep = h
            .orchestrator
            .spawn_idle_sweep(Duration::from_secs(30 * 60), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(20 * 60)).await;
        let active = *h.orchestrator.start_session(SupportFlow::Explore).await.unwrap().session.id();
        tokio::time::sleep(Duration::from_secs(15 * 60)).await;

        assert_eq!(h.store.len().await, 1);
        assert!(matches!(
            h.orchestrator.get_session(abandoned).await,
            Err(SupportError::SessionNotFound(_))
        ));
        assert!(h.orchestrator.get_session(active).await.is_ok());
        sweep.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn expire_idle_spares_recent_sessions() {
        let h = harness(vec![], vec![]);
        h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap();
        tokio::time::advance(Duration::from_secs(10 * 60)).await;

        assert_eq!(h.orchestrator.expire_idle(Duration::from_secs(30 * 60)).await, 0);
        assert_eq!(h.orchestrator.expire_idle(Duration::from_secs(5 * 60)).await, 1);
        assert_eq!(h.store.len().await, 0);
    }

    #[tokio::test]
    async fn end_session_removes_it_once() {
        let h = harness(vec![], vec![]);
        let id = *h.orchestrator.start_session(SupportFlow::Appointment).await.unwrap().session.id();

        h.orchestrator.end_session(id).await.unwrap();

        assert!(matches!(h.orchestrator.end_session(id).await, Err(SupportError::SessionNotFound(_))));
        assert!(matches!(h.orchestrator.get_session(id).await, Err(SupportError::SessionNotFound(_))));
    }
}
