use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::{ApiRequest, ApiResponse};
use crate::session::result::{SentenceResult, Verdict};
use crate::session::sentence::{Lookup, SentenceData};
use crate::session::validation::{ValidationMode, WordValidations};
use crate::ui::line_input::{InputMode, InputResult, LineInput};

/// Reference translation of the current sentence. Requested as soon as the
/// sentence arrives, consumed when the answer is submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    Pending,
    Ready(String),
    Failed,
}

pub struct CurrentSentence {
    pub data: SentenceData,
    pub reference: Reference,
}

/// One validation round: the submitted answer against the reference.
#[derive(Clone, Debug)]
pub struct Round {
    pub user_translation: String,
    pub reference: String,
    pub validations: WordValidations,
    /// Index into the focus words for `y`/`n` judgments.
    pub selected: usize,
    pub posting: bool,
}

#[derive(Clone, Debug)]
pub enum Phase {
    NotStarted,
    Answering { awaiting_reference: bool },
    Validating(Round),
}

pub struct DrillController {
    pub mode: ValidationMode,
    pub phase: Phase,
    pub current: Option<CurrentSentence>,
    pub answer: LineInput,
    pub sentence_loading: bool,
    pub hovered: Option<u32>,
    pub last_error: Option<String>,
    generation: u64,
}

impl DrillController {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            phase: Phase::NotStarted,
            current: None,
            answer: LineInput::new(""),
            sentence_loading: false,
            hovered: None,
            last_error: None,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_started(&self) -> bool {
        !matches!(self.phase, Phase::NotStarted)
    }

    pub fn round(&self) -> Option<&Round> {
        match &self.phase {
            Phase::Validating(round) => Some(round),
            _ => None,
        }
    }

    pub fn awaiting_reference(&self) -> bool {
        matches!(
            self.phase,
            Phase::Answering {
                awaiting_reference: true
            }
        )
    }

    pub fn focus_words(&self) -> &[String] {
        self.current
            .as_ref()
            .map(|c| c.data.focus_words.as_slice())
            .unwrap_or(&[])
    }

    /// True once every focus word has a judgment and nothing is in flight.
    pub fn can_submit_validation(&self) -> bool {
        match self.round() {
            Some(round) => {
                !self.sentence_loading && round.validations.is_complete(self.focus_words())
            }
            None => false,
        }
    }

    pub fn start(&mut self) -> Vec<ApiRequest> {
        if self.is_started() {
            return Vec::new();
        }
        tracing::info!(mode = %self.mode, "drill started");
        self.phase = Phase::Answering {
            awaiting_reference: false,
        };
        self.answer = LineInput::new("");
        vec![self.request_sentence()]
    }

    /// Leave the drill. Responses still in flight belong to an old
    /// generation and are dropped when they arrive.
    pub fn abandon(&mut self) {
        self.generation += 1;
        self.phase = Phase::NotStarted;
        self.current = None;
        self.answer = LineInput::new("");
        self.sentence_loading = false;
        self.hovered = None;
        self.last_error = None;
    }

    fn request_sentence(&mut self) -> ApiRequest {
        self.generation += 1;
        self.sentence_loading = true;
        self.answer.disabled = true;
        self.hovered = None;
        ApiRequest::FetchSentence {
            generation: self.generation,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<ApiRequest> {
        if let Phase::NotStarted = self.phase {
            return match key.code {
                KeyCode::Enter => self.start(),
                _ => Vec::new(),
            };
        }

        if key.code == KeyCode::Esc {
            self.abandon();
            return Vec::new();
        }

        // The shown sentence is about to be replaced; its tokens are inert.
        if self.sentence_loading {
            return Vec::new();
        }

        match key.code {
            KeyCode::Tab => {
                self.hover_step(true);
                return Vec::new();
            }
            KeyCode::BackTab => {
                self.hover_step(false);
                return Vec::new();
            }
            KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return match self.hovered {
                    Some(id) => self.lookup_token(id),
                    None => Vec::new(),
                };
            }
            _ => {}
        }

        if matches!(self.phase, Phase::Validating(_)) {
            self.handle_validating_key(key)
        } else {
            self.handle_answering_key(key)
        }
    }

    fn handle_answering_key(&mut self, key: KeyEvent) -> Vec<ApiRequest> {
        if self.current.is_none() {
            // The last fetch failed and there is nothing to answer yet.
            return match key.code {
                KeyCode::Enter => vec![self.request_sentence()],
                _ => Vec::new(),
            };
        }

        if self.awaiting_reference() {
            return match key.code {
                KeyCode::Enter => self.retry_reference(),
                _ => Vec::new(),
            };
        }

        match self.answer.handle(key) {
            InputResult::Submit => self.submit_answer(),
            InputResult::Continue | InputResult::Ignored => Vec::new(),
        }
    }

    fn submit_answer(&mut self) -> Vec<ApiRequest> {
        if self.sentence_loading || !self.answer.can_submit() {
            return Vec::new();
        }
        let Some(reference) = self.current.as_ref().map(|c| c.reference.clone()) else {
            return Vec::new();
        };

        let user_translation = self.answer.value().to_string();
        self.answer.mode = InputMode::Display;
        tracing::info!(answer = %user_translation, "answer submitted");

        match reference {
            Reference::Ready(reference) => {
                self.enter_validating(user_translation, reference);
                Vec::new()
            }
            Reference::Pending => {
                self.phase = Phase::Answering {
                    awaiting_reference: true,
                };
                Vec::new()
            }
            Reference::Failed => {
                self.phase = Phase::Answering {
                    awaiting_reference: true,
                };
                self.retry_reference()
            }
        }
    }

    fn retry_reference(&mut self) -> Vec<ApiRequest> {
        let generation = self.generation;
        match self.current.as_mut() {
            Some(current) if current.reference == Reference::Failed => {
                current.reference = Reference::Pending;
                vec![ApiRequest::TranslateReference {
                    generation,
                    message: current.data.message.clone(),
                }]
            }
            _ => Vec::new(),
        }
    }

    fn enter_validating(&mut self, user_translation: String, reference: String) {
        self.phase = Phase::Validating(Round {
            user_translation,
            reference,
            validations: WordValidations::new(),
            selected: 0,
            posting: false,
        });
    }

    fn handle_validating_key(&mut self, key: KeyEvent) -> Vec<ApiRequest> {
        match self.mode {
            ValidationMode::Binary => match key.code {
                KeyCode::Enter => self.post_verdict(Verdict::Whole { is_correct: true }),
                KeyCode::Backspace | KeyCode::Delete => {
                    self.post_verdict(Verdict::Whole { is_correct: false })
                }
                _ => Vec::new(),
            },
            ValidationMode::PerWord => match key.code {
                KeyCode::Enter if self.can_submit_validation() => self.submit_validation(),
                KeyCode::Enter => {
                    self.judge_next(true);
                    Vec::new()
                }
                KeyCode::Backspace | KeyCode::Delete => {
                    self.judge_next(false);
                    Vec::new()
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.select_step(false);
                    Vec::new()
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.select_step(true);
                    Vec::new()
                }
                KeyCode::Char('y') | KeyCode::Char('c') => {
                    self.judge_selected(true);
                    Vec::new()
                }
                KeyCode::Char('n') | KeyCode::Char('x') => {
                    self.judge_selected(false);
                    Vec::new()
                }
                _ => Vec::new(),
            },
        }
    }

    /// Record a judgment for `word`. Returns false for words that are not
    /// focus words of the current sentence or outside a validation round.
    pub fn judge(&mut self, word: &str, correct: bool) -> bool {
        let Some(current) = self.current.as_ref() else {
            return false;
        };
        let Phase::Validating(round) = &mut self.phase else {
            return false;
        };
        if round.posting {
            return false;
        }
        let focus = &current.data.focus_words;
        let accepted = round.validations.judge(focus, word, correct);
        if accepted {
            if let Some(next) = round.validations.next_unjudged(focus) {
                round.selected = focus.iter().position(|w| w == next).unwrap_or(0);
            }
        }
        accepted
    }

    fn judge_next(&mut self, correct: bool) {
        let next = self.round().and_then(|round| {
            round
                .validations
                .next_unjudged(self.focus_words())
                .map(str::to_string)
        });
        if let Some(word) = next {
            self.judge(&word, correct);
        }
    }

    fn judge_selected(&mut self, correct: bool) {
        let word = self
            .round()
            .and_then(|round| self.focus_words().get(round.selected).cloned());
        if let Some(word) = word {
            self.judge(&word, correct);
        }
    }

    fn select_step(&mut self, forward: bool) {
        let count = self.focus_words().len();
        if let Phase::Validating(round) = &mut self.phase {
            if count == 0 {
                return;
            }
            round.selected = if forward {
                (round.selected + 1).min(count - 1)
            } else {
                round.selected.saturating_sub(1)
            };
        }
    }

    /// Post the per-word judgments. Only allowed once every focus word is judged.
    pub fn submit_validation(&mut self) -> Vec<ApiRequest> {
        if self.mode != ValidationMode::PerWord || !self.can_submit_validation() {
            return Vec::new();
        }
        let Some(round) = self.round() else {
            return Vec::new();
        };
        let verdict = Verdict::PerWord {
            word_validations: round.validations.clone(),
            focus_words: self.focus_words().to_vec(),
        };
        self.post_verdict(verdict)
    }

    fn post_verdict(&mut self, verdict: Verdict) -> Vec<ApiRequest> {
        if self.sentence_loading {
            return Vec::new();
        }
        let Some(current) = self.current.as_ref() else {
            return Vec::new();
        };
        let Phase::Validating(round) = &mut self.phase else {
            return Vec::new();
        };

        let result = SentenceResult {
            sentence_data: current.data.clone(),
            english_translation: round.reference.clone(),
            user_translation: round.user_translation.clone(),
            verdict,
        };
        round.posting = true;
        self.sentence_loading = true;
        tracing::info!(sentence = %current.data.message, "posting result");
        vec![ApiRequest::PostResult {
            generation: self.generation,
            result,
        }]
    }

    /// Start a contextual lookup for token `id` (and its separable-verb sibling).
    pub fn lookup_token(&mut self, id: u32) -> Vec<ApiRequest> {
        if self.sentence_loading {
            return Vec::new();
        }
        let generation = self.generation;
        let Some(current) = self.current.as_mut() else {
            return Vec::new();
        };
        if matches!(
            current.data.lookup_of(id),
            Some(Lookup::Loading) | Some(Lookup::Ready(_))
        ) {
            return Vec::new();
        }
        match current.data.lookup_query(id) {
            Ok(word) => {
                current.data.set_lookup(id, Lookup::Loading);
                vec![ApiRequest::TranslateToken {
                    generation,
                    id,
                    word,
                    context: current.data.message.clone(),
                }]
            }
            Err(err) => {
                tracing::error!(id, sentence = %current.data.message, "malformed token data: {err}");
                self.last_error = Some(format!("Malformed sentence data: {err}"));
                Vec::new()
            }
        }
    }

    pub fn hover(&mut self, id: Option<u32>) {
        self.hovered = match (id, self.current.as_ref()) {
            (Some(id), Some(current)) if current.data.lookup_of(id).is_some() => Some(id),
            _ => None,
        };
    }

    fn hover_step(&mut self, forward: bool) {
        let Some(current) = self.current.as_ref() else {
            return;
        };
        let ids = current.data.clickable_ids();
        if ids.is_empty() {
            return;
        }
        let pos = self.hovered.and_then(|h| ids.iter().position(|&i| i == h));
        let next = match (pos, forward) {
            (None, true) => 0,
            (None, false) => ids.len() - 1,
            (Some(p), true) => (p + 1) % ids.len(),
            (Some(p), false) => (p + ids.len() - 1) % ids.len(),
        };
        self.hovered = Some(ids[next]);
    }

    /// Fold a backend response into the drill, returning any follow-up requests.
    pub fn apply(&mut self, response: ApiResponse) -> Vec<ApiRequest> {
        match response {
            ApiResponse::Sentence { generation, result } => {
                if self.is_stale(generation, "sentence") {
                    return Vec::new();
                }
                self.sentence_loading = false;
                self.answer.disabled = false;
                match result {
                    Ok(data) => self.accept_sentence(data.normalize()),
                    Err(err) => {
                        tracing::warn!("sentence fetch failed: {err}");
                        self.last_error = Some(format!("Could not load a sentence: {err}"));
                        Vec::new()
                    }
                }
            }
            ApiResponse::Reference { generation, result } => {
                if self.is_stale(generation, "reference") {
                    return Vec::new();
                }
                self.accept_reference(result.map_err(|e| e.to_string()));
                Vec::new()
            }
            ApiResponse::TokenTranslation {
                generation,
                id,
                result,
            } => {
                if self.is_stale(generation, "token translation") {
                    return Vec::new();
                }
                let Some(current) = self.current.as_mut() else {
                    return Vec::new();
                };
                // Only a lookup this sentence started may be resolved.
                if current.data.lookup_of(id) != Some(&Lookup::Loading) {
                    tracing::debug!(id, "dropping unrequested token translation");
                    return Vec::new();
                }
                match result {
                    Ok(text) => current.data.set_lookup(id, Lookup::Ready(text)),
                    Err(err) => {
                        tracing::warn!(id, "token lookup failed: {err}");
                        current.data.set_lookup(id, Lookup::Failed);
                        self.last_error = Some(format!("Lookup failed: {err}"));
                    }
                }
                Vec::new()
            }
            ApiResponse::ResultPosted { generation, result } => {
                if self.is_stale(generation, "result ack") {
                    return Vec::new();
                }
                match result {
                    Ok(()) => {
                        self.phase = Phase::Answering {
                            awaiting_reference: false,
                        };
                        self.answer = LineInput::new("");
                        self.last_error = None;
                        vec![self.request_sentence()]
                    }
                    Err(err) => {
                        tracing::warn!("posting result failed: {err}");
                        self.sentence_loading = false;
                        if let Phase::Validating(round) = &mut self.phase {
                            round.posting = false;
                        }
                        self.last_error = Some(format!("Could not submit result: {err}"));
                        Vec::new()
                    }
                }
            }
            // Proficiency is not tied to a sentence; the app owns it.
            ApiResponse::Proficiency(_) => Vec::new(),
        }
    }

    fn is_stale(&self, generation: u64, what: &str) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "dropping stale {what} response"
            );
            return true;
        }
        false
    }

    fn accept_sentence(&mut self, data: SentenceData) -> Vec<ApiRequest> {
        tracing::info!(sentence = %data.message, focus = ?data.focus_words, "sentence received");
        let message = data.message.clone();
        self.current = Some(CurrentSentence {
            data,
            reference: Reference::Pending,
        });
        self.phase = Phase::Answering {
            awaiting_reference: false,
        };
        self.answer = LineInput::new("");
        self.hovered = None;
        self.last_error = None;
        vec![ApiRequest::TranslateReference {
            generation: self.generation,
            message,
        }]
    }

    fn accept_reference(&mut self, result: Result<String, String>) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        match result {
            Ok(text) => {
                current.reference = Reference::Ready(text.clone());
                if self.awaiting_reference() {
                    let user_translation = self.answer.value().to_string();
                    self.enter_validating(user_translation, text);
                }
            }
            Err(err) => {
                tracing::warn!("reference translation failed: {err}");
                current.reference = Reference::Failed;
                self.last_error = Some(format!(
                    "Reference translation unavailable: {err} (Enter retries)"
                ));
            }
        }
    }
}
