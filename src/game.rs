use crate::pool::WordPool;
use rand::seq::SliceRandom;

/// Round length used when nothing else is configured, in ticks (one per second).
pub const DEFAULT_SESSION_TICKS: u64 = 60;

/// What happens when the word queue drains mid-round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndPolicy {
    /// Reshuffle the pool back into the queue and keep playing until the
    /// countdown expires.
    Refill,
    /// End the round as soon as the queue is exhausted.
    FinishOnEmpty,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub session_ticks: u64,
    pub end_policy: EndPolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session_ticks: DEFAULT_SESSION_TICKS,
            end_policy: EndPolicy::Refill,
        }
    }
}

/// One play-through: a shuffled word queue, a running score, and a countdown.
///
/// The host drives it with `mark_correct`/`mark_skip` and one `on_tick` per
/// elapsed second. When the countdown hits zero the session freezes and the
/// `finished` flag goes pending until `consume_finished` resets it, so the
/// reaction fires exactly once no matter how often the observing layer
/// re-reads the flag.
#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    pool: WordPool,
    queue: Vec<String>,
    current_word: String,
    score: i32,
    ticks_remaining: u64,
    finished: bool,
    timer_armed: bool,
}

impl GameSession {
    pub fn new(pool: WordPool, config: GameConfig) -> Self {
        Self {
            config,
            pool,
            queue: vec![],
            current_word: String::new(),
            score: 0,
            ticks_remaining: 0,
            finished: false,
            timer_armed: false,
        }
    }

    /// Arms the countdown and deals the first word. Score and the finished
    /// flag are reset, so a session object is reusable in principle, though
    /// the host always constructs a fresh one per round.
    pub fn start(&mut self) {
        self.refill_queue();
        self.score = 0;
        self.finished = false;
        self.ticks_remaining = self.config.session_ticks;
        self.timer_armed = true;
        self.pop_word();
    }

    pub fn mark_correct(&mut self) {
        if !self.is_active() {
            return;
        }
        self.score += 1;
        self.advance_word();
    }

    pub fn mark_skip(&mut self) {
        if !self.is_active() {
            return;
        }
        self.score -= 1;
        self.advance_word();
    }

    /// One countdown step. Ignored unless the timer is armed, which makes a
    /// tick delivered after expiry or dispose harmless.
    pub fn on_tick(&mut self) {
        if !self.timer_armed {
            return;
        }
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        if self.ticks_remaining == 0 {
            self.finish();
        }
    }

    /// Acknowledges the finished event. Harmless with nothing pending.
    pub fn consume_finished(&mut self) {
        self.finished = false;
    }

    /// Disarms the countdown. Idempotent, and safe whether or not the timer
    /// already expired.
    pub fn dispose(&mut self) {
        self.timer_armed = false;
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn remaining_ticks(&self) -> u64 {
        self.ticks_remaining
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    /// True while commands still mutate state: started, not expired, not
    /// disposed.
    pub fn is_active(&self) -> bool {
        self.timer_armed
    }

    fn finish(&mut self) {
        self.timer_armed = false;
        self.finished = true;
    }

    fn advance_word(&mut self) {
        if self.queue.is_empty() {
            match self.config.end_policy {
                EndPolicy::Refill => self.refill_queue(),
                EndPolicy::FinishOnEmpty => {
                    self.finish();
                    return;
                }
            }
        }
        self.pop_word();
    }

    fn refill_queue(&mut self) {
        self.queue = self.pool.words.clone();
        self.queue.shuffle(&mut rand::thread_rng());
        // Keep the same word from showing twice in a row across the refill
        // boundary when the pool allows it.
        if self.queue.len() > 1 && self.queue.first() == Some(&self.current_word) {
            let front = self.queue.remove(0);
            self.queue.push(front);
        }
    }

    fn pop_word(&mut self) {
        self.current_word = self.queue.remove(0);
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.dispose();
    }
}
