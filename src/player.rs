//! Whiteboard player: step navigation plus staggered drawing reveals.
//!
//! States are `ViewingStep(n)` for n in 0..step_count. `next`/`previous` move by
//! one and are no-ops at the ends. Every `schedule` call on the
//! `RevealScheduler` takes a fresh generation and shows drawing i after
//! `i * stagger`.
//!
//! Generations only ever grow for the lifetime of a scheduler, across steps
//! and across re-opened solutions. A step change aborts every pending task, a
//! task that still wakes up re-checks the generation before emitting, and the
//! receiver drops anything already queued whose generation is no longer
//! current (`RevealScheduler::is_current`).

use std::sync::{
  atomic::{AtomicU64, Ordering},
  Arc,
};
use std::time::Duration;

use serde::Serialize;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, instrument};

use crate::domain::{Solution, WhiteboardStep};
use crate::error::{Result, TutorError};
use crate::render::render_drawing;

#[derive(Debug)]
pub struct Player {
  solution: Solution,
  index: usize,
}

/// Snapshot of what the player shows right now.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
  pub title: String,
  pub index: usize,
  pub count: usize,
  pub explanation: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub final_answer: Option<String>,
  pub can_previous: bool,
  pub can_next: bool,
}

impl Player {
  pub fn new(solution: Solution) -> Result<Self> {
    if solution.steps.is_empty() {
      return Err(TutorError::validation("solution has no steps to play"));
    }
    Ok(Self { solution, index: 0 })
  }

  pub fn index(&self) -> usize {
    self.index
  }

  pub fn step_count(&self) -> usize {
    self.solution.steps.len()
  }

  pub fn current_step(&self) -> &WhiteboardStep {
    &self.solution.steps[self.index]
  }

  pub fn can_previous(&self) -> bool {
    self.index > 0
  }

  pub fn can_next(&self) -> bool {
    self.index + 1 < self.step_count()
  }

  pub fn is_last(&self) -> bool {
    !self.can_next()
  }

  /// Final answer, surfaced only on the last step.
  pub fn final_answer(&self) -> Option<&str> {
    self.is_last().then_some(self.solution.final_answer.as_str())
  }

  /// Advance one step. Returns false (and changes nothing) at the last step.
  pub fn next(&mut self) -> bool {
    if !self.can_next() {
      return false;
    }
    self.index += 1;
    true
  }

  /// Go back one step. Returns false (and changes nothing) at step 0.
  pub fn previous(&mut self) -> bool {
    if !self.can_previous() {
      return false;
    }
    self.index -= 1;
    true
  }

  pub fn view(&self) -> StepView {
    StepView {
      title: self.solution.title.clone(),
      index: self.index,
      count: self.step_count(),
      explanation: self.current_step().explanation.clone(),
      final_answer: self.final_answer().map(str::to_string),
      can_previous: self.can_previous(),
      can_next: self.can_next(),
    }
  }

  /// Reveal delays for the current step: drawing i at `i * stagger`.
  pub fn reveal_schedule(&self, stagger: Duration) -> Vec<(usize, Duration)> {
    (0..self.current_step().drawings.len())
      .map(|i| (i, stagger * i as u32))
      .collect()
  }
}

/// One drawing becoming visible.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealEvent {
  pub generation: u64,
  pub step: usize,
  pub index: usize,
  pub drawing_id: String,
  pub svg: String,
}

#[derive(Debug)]
pub struct RevealScheduler {
  stagger: Duration,
  tx: mpsc::UnboundedSender<RevealEvent>,
  /// Last generation handed out.
  issued: u64,
  /// Generation whose reveals may still surface; `u64::MAX` when none.
  current: Arc<AtomicU64>,
  pending: Vec<JoinHandle<()>>,
}

impl RevealScheduler {
  pub fn new(stagger: Duration, tx: mpsc::UnboundedSender<RevealEvent>) -> Self {
    Self { stagger, tx, issued: 0, current: Arc::new(AtomicU64::new(u64::MAX)), pending: Vec::new() }
  }

  /// Cancel whatever is pending and schedule the player's current step under
  /// a new generation, which is returned.
  #[instrument(level = "debug", skip_all, fields(step = player.index(), generation = tracing::field::Empty))]
  pub fn schedule(&mut self, player: &Player) -> u64 {
    self.cancel();
    self.issued += 1;
    let generation = self.issued;
    tracing::Span::current().record("generation", generation);
    self.current.store(generation, Ordering::SeqCst);

    let step = player.index();
    let drawings = &player.current_step().drawings;
    for (index, delay) in player.reveal_schedule(self.stagger) {
      let drawing = &drawings[index];
      let event = RevealEvent {
        generation,
        step,
        index,
        drawing_id: drawing.id.clone(),
        svg: render_drawing(drawing),
      };
      let tx = self.tx.clone();
      let current = Arc::clone(&self.current);
      self.pending.push(tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if current.load(Ordering::SeqCst) == event.generation {
          let _ = tx.send(event);
        }
      }));
    }
    generation
  }

  /// Whether an event taken off the channel still belongs to the live schedule.
  pub fn is_current(&self, ev: &RevealEvent) -> bool {
    ev.generation == self.current.load(Ordering::SeqCst)
  }

  /// Abort every pending reveal.
  pub fn cancel(&mut self) {
    let n = self.pending.len();
    for handle in self.pending.drain(..) {
      handle.abort();
    }
    // invalidate tasks that already got past their sleep
    self.current.store(u64::MAX, Ordering::SeqCst);
    if n > 0 {
      debug!(target: "player", aborted = n, "Pending reveals cancelled");
    }
  }
}

impl Drop for RevealScheduler {
  fn drop(&mut self) {
    self.cancel();
  }
}
