// Boot log sequence shown before the desktop
//
// Driven by elapsed time from the host so the sequence is reproducible.

use serde::Serialize;
use std::time::Duration;

pub const BOOT_LOGS: [&str; 7] = [
    "BIOS v28.01.09 CHECK... SUCCESS",
    "ZENITH KERNEL LOADED @ 0x0000006E656C6548",
    "MAPPING VIRTUAL MEMORY... 128TB OK",
    "NEURAL NETWORKS INITIALIZING...",
    "DECRYPTING USER PROFILES...",
    "GPGPU ACCELERATION: ENABLED",
    "UI CORE: READY",
];

pub const LOG_INTERVAL: Duration = Duration::from_millis(350);
pub const COMPLETE_DELAY: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootStage {
    /// Waiting for the first click (audio needs a user gesture)
    AwaitingInteraction,
    Logging,
    Finishing,
    Complete,
}

#[derive(Debug, Clone, Serialize)]
pub struct BootSequence {
    stage: BootStage,
    shown: usize,
    #[serde(skip)]
    elapsed: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct BootView {
    pub stage: BootStage,
    pub logs: Vec<&'static str>,
    pub progress: f64,
}

impl BootSequence {
    pub fn new() -> Self {
        Self {
            stage: BootStage::AwaitingInteraction,
            shown: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// A sequence that starts already finished.
    pub fn skipped() -> Self {
        Self {
            stage: BootStage::Complete,
            shown: BOOT_LOGS.len(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn stage(&self) -> BootStage {
        self.stage
    }

    pub fn is_complete(&self) -> bool {
        self.stage == BootStage::Complete
    }

    pub fn start(&mut self) {
        if self.stage == BootStage::AwaitingInteraction {
            self.stage = BootStage::Logging;
            self.elapsed = Duration::ZERO;
        }
    }

    /// Advance by `delta` of wall time. Returns true when the stage or log
    /// count changed.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if matches!(self.stage, BootStage::AwaitingInteraction | BootStage::Complete) {
            return false;
        }
        let before = (self.stage, self.shown);
        self.elapsed += delta;

        while self.stage == BootStage::Logging && self.elapsed >= LOG_INTERVAL {
            self.elapsed -= LOG_INTERVAL;
            if self.shown < BOOT_LOGS.len() {
                self.shown += 1;
            } else {
                self.stage = BootStage::Finishing;
            }
        }
        if self.stage == BootStage::Finishing && self.elapsed >= COMPLETE_DELAY {
            self.stage = BootStage::Complete;
        }

        before != (self.stage, self.shown)
    }

    pub fn progress(&self) -> f64 {
        self.shown as f64 / BOOT_LOGS.len() as f64 * 100.0
    }

    pub fn view(&self) -> BootView {
        BootView {
            stage: self.stage,
            logs: BOOT_LOGS[..self.shown].to_vec(),
            progress: self.progress(),
        }
    }
}

impl Default for BootSequence {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waits_for_interaction() {
        let mut boot = BootSequence::new();
        assert!(!boot.tick(Duration::from_secs(10)));
        assert_eq!(boot.stage(), BootStage::AwaitingInteraction);
        assert!(boot.view().logs.is_empty());
    }

    #[test]
    fn test_logs_one_line_per_interval() {
        let mut boot = BootSequence::new();
        boot.start();
        assert!(!boot.tick(Duration::from_millis(349)));
        assert!(boot.tick(Duration::from_millis(1)));
        assert_eq!(boot.view().logs, vec![BOOT_LOGS[0]]);

        for _ in 1..BOOT_LOGS.len() {
            boot.tick(LOG_INTERVAL);
        }
        assert_eq!(boot.view().logs.len(), 7);
        assert_eq!(boot.progress(), 100.0);
        assert_eq!(boot.stage(), BootStage::Logging);
    }

    #[test]
    fn test_completes_after_delay() {
        let mut boot = BootSequence::new();
        boot.start();
        boot.tick(LOG_INTERVAL * 8);
        assert_eq!(boot.stage(), BootStage::Finishing);
        boot.tick(Duration::from_millis(1199));
        assert!(!boot.is_complete());
        boot.tick(Duration::from_millis(1));
        assert!(boot.is_complete());
        assert!(!boot.tick(LOG_INTERVAL));
    }

    #[test]
    fn test_skipped_is_complete() {
        let boot = BootSequence::skipped();
        assert!(boot.is_complete());
        assert_eq!(boot.progress(), 100.0);
    }
}
