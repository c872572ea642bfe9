//! Color values and state-dependent color tables.

use serde::{Deserialize, Serialize};

/// Straight-alpha 8-bit RGBA.
pub type Rgba = [u8; 4];

/// Parse `#RRGGBB` or `#AARRGGBB` (leading `#` optional).
pub fn parse_hex(value: &str) -> Option<Rgba> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 0xFF]),
        8 => Some([byte(2)?, byte(4)?, byte(6)?, byte(0)?]),
        _ => None,
    }
}

/// Format as `#AARRGGBB`.
pub fn to_hex(color: Rgba) -> String {
    format!(
        "#{:02X}{:02X}{:02X}{:02X}",
        color[3], color[0], color[1], color[2]
    )
}

/// One row of a [`ColorStateList`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateColor {
    /// State spec. Positive ids must be present, negative ids must be absent.
    /// An empty spec matches every state set.
    pub states: Vec<i32>,
    pub color: Rgba,
}

/// Ordered table mapping view state sets to colors. First matching row wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorStateList {
    entries: Vec<StateColor>,
}

impl ColorStateList {
    pub fn new(entries: Vec<StateColor>) -> Self {
        Self { entries }
    }

    /// A stateless list that always yields `color`.
    pub fn from_color(color: Rgba) -> Self {
        Self::new(vec![StateColor {
            states: Vec::new(),
            color,
        }])
    }

    pub fn entries(&self) -> &[StateColor] {
        &self.entries
    }

    /// True when more than one row exists or any row carries a state spec.
    pub fn is_stateful(&self) -> bool {
        self.entries.len() > 1 || self.entries.iter().any(|e| !e.states.is_empty())
    }

    /// Color of the row with an empty spec, else the first row.
    pub fn default_color(&self) -> Option<Rgba> {
        self.entries
            .iter()
            .find(|e| e.states.is_empty())
            .or_else(|| self.entries.first())
            .map(|e| e.color)
    }

    /// Color for the given set of active states, or `fallback` when no row matches.
    pub fn color_for_state(&self, state_set: &[i32], fallback: Rgba) -> Rgba {
        self.entries
            .iter()
            .find(|e| spec_matches(&e.states, state_set))
            .map_or(fallback, |e| e.color)
    }

    /// Same state table with every color passed through `f`.
    pub fn map_colors(&self, mut f: impl FnMut(Rgba) -> Rgba) -> Self {
        Self::new(
            self.entries
                .iter()
                .map(|e| StateColor {
                    states: e.states.clone(),
                    color: f(e.color),
                })
                .collect(),
        )
    }
}

fn spec_matches(spec: &[i32], state_set: &[i32]) -> bool {
    spec.iter().all(|&s| {
        if s >= 0 {
            state_set.contains(&s)
        } else {
            // `i32::MIN` has no positive counterpart, so it is never present.
            s.checked_neg().is_none_or(|state| !state_set.contains(&state))
        }
    })
}
