//! # Tokenizer
//!
//! Finite-state scanner turning a flat query string into [`QueryParams`].
//!
//! A flag marker is [`FLAG_PREFIX`] immediately followed by one of the flag
//! letters (`t k v o p u`). Markers are recognized anywhere in the input,
//! including inside what the author meant as a value: `-p my-tag` yields
//! the parameter `my` and a type of `ag`. A hyphen followed by anything else
//! (`T-1000`) is ordinary text.
//!
//! The scanner is a tagged enum of states driven by [`step`]. Text read while
//! a flag state is active accumulates in the token buffer; the buffer is
//! committed, trimmed, on the next marker or at end of input. Text read in
//! [`ScanState::EatWhitespace`] (anything before the first marker) is
//! discarded. A flag followed only by whitespace is stored with an empty
//! value and counts as supplied; a marker with nothing at all after it
//! (`-t SHOW -k`) stores nothing. A repeated flag overwrites the earlier
//! value.

use crate::primitives::FLAG_PREFIX;
use crate::trace::QueryTrace;
use crate::types::{Flag, QueryParams};

// =============================================================================
// SCANNER STATE
// =============================================================================

/// Scanner states. `EatWhitespace` is initial and belongs to no flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    EatWhitespace,
    EatType,
    EatKey,
    EatValue,
    EatOperation,
    EatParameter,
    EatUser,
}

impl ScanState {
    /// The flag whose value this state collects.
    #[must_use]
    pub const fn flag(self) -> Option<Flag> {
        match self {
            ScanState::EatWhitespace => None,
            ScanState::EatType => Some(Flag::Type),
            ScanState::EatKey => Some(Flag::Key),
            ScanState::EatValue => Some(Flag::Value),
            ScanState::EatOperation => Some(Flag::Operation),
            ScanState::EatParameter => Some(Flag::Parameter),
            ScanState::EatUser => Some(Flag::User),
        }
    }

    /// The state that collects a flag's value.
    #[must_use]
    pub const fn for_flag(flag: Flag) -> Self {
        match flag {
            Flag::Type => ScanState::EatType,
            Flag::Key => ScanState::EatKey,
            Flag::Value => ScanState::EatValue,
            Flag::Operation => ScanState::EatOperation,
            Flag::Parameter => ScanState::EatParameter,
            Flag::User => ScanState::EatUser,
        }
    }
}

/// A committed flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub flag: Flag,
    pub value: String,
}

/// Input cursor and token buffer shared across transitions.
#[derive(Debug)]
pub struct ScanContext {
    chars: Vec<char>,
    pos: usize,
    buffer: String,
}

impl ScanContext {
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            buffer: String::new(),
        }
    }

    /// Whether every character has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// The flag introduced by a marker at the cursor, if any.
    fn marker_at_cursor(&self) -> Option<Flag> {
        let prefix = self.chars.get(self.pos)?;
        if *prefix != FLAG_PREFIX {
            return None;
        }
        let letter = self.chars.get(self.pos.saturating_add(1))?;
        Flag::from_letter(*letter)
    }

    /// Take the buffer as a token for `state`.
    ///
    /// A buffer of only whitespace still commits, as an empty value. Nothing
    /// is committed when the buffer is empty, which happens only for a
    /// marker directly followed by another marker or by end of input.
    fn commit(&mut self, state: ScanState) -> Option<Token> {
        let raw = std::mem::take(&mut self.buffer);
        let flag = state.flag()?;
        if raw.is_empty() {
            return None;
        }
        Some(Token {
            flag,
            value: raw.trim().to_string(),
        })
    }
}

// =============================================================================
// TRANSITION FUNCTION
// =============================================================================

/// Advance the scanner by one transition.
///
/// - At a marker: commit the buffer under the current state, consume the
///   two-character marker and enter the marker's state.
/// - At end of input: commit the buffer and fall back to `EatWhitespace`.
/// - Otherwise: consume one character, buffering it unless the state is
///   `EatWhitespace`.
pub fn step(state: ScanState, ctx: &mut ScanContext) -> (ScanState, Option<Token>) {
    if ctx.is_exhausted() {
        let token = ctx.commit(state);
        return (ScanState::EatWhitespace, token);
    }

    if let Some(flag) = ctx.marker_at_cursor() {
        let token = ctx.commit(state);
        ctx.pos = ctx.pos.saturating_add(2);
        return (ScanState::for_flag(flag), token);
    }

    if state != ScanState::EatWhitespace {
        let ch = ctx.chars.get(ctx.pos).copied();
        ctx.buffer.extend(ch);
    }
    ctx.pos = ctx.pos.saturating_add(1);
    (state, None)
}

/// Scan a whole query string.
pub fn tokenize(input: &str, trace: &dyn QueryTrace) -> QueryParams {
    let mut ctx = ScanContext::new(input);
    let mut params = QueryParams::new();
    let mut state = ScanState::EatWhitespace;
    trace.state_entered(state);

    loop {
        let finished = ctx.is_exhausted();
        let (next, token) = step(state, &mut ctx);

        if let Some(token) = token {
            trace.param_captured(token.flag, &token.value);
            params.set(token.flag, token.value);
        }
        if finished {
            break;
        }
        if next != state {
            trace.state_entered(next);
        }
        state = next;
    }

    params
}

// =============================================================================
// TESTS
// =============================================================================
