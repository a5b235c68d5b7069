//! On-screen modifier latch.
//!
//! Touch screens cannot hold Ctrl while tapping C, so modifier buttons latch:
//! a tap records the modifier, and the next regular or special key is routed
//! through the latch instead of being sent plainly.
//!
//! Two policies exist:
//!
//! - [`StickyLatch`] (default). Append-only: modifiers are never removed and
//!   every later key is absorbed into the latch rather than sent.
//! - [`ChordLatch`]. The next key goes out once with every latched modifier
//!   held, then the latch empties. Releasing a modifier button unlatches it.
//!   Del under a lone Shift or Win sends the modifier with no key.

use btkb_core::{HidUsage, KeyLabel, KeyMapper, ModifierKey, ModifierMask, NamedKey};
use serde::{Deserialize, Serialize};

/// What the latch did with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchDecision {
    /// Recorded; nothing is sent.
    Absorbed,
    /// Send `usage` with `modifiers` held, then release.
    Chord {
        modifiers: ModifierMask,
        usage: HidUsage,
    },
    /// The key has no usage code; nothing is sent.
    Unmapped,
}

/// Latched modifier state consulted before each regular/special key.
pub trait ModifierLatch: Send {
    /// A modifier button was pressed.
    fn press(&mut self, modifier: ModifierKey);

    /// A modifier button was released.
    fn release(&mut self, modifier: ModifierKey);

    fn is_empty(&self) -> bool;

    /// Latched modifiers, oldest first.
    fn active(&self) -> Vec<ModifierKey>;

    /// Routes a non-modifier key through the latch. Only called while the
    /// latch is non-empty.
    fn absorb(&mut self, label: KeyLabel) -> LatchDecision;
}

/// Which [`ModifierLatch`] a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatchPolicy {
    #[default]
    Sticky,
    Chord,
}

impl LatchPolicy {
    pub fn build(self) -> Box<dyn ModifierLatch> {
        match self {
            LatchPolicy::Sticky => Box::new(StickyLatch::default()),
            LatchPolicy::Chord => Box::new(ChordLatch::default()),
        }
    }
}

/// Append-only latch.
#[derive(Debug, Default, Clone)]
pub struct StickyLatch {
    pressed: Vec<ModifierKey>,
    absorbed: Vec<KeyLabel>,
}

impl StickyLatch {
    /// Keys taken by the latch so far.
    pub fn absorbed(&self) -> &[KeyLabel] {
        &self.absorbed
    }
}

impl ModifierLatch for StickyLatch {
    fn press(&mut self, modifier: ModifierKey) {
        self.pressed.push(modifier);
    }

    fn release(&mut self, _modifier: ModifierKey) {}

    fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    fn active(&self) -> Vec<ModifierKey> {
        self.pressed.clone()
    }

    fn absorb(&mut self, label: KeyLabel) -> LatchDecision {
        self.absorbed.push(label);
        LatchDecision::Absorbed
    }
}

/// One-shot chord latch.
#[derive(Debug, Default, Clone)]
pub struct ChordLatch {
    pressed: Vec<ModifierKey>,
}

impl ChordLatch {
    fn mask(&self) -> ModifierMask {
        self.pressed
            .iter()
            .fold(ModifierMask::NONE, |acc, m| acc | m.mask())
    }
}

impl ModifierLatch for ChordLatch {
    fn press(&mut self, modifier: ModifierKey) {
        if !self.pressed.contains(&modifier) {
            self.pressed.push(modifier);
        }
    }

    fn release(&mut self, modifier: ModifierKey) {
        self.pressed.retain(|&m| m != modifier);
    }

    fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    fn active(&self) -> Vec<ModifierKey> {
        self.pressed.clone()
    }

    fn absorb(&mut self, label: KeyLabel) -> LatchDecision {
        let resolved = match label {
            KeyLabel::Char(c) => KeyMapper::char_usage(c),
            KeyLabel::Named(k) => Some((ModifierMask::NONE, KeyMapper::named_usage(k))),
            KeyLabel::Modifier(_) => None,
        };
        let Some((implied, usage)) = resolved else {
            return LatchDecision::Unmapped;
        };
        let modifiers = self.mask() | implied;
        // Shift+Del and Win+Del go out as the bare modifier.
        let usage = match (label, self.pressed.as_slice()) {
            (
                KeyLabel::Named(NamedKey::Del),
                [ModifierKey::Shift] | [ModifierKey::Win],
            ) => HidUsage::None,
            _ => usage,
        };
        self.pressed.clear();
        LatchDecision::Chord { modifiers, usage }
    }
}
