//=========================================================================
// Portraits
//=========================================================================
//
// Chooses which portrait frame to show next to a line.
//
// Lookup order for face key `K` (e.g. `faces/granny`):
//   talking  → K + Talk00 / Talk01, alternating every 0.3 s
//   idle     → K + Idle00, with a short K + Idle01 blink every 3 s
//   fallback → K + 01 / K + 00 alternating, then K itself
//
// No match means no portrait; the line is still presented.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use crate::core::ease::between_interval;

//=== Constants ===========================================================

const TALK_INTERVAL: f32 = 0.3;
const BLINK_PERIOD: f32 = 3.0;
const BLINK_START: f32 = 2.8;

//=== PortraitCatalog =====================================================

/// Source of portrait textures, queried by key.
pub trait PortraitCatalog {
    fn contains(&self, key: &str) -> bool;
}

impl PortraitCatalog for HashSet<String> {
    fn contains(&self, key: &str) -> bool {
        HashSet::contains(self, key)
    }
}

impl<T: PortraitCatalog + ?Sized> PortraitCatalog for &T {
    fn contains(&self, key: &str) -> bool {
        (**self).contains(key)
    }
}

//=== resolve_portrait() ==================================================

/// Picks the portrait key to show for `face` at cutscene time `timer`.
pub fn resolve_portrait(
    catalog: &dyn PortraitCatalog,
    face: &str,
    talking: bool,
    timer: f32,
) -> Option<String> {
    if face.is_empty() {
        return None;
    }

    let odd_frame = between_interval(timer, TALK_INTERVAL);
    let key = |suffix: &str| format!("{face}{suffix}");
    let existing = |suffix: &str| {
        let candidate = key(suffix);
        catalog.contains(&candidate).then_some(candidate)
    };

    if talking && catalog.contains(&key("Talk00")) {
        return Some(
            odd_frame
                .then(|| existing("Talk01"))
                .flatten()
                .unwrap_or_else(|| key("Talk00")),
        );
    }

    if !talking && catalog.contains(&key("Idle00")) {
        let blinking = timer % BLINK_PERIOD > BLINK_START;
        return Some(
            blinking
                .then(|| existing("Idle01"))
                .flatten()
                .unwrap_or_else(|| key("Idle00")),
        );
    }

    if odd_frame {
        if let Some(frame) = existing("01") {
            return Some(frame);
        }
    }

    existing("00").or_else(|| existing(""))
}

//=========================================================================
// Unit Tests
//=========================================================================
