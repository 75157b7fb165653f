//=========================================================================
// Presentation Snapshot
//=========================================================================
//
// Read-only, per-frame view of a cutscene for the renderer.
//
// All offsets are in line-height units; the renderer scales them by its
// font. Glyph motion per visible char `i`:
// ```text
//   local  = time - i * interval - delays_up_to(i)
//   ease   = quart_in(1 - clamp(local / ease_in))
//   alpha  = 1 - ease,  lift = 0.4 * ease
//   wave   = sin(4π (timer - i * interval - delays) + 2π phase) / 8
//   shake  = vector * strength / 4
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::f32::consts::PI;

//=== External Dependencies ===============================================

use glam::Vec2;

//=== Internal Dependencies ===============================================

use super::portrait::{resolve_portrait, PortraitCatalog};
use super::reveal::{Phase, Presentation};
use crate::core::config::DialogueConfig;
use crate::core::cutscene::Stage;
use crate::core::ease::{clamp01, cube_out, quart_in};
use crate::core::markup::{Color, Document, StyleSpan};

//=== Constants ===========================================================

/// Lift of a glyph above its line before it eases in (y points down).
const RISE: f32 = 0.4;
const WAVE_AMPLITUDE: f32 = 1.0 / 8.0;
const SHAKE_SCALE: f32 = 1.0 / 4.0;

//=== Glyph ===============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub ch: char,

    /// Char index in the flat text.
    pub index: usize,

    pub line: usize,
    pub column: usize,

    /// Tint, black unless a color element applies.
    pub color: Color,

    pub alpha: f32,

    /// Draw offset from the glyph's resting position.
    pub offset: Vec2,
}

//=== Choice Snapshot =====================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceSnapshot {
    pub target: String,
    pub face: Option<String>,
    pub portrait: Option<String>,
    pub text: String,
    pub glyphs: Vec<Glyph>,

    /// Staggered slide-in ease, 0 to 1.
    pub ease: f32,

    pub highlighted: bool,
}

//=== Line Snapshot =======================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LineSnapshot {
    pub phase: Phase,

    /// Box visibility with cubic ease-out applied.
    pub box_ease: f32,

    pub face: Option<String>,
    pub portrait: Option<String>,
    pub talking: bool,

    /// Revealed prefix of the flat text.
    pub text: String,

    pub glyphs: Vec<Glyph>,
    pub spans: Vec<StyleSpan>,

    /// Entries whose target line exists, in menu order.
    pub choices: Vec<ChoiceSnapshot>,

    /// Ease of the highlighted entry's slide, cubic ease-out applied.
    pub highlight_ease: f32,
}

//=== Stage Snapshot ======================================================

/// Everything a renderer needs to draw one cutscene this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSnapshot {
    /// Letterbox bar ease, 0 to 1.
    pub letterbox: f32,

    pub timer: f32,

    pub line: Option<LineSnapshot>,
}

impl StageSnapshot {
    pub fn capture(stage: &Stage, portraits: &dyn PortraitCatalog) -> Self {
        let line = stage
            .speech
            .presentation
            .as_ref()
            .map(|presentation| capture_line(presentation, stage, portraits));

        Self {
            letterbox: stage.letterbox,
            timer: stage.timer,
            line,
        }
    }
}

//=== Internal Helpers ====================================================

fn capture_line(
    presentation: &Presentation,
    stage: &Stage,
    portraits: &dyn PortraitCatalog,
) -> LineSnapshot {
    let config = &stage.config;
    let timer = stage.timer;
    let talking = presentation.is_talking();
    let portrait = presentation
        .face()
        .and_then(|face| resolve_portrait(portraits, face, talking, timer));

    let glyphs = layout(
        presentation.document(),
        presentation.revealed(),
        presentation.time(),
        timer,
        config,
        true,
    );

    let highlighted = stage.speech.selection.highlighted();
    let choice_ease = presentation.choice_ease();
    let choices = presentation
        .choices()
        .iter()
        .enumerate()
        .filter_map(|(i, choice)| {
            let document = choice.document.as_ref()?;
            let time = document.total_duration(config.character_interval, config.character_ease_in);
            Some(ChoiceSnapshot {
                target: choice.target.clone(),
                face: choice.face.clone(),
                portrait: choice
                    .face
                    .as_deref()
                    .and_then(|face| resolve_portrait(portraits, face, false, timer)),
                text: document.text().to_string(),
                glyphs: layout(document, document.len(), time, timer, config, false),
                ease: clamp01((choice_ease - i as f32 * config.choice_ease_offset) / config.choice_ease_in),
                highlighted: i == highlighted,
            })
        })
        .collect();

    LineSnapshot {
        phase: presentation.phase(),
        box_ease: cube_out(presentation.ease()),
        face: presentation.face().map(str::to_string),
        portrait,
        talking,
        text: presentation.visible_text().to_string(),
        glyphs,
        spans: presentation.document().spans().to_vec(),
        choices,
        highlight_ease: cube_out(presentation.highlight_ease()),
    }
}

/// Lays out the first `count` chars of `document`. Newlines advance the
/// line and produce no glyph.
fn layout(
    document: &Document,
    count: usize,
    time: f32,
    timer: f32,
    config: &DialogueConfig,
    with_delays: bool,
) -> Vec<Glyph> {
    let mut glyphs = Vec::with_capacity(count);
    let mut line = 0;
    let mut column = 0;

    for (index, ch) in document.text().chars().take(count).enumerate() {
        if ch == '\n' {
            line += 1;
            column = 0;
            continue;
        }

        let delays = if with_delays { document.delays_up_to(index) } else { 0.0 };
        let local = index as f32 * config.character_interval + delays;
        let ease = quart_in(1.0 - clamp01((time - local) / config.character_ease_in));

        let style = document.style(index).copied().unwrap_or_default();
        let mut offset = Vec2::new(0.0, -RISE * ease);
        if let Some(phase) = style.wave {
            offset.y += (4.0 * PI * (timer - local) + 2.0 * PI * phase).sin() * WAVE_AMPLITUDE;
        }
        if let Some((strength, vector)) = style.shake {
            offset += vector * strength * SHAKE_SCALE;
        }

        glyphs.push(Glyph {
            ch,
            index,
            line,
            column,
            color: style.color.unwrap_or(Color::BLACK),
            alpha: 1.0 - ease,
            offset,
        });
        column += 1;
    }

    glyphs
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cutscene::progress::{shared, MemoryProgress};
    use crate::core::dialogue::{ChoiceView, RevealStatus};
    use crate::core::input::Controls;
    use crate::core::markup::parse_with_rng;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn document(markup: &str) -> Document {
        parse_with_rng(markup, &mut StdRng::seed_from_u64(7)).unwrap()
    }

    fn stage_with(markup: &str, choices: Vec<ChoiceView>) -> Stage {
        let mut stage = Stage::new(DialogueConfig::default(), shared(MemoryProgress::new()));
        let presentation = Presentation::open(
            Some("faces/granny".into()),
            document(markup),
            None,
            choices,
            &stage.config,
            &mut stage.audio,
        );
        stage.speech.presentation = Some(presentation);
        stage
    }

    fn run_to_end(stage: &mut Stage) {
        for _ in 0..600 {
            let Stage { speech, audio, config, .. } = stage;
            let Some(presentation) = speech.presentation.as_mut() else {
                return;
            };
            let status = presentation.advance(
                1.0 / 60.0,
                Controls::NONE,
                &mut speech.selection,
                audio,
                config,
            );
            assert_eq!(status, RevealStatus::Running);
            if matches!(presentation.phase(), Phase::AwaitingClose | Phase::Choosing) {
                return;
            }
        }
    }

    #[test]
    fn no_presentation_only_reports_letterbox() {
        let mut stage = Stage::new(DialogueConfig::default(), shared(MemoryProgress::new()));
        stage.letterbox = 0.5;
        let snapshot = StageSnapshot::capture(&stage, &HashSet::new());
        assert_eq!(snapshot.letterbox, 0.5);
        assert!(snapshot.line.is_none());
    }

    #[test]
    fn settled_glyphs_are_opaque_and_laid_out_by_line() {
        let mut stage = stage_with("ab\nc", Vec::new());
        run_to_end(&mut stage);

        let line = StageSnapshot::capture(&stage, &HashSet::new()).line.unwrap();
        assert_eq!(line.text, "ab\nc");
        assert_eq!(line.box_ease, 1.0);

        let placed: Vec<_> = line.glyphs.iter().map(|g| (g.ch, g.line, g.column)).collect();
        assert_eq!(placed, vec![('a', 0, 0), ('b', 0, 1), ('c', 1, 0)]);
        for glyph in &line.glyphs {
            assert_eq!(glyph.alpha, 1.0);
            assert_eq!(glyph.offset, Vec2::ZERO);
            assert_eq!(glyph.color, Color::BLACK);
        }
    }

    #[test]
    fn styles_color_and_shake_glyphs() {
        let mut stage = stage_with("<c color=\"ff0000\">r</c><shake strength=\"2\">s</shake>", Vec::new());
        run_to_end(&mut stage);

        let line = StageSnapshot::capture(&stage, &HashSet::new()).line.unwrap();
        assert_eq!(line.glyphs[0].color, Color::rgb(0xff, 0, 0));

        let Some((strength, vector)) = stage
            .speech
            .presentation
            .as_ref()
            .and_then(|p| p.document().style(1).and_then(|s| s.shake))
        else {
            panic!("shake style missing");
        };
        assert_eq!(line.glyphs[1].offset, vector * strength / 4.0);
    }

    #[test]
    fn fresh_glyph_starts_low_and_transparent() {
        let document = document("ab");
        let config = DialogueConfig::default();
        let glyphs = layout(&document, 2, config.character_interval, 0.0, &config, true);

        assert!(glyphs[1].alpha < glyphs[0].alpha);
        assert_eq!(glyphs[1].alpha, 0.0);
        assert!((glyphs[1].offset.y + RISE).abs() < 1e-6);
    }

    #[test]
    fn choices_list_existing_targets_with_staggered_ease() {
        let choices = vec![
            ChoiceView {
                target: "yes".into(),
                face: Some("faces/madeline".into()),
                document: Some(document("Yes")),
            },
            ChoiceView {
                target: "gone".into(),
                face: None,
                document: None,
            },
        ];
        let mut stage = stage_with("Well?", choices);
        run_to_end(&mut stage);

        let portraits: HashSet<String> = ["faces/madeline00".to_string()].into_iter().collect();
        let line = StageSnapshot::capture(&stage, &portraits).line.unwrap();
        assert_eq!(line.phase, Phase::Choosing);
        assert_eq!(line.choices.len(), 1);

        let choice = &line.choices[0];
        assert_eq!(choice.text, "Yes");
        assert!(choice.highlighted);
        assert_eq!(choice.portrait.as_deref(), Some("faces/madeline00"));
        // One tick into the menu.
        assert!(choice.ease > 0.0 && choice.ease < 0.1);
    }
}
