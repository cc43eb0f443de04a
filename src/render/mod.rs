//! Dependency-arc SVG rendering.
//!
//! Pure transformation from a parsed sentence to a vector document:
//! a token row (word above, part-of-speech tag below) and labeled
//! bézier arcs between heads and dependents, with arc heights leveled
//! so that nested arcs stack instead of overlapping. No I/O here.

use std::fmt::Write as _;

use crate::domain::Sentence;

/// Serialized SVG diagram.
///
/// Owned solely by the render-to-convert handoff; never persisted by
/// the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorDocument(String);

impl VectorDocument {
    /// View the SVG markup
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the raw markup
    pub fn into_string(self) -> String {
        self.0
    }
}

// Layout constants, in SVG user units
const OFFSET_X: usize = 50;
const DISTANCE: usize = 140;
const WORD_SPACING: usize = 45;
const ARROW_SPACING: usize = 20;
const ARROW_WIDTH: usize = 8;
const ARC_STROKE: usize = 2;

/// One head-to-dependent arc in token coordinates
struct Arc {
    start: usize,
    end: usize,
    label: String,
    /// Arrowhead sits at the start (dependent precedes its head)
    points_left: bool,
}

/// Render a sentence's dependency structure into an SVG document.
///
/// Assumed not to fail for any sentence that passed the length gate.
pub fn render_dependencies(sentence: &Sentence) -> VectorDocument {
    let words = &sentence.words;

    let arcs: Vec<Arc> = words
        .iter()
        .enumerate()
        .filter(|(i, w)| w.head != *i)
        .map(|(i, w)| Arc {
            start: i.min(w.head),
            end: i.max(w.head),
            label: w.deprel.clone(),
            points_left: i < w.head,
        })
        .collect();

    // Distinct span lengths, ascending; an arc's level is the rank of its
    // span, so longer arcs always clear shorter ones nested beneath them.
    let mut levels: Vec<usize> = arcs.iter().map(|a| a.end - a.start).collect();
    levels.sort_unstable();
    levels.dedup();

    let highest_level = levels.len();
    let offset_y = 20 + DISTANCE / 2 * highest_level;
    let width = OFFSET_X * 2 + DISTANCE * words.len().saturating_sub(1).max(1);
    let height = offset_y + 3 * WORD_SPACING;

    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" \
         xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{width}\" height=\"{height}\" \
         font-family=\"Verdana, Arial, sans-serif\" font-size=\"16\">\n"
    );

    for (i, word) in words.iter().enumerate() {
        let x = OFFSET_X + i * DISTANCE;
        let y = offset_y + WORD_SPACING;
        let _ = write!(
            svg,
            "  <text text-anchor=\"middle\" y=\"{y}\">\
             <tspan x=\"{x}\">{}</tspan>\
             <tspan x=\"{x}\" dy=\"2em\" fill=\"#888\">{}</tspan>\
             </text>\n",
            escape(&word.text),
            escape(&word.upos),
        );
    }

    for (idx, arc) in arcs.iter().enumerate() {
        let span = arc.end - arc.start;
        let level = levels.iter().position(|&l| l == span).unwrap_or(0) + 1;

        let x_start = OFFSET_X + arc.start * DISTANCE + ARROW_SPACING;
        let x_end = OFFSET_X + arc.end * DISTANCE - ARROW_SPACING;
        let y = offset_y;
        let y_curve = offset_y.saturating_sub(level * DISTANCE / 2);

        let _ = write!(
            svg,
            "  <g>\
             <path id=\"arc-{idx}\" d=\"M{x_start},{y} C{x_start},{y_curve} \
             {x_end},{y_curve} {x_end},{y}\" fill=\"none\" stroke=\"currentColor\" \
             stroke-width=\"{ARC_STROKE}\"/>\
             <text dy=\"-0.35em\" font-size=\"12\">\
             <textPath xlink:href=\"#arc-{idx}\" startOffset=\"50%\" \
             text-anchor=\"middle\">{}</textPath>\
             </text>\
             <path d=\"{}\" fill=\"currentColor\"/>\
             </g>\n",
            escape(&arc.label),
            arrowhead(if arc.points_left { x_start } else { x_end }, y),
        );
    }

    svg.push_str("</svg>\n");
    VectorDocument(svg)
}

/// Small triangle pointing down at the dependent's end of the arc
fn arrowhead(x: usize, y: usize) -> String {
    format!(
        "M{x},{} L{},{} {},{} Z",
        y + 2,
        x - ARROW_WIDTH / 2,
        y - ARROW_WIDTH,
        x + ARROW_WIDTH / 2,
        y - ARROW_WIDTH,
    )
}

/// Escape text for inclusion in XML content
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Word;

    fn word(text: &str, upos: &str, head: usize, deprel: &str) -> Word {
        Word {
            text: text.to_string(),
            upos: upos.to_string(),
            head,
            deprel: deprel.to_string(),
        }
    }

    fn sample() -> Sentence {
        Sentence::new(
            "Мама мыла раму",
            vec![
                word("Мама", "NOUN", 1, "nsubj"),
                word("мыла", "VERB", 1, "root"),
                word("раму", "NOUN", 1, "obj"),
            ],
        )
    }

    #[test]
    fn test_document_is_svg() {
        let doc = render_dependencies(&sample());
        assert!(doc.as_str().starts_with("<svg"));
        assert!(doc.as_str().trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_tokens_and_tags_present() {
        let doc = render_dependencies(&sample());
        for token in ["Мама", "мыла", "раму", "NOUN", "VERB"] {
            assert!(doc.as_str().contains(token), "missing {token}");
        }
    }

    #[test]
    fn test_one_arc_per_non_root_word() {
        let doc = render_dependencies(&sample());
        // Root has no incoming arc; the other two words get one each
        let arcs = doc.as_str().matches("<textPath").count();
        assert_eq!(arcs, 2);
        assert!(doc.as_str().contains("nsubj"));
        assert!(doc.as_str().contains("obj"));
        assert!(!doc.as_str().contains(">root<"));
    }

    #[test]
    fn test_single_word_sentence_has_no_arcs() {
        let s = Sentence::new("Привет", vec![word("Привет", "INTJ", 0, "root")]);
        let doc = render_dependencies(&s);
        assert_eq!(doc.as_str().matches("<textPath").count(), 0);
        assert!(doc.as_str().contains("Привет"));
    }

    #[test]
    fn test_text_is_escaped() {
        let s = Sentence::new(
            "<Тест>",
            vec![word("<Тест>", "X", 0, "root")],
        );
        let doc = render_dependencies(&s);
        assert!(doc.as_str().contains("&lt;Тест&gt;"));
        assert!(!doc.as_str().contains("<Тест>"));
    }

    #[test]
    fn test_nested_arcs_get_distinct_levels() {
        // "очень" -> "быстро" (span 1) nested under "быстро" -> "бежал" (span 1)
        // plus a long arc spanning 3; distinct spans produce distinct y curves
        let s = Sentence::new(
            "Он очень быстро бежал",
            vec![
                word("Он", "PRON", 3, "nsubj"),
                word("очень", "ADV", 2, "advmod"),
                word("быстро", "ADV", 3, "advmod"),
                word("бежал", "VERB", 3, "root"),
            ],
        );
        let doc = render_dependencies(&s);
        assert_eq!(doc.as_str().matches("<textPath").count(), 3);
    }
}
