//! ASS subtitle artifact generation.
//!
//! Cues are written into a transient `.ass` document styled for the bottom
//! band of the 9:16 canvas, then burned in by the render driver.

use std::path::Path;

use shortgen_models::SubtitleCue;

use crate::error::MediaResult;

/// Cue text longer than this many characters wraps onto two lines.
const MAX_LINE_CHARS: usize = 40;

/// Script header: 1080x1920 play area, white Arial with outline, bottom
/// alignment with a 360px vertical margin so text lands in the subtitle band.
const ASS_HEADER: &str = "[Script Info]\n\
Title: Subtitles\n\
ScriptType: v4.00+\n\
PlayResX: 1080\n\
PlayResY: 1920\n\
Collisions: Normal\n\
PlayDepth: 0\n\
\n\
[V4+ Styles]\n\
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
Style: Default,Arial,45,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,-1,0,0,0,100,100,0,0,1,3,1,2,80,80,360,1\n\
\n\
[Events]\n\
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n";

/// Render cues as a complete ASS document.
pub fn ass_document(cues: &[SubtitleCue]) -> String {
    let mut doc = String::from(ASS_HEADER);
    for cue in cues {
        doc.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
            format_ass_time(cue.start),
            format_ass_time(cue.end),
            format_cue_text(&cue.text)
        ));
    }
    doc
}

/// Write cues to an `.ass` file.
pub async fn write_ass_file(cues: &[SubtitleCue], path: &Path) -> MediaResult<()> {
    tokio::fs::write(path, ass_document(cues)).await?;
    Ok(())
}

/// Format seconds as ASS time: `H:MM:SS.CC` (centiseconds).
pub fn format_ass_time(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as u32;
    let minutes = ((seconds % 3600.0) / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    let centis = ((seconds % 1.0) * 100.0) as u32;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}

/// Prepare cue text for the Events section, wrapping long lines at the
/// word midpoint with an ASS line break.
fn format_cue_text(text: &str) -> String {
    let flat = text.trim().replace('\n', " ");
    if flat.chars().count() <= MAX_LINE_CHARS {
        return flat;
    }
    let words: Vec<&str> = flat.split_whitespace().collect();
    let mid = words.len() / 2;
    format!("{}\\N{}", words[..mid].join(" "), words[mid..].join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(start: f64, end: f64, text: &str) -> SubtitleCue {
        SubtitleCue {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_format_ass_time() {
        assert_eq!(format_ass_time(0.0), "0:00:00.00");
        assert_eq!(format_ass_time(61.5), "0:01:01.50");
        assert_eq!(format_ass_time(3723.25), "1:02:03.25");
    }

    #[test]
    fn test_short_text_single_line() {
        assert_eq!(format_cue_text("hello world"), "hello world");
    }

    #[test]
    fn test_long_text_wraps_at_word_midpoint() {
        let text = "this is a rather long subtitle line that needs wrapping";
        let wrapped = format_cue_text(text);
        assert!(wrapped.contains("\\N"));
        let parts: Vec<&str> = wrapped.split("\\N").collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(format!("{} {}", parts[0], parts[1]), text);
    }

    #[test]
    fn test_document_structure() {
        let doc = ass_document(&[cue(1.0, 3.5, "first"), cue(4.0, 6.0, "second")]);
        assert!(doc.starts_with("[Script Info]"));
        assert!(doc.contains("PlayResX: 1080"));
        assert!(doc.contains("PlayResY: 1920"));
        assert!(doc.contains("Dialogue: 0,0:00:01.00,0:00:03.50,Default,,0,0,0,,first"));
        assert!(doc.contains("Dialogue: 0,0:00:04.00,0:00:06.00,Default,,0,0,0,,second"));
    }

    #[test]
    fn test_empty_cues_header_only() {
        let doc = ass_document(&[]);
        assert!(!doc.contains("Dialogue:"));
    }
}
