// SRT parsing and regeneration
use super::{SubtitleEntry, Translation, RETRY_SENTINEL};
use crate::config::OutputMode;

/// Parse SRT text into entries, in file order.
///
/// Tolerant of malformed input: stray non-index lines between blocks are
/// skipped, time codes are not validated, and an index line at the very end
/// with nothing after it is dropped. Accepts LF or CRLF line endings.
pub fn parse(content: &str) -> Vec<SubtitleEntry> {
    let content = content.trim_start_matches('\u{feff}').trim();
    let lines: Vec<&str> = content
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let index = match lines[i].trim().parse::<u32>() {
            Ok(index) => index,
            Err(_) => {
                i += 1;
                continue;
            }
        };

        i += 1;
        if i >= lines.len() {
            break;
        }
        let time_range = lines[i];

        i += 1;
        let mut text_lines = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            text_lines.push(lines[i]);
            i += 1;
        }

        entries.push(SubtitleEntry::new(index, time_range, text_lines.join("\n")));

        // blank separator
        i += 1;
    }

    entries
}

/// Regenerate SRT text. Output always uses LF and ends every block with a blank line.
pub fn generate(entries: &[SubtitleEntry], mode: OutputMode) -> String {
    entries
        .iter()
        .map(|entry| {
            let translation = effective_translation(&entry.translation);

            let body = match mode {
                OutputMode::Bilingual if translation.is_empty() => entry.text.clone(),
                OutputMode::Bilingual => format!("{}\n{}", entry.text, translation),
                OutputMode::Translated if translation.is_empty() => entry.text.clone(),
                OutputMode::Translated => translation.to_string(),
            };

            format!("{}\n{}\n{}\n\n", entry.index, entry.time_range, body)
        })
        .collect()
}

fn effective_translation(translation: &Translation) -> &str {
    match translation {
        Translation::Pending => "",
        Translation::Failed(_) => RETRY_SENTINEL,
        Translation::Done(text) => text,
    }
}
