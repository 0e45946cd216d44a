use tracing::debug;

use crate::error::{Result, TranslatorError};
use crate::host::{Host, PointerEvent, Region, ViewId};

/// Text resolved from the host together with the region it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub region: Region,
    pub text: String,
}

/// Where the fallback word is looked up when nothing is selected.
#[derive(Debug, Clone, Copy)]
pub enum WordSource {
    /// Explicit translate action: word under the caret
    Cursor,
    /// Context menu: word under the pointer, only with auto-select enabled
    Pointer { event: PointerEvent, auto_select: bool },
}

/// Collapse a (possibly multi-line) selection into one queryable line.
///
/// Leading separator characters are stripped from each line, lines left
/// empty are dropped and the rest are joined with a single space. Trailing
/// separators of the joined text are trimmed as well.
pub fn normalize(raw: &str, separator: &str) -> String {
    let is_sep = |c: char| separator.contains(c);
    let lines: Vec<&str> = raw
        .split('\n')
        .map(|line| line.trim_start_matches(is_sep))
        .filter(|line| !line.is_empty())
        .collect();

    lines.join(" ").trim_end_matches(is_sep).to_string()
}

/// Strip separator characters from both ends of a single word.
pub fn strip_word(word: &str, separator: &str) -> String {
    word.trim_matches(|c: char| separator.contains(c)).to_string()
}

/// Resolve the text to translate: the normalized selection if there is one,
/// otherwise the word at the caret or pointer.
pub fn resolve(
    host: &dyn Host,
    view: ViewId,
    separator: &str,
    source: WordSource,
) -> Result<Selection> {
    if let Some((region, raw)) = host.selection(view) {
        let text = normalize(&raw, separator);
        if !text.is_empty() {
            debug!("Resolved selection {:?}: {}", region, text);
            return Ok(Selection { region, text });
        }
    }

    let point = match source {
        WordSource::Cursor => host.cursor(view),
        WordSource::Pointer { event, auto_select: true } => host.window_to_text(view, event),
        WordSource::Pointer { auto_select: false, .. } => return Err(TranslatorError::NoInput),
    };

    let region = host.word_at(view, point);
    let text = strip_word(&host.substr(view, region), separator);
    if text.is_empty() {
        return Err(TranslatorError::NoInput);
    }

    debug!("Resolved word {:?}: {}", region, text);
    Ok(Selection { region, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SEPARATOR;
    use crate::host::BufferHost;

    #[test]
    fn test_normalize_multiline_list() {
        let raw = "- first item\n\n> * second item\n   \n3. third";
        assert_eq!(normalize(raw, "- >*"), "first item second item 3. third");
        // whitespace is only stripped when it belongs to the separator set
        assert_eq!(normalize("- item", DEFAULT_SEPARATOR), " item");
    }

    #[test]
    fn test_normalize_with_space_separator() {
        assert_eq!(normalize("  ,hello,  ", ", "), "hello");
        assert_eq!(normalize("  ,hello world,  ", ", "), "hello world");
        assert_eq!(normalize(",,,\n  \n", ", "), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "  ,hello,  ",
            "“引号”里的内容。\n——破折号",
            "line one\r\n- line two\n",
            "...\n!!!",
            "a.b.c",
        ];
        for separator in [DEFAULT_SEPARATOR, ", ", ""] {
            for sample in samples {
                let once = normalize(sample, separator);
                assert_eq!(normalize(&once, separator), once, "sample {:?}", sample);
            }
        }
    }

    #[test]
    fn test_strip_word() {
        assert_eq!(strip_word("\"quoted.\"", DEFAULT_SEPARATOR), "quoted");
        assert_eq!(strip_word("--", DEFAULT_SEPARATOR), "");
    }

    #[test]
    fn test_resolve_prefers_selection() {
        let host = BufferHost::new("say:hello world").with_selection(Region::new(3, 15));
        let selection = resolve(&host, ViewId::default(), DEFAULT_SEPARATOR, WordSource::Cursor).unwrap();
        assert_eq!(selection.text, "hello world");
        assert_eq!(selection.region, Region::new(3, 15));
    }

    #[test]
    fn test_resolve_falls_back_to_cursor_word() {
        let host = BufferHost::new("say hello world")
            .with_selection(Region::new(3, 4))
            .with_cursor(6);
        // the selection is a lone space, which normalizes to nothing
        let selection = resolve(&host, ViewId::default(), " ", WordSource::Cursor).unwrap();
        assert_eq!(selection.text, "hello");
        assert_eq!(selection.region, Region::new(4, 9));
    }

    #[test]
    fn test_resolve_pointer_respects_auto_select() {
        let host = BufferHost::new("say hello world");
        let event = PointerEvent { x: 11.0, y: 0.0 };

        let selection = resolve(
            &host,
            ViewId::default(),
            DEFAULT_SEPARATOR,
            WordSource::Pointer { event, auto_select: true },
        )
        .unwrap();
        assert_eq!(selection.text, "world");

        let err = resolve(
            &host,
            ViewId::default(),
            DEFAULT_SEPARATOR,
            WordSource::Pointer { event, auto_select: false },
        )
        .unwrap_err();
        assert!(matches!(err, TranslatorError::NoInput));
    }

    #[test]
    fn test_resolve_nothing_to_translate() {
        let host = BufferHost::new("   ...   ").with_cursor(4);
        let err = resolve(&host, ViewId::default(), DEFAULT_SEPARATOR, WordSource::Cursor).unwrap_err();
        assert!(matches!(err, TranslatorError::NoInput));
    }
}
