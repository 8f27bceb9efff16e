//! Paged console output for long listings.

use mew_core::traits::{ConsoleColor, ConsoleSink};

/// How [`send_page`] renders a page.
///
/// Formats use positional placeholders: the header receives `{0}` (page)
/// and `{1}` (page count); the footer receives `{0}` (next page), `{1}`
/// (page) and `{2}` (page count).
#[derive(Debug, Clone)]
pub struct PaginationSettings {
    /// Whether to print the header line.
    pub include_header: bool,
    /// Header format.
    pub header_format: String,
    /// Header color.
    pub header_color: ConsoleColor,
    /// Whether to print the footer line when more pages follow.
    pub include_footer: bool,
    /// Footer format.
    pub footer_format: String,
    /// Footer color.
    pub footer_color: ConsoleColor,
    /// Printed instead of a page when there are no lines at all.
    pub nothing_to_display: Option<String>,
    /// Color of the listed lines.
    pub line_color: ConsoleColor,
    /// Lines per page; values below one are treated as one.
    pub max_lines_per_page: usize,
    /// Upper bound on the page count; zero means unbounded.
    pub page_limit: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            include_header: true,
            header_format: "Page {0} of {1}".to_string(),
            header_color: ConsoleColor::Green,
            include_footer: true,
            footer_format: "Type /<command> {0} for more.".to_string(),
            footer_color: ConsoleColor::Yellow,
            nothing_to_display: None,
            line_color: ConsoleColor::Yellow,
            max_lines_per_page: 4,
            page_limit: 0,
        }
    }
}

fn format_positional(format: &str, values: &[usize]) -> String {
    values
        .iter()
        .enumerate()
        .fold(format.to_string(), |acc, (i, v)| {
            acc.replace(&format!("{{{i}}}"), &v.to_string())
        })
}

/// Returns the number of pages `line_count` lines occupy under `settings`.
pub fn page_count(line_count: usize, settings: &PaginationSettings) -> usize {
    if line_count == 0 {
        return 0;
    }
    let per_page = settings.max_lines_per_page.max(1);
    let count = (line_count - 1) / per_page + 1;
    if settings.page_limit > 0 {
        count.min(settings.page_limit)
    } else {
        count
    }
}

/// Prints page `page_number` (1-based, clamped into range) of `lines`.
///
/// Returns the page actually shown, or `None` when there was nothing to
/// show.
pub fn send_page<S: AsRef<str>>(
    console: &dyn ConsoleSink,
    page_number: usize,
    lines: &[S],
    settings: &PaginationSettings,
) -> Option<usize> {
    let pages = page_count(lines.len(), settings);
    if pages == 0 {
        if let Some(message) = &settings.nothing_to_display {
            console.colored(message, settings.header_color);
        }
        return None;
    }

    let page = page_number.clamp(1, pages);
    let per_page = settings.max_lines_per_page.max(1);

    if settings.include_header {
        console.colored(
            &format_positional(&settings.header_format, &[page, pages]),
            settings.header_color,
        );
    }

    for line in lines.iter().skip((page - 1) * per_page).take(per_page) {
        console.colored(line.as_ref(), settings.line_color);
    }

    if settings.include_footer && page < pages {
        console.colored(
            &format_positional(&settings.footer_format, &[page + 1, page, pages]),
            settings.footer_color,
        );
    }

    Some(page)
}

/// Packs terms into lines of fewer than `max_chars_per_line` characters.
///
/// Every line but the last keeps its trailing separator.
pub fn build_lines_from_terms<I, S>(terms: I, separator: &str, max_chars_per_line: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for term in terms {
        let term = term.as_ref();
        if term.is_empty() {
            continue;
        }

        let fits = current.chars().count() + term.chars().count() + separator.chars().count()
            < max_chars_per_line;
        if !fits && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        current.push_str(term);
        current.push_str(separator);
    }

    if !current.is_empty() {
        if let Some(stripped) = current.strip_suffix(separator) {
            current.truncate(stripped.len());
        }
        lines.push(current);
    }

    lines
}

/// Reads a 1-based page number from `parameters[index]`.
///
/// A missing parameter means page one. A malformed one is reported on the
/// console and yields `None`.
pub fn try_parse_page_number(
    parameters: &[String],
    index: usize,
    console: &dyn ConsoleSink,
) -> Option<usize> {
    let Some(raw) = parameters.get(index) else {
        return Some(1);
    };

    match raw.parse::<usize>() {
        Ok(page) if page >= 1 => Some(page),
        _ => {
            console.error(&format!("\"{raw}\" is not a valid page number."));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use mew_core::console::{BufferConsole, ConsoleLevel};

    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn test_first_page_with_footer() {
        let console = BufferConsole::new();
        let shown = send_page(&console, 1, &lines(10), &PaginationSettings::default());

        assert_eq!(shown, Some(1));
        let messages = console.messages(ConsoleLevel::Info);
        assert_eq!(
            messages,
            [
                "Page 1 of 3",
                "line 1",
                "line 2",
                "line 3",
                "line 4",
                "Type /<command> 2 for more."
            ]
        );
    }

    #[test]
    fn test_last_page_has_no_footer() {
        let console = BufferConsole::new();
        send_page(&console, 3, &lines(10), &PaginationSettings::default());
        assert_eq!(
            console.messages(ConsoleLevel::Info),
            ["Page 3 of 3", "line 9", "line 10"]
        );
    }

    #[test]
    fn test_page_number_is_clamped() {
        let console = BufferConsole::new();
        let shown = send_page(&console, 99, &lines(5), &PaginationSettings::default());
        assert_eq!(shown, Some(2));
        let shown = send_page(&console, 0, &lines(5), &PaginationSettings::default());
        assert_eq!(shown, Some(1));
    }

    #[test]
    fn test_page_limit_caps_count() {
        let settings = PaginationSettings {
            page_limit: 2,
            ..Default::default()
        };
        assert_eq!(page_count(100, &settings), 2);
        assert_eq!(page_count(100, &PaginationSettings::default()), 25);
        assert_eq!(page_count(4, &PaginationSettings::default()), 1);
        assert_eq!(page_count(5, &PaginationSettings::default()), 2);
    }

    #[test]
    fn test_nothing_to_display() {
        let console = BufferConsole::new();
        let empty: Vec<String> = Vec::new();
        assert_eq!(send_page(&console, 1, &empty, &PaginationSettings::default()), None);
        assert!(console.lines().is_empty());

        let settings = PaginationSettings {
            nothing_to_display: Some("Nothing here.".into()),
            ..Default::default()
        };
        send_page(&console, 1, &empty, &settings);
        assert!(console.contains("Nothing here."));
    }

    #[test]
    fn test_build_lines_wraps_before_limit() {
        let terms = ["alpha", "bravo", "charlie", "delta"];
        let built = build_lines_from_terms(terms, ", ", 20);
        assert_eq!(built, ["alpha, bravo, ", "charlie, delta"]);
    }

    #[test]
    fn test_build_lines_single_line() {
        let built = build_lines_from_terms(["help", "login", "version"], ", ", 80);
        assert_eq!(built, ["help, login, version"]);
    }

    #[test]
    fn test_parse_page_number() {
        let console = BufferConsole::new();
        let params = vec!["3".to_string(), "x".to_string(), "0".to_string()];

        assert_eq!(try_parse_page_number(&params, 0, &console), Some(3));
        assert_eq!(try_parse_page_number(&params, 5, &console), Some(1));
        assert_eq!(try_parse_page_number(&params, 1, &console), None);
        assert_eq!(try_parse_page_number(&params, 2, &console), None);
        assert!(console.contains("\"x\" is not a valid page number."));
    }
}
