//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Bottom status bar.
pub(crate) fn status_bar(msg: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" {msg}"))
        .style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White),
        )
}

/// One-line previous/next hint shown under the content pane.
pub(crate) fn nav_hint(previous: Option<&str>, next: Option<&str>) -> Line<'static> {
    let mut spans = Vec::new();
    if let Some(title) = previous {
        spans.push(Span::styled(
            format!("← p: {title}"),
            Style::default().fg(Color::Cyan),
        ));
    }
    if let Some(title) = next {
        if !spans.is_empty() {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            format!("n: {title} →"),
            Style::default().fg(Color::Cyan),
        ));
    }
    Line::from(spans)
}
