use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::input::App;
use crate::models::{FocusArea, RequestState, SentimentSummary, Subject, normalize_comments};
use crate::report::summary_dump;
use crate::session::{AnalysisSession, lock_session};
use crate::theme::Theme;
use crate::utils::{calculate_max_scroll, cursor_position};

/// Renders the whole form: subject row, comment editor, results and footer.
pub fn render(f: &mut Frame, app: &mut App, theme: &Theme) {
    let session = lock_session(&app.session).clone();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(6), Constraint::Length(1)])
        .split(f.area());
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(24)])
        .split(rows[0]);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);

    render_subject(f, top[0], &session, app.focus == FocusArea::Subject, theme);
    render_submit(f, top[1], &session, theme);
    render_comments(f, columns[0], &session, app, theme);
    render_results(f, columns[1], &session, app, theme);

    let footer_text = app.status.clone().unwrap_or_else(|| {
        "Tab: focus | ←/→: subject | Ctrl+S/F5: analyze | ↑/↓: scroll | c: copy | u: copy URL | q: quit".into()
    });
    f.render_widget(Paragraph::new(footer_text).style(theme.footer), rows[2]);

    if let RequestState::Failed(err) = session.state() {
        render_error_popup(f, &err.user_message(), theme);
    }
}

fn render_subject(f: &mut Frame, area: Rect, session: &AnalysisSession, focused: bool, theme: &Theme) {
    let mut spans = Vec::new();
    for subject in Subject::ALL {
        let selected = subject == session.subject();
        let marker = if selected { "(•) " } else { "( ) " };
        let style = if selected { theme.subject_selected } else { theme.subject_idle };
        spans.push(Span::styled(format!("{}{}", marker, subject), style));
        spans.push(Span::raw("   "));
    }
    let block = Block::default().title("Subject").borders(Borders::ALL).border_style(theme.border(focused));
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_submit(f: &mut Frame, area: Rect, session: &AnalysisSession, theme: &Theme) {
    let (label, style) = if session.is_loading() {
        ("Analyzing...", theme.submit_busy)
    } else {
        ("[ Analyze ] Ctrl+S", theme.submit_ready)
    };
    let block = Block::default().borders(Borders::ALL).border_style(theme.border(false));
    f.render_widget(Paragraph::new(label).style(style).alignment(Alignment::Center).block(block), area);
}

fn render_comments(f: &mut Frame, area: Rect, session: &AnalysisSession, app: &App, theme: &Theme) {
    let focused = app.focus == FocusArea::Comments;
    let count = normalize_comments(session.comments_text()).len();
    let title = format!("Comments, one per line ({} comment{})", count, if count == 1 { "" } else { "s" });
    let block = Block::default().title(title).borders(Borders::ALL).border_style(theme.border(focused));

    let inner_height = area.height.saturating_sub(2);
    let (row, col) = cursor_position(session.comments_text(), app.cursor);
    let offset = row.saturating_sub(inner_height.saturating_sub(1));

    let para = Paragraph::new(session.comments_text().to_string())
        .style(Style::default().fg(theme.text))
        .scroll((offset, 0))
        .block(block);
    f.render_widget(para, area);

    if focused && !matches!(session.state(), RequestState::Failed(_)) {
        let x = area.x.saturating_add(1).saturating_add(col).min(area.right().saturating_sub(2));
        let y = area.y.saturating_add(1).saturating_add(row - offset).min(area.bottom().saturating_sub(2));
        f.set_cursor_position((x, y));
    }
}

fn result_lines(session: &AnalysisSession, api_base: &str, theme: &Theme) -> Vec<Line<'static>> {
    let secondary = Style::default().fg(theme.text_secondary).add_modifier(Modifier::ITALIC);
    match session.state() {
        RequestState::Idle => vec![Line::from(Span::styled(
            "Paste or type comments, then press Ctrl+S to analyze.",
            secondary,
        ))],
        RequestState::Loading => vec![Line::from(Span::styled("Waiting for the analysis service...", secondary))],
        RequestState::Failed(_) => vec![Line::from(Span::styled("The last request failed.", secondary))],
        RequestState::Succeeded(result) => {
            let section = Style::default().fg(theme.text).add_modifier(Modifier::BOLD);
            let mut lines = Vec::new();
            if let Some(at) = session.settled_at() {
                lines.push(Line::from(Span::styled(format!("Analyzed at {}", at.format("%Y-%m-%d %H:%M:%S")), secondary)));
            }
            if let Some(view) = SentimentSummary::from_summary(&result.summary) {
                lines.push(Line::from(Span::styled(view.headline(), theme.headline)));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Summary", section)));
            for l in summary_dump(result).lines() {
                lines.push(Line::from(Span::styled(l.to_string(), theme.summary_json)));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Interpretations", section)));
            for item in &result.interpretations {
                lines.push(Line::from(vec![Span::raw("• "), Span::styled(item.clone(), theme.interpretation)]));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Wordcloud", section)));
            lines.push(Line::from(Span::styled(result.resolved_wordcloud_url(api_base), theme.wordcloud_url)));
            lines
        }
    }
}

fn render_results(f: &mut Frame, area: Rect, session: &AnalysisSession, app: &mut App, theme: &Theme) {
    let lines = result_lines(session, app.client.api_base(), theme);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    // Rows after wrapping, measured inside the borders
    let inner_width = layout[0].width.saturating_sub(2);
    let rows = Paragraph::new(lines.clone()).wrap(Wrap { trim: false }).line_count(inner_width);
    app.result_max_scroll = calculate_max_scroll(rows, layout[0].height);
    app.result_scroll = app.result_scroll.min(app.result_max_scroll);
    let block = Block::default()
        .title("Results")
        .borders(Borders::ALL)
        .border_style(theme.border(app.focus == FocusArea::Results));
    let para = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.result_scroll, 0));
    f.render_widget(para, layout[0]);

    if app.result_max_scroll > 0 {
        let mut state = ScrollbarState::new(app.result_max_scroll as usize).position(app.result_scroll as usize);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        f.render_stateful_widget(scrollbar, layout[1], &mut state);
    }
}

fn render_error_popup(f: &mut Frame, message: &str, theme: &Theme) {
    let popup_area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, popup_area);
    let block = Block::default()
        .title(Span::styled("Request failed", theme.popup_title))
        .borders(Borders::ALL)
        .style(theme.popup_border);
    let para = Paragraph::new(message.to_string())
        .block(block)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Left)
        .style(theme.popup_text);
    f.render_widget(para, popup_area);
    // Footer below the popup
    let footer_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height,
        width: popup_area.width,
        height: 1,
    };
    f.render_widget(Paragraph::new("Press Esc to dismiss").style(theme.footer), footer_area.intersection(f.area()));
}

/// Centers a rectangle within another rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default().direction(Direction::Vertical)
        .constraints([Constraint::Percentage((100-percent_y)/2), Constraint::Percentage(percent_y), Constraint::Percentage((100-percent_y)/2)]).split(r)[1];
    Layout::default().direction(Direction::Horizontal)
        .constraints([Constraint::Percentage((100-percent_x)/2), Constraint::Percentage(percent_x), Constraint::Percentage((100-percent_x)/2)]).split(vertical)[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::models::AnalysisResult;
    use crate::network::AnalysisClient;
    use ratatui::backend::TestBackend;
    use serde_json::json;

    fn app_with(state: impl FnOnce(&mut AnalysisSession)) -> App {
        let client = AnalysisClient::new("http://localhost:8000", None).unwrap();
        let mut session = AnalysisSession::new(Subject::ArtificialIntelligence);
        state(&mut session);
        App::new(session, client, None)
    }

    fn draw(app: &mut App) -> String {
        draw_sized(app, 120, 30)
    }

    fn draw_sized(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app, &Theme::default())).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_centered_rect() {
        let r = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(25, 10, 50, 20));
    }

    #[test]
    fn test_idle_screen() {
        let mut app = app_with(|s| s.set_comments_text("great course\n\nneeds more examples"));
        let screen = draw(&mut app);
        assert!(screen.contains("(2 comments)"));
        assert!(screen.contains("Artificial Intelligence"));
        assert!(screen.contains("[ Analyze ]"));
    }

    #[test]
    fn test_loading_disables_submit() {
        let mut app = app_with(|s| {
            s.begin();
        });
        let screen = draw(&mut app);
        assert!(screen.contains("Analyzing..."));
        assert!(!screen.contains("[ Analyze ]"));
    }

    #[test]
    fn test_success_renders_result() {
        let mut app = app_with(|s| {
            s.begin();
            s.settle(Ok(AnalysisResult {
                summary: json!({"count": 2, "mean": 0.3}),
                interpretations: vec!["Positive: 2".into()],
                wordcloud_url: "/media/wc_AI.png".into(),
            }));
        });
        let screen = draw(&mut app);
        assert!(screen.contains("Interpretations"));
        assert!(screen.contains("• Positive: 2"));
        assert!(screen.contains("http://localhost:8000/media/wc_AI.png"));
        assert!(screen.contains("2 comments · mean polarity 0.300"));
    }

    #[test]
    fn test_wrapped_results_scroll_to_wordcloud() {
        let mut app = app_with(|s| {
            s.begin();
            s.settle(Ok(AnalysisResult {
                summary: json!({"count": 4}),
                interpretations: (0..4).map(|i| format!("{} {}", i, "long interpretation text ".repeat(12))).collect(),
                wordcloud_url: "/media/cloud.png".into(),
            }));
        });
        app.focus = FocusArea::Results;

        let first = draw_sized(&mut app, 80, 24);
        assert!(app.result_max_scroll > 0);
        assert!(!first.contains("/media/cloud.png"));

        app.result_scroll = u16::MAX;
        let bottom = draw_sized(&mut app, 80, 24);
        assert_eq!(app.result_scroll, app.result_max_scroll);
        assert!(bottom.contains("http://localhost:8000/media/cloud.png"));
    }

    #[test]
    fn test_failure_shows_popup() {
        let mut app = app_with(|s| {
            s.begin();
            s.settle(Err(AnalysisError::Server { status: 400, message: Some("bad subject".into()) }));
        });
        let screen = draw(&mut app);
        assert!(screen.contains("Request failed"));
        assert!(screen.contains("bad subject"));
        assert!(screen.contains("Press Esc to dismiss"));
    }
}
