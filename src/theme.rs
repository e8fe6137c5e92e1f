use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub focus_border: Color,
    pub blurred_border: Color,
    pub text: Color,
    pub text_secondary: Color,

    // Specific components
    pub subject_selected: Style,
    pub subject_idle: Style,
    pub submit_ready: Style,
    pub submit_busy: Style,
    pub headline: Style,
    pub summary_json: Style,
    pub interpretation: Style,
    pub wordcloud_url: Style,
    pub footer: Style,
    pub popup_title: Style,
    pub popup_border: Style,
    pub popup_text: Style,
}

impl Theme {
    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focus_border).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.blurred_border)
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focus_border: Color::Cyan,
            blurred_border: Color::DarkGray,
            text: Color::White,
            text_secondary: Color::Gray,

            subject_selected: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            subject_idle: Style::default().fg(Color::Gray),
            submit_ready: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            submit_busy: Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            headline: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            summary_json: Style::default().fg(Color::Magenta),
            interpretation: Style::default().fg(Color::White),
            wordcloud_url: Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
            footer: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            popup_title: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            popup_border: Style::default().fg(Color::Red).bg(Color::Black),
            popup_text: Style::default().fg(Color::White),
        }
    }
}
