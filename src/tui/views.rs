//! TUI views and rendering
//!
//! All rendering logic is contained here. The views module draws the UI
//! from AppState but never modifies it beyond the scroll clamp.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::markdown::{self, Segment};
use crate::planner::{ImageState, LocationEntry, PlanPhase, TripPlan};

use super::state::{AppState, Focus};

/// Status colors
mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const HEADING: Color = Color::Rgb(0, 255, 255); // Section titles
    pub const READY: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const LOADING: Color = Color::Rgb(255, 215, 0); // Gold
    pub const FAILED: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const DIM: Color = Color::DarkGray;
}

/// Main render function
pub fn render(state: &mut AppState, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Source
            Constraint::Length(3), // Destination
            Constraint::Length(3), // Interests
            Constraint::Length(1), // Status line
            Constraint::Min(0),    // Results
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0]);
    render_input(state, frame, chunks[1], Focus::Source);
    render_input(state, frame, chunks[2], Focus::Destination);
    render_input(state, frame, chunks[3], Focus::Interests);
    render_status(state, frame, chunks[4]);
    render_results(state, frame, chunks[5]);
    render_footer(frame, chunks[6]);
}

/// Render the title header
fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " Wayfinder ",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "discover hidden gems on your next road trip",
            Style::default().fg(colors::DIM),
        ),
    ]);
    let header = Paragraph::new(title).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

/// Render one form input, highlighting the focused field
fn render_input(state: &AppState, frame: &mut Frame, area: Rect, field: Focus) {
    let value = match field {
        Focus::Source => &state.source,
        Focus::Destination => &state.destination,
        Focus::Interests => &state.interests,
    };

    let focused = state.focus == field;
    let border_style = if focused {
        Style::default().fg(colors::HEADER)
    } else {
        Style::default().fg(colors::DIM)
    };

    // A trailing cursor marker on the focused field
    let content = if focused {
        Line::from(vec![
            Span::raw(value.clone()),
            Span::styled("▏", Style::default().fg(colors::HEADER)),
        ])
    } else {
        Line::from(value.clone())
    };

    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(field.label()),
    );
    frame.render_widget(input, area);
}

/// Render the status line: validation message, phase, or hint
fn render_status(state: &AppState, frame: &mut Frame, area: Rect) {
    let line = if let Some(error) = &state.error {
        Line::from(Span::styled(
            format!(" ✗ {}", error),
            Style::default().fg(colors::FAILED),
        ))
    } else {
        match &state.snapshot.phase {
            PlanPhase::Idle => Line::from(Span::styled(
                " Press Enter to plan your trip",
                Style::default().fg(colors::DIM),
            )),
            PlanPhase::Planning => Line::from(Span::styled(
                format!(" {} {} your adventure...", state.spinner(), state.planning_word),
                Style::default().fg(colors::LOADING),
            )),
            PlanPhase::Ready => {
                let loading = state
                    .snapshot
                    .plan
                    .as_ref()
                    .map(|plan| plan.stops.iter().filter(|s| s.image.is_loading()).count())
                    .unwrap_or(0);
                if loading > 0 {
                    Line::from(Span::styled(
                        format!(" {} Itinerary ready, fetching {} images...", state.spinner(), loading),
                        Style::default().fg(colors::LOADING),
                    ))
                } else {
                    Line::from(Span::styled(
                        " ✓ Itinerary ready",
                        Style::default().fg(colors::READY),
                    ))
                }
            }
            PlanPhase::Failed { message } => Line::from(Span::styled(
                format!(" ✗ {}", message),
                Style::default().fg(colors::FAILED),
            )),
        }
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the itinerary and stops list
fn render_results(state: &mut AppState, frame: &mut Frame, area: Rect) {
    let Some(plan) = &state.snapshot.plan else {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            "Your itinerary will appear here.",
            Style::default().fg(colors::DIM),
        )))
        .block(Block::default().borders(Borders::ALL).title("Your Itinerary"));
        frame.render_widget(placeholder, area);
        return;
    };

    let mut lines = narrative_lines(plan);

    if !plan.stops.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Suggested Stops",
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )));
        for stop in &plan.stops {
            lines.push(stop_line(stop, state.spinner()));
        }
    }

    // Clamp scroll so the pane cannot run past the content
    let max_scroll = (lines.len() as u16).saturating_sub(area.height.saturating_sub(2));
    if state.scroll > max_scroll {
        state.scroll = max_scroll;
    }

    let results = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Your Itinerary"))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0));
    frame.render_widget(results, area);
}

/// Style the narrative: `**Title**` sections become bold cyan headings
fn narrative_lines(plan: &TripPlan) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for segment in markdown::segments(&plan.narrative) {
        match segment {
            Segment::Heading(heading) => {
                lines.push(Line::from(Span::styled(
                    heading,
                    Style::default().fg(colors::HEADING).add_modifier(Modifier::BOLD),
                )));
            }
            Segment::Body(body) => {
                for text_line in body.lines() {
                    if !text_line.is_empty() {
                        lines.push(Line::from(text_line.to_string()));
                    }
                }
            }
        }
    }

    lines
}

/// One stops-list line with a glyph for the image state
fn stop_line(stop: &LocationEntry, spinner: &'static str) -> Line<'static> {
    let (glyph, glyph_style) = match &stop.image {
        ImageState::Pending => ("○", Style::default().fg(colors::DIM)),
        ImageState::Loading => (spinner, Style::default().fg(colors::LOADING)),
        ImageState::Ready { .. } => ("✓", Style::default().fg(colors::READY)),
        ImageState::Unavailable => ("✗", Style::default().fg(colors::FAILED)),
    };

    Line::from(vec![
        Span::raw("  "),
        Span::styled(glyph.to_string(), glyph_style),
        Span::raw(" "),
        Span::styled(stop.place.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(stop.place.uri.clone(), Style::default().fg(colors::DIM)),
    ])
}

/// Render the keybind footer
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Line::from(Span::styled(
        " Enter plan · Tab next field · ↑/↓ scroll · Esc quit",
        Style::default().fg(colors::DIM),
    ));
    frame.render_widget(Paragraph::new(footer), area);
}
