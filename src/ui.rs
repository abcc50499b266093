use std::ops::RangeInclusive;

use floorplan_core::{ElementKind, FloorplanElement, HexColor, TableShape};
use floorplan_geometry::{Point, Rect as CanvasRect, Viewport, resize_handle_rect};
use floorplan_session::KeyValueStore;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::{App, Mode};
use crate::editor::InteractionState;

/// Width of the property/catalog panel in columns
const PANEL_WIDTH: u16 = 28;

/// Screen areas: canvas, side panel, status bar, help bar
fn split(area: Rect) -> (Rect, Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Canvas + panel
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Help bar
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(PANEL_WIDTH)])
        .split(chunks[0]);

    (horizontal[0], horizontal[1], chunks[1], chunks[2])
}

/// Where the canvas is drawn within the terminal area
pub fn canvas_area(area: Rect) -> Rect {
    split(area).0
}

/// Render the entire UI
pub fn render<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let (canvas, panel, status, help) = split(frame.area());

    frame.render_widget(CanvasWidget { app }, canvas);
    render_panel(frame, app, panel);
    render_status_bar(frame, app, status);
    render_help_bar(frame, app, help);
}

/// Terminal color for a stored hex color
fn element_color(color: &HexColor) -> Color {
    match color.rgb() {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => Color::Gray,
    }
}

/// Box-drawing set for an element outline
struct Outline {
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
    horizontal: char,
    vertical: char,
    fill: Option<char>,
}

const SQUARE: Outline = Outline {
    top_left: '┌',
    top_right: '┐',
    bottom_left: '└',
    bottom_right: '┘',
    horizontal: '─',
    vertical: '│',
    fill: None,
};

const ROUND: Outline = Outline {
    top_left: '╭',
    top_right: '╮',
    bottom_left: '╰',
    bottom_right: '╯',
    horizontal: '─',
    vertical: '│',
    fill: None,
};

const DASHED: Outline = Outline {
    top_left: '┌',
    top_right: '┐',
    bottom_left: '└',
    bottom_right: '┘',
    horizontal: '╌',
    vertical: '╎',
    fill: None,
};

const HEAVY: Outline = Outline {
    top_left: '┏',
    top_right: '┓',
    bottom_left: '┗',
    bottom_right: '┛',
    horizontal: '━',
    vertical: '┃',
    fill: Some('▒'),
};

fn outline_for(kind: &ElementKind) -> &'static Outline {
    match kind {
        ElementKind::Table {
            shape: TableShape::Circle,
            ..
        } => &ROUND,
        ElementKind::Table { .. } => &SQUARE,
        ElementKind::Zone { .. } => &DASHED,
        ElementKind::Barrier { .. } => &HEAVY,
    }
}

fn label_for(kind: &ElementKind) -> String {
    match kind {
        ElementKind::Table { label, seats, .. } => format!("{} ({})", label, seats),
        ElementKind::Zone { name } | ElementKind::Barrier { name } => name.clone(),
    }
}

/// Inclusive cell bounds `(min_col, min_row, max_col, max_row)` covered by a
/// box. Huge boxes saturate rather than wrap.
fn cell_bounds(viewport: &Viewport, rect: CanvasRect) -> (i64, i64, i64, i64) {
    let min_col = (rect.x / viewport.cell_width).floor() as i64;
    let min_row = (rect.y / viewport.cell_height).floor() as i64;
    let max_col = ((rect.right() / viewport.cell_width).ceil() as i64).saturating_sub(1).max(min_col);
    let max_row = ((rect.bottom() / viewport.cell_height).ceil() as i64).saturating_sub(1).max(min_row);
    (min_col, min_row, max_col, max_row)
}

/// The part of `min..=max` that falls on a strip `len` cells long
fn visible(min: i64, max: i64, len: u16) -> RangeInclusive<i64> {
    min.max(0)..=max.min(i64::from(len) - 1)
}

/// Custom widget for rendering the canvas
struct CanvasWidget<'a, S: KeyValueStore> {
    app: &'a App<S>,
}

impl<S: KeyValueStore> CanvasWidget<'_, S> {
    fn render_char(&self, buf: &mut Buffer, area: Rect, col: i64, row: i64, ch: char, style: Style) {
        if col < 0 || row < 0 || col >= i64::from(area.width) || row >= i64::from(area.height) {
            return;
        }
        let x = area.x + col as u16;
        let y = area.y + row as u16;
        buf[(x, y)].set_char(ch).set_style(style);
    }

    /// Shade cells beyond the canvas edge when the canvas is smaller than the area
    fn render_margin(&self, buf: &mut Buffer, area: Rect) {
        let canvas = self.app.editor.canvas_size();
        let viewport = &self.app.viewport;
        let style = Style::default().fg(Color::DarkGray);
        for row in 0..area.height as i32 {
            for col in 0..area.width as i32 {
                let p = viewport.cell_to_canvas(col, row);
                if p.x > canvas.width || p.y > canvas.height {
                    self.render_char(buf, area, col.into(), row.into(), '░', style);
                }
            }
        }
    }

    fn render_box(
        &self,
        buf: &mut Buffer,
        area: Rect,
        rect: CanvasRect,
        outline: &Outline,
        label: &str,
        style: Style,
    ) {
        let (min_col, min_row, max_col, max_row) = cell_bounds(&self.app.viewport, rect);

        // Border and corners come from the full bounds; only on-screen cells are walked
        for row in visible(min_row, max_row, area.height) {
            for col in visible(min_col, max_col, area.width) {
                let top = row == min_row;
                let bottom = row == max_row;
                let left = col == min_col;
                let right = col == max_col;
                let ch = match (top, bottom, left, right) {
                    (true, _, true, _) => outline.top_left,
                    (true, _, _, true) => outline.top_right,
                    (_, true, true, _) => outline.bottom_left,
                    (_, true, _, true) => outline.bottom_right,
                    (true, _, _, _) | (_, true, _, _) => outline.horizontal,
                    (_, _, true, _) | (_, _, _, true) => outline.vertical,
                    _ => match outline.fill {
                        Some(fill) => fill,
                        None => continue,
                    },
                };
                self.render_char(buf, area, col, row, ch, style);
            }
        }

        // Center the label inside the border
        let inner_width = max_col.saturating_sub(min_col).saturating_sub(1).max(0);
        if inner_width == 0 || max_row.saturating_sub(min_row) < 2 {
            return;
        }
        let text: Vec<char> = label.chars().take(inner_width.min(i64::from(u16::MAX)) as usize).collect();
        let start = min_col + 1 + (inner_width - text.len() as i64) / 2;
        let center_row = min_row + max_row.saturating_sub(min_row) / 2;
        for (i, ch) in text.into_iter().enumerate() {
            self.render_char(buf, area, start + i as i64, center_row, ch, style);
        }
    }

    fn render_element(&self, buf: &mut Buffer, area: Rect, element: &FloorplanElement) {
        let editor = &self.app.editor;
        let mut style = Style::default().fg(element_color(&element.color));

        if editor.dragging() == Some(element.id) && editor.drag_out_of_bounds() {
            style = style.fg(Color::Red).add_modifier(Modifier::CROSSED_OUT);
        }
        let hovered = editor.hovered() == Some(element.id);
        let selected = editor.selected_id() == Some(element.id);
        if hovered {
            style = style.add_modifier(Modifier::BOLD);
        }
        if selected {
            style = style.add_modifier(Modifier::REVERSED);
        }

        self.render_box(
            buf,
            area,
            element.rect(),
            outline_for(&element.kind),
            &label_for(&element.kind),
            style,
        );

        let show_handle = editor.tool().is_none()
            && (hovered || selected || editor.resizing() == Some(element.id));
        if show_handle {
            let handle = resize_handle_rect(element.rect());
            let corner = Point::new(handle.x + handle.width / 2.0, handle.y + handle.height / 2.0);
            if let Some((col, row)) = self.app.viewport.canvas_to_cell(corner) {
                self.render_char(
                    buf,
                    area,
                    col.into(),
                    row.into(),
                    '◢',
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                );
            }
        }
    }
}

impl<S: KeyValueStore> Widget for CanvasWidget<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_margin(buf, area);

        // List order is paint order: later elements on top
        for element in self.app.editor.elements() {
            self.render_element(buf, area, element);
        }

        if let Some(ghost) = self.app.editor.ghost() {
            let style = Style::default()
                .fg(element_color(&ghost.color))
                .add_modifier(Modifier::DIM);
            self.render_box(
                buf,
                area,
                ghost.rect,
                outline_for(&ghost.kind),
                &label_for(&ghost.kind),
                style,
            );
        }
    }
}

/// Property panel for the selected element, or the table-type list
fn render_panel<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let Some(element) = app.editor.selected() else {
        render_catalog_panel(frame, app, area);
        return;
    };

    let title = format!(" {} ", element.kind.type_name());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let current = app.current_field();
    let mut lines: Vec<Line> = Vec::new();
    for field in app.panel_fields() {
        let is_current = current == Some(*field);
        let marker = if is_current { "› " } else { "  " };
        let value = match &app.mode {
            Mode::FieldInput { field: editing, text } if editing == field => {
                Span::styled(format!("{}▏", text), Style::default().fg(Color::Yellow))
            }
            _ => Span::raw(field.read(element).unwrap_or_default()),
        };
        let name_style = if is_current {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{}: ", field.name()), name_style),
            value,
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("id {}", element.id),
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_catalog_panel<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let block = Block::default()
        .title(" Table types ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let catalog = app.editor.catalog();
    let mut lines: Vec<Line> = Vec::new();
    if catalog.is_empty() {
        lines.push(Line::from(Span::styled(
            "none (t places a default)",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (i, table_type) in catalog.iter().enumerate().take(9) {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", i + 1), Style::default().fg(Color::Yellow)),
            Span::styled("█ ", Style::default().fg(element_color(&table_type.color))),
            Span::raw(format!(
                "{} ·{} {}",
                table_type.label, table_type.seats, table_type.shape
            )),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(ratatui::widgets::Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Render the status bar (mode indicator, tool, element count, message)
fn render_status_bar<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let editor = &app.editor;
    let (mode_name, mode_bg) = match (&app.mode, editor.state()) {
        (Mode::FieldInput { .. }, _) => ("INS", Color::Green),
        (_, InteractionState::Resizing) => ("SIZE", Color::Magenta),
        (_, InteractionState::Dragging | InteractionState::PendingDrag) => ("DRAG", Color::Magenta),
        (_, InteractionState::ToolSelected) => ("PLACE", Color::Yellow),
        (_, InteractionState::EditSelected) => ("EDIT", Color::Cyan),
        (_, InteractionState::Idle) => ("SEL", Color::Blue),
    };

    let mode_style = Style::default()
        .fg(Color::Black)
        .bg(mode_bg)
        .add_modifier(Modifier::BOLD);

    let tool_info = editor
        .tool()
        .map(|tool| format!(" {}", tool))
        .unwrap_or_default();

    let warning = if editor.drag_out_of_bounds() {
        " release to delete"
    } else {
        ""
    };

    let status_text = app
        .status_message
        .as_ref()
        .map(|m| format!(" {}", m))
        .unwrap_or_default();

    let spans = vec![
        Span::styled(format!(" {} ", mode_name), mode_style),
        Span::styled(tool_info, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {} elements", editor.elements().len())),
        Span::styled(warning, Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(status_text),
    ];

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(paragraph, area);
}

/// Render the help bar
fn render_help_bar<S: KeyValueStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let help_text = match (&app.mode, app.editor.state()) {
        (Mode::FieldInput { .. }, _) => "type value | [Enter] apply [Esc] cancel [Backspace] delete",
        (_, InteractionState::ToolSelected) => {
            "click to place | [t] table [z] zone [b] barrier [1-9] type | [Esc] done"
        }
        (_, InteractionState::EditSelected) => {
            "[Tab] field [Enter] edit [s] shape [Del] delete | drag off canvas to delete | [q]uit"
        }
        (_, InteractionState::Dragging | InteractionState::PendingDrag) => {
            "release to drop | off canvas deletes"
        }
        (_, InteractionState::Resizing) => "release to finish resize",
        (_, InteractionState::Idle) => {
            "[t] table [z] zone [b] barrier [1-9] type | click to edit, drag to move | [q]uit"
        }
    };

    let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use floorplan_core::{ElementField, Tool};
    use floorplan_geometry::Size;
    use floorplan_session::{FloorplanStore, MemoryStore};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn app() -> App<MemoryStore> {
        let store = FloorplanStore::new(MemoryStore::new());
        let mut app = App::new(store, Viewport::new(52, 22, 8.0, 16.0), Some(Size::new(400.0, 320.0)));
        app.set_canvas_area(canvas_area(Rect::new(0, 0, 80, 24)));
        app
    }

    fn draw(app: &App<MemoryStore>) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn symbol(buf: &Buffer, x: u16, y: u16) -> &str {
        buf[(x, y)].symbol()
    }

    fn rendered(app: &App<MemoryStore>) -> String {
        draw(app)
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<Vec<_>>()
            .join("")
    }

    #[test]
    fn canvas_leaves_room_for_panel_and_bars() {
        let area = canvas_area(Rect::new(0, 0, 80, 24));
        assert_eq!(area, Rect::new(0, 0, 80 - PANEL_WIDTH, 22));
    }

    #[test]
    fn cell_bounds_cover_partial_cells() {
        let viewport = Viewport::new(40, 20, 8.0, 16.0);
        assert_eq!(cell_bounds(&viewport, CanvasRect::new(75.0, 75.0, 50.0, 50.0)), (9, 4, 15, 7));
        assert_eq!(cell_bounds(&viewport, CanvasRect::new(0.0, 0.0, 8.0, 16.0)), (0, 0, 0, 0));
    }

    #[test]
    fn visible_range_stays_on_screen() {
        assert_eq!(visible(-3, 5, 10), 0..=5);
        assert_eq!(visible(2, i64::MAX, 10), 2..=9);
        assert!(visible(50, 60, 10).is_empty());
        assert!(visible(0, 3, 0).is_empty());
    }

    #[test]
    fn oversized_element_renders_its_visible_part() {
        let mut app = app();
        app.arm_tool(Tool::Zone);
        app.pointer_down(Point::new(40.0, 40.0));
        app.escape();
        app.pointer_down(Point::new(40.0, 40.0));
        app.pointer_up(Point::new(40.0, 40.0));
        app.editor.edit_field(ElementField::Width, "1e12");
        assert_eq!(app.editor.selected().unwrap().width, 1e12);

        // Zone at (15, 15) spans rows 0..=4 from column 1 to far off screen
        let buf = draw(&app);
        assert_eq!(symbol(&buf, 1, 0), "┌");
        assert_eq!(symbol(&buf, 40, 0), "╌");
        assert_eq!(symbol(&buf, 40, 4), "╌");
        assert_eq!(symbol(&buf, 1, 2), "╎");
        assert_ne!(symbol(&buf, 40, 2), "╎");

        app.editor.edit_field(ElementField::Height, "1e300");
        let buf = draw(&app);
        assert_eq!(symbol(&buf, 1, 0), "┌");
        assert_eq!(symbol(&buf, 1, 21), "╎");
    }

    #[test]
    fn off_screen_element_draws_nothing() {
        let mut app = app();
        let far = floorplan_core::FloorplanElement::new(
            floorplan_core::ElementId(1),
            CanvasRect::new(1e15, 1e15, 1e15, 50.0),
            floorplan_core::HexColor::new("#fef08a"),
            ElementKind::zone(),
        );
        app.editor.load(vec![far]);
        let screen = rendered(&app);
        assert!(!screen.contains("Zone"));
        assert!(screen.contains("1 elements"));
    }

    #[test]
    fn renders_elements_and_labels() {
        let mut app = app();
        app.arm_tool(Tool::Zone);
        app.pointer_down(Point::new(200.0, 160.0));
        app.escape();
        let screen = rendered(&app);
        assert!(screen.contains("Zone"));
        assert!(screen.contains("1 elements"));
    }

    #[test]
    fn panel_shows_selected_fields() {
        let mut app = app();
        app.arm_tool(Tool::Table);
        app.pointer_down(Point::new(200.0, 160.0));
        app.escape();
        app.pointer_down(Point::new(200.0, 160.0));
        app.pointer_up(Point::new(200.0, 160.0));
        let screen = rendered(&app);
        assert!(screen.contains("seats: 2"));
        assert!(screen.contains("EDIT"));
    }
}
