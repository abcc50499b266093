mod app;
mod editor;
mod listeners;
mod tools;
mod ui;

use std::fs::{self, OpenOptions};
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use floorplan_core::{Catalog, HexColor, IdGenerator, TableShape, TableType, TableTypeId, Tool};
use floorplan_geometry::{Size, Viewport};
use floorplan_session::{FileStore, FloorplanStore, Settings, default_data_dir};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{App, Mode};

/// Restaurant floor-plan editor for the terminal
#[derive(Parser, Debug)]
#[command(name = "floorplan")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the element list, catalog and log
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Fixed canvas size in pixels, e.g. 800x600
    #[arg(long, value_name = "WxH", value_parser = parse_canvas_size)]
    canvas: Option<Size>,

    /// Log level when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage table types
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Print the element list as JSON
    Export,
    /// Clear the element list and the catalog
    Reset,
    /// Show the saved settings, optionally changing the canvas size
    Settings {
        /// Remember a fixed canvas size, e.g. 800x600
        #[arg(long, value_name = "WxH", value_parser = parse_canvas_size)]
        canvas: Option<Size>,
        /// Forget the fixed canvas size and follow the terminal
        #[arg(long, conflicts_with = "canvas")]
        follow_terminal: bool,
    },
}

#[derive(Subcommand, Debug)]
enum CatalogAction {
    /// List table types in slot order
    List,
    /// Add a table type
    Add {
        #[arg(long)]
        label: String,
        #[arg(long, default_value_t = 4)]
        seats: u32,
        #[arg(long, default_value = "square")]
        shape: TableShape,
        #[arg(long, default_value = floorplan_core::element::DEFAULT_TABLE_COLOR)]
        color: String,
        /// Identifier; generated when omitted
        #[arg(long)]
        id: Option<String>,
    },
    /// Change fields of a table type; placed tables keep their values
    Update {
        id: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        seats: Option<u32>,
        #[arg(long)]
        shape: Option<TableShape>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a table type; placed tables are kept
    Remove { id: String },
}

fn parse_canvas_size(s: &str) -> Result<Size> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        bail!("expected WIDTHxHEIGHT, got {s:?}");
    };
    let width: f64 = w.trim().parse().with_context(|| format!("bad width {w:?}"))?;
    let height: f64 = h.trim().parse().with_context(|| format!("bad height {h:?}"))?;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        bail!("canvas size must be positive, got {s:?}");
    }
    Ok(Size::new(width, height))
}

/// Log to a file in the data directory; the terminal belongs to the UI
fn init_logging(data_dir: &Path, level: &str) -> Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;
    let log_path = data_dir.join("floorplan.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);
    init_logging(&data_dir, &args.log_level)?;
    info!(data_dir = %data_dir.display(), "Starting floorplan");

    let store = FloorplanStore::new(FileStore::new(&data_dir));

    match args.command {
        Some(Command::Catalog { action }) => run_catalog(store, action),
        Some(Command::Export) => {
            let elements = store.load_elements();
            println!("{}", serde_json::to_string_pretty(&elements)?);
            Ok(())
        }
        Some(Command::Reset) => {
            let mut store = store;
            store.reset()?;
            println!("Cleared elements and table types in {}", data_dir.display());
            Ok(())
        }
        Some(Command::Settings {
            canvas,
            follow_terminal,
        }) => {
            let settings = run_settings(&Settings::config_path(), canvas, follow_terminal)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        None => run_editor(store, args.canvas),
    }
}

fn run_catalog(mut store: FloorplanStore<FileStore>, action: CatalogAction) -> Result<()> {
    let mut catalog: Catalog = store.load_catalog();
    if let CatalogAction::List = action {
        print!("{}", list_catalog(&catalog));
        return Ok(());
    }
    let message = edit_catalog(&mut catalog, action)?;
    store.save_catalog(&catalog)?;
    println!("{message}");
    Ok(())
}

fn list_catalog(catalog: &Catalog) -> String {
    if catalog.is_empty() {
        return "No table types\n".to_string();
    }
    catalog
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "{}. {} [{}] {} seats, {}, {}\n",
                i + 1,
                t.label,
                t.id,
                t.seats,
                t.shape,
                t.color
            )
        })
        .collect()
}

fn check_color(color: &str) -> Result<()> {
    if !HexColor::is_valid(color) {
        bail!("invalid color {color:?}, expected #rgb or #rrggbb");
    }
    Ok(())
}

/// Apply a catalog command and describe what changed
fn edit_catalog(catalog: &mut Catalog, action: CatalogAction) -> Result<String> {
    match action {
        CatalogAction::List => Ok(list_catalog(catalog)),
        CatalogAction::Add {
            label,
            seats,
            shape,
            color,
            id,
        } => {
            check_color(&color)?;
            let id = match id {
                Some(id) => TableTypeId::new(id),
                None => TableTypeId::new(IdGenerator::new().next_id().to_string()),
            };
            catalog.add(TableType::new(id.clone(), label.as_str(), seats, shape, HexColor::new(color)))?;
            Ok(format!("Added {} [{}]", label, id))
        }
        CatalogAction::Update {
            id,
            label,
            seats,
            shape,
            color,
        } => {
            let id = TableTypeId::new(id);
            let Some(mut table_type) = catalog.get(&id).cloned() else {
                bail!("no table type with id {}", id);
            };
            if let Some(label) = label {
                table_type.label = label;
            }
            if let Some(seats) = seats {
                table_type.seats = seats.max(1);
            }
            if let Some(shape) = shape {
                table_type.shape = shape;
            }
            if let Some(color) = color {
                check_color(&color)?;
                table_type.color = HexColor::new(color);
            }
            let message = format!("Updated {} [{}]", table_type.label, table_type.id);
            catalog.update(table_type)?;
            Ok(message)
        }
        CatalogAction::Remove { id } => {
            let id = TableTypeId::new(id);
            match catalog.remove(&id) {
                Some(t) => Ok(format!("Removed {} [{}]", t.label, t.id)),
                None => bail!("no table type with id {}", id),
            }
        }
    }
}

/// Load settings from `path`, apply the canvas change and save if anything changed
fn run_settings(path: &Path, canvas: Option<Size>, follow_terminal: bool) -> Result<Settings> {
    let mut settings = Settings::load_from(path);
    let before = settings.clone();
    if let Some(canvas) = canvas {
        settings.canvas_width = Some(canvas.width);
        settings.canvas_height = Some(canvas.height);
    }
    if follow_terminal {
        settings.canvas_width = None;
        settings.canvas_height = None;
    }
    if settings != before {
        settings.save_to(path)?;
        info!(path = %path.display(), "Saved settings");
    }
    Ok(settings)
}

fn run_editor(store: FloorplanStore<FileStore>, canvas: Option<Size>) -> Result<()> {
    let settings = Settings::load();
    let fixed_canvas = canvas.or(match (settings.canvas_width, settings.canvas_height) {
        (Some(w), Some(h)) => Some(Size::new(w, h)),
        _ => None,
    });

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let area = ui::canvas_area(Rect::new(0, 0, size.width, size.height));
    let viewport = Viewport::new(
        area.width,
        area.height,
        settings.cell_width_px,
        settings.cell_height_px,
    );
    let mut app = App::new(store, viewport, fixed_canvas);
    app.set_canvas_area(area);

    let result = run_app(&mut terminal, &mut app);

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {:?}", e);
    }
    info!("Exiting floorplan");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.clear_status();
                    match &app.mode {
                        Mode::Normal => handle_normal_mode(app, key),
                        Mode::FieldInput { .. } => handle_field_input_mode(app, key),
                    }
                }
                Event::Mouse(mouse) => {
                    if matches!(app.mode, Mode::Normal) {
                        tools::handle_mouse_event(app, mouse);
                    }
                }
                Event::Resize(w, h) => {
                    app.set_canvas_area(ui::canvas_area(Rect::new(0, 0, w, h)));
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn handle_normal_mode(app: &mut App, key: event::KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
        }
        KeyCode::Esc => app.escape(),

        // Toolbar
        KeyCode::Char('t') => app.arm_tool(Tool::Table),
        KeyCode::Char('z') => app.arm_tool(Tool::Zone),
        KeyCode::Char('b') => app.arm_tool(Tool::Barrier),
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(slot) = c.to_digit(10) {
                app.arm_catalog_slot(slot as usize);
            }
        }

        // Property panel
        KeyCode::Tab | KeyCode::Down => app.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.prev_field(),
        KeyCode::Enter => {
            if app.start_field_input() {
                app.set_status("Editing field - Enter to apply, Esc to cancel");
            }
        }
        KeyCode::Char('s') => app.cycle_shape(),
        KeyCode::Delete | KeyCode::Backspace => app.delete_selected(),

        _ => {}
    }
}

fn handle_field_input_mode(app: &mut App, key: event::KeyEvent) {
    match key.code {
        KeyCode::Esc => app.escape(),
        KeyCode::Enter => app.commit_field_input(),
        KeyCode::Backspace => app.backspace_input(),
        KeyCode::Char(c) => app.add_input_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_size_parses() {
        assert_eq!(parse_canvas_size("800x600").unwrap(), Size::new(800.0, 600.0));
        assert_eq!(parse_canvas_size("640X480").unwrap(), Size::new(640.0, 480.0));
        assert!(parse_canvas_size("800").is_err());
        assert!(parse_canvas_size("0x600").is_err());
        assert!(parse_canvas_size("axb").is_err());
    }

    #[test]
    fn cli_parses_subcommands() {
        let args = Args::try_parse_from([
            "floorplan", "catalog", "add", "--label", "Booth", "--seats", "6", "--shape", "rectangle",
        ])
        .unwrap();
        match args.command {
            Some(Command::Catalog {
                action: CatalogAction::Add { label, seats, shape, color, id },
            }) => {
                assert_eq!(label, "Booth");
                assert_eq!(seats, 6);
                assert_eq!(shape, TableShape::Rectangle);
                assert_eq!(color, "#93c5fd");
                assert_eq!(id, None);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let args = Args::try_parse_from([
            "floorplan", "catalog", "update", "booth", "--seats", "8", "--color", "#fff",
        ])
        .unwrap();
        match args.command {
            Some(Command::Catalog {
                action: CatalogAction::Update { id, label, seats, shape, color },
            }) => {
                assert_eq!(id, "booth");
                assert_eq!(label, None);
                assert_eq!(seats, Some(8));
                assert_eq!(shape, None);
                assert_eq!(color.as_deref(), Some("#fff"));
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Args::try_parse_from([
            "floorplan", "settings", "--canvas", "400x300", "--follow-terminal",
        ])
        .is_err());

        let args = Args::try_parse_from(["floorplan", "--canvas", "400x300"]).unwrap();
        assert_eq!(args.canvas, Some(Size::new(400.0, 300.0)));
        assert!(args.command.is_none());
    }

    fn booth_catalog() -> Catalog {
        Catalog::from_types(vec![TableType::new(
            TableTypeId::new("booth"),
            "Booth",
            6,
            TableShape::Rectangle,
            HexColor::new("#93c5fd"),
        )])
    }

    #[test]
    fn catalog_update_changes_only_given_fields() {
        let mut catalog = booth_catalog();
        let message = edit_catalog(
            &mut catalog,
            CatalogAction::Update {
                id: "booth".into(),
                label: Some("Window booth".into()),
                seats: Some(0),
                shape: None,
                color: None,
            },
        )
        .unwrap();
        assert_eq!(message, "Updated Window booth [booth]");

        let updated = catalog.get(&TableTypeId::new("booth")).unwrap();
        assert_eq!(updated.label, "Window booth");
        assert_eq!(updated.seats, 1);
        assert_eq!(updated.shape, TableShape::Rectangle);
        assert_eq!(updated.color.as_str(), "#93c5fd");
    }

    #[test]
    fn catalog_update_rejects_unknown_id_and_bad_color() {
        let mut catalog = booth_catalog();
        let unknown = CatalogAction::Update {
            id: "bar".into(),
            label: Some("Bar".into()),
            seats: None,
            shape: None,
            color: None,
        };
        assert!(edit_catalog(&mut catalog, unknown).is_err());

        let bad_color = CatalogAction::Update {
            id: "booth".into(),
            label: Some("Renamed".into()),
            seats: None,
            shape: None,
            color: Some("blue".into()),
        };
        assert!(edit_catalog(&mut catalog, bad_color).is_err());
        assert_eq!(catalog.get(&TableTypeId::new("booth")).unwrap().label, "Booth");
    }

    #[test]
    fn catalog_add_then_remove() {
        let mut catalog = Catalog::new();
        let add = CatalogAction::Add {
            label: "Two-top".into(),
            seats: 2,
            shape: TableShape::Circle,
            color: "#fca5a5".into(),
            id: Some("two".into()),
        };
        assert_eq!(edit_catalog(&mut catalog, add).unwrap(), "Added Two-top [two]");
        assert!(list_catalog(&catalog).starts_with("1. Two-top [two] 2 seats"));

        let remove = CatalogAction::Remove { id: "two".into() };
        assert_eq!(edit_catalog(&mut catalog, remove).unwrap(), "Removed Two-top [two]");
        assert_eq!(list_catalog(&catalog), "No table types\n");
    }

    #[test]
    fn settings_command_persists_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("floorplan").join("settings.json");

        let saved = run_settings(&path, Some(Size::new(640.0, 480.0)), false).unwrap();
        assert_eq!(saved.canvas_width, Some(640.0));
        assert_eq!(Settings::load_from(&path), saved);

        let cleared = run_settings(&path, None, true).unwrap();
        assert_eq!(cleared.canvas_width, None);
        assert_eq!(Settings::load_from(&path).canvas_height, None);
    }
}
