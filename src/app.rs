//! Screen layout and the watch/replay event loops
//!
//! ```text
//! ╭┤ SERVER STATUS ├──────────╮   8 status regions
//! ╰───────────────────────────╯
//! ╭┤ METERS ├─────────────────╮   `meters` canvas, 18 rows
//! │ IN        OUT             │   group labels
//! ╰───────────────────────────╯
//! connected · ws://host/websocket · ...   footer
//! ```

use crate::canvas::{project, Canvas, UNITS_PER_COLUMN};
use crate::client::{dispatch, Client, ConnectionState, LatestSnapshots, MessageHandler, Stats};
use crate::colors::{header_color, muted_color, status_color, text_color, ColorState, StatusColor};
use crate::config::{ReplayConfig, ReplaySource, WatchConfig};
use crate::error::ClientError;
use crate::message::{MeterSnapshot, StatusSnapshot};
use crate::meter::{draw_meters, MeterBar, SURFACE_HEIGHT};
use crate::panel::Panel;
use crate::status::{StatusField, StatusRenderer, TextRegions};
use crate::terminal::Terminal;
use crossterm::event::{KeyCode, KeyModifiers};
use log::{debug, info};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

pub const STATUS_PANEL_HEIGHT: u16 = StatusField::ALL.len() as u16 + 2;
/// Canvas rows, one label row, border
pub const METER_PANEL_HEIGHT: u16 = SURFACE_HEIGHT as u16 / 5 + 1 + 2;
pub const LAYOUT_HEIGHT: u16 = STATUS_PANEL_HEIGHT + METER_PANEL_HEIGHT + 1;
/// Width of the printed snapshot in `replay --print`
pub const PRINT_WIDTH: u16 = 80;

const PLACEHOLDER: &str = "--";

/// The eight status regions, one text line each
#[derive(Debug, Default)]
pub struct StatusPanel {
    lines: [Option<String>; 8],
}

impl TextRegions for StatusPanel {
    type Handle = usize;

    fn lookup(&self, id: &str) -> Option<usize> {
        StatusField::ALL.iter().position(|f| f.id() == id)
    }

    fn set_text(&mut self, handle: usize, text: String) {
        if let Some(line) = self.lines.get_mut(handle) {
            *line = Some(text);
        }
    }
}

/// Footer contents for one frame
pub struct Footer<'a> {
    pub state: &'a str,
    pub color: StatusColor,
    pub source: &'a str,
    pub stats: Stats,
}

impl<'a> Footer<'a> {
    pub fn live(client: &'a Client) -> Self {
        let color = match client.state() {
            ConnectionState::Connected => StatusColor::Good,
            ConnectionState::Idle => StatusColor::Warning,
            ConnectionState::Disconnected => StatusColor::Critical,
        };
        Self {
            state: client.state().label(),
            color,
            source: client.url(),
            stats: client.stats(),
        }
    }

    pub fn replay(source: &'a str, stats: Stats) -> Self {
        Self {
            state: "replay",
            color: StatusColor::Muted,
            source,
            stats,
        }
    }
}

fn meters_panel(width: u16) -> Panel {
    Panel::new(0, STATUS_PANEL_HEIGHT as i32, width, METER_PANEL_HEIGHT, "METERS")
}

/// Everything currently on screen. Each snapshot overwrites its part.
pub struct Display {
    width: u16,
    colors: ColorState,
    status: StatusPanel,
    renderer: StatusRenderer<usize>,
    canvas: Canvas,
    bars: Vec<MeterBar>,
    last_meters: Option<MeterSnapshot>,
    last_update: Option<String>,
}

impl Display {
    pub fn new(width: u16, colors: ColorState) -> Self {
        let status = StatusPanel::default();
        let renderer = StatusRenderer::resolve(&status);
        Self {
            width,
            colors,
            status,
            renderer,
            canvas: Canvas::for_columns(meters_panel(width).inner_width()),
            bars: Vec::new(),
            last_meters: None,
            last_update: None,
        }
    }

    /// Resize the `meters` surface and redraw the last meter snapshot on it
    pub fn resize(&mut self, width: u16) {
        self.width = width;
        self.canvas = Canvas::for_columns(meters_panel(width).inner_width());
        if let Some(snapshot) = &self.last_meters {
            self.bars = draw_meters(&mut self.canvas, snapshot);
        }
    }

    fn touch(&mut self) {
        self.last_update = Some(chrono::Local::now().format("%H:%M:%S").to_string());
    }

    pub fn draw(&self, term: &mut Terminal, footer: &Footer) {
        let text = text_color(&self.colors);
        let muted = muted_color(&self.colors);
        let header = header_color(&self.colors);

        let status = Panel::new(0, 0, self.width, STATUS_PANEL_HEIGHT, "SERVER STATUS")
            .colors(header, muted);
        status.draw(term);
        for (i, (field, line)) in StatusField::ALL.iter().zip(self.status.lines.iter()).enumerate() {
            let y = status.inner_y() + i as i32;
            match line {
                Some(line) => term.set_str(status.inner_x() + 1, y, line, Some(text), false),
                None => {
                    let blank = format!("{}: {}", field.label(), PLACEHOLDER);
                    term.set_str(status.inner_x() + 1, y, &blank, Some(muted), false);
                }
            }
        }

        let meters = meters_panel(self.width).colors(header, muted);
        meters.draw(term);
        project(&self.canvas, term, meters.inner_x(), meters.inner_y(), &self.colors);

        // labels take the last inner row, under the canvas
        let label_y = meters.inner_y() + meters.inner_height() as i32 - 1;
        if self.last_meters.is_none() {
            term.set_str(meters.inner_x() + 1, label_y, "waiting for meters", Some(muted), false);
        }
        let mut previous = None;
        for bar in &self.bars {
            if previous != Some(bar.group) {
                let col = (bar.left_offset as usize / UNITS_PER_COLUMN) as i32;
                term.set_str(meters.inner_x() + col, label_y, bar.group.label(), Some(text), true);
                previous = Some(bar.group);
            }
        }

        let footer_y = LAYOUT_HEIGHT as i32 - 1;
        let state_color = status_color(&self.colors, footer.color);
        term.set_str(0, footer_y, footer.state, Some(state_color), true);
        let detail = format!(
            " · {} · {} msgs, {} ignored, {} dropped · last update {} · q quit",
            footer.source,
            footer.stats.received,
            footer.stats.ignored,
            footer.stats.dropped,
            self.last_update.as_deref().unwrap_or(PLACEHOLDER),
        );
        term.set_str(footer.state.chars().count() as i32, footer_y, &detail, Some(muted), false);
    }
}

impl MessageHandler for Display {
    fn on_status(&mut self, snapshot: &StatusSnapshot) {
        let updated = self.renderer.render(&mut self.status, snapshot);
        debug!("status snapshot updated {} regions", updated);
        self.touch();
    }

    fn on_meters(&mut self, snapshot: &MeterSnapshot) {
        self.bars = draw_meters(&mut self.canvas, snapshot);
        self.last_meters = Some(snapshot.clone());
        self.touch();
    }
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Resize buffer and display if the terminal changed size
fn follow_resize(term: &mut Terminal, display: &mut Display) -> io::Result<()> {
    let (width, height) = crossterm::terminal::size().unwrap_or(term.size());
    if (width, height) != term.size() {
        term.resize(width, height);
        term.clear_screen()?;
        display.resize(width);
    }
    Ok(())
}

/// Connect and render until the user quits
pub fn watch(config: &WatchConfig) -> Result<(), ClientError> {
    let mut client = Client::new(&config.host)?;
    info!("connecting to {}", client.url());
    client.start()?;

    let mut term = Terminal::new()?;
    term.clear_screen()?;
    let mut display = Display::new(term.size().0, ColorState::new(config.scheme));
    let mut pending = LatestSnapshots::default();

    loop {
        follow_resize(&mut term, &mut display)?;

        if let Some((code, mods)) = term.check_key()? {
            if is_quit(code, mods) {
                break;
            }
        }

        client.poll(&mut pending);
        pending.flush_into(&mut display);

        term.clear();
        display.draw(&mut term, &Footer::live(&client));
        term.present()?;
        term.sleep(config.frame_time);
    }

    client.stop();
    Ok(())
}

fn open_replay(source: &ReplaySource) -> Result<Box<dyn BufRead>, ClientError> {
    match source {
        ReplaySource::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
        ReplaySource::File(path) => {
            let file = File::open(path).map_err(|e| ClientError::Replay {
                path: path.clone(),
                source: e,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Dispatch one recorded line, skipping blanks
fn feed_line(line: &str, display: &mut Display, stats: &mut Stats) {
    let line = line.trim();
    if !line.is_empty() {
        stats.record(dispatch(line, display));
    }
}

/// Render recorded messages from a file or stdin
pub fn replay(config: &ReplayConfig) -> Result<(), ClientError> {
    let reader = open_replay(&config.source)?;
    info!("replaying {}", config.source.label());
    if config.print {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        replay_print(reader, config, &mut out)?;
        return Ok(());
    }
    replay_live(reader, config)
}

/// Apply every message, then print the final screen once
pub fn replay_print<R: BufRead, W: Write>(reader: R, config: &ReplayConfig, out: &mut W) -> Result<Stats, ClientError> {
    let mut display = Display::new(PRINT_WIDTH, ColorState::new(config.scheme));
    let mut stats = Stats::default();
    for line in reader.lines() {
        feed_line(&line?, &mut display, &mut stats);
    }

    let label = config.source.label();
    let mut term = Terminal::offscreen(PRINT_WIDTH, LAYOUT_HEIGHT);
    display.draw(&mut term, &Footer::replay(&label, stats));
    term.write_ansi(out)?;
    out.flush()?;
    Ok(stats)
}

/// One line per frame, then hold the last frame until quit
fn replay_live(reader: Box<dyn BufRead>, config: &ReplayConfig) -> Result<(), ClientError> {
    let label = config.source.label();
    let mut term = Terminal::new()?;
    term.clear_screen()?;
    let mut display = Display::new(term.size().0, ColorState::new(config.scheme));
    let mut stats = Stats::default();
    let mut lines = reader.lines();
    let mut finished = false;

    loop {
        follow_resize(&mut term, &mut display)?;

        if let Some((code, mods)) = term.check_key()? {
            if is_quit(code, mods) {
                break;
            }
        }

        if !finished {
            match lines.next() {
                Some(line) => feed_line(&line?, &mut display, &mut stats),
                None => {
                    info!("replay finished: {} messages, {} applied", stats.received, stats.applied);
                    finished = true;
                }
            }
        }

        term.clear();
        display.draw(&mut term, &Footer::replay(&label, stats));
        term.present()?;
        term.sleep(config.frame_time);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = r#"{"topic":"server-status","actual_sample_rate":44100.125,"target_sample_rate":44100.0,"average_cpu_usage":12.3456,"peak_cpu_usage":30.5,"group_count":3,"synth_count":2,"synthdef_count":12,"ugen_count":40}"#;
    const METERS: &str = r#"{"topic":"server-meters","input_meter_peak_levels":[1.0,0.5],"input_meter_rms_levels":[0.5,0.1],"output_meter_peak_levels":[0.2],"output_meter_rms_levels":[0.1]}"#;

    fn screen(display: &Display) -> Vec<String> {
        let mut term = Terminal::offscreen(PRINT_WIDTH, LAYOUT_HEIGHT);
        display.draw(&mut term, &Footer::replay("test", Stats::default()));
        (0..LAYOUT_HEIGHT).map(|y| term.row_text(y)).collect()
    }

    fn replay_config() -> ReplayConfig {
        ReplayConfig {
            source: ReplaySource::Stdin,
            print: true,
            frame_time: 0.05,
            scheme: 7,
        }
    }

    #[test]
    fn layout_fits_a_standard_terminal() {
        assert_eq!(STATUS_PANEL_HEIGHT, 10);
        assert_eq!(METER_PANEL_HEIGHT, 21);
        assert_eq!(LAYOUT_HEIGHT, 32);
        let meters = meters_panel(PRINT_WIDTH);
        let canvas = Canvas::for_columns(meters.inner_width());
        assert_eq!(canvas.columns(), 78);
        // canvas rows plus the label row
        assert_eq!(meters.inner_height() as usize, canvas.rows() + 1);
    }

    #[test]
    fn status_panel_resolves_every_region() {
        let panel = StatusPanel::default();
        for (i, field) in StatusField::ALL.iter().enumerate() {
            assert_eq!(panel.lookup(field.id()), Some(i));
        }
        assert_eq!(panel.lookup("meters"), None);
    }

    #[test]
    fn empty_display_shows_placeholders() {
        let rows = screen(&Display::new(PRINT_WIDTH, ColorState::new(7)));
        assert!(rows[1].contains("Actual sample rate: --"));
        assert!(rows.iter().any(|r| r.contains("waiting for meters")));
        assert!(rows[31].starts_with("replay · test · 0 msgs"));
    }

    #[test]
    fn status_message_fills_regions() {
        let mut display = Display::new(PRINT_WIDTH, ColorState::new(7));
        assert_eq!(dispatch(STATUS, &mut display), crate::client::Outcome::Status);
        let rows = screen(&display);
        assert!(rows[1].contains("Actual sample rate: 44100.125"));
        assert!(rows[2].contains("Average CPU usage: 12.346%"));
        assert!(rows[3].contains("Group count: 3"));
        assert!(rows[7].contains("Target sample rate: 44100"));
        assert!(!rows[31].contains("last update --"));
    }

    #[test]
    fn meter_message_draws_bars_and_labels() {
        let mut display = Display::new(PRINT_WIDTH, ColorState::new(7));
        dispatch(METERS, &mut display);
        let rows = screen(&display);
        // label row sits under the 18 canvas rows
        let labels = &rows[11 + 18];
        let at = |col: usize, len: usize| labels.chars().skip(col).take(len).collect::<String>();
        assert_eq!(at(2, 2), "IN");
        assert_eq!(at(10, 3), "OUT");
        assert_eq!(at(4, 6).trim(), "");
        // full-scale peak of input 0 on the top meter row
        assert!(rows[12].chars().skip(2).take(3).all(|c| c == '─'));
    }

    #[test]
    fn unknown_and_malformed_messages_change_nothing() {
        let mut display = Display::new(PRINT_WIDTH, ColorState::new(7));
        dispatch(STATUS, &mut display);
        dispatch(METERS, &mut display);
        let before = screen(&display);

        dispatch(r#"{"topic":"server-foo"}"#, &mut display);
        dispatch("this is not json", &mut display);
        dispatch(r#"{"topic":"server-status""#, &mut display);
        assert_eq!(before, screen(&display));
    }

    #[test]
    fn same_meters_twice_render_identically() {
        let mut display = Display::new(PRINT_WIDTH, ColorState::new(0));
        dispatch(METERS, &mut display);
        let canvas = display.canvas.clone();
        dispatch(METERS, &mut display);
        assert_eq!(canvas, display.canvas);
    }

    #[test]
    fn resize_keeps_last_meters() {
        let mut display = Display::new(PRINT_WIDTH, ColorState::new(7));
        dispatch(METERS, &mut display);
        display.resize(40);
        assert_eq!(display.canvas.columns(), 38);
        assert_eq!(display.bars.len(), 3);
    }

    #[test]
    fn replay_print_counts_and_prints() {
        let input = format!("{}\n\nnot json\n{{\"topic\":\"other\"}}\n{}\n", STATUS, METERS);
        let mut out = Vec::new();
        let stats = replay_print(input.as_bytes(), &replay_config(), &mut out).unwrap();
        assert_eq!(stats, Stats { received: 4, applied: 2, ignored: 1, dropped: 1 });

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), LAYOUT_HEIGHT as usize);
        assert!(text.contains("\x1b[1m"));
        assert!(text.contains('╭'));
    }

    #[test]
    fn quit_keys() {
        assert!(is_quit(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(is_quit(KeyCode::Esc, KeyModifiers::NONE));
        assert!(is_quit(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!is_quit(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(!is_quit(KeyCode::Char(' '), KeyModifiers::NONE));
    }
}
