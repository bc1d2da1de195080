use std::cell::Cell;
use std::fs::File;
use std::io;
use std::io::Stdout;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event as CEvent, KeyCode};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tui::backend::CrosstermBackend;
use tui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use tui::style::{Color, Style};
use tui::text::{Span, Spans};
use tui::widgets::{Block, BorderType, Borders, Paragraph};
use tui::Terminal;

use battery_monitor::bsp::clock::Clock;
use battery_monitor::bsp::display::{COLUMNS, ROWS};
use battery_monitor::bsp::led::Led;
use battery_monitor::config::{MonitorConfig, REFERENCE_VOLTS, SAMPLES_PER_READING};
use battery_monitor::monitor::BatteryMonitor;

use crate::board::{DummyLed, SimWatchdog, SleepDelay, SwitchPin, SystemClock};
use crate::lcd::LcdGrid;
use crate::sim_adc::SimulatedAdc;
use crate::telemetry::TelemetryLog;

mod board;
mod lcd;
mod sim_adc;
mod telemetry;

const WATCHDOG_TIMEOUT: Duration = Duration::from_millis(2000);
const KEY_POLL: Duration = Duration::from_millis(10);

/// Terminal simulator of the SLA battery monitor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of monitored batteries
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=4))]
    batteries: u8,

    /// Voltage of the reference input
    #[arg(long, default_value_t = REFERENCE_VOLTS)]
    reference_volts: f32,

    /// Nominal supply of the converter
    #[arg(long, default_value_t = 5.0)]
    supply: f32,

    /// Amplitude of the supply drift
    #[arg(long, default_value_t = 0.15)]
    drift: f32,

    /// Conversions averaged per reading
    #[arg(short, long, default_value_t = SAMPLES_PER_READING)]
    samples: u8,

    /// Append every telemetry line to this file
    #[arg(short, long)]
    capture: Option<PathBuf>,

    /// Log file, the terminal belongs to the UI
    #[arg(long, default_value = "console_sim.log")]
    log_file: PathBuf,

    /// Start with the display detached
    #[arg(long)]
    no_display: bool,

    /// Start with the serial line disconnected
    #[arg(long)]
    no_serial: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let mut config = MonitorConfig::with_batteries(args.batteries as usize);
    config.reference_volts = args.reference_volts;
    config.adc.samples = args.samples;

    let capture = match &args.capture {
        Some(path) => Some(
            File::create(path)
                .with_context(|| format!("cannot create capture file {:?}", path))?,
        ),
        None => None,
    };

    let adc = SimulatedAdc::create(&config, args.supply, args.drift);
    let delay = SleepDelay;
    let lcd = LcdGrid::create(!args.no_display);
    let telemetry = TelemetryLog::create(!args.no_serial, capture);
    let watchdog = SimWatchdog::create(WATCHDOG_TIMEOUT);
    let led = DummyLed::create();
    let backlight_level = Cell::new(true);
    let clock = SystemClock::create();

    let monitor = BatteryMonitor::new(
        config,
        &adc,
        &delay,
        SwitchPin::create(&backlight_level),
        &lcd,
        &telemetry,
        &watchdog,
        &led,
    );
    monitor.start(clock.now_ms());

    enable_raw_mode().context("cannot switch the terminal to raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = (|| -> Result<()> {
        loop {
            monitor.poll(clock.now_ms());

            let view = View {
                lcd: &lcd,
                telemetry: &telemetry,
                adc: &adc,
                watchdog: &watchdog,
                heartbeat: led.get(),
                backlight_level: backlight_level.get(),
            };
            draw_tui(&mut terminal, &view)?;

            if event::poll(KEY_POLL)? {
                if let CEvent::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('b') => backlight_level.set(!backlight_level.get()),
                        KeyCode::Char('r') => {
                            adc.toggle_reference_fault();
                            tracing::info!(fault = adc.has_reference_fault(), "reference input");
                        }
                        _ => {}
                    }
                }
            }
        }
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

/// Logs go to a file, `RUST_LOG` overrides the default level (INFO).
/// Records of the `log` facade used by `battery_monitor` are forwarded as well.
fn init_logging(path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("cannot create log file {:?}", path))?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

struct View<'a> {
    lcd: &'a LcdGrid,
    telemetry: &'a TelemetryLog,
    adc: &'a SimulatedAdc,
    watchdog: &'a SimWatchdog,
    heartbeat: bool,
    backlight_level: bool,
}

fn draw_tui(terminal: &mut Terminal<CrosstermBackend<Stdout>>, view: &View) -> io::Result<()> {
    terminal.draw(|rect| {
        let size = rect.size();
        let vertical_layout = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(
                [
                    Constraint::Length(ROWS as u16 + 2),
                    Constraint::Length(3),
                    Constraint::Min(3),
                ]
                .as_ref(),
            )
            .split(size);

        let lcd_style = if view.lcd.is_lit() {
            Style::default().fg(Color::Black).bg(Color::Rgb(140, 210, 255))
        } else {
            Style::default().fg(Color::Gray).bg(Color::Black)
        };
        let lcd_rows: Vec<Spans> = if view.lcd.is_attached() {
            view.lcd
                .rows()
                .into_iter()
                .map(|row| Spans::from(Span::styled(row, lcd_style)))
                .collect()
        } else {
            vec![Spans::from(Span::raw("(detached)"))]
        };
        let lcd_paragraph = Paragraph::new(lcd_rows).block(
            Block::default()
                .title("LCD")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
        let lcd_area = Rect {
            width: vertical_layout[0].width.min(COLUMNS as u16 + 2),
            ..vertical_layout[0]
        };

        let heartbeat_style = if view.heartbeat {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let watchdog_style = if view.watchdog.has_expired() {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        let status = Paragraph::new(vec![
            Spans::from(vec![
                Span::styled(" \u{25cf} ", heartbeat_style),
                Span::styled(
                    format!("watchdog fed {:4}ms ago", view.watchdog.since_feed().as_millis()),
                    watchdog_style,
                ),
                Span::raw(format!(
                    "   supply {:.3}V   reference {}   backlight input {}",
                    view.adc.supply_voltage(),
                    if view.adc.has_reference_fault() { "LOST" } else { "ok" },
                    if view.backlight_level { "high" } else { "low" },
                )),
            ]),
            Spans::from(Span::styled(
                " [b] backlight  [r] reference fault  [q] quit",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Left);

        let visible = vertical_layout[2].height.saturating_sub(2) as usize;
        let lines = view.telemetry.lines();
        let telemetry_rows: Vec<Spans> = lines
            .iter()
            .skip(lines.len().saturating_sub(visible))
            .map(|line| Spans::from(Span::raw(line.clone())))
            .collect();
        let telemetry_paragraph = Paragraph::new(telemetry_rows).block(
            Block::default()
                .title("Telemetry")
                .borders(Borders::ALL)
                .border_type(BorderType::Plain),
        );

        rect.render_widget(lcd_paragraph, lcd_area);
        rect.render_widget(status, vertical_layout[1]);
        rect.render_widget(telemetry_paragraph, vertical_layout[2]);
    })?;
    Ok(())
}
