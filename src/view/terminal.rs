//! Terminal front end for a timer window

use std::{future::Future, io::Write};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    time::{interval, interval_at, Instant},
};
use tracing::{debug, info};

use crate::{services::WindowBounds, utils::shutdown_signal};
use super::{
    backend::TimerBackend,
    timer_view::{TimerView, LOCAL_TICK, SAVE_PERIOD},
};

/// A line typed into the window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Bare Enter
    Enter,
    Start,
    Stop,
    Dismiss,
    /// New duration as typed into the minutes and seconds fields
    Duration { minutes: String, seconds: String },
    Quit,
    Unknown(String),
}

pub const HELP: &str =
    "Enter: start | s: start/resume | p: stop/end | d: dismiss | M:SS or M S: set duration | q: quit";

/// Interpret one line of terminal input
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => return Input::Enter,
        "s" | "start" | "r" | "resume" => return Input::Start,
        "p" | "stop" | "pause" | "e" | "end" => return Input::Stop,
        "d" | "dismiss" => return Input::Dismiss,
        "q" | "quit" | "exit" => return Input::Quit,
        _ => {}
    }

    let parts: Vec<&str> = line
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    let numeric = |part: &&str| part.chars().all(|c| c.is_ascii_digit());
    match parts.as_slice() {
        [minutes, seconds] if numeric(minutes) && numeric(seconds) => Input::Duration {
            minutes: minutes.to_string(),
            seconds: seconds.to_string(),
        },
        [seconds] if numeric(seconds) => Input::Duration {
            minutes: "0".to_string(),
            seconds: seconds.to_string(),
        },
        _ => Input::Unknown(line.to_string()),
    }
}

/// Drive `view` from stdin until the user quits, stdin closes or a signal arrives.
/// With `placement`, the terminal is first moved and resized to those bounds.
pub async fn run_window<B: TimerBackend>(
    view: TimerView<B>,
    placement: Option<WindowBounds>,
) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    if let Some(bounds) = placement {
        debug!("Placing window at {}", bounds.geometry());
        write!(stdout, "{}", bounds.placement_sequence())?;
    }
    let input = BufReader::new(tokio::io::stdin());
    drive(view, input, &mut stdout, shutdown_signal()).await
}

async fn drive<B, R, W, S>(
    mut view: TimerView<B>,
    input: R,
    out: &mut W,
    shutdown: S,
) -> anyhow::Result<()>
where
    B: TimerBackend,
    R: AsyncBufRead + Unpin,
    W: Write,
    S: Future<Output = ()>,
{
    view.load().await;
    writeln!(out, "{}", HELP)?;
    draw(&view, out);

    let mut lines = input.lines();
    let mut redraw = interval(LOCAL_TICK);
    let mut autosave = interval_at(Instant::now() + SAVE_PERIOD, SAVE_PERIOD);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = redraw.tick() => {
                if view.tick() {
                    view.refresh_badge().await;
                }
                draw(&view, out);
            }
            _ = autosave.tick() => {
                view.save().await;
                view.refresh_badge().await;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                match parse_input(&line) {
                    Input::Enter => view.key_enter().await,
                    Input::Start => view.press_start().await,
                    Input::Stop => view.press_stop().await,
                    Input::Dismiss => view.press_dismiss().await,
                    Input::Duration { minutes, seconds } => {
                        if !view.set_inputs(&minutes, &seconds).await {
                            writeln!(out, "Duration is locked until the timer is ended")?;
                        }
                    }
                    Input::Quit => break,
                    Input::Unknown(text) => writeln!(out, "Unknown input {:?}. {}", text, HELP)?,
                }
                draw(&view, out);
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    view.close().await;
    Ok(())
}

fn draw<B: TimerBackend, W: Write>(view: &TimerView<B>, out: &mut W) {
    let _ = write!(out, "\r\x1b[2K{}", view.render());
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };
    use tokio::io::AsyncWriteExt;

    use crate::{
        services::{alarm::tests::RecordingPlayer, BadgeState, ManualClock},
        state::{Command, Reply, TimerState},
    };

    #[test]
    fn parses_buttons_and_enter() {
        assert_eq!(parse_input(""), Input::Enter);
        assert_eq!(parse_input("  S "), Input::Start);
        assert_eq!(parse_input("pause"), Input::Stop);
        assert_eq!(parse_input("d"), Input::Dismiss);
        assert_eq!(parse_input("q"), Input::Quit);
    }

    #[test]
    fn parses_durations() {
        let duration = |m: &str, s: &str| Input::Duration {
            minutes: m.to_string(),
            seconds: s.to_string(),
        };
        assert_eq!(parse_input("1:30"), duration("1", "30"));
        assert_eq!(parse_input("2 05"), duration("2", "05"));
        assert_eq!(parse_input("45"), duration("0", "45"));
    }

    /// Backend that answers every command and records when it arrived
    #[derive(Clone, Default)]
    struct ScriptedBackend {
        received: Arc<Mutex<Vec<(Instant, Command)>>>,
    }

    impl ScriptedBackend {
        fn input_saves(&self) -> Vec<(Instant, Command)> {
            self.received
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, command)| matches!(command, Command::UpdateInputs { .. }))
                .cloned()
                .collect()
        }
    }

    impl TimerBackend for ScriptedBackend {
        fn execute(&self, command: Command) -> impl Future<Output = anyhow::Result<Reply>> + Send {
            let reply = match command {
                Command::GetState => Reply::State(TimerState::new()),
                _ => Reply::ok(),
            };
            self.received.lock().unwrap().push((Instant::now(), command));
            std::future::ready(Ok(reply))
        }

        fn badge(&self) -> impl Future<Output = anyhow::Result<Option<BadgeState>>> + Send {
            std::future::ready(Ok(None))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn inputs_are_saved_periodically_and_on_close() {
        let backend = ScriptedBackend::default();
        let view = TimerView::new(
            backend.clone(),
            Arc::new(RecordingPlayer::default()),
            Arc::new(ManualClock::at(0)),
        );
        let (mut keyboard, input) = tokio::io::duplex(64);
        let began = Instant::now();

        let typing = async move {
            keyboard.write_all(b"1:30\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(7_500)).await;
            drop(keyboard);
        };
        let mut screen = Vec::new();
        let (result, ()) = tokio::join!(
            drive(view, BufReader::new(input), &mut screen, std::future::pending()),
            typing,
        );
        result.unwrap();

        let saves = backend.input_saves();
        let offsets: Vec<Duration> = saves.iter().map(|(at, _)| *at - began).collect();
        assert_eq!(
            offsets,
            [Duration::ZERO, Duration::from_secs(5), Duration::from_millis(7_500)]
        );
        assert!(saves
            .iter()
            .all(|(_, command)| *command == Command::UpdateInputs { minutes: 1, seconds: 30 }));

        let screen = String::from_utf8(screen).unwrap();
        assert!(screen.contains("01:30"));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_closes_the_window() {
        let backend = ScriptedBackend::default();
        let view = TimerView::new(
            backend.clone(),
            Arc::new(RecordingPlayer::default()),
            Arc::new(ManualClock::at(0)),
        );
        let (_keyboard, input) = tokio::io::duplex(64);
        let mut screen = Vec::new();

        let shutdown = tokio::time::sleep(Duration::from_secs(2));
        drive(view, BufReader::new(input), &mut screen, shutdown).await.unwrap();

        assert_eq!(backend.input_saves().len(), 1);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_input("1:xx"), Input::Unknown("1:xx".to_string()));
        assert_eq!(parse_input("1:2:3"), Input::Unknown("1:2:3".to_string()));
    }
}
