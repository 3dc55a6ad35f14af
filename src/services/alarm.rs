//! Audible alarm: a fixed three-tone pattern repeated once per second

use std::{
    f32::consts::PI,
    io::Write,
    sync::{mpsc, Arc, Mutex},
    thread,
    time::Duration,
};
use rodio::{buffer::SamplesBuffer, OutputStream};
use tokio::time::{interval, sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::tasks::TaskHandle;

/// One tone of the alert pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u64,
    /// Start offset from the beginning of the pattern
    pub offset_ms: u64,
}

/// beep, beep, high beep
pub const ALERT_PATTERN: [Tone; 3] = [
    Tone { frequency_hz: 880, duration_ms: 150, offset_ms: 0 },
    Tone { frequency_hz: 880, duration_ms: 150, offset_ms: 200 },
    Tone { frequency_hz: 1100, duration_ms: 300, offset_ms: 400 },
];

/// Maximum number of times the pattern is played per alarm
pub const MAX_REPETITIONS: u32 = 10;
pub const REPEAT_PERIOD: Duration = Duration::from_secs(1);

/// Something that can make a single tone
pub trait AlarmPlayer: Send + Sync {
    fn play_tone(&self, tone: &Tone) -> Result<(), String>;
}

const SAMPLE_RATE: u32 = 44_100;
/// Fade in and out over this long so tones start and stop without clicks
const RAMP_SECONDS: f32 = 0.01;
const VOLUME: f32 = 0.3;

/// Sine samples for `tone` at `sample_rate`, mono
pub fn tone_samples(tone: &Tone, sample_rate: u32) -> Vec<f32> {
    let length = tone.duration_ms as f32 / 1000.0;
    let count = (sample_rate as u64 * tone.duration_ms / 1000) as usize;
    (0..count)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let envelope = (t / RAMP_SECONDS).min((length - t) / RAMP_SECONDS).clamp(0.0, 1.0);
            (t * tone.frequency_hz as f32 * 2.0 * PI).sin() * VOLUME * envelope
        })
        .collect()
}

/// Synthesised tones on the default audio output.
///
/// The output stream lives on its own thread; tones are queued to it.
pub struct TonePlayer {
    tx: Mutex<mpsc::Sender<Tone>>,
}

impl TonePlayer {
    /// Open the default output device, failing when there is none
    pub fn open() -> Result<Self, String> {
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        thread::Builder::new()
            .name("alarm-audio".to_string())
            .spawn(move || audio_thread(rx, ready_tx))
            .map_err(|e| format!("Failed to spawn audio thread: {}", e))?;

        ready_rx
            .recv()
            .map_err(|_| "Audio thread exited during startup".to_string())??;
        Ok(Self { tx: Mutex::new(tx) })
    }
}

impl AlarmPlayer for TonePlayer {
    fn play_tone(&self, tone: &Tone) -> Result<(), String> {
        self.tx
            .lock()
            .map_err(|e| format!("Failed to lock audio channel: {}", e))?
            .send(*tone)
            .map_err(|_| "Audio thread is not running".to_string())
    }
}

fn audio_thread(rx: mpsc::Receiver<Tone>, ready: mpsc::Sender<Result<(), String>>) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(output) => output,
        Err(e) => {
            let _ = ready.send(Err(format!("No audio output device: {}", e)));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    while let Ok(tone) = rx.recv() {
        let source = SamplesBuffer::new(1, SAMPLE_RATE, tone_samples(&tone, SAMPLE_RATE));
        if let Err(e) = handle.play_raw(source) {
            warn!("Failed to play {}Hz tone: {}", tone.frequency_hz, e);
        }
    }
}

/// Speaker when one is available, terminal bell otherwise
pub fn default_player() -> Arc<dyn AlarmPlayer> {
    match TonePlayer::open() {
        Ok(player) => Arc::new(player),
        Err(e) => {
            info!("{}, alarm falls back to the terminal bell", e);
            Arc::new(BellPlayer)
        }
    }
}

/// Rings the terminal bell once per tone
#[derive(Debug, Default)]
pub struct BellPlayer;

impl AlarmPlayer for BellPlayer {
    fn play_tone(&self, tone: &Tone) -> Result<(), String> {
        let mut stderr = std::io::stderr();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| format!("Failed to ring bell for {}Hz tone: {}", tone.frequency_hz, e))
    }
}

/// A running alarm. Cancelling stops the remaining repetitions and any tone
/// still pending in the current pattern.
#[derive(Debug, Default)]
pub struct AlarmLoop {
    task: TaskHandle,
}

impl AlarmLoop {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Play the pattern now and then once per `period`, `repetitions` times in total
    pub fn start(player: Arc<dyn AlarmPlayer>, repetitions: u32, period: Duration) -> Self {
        debug!("Alarm started: {} repetitions", repetitions);
        let task = TaskHandle::spawn(async move {
            let mut ticks = interval(period);
            for _ in 0..repetitions {
                ticks.tick().await;
                play_pattern(player.as_ref()).await;
            }
            debug!("Alarm finished all repetitions");
        });
        Self { task }
    }

    pub fn cancel(&mut self) {
        if self.task.is_active() {
            debug!("Alarm cancelled");
        }
        self.task.cancel();
    }

    pub fn is_playing(&self) -> bool {
        self.task.is_active()
    }
}

async fn play_pattern(player: &dyn AlarmPlayer) {
    let start = Instant::now();
    for tone in ALERT_PATTERN.iter() {
        sleep_until(start + Duration::from_millis(tone.offset_ms)).await;
        if let Err(e) = player.play_tone(tone) {
            warn!("Audio error: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::sleep;

    /// Player that records every tone it is asked to play
    #[derive(Debug, Default)]
    pub(crate) struct RecordingPlayer {
        pub tones: Mutex<Vec<Tone>>,
    }

    impl RecordingPlayer {
        pub fn count(&self) -> usize {
            self.tones.lock().unwrap().len()
        }
    }

    impl AlarmPlayer for RecordingPlayer {
        fn play_tone(&self, tone: &Tone) -> Result<(), String> {
            self.tones.lock().unwrap().push(*tone);
            Ok(())
        }
    }

    struct BrokenPlayer;

    impl AlarmPlayer for BrokenPlayer {
        fn play_tone(&self, _tone: &Tone) -> Result<(), String> {
            Err("no audio device".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn plays_at_most_ten_patterns() {
        let player = Arc::new(RecordingPlayer::default());
        let alarm = AlarmLoop::start(player.clone(), MAX_REPETITIONS, REPEAT_PERIOD);

        sleep(Duration::from_secs(20)).await;

        assert_eq!(player.count(), 30);
        assert!(!alarm.is_playing());
        assert_eq!(player.tones.lock().unwrap()[2].frequency_hz, 1100);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_remaining_repetitions() {
        let player = Arc::new(RecordingPlayer::default());
        let mut alarm = AlarmLoop::start(player.clone(), MAX_REPETITIONS, REPEAT_PERIOD);

        sleep(Duration::from_millis(2_500)).await;
        alarm.cancel();
        sleep(Duration::from_secs(10)).await;

        assert_eq!(player.count(), 9);
        assert!(!alarm.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_mid_pattern_drops_pending_tones() {
        let player = Arc::new(RecordingPlayer::default());
        let mut alarm = AlarmLoop::start(player.clone(), MAX_REPETITIONS, REPEAT_PERIOD);

        sleep(Duration::from_millis(300)).await;
        alarm.cancel();
        sleep(Duration::from_secs(2)).await;

        assert_eq!(player.count(), 2);
    }

    #[test]
    fn tones_are_synthesised_at_their_pitch_and_length() {
        let high = tone_samples(&ALERT_PATTERN[2], 44_100);
        assert_eq!(high.len(), 13_230);
        assert!(high.iter().all(|s| s.abs() <= VOLUME));
        assert_eq!(high[0], 0.0);

        // zero crossings of a sine: two per cycle
        let crossings = high
            .windows(2)
            .filter(|pair| pair[0].signum() != pair[1].signum())
            .count();
        assert!((655..=665).contains(&crossings), "{} crossings", crossings);

        let low = tone_samples(&ALERT_PATTERN[0], 8_000);
        assert_eq!(low.len(), 1_200);
    }

    #[tokio::test(start_paused = true)]
    async fn audio_failures_are_swallowed() {
        let alarm = AlarmLoop::start(Arc::new(BrokenPlayer), 2, REPEAT_PERIOD);
        sleep(Duration::from_secs(3)).await;
        assert!(!alarm.is_playing());
    }
}
