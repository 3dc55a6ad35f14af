//! What the window shows for each phase

use crate::state::Phase;

/// Visual state of the window's controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start_label: &'static str,
    pub start_enabled: bool,
    pub stop_label: &'static str,
    pub stop_enabled: bool,
    pub inputs_enabled: bool,
    pub normal_controls_visible: bool,
    pub alarm_controls_visible: bool,
    /// Style applied to the time display
    pub display_class: &'static str,
}

impl Controls {
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Idle => Self {
                start_label: "Start",
                start_enabled: true,
                stop_label: "Stop",
                stop_enabled: false,
                inputs_enabled: true,
                normal_controls_visible: true,
                alarm_controls_visible: false,
                display_class: "",
            },
            Phase::Running => Self {
                start_label: "Start",
                start_enabled: false,
                stop_label: "Stop",
                stop_enabled: true,
                inputs_enabled: false,
                normal_controls_visible: true,
                alarm_controls_visible: false,
                display_class: "running",
            },
            Phase::Paused => Self {
                start_label: "Resume",
                start_enabled: true,
                stop_label: "End Timer",
                stop_enabled: true,
                inputs_enabled: false,
                normal_controls_visible: true,
                alarm_controls_visible: false,
                display_class: "paused",
            },
            Phase::Finished => Self {
                start_label: "Start",
                start_enabled: false,
                stop_label: "Stop",
                stop_enabled: false,
                inputs_enabled: false,
                normal_controls_visible: false,
                alarm_controls_visible: true,
                display_class: "finished",
            },
        }
    }

    /// One-line text rendering of the buttons
    pub fn describe(&self) -> String {
        if self.alarm_controls_visible {
            return "[Dismiss]".to_string();
        }
        let button = |label: &str, enabled: bool| {
            if enabled {
                format!("[{}]", label)
            } else {
                format!("({})", label)
            }
        };
        format!(
            "{} {}",
            button(self.start_label, self.start_enabled),
            button(self.stop_label, self.stop_enabled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_relabels_both_buttons() {
        let controls = Controls::for_phase(Phase::Paused);
        assert_eq!(controls.start_label, "Resume");
        assert_eq!(controls.stop_label, "End Timer");
        assert!(!controls.inputs_enabled);
        assert_eq!(controls.describe(), "[Resume] [End Timer]");
    }

    #[test]
    fn finished_swaps_in_alarm_controls() {
        let controls = Controls::for_phase(Phase::Finished);
        assert!(!controls.normal_controls_visible);
        assert!(controls.alarm_controls_visible);
        assert_eq!(controls.describe(), "[Dismiss]");
    }

    #[test]
    fn idle_disables_stop() {
        assert_eq!(Controls::for_phase(Phase::Idle).describe(), "[Start] (Stop)");
    }
}
