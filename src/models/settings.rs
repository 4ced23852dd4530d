use serde::{Deserialize, Serialize};

use super::session::{CueLevel, TrialResponse};

pub const MIN_SESSION_MINUTES: u32 = 5;
pub const MAX_SESSION_MINUTES: u32 = 120;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    System,
}

/// Process-wide configuration. Exactly one record exists per installation;
/// when nothing has been persisted yet the hard-coded default applies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub default_session_duration: u32,
    pub default_target_accuracy: u8,
    pub enable_notifications: bool,
    pub theme: Theme,
    /// Selectable cue levels, in presentation order.
    pub cue_levels: Vec<CueLevel>,
    /// Selectable trial responses, in presentation order.
    pub response_options: Vec<TrialResponse>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_session_duration: 30,
            default_target_accuracy: 80,
            enable_notifications: true,
            theme: Theme::System,
            cue_levels: vec![
                CueLevel::Independent,
                CueLevel::VerbalCue,
                CueLevel::VisualCue,
                CueLevel::Model,
                CueLevel::PartialPhysical,
                CueLevel::FullPhysical,
            ],
            response_options: vec![
                TrialResponse::Correct,
                TrialResponse::Incorrect,
                TrialResponse::Approximation,
                TrialResponse::NoResponse,
            ],
        }
    }
}

impl AppSettings {
    /// Clamp numeric fields into their supported ranges before persisting.
    pub fn clamped(mut self) -> Self {
        self.default_session_duration = self
            .default_session_duration
            .clamp(MIN_SESSION_MINUTES, MAX_SESSION_MINUTES);
        self.default_target_accuracy = self.default_target_accuracy.clamp(1, 100);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        let settings = AppSettings {
            default_session_duration: 600,
            default_target_accuracy: 0,
            ..AppSettings::default()
        }
        .clamped();
        assert_eq!(settings.default_session_duration, MAX_SESSION_MINUTES);
        assert_eq!(settings.default_target_accuracy, 1);

        let settings = AppSettings {
            default_session_duration: 1,
            ..AppSettings::default()
        }
        .clamped();
        assert_eq!(settings.default_session_duration, MIN_SESSION_MINUTES);
    }

    #[test]
    fn default_lists_cover_every_variant() {
        let settings = AppSettings::default();
        assert_eq!(settings.cue_levels.len(), 6);
        assert_eq!(settings.response_options.len(), 4);
    }
}
