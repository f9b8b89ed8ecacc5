//! Cosmetic presets. The front end picks one; nothing else depends on it.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum ThemeName {
    #[default]
    Cyberpunk,
    Nordic,
    Minimalist,
    Retro,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: ThemeName,
    pub background: &'static str,
    pub foreground: &'static str,
    pub accent: &'static str,
    pub font: &'static str,
    pub font_size_px: u8,
    pub border: &'static str,
    pub border_radius_px: u8,
    pub button_hover: &'static str,
    pub progress_color: &'static str,
    /// Closest named terminal colour to `progress_color`.
    pub terminal_color: &'static str,
}

impl ThemeName {
    pub const ALL: [ThemeName; 4] = [
        ThemeName::Cyberpunk,
        ThemeName::Nordic,
        ThemeName::Minimalist,
        ThemeName::Retro,
    ];

    pub fn theme(self) -> Theme {
        match self {
            ThemeName::Cyberpunk => Theme {
                name: self,
                background: "#1a1a2e",
                foreground: "#e94560",
                accent: "#16213e",
                font: "Segoe UI",
                font_size_px: 12,
                border: "2px solid #e94560",
                border_radius_px: 8,
                button_hover: "#533483",
                progress_color: "#e94560",
                terminal_color: "magenta",
            },
            ThemeName::Nordic => Theme {
                name: self,
                background: "#2E3440",
                foreground: "#88C0D0",
                accent: "#4C566A",
                font: "Roboto",
                font_size_px: 13,
                border: "2px solid #88C0D0",
                border_radius_px: 6,
                button_hover: "#5E81AC",
                progress_color: "#A3BE8C",
                terminal_color: "green",
            },
            ThemeName::Minimalist => Theme {
                name: self,
                background: "#ffffff",
                foreground: "#2d3436",
                accent: "#dfe6e9",
                font: "SF Pro Display",
                font_size_px: 14,
                border: "1px solid #b2bec3",
                border_radius_px: 4,
                button_hover: "#74b9ff",
                progress_color: "#00b894",
                terminal_color: "cyan",
            },
            ThemeName::Retro => Theme {
                name: self,
                background: "#FDF0D5",
                foreground: "#780000",
                accent: "#669BBC",
                font: "VT323",
                font_size_px: 16,
                border: "3px solid #780000",
                border_radius_px: 0,
                button_hover: "#C1121F",
                progress_color: "#669BBC",
                terminal_color: "blue",
            },
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ThemeName::Cyberpunk => "Cyberpunk",
            ThemeName::Nordic => "Nordic",
            ThemeName::Minimalist => "Minimalist",
            ThemeName::Retro => "Retro",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_resolves_to_itself() {
        for name in ThemeName::ALL {
            assert_eq!(name.theme().name, name);
        }
    }

    #[test]
    fn test_default_is_cyberpunk() {
        let theme = ThemeName::default().theme();
        assert_eq!(theme.name.to_string(), "Cyberpunk");
        assert_eq!(theme.progress_color, "#e94560");
    }
}
