use colored::{Color, ColoredString, Colorize};

use crate::testing::ResultStatus;

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

impl ColorTheme for ResultStatus {
    fn color(&self) -> Color {
        use ResultStatus::*;
        if !self::is_truecolor_supported() {
            return match self {
                Accepted => Color::Green,
                WrongAnswer => Color::Yellow,
                TimeLimitExceeded | MemoryLimitExceeded => Color::Red,
                RuntimeError => Color::Magenta,
                CompilationError => Color::BrightMagenta,
                Judging => Color::BrightBlack,
            };
        }

        let (r, g, b) = match self {
            Accepted => (30, 180, 40),
            WrongAnswer => (210, 138, 4),
            TimeLimitExceeded => (220, 42, 42),
            MemoryLimitExceeded => (200, 80, 60),
            RuntimeError => (171, 40, 200),
            CompilationError => (140, 60, 170),
            Judging => (120, 120, 120),
        };
        Color::TrueColor { r, g, b }
    }
}

/// Padded to the width of the longest status name so that lines align.
pub fn status_badge(status: ResultStatus) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightWhite
    };
    format!(" {:<3} ", status.to_string())
        .on_color(status.color())
        .bold()
        .color(fg)
}
