use ratatui::style::Color;

// Matrix palette
pub const MATRIX_GREEN: Color = Color::Rgb(0, 255, 65);
pub const SOFT_GREEN: Color = Color::Rgb(90, 200, 120);
pub const DARK_GREEN: Color = Color::Rgb(0, 100, 0);
pub const BRIGHT_GREEN: Color = Color::Rgb(150, 255, 150);
pub const HIGHLIGHT_BG: Color = Color::Rgb(10, 40, 20);

// Text
pub const TEXT_PRIMARY: Color = Color::White;
pub const TEXT_SECONDARY: Color = Color::Rgb(200, 200, 200);
pub const TEXT_DIM: Color = Color::Rgb(110, 110, 110);

// Status
pub const WARN_YELLOW: Color = Color::Rgb(255, 215, 0);
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);
pub const ERROR_BG: Color = Color::Rgb(80, 0, 0);
