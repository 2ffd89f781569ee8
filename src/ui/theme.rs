use ratatui::style::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub header_accent_fg: Color,
    pub header_accent_bg: Color,
    pub accent: Color,
    pub gauge_filled: Color,
    pub gauge_unfilled: Color,
    pub table_header_fg: Color,
    pub cpu_hot: Color,
    pub pill_key_fg: Color,
    pub pill_key_bg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub statusbar_bg: Color,
    pub status_ok: Color,
}

impl Theme {
    pub fn from_config(theme_name: &str) -> Self {
        match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" | "monochrome" => Self::mono(),
            _ => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            overlay_border: Color::Rgb(88, 91, 112),
            text_primary: Color::Rgb(205, 214, 244),
            text_secondary: Color::Rgb(166, 173, 200),
            header_accent_fg: Color::Rgb(30, 30, 46),
            header_accent_bg: Color::Rgb(166, 227, 161),
            accent: Color::Rgb(203, 166, 247),
            gauge_filled: Color::Rgb(137, 180, 250),
            gauge_unfilled: Color::Rgb(49, 50, 68),
            table_header_fg: Color::Rgb(249, 226, 175),
            cpu_hot: Color::Rgb(243, 139, 168),
            pill_key_fg: Color::Rgb(30, 30, 46),
            pill_key_bg: Color::Rgb(137, 180, 250),
            pill_desc_fg: Color::Rgb(186, 194, 222),
            surface_bg: Color::Rgb(30, 30, 46),
            statusbar_bg: Color::Rgb(24, 24, 37),
            status_ok: Color::Rgb(166, 227, 161),
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            overlay_border: Color::Rgb(156, 160, 176),
            text_primary: Color::Rgb(76, 79, 105),
            text_secondary: Color::Rgb(108, 111, 133),
            header_accent_fg: Color::Rgb(239, 241, 245),
            header_accent_bg: Color::Rgb(64, 160, 43),
            accent: Color::Rgb(136, 57, 239),
            gauge_filled: Color::Rgb(30, 102, 245),
            gauge_unfilled: Color::Rgb(204, 208, 218),
            table_header_fg: Color::Rgb(223, 142, 29),
            cpu_hot: Color::Rgb(210, 15, 57),
            pill_key_fg: Color::Rgb(239, 241, 245),
            pill_key_bg: Color::Rgb(30, 102, 245),
            pill_desc_fg: Color::Rgb(92, 95, 119),
            surface_bg: Color::Rgb(239, 241, 245),
            statusbar_bg: Color::Rgb(230, 233, 239),
            status_ok: Color::Rgb(64, 160, 43),
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            overlay_border: Color::Gray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            header_accent_fg: Color::Black,
            header_accent_bg: Color::White,
            accent: Color::White,
            gauge_filled: Color::White,
            gauge_unfilled: Color::DarkGray,
            table_header_fg: Color::White,
            cpu_hot: Color::White,
            pill_key_fg: Color::Black,
            pill_key_bg: Color::White,
            pill_desc_fg: Color::Gray,
            surface_bg: Color::Reset,
            statusbar_bg: Color::Reset,
            status_ok: Color::White,
        }
    }
}
