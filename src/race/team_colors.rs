pub const FALLBACK_TEAM_COLOR: &str = "#888888";

const TEAM_COLORS: [(&str, &str); 10] = [
    ("Red Bull Racing", "#1E5BC6"),
    ("Ferrari", "#DC0000"),
    ("Mercedes", "#00D2BE"),
    ("McLaren", "#FF8700"),
    ("Aston Martin", "#006F62"),
    ("Alpine", "#0090FF"),
    ("Williams", "#005AFF"),
    ("Alfa Romeo", "#900000"),
    ("AlphaTauri", "#2B4562"),
    ("Haas F1 Team", "#B6BABD"),
];

pub fn team_color(team: &str) -> &'static str {
    TEAM_COLORS
        .iter()
        .find(|(name, _)| *name == team)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_TEAM_COLOR)
}
