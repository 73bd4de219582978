//! The moods offered by the mood picker.

use std::fmt;
use std::str::FromStr;

/// One of the eight moods of the picker, in picker order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mood {
    /// 😊
    #[default]
    Happy,
    /// 🚀
    Productive,
    /// 💡
    Inspired,
    /// 🤔
    Puzzled,
    /// 😫
    Tired,
    /// 🤯
    Overwhelmed,
    /// ☕️
    CoffeeNeeded,
    /// 😴
    Sleepy,
}

impl Mood {
    /// All moods in picker order; the position is the stored index.
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Productive,
        Mood::Inspired,
        Mood::Puzzled,
        Mood::Tired,
        Mood::Overwhelmed,
        Mood::CoffeeNeeded,
        Mood::Sleepy,
    ];

    /// The emoji shown in the picker and stored on entries.
    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Productive => "🚀",
            Mood::Inspired => "💡",
            Mood::Puzzled => "🤔",
            Mood::Tired => "😫",
            Mood::Overwhelmed => "🤯",
            Mood::CoffeeNeeded => "☕️",
            Mood::Sleepy => "😴",
        }
    }

    /// The name accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Productive => "productive",
            Mood::Inspired => "inspired",
            Mood::Puzzled => "puzzled",
            Mood::Tired => "tired",
            Mood::Overwhelmed => "overwhelmed",
            Mood::CoffeeNeeded => "coffee",
            Mood::Sleepy => "sleepy",
        }
    }

    /// Position in the picker, as stored under `currentMood`.
    pub fn index(self) -> usize {
        Mood::ALL
            .iter()
            .position(|mood| *mood == self)
            .unwrap_or_default()
    }

    /// Mood at a picker position.
    pub fn from_index(index: usize) -> Option<Mood> {
        Mood::ALL.get(index).copied()
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.emoji())
    }
}

impl FromStr for Mood {
    type Err = String;

    /// Accepts a name, an emoji (with or without variation selector) or an index.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let bare = raw.trim_end_matches('\u{fe0f}');
        Mood::ALL
            .iter()
            .copied()
            .find(|mood| {
                mood.name().eq_ignore_ascii_case(raw)
                    || mood.emoji().trim_end_matches('\u{fe0f}') == bare
            })
            .or_else(|| raw.parse::<usize>().ok().and_then(Mood::from_index))
            .ok_or_else(|| {
                let names: Vec<&str> = Mood::ALL.iter().map(|m| m.name()).collect();
                format!("Unknown mood '{}'. Expected one of: {}", raw, names.join(", "))
            })
    }
}
