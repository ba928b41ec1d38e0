//! Fixed lists the generator samples from

use crate::models::Sport;

pub const SPORTSBOOKS: &[&str] = &[
    "DraftKings",
    "FanDuel",
    "BetMGM",
    "Caesars",
    "PointsBet",
    "BetRivers",
    "Pinnacle",
    "ESPN BET",
];

pub const REASONING: &[&str] = &[
    "Best price is lagging the market after a late line move.",
    "Sharp action hit the opposite side early and the number has overcorrected.",
    "Consensus has drifted while one book is still hanging the opener.",
    "Model fair price sits well inside the best available number.",
    "Public money is inflating the favourite, leaving value on the other side.",
    "Injury news was priced in unevenly across books.",
    "Reverse line movement against a lopsided ticket count.",
    "Steam move detected across offshore books, domestic books slow to follow.",
];

pub const KEY_FACTORS: &[&str] = &[
    "Line movement",
    "Sharp money split",
    "Injury report",
    "Rest advantage",
    "Weather",
    "Travel schedule",
    "Head-to-head history",
    "Pace mismatch",
    "Closing line value",
    "Public betting percentage",
    "Home/away splits",
    "Key number",
];

pub const PROP_STATS: &[&str] = &["Points", "Rebounds", "Assists", "Passing Yards", "Shots on Goal"];

pub fn roster(sport: Sport) -> &'static [&'static str] {
    match sport {
        Sport::Nfl => &[
            "Chiefs", "Bills", "Eagles", "49ers", "Cowboys", "Ravens", "Lions", "Packers",
            "Dolphins", "Bengals",
        ],
        Sport::Nba => &[
            "Celtics", "Lakers", "Nuggets", "Bucks", "Warriors", "Knicks", "Suns", "Heat",
            "Thunder", "Mavericks",
        ],
        Sport::Mlb => &[
            "Dodgers", "Yankees", "Braves", "Astros", "Phillies", "Orioles", "Rangers", "Mariners",
        ],
        Sport::Nhl => &[
            "Bruins", "Rangers", "Oilers", "Avalanche", "Panthers", "Stars", "Maple Leafs",
            "Golden Knights",
        ],
        Sport::Ncaaf => &[
            "Georgia", "Michigan", "Alabama", "Ohio State", "Texas", "Oregon", "Florida State",
            "Penn State",
        ],
        Sport::Ncaab => &[
            "UConn", "Houston", "Purdue", "Duke", "Kansas", "Arizona", "Tennessee", "Marquette",
        ],
        Sport::Soccer => &[
            "Arsenal", "Man City", "Liverpool", "Chelsea", "Real Madrid", "Barcelona",
            "Bayern Munich", "Inter",
        ],
        Sport::Mma => &[
            "Makhachev", "Volkanovski", "Pereira", "Adesanya", "O'Malley", "Edwards", "Jones",
            "Aspinall",
        ],
    }
}

/// Typical total for a game in this sport
pub fn base_total(sport: Sport) -> f64 {
    match sport {
        Sport::Nfl => 44.5,
        Sport::Ncaaf => 52.5,
        Sport::Nba => 224.5,
        Sport::Ncaab => 142.5,
        Sport::Mlb => 8.5,
        Sport::Nhl => 6.0,
        Sport::Soccer => 2.5,
        Sport::Mma => 2.5,
    }
}
