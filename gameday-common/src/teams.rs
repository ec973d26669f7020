/// Team nicknames and the league codes the prediction service's own
/// schedule uses for them.
const TEAM_CODES: &[(&str, &str)] = &[
    ("Cardinals", "ARI"),
    ("Falcons", "ATL"),
    ("Ravens", "BAL"),
    ("Bills", "BUF"),
    ("Panthers", "CAR"),
    ("Bears", "CHI"),
    ("Bengals", "CIN"),
    ("Browns", "CLE"),
    ("Cowboys", "DAL"),
    ("Broncos", "DEN"),
    ("Lions", "DET"),
    ("Packers", "GB"),
    ("Texans", "HOU"),
    ("Colts", "IND"),
    ("Jaguars", "JAX"),
    ("Chiefs", "KC"),
    ("Raiders", "LV"),
    ("Chargers", "LAC"),
    ("Rams", "LA"),
    ("Dolphins", "MIA"),
    ("Vikings", "MIN"),
    ("Patriots", "NE"),
    ("Saints", "NO"),
    ("Giants", "NYG"),
    ("Jets", "NYJ"),
    ("Eagles", "PHI"),
    ("Steelers", "PIT"),
    ("49ers", "SF"),
    ("Seahawks", "SEA"),
    ("Buccaneers", "TB"),
    ("Titans", "TEN"),
    ("Commanders", "WAS"),
];

/// The league code for a nickname or a code, in any case
pub fn team_code(name: &str) -> Option<&'static str> {
    let name = name.trim();
    TEAM_CODES
        .iter()
        .find(|(nickname, code)| {
            nickname.eq_ignore_ascii_case(name) || code.eq_ignore_ascii_case(name)
        })
        .map(|(_, code)| *code)
}

/// Whether two spellings name the same team. Names missing from the table
/// only match themselves, ignoring case.
pub fn same_team(a: &str, b: &str) -> bool {
    match (team_code(a), team_code(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a.trim().eq_ignore_ascii_case(b.trim()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_team_code() {
        assert_eq!(team_code("Jets"), Some("NYJ"));
        assert_eq!(team_code(" jets "), Some("NYJ"));
        assert_eq!(team_code("NYJ"), Some("NYJ"));
        assert_eq!(team_code("nyg"), Some("NYG"));
        assert_eq!(team_code("49ers"), Some("SF"));
        assert_eq!(team_code("Oilers"), None);
    }

    #[test]
    fn test_same_team() {
        assert!(same_team("Jets", "NYJ"));
        assert!(same_team("LV", "Raiders"));
        assert!(!same_team("Jets", "NYG"));
        assert!(!same_team("Rams", "LAC"));
        assert!(same_team("Oilers", "oilers"));
        assert!(!same_team("Oilers", "HOU"));
    }
}
