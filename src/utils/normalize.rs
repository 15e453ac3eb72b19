//! Team name normalization shared by every vocabulary.
//!
//! ESPN, the odds feed and the stat snapshot all spell teams differently
//! ("1 Texas Longhorns", "Texas", "San José State Spartans", "UNLVUNLV").
//! [`normalize_team_name`] projects any of them onto one comparable form:
//!
//! 1. fold to ASCII (diacritics and common mojibake)
//! 2. strip a leading ranking ("12 Texas" -> "Texas")
//! 3. strip a trailing mascot, longest match first
//! 4. collapse doubled or glued trailing abbreviations
//! 5. apply the special-case rewrite table
//! 6. collapse whitespace
//!
//! The steps are repeated until the name stops changing, which makes the
//! function idempotent.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static RANKING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s+").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static GLUED_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*[a-z])([A-Z]{1,5})$").expect("valid regex"));

/// Mascots and nicknames that trail school names in schedule and odds feeds
const MASCOTS: &[&str] = &[
    "49ers", "Aggies", "Anteaters", "Aztecs", "Badgers", "Bearcats", "Bearkats", "Bears",
    "Beavers", "Bengals", "Billikens", "Bison", "Black Bears", "Black Knights", "Blazers",
    "Blue Devils", "Blue Hens", "Blue Raiders", "Bobcats", "Boilermakers", "Broncos",
    "Bruins", "Buccaneers", "Buckeyes", "Buffaloes", "Bulldogs", "Bulls", "Cardinal",
    "Cardinals", "Catamounts", "Cavaliers", "Chanticleers", "Chippewas", "Colonels",
    "Colonials", "Commodores", "Cornhuskers", "Cougars", "Cowboys", "Coyotes",
    "Crimson Tide", "Crusaders", "Cyclones", "Demon Deacons", "Dukes", "Ducks", "Eagles",
    "Falcons", "Fighting Hawks", "Fighting Illini", "Fighting Irish", "Flames", "Gamecocks",
    "Gators", "Golden Bears", "Golden Eagles", "Golden Flashes", "Golden Gophers",
    "Golden Hurricane", "Golden Lions", "Governors", "Great Danes", "Green Wave",
    "Griffins", "Grizzlies", "Hawkeyes", "Hilltoppers", "Hokies", "Hoosiers", "Horned Frogs",
    "Hornets", "Huskies", "Hurricanes", "Jaguars", "Jaspers", "Jayhawks", "Knights",
    "Leathernecks", "Leopards", "Lions", "Lobos", "Longhorns", "Lumberjacks", "Mean Green",
    "Midshipmen", "Miners", "Minutemen", "Mocs", "Monarchs", "Mountaineers", "Mustangs",
    "Nittany Lions", "Orange", "Owls", "Panthers", "Phoenix", "Pirates", "Ragin' Cajuns",
    "Ragin Cajuns", "Rainbow Warriors", "Rams", "Razorbacks", "Rebels", "Red Flash",
    "Red Raiders", "Red Wolves", "Redbirds", "RedHawks", "Roadrunners", "Rockets",
    "Scarlet Knights", "Seahawks", "Seminoles", "Sharks", "Skyhawks", "Sooners", "Spartans",
    "Sun Devils", "Tar Heels", "Terrapins", "Terriers", "Texans", "Thundering Herd",
    "Tigers", "Trojans", "Utes", "Vandals", "Vikings", "Volunteers", "Warhawks", "Warriors",
    "Wildcats", "Wolf Pack", "Wolfpack", "Wolverines", "Yellow Jackets", "Zips",
];

/// Mascots sorted longest first, paired with their lowercase spelling
static MASCOTS_LONGEST_FIRST: Lazy<Vec<String>> = Lazy::new(|| {
    let mut mascots: Vec<String> = MASCOTS.iter().map(|m| m.to_lowercase()).collect();
    mascots.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    mascots
});

/// Special-case rewrites consulted after generic stripping. Keys match
/// case-insensitively; every value is already in normalized form.
const NAME_OVERRIDES: &[(&str, &str)] = &[
    ("San Jos", "San Jose State"),
    ("San Jose St", "San Jose State"),
    ("Hawai", "Hawaii"),
    ("Hawai'i", "Hawaii"),
    ("UL Monroe", "Louisiana Monroe"),
    ("ULM", "Louisiana Monroe"),
    ("Louisiana-Monroe", "Louisiana Monroe"),
    ("ECU", "East Carolina"),
    ("St. Francis", "Saint Francis"),
    ("St Francis", "Saint Francis"),
    ("Saint Francis (PA)", "Saint Francis"),
    ("Miami (Fla.)", "Miami"),
    ("Miami (FL)", "Miami"),
    ("Miami Fla", "Miami"),
    ("Miami Oh", "Miami (OH)"),
    ("Miami Ohio", "Miami (OH)"),
    ("Southern California", "USC"),
    ("Texas Christian", "TCU"),
    ("Southern Methodist", "SMU"),
    ("Central Florida", "UCF"),
    ("Alabama Birmingham", "UAB"),
    ("Nevada Las Vegas", "UNLV"),
    ("Connecticut", "UConn"),
    ("Massachusetts", "UMass"),
    ("App State", "Appalachian State"),
    ("Ut Martin", "UT Martin"),
    ("Stephen F Austin", "Stephen F. Austin"),
    ("Alabama Am", "Alabama A&M"),
    ("Ualbany", "UAlbany"),
    ("Albany", "UAlbany"),
    ("lbany", "UAlbany"),
    ("Se Louisiana", "SE Louisiana"),
    ("Southeastern Louisiana", "SE Louisiana"),
    ("East Texas Am", "East Texas A&M"),
    ("Texas Am", "Texas A&M"),
    ("Florida Intl", "Florida International"),
    ("FIU", "Florida International"),
    ("Sam Houston State", "Sam Houston"),
];

static OVERRIDES_BY_KEY: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    NAME_OVERRIDES
        .iter()
        .map(|(from, to)| (from.to_lowercase(), *to))
        .collect()
});

/// Canonicalize a team name from any vocabulary. Never fails: unknown
/// mascots, abbreviations or overrides are simply left alone, and an empty
/// input gives an empty output.
pub fn normalize_team_name(raw: &str) -> String {
    // Each pass either shortens the name or lands on an override value,
    // which is a fixed point, so this terminates.
    let mut current = collapse_whitespace(&fold_to_ascii(raw));
    loop {
        let next = normalize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Lowercase key used for substring matching against odds-feed names.
/// Apostrophes and periods are dropped so "Hawai'i" and "St. Francis"
/// compare the same as their plain spellings.
pub fn match_key(raw: &str) -> String {
    let cleaned: String = normalize_team_name(raw)
        .chars()
        .filter(|c| !matches!(c, '\'' | '.'))
        .collect();
    collapse_whitespace(&cleaned).to_lowercase()
}

fn normalize_pass(name: &str) -> String {
    let name = strip_ranking(name);
    let name = strip_mascot(&name);
    let name = collapse_abbreviation(&name);
    let name = apply_override(&name);
    collapse_whitespace(&name)
}

fn strip_ranking(name: &str) -> String {
    RANKING.replace(name.trim(), "").into_owned()
}

/// Remove one trailing mascot, preferring the longest match. A name that
/// is nothing but a mascot ("Orange") is kept as is.
fn strip_mascot(name: &str) -> String {
    let lower = name.to_lowercase();
    for mascot in MASCOTS_LONGEST_FIRST.iter() {
        if lower.len() <= mascot.len() || !lower.ends_with(mascot.as_str()) {
            continue;
        }
        let prefix_len = lower.len() - mascot.len();
        // to_lowercase keeps byte offsets for ASCII, which folding guarantees
        if !name.is_char_boundary(prefix_len) {
            continue;
        }
        let prefix = &name[..prefix_len];
        if prefix.ends_with(char::is_whitespace) && !prefix.trim().is_empty() {
            return prefix.trim_end().to_string();
        }
    }
    name.to_string()
}

/// "UNLVUNLV" -> "UNLV", "Western KentuckyWKU" -> "Western Kentucky",
/// "Western KentuckyW" -> "Western Kentucky", "KansasKU" -> "Kansas".
fn collapse_abbreviation(name: &str) -> String {
    if let Some(single) = collapse_doubled(name) {
        return single;
    }

    let Some(caps) = GLUED_SUFFIX.captures(name) else {
        return name.to_string();
    };
    let prefix = &caps[1];
    let suffix = &caps[2];

    if suffix.len() == 1 || abbreviates(prefix, suffix) {
        prefix.to_string()
    } else {
        name.to_string()
    }
}

/// A trailing run of capitals that is the same abbreviation twice
fn collapse_doubled(name: &str) -> Option<String> {
    let run_len = name
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_uppercase())
        .count();
    if run_len < 4 || run_len % 2 != 0 {
        return None;
    }
    let run_start = name.len() - run_len;
    let run = &name[run_start..];
    let (first, second) = run.split_at(run_len / 2);
    if first == second {
        Some(format!("{}{}", &name[..run_start], first))
    } else {
        None
    }
}

/// Whether `suffix` plausibly abbreviates `prefix`: its letters appear in
/// the prefix, or it starts with the initial of one of the prefix's words.
fn abbreviates(prefix: &str, suffix: &str) -> bool {
    let upper = prefix.to_uppercase();
    if upper.contains(suffix) {
        return true;
    }
    let Some(first) = suffix.chars().next() else {
        return false;
    };
    upper
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .any(|initial| initial == first)
}

fn apply_override(name: &str) -> String {
    OVERRIDES_BY_KEY
        .get(&name.trim().to_lowercase())
        .map(|fixed| fixed.to_string())
        .unwrap_or_else(|| name.to_string())
}

fn collapse_whitespace(name: &str) -> String {
    WHITESPACE.replace_all(name, " ").trim().to_string()
}

/// Project onto ASCII: repair the usual UTF-8-read-as-Latin-1 sequences,
/// drop accents, normalise curly apostrophes and discard anything else
/// that has no ASCII counterpart.
fn fold_to_ascii(raw: &str) -> String {
    const MOJIBAKE: &[(&str, &str)] = &[
        ("Ã©", "e"),
        ("Ã¨", "e"),
        ("Ã¡", "a"),
        ("Ã±", "n"),
        ("Ã³", "o"),
        ("Ã­", "i"),
        ("Ãº", "u"),
        ("Ã¼", "u"),
    ];

    let mut repaired = raw.to_string();
    for (broken, fixed) in MOJIBAKE {
        if repaired.contains(broken) {
            repaired = repaired.replace(broken, fixed);
        }
    }

    repaired.chars().filter_map(fold_char).collect()
}

fn fold_char(c: char) -> Option<char> {
    if c.is_ascii() {
        return Some(c);
    }
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        '\u{2018}' | '\u{2019}' | '\u{02BB}' | '\u{02BC}' => '\'',
        '\u{00A0}' => ' ',
        _ => return None,
    };
    Some(folded)
}
