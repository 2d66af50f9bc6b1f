//! Player names: generated adjective+noun handles and rename validation

use std::fmt;

use rand::Rng;

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 20;
/// Plain generated names tried before a numeric suffix is added
const PLAIN_ATTEMPTS: usize = 10;
const SUFFIX_ATTEMPTS: usize = 100;

const RESERVED: [&str; 5] = ["admin", "moderator", "system", "null", "undefined"];

pub const ADJECTIVES: [&str; 49] = [
    "Swift", "Brave", "Cosmic", "Shadow", "Thunder", "Crystal", "Phantom", "Stellar", "Neon",
    "Frost", "Solar", "Lunar", "Crimson", "Azure", "Silent", "Rapid", "Fierce", "Noble", "Wild",
    "Dark", "Bright", "Storm", "Fire", "Ice", "Iron", "Golden", "Silver", "Mystic", "Rogue",
    "Prime", "Ultra", "Hyper", "Mega", "Nova", "Quantum", "Cyber", "Pixel", "Turbo", "Apex",
    "Elite", "Alpha", "Omega", "Astral", "Void", "Chaos", "Zen", "Lucky", "Sneaky", "Mighty",
];

pub const NOUNS: [&str; 48] = [
    "Hunter", "Phoenix", "Warrior", "Dragon", "Knight", "Falcon", "Titan", "Wolf", "Hawk",
    "Viper", "Cobra", "Raven", "Panther", "Tiger", "Ninja", "Samurai", "Pilot", "Sniper",
    "Ranger", "Guardian", "Slayer", "Ghost", "Specter", "Blade", "Arrow", "Bolt", "Spark",
    "Comet", "Star", "Meteor", "Nebula", "Pulsar", "Quasar", "Orbit", "Voyager", "Seeker",
    "Striker", "Shooter", "Blaster", "Crusher", "Destroyer", "Legend", "Hero", "Champion",
    "Master", "Ace", "Chief", "Captain",
];

/// Why a requested name was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    Empty,
    TooShort,
    TooLong,
    /// Only ASCII letters and digits are allowed
    InvalidCharacters,
    Reserved,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "Name is required"),
            NameError::TooShort => write!(f, "Name must be at least {} characters", MIN_NAME_LEN),
            NameError::TooLong => write!(f, "Name must be at most {} characters", MAX_NAME_LEN),
            NameError::InvalidCharacters => write!(f, "Name can only contain letters and numbers"),
            NameError::Reserved => write!(f, "This name is not allowed"),
        }
    }
}

impl std::error::Error for NameError {}

/// Check a requested name; returns it trimmed
pub fn validate_name(name: &str) -> Result<&str, NameError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }
    let len = trimmed.chars().count();
    if len < MIN_NAME_LEN {
        return Err(NameError::TooShort);
    }
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong);
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(NameError::InvalidCharacters);
    }
    if RESERVED.contains(&trimmed.to_lowercase().as_str()) {
        return Err(NameError::Reserved);
    }
    Ok(trimmed)
}

/// A random "AdjectiveNoun" handle
pub fn generate_name(rng: &mut impl Rng) -> String {
    let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.random_range(0..NOUNS.len())];
    format!("{}{}", adjective, noun)
}

/// A generated name that `is_taken` rejects for no one
///
/// Plain handles first, then handles with a two-digit suffix, then
/// `Player` plus the tail of the timestamp in base 36.
pub fn generate_unique_name(
    rng: &mut impl Rng,
    is_taken: impl Fn(&str) -> bool,
    now_ms: u64,
) -> String {
    for _ in 0..PLAIN_ATTEMPTS {
        let name = generate_name(rng);
        if !is_taken(&name) {
            return name;
        }
    }

    for _ in 0..SUFFIX_ATTEMPTS {
        let name = format!("{}{:02}", generate_name(rng), rng.random_range(0..100u32));
        if name.len() > MAX_NAME_LEN {
            continue;
        }
        if !is_taken(&name) {
            return name;
        }
    }

    let stamp = to_base36(now_ms);
    let tail = &stamp[stamp.len().saturating_sub(4)..];
    log::warn!("Name pool exhausted, falling back to timestamp name");
    format!("Player{}", tail)
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
