/// first hangul syllable
pub const S_BASE: u32 = 0xac00;
/// first leading consonant jamo
pub const L_BASE: u32 = 0x1100;
/// first vowel jamo
pub const V_BASE: u32 = 0x1161;
/// one before the first trailing consonant jamo
pub const T_BASE: u32 = 0x11a7;
pub const T_COUNT: u32 = 28;
/// vowels * trailing consonants
pub const N_COUNT: u32 = 588;
pub const S_COUNT: u32 = 11172;

const JAMO_L: [&str; 19] = [
    "G", "GG", "N", "D", "DD", "R", "M", "B", "BB", "S", "SS", "", "J", "JJ", "C", "K", "T", "P", "H",
];

const JAMO_V: [&str; 21] = [
    "A", "AE", "YA", "YAE", "EO", "E", "YEO", "YE", "O", "WA", "WAE", "OE", "YO", "U", "WEO", "WE", "WI",
    "YU", "EU", "YI", "I",
];

const JAMO_T: [&str; 28] = [
    "", "G", "GG", "GS", "N", "NJ", "NH", "D", "L", "LG", "LM", "LB", "LS", "LT", "LP", "LH", "M", "B",
    "BS", "S", "SS", "NG", "J", "C", "K", "T", "P", "H",
];

pub fn is_syllable(codepoint: u32) -> bool {
    (S_BASE..S_BASE + S_COUNT).contains(&codepoint)
}

fn split(codepoint: u32) -> (usize, usize, usize) {
    let index = codepoint - S_BASE;

    ((index / N_COUNT) as usize, ((index % N_COUNT) / T_COUNT) as usize, (index % T_COUNT) as usize)
}

/// Full canonical decomposition into two or three jamo.
pub fn decompose(codepoint: u32) -> Vec<u32> {
    let (l, v, t) = split(codepoint);

    let mut jamo = vec![L_BASE + l as u32, V_BASE + v as u32];

    if t != 0 {
        jamo.push(T_BASE + t as u32);
    }

    jamo
}

pub fn name(codepoint: u32) -> String {
    let (l, v, t) = split(codepoint);

    format!("HANGUL SYLLABLE {}{}{}", JAMO_L[l], JAMO_V[v], JAMO_T[t])
}
