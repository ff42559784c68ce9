//! Rule-based English lemmatizer.
//!
//! Reduces inflected review vocabulary to a dictionary base form: plural nouns
//! (`rooms` → `room`, `families` → `family`), past tenses (`stayed` → `stay`,
//! `loved` → `love`), progressive forms (`swimming` → `swim`) and a table of
//! common irregular forms (`went` → `go`, `children` → `child`).
//!
//! Every suffix rule strictly shortens the word, and [`lemmatize`] applies the
//! rules until nothing changes, so its output is always a fixed point:
//! `lemmatize(lemmatize(w)) == lemmatize(w)`.

/// Irregular inflections and their base forms. Every base form is itself
/// untouched by the suffix rules.
const IRREGULAR: &[(&str, &str)] = &[
    ("ate", "eat"),
    ("bought", "buy"),
    ("began", "begin"),
    ("begun", "begin"),
    ("broke", "break"),
    ("broken", "break"),
    ("brought", "bring"),
    ("came", "come"),
    ("children", "child"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("eaten", "eat"),
    ("feet", "foot"),
    ("felt", "feel"),
    ("forgot", "forget"),
    ("forgotten", "forget"),
    ("found", "find"),
    ("gave", "give"),
    ("given", "give"),
    ("gone", "go"),
    ("got", "get"),
    ("gotten", "get"),
    ("kept", "keep"),
    ("knew", "know"),
    ("known", "know"),
    ("left", "leave"),
    ("made", "make"),
    ("men", "man"),
    ("met", "meet"),
    ("paid", "pay"),
    ("ran", "run"),
    ("said", "say"),
    ("sat", "sit"),
    ("saw", "see"),
    ("seen", "see"),
    ("slept", "sleep"),
    ("sold", "sell"),
    ("spent", "spend"),
    ("stood", "stand"),
    ("taken", "take"),
    ("teeth", "tooth"),
    ("thought", "think"),
    ("told", "tell"),
    ("took", "take"),
    ("went", "go"),
    ("women", "woman"),
    ("woke", "wake"),
    ("wrote", "write"),
    ("written", "write"),
];

/// Words ending in `-ing`/`-ed`/`-s` that are already base forms.
const KEEP: &[&str] = &[
    "anything",
    "booking",
    "bring",
    "building",
    "ceiling",
    "clothing",
    "evening",
    "everything",
    "king",
    "meeting",
    "morning",
    "nothing",
    "parking",
    "ring",
    "sing",
    "something",
    "spring",
    "string",
    "swing",
    "thing",
    "wedding",
    "wing",
    "bed",
    "need",
    "seed",
    "speed",
    "hundred",
    "news",
    "lens",
    "series",
    "species",
    "always",
    "perhaps",
];

const MIN_STEM: usize = 3;

/// Reduce a lowercase token to its base form.
pub fn lemmatize(word: &str) -> String {
    let mut current = word.to_string();
    loop {
        let next = step(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Apply the first matching rule once.
fn step(word: &str) -> String {
    if KEEP.contains(&word) {
        return word.to_string();
    }
    if let Some((_, base)) = IRREGULAR.iter().find(|(form, _)| *form == word) {
        return (*base).to_string();
    }

    if let Some(stem) = word.strip_suffix("ies")
        && char_len(stem) >= MIN_STEM - 1
    {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return format!("{stem}ss");
    }
    if ["xes", "ches", "shes"].iter().any(|s| word.ends_with(s)) {
        // Drop only the "es": boxes → box, beaches → beach.
        let stem = &word[..word.len() - 2];
        if char_len(stem) >= MIN_STEM {
            return stem.to_string();
        }
    }
    if let Some(stem) = word.strip_suffix('s')
        && !(stem.ends_with('s') || stem.ends_with('u') || stem.ends_with('i'))
        && char_len(stem) >= MIN_STEM
    {
        return stem.to_string();
    }

    if let Some(stem) = word.strip_suffix("ied")
        && char_len(stem) >= MIN_STEM - 1
    {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix("ed")
        && !stem.ends_with('e')
        && char_len(stem) >= MIN_STEM
        && has_vowel(stem)
    {
        return restore_stem(stem);
    }
    if let Some(stem) = word.strip_suffix("ing")
        && char_len(stem) >= MIN_STEM
        && has_vowel(stem)
    {
        return restore_stem(stem);
    }

    word.to_string()
}

/// Undo consonant doubling (`stopp` → `stop`) or restore a silent `e`
/// (`lov` → `love`, `arriv` → `arrive`) after stripping `-ed`/`-ing`.
fn restore_stem(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();

    if n >= 2 && chars[n - 1] == chars[n - 2] && is_consonant(chars[n - 1]) {
        if matches!(chars[n - 1], 'l' | 's' | 'z') {
            return stem.to_string();
        }
        return chars[..n - 1].iter().collect();
    }

    let last = chars[n - 1];
    let short_cvc = n <= 4
        && n >= 3
        && is_consonant(chars[n - 3])
        && !is_consonant(chars[n - 2])
        && is_consonant(last)
        && !matches!(last, 'w' | 'x' | 'y');
    let silent_e_ending = last == 'v'
        || stem.ends_with("iz")
        || (stem.ends_with("at") && n >= 3 && is_consonant(chars[n - 3]));

    if short_cvc || silent_e_ending {
        format!("{stem}e")
    } else {
        stem.to_string()
    }
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn has_vowel(s: &str) -> bool {
    s.chars().any(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y'))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
