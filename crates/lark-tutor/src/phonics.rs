//! Rule-based phonics feedback and activity generation.
//!
//! Two static reference tables drive everything: accepted phonetic
//! spellings per letter, and example words per letter. Both feedback and
//! activity generation are total over any string input; unknown letters
//! degrade to generic encouragement rather than failing.

use lark_types::Difficulty;
use rand::Rng;

/// Fixed distractor word for hard-mode "which word starts with…" questions.
const DISTRACTOR_WORD: &str = "zebra";

/// Accepted phonetic spellings for a letter, primary sound first.
///
/// Returns `None` for anything outside `A..=Z`.
pub fn letter_sounds(letter: char) -> Option<&'static [&'static str]> {
    let sounds: &'static [&'static str] = match letter.to_ascii_uppercase() {
        'A' => &["ay", "ah", "aa"],
        'B' => &["buh"],
        'C' => &["kuh", "suh", "ch"],
        'D' => &["duh"],
        'E' => &["ee", "eh", "uh"],
        'F' => &["fuh"],
        'G' => &["guh", "juh"],
        'H' => &["huh"],
        'I' => &["eye", "ih"],
        'J' => &["juh"],
        'K' => &["kuh"],
        'L' => &["luh"],
        'M' => &["muh"],
        'N' => &["nuh"],
        'O' => &["oh", "aw", "ah"],
        'P' => &["puh"],
        'Q' => &["kwuh"],
        'R' => &["ruh"],
        'S' => &["suh", "zuh"],
        'T' => &["tuh"],
        'U' => &["yoo", "uh", "oo"],
        'V' => &["vuh"],
        'W' => &["wuh"],
        'X' => &["ks", "zuh"],
        'Y' => &["yuh", "eye", "ee"],
        'Z' => &["zuh", "zee"],
        _ => return None,
    };
    Some(sounds)
}

/// Example words starting with a letter, in teaching order.
///
/// Returns `None` for anything outside `A..=Z`.
pub fn letter_words(letter: char) -> Option<&'static [&'static str]> {
    let words: &'static [&'static str] = match letter.to_ascii_uppercase() {
        'A' => &["apple", "ant", "alligator", "airplane", "ax", "arrow"],
        'B' => &["ball", "bat", "banana", "bear", "bird", "book"],
        'C' => &["cat", "car", "cake", "cup", "cow", "corn"],
        'D' => &["dog", "duck", "door", "doll", "drum", "desk"],
        'E' => &["elephant", "egg", "envelope", "engine", "ear", "elf"],
        'F' => &["fish", "frog", "fan", "fox", "feather", "flag"],
        'G' => &["goat", "grape", "gift", "girl", "game", "guitar"],
        'H' => &["hat", "house", "horse", "hand", "hammer", "hen"],
        'I' => &["igloo", "insect", "ink", "ice", "iron", "iguanodon"],
        'J' => &["jam", "jelly", "jug", "juice", "jeep", "jacket"],
        'K' => &["kite", "kangaroo", "king", "key", "kitten", "kettle"],
        'L' => &["lion", "leaf", "lamp", "ladder", "log", "lemon"],
        'M' => &["monkey", "moon", "milk", "map", "mouse", "muffin"],
        'N' => &["nest", "net", "nurse", "nose", "nail", "nut"],
        'O' => &["octopus", "orange", "ostrich", "owl", "ox", "ocean"],
        'P' => &["pig", "pen", "pan", "pot", "pizza", "pumpkin"],
        'Q' => &["queen", "quilt", "quail", "question", "quarter", "quack"],
        'R' => &["rabbit", "rain", "ring", "robot", "rocket", "rose"],
        'S' => &["sun", "sock", "sand", "snake", "star", "spoon"],
        'T' => &["tiger", "tree", "toy", "table", "train", "tent"],
        'U' => &["umbrella", "uncle", "under", "uniform", "unicorn", "up"],
        'V' => &["van", "vase", "vest", "violin", "vulture", "village"],
        'W' => &["whale", "watch", "wagon", "wolf", "window", "watermelon"],
        // X has few child-friendly words; the table is intentionally short.
        'X' => &["xylophone", "x-ray", "xenops", "xenon"],
        'Y' => &["yarn", "yak", "yacht", "yellow", "yo-yo", "yard"],
        'Z' => &["zebra", "zip", "zoo", "zero", "zigzag", "zucchini"],
        _ => return None,
    };
    Some(words)
}

/// Classifies a pronunciation attempt for a letter and returns the spoken
/// feedback line.
///
/// The attempt succeeds when any accepted sound for the letter appears as a
/// substring of the (lowercased, trimmed) attempt. Letters outside the table
/// get a generic encouragement line. Never returns an empty string.
pub fn feedback_for_letter(letter: char, attempt: &str) -> String {
    let letter = letter.to_ascii_uppercase();
    let attempt = attempt.trim().to_lowercase();

    match letter_sounds(letter) {
        Some(sounds) => {
            if sounds.iter().any(|sound| attempt.contains(sound)) {
                format!("Great job! You said the letter {} perfectly!", letter)
            } else {
                format!(
                    "Good try! The letter {} makes the sound '{}'. Can you try again?",
                    letter, sounds[0]
                )
            }
        }
        None => format!("Let's practice the letter {} together!", letter),
    }
}

/// Generates the next teaching activity for a letter at a difficulty tier.
///
/// The randomness source is injected so activity variety is deterministic
/// under test.
pub fn activity_for(letter: char, difficulty: Difficulty, rng: &mut impl Rng) -> String {
    let letter = letter.to_ascii_uppercase();

    match difficulty {
        Difficulty::Easy => format!(
            "Let's practice the letter {}! Can you say the letter name first? \
             Then we'll practice its sound!",
            letter
        ),
        Difficulty::Medium => {
            let word = match letter_words(letter) {
                Some(words) => {
                    // Stick to the first two words: the most common, easiest ones.
                    let pool = &words[..words.len().min(2)];
                    pool[rng.gen_range(0..pool.len())].to_string()
                }
                None => format!("{}word", letter.to_ascii_lowercase()),
            };
            format!(
                "Great! Now let's try a word that starts with {}. Can you say '{}'?",
                letter, word
            )
        }
        Difficulty::Hard => {
            if let Some(words) = letter_words(letter) {
                if words.len() >= 2 {
                    let word = words[rng.gen_range(0..words.len())];
                    return format!(
                        "Excellent! Can you tell me which word starts with {}: '{}' or '{}'?",
                        letter, word, DISTRACTOR_WORD
                    );
                }
            }
            format!("Let's work on the letter {}!", letter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn correct_attempt_gets_success_message() {
        let feedback = feedback_for_letter('B', "buh");
        assert!(feedback.contains('B'));
        assert!(feedback.contains("Great job"));
    }

    #[test]
    fn wrong_attempt_names_primary_sound() {
        let feedback = feedback_for_letter('B', "xyz");
        assert!(feedback.contains("'buh'"));
        assert!(feedback.contains("try again"));
    }

    #[test]
    fn lowercase_letter_and_padded_attempt_normalize() {
        let feedback = feedback_for_letter('b', "  BUH  ");
        assert!(feedback.contains("Great job"));
        assert!(feedback.contains('B'));
    }

    #[test]
    fn every_letter_yields_feedback() {
        for letter in 'A'..='Z' {
            let success = feedback_for_letter(letter, "anything");
            assert!(!success.is_empty(), "empty feedback for {}", letter);
            assert!(success.contains(letter), "feedback must name {}", letter);
        }
    }

    #[test]
    fn unknown_letter_gets_generic_encouragement() {
        let feedback = feedback_for_letter('3', "three");
        assert!(feedback.contains("Let's practice"));
    }

    #[test]
    fn sound_tables_cover_the_alphabet_with_primary_sound_first() {
        for letter in 'A'..='Z' {
            let sounds = letter_sounds(letter).unwrap();
            assert!(!sounds.is_empty());
            let words = letter_words(letter).unwrap();
            assert!(words.len() >= 2, "letter {} needs at least two words", letter);
            for word in words {
                assert!(
                    word.to_lowercase().starts_with(letter.to_ascii_lowercase()),
                    "'{}' does not start with {}",
                    word,
                    letter
                );
            }
        }
    }

    #[test]
    fn easy_activity_asks_for_letter_name() {
        let mut rng = StdRng::seed_from_u64(7);
        let activity = activity_for('m', Difficulty::Easy, &mut rng);
        assert!(activity.contains('M'));
        assert!(activity.contains("letter name"));
    }

    #[test]
    fn medium_activity_picks_from_first_two_words() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let activity = activity_for('C', Difficulty::Medium, &mut rng);
            assert!(
                activity.contains("'cat'") || activity.contains("'car'"),
                "unexpected word in: {}",
                activity
            );
        }
    }

    #[test]
    fn hard_activity_names_two_distinct_words_and_the_letter() {
        let mut rng = StdRng::seed_from_u64(42);
        let activity = activity_for('C', Difficulty::Hard, &mut rng);
        assert!(activity.contains('C'));
        assert!(activity.contains("'zebra'"));
        let table_word = letter_words('C')
            .unwrap()
            .iter()
            .find(|w| activity.contains(&format!("'{}'", w)));
        assert!(table_word.is_some(), "no table word in: {}", activity);
    }

    #[test]
    fn hard_activity_is_deterministic_with_seeded_rng() {
        let a = activity_for('S', Difficulty::Hard, &mut StdRng::seed_from_u64(99));
        let b = activity_for('S', Difficulty::Hard, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn hard_activity_without_enough_words_falls_back() {
        let mut rng = StdRng::seed_from_u64(1);
        let activity = activity_for('#', Difficulty::Hard, &mut rng);
        assert_eq!(activity, "Let's work on the letter #!");
    }

    #[test]
    fn medium_activity_for_unknown_letter_uses_placeholder_word() {
        let mut rng = StdRng::seed_from_u64(1);
        let activity = activity_for('?', Difficulty::Medium, &mut rng);
        assert!(activity.contains("'?word'"));
    }
}
