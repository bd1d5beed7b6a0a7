//! Linguistic capabilities the corrector depends on.
//!
//! The corrector never tokenizes, tags, lemmatizes or measures distance on its
//! own; it asks a [`LanguageServices`] implementation. [`BasicServices`] is a
//! small rule-based backing good enough for English prose:
//!
//! - tokenization on Unicode word boundaries
//! - a closed-class lexicon plus suffix heuristics for Penn-style tags
//! - WordNet-style detachment rules for lemmas, validated against the dictionary
//! - a light Porter-style suffix stripper for stems

use ahash::AHashMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::dictionary::Dictionary;
use crate::distance::levenshtein;

/// Coarse part of speech used to pick lemmatization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Adj,
    Verb,
    Noun,
    Adv,
}

impl PartOfSpeech {
    /// Map a Penn-style tag to a part of speech by its first letter.
    ///
    /// Anything that is not an adjective, verb, noun or adverb tag lemmatizes
    /// as a noun.
    pub fn from_tag(tag: &str) -> Self {
        match tag.chars().next() {
            Some('J') => PartOfSpeech::Adj,
            Some('V') => PartOfSpeech::Verb,
            Some('N') => PartOfSpeech::Noun,
            Some('R') => PartOfSpeech::Adv,
            _ => PartOfSpeech::Noun,
        }
    }
}

/// Text-analysis operations consumed by [`Corrector`](crate::corrector::Corrector).
///
/// Implementations are assumed infallible and side-effect free.
pub trait LanguageServices {
    /// Split text into word and punctuation tokens. Case is left untouched.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// One tag per token, in order.
    fn tag(&self, tokens: &[String]) -> Vec<String>;

    /// Dictionary base form of `token` read as `pos`.
    fn lemmatize(&self, token: &str, pos: PartOfSpeech) -> String;

    fn stem(&self, token: &str) -> String;

    /// Case-insensitive dictionary membership.
    fn is_word(&self, token: &str) -> bool;

    fn is_punctuation(&self, token: &str) -> bool {
        !token.is_empty() && token.chars().all(|c| c.is_ascii_punctuation())
    }

    fn edit_distance(&self, a: &str, b: &str) -> usize {
        levenshtein(a, b)
    }
}

impl<T: LanguageServices + ?Sized> LanguageServices for &T {
    fn tokenize(&self, text: &str) -> Vec<String> {
        (**self).tokenize(text)
    }

    fn tag(&self, tokens: &[String]) -> Vec<String> {
        (**self).tag(tokens)
    }

    fn lemmatize(&self, token: &str, pos: PartOfSpeech) -> String {
        (**self).lemmatize(token, pos)
    }

    fn stem(&self, token: &str) -> String {
        (**self).stem(token)
    }

    fn is_word(&self, token: &str) -> bool {
        (**self).is_word(token)
    }

    fn is_punctuation(&self, token: &str) -> bool {
        (**self).is_punctuation(token)
    }

    fn edit_distance(&self, a: &str, b: &str) -> usize {
        (**self).edit_distance(a, b)
    }
}

// Detachment rules: (suffix, replacement)
const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

const VERB_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
];

const ADJ_RULES: &[(&str, &str)] = &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")];

const VERB_EXCEPTIONS: &[(&str, &str)] = &[
    ("am", "be"),
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("did", "do"),
    ("does", "do"),
    ("done", "do"),
    ("went", "go"),
    ("gone", "go"),
    ("made", "make"),
    ("took", "take"),
    ("taken", "take"),
    ("came", "come"),
    ("saw", "see"),
    ("seen", "see"),
    ("said", "say"),
    ("gave", "give"),
    ("given", "give"),
    ("knew", "know"),
    ("known", "know"),
    ("thought", "think"),
    ("found", "find"),
    ("told", "tell"),
    ("felt", "feel"),
    ("left", "leave"),
    ("kept", "keep"),
    ("began", "begin"),
    ("begun", "begin"),
    ("brought", "bring"),
    ("wrote", "write"),
    ("written", "write"),
    ("sat", "sit"),
    ("stood", "stand"),
    ("lost", "lose"),
    ("paid", "pay"),
    ("met", "meet"),
    ("ran", "run"),
    ("ate", "eat"),
    ("eaten", "eat"),
    ("slept", "sleep"),
    ("led", "lead"),
    ("held", "hold"),
    ("heard", "hear"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("spent", "spend"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("bought", "buy"),
    ("sent", "send"),
    ("built", "build"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("sold", "sell"),
    ("understood", "understand"),
];

const NOUN_EXCEPTIONS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("people", "person"),
];

const ADJ_EXCEPTIONS: &[(&str, &str)] = &[
    ("better", "good"),
    ("best", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
];

// Closed-class words and auxiliaries with fixed tags
const LEXICON: &[(&str, &str)] = &[
    ("the", "DT"),
    ("a", "DT"),
    ("an", "DT"),
    ("this", "DT"),
    ("that", "DT"),
    ("these", "DT"),
    ("those", "DT"),
    ("every", "DT"),
    ("each", "DT"),
    ("i", "PRP"),
    ("you", "PRP"),
    ("he", "PRP"),
    ("she", "PRP"),
    ("it", "PRP"),
    ("we", "PRP"),
    ("they", "PRP"),
    ("me", "PRP"),
    ("him", "PRP"),
    ("us", "PRP"),
    ("them", "PRP"),
    ("my", "PRP$"),
    ("your", "PRP$"),
    ("his", "PRP$"),
    ("her", "PRP$"),
    ("its", "PRP$"),
    ("our", "PRP$"),
    ("their", "PRP$"),
    ("to", "TO"),
    ("of", "IN"),
    ("in", "IN"),
    ("on", "IN"),
    ("at", "IN"),
    ("by", "IN"),
    ("for", "IN"),
    ("with", "IN"),
    ("from", "IN"),
    ("into", "IN"),
    ("about", "IN"),
    ("and", "CC"),
    ("or", "CC"),
    ("but", "CC"),
    ("will", "MD"),
    ("would", "MD"),
    ("can", "MD"),
    ("could", "MD"),
    ("shall", "MD"),
    ("should", "MD"),
    ("may", "MD"),
    ("might", "MD"),
    ("must", "MD"),
    ("be", "VB"),
    ("am", "VBP"),
    ("are", "VBP"),
    ("is", "VBZ"),
    ("was", "VBD"),
    ("were", "VBD"),
    ("been", "VBN"),
    ("being", "VBG"),
    ("have", "VBP"),
    ("has", "VBZ"),
    ("had", "VBD"),
    ("do", "VBP"),
    ("does", "VBZ"),
    ("did", "VBD"),
    ("not", "RB"),
    ("very", "RB"),
    ("never", "RB"),
    ("always", "RB"),
    ("often", "RB"),
    ("here", "RB"),
    ("when", "WRB"),
    ("where", "WRB"),
    ("why", "WRB"),
    ("how", "WRB"),
    ("who", "WP"),
    ("what", "WP"),
];

// Adjective suffixes, checked before the noun default
const ADJ_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "ic", "al"];

/// Rule-based [`LanguageServices`] backed by a [`Dictionary`].
#[derive(Debug, Clone)]
pub struct BasicServices {
    dictionary: Dictionary,
    lexicon: AHashMap<&'static str, &'static str>,
    verb_exceptions: AHashMap<&'static str, &'static str>,
    noun_exceptions: AHashMap<&'static str, &'static str>,
    adj_exceptions: AHashMap<&'static str, &'static str>,
}

impl BasicServices {
    pub fn new(dictionary: Dictionary) -> Self {
        Self {
            dictionary,
            lexicon: LEXICON.iter().copied().collect(),
            verb_exceptions: VERB_EXCEPTIONS.iter().copied().collect(),
            noun_exceptions: NOUN_EXCEPTIONS.iter().copied().collect(),
            adj_exceptions: ADJ_EXCEPTIONS.iter().copied().collect(),
        }
    }

    /// Tag a single token given the tag of the token before it.
    fn tag_one(&self, token: &str, previous: Option<&str>) -> String {
        if self.is_punctuation(token) {
            return token.to_string();
        }

        let lower = token.to_lowercase();
        if let Some(tag) = self.lexicon.get(lower.as_str()) {
            return (*tag).to_string();
        }
        if lower.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
            return "CD".to_string();
        }

        let tag = if lower.ends_with("ly") {
            "RB"
        } else if lower.ends_with("ing") {
            "VBG"
        } else if lower.ends_with("ed") {
            "VBD"
        } else if lower.ends_with("est") && lower.chars().count() > 4 {
            "JJS"
        } else if ADJ_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            "JJ"
        } else if lower.ends_with('s') && !lower.ends_with("ss") && lower.chars().count() > 3 {
            "NNS"
        } else {
            "NN"
        };

        // A bare form right after "to" or a modal reads as a verb
        match previous {
            Some("TO") | Some("MD") if tag == "NN" => "VB".to_string(),
            _ => tag.to_string(),
        }
    }

    fn exceptions(&self, pos: PartOfSpeech) -> Option<&AHashMap<&'static str, &'static str>> {
        match pos {
            PartOfSpeech::Verb => Some(&self.verb_exceptions),
            PartOfSpeech::Noun => Some(&self.noun_exceptions),
            PartOfSpeech::Adj => Some(&self.adj_exceptions),
            PartOfSpeech::Adv => None,
        }
    }
}

fn rules(pos: PartOfSpeech) -> &'static [(&'static str, &'static str)] {
    match pos {
        PartOfSpeech::Noun => NOUN_RULES,
        PartOfSpeech::Verb => VERB_RULES,
        PartOfSpeech::Adj => ADJ_RULES,
        PartOfSpeech::Adv => &[],
    }
}

fn is_vowel(chars: &[char], i: usize) -> bool {
    match chars[i] {
        'a' | 'e' | 'i' | 'o' | 'u' => true,
        'y' => i > 0 && !is_vowel(chars, i - 1),
        _ => false,
    }
}

fn has_vowel(stem: &str) -> bool {
    let chars: Vec<char> = stem.chars().collect();
    (0..chars.len()).any(|i| is_vowel(&chars, i))
}

impl LanguageServices for BasicServices {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_word_bounds()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    fn tag(&self, tokens: &[String]) -> Vec<String> {
        let mut tags: Vec<String> = Vec::with_capacity(tokens.len());
        for token in tokens {
            let tag = self.tag_one(token, tags.last().map(String::as_str));
            tags.push(tag);
        }
        tags
    }

    /// Exception forms win; otherwise the shortest dictionary form among the
    /// token itself and every detachment rule result. Unknown forms come back
    /// unchanged.
    fn lemmatize(&self, token: &str, pos: PartOfSpeech) -> String {
        if let Some(lemma) = self.exceptions(pos).and_then(|e| e.get(token)) {
            return (*lemma).to_string();
        }

        let mut best: Option<String> = None;
        let mut consider = |form: String| {
            if !self.dictionary.contains(&form) {
                return;
            }
            let shorter = best
                .as_ref()
                .is_none_or(|b| form.chars().count() < b.chars().count());
            if shorter {
                best = Some(form);
            }
        };

        consider(token.to_string());
        for (suffix, replacement) in rules(pos) {
            if let Some(base) = token.strip_suffix(suffix) {
                if !base.is_empty() {
                    consider(format!("{base}{replacement}"));
                }
            }
        }

        best.unwrap_or_else(|| token.to_string())
    }

    /// Plural and -ed/-ing stripping in the manner of Porter step 1.
    fn stem(&self, token: &str) -> String {
        let word = token.to_lowercase();
        if word.chars().count() <= 2 {
            return word;
        }

        let word = if let Some(base) = word.strip_suffix("sses") {
            format!("{base}ss")
        } else if let Some(base) = word.strip_suffix("ies") {
            format!("{base}i")
        } else if !word.ends_with("ss") && word.ends_with('s') {
            word[..word.len() - 1].to_string()
        } else {
            word.clone()
        };

        if let Some(base) = word.strip_suffix("eed") {
            return format!("{base}ee");
        }

        let stripped = ["ing", "ed"]
            .iter()
            .find_map(|suffix| word.strip_suffix(suffix).filter(|base| has_vowel(base)));

        match stripped {
            Some(base) => {
                let chars: Vec<char> = base.chars().collect();
                let n = chars.len();
                // "stopp" -> "stop", but keep "ll", "ss" and "zz"
                let doubled = n >= 2
                    && chars[n - 1] == chars[n - 2]
                    && !matches!(chars[n - 1], 'l' | 's' | 'z')
                    && !is_vowel(&chars, n - 1);
                if doubled {
                    chars[..n - 1].iter().collect()
                } else {
                    base.to_string()
                }
            }
            None => word.clone(),
        }
    }

    fn is_word(&self, token: &str) -> bool {
        self.dictionary.contains(token)
    }
}
