// Oppositional reaction tables.
//
// The artist never illustrates what the user asked for; it reacts against
// it. `REACTION_TEMPLATES` maps keyword groups to opening phrases that the
// text model continues from (sadness gets mocking sunshine, love gets
// rot, and so on). Matching is a case-folded substring test and the first
// matching template wins; inputs that match nothing use `DEFAULT_STARTERS`.
//
// `STYLE_SUFFIXES` are appended to the artist's text to steer the diffusion
// model. Each one begins with an entry of `OVERLAY_DELIMITERS`, which the
// orchestrator uses to cut the suffix back off and recover the bare words
// for the ASCII overlay.

use yentyo_prng::YentRng;

/// Keyword group and the starters used when it matches.
#[derive(Debug)]
pub struct ReactionTemplate {
    pub keywords: &'static [&'static str],
    pub starters: &'static [&'static str],
}

impl ReactionTemplate {
    /// Does any keyword occur in `lowered` (already lower-cased)?
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|kw| lowered.contains(kw))
    }
}

pub static REACTION_TEMPLATES: &[ReactionTemplate] = &[
    ReactionTemplate {
        keywords: &["sad", "depress", "lonely", "cry", "tears", "grief"],
        starters: &[
            "a grinning sun laughing at",
            "a circus parade marching over",
            "confetti raining on",
        ],
    },
    ReactionTemplate {
        keywords: &["hate", "angry", "rage", "fuck", "furious"],
        starters: &[
            "a bouquet of tulips offered to",
            "a kitten hugging",
            "a choir of grandmothers singing to",
        ],
    },
    ReactionTemplate {
        keywords: &["love", "beautiful", "pretty", "cute", "adore"],
        starters: &[
            "a rotting mannequin embracing",
            "a cracked mirror reflecting",
            "a pile of broken promises shaped like",
        ],
    },
    ReactionTemplate {
        keywords: &["bored", "boring", "whatever", "meh"],
        starters: &[
            "an explosion of screaming colors inside",
            "a volcano erupting through",
            "a thousand alarm clocks ringing in",
        ],
    },
    ReactionTemplate {
        keywords: &["hello", "hey", "greetings", "good morning"],
        starters: &[
            "a door slammed in the face of",
            "a closed sign hanging over",
            "an unanswered telephone melting next to",
        ],
    },
    ReactionTemplate {
        keywords: &["draw", "paint", "picture", "sketch", "image of"],
        starters: &[
            "a blank canvas refusing to become",
            "an artist on strike ignoring",
            "a torn sketchbook mocking",
        ],
    },
    ReactionTemplate {
        keywords: &["cat", "dog", "duck", "bird", "horse"],
        starters: &[
            "a tax inspector disguised as",
            "a bureaucrat wearing the skin of",
            "a plastic monument to",
        ],
    },
    ReactionTemplate {
        keywords: &["death", "dead", "die", "kill", "funeral"],
        starters: &[
            "a birthday party for",
            "balloons tied to",
            "a newborn laughing at",
        ],
    },
];

pub static DEFAULT_STARTERS: &[&str] = &[
    "a monument to the stupidity of",
    "a distorted portrait of",
    "a bureaucratic nightmare about",
    "the ruins of",
    "a propaganda poster against",
];

/// Opening lines for the commentator's roast context.
pub static ROAST_OPENERS: &[&str] = &[
    "oh look, another genius says:",
    "you really typed this:",
    "the audacity of writing",
    "imagine thinking this is interesting:",
];

/// Markers that begin each style suffix. Cutting the artist's text at the
/// earliest of these leaves the bare words.
pub static OVERLAY_DELIMITERS: &[&str] = &[
    ", oil painting",
    ", abstract ",
    ", dark symbolic",
    ", street art",
    ", surreal",
    ", Soviet poster",
    ", Picasso",
    ", social realism",
    ", propaganda",
    ", caricature",
];

pub static STYLE_SUFFIXES: &[&str] = &[
    ", oil painting, thick impasto, dramatic lighting",
    ", abstract expressionism, violent brushstrokes",
    ", dark symbolic art, heavy shadows",
    ", street art, spray paint on concrete",
    ", surrealism, melting forms, dreamlike",
    ", Soviet poster, constructivist, bold red",
    ", Picasso style, cubist fragments",
    ", social realism, gritty, working class",
    ", propaganda art, stark contrast",
    ", caricature, exaggerated features, ink",
];

/// First template whose keywords occur in `input`.
pub fn match_template(input: &str) -> Option<&'static ReactionTemplate> {
    let lowered = input.to_lowercase();
    REACTION_TEMPLATES.iter().find(|t| t.matches(&lowered))
}

/// Pick an opening phrase for `input`.
pub fn pick_starter(input: &str, rng: &mut YentRng) -> &'static str {
    let pool = match_template(input).map_or(DEFAULT_STARTERS, |t| t.starters);
    rng.choose(pool).copied().unwrap_or("a portrait of")
}

pub fn pick_style_suffix(rng: &mut YentRng) -> &'static str {
    rng.choose(STYLE_SUFFIXES).copied().unwrap_or(", oil painting")
}

pub fn pick_roast_opener(rng: &mut YentRng) -> &'static str {
    rng.choose(ROAST_OPENERS).copied().unwrap_or("you said:")
}

/// Cut `prompt` at the earliest overlay delimiter.
pub fn strip_style_suffix(prompt: &str) -> &str {
    let cut = OVERLAY_DELIMITERS
        .iter()
        .filter_map(|sep| prompt.find(sep))
        .min()
        .unwrap_or(prompt.len());
    &prompt[..cut]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_matching() {
        let cases = [
            ("I am so sad", true),
            ("I hate you", true),
            ("you are beautiful", true),
            ("I'm bored", true),
            ("hello", true),
            ("draw me a duck", true),
            ("cat", true),
            ("death comes for us all", true),
            ("the weather is nice", false),
        ];
        for (input, want) in cases {
            assert_eq!(match_template(input).is_some(), want, "template match for {input:?}");
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(match_template("I HATE MONDAYS").is_some());
    }

    #[test]
    fn tables_not_empty() {
        assert!(!REACTION_TEMPLATES.is_empty());
        for (i, t) in REACTION_TEMPLATES.iter().enumerate() {
            assert!(!t.keywords.is_empty(), "template {i} has no keywords");
            assert!(!t.starters.is_empty(), "template {i} has no starters");
        }
        assert!(!DEFAULT_STARTERS.is_empty());
        assert!(!ROAST_OPENERS.is_empty());
    }

    #[test]
    fn style_suffixes_start_with_a_delimiter() {
        for suffix in STYLE_SUFFIXES {
            assert!(suffix.starts_with(','), "suffix should start with comma: {suffix:?}");
            assert!(
                OVERLAY_DELIMITERS.iter().any(|d| suffix.starts_with(d)),
                "suffix {suffix:?} has no overlay delimiter"
            );
        }
    }

    #[test]
    fn starter_comes_from_matched_template() {
        let mut rng = YentRng::new(3);
        let starter = pick_starter("my cat is cute", &mut rng);
        // Groups are scanned in table order, so "cute" (love) wins over "cat".
        let expected = match_template("my cat is cute").unwrap();
        assert!(expected.starters.contains(&starter));
    }

    #[test]
    fn unmatched_input_uses_default_starters() {
        let mut rng = YentRng::new(3);
        let starter = pick_starter("the weather is nice", &mut rng);
        assert!(DEFAULT_STARTERS.contains(&starter));
    }

    #[test]
    fn strip_takes_earliest_delimiter() {
        let prompt = "a mirror cracking, surreal nonsense, oil painting, thick impasto";
        assert_eq!(strip_style_suffix(prompt), "a mirror cracking");
        assert_eq!(strip_style_suffix("no suffix here"), "no suffix here");
    }

    #[test]
    fn every_suffix_strips_cleanly() {
        for suffix in STYLE_SUFFIXES {
            let prompt = format!("bare words{suffix}");
            assert_eq!(strip_style_suffix(&prompt), "bare words");
        }
    }
}
